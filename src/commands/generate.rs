use super::load_site_with_stack;
use crate::cli::GenerateArgs;
use crate::error::Result;
use crate::processor::{Processor, RenderReport};
use crate::schema::{discover_schemas, validate_site};
use crate::terraform::generate_terraform_root;
use crate::vendor::vendor_apps;
use crate::workspace::Workspace;
use log::info;
use std::path::Path;

/// Validates the site, vendors app bases and renders the cluster tree.
///
/// # Flow
/// 1. Loads the site and ensures its stack is cached
/// 2. Validates component values against the stack's schemas
/// 3. Generates the Terraform root when an infra provider is set
/// 4. Vendors app bases
/// 5. Renders every enabled component
pub fn run(workspace: &Workspace, site_path: &Path, args: &GenerateArgs) -> Result<RenderReport> {
    let (site, cache) = load_site_with_stack(workspace, site_path)?;
    let stack = cache.layout();
    let cluster = site.cluster_name()?;

    if args.skip_validation {
        info!("Skipping schema validation");
    } else {
        info!("Validating component configuration...");
        validate_site(&site, &discover_schemas(&stack)?)?;
    }

    if site.has_infra() {
        generate_terraform_root(workspace, &stack, &site)?;
    }

    let vendored = vendor_apps(workspace, &stack, &site)?;
    let report = Processor::new(workspace, &stack, &site)?.process_all()?;

    info!(
        "✓ Rendered {} component(s) ({} file(s), {} base(s) vendored) into {}",
        report.components,
        report.files,
        vendored.apps,
        workspace.cluster_dir(cluster).display()
    );
    Ok(report)
}
