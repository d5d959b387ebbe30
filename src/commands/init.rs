use crate::cache::ensure_stack_available;
use crate::cli::InitArgs;
use crate::config::{validate_stack_source, ToolConfig};
use crate::defaults::site_defaults;
use crate::error::{Error, Result};
use crate::workspace::Workspace;
use log::{info, warn};
use regex::Regex;
use std::fs;
use std::path::PathBuf;

const ROOT_GITIGNORE: &str = "# klabctl cache
.klabctl/cache/

# Generated manifests (optional - uncomment to gitignore generated files)
# clusters/*/apps/*/generated/
# clusters/*/apps/*/base/
# clusters/*/infra/generated/
# clusters/*/infra/base/
";

/// Cluster names become directory names and Kubernetes labels.
pub fn validate_cluster_name(name: &str) -> Result<()> {
    let label = Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$")
        .map_err(|e| Error::ConfigError(e.to_string()))?;
    if name.len() > 63 || !label.is_match(name) {
        return Err(Error::ConfigError(format!(
            "invalid cluster name '{name}': use lowercase letters, digits and '-', \
             starting and ending with a letter or digit"
        )));
    }
    Ok(())
}

/// Creates `clusters/<name>/site.yaml` from the stack defaults. Returns the site path.
pub fn run(workspace: &Workspace, args: &InitArgs) -> Result<PathBuf> {
    let name = args.cluster_name.as_str();
    let source = args.stack.stack_source.as_str();
    let r#ref = args.stack.stack_ref.as_str();

    validate_cluster_name(name)?;
    validate_stack_source(source)?;
    info!("🚀 Initializing cluster '{name}'...");

    let cluster_dir = workspace.cluster_dir(name);
    let site_path = cluster_dir.join("site.yaml");
    if site_path.exists() {
        return Err(Error::ConfigError(format!(
            "cluster '{name}' already exists (site.yaml found at {})",
            site_path.display()
        )));
    }

    let cache = ensure_stack_available(workspace, source, r#ref, false)?;
    ToolConfig::new(source, r#ref).save(workspace.tool_config_path())?;

    info!("📝 Generating site.yaml...");
    let site = site_defaults(&cache.layout(), source, r#ref, name)?;
    fs::create_dir_all(&cluster_dir)?;
    fs::write(&site_path, site)?;
    info!("✓ Generated {}", site_path.display());

    let gitignore = workspace.root().join(".gitignore");
    if !gitignore.exists() {
        match fs::write(&gitignore, ROOT_GITIGNORE) {
            Ok(()) => info!("✓ Generated .gitignore"),
            Err(e) => warn!("failed to create .gitignore: {e}"),
        }
    }

    info!("");
    info!("✨ Cluster initialized successfully!");
    info!("");
    info!("Next steps:");
    info!("  1. Edit {} to configure your cluster", site_path.display());
    info!("  2. Run 'klabctl generate --site {}' to generate manifests", site_path.display());
    info!("  3. Deploy your cluster!");
    Ok(site_path)
}
