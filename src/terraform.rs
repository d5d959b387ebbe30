//! Terraform root module generation and provisioning.
//!
//! `generate` writes `clusters/<name>/infra/generated/{main.tf,terraform.tfvars.json}` from
//! the stack's infra templates; `provision` runs terraform against that directory.

use crate::config::Site;
use crate::constants::{
    templates, DEFAULT_IMAGE_CONTENT_TYPE, TERRAFORM_MAIN_FILE, TERRAFORM_MODULE_SOURCE,
    TERRAFORM_TFVARS_FILE,
};
use crate::error::{Error, Result};
use crate::renderer::TemplateSet;
use crate::vendor::vendor_infra;
use crate::workspace::{StackLayout, Workspace};
use log::{debug, info};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const INFRA_OWNER: &str = "infra";

/// Data the infra templates are rendered with.
#[derive(Debug, Serialize)]
pub struct TerraformData<'a> {
    pub module_source: &'a str,
    pub site: &'a Site,
    pub talos_image_content_type: &'a str,
}

impl<'a> TerraformData<'a> {
    pub fn new(site: &'a Site) -> Self {
        let content_type = site.spec.infra.talos_image.content_type.as_str();
        Self {
            module_source: TERRAFORM_MODULE_SOURCE,
            site,
            talos_image_content_type: if content_type.is_empty() {
                DEFAULT_IMAGE_CONTENT_TYPE
            } else {
                content_type
            },
        }
    }
}

/// Copies the infra base and renders the Terraform root module. Returns the output directory.
///
/// # Errors
/// * `Error::ConfigError` if the stack has no `stack/infra/base`
/// * Template errors naming the infra template that failed
pub fn generate_terraform_root(
    workspace: &Workspace,
    stack: &StackLayout,
    site: &Site,
) -> Result<PathBuf> {
    let cluster = site.cluster_name()?;
    if !vendor_infra(workspace, stack, site)? {
        return Err(Error::ConfigError(format!(
            "infra base not found in cache at: {}",
            stack.infra_base_dir().display()
        )));
    }

    let dir = workspace.terraform_dir(cluster);
    fs::create_dir_all(&dir)?;

    let context = serde_json::to_value(TerraformData::new(site))?;
    let templates_dir = stack.infra_templates_dir();
    for (template, output) in [
        (templates::TERRAFORM_MAIN, TERRAFORM_MAIN_FILE),
        (templates::TERRAFORM_TFVARS, TERRAFORM_TFVARS_FILE),
    ] {
        let mut set = TemplateSet::new(INFRA_OWNER);
        set.add_file(template, templates_dir.join(template))?;
        set.render_to_file(template, &context, dir.join(output))?;
    }

    info!("✓ Generated infrastructure configuration");
    Ok(dir)
}

/// Runs `terraform init` and `terraform apply` in the cluster's generated infra directory.
pub fn provision(workspace: &Workspace, site: &Site) -> Result<()> {
    if !site.has_infra() {
        return Err(Error::ConfigError(
            "no infrastructure provider configured in site.yaml".to_string(),
        ));
    }
    let cluster = site.cluster_name()?;
    let dir = workspace.terraform_dir(cluster);
    if !dir.is_dir() {
        return Err(Error::ConfigError(
            "terraform directory not found; run 'klabctl generate' first".to_string(),
        ));
    }
    let terraform = which::which("terraform")
        .map_err(|_| Error::BinaryNotFound { binary: "terraform".to_string() })?;

    info!("Provisioning infrastructure for site: {cluster}");

    info!("Running terraform init...");
    run_terraform(&terraform, &dir, &["init"])?;

    info!("Running terraform apply...");
    run_terraform(
        &terraform,
        &dir,
        &["apply", &format!("-var-file={TERRAFORM_TFVARS_FILE}"), "-auto-approve"],
    )?;

    info!("✓ Infrastructure provisioned successfully");
    Ok(())
}

fn run_terraform(program: &Path, dir: &Path, args: &[&str]) -> Result<()> {
    let command = args.first().copied().unwrap_or_default().to_string();
    debug!("Running terraform -chdir={} {}", dir.display(), args.join(" "));

    let status = Command::new(program)
        .arg(format!("-chdir={}", dir.display()))
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| Error::TerraformError { command: command.clone(), details: e.to_string() })?;

    if !status.success() {
        return Err(Error::TerraformError { command, details: status.to_string() });
    }
    Ok(())
}
