use super::load_site_with_stack;
use crate::error::Result;
use crate::schema::{discover_schemas, validate_site};
use crate::workspace::Workspace;
use log::info;
use std::path::Path;

/// Checks component values against the schemas of the site's stack without writing output.
pub fn run(workspace: &Workspace, site_path: &Path) -> Result<()> {
    let (site, cache) = load_site_with_stack(workspace, site_path)?;
    info!("Validating component configuration...");
    validate_site(&site, &discover_schemas(&cache.layout())?)
}
