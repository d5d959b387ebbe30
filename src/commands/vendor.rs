use super::load_site_with_stack;
use crate::error::Result;
use crate::vendor::{vendor, VendorReport};
use crate::workspace::Workspace;
use std::path::Path;

/// Copies stack bases for every enabled app, and the infra base, into the cluster tree.
pub fn run(workspace: &Workspace, site_path: &Path) -> Result<VendorReport> {
    let (site, cache) = load_site_with_stack(workspace, site_path)?;
    vendor(workspace, &cache.layout(), &site)
}
