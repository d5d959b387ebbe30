use crate::config::Site;
use crate::error::Result;
use crate::terraform::provision;
use crate::workspace::Workspace;
use std::path::Path;

pub fn run(workspace: &Workspace, site_path: &Path) -> Result<()> {
    let site = Site::load(workspace.resolve(site_path))?;
    provision(workspace, &site)
}
