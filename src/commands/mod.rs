//! Command drivers. Each one sequences the library modules for a single subcommand.

pub mod generate;
pub mod get;
pub mod init;
pub mod provision;
pub mod pull;
pub mod validate;
pub mod vendor;

use crate::cache::{ensure_stack_available, StackCache};
use crate::cli::{Args, Commands, GetCommands};
use crate::config::Site;
use crate::error::Result;
use crate::workspace::Workspace;
use std::path::Path;

/// Dispatches parsed arguments to the matching command in `workspace`.
pub fn run(workspace: &Workspace, args: Args) -> Result<()> {
    match args.command {
        Commands::Init(init) => init::run(workspace, &init).map(|_| ()),
        Commands::Generate(generate) => {
            generate::run(workspace, &args.site, &generate).map(|_| ())
        }
        Commands::Vendor => vendor::run(workspace, &args.site).map(|_| ()),
        Commands::Provision => provision::run(workspace, &args.site),
        Commands::Pull(pull) => pull::run(workspace, &args.site, &pull).map(|_| ()),
        Commands::Get { resource: GetCommands::Defaults(defaults) } => {
            get::defaults(workspace, &defaults)
        }
        Commands::Validate => validate::run(workspace, &args.site),
    }
}

/// Loads the site and makes its stack available in the cache.
pub(crate) fn load_site_with_stack(workspace: &Workspace, site: &Path) -> Result<(Site, StackCache)> {
    let site = Site::load(workspace.resolve(site))?;
    let (source, r#ref) = site.validate_stack()?;
    let cache = ensure_stack_available(workspace, source, r#ref, false)?;
    Ok((site, cache))
}
