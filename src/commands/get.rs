use crate::cache::ensure_stack_available;
use crate::cli::DefaultsArgs;
use crate::config::validate_stack_source;
use crate::defaults::site_defaults;
use crate::error::Result;
use crate::workspace::Workspace;

/// Prints a default site.yaml for the requested stack to stdout.
///
/// The banner goes to stderr so the output can be redirected straight into a file.
pub fn defaults(workspace: &Workspace, args: &DefaultsArgs) -> Result<()> {
    let source = &args.stack.stack_source;
    let r#ref = &args.stack.stack_ref;
    validate_stack_source(source)?;

    let cache = ensure_stack_available(workspace, source, r#ref, false)?;
    let yaml = site_defaults(&cache.layout(), source, r#ref, &args.cluster_name)?;

    eprintln!("# Default configuration values for stack {source}@{}", r#ref);
    print!("{yaml}");
    Ok(())
}
