use crate::cache::{ensure_stack_available, StackCache};
use crate::cli::PullArgs;
use crate::config::{validate_stack_source, Site};
use crate::error::{Error, Result};
use crate::workspace::Workspace;
use std::path::Path;

/// Ensures the stack is cached and valid, pulling or repairing as needed.
///
/// `--stack-source` and `--stack-ref` override the site; the site file is only read when
/// one of them is missing.
pub fn run(workspace: &Workspace, site_path: &Path, args: &PullArgs) -> Result<StackCache> {
    let site = match (&args.stack_source, &args.stack_ref) {
        (Some(_), Some(_)) => None,
        _ => Some(Site::load(workspace.resolve(site_path))?),
    };

    let stack = site.as_ref().map(|s| &s.spec.stack);
    let source = match &args.stack_source {
        Some(source) => source.as_str(),
        None => stack.map(|s| s.source.as_str()).unwrap_or_default(),
    };
    let r#ref = match &args.stack_ref {
        Some(r#ref) => r#ref.as_str(),
        None => stack.map(|s| s.r#ref.as_str()).unwrap_or_default(),
    };

    if source.is_empty() || r#ref.is_empty() {
        return Err(Error::ConfigError(
            "stack.source and stack.ref are required in site.yaml".to_string(),
        ));
    }
    validate_stack_source(source)?;
    ensure_stack_available(workspace, source, r#ref, args.force)
}
