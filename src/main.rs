//! klabctl's main application entry point.

use klabctl::{
    cli::get_args, commands, error::default_error_handler, logger::init_logger,
    workspace::Workspace,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = commands::run(&Workspace::current(), args) {
        default_error_handler(err);
    }
}
