//! Command-line interface implementation for klabctl.
//! Provides argument parsing and help text formatting using clap.

use crate::constants::{
    DEFAULT_CLUSTER_NAME, DEFAULT_SITE_FILE, DEFAULT_STACK_REF, DEFAULT_STACK_SOURCE,
};
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments structure for klabctl.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "klabctl: takes a site.yaml and produces cluster GitOps artifacts and can provision infra",
    long_about = None
)]
pub struct Args {
    /// Path to site.yaml
    #[arg(short, long, global = true, default_value = DEFAULT_SITE_FILE)]
    pub site: PathBuf,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new cluster from a stack
    Init(InitArgs),

    /// Generate cluster GitOps manifests and Terraform root from site.yaml
    #[command(alias = "render")]
    Generate(GenerateArgs),

    /// Copy stack bases for enabled apps into the cluster tree
    Vendor,

    /// Provision infrastructure using Terraform
    Provision,

    /// Pull and validate the stack cache
    Pull(PullArgs),

    /// Get resources and information from the stack
    Get {
        #[command(subcommand)]
        resource: GetCommands,
    },

    /// Validate site.yaml against the stack's component schemas
    Validate,
}

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Name of the cluster to create (a DNS label)
    #[arg(value_name = "CLUSTER_NAME")]
    pub cluster_name: String,

    #[command(flatten)]
    pub stack: StackArgs,
}

/// Stack coordinates with defaults, for commands that run without a site.
#[derive(clap::Args, Debug)]
pub struct StackArgs {
    /// Git repository URL of the stack
    #[arg(long, default_value = DEFAULT_STACK_SOURCE)]
    pub stack_source: String,

    /// Stack ref (branch, tag or commit)
    #[arg(long, alias = "stack-version", default_value = DEFAULT_STACK_REF)]
    pub stack_ref: String,
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Skip schema validation of component values
    #[arg(long)]
    pub skip_validation: bool,
}

#[derive(clap::Args, Debug)]
pub struct PullArgs {
    /// Force re-pull stack even if cached
    #[arg(long)]
    pub force: bool,

    /// Override the stack source from site.yaml
    #[arg(long)]
    pub stack_source: Option<String>,

    /// Override the stack ref from site.yaml
    #[arg(long, alias = "stack-version")]
    pub stack_ref: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum GetCommands {
    /// Print a default site.yaml built from a stack
    Defaults(DefaultsArgs),
}

#[derive(clap::Args, Debug)]
pub struct DefaultsArgs {
    /// Cluster name written into the defaults
    #[arg(short = 'n', long, default_value = DEFAULT_CLUSTER_NAME)]
    pub cluster_name: String,

    #[command(flatten)]
    pub stack: StackArgs,
}

/// Exit status for a parse outcome: 0 for `--help` and `--version`, 1 for every usage error.
pub fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments or the subcommand are missing
/// * With the status from [`exit_code`] for other parse outcomes
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::MissingRequiredArgument
            | ErrorKind::MissingSubcommand
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            }
            kind => {
                let _ = e.print();
                std::process::exit(exit_code(kind));
            }
        },
    }
}
