//! klabctl turns a declarative `site.yaml` into a cluster's GitOps tree and Terraform
//! root module, using templates from a versioned stack repository kept in a local
//! git-backed cache.

/// Stack cache synchronization and self-healing
pub mod cache;

/// Command-line interface module for the klabctl application
pub mod cli;

/// Subcommand drivers
pub mod commands;

/// Site configuration (site.yaml) handling
pub mod config;

/// Common constants: default paths, template names and stack coordinates
pub mod constants;

/// Recursive directory copy used for vendoring
pub mod copy;

/// Default site documents built from a stack
pub mod defaults;

/// Error types and handling for the klabctl application
pub mod error;

/// Git subprocess runner and repository inspection
pub mod git;

/// Logging setup
pub mod logger;

/// Component rendering into the cluster tree
pub mod processor;

/// Template fragments and rendering
pub mod renderer;

/// Component schema discovery and validation
pub mod schema;

/// Terraform root generation and provisioning
pub mod terraform;

/// Dynamic component values
pub mod value;

/// Vendoring of stack bases into the cluster tree
pub mod vendor;

/// Paths of the workspace and of a cached stack
pub mod workspace;
