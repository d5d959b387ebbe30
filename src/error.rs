//! Error handling for klabctl.
//! Defines the crate-wide error type and the result alias used by every module.

use thiserror::Error;

/// Errors that can occur while loading a site, syncing the stack cache,
/// rendering templates or invoking external tools.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// Represents errors that occur while reading or writing YAML documents.
    #[error(transparent)]
    YamlError(#[from] serde_yaml::Error),

    /// Represents errors that occur while building JSON template contexts.
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// Represents errors raised by the template engine outside of a render call.
    #[error(transparent)]
    MinijinjaError(#[from] minijinja::Error),

    /// Represents errors that occur while inspecting a git repository.
    #[error(transparent)]
    Git2Error(#[from] git2::Error),

    #[error(transparent)]
    WalkDirError(#[from] walkdir::Error),

    #[error(transparent)]
    GlobError(#[from] globset::Error),

    /// The site file could not be found.
    #[error("Site file '{path}' not found.")]
    SiteNotFound { path: String },

    /// A required external program is not available on PATH.
    #[error("{binary} not found in PATH.")]
    BinaryNotFound { binary: String },

    /// Invalid or incomplete user configuration.
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// A git invocation exited unsuccessfully or could not be started.
    #[error("git {command} failed: {details}.")]
    GitError { command: String, details: String },

    /// The stack cache could not be brought into a usable state.
    #[error("Stack cache error: {0}.")]
    CacheError(String),

    /// A template file is missing from the stack.
    #[error("Template '{template}' for '{component}' not found: {source}.")]
    TemplateNotFound {
        template: String,
        component: String,
        #[source]
        source: std::io::Error,
    },

    /// A template failed to parse.
    #[error("Failed to parse template '{template}' for '{component}': {source}.")]
    TemplateParse {
        template: String,
        component: String,
        #[source]
        source: minijinja::Error,
    },

    /// A template failed while executing.
    #[error("Failed to render template '{template}' for '{component}': {source}.")]
    TemplateRender {
        template: String,
        component: String,
        #[source]
        source: minijinja::Error,
    },

    /// A rendered output file could not be created.
    #[error("Failed to create output file '{path}' for '{component}': {source}.")]
    OutputFile {
        path: String,
        component: String,
        #[source]
        source: std::io::Error,
    },

    /// One or more component values failed schema validation.
    #[error("Validation errors:\n\n{0}")]
    ValidationError(String),

    /// A terraform invocation exited unsuccessfully.
    #[error("terraform {command} failed: {details}.")]
    TerraformError { command: String, details: String },
}

/// Convenience type alias for results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// Prints the error message to stderr and exits with status code 1.
pub fn default_error_handler(err: Error) {
    eprintln!("Error: {err}");
    std::process::exit(1);
}
