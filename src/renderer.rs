//! Template composition and rendering for klabctl.
//!
//! Stack templates are loaded into a [`TemplateSet`], a registry of named fragments that
//! share one MiniJinja environment. Fragments refer to each other by their logical name
//! (`{% include "header" %}`, `{% extends "base" %}`), and rendering resolves the target
//! fragment by name.
use crate::error::{Error, Result};
use log::debug;
use minijinja::{Environment, UndefinedBehavior, Value};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Wraps a value in double quotes for YAML/JSON output.
pub fn quote(value: Value) -> String {
    match value.as_str() {
        Some(s) => format!("\"{s}\""),
        None => format!("\"{value}\""),
    }
}

/// Creates the environment shared by every template set.
pub fn new_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.set_undefined_behavior(UndefinedBehavior::Chainable);
    env.add_filter("quote", quote);
    env.add_function("quote", quote);
    env
}

/// Named template fragments parsed into one namespace.
pub struct TemplateSet {
    /// MiniJinja environment holding every registered fragment
    env: Environment<'static>,
    /// Component (or scaffold) the set renders for, used in error messages
    owner: String,
}

impl TemplateSet {
    /// Creates an empty set rendering on behalf of `owner`.
    pub fn new<S: Into<String>>(owner: S) -> Self {
        Self { env: new_environment(), owner: owner.into() }
    }

    /// Registers `source` under `name`.
    ///
    /// # Errors
    /// * `Error::TemplateParse` if the source does not compile
    pub fn add(&mut self, name: &str, source: String) -> Result<()> {
        self.env.add_template_owned(name.to_string(), source).map_err(|source| {
            Error::TemplateParse {
                template: name.to_string(),
                component: self.owner.clone(),
                source,
            }
        })
    }

    /// Reads a template file and registers it under `name`.
    ///
    /// # Errors
    /// * `Error::TemplateNotFound` if the file cannot be read
    /// * `Error::TemplateParse` if it does not compile
    pub fn add_file<P: AsRef<Path>>(&mut self, name: &str, path: P) -> Result<()> {
        let path = path.as_ref();
        debug!("Loading template '{}' from {}", name, path.display());
        let source = fs::read_to_string(path).map_err(|source| Error::TemplateNotFound {
            template: path.display().to_string(),
            component: self.owner.clone(),
            source,
        })?;
        self.add(name, source)
    }

    /// Renders the fragment registered under `name`.
    ///
    /// # Errors
    /// * `Error::TemplateRender` if the fragment is unknown or fails to execute
    pub fn render(&self, name: &str, context: &serde_json::Value) -> Result<String> {
        let render_error = |source| Error::TemplateRender {
            template: name.to_string(),
            component: self.owner.clone(),
            source,
        };
        let template = self.env.get_template(name).map_err(render_error)?;
        template.render(context).map_err(render_error)
    }

    /// Renders `name` and writes the result to `output`, truncating any existing file.
    ///
    /// The file is only created once rendering succeeded.
    ///
    /// # Errors
    /// * `Error::TemplateRender` if rendering fails
    /// * `Error::OutputFile` if the file cannot be written
    pub fn render_to_file<P: AsRef<Path>>(
        &self,
        name: &str,
        context: &serde_json::Value,
        output: P,
    ) -> Result<()> {
        let output = output.as_ref();
        let content = self.render(name, context)?;
        let output_error = |source| Error::OutputFile {
            path: output.display().to_string(),
            component: self.owner.clone(),
            source,
        };
        let mut file = fs::File::create(output).map_err(output_error)?;
        file.write_all(content.as_bytes()).map_err(output_error)?;
        debug!("Rendered '{}' to {}", name, output.display());
        Ok(())
    }
}
