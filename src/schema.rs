//! Component schemas and validation of a site's component values.
//!
//! Schemas are optional. A component without one is accepted as is; a component with one
//! has every declared field checked, and all failures across all components are reported
//! together.

use crate::config::{Component, Site};
use crate::constants::SCHEMA_FILE;
use crate::error::{Error, Result};
use crate::value::{lookup, Value};
use crate::workspace::StackLayout;
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSchema {
    #[serde(default)]
    pub component_name: String,
    #[serde(default)]
    pub schema_version: String,
    /// Field path (dot separated for nested values) to its rules.
    #[serde(default)]
    pub values: IndexMap<String, ValueSchema>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValueSchema {
    /// Fields without a type are only checked for presence.
    #[serde(rename = "type", default)]
    pub value_type: Option<ValueType>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub format: Option<Format>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub example: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Boolean,
    Number,
    Object,
}

impl ValueType {
    fn name(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::Object => "object",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ValueType::String, Value::String(_))
                | (ValueType::Boolean, Value::Bool(_))
                | (ValueType::Number, Value::Integer(_) | Value::Float(_))
                | (ValueType::Object, Value::Object(_))
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Ipv4,
    Hostname,
    Email,
}

impl Format {
    fn check(self, value: &str) -> bool {
        match self {
            Format::Ipv4 => is_valid_ipv4(value),
            Format::Hostname => is_valid_hostname(value),
            Format::Email => is_valid_email(value),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Format::Ipv4 => "IPv4 address",
            Format::Hostname => "hostname",
            Format::Email => "email",
        }
    }
}

/// Four dot-separated integers in 0..=255.
pub fn is_valid_ipv4(ip: &str) -> bool {
    let parts: Vec<&str> = ip.split('.').collect();
    parts.len() == 4 && parts.iter().all(|part| part.parse::<u8>().is_ok())
}

pub fn is_valid_hostname(hostname: &str) -> bool {
    !hostname.is_empty() && hostname.len() <= 253
}

pub fn is_valid_email(email: &str) -> bool {
    email.contains('@') && email.len() > 3
}

/// Reads `stack/apps/*/schema.yaml` from a cached stack, keyed by `componentName`.
pub fn discover_schemas(stack: &StackLayout) -> Result<IndexMap<String, ComponentSchema>> {
    let mut schemas = IndexMap::new();
    let apps_dir = stack.apps_dir();
    if !apps_dir.is_dir() {
        return Ok(schemas);
    }

    let mut entries: Vec<_> = fs::read_dir(&apps_dir)?.collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path().join(SCHEMA_FILE);
        if !path.is_file() {
            continue;
        }
        let content = fs::read_to_string(&path)?;
        let schema: ComponentSchema = serde_yaml::from_str(&content).map_err(|e| {
            Error::ConfigError(format!("failed to parse schema {}: {e}", path.display()))
        })?;
        if schema.component_name.is_empty() {
            return Err(Error::ConfigError(format!(
                "schema {} missing componentName field",
                path.display()
            )));
        }
        debug!("Discovered schema for {}", schema.component_name);
        schemas.insert(schema.component_name.clone(), schema);
    }

    Ok(schemas)
}

/// Validates one component's values, returning one message per failing field.
pub fn validate_component(
    name: &str,
    component: &Component,
    schema: &ComponentSchema,
) -> Vec<String> {
    let mut errors = Vec::new();

    for (field, rules) in &schema.values {
        let path = format!("{name}.values.{field}");
        let Some(value) = lookup(&component.values, field) else {
            if rules.required {
                errors.push(format!(
                    "[{name}] Required field missing: {path}\n  Description: {}\n  Example: {}",
                    rules.description, rules.example
                ));
            }
            continue;
        };

        let Some(value_type) = rules.value_type else {
            continue;
        };
        if !value_type.accepts(value) {
            errors.push(format!(
                "[{path}] Type mismatch: expected {}, got {}",
                value_type.name(),
                value.type_name()
            ));
            continue;
        }

        if let (Some(format), Some(s)) = (rules.format, value.as_str()) {
            if !format.check(s) {
                errors.push(format!("[{path}] Invalid {}: {s}", format.label()));
            }
        }
    }

    errors
}

/// Validates every enabled component that has a schema.
///
/// # Errors
/// * `Error::ValidationError` listing every failing field of every component
pub fn validate_site(site: &Site, schemas: &IndexMap<String, ComponentSchema>) -> Result<()> {
    if schemas.is_empty() {
        warn!("No component schemas found, skipping validation");
        return Ok(());
    }
    info!("Found {} component schema(s)", schemas.len());

    let mut all_errors = Vec::new();
    for (name, component) in site.enabled_components() {
        let Some(schema) = schemas.get(name) else {
            continue;
        };
        let errors = validate_component(name, component, schema);
        if errors.is_empty() {
            info!("  ✓ {name}: validated");
        } else {
            all_errors.extend(errors);
        }
    }

    if !all_errors.is_empty() {
        return Err(Error::ValidationError(all_errors.join("\n")));
    }
    info!("✓ All enabled components validated successfully");
    Ok(())
}
