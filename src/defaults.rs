//! Default site documents assembled from a cached stack.

use crate::constants::{API_VERSION, META_FILE, SITE_KIND, VALUES_FILE};
use crate::error::{Error, Result};
use crate::workspace::StackLayout;
use log::debug;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// Reads a YAML mapping, treating a missing file as empty.
fn load_mapping(path: &Path) -> Result<Mapping> {
    if !path.is_file() {
        return Ok(Mapping::new());
    }
    let content = fs::read_to_string(path)?;
    match serde_yaml::from_str::<Value>(&content)
        .map_err(|e| Error::ConfigError(format!("failed to parse {}: {e}", path.display())))?
    {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(Error::ConfigError(format!("{} must contain a YAML mapping", path.display()))),
    }
}

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

/// Infra defaults from `stack/infra/templates/values.yaml` with `cluster.name` set.
pub fn infra_defaults(stack: &StackLayout, cluster: &str) -> Result<Mapping> {
    let mut infra = load_mapping(&stack.infra_templates_dir().join(VALUES_FILE))?;
    if let Some(Value::Mapping(network)) = infra.get_mut(key("cluster")) {
        network.insert(key("name"), key(cluster));
    }
    Ok(infra)
}

/// Catalog entries for every app that ships a `meta.yaml` or `values.yaml`, sorted by name.
///
/// Each entry is the app's meta fields plus its default `values`.
pub fn catalog_defaults(stack: &StackLayout) -> Result<Mapping> {
    let mut catalog = Mapping::new();
    let apps_dir = stack.apps_dir();
    if !apps_dir.is_dir() {
        return Ok(catalog);
    }

    let mut entries: Vec<_> = fs::read_dir(&apps_dir)?.collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let app_dir = entry.path();
        let meta_path = app_dir.join(META_FILE);
        let values_path = app_dir.join(VALUES_FILE);
        if !meta_path.is_file() && !values_path.is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        debug!("Collecting defaults for {name}");
        let mut app = load_mapping(&meta_path)?;
        let values = load_mapping(&values_path)?;
        if !values.is_empty() {
            app.insert(key("values"), Value::Mapping(values));
        }
        catalog.insert(key(&name), Value::Mapping(app));
    }

    Ok(catalog)
}

/// Builds the default `site.yaml` for `cluster` from the stack cached at `stack`.
pub fn site_defaults(stack: &StackLayout, source: &str, r#ref: &str, cluster: &str) -> Result<String> {
    let mut stack_coordinates = Mapping::new();
    stack_coordinates.insert(key("source"), key(source));
    stack_coordinates.insert(key("ref"), key(r#ref));

    let mut apps = Mapping::new();
    apps.insert(key("catalog"), Value::Mapping(catalog_defaults(stack)?));

    let mut spec = Mapping::new();
    spec.insert(key("stack"), Value::Mapping(stack_coordinates));
    spec.insert(key("infra"), Value::Mapping(infra_defaults(stack, cluster)?));
    spec.insert(key("apps"), Value::Mapping(apps));

    let mut metadata = Mapping::new();
    metadata.insert(key("name"), key(cluster));

    let mut site = Mapping::new();
    site.insert(key("apiVersion"), key(API_VERSION));
    site.insert(key("kind"), key(SITE_KIND));
    site.insert(key("metadata"), Value::Mapping(metadata));
    site.insert(key("spec"), Value::Mapping(spec));

    Ok(serde_yaml::to_string(&Value::Mapping(site))?)
}
