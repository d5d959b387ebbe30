//! Vendoring of stack bases into a cluster tree.
//!
//! Each enabled component's `stack/apps/<component>/base` is copied to the component's
//! `base/` directory, replacing what was there, and its `helm-chart.yaml` is pointed at
//! the user-owned `custom/values.yaml`.

use crate::config::Site;
use crate::constants::{CUSTOM_VALUES_REF, HELM_CHART_FILE};
use crate::copy::replace_dir;
use crate::error::{Error, Result};
use crate::processor::plan_components;
use crate::workspace::{StackLayout, Workspace};
use log::{debug, info, warn};
use serde_yaml::Value;
use std::fs;
use std::path::Path;

const ADDITIONAL_VALUES_FILES: &str = "additionalValuesFiles";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VendorReport {
    pub apps: usize,
    pub skipped: usize,
    pub infra: bool,
}

/// Copies every enabled component's base from the stack into the cluster tree.
pub fn vendor_apps(workspace: &Workspace, stack: &StackLayout, site: &Site) -> Result<VendorReport> {
    let mut report = VendorReport::default();

    for (name, _, paths) in plan_components(workspace, site)? {
        let source = stack.app_base_dir(name);
        if !source.is_dir() {
            warn!("app '{name}' has no base in the stack, skipping");
            report.skipped += 1;
            continue;
        }

        debug!("Vendoring {name} to {}", paths.base.display());
        replace_dir(&source, &paths.base)?;

        let helm_chart = paths.base.join(HELM_CHART_FILE);
        if helm_chart.is_file() {
            add_additional_values_file(&helm_chart, CUSTOM_VALUES_REF).map_err(|e| {
                Error::ConfigError(format!("failed to modify {HELM_CHART_FILE} for {name}: {e}"))
            })?;
        }
        report.apps += 1;
    }

    Ok(report)
}

/// Copies `stack/infra/base` to `clusters/<name>/infra/base`. Returns false if the stack has none.
pub fn vendor_infra(workspace: &Workspace, stack: &StackLayout, site: &Site) -> Result<bool> {
    let source = stack.infra_base_dir();
    if !source.is_dir() {
        return Ok(false);
    }
    let dest = workspace.infra_base_dir(site.cluster_name()?);
    debug!("Vendoring infra base to {}", dest.display());
    replace_dir(&source, &dest)?;
    Ok(true)
}

/// Vendors apps, then the infra base.
pub fn vendor(workspace: &Workspace, stack: &StackLayout, site: &Site) -> Result<VendorReport> {
    let mut report = vendor_apps(workspace, stack, site)?;
    report.infra = vendor_infra(workspace, stack, site)?;
    info!(
        "✓ Vendored {} app base(s){}",
        report.apps,
        if report.infra { " and the infra base" } else { "" }
    );
    Ok(report)
}

/// Appends `values_file` to the `additionalValuesFiles` list of a helm chart manifest,
/// creating the list when absent. Does nothing if the entry is already there or the key
/// holds something other than a list.
///
/// The document is rewritten from its parsed form, so comments in the vendored copy are
/// dropped. The stack's original file is unaffected.
pub fn add_additional_values_file(helm_chart: &Path, values_file: &str) -> Result<()> {
    let content = fs::read_to_string(helm_chart)?;
    let mut document: Value = serde_yaml::from_str(&content)?;

    let root = match &mut document {
        Value::Mapping(map) => map,
        Value::Null => {
            return Err(Error::ConfigError("empty YAML document".to_string()));
        }
        _ => return Err(Error::ConfigError("expected YAML mapping".to_string())),
    };

    let entry = Value::String(values_file.to_string());
    let key = Value::String(ADDITIONAL_VALUES_FILES.to_string());
    match root.get_mut(&key) {
        Some(Value::Sequence(items)) => {
            if items.contains(&entry) {
                return Ok(());
            }
            items.push(entry);
        }
        Some(other) => {
            debug!("Leaving non-list {ADDITIONAL_VALUES_FILES} untouched: {other:?}");
            return Ok(());
        }
        None => {
            root.insert(key, Value::Sequence(vec![entry]));
        }
    }

    fs::write(helm_chart, serde_yaml::to_string(&document)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn chart(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(HELM_CHART_FILE);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_adds_list_when_absent() {
        let dir = TempDir::new().unwrap();
        let path = chart(&dir, "name: pihole\nversion: 2.0.0\n");
        add_additional_values_file(&path, CUSTOM_VALUES_REF).unwrap();
        let doc: Value = serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            doc[ADDITIONAL_VALUES_FILES],
            Value::Sequence(vec![Value::String(CUSTOM_VALUES_REF.to_string())])
        );
        assert_eq!(doc["name"], Value::String("pihole".to_string()));
    }

    #[test]
    fn test_appends_once() {
        let dir = TempDir::new().unwrap();
        let path = chart(&dir, "additionalValuesFiles:\n  - ../base/extra.yaml\n");
        add_additional_values_file(&path, CUSTOM_VALUES_REF).unwrap();
        add_additional_values_file(&path, CUSTOM_VALUES_REF).unwrap();
        let doc: Value = serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let items = doc[ADDITIONAL_VALUES_FILES].as_sequence().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1], Value::String(CUSTOM_VALUES_REF.to_string()));
    }

    #[test]
    fn test_non_list_entry_is_left_alone() {
        let dir = TempDir::new().unwrap();
        let content = "name: pihole\nadditionalValuesFiles: ../base/extra.yaml\n";
        let path = chart(&dir, content);
        add_additional_values_file(&path, CUSTOM_VALUES_REF).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_rejects_empty_document() {
        let dir = TempDir::new().unwrap();
        let path = chart(&dir, "");
        assert!(add_additional_values_file(&path, CUSTOM_VALUES_REF).is_err());
    }
}
