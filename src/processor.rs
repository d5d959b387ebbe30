//! Rendering of catalog components into a cluster's GitOps tree.
//!
//! For every enabled component the processor lays out
//! `clusters/<name>/apps/<project>/<namespace>/<component>/` with a user-owned `custom/`
//! overlay (created once), a root `kustomization.yaml` (created once) and a `generated/`
//! directory that is rewritten on every run.

use crate::config::{Component, Site};
use crate::constants::{fragments, templates, KUSTOMIZATION_FILE, TEMPLATE_SUFFIX, VALUES_FILE};
use crate::error::{Error, Result};
use crate::renderer::TemplateSet;
use crate::workspace::{StackLayout, Workspace};
use globset::{Glob, GlobMatcher};
use indexmap::IndexMap;
use log::{debug, info};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const ROOT_FRAGMENT: &str = "root-kustomization";
const CUSTOM_KUSTOMIZATION_FRAGMENT: &str = "custom-kustomization";
const CUSTOM_VALUES_FRAGMENT: &str = "custom-values";

/// Data every component template is rendered with.
#[derive(Debug, Serialize)]
pub struct TemplateData<'a> {
    pub site: &'a Site,
    pub component: &'a Component,
    pub component_name: &'a str,
    pub components: &'a IndexMap<String, Component>,
}

impl<'a> TemplateData<'a> {
    pub fn new(site: &'a Site, component_name: &'a str, component: &'a Component) -> Self {
        Self { site, component, component_name, components: &site.spec.apps.catalog }
    }

    pub fn to_context(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Counts reported after a render run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderReport {
    pub components: usize,
    pub files: usize,
}

/// A component-specific template found in the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentTemplate {
    /// Logical name, the path relative to the stack directory.
    pub name: String,
    pub path: PathBuf,
    /// Output path relative to `generated/`, suffix stripped.
    pub output: PathBuf,
}

/// Output directories of one component.
#[derive(Debug, Clone)]
pub struct ComponentPaths {
    pub root: PathBuf,
    pub generated: PathBuf,
    pub custom: PathBuf,
    pub base: PathBuf,
}

impl ComponentPaths {
    pub fn new(root: PathBuf) -> Self {
        Self {
            generated: root.join("generated"),
            custom: root.join("custom"),
            base: root.join("base"),
            root,
        }
    }
}

/// Returns the output directories of every enabled component, in catalog order.
///
/// Fails on the first component without a project or namespace, before anything is written.
pub fn plan_components<'a>(
    workspace: &Workspace,
    site: &'a Site,
) -> Result<Vec<(&'a str, &'a Component, ComponentPaths)>> {
    let cluster = site.cluster_name()?;
    site.enabled_components()
        .map(|(name, component)| {
            let (project, namespace) = component.placement(name)?;
            let root = workspace.component_dir(cluster, project, namespace, name);
            Ok((name.as_str(), component, ComponentPaths::new(root)))
        })
        .collect()
}

/// Renders catalog components from a cached stack.
pub struct Processor<'a> {
    workspace: &'a Workspace,
    stack: &'a StackLayout,
    site: &'a Site,
    template_matcher: GlobMatcher,
}

impl<'a> Processor<'a> {
    pub fn new(workspace: &'a Workspace, stack: &'a StackLayout, site: &'a Site) -> Result<Self> {
        let template_matcher = Glob::new(&format!("*{TEMPLATE_SUFFIX}"))?.compile_matcher();
        Ok(Self { workspace, stack, site, template_matcher })
    }

    /// Renders every enabled component.
    pub fn process_all(&self) -> Result<RenderReport> {
        let components = plan_components(self.workspace, self.site)?;
        fs::create_dir_all(self.workspace.apps_dir(self.site.cluster_name()?))?;

        let mut report = RenderReport::default();
        for (name, component, paths) in components {
            report.files += self.process_component(name, component, &paths)?;
            report.components += 1;
        }
        Ok(report)
    }

    /// Lists `stack/apps/<component>/templates/**/*.tmpl`, sorted by path.
    pub fn find_component_templates(&self, component: &str) -> Result<Vec<ComponentTemplate>> {
        let dir = self.stack.app_templates_dir(component);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let stack_dir = self.stack.stack_dir();
        let mut found = Vec::new();
        for entry in WalkDir::new(&dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() || !self.template_matcher.is_match(entry.file_name())
            {
                continue;
            }
            let path = entry.path().to_path_buf();
            let name = relative(&path, &stack_dir)?.to_string_lossy().replace('\\', "/");
            let relative_output = relative(&path, &dir)?;
            let output = strip_template_suffix(relative_output);
            found.push(ComponentTemplate { name, path, output });
        }
        Ok(found)
    }

    /// Renders one component and returns the number of files written.
    pub fn process_component(
        &self,
        name: &str,
        component: &Component,
        paths: &ComponentPaths,
    ) -> Result<usize> {
        debug!("Rendering component {name} into {}", paths.root.display());
        fs::create_dir_all(&paths.generated)?;
        fs::create_dir_all(&paths.custom)?;

        let data = TemplateData::new(self.site, name, component);
        let context = data.to_context()?;
        let mut written = 0;

        let root_kustomization = paths.root.join(KUSTOMIZATION_FILE);
        if !root_kustomization.exists() {
            self.render_scaffold(
                name,
                templates::ROOT,
                ROOT_FRAGMENT,
                true,
                &context,
                &root_kustomization,
            )?;
            written += 1;
        }

        let custom_values = paths.custom.join(VALUES_FILE);
        if !custom_values.exists() {
            self.render_scaffold(
                name,
                templates::CUSTOM_VALUES,
                CUSTOM_VALUES_FRAGMENT,
                false,
                &context,
                &custom_values,
            )?;
            written += 1;
        }

        let custom_kustomization = paths.custom.join(KUSTOMIZATION_FILE);
        if !custom_kustomization.exists() {
            self.render_scaffold(
                name,
                templates::CUSTOM_KUSTOMIZATION,
                CUSTOM_KUSTOMIZATION_FRAGMENT,
                true,
                &context,
                &custom_kustomization,
            )?;
            written += 1;
        }

        let mut set = TemplateSet::new(name);
        let templates_dir = self.stack.templates_dir();
        set.add_file(fragments::HEADER, templates_dir.join(templates::HEADER))?;
        set.add_file(fragments::BASE, templates_dir.join(templates::BASE))?;

        let component_templates = self.find_component_templates(name)?;
        if component_templates.is_empty() {
            set.render_to_file(
                fragments::BASE,
                &context,
                paths.generated.join(KUSTOMIZATION_FILE),
            )?;
            return Ok(written + 1);
        }

        for template in &component_templates {
            set.add_file(&template.name, &template.path)?;
        }
        for template in &component_templates {
            let output = paths.generated.join(&template.output);
            if let Some(parent) = output.parent() {
                fs::create_dir_all(parent)?;
            }
            set.render_to_file(&template.name, &context, &output)?;
            written += 1;
        }
        Ok(written)
    }

    /// Renders a scaffold file from its own template set, optionally with the shared header.
    fn render_scaffold(
        &self,
        owner: &str,
        template_file: &str,
        fragment: &str,
        with_header: bool,
        context: &serde_json::Value,
        output: &Path,
    ) -> Result<()> {
        let templates_dir = self.stack.templates_dir();
        let mut set = TemplateSet::new(owner);
        if with_header {
            set.add_file(fragments::HEADER, templates_dir.join(templates::HEADER))?;
        }
        set.add_file(fragment, templates_dir.join(template_file))?;
        set.render_to_file(fragment, context, output)?;
        info!("Created {}", output.display());
        Ok(())
    }
}

fn relative<'p>(path: &'p Path, base: &Path) -> Result<&'p Path> {
    path.strip_prefix(base).map_err(|e| Error::ConfigError(e.to_string()))
}

/// `kustomization.yaml.tmpl` -> `kustomization.yaml`, keeping parent directories.
pub fn strip_template_suffix(path: &Path) -> PathBuf {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(file) => match file.strip_suffix(TEMPLATE_SUFFIX) {
            Some(stripped) => path.with_file_name(stripped),
            None => path.to_path_buf(),
        },
        None => path.to_path_buf(),
    }
}
