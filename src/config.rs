//! Site configuration handling for klabctl.
//! Parses a `site.yaml` document into typed structures shared by every command.

use crate::error::{Error, Result};
use crate::value::Values;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use url::Url;

/// Root site document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: Spec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spec {
    #[serde(default)]
    pub stack: Stack,
    #[serde(default)]
    pub infra: Infra,
    #[serde(default)]
    pub apps: Apps,
}

/// Coordinates of the template stack repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stack {
    #[serde(default)]
    pub source: String,
    #[serde(default, alias = "version")]
    pub r#ref: String,
}

/// Infrastructure description consumed by the Terraform templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Infra {
    /// Name of the active provider, a key of `providers`. Empty disables infra generation.
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub providers: BTreeMap<String, Values>,
    #[serde(default)]
    pub cluster: ClusterNetwork,
    #[serde(default)]
    pub talos_image: VmImage,
    #[serde(default)]
    pub node_data: NodeData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterNetwork {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub gateway: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_mask: Option<u8>,
    #[serde(default)]
    pub dns_servers: Vec<String>,
    #[serde(default)]
    pub talos_version: String,
    #[serde(default)]
    pub kubernetes_version: String,
}

/// VM image descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmImage {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub schematic: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datastore: Option<String>,
}

/// Nodes keyed by node name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default)]
    pub controlplanes: IndexMap<String, NodeConfig>,
    #[serde(default)]
    pub workers: IndexMap<String, NodeConfig>,
}

/// A single VM.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Hypervisor node the VM is placed on.
    #[serde(default)]
    pub host_node: String,
    #[serde(default)]
    pub vm_id: u32,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub cpu: u32,
    /// Memory in MiB.
    #[serde(default)]
    pub memory: u64,
    /// Disk size in GiB.
    #[serde(default)]
    pub disk_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datastore: Option<String>,
    #[serde(default)]
    pub start_on_boot: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Apps {
    #[serde(default)]
    pub catalog: IndexMap<String, Component>,
}

/// One deployable application unit of the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Component {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub values: Values,
}

impl Component {
    /// Returns `(project, namespace)` or a configuration error naming the component.
    pub fn placement(&self, name: &str) -> Result<(&str, &str)> {
        if self.project.is_empty() {
            return Err(Error::ConfigError(format!("project is required for app {name}")));
        }
        if self.namespace.is_empty() {
            return Err(Error::ConfigError(format!("namespace is required for app {name}")));
        }
        Ok((&self.project, &self.namespace))
    }
}

impl Site {
    /// Parses a site from YAML text.
    pub fn parse(content: &str) -> Result<Self> {
        let site: Site = serde_yaml::from_str(content).map_err(|e| {
            Error::ConfigError(format!("failed to parse site YAML: {e}"))
        })?;
        Ok(site)
    }

    /// Loads a site from a file, reporting a missing file distinctly.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::SiteNotFound { path: path.display().to_string() });
        }
        debug!("Loading site from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Cluster name from `metadata.name`, required by every command that writes output.
    pub fn cluster_name(&self) -> Result<&str> {
        if self.metadata.name.is_empty() {
            return Err(Error::ConfigError("metadata.name is required".to_string()));
        }
        Ok(&self.metadata.name)
    }

    /// Checks `spec.stack` and returns `(source, ref)`.
    pub fn validate_stack(&self) -> Result<(&str, &str)> {
        let stack = &self.spec.stack;
        if stack.source.is_empty() || stack.r#ref.is_empty() {
            return Err(Error::ConfigError(
                "stack.source and stack.ref are required in site.yaml".to_string(),
            ));
        }
        validate_stack_source(&stack.source)?;
        Ok((&stack.source, &stack.r#ref))
    }

    /// Enabled components in catalog order.
    pub fn enabled_components(&self) -> impl Iterator<Item = (&String, &Component)> {
        self.spec.apps.catalog.iter().filter(|(_, c)| c.enabled)
    }

    pub fn has_infra(&self) -> bool {
        !self.spec.infra.provider.is_empty()
    }
}

/// Tool state kept in `.klabctl/config.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolConfig {
    pub stack: Stack,
}

impl ToolConfig {
    pub fn new(source: &str, r#ref: &str) -> Self {
        Self { stack: Stack { source: source.to_string(), r#ref: r#ref.to_string() } }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }
}

/// Accepts git remote URLs, scp-like `git@host:path` addresses and existing local paths.
pub fn validate_stack_source(source: &str) -> Result<()> {
    if let Ok(url) = Url::parse(source) {
        return match url.scheme() {
            "https" | "http" | "ssh" | "git" | "file" => Ok(()),
            scheme => Err(Error::ConfigError(format!(
                "unsupported stack source scheme '{scheme}' in {source}"
            ))),
        };
    }
    if source.starts_with("git@") || Path::new(source).exists() {
        return Ok(());
    }
    Err(Error::ConfigError(format!(
        "stack source '{source}' is neither a git URL nor an existing path"
    )))
}

/// Checks a stack ref before it is used as a cache directory name.
pub fn validate_stack_ref(r#ref: &str) -> Result<()> {
    if r#ref.is_empty() {
        return Err(Error::ConfigError("stack ref must not be empty".to_string()));
    }
    if r#ref.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(Error::ConfigError(format!("invalid stack ref '{}'", r#ref)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    const SITE: &str = r#"
apiVersion: klab/v1alpha1
kind: Site
metadata:
  name: homelab
spec:
  stack:
    source: https://github.com/example/stack
    ref: v1.2.0
  infra:
    provider: proxmox
    providers:
      proxmox:
        endpoint: https://pve.local:8006
        insecure: true
    cluster:
      name: homelab
      endpoint: 192.168.1.100
      gateway: 192.168.1.1
      subnetMask: 24
    talosImage:
      version: v1.9.0
    nodeData:
      controlplanes:
        cp-1:
          hostNode: pve1
          vmId: 101
          ip: 192.168.1.101
          cpu: 2
          memory: 4096
          diskSize: 32
          startOnBoot: true
      workers: {}
  apps:
    catalog:
      pihole:
        enabled: true
        project: net
        namespace: dns
        values:
          ip: 192.168.1.150
      cert-manager:
        enabled: false
"#;

    #[test]
    fn test_parse_site() {
        let site = Site::parse(SITE).unwrap();
        assert_eq!(site.metadata.name, "homelab");
        assert_eq!(site.spec.stack.r#ref, "v1.2.0");
        assert!(site.has_infra());
        assert_eq!(
            site.spec.infra.providers["proxmox"]["insecure"],
            Value::Bool(true)
        );
        let cp = &site.spec.infra.node_data.controlplanes["cp-1"];
        assert_eq!(cp.vm_id, 101);
        assert_eq!(cp.host_node, "pve1");
        assert!(cp.start_on_boot);
        assert_eq!(site.spec.infra.cluster.subnet_mask, Some(24));
    }

    #[test]
    fn test_enabled_components_keep_catalog_order() {
        let site = Site::parse(SITE).unwrap();
        let names: Vec<_> = site.enabled_components().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["pihole"]);
    }

    #[test]
    fn test_stack_version_alias() {
        let site = Site::parse("spec:\n  stack:\n    source: git@github.com:x/y\n    version: main\n")
            .unwrap();
        assert_eq!(site.validate_stack().unwrap(), ("git@github.com:x/y", "main"));
    }

    #[test]
    fn test_missing_stack_is_config_error() {
        let site = Site::parse("metadata:\n  name: x\n").unwrap();
        assert!(matches!(site.validate_stack(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_stack_source_schemes() {
        assert!(validate_stack_source("https://github.com/x/y.git").is_ok());
        assert!(validate_stack_source("git@github.com:x/y.git").is_ok());
        assert!(validate_stack_source("ftp://example.com/repo").is_err());
        assert!(validate_stack_source("no/such/local/path").is_err());
    }

    #[test]
    fn test_stack_ref_rules() {
        assert!(validate_stack_ref("main").is_ok());
        assert!(validate_stack_ref("feature/x").is_ok());
        assert!(validate_stack_ref("").is_err());
        assert!(validate_stack_ref("../escape").is_err());
        assert!(validate_stack_ref("a//b").is_err());
    }

    #[test]
    fn test_component_placement() {
        let component = Component { enabled: true, project: "net".into(), ..Default::default() };
        let err = component.placement("pihole").unwrap_err();
        assert!(err.to_string().contains("namespace is required for app pihole"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Site::load("/definitely/not/here/site.yaml").unwrap_err();
        assert!(matches!(err, Error::SiteNotFound { .. }));
    }
}
