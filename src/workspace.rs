//! On-disk layout of a klabctl workspace.
//!
//! Every path the tool reads or writes is derived here from a single root, which is the
//! current directory when running the CLI.

use crate::constants::KLABCTL_DIR;
use crate::error::Result;
use std::path::{Path, PathBuf};

const GITIGNORE_ALL: &str = "# Created by klabctl - Ignore all files in this directory.\n*\n";

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Workspace rooted at the current directory.
    pub fn current() -> Self {
        Self::new(".")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a user supplied path against the workspace root.
    pub fn resolve<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn klabctl_dir(&self) -> PathBuf {
        self.root.join(KLABCTL_DIR)
    }

    pub fn tool_config_path(&self) -> PathBuf {
        self.klabctl_dir().join("config.yaml")
    }

    pub fn stack_cache_root(&self) -> PathBuf {
        self.klabctl_dir().join("cache").join("stack")
    }

    /// Cached working copy for a stack ref.
    pub fn stack_cache_dir(&self, r#ref: &str) -> PathBuf {
        self.stack_cache_root().join(r#ref)
    }

    /// Creates `.klabctl/` and its catch-all `.gitignore` if missing.
    pub fn ensure_klabctl_dir(&self) -> Result<()> {
        let dir = self.klabctl_dir();
        std::fs::create_dir_all(&dir)?;
        let gitignore = dir.join(".gitignore");
        if !gitignore.exists() {
            std::fs::write(gitignore, GITIGNORE_ALL)?;
        }
        Ok(())
    }

    pub fn cluster_dir(&self, cluster: &str) -> PathBuf {
        self.root.join("clusters").join(cluster)
    }

    pub fn apps_dir(&self, cluster: &str) -> PathBuf {
        self.cluster_dir(cluster).join("apps")
    }

    pub fn component_dir(
        &self,
        cluster: &str,
        project: &str,
        namespace: &str,
        component: &str,
    ) -> PathBuf {
        self.apps_dir(cluster).join(project).join(namespace).join(component)
    }

    pub fn infra_dir(&self, cluster: &str) -> PathBuf {
        self.cluster_dir(cluster).join("infra")
    }

    pub fn infra_base_dir(&self, cluster: &str) -> PathBuf {
        self.infra_dir(cluster).join("base")
    }

    pub fn terraform_dir(&self, cluster: &str) -> PathBuf {
        self.infra_dir(cluster).join("generated")
    }
}

/// Paths inside a cached stack checkout.
#[derive(Debug, Clone)]
pub struct StackLayout {
    root: PathBuf,
}

impl StackLayout {
    pub fn new<P: Into<PathBuf>>(checkout: P) -> Self {
        Self { root: checkout.into() }
    }

    pub fn stack_dir(&self) -> PathBuf {
        self.root.join("stack")
    }

    pub fn apps_dir(&self) -> PathBuf {
        self.stack_dir().join("apps")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.stack_dir().join("templates")
    }

    pub fn app_dir(&self, component: &str) -> PathBuf {
        self.apps_dir().join(component)
    }

    pub fn app_base_dir(&self, component: &str) -> PathBuf {
        self.app_dir(component).join("base")
    }

    pub fn app_templates_dir(&self, component: &str) -> PathBuf {
        self.app_dir(component).join("templates")
    }

    pub fn infra_base_dir(&self) -> PathBuf {
        self.stack_dir().join("infra").join("base")
    }

    pub fn infra_templates_dir(&self) -> PathBuf {
        self.stack_dir().join("infra").join("templates")
    }

    /// Subdirectories a usable cache must contain.
    pub fn required_dirs(&self) -> [PathBuf; 3] {
        [self.stack_dir(), self.apps_dir(), self.templates_dir()]
    }
}
