//! Fixtures shared by the integration tests: a throwaway stack repository and site files.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub const HEADER: &str = "# Generated by klabctl - do not edit\n";
pub const BASE: &str = "{% include \"header\" %}apiVersion: kustomize.config.k8s.io/v1beta1\n\
kind: Kustomization\nnamespace: {{ component.namespace }}\nresources:\n  - ../base\n";
pub const ROOT: &str = "{% include \"header\" %}resources:\n  - generated\n  - custom\n";
pub const CUSTOM_KUSTOMIZATION: &str =
    "{% include \"header\" %}apiVersion: kustomize.config.k8s.io/v1beta1\nkind: Kustomization\n";
pub const CUSTOM_VALUES: &str = "# Custom values for {{ component_name }}\n";

/// Runs git in `dir` with a fixed identity, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args([
            "-c",
            "user.name=klabctl",
            "-c",
            "user.email=klabctl@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .status()
        .unwrap();
    assert!(status.success(), "git {} failed", args.join(" "));
}

pub fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A local stack repository on branch `main`.
pub struct StackRepo {
    pub dir: TempDir,
}

impl StackRepo {
    /// Creates the minimal layout: shared templates and an empty apps directory.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        git(root, &["init", "--quiet"]);
        git(root, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        let templates = root.join("stack/templates");
        write(&templates.join("header.kustomization.yaml.tmpl"), HEADER);
        write(&templates.join("base.kustomization.yaml.tmpl"), BASE);
        write(&templates.join("root.kustomization.yaml.tmpl"), ROOT);
        write(&templates.join("custom.kustomization.yaml.tmpl"), CUSTOM_KUSTOMIZATION);
        write(&templates.join("custom.values.yaml.tmpl"), CUSTOM_VALUES);
        write(&root.join("stack/apps/.gitkeep"), "");

        let repo = Self { dir };
        repo.commit("initial stack");
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn source(&self) -> String {
        self.path().display().to_string()
    }

    /// Writes a file relative to the repository root. Call [`StackRepo::commit`] afterwards.
    pub fn add_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path().join(relative);
        write(&path, content);
        path
    }

    pub fn commit(&self, message: &str) {
        git(self.path(), &["add", "-A"]);
        git(self.path(), &["commit", "--quiet", "-m", message]);
    }

    pub fn tag(&self, name: &str) {
        git(self.path(), &["tag", name]);
    }
}

/// A site.yaml pointing at `source@ref` with the given catalog block (indented YAML).
pub fn site_yaml(name: &str, source: &str, stack_ref: &str, catalog: &str) -> String {
    format!(
        "apiVersion: klab/v1alpha1
kind: Site
metadata:
  name: {name}
spec:
  stack:
    source: {source}
    ref: {stack_ref}
  apps:
    catalog:
{catalog}"
    )
}
