//! Common constants used throughout klabctl.

/// Default site file path.
pub const DEFAULT_SITE_FILE: &str = "site.yaml";

/// Hidden tool directory at the workspace root.
pub const KLABCTL_DIR: &str = ".klabctl";

/// Default stack repository used by `init` and `get defaults`.
pub const DEFAULT_STACK_SOURCE: &str = "https://github.com/bamaas/klabctl";

/// Default stack ref used by `init` and `get defaults`.
pub const DEFAULT_STACK_REF: &str = "main";

/// Default cluster name used by `get defaults`.
pub const DEFAULT_CLUSTER_NAME: &str = "my-cluster";

pub const API_VERSION: &str = "klab/v1alpha1";
pub const SITE_KIND: &str = "Site";

/// Suffix identifying template files inside the stack.
pub const TEMPLATE_SUFFIX: &str = ".tmpl";

/// Stack template file names (under `stack/templates`).
pub mod templates {
    pub const HEADER: &str = "header.kustomization.yaml.tmpl";
    pub const BASE: &str = "base.kustomization.yaml.tmpl";
    pub const ROOT: &str = "root.kustomization.yaml.tmpl";
    pub const CUSTOM_KUSTOMIZATION: &str = "custom.kustomization.yaml.tmpl";
    pub const CUSTOM_VALUES: &str = "custom.values.yaml.tmpl";

    /// Infra templates (under `stack/infra/templates`).
    pub const TERRAFORM_MAIN: &str = "main.tf.tmpl";
    pub const TERRAFORM_TFVARS: &str = "terraform.tfvars.json.tmpl";
}

/// Logical names the composed template fragments are registered under.
pub mod fragments {
    pub const HEADER: &str = "header";
    pub const BASE: &str = "base";
}

/// Generated file names.
pub const KUSTOMIZATION_FILE: &str = "kustomization.yaml";
pub const VALUES_FILE: &str = "values.yaml";
pub const HELM_CHART_FILE: &str = "helm-chart.yaml";
pub const SCHEMA_FILE: &str = "schema.yaml";
pub const META_FILE: &str = "meta.yaml";
pub const TERRAFORM_MAIN_FILE: &str = "main.tf";
pub const TERRAFORM_TFVARS_FILE: &str = "terraform.tfvars.json";

/// Path from a vendored base directory to the user-owned values overlay.
pub const CUSTOM_VALUES_REF: &str = "../custom/values.yaml";

/// Terraform module source as seen from `infra/generated`.
pub const TERRAFORM_MODULE_SOURCE: &str = "../../base";

/// Default VM image content type.
pub const DEFAULT_IMAGE_CONTENT_TYPE: &str = "iso";
