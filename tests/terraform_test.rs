mod common;

use std::fs;
use std::path::Path;

use common::StackRepo;
use klabctl::cli::GenerateArgs;
use klabctl::commands::generate;
use klabctl::workspace::Workspace;
use tempfile::TempDir;

const MAIN_TF: &str = "module \"cluster\" {
  source = {{ module_source | quote }}
  cluster_name = {{ site.spec.infra.cluster.name | quote }}
  image_content_type = {{ talos_image_content_type | quote }}
}
";

const TFVARS: &str = "{
  \"controlplanes\": {{ site.spec.infra.nodeData.controlplanes | tojson }},
  \"provider\": {{ site.spec.infra.providers[site.spec.infra.provider] | tojson }}
}
";

fn infra_site(source: &str) -> String {
    format!(
        "apiVersion: klab/v1alpha1
kind: Site
metadata:
  name: lab
spec:
  stack:
    source: {source}
    ref: main
  infra:
    provider: proxmox
    providers:
      proxmox:
        endpoint: https://pve.local:8006
    cluster:
      name: lab
      endpoint: 192.168.1.100
    nodeData:
      controlplanes:
        cp-1:
          hostNode: pve1
          vmId: 101
          ip: 192.168.1.101
          cpu: 2
          memory: 4096
          diskSize: 32
  apps:
    catalog: {{}}
"
    )
}

#[test_log::test]
fn test_generate_writes_terraform_root() {
    let repo = StackRepo::new();
    repo.add_file("stack/infra/base/main.tf", "variable \"controlplanes\" {}\n");
    repo.add_file("stack/infra/templates/main.tf.tmpl", MAIN_TF);
    repo.add_file("stack/infra/templates/terraform.tfvars.json.tmpl", TFVARS);
    repo.commit("infra");

    let workspace = TempDir::new().unwrap();
    fs::write(workspace.path().join("site.yaml"), infra_site(&repo.source())).unwrap();
    generate::run(
        &Workspace::new(workspace.path()),
        Path::new("site.yaml"),
        &GenerateArgs { skip_validation: false },
    )
    .unwrap();

    let infra = workspace.path().join("clusters/lab/infra");
    assert!(infra.join("base/main.tf").is_file());

    let main_tf = fs::read_to_string(infra.join("generated/main.tf")).unwrap();
    assert!(main_tf.contains("source = \"../../base\""));
    assert!(main_tf.contains("cluster_name = \"lab\""));
    assert!(main_tf.contains("image_content_type = \"iso\""));

    let tfvars: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(infra.join("generated/terraform.tfvars.json")).unwrap())
            .unwrap();
    assert_eq!(tfvars["controlplanes"]["cp-1"]["vmId"], 101);
    assert_eq!(tfvars["provider"]["endpoint"], "https://pve.local:8006");
}

#[test]
fn test_missing_infra_base_is_an_error() {
    let repo = StackRepo::new();
    let workspace = TempDir::new().unwrap();
    fs::write(workspace.path().join("site.yaml"), infra_site(&repo.source())).unwrap();

    let err = generate::run(
        &Workspace::new(workspace.path()),
        Path::new("site.yaml"),
        &GenerateArgs { skip_validation: true },
    )
    .unwrap_err();
    assert!(err.to_string().contains("infra base not found"));
}
