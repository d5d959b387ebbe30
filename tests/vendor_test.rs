mod common;

use std::fs;
use std::path::Path;

use common::{site_yaml, StackRepo};
use klabctl::commands::vendor;
use klabctl::workspace::Workspace;
use tempfile::TempDir;

const CATALOG: &str = "      pihole:
        enabled: true
        project: net
        namespace: dns
      metallb:
        enabled: true
        project: network
        namespace: metallb-system
";

fn stack_with_bases() -> StackRepo {
    let repo = StackRepo::new();
    repo.add_file(
        "stack/apps/pihole/base/helm-chart.yaml",
        "name: pihole\nrepo: https://mojo2600.github.io/pihole-kubernetes/\nversion: 2.26.1\n",
    );
    repo.add_file("stack/apps/pihole/base/kustomization.yaml", "resources: []\n");
    repo.add_file("stack/infra/base/main.tf", "variable \"nodes\" {}\n");
    repo.commit("bases");
    repo
}

#[test_log::test]
fn test_vendor_copies_bases_and_patches_helm_chart() {
    let repo = stack_with_bases();
    let workspace = TempDir::new().unwrap();
    fs::write(workspace.path().join("site.yaml"), site_yaml("lab", &repo.source(), "main", CATALOG))
        .unwrap();

    let report = vendor::run(&Workspace::new(workspace.path()), Path::new("site.yaml")).unwrap();
    assert_eq!(report.apps, 1);
    assert_eq!(report.skipped, 1);
    assert!(report.infra);

    let base = workspace.path().join("clusters/lab/apps/net/dns/pihole/base");
    assert_eq!(
        fs::read_to_string(base.join("kustomization.yaml")).unwrap(),
        "resources: []\n"
    );
    let chart: serde_yaml::Value =
        serde_yaml::from_str(&fs::read_to_string(base.join("helm-chart.yaml")).unwrap()).unwrap();
    assert_eq!(chart["additionalValuesFiles"][0].as_str(), Some("../custom/values.yaml"));
    assert_eq!(chart["version"].as_str(), Some("2.26.1"));

    assert!(workspace.path().join("clusters/lab/infra/base/main.tf").is_file());
    assert!(!workspace.path().join("clusters/lab/apps/network").exists());
}

#[test]
fn test_vendor_replaces_previous_base() {
    let repo = stack_with_bases();
    let workspace = TempDir::new().unwrap();
    fs::write(workspace.path().join("site.yaml"), site_yaml("lab", &repo.source(), "main", CATALOG))
        .unwrap();
    let ws = Workspace::new(workspace.path());

    vendor::run(&ws, Path::new("site.yaml")).unwrap();
    let base = workspace.path().join("clusters/lab/apps/net/dns/pihole/base");
    fs::write(base.join("local-only.yaml"), "kind: ConfigMap\n").unwrap();

    vendor::run(&ws, Path::new("site.yaml")).unwrap();
    assert!(!base.join("local-only.yaml").exists());

    let chart: serde_yaml::Value =
        serde_yaml::from_str(&fs::read_to_string(base.join("helm-chart.yaml")).unwrap()).unwrap();
    assert_eq!(chart["additionalValuesFiles"].as_sequence().map(Vec::len), Some(1));
}
