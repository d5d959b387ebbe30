use klabctl::cli::{exit_code, Args, Commands, GetCommands};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("klabctl")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_generate_defaults() {
    let parsed = Args::try_parse_from(make_args(&["generate"])).unwrap();
    assert_eq!(parsed.site, PathBuf::from("site.yaml"));
    assert!(!parsed.verbose);
    match parsed.command {
        Commands::Generate(args) => assert!(!args.skip_validation),
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_render_alias_and_global_flags() {
    let parsed = Args::try_parse_from(make_args(&[
        "render",
        "-s",
        "clusters/lab/site.yaml",
        "-v",
        "--skip-validation",
    ]))
    .unwrap();
    assert_eq!(parsed.site, PathBuf::from("clusters/lab/site.yaml"));
    assert!(parsed.verbose);
    assert!(matches!(parsed.command, Commands::Generate(args) if args.skip_validation));
}

#[test]
fn test_init_args() {
    let parsed = Args::try_parse_from(make_args(&["init", "homelab"])).unwrap();
    match parsed.command {
        Commands::Init(args) => {
            assert_eq!(args.cluster_name, "homelab");
            assert_eq!(args.stack.stack_source, "https://github.com/bamaas/klabctl");
            assert_eq!(args.stack.stack_ref, "main");
        }
        other => panic!("unexpected command {other:?}"),
    }

    let parsed =
        Args::try_parse_from(make_args(&["init", "homelab", "--stack-version", "v1.0.0"])).unwrap();
    assert!(matches!(parsed.command, Commands::Init(args) if args.stack.stack_ref == "v1.0.0"));
}

#[test]
fn test_init_requires_cluster_name() {
    assert!(Args::try_parse_from(make_args(&["init"])).is_err());
}

#[test]
fn test_pull_overrides() {
    let parsed = Args::try_parse_from(make_args(&[
        "pull",
        "--force",
        "--stack-source",
        "git@github.com:me/stack.git",
        "--stack-ref",
        "dev",
    ]))
    .unwrap();
    match parsed.command {
        Commands::Pull(args) => {
            assert!(args.force);
            assert_eq!(args.stack_source.as_deref(), Some("git@github.com:me/stack.git"));
            assert_eq!(args.stack_ref.as_deref(), Some("dev"));
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_get_defaults() {
    let parsed = Args::try_parse_from(make_args(&["get", "defaults", "-n", "production"])).unwrap();
    match parsed.command {
        Commands::Get { resource: GetCommands::Defaults(args) } => {
            assert_eq!(args.cluster_name, "production");
            assert_eq!(args.stack.stack_ref, "main");
        }
        other => panic!("unexpected command {other:?}"),
    }

    let parsed = Args::try_parse_from(make_args(&["get", "defaults"])).unwrap();
    assert!(matches!(
        parsed.command,
        Commands::Get { resource: GetCommands::Defaults(args) } if args.cluster_name == "my-cluster"
    ));
}

#[test]
fn test_missing_subcommand() {
    assert!(Args::try_parse_from(make_args(&[])).is_err());
    assert!(Args::try_parse_from(make_args(&["get"])).is_err());
}

#[test]
fn test_usage_errors_exit_with_one() {
    let unknown_flag = Args::try_parse_from(make_args(&["generate", "--bogus"])).unwrap_err();
    assert_eq!(exit_code(unknown_flag.kind()), 1);

    let unknown_command = Args::try_parse_from(make_args(&["deploy"])).unwrap_err();
    assert_eq!(exit_code(unknown_command.kind()), 1);

    let help = Args::try_parse_from(make_args(&["--help"])).unwrap_err();
    assert_eq!(exit_code(help.kind()), 0);
}
