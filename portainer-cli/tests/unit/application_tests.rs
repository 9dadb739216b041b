use clap::Parser;
use portainer_cli::application::{Operation, prepare};
use portainer_cli::cli::Cli;
use portainer_cli::error::Error;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["portainer-api-cli"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn test_bad_label_fails_before_login() {
    let tmp = tempfile::tempdir().unwrap();
    let content = tmp.path().join("app.conf");
    std::fs::write(&content, "x").unwrap();
    let cli = parse(&[
        "config",
        "create",
        "--name",
        "app.conf",
        "--content",
        content.to_str().unwrap(),
        "--labels",
        "novalue",
    ]);

    let err = prepare(cli.command, "1").unwrap_err();

    match err.downcast_ref::<Error>() {
        Some(Error::Validation(message)) => assert!(message.contains("novalue")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_config_create_reads_file_and_labels() {
    let tmp = tempfile::tempdir().unwrap();
    let content = tmp.path().join("app.conf");
    std::fs::write(&content, "listen 80;\n").unwrap();
    let cli = parse(&[
        "config",
        "create",
        "--name",
        "app.conf",
        "--content",
        content.to_str().unwrap(),
        "--labels",
        "team=ops",
    ]);

    match prepare(cli.command, "1").unwrap() {
        Operation::ConfigCreate {
            name,
            content,
            labels,
        } => {
            assert_eq!(name, "app.conf");
            assert_eq!(content, b"listen 80;\n");
            assert_eq!(labels.get("team").map(String::as_str), Some("ops"));
        }
        other => panic!("unexpected operation {other:?}"),
    }
}

#[test]
fn test_stack_deploy_builds_request_for_endpoint() {
    let tmp = tempfile::tempdir().unwrap();
    let compose = tmp.path().join("docker-compose.yml");
    std::fs::write(&compose, "services:\n  web:\n    image: nginx\n").unwrap();
    let cli = parse(&[
        "stack",
        "deploy",
        "--name",
        "web",
        "--swarmid",
        "swarm-1",
        "--composepath",
        compose.to_str().unwrap(),
        "--env",
        "TAG=1.0",
    ]);

    match prepare(cli.command, "3").unwrap() {
        Operation::StackDeploy(request) => {
            assert_eq!(request.name, "web");
            assert_eq!(request.swarm_id, "swarm-1");
            assert_eq!(request.endpoint, "3");
            assert_eq!(request.compose, "services:\n  web:\n    image: nginx\n");
            assert_eq!(request.env[0].name, "TAG");
            assert_eq!(request.env[0].value, "1.0");
            assert!(!request.prune);
        }
        other => panic!("unexpected operation {other:?}"),
    }
}

#[test]
fn test_missing_compose_file_is_reported() {
    let cli = parse(&[
        "stack",
        "deploy",
        "--name",
        "web",
        "--swarmid",
        "swarm-1",
        "--composepath",
        "/no/such/compose.yml",
    ]);

    let err = prepare(cli.command, "1").unwrap_err();
    assert!(format!("{err:#}").contains("/no/such/compose.yml"));
}

#[test]
fn test_config_rm_rejects_path_like_id() {
    let cli = parse(&["config", "rm", "--id", "../stacks"]);
    assert!(prepare(cli.command, "1").is_err());
}
