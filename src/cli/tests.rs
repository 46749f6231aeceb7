//! Unit tests for CLI commands

use crate::cli::{run_cli, Cli, CommandStatus, Commands};
use crate::runtime_config::RuntimeConfig;
use clap::Parser;
use std::io::Write;

const MANIFEST: &str = r#"
routes:
  - operation: CurrentUser
    method: GET
    uri: /users/me
  - operation: GetUser
    method: GET
    uri: /users/{id}
  - operation: DeleteUser
    method: DELETE
    uri: /users/{id}
"#;

fn manifest_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(MANIFEST.as_bytes()).unwrap();
    file
}

fn run(args: &[&str]) -> (CommandStatus, String) {
    run_with_config(args, &RuntimeConfig::default())
}

fn run_with_config(args: &[&str], config: &RuntimeConfig) -> (CommandStatus, String) {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    let status = run_cli(cli, config, &mut out).unwrap();
    (status, String::from_utf8(out).unwrap())
}

#[test]
fn test_all_commands_parse() {
    let commands = vec![
        vec!["shapegate", "check", "--manifest", "routes.yaml"],
        vec!["shapegate", "check"],
        vec!["shapegate", "route", "-m", "routes.yaml", "GET", "/users/1"],
        vec!["shapegate", "route", "GET", "/a?x=1", "--host", "h.example.com"],
        vec!["shapegate", "validate", "a", "b"],
        vec!["shapegate", "validate", "--min", "1", "--max", "3", "--unique", "--path", "/tags"],
    ];

    for args in commands {
        let cli = Cli::try_parse_from(&args);
        assert!(cli.is_ok(), "Failed to parse command: {:?}", args);
    }
}

#[test]
fn test_validate_flags_parse() {
    let cli = Cli::try_parse_from(["shapegate", "validate", "--unique", "--max", "2", "x", "y"])
        .unwrap();
    match cli.command {
        Commands::Validate {
            min,
            max,
            unique,
            path,
            items,
        } => {
            assert_eq!(min, None);
            assert_eq!(max, Some(2));
            assert!(unique);
            assert_eq!(path, "/items");
            assert_eq!(items, vec!["x".to_string(), "y".to_string()]);
        }
        other => panic!("Expected Validate command, got {other:?}"),
    }
}

#[test]
fn test_check_prints_table() {
    let file = manifest_file();
    let path = file.path().to_str().unwrap();
    let (status, out) = run(&["shapegate", "check", "--manifest", path]);
    assert_eq!(status, CommandStatus::Success);
    assert!(out.contains("3 routes"), "{out}");
    assert!(out.contains("GET /users/me  -> CurrentUser"), "{out}");
    assert!(out.contains("DELETE /users/{label}  -> DeleteUser"), "{out}");
}

#[test]
fn test_check_uses_configured_manifest() {
    let file = manifest_file();
    let config = RuntimeConfig {
        manifest_path: Some(file.path().to_path_buf()),
        ..RuntimeConfig::default()
    };
    let (status, out) = run_with_config(&["shapegate", "check"], &config);
    assert_eq!(status, CommandStatus::Success);
    assert!(out.contains("3 routes"), "{out}");
}

#[test]
fn test_check_without_manifest_fails() {
    let cli = Cli::try_parse_from(["shapegate", "check"]).unwrap();
    let err = run_cli(cli, &RuntimeConfig::default(), &mut Vec::new()).unwrap_err();
    assert!(err.to_string().contains("SHAPEGATE_MANIFEST"));
}

#[test]
fn test_route_outcomes() {
    let file = manifest_file();
    let path = file.path().to_str().unwrap();

    let (status, out) = run(&["shapegate", "route", "-m", path, "get", "/users/me"]);
    assert_eq!(status, CommandStatus::Success);
    assert_eq!(out, "CurrentUser\n");

    let (status, out) = run(&["shapegate", "route", "-m", path, "DELETE", "/users/7?force"]);
    assert_eq!(status, CommandStatus::Success);
    assert_eq!(out, "DeleteUser\n  label[0] = 7\n");

    let (status, out) = run(&["shapegate", "route", "-m", path, "PUT", "/users/7"]);
    assert_eq!(status, CommandStatus::Failed);
    assert_eq!(out, "405 Method Not Allowed (allowed: GET, DELETE)\n");

    let (status, out) = run(&["shapegate", "route", "-m", path, "GET", "/groups"]);
    assert_eq!(status, CommandStatus::Failed);
    assert_eq!(out, "404 Not Found\n");
}

#[test]
fn test_validate_reports_violations() {
    let (status, out) = run(&[
        "shapegate", "validate", "--min", "2", "--max", "8", "--unique", "a", "a", "b", "c",
    ]);
    assert_eq!(status, CommandStatus::Failed);
    let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        doc["message"],
        "1 validation error detected. Value with repeated values at indices [0, 1] at '/items' failed to satisfy constraint: Member must have unique values"
    );
    assert_eq!(doc["fieldList"][0]["path"], "/items");
}

#[test]
fn test_validate_success_and_bad_bounds() {
    let (status, out) = run(&["shapegate", "validate", "--max", "3", "a", "b"]);
    assert_eq!(status, CommandStatus::Success);
    assert_eq!(out, "valid: 2 items\n");

    let cli = Cli::try_parse_from(["shapegate", "validate", "--min", "3", "--max", "1"]).unwrap();
    assert!(run_cli(cli, &RuntimeConfig::default(), &mut Vec::new()).is_err());
}

#[test]
fn test_exit_codes() {
    assert_eq!(CommandStatus::Success.exit_code(), 0);
    assert_eq!(CommandStatus::Failed.exit_code(), 1);
}
