use http::Method;
use shapegate::manifest::{load_manifest, load_route_table, RouteEntry};
use shapegate::runtime_config::RuntimeConfig;
use std::time::Duration;

mod common;
use common::temp_files::{create_temp_json, create_temp_toml, create_temp_yaml};

const YAML: &str = r#"
routes:
  - operation: MalformedUniqueItems
    method: POST
    uri: /MalformedUniqueItems
  - operation: GetItems
    method: GET
    uri: /{id}/items
"#;

const JSON: &str = r#"{
  "routes": [
    { "operation": "MalformedUniqueItems", "method": "POST", "uri": "/MalformedUniqueItems" },
    { "operation": "GetItems", "method": "GET", "uri": "/{id}/items" }
  ]
}"#;

const TOML: &str = r#"
[[routes]]
operation = "MalformedUniqueItems"
method = "POST"
uri = "/MalformedUniqueItems"

[[routes]]
operation = "GetItems"
method = "GET"
uri = "/{id}/items"
"#;

fn expected_entries() -> Vec<RouteEntry> {
    vec![
        RouteEntry {
            operation: "MalformedUniqueItems".to_string(),
            method: "POST".to_string(),
            uri: "/MalformedUniqueItems".to_string(),
            host_prefix: None,
        },
        RouteEntry {
            operation: "GetItems".to_string(),
            method: "GET".to_string(),
            uri: "/{id}/items".to_string(),
            host_prefix: None,
        },
    ]
}

#[test]
fn test_all_formats_load_the_same_manifest() {
    let files = [create_temp_yaml(YAML), create_temp_json(JSON), create_temp_toml(TOML)];
    for file in &files {
        let manifest = load_manifest(file.path()).unwrap();
        assert_eq!(manifest.routes, expected_entries(), "{}", file.path().display());
    }
}

#[test]
fn test_loaded_table_routes() {
    let file = create_temp_toml(TOML);
    let table = load_route_table(file.path(), &RuntimeConfig::default()).unwrap();

    let m = table
        .route(&Method::POST, "/MalformedUniqueItems", None)
        .unwrap();
    assert_eq!(m.handler(), "MalformedUniqueItems");

    let m = table.route(&Method::GET, "/abc/items", None).unwrap();
    assert_eq!(m.handler(), "GetItems");
    assert_eq!(m.label(0), Some("abc"));

    assert!(table.route(&Method::GET, "/abc", None).is_none());
}

#[test]
fn test_runtime_config_is_applied() {
    let file = create_temp_yaml(YAML);
    let config = RuntimeConfig {
        slow_match_threshold: Duration::from_micros(5),
        manifest_path: None,
    };
    let table = load_route_table(file.path(), &config).unwrap();
    assert!(format!("{table:?}").contains("5µs"));
}

#[test]
fn test_missing_file_reports_path() {
    let err = load_manifest("/definitely/not/here/routes.yaml").unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here/routes.yaml"));
}

#[test]
fn test_invalid_pattern_reports_operation() {
    let file = create_temp_yaml(
        r#"
routes:
  - { operation: Broken, method: GET, uri: "/a/{rest+}/b" }
"#,
    );
    let err = load_route_table(file.path(), &RuntimeConfig::default()).unwrap_err();
    let rendered = format!("{err:#}");
    assert!(rendered.contains("operation `Broken`"), "{rendered}");
    assert!(rendered.contains("greedy label must be the last path segment"), "{rendered}");
}

#[test]
fn test_wrong_extension_content_fails_to_parse() {
    let file = create_temp_json(YAML);
    assert!(load_manifest(file.path()).is_err());
}
