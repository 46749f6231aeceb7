//! # Route Manifest
//!
//! Declarative route tables loaded from YAML, JSON or TOML.
//!
//! A manifest lists operations in precedence order; each entry names the
//! operation, its HTTP method, a URI pattern and optionally a host prefix:
//!
//! ```yaml
//! routes:
//!   - operation: GetObject
//!     method: GET
//!     uri: /{Bucket}/{Key+}
//!     host_prefix: "{AccountId}."
//!   - operation: ListObjects
//!     method: GET
//!     uri: /{Bucket}?list-type=2
//! ```
//!
//! [`RouteManifest::build_table`] compiles the entries into a
//! [`RouteTable<String>`] whose handlers are the operation names.

use anyhow::{anyhow, Context, Result};
use http::Method;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::router::{RoutePattern, RouteTable, RouteTableBuilder, RouteTableError};
use crate::runtime_config::RuntimeConfig;

/// On-disk encoding of a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Yaml,
    Json,
    Toml,
}

impl ManifestFormat {
    /// Pick the format from a file extension. Unknown extensions are YAML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => ManifestFormat::Json,
            Some("toml") => ManifestFormat::Toml,
            _ => ManifestFormat::Yaml,
        }
    }
}

/// One declared operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub operation: String,
    pub method: String,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_prefix: Option<String>,
}

impl RouteEntry {
    /// Parse this entry into a [`RoutePattern`].
    pub fn pattern(&self) -> Result<RoutePattern> {
        let method = Method::from_bytes(self.method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| anyhow!("invalid HTTP method `{}`", self.method))?;
        let pattern = RoutePattern::parse(method, &self.uri)
            .with_context(|| format!("operation `{}`: invalid uri `{}`", self.operation, self.uri))?;
        match &self.host_prefix {
            Some(prefix) => {
                let segments = RoutePattern::parse_host_prefix(prefix).with_context(|| {
                    format!("operation `{}`: invalid host prefix", self.operation)
                })?;
                pattern
                    .with_host_prefix(segments)
                    .with_context(|| format!("operation `{}`: invalid host prefix", self.operation))
            }
            None => Ok(pattern),
        }
    }
}

/// Ordered list of operations; earlier entries take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteManifest {
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

impl RouteManifest {
    /// Compile the manifest into a route table keyed by operation name.
    ///
    /// Fails on the first invalid entry, or when two entries declare the same
    /// pattern.
    pub fn build_table(&self, config: &RuntimeConfig) -> Result<RouteTable<String>> {
        let mut builder = RouteTableBuilder::new().with_config(config);
        for entry in &self.routes {
            let pattern = entry.pattern()?;
            debug!(operation = %entry.operation, pattern = %pattern, "Manifest route");
            builder = builder.route(pattern, entry.operation.clone());
        }
        builder.build().map_err(|e| {
            let RouteTableError::DuplicateRoute { index, .. } = &e;
            let operation = self
                .routes
                .get(*index)
                .map_or("<unknown>", |r| r.operation.as_str());
            anyhow::Error::new(e).context(format!("operation `{operation}` is unreachable"))
        })
    }
}

/// Parse a manifest held in memory.
pub fn parse_manifest(content: &str, format: ManifestFormat) -> Result<RouteManifest> {
    let manifest = match format {
        ManifestFormat::Yaml => {
            serde_yaml::from_str(content).context("Failed to parse YAML manifest")?
        }
        ManifestFormat::Json => {
            serde_json::from_str(content).context("Failed to parse JSON manifest")?
        }
        ManifestFormat::Toml => toml::from_str(content).context("Failed to parse TOML manifest")?,
    };
    Ok(manifest)
}

/// Load a manifest from disk, choosing the format from the file extension.
pub fn load_manifest(path: impl AsRef<Path>) -> Result<RouteManifest> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let manifest = parse_manifest(&content, ManifestFormat::from_path(path))
        .with_context(|| format!("Invalid manifest {}", path.display()))?;
    info!(
        manifest = %path.display(),
        routes_count = manifest.routes.len(),
        "Route manifest loaded"
    );
    Ok(manifest)
}

/// Load a manifest and compile it in one step.
pub fn load_route_table(path: impl AsRef<Path>, config: &RuntimeConfig) -> Result<RouteTable<String>> {
    load_manifest(path)?.build_table(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const YAML: &str = r#"
routes:
  - operation: CurrentUser
    method: get
    uri: /users/me
  - operation: GetUser
    method: GET
    uri: /users/{id}
  - operation: PutObject
    method: PUT
    uri: /{Bucket}/{Key+}
    host_prefix: "{AccountId}."
"#;

    #[test]
    fn test_format_from_path() {
        assert_eq!(ManifestFormat::from_path(&PathBuf::from("r.yaml")), ManifestFormat::Yaml);
        assert_eq!(ManifestFormat::from_path(&PathBuf::from("r.yml")), ManifestFormat::Yaml);
        assert_eq!(ManifestFormat::from_path(&PathBuf::from("r.JSON")), ManifestFormat::Json);
        assert_eq!(ManifestFormat::from_path(&PathBuf::from("r.toml")), ManifestFormat::Toml);
        assert_eq!(ManifestFormat::from_path(&PathBuf::from("routes")), ManifestFormat::Yaml);
    }

    #[test]
    fn test_parse_yaml_and_build() {
        let manifest = parse_manifest(YAML, ManifestFormat::Yaml).unwrap();
        assert_eq!(manifest.routes.len(), 3);
        assert_eq!(manifest.routes[2].host_prefix.as_deref(), Some("{AccountId}."));

        let table = manifest.build_table(&RuntimeConfig::default()).unwrap();
        assert_eq!(table.len(), 3);
        let m = table.route(&Method::GET, "/users/me", None).unwrap();
        assert_eq!(m.handler(), "CurrentUser");
        let m = table.route(&Method::GET, "/users/42", None).unwrap();
        assert_eq!(m.handler(), "GetUser");
        assert_eq!(m.label(0), Some("42"));
    }

    #[test]
    fn test_empty_manifest() {
        let manifest = parse_manifest("{}", ManifestFormat::Json).unwrap();
        assert!(manifest.routes.is_empty());
        let table = manifest.build_table(&RuntimeConfig::default()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_invalid_method() {
        let manifest = RouteManifest {
            routes: vec![RouteEntry {
                operation: "Bad".to_string(),
                method: "GE T".to_string(),
                uri: "/x".to_string(),
                host_prefix: None,
            }],
        };
        let err = manifest.build_table(&RuntimeConfig::default()).unwrap_err();
        assert!(err.to_string().contains("invalid HTTP method"), "{err:#}");
    }

    #[test]
    fn test_unsupported_method_and_bad_uri() {
        let entry = RouteEntry {
            operation: "Purge".to_string(),
            method: "PURGE".to_string(),
            uri: "/x".to_string(),
            host_prefix: None,
        };
        let err = entry.pattern().unwrap_err();
        assert!(format!("{err:#}").contains("not supported"), "{err:#}");

        let entry = RouteEntry {
            operation: "Trailing".to_string(),
            method: "GET".to_string(),
            uri: "/x/".to_string(),
            host_prefix: None,
        };
        let err = entry.pattern().unwrap_err();
        assert!(format!("{err:#}").contains("operation `Trailing`"), "{err:#}");
    }

    #[test]
    fn test_duplicate_entry_names_operation() {
        let yaml = r#"
routes:
  - { operation: A, method: GET, uri: "/a" }
  - { operation: B, method: GET, uri: "/a" }
"#;
        let manifest = parse_manifest(yaml, ManifestFormat::Yaml).unwrap();
        let err = manifest.build_table(&RuntimeConfig::default()).unwrap_err();
        let rendered = format!("{err:#}");
        assert!(rendered.contains("operation `B`"), "{rendered}");
        assert!(rendered.contains("duplicates route #0"), "{rendered}");
    }

    #[test]
    fn test_malformed_documents() {
        assert!(parse_manifest("routes: [", ManifestFormat::Yaml).is_err());
        assert!(parse_manifest("{\"routes\": 3}", ManifestFormat::Json).is_err());
        assert!(parse_manifest("routes = \"x\"", ManifestFormat::Toml).is_err());
    }
}
