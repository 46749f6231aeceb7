#![allow(dead_code)]

pub mod temp_files {
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Write `content` to a fresh temp file with extension `ext`.
    ///
    /// The file is removed when the returned handle drops.
    pub fn create_temp_manifest(content: &str, ext: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("shapegate_test_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    pub fn create_temp_yaml(content: &str) -> NamedTempFile {
        create_temp_manifest(content, "yaml")
    }

    pub fn create_temp_json(content: &str) -> NamedTempFile {
        create_temp_manifest(content, "json")
    }

    pub fn create_temp_toml(content: &str) -> NamedTempFile {
        create_temp_manifest(content, "toml")
    }
}

pub mod tables {
    use http::Method;
    use shapegate::router::{RoutePattern, RouteTable};

    /// Build a table from `(method, uri, handler)` rows in precedence order.
    pub fn table(rows: &[(Method, &str, &'static str)]) -> RouteTable<&'static str> {
        rows.iter()
            .fold(RouteTable::builder(), |builder, (method, uri, handler)| {
                builder.route(RoutePattern::parse(method.clone(), uri).unwrap(), *handler)
            })
            .build()
            .unwrap()
    }

    /// Same as [`table`], with owned operation names like a loaded manifest.
    pub fn owned_table(rows: &[(Method, &str, &str)]) -> RouteTable<String> {
        rows.iter()
            .fold(RouteTable::builder(), |builder, (method, uri, handler)| {
                builder.route(
                    RoutePattern::parse(method.clone(), uri).unwrap(),
                    (*handler).to_string(),
                )
            })
            .build()
            .unwrap()
    }
}
