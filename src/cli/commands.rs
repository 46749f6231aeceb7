use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use http::Method;
use std::io::Write;
use std::path::PathBuf;

use crate::constraint::{validate, CollectionConstraints, LengthBound, ValidationException};
use crate::manifest::load_route_table;
use crate::router::{Resolution, RouteRequest};
use crate::runtime_config::RuntimeConfig;

/// Command-line interface for shapegate
///
/// Inspects route manifests and runs the collection validator from the
/// shell.
#[derive(Debug, Parser)]
#[command(name = "shapegate", version)]
#[command(about = "Route manifest and collection constraint tooling", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load a route manifest and print the compiled table
    Check {
        /// Manifest file (YAML, JSON or TOML); defaults to `SHAPEGATE_MANIFEST`
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },
    /// Resolve one request against a route manifest
    ///
    /// Prints the selected operation and its captured labels, `405` with the
    /// methods the path does accept, or `404`.
    Route {
        /// Manifest file (YAML, JSON or TOML); defaults to `SHAPEGATE_MANIFEST`
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// HTTP method, e.g. GET
        method: String,

        /// Request target: path plus optional `?query`
        target: String,

        /// Host the request is addressed to
        #[arg(long)]
        host: Option<String>,
    },
    /// Validate a list of items against length and uniqueness constraints
    ///
    /// Prints the validation error document as JSON and exits non-zero when
    /// any constraint is violated.
    Validate {
        /// Minimum number of items
        #[arg(long)]
        min: Option<usize>,

        /// Maximum number of items
        #[arg(long)]
        max: Option<usize>,

        /// Require every item to be distinct
        #[arg(long, default_value_t = false)]
        unique: bool,

        /// Field path used in error messages
        #[arg(long, default_value = "/items")]
        path: String,

        /// Items to validate
        items: Vec<String>,
    },
}

/// How a command finished, mapped to the process exit code by the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    /// The command ran but its subject failed (no route, constraint violated)
    Failed,
}

impl CommandStatus {
    #[must_use]
    pub fn exit_code(self) -> u8 {
        match self {
            CommandStatus::Success => 0,
            CommandStatus::Failed => 1,
        }
    }
}

/// Execute a parsed command, writing its report to `out`.
///
/// # Errors
///
/// Returns an error if:
/// - No manifest path is given and `SHAPEGATE_MANIFEST` is unset
/// - The manifest cannot be read, parsed or compiled
/// - The method is not a valid HTTP method
/// - `--min` exceeds `--max`
pub fn run_cli(cli: Cli, config: &RuntimeConfig, out: &mut impl Write) -> Result<CommandStatus> {
    match cli.command {
        Commands::Check { manifest } => {
            let path = manifest_path(manifest, config)?;
            let table = load_route_table(&path, config)?;
            writeln!(out, "{}: {} routes", path.display(), table.len())?;
            for (index, (pattern, operation)) in table.iter().enumerate() {
                writeln!(out, "{index:>4}  {pattern}  -> {operation}")?;
            }
            Ok(CommandStatus::Success)
        }
        Commands::Route {
            manifest,
            method,
            target,
            host,
        } => {
            let path = manifest_path(manifest, config)?;
            let table = load_route_table(&path, config)?;
            let method = parse_method(&method)?;
            let request = RouteRequest::from_target(method, &target).with_host(host.as_deref());

            match table.resolve(&request) {
                Resolution::Matched(m) => {
                    writeln!(out, "{}", m.handler())?;
                    for (index, value) in m.labels.iter().enumerate() {
                        writeln!(out, "  label[{index}] = {value}")?;
                    }
                    Ok(CommandStatus::Success)
                }
                Resolution::MethodNotAllowed { allowed } => {
                    let allowed: Vec<&str> = allowed.iter().map(Method::as_str).collect();
                    writeln!(out, "405 Method Not Allowed (allowed: {})", allowed.join(", "))?;
                    Ok(CommandStatus::Failed)
                }
                Resolution::NotFound => {
                    writeln!(out, "404 Not Found")?;
                    Ok(CommandStatus::Failed)
                }
            }
        }
        Commands::Validate {
            min,
            max,
            unique,
            path,
            items,
        } => {
            let length = match (min, max) {
                (Some(min), Some(max)) => Some(
                    LengthBound::try_between(min, max)
                        .ok_or_else(|| anyhow!("--min ({min}) must not exceed --max ({max})"))?,
                ),
                (Some(min), None) => Some(LengthBound::at_least(min)),
                (None, Some(max)) => Some(LengthBound::at_most(max)),
                (None, None) => None,
            };
            let constraints = CollectionConstraints {
                length,
                unique_items: unique,
            };

            match validate(items, &constraints) {
                Ok(items) => {
                    writeln!(out, "valid: {} items", items.len())?;
                    Ok(CommandStatus::Success)
                }
                Err(violations) => {
                    let exception = ValidationException::from_violations(&violations, &path)
                        .context("validation failed without reporting a violation")?;
                    let json = serde_json::to_string_pretty(&exception)
                        .context("Failed to serialize validation error")?;
                    writeln!(out, "{json}")?;
                    Ok(CommandStatus::Failed)
                }
            }
        }
    }
}

fn manifest_path(explicit: Option<PathBuf>, config: &RuntimeConfig) -> Result<PathBuf> {
    match explicit.or_else(|| config.manifest_path.clone()) {
        Some(path) => Ok(path),
        None => bail!("no manifest given: pass --manifest or set SHAPEGATE_MANIFEST"),
    }
}

fn parse_method(raw: &str) -> Result<Method> {
    Method::from_bytes(raw.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| anyhow!("invalid HTTP method `{raw}`"))
}
