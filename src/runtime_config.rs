//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for shapegate's runtime behavior.
//!
//! ## Environment Variables
//!
//! ### `SHAPEGATE_SLOW_MATCH_US`
//!
//! Threshold in microseconds above which a single route table walk is logged
//! as slow. Accepts values in:
//! - Decimal: `1000` (1 ms)
//! - Hexadecimal: `0x3e8` (1 ms)
//!
//! Default: `1000` (1 ms). Unparseable values fall back to the default.
//!
//! ### `SHAPEGATE_MANIFEST`
//!
//! Default route manifest path used by the `shapegate` CLI when `--manifest`
//! is not given.
//!
//! ## Usage
//!
//! ```rust
//! use shapegate::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Slow match threshold: {:?}", config.slow_match_threshold);
//! ```
//!
//! ## Example Configuration
//!
//! ```bash
//! # Warn on lookups slower than 250 µs
//! export SHAPEGATE_SLOW_MATCH_US=250
//!
//! export SHAPEGATE_MANIFEST=./routes.yaml
//! shapegate check
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SLOW_MATCH_US: u64 = 1000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Route table walks longer than this are logged at WARN (default: 1 ms)
    pub slow_match_threshold: Duration,
    /// Manifest path from `SHAPEGATE_MANIFEST`, if set
    pub manifest_path: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            slow_match_threshold: Duration::from_micros(DEFAULT_SLOW_MATCH_US),
            manifest_path: None,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Lets tests supply values without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let slow_match_us = lookup("SHAPEGATE_SLOW_MATCH_US")
            .and_then(|val| parse_u64(&val))
            .unwrap_or(DEFAULT_SLOW_MATCH_US);
        let manifest_path = lookup("SHAPEGATE_MANIFEST")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        RuntimeConfig {
            slow_match_threshold: Duration::from_micros(slow_match_us),
            manifest_path,
        }
    }
}

fn parse_u64(val: &str) -> Option<u64> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}
