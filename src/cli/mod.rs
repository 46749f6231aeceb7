//! # CLI Module
//!
//! Command-line tooling for route manifests and collection constraints.
//!
//! ## Commands
//!
//! ### `check`
//!
//! Load a manifest and print the compiled route table in precedence order:
//!
//! ```bash
//! shapegate check --manifest routes.yaml
//! ```
//!
//! ### `route`
//!
//! Resolve one request against a manifest:
//!
//! ```bash
//! shapegate route --manifest routes.yaml GET '/photos/2024/a.png?size=small'
//! shapegate route --manifest routes.yaml PUT /bucket/key --host acct.data.example.com
//! ```
//!
//! Prints the operation name and captured labels, `405 Method Not Allowed`
//! with the accepted methods, or `404 Not Found`. The exit code is 1 when no
//! route matches.
//!
//! ### `validate`
//!
//! Run the collection validator on string items:
//!
//! ```bash
//! shapegate validate --min 2 --max 8 --unique a a b c
//! ```
//!
//! On violation the `ValidationException` JSON document is printed and the
//! exit code is 1.
//!
//! ## Usage from Code
//!
//! ```rust,no_run
//! use clap::Parser;
//! use shapegate::cli::{run_cli, Cli};
//! use shapegate::runtime_config::RuntimeConfig;
//!
//! let cli = Cli::parse();
//! let status = run_cli(cli, &RuntimeConfig::from_env(), &mut std::io::stdout())?;
//! std::process::exit(i32::from(status.exit_code()));
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! `--manifest` falls back to `SHAPEGATE_MANIFEST`.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, Cli, CommandStatus, Commands};
