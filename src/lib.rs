//! # shapegate
//!
//! **shapegate** is the runtime core consumed by generated service SDKs: it
//! checks collection-shaped input against statically declared constraints and
//! selects the handler for an incoming request from a statically declared
//! routing table.
//!
//! ## Architecture
//!
//! - **[`constraint`]** - Length and uniqueness constraints on collections,
//!   with violation reports precise enough to build client-facing
//!   validation errors
//! - **[`router`]** - URI patterns (literal, label and greedy segments,
//!   required query parameters, host prefixes) and an ordered first-match
//!   route table
//! - **[`manifest`]** - Route tables declared in YAML, JSON or TOML
//! - **[`runtime_config`]** - Environment-driven tuning
//! - **[`logging`]** - `tracing` subscriber setup for the binary and
//!   embedding services
//! - **[`cli`]** - The `shapegate` operator tool
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Server
//!     participant Table as RouteTable
//!     participant Handler
//!     participant Validator as constraint::validate
//!
//!     Server->>Table: resolve(method, path, query, host)
//!     Table->>Table: split + percent-decode path once
//!     Table->>Table: walk routes in registration order
//!     alt first full match
//!         Table-->>Server: Matched(handler, labels)
//!         Server->>Handler: dispatch
//!         Handler->>Validator: validate(items, CONSTRAINTS)
//!         alt violations
//!             Validator-->>Handler: Vec<ConstraintViolation>
//!             Handler-->>Server: ValidationException (400)
//!         else valid
//!             Validator-->>Handler: items
//!         end
//!     else path matched, method did not
//!         Table-->>Server: MethodNotAllowed(allowed)
//!     else
//!         Table-->>Server: NotFound
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use http::Method;
//! use shapegate::constraint::{validate, CollectionConstraints, LengthBound};
//! use shapegate::router::{RoutePattern, RouteTable};
//!
//! let table = RouteTable::builder()
//!     .route(RoutePattern::parse(Method::POST, "/MalformedUniqueItems").unwrap(), "unique_items")
//!     .build()
//!     .unwrap();
//! let matched = table.route(&Method::POST, "/MalformedUniqueItems", None).unwrap();
//! assert_eq!(*matched.handler(), "unique_items");
//!
//! const TAGS: CollectionConstraints =
//!     CollectionConstraints::new().with_length(LengthBound::between(2, 8)).with_unique_items();
//! let violations = validate(vec!["a", "a", "b", "c"], &TAGS).unwrap_err();
//! assert_eq!(violations.len(), 1);
//! ```
//!
//! ## Concurrency
//!
//! Validation and routing are synchronous and never block. A built
//! [`router::RouteTable`] is immutable and `Send + Sync` whenever its handler
//! type is; [`router::SharedRouteTable`] swaps whole tables in atomically for
//! reloads.

pub mod cli;
pub mod constraint;
pub mod logging;
pub mod manifest;
pub mod router;
pub mod runtime_config;

pub use constraint::{
    validate, CollectionConstraints, ConstrainedCollection, ConstraintViolation, LengthBound,
    ValidationException, ValidationExceptionField,
};
pub use manifest::{load_manifest, load_route_table, parse_manifest, RouteManifest};
pub use router::{Resolution, RouteMatch, RoutePattern, RouteTable, SharedRouteTable};
