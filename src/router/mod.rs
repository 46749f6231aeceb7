//! # Router Module
//!
//! The router module matches incoming requests against a statically declared
//! routing table and selects exactly one handler.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Describing routes as [`RoutePattern`]s: HTTP method, path segments
//!   (literal, label, greedy), required query parameters and an optional
//!   host prefix
//! - Parsing URI patterns such as `/buckets/{bucket}/{key+}?uploads`
//! - Matching requests in registration order (first match wins)
//! - Telling "wrong method" (405) apart from "not found" (404)
//! - Publishing a finished table to worker threads without locks
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Construction**: At startup every route pattern is validated (greedy
//!    label last, no duplicate query keys, supported method) and the table is
//!    frozen by [`RouteTableBuilder::build`], which also rejects exact
//!    duplicates.
//!
//! 2. **Matching**: For each request the path is split on `/`, empty segments
//!    are dropped and each segment is percent-decoded once. The table is then
//!    walked in order; the first route matching method, path, query and host
//!    wins. A malformed escape anywhere in the path or query means no route
//!    matches.
//!
//! ## Precedence
//!
//! Routes are never ranked by specificity. When a literal and a label could
//! both match the same segment, register the literal route first:
//!
//! ```rust
//! use http::Method;
//! use shapegate::router::{RoutePattern, RouteTable};
//!
//! let table = RouteTable::builder()
//!     .route(RoutePattern::parse(Method::GET, "/users/me").unwrap(), "current_user")
//!     .route(RoutePattern::parse(Method::GET, "/users/{id}").unwrap(), "get_user")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(*table.route(&Method::GET, "/users/me", None).unwrap().handler(), "current_user");
//! assert_eq!(*table.route(&Method::GET, "/users/7", None).unwrap().handler(), "get_user");
//! ```
//!
//! ## Performance
//!
//! Matching is O(n) in the number of routes with no regex evaluation; each
//! route comparison is a segment-by-segment walk that bails out on the first
//! mismatch.

mod core;
mod pattern;
mod request;
mod shared;

use smallvec::SmallVec;

/// Maximum number of captured labels before heap allocation.
pub const MAX_INLINE_LABELS: usize = 8;

/// Label captures for one match. Stack-allocated for up to
/// [`MAX_INLINE_LABELS`] labels.
pub type LabelVec = SmallVec<[String; MAX_INLINE_LABELS]>;

pub use core::{
    Resolution, RouteMatch, RouteTable, RouteTableBuilder, RouteTableError,
    DEFAULT_SLOW_MATCH_THRESHOLD,
};
pub use pattern::{
    HostPrefixSegment, PathSegment, PatternError, QuerySegment, RoutePattern, SUPPORTED_METHODS,
};
pub use request::{QueryParams, RouteRequest};
pub use shared::{PublishedTable, SharedRouteTable};
