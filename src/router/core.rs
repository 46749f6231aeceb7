//! Route table core - hot path for request routing.
//!
//! # JSF Compliance (Rule 206)
//!
//! Matching allocates only for decoded path segments that needed decoding and
//! for captured label values. The table itself is never mutated after
//! [`RouteTableBuilder::build`].

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use http::Method;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::pattern::RoutePattern;
use super::request::RouteRequest;
use super::LabelVec;
use crate::runtime_config::RuntimeConfig;

/// Default threshold above which a single table walk is logged as slow.
pub const DEFAULT_SLOW_MATCH_THRESHOLD: Duration = Duration::from_millis(1);

/// Errors detected while assembling a [`RouteTable`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteTableError {
    /// A pattern identical to an earlier one can never be selected.
    #[error("route #{index} `{pattern}` duplicates route #{first} and would never match")]
    DuplicateRoute {
        index: usize,
        first: usize,
        pattern: String,
    },
}

/// A successful match: the selected handler plus captured label values.
#[derive(Debug)]
pub struct RouteMatch<'t, H> {
    /// Position of the route in registration order
    pub index: usize,
    pub pattern: &'t RoutePattern,
    pub handler: &'t H,
    /// Decoded values of `Label` segments in pattern order; a greedy label
    /// contributes the remaining segments joined with `/`
    pub labels: LabelVec,
}

impl<'t, H> RouteMatch<'t, H> {
    #[inline]
    #[must_use]
    pub fn handler(&self) -> &'t H {
        self.handler
    }

    /// Value captured by the `n`th label (greedy included), if any.
    #[inline]
    #[must_use]
    pub fn label(&self, n: usize) -> Option<&str> {
        self.labels.get(n).map(String::as_str)
    }
}

impl<H> Clone for RouteMatch<'_, H> {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            pattern: self.pattern,
            handler: self.handler,
            labels: self.labels.clone(),
        }
    }
}

/// Outcome of resolving a request against the whole table.
#[derive(Debug)]
pub enum Resolution<'t, H> {
    /// The first route matching method, path, query and host
    Matched(RouteMatch<'t, H>),
    /// Some routes matched everything except the method
    MethodNotAllowed {
        /// Methods of those routes, registration order, deduplicated
        allowed: Vec<Method>,
    },
    NotFound,
}

impl<'t, H> Resolution<'t, H> {
    #[must_use]
    pub fn into_match(self) -> Option<RouteMatch<'t, H>> {
        match self {
            Resolution::Matched(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_matched(&self) -> bool {
        matches!(self, Resolution::Matched(_))
    }
}

#[derive(Debug, Clone)]
struct Route<H> {
    pattern: RoutePattern,
    handler: H,
}

/// Ordered routing table mapping requests to handlers.
///
/// Evaluated in registration order; the first route whose method, path,
/// query requirements and host prefix all match wins. Routes are never
/// compared by specificity, so overlapping routes must be registered
/// most-specific-first.
///
/// The table is immutable once built and is `Send + Sync` whenever `H` is,
/// so it can be shared by reference (or through
/// [`SharedRouteTable`](super::SharedRouteTable)) across worker threads
/// without locking.
///
/// # Example
///
/// ```
/// use http::Method;
/// use shapegate::router::{RoutePattern, RouteTable};
///
/// let table = RouteTable::builder()
///     .route(RoutePattern::parse(Method::GET, "/users/{id}").unwrap(), "get_user")
///     .build()
///     .unwrap();
///
/// let m = table.route(&Method::GET, "/users/42", None).unwrap();
/// assert_eq!(*m.handler(), "get_user");
/// assert_eq!(m.label(0), Some("42"));
/// ```
#[derive(Clone)]
pub struct RouteTable<H> {
    routes: Vec<Route<H>>,
    slow_match_threshold: Duration,
}

impl<H> RouteTable<H> {
    #[must_use]
    pub fn builder() -> RouteTableBuilder<H> {
        RouteTableBuilder::new()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered routes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&RoutePattern, &H)> {
        self.routes.iter().map(|r| (&r.pattern, &r.handler))
    }

    /// Match `method`, `path` and `query` and return the selected handler.
    ///
    /// `path` is the raw request path; `query` the raw query string without
    /// the `?`. Returns `None` when no route matches, including when the path
    /// or query is malformed.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str, query: Option<&str>) -> Option<RouteMatch<'_, H>> {
        self.resolve(&RouteRequest::new(method.clone(), path).with_query(query))
            .into_match()
    }

    /// Resolve an `http::Request` (method, path, query and host).
    #[must_use]
    pub fn route_request<B>(&self, req: &http::Request<B>) -> Resolution<'_, H> {
        self.resolve(&RouteRequest::from_http(req))
    }

    /// Resolve a request, distinguishing "wrong method" from "not found".
    #[must_use]
    pub fn resolve(&self, request: &RouteRequest<'_>) -> Resolution<'_, H> {
        // RT1: Route match attempt
        debug!(
            method = %request.method,
            path = %request.path,
            query = ?request.query,
            "Route match attempt"
        );
        let match_start = Instant::now();

        let Some(target) = request.decode() else {
            // RT2: Malformed target
            debug!(
                method = %request.method,
                path = %request.path,
                "Malformed percent-encoding; no route can match"
            );
            return Resolution::NotFound;
        };

        let mut allowed: Vec<Method> = Vec::new();
        for (index, route) in self.routes.iter().enumerate() {
            let Some(labels) = route.pattern.match_path(&target.segments) else {
                continue;
            };
            if !route.pattern.match_query(&target.query) || !route.pattern.match_host(request.host)
            {
                continue;
            }
            if *route.pattern.method() != request.method {
                if !allowed.contains(route.pattern.method()) {
                    allowed.push(route.pattern.method().clone());
                }
                continue;
            }

            let match_duration = match_start.elapsed();
            self.record_match_duration(request, match_duration);
            // RT3: Route matched
            debug!(
                method = %request.method,
                path = %request.path,
                route_index = index,
                route_pattern = %route.pattern,
                labels = ?labels,
                duration_us = match_duration.as_micros(),
                "Route matched"
            );
            return Resolution::Matched(RouteMatch {
                index,
                pattern: &route.pattern,
                handler: &route.handler,
                labels,
            });
        }

        let match_duration = match_start.elapsed();
        self.record_match_duration(request, match_duration);

        if allowed.is_empty() {
            // RT4: No route found (404)
            warn!(
                method = %request.method,
                path = %request.path,
                duration_us = match_duration.as_micros(),
                "No route matched"
            );
            Resolution::NotFound
        } else {
            // RT5: Path known, method not (405)
            warn!(
                method = %request.method,
                path = %request.path,
                allowed = ?allowed,
                "Route matched path but not method"
            );
            Resolution::MethodNotAllowed { allowed }
        }
    }

    /// One line per route, `METHOD pattern`, in registration order.
    #[must_use]
    pub fn summary(&self) -> Vec<String> {
        self.routes.iter().map(|r| r.pattern.to_string()).collect()
    }

    fn record_match_duration(&self, request: &RouteRequest<'_>, duration: Duration) {
        if duration > self.slow_match_threshold {
            warn!(
                method = %request.method,
                path = %request.path,
                duration_us = duration.as_micros(),
                routes_count = self.routes.len(),
                "Slow route matching detected"
            );
        }
    }
}

impl<H> fmt::Debug for RouteTable<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.summary())
            .field("slow_match_threshold", &self.slow_match_threshold)
            .finish()
    }
}

/// Collects routes in registration order, then freezes them into a
/// [`RouteTable`].
pub struct RouteTableBuilder<H> {
    routes: Vec<Route<H>>,
    slow_match_threshold: Duration,
}

impl<H> Default for RouteTableBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> RouteTableBuilder<H> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            slow_match_threshold: DEFAULT_SLOW_MATCH_THRESHOLD,
        }
    }

    /// Append a route; earlier routes take precedence.
    #[must_use]
    pub fn route(mut self, pattern: RoutePattern, handler: H) -> Self {
        self.routes.push(Route { pattern, handler });
        self
    }

    /// Apply runtime tuning (slow-match threshold).
    #[must_use]
    pub fn with_config(mut self, config: &RuntimeConfig) -> Self {
        self.slow_match_threshold = config.slow_match_threshold;
        self
    }

    /// Freeze the table, rejecting routes that duplicate an earlier one.
    pub fn build(self) -> Result<RouteTable<H>, RouteTableError> {
        let mut first_seen: HashMap<&RoutePattern, usize> = HashMap::with_capacity(self.routes.len());
        for (index, route) in self.routes.iter().enumerate() {
            if let Some(&first) = first_seen.get(&route.pattern) {
                return Err(RouteTableError::DuplicateRoute {
                    index,
                    first,
                    pattern: route.pattern.to_string(),
                });
            }
            first_seen.insert(&route.pattern, index);
        }
        drop(first_seen);

        let routes_summary: Vec<String> = self
            .routes
            .iter()
            .take(10)
            .map(|r| r.pattern.to_string())
            .collect();
        info!(
            routes_count = self.routes.len(),
            routes_summary = ?routes_summary,
            slow_match_threshold_us = self.slow_match_threshold.as_micros(),
            "Routing table loaded"
        );

        Ok(RouteTable {
            routes: self.routes,
            slow_match_threshold: self.slow_match_threshold,
        })
    }
}
