//! Declarative route patterns: method, path shape, required query and host prefix.

use http::Method;
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use super::request::{decode_component, QueryParams};
use super::LabelVec;

/// HTTP methods a route may be declared with. Extension methods are rejected.
pub const SUPPORTED_METHODS: [Method; 9] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::OPTIONS,
    Method::TRACE,
    Method::CONNECT,
];

/// One segment of a path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Matches one identical (percent-decoded, case-sensitive) segment
    Literal(String),
    /// Matches exactly one non-empty segment
    Label,
    /// Matches one or more trailing segments; only valid as the last segment
    Greedy,
}

/// A query parameter the request must carry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QuerySegment {
    /// Key must appear, with any value or none
    KeyPresent(String),
    /// Key must appear with exactly this value
    KeyValue(String, String),
}

impl QuerySegment {
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            QuerySegment::KeyPresent(key) | QuerySegment::KeyValue(key, _) => key,
        }
    }
}

/// One segment of a host prefix such as `{bucket}.data.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostPrefixSegment {
    Literal(String),
    Label,
}

/// Errors raised while building a [`RoutePattern`].
///
/// These are configuration errors: they surface while the route table is
/// being assembled at startup, never while serving a request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("uri pattern MUST start with \"/\"")]
    DoesNotStartWithForwardSlash,
    #[error("uri pattern MUST NOT end with \"?\"")]
    EndsWithQuestionMark,
    #[error("uri pattern MUST NOT contain empty path segments (a trailing forward slash creates one)")]
    ContainsEmptyPathSegment,
    #[error("uri pattern MUST NOT contain a fragment")]
    ContainsFragment,
    #[error("uri pattern MUST NOT contain `.` or `..` segments")]
    ContainsDotSegment,
    #[error("uri pattern contains path segment `{0}` ending with `}}`, but the label's opening `{{` was not found")]
    UnopenedLabel(String),
    #[error("uri pattern contains path segment `{0}` starting with `{{`, but the label's closing `}}` was not found")]
    UnclosedLabel(String),
    #[error("uri pattern contains a label without a name")]
    EmptyLabel,
    #[error("greedy label must be the last path segment")]
    GreedyNotLast,
    #[error("uri pattern contains more than one greedy label")]
    MultipleGreedy,
    #[error("query requirement has an empty key")]
    EmptyQueryKey,
    #[error("query key `{0}` is required more than once")]
    DuplicateQueryKey(String),
    #[error("path segment `{0}` contains a malformed percent-encoding")]
    MalformedEscape(String),
    #[error("HTTP method `{0}` is not supported")]
    UnsupportedMethod(String),
    #[error("invalid host prefix `{0}`: {1}")]
    InvalidHostPrefix(String, &'static str),
}

/// A single declarative request matcher.
///
/// Built once from the interface model and immutable afterwards. The
/// constructor enforces the structural rules (greedy last, at most one
/// greedy, no empty literals or keys), so a pattern that exists is valid.
///
/// # Example
///
/// ```
/// use http::Method;
/// use shapegate::router::{PathSegment, RoutePattern};
///
/// let pattern = RoutePattern::parse(Method::GET, "/files/{rest+}").unwrap();
/// assert_eq!(
///     pattern.path_segments(),
///     &[PathSegment::Literal("files".into()), PathSegment::Greedy]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutePattern {
    method: Method,
    path_segments: Vec<PathSegment>,
    // Sorted: the requirements form a set.
    query_segments: Vec<QuerySegment>,
    // Literals are stored lowercased; hosts compare case-insensitively.
    host_prefix: Option<Vec<HostPrefixSegment>>,
}

impl RoutePattern {
    /// Build a pattern from already-split segments.
    pub fn new(
        method: Method,
        path_segments: Vec<PathSegment>,
        query_segments: Vec<QuerySegment>,
    ) -> Result<Self, PatternError> {
        if !SUPPORTED_METHODS.contains(&method) {
            return Err(PatternError::UnsupportedMethod(method.to_string()));
        }

        let mut greedy_seen = false;
        for segment in &path_segments {
            match segment {
                PathSegment::Literal(text) if text.is_empty() => {
                    return Err(PatternError::ContainsEmptyPathSegment)
                }
                PathSegment::Greedy if greedy_seen => return Err(PatternError::MultipleGreedy),
                PathSegment::Greedy => greedy_seen = true,
                _ if greedy_seen => return Err(PatternError::GreedyNotLast),
                _ => {}
            }
        }

        let mut keys = HashSet::with_capacity(query_segments.len());
        for segment in &query_segments {
            if segment.key().is_empty() {
                return Err(PatternError::EmptyQueryKey);
            }
            if !keys.insert(segment.key()) {
                return Err(PatternError::DuplicateQueryKey(segment.key().to_string()));
            }
        }
        let mut query_segments = query_segments;
        query_segments.sort();

        Ok(Self {
            method,
            path_segments,
            query_segments,
            host_prefix: None,
        })
    }

    /// Parse a URI pattern such as `/path/{label}/{rest+}?key&flag=on`.
    ///
    /// Labels are written `{name}`; greedy labels `{name+}` (or `{+name}`).
    /// Label names only document the pattern and are not retained. In the
    /// query part a bare key or an empty value means the key must be present.
    pub fn parse(method: Method, uri: &str) -> Result<Self, PatternError> {
        if !uri.starts_with('/') {
            return Err(PatternError::DoesNotStartWithForwardSlash);
        }
        if uri.ends_with('?') {
            return Err(PatternError::EndsWithQuestionMark);
        }
        if uri.contains('#') {
            return Err(PatternError::ContainsFragment);
        }

        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (uri, None),
        };

        let path_segments = if path == "/" {
            Vec::new()
        } else {
            // Skip the empty piece before the mandatory leading slash.
            path.split('/')
                .skip(1)
                .map(parse_path_segment)
                .collect::<Result<Vec<_>, _>>()?
        };

        let query_segments = query
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(key, value)| {
                        if value.is_empty() {
                            QuerySegment::KeyPresent(key.into_owned())
                        } else {
                            QuerySegment::KeyValue(key.into_owned(), value.into_owned())
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self::new(method, path_segments, query_segments)
    }

    /// Attach a host prefix. Two labels may not be adjacent, since nothing
    /// would separate them.
    pub fn with_host_prefix(
        mut self,
        prefix: Vec<HostPrefixSegment>,
    ) -> Result<Self, PatternError> {
        let rendered = render_host_prefix(&prefix);
        if prefix.is_empty() {
            return Err(PatternError::InvalidHostPrefix(rendered, "prefix is empty"));
        }
        let mut previous_label = false;
        let mut normalized = Vec::with_capacity(prefix.len());
        for segment in prefix {
            match segment {
                HostPrefixSegment::Literal(text) if text.is_empty() => {
                    return Err(PatternError::InvalidHostPrefix(rendered, "empty literal"))
                }
                HostPrefixSegment::Literal(text) => {
                    previous_label = false;
                    normalized.push(HostPrefixSegment::Literal(text.to_ascii_lowercase()));
                }
                HostPrefixSegment::Label if previous_label => {
                    return Err(PatternError::InvalidHostPrefix(rendered, "adjacent labels"))
                }
                HostPrefixSegment::Label => {
                    previous_label = true;
                    normalized.push(HostPrefixSegment::Label);
                }
            }
        }
        self.host_prefix = Some(normalized);
        Ok(self)
    }

    /// Parse a host prefix such as `{bucket}.data.` into segments.
    pub fn parse_host_prefix(prefix: &str) -> Result<Vec<HostPrefixSegment>, PatternError> {
        let mut segments = Vec::new();
        let mut rest = prefix;
        while !rest.is_empty() {
            if let Some(after_open) = rest.strip_prefix('{') {
                let close = after_open.find('}').ok_or_else(|| {
                    PatternError::InvalidHostPrefix(prefix.to_string(), "unclosed label")
                })?;
                if close == 0 {
                    return Err(PatternError::EmptyLabel);
                }
                segments.push(HostPrefixSegment::Label);
                rest = &after_open[close + 1..];
            } else {
                let end = rest.find('{').unwrap_or(rest.len());
                let literal = &rest[..end];
                if literal.contains('}') {
                    return Err(PatternError::InvalidHostPrefix(
                        prefix.to_string(),
                        "unopened label",
                    ));
                }
                segments.push(HostPrefixSegment::Literal(literal.to_string()));
                rest = &rest[end..];
            }
        }
        Ok(segments)
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path_segments(&self) -> &[PathSegment] {
        &self.path_segments
    }

    #[must_use]
    pub fn query_segments(&self) -> &[QuerySegment] {
        &self.query_segments
    }

    #[must_use]
    pub fn host_prefix(&self) -> Option<&[HostPrefixSegment]> {
        self.host_prefix.as_deref()
    }

    /// Walk pattern and request segments pairwise, collecting label values.
    pub(crate) fn match_path(&self, segments: &[Cow<'_, str>]) -> Option<LabelVec> {
        let mut labels = LabelVec::new();
        let mut idx = 0;

        for segment in &self.path_segments {
            match segment {
                PathSegment::Literal(text) => {
                    if segments.get(idx)?.as_ref() != text.as_str() {
                        return None;
                    }
                    idx += 1;
                }
                PathSegment::Label => {
                    labels.push(segments.get(idx)?.to_string());
                    idx += 1;
                }
                PathSegment::Greedy => {
                    let rest = segments.get(idx..).filter(|rest| !rest.is_empty())?;
                    let joined = rest
                        .iter()
                        .map(AsRef::as_ref)
                        .collect::<Vec<&str>>()
                        .join("/");
                    labels.push(joined);
                    // Greedy is always last; nothing further to compare.
                    return Some(labels);
                }
            }
        }

        (idx == segments.len()).then_some(labels)
    }

    pub(crate) fn match_query(&self, query: &QueryParams) -> bool {
        self.query_segments.iter().all(|segment| match segment {
            QuerySegment::KeyPresent(key) => query.contains_key(key),
            QuerySegment::KeyValue(key, value) => query.contains_pair(key, value),
        })
    }

    /// A request without a host is not checked against the prefix.
    ///
    /// A label takes the shortest non-empty run of characters that lets the
    /// next literal match.
    pub(crate) fn match_host(&self, host: Option<&str>) -> bool {
        let (Some(prefix), Some(host)) = (self.host_prefix.as_deref(), host) else {
            return true;
        };
        let host = host.to_ascii_lowercase();
        let mut rest = host.as_str();

        for (i, segment) in prefix.iter().enumerate() {
            match segment {
                HostPrefixSegment::Literal(literal) => match rest.strip_prefix(literal.as_str()) {
                    Some(after) => rest = after,
                    None => return false,
                },
                HostPrefixSegment::Label => {
                    // A label is never empty, so the following literal is
                    // searched for from the second character on.
                    let end = match prefix.get(i + 1) {
                        Some(HostPrefixSegment::Literal(next)) => {
                            let skip = rest.chars().next().map_or(0, char::len_utf8);
                            rest.get(skip..)
                                .and_then(|tail| tail.find(next.as_str()))
                                .map(|pos| pos + skip)
                        }
                        _ => Some(rest.find('.').unwrap_or(rest.len())),
                    };
                    match end {
                        Some(end) if end > 0 => rest = &rest[end..],
                        _ => return false,
                    }
                }
            }
        }
        true
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.method)?;
        if let Some(prefix) = &self.host_prefix {
            write!(f, "[{}]", render_host_prefix(prefix))?;
        }
        if self.path_segments.is_empty() {
            f.write_str("/")?;
        }
        for segment in &self.path_segments {
            match segment {
                PathSegment::Literal(text) => write!(f, "/{text}")?,
                PathSegment::Label => f.write_str("/{label}")?,
                PathSegment::Greedy => f.write_str("/{greedy+}")?,
            }
        }
        for (i, segment) in self.query_segments.iter().enumerate() {
            f.write_str(if i == 0 { "?" } else { "&" })?;
            match segment {
                QuerySegment::KeyPresent(key) => f.write_str(key)?,
                QuerySegment::KeyValue(key, value) => write!(f, "{key}={value}")?,
            }
        }
        Ok(())
    }
}

fn parse_path_segment(segment: &str) -> Result<PathSegment, PatternError> {
    if segment.is_empty() {
        return Err(PatternError::ContainsEmptyPathSegment);
    }
    if segment == "." || segment == ".." {
        return Err(PatternError::ContainsDotSegment);
    }

    let opens = segment.starts_with('{');
    let closes = segment.ends_with('}');
    match (opens, closes) {
        (true, true) => {
            let name = &segment[1..segment.len() - 1];
            if let Some(greedy) = name.strip_suffix('+').or_else(|| name.strip_prefix('+')) {
                if greedy.is_empty() {
                    return Err(PatternError::EmptyLabel);
                }
                Ok(PathSegment::Greedy)
            } else if name.is_empty() {
                Err(PatternError::EmptyLabel)
            } else {
                Ok(PathSegment::Label)
            }
        }
        (true, false) => Err(PatternError::UnclosedLabel(segment.to_string())),
        (false, true) => Err(PatternError::UnopenedLabel(segment.to_string())),
        (false, false) => {
            // Requests are compared after decoding, so literals are too.
            let decoded = decode_component(segment)
                .ok_or_else(|| PatternError::MalformedEscape(segment.to_string()))?;
            if decoded == "." || decoded == ".." {
                return Err(PatternError::ContainsDotSegment);
            }
            Ok(PathSegment::Literal(decoded.into_owned()))
        }
    }
}

fn render_host_prefix(prefix: &[HostPrefixSegment]) -> String {
    prefix
        .iter()
        .map(|segment| match segment {
            HostPrefixSegment::Literal(text) => text.as_str(),
            HostPrefixSegment::Label => "{label}",
        })
        .collect()
}
