use http::Method;
use std::borrow::Cow;

/// The parts of an incoming request the route table looks at.
///
/// Borrowed from whatever the server parsed; nothing is copied until a
/// route is actually tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest<'a> {
    pub method: Method,
    /// Raw (still percent-encoded) path, without the query string
    pub path: &'a str,
    /// Raw query string, without the leading `?`
    pub query: Option<&'a str>,
    /// Host the request was addressed to, if known
    pub host: Option<&'a str>,
}

impl<'a> RouteRequest<'a> {
    #[must_use]
    pub fn new(method: Method, path: &'a str) -> Self {
        Self {
            method,
            path,
            query: None,
            host: None,
        }
    }

    /// Split a request target such as `/a/b?x=1` into path and query.
    #[must_use]
    pub fn from_target(method: Method, target: &'a str) -> Self {
        match target.split_once('?') {
            Some((path, query)) => Self::new(method, path).with_query(Some(query)),
            None => Self::new(method, target),
        }
    }

    /// Take method, path, query and host from an `http::Request`.
    ///
    /// The host comes from the URI authority when present (absolute-form
    /// targets), otherwise from the `Host` header.
    #[must_use]
    pub fn from_http<B>(req: &'a http::Request<B>) -> Self {
        let host = req.uri().host().or_else(|| {
            req.headers()
                .get(http::header::HOST)
                .and_then(|value| value.to_str().ok())
        });
        Self {
            method: req.method().clone(),
            path: req.uri().path(),
            query: req.uri().query(),
            host,
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: Option<&'a str>) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_host(mut self, host: Option<&'a str>) -> Self {
        self.host = host;
        self
    }

    /// Decode the path and query once for the whole table walk.
    ///
    /// Returns `None` when either contains a malformed escape; such a request
    /// matches no pattern.
    pub(crate) fn decode(&self) -> Option<DecodedTarget<'a>> {
        let segments = decode_path(self.path)?;
        let query = match self.query {
            Some(raw) => QueryParams::parse(raw)?,
            None => QueryParams::default(),
        };
        Some(DecodedTarget { segments, query })
    }
}

/// Path segments and query parameters after percent-decoding.
#[derive(Debug, Default)]
pub(crate) struct DecodedTarget<'a> {
    pub(crate) segments: Vec<Cow<'a, str>>,
    pub(crate) query: QueryParams,
}

/// Decoded query parameters in request order. Repeated keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, Option<String>)>,
}

impl QueryParams {
    /// Parse a raw query string (`a=1&b&c=x+y`).
    ///
    /// `+` decodes to a space as in form encoding. Returns `None` on a
    /// malformed escape or an escape that decodes to invalid UTF-8.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut pairs = Vec::new();
        for pair in raw.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (pair, None),
            };
            let key = decode_form_component(key)?;
            let value = match value {
                Some(value) => Some(decode_form_component(value)?),
                None => None,
            };
            pairs.push((key, value));
        }
        Some(Self { pairs })
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Whether any occurrence of `key` carries exactly `value`.
    #[must_use]
    pub fn contains_pair(&self, key: &str, value: &str) -> bool {
        self.pairs
            .iter()
            .any(|(k, v)| k == key && v.as_deref().unwrap_or("") == value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Split on `/`, drop empty segments and percent-decode each one.
fn decode_path(path: &str) -> Option<Vec<Cow<'_, str>>> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(decode_component)
        .collect()
}

pub(super) fn decode_component(raw: &str) -> Option<Cow<'_, str>> {
    if !has_well_formed_escapes(raw) {
        return None;
    }
    urlencoding::decode(raw).ok()
}

fn decode_form_component(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    decode_component(&spaced).map(Cow::into_owned)
}

/// Every `%` must be followed by two hex digits.
fn has_well_formed_escapes(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            match (bytes.get(i + 1), bytes.get(i + 2)) {
                (Some(hi), Some(lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                    i += 3;
                }
                _ => return false,
            }
        } else {
            i += 1;
        }
    }
    true
}
