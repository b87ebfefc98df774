//! The parts of an inbound HTTP request that authentication needs.

use url::form_urlencoded;

/// Transport-level view of one inbound request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// HTTP method exactly as received.
    pub method: String,
    /// Request path, without the query string.
    pub path: String,
    /// Query string, if any (used for diagnostics only).
    pub query: Option<String>,
    /// Query and form-body parameters, duplicates preserved.
    pub parameters: Vec<(String, String)>,
    /// Raw `Authorization` header value.
    pub authorization: Option<String>,
}

impl RequestContext {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.parameters.extend(parse_parameters(query.as_bytes()));
        self.query = Some(query.to_string());
        self
    }

    pub fn with_form_body(mut self, body: &[u8]) -> Self {
        self.parameters.extend(parse_parameters(body));
        self
    }

    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    /// `METHOD /path?query`, for log context.
    pub fn request_line(&self) -> String {
        match &self.query {
            Some(q) if !q.is_empty() => format!("{} {}?{}", self.method, self.path, q),
            _ => format!("{} {}", self.method, self.path),
        }
    }
}

/// Decode an `application/x-www-form-urlencoded` payload into pairs.
pub fn parse_parameters(input: &[u8]) -> Vec<(String, String)> {
    form_urlencoded::parse(input).into_owned().collect()
}
