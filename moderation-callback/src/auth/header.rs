//! OAuth `Authorization` header parsing.

/// Consumer key parameter.
pub const CONSUMER_KEY: &str = "oauth_consumer_key";
/// Nonce parameter.
pub const NONCE: &str = "oauth_nonce";
/// Timestamp parameter (unix seconds).
pub const TIMESTAMP: &str = "oauth_timestamp";
/// Signature method parameter.
pub const SIGNATURE_METHOD: &str = "oauth_signature_method";
/// Signature parameter.
pub const SIGNATURE: &str = "oauth_signature";

/// Parameters that must all be present before anything else is checked.
pub const REQUIRED: [&str; 5] = [CONSUMER_KEY, NONCE, TIMESTAMP, SIGNATURE_METHOD, SIGNATURE];

/// Protocol parameters extracted from an `Authorization: OAuth ...` header.
///
/// Kept as an ordered list of pairs rather than a map: canonicalization
/// sorts on its own and must not depend on how the header was laid out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthHeader {
    params: Vec<(String, String)>,
}

impl AuthHeader {
    /// Parse a raw header value such as
    /// `OAuth oauth_consumer_key="abc", oauth_nonce="x%20y"`.
    ///
    /// Values are percent-decoded. Anything that is not an `oauth_*`
    /// parameter (including `realm`) is dropped. Malformed input yields an
    /// empty or partial header, which later fails the required-parameter
    /// check.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let body = match raw.get(..6) {
            Some(scheme) if scheme.eq_ignore_ascii_case("oauth ") => &raw[6..],
            _ => return Self::default(),
        };

        let params = body
            .split(',')
            .filter_map(|part| {
                let (key, value) = part.trim().split_once('=')?;
                let key = key.trim();
                if !key.starts_with("oauth_") {
                    return None;
                }
                let value = value.trim();
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value);
                let decoded = urlencoding::decode(value)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| value.to_string());
                Some((key.to_string(), decoded))
            })
            .collect();

        Self { params }
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// True when every parameter in [`REQUIRED`] is present.
    pub fn has_required(&self) -> bool {
        REQUIRED.iter().all(|key| self.get(key).is_some())
    }

    /// Remove every occurrence of `key`, returning the first value.
    pub fn take(&mut self, key: &str) -> Option<String> {
        let first = self.get(key).map(str::to_string);
        self.params.retain(|(k, _)| k != key);
        first
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.push((key.into(), value.into()));
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Render back into header form, values percent-encoded.
    pub fn to_header_value(&self) -> String {
        let pairs: Vec<String> = self
            .params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, urlencoding::encode(v)))
            .collect();
        format!("OAuth {}", pairs.join(", "))
    }

    /// Compact `key=value, ...` form used in diagnostics.
    pub fn describe(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
