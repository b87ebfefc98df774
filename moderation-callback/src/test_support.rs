//! Helpers for building requests signed the way the moderation service
//! signs them.

use crate::auth::header::{CONSUMER_KEY, NONCE, SIGNATURE, SIGNATURE_METHOD, TIMESTAMP};
use crate::auth::signature::{base_string, sign, signing_key};
use crate::auth::{AuthHeader, Credentials, RequestContext};

pub const SITE_URL: &str = "https://example.com";
pub const PUBLIC_KEY: &str = "pub-key";
pub const PRIVATE_KEY: &str = "s3cr3t/key";

pub fn credentials() -> Credentials {
    Credentials::new(PUBLIC_KEY, PRIVATE_KEY)
}

/// Authorization header value for `method path?query` with form `body`.
///
/// The query takes part in the parameter set, never in the signed URL.
pub fn authorization(
    method: &str,
    path: &str,
    query: &str,
    body: &[u8],
    nonce: &str,
    timestamp: i64,
) -> String {
    let request = RequestContext::new(method, path)
        .with_query(query)
        .with_form_body(body);
    let mut header = AuthHeader::from_pairs([
        (CONSUMER_KEY, PUBLIC_KEY.to_string()),
        (NONCE, nonce.to_string()),
        (SIGNATURE_METHOD, "HMAC-SHA1".to_string()),
        (TIMESTAMP, timestamp.to_string()),
    ]);
    let base = base_string(
        method,
        &format!("{}{}", SITE_URL, path),
        request
            .parameters
            .iter()
            .chain(header.params())
            .map(|(k, v)| (k.as_str(), v.as_str())),
    );
    header.insert(SIGNATURE, sign(&base, &signing_key(PRIVATE_KEY)).unwrap());
    header.to_header_value()
}

/// A fully signed request context.
pub fn signed_request(
    method: &str,
    path: &str,
    body: &[u8],
    nonce: &str,
    timestamp: i64,
) -> RequestContext {
    RequestContext::new(method, path)
        .with_form_body(body)
        .with_authorization(authorization(method, path, "", body, nonce, timestamp))
}
