//! OAuth1 HMAC-SHA1 request signing primitives.
//!
//! Everything here is pure: the same inputs always produce the same base
//! string and signature. Percent-encoding follows RFC 3986 (space becomes
//! `%20`, only `A-Z a-z 0-9 - _ . ~` pass through).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use tracing::warn;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 percent-encoding.
pub fn percent_encode(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}

/// Serialize parameters as sorted `key=value` pairs joined by `&`.
///
/// Keys and values are encoded first and the encoded pairs are sorted
/// byte-wise, so repeated keys are all kept and ordered by value.
pub fn normalize_parameters<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut pairs: Vec<String> = params
        .into_iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect();
    pairs.sort();
    pairs.join("&")
}

/// Build the signature base string `METHOD&enc(url)&enc(params)`.
pub fn base_string<'a, I>(method: &str, url: &str, params: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    format!(
        "{}&{}&{}",
        method,
        percent_encode(url),
        percent_encode(&normalize_parameters(params))
    )
}

/// Signing key for single-legged OAuth: there is never a token secret.
pub fn signing_key(private_key: &str) -> String {
    format!("{}&", percent_encode(private_key))
}

/// Percent-encoded base64 HMAC-SHA1 of `base_string` under `key`.
pub fn sign(base_string: &str, key: &str) -> Option<String> {
    let mut mac = match HmacSha1::new_from_slice(key.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            warn!("oauth_signature_invalid_key");
            return None;
        }
    };
    mac.update(base_string.as_bytes());
    Some(percent_encode(&STANDARD.encode(mac.finalize().into_bytes())))
}

/// Constant-time string comparison to prevent timing attacks.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_encode_rfc3986() {
        assert_eq!(percent_encode("a b"), "a%20b");
        assert_eq!(percent_encode("-_.~"), "-_.~");
        assert_eq!(percent_encode("a+b/c=d&e"), "a%2Bb%2Fc%3Dd%26e");
        assert_eq!(percent_encode("é"), "%C3%A9");
    }

    #[test]
    fn test_normalize_parameters_sorts_and_keeps_duplicates() {
        let params = [("b", "2"), ("a", "z"), ("a", "y")];
        assert_eq!(normalize_parameters(params), "a=y&a=z&b=2");
    }

    #[test]
    fn test_sign_known_answer() {
        // RFC 2202 HMAC-SHA1 test case 2
        let sig = sign("what do ya want for nothing?", "Jefe").unwrap();
        assert_eq!(sig, "7%2FzfauXrL6LSdBbV8YTfnCWafHk%3D");
    }

    #[test]
    fn test_base_string_and_signature_known_answer() {
        let params = [
            ("oauth_consumer_key", "pub-key"),
            ("oauth_nonce", "n once"),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", "1700000000"),
            ("b", "2"),
            ("a", "x y"),
        ];
        let base = base_string("POST", "https://example.com/moderation/abc123/spam", params);

        assert_eq!(
            base,
            "POST&https%3A%2F%2Fexample.com%2Fmoderation%2Fabc123%2Fspam&a%3Dx%2520y%26b%3D2%26oauth_consumer_key%3Dpub-key%26oauth_nonce%3Dn%2520once%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1700000000"
        );
        assert_eq!(
            sign(&base, &signing_key("s3cr3t/key")).unwrap(),
            "N8fmGuI0wF807SBOQub9xZzuKWA%3D"
        );
    }

    #[test]
    fn test_signing_is_deterministic() {
        let params = [("x", "1"), ("y", "2")];
        let first = base_string("GET", "http://h/p", params);
        let second = base_string("GET", "http://h/p", params);
        assert_eq!(first, second);
        assert_eq!(sign(&first, "k&"), sign(&second, "k&"));
    }

    #[test]
    fn test_signing_key_has_empty_token_secret() {
        assert_eq!(signing_key("a b"), "a%20b&");
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
