//! Inbound request authentication.
//!
//! Checks run in a fixed order and stop at the first failure: required
//! parameters, consumer key, timestamp freshness, nonce presence, nonce
//! replay, and finally the HMAC-SHA1 signature over the canonical base
//! string. Every rejection is recorded in the log sink with enough context
//! to diagnose it; the private key never is.

use std::sync::Arc;

use tracing::{debug, info};

use crate::auth::header::{AuthHeader, CONSUMER_KEY, NONCE, SIGNATURE, TIMESTAMP};
use crate::auth::replay::ReplayGuard;
use crate::auth::request::RequestContext;
use crate::auth::signature::{base_string, constant_time_compare, sign, signing_key};
use crate::diagnostics::{LogEntry, LogSink};
use crate::error::{AuthError, StoreError};
use crate::store::{ConfigStore, PRIVATE_KEY, PUBLIC_KEY};
use crate::util::{format_signed_interval, Clock};

/// Shared key pair issued by the moderation service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub public_key: String,
    pub private_key: String,
}

impl Credentials {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
        }
    }

    /// Read the key pair from the store. Either key missing or empty is a
    /// configuration error.
    pub fn load(store: &dyn ConfigStore) -> Result<Self, AuthError> {
        let public_key = store.get(PUBLIC_KEY)?.unwrap_or_default();
        let private_key = store.get(PRIVATE_KEY)?.unwrap_or_default();

        if public_key.is_empty() || private_key.is_empty() {
            return Err(AuthError::MissingConfiguration);
        }

        Ok(Self {
            public_key,
            private_key,
        })
    }

    pub fn save(&self, store: &dyn ConfigStore) -> Result<(), StoreError> {
        store.set(PUBLIC_KEY, &self.public_key)?;
        store.set(PRIVATE_KEY, &self.private_key)?;
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// OAuth1 HMAC-SHA1 verifier with nonce replay protection.
pub struct SignatureVerifier {
    site_url: String,
    store: Arc<dyn ConfigStore>,
    clock: Arc<dyn Clock>,
    window: i64,
    replay: ReplayGuard,
    sink: Arc<dyn LogSink>,
}

impl SignatureVerifier {
    /// `site_url` is the externally visible base URL the moderation service
    /// signs against; request paths are appended to it.
    pub fn new(
        site_url: &str,
        store: Arc<dyn ConfigStore>,
        clock: Arc<dyn Clock>,
        window: i64,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        let replay = ReplayGuard::new(store.clone(), clock.clone(), window);
        Self {
            site_url: site_url.trim_end_matches('/').to_string(),
            store,
            clock,
            window,
            replay,
            sink,
        }
    }

    /// Load credentials from the store and verify the request against them.
    pub fn authenticate(&self, request: &RequestContext) -> bool {
        let credentials = match Credentials::load(self.store.as_ref()) {
            Ok(c) => c,
            Err(e) => {
                let mut entry =
                    LogEntry::new(e.message()).with("request", request.request_line());
                if let AuthError::Store(inner) = &e {
                    entry = entry.with("error", inner.to_string());
                }
                self.sink.record(entry);
                return false;
            }
        };

        let header = AuthHeader::parse(request.authorization.as_deref().unwrap_or_default());
        self.verify(&header, &credentials, request)
    }

    /// Verify a parsed header. Records the rejection reason on failure.
    pub fn verify(
        &self,
        header: &AuthHeader,
        credentials: &Credentials,
        request: &RequestContext,
    ) -> bool {
        match self.check(header, credentials, request) {
            Ok(()) => {
                info!(
                    method = %request.method,
                    path = %request.path,
                    "oauth_request_verified"
                );
                true
            }
            Err(e) => {
                self.sink.record(diagnostic(&e, header, request));
                false
            }
        }
    }

    /// Run every check, returning the first failure.
    pub fn check(
        &self,
        header: &AuthHeader,
        credentials: &Credentials,
        request: &RequestContext,
    ) -> Result<(), AuthError> {
        if !header.has_required() {
            return Err(AuthError::MissingParameters);
        }

        let mut params = header.clone();
        let sent_signature = params.take(SIGNATURE).unwrap_or_default();

        let consumer_key = params.get(CONSUMER_KEY).unwrap_or_default();
        if consumer_key != credentials.public_key {
            return Err(AuthError::InvalidConsumerKey {
                observed: consumer_key.to_string(),
                expected: credentials.public_key.clone(),
            });
        }

        let now = self.clock.now();
        let raw_timestamp = params.get(TIMESTAMP).unwrap_or_default();
        match raw_timestamp.trim().parse::<i64>() {
            Ok(ts) if ts > now.saturating_sub(self.window) => {}
            Ok(ts) => {
                return Err(AuthError::OutdatedTimestamp {
                    difference: format_signed_interval(ts.saturating_sub(now)),
                });
            }
            Err(_) => {
                return Err(AuthError::OutdatedTimestamp {
                    difference: format!("unparseable timestamp {:?}", raw_timestamp),
                });
            }
        }

        let nonce = params.get(NONCE).unwrap_or_default();
        if nonce.is_empty() {
            return Err(AuthError::MissingNonce);
        }

        if !self.replay.check_and_record(nonce)? {
            return Err(AuthError::Replay);
        }

        let url = self.canonical_url(&request.path);
        let base = base_string(
            &request.method,
            &url,
            request
                .parameters
                .iter()
                .chain(params.params())
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );
        let expected = sign(&base, &signing_key(&credentials.private_key)).unwrap_or_default();

        debug!(base_string = %base, "oauth_base_string_built");

        if expected.is_empty() || !constant_time_compare(&expected, &sent_signature) {
            return Err(AuthError::InvalidSignature {
                base_string: base,
                expected,
                sent: sent_signature,
            });
        }

        Ok(())
    }

    /// Base site URL plus request path.
    pub fn canonical_url(&self, path: &str) -> String {
        format!("{}{}", self.site_url, path)
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("site_url", &self.site_url)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

/// Build the log entry for a rejection.
fn diagnostic(error: &AuthError, header: &AuthHeader, request: &RequestContext) -> LogEntry {
    let mut shown = header.clone();
    if !matches!(error, AuthError::MissingParameters) {
        shown.take(SIGNATURE);
    }

    let entry = LogEntry::new(error.message())
        .with("request", request.request_line())
        .with("headers", shown.describe());

    match error {
        AuthError::InvalidConsumerKey { expected, .. } => entry.with("public_key", expected.clone()),
        AuthError::OutdatedTimestamp { difference } => {
            entry.with("time_difference", difference.clone())
        }
        AuthError::InvalidSignature {
            base_string,
            expected,
            sent,
        } => entry
            .with("signature", sent.clone())
            .with("base_string", base_string.clone())
            .with("expected_signature", expected.clone()),
        AuthError::Store(inner) => entry.with("error", inner.to_string()),
        _ => entry,
    }
}
