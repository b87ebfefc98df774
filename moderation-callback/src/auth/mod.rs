//! Authentication of inbound moderation requests.
//!
//! The moderation service signs each callback OAuth1-style (HMAC-SHA1,
//! single-legged, no token secret) and sends the protocol parameters in
//! the `Authorization` header.
//!
//! ```text
//! RequestContext → AuthHeader::parse → SignatureVerifier::verify
//!                                        ├─ key / timestamp / nonce checks
//!                                        ├─ ReplayGuard::check_and_record
//!                                        └─ base string → HMAC-SHA1 → compare
//! ```

pub mod header;
pub mod replay;
pub mod request;
pub mod signature;
pub mod verifier;

pub use header::AuthHeader;
pub use replay::{ReplayGuard, DEFAULT_WINDOW_SECS};
pub use request::{parse_parameters, RequestContext};
pub use verifier::{Credentials, SignatureVerifier};
