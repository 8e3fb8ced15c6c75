//! Authentication hook
//!
//! The receiver checks each batch's credentials through this trait. The
//! harness ships an accept-all stub: publisher tests exercise delivery and
//! lifecycle, not credential policy.

use faultline_protocol::Credentials;

/// Pluggable credential check for inbound batches
pub trait Authenticator: Send + Sync {
    /// Return true when the batch should be accepted
    fn authenticate(&self, credentials: &Credentials) -> bool;
}

/// Accept-all stub authenticator
///
/// Always reports success, independent of the credentials presented. This
/// is deliberate test-harness behavior, not a production policy.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl Authenticator for AcceptAll {
    fn authenticate(&self, _credentials: &Credentials) -> bool {
        true
    }
}

/// Reject-all authenticator for exercising the rejection path in tests
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectAll;

impl Authenticator for RejectAll {
    fn authenticate(&self, _credentials: &Credentials) -> bool {
        false
    }
}
