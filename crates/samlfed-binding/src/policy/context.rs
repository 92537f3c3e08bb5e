//! Evaluation context shared by policy rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Facts accumulated while a message moves through the rule pipeline.
///
/// Extraction rules fill the identification fields; authentication rules
/// set [`PolicyContext::issuer`] to the identity they verified and flip
/// [`PolicyContext::authenticated`]. Until that flag is set, the issuer is
/// nothing more than a claim read off the message.
///
/// The struct serializes as-is so it can be attached to audit events.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PolicyContext {
    /// Unique ID the message carries.
    pub message_id: Option<String>,
    /// Instant the message claims it was issued.
    pub issue_instant: Option<DateTime<Utc>>,
    /// ID of the request this message answers, when it is a response.
    pub in_response_to: Option<String>,
    /// Issuer of the message, claimed or verified per `authenticated`.
    pub issuer: Option<String>,
    /// Whether a rule has verified the issuer by signature or transport
    /// authentication.
    pub authenticated: bool,
}

impl PolicyContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all per-message state for reuse.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
