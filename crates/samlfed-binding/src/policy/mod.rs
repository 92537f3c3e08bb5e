//! Security policy evaluation for inbound messages.
//!
//! A [`SecurityPolicy`] is an ordered pipeline of rules. Each rule reads
//! the inbound message and, where relevant, the transport request, records
//! what it learned in the shared [`PolicyContext`], and either accepts or
//! rejects. The first rejection stops the pipeline and carries the name of
//! the rule that raised it.
//!
//! Order matters: extraction rules such as [`MessageInfoRule`] must run
//! before the rules that consume the extracted fields, such as
//! [`MessageFlowRule`].

mod context;
mod message_flow;
mod message_info;
mod signing;
mod transport;

pub use context::*;
pub use message_flow::*;
pub use message_info::*;
pub use signing::*;
pub use transport::*;

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::message::{SecuredMessage, TransportRequest};
use samlfed_cache::StoreError;

/// Reason a security policy rejected a message.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The message carries no ID or no issue instant, so flow checks
    /// cannot be applied.
    #[error("message is missing its ID or issue instant")]
    IncompleteMessage,

    /// The message claims an issue instant further in the future than the
    /// allowed clock skew.
    #[error("message issued at {issue_instant} is in the future")]
    NotYetValid {
        /// Issue instant the message claimed.
        issue_instant: DateTime<Utc>,
    },

    /// The message was issued too long ago.
    #[error("message issued at {issue_instant} is older than the {}s validity window", expires.as_secs())]
    Stale {
        /// Issue instant the message claimed.
        issue_instant: DateTime<Utc>,
        /// Validity window the rule enforced, not counting clock skew.
        expires: Duration,
    },

    /// A message with the same ID was already accepted.
    #[error("message '{message_id}' was already processed")]
    Replay {
        /// ID of the replayed message.
        message_id: String,
    },

    /// The message signature is missing, does not verify, or contradicts
    /// the claimed issuer.
    #[error("signature verification failed: {0}")]
    SignatureInvalid(String),

    /// The transport peer is absent, unauthenticated, or contradicts the
    /// claimed issuer.
    #[error("transport authentication failed: {0}")]
    TransportAuth(String),

    /// The replay cache's backing store failed.
    #[error(transparent)]
    ReplayStore(#[from] StoreError),
}

impl PolicyError {
    /// Name of the rule this error is attributed to.
    #[must_use]
    pub const fn rule(&self) -> &'static str {
        match self {
            Self::IncompleteMessage
            | Self::NotYetValid { .. }
            | Self::Stale { .. }
            | Self::Replay { .. }
            | Self::ReplayStore(_) => MessageFlowRule::NAME,
            Self::SignatureInvalid(_) => XmlSigningRule::NAME,
            Self::TransportAuth(_) => ClientCertAuthRule::NAME,
        }
    }
}

/// One link in a security policy pipeline.
pub trait SecurityPolicyRule: Send + Sync {
    /// Short rule name used in logs and error attribution.
    fn name(&self) -> &'static str;

    /// Evaluates the rule against an inbound message.
    ///
    /// Rules communicate through `ctx`: earlier rules record extracted
    /// fields and authentication results there, later rules read them.
    ///
    /// # Errors
    ///
    /// Returns a [`PolicyError`] when the message violates the rule. The
    /// whole pipeline stops at the first error.
    fn evaluate(
        &self,
        message: &dyn SecuredMessage,
        request: Option<&dyn TransportRequest>,
        ctx: &mut PolicyContext,
    ) -> Result<(), PolicyError>;
}

/// Ordered pipeline of [`SecurityPolicyRule`]s with a reusable context.
///
/// The policy owns its [`PolicyContext`] and resets it at the start of
/// every evaluation, so one policy instance can vet a stream of messages.
/// After a successful evaluation the context holds whatever the rules
/// extracted and authenticated for the caller to act on.
#[derive(Default)]
pub struct SecurityPolicy {
    rules: Vec<Box<dyn SecurityPolicyRule>>,
    ctx: PolicyContext,
}

impl SecurityPolicy {
    /// Creates an empty policy. A policy without rules accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule, builder style.
    #[must_use]
    pub fn with_rule(mut self, rule: impl SecurityPolicyRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Appends an already boxed rule.
    pub fn push_rule(&mut self, rule: Box<dyn SecurityPolicyRule>) {
        self.rules.push(rule);
    }

    /// Runs every rule against the message, in registration order.
    ///
    /// The internal context is reset first, then handed through the rules.
    /// Evaluation stops at the first rejection.
    ///
    /// # Errors
    ///
    /// Returns the first [`PolicyError`] any rule raises. The context
    /// keeps whatever was recorded up to that point; the next call starts
    /// clean again.
    pub fn evaluate(
        &mut self,
        message: &dyn SecuredMessage,
        request: Option<&dyn TransportRequest>,
    ) -> Result<(), PolicyError> {
        self.ctx.reset();
        for rule in &self.rules {
            tracing::debug!("evaluating security policy rule '{}'", rule.name());
            if let Err(err) = rule.evaluate(message, request, &mut self.ctx) {
                tracing::warn!(
                    "security policy rule '{}' rejected message: {err}",
                    rule.name()
                );
                return Err(err);
            }
        }
        Ok(())
    }

    /// Clears the accumulated context without evaluating anything.
    pub fn reset(&mut self) {
        self.ctx.reset();
    }

    /// Context populated by the most recent evaluation.
    #[must_use]
    pub const fn context(&self) -> &PolicyContext {
        &self.ctx
    }

    /// Message ID extracted by the most recent evaluation, if any.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.ctx.message_id.as_deref()
    }

    /// Issuer established by the most recent evaluation, if any.
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.ctx.issuer.as_deref()
    }

    /// Whether the most recent evaluation authenticated the issuer.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.ctx.authenticated
    }
}

impl fmt::Debug for SecurityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.rules.iter().map(|r| r.name()).collect();
        f.debug_struct("SecurityPolicy")
            .field("rules", &names)
            .field("ctx", &self.ctx)
            .finish()
    }
}
