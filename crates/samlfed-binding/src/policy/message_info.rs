//! Message identification rule.

use super::context::PolicyContext;
use super::{PolicyError, SecurityPolicyRule};
use crate::message::{SecuredMessage, TransportRequest};

/// Extracts message identification into the policy context.
///
/// Runs first so later rules find the message ID, issue instant, response
/// correlation, and claimed issuer already in the context. Extraction is
/// lenient: missing fields stay `None`, and it is up to later rules to
/// demand the ones they need.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageInfoRule;

impl MessageInfoRule {
    /// Rule name used in logs and error attribution.
    pub const NAME: &'static str = "MessageInfo";

    /// Creates the rule.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SecurityPolicyRule for MessageInfoRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn evaluate(
        &self,
        message: &dyn SecuredMessage,
        _request: Option<&dyn TransportRequest>,
        ctx: &mut PolicyContext,
    ) -> Result<(), PolicyError> {
        ctx.message_id = message.message_id().map(str::to_string);
        ctx.issue_instant = message.issue_instant();
        ctx.in_response_to = message.in_response_to().map(str::to_string);
        // Never overwrite an issuer another rule already authenticated.
        if ctx.issuer.is_none() {
            ctx.issuer = message.issuer().map(str::to_string);
        }
        tracing::debug!(
            "message identified: id={:?} issuer={:?}",
            ctx.message_id,
            ctx.issuer
        );
        Ok(())
    }
}
