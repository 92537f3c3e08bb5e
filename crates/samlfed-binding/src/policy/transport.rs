//! Transport-level client authentication rule.

use super::context::PolicyContext;
use super::{PolicyError, SecurityPolicyRule};
use crate::message::{SecuredMessage, TransportRequest};

/// Authenticates the message issuer from the transport peer identity.
///
/// Typically the peer identity is the subject of a TLS client certificate
/// already validated by the transport layer. The rule trusts that
/// validation; it only checks that an identity is present and agrees with
/// any issuer the message claims.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientCertAuthRule;

impl ClientCertAuthRule {
    /// Rule name used in logs and error attribution.
    pub const NAME: &'static str = "ClientCertAuth";

    /// Creates the rule.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SecurityPolicyRule for ClientCertAuthRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn evaluate(
        &self,
        _message: &dyn SecuredMessage,
        request: Option<&dyn TransportRequest>,
        ctx: &mut PolicyContext,
    ) -> Result<(), PolicyError> {
        let Some(request) = request else {
            return Err(PolicyError::TransportAuth(
                "no transport request to authenticate".to_string(),
            ));
        };
        let Some(peer) = request.peer_identity() else {
            return Err(PolicyError::TransportAuth(
                "transport peer is unauthenticated".to_string(),
            ));
        };
        if let Some(claimed) = &ctx.issuer {
            if claimed != peer {
                return Err(PolicyError::TransportAuth(format!(
                    "peer '{peer}' does not match claimed issuer '{claimed}'"
                )));
            }
        }
        match request.remote_addr() {
            Some(addr) => {
                tracing::debug!("transport peer '{peer}' at {addr} authenticated");
            }
            None => tracing::debug!("transport peer '{peer}' authenticated"),
        }
        ctx.issuer = Some(peer.to_string());
        ctx.authenticated = true;
        Ok(())
    }
}
