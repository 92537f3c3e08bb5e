//! XML signature rule.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::context::PolicyContext;
use super::{PolicyError, SecurityPolicyRule};
use crate::message::{SecuredMessage, TransportRequest};

/// Failure reported by a [`MessageSignatureVerifier`].
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SignatureVerifyError(pub String);

/// Verifies a message signature and resolves the signer.
///
/// The actual XML-DSig processing lives behind this trait. The policy rule
/// only cares whether the signature checks out and which issuer the
/// signing key belongs to; how the implementation canonicalizes, resolves
/// keys, and walks trust anchors is its own business.
pub trait MessageSignatureVerifier: Send + Sync {
    /// Verifies the message's signature and returns the authenticated
    /// issuer.
    ///
    /// # Errors
    ///
    /// Returns an error when the message is unsigned, the signature does
    /// not verify, or the signing key cannot be tied to a known issuer.
    fn verify(&self, message: &dyn SecuredMessage) -> Result<String, SignatureVerifyError>;
}

/// Authenticates the message issuer by XML signature.
///
/// On success the verified issuer lands in the context and the message
/// counts as authenticated. An issuer claim already in the context must
/// agree with the signer; a mismatch is treated as a failed verification,
/// not as grounds to silently prefer either identity.
pub struct XmlSigningRule {
    verifier: Arc<dyn MessageSignatureVerifier>,
}

impl XmlSigningRule {
    /// Rule name used in logs and error attribution.
    pub const NAME: &'static str = "XMLSigning";

    /// Creates the rule around a verifier.
    #[must_use]
    pub fn new(verifier: Arc<dyn MessageSignatureVerifier>) -> Self {
        Self { verifier }
    }
}

impl SecurityPolicyRule for XmlSigningRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn evaluate(
        &self,
        message: &dyn SecuredMessage,
        _request: Option<&dyn TransportRequest>,
        ctx: &mut PolicyContext,
    ) -> Result<(), PolicyError> {
        let signer = self
            .verifier
            .verify(message)
            .map_err(|e| PolicyError::SignatureInvalid(e.to_string()))?;
        if let Some(claimed) = &ctx.issuer {
            if claimed != &signer {
                return Err(PolicyError::SignatureInvalid(format!(
                    "message claims issuer '{claimed}' but was signed by '{signer}'"
                )));
            }
        }
        tracing::debug!("message signature verified, issuer '{signer}' authenticated");
        ctx.issuer = Some(signer);
        ctx.authenticated = true;
        Ok(())
    }
}

impl fmt::Debug for XmlSigningRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlSigningRule").finish_non_exhaustive()
    }
}
