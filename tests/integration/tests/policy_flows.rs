//! Security policy pipelines over inbound messages.
//!
//! Covers the standard extract, flow-check, authenticate rule ordering,
//! replay detection shared between endpoints, and replay tokens against a
//! store with bounded keys.

use std::sync::Arc;

use samlfed_binding::{
    ClientCertAuthRule, MessageFlowRule, MessageInfoRule, MessageSignatureVerifier, PolicyError,
    SecuredMessage, SecurityPolicy, SignatureVerifyError, XmlSigningRule,
};
use samlfed_cache::ReplayCache;

use crate::common::{CappedStore, TestEnv, TestMessage, TestRequest};

/// Verifier accepting every message as signed by a fixed issuer.
struct AcceptingVerifier(&'static str);

impl MessageSignatureVerifier for AcceptingVerifier {
    fn verify(&self, _message: &dyn SecuredMessage) -> Result<String, SignatureVerifyError> {
        Ok(self.0.to_string())
    }
}

/// Verifier refusing every message.
struct RejectingVerifier;

impl MessageSignatureVerifier for RejectingVerifier {
    fn verify(&self, _message: &dyn SecuredMessage) -> Result<String, SignatureVerifyError> {
        Err(SignatureVerifyError("no signature present".to_string()))
    }
}

/// Tests that a fresh, signed message passes the full standard pipeline
/// and comes out authenticated.
#[test]
fn test_policy_accepts_fresh_signed_response() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let replay = Arc::new(ReplayCache::new(env.store.clone()));

    let mut policy = SecurityPolicy::new()
        .with_rule(MessageInfoRule::new())
        .with_rule(MessageFlowRule::new(replay))
        .with_rule(XmlSigningRule::new(Arc::new(AcceptingVerifier(
            env.idp_entity_id,
        ))));

    let message = TestMessage::issued_by(env.idp_entity_id);
    policy.evaluate(&message, None)?;

    assert!(policy.is_authenticated());
    assert_eq!(policy.issuer(), Some(env.idp_entity_id));
    assert_eq!(policy.message_id(), Some(message.id.as_str()));
    Ok(())
}

/// Tests that a message accepted at one endpoint is rejected as a replay
/// at another endpoint sharing the same replay cache.
#[test]
fn test_replay_is_detected_across_endpoints() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let replay = Arc::new(ReplayCache::new(env.store.clone()));

    let mut sso_policy = SecurityPolicy::new()
        .with_rule(MessageInfoRule::new())
        .with_rule(MessageFlowRule::new(replay.clone()));
    let mut slo_policy = SecurityPolicy::new()
        .with_rule(MessageInfoRule::new())
        .with_rule(MessageFlowRule::new(replay));

    let message = TestMessage::issued_by(env.idp_entity_id);
    sso_policy.evaluate(&message, None)?;

    let err = slo_policy.evaluate(&message, None).unwrap_err();
    assert!(
        matches!(err, PolicyError::Replay { ref message_id } if *message_id == message.id),
        "expected a replay rejection, got {err}"
    );
    assert_eq!(err.rule(), MessageFlowRule::NAME);
    Ok(())
}

/// Tests that a message issued beyond the validity window is rejected.
#[test]
fn test_stale_message_is_rejected() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut policy = SecurityPolicy::new()
        .with_rule(MessageInfoRule::new())
        .with_rule(MessageFlowRule::new(Arc::new(ReplayCache::new(
            env.store.clone(),
        ))));

    // Well past the default 300s window plus 180s skew.
    let message = TestMessage::issued_by(env.idp_entity_id).issued_secs_ago(600);
    let err = policy.evaluate(&message, None).unwrap_err();
    assert!(matches!(err, PolicyError::Stale { .. }));
    assert_eq!(err.rule(), MessageFlowRule::NAME);
    Ok(())
}

/// Tests that a message claiming a future issue instant beyond the
/// allowed clock skew is rejected.
#[test]
fn test_future_message_is_rejected() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut policy = SecurityPolicy::new()
        .with_rule(MessageInfoRule::new())
        .with_rule(MessageFlowRule::new(Arc::new(ReplayCache::new(
            env.store.clone(),
        ))));

    let message = TestMessage::issued_by(env.idp_entity_id).issued_secs_ago(-600);
    let err = policy.evaluate(&message, None).unwrap_err();
    assert!(matches!(err, PolicyError::NotYetValid { .. }));
    Ok(())
}

/// Tests that TLS client authentication establishes the issuer, and that
/// a peer mismatch or a missing client certificate is rejected.
#[test]
fn test_mutual_tls_authenticates_the_requester() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut policy = SecurityPolicy::new()
        .with_rule(MessageInfoRule::new())
        .with_rule(ClientCertAuthRule::new());

    let message = TestMessage::issued_by(env.sp_entity_id);
    let request = TestRequest::from_peer(env.sp_entity_id);
    policy.evaluate(&message, Some(&request))?;
    assert!(policy.is_authenticated());
    assert_eq!(policy.issuer(), Some(env.sp_entity_id));

    let message = TestMessage::issued_by(env.sp_entity_id);
    let stranger = TestRequest::from_peer("https://stranger.example.net/");
    let err = policy.evaluate(&message, Some(&stranger)).unwrap_err();
    assert!(matches!(err, PolicyError::TransportAuth(_)));
    assert_eq!(err.rule(), ClientCertAuthRule::NAME);

    let message = TestMessage::issued_by(env.sp_entity_id);
    let err = policy
        .evaluate(&message, Some(&TestRequest::anonymous()))
        .unwrap_err();
    assert!(matches!(err, PolicyError::TransportAuth(_)));
    Ok(())
}

/// Tests that a message whose signature does not verify is rejected with
/// the failure attributed to the signing rule.
#[test]
fn test_unverifiable_signature_is_rejected() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut policy = SecurityPolicy::new()
        .with_rule(MessageInfoRule::new())
        .with_rule(XmlSigningRule::new(Arc::new(RejectingVerifier)));

    let message = TestMessage::issued_by(env.idp_entity_id);
    let err = policy.evaluate(&message, None).unwrap_err();
    assert!(matches!(err, PolicyError::SignatureInvalid(_)));
    assert_eq!(err.rule(), XmlSigningRule::NAME);
    assert!(!policy.is_authenticated());
    Ok(())
}

/// Tests that message IDs longer than the store's key cap are still
/// tracked for replay, which means they were shortened to digests.
#[test]
fn test_long_message_ids_fit_bounded_replay_stores() -> anyhow::Result<()> {
    let env = TestEnv::new();
    // The cap admits a 40-char digest but not the raw ID below.
    let store = Arc::new(CappedStore::with_max_key_len(64));
    let replay = Arc::new(ReplayCache::new(store));

    let mut policy = SecurityPolicy::new()
        .with_rule(MessageInfoRule::new())
        .with_rule(MessageFlowRule::new(replay));

    let mut message = TestMessage::issued_by(env.idp_entity_id);
    message.id = format!("{}{}", message.id, "x".repeat(60));
    assert!(message.id.len() > 64);

    policy.evaluate(&message, None)?;
    let err = policy.evaluate(&message, None).unwrap_err();
    assert!(matches!(err, PolicyError::Replay { .. }));
    Ok(())
}
