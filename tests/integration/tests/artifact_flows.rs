//! Artifact issue and resolve round trips.
//!
//! Covers the wire form of artifacts, one-time release, relying-party
//! binding, and resolution through a store shared by several maps.

use std::time::Duration;

use samlfed_artifact::{SamlArtifact, SourceId};
use samlfed_binding::{ArtifactMap, BindingError, RawXmlPayload};

use crate::common::TestEnv;

const TTL: Duration = Duration::from_secs(180);

/// Tests the full issue, transmit, resolve round trip across two maps
/// sharing one store, the way two cluster members would.
#[test]
fn test_artifact_round_trip_across_nodes() -> anyhow::Result<()> {
    let env = TestEnv::new();

    // Issuing node: mint an artifact and park the response under it.
    let issuing_map = env.artifact_map();
    let source = SourceId::from_entity_id(env.idp_entity_id);
    let artifact = SamlArtifact::type0004(source, 1);
    let response = RawXmlPayload::new(env.response_xml("_resp-1"))?;
    issuing_map.store(response, &artifact, Some(env.sp_entity_id), TTL)?;

    // The artifact travels to the relying party as base64 text.
    let wire = artifact.encode();
    assert!(
        wire.starts_with("AAQAA"),
        "type 0x0004 artifact should encode with the AAQAA prefix, got {wire}"
    );

    // Resolving node: decode the wire form and release the response.
    let resolving_map = env.artifact_map();
    let received = SamlArtifact::decode(&wire)?;
    assert_eq!(received, artifact);
    assert_eq!(received.endpoint_index(), Some(1));

    let bound_to = resolving_map.relying_party_of(&received)?;
    assert_eq!(bound_to.as_deref(), Some(env.sp_entity_id));

    let resolved = resolving_map.retrieve(&received, Some(env.sp_entity_id))?;
    assert!(
        resolved.as_str().contains("_resp-1"),
        "resolved payload should be the stored response"
    );

    // The mapping is gone everywhere, not just on the resolving node.
    assert!(matches!(
        issuing_map.retrieve(&received, Some(env.sp_entity_id)),
        Err(BindingError::NotFound)
    ));
    Ok(())
}

/// Tests that an artifact resolves exactly once.
#[test]
fn test_artifact_resolves_exactly_once() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let map: ArtifactMap<RawXmlPayload> = ArtifactMap::in_memory();

    let artifact = SamlArtifact::type0001(SourceId::from_entity_id(env.idp_entity_id));
    let response = RawXmlPayload::new(env.response_xml("_resp-2"))?;
    map.store(response, &artifact, Some(env.sp_entity_id), TTL)?;

    map.retrieve(&artifact, Some(env.sp_entity_id))?;
    assert!(matches!(
        map.retrieve(&artifact, Some(env.sp_entity_id)),
        Err(BindingError::NotFound)
    ));
    Ok(())
}

/// Tests that a party other than the bound one cannot claim an artifact,
/// and that the attempt destroys the mapping.
#[test]
fn test_foreign_party_cannot_claim_an_artifact() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let map = env.artifact_map();

    let artifact = SamlArtifact::type0004(SourceId::from_entity_id(env.idp_entity_id), 0);
    let response = RawXmlPayload::new(env.response_xml("_resp-3"))?;
    map.store(response, &artifact, Some(env.sp_entity_id), TTL)?;

    let err = map
        .retrieve(&artifact, Some("https://eavesdropper.example.net/"))
        .unwrap_err();
    assert!(
        matches!(err, BindingError::Unauthorized { .. }),
        "foreign party should be refused, got {err}"
    );

    // The legitimate party is locked out too, the mapping burned.
    assert!(matches!(
        map.retrieve(&artifact, Some(env.sp_entity_id)),
        Err(BindingError::NotFound)
    ));
    Ok(())
}

/// Tests that an artifact past its TTL is not released.
#[test]
fn test_expired_artifact_is_not_released() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let map: ArtifactMap<RawXmlPayload> = ArtifactMap::in_memory();

    let artifact = SamlArtifact::type0001(SourceId::from_entity_id(env.idp_entity_id));
    let response = RawXmlPayload::new(env.response_xml("_resp-4"))?;
    map.store(response, &artifact, Some(env.sp_entity_id), Duration::ZERO)?;

    assert!(matches!(
        map.retrieve(&artifact, Some(env.sp_entity_id)),
        Err(BindingError::Expired)
    ));
    Ok(())
}

/// Tests that two nodes sharing a store cannot both park a message under
/// the same artifact handle.
#[test]
fn test_duplicate_handles_are_refused_across_nodes() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let map_a = env.artifact_map();
    let map_b = env.artifact_map();

    let artifact = SamlArtifact::type0004(SourceId::from_entity_id(env.idp_entity_id), 2);
    let first = RawXmlPayload::new(env.response_xml("_resp-5a"))?;
    map_a.store(first, &artifact, Some(env.sp_entity_id), TTL)?;

    let second = RawXmlPayload::new(env.response_xml("_resp-5b"))?;
    let err = map_b
        .store(second, &artifact, Some(env.sp_entity_id), TTL)
        .unwrap_err();
    assert!(matches!(err, BindingError::DuplicateArtifact));

    // The first mapping is untouched by the refused insert.
    let resolved = map_a.retrieve(&artifact, Some(env.sp_entity_id))?;
    assert!(resolved.as_str().contains("_resp-5a"));
    Ok(())
}

/// Tests that an unbound mapping is released to any requester, anonymous
/// included.
#[test]
fn test_unbound_artifact_resolves_for_anyone() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let map = env.artifact_map();

    let artifact = SamlArtifact::type0004(SourceId::from_entity_id(env.idp_entity_id), 0);
    let response = RawXmlPayload::new(env.response_xml("_resp-6"))?;
    map.store(response, &artifact, None, TTL)?;

    assert_eq!(map.relying_party_of(&artifact)?, None);
    let resolved = map.retrieve(&artifact, None)?;
    assert!(resolved.as_str().contains("_resp-6"));
    Ok(())
}
