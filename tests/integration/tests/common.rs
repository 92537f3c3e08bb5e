//! Common test utilities and fixtures.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use samlfed_binding::{ArtifactMap, RawXmlPayload, SecuredMessage, TransportRequest};
use samlfed_cache::{MemoryTextStore, StoreCaps, StoreError, StoreResult, TextStore};

/// Test environment wiring logical nodes to one shared text store.
pub struct TestEnv {
    /// Identity provider entity ID.
    pub idp_entity_id: &'static str,
    /// Relying party entity ID.
    pub sp_entity_id: &'static str,
    /// Shared store standing in for the cluster cache.
    pub store: Arc<MemoryTextStore>,
}

impl TestEnv {
    /// Creates a new test environment with a fresh shared store.
    pub fn new() -> Self {
        init_tracing();
        Self {
            idp_entity_id: "https://idp.example.org/saml",
            sp_entity_id: "https://sp.example.org/saml",
            store: Arc::new(MemoryTextStore::new()),
        }
    }

    /// Creates an artifact map backed by the shared store.
    ///
    /// Every map returned here sees the same mappings, like maps running
    /// on different cluster members would.
    pub fn artifact_map(&self) -> ArtifactMap<RawXmlPayload> {
        ArtifactMap::with_store(self.store.clone())
    }

    /// Builds a SAML response document carrying the given message ID.
    pub fn response_xml(&self, message_id: &str) -> String {
        format!(
            concat!(
                "<samlp:Response xmlns:samlp=\"urn:oasis:names:tc:SAML:2.0:protocol\" ",
                "ID=\"{id}\" Version=\"2.0\">",
                "<saml:Issuer xmlns:saml=\"urn:oasis:names:tc:SAML:2.0:assertion\">{issuer}</saml:Issuer>",
                "</samlp:Response>"
            ),
            id = message_id,
            issuer = self.idp_entity_id,
        )
    }
}

/// Initializes tracing output for tests. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("samlfed_binding=debug,samlfed_cache=debug")
        .try_init();
}

/// Returns a fresh NCName-shaped message ID.
pub fn message_id() -> String {
    format!("_{}", uuid::Uuid::new_v4())
}

/// In-memory stand-in for a received SAML message.
pub struct TestMessage {
    /// Message ID.
    pub id: String,
    /// Claimed issue instant.
    pub instant: DateTime<Utc>,
    /// Claimed issuer entity ID.
    pub issuer: Option<String>,
}

impl TestMessage {
    /// Creates a freshly issued message claiming the given issuer.
    pub fn issued_by(issuer: &str) -> Self {
        Self {
            id: message_id(),
            instant: Utc::now(),
            issuer: Some(issuer.to_string()),
        }
    }

    /// Shifts the claimed issue instant by `secs` seconds.
    pub fn issued_secs_ago(mut self, secs: i64) -> Self {
        self.instant = Utc::now() - chrono::Duration::seconds(secs);
        self
    }
}

impl SecuredMessage for TestMessage {
    fn message_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn issue_instant(&self) -> Option<DateTime<Utc>> {
        Some(self.instant)
    }

    fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }
}

/// Transport request as an HTTPS front end would describe it.
pub struct TestRequest {
    /// Authenticated TLS peer, if any.
    pub peer: Option<String>,
    /// Remote socket address.
    pub addr: Option<String>,
}

impl TestRequest {
    /// Creates a request whose TLS layer authenticated `peer`.
    pub fn from_peer(peer: &str) -> Self {
        Self {
            peer: Some(peer.to_string()),
            addr: Some("203.0.113.7:49152".to_string()),
        }
    }

    /// Creates a request with no client authentication.
    pub fn anonymous() -> Self {
        Self {
            peer: None,
            addr: Some("203.0.113.7:49152".to_string()),
        }
    }
}

impl TransportRequest for TestRequest {
    fn peer_identity(&self) -> Option<&str> {
        self.peer.as_deref()
    }

    fn remote_addr(&self) -> Option<&str> {
        self.addr.as_deref()
    }
}

/// Store that enforces tight key caps like an external backend would.
///
/// Rejects any key longer than its cap instead of silently accepting it,
/// so a test passing through this store proves the caller shortened its
/// keys.
pub struct CappedStore {
    inner: MemoryTextStore,
    caps: StoreCaps,
}

impl CappedStore {
    /// Creates a store refusing keys longer than `max_key_len` bytes.
    pub fn with_max_key_len(max_key_len: usize) -> Self {
        Self {
            inner: MemoryTextStore::new(),
            caps: StoreCaps {
                max_context_len: 255,
                max_key_len,
                max_value_len: StoreCaps::UNBOUNDED,
            },
        }
    }

    fn check_key(&self, key: &str) -> StoreResult<()> {
        if key.len() > self.caps.max_key_len {
            return Err(StoreError::KeyTooLong {
                len: key.len(),
                max: self.caps.max_key_len,
            });
        }
        Ok(())
    }
}

impl TextStore for CappedStore {
    fn caps(&self) -> StoreCaps {
        self.caps
    }

    fn create_text(
        &self,
        context: &str,
        key: &str,
        value: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        self.check_key(key)?;
        self.inner.create_text(context, key, value, expires_at)
    }

    fn read_text(&self, context: &str, key: &str) -> StoreResult<Option<String>> {
        self.check_key(key)?;
        self.inner.read_text(context, key)
    }

    fn delete_text(&self, context: &str, key: &str) -> StoreResult<bool> {
        self.check_key(key)?;
        self.inner.delete_text(context, key)
    }

    fn reap(&self, context: &str) -> StoreResult<usize> {
        self.inner.reap(context)
    }

    fn delete_context(&self, context: &str) -> StoreResult<usize> {
        self.inner.delete_context(context)
    }
}
