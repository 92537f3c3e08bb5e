//! Message and transport abstractions seen by policy rules.
//!
//! Rules never handle a concrete message type. They see two narrow views:
//! the security-relevant fields of the message itself, and the transport
//! request that delivered it. Any object model can sit behind these traits.

use chrono::{DateTime, Utc};

/// The security-relevant view of an inbound protocol message.
pub trait SecuredMessage {
    /// Returns the unique ID the message carries, if any.
    fn message_id(&self) -> Option<&str>;

    /// Returns the instant the message claims it was issued.
    fn issue_instant(&self) -> Option<DateTime<Utc>>;

    /// Returns the ID of the request this message answers, when it is a
    /// response.
    fn in_response_to(&self) -> Option<&str> {
        None
    }

    /// Returns the issuer the message claims. Unverified until a policy
    /// rule authenticates it.
    fn issuer(&self) -> Option<&str> {
        None
    }
}

/// The transport-level view of the request that delivered a message.
pub trait TransportRequest {
    /// Returns the transport-authenticated peer identity, such as the
    /// subject of a verified TLS client certificate.
    ///
    /// `None` means the transport did not authenticate the peer.
    fn peer_identity(&self) -> Option<&str>;

    /// Returns the peer's network address, for logging.
    fn remote_addr(&self) -> Option<&str> {
        None
    }
}
