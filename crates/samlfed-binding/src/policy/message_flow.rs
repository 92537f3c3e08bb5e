//! Message freshness and replay rule.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use samlfed_cache::ReplayCache;

use super::context::PolicyContext;
use super::{PolicyError, SecurityPolicyRule};
use crate::config::RuleConfig;
use crate::message::{SecuredMessage, TransportRequest};

/// Configuration key enabling or disabling the replay check.
pub const CHECK_REPLAY_KEY: &str = "checkReplay";

/// Configuration key for the freshness window in seconds.
pub const EXPIRES_KEY: &str = "expires";

/// Checks message freshness and detects replays.
///
/// A message passes when its issue instant is no further in the future
/// than the tolerated clock skew, no older than the freshness window plus
/// skew, and its ID has not been seen before. Replay records are kept
/// exactly until the message would be rejected as stale anyway, so the
/// cache never holds more than one freshness window of IDs.
///
/// The rule reads the message ID and issue instant out of the context, so
/// an extraction rule such as [`MessageInfoRule`](super::MessageInfoRule)
/// must run before it.
pub struct MessageFlowRule {
    check_replay: bool,
    expires: Duration,
    clock_skew: Duration,
    replay_context: String,
    replay: Arc<ReplayCache>,
}

impl MessageFlowRule {
    /// Rule name used in logs and error attribution.
    pub const NAME: &'static str = "MessageFlow";

    /// Default freshness window.
    pub const DEFAULT_EXPIRES: Duration = Duration::from_secs(300);

    /// Default tolerated clock skew between federation partners.
    pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(180);

    /// Default replay cache context label.
    pub const DEFAULT_REPLAY_CONTEXT: &'static str = "MessageFlow";

    /// Creates the rule with default settings.
    #[must_use]
    pub fn new(replay: Arc<ReplayCache>) -> Self {
        Self {
            check_replay: true,
            expires: Self::DEFAULT_EXPIRES,
            clock_skew: Self::DEFAULT_CLOCK_SKEW,
            replay_context: Self::DEFAULT_REPLAY_CONTEXT.to_string(),
            replay,
        }
    }

    /// Builds the rule from configuration.
    ///
    /// Honors `checkReplay` (default `true`) and `expires` in seconds
    /// (default 300).
    #[must_use]
    pub fn from_config(config: &dyn RuleConfig, replay: Arc<ReplayCache>) -> Self {
        Self::new(replay)
            .with_check_replay(config.get_bool(CHECK_REPLAY_KEY, true))
            .with_expires(Duration::from_secs(
                config.get_u64(EXPIRES_KEY, Self::DEFAULT_EXPIRES.as_secs()),
            ))
    }

    /// Enables or disables the replay check, builder style.
    #[must_use]
    pub fn with_check_replay(mut self, check_replay: bool) -> Self {
        self.check_replay = check_replay;
        self
    }

    /// Replaces the freshness window, builder style.
    #[must_use]
    pub fn with_expires(mut self, expires: Duration) -> Self {
        self.expires = expires;
        self
    }

    /// Replaces the tolerated clock skew, builder style.
    #[must_use]
    pub fn with_clock_skew(mut self, clock_skew: Duration) -> Self {
        self.clock_skew = clock_skew;
        self
    }

    /// Replaces the replay cache context label, builder style.
    ///
    /// Distinct message flows sharing one replay cache should use distinct
    /// labels so their IDs cannot collide.
    #[must_use]
    pub fn with_replay_context(mut self, context: impl Into<String>) -> Self {
        self.replay_context = context.into();
        self
    }
}

impl SecurityPolicyRule for MessageFlowRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn evaluate(
        &self,
        _message: &dyn SecuredMessage,
        _request: Option<&dyn TransportRequest>,
        ctx: &mut PolicyContext,
    ) -> Result<(), PolicyError> {
        let message_id = ctx
            .message_id
            .clone()
            .ok_or(PolicyError::IncompleteMessage)?;
        let issue_instant = ctx.issue_instant.ok_or(PolicyError::IncompleteMessage)?;

        let now = Utc::now();
        let skew = to_delta(self.clock_skew);
        let window = to_delta(self.expires);

        let latest_acceptable_issue = saturating_add(now, skew);
        if issue_instant > latest_acceptable_issue {
            return Err(PolicyError::NotYetValid { issue_instant });
        }

        let lifetime = window.checked_add(&skew).unwrap_or(TimeDelta::MAX);
        let deadline = saturating_add(issue_instant, lifetime);
        if deadline <= now {
            return Err(PolicyError::Stale {
                issue_instant,
                expires: self.expires,
            });
        }

        if self.check_replay {
            // Keep the record until the message would be stale regardless.
            let first_seen = self
                .replay
                .check(&self.replay_context, &message_id, deadline)?;
            if !first_seen {
                return Err(PolicyError::Replay { message_id });
            }
        }
        Ok(())
    }
}

fn to_delta(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}

fn saturating_add(instant: DateTime<Utc>, delta: TimeDelta) -> DateTime<Utc> {
    instant
        .checked_add_signed(delta)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
