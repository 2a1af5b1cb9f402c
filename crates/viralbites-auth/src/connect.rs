//! Client-side connect flow: waits for one OAuth outcome from whichever
//! source resolves first.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use serde::Serialize;
use tokio::sync::mpsc;
use viralbites_core::SocialPlatform;

use crate::message::AuthMessage;

pub const WINDOW_CLOSED: &str = "Authentication window closed";
pub const TIMED_OUT: &str = "Authentication timed out";
pub const ALREADY_IN_PROGRESS: &str = "A connection attempt is already in progress";

/// Default interval between checks of the window-closed probe.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Outcome of one connect attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectResponse {
    pub success: bool,
    pub platform: SocialPlatform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectResponse {
    fn connected(platform: SocialPlatform, token: String) -> Self {
        Self {
            success: true,
            platform,
            token: Some(token),
            error: None,
        }
    }

    fn failed(platform: SocialPlatform, error: impl Into<String>) -> Self {
        Self {
            success: false,
            platform,
            token: None,
            error: Some(error.into()),
        }
    }

    /// True when the user closed the window; callers should stay silent.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        !self.success && self.error.as_deref() == Some(WINDOW_CLOSED)
    }
}

/// The three ways a pending connection can resolve.
pub struct ConnectSources {
    /// Messages relayed from the callback route.
    pub messages: mpsc::Receiver<AuthMessage>,
    /// Returns true once the user has abandoned the attempt.
    pub closed: Box<dyn Fn() -> bool + Send>,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl ConnectSources {
    #[must_use]
    pub fn new(messages: mpsc::Receiver<AuthMessage>, timeout: Duration) -> Self {
        Self {
            messages,
            closed: Box::new(|| false),
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout,
        }
    }

    #[must_use]
    pub fn with_closed_probe(mut self, closed: impl Fn() -> bool + Send + 'static) -> Self {
        self.closed = Box::new(closed);
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

impl std::fmt::Debug for ConnectSources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectSources")
            .field("poll_interval", &self.poll_interval)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Allows at most one connect attempt at a time.
#[derive(Debug, Clone, Default)]
pub struct Connector {
    in_flight: Arc<AtomicBool>,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Connector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_connecting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Waits for the first of: a relayed message for `platform`, the closed
    /// probe reporting true, or the timeout. Exactly one outcome is
    /// returned and the in-flight flag is cleared on every path.
    pub async fn connect(
        &self,
        platform: SocialPlatform,
        mut sources: ConnectSources,
    ) -> ConnectResponse {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return ConnectResponse::failed(platform, ALREADY_IN_PROGRESS);
        }
        let _guard = InFlight(&self.in_flight);

        let deadline = tokio::time::sleep(sources.timeout);
        tokio::pin!(deadline);
        let mut poll = tokio::time::interval(sources.poll_interval);
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        let outcome = loop {
            tokio::select! {
                biased;

                message = sources.messages.recv() => match message {
                    Some(message) if message.is_for(platform) => break match message {
                        AuthMessage::Success { token, .. } => {
                            ConnectResponse::connected(platform, token)
                        }
                        AuthMessage::Error { error, .. } => ConnectResponse::failed(platform, error),
                    },
                    Some(other) => {
                        tracing::debug!(
                            expected = %platform,
                            received = other.platform(),
                            "ignoring auth message for another platform"
                        );
                    }
                    None => break ConnectResponse::failed(platform, WINDOW_CLOSED),
                },
                _ = poll.tick() => {
                    if (sources.closed)() {
                        break ConnectResponse::failed(platform, WINDOW_CLOSED);
                    }
                }
                () = &mut deadline => break ConnectResponse::failed(platform, TIMED_OUT),
            }
        };

        if outcome.success {
            tracing::info!(%platform, "account connected");
        } else if !outcome.is_cancelled() {
            tracing::warn!(%platform, error = ?outcome.error, "account connection failed");
        }
        outcome
    }
}
