//! Post-checkout entitlement poller.
//!
//! After the gateway redirects the browser back, the entitlement usually lands
//! a second or two later via the webhook. The poller re-reads the verify view
//! on a fixed interval, finishing early on activation and falling back to the
//! manual path once the attempt budget runs out. Fetch errors consume an
//! attempt rather than aborting; transient failures mid-settlement are normal.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::domain::billing::EntitlementView;
use crate::ports::EntitlementFetcher;

/// Poller timing and budget.
#[derive(Debug, Clone, Copy)]
pub struct PollerSettings {
    pub interval: Duration,

    /// Attempts before giving up; errors count against this budget too.
    pub max_attempts: u32,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 12,
        }
    }
}

impl From<&crate::config::PollerConfig> for PollerSettings {
    fn from(config: &crate::config::PollerConfig) -> Self {
        Self {
            interval: config.interval(),
            max_attempts: config.max_attempts,
        }
    }
}

/// How a polling run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Entitlement observed active; carries the final view.
    Active(EntitlementView),

    /// Budget exhausted without seeing activation; the caller should offer
    /// manual activation instead of leaving the user on a spinner.
    ManualFallback,

    /// The caller navigated away or the process is shutting down.
    Cancelled,
}

/// Polls the verify view until the entitlement activates.
pub struct EntitlementPoller {
    fetcher: Arc<dyn EntitlementFetcher>,
    settings: PollerSettings,
}

impl EntitlementPoller {
    pub fn new(fetcher: Arc<dyn EntitlementFetcher>, settings: PollerSettings) -> Self {
        Self { fetcher, settings }
    }

    /// Runs the polling loop. The first attempt fires immediately; flipping
    /// `cancel` to `true` (or dropping its sender) stops the loop at the next
    /// await point.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) -> PollOutcome {
        let mut ticker = tokio::time::interval(self.settings.interval);

        for attempt in 1..=self.settings.max_attempts {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        tracing::debug!(attempt, "entitlement poll cancelled");
                        return PollOutcome::Cancelled;
                    }
                }
            }

            if *cancel.borrow() {
                return PollOutcome::Cancelled;
            }

            match self.fetcher.fetch_entitlement().await {
                Ok(view) if view.has_access => {
                    tracing::info!(attempt, "entitlement active");
                    return PollOutcome::Active(view);
                }
                Ok(_) => {
                    tracing::debug!(attempt, "entitlement not yet active");
                }
                Err(err) => {
                    // Burn the attempt; the webhook may still be in flight
                    tracing::warn!(attempt, error = %err, "entitlement poll failed");
                }
            }
        }

        tracing::warn!(
            attempts = self.settings.max_attempts,
            "entitlement never activated, falling back to manual path"
        );
        PollOutcome::ManualFallback
    }
}
