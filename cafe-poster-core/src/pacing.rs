//! Fixed pauses between publish attempts and between accounts.
//!
//! The pipeline never calls `sleep` directly; it asks a [`Pacer`] for a [`Pause`].
//! [`SleepPacer`] is the production implementation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Which boundary the pipeline is pausing at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    /// After one item, before the next item of the same group.
    BetweenItems,
    /// After one account, before the next account.
    BetweenAccounts,
}

/// Pause lengths. The account pause must not be shorter than the item pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayPolicy {
    pub between_items: Duration,
    pub between_accounts: Duration,
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self {
            between_items: Duration::from_secs(25),
            between_accounts: Duration::from_secs(30),
        }
    }
}

impl DelayPolicy {
    pub fn duration(&self, pause: Pause) -> Duration {
        match pause {
            Pause::BetweenItems => self.between_items,
            Pause::BetweenAccounts => self.between_accounts,
        }
    }
}

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, pause: Pause);
}

/// Cooperative sleep on the tokio timer.
#[derive(Debug, Clone, Default)]
pub struct SleepPacer {
    policy: DelayPolicy,
}

impl SleepPacer {
    pub fn new(policy: DelayPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl Pacer for SleepPacer {
    async fn pause(&self, pause: Pause) {
        let duration = self.policy.duration(pause);
        if duration.is_zero() {
            return;
        }
        info!(?pause, secs = duration.as_secs_f64(), "[PACE] Waiting before next request");
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_account_pause_is_longer_than_item_pause() {
        let policy = DelayPolicy::default();
        assert!(policy.between_accounts > policy.between_items);
        assert_eq!(policy.duration(Pause::BetweenItems), Duration::from_secs(25));
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_pacer_waits_for_the_configured_duration() {
        let pacer = SleepPacer::new(DelayPolicy {
            between_items: Duration::from_secs(3),
            between_accounts: Duration::from_secs(7),
        });

        let start = tokio::time::Instant::now();
        pacer.pause(Pause::BetweenItems).await;
        assert!(start.elapsed() >= Duration::from_secs(3));

        let start = tokio::time::Instant::now();
        pacer.pause(Pause::BetweenAccounts).await;
        assert!(start.elapsed() >= Duration::from_secs(7));
    }
}
