//! Keeps the counter store connection warm.
//!
//! View counting is the only Redis traffic and it is bursty; a periodic PING
//! lets the `ConnectionManager` notice a dropped link and reconnect while
//! nobody is waiting on it.

use crate::services::CounterStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, sleep, MissedTickBehavior};

/// Failures in a row after which the log level is raised to error
const ALERT_AFTER_FAILURES: u32 = 5;

#[derive(Clone)]
pub struct RedisHealthConfig {
    pub enabled: bool,
    pub initial_delay: Duration,
    pub check_interval: Duration,
}

impl Default for RedisHealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay: Duration::from_secs(10),
            check_interval: Duration::from_secs(60),
        }
    }
}

/// Ping outcome bookkeeping; logs on state changes rather than every tick
#[derive(Debug, Default, PartialEq, Eq)]
struct PingState {
    failures: u32,
}

impl PingState {
    fn observe(&mut self, result: Result<(), String>) {
        match result {
            Ok(()) if self.failures > 0 => {
                tracing::info!(failed_pings = self.failures, "counter store reachable again");
                self.failures = 0;
            }
            Ok(()) => tracing::trace!("counter store ping ok"),
            Err(error) => {
                self.failures += 1;
                if self.failures == 1 {
                    tracing::warn!(%error, "counter store ping failed");
                } else if self.failures % ALERT_AFTER_FAILURES == 0 {
                    tracing::error!(failed_pings = self.failures, %error, "counter store still unreachable");
                }
            }
        }
    }
}

/// Ping the counter store every `check_interval` until the task is aborted
pub async fn start_redis_health_check(counters: Arc<dyn CounterStore>, config: RedisHealthConfig) {
    if !config.enabled {
        tracing::info!("counter store keep-alive disabled");
        return;
    }

    sleep(config.initial_delay).await;

    let mut ticker = interval(config.check_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut state = PingState::default();

    loop {
        ticker.tick().await;
        let result = counters.ping().await.map_err(|e| e.to_string());
        state.observe(result);
    }
}
