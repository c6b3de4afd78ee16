//! Circuit breaker for consecutive cycle failures

use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{error, info};

struct BreakerState {
    consecutive_errors: u32,
    open_since: Option<Instant>,
}

/// Pauses the scan loop after too many consecutive cycle errors, and lets it
/// resume once the cooldown elapses. Gate outcomes (quota, budget) never trip
/// this; only unexpected cycle failures do.
pub struct CircuitBreaker {
    state: RwLock<BreakerState>,
    max_consecutive_errors: u32,
    cooldown: Duration,
}

impl CircuitBreaker {
    pub fn new(max_consecutive_errors: u32, cooldown_secs: u64) -> Self {
        Self {
            state: RwLock::new(BreakerState {
                consecutive_errors: 0,
                open_since: None,
            }),
            max_consecutive_errors,
            cooldown: Duration::from_secs(cooldown_secs),
        }
    }

    pub async fn record_success(&self) {
        let mut state = self.state.write().await;
        state.consecutive_errors = 0;
        state.open_since = None;
    }

    /// Returns true when this error tripped the breaker open.
    pub async fn record_error(&self) -> bool {
        let mut state = self.state.write().await;
        state.consecutive_errors += 1;
        if state.consecutive_errors >= self.max_consecutive_errors && state.open_since.is_none() {
            state.open_since = Some(Instant::now());
            error!(
                consecutive_errors = state.consecutive_errors,
                "Circuit breaker OPEN"
            );
            return true;
        }
        false
    }

    pub async fn can_proceed(&self) -> bool {
        {
            let state = self.state.read().await;
            match state.open_since {
                None => return true,
                Some(since) if since.elapsed() < self.cooldown => return false,
                Some(_) => {}
            }
        }
        let mut state = self.state.write().await;
        if state.open_since.is_some() {
            info!("Circuit breaker cooldown complete, resetting");
            state.open_since = None;
            state.consecutive_errors = 0;
        }
        true
    }

    pub async fn consecutive_errors(&self) -> u32 {
        self.state.read().await.consecutive_errors
    }

    pub async fn is_open(&self) -> bool {
        self.state.read().await.open_since.is_some()
    }
}
