//! Health monitoring utilities

use std::time::Instant;

use crate::errors::CircuitBreaker;

const STALE_AFTER_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub chain_connection: bool,
    pub venue_connection: bool,
    pub consecutive_errors: u32,
    pub uptime_seconds: u64,
}

pub async fn run_health_check(
    chain_last_update: &Option<Instant>,
    venue_last_update: &Option<Instant>,
    circuit_breaker: &CircuitBreaker,
    start_time: Instant,
) -> HealthStatus {
    HealthStatus {
        chain_connection: chain_last_update
            .map(|t| t.elapsed().as_secs() < STALE_AFTER_SECS)
            .unwrap_or(false),
        venue_connection: venue_last_update
            .map(|t| t.elapsed().as_secs() < STALE_AFTER_SECS)
            .unwrap_or(false),
        consecutive_errors: circuit_breaker.consecutive_errors().await,
        uptime_seconds: start_time.elapsed().as_secs(),
    }
}
