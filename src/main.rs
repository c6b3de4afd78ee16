//! Polyflash Bot - Main Entry Point
//!
//! Interval-driven scan loop: snapshot -> detect -> evaluate -> execute,
//! with a cooldown after any submitted transaction.

use polyflash_bot::*;
use anyhow::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time;
use tracing::{error, info, warn};

use polyflash_bot::detector::LiquidationScanner;
use polyflash_bot::execution::ExecutionEngine;
use polyflash_bot::market::MarketSnapshot;
use polyflash_bot::network::ChainClient;
use polyflash_bot::tracker::AttemptTracker;
use polyflash_bot::venues::{OneInchClient, PriceBook};

const PRICE_BOOK_MAX_AGE_SECS: u64 = 60;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging
    let _logging_guard = utils::setup_logging()?;
    utils::setup_output_directories()?;

    // Load configuration
    let config = CONFIG.clone();

    info!("⚡ Polyflash Bot v0.3.0 - Flash-Loan Arbitrage & Aave Liquidations");
    info!("📋 Configuration:");
    info!("   Mode: {}", if config.dry_run { "DRY-RUN" } else { "LIVE" });
    info!("   Loan size: {} USDC", config.loan_amount_usdc);
    info!("   Min profit: ${}", config.min_profit_usd);
    info!("   Min spread: {}%", config.min_spread_pct);
    info!("   Max gas price: {} gwei", config.max_gas_price_gwei);
    info!("   Daily attempt limit: {}", config.max_daily_attempts);
    info!("   Gas budget: ${}", config.budget_usd);
    info!("   Scan interval: {}s, cooldown: {}s", config.scan_interval_secs, config.cooldown_secs);

    if !config.dry_run && config.private_key.is_none() {
        return Err(anyhow::anyhow!(
            "LIVE mode requires PRIVATE_KEY; set DRY_RUN=true to scan without one"
        ));
    }
    if config.flash_loan_contract.is_none() {
        warn!("FLASH_LOAN_CONTRACT not set: arbitrage runs in scan-only mode");
    }
    if config.liquidation_contract.is_none() {
        warn!("LIQUIDATION_CONTRACT not set: liquidations run in scan-only mode");
    }

    // Initialize components
    let circuit_breaker = Arc::new(errors::CircuitBreaker::new(
        config.max_consecutive_errors,
        config.circuit_breaker_cooldown_secs,
    ));

    let provider = network::setup_provider(&config).await?;
    let chain = ChainClient::new(provider);

    let aggregator = match &config.oneinch_api_key {
        Some(key) => Some(OneInchClient::new(key.clone())?),
        None => {
            warn!("ONEINCH_API_KEY not set: using fallback prices, router venues only");
            None
        }
    };

    let engine = ExecutionEngine::new(chain.clone(), &config)?;
    let mut liquidation_scanner = LiquidationScanner::new();
    let mut tracker = AttemptTracker::new(Utc::now().date_naive());
    let mut prices = PriceBook::fallback(config.native_price_override_usd);

    // Setup monitoring state
    let start_time = Instant::now();
    let mut state = MonitoringState::new();

    // Setup shutdown handler
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();
    let shutdown_tx = Arc::new(tokio::sync::Mutex::new(Some(shutdown_tx)));

    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
        info!("📛 Received shutdown signal (Ctrl+C)...");
        if let Some(tx) = shutdown_tx.lock().await.take() {
            let _ = tx.send(());
        }
    });

    info!("🚀 Starting scan loop...");

    let mut interval = time::interval(Duration::from_secs(config.scan_interval_secs));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match run_scan_cycle(
                    &chain,
                    aggregator.as_ref(),
                    &engine,
                    &mut liquidation_scanner,
                    &mut tracker,
                    &mut prices,
                    &config,
                    &circuit_breaker,
                    &mut state,
                ).await {
                    Ok(submitted) => {
                        circuit_breaker.record_success().await;
                        if submitted {
                            // One live transaction per cycle, then back off
                            // before probing the same condition again
                            info!("⏸  Cooldown for {}s after submission", config.cooldown_secs);
                            time::sleep(Duration::from_secs(config.cooldown_secs)).await;
                        }
                    }
                    Err(e) => {
                        error!("Scan cycle error: {}", e);
                        *state.error_counts.entry("cycle".to_string()).or_insert(0) += 1;
                        if circuit_breaker.record_error().await {
                            error!("Circuit breaker activated due to scan errors");
                        }
                    }
                }

                state.cycles += 1;
                if state.cycles % 10 == 0 {
                    let health = utils::run_health_check(
                        &state.chain_last_update,
                        &state.venue_last_update,
                        &circuit_breaker,
                        start_time,
                    ).await;
                    info!(
                        "🏥 Health: chain={}, venues={}, uptime={}s, errors={}",
                        if health.chain_connection { "OK" } else { "STALE" },
                        if health.venue_connection { "OK" } else { "STALE" },
                        health.uptime_seconds,
                        health.consecutive_errors
                    );
                }
                if state.cycles % 100 == 0 {
                    state.print(start_time);
                }
            }
            _ = &mut shutdown_rx => {
                info!("Shutdown signal received, exiting main loop...");
                break;
            }
        }
    }

    // Print final statistics
    info!("🛑 Shutting down gracefully...");
    state.print(start_time);
    info!(
        "   Attempts today: {} | Cumulative gas spend: ${:.2}",
        tracker.attempts_on(Utc::now().date_naive()),
        tracker.cumulative_gas_spend_usd()
    );

    Ok(())
}

/// Monitoring state to track statistics
struct MonitoringState {
    cycles: u64,
    opportunities: u64,
    accepted: u64,
    executions: u64,
    confirmed: u64,
    reverted: u64,
    error_counts: HashMap<String, u32>,
    chain_last_update: Option<Instant>,
    venue_last_update: Option<Instant>,
}

impl MonitoringState {
    fn new() -> Self {
        Self {
            cycles: 0,
            opportunities: 0,
            accepted: 0,
            executions: 0,
            confirmed: 0,
            reverted: 0,
            error_counts: HashMap::new(),
            chain_last_update: None,
            venue_last_update: None,
        }
    }

    fn print(&self, start_time: Instant) {
        utils::print_session_stats(
            start_time,
            self.cycles,
            self.opportunities,
            self.accepted,
            self.executions,
            self.confirmed,
            self.reverted,
            &self.error_counts,
        );
    }
}

/// Run a single scan cycle. Returns whether a transaction was submitted, so
/// the loop can apply the post-submission cooldown.
#[allow(clippy::too_many_arguments)]
async fn run_scan_cycle(
    chain: &ChainClient,
    aggregator: Option<&OneInchClient>,
    engine: &ExecutionEngine,
    liquidation_scanner: &mut LiquidationScanner,
    tracker: &mut AttemptTracker,
    prices: &mut PriceBook,
    config: &Config,
    circuit_breaker: &Arc<errors::CircuitBreaker>,
    state: &mut MonitoringState,
) -> Result<bool> {
    // Check circuit breaker
    if !circuit_breaker.can_proceed().await {
        warn!("⚡ Circuit breaker is OPEN, waiting for cooldown...");
        time::sleep(Duration::from_secs(10)).await;
        return Ok(false);
    }

    let today = Utc::now().date_naive();

    // Refresh the price book when it ages out
    if prices.is_stale(PRICE_BOOK_MAX_AGE_SECS) {
        *prices = match aggregator {
            Some(client) => {
                let book = PriceBook::fetch(client, config.native_price_override_usd).await;
                state.venue_last_update = Some(Instant::now());
                book
            }
            None => PriceBook::fallback(config.native_price_override_usd),
        };
    }

    // One gas price read per cycle, shared by the evaluator and the engine
    let gas_price_wei = chain.gas_price().await?;
    let gas_price_gwei =
        utils::u256_to_decimal(alloy::primitives::U256::from(gas_price_wei), 9).unwrap_or_default();
    state.chain_last_update = Some(Instant::now());

    // Aggregate comparable buy-leg quotes across the venue set
    let Some(notional) = utils::decimal_to_u256(config.loan_amount_usdc, Token::Usdc.decimals())
    else {
        return Err(anyhow::anyhow!("loan amount does not fit base units"));
    };

    let mut venues = vec![Venue::QuickSwap, Venue::SushiSwap];
    if aggregator.is_some() {
        venues.push(Venue::OneInch);
    }

    let snapshot = MarketSnapshot::collect(
        chain,
        aggregator,
        &venues,
        Token::Usdc,
        Token::Weth,
        notional,
        Duration::from_secs(config.venue_timeout_secs),
    )
    .await;

    if !snapshot.is_empty() {
        state.venue_last_update = Some(Instant::now());
    }

    // Detect: liquidations first (already sorted by estimated profit), then
    // the cross-venue spread
    let mut candidates: Vec<(Opportunity, Option<Quote>)> = Vec::new();

    match liquidation_scanner.scan(chain, prices, config).await {
        Ok(opportunities) => {
            candidates.extend(opportunities.into_iter().map(|o| (o, None)));
        }
        Err(e) if e.is_transient() => {
            warn!(error = %e, "Liquidation scan skipped this cycle");
            *state.error_counts.entry("liquidation_scan".to_string()).or_insert(0) += 1;
        }
        Err(e) => return Err(e.into()),
    }

    match detector::scan_spread(chain, &snapshot, Venue::QuickSwap, Venue::SushiSwap, config).await
    {
        Ok(Some((opportunity, quote))) => candidates.push((opportunity, Some(quote))),
        Ok(None) => {}
        Err(e) if e.is_transient() => {
            warn!(error = %e, "Spread scan skipped this cycle");
            *state.error_counts.entry("spread_scan".to_string()).or_insert(0) += 1;
        }
        Err(e) => return Err(e.into()),
    }

    state.opportunities += candidates.len() as u64;

    // Evaluate in order and act on the first accepted candidate only
    for (opportunity, quote) in candidates {
        utils::print_opportunity(&opportunity);

        let decision = evaluator::evaluate(opportunity, gas_price_gwei, tracker, config, today);
        utils::print_decision(&decision);
        if let Err(e) = storage::save_decision(&decision) {
            error!("Failed to save decision: {}", e);
            *state.error_counts.entry("save_decision".to_string()).or_insert(0) += 1;
        }

        if !decision.accepted {
            continue;
        }
        state.accepted += 1;

        let contract_ready = match decision.opportunity.kind {
            OpportunityKind::Liquidation { .. } => config.liquidation_contract.is_some(),
            OpportunityKind::Arbitrage { .. } => config.flash_loan_contract.is_some(),
        };
        if !contract_ready {
            info!(
                opportunity_id = %decision.opportunity.id,
                "[SCAN ONLY] Executor contract not configured, skipping execution"
            );
            continue;
        }

        let result = engine
            .execute(
                &decision.opportunity,
                quote.as_ref(),
                gas_price_wei,
                tracker,
                prices,
            )
            .await;

        state.executions += 1;
        if result.confirmed {
            state.confirmed += 1;
        }
        if result.reverted {
            state.reverted += 1;
        }

        utils::print_execution(&result);
        if let Err(e) = storage::save_execution(&result) {
            error!("Failed to save execution: {}", e);
            *state.error_counts.entry("save_execution".to_string()).or_insert(0) += 1;
        }

        // One opportunity per cycle; rejected or failed candidates simply
        // reappear in a later detection cycle
        return Ok(result.submitted);
    }

    Ok(false)
}
