//! Attempt quota and gas-spend budget tracking

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::types::RejectReason;

/// Process-lifetime counters consulted by the evaluator and updated by the
/// execution engine. Owned by the scan loop and passed by reference; tests
/// substitute a fresh tracker.
///
/// `attempts_today` resets lazily on day-key rollover. The read path
/// (`check`, `attempts_on`) computes the effective count against the probe
/// date without mutating, so the evaluator stays side-effect free; the
/// rollover is materialized by `record_attempt`. The cumulative spend never
/// resets within a process lifetime.
#[derive(Debug, Clone)]
pub struct AttemptTracker {
    attempts_today: u32,
    day_key: NaiveDate,
    cumulative_gas_spend_usd: Decimal,
}

impl AttemptTracker {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            attempts_today: 0,
            day_key: today,
            cumulative_gas_spend_usd: Decimal::ZERO,
        }
    }

    /// Attempts counted against `day`. A different day than the stored key
    /// means the counter has logically rolled over to zero.
    pub fn attempts_on(&self, day: NaiveDate) -> u32 {
        if day == self.day_key {
            self.attempts_today
        } else {
            0
        }
    }

    pub fn cumulative_gas_spend_usd(&self) -> Decimal {
        self.cumulative_gas_spend_usd
    }

    /// Read-only gate probe: quota first, then budget.
    pub fn check(
        &self,
        max_daily_attempts: u32,
        budget_usd: Decimal,
        day: NaiveDate,
    ) -> Result<(), RejectReason> {
        if self.attempts_on(day) >= max_daily_attempts {
            return Err(RejectReason::QuotaExceeded);
        }
        if self.cumulative_gas_spend_usd >= budget_usd {
            return Err(RejectReason::BudgetExhausted);
        }
        Ok(())
    }

    /// Count a submitted transaction against `day`, rolling the day key
    /// forward first when the calendar has moved.
    pub fn record_attempt(&mut self, day: NaiveDate) {
        if day != self.day_key {
            self.day_key = day;
            self.attempts_today = 0;
        }
        self.attempts_today += 1;
    }

    /// Add realized gas cost. Called for confirmed and reverted transactions
    /// alike; gas was spent either way. Negative inputs are ignored to keep
    /// the counter monotone.
    pub fn record_gas_spend(&mut self, gas_cost_usd: Decimal) {
        if gas_cost_usd > Decimal::ZERO {
            self.cumulative_gas_spend_usd += gas_cost_usd;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn quota_enforced_per_day() {
        let mut tracker = AttemptTracker::new(day("2026-08-07"));
        tracker.record_attempt(day("2026-08-07"));
        tracker.record_attempt(day("2026-08-07"));
        tracker.record_attempt(day("2026-08-07"));

        assert_eq!(
            tracker.check(3, dec!(30), day("2026-08-07")),
            Err(RejectReason::QuotaExceeded)
        );
        // Next calendar day: quota is available again
        assert_eq!(tracker.check(3, dec!(30), day("2026-08-08")), Ok(()));
    }

    #[test]
    fn day_rollover_resets_exactly_once() {
        let mut tracker = AttemptTracker::new(day("2026-08-07"));
        tracker.record_attempt(day("2026-08-07"));
        tracker.record_attempt(day("2026-08-07"));
        assert_eq!(tracker.attempts_on(day("2026-08-07")), 2);

        // First attempt of the new day resets the counter, then counts itself
        tracker.record_attempt(day("2026-08-08"));
        assert_eq!(tracker.attempts_on(day("2026-08-08")), 1);
        // Probing the old day no longer sees the stale count
        assert_eq!(tracker.attempts_on(day("2026-08-07")), 0);
    }

    #[test]
    fn read_path_does_not_mutate() {
        let tracker = AttemptTracker::new(day("2026-08-07"));
        let before = tracker.clone();
        let _ = tracker.check(3, dec!(30), day("2026-08-09"));
        let _ = tracker.attempts_on(day("2026-08-09"));
        assert_eq!(tracker.attempts_today, before.attempts_today);
        assert_eq!(tracker.day_key, before.day_key);
    }

    #[test]
    fn budget_gate_fires_at_ceiling() {
        let mut tracker = AttemptTracker::new(day("2026-08-07"));
        tracker.record_gas_spend(dec!(29.99));
        assert_eq!(tracker.check(10, dec!(30), day("2026-08-07")), Ok(()));
        tracker.record_gas_spend(dec!(0.01));
        assert_eq!(
            tracker.check(10, dec!(30), day("2026-08-07")),
            Err(RejectReason::BudgetExhausted)
        );
    }

    #[test]
    fn quota_checked_before_budget() {
        let mut tracker = AttemptTracker::new(day("2026-08-07"));
        tracker.record_attempt(day("2026-08-07"));
        tracker.record_gas_spend(dec!(100));
        // Both gates would fail; quota is reported first
        assert_eq!(
            tracker.check(1, dec!(30), day("2026-08-07")),
            Err(RejectReason::QuotaExceeded)
        );
    }

    proptest! {
        #[test]
        fn gas_spend_is_monotone(amounts in proptest::collection::vec(-100.0f64..100.0, 0..50)) {
            let mut tracker = AttemptTracker::new(day("2026-08-07"));
            let mut last = Decimal::ZERO;
            for amount in amounts {
                let d = Decimal::try_from(amount).unwrap_or(Decimal::ZERO);
                tracker.record_gas_spend(d);
                prop_assert!(tracker.cumulative_gas_spend_usd() >= last);
                last = tracker.cumulative_gas_spend_usd();
            }
        }
    }
}
