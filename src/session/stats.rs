//! Per-tier risk statistics
//!
//! Features:
//! - Balloon counts by outcome for each max-pumps tier
//! - Adjusted average pumps (mean pumps on cashed-out balloons)

use rustc_hash::FxHashMap;

use crate::session::trial::{TrialOutcome, TrialResult};

/// Counters for one risk tier
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TierStats {
    pub balloons: u32,
    pub cashed_out: u32,
    pub popped: u32,
    pub timed_out: u32,
    /// Pumps summed over all balloons
    pub total_pumps: u64,
    /// Pumps summed over cashed-out balloons only
    pub cashed_out_pumps: u64,
}

impl TierStats {
    /// Mean pumps on balloons that did not pop, `None` before the first
    /// cash-out
    pub fn adjusted_average_pumps(&self) -> Option<f64> {
        if self.cashed_out == 0 {
            None
        } else {
            Some(self.cashed_out_pumps as f64 / self.cashed_out as f64)
        }
    }

    fn record(&mut self, result: &TrialResult) {
        self.balloons += 1;
        self.total_pumps += u64::from(result.pump_count);
        match result.outcome {
            TrialOutcome::CashedOut => {
                self.cashed_out += 1;
                self.cashed_out_pumps += u64::from(result.pump_count);
            }
            TrialOutcome::Popped => self.popped += 1,
            TrialOutcome::TimedOut => self.timed_out += 1,
        }
    }
}

/// Statistics for the whole session, keyed by max pumps
#[derive(Clone, Debug, Default)]
pub struct SessionStats {
    tiers: FxHashMap<u32, TierStats>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished balloon of the given tier
    pub fn record(&mut self, max_pumps: u32, result: &TrialResult) {
        self.tiers.entry(max_pumps).or_default().record(result);
    }

    #[cfg(test)]
    pub fn tier(&self, max_pumps: u32) -> Option<&TierStats> {
        self.tiers.get(&max_pumps)
    }

    /// Tiers in ascending max-pumps order
    pub fn tiers(&self) -> Vec<(u32, &TierStats)> {
        let mut tiers: Vec<(u32, &TierStats)> =
            self.tiers.iter().map(|(&max, stats)| (max, stats)).collect();
        tiers.sort_by_key(|(max, _)| *max);
        tiers
    }

    /// Adjusted average pumps over every tier
    pub fn overall_adjusted_average(&self) -> Option<f64> {
        let (pumps, balloons) = self
            .tiers
            .values()
            .fold((0u64, 0u32), |(p, b), t| (p + t.cashed_out_pumps, b + t.cashed_out));
        if balloons == 0 {
            None
        } else {
            Some(pumps as f64 / balloons as f64)
        }
    }
}
