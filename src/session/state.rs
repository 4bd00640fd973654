//! Session state tracking
//!
//! Maintains:
//! - Permanent bank accumulated across trials
//! - Last trial's banked amount (shown as feedback)
//! - Trials completed and session timer

use std::time::Instant;

use crate::session::trial::{TrialOutcome, TrialResult};

/// Balances that persist across the whole run
#[derive(Clone, Debug)]
pub struct SessionState {
    /// Points banked so far
    pub permanent_bank: u64,
    /// Points banked on the previous trial (0 after a pop or timeout)
    pub last_trial_bank: u64,
    /// Trials that reached a terminal outcome
    pub trials_completed: usize,
    /// Session start time
    pub start_time: Option<Instant>,
}

impl SessionState {
    pub fn new() -> Self {
        SessionState {
            permanent_bank: 0,
            last_trial_bank: 0,
            trials_completed: 0,
            start_time: None,
        }
    }

    /// Start the session timer
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get session duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Fold a finished trial into the balances
    pub fn settle(&mut self, result: &TrialResult) {
        match result.outcome {
            TrialOutcome::CashedOut => {
                let banked = u64::from(result.temp_bank);
                self.permanent_bank += banked;
                self.last_trial_bank = banked;
            }
            // Pops and timeouts forfeit the temporary bank
            TrialOutcome::Popped | TrialOutcome::TimedOut => {
                self.last_trial_bank = 0;
            }
        }
        self.trials_completed += 1;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(outcome: TrialOutcome, temp_bank: u32) -> TrialResult {
        TrialResult {
            outcome,
            pump_count: temp_bank,
            temp_bank,
        }
    }

    #[test]
    fn test_cash_out_banks() {
        let mut state = SessionState::new();
        state.settle(&result(TrialOutcome::CashedOut, 3));
        assert_eq!(state.permanent_bank, 3);
        assert_eq!(state.last_trial_bank, 3);
        state.settle(&result(TrialOutcome::CashedOut, 5));
        assert_eq!(state.permanent_bank, 8);
        assert_eq!(state.last_trial_bank, 5);
        assert_eq!(state.trials_completed, 2);
    }

    #[test]
    fn test_pop_and_timeout_forfeit() {
        let mut state = SessionState::new();
        state.settle(&result(TrialOutcome::CashedOut, 4));
        state.settle(&result(TrialOutcome::Popped, 0));
        assert_eq!(state.permanent_bank, 4);
        assert_eq!(state.last_trial_bank, 0);

        state.settle(&result(TrialOutcome::CashedOut, 2));
        state.settle(&result(TrialOutcome::TimedOut, 0));
        assert_eq!(state.permanent_bank, 6);
        assert_eq!(state.last_trial_bank, 0);
    }
}
