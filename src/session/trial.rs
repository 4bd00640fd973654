//! Per-trial state machine
//!
//! AwaitingResponse -> pump -> AwaitingResponse | Popped
//! AwaitingResponse -> cash out -> CashedOut
//! AwaitingResponse -> no response -> TimedOut

use serde::Serialize;

use crate::error::{BartError, BartResult};
use crate::task::{RandomSource, Trial};

/// Where a trial currently is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrialPhase {
    AwaitingResponse,
    CashedOut,
    Popped,
    TimedOut,
}

/// Terminal outcome of a trial
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialOutcome {
    CashedOut,
    Popped,
    TimedOut,
}

/// Result of a single pump
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PumpResult {
    Inflated,
    Popped,
}

/// Pop probability after `pump_count` pumps on a balloon with `max_pumps`.
///
/// `1 / (max_pumps - pump_count)`, clamped to 1.0 once one or no pumps
/// remain.
pub fn pop_probability(max_pumps: u32, pump_count: u32) -> f64 {
    let remaining = max_pumps.saturating_sub(pump_count);
    if remaining <= 1 {
        1.0
    } else {
        1.0 / remaining as f64
    }
}

/// What a finished trial folds into the session
#[derive(Clone, Debug, PartialEq)]
pub struct TrialResult {
    pub outcome: TrialOutcome,
    pub pump_count: u32,
    /// Points collected (0 unless cashed out)
    pub temp_bank: u32,
}

/// Runtime state of the balloon currently on screen
#[derive(Clone, Debug)]
pub struct TrialRun {
    trial: Trial,
    pump_count: u32,
    temp_bank: u32,
    growth: f32,
    growth_step: f32,
    phase: TrialPhase,
}

impl TrialRun {
    pub fn new(trial: Trial, growth_step: f32) -> Self {
        TrialRun {
            trial,
            pump_count: 0,
            temp_bank: 0,
            growth: 0.0,
            growth_step,
            phase: TrialPhase::AwaitingResponse,
        }
    }

    pub fn trial(&self) -> &Trial {
        &self.trial
    }

    pub fn pump_count(&self) -> u32 {
        self.pump_count
    }

    #[cfg(test)]
    pub fn temp_bank(&self) -> u32 {
        self.temp_bank
    }

    /// Visual growth accumulated by successful pumps
    pub fn growth(&self) -> f32 {
        self.growth
    }

    #[cfg(test)]
    pub fn phase(&self) -> TrialPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == TrialPhase::AwaitingResponse
    }

    fn ensure_active(&self) -> BartResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(BartError::TrialClosed)
        }
    }

    /// Pump once, drawing from `rng` to decide whether the balloon pops
    pub fn pump(&mut self, rng: &mut impl RandomSource) -> BartResult<PumpResult> {
        self.ensure_active()?;
        self.pump_count += 1;

        let p = pop_probability(self.trial.max_pumps, self.pump_count);
        if rng.next_uniform() < p {
            self.temp_bank = 0;
            self.phase = TrialPhase::Popped;
            Ok(PumpResult::Popped)
        } else {
            self.temp_bank = self.temp_bank.saturating_add(self.trial.reward);
            self.growth += self.growth_step;
            Ok(PumpResult::Inflated)
        }
    }

    /// Collect the temporary bank
    pub fn cash_out(&mut self) -> BartResult<()> {
        self.ensure_active()?;
        self.phase = TrialPhase::CashedOut;
        Ok(())
    }

    /// No response in time; the temporary bank is forfeited
    pub fn time_out(&mut self) -> BartResult<()> {
        self.ensure_active()?;
        self.temp_bank = 0;
        self.phase = TrialPhase::TimedOut;
        Ok(())
    }

    /// Outcome of a finished trial, `None` while still pumping
    pub fn result(&self) -> Option<TrialResult> {
        let outcome = match self.phase {
            TrialPhase::AwaitingResponse => return None,
            TrialPhase::CashedOut => TrialOutcome::CashedOut,
            TrialPhase::Popped => TrialOutcome::Popped,
            TrialPhase::TimedOut => TrialOutcome::TimedOut,
        };
        Some(TrialResult {
            outcome,
            pump_count: self.pump_count,
            temp_bank: self.temp_bank,
        })
    }
}
