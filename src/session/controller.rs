//! Session controller: drives the trial sequence end to end
//!
//! Per trial the screen is drawn in a fixed order:
//! card stimulus -> key reminders -> last deck / total earned -> flip.
//! Then one bounded key wait decides the next transition.

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::BartResult;
use crate::session::record::{TrialRecord, TrialSink};
use crate::session::state::SessionState;
use crate::session::stats::SessionStats;
use crate::session::surface::{Alignment, InputSource, Key, PresentationSurface, TextPosition};
use crate::session::trial::{PumpResult, TrialResult, TrialRun};
use crate::task::config::ABSENT_MESSAGE;
use crate::task::{RandomSource, TaskConfig, Trial, TrialSequence};

/// Card size before any pump
const BASE_CARD_SCALE: f32 = 0.2;

const COLLECT_REMINDER_POS: TextPosition = TextPosition::new(-0.23, -0.9);
const PUMP_REMINDER_POS: TextPosition = TextPosition::new(0.23, -0.9);
const LAST_DECK_POS: TextPosition = TextPosition::new(0.9, 0.8);
const TOTAL_POS: TextPosition = TextPosition::new(0.9, 0.55);

/// How a session ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every trial was run and the final message shown
    Completed,
    /// Quit key (or no response on the instruction screen)
    Aborted,
}

/// Final state handed back to `main`
#[derive(Clone, Debug)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    pub state: SessionState,
    pub stats: SessionStats,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Owns the collaborators for the lifetime of one session
pub struct SessionController<S, I, R, K> {
    config: TaskConfig,
    surface: S,
    input: I,
    rng: R,
    sink: K,
    state: SessionState,
    stats: SessionStats,
}

impl<S, I, R, K> SessionController<S, I, R, K>
where
    S: PresentationSurface,
    I: InputSource,
    R: RandomSource,
    K: TrialSink,
{
    pub fn new(config: TaskConfig, surface: S, input: I, rng: R, sink: K) -> Self {
        SessionController {
            config,
            surface,
            input,
            rng,
            sink,
            state: SessionState::new(),
            stats: SessionStats::new(),
        }
    }

    /// Run the whole session. Collaborators are dropped when this returns.
    pub fn run(mut self, trials: &TrialSequence) -> BartResult<SessionReport> {
        self.state.start();
        info!(trials = trials.len(), "session started");

        if self.config.show_instructions && self.show_instructions()? == Flow::Quit {
            info!("session aborted on instruction screen");
            return Ok(self.finish(SessionOutcome::Aborted));
        }

        for (index, trial) in trials.iter().enumerate() {
            if self.run_trial(index, trial)? == Flow::Quit {
                info!(
                    trial = index,
                    permanent_bank = self.state.permanent_bank,
                    "session aborted by quit key"
                );
                return Ok(self.finish(SessionOutcome::Aborted));
            }
        }

        self.show_final_message()?;
        info!(
            permanent_bank = self.state.permanent_bank,
            duration_secs = self.state.duration_secs(),
            "session completed"
        );
        Ok(self.finish(SessionOutcome::Completed))
    }

    fn finish(self, outcome: SessionOutcome) -> SessionReport {
        SessionReport {
            outcome,
            state: self.state,
            stats: self.stats,
        }
    }

    /// Instruction screen; quitting or not responding ends the session
    fn show_instructions(&mut self) -> BartResult<Flow> {
        let text = format!(
            "Each card you draw adds {reward} point(s) to the current deck.\n\
             Any draw may turn up a losing card, which wipes out that deck.\n\
             \n\
             Press {pump} to draw a new card.\n\
             Press {collect} to collect your points and start a new deck.\n\
             \n\
             Press {pump} to begin or {quit} to quit.",
            reward = self.config.reward,
            pump = Key::Pump.label(),
            collect = Key::CashOut.label(),
            quit = Key::Quit.label(),
        );
        self.surface
            .show_text(TextPosition::CENTER, &text, Alignment::Center)?;
        self.surface.refresh_frame()?;

        let key = self
            .input
            .wait_for_key(&[Key::Pump, Key::Quit], self.config.instruction_timeout)?;
        match key {
            Some(Key::Pump) => Ok(Flow::Continue),
            _ => Ok(Flow::Quit),
        }
    }

    /// Draw the current trial screen and flip
    fn draw_trial(&mut self, run: &TrialRun) -> BartResult<()> {
        let scale = (BASE_CARD_SCALE + run.growth()).min(1.0);
        self.surface.show_image(&run.trial().shape_ref, scale)?;

        self.surface.show_text(
            COLLECT_REMINDER_POS,
            &format!("Press {}\nto collect points", Key::CashOut.label()),
            Alignment::Right,
        )?;
        self.surface.show_text(
            PUMP_REMINDER_POS,
            &format!("Press {}\nto get a new card", Key::Pump.label()),
            Alignment::Left,
        )?;
        self.surface.show_text(
            LAST_DECK_POS,
            &format!("Last card deck:\n{}", self.state.last_trial_bank),
            Alignment::Right,
        )?;
        self.surface.show_text(
            TOTAL_POS,
            &format!("Total Earned:\n{}", self.state.permanent_bank),
            Alignment::Right,
        )?;
        self.surface.refresh_frame()
    }

    fn run_trial(&mut self, index: usize, trial: &Trial) -> BartResult<Flow> {
        debug!(
            trial = index,
            shape = %trial.shape_ref,
            max_pumps = trial.max_pumps,
            "trial started"
        );
        let mut run = TrialRun::new(trial.clone(), self.config.growth_step());
        let mut response_time_ms = None;

        let result = loop {
            if let Some(result) = run.result() {
                break result;
            }

            self.draw_trial(&run)?;
            let asked = Instant::now();
            let key = self.input.wait_for_key(
                &[Key::Pump, Key::CashOut, Key::Quit],
                self.config.response_timeout,
            )?;
            response_time_ms = key.map(|_| asked.elapsed().as_millis() as u64);

            match key {
                None => {
                    warn!(trial = index, pumps = run.pump_count(), "no response, trial timed out");
                    self.surface
                        .show_text(TextPosition::CENTER, ABSENT_MESSAGE, Alignment::Center)?;
                    self.surface.refresh_frame()?;
                    self.surface.pause(self.config.absent_pause)?;
                    run.time_out()?;
                }
                Some(Key::Quit) => return Ok(Flow::Quit),
                Some(Key::CashOut) => run.cash_out()?,
                Some(Key::Pump) => {
                    if run.pump(&mut self.rng)? == PumpResult::Popped {
                        debug!(trial = index, pumps = run.pump_count(), "balloon popped");
                        self.surface.show_image(&self.config.pop_image, 1.0)?;
                        self.surface.refresh_frame()?;
                        self.surface.pause(self.config.pop_feedback)?;
                    }
                }
            }
        };

        self.settle(index, trial, &result, response_time_ms)?;
        Ok(Flow::Continue)
    }

    fn settle(
        &mut self,
        index: usize,
        trial: &Trial,
        result: &TrialResult,
        response_time_ms: Option<u64>,
    ) -> BartResult<()> {
        self.state.settle(result);
        self.stats.record(trial.max_pumps, result);

        info!(
            trial = index,
            max_pumps = trial.max_pumps,
            pumps = result.pump_count,
            outcome = ?result.outcome,
            permanent_bank = self.state.permanent_bank,
            "trial finished"
        );

        self.sink.record(&TrialRecord {
            trial_index: index,
            shape_ref: trial.shape_ref.clone(),
            max_pumps: trial.max_pumps,
            pump_count: result.pump_count,
            outcome: result.outcome,
            temp_bank: result.temp_bank,
            permanent_bank: self.state.permanent_bank,
            last_trial_bank: self.state.last_trial_bank,
            response_time_ms,
            recorded_at: Utc::now(),
        })
    }

    fn show_final_message(&mut self) -> BartResult<()> {
        let message = self.config.final_message(self.state.permanent_bank);
        self.surface
            .show_text(TextPosition::CENTER, &message, Alignment::Center)?;
        self.surface.refresh_frame()?;
        self.surface.pause(self.config.final_pause)
    }
}
