//! Task configuration
//!
//! Holds the experiment constants:
//! - Stimulus cards and their risk tiers (max pumps)
//! - Repetitions, reward and the fixed ordering seed
//! - Response windows and feedback pauses
//! - Participant-facing messages

use std::time::Duration;

use crate::error::{BartError, BartResult};
use crate::task::trials::{check_limits, StimulusRef};

/// Three risk tiers
pub const MAX_PUMPS: [u32; 3] = [8, 32, 128];
/// Repetitions of each card/tier combination
pub const REPETITIONS: usize = 30;
/// Points per successful pump
pub const REWARD: u32 = 1;
/// Same trial order for every participant
pub const SEQUENCE_SEED: u64 = 52472;

pub const BAD_CARD_IMAGE: &str = "images/lose_all.png";

pub const ABSENT_MESSAGE: &str = "You've waited too long! Your temporary earnings are lost.";
pub const FINAL_MESSAGE: &str =
    "Well done! You banked a total of {total}. Thank you for your participation.";

/// Everything a session needs to know before it starts
#[derive(Clone, Debug)]
pub struct TaskConfig {
    /// Card images, one per risk tier
    pub stimuli: Vec<StimulusRef>,
    /// Max pumps, parallel to `stimuli`
    pub max_pumps: Vec<u32>,
    pub repetitions: usize,
    pub reward: u32,
    pub seed: u64,
    /// Card shown when the balloon pops
    pub pop_image: StimulusRef,
    /// Window for a pump/cash-out response
    pub response_timeout: Duration,
    /// Window for leaving the instruction screen
    pub instruction_timeout: Duration,
    /// How long the "lose all" card stays up
    pub pop_feedback: Duration,
    /// Pause after the absent warning
    pub absent_pause: Duration,
    /// Pause on the final message
    pub final_pause: Duration,
    pub show_instructions: bool,
}

impl Default for TaskConfig {
    fn default() -> Self {
        TaskConfig {
            stimuli: (0..MAX_PUMPS.len())
                .map(|i| StimulusRef::new(format!("images/point_{}.png", (b'a' + i as u8) as char)))
                .collect(),
            max_pumps: MAX_PUMPS.to_vec(),
            repetitions: REPETITIONS,
            reward: REWARD,
            seed: SEQUENCE_SEED,
            pop_image: StimulusRef::new(BAD_CARD_IMAGE),
            response_timeout: Duration::from_secs(15),
            instruction_timeout: Duration::from_secs(30),
            pop_feedback: Duration::from_secs(1),
            absent_pause: Duration::from_secs(5),
            final_pause: Duration::from_secs(5),
            show_instructions: true,
        }
    }
}

impl TaskConfig {
    /// Check the configuration before any screen is drawn
    pub fn validate(&self) -> BartResult<()> {
        if self.stimuli.len() != self.max_pumps.len() {
            return Err(BartError::ConfigMismatch {
                stimuli: self.stimuli.len(),
                thresholds: self.max_pumps.len(),
            });
        }
        if self.stimuli.is_empty() {
            return Err(BartError::InvalidConfig("no stimuli configured".into()));
        }
        if self.max_pumps.iter().any(|&m| m == 0) {
            return Err(BartError::InvalidConfig("max pumps must be at least 1".into()));
        }
        if self.repetitions == 0 {
            return Err(BartError::InvalidConfig("repetitions must be at least 1".into()));
        }
        if self.reward == 0 {
            return Err(BartError::InvalidConfig("reward must be positive".into()));
        }
        check_limits(
            self.stimuli.len(),
            &self.max_pumps,
            self.repetitions,
            self.reward,
        )
    }

    /// Card growth per successful pump (80% of the card over the largest tier)
    pub fn growth_step(&self) -> f32 {
        let largest = self.max_pumps.iter().copied().max().unwrap_or(1).max(1);
        0.8 / largest as f32
    }

    /// Final message with the banked total filled in
    pub fn final_message(&self, total: u64) -> String {
        FINAL_MESSAGE.replace("{total}", &total.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TaskConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.stimuli[0].as_str(), "images/point_a.png");
        assert_eq!(config.stimuli[2].as_str(), "images/point_c.png");
        assert_eq!(config.seed, 52472);
    }

    #[test]
    fn test_mismatched_lists_rejected() {
        let config = TaskConfig {
            max_pumps: vec![8, 32],
            ..TaskConfig::default()
        };
        match config.validate() {
            Err(BartError::ConfigMismatch { stimuli, thresholds }) => {
                assert_eq!(stimuli, 3);
                assert_eq!(thresholds, 2);
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_values_rejected() {
        let no_reps = TaskConfig {
            repetitions: 0,
            ..TaskConfig::default()
        };
        assert!(matches!(no_reps.validate(), Err(BartError::InvalidConfig(_))));

        let zero_pumps = TaskConfig {
            max_pumps: vec![8, 0, 128],
            ..TaskConfig::default()
        };
        assert!(matches!(zero_pumps.validate(), Err(BartError::InvalidConfig(_))));
    }

    #[test]
    fn test_oversized_values_rejected() {
        let rich = TaskConfig {
            reward: u32::MAX,
            ..TaskConfig::default()
        };
        assert!(matches!(rich.validate(), Err(BartError::InvalidConfig(_))));

        // Largest reward whose 128-pump bank still fits
        let max_fitting = TaskConfig {
            reward: u32::MAX / 128,
            ..TaskConfig::default()
        };
        assert!(max_fitting.validate().is_ok());

        let endless = TaskConfig {
            repetitions: usize::MAX,
            ..TaskConfig::default()
        };
        assert!(matches!(endless.validate(), Err(BartError::InvalidConfig(_))));
    }

    #[test]
    fn test_growth_step_and_message() {
        let config = TaskConfig::default();
        assert!((config.growth_step() - 0.8 / 128.0).abs() < f32::EPSILON);
        assert_eq!(
            config.final_message(42),
            "Well done! You banked a total of 42. Thank you for your participation."
        );
    }
}
