//! Trial sequence generation
//!
//! Each (card, max pumps) pair is repeated and the whole list shuffled with
//! a fixed seed, so every participant sees the same order.

use std::fmt;
use std::path::Path;

use rand::seq::SliceRandom;
use serde::Serialize;

use crate::error::{BartError, BartResult};
use crate::task::rng::SeededRandom;

/// Upper bound on trials in one session
pub const MAX_TRIALS: usize = 10_000;

/// Reject sizes whose trial count or per-balloon bank would not fit
pub fn check_limits(
    stimuli: usize,
    max_pumps: &[u32],
    repetitions: usize,
    reward: u32,
) -> BartResult<()> {
    if stimuli
        .checked_mul(repetitions)
        .map_or(true, |total| total > MAX_TRIALS)
    {
        return Err(BartError::InvalidConfig(format!(
            "{} stimuli x {} repetitions exceeds {} trials",
            stimuli, repetitions, MAX_TRIALS
        )));
    }
    let largest = max_pumps.iter().copied().max().unwrap_or(0);
    if reward.checked_mul(largest).is_none() {
        return Err(BartError::InvalidConfig(format!(
            "reward {} x {} pumps overflows the trial bank",
            reward, largest
        )));
    }
    Ok(())
}

/// Reference to a stimulus image
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StimulusRef(String);

impl StimulusRef {
    pub fn new(path: impl Into<String>) -> Self {
        StimulusRef(path.into())
    }

    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short name for text rendering ("images/point_a.png" -> "point_a")
    pub fn label(&self) -> &str {
        Path::new(&self.0)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(self.0.as_str())
    }
}

impl fmt::Display for StimulusRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One balloon
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trial {
    pub shape_ref: StimulusRef,
    pub max_pumps: u32,
    pub reward: u32,
}

/// Ordered trials for a whole session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrialSequence {
    trials: Vec<Trial>,
}

impl TrialSequence {
    /// Build the shuffled sequence.
    ///
    /// `stimuli` and `max_pumps` are parallel lists: card `i` always comes
    /// with threshold `i`.
    pub fn generate(
        stimuli: &[StimulusRef],
        max_pumps: &[u32],
        repetitions: usize,
        reward: u32,
        seed: u64,
    ) -> BartResult<Self> {
        if stimuli.len() != max_pumps.len() {
            return Err(BartError::ConfigMismatch {
                stimuli: stimuli.len(),
                thresholds: max_pumps.len(),
            });
        }
        if stimuli.is_empty() || repetitions == 0 {
            return Err(BartError::InvalidConfig(
                "trial sequence would be empty".into(),
            ));
        }
        if reward == 0 || max_pumps.contains(&0) {
            return Err(BartError::InvalidConfig(
                "reward and max pumps must be positive".into(),
            ));
        }
        check_limits(stimuli.len(), max_pumps, repetitions, reward)?;

        let mut trials = Vec::with_capacity(stimuli.len() * repetitions);
        for _ in 0..repetitions {
            for (shape_ref, &max) in stimuli.iter().zip(max_pumps) {
                trials.push(Trial {
                    shape_ref: shape_ref.clone(),
                    max_pumps: max,
                    reward,
                });
            }
        }

        let mut rng = SeededRandom::new(seed);
        trials.shuffle(rng.rng_mut());

        Ok(TrialSequence { trials })
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trial> {
        self.trials.iter()
    }

    /// Number of trials with the given threshold
    #[cfg(test)]
    pub fn count_tier(&self, max_pumps: u32) -> usize {
        self.trials.iter().filter(|t| t.max_pumps == max_pumps).count()
    }
}

impl<'a> IntoIterator for &'a TrialSequence {
    type Item = &'a Trial;
    type IntoIter = std::slice::Iter<'a, Trial>;

    fn into_iter(self) -> Self::IntoIter {
        self.trials.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::config::{TaskConfig, MAX_PUMPS, SEQUENCE_SEED};

    fn default_sequence(repetitions: usize) -> TrialSequence {
        let config = TaskConfig::default();
        TrialSequence::generate(
            &config.stimuli,
            &config.max_pumps,
            repetitions,
            config.reward,
            SEQUENCE_SEED,
        )
        .unwrap()
    }

    #[test]
    fn test_length_and_tier_counts() {
        let seq = default_sequence(30);
        assert_eq!(seq.len(), 90);
        for max in MAX_PUMPS {
            assert_eq!(seq.count_tier(max), 30);
        }
    }

    #[test]
    fn test_order_is_reproducible() {
        assert_eq!(default_sequence(30), default_sequence(30));
    }

    #[test]
    fn test_order_is_shuffled() {
        let seq = default_sequence(30);
        let tiers: Vec<u32> = seq.iter().map(|t| t.max_pumps).collect();
        let unshuffled: Vec<u32> = (0..30).flat_map(|_| MAX_PUMPS).collect();
        assert_ne!(tiers, unshuffled);
    }

    #[test]
    fn test_cards_stay_paired_with_tiers() {
        let config = TaskConfig::default();
        let seq = default_sequence(10);
        for trial in &seq {
            let idx = config
                .stimuli
                .iter()
                .position(|s| *s == trial.shape_ref)
                .unwrap();
            assert_eq!(config.max_pumps[idx], trial.max_pumps);
            assert_eq!(trial.reward, 1);
        }
    }

    #[test]
    fn test_mismatch_fails_fast() {
        let stimuli = vec![StimulusRef::new("a.png"), StimulusRef::new("b.png")];
        let result = TrialSequence::generate(&stimuli, &[8, 32, 128], 30, 1, SEQUENCE_SEED);
        assert!(matches!(
            result,
            Err(BartError::ConfigMismatch {
                stimuli: 2,
                thresholds: 3
            })
        ));
    }

    #[test]
    fn test_oversized_sequence_rejected() {
        let config = TaskConfig::default();
        let huge = TrialSequence::generate(
            &config.stimuli,
            &config.max_pumps,
            usize::MAX,
            1,
            SEQUENCE_SEED,
        );
        assert!(matches!(huge, Err(BartError::InvalidConfig(_))));

        let rich = TrialSequence::generate(
            &config.stimuli,
            &config.max_pumps,
            30,
            u32::MAX,
            SEQUENCE_SEED,
        );
        assert!(matches!(rich, Err(BartError::InvalidConfig(_))));

        let at_limit = TrialSequence::generate(
            &config.stimuli[..1],
            &config.max_pumps[..1],
            MAX_TRIALS,
            1,
            SEQUENCE_SEED,
        )
        .unwrap();
        assert_eq!(at_limit.len(), MAX_TRIALS);
    }

    #[test]
    fn test_stimulus_label() {
        assert_eq!(StimulusRef::new("images/point_a.png").label(), "point_a");
        assert_eq!(StimulusRef::new("plain").label(), "plain");
    }
}
