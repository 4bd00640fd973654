//! Task definition: configuration, trial sequence and randomness
//!
//! # Components
//! - `config.rs`: TaskConfig with the experiment constants
//! - `trials.rs`: Trial and the fixed-seed TrialSequence generator
//! - `rng.rs`: RandomSource trait and the seeded ChaCha stream

pub mod config;
pub mod rng;
pub mod trials;

pub use config::TaskConfig;
pub use rng::{RandomSource, SeededRandom};
pub use trials::{StimulusRef, Trial, TrialSequence};
