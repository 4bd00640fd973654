//! Session Management: trial state machine, balances, records and the controller
//!
//! # Components
//! - `trial.rs`: TrialRun state machine and pop probability
//! - `state.rs`: SessionState balances carried across trials
//! - `stats.rs`: Per-tier statistics (adjusted average pumps)
//! - `record.rs`: TrialRecord and the JSON-lines DataLog
//! - `surface.rs`: Presentation and input traits consumed by the controller
//! - `controller.rs`: SessionController run loop

pub mod controller;
pub mod record;
pub mod state;
pub mod stats;
pub mod surface;
pub mod trial;

#[cfg(test)]
pub mod testing;

pub use controller::{SessionController, SessionOutcome, SessionReport};
pub use record::DataLog;
pub use surface::{Alignment, InputSource, Key, PresentationSurface, TextPosition};
