//! Trial records and the per-participant data log
//!
//! One JSON object per line, flushed after every trial.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{BartError, BartResult};
use crate::session::trial::TrialOutcome;
use crate::task::StimulusRef;

/// Everything logged about one finished trial
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrialRecord {
    pub trial_index: usize,
    pub shape_ref: StimulusRef,
    pub max_pumps: u32,
    pub pump_count: u32,
    pub outcome: TrialOutcome,
    pub temp_bank: u32,
    pub permanent_bank: u64,
    pub last_trial_bank: u64,
    /// Latency of the final response; absent on timeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    pub recorded_at: DateTime<Utc>,
}

/// Destination for trial records
pub trait TrialSink {
    fn record(&mut self, record: &TrialRecord) -> BartResult<()>;
}

impl TrialSink for Vec<TrialRecord> {
    fn record(&mut self, record: &TrialRecord) -> BartResult<()> {
        self.push(record.clone());
        Ok(())
    }
}

impl<S: TrialSink> TrialSink for Option<S> {
    fn record(&mut self, record: &TrialRecord) -> BartResult<()> {
        match self {
            Some(sink) => sink.record(record),
            None => Ok(()),
        }
    }
}

impl<S: TrialSink + ?Sized> TrialSink for &mut S {
    fn record(&mut self, record: &TrialRecord) -> BartResult<()> {
        (**self).record(record)
    }
}

/// Append-only JSON-lines file for one participant
pub struct DataLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl DataLog {
    /// Create `<dir>/<subject>_bart_<timestamp>.jsonl`
    pub fn create(dir: &Path, subject: &str, started: DateTime<Utc>) -> BartResult<Self> {
        fs::create_dir_all(dir).map_err(BartError::Record)?;
        let file_name = format!(
            "{}_bart_{}.jsonl",
            sanitize_subject(subject),
            started.format("%Y%m%d_%H%M%S")
        );
        Self::open(dir.join(file_name))
    }

    /// Open (or append to) a log at an explicit path
    pub fn open(path: PathBuf) -> BartResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(BartError::Record)?;
        Ok(DataLog {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TrialSink for DataLog {
    fn record(&mut self, record: &TrialRecord) -> BartResult<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n").map_err(BartError::Record)?;
        self.writer.flush().map_err(BartError::Record)?;
        Ok(())
    }
}

/// Keep subject ids safe for file names
fn sanitize_subject(subject: &str) -> String {
    let cleaned: String = subject
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "anonymous".to_string()
    } else {
        cleaned
    }
}
