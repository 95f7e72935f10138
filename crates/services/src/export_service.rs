use std::path::Path;

use quiz_core::model::{ExportRecord, QuizSettings, SessionSummary};

use crate::Clock;
use crate::error::ExportError;

/// File name used when the caller does not pick one.
pub const DEFAULT_EXPORT_FILE: &str = "quickmath-result.json";

/// Turns a finished session into a JSON result artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportService {
    clock: Clock,
}

impl ExportService {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self { clock }
    }

    /// Snapshot a summary together with the settings it was played with.
    #[must_use]
    pub fn build(&self, summary: &SessionSummary, settings: &QuizSettings) -> ExportRecord {
        ExportRecord::from_summary(summary, settings, self.clock.now())
    }

    /// Pretty-printed JSON for a record.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Json` if serialization fails.
    pub fn to_json(&self, record: &ExportRecord) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(record)?)
    }

    /// Write a record to `path` as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ExportError` if serialization or the file write fails.
    pub fn write_to(&self, path: &Path, record: &ExportRecord) -> Result<(), ExportError> {
        let json = self.to_json(record)?;
        std::fs::write(path, json)?;
        log::info!("exported result to {}", path.display());
        Ok(())
    }
}
