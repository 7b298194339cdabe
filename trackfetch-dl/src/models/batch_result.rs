//! Per-row outcomes and the batch accumulator

use serde::Serialize;

/// Terminal state of one manifest row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// No URL in the row. Contributes nothing to the report.
    Skipped,
    /// Fetch or write failed. Name is not counted as processed.
    FetchFailed { name: String, detail: String },
    /// Bytes landed but tagging failed. Counted as processed AND reported as an error.
    TagFailed { name: String, detail: String },
    /// Fetched, written and tagged
    Tagged { name: String },
    /// Row processing panicked
    Unexpected { name: String, detail: String },
}

impl RowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RowOutcome::Tagged { .. } | RowOutcome::TagFailed { .. })
    }
}

/// Ordered successes and error strings for one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub succeeded: Vec<String>,
    pub errors: Vec<String>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one row's outcome into the accumulator
    pub fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Skipped => {}
            RowOutcome::FetchFailed { name, detail } => {
                self.errors
                    .push(format!("Failed to download {}: {}", name, detail));
            }
            RowOutcome::TagFailed { name, detail } => {
                self.errors
                    .push(format!("Downloaded but failed to tag {}: {}", name, detail));
                self.succeeded.push(name);
            }
            RowOutcome::Tagged { name } => {
                self.succeeded.push(name);
            }
            RowOutcome::Unexpected { name, detail } => {
                self.errors
                    .push(format!("Unexpected error processing {}: {}", name, detail));
            }
        }
    }
}
