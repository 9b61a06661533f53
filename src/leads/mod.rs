pub mod form;
pub mod service;

pub use service::{
    create_lead, export_leads, get_lead, import_leads, list_history, list_leads, update_lead,
};

use std::fmt;

/// Steps of an update, in order. A failure is reported with the step it
/// happened in and nothing after it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStage {
    Fetching,
    Validating,
    ConflictChecking,
    Persisting,
    Diffing,
    Recording,
    Done,
}

impl UpdateStage {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateStage::Fetching => "fetching",
            UpdateStage::Validating => "validating",
            UpdateStage::ConflictChecking => "conflict_checking",
            UpdateStage::Persisting => "persisting",
            UpdateStage::Diffing => "diffing",
            UpdateStage::Recording => "recording",
            UpdateStage::Done => "done",
        }
    }
}

impl fmt::Display for UpdateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
