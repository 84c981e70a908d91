//! Error kinds shared by the catalog, selection, session and export layers

use std::path::PathBuf;
use thiserror::Error;

use crate::selection::Grouping;
use crate::state::{Operation, SessionState};

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("no bag files were chosen")]
    NoFilesChosen,

    #[error("failed to read bag {}: {reason}", .path.display())]
    LoadFailed { path: PathBuf, reason: String },

    #[error("no topics were selected to export")]
    EmptySelection,

    #[error("invalid output location: {0}")]
    InvalidOutputLocation(String),

    #[error("unknown {grouping} entry: {key}")]
    InvalidKey { key: String, grouping: Grouping },

    #[error("cannot {action} while {state}")]
    InvalidTransition {
        state: SessionState,
        action: &'static str,
    },

    #[error("session is busy exporting; {operation} is not permitted")]
    SessionBusy { operation: Operation },

    #[error("topic cannot be single-quoted in a filter expression: {0}")]
    UnsafeTopicName(String),

    #[error("output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("filter tool failed for {}: {reason}", .bag.display())]
    ExternalProcessFailure { bag: PathBuf, reason: String },
}
