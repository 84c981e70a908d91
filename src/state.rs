//! Session state machine gating loads, selection edits and exports

use serde::Serialize;
use std::fmt;

use crate::error::FilterError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SessionState {
    #[default]
    WaitingForFile,
    SelectingTopics,
    Exporting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    LoadCompleted,
    ExportRequested,
    ExportFinished,
}

/// Mutating operations a caller may ask the session for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    EditSelection,
    Export,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::WaitingForFile => write!(f, "waiting for a bag file"),
            SessionState::SelectingTopics => write!(f, "selecting topics"),
            SessionState::Exporting => write!(f, "exporting"),
        }
    }
}

impl SessionEvent {
    fn action(self) -> &'static str {
        match self {
            SessionEvent::LoadCompleted => "complete a load",
            SessionEvent::ExportRequested => "start an export",
            SessionEvent::ExportFinished => "finish an export",
        }
    }
}

impl Operation {
    fn action(self) -> &'static str {
        match self {
            Operation::Load => "load bags",
            Operation::EditSelection => "edit the selection",
            Operation::Export => "export",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action())
    }
}

impl SessionState {
    /// Next state after `event`, or the reason it is not allowed here.
    pub fn on(self, event: SessionEvent) -> Result<SessionState, FilterError> {
        use SessionEvent::*;
        use SessionState::*;

        let next = match (self, event) {
            (Exporting, LoadCompleted) => {
                return Err(FilterError::SessionBusy {
                    operation: Operation::Load,
                });
            }
            (WaitingForFile | SelectingTopics, LoadCompleted) => SelectingTopics,
            (SelectingTopics, ExportRequested) => Exporting,
            (Exporting, ExportFinished) => SelectingTopics,
            (state, event) => {
                return Err(FilterError::InvalidTransition {
                    state,
                    action: event.action(),
                });
            }
        };
        tracing::debug!("session: {} -> {}", self, next);
        Ok(next)
    }

    pub fn permits(self, operation: Operation) -> bool {
        match operation {
            Operation::Load => self != SessionState::Exporting,
            Operation::EditSelection | Operation::Export => self == SessionState::SelectingTopics,
        }
    }

    /// `Ok` when `operation` is allowed. Loads and edits during an export
    /// are `SessionBusy`; a refused export is always `InvalidTransition`.
    /// Selection edits before any load are refused with `InvalidTransition`
    /// rather than `SessionBusy`, since nothing is running.
    pub fn check(self, operation: Operation) -> Result<(), FilterError> {
        if self.permits(operation) {
            Ok(())
        } else if self == SessionState::Exporting && operation != Operation::Export {
            Err(FilterError::SessionBusy { operation })
        } else {
            Err(FilterError::InvalidTransition {
                state: self,
                action: operation.action(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let s = SessionState::default();
        assert_eq!(s, SessionState::WaitingForFile);
        let s = s.on(SessionEvent::LoadCompleted).unwrap();
        assert_eq!(s, SessionState::SelectingTopics);
        let s = s.on(SessionEvent::LoadCompleted).unwrap();
        let s = s.on(SessionEvent::ExportRequested).unwrap();
        assert_eq!(s, SessionState::Exporting);
        assert_eq!(s.on(SessionEvent::ExportFinished).unwrap(), SessionState::SelectingTopics);
    }

    #[test]
    fn test_export_before_load_is_invalid() {
        let err = SessionState::WaitingForFile
            .on(SessionEvent::ExportRequested)
            .unwrap_err();
        assert!(matches!(
            err,
            FilterError::InvalidTransition { state: SessionState::WaitingForFile, .. }
        ));
    }

    #[test]
    fn test_load_while_exporting_is_busy() {
        let err = SessionState::Exporting.on(SessionEvent::LoadCompleted).unwrap_err();
        assert!(matches!(err, FilterError::SessionBusy { operation: Operation::Load }));
    }

    #[test]
    fn test_second_export_is_rejected() {
        assert!(SessionState::Exporting.on(SessionEvent::ExportRequested).is_err());
        assert!(SessionState::SelectingTopics.on(SessionEvent::ExportFinished).is_err());
    }

    #[test]
    fn test_permissions_per_state() {
        use Operation::*;
        assert!(SessionState::WaitingForFile.permits(Load));
        assert!(!SessionState::WaitingForFile.permits(EditSelection));
        assert!(SessionState::SelectingTopics.permits(Export));
        assert!(!SessionState::Exporting.permits(Load));

        assert!(matches!(
            SessionState::Exporting.check(EditSelection),
            Err(FilterError::SessionBusy { operation: EditSelection })
        ));
        assert!(matches!(
            SessionState::WaitingForFile.check(Export),
            Err(FilterError::InvalidTransition { .. })
        ));
        assert!(matches!(
            SessionState::Exporting.check(Export),
            Err(FilterError::InvalidTransition { state: SessionState::Exporting, .. })
        ));
        assert!(matches!(
            SessionState::WaitingForFile.check(EditSelection),
            Err(FilterError::InvalidTransition { state: SessionState::WaitingForFile, .. })
        ));
        assert!(SessionState::SelectingTopics.check(EditSelection).is_ok());
    }
}
