//! Video lifecycle state machine.

use serde::{Deserialize, Serialize};

/// `CREATED -> UPLOADING -> UPLOADED -> SPLITTING -> PRINTING -> COMPLETED`,
/// plus the terminal `FAILED` state reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum VideoStatus {
    Created,
    Uploading,
    Uploaded,
    Splitting,
    Printing,
    Completed,
    Failed,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Created => "CREATED",
            VideoStatus::Uploading => "UPLOADING",
            VideoStatus::Uploaded => "UPLOADED",
            VideoStatus::Splitting => "SPLITTING",
            VideoStatus::Printing => "PRINTING",
            VideoStatus::Completed => "COMPLETED",
            VideoStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, VideoStatus::Completed | VideoStatus::Failed)
    }

    /// True iff the transition `self -> target` is an allowed edge. `FAILED`
    /// is reachable from any non-terminal state; re-applying the same state
    /// is never a valid "transition" (callers should special-case no-ops).
    pub fn can_transition_to(&self, target: VideoStatus) -> bool {
        use VideoStatus::*;
        match (self, target) {
            (Created, Uploading) => true,
            (Uploading, Uploaded) => true,
            (Uploaded, Splitting) => true,
            (Splitting, Printing) => true,
            (Printing, Completed) => true,
            (s, Failed) if !s.is_terminal() => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use VideoStatus::*;

    const ALL: [VideoStatus; 7] = [
        Created, Uploading, Uploaded, Splitting, Printing, Completed, Failed,
    ];

    #[test]
    fn forward_chain_is_allowed() {
        assert!(Created.can_transition_to(Uploading));
        assert!(Uploading.can_transition_to(Uploaded));
        assert!(Uploaded.can_transition_to(Splitting));
        assert!(Splitting.can_transition_to(Printing));
        assert!(Printing.can_transition_to(Completed));
    }

    #[test]
    fn failed_reachable_from_any_non_terminal_state() {
        for s in ALL {
            if !s.is_terminal() {
                assert!(s.can_transition_to(Failed), "{:?} -> FAILED should be allowed", s);
            }
        }
    }

    #[test]
    fn terminal_states_accept_no_transitions() {
        for target in ALL {
            assert!(!Completed.can_transition_to(target));
            assert!(!Failed.can_transition_to(target));
        }
    }

    #[test]
    fn only_declared_edges_are_allowed() {
        let mut allowed_count = 0;
        for from in ALL {
            for to in ALL {
                if from.can_transition_to(to) {
                    allowed_count += 1;
                }
            }
        }
        // 5 forward edges + FAILED reachable from the 5 non-terminal states
        assert_eq!(allowed_count, 5 + 5);
    }

    #[test]
    fn skip_transitions_are_rejected() {
        assert!(!Created.can_transition_to(Uploaded));
        assert!(!Uploading.can_transition_to(Splitting));
        assert!(!Created.can_transition_to(Completed));
    }
}
