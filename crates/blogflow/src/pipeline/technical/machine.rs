use serde::{Deserialize, Serialize};

/// Phases of the technical pipeline.
///
/// ```text
/// Idle → Fetching → Selecting → Picking → Researching → Writing → Drafting
///                                  ↑  └──(queue empty)──→ Done       │
///                                  └────────(queue non-empty)─────────┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechnicalPhase {
    #[default]
    Idle,
    Fetching,
    Selecting,
    Picking,
    Researching,
    Writing,
    Drafting,
    Done,
}

impl TechnicalPhase {
    pub fn can_transition_to(self, next: TechnicalPhase) -> bool {
        use TechnicalPhase::*;
        matches!(
            (self, next),
            (Idle, Fetching)
                | (Fetching, Selecting)
                | (Selecting, Picking)
                | (Picking, Researching)
                | (Picking, Done)
                | (Researching, Writing)
                | (Writing, Drafting)
                | (Drafting, Picking)
                | (Drafting, Done)
        )
    }

    /// Phase after `Drafting` or an empty `Picking`.
    pub fn after_idea(queue_empty: bool) -> TechnicalPhase {
        if queue_empty {
            TechnicalPhase::Done
        } else {
            TechnicalPhase::Picking
        }
    }

    pub fn is_terminal(self) -> bool {
        self == TechnicalPhase::Done
    }
}
