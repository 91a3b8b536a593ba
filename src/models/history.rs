use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::maneuver::{Maneuver, Phase};

/// Self-assessed result of one turn.
///
/// - `Completed`: The pilot ran through the procedure without trouble
/// - `FollowUp`: The procedure needs more practice
/// - `Skipped`: The turn was passed over; never written to the history store
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Completed,
    FollowUp,
    Skipped,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::FollowUp => "follow_up",
            Self::Skipped => "skipped",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(Self::Completed),
            "follow_up" => Some(Self::FollowUp),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }

    /// Whether this outcome produces a history record.
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Completed | Self::FollowUp)
    }
}

/// An append-only log entry for one practiced maneuver.
///
/// Records are keyed by maneuver name, so two catalog entries sharing a name
/// are indistinguishable in the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub maneuver: String,
    /// Name of the phase that was drawn, for multi-phase maneuvers.
    pub phase: Option<String>,
    pub maneuver_type: String,
    pub outcome: Outcome,
}

impl HistoryRecord {
    pub fn new(maneuver: &Maneuver, phase: Option<&Phase>, outcome: Outcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            maneuver: maneuver.name.clone(),
            phase: phase.map(|p| p.name.clone()),
            maneuver_type: maneuver.type_label().to_string(),
            outcome,
        }
    }

    /// "Engine Fire / Fails" for phased records, just the maneuver otherwise.
    pub fn display_name(&self) -> String {
        match &self.phase {
            Some(phase) => format!("{} / {}", self.maneuver, phase),
            None => self.maneuver.clone(),
        }
    }
}
