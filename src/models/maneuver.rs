use serde::{Deserialize, Serialize};

/// Category value marking a maneuver as an emergency scenario.
pub const EMERGENCY_TYPE: &str = "emergency";

/// Category shown when a maneuver does not declare one.
pub const DEFAULT_TYPE: &str = "normal";

/// Position of a maneuver inside its catalog.
///
/// Identifiers are assigned once at load time and never change, so the active
/// pool can drop a maneuver without shifting anyone else's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ManeuverId(pub usize);

/// Position of a phase inside its parent maneuver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PhaseId(pub usize);

/// A procedure or scenario the pilot rehearses mentally.
///
/// `maneuver_type` is a free-form category ("maneuver", "emergency", ...).
/// `kind` is the certification level tag ("private", "commercial"); it is
/// absent for scenarios that apply at every level, such as emergencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maneuver {
    pub name: String,
    #[serde(rename = "type")]
    pub maneuver_type: Option<String>,
    pub kind: Option<String>,
    pub description: Option<String>,
    /// Alternative sub-scenarios. Empty means single-phase.
    #[serde(default)]
    pub phases: Vec<Phase>,
}

impl Maneuver {
    pub fn is_emergency(&self) -> bool {
        self.maneuver_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(EMERGENCY_TYPE))
    }

    pub fn has_kind(&self, kind: &str) -> bool {
        self.kind
            .as_deref()
            .is_some_and(|k| k.eq_ignore_ascii_case(kind))
    }

    pub fn is_multi_phase(&self) -> bool {
        !self.phases.is_empty()
    }

    /// Category used for display and history records.
    pub fn type_label(&self) -> &str {
        self.maneuver_type.as_deref().unwrap_or(DEFAULT_TYPE)
    }

    pub fn phase(&self, id: PhaseId) -> Option<&Phase> {
        self.phases.get(id.0)
    }
}

/// One alternative sub-scenario of a multi-phase maneuver.
///
/// Phases carry no category or level of their own; they are shown in the
/// context of their parent maneuver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    pub description: Option<String>,
}
