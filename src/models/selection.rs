use serde::{Deserialize, Serialize};

/// Which slice of the catalog a session practices.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CertLevel {
    Private,
    Commercial,
    EmergenciesOnly,
    All,
}

impl CertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Commercial => "commercial",
            Self::EmergenciesOnly => "emergencies_only",
            Self::All => "all",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Private => "Private",
            Self::Commercial => "Commercial",
            Self::EmergenciesOnly => "Emergencies only",
            Self::All => "All",
        }
    }
}

/// How the session decides when it is over.
///
/// - `Indefinite`: Draw with replacement until the pilot quits
/// - `Fixed`: Visit every selected maneuver once, then stop
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Indefinite,
    Fixed,
}

/// How emergencies behave in a fixed-length session.
///
/// - `All`: Every emergency appears once like any other maneuver
/// - `Random`: Emergencies pop up by chance and do not count toward completion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyMode {
    All,
    Random,
}

/// Everything the startup dialog collects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Selection {
    pub level: CertLevel,
    pub include_emergencies: bool,
    pub mode: SessionMode,
    /// Only set for fixed-length sessions that include emergencies.
    pub emergency_mode: Option<EmergencyMode>,
}

impl Selection {
    /// Indefinite session over `level`, the shape most tests want.
    pub fn indefinite(level: CertLevel, include_emergencies: bool) -> Self {
        Self {
            level,
            include_emergencies,
            mode: SessionMode::Indefinite,
            emergency_mode: None,
        }
    }
}
