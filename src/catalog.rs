//! Maneuver catalog: validated, immutable maneuver definitions.
//!
//! Raw definitions come from a JSON array. Loading is all-or-nothing: one
//! malformed entry rejects the whole catalog.

use std::collections::HashSet;
use std::fs;
use std::ops::Index;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::{Maneuver, ManeuverId, Phase};

/// A maneuver definition as written in the catalog source, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawManeuver {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub maneuver_type: Option<String>,
    pub kind: Option<String>,
    pub description: Option<String>,
    pub phases: Option<Vec<RawPhase>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPhase {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Maneuver counts by category, for summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub total: usize,
    pub emergency: usize,
    pub private: usize,
    pub commercial: usize,
}

impl CategoryCounts {
    pub fn tally<'a>(maneuvers: impl IntoIterator<Item = &'a Maneuver>) -> Self {
        maneuvers
            .into_iter()
            .fold(Self::default(), |mut counts, maneuver| {
                counts.total += 1;
                if maneuver.is_emergency() {
                    counts.emergency += 1;
                }
                if maneuver.has_kind("private") {
                    counts.private += 1;
                }
                if maneuver.has_kind("commercial") {
                    counts.commercial += 1;
                }
                counts
            })
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    maneuvers: Vec<Maneuver>,
}

impl Catalog {
    /// Validate raw definitions into a catalog.
    ///
    /// An explicitly empty `phases` array is accepted and treated exactly like
    /// an absent one: the maneuver is single-phase.
    pub fn load(raw: Vec<RawManeuver>) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::Validation(
                "catalog must contain at least one maneuver".to_string(),
            ));
        }

        let maneuvers = raw
            .into_iter()
            .enumerate()
            .map(|(index, entry)| validate_maneuver(index, entry))
            .collect::<Result<Vec<_>>>()?;

        let mut seen = HashSet::new();
        for maneuver in &maneuvers {
            if !seen.insert(maneuver.name.as_str()) {
                tracing::warn!(
                    "Duplicate maneuver name '{}'; history records for it will be ambiguous",
                    maneuver.name
                );
            }
        }

        tracing::debug!("Loaded catalog with {} maneuvers", maneuvers.len());
        Ok(Self { maneuvers })
    }

    /// Parse a JSON array of maneuver definitions.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| Error::Validation(format!("catalog is not valid JSON: {}", e)))?;

        let serde_json::Value::Array(entries) = value else {
            return Err(Error::Validation(
                "catalog must be a JSON array of maneuvers".to_string(),
            ));
        };

        let raw = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                serde_json::from_value::<RawManeuver>(entry)
                    .map_err(|e| Error::Validation(format!("maneuver #{}: {}", index + 1, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::load(raw)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::Validation(format!(
                "maneuvers file '{}' not found or not a file",
                path.display()
            )));
        }
        let text = fs::read_to_string(path).map_err(|e| {
            Error::Validation(format!(
                "could not read maneuvers file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&text)
    }

    pub fn len(&self) -> usize {
        self.maneuvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maneuvers.is_empty()
    }

    pub fn get(&self, id: ManeuverId) -> Option<&Maneuver> {
        self.maneuvers.get(id.0)
    }

    /// Maneuvers with their identifiers, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (ManeuverId, &Maneuver)> {
        self.maneuvers
            .iter()
            .enumerate()
            .map(|(index, maneuver)| (ManeuverId(index), maneuver))
    }

    pub fn counts(&self) -> CategoryCounts {
        CategoryCounts::tally(&self.maneuvers)
    }
}

impl Index<ManeuverId> for Catalog {
    type Output = Maneuver;

    fn index(&self, id: ManeuverId) -> &Maneuver {
        &self.maneuvers[id.0]
    }
}

fn validate_maneuver(index: usize, raw: RawManeuver) -> Result<Maneuver> {
    let position = index + 1;
    let name = required_name(raw.name)
        .ok_or_else(|| Error::Validation(format!("maneuver #{} is missing a name", position)))?;

    let phases = match raw.phases {
        None => Vec::new(),
        Some(phases) if phases.is_empty() => {
            tracing::warn!(
                "Maneuver '{}' declares an empty phases list; treating it as single-phase",
                name
            );
            Vec::new()
        }
        Some(phases) => phases
            .into_iter()
            .enumerate()
            .map(|(phase_index, phase)| {
                let phase_name = required_name(phase.name).ok_or_else(|| {
                    Error::Validation(format!(
                        "phase #{} of maneuver '{}' is missing a name",
                        phase_index + 1,
                        name
                    ))
                })?;
                Ok(Phase {
                    name: phase_name,
                    description: phase.description,
                })
            })
            .collect::<Result<Vec<_>>>()?,
    };

    Ok(Maneuver {
        name,
        maneuver_type: raw.maneuver_type,
        kind: raw.kind,
        description: raw.description,
        phases,
    })
}

fn required_name(name: Option<String>) -> Option<String> {
    name.filter(|n| !n.trim().is_empty())
}
