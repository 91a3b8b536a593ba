//! The active pool: maneuvers still eligible for a draw this session.
//!
//! The pool never re-filters. It only shrinks through permanent skips, and in
//! fixed-length sessions it also remembers which maneuvers have had their turn.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::Catalog;
use crate::error::{EmptyPoolCause, Error, Result};
use crate::models::{EmergencyMode, ManeuverId, Selection, SessionMode};

/// How draws are made from the pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawPolicy {
    pub mode: SessionMode,
    pub emergency_mode: Option<EmergencyMode>,
    /// Chance, in percent, that a draw picks an emergency. `None` draws uniformly.
    pub emergency_probability: Option<f64>,
}

impl DrawPolicy {
    pub fn new(selection: &Selection, emergency_probability: Option<f64>) -> Self {
        Self {
            mode: selection.mode,
            emergency_mode: selection.emergency_mode,
            emergency_probability,
        }
    }

    /// Uniform draws with replacement.
    pub fn uniform() -> Self {
        Self {
            mode: SessionMode::Indefinite,
            emergency_mode: None,
            emergency_probability: None,
        }
    }

    fn is_fixed(&self) -> bool {
        self.mode == SessionMode::Fixed
    }

    /// Random-mode emergencies do not count toward completing a fixed session.
    fn emergencies_float(&self) -> bool {
        self.is_fixed() && self.emergency_mode == Some(EmergencyMode::Random)
    }

    /// Weighted draws apply except when every emergency must appear exactly once.
    fn weights_emergencies(&self) -> bool {
        !(self.is_fixed() && self.emergency_mode == Some(EmergencyMode::All))
    }
}

#[derive(Debug, Clone)]
pub struct ActivePool {
    live: BTreeSet<ManeuverId>,
    skipped: BTreeSet<ManeuverId>,
    visited: BTreeSet<ManeuverId>,
}

impl ActivePool {
    pub fn new(ids: impl IntoIterator<Item = ManeuverId>) -> Self {
        Self {
            live: ids.into_iter().collect(),
            skipped: BTreeSet::new(),
            visited: BTreeSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn contains(&self, id: ManeuverId) -> bool {
        self.live.contains(&id)
    }

    /// Live identifiers in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = ManeuverId> + '_ {
        self.live.iter().copied()
    }

    /// Maneuvers removed by permanent skip, in catalog order.
    pub fn skipped(&self) -> impl Iterator<Item = ManeuverId> + '_ {
        self.skipped.iter().copied()
    }

    /// Drop a maneuver for the rest of the session. Returns false if it was not live.
    pub fn remove(&mut self, id: ManeuverId) -> bool {
        if !self.live.remove(&id) {
            return false;
        }
        self.skipped.insert(id);
        true
    }

    pub fn mark_visited(&mut self, id: ManeuverId) {
        self.visited.insert(id);
    }

    /// Maneuvers a fixed-length session still has to get through.
    ///
    /// Always equals the pool size for indefinite sessions. Random-mode
    /// emergencies only count once no regular maneuver is left in the pool.
    pub fn remaining(&self, catalog: &Catalog, policy: &DrawPolicy) -> usize {
        if !policy.is_fixed() {
            return self.live.len();
        }
        let floating = self.emergencies_float(catalog, policy);
        self.live
            .iter()
            .filter(|id| !self.visited.contains(*id))
            .filter(|id| !(floating && catalog[**id].is_emergency()))
            .count()
    }

    fn emergencies_float(&self, catalog: &Catalog, policy: &DrawPolicy) -> bool {
        policy.emergencies_float() && self.live.iter().any(|id| !catalog[*id].is_emergency())
    }

    /// Draw the next maneuver.
    ///
    /// Returns `Ok(None)` once a fixed-length session has visited everything,
    /// and [`Error::EmptyPool`] if permanent skips emptied the pool.
    pub fn draw<R: Rng + ?Sized>(
        &self,
        catalog: &Catalog,
        policy: &DrawPolicy,
        rng: &mut R,
    ) -> Result<Option<ManeuverId>> {
        if self.live.is_empty() {
            return Err(Error::EmptyPool(EmptyPoolCause::Depleted));
        }
        if self.remaining(catalog, policy) == 0 {
            return Ok(None);
        }

        let available: Vec<ManeuverId> = self
            .live
            .iter()
            .copied()
            .filter(|id| !policy.is_fixed() || !self.visited.contains(id))
            .collect();

        let choice = match policy.emergency_probability {
            Some(probability) if policy.weights_emergencies() => {
                weighted_choice(&available, catalog, probability, rng)
            }
            _ => available.choose(rng).copied(),
        };
        Ok(choice)
    }
}

/// Pick the emergency or the non-emergency side first, then uniformly within it.
fn weighted_choice<R: Rng + ?Sized>(
    available: &[ManeuverId],
    catalog: &Catalog,
    probability: f64,
    rng: &mut R,
) -> Option<ManeuverId> {
    let (emergencies, others): (Vec<ManeuverId>, Vec<ManeuverId>) = available
        .iter()
        .partition(|id| catalog[**id].is_emergency());

    if emergencies.is_empty() || others.is_empty() {
        return available.choose(rng).copied();
    }

    let side = if rng.gen_bool((probability / 100.0).clamp(0.0, 1.0)) {
        &emergencies
    } else {
        &others
    };
    side.choose(rng).copied()
}
