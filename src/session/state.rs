//! Turn states and the response alphabet of each prompt.
//!
//! A turn moves `Waiting → Presenting → (ConfirmingSkip) → Waiting` until it
//! reaches `Terminated`. The presenting family is split three ways so that a
//! multi-phase maneuver can only be completed after a phase was drawn:
//!
//! ```text
//! Waiting ──draw──▶ Presenting(Maneuver)    ──c──▶ record ──▶ Waiting
//!         └─draw──▶ Presenting(PhaseChoice) ──n──▶ Presenting(Phase) ──c──▶ record ──▶ Waiting
//! any Presenting ──p──▶ ConfirmingSkip ──y──▶ Waiting (removed from pool)
//!                                      └─n──▶ Presenting (from scratch)
//! any Presenting ──q──▶ Terminated
//! ```

use crate::error::InputError;
use crate::models::{ManeuverId, PhaseId};

/// What is on screen while the session waits for a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// A single-phase maneuver.
    Maneuver(ManeuverId),
    /// A multi-phase maneuver whose phase has not been drawn yet.
    PhaseChoice(ManeuverId),
    /// A multi-phase maneuver with its drawn phase.
    Phase(ManeuverId, PhaseId),
}

impl Presentation {
    pub fn maneuver(&self) -> ManeuverId {
        match *self {
            Self::Maneuver(id) | Self::PhaseChoice(id) | Self::Phase(id, _) => id,
        }
    }

    pub fn phase(&self) -> Option<PhaseId> {
        match *self {
            Self::Phase(_, phase) => Some(phase),
            Self::Maneuver(_) | Self::PhaseChoice(_) => None,
        }
    }

    /// What the primary response does here.
    pub fn advance(&self) -> Advance {
        match self {
            Self::PhaseChoice(_) => Advance::Next,
            Self::Maneuver(_) | Self::Phase(..) => Advance::Complete,
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The pilot answered `q`.
    Quit,
    /// Ctrl+C or the input stream closed.
    Interrupted,
    /// Permanent skips emptied the active pool.
    Depleted,
    /// A fixed-length session got through every maneuver.
    AllPracticed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Waiting,
    Presenting(Presentation),
    ConfirmingSkip(ManeuverId),
    Terminated(Termination),
}

/// The primary response of a presenting prompt.
///
/// - `Complete` (`c`): offered once there is something to complete
/// - `Next` (`n`): offered while a multi-phase maneuver still needs its phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Complete,
    Next,
}

impl Advance {
    pub fn key(&self) -> char {
        match self {
            Self::Complete => 'c',
            Self::Next => 'n',
        }
    }
}

/// A valid answer to a presenting prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// `c` or `n`, depending on the prompt's [`Advance`].
    Advance,
    FollowUp,
    Skip,
    PermanentSkip,
    Quit,
}

const COMPLETE_OPTIONS: &[(char, &str)] = &[
    ('c', "Completed"),
    ('f', "Mark for follow-up"),
    ('s', "Skip (no recording)"),
    ('p', "Permanently skip (remove from session)"),
    ('q', "Quit"),
];

const NEXT_OPTIONS: &[(char, &str)] = &[
    ('n', "Next"),
    ('f', "Mark for follow-up"),
    ('s', "Skip (no recording)"),
    ('p', "Permanently skip (remove from session)"),
    ('q', "Quit"),
];

impl Response {
    /// Keys and labels offered for a prompt.
    pub fn options(advance: Advance) -> &'static [(char, &'static str)] {
        match advance {
            Advance::Complete => COMPLETE_OPTIONS,
            Advance::Next => NEXT_OPTIONS,
        }
    }

    /// Parse a response token against the alphabet of a prompt.
    ///
    /// `c` is rejected while a phase is pending and `n` once there is none to draw.
    pub fn parse(token: &str, advance: Advance) -> Result<Self, InputError> {
        let normalized = token.trim().to_lowercase();
        let key = single_key(&normalized);
        match key {
            Some(k) if k == advance.key() => Ok(Self::Advance),
            Some('f') => Ok(Self::FollowUp),
            Some('s') => Ok(Self::Skip),
            Some('p') => Ok(Self::PermanentSkip),
            Some('q') => Ok(Self::Quit),
            _ => Err(InputError::new(
                token.trim(),
                &Self::options(advance)
                    .iter()
                    .map(|(key, _)| *key)
                    .collect::<Vec<_>>(),
            )),
        }
    }
}

/// Parse the answer to the permanent-skip confirmation.
pub fn parse_confirmation(token: &str) -> Result<bool, InputError> {
    match token.trim().to_lowercase().as_str() {
        "y" | "yes" => Ok(true),
        "n" | "no" => Ok(false),
        _ => Err(InputError::new(token.trim(), &['y', 'n'])),
    }
}

fn single_key(token: &str) -> Option<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
