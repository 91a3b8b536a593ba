//! Domain models for chair flying drills.
//!
//! # Core Concepts
//!
//! ## Catalog Entities
//!
//! - [`Maneuver`]: One rehearsable procedure or emergency scenario. A maneuver
//!   with a non-empty list of [`Phase`]s is multi-phase: one phase is drawn at
//!   random each time the maneuver comes up.
//! - [`ManeuverId`] / [`PhaseId`]: Stable positions inside the immutable catalog.
//!
//! ## Session Entities
//!
//! - [`Selection`]: What the user chose in the startup dialog.
//! - [`HistoryRecord`]: Append-only log entry written for every completed or
//!   follow-up turn.

mod history;
mod maneuver;
mod selection;

pub use history::*;
pub use maneuver::*;
pub use selection::*;
