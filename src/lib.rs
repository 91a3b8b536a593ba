//! Randomly timed chair flying drills.
//!
//! A [`catalog::Catalog`] is filtered into a pool for the pilot's selection, and
//! a [`session::Session`] presents maneuvers from it at random intervals,
//! recording each completed or follow-up turn to a [`session::HistorySink`].

pub mod catalog;
pub mod config;
pub mod console;
pub mod db;
pub mod error;
pub mod filter;
pub mod interval;
pub mod models;
pub mod pool;
pub mod session;

pub use error::{Error, Result};
