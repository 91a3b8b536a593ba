//! Presentation sink and input source for drill sessions.
//!
//! The session core never touches stdin or stdout. It emits [`Event`]s,
//! asks for one token per prompt, and asks the console to pause between turns.
//! [`TerminalConsole`] is the interactive implementation; [`ScriptedConsole`]
//! replays canned input for tests.

mod dialog;
mod render;
mod scripted;
mod summary;
mod terminal;

use std::io;
use std::time::Duration;

pub use dialog::*;
pub use render::render;
pub use scripted::ScriptedConsole;
pub use summary::*;
pub use terminal::TerminalConsole;

use crate::error::InputError;
use crate::models::Outcome;
use crate::session::{Advance, Termination};

/// A maneuver as it should be shown, with hidden fields already removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManeuverView<'a> {
    pub name: &'a str,
    /// Upper-cased on screen. `None` when types are hidden.
    pub maneuver_type: Option<&'a str>,
    pub description: Option<&'a str>,
    pub phase: Option<PhaseView<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseView<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event<'a> {
    Maneuver(ManeuverView<'a>),
    /// Response options of a presenting prompt.
    Options(Advance),
    /// Startup question with its choices.
    Menu {
        title: &'a str,
        options: &'a [(char, &'a str)],
    },
    InvalidInput(&'a InputError),
    PhaseDrawn,
    Outcome(Outcome),
    ConfirmSkip { name: &'a str },
    SkipCancelled,
    Removed { name: &'a str, remaining: usize },
    /// Maneuvers a fixed-length session still has to visit.
    Remaining(usize),
    Ended(Termination),
    /// Free-form text block (summaries, banners).
    Text(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    Timed {
        duration: Duration,
        show_countdown: bool,
    },
    /// Wait until the pilot says they are ready.
    Manual,
}

/// Whether a pause ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Interrupted,
}

pub trait Console {
    fn emit(&mut self, event: &Event<'_>);

    /// Read one response token. `None` means the input is gone (EOF or interrupt).
    fn read_token(&mut self, prompt: &str) -> io::Result<Option<String>>;

    fn pause(&mut self, pause: Pause) -> io::Result<Flow>;
}

/// Prompt until `parse` accepts a token, reporting every rejected one.
///
/// There is no retry limit; the prompt only gives up when input ends.
pub fn ask<C, T, F>(console: &mut C, prompt: &str, parse: F) -> io::Result<Option<T>>
where
    C: Console + ?Sized,
    F: Fn(&str) -> Result<T, InputError>,
{
    loop {
        let Some(token) = console.read_token(prompt)? else {
            return Ok(None);
        };
        match parse(&token) {
            Ok(value) => return Ok(Some(value)),
            Err(err) => {
                tracing::debug!("Rejected input {:?}", err.token);
                console.emit(&Event::InvalidInput(&err));
            }
        }
    }
}
