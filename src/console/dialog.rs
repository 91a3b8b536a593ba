//! Startup dialog: session mode, certification level, emergencies.
//!
//! Every question has a default taken on empty input, and accepts the single
//! key or the full word.

use std::io;

use super::{ask, Console, Event};
use crate::error::InputError;
use crate::models::{CertLevel, EmergencyMode, Selection, SessionMode};

const MODE_OPTIONS: &[(char, &str)] = &[
    ('i', "Indefinite - Practice maneuvers randomly (default)"),
    ('f', "Fixed-length - Practice each maneuver once"),
];

const LEVEL_OPTIONS: &[(char, &str)] = &[
    ('p', "Private pilot maneuvers"),
    ('c', "Commercial pilot maneuvers"),
    ('e', "Emergencies only"),
    ('a', "All maneuvers (default)"),
];

const INCLUDE_OPTIONS: &[(char, &str)] = &[('y', "Yes (default)"), ('n', "No")];

const EMERGENCY_MODE_OPTIONS: &[(char, &str)] = &[
    ('a', "All emergencies - Every emergency will appear (default)"),
    ('r', "Random emergencies - Based on configured probability"),
];

pub fn parse_session_mode(token: &str) -> Result<SessionMode, InputError> {
    match token.trim().to_lowercase().as_str() {
        "" | "i" | "indefinite" => Ok(SessionMode::Indefinite),
        "f" | "fixed" => Ok(SessionMode::Fixed),
        other => Err(InputError::new(other, &['i', 'f'])),
    }
}

pub fn parse_cert_level(token: &str) -> Result<CertLevel, InputError> {
    match token.trim().to_lowercase().as_str() {
        "" | "a" | "all" => Ok(CertLevel::All),
        "p" | "private" => Ok(CertLevel::Private),
        "c" | "commercial" => Ok(CertLevel::Commercial),
        "e" | "emergency" | "emergencies" => Ok(CertLevel::EmergenciesOnly),
        other => Err(InputError::new(other, &['p', 'c', 'e', 'a'])),
    }
}

pub fn parse_include_emergencies(token: &str) -> Result<bool, InputError> {
    match token.trim().to_lowercase().as_str() {
        "" | "y" | "yes" => Ok(true),
        "n" | "no" => Ok(false),
        other => Err(InputError::new(other, &['y', 'n'])),
    }
}

pub fn parse_emergency_mode(token: &str) -> Result<EmergencyMode, InputError> {
    match token.trim().to_lowercase().as_str() {
        "" | "a" | "all" => Ok(EmergencyMode::All),
        "r" | "random" => Ok(EmergencyMode::Random),
        other => Err(InputError::new(other, &['a', 'r'])),
    }
}

/// Ask the startup questions. `None` if input ended before the last answer.
///
/// Emergencies-only implies emergencies are included, so that question is
/// skipped; the emergency-mode question only comes up for fixed-length
/// sessions that include emergencies.
pub fn prompt_selection<C: Console + ?Sized>(console: &mut C) -> io::Result<Option<Selection>> {
    console.emit(&Event::Menu {
        title: "How would you like to structure your session?",
        options: MODE_OPTIONS,
    });
    let Some(mode) = ask(
        console,
        "Your choice (i/f or Enter for indefinite): ",
        parse_session_mode,
    )?
    else {
        return Ok(None);
    };

    console.emit(&Event::Menu {
        title: "Which maneuvers would you like to practice?",
        options: LEVEL_OPTIONS,
    });
    let Some(level) = ask(
        console,
        "Your choice (p/c/e/a or Enter for all): ",
        parse_cert_level,
    )?
    else {
        return Ok(None);
    };

    let include_emergencies = if level == CertLevel::EmergenciesOnly {
        true
    } else {
        console.emit(&Event::Menu {
            title: "Include emergency scenarios?",
            options: INCLUDE_OPTIONS,
        });
        match ask(
            console,
            "Your choice (y/n or Enter for yes): ",
            parse_include_emergencies,
        )? {
            Some(include) => include,
            None => return Ok(None),
        }
    };

    let emergency_mode = if mode == SessionMode::Fixed && include_emergencies {
        console.emit(&Event::Menu {
            title: "How should emergencies appear in the session?",
            options: EMERGENCY_MODE_OPTIONS,
        });
        match ask(
            console,
            "Your choice (a/r or Enter for all): ",
            parse_emergency_mode,
        )? {
            Some(emergency_mode) => Some(emergency_mode),
            None => return Ok(None),
        }
    } else {
        None
    };

    Ok(Some(Selection {
        level,
        include_emergencies,
        mode,
        emergency_mode,
    }))
}
