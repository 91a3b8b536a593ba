//! Plain-text rendering of console events.

use super::{Event, ManeuverView};
use crate::models::Outcome;
use crate::session::{Response, Termination};

const RULE_WIDTH: usize = 60;

/// Render an event as the text the terminal prints for it.
pub fn render(event: &Event<'_>) -> String {
    match event {
        Event::Maneuver(view) => render_maneuver(view),
        Event::Options(advance) => {
            let mut out = String::from("\nOptions:\n");
            for (key, label) in Response::options(*advance) {
                out.push_str(&format!("  [{}] {}\n", key, label));
            }
            out
        }
        Event::Menu { title, options } => {
            let mut out = format!("\n{}\n", title);
            for (key, label) in options.iter() {
                out.push_str(&format!("  [{}] {}\n", key, label));
            }
            out
        }
        Event::InvalidInput(err) => format!("Invalid input. Please choose {}.\n", err.expected),
        Event::PhaseDrawn => "\n→ Proceeding to next phase...\n".to_string(),
        Event::Outcome(outcome) => match outcome {
            Outcome::Completed => "✓ Marked as completed\n".to_string(),
            Outcome::FollowUp => "⚠ Marked for follow-up\n".to_string(),
            Outcome::Skipped => "Skipped (not recorded)\n".to_string(),
        },
        Event::ConfirmSkip { name } => format!(
            "\n⚠️  Are you sure you want to permanently skip '{}' for this session?\n\
             This maneuver will not appear again until you restart the application.\n",
            name
        ),
        Event::SkipCancelled => "Permanent skip cancelled.\n".to_string(),
        Event::Removed { name, remaining } => format!(
            "✗ '{}' has been permanently removed from this session.\n({} maneuver(s) remaining)\n",
            name, remaining
        ),
        Event::Remaining(count) => format!("({} maneuver(s) remaining)\n", count),
        Event::Ended(termination) => match termination {
            Termination::Quit => "\nEnding practice session.\n".to_string(),
            Termination::Interrupted => "\n\nSession interrupted.\n".to_string(),
            Termination::Depleted => {
                "\n⚠️  No maneuvers remaining in the rotation!\nEnding practice session.\n"
                    .to_string()
            }
            Termination::AllPracticed => "\n✓ All maneuvers completed!\n".to_string(),
        },
        Event::Text(text) => {
            let mut out = text.to_string();
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out
        }
    }
}

fn render_maneuver(view: &ManeuverView<'_>) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = format!("\n{}\nMANEUVER: {}\n", rule, view.name);

    if let Some(maneuver_type) = view.maneuver_type {
        out.push_str(&format!("Type: {}\n", maneuver_type.to_uppercase()));
    }
    if let Some(description) = view.description {
        out.push_str(&format!("Description: {}\n", description));
    }
    if let Some(phase) = &view.phase {
        out.push_str(&format!("\nPHASE: {}\n", phase.name));
        if let Some(description) = phase.description {
            out.push_str(&format!("Phase Description: {}\n", description));
        }
    }

    out.push_str(&rule);
    out.push('\n');
    out
}
