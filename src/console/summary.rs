//! Configuration and end-of-session summaries.

use chrono::{DateTime, Utc};

use crate::catalog::CategoryCounts;
use crate::config::DisplayFlags;
use crate::db::HistoryStore;
use crate::models::{CertLevel, EmergencyMode, HistoryRecord, Outcome, Selection, SessionMode};
use crate::session::Pacing;

const RULE_WIDTH: usize = 60;

/// Everything shown in the pre-session configuration summary.
#[derive(Debug, Clone)]
pub struct ConfigSummary<'a> {
    pub catalog: CategoryCounts,
    pub pool_size: usize,
    pub selection: &'a Selection,
    pub pacing: &'a Pacing,
    pub emergency_probability: Option<f64>,
    pub display: DisplayFlags,
}

/// Outcome of one session, for the closing report.
#[derive(Debug, Clone)]
pub struct SessionSummary<'a> {
    /// Turns of this session, including skipped ones.
    pub turns: &'a [HistoryRecord],
    /// Names removed by permanent skip.
    pub removed: &'a [String],
    /// Records in the history store, all sessions included.
    pub total_history: usize,
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

pub fn render_config_summary(summary: &ConfigSummary<'_>) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let selection = summary.selection;
    let mut out = format!("\nConfiguration Summary:\n{}\n", rule);

    out.push_str(&format!("Maneuvers loaded: {}\n", summary.catalog.total));
    out.push_str(&format!(
        "  - Emergency maneuvers: {}\n",
        summary.catalog.emergency
    ));
    out.push_str(&format!(
        "  - Private pilot maneuvers: {}\n",
        summary.catalog.private
    ));
    out.push_str(&format!(
        "  - Commercial pilot maneuvers: {}\n",
        summary.catalog.commercial
    ));
    out.push_str(&format!("Selected for this session: {}\n", summary.pool_size));

    out.push_str(&format!("Selected kind: {}\n", selection.level.label()));
    if selection.level != CertLevel::EmergenciesOnly {
        let included = if selection.include_emergencies {
            "Included"
        } else {
            "Excluded"
        };
        out.push_str(&format!("Emergency scenarios: {}\n", included));
    }

    match selection.mode {
        SessionMode::Indefinite => out.push_str("Session mode: Indefinite (random)\n"),
        SessionMode::Fixed => {
            out.push_str("Session mode: Fixed-length (each once)\n");
            if let Some(mode) = selection.emergency_mode {
                let behavior = match mode {
                    EmergencyMode::All => "All will appear",
                    EmergencyMode::Random => "Random (probability-based)",
                };
                out.push_str(&format!("  Emergency behavior: {}\n", behavior));
            }
        }
    }

    match summary.pacing {
        Pacing::Manual => out.push_str("Timing mode: Manual (user-prompted)\n"),
        Pacing::Timed(interval) => {
            out.push_str("Timing mode: Automatic\n");
            out.push_str(&format!(
                "Interval range: {}-{} seconds\n",
                interval.min_secs(),
                interval.max_secs()
            ));
        }
    }

    if let Some(probability) = summary.emergency_probability {
        out.push_str(&format!("Emergency probability: {}%\n", probability));
    }

    out.push_str("Display options:\n");
    out.push_str(&format!(
        "  - Show countdown timer: {}\n",
        yes_no(summary.display.show_countdown)
    ));
    out.push_str(&format!(
        "  - Show maneuver type: {}\n",
        yes_no(summary.display.show_type)
    ));
    out.push_str(&format!(
        "  - Show descriptions: {}\n",
        yes_no(summary.display.show_description)
    ));
    out.push_str(&rule);
    out.push('\n');
    out
}

pub fn render_session_summary(summary: &SessionSummary<'_>) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = format!("\n{}\nSESSION SUMMARY\n{}\n", rule, rule);

    let count = |outcome: Outcome| summary.turns.iter().filter(|t| t.outcome == outcome).count();
    out.push_str(&format!(
        "\nTurns this session: {} (completed {}, follow-up {}, skipped {})\n",
        summary.turns.len(),
        count(Outcome::Completed),
        count(Outcome::FollowUp),
        count(Outcome::Skipped)
    ));

    let follow_ups: Vec<&HistoryRecord> = summary
        .turns
        .iter()
        .filter(|t| t.outcome == Outcome::FollowUp)
        .collect();
    if follow_ups.is_empty() {
        out.push_str("\nNo maneuvers marked for follow-up.\n");
    } else {
        out.push_str(&format!(
            "\nManeuvers marked for follow-up ({}):\n",
            follow_ups.len()
        ));
        for record in follow_ups {
            out.push_str(&format!(
                "  - {} ({})\n",
                record.display_name(),
                record.maneuver_type
            ));
        }
    }

    if !summary.removed.is_empty() {
        out.push_str(&format!(
            "\nPermanently skipped: {}\n",
            summary.removed.join(", ")
        ));
    }

    out.push_str(&format!(
        "\nTotal history entries: {}\n",
        summary.total_history
    ));
    out
}

/// Banner printed right before the first turn.
///
/// `once_each` is what a fixed-length session has to get through; any other
/// pool members are random-mode emergencies that may or may not come up.
pub fn render_session_start(mode: SessionMode, once_each: usize, pool_size: usize) -> String {
    let mut out = String::from("\nStarting practice session...\n");
    if mode == SessionMode::Fixed {
        out.push_str(&format!(
            "You will practice {} maneuver(s) once each.\n",
            once_each
        ));
        let floating = pool_size.saturating_sub(once_each);
        if floating > 0 {
            out.push_str(&format!(
                "(with the potential for any of the {} emergency maneuver(s) to appear at random)\n",
                floating
            ));
        }
    }
    out.push_str("Press Ctrl+C to stop at any time.\n");
    out
}

/// Session summary rebuilt from the history store alone.
///
/// Used when an interrupted session cannot report for itself: only recorded
/// turns are known, so skips and permanent skips are missing.
pub fn render_summary_since(
    store: &HistoryStore,
    since: DateTime<Utc>,
) -> anyhow::Result<String> {
    let turns = store.get_since(since)?;
    Ok(render_session_summary(&SessionSummary {
        turns: &turns,
        removed: &[],
        total_history: store.count()?,
    }))
}

/// List of follow-up records for the `follow-ups` command.
pub fn render_follow_ups(records: &[HistoryRecord]) -> String {
    if records.is_empty() {
        return "No maneuvers marked for follow-up.\n".to_string();
    }
    let mut out = format!("Maneuvers marked for follow-up ({}):\n", records.len());
    for record in records {
        out.push_str(&format!(
            "  {}  {} ({})\n",
            record.timestamp.format("%Y-%m-%d %H:%M"),
            record.display_name(),
            record.maneuver_type
        ));
    }
    out
}
