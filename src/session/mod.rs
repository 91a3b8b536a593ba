//! Session state machine: the wait, present, respond, record loop.
//!
//! A [`Session`] exclusively owns the active pool and the random source for
//! one run. Each turn starts in [`TurnState::Waiting`] with a fresh cursor;
//! nothing about a previous turn's phase draw carries over.

mod state;

pub use state::*;

use rand::Rng;

use crate::catalog::Catalog;
use crate::config::DisplayFlags;
use crate::console::{ask, Console, Event, Flow, ManeuverView, Pause, PhaseView};
use crate::error::{EmptyPoolCause, Error, Result};
use crate::interval::IntervalGenerator;
use crate::models::{HistoryRecord, ManeuverId, Outcome, PhaseId, SessionMode};
use crate::pool::{ActivePool, DrawPolicy};

/// Destination for history records.
///
/// Called exactly once per completed or follow-up turn, never for skips.
pub trait HistorySink {
    fn append(&mut self, record: &HistoryRecord) -> Result<()>;
}

impl HistorySink for Vec<HistoryRecord> {
    fn append(&mut self, record: &HistoryRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

impl<S: HistorySink + ?Sized> HistorySink for &mut S {
    fn append(&mut self, record: &HistoryRecord) -> Result<()> {
        (**self).append(record)
    }
}

/// How the `Waiting` state ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Random interval, then the next maneuver appears on its own.
    Timed(IntervalGenerator),
    /// The next maneuver appears when the pilot presses Enter.
    Manual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub termination: Termination,
    /// Every finished turn, skipped ones included, in order.
    pub turns: Vec<HistoryRecord>,
    /// Names of permanently skipped maneuvers.
    pub removed: Vec<String>,
}

impl SessionReport {
    pub fn follow_ups(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.turns
            .iter()
            .filter(|t| t.outcome == Outcome::FollowUp)
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.turns.iter().filter(|t| t.outcome == outcome).count()
    }
}

pub struct Session<'a, R> {
    catalog: &'a Catalog,
    pool: ActivePool,
    policy: DrawPolicy,
    pacing: Pacing,
    display: DisplayFlags,
    rng: R,
    turns: Vec<HistoryRecord>,
}

impl<'a, R: Rng> Session<'a, R> {
    /// `pool` comes from the selection filter. All draws (maneuver, phase,
    /// interval) go through `rng`.
    pub fn new(
        catalog: &'a Catalog,
        pool: Vec<ManeuverId>,
        policy: DrawPolicy,
        pacing: Pacing,
        display: DisplayFlags,
        rng: R,
    ) -> Result<Self> {
        if pool.is_empty() {
            return Err(Error::EmptyPool(EmptyPoolCause::InitialFilter));
        }
        if let Some(id) = pool.iter().find(|id| catalog.get(**id).is_none()) {
            return Err(Error::Validation(format!(
                "maneuver id {} is not in the catalog of {} maneuvers",
                id.0,
                catalog.len()
            )));
        }
        Ok(Self {
            catalog,
            pool: ActivePool::new(pool),
            policy,
            pacing,
            display,
            rng,
            turns: Vec::new(),
        })
    }

    pub fn pool(&self) -> &ActivePool {
        &self.pool
    }

    pub fn turns(&self) -> &[HistoryRecord] {
        &self.turns
    }

    /// Maneuvers a fixed-length session still has to get through.
    pub fn remaining(&self) -> usize {
        self.pool.remaining(self.catalog, &self.policy)
    }

    /// The presenting state a maneuver starts in.
    pub fn present(&self, id: ManeuverId) -> Presentation {
        if self.catalog[id].is_multi_phase() {
            Presentation::PhaseChoice(id)
        } else {
            Presentation::Maneuver(id)
        }
    }

    /// `Waiting → Presenting`: draw the next maneuver once the wait is over.
    ///
    /// The pool is not consumed; the same maneuver may come up again.
    pub fn draw(&mut self) -> Result<TurnState> {
        let next = match self.pool.draw(self.catalog, &self.policy, &mut self.rng)? {
            Some(id) => {
                tracing::debug!("Drew {}", self.catalog[id].name);
                TurnState::Presenting(self.present(id))
            }
            None => TurnState::Terminated(Termination::AllPracticed),
        };
        Ok(next)
    }

    /// Apply a response to a presenting state.
    ///
    /// Fails with [`Error::Validation`] for a presentation [`Session::present`]
    /// could not have produced: a maneuver outside the active pool, a phase
    /// choice on a single-phase maneuver, or a phase the maneuver lacks.
    pub fn respond<S: HistorySink + ?Sized>(
        &mut self,
        presentation: Presentation,
        response: Response,
        sink: &mut S,
    ) -> Result<TurnState> {
        self.check(presentation)?;
        let next = match (presentation, response) {
            (_, Response::Quit) => TurnState::Terminated(Termination::Quit),
            (Presentation::PhaseChoice(id), Response::Advance) => {
                let phase = self.draw_phase(id)?;
                TurnState::Presenting(Presentation::Phase(id, phase))
            }
            (Presentation::Maneuver(id), Response::Advance) => {
                self.finish(id, None, Outcome::Completed, sink)?
            }
            (Presentation::Phase(id, phase), Response::Advance) => {
                self.finish(id, Some(phase), Outcome::Completed, sink)?
            }
            (p, Response::FollowUp) => {
                self.finish(p.maneuver(), p.phase(), Outcome::FollowUp, sink)?
            }
            (p, Response::Skip) => self.finish(p.maneuver(), p.phase(), Outcome::Skipped, sink)?,
            (p, Response::PermanentSkip) => TurnState::ConfirmingSkip(p.maneuver()),
        };
        Ok(next)
    }

    /// Resolve the permanent-skip confirmation.
    ///
    /// Declining re-presents the maneuver from scratch, dropping any drawn phase.
    pub fn confirm_skip(&mut self, id: ManeuverId, confirmed: bool) -> TurnState {
        if !confirmed {
            return TurnState::Presenting(self.present(id));
        }
        if self.pool.remove(id) {
            tracing::info!(
                "Permanently skipped {} ({} left)",
                self.catalog[id].name,
                self.pool.len()
            );
        }
        TurnState::Waiting
    }

    /// Drive turns until the session terminates.
    pub fn run<C, S>(&mut self, console: &mut C, sink: &mut S) -> Result<SessionReport>
    where
        C: Console + ?Sized,
        S: HistorySink + ?Sized,
    {
        tracing::info!("Session started with {} maneuvers", self.pool.len());
        let mut state = TurnState::Waiting;

        loop {
            state = match state {
                TurnState::Waiting => self.wait(console)?,
                TurnState::Presenting(presentation) => {
                    self.present_and_respond(presentation, console, sink)?
                }
                TurnState::ConfirmingSkip(id) => self.ask_confirmation(id, console)?,
                TurnState::Terminated(termination) => {
                    tracing::info!("Session ended: {:?}", termination);
                    console.emit(&Event::Ended(termination));
                    return Ok(self.report(termination));
                }
            };
        }
    }

    pub fn report(&self, termination: Termination) -> SessionReport {
        SessionReport {
            termination,
            turns: self.turns.clone(),
            removed: self
                .pool
                .skipped()
                .map(|id| self.catalog[id].name.clone())
                .collect(),
        }
    }

    fn wait<C: Console + ?Sized>(&mut self, console: &mut C) -> Result<TurnState> {
        if self.pool.is_empty() {
            return Ok(TurnState::Terminated(Termination::Depleted));
        }
        if self.pool.remaining(self.catalog, &self.policy) == 0 {
            return Ok(TurnState::Terminated(Termination::AllPracticed));
        }

        let pause = match self.pacing {
            Pacing::Timed(interval) => Pause::Timed {
                duration: interval.next(&mut self.rng),
                show_countdown: self.display.show_countdown,
            },
            Pacing::Manual => Pause::Manual,
        };
        if console.pause(pause)? == Flow::Interrupted {
            return Ok(TurnState::Terminated(Termination::Interrupted));
        }

        match self.draw() {
            Err(Error::EmptyPool(EmptyPoolCause::Depleted)) => {
                Ok(TurnState::Terminated(Termination::Depleted))
            }
            other => other,
        }
    }

    fn present_and_respond<C, S>(
        &mut self,
        presentation: Presentation,
        console: &mut C,
        sink: &mut S,
    ) -> Result<TurnState>
    where
        C: Console + ?Sized,
        S: HistorySink + ?Sized,
    {
        console.emit(&Event::Maneuver(self.view(presentation)));
        let advance = presentation.advance();
        console.emit(&Event::Options(advance));

        let Some(response) = ask(console, "Your response: ", |token| {
            Response::parse(token, advance)
        })?
        else {
            return Ok(TurnState::Terminated(Termination::Interrupted));
        };

        let next = self.respond(presentation, response, sink)?;
        match (response, next) {
            (Response::Advance, TurnState::Presenting(_)) => console.emit(&Event::PhaseDrawn),
            (_, TurnState::Waiting) => {
                if let Some(turn) = self.turns.last() {
                    console.emit(&Event::Outcome(turn.outcome));
                }
                if self.policy.mode == SessionMode::Fixed {
                    let remaining = self.pool.remaining(self.catalog, &self.policy);
                    if remaining > 0 {
                        console.emit(&Event::Remaining(remaining));
                    }
                }
            }
            _ => {}
        }
        Ok(next)
    }

    fn ask_confirmation<C: Console + ?Sized>(
        &mut self,
        id: ManeuverId,
        console: &mut C,
    ) -> Result<TurnState> {
        let catalog = self.catalog;
        let name = catalog[id].name.as_str();
        console.emit(&Event::ConfirmSkip { name });

        let Some(confirmed) = ask(console, "Confirm (y/n): ", parse_confirmation)? else {
            return Ok(TurnState::Terminated(Termination::Interrupted));
        };

        let next = self.confirm_skip(id, confirmed);
        if confirmed {
            console.emit(&Event::Removed {
                name,
                remaining: self.pool.len(),
            });
        } else {
            console.emit(&Event::SkipCancelled);
        }
        Ok(next)
    }

    fn check(&self, presentation: Presentation) -> Result<()> {
        let id = presentation.maneuver();
        if !self.pool.contains(id) {
            return Err(Error::Validation(format!(
                "maneuver id {} is not in the active pool",
                id.0
            )));
        }
        let maneuver = &self.catalog[id];
        let consistent = match presentation {
            Presentation::Maneuver(_) => !maneuver.is_multi_phase(),
            Presentation::PhaseChoice(_) => maneuver.is_multi_phase(),
            Presentation::Phase(_, phase) => maneuver.phase(phase).is_some(),
        };
        if !consistent {
            return Err(Error::Validation(format!(
                "{:?} does not match the phases of '{}'",
                presentation, maneuver.name
            )));
        }
        Ok(())
    }

    fn draw_phase(&mut self, id: ManeuverId) -> Result<PhaseId> {
        let maneuver = &self.catalog[id];
        if maneuver.phases.is_empty() {
            return Err(Error::Validation(format!(
                "'{}' has no phases to draw from",
                maneuver.name
            )));
        }
        let phase = PhaseId(self.rng.gen_range(0..maneuver.phases.len()));
        tracing::debug!(
            "Drew phase {} of {}",
            maneuver.phases[phase.0].name,
            maneuver.name
        );
        Ok(phase)
    }

    /// Close the turn: record it if the outcome calls for it, then go back to waiting.
    fn finish<S: HistorySink + ?Sized>(
        &mut self,
        id: ManeuverId,
        phase: Option<PhaseId>,
        outcome: Outcome,
        sink: &mut S,
    ) -> Result<TurnState> {
        let catalog = self.catalog;
        let maneuver = &catalog[id];
        let record = HistoryRecord::new(maneuver, phase.and_then(|p| maneuver.phase(p)), outcome);
        if outcome.is_recorded() {
            sink.append(&record)?;
        }
        self.turns.push(record);
        self.pool.mark_visited(id);
        Ok(TurnState::Waiting)
    }

    fn view(&self, presentation: Presentation) -> ManeuverView<'a> {
        let catalog: &'a Catalog = self.catalog;
        let maneuver = &catalog[presentation.maneuver()];
        let show_description = self.display.show_description;
        ManeuverView {
            name: &maneuver.name,
            maneuver_type: self.display.show_type.then(|| maneuver.type_label()),
            description: maneuver
                .description
                .as_deref()
                .filter(|_| show_description),
            phase: presentation
                .phase()
                .and_then(|p| maneuver.phase(p))
                .map(|phase| PhaseView {
                    name: &phase.name,
                    description: phase.description.as_deref().filter(|_| show_description),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const CATALOG: &str = r#"[
        {"name": "Power-Off Stall", "type": "maneuver", "kind": "private"},
        {"name": "Engine Fire", "type": "emergency", "phases": [
            {"name": "Before Takeoff"},
            {"name": "In Flight"}
        ]}
    ]"#;

    fn catalog() -> Catalog {
        Catalog::from_json(CATALOG).unwrap()
    }

    fn session(
        catalog: &Catalog,
        pool: Vec<ManeuverId>,
        policy: DrawPolicy,
    ) -> Session<'_, StdRng> {
        Session::new(
            catalog,
            pool,
            policy,
            Pacing::Manual,
            DisplayFlags::default(),
            StdRng::seed_from_u64(7),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_pool_is_rejected() {
        let catalog = catalog();
        let result = Session::new(
            &catalog,
            vec![],
            DrawPolicy::uniform(),
            Pacing::Manual,
            DisplayFlags::default(),
            StdRng::seed_from_u64(1),
        );
        assert!(matches!(
            result,
            Err(Error::EmptyPool(EmptyPoolCause::InitialFilter))
        ));
    }

    #[test]
    fn test_unknown_maneuver_id_is_rejected() {
        let catalog = catalog();
        let result = Session::new(
            &catalog,
            vec![ManeuverId(0), ManeuverId(5)],
            DrawPolicy::uniform(),
            Pacing::Manual,
            DisplayFlags::default(),
            StdRng::seed_from_u64(1),
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_phase_choice_on_single_phase_maneuver_is_rejected() {
        let catalog = catalog();
        let mut session = session(&catalog, vec![ManeuverId(0)], DrawPolicy::uniform());
        let mut sink: Vec<HistoryRecord> = Vec::new();

        let result = session.respond(
            Presentation::PhaseChoice(ManeuverId(0)),
            Response::Advance,
            &mut sink,
        );
        assert!(matches!(result, Err(Error::Validation(_))));

        let result = session.respond(
            Presentation::Maneuver(ManeuverId(1)),
            Response::Advance,
            &mut sink,
        );
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_inconsistent_presentations_are_rejected() {
        let catalog = catalog();
        let mut session = session(
            &catalog,
            vec![ManeuverId(0), ManeuverId(1)],
            DrawPolicy::uniform(),
        );
        let mut sink: Vec<HistoryRecord> = Vec::new();

        for presentation in [
            Presentation::Maneuver(ManeuverId(1)),
            Presentation::Phase(ManeuverId(1), PhaseId(7)),
            Presentation::Phase(ManeuverId(0), PhaseId(0)),
        ] {
            let result = session.respond(presentation, Response::Skip, &mut sink);
            assert!(matches!(result, Err(Error::Validation(_))), "{:?}", presentation);
        }
        assert!(session.turns().is_empty());
    }

    #[test]
    fn test_complete_records_once() {
        let catalog = catalog();
        let mut session = session(&catalog, vec![ManeuverId(0)], DrawPolicy::uniform());
        let mut sink: Vec<HistoryRecord> = Vec::new();

        let next = session
            .respond(Presentation::Maneuver(ManeuverId(0)), Response::Advance, &mut sink)
            .unwrap();

        assert_eq!(next, TurnState::Waiting);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].maneuver, "Power-Off Stall");
        assert_eq!(sink[0].outcome, Outcome::Completed);
        assert_eq!(sink[0].phase, None);
    }

    #[test]
    fn test_phase_choice_draws_a_phase_without_recording() {
        let catalog = catalog();
        let mut session = session(&catalog, vec![ManeuverId(1)], DrawPolicy::uniform());
        let mut sink: Vec<HistoryRecord> = Vec::new();

        let next = session
            .respond(Presentation::PhaseChoice(ManeuverId(1)), Response::Advance, &mut sink)
            .unwrap();

        match next {
            TurnState::Presenting(Presentation::Phase(id, phase)) => {
                assert_eq!(id, ManeuverId(1));
                assert!(phase.0 < 2);
            }
            other => panic!("expected a drawn phase, got {:?}", other),
        }
        assert!(sink.is_empty());
        assert!(session.turns().is_empty());
    }

    #[test]
    fn test_skip_and_quit_never_reach_the_sink() {
        let catalog = catalog();
        let mut session = session(&catalog, vec![ManeuverId(0)], DrawPolicy::uniform());
        let mut sink: Vec<HistoryRecord> = Vec::new();
        let shown = Presentation::Maneuver(ManeuverId(0));

        assert_eq!(
            session.respond(shown, Response::Skip, &mut sink).unwrap(),
            TurnState::Waiting
        );
        assert_eq!(
            session.respond(shown, Response::Quit, &mut sink).unwrap(),
            TurnState::Terminated(Termination::Quit)
        );
        assert!(sink.is_empty());
        assert_eq!(session.turns().len(), 1);
        assert_eq!(session.turns()[0].outcome, Outcome::Skipped);
    }

    #[test]
    fn test_declined_skip_restarts_the_maneuver() {
        let catalog = catalog();
        let mut session = session(
            &catalog,
            vec![ManeuverId(0), ManeuverId(1)],
            DrawPolicy::uniform(),
        );
        let mut sink: Vec<HistoryRecord> = Vec::new();

        let next = session
            .respond(
                Presentation::Phase(ManeuverId(1), PhaseId(0)),
                Response::PermanentSkip,
                &mut sink,
            )
            .unwrap();
        assert_eq!(next, TurnState::ConfirmingSkip(ManeuverId(1)));

        assert_eq!(
            session.confirm_skip(ManeuverId(1), false),
            TurnState::Presenting(Presentation::PhaseChoice(ManeuverId(1)))
        );
        assert_eq!(session.pool().len(), 2);

        assert_eq!(session.confirm_skip(ManeuverId(1), true), TurnState::Waiting);
        assert!(!session.pool().contains(ManeuverId(1)));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_run_until_quit() {
        let catalog = catalog();
        let mut session = session(&catalog, vec![ManeuverId(0)], DrawPolicy::uniform());
        let mut console = ScriptedConsole::new(["c", "f", "q"]);
        let mut sink: Vec<HistoryRecord> = Vec::new();

        let report = session.run(&mut console, &mut sink).unwrap();

        assert_eq!(report.termination, Termination::Quit);
        assert_eq!(report.count(Outcome::Completed), 1);
        assert_eq!(report.follow_ups().count(), 1);
        assert_eq!(sink.len(), 2);
        assert_eq!(console.pauses, vec![Pause::Manual; 3]);
        assert!(console.transcript().contains("Ending practice session."));
    }

    #[test]
    fn test_run_ends_when_pool_depletes() {
        let catalog = catalog();
        let mut session = session(&catalog, vec![ManeuverId(0)], DrawPolicy::uniform());
        let mut console = ScriptedConsole::new(["p", "y"]);
        let mut sink: Vec<HistoryRecord> = Vec::new();

        let report = session.run(&mut console, &mut sink).unwrap();

        assert_eq!(report.termination, Termination::Depleted);
        assert_eq!(report.removed, vec!["Power-Off Stall".to_string()]);
        assert!(console.transcript().contains("No maneuvers remaining"));
    }

    #[test]
    fn test_interrupted_pause_terminates() {
        let catalog = catalog();
        let mut session = session(&catalog, vec![ManeuverId(0)], DrawPolicy::uniform());
        let mut console = ScriptedConsole::new(["c"]);
        console.interrupt_at_pause = Some(1);
        let mut sink: Vec<HistoryRecord> = Vec::new();

        let report = session.run(&mut console, &mut sink).unwrap();

        assert_eq!(report.termination, Termination::Interrupted);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_fixed_session_visits_each_once() {
        let catalog = catalog();
        let selection = crate::models::Selection {
            level: crate::models::CertLevel::All,
            include_emergencies: true,
            mode: SessionMode::Fixed,
            emergency_mode: Some(crate::models::EmergencyMode::All),
        };
        let mut session = session(
            &catalog,
            vec![ManeuverId(0), ManeuverId(1)],
            DrawPolicy::new(&selection, None),
        );
        // A skip still counts as the maneuver's turn.
        let mut console = ScriptedConsole::new(["s", "s"]);
        let mut sink: Vec<HistoryRecord> = Vec::new();

        let report = session.run(&mut console, &mut sink).unwrap();

        assert_eq!(report.termination, Termination::AllPracticed);
        assert_eq!(report.count(Outcome::Skipped), 2);
        let mut shown = console.shown.clone();
        shown.sort();
        assert_eq!(shown, vec!["Engine Fire", "Power-Off Stall"]);
        assert!(console.transcript().contains("(1 maneuver(s) remaining)"));
    }

    #[test]
    fn test_hidden_display_fields() {
        let catalog = catalog();
        let mut session = Session::new(
            &catalog,
            vec![ManeuverId(0)],
            DrawPolicy::uniform(),
            Pacing::Manual,
            DisplayFlags {
                show_countdown: false,
                show_type: false,
                show_description: false,
            },
            StdRng::seed_from_u64(3),
        )
        .unwrap();
        let mut console = ScriptedConsole::new(["q"]);
        let mut sink: Vec<HistoryRecord> = Vec::new();
        session.run(&mut console, &mut sink).unwrap();
        assert!(!console.transcript().contains("Type:"));
    }
}
