use chair_flying::catalog::Catalog;
use chair_flying::config::{DisplayFlags, Settings};
use chair_flying::console::ScriptedConsole;
use chair_flying::error::Error;
use chair_flying::filter::filter;
use chair_flying::models::*;
use chair_flying::pool::DrawPolicy;
use chair_flying::session::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use speculate2::speculate;

fn start(catalog: &Catalog, level: CertLevel, seed: u64) -> Session<'_, StdRng> {
    let pool = filter(catalog, level, true).expect("Filter failed");
    Session::new(
        catalog,
        pool,
        DrawPolicy::uniform(),
        Pacing::Manual,
        DisplayFlags::default(),
        StdRng::seed_from_u64(seed),
    )
    .expect("Failed to start session")
}

fn fixed(emergency_mode: EmergencyMode, probability: Option<f64>) -> DrawPolicy {
    DrawPolicy::new(
        &Selection {
            level: CertLevel::All,
            include_emergencies: true,
            mode: SessionMode::Fixed,
            emergency_mode: Some(emergency_mode),
        },
        probability,
    )
}

speculate! {
    describe "single-phase maneuver" {
        before {
            let catalog = Catalog::from_json(
                r#"[{"name": "Stall", "type": "maneuver", "kind": "private"}]"#,
            ).expect("Failed to load catalog");
            let mut sink: Vec<HistoryRecord> = Vec::new();
        }

        it "records a completed stall and returns to waiting" {
            let mut session = start(&catalog, CertLevel::Private, 1);
            let presented = session.draw().expect("Draw failed");
            assert_eq!(presented, TurnState::Presenting(Presentation::Maneuver(ManeuverId(0))));

            let next = session
                .respond(Presentation::Maneuver(ManeuverId(0)), Response::Advance, &mut sink)
                .expect("Respond failed");

            assert_eq!(next, TurnState::Waiting);
            assert_eq!(sink.len(), 1);
            assert_eq!(sink[0].maneuver, "Stall");
            assert_eq!(sink[0].outcome, Outcome::Completed);
        }

        it "records a follow-up exactly once" {
            let mut session = start(&catalog, CertLevel::Private, 1);
            session
                .respond(Presentation::Maneuver(ManeuverId(0)), Response::FollowUp, &mut sink)
                .expect("Respond failed");
            assert_eq!(sink.len(), 1);
            assert_eq!(sink[0].outcome, Outcome::FollowUp);
        }

        it "never records skips or permanent skips" {
            let mut console = ScriptedConsole::new(["s", "p", "n", "s", "p", "y"]);
            let mut session = start(&catalog, CertLevel::Private, 1);

            let report = session.run(&mut console, &mut sink).expect("Session failed");

            assert!(sink.is_empty());
            assert_eq!(report.count(Outcome::Skipped), 2);
            assert_eq!(report.termination, Termination::Depleted);
        }

        it "re-prompts on invalid input without recording" {
            let mut console = ScriptedConsole::new(["x", "n", "c", "q"]);
            let mut session = start(&catalog, CertLevel::Private, 1);

            session.run(&mut console, &mut sink).expect("Session failed");

            assert_eq!(sink.len(), 1);
            let transcript = console.transcript();
            assert!(transcript.contains("Invalid input. Please choose c, f, s, p, q."));
            assert_eq!(console.offers, vec![Advance::Complete, Advance::Complete]);
        }

        it "ends as interrupted when input closes" {
            let mut console = ScriptedConsole::new(Vec::<String>::new());
            let mut session = start(&catalog, CertLevel::Private, 1);
            let report = session.run(&mut console, &mut sink).expect("Session failed");
            assert_eq!(report.termination, Termination::Interrupted);
            assert!(console.transcript().contains("Session interrupted."));
        }
    }

    describe "multi-phase maneuver" {
        before {
            let catalog = Catalog::from_json(
                r#"[{"name": "Engine Fire", "type": "emergency",
                     "phases": [{"name": "Starts"}, {"name": "Fails"}]}]"#,
            ).expect("Failed to load catalog");
            let mut sink: Vec<HistoryRecord> = Vec::new();
        }

        it "offers next before a phase and complete after" {
            let mut console = ScriptedConsole::new(["c", "n", "n", "c", "q"]);
            let mut session = start(&catalog, CertLevel::All, 9);

            session.run(&mut console, &mut sink).expect("Session failed");

            assert_eq!(console.offers[0], Advance::Next);
            assert_eq!(console.offers[1], Advance::Complete);
            assert_eq!(console.offers[2], Advance::Next);
            assert_eq!(sink.len(), 1);
            assert_eq!(sink[0].maneuver, "Engine Fire");
            let phase = sink[0].phase.as_deref().expect("Phase not recorded");
            assert!(phase == "Starts" || phase == "Fails");
            assert_eq!(console.shown[1], format!("Engine Fire / {}", phase));
        }

        it "draws each phase about half the time" {
            let mut session = start(&catalog, CertLevel::All, 42);
            let mut starts = 0;
            for _ in 0..2000 {
                match session
                    .respond(Presentation::PhaseChoice(ManeuverId(0)), Response::Advance, &mut sink)
                    .expect("Respond failed")
                {
                    TurnState::Presenting(Presentation::Phase(_, PhaseId(0))) => starts += 1,
                    TurnState::Presenting(Presentation::Phase(_, PhaseId(1))) => {}
                    other => panic!("unexpected state {:?}", other),
                }
            }
            assert!((850..=1150).contains(&starts), "Starts drawn {} times", starts);
            assert!(sink.is_empty());
        }

        it "starts over after a declined permanent skip" {
            let mut console = ScriptedConsole::new(["n", "p", "n", "q"]);
            let mut session = start(&catalog, CertLevel::All, 5);

            let report = session.run(&mut console, &mut sink).expect("Session failed");

            assert_eq!(console.offers, vec![Advance::Next, Advance::Complete, Advance::Next]);
            assert_eq!(console.shown[2], "Engine Fire");
            assert_eq!(session.pool().len(), 1);
            assert!(report.removed.is_empty());
            assert!(console.transcript().contains("Permanent skip cancelled."));
        }
    }

    describe "active pool" {
        before {
            let catalog = Catalog::from_json(
                r#"[
                    {"name": "Steep Turns", "type": "maneuver", "kind": "private"},
                    {"name": "Slow Flight", "type": "maneuver", "kind": "private"},
                    {"name": "Engine Failure", "type": "emergency"}
                ]"#,
            ).expect("Failed to load catalog");
            let mut sink: Vec<HistoryRecord> = Vec::new();
        }

        it "never draws a permanently skipped maneuver again" {
            let mut session = start(&catalog, CertLevel::Private, 11);
            let before = session.pool().len();

            assert_eq!(
                session
                    .respond(
                        Presentation::Maneuver(ManeuverId(1)),
                        Response::PermanentSkip,
                        &mut sink,
                    )
                    .expect("Respond failed"),
                TurnState::ConfirmingSkip(ManeuverId(1))
            );
            session.confirm_skip(ManeuverId(1), true);

            assert_eq!(session.pool().len(), before - 1);
            for _ in 0..500 {
                match session.draw().expect("Draw failed") {
                    TurnState::Presenting(p) => assert_ne!(p.maneuver(), ManeuverId(1)),
                    other => panic!("unexpected state {:?}", other),
                }
            }
            assert!(sink.is_empty());
        }

        it "visits every maneuver once in a fixed session" {
            let pool = filter(&catalog, CertLevel::All, true).expect("Filter failed");
            let mut session = Session::new(
                &catalog,
                pool,
                fixed(EmergencyMode::All, None),
                Pacing::Manual,
                DisplayFlags::default(),
                StdRng::seed_from_u64(3),
            ).expect("Failed to start session");
            let mut console = ScriptedConsole::new(["c", "f", "c", "leftover"]);

            let report = session.run(&mut console, &mut sink).expect("Session failed");

            assert_eq!(report.termination, Termination::AllPracticed);
            let mut shown = console.shown.clone();
            shown.sort();
            assert_eq!(shown, vec!["Engine Failure", "Slow Flight", "Steep Turns"]);
            assert_eq!(sink.len(), 3);
            assert_eq!(console.remaining_inputs(), 1);
            assert!(console.transcript().contains("All maneuvers completed!"));
        }

        it "does not wait on emergencies in random emergency mode" {
            let pool = filter(&catalog, CertLevel::All, true).expect("Filter failed");
            let mut session = Session::new(
                &catalog,
                pool,
                fixed(EmergencyMode::Random, Some(0.0)),
                Pacing::Manual,
                DisplayFlags::default(),
                StdRng::seed_from_u64(8),
            ).expect("Failed to start session");
            let mut console = ScriptedConsole::new(["c", "c", "leftover"]);

            let report = session.run(&mut console, &mut sink).expect("Session failed");

            assert_eq!(report.termination, Termination::AllPracticed);
            assert!(!console.shown.contains(&"Engine Failure".to_string()));
            assert_eq!(report.count(Outcome::Completed), 2);
        }
    }

    describe "startup" {
        it "rejects an inverted interval before any turn" {
            let result = Settings::from_json(
                r#"{"maneuvers_file": "maneuvers.json", "interval_min_sec": 10, "interval_max_sec": 5}"#,
            );
            assert!(matches!(result, Err(Error::Configuration(_))));
        }

        it "uses the timed pacing between turns" {
            let catalog = Catalog::from_json(
                r#"[{"name": "Stall", "type": "maneuver", "kind": "private"}]"#,
            ).expect("Failed to load catalog");
            let settings = Settings::from_json(
                r#"{"maneuvers_file": "m.json", "interval_min_sec": 5, "interval_max_sec": 5, "show_next_maneuver_time": false}"#,
            ).expect("Failed to parse settings");
            let pool = filter(&catalog, CertLevel::All, true).expect("Filter failed");
            let mut session = Session::new(
                &catalog,
                pool,
                DrawPolicy::uniform(),
                Pacing::Timed(settings.interval().expect("Invalid interval")),
                settings.display(),
                StdRng::seed_from_u64(2),
            ).expect("Failed to start session");
            let mut console = ScriptedConsole::new(["q"]);
            let mut sink: Vec<HistoryRecord> = Vec::new();

            session.run(&mut console, &mut sink).expect("Session failed");

            assert_eq!(
                console.pauses,
                vec![chair_flying::console::Pause::Timed {
                    duration: std::time::Duration::from_secs(5),
                    show_countdown: false,
                }]
            );
        }
    }
}
