use std::collections::VecDeque;
use std::io;

use super::{render, Console, Event, Flow, Pause};
use crate::session::Advance;

/// Console that replays canned tokens and records what the session showed.
///
/// Running out of tokens behaves like a closed terminal.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    /// Rendered text of every emitted event, in order.
    pub output: Vec<String>,
    /// Headline of every maneuver shown: "Name" or "Name / Phase".
    pub shown: Vec<String>,
    /// Primary option offered at each presenting prompt.
    pub offers: Vec<Advance>,
    pub pauses: Vec<Pause>,
    /// Report `Flow::Interrupted` from the pause with this index.
    pub interrupt_at_pause: Option<usize>,
}

impl ScriptedConsole {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn remaining_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn transcript(&self) -> String {
        self.output.concat()
    }
}

impl Console for ScriptedConsole {
    fn emit(&mut self, event: &Event<'_>) {
        match event {
            Event::Maneuver(view) => self.shown.push(match &view.phase {
                Some(phase) => format!("{} / {}", view.name, phase.name),
                None => view.name.to_string(),
            }),
            Event::Options(advance) => self.offers.push(*advance),
            _ => {}
        }
        self.output.push(render(event));
    }

    fn read_token(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        Ok(self.inputs.pop_front())
    }

    fn pause(&mut self, pause: Pause) -> io::Result<Flow> {
        let index = self.pauses.len();
        self.pauses.push(pause);
        if self.interrupt_at_pause == Some(index) {
            return Ok(Flow::Interrupted);
        }
        Ok(Flow::Continue)
    }
}
