use std::io::{self, BufRead, Stdin, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::{render, Console, Event, Flow, Pause};

const TICK: Duration = Duration::from_millis(100);
const CLEAR_LINE: &str = "\r                                                  \r";

/// Line-oriented console over a reader and a writer.
///
/// `interrupted` is raised from outside (the Ctrl+C handler). Pauses notice it
/// within one tick; a blocked read notices it as soon as the line arrives.
pub struct TerminalConsole<R, W> {
    input: R,
    output: W,
    interrupted: Arc<AtomicBool>,
}

impl TerminalConsole<io::StdinLock<'static>, Stdout> {
    pub fn stdio(interrupted: Arc<AtomicBool>) -> Self {
        let stdin: Stdin = io::stdin();
        Self::new(stdin.lock(), io::stdout(), interrupted)
    }
}

impl<R: BufRead, W: Write> TerminalConsole<R, W> {
    pub fn new(input: R, output: W, interrupted: Arc<AtomicBool>) -> Self {
        Self {
            input,
            output,
            interrupted,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Sleep one second in short ticks. Returns false if interrupted meanwhile.
    fn sleep_second(&self) -> bool {
        let mut slept = Duration::ZERO;
        while slept < Duration::from_secs(1) {
            if self.is_interrupted() {
                return false;
            }
            thread::sleep(TICK);
            slept += TICK;
        }
        !self.is_interrupted()
    }

    fn countdown(&mut self, secs: u64) -> io::Result<Flow> {
        for remaining in (1..=secs).rev() {
            write!(self.output, "\rNext maneuver in {} seconds...  ", remaining)?;
            self.output.flush()?;
            if !self.sleep_second() {
                return Ok(Flow::Interrupted);
            }
        }
        write!(self.output, "{}", CLEAR_LINE)?;
        self.output.flush()?;
        Ok(Flow::Continue)
    }

    fn dots(&mut self, secs: u64) -> io::Result<Flow> {
        write!(self.output, "\nWaiting")?;
        self.output.flush()?;
        for _ in 0..secs {
            if !self.sleep_second() {
                return Ok(Flow::Interrupted);
            }
            write!(self.output, ".")?;
            self.output.flush()?;
        }
        write!(self.output, "{}", CLEAR_LINE)?;
        self.output.flush()?;
        Ok(Flow::Continue)
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if read == 0 || self.is_interrupted() {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

impl<R: BufRead, W: Write> Console for TerminalConsole<R, W> {
    fn emit(&mut self, event: &Event<'_>) {
        if let Err(e) = write!(self.output, "{}", render(event)).and_then(|_| self.output.flush())
        {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }

    fn read_token(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "\n{}", prompt)?;
        self.output.flush()?;
        Ok(self.read_line()?.map(|line| line.trim().to_lowercase()))
    }

    fn pause(&mut self, pause: Pause) -> io::Result<Flow> {
        if self.is_interrupted() {
            return Ok(Flow::Interrupted);
        }
        match pause {
            Pause::Timed {
                duration,
                show_countdown: true,
            } => self.countdown(duration.as_secs()),
            Pause::Timed {
                duration,
                show_countdown: false,
            } => self.dots(duration.as_secs()),
            Pause::Manual => {
                write!(self.output, "\nPress Enter when ready for the next maneuver...")?;
                self.output.flush()?;
                Ok(match self.read_line()? {
                    Some(_) => Flow::Continue,
                    None => Flow::Interrupted,
                })
            }
        }
    }
}
