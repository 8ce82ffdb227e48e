use std::io::Write;

use tracing::{debug, info, warn};

use crate::error::GovernorError;
use crate::event::{Event, EventHandler};

const PROMPT: &str = "\nCtrl-C detected: Do you want to quit? (press 'y' if yes) ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GovernorState {
    Running,
    ConfirmingExit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Exit,
}

/// Intercepts cancel and pause signals on the coordinator's thread of control.
///
/// A cancel asks the operator to confirm; only `y`/`Y` ends the run. Pause
/// signals are swallowed.
#[derive(Debug)]
pub struct InterruptGovernor {
    state: GovernorState,
    input_closed: bool,
}

impl Default for InterruptGovernor {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptGovernor {
    pub fn new() -> Self {
        Self {
            state: GovernorState::Running,
            input_closed: false,
        }
    }

    pub fn state(&self) -> GovernorState {
        self.state
    }

    pub async fn handle<W: Write>(
        &mut self,
        event: Event,
        events: &mut EventHandler,
        out: &mut W,
    ) -> Result<Decision, GovernorError> {
        match event {
            Event::Interrupt => {
                self.state = GovernorState::ConfirmingExit;
                let decision = self.confirm(events, out).await;
                self.state = GovernorState::Running;
                decision
            }
            Event::Suspend => {
                debug!("pause signal ignored");
                Ok(Decision::Continue)
            }
            Event::Input(line) => {
                debug!(%line, "operator input outside confirmation ignored");
                Ok(Decision::Continue)
            }
            Event::InputClosed => {
                debug!("operator input closed");
                self.input_closed = true;
                Ok(Decision::Continue)
            }
        }
    }

    async fn confirm<W: Write>(
        &mut self,
        events: &mut EventHandler,
        out: &mut W,
    ) -> Result<Decision, GovernorError> {
        events.discard_stale_input();
        write!(out, "{PROMPT}")?;
        out.flush()?;
        // Nobody can answer once stdin is gone.
        if self.input_closed {
            return Err(GovernorError::InputClosed);
        }

        loop {
            match events.next().await {
                Some(Event::Input(line)) => {
                    // Blank lines keep waiting.
                    let Some(answer) = line.trim_start().chars().next() else {
                        continue;
                    };
                    if matches!(answer, 'y' | 'Y') {
                        info!("exit confirmed by operator");
                        return Ok(Decision::Exit);
                    }
                    writeln!(out, "Resuming...")?;
                    out.flush()?;
                    info!(%answer, "exit declined, resuming");
                    return Ok(Decision::Continue);
                }
                Some(Event::Interrupt | Event::Suspend) => {
                    warn!(err = %GovernorError::SignalRaceDuringConfirm, "resuming without asking again");
                    writeln!(out, "\nSignal detected during confirmation, resuming...")?;
                    out.flush()?;
                    return Ok(Decision::Continue);
                }
                Some(Event::InputClosed) | None => {
                    self.input_closed = true;
                    return Err(GovernorError::InputClosed);
                }
            }
        }
    }
}
