pub mod graphics;
pub mod history;
pub mod panels;


use std::fmt;
use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use crate::engine::aggregator::CpuUtilization;
use crate::error::MetricError;
use crate::system::identity::SystemIdentity;
use crate::system::snapshot::SessionRecord;

pub struct CpuPanel<'a> {
    pub usage: &'a Result<CpuUtilization, MetricError>,
    pub history: &'a [String],
}

/// Everything one round puts on screen. Hidden panels are `None`.
pub struct Dashboard<'a> {
    pub round: usize,
    pub rounds: usize,
    pub interval_secs: u64,
    pub self_memory_kb: &'a Result<u64, MetricError>,
    pub memory_history: Option<&'a [String]>,
    pub sessions: Option<&'a Result<Vec<SessionRecord>, MetricError>>,
    pub cpu: Option<CpuPanel<'a>>,
    pub identity: Option<&'a SystemIdentity>,
}

pub fn draw<W: fmt::Write>(out: &mut W, dashboard: &Dashboard<'_>) -> fmt::Result {
    panels::header(
        out,
        dashboard.rounds,
        dashboard.interval_secs,
        dashboard.self_memory_kb,
    )?;

    if let Some(history) = dashboard.memory_history {
        let remaining = dashboard.rounds.saturating_sub(dashboard.round + 1);
        panels::memory(out, history, remaining)?;
    }
    if let Some(sessions) = dashboard.sessions {
        panels::sessions(out, sessions)?;
    }
    if let Some(cpu) = &dashboard.cpu {
        panels::cpu(out, cpu.usage, cpu.history)?;
    }
    if let Some(identity) = dashboard.identity {
        panels::footer(out, identity)?;
    }
    Ok(())
}

/// Writes each round's frame either over the previous one or below it.
pub struct Display<W: Write> {
    out: W,
    sequential: bool,
}

impl<W: Write> Display<W> {
    pub fn new(out: W, sequential: bool) -> Self {
        Self { out, sequential }
    }

    pub fn present(&mut self, round: usize, frame: &str) -> io::Result<()> {
        if self.sequential {
            writeln!(self.out, ">>> iteration {round}")?;
        } else {
            queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
