use crate::engine::aggregator::{CpuUtilization, MemoryReading};
use crate::error::{MetricError, RenderError};
use crate::format::format_gb_pair;

use super::graphics::{cpu_graphic, memory_graphic};

/// Upper bound on rounds a single run may keep history for.
pub const MAX_ROUNDS: usize = 1024;

/// Append-only rendered lines, one slot per completed round.
///
/// Slot `i` is written exactly once, by round `i`, and never touched again.
#[derive(Debug, Clone)]
pub struct RenderHistory {
    lines: Vec<String>,
    capacity: usize,
}

impl RenderHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, round: usize, line: String) -> Result<&str, RenderError> {
        if round >= self.capacity {
            return Err(RenderError::BufferOverflow {
                capacity: self.capacity,
                round,
            });
        }
        if round != self.lines.len() {
            return Err(RenderError::OutOfOrder {
                expected: self.lines.len(),
                round,
            });
        }
        self.lines.push(line);
        Ok(&self.lines[round])
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Formats per-round panel lines and keeps their cumulative history.
///
/// Memory lines are kept every round. CPU lines only exist in graphics mode,
/// where the bar history replaces a plain percentage readout.
#[derive(Debug)]
pub struct HistoryRenderer {
    memory: RenderHistory,
    cpu: RenderHistory,
    graphics: bool,
}

pub fn degraded(err: &MetricError) -> String {
    format!("metric unavailable: {err}")
}

impl HistoryRenderer {
    pub fn new(rounds: usize, graphics: bool) -> Self {
        let cpu_capacity = if graphics { rounds } else { 0 };
        Self {
            memory: RenderHistory::with_capacity(rounds),
            cpu: RenderHistory::with_capacity(cpu_capacity),
            graphics,
        }
    }

    pub fn graphics(&self) -> bool {
        self.graphics
    }

    pub fn append_memory_line(
        &mut self,
        round: usize,
        reading: Result<&MemoryReading, &MetricError>,
    ) -> Result<&str, RenderError> {
        let line = match reading {
            Ok(reading) => {
                let mut line = format!(
                    "{} -- {}",
                    format_gb_pair(reading.used_physical_gb, reading.total_physical_gb),
                    format_gb_pair(reading.used_virtual_gb, reading.total_virtual_gb),
                );
                if self.graphics {
                    line.push_str(&memory_graphic(reading));
                }
                line
            }
            Err(err) => degraded(err),
        };
        self.memory.record(round, line)
    }

    /// Returns `None` when graphics are off: there is no CPU history to keep.
    pub fn append_cpu_line(
        &mut self,
        round: usize,
        usage: Result<&CpuUtilization, &MetricError>,
    ) -> Result<Option<&str>, RenderError> {
        if !self.graphics {
            return Ok(None);
        }
        let line = match usage {
            Ok(usage) => cpu_graphic(usage.percent_used),
            Err(err) => degraded(err),
        };
        self.cpu.record(round, line).map(Some)
    }

    pub fn memory_lines(&self) -> &[String] {
        self.memory.lines()
    }

    pub fn cpu_lines(&self) -> &[String] {
        self.cpu.lines()
    }
}
