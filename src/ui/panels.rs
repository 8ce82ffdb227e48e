use std::fmt::{self, Write};

use crate::engine::aggregator::CpuUtilization;
use crate::error::MetricError;
use crate::format::DIVIDER;
use crate::system::identity::SystemIdentity;
use crate::system::snapshot::SessionRecord;

use super::history::degraded;

pub fn header<W: Write>(
    out: &mut W,
    rounds: usize,
    interval_secs: u64,
    self_memory_kb: &Result<u64, MetricError>,
) -> fmt::Result {
    writeln!(out, "Nbr of samples: {rounds} -- every {interval_secs} secs")?;
    match self_memory_kb {
        Ok(kb) => writeln!(out, "Memory usage: {kb} kilobytes"),
        Err(err) => writeln!(out, "Memory usage: {}", degraded(err)),
    }
}

/// Replays the memory history, then pads with one blank line per round still
/// to come so the panels below stay put.
pub fn memory<W: Write>(out: &mut W, history: &[String], remaining: usize) -> fmt::Result {
    writeln!(out, "{DIVIDER}")?;
    writeln!(out, "### Memory ### (Phys.Used/Tot -- Virtual Used/Tot)")?;
    for line in history {
        writeln!(out, "{line}")?;
    }
    for _ in 0..remaining {
        writeln!(out)?;
    }
    Ok(())
}

pub fn sessions<W: Write>(
    out: &mut W,
    sessions: &Result<Vec<SessionRecord>, MetricError>,
) -> fmt::Result {
    writeln!(out, "{DIVIDER}")?;
    writeln!(out, "### Sessions/users ###")?;
    match sessions {
        Ok(sessions) => {
            for session in sessions {
                writeln!(
                    out,
                    "{}\t {} ({})",
                    session.user, session.terminal_line, session.host
                )?;
            }
            Ok(())
        }
        Err(err) => writeln!(out, "{}", degraded(err)),
    }
}

pub fn cpu<W: Write>(
    out: &mut W,
    usage: &Result<CpuUtilization, MetricError>,
    history: &[String],
) -> fmt::Result {
    writeln!(out, "{DIVIDER}")?;
    match usage {
        Ok(usage) => {
            writeln!(out, "Number of Cores: {}", usage.core_count)?;
            writeln!(out, " total cpu use: {:.2}%", usage.percent_used)?;
        }
        Err(err) => writeln!(out, "{}", degraded(err))?,
    }
    for line in history {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

pub fn footer<W: Write>(out: &mut W, identity: &SystemIdentity) -> fmt::Result {
    writeln!(out, "{DIVIDER}")?;
    writeln!(out, "### System Information ###")?;
    writeln!(out, " System Name = {}", identity.system_name)?;
    writeln!(out, " Machine Name = {}", identity.machine_name)?;
    writeln!(out, " Version = {}", identity.version)?;
    writeln!(out, " Release = {}", identity.release)?;
    writeln!(out, " Architecture = {}", identity.architecture)?;
    writeln!(out, "{DIVIDER}")
}
