use std::future::Future;
use std::io::{self, Write};
use std::process::ExitCode;

use tracing::{info, warn};

use crate::config::MonitorConfig;
use crate::engine::aggregator::{CpuUtilization, RateAggregator};
use crate::engine::coordinator::{Coordinator, RoundResult};
use crate::engine::governor::{Decision, InterruptGovernor};
use crate::error::{GovernorError, MetricError, RenderError, RunError};
use crate::event::EventHandler;
use crate::system::identity::{self, SystemIdentity};
use crate::system::snapshot::{CpuReading, MemorySample, SessionRecord};
use crate::system::source::{CpuSource, MemorySource, MetricSource, SessionSource};
use crate::ui::history::HistoryRenderer;
use crate::ui::{self, CpuPanel, Dashboard, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Interrupted,
}

pub struct App<M = MemorySource, C = CpuSource, S = SessionSource> {
    config: MonitorConfig,
    coordinator: Coordinator<M, C, S>,
    aggregator: RateAggregator,
    renderer: HistoryRenderer,
    governor: InterruptGovernor,
    identity: Option<SystemIdentity>,
    self_usage: fn() -> Result<u64, MetricError>,
}

impl App {
    pub fn new(config: MonitorConfig) -> Self {
        let identity = match SystemIdentity::query() {
            Ok(identity) => Some(identity),
            Err(err) => {
                eprintln!("Error: system identity: {err}");
                None
            }
        };
        Self::with_coordinator(config, Coordinator::default()).with_identity(identity)
    }
}

impl<M, C, S> App<M, C, S>
where
    M: MetricSource<Output = MemorySample>,
    C: MetricSource<Output = CpuReading>,
    S: MetricSource<Output = Vec<SessionRecord>>,
{
    pub fn with_coordinator(config: MonitorConfig, coordinator: Coordinator<M, C, S>) -> Self {
        let renderer = HistoryRenderer::new(config.samples, config.graphics);
        App {
            config,
            coordinator,
            aggregator: RateAggregator::new(),
            renderer,
            governor: InterruptGovernor::new(),
            identity: None,
            self_usage: identity::self_memory_kb,
        }
    }

    pub fn with_identity(mut self, identity: Option<SystemIdentity>) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_self_usage(mut self, self_usage: fn() -> Result<u64, MetricError>) -> Self {
        self.self_usage = self_usage;
        self
    }

    pub fn renderer(&self) -> &HistoryRenderer {
        &self.renderer
    }

    pub fn aggregator(&self) -> &RateAggregator {
        &self.aggregator
    }

    /// Runs every configured round, then returns.
    ///
    /// Rounds are strictly sequential: round `r + 1` is not launched until
    /// round `r` has been merged and presented.
    pub async fn run<W: Write>(
        &mut self,
        events: &mut EventHandler,
        display: &mut Display<W>,
    ) -> Result<Outcome, RunError> {
        let App {
            config,
            coordinator,
            aggregator,
            renderer,
            governor,
            identity,
            self_usage,
        } = self;

        let Some(baseline) =
            guard(coordinator.sample_cpu_baseline(), governor, events, display.writer()).await?
        else {
            return Ok(Outcome::Interrupted);
        };
        match baseline? {
            Ok(reading) => aggregator.seed(&reading.counters),
            Err(err) => warn!(%err, "cpu baseline unavailable, first cpu round will seed"),
        }

        for round in 0..config.samples {
            let Some(result) =
                guard(coordinator.run_round(round), governor, events, display.writer()).await?
            else {
                return Ok(Outcome::Interrupted);
            };
            let result = result?;
            report_failures(&result);

            let cpu = merge(aggregator, renderer, &result)?;
            let self_memory = (*self_usage)();
            let dashboard = Dashboard {
                round,
                rounds: config.samples,
                interval_secs: config.interval.as_secs(),
                self_memory_kb: &self_memory,
                memory_history: config.show_system.then(|| renderer.memory_lines()),
                sessions: config.show_user.then_some(&result.sessions),
                cpu: config.show_system.then(|| CpuPanel {
                    usage: &cpu,
                    history: renderer.cpu_lines(),
                }),
                identity: identity.as_ref(),
            };

            let mut frame = String::new();
            ui::draw(&mut frame, &dashboard).map_err(io::Error::other)?;
            display.present(round, &frame)?;

            if round + 1 < config.samples {
                let slept = guard(
                    tokio::time::sleep(config.interval),
                    governor,
                    events,
                    display.writer(),
                )
                .await?;
                if slept.is_none() {
                    return Ok(Outcome::Interrupted);
                }
            }
        }

        Ok(Outcome::Completed)
    }
}

/// Feeds one round's samples through the aggregator and records the
/// rendered lines in history. Returns the CPU reading for the live panel.
fn merge(
    aggregator: &mut RateAggregator,
    renderer: &mut HistoryRenderer,
    result: &RoundResult,
) -> Result<Result<CpuUtilization, MetricError>, RenderError> {
    let memory = result
        .memory
        .as_ref()
        .map(|sample| aggregator.update_memory(sample));
    let cpu = result
        .cpu
        .as_ref()
        .map(|reading| aggregator.update_cpu(&reading.counters, reading.core_count))
        .map_err(Clone::clone);

    renderer.append_memory_line(result.round, memory.as_ref().map_err(|err| *err))?;
    renderer.append_cpu_line(result.round, cpu.as_ref())?;
    Ok(cpu)
}

fn report_failures(result: &RoundResult) {
    let failures = [
        ("memory", result.memory.as_ref().err()),
        ("cpu", result.cpu.as_ref().err()),
        ("sessions", result.sessions.as_ref().err()),
    ];
    for (name, err) in failures {
        if let Some(err) = err {
            eprintln!("Error: {name}: {err}");
        }
    }
}

/// Drives `work` to completion while answering signals as they arrive.
///
/// Returns `None` when the operator confirmed an exit.
async fn guard<F, W>(
    work: F,
    governor: &mut InterruptGovernor,
    events: &mut EventHandler,
    out: &mut W,
) -> Result<Option<F::Output>, GovernorError>
where
    F: Future,
    W: Write,
{
    tokio::pin!(work);
    loop {
        tokio::select! {
            biased;
            Some(event) = events.next() => {
                if governor.handle(event, events, out).await? == Decision::Exit {
                    return Ok(None);
                }
            }
            output = &mut work => return Ok(Some(output)),
        }
    }
}

/// Entry point for the binary: runs the monitor against the real terminal.
pub async fn run(config: MonitorConfig) -> ExitCode {
    let mut events = match EventHandler::new() {
        Ok(events) => events,
        Err(err) => {
            eprintln!("Error: {}", RunError::SignalSetup(err));
            return ExitCode::FAILURE;
        }
    };

    let mut display = Display::new(io::stdout(), config.sequential);
    let mut app = App::new(config);

    match app.run(&mut events, &mut display).await {
        Ok(outcome) => {
            info!(?outcome, "run finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
