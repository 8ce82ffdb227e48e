use std::sync::Arc;
use std::thread;

use futures::future;
use tokio::sync::oneshot;
use tracing::{Instrument, debug, debug_span, warn};

use crate::error::{MetricError, RunError};
use crate::system::snapshot::{CpuReading, MemorySample, SessionRecord};
use crate::system::source::{CpuSource, MemorySource, MetricSource, SessionSource};

/// Everything the three samplers produced for one round.
#[derive(Debug, Clone)]
pub struct RoundResult {
    pub round: usize,
    pub memory: Result<MemorySample, MetricError>,
    pub cpu: Result<CpuReading, MetricError>,
    pub sessions: Result<Vec<SessionRecord>, MetricError>,
}

/// Fans each round out to one OS thread per metric source and fans the
/// results back in through one-shot channels.
pub struct Coordinator<M = MemorySource, C = CpuSource, S = SessionSource> {
    memory: Arc<M>,
    cpu: Arc<C>,
    sessions: Arc<S>,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(MemorySource, CpuSource, SessionSource)
    }
}

impl<M, C, S> Coordinator<M, C, S>
where
    M: MetricSource<Output = MemorySample>,
    C: MetricSource<Output = CpuReading>,
    S: MetricSource<Output = Vec<SessionRecord>>,
{
    pub fn new(memory: M, cpu: C, sessions: S) -> Self {
        Self {
            memory: Arc::new(memory),
            cpu: Arc::new(cpu),
            sessions: Arc::new(sessions),
        }
    }

    /// Reads the CPU source once, outside any round, for the aggregator's
    /// baseline.
    pub async fn sample_cpu_baseline(&self) -> Result<Result<CpuReading, MetricError>, RunError> {
        let rx = launch(&self.cpu)?;
        Ok(collect::<C>(rx).await)
    }

    /// Runs all three sources concurrently and waits for every one of them.
    ///
    /// A source that fails only fails its own slot. There is no timeout: a
    /// sampler that never returns stalls the round.
    pub async fn run_round(&self, round: usize) -> Result<RoundResult, RunError> {
        let span = debug_span!("coordinator.round", round);
        async {
            let memory_rx = launch(&self.memory)?;
            let cpu_rx = launch(&self.cpu)?;
            let sessions_rx = launch(&self.sessions)?;

            let (memory, cpu, sessions) = future::join3(
                collect::<M>(memory_rx),
                collect::<C>(cpu_rx),
                collect::<S>(sessions_rx),
            )
            .await;

            debug!(
                memory_ok = memory.is_ok(),
                cpu_ok = cpu.is_ok(),
                sessions_ok = sessions.is_ok(),
                "round collected"
            );

            Ok::<_, RunError>(RoundResult {
                round,
                memory,
                cpu,
                sessions,
            })
        }
        .instrument(span)
        .await
    }
}

type Reply<T> = oneshot::Receiver<Result<T, MetricError>>;

fn launch<T: MetricSource>(source: &Arc<T>) -> Result<Reply<T::Output>, RunError> {
    let (tx, rx) = oneshot::channel();
    let source = Arc::clone(source);

    thread::Builder::new()
        .name(format!("{}-sampler", T::NAME))
        .spawn(move || {
            let _span = debug_span!("source.sample", source = T::NAME).entered();
            let result = source.sample();
            if let Err(err) = &result {
                warn!(source = T::NAME, %err, "metric source failed");
            }
            // The coordinator only drops the receiver when the process is exiting.
            let _ = tx.send(result);
        })
        .map_err(|error| RunError::Spawn {
            source_name: T::NAME,
            error,
        })?;

    Ok(rx)
}

async fn collect<T: MetricSource>(rx: Reply<T::Output>) -> Result<T::Output, MetricError> {
    rx.await.unwrap_or_else(|_| {
        Err(MetricError::query_failed(format!(
            "{} sampler exited without reporting",
            T::NAME
        )))
    })
}
