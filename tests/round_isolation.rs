use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use statwatch::app::{App, Outcome};
use statwatch::config::MonitorConfig;
use statwatch::engine::coordinator::Coordinator;
use statwatch::error::{GovernorError, MetricError, RunError};
use statwatch::event::{Event, EventHandler};
use statwatch::system::snapshot::{CpuCounterSnapshot, CpuReading, MemorySample, SessionRecord};
use statwatch::system::source::MetricSource;
use statwatch::ui::Display;
use tokio::sync::mpsc;

struct SteadyMemory;

impl MetricSource for SteadyMemory {
    type Output = MemorySample;
    const NAME: &'static str = "memory";

    fn sample(&self) -> Result<MemorySample, MetricError> {
        Ok(MemorySample {
            total_physical_gb: 16.0,
            used_physical_gb: 4.0,
            total_virtual_gb: 18.0,
            used_virtual_gb: 4.5,
        })
    }
}

/// Every read advances by 25 busy and 75 idle ticks.
#[derive(Default)]
struct TickingCpu {
    reads: AtomicU64,
}

impl MetricSource for TickingCpu {
    type Output = CpuReading;
    const NAME: &'static str = "cpu";

    fn sample(&self) -> Result<CpuReading, MetricError> {
        let n = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CpuReading {
            counters: CpuCounterSnapshot {
                user: 25 * n,
                idle: 75 * n,
                ..CpuCounterSnapshot::default()
            },
            core_count: 8,
        })
    }
}

struct BrokenSessions;

impl MetricSource for BrokenSessions {
    type Output = Vec<SessionRecord>;
    const NAME: &'static str = "sessions";

    fn sample(&self) -> Result<Vec<SessionRecord>, MetricError> {
        Err(MetricError::Unavailable("no session database".to_string()))
    }
}

/// Fails on the second round only.
#[derive(Default)]
struct FlakySessions {
    reads: AtomicU64,
}

impl MetricSource for FlakySessions {
    type Output = Vec<SessionRecord>;
    const NAME: &'static str = "sessions";

    fn sample(&self) -> Result<Vec<SessionRecord>, MetricError> {
        if self.reads.fetch_add(1, Ordering::SeqCst) == 1 {
            return Err(MetricError::QueryFailed("utmpx busy".to_string()));
        }
        Ok(vec![SessionRecord {
            user: "alice".to_string(),
            terminal_line: "pts/0".to_string(),
            host: ":0".to_string(),
        }])
    }
}

type TestApp = App<SteadyMemory, TickingCpu, BrokenSessions>;

fn config(samples: usize) -> MonitorConfig {
    MonitorConfig {
        samples,
        interval: Duration::ZERO,
        show_system: true,
        show_user: true,
        graphics: true,
        sequential: true,
    }
}

fn app(samples: usize) -> TestApp {
    let coordinator = Coordinator::new(SteadyMemory, TickingCpu::default(), BrokenSessions);
    App::with_coordinator(config(samples), coordinator).with_self_usage(|| Ok(1024))
}

fn scripted() -> (EventHandler, mpsc::UnboundedSender<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventHandler::from_channel(rx), tx)
}

/// Runs `work` and delivers `replies` once it is parked on the prompt.
async fn answer<F: Future>(work: F, tx: &mpsc::UnboundedSender<Event>, replies: &[Event]) -> F::Output {
    let reply = async {
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        for event in replies {
            tx.send(event.clone()).unwrap();
        }
    };
    let (output, ()) = tokio::join!(work, reply);
    output
}

#[tokio::test]
async fn failing_source_degrades_only_its_panel() {
    let mut app = app(3);
    let (mut events, _tx) = scripted();
    let mut display = Display::new(Vec::new(), true);

    let outcome = app.run(&mut events, &mut display).await.unwrap();
    assert_eq!(outcome, Outcome::Completed);

    let output = String::from_utf8(display.into_inner()).unwrap();
    assert_eq!(output.matches(">>> iteration").count(), 3);
    assert_eq!(
        output
            .matches("metric unavailable: unavailable: no session database")
            .count(),
        3
    );
    assert!(output.contains("4.00 GB / 16.00 GB -- 4.50 GB / 18.00 GB"));
    assert!(output.contains("Number of Cores: 8"));
    assert!(output.contains("Memory usage: 1024 kilobytes"));
}

/// Splits sequential output into one frame per round.
fn frames(output: &str) -> Vec<&str> {
    output.split(">>> iteration ").skip(1).collect()
}

#[tokio::test]
async fn one_failed_round_does_not_leak_into_the_next() {
    let coordinator = Coordinator::new(
        SteadyMemory,
        TickingCpu::default(),
        FlakySessions::default(),
    );
    let mut app = App::with_coordinator(config(3), coordinator).with_self_usage(|| Ok(1024));
    let (mut events, _tx) = scripted();
    let mut display = Display::new(Vec::new(), true);

    let outcome = app.run(&mut events, &mut display).await.unwrap();
    assert_eq!(outcome, Outcome::Completed);

    let output = String::from_utf8(display.into_inner()).unwrap();
    let frames = frames(&output);
    assert_eq!(frames.len(), 3);

    let session_line = "alice\t pts/0 (:0)";
    let memory_line = "4.00 GB / 16.00 GB -- 4.50 GB / 18.00 GB   |o 0.00 (4.00)";
    for (round, frame) in frames.iter().enumerate() {
        assert!(frame.contains(memory_line), "round {round}: {frame}");
        assert!(frame.contains(" total cpu use: 25.10%"), "round {round}: {frame}");
        assert!(frame.contains("Number of Cores: 8"), "round {round}: {frame}");
    }

    assert!(frames[0].contains(session_line));
    assert!(!frames[0].contains("metric unavailable"));

    assert!(frames[1].contains("metric unavailable: query failed: utmpx busy"));
    assert!(!frames[1].contains(session_line));

    assert!(frames[2].contains(session_line));
    assert!(!frames[2].contains("metric unavailable"));
}

#[tokio::test]
async fn interrupt_after_stdin_closed_ends_with_an_error() {
    let mut app = app(2);
    let (mut events, tx) = scripted();
    tx.send(Event::InputClosed).unwrap();
    tx.send(Event::Interrupt).unwrap();
    let mut display = Display::new(Vec::new(), true);

    let result = tokio::time::timeout(
        Duration::from_secs(2),
        app.run(&mut events, &mut display),
    )
    .await
    .expect("run must not hang on a prompt nobody can answer");

    assert!(matches!(
        result,
        Err(RunError::Governor(GovernorError::InputClosed))
    ));
    drop(tx);
}

#[tokio::test]
async fn history_grows_by_one_line_per_round() {
    let mut app = app(4);
    let (mut events, _tx) = scripted();
    let mut display = Display::new(Vec::new(), true);

    app.run(&mut events, &mut display).await.unwrap();

    let memory = app.renderer().memory_lines();
    let cpu = app.renderer().cpu_lines();
    assert_eq!(memory.len(), 4);
    assert_eq!(cpu.len(), 4);
    // Memory never moves, and the first round has no previous reading.
    assert!(memory.iter().all(|line| line.ends_with("   |o 0.00 (4.00)")));

    let output = String::from_utf8(display.into_inner()).unwrap();
    let last_frame = output.rsplit(">>> iteration").next().unwrap();
    for line in memory {
        assert!(last_frame.contains(line.as_str()));
    }
}

#[tokio::test]
async fn seeded_baseline_gives_a_real_first_reading() {
    let mut app = app(1);
    let (mut events, _tx) = scripted();
    let mut display = Display::new(Vec::new(), true);

    app.run(&mut events, &mut display).await.unwrap();

    let output = String::from_utf8(display.into_inner()).unwrap();
    // 25 busy ticks out of 100 since the baseline read.
    assert!(output.contains(" total cpu use: 25.10%"), "{output}");
}

#[tokio::test]
async fn confirmed_interrupt_ends_the_run() {
    let mut app = app(3);
    let (mut events, tx) = scripted();
    tx.send(Event::Interrupt).unwrap();
    let mut display = Display::new(Vec::new(), true);

    let outcome = answer(
        app.run(&mut events, &mut display),
        &tx,
        &[Event::Input("y".to_string())],
    )
    .await
    .unwrap();
    assert_eq!(outcome, Outcome::Interrupted);

    let output = String::from_utf8(display.into_inner()).unwrap();
    assert!(output.contains("Do you want to quit?"));
    assert!(!output.contains(">>> iteration"));
}

#[tokio::test]
async fn declined_interrupt_finishes_every_round() {
    let mut app = app(2);
    let (mut events, tx) = scripted();
    tx.send(Event::Interrupt).unwrap();
    let mut display = Display::new(Vec::new(), true);

    let outcome = answer(
        app.run(&mut events, &mut display),
        &tx,
        &[Event::Input("n".to_string())],
    )
    .await
    .unwrap();
    assert_eq!(outcome, Outcome::Completed);

    let output = String::from_utf8(display.into_inner()).unwrap();
    assert!(output.contains("Resuming..."));
    assert_eq!(output.matches(">>> iteration").count(), 2);
}

#[tokio::test]
async fn suspend_is_swallowed() {
    let mut app = app(2);
    let (mut events, tx) = scripted();
    tx.send(Event::Suspend).unwrap();
    let mut display = Display::new(Vec::new(), true);

    let outcome = app.run(&mut events, &mut display).await.unwrap();
    assert_eq!(outcome, Outcome::Completed);
}
