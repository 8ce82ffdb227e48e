use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::thread;

use tokio::sync::mpsc;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Cancel signal (SIGINT / Ctrl-C).
    Interrupt,
    /// Pause signal (SIGTSTP / Ctrl-Z).
    Suspend,
    /// A line typed by the operator.
    Input(String),
    /// Operator input reached end of file.
    InputClosed,
}

/// Merges signal delivery and operator input into one ordered stream.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    pending: VecDeque<Event>,
    _task: Option<tokio::task::JoinHandle<()>>,
}

impl EventHandler {
    /// Installs the signal handlers and starts the stdin reader.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn new() -> io::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel::<Event>();
        let task = spawn_signal_listener(tx.clone())?;
        spawn_input_reader(tx)?;
        Ok(Self {
            rx,
            pending: VecDeque::new(),
            _task: Some(task),
        })
    }

    /// Wraps an existing channel; used to script events.
    pub fn from_channel(rx: mpsc::UnboundedReceiver<Event>) -> Self {
        Self {
            rx,
            pending: VecDeque::new(),
            _task: None,
        }
    }

    pub async fn next(&mut self) -> Option<Event> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        self.rx.recv().await
    }

    /// Drops operator input typed before now, keeping any queued signals.
    pub fn discard_stale_input(&mut self) {
        self.pending.retain(|e| !matches!(e, Event::Input(_)));
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Event::Input(line) => debug!(%line, "discarding stale operator input"),
                other => self.pending.push_back(other),
            }
        }
    }
}

#[cfg(unix)]
fn spawn_signal_listener(
    tx: mpsc::UnboundedSender<Event>,
) -> io::Result<tokio::task::JoinHandle<()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    // Registering a handler is what keeps Ctrl-Z from stopping the process.
    let mut suspend = signal(SignalKind::from_raw(libc::SIGTSTP))?;

    Ok(tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                Some(()) = interrupt.recv() => Event::Interrupt,
                Some(()) = suspend.recv() => Event::Suspend,
                else => break,
            };
            if tx.send(event).is_err() {
                break;
            }
        }
    }))
}

#[cfg(not(unix))]
fn spawn_signal_listener(
    tx: mpsc::UnboundedSender<Event>,
) -> io::Result<tokio::task::JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(Event::Interrupt).is_err() {
                break;
            }
        }
    }))
}

fn spawn_input_reader(tx: mpsc::UnboundedSender<Event>) -> io::Result<()> {
    thread::Builder::new()
        .name("operator-input".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(Event::Input(line)).is_err() {
                            return;
                        }
                    }
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
            let _ = tx.send(Event::InputClosed);
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stale_input_is_discarded_but_signals_kept() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut events = EventHandler::from_channel(rx);
        tx.send(Event::Input("y".to_string())).unwrap();
        tx.send(Event::Suspend).unwrap();
        tx.send(Event::Input("n".to_string())).unwrap();

        events.discard_stale_input();
        tx.send(Event::Input("fresh".to_string())).unwrap();

        assert_eq!(events.next().await, Some(Event::Suspend));
        assert_eq!(events.next().await, Some(Event::Input("fresh".to_string())));
    }

    #[tokio::test]
    async fn closed_channel_ends_stream() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut events = EventHandler::from_channel(rx);
        drop(tx);
        assert_eq!(events.next().await, None);
    }
}
