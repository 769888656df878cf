use crossterm::event::{Event as TermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;

/// Events that can occur in the application
#[derive(Debug, Clone)]
pub enum Event {
    /// Terminal key press
    Key(KeyEvent),
    /// Terminal resized to (columns, rows)
    Resize(u16, u16),
    /// Periodic redraw tick
    Tick,
    /// Terminal input closed or failed
    Quit,
}

/// Result type for event handling
pub type EventResult<T> = anyhow::Result<T>;

/// Forwards terminal input and ticks into one channel.
///
/// The reader task stops when the receiver is dropped.
pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventReader {
    pub fn spawn(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut input = EventStream::new();
            let mut ticks = tokio::time::interval(tick_rate);

            loop {
                let event = tokio::select! {
                    _ = ticks.tick() => Event::Tick,
                    next = input.next() => match next {
                        Some(Ok(TermEvent::Key(key))) if key.kind == KeyEventKind::Press => Event::Key(key),
                        Some(Ok(TermEvent::Resize(cols, rows))) => Event::Resize(cols, rows),
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => {
                            tracing::error!(error = %e, "terminal input error");
                            Event::Quit
                        }
                        None => Event::Quit,
                    },
                };

                let quit = matches!(event, Event::Quit);
                if tx.send(event).is_err() || quit {
                    break;
                }
            }
        });

        Self { rx }
    }

    /// Next event, or `None` once the reader task is gone
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Next already-queued event, without waiting
    pub fn try_next(&mut self) -> Result<Event, mpsc::error::TryRecvError> {
        self.rx.try_recv()
    }
}
