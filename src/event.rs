use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, KeyEvent, KeyEventKind};

pub enum Event {
    Key(KeyEvent),
    /// A host tick carrying the wall time elapsed since the previous
    /// tick, so sessions can run their own fixed-rate clocks.
    Tick { dt_ms: u64 },
}

/// Pumps terminal input and host ticks over a channel from a background
/// thread. The thread exits as soon as the receiver is dropped, so
/// tearing the handler down leaks no pending callbacks.
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel();
        let tick_rate = Duration::from_millis(tick_rate_ms);

        thread::spawn(move || {
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::ZERO);
                if event::poll(timeout).unwrap_or(false) {
                    if let Ok(crossterm::event::Event::Key(key)) = event::read() {
                        if key.kind == KeyEventKind::Press && tx.send(Event::Key(key)).is_err() {
                            return;
                        }
                    }
                }
                if last_tick.elapsed() >= tick_rate {
                    let dt_ms = last_tick.elapsed().as_millis() as u64;
                    last_tick = Instant::now();
                    if tx.send(Event::Tick { dt_ms }).is_err() {
                        return;
                    }
                }
            }
        });

        Self { rx }
    }

    pub fn next(&self) -> io::Result<Event> {
        self.rx
            .recv()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }
}
