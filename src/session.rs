use crate::input::Intent;

/// Shared state-machine tag. The only edges are
/// menu -> playing <-> paused -> gameOver, and gameOver -> menu via
/// `reset`; terminal conditions fire exclusively out of `Playing`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// Bookkeeping every game exposes to the shell and the renderer.
#[derive(Clone, Copy, Debug)]
pub struct Status {
    pub phase: Phase,
    pub score: u32,
    pub lives: u32,
    pub level: u32,
}

/// Why a scoring rule fired.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScoreCause {
    Food,
    LineClear { lines: u32 },
    PointWon,
    BrickDestroyed,
    AlienDestroyed,
    Dot,
    PowerPellet,
    GhostEaten,
}

/// Immutable record of one scoring-rule firing.
#[derive(Clone, Copy, Debug)]
pub struct ScoreEvent {
    pub delta: u32,
    pub cause: ScoreCause,
}

/// Retained score events; the shell only reads the total, tests and any
/// on-demand consumer drain the events.
const SCORE_EVENT_CAP: usize = 256;

/// Session score: a monotonically non-decreasing total plus the event
/// log behind it. Only `clear` (session reset) can lower the total.
#[derive(Debug, Default)]
pub struct ScoreLog {
    total: u32,
    events: Vec<ScoreEvent>,
}

impl ScoreLog {
    pub fn add(&mut self, delta: u32, cause: ScoreCause) {
        self.total = self.total.saturating_add(delta);
        if self.events.len() == SCORE_EVENT_CAP {
            self.events.remove(0);
        }
        self.events.push(ScoreEvent { delta, cause });
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn drain_events(&mut self) -> Vec<ScoreEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[ScoreEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.total = 0;
        self.events.clear();
    }
}

/// One playable session. Lifecycle methods are phase-guarded and
/// idempotent where the phase does not change; `on_tick` advances zero
/// or more logical steps from the elapsed wall time; `apply_input` is a
/// no-op outside `Playing`.
pub trait GameSession {
    /// Menu -> Playing. Initializes board and entities.
    fn start(&mut self);
    /// Playing -> Paused; freezes the session clock.
    fn pause(&mut self);
    /// Paused -> Playing.
    fn resume(&mut self);
    /// Any state -> Menu, with the exact initial configuration
    /// (score 0, initial lives, level 1).
    fn reset(&mut self);
    /// Record an intent for the next tick. Ignored unless Playing.
    fn apply_input(&mut self, intent: Intent);
    /// Advance the simulation by `dt_ms` of wall time.
    fn on_tick(&mut self, dt_ms: u64);
    fn status(&self) -> Status;
    /// Hand over the score events accumulated since the last call.
    fn drain_score_events(&mut self) -> Vec<ScoreEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_log_is_monotonic() {
        let mut log = ScoreLog::default();
        log.add(10, ScoreCause::Food);
        log.add(0, ScoreCause::Dot);
        log.add(50, ScoreCause::PowerPellet);
        assert_eq!(log.total(), 60);
        assert_eq!(log.events().len(), 3);
        let drained = log.drain_events();
        assert_eq!(drained.len(), 3);
        assert_eq!(log.total(), 60);
        assert!(log.events().is_empty());
    }

    #[test]
    fn score_log_event_cap() {
        let mut log = ScoreLog::default();
        for _ in 0..SCORE_EVENT_CAP + 10 {
            log.add(1, ScoreCause::Dot);
        }
        assert_eq!(log.events().len(), SCORE_EVENT_CAP);
        assert_eq!(log.total(), (SCORE_EVENT_CAP + 10) as u32);
    }
}
