use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::info;

use crate::games::breakout::Breakout;
use crate::games::invaders::Invaders;
use crate::games::pacman::PacMan;
use crate::games::pong::Pong;
use crate::games::snake::Snake;
use crate::games::tetris::Tetris;
use crate::games::GameId;
use crate::input::Intent;
use crate::scores::HighScores;
use crate::session::{GameSession, Phase, Status};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Game(GameId),
}

impl Tab {
    pub fn all() -> Vec<Tab> {
        let mut tabs = vec![Tab::Home];
        tabs.extend(GameId::all().iter().map(|&id| Tab::Game(id)));
        tabs
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Home => " Home ",
            Tab::Game(GameId::Snake) => " Snake ",
            Tab::Game(GameId::Tetris) => " Tetris ",
            Tab::Game(GameId::Pong) => " Pong ",
            Tab::Game(GameId::Breakout) => " Breakout ",
            Tab::Game(GameId::Invaders) => " Invaders ",
            Tab::Game(GameId::PacMan) => " Pac-Man ",
        }
    }

    fn index(&self) -> usize {
        match self {
            Tab::Home => 0,
            Tab::Game(id) => 1 + GameId::all().iter().position(|g| g == id).unwrap_or(0),
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub current_tab: Tab,
    pub selected_game: usize,
    pub snake: Snake,
    pub tetris: Tetris,
    pub pong: Pong,
    pub breakout: Breakout,
    pub invaders: Invaders,
    pub pacman: PacMan,
    pub high_scores: HighScores,
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            current_tab: Tab::Home,
            selected_game: 0,
            snake: Snake::new(),
            tetris: Tetris::new(),
            pong: Pong::new(),
            breakout: Breakout::new(),
            invaders: Invaders::new(),
            pacman: PacMan::new(),
            high_scores: HighScores::load(),
        }
    }

    fn session_mut(&mut self, id: GameId) -> &mut dyn GameSession {
        match id {
            GameId::Snake => &mut self.snake,
            GameId::Tetris => &mut self.tetris,
            GameId::Pong => &mut self.pong,
            GameId::Breakout => &mut self.breakout,
            GameId::Invaders => &mut self.invaders,
            GameId::PacMan => &mut self.pacman,
        }
    }

    pub fn status_of(&self, id: GameId) -> Status {
        match id {
            GameId::Snake => self.snake.status(),
            GameId::Tetris => self.tetris.status(),
            GameId::Pong => self.pong.status(),
            GameId::Breakout => self.breakout.status(),
            GameId::Invaders => self.invaders.status(),
            GameId::PacMan => self.pacman.status(),
        }
    }

    pub fn on_tick(&mut self, dt_ms: u64) {
        if let Tab::Game(id) = self.current_tab {
            self.session_mut(id).on_tick(dt_ms);
        }
        self.check_session_ends();
    }

    /// Fires once per finished session: persists a record if the final
    /// score beats the stored best, and emits the analytics event either
    /// way. Re-armed when the session leaves gameOver.
    fn check_session_ends(&mut self) {
        for &id in GameId::all() {
            let status = self.status_of(id);
            if status.phase == Phase::GameOver && !self.high_scores.was_submitted(id) {
                let events = self.session_mut(id).drain_score_events();
                let record = self.high_scores.submit(id, status.score);
                self.high_scores.mark_submitted(id);
                info!(
                    target: "analytics",
                    "game_over game={} score={} scoring_events={} record={}",
                    id.id(),
                    status.score,
                    events.len(),
                    record
                );
            } else if status.phase != Phase::GameOver && self.high_scores.was_submitted(id) {
                self.high_scores.clear_submitted(id);
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        // Global keys
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                if matches!(self.current_tab, Tab::Home) {
                    self.should_quit = true;
                    return;
                }
            }
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.prev_tab();
                } else {
                    self.next_tab();
                }
                return;
            }
            KeyCode::BackTab => {
                self.prev_tab();
                return;
            }
            KeyCode::Esc => {
                if !matches!(self.current_tab, Tab::Home) {
                    self.current_tab = Tab::Home;
                    return;
                }
            }
            _ => {}
        }

        match self.current_tab {
            Tab::Home => self.on_home_key(key),
            Tab::Game(id) => self.on_game_key(id, key),
        }
    }

    fn on_home_key(&mut self, key: KeyEvent) {
        let games = GameId::all();
        match key.code {
            KeyCode::Char(c @ '1'..='6') => {
                let idx = c as usize - '1' as usize;
                self.open_game(games[idx]);
            }
            KeyCode::Right => {
                self.selected_game = (self.selected_game + 1) % games.len();
            }
            KeyCode::Left => {
                self.selected_game = (self.selected_game + games.len() - 1) % games.len();
            }
            // Tiles are laid out in two rows of three.
            KeyCode::Down | KeyCode::Up => {
                self.selected_game = (self.selected_game + 3) % games.len();
            }
            KeyCode::Enter => {
                self.open_game(games[self.selected_game]);
            }
            _ => {}
        }
    }

    fn open_game(&mut self, id: GameId) {
        self.current_tab = Tab::Game(id);
        info!(target: "analytics", "game_selected game={}", id.id());
    }

    /// Phase-dependent key map: lifecycle keys drive the state machine,
    /// everything else becomes an intent for the session's next tick.
    fn on_game_key(&mut self, id: GameId, key: KeyEvent) {
        let phase = self.status_of(id).phase;
        let session = self.session_mut(id);
        match phase {
            Phase::Menu => {
                if matches!(key.code, KeyCode::Char(' ') | KeyCode::Enter) {
                    session.start();
                }
            }
            Phase::Playing => match key.code {
                KeyCode::Char('p') | KeyCode::Char('P') => session.pause(),
                KeyCode::Char('r') | KeyCode::Char('R') => {
                    session.reset();
                    session.start();
                }
                KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => {
                    session.apply_input(Intent::Up)
                }
                KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => {
                    session.apply_input(Intent::Down)
                }
                KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
                    session.apply_input(Intent::Left)
                }
                KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
                    session.apply_input(Intent::Right)
                }
                KeyCode::Char(' ') => session.apply_input(Intent::Action),
                _ => {}
            },
            Phase::Paused => match key.code {
                KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Char(' ') => session.resume(),
                _ => {}
            },
            Phase::GameOver => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    session.reset();
                }
            }
        }
    }

    fn next_tab(&mut self) {
        let tabs = Tab::all();
        let idx = self.current_tab.index();
        self.current_tab = tabs[(idx + 1) % tabs.len()];
    }

    fn prev_tab(&mut self) {
        let tabs = Tab::all();
        let idx = self.current_tab.index();
        self.current_tab = tabs[(idx + tabs.len() - 1) % tabs.len()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_cycle_covers_home_and_all_games() {
        let mut app = App::new();
        let count = Tab::all().len();
        for _ in 0..count {
            app.next_tab();
        }
        assert!(matches!(app.current_tab, Tab::Home));
    }

    #[test]
    fn game_over_submits_once_per_session() {
        let mut app = App::new();
        // Force a finished snake session by walking it into the wall.
        app.current_tab = Tab::Game(GameId::Snake);
        app.snake.start();
        for _ in 0..20 {
            app.on_tick(1_000);
        }
        assert_eq!(app.status_of(GameId::Snake).phase, Phase::GameOver);
        assert!(app.high_scores.was_submitted(GameId::Snake));
        // A reset re-arms submission for the next run.
        app.snake.reset();
        app.on_tick(0);
        assert!(!app.high_scores.was_submitted(GameId::Snake));
    }
}
