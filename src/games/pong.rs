use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::clock::TickClock;
use crate::input::{Intent, IntentBuffer};
use crate::session::{GameSession, Phase, ScoreCause, ScoreEvent, ScoreLog, Status};

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 400.0;
pub const PADDLE_WIDTH: f32 = 15.0;
pub const PADDLE_HEIGHT: f32 = 80.0;
pub const BALL_SIZE: f32 = 10.0;
const PADDLE_SPEED: f32 = 6.0;
const PADDLE_INSET: f32 = 30.0;
pub const INITIAL_BALL_SPEED: f32 = 5.0;
const MAX_BALL_SPEED: f32 = 12.0;
const SPIN_FACTOR: f32 = 10.0;
const SPEEDUP: f32 = 1.05;
const WINNING_SCORE: u32 = 10;

const TICK_MS: u64 = 16;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    Player,
    Ai,
}

#[derive(Clone, Debug)]
pub struct PongSnapshot {
    pub player_y: f32,
    pub ai_y: f32,
    pub ball: (f32, f32),
    pub player_score: u32,
    pub ai_score: u32,
    pub winner: Option<Side>,
    pub status: Status,
}

pub struct Pong {
    player_y: f32,
    ai_y: f32,
    ball_x: f32,
    ball_y: f32,
    ball_dx: f32,
    ball_dy: f32,
    player_score: ScoreLog,
    ai_score: u32,
    winner: Option<Side>,
    phase: Phase,
    clock: TickClock,
    input: IntentBuffer,
    rng: Pcg32,
    seed: u64,
}

impl Pong {
    pub fn new() -> Self {
        Self::with_seed(rand::thread_rng().gen())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            player_y: FIELD_HEIGHT / 2.0 - PADDLE_HEIGHT / 2.0,
            ai_y: FIELD_HEIGHT / 2.0 - PADDLE_HEIGHT / 2.0,
            ball_x: FIELD_WIDTH / 2.0,
            ball_y: FIELD_HEIGHT / 2.0,
            ball_dx: INITIAL_BALL_SPEED,
            ball_dy: 0.0,
            player_score: ScoreLog::default(),
            ai_score: 0,
            winner: None,
            phase: Phase::Menu,
            clock: TickClock::new(TICK_MS),
            input: IntentBuffer::default(),
            rng: Pcg32::seed_from_u64(seed),
            seed,
        }
    }

    pub fn snapshot(&self) -> PongSnapshot {
        PongSnapshot {
            player_y: self.player_y,
            ai_y: self.ai_y,
            ball: (self.ball_x, self.ball_y),
            player_score: self.player_score.total(),
            ai_score: self.ai_score,
            winner: self.winner,
            status: self.status(),
        }
    }

    /// Centre the ball and serve with a random heading. The horizontal
    /// component is always exactly the initial speed.
    fn reset_ball(&mut self) {
        self.ball_x = FIELD_WIDTH / 2.0;
        self.ball_y = FIELD_HEIGHT / 2.0;
        let sign = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        self.ball_dx = sign * INITIAL_BALL_SPEED;
        self.ball_dy = (self.rng.gen::<f32>() - 0.5) * INITIAL_BALL_SPEED;
    }

    fn step(&mut self, up: bool, down: bool) {
        // Player paddle, level-triggered.
        if up {
            self.player_y = (self.player_y - PADDLE_SPEED).max(0.0);
        }
        if down {
            self.player_y = (self.player_y + PADDLE_SPEED).min(FIELD_HEIGHT - PADDLE_HEIGHT);
        }

        // AI paddle tracks the ball at 80% speed, proportionally.
        let ai_center = self.ai_y + PADDLE_HEIGHT / 2.0;
        let diff = self.ball_y - ai_center;
        if diff.abs() > 5.0 {
            let speed = (diff.abs() * 0.1).min(PADDLE_SPEED * 0.8);
            self.ai_y += if diff > 0.0 { speed } else { -speed };
            self.ai_y = self.ai_y.clamp(0.0, FIELD_HEIGHT - PADDLE_HEIGHT);
        }

        // Integrate the ball.
        self.ball_x += self.ball_dx;
        self.ball_y += self.ball_dy;

        // Top/bottom wall reflection.
        if self.ball_y <= BALL_SIZE / 2.0 {
            self.ball_y = BALL_SIZE / 2.0;
            self.ball_dy = self.ball_dy.abs();
        } else if self.ball_y >= FIELD_HEIGHT - BALL_SIZE / 2.0 {
            self.ball_y = FIELD_HEIGHT - BALL_SIZE / 2.0;
            self.ball_dy = -self.ball_dy.abs();
        }

        // Player paddle reflection.
        let player_face = PADDLE_INSET + PADDLE_WIDTH;
        if self.ball_dx < 0.0
            && self.ball_x - BALL_SIZE / 2.0 <= player_face
            && self.ball_x + BALL_SIZE / 2.0 >= PADDLE_INSET
            && self.ball_y >= self.player_y
            && self.ball_y <= self.player_y + PADDLE_HEIGHT
        {
            let hit_pos = (self.ball_y - self.player_y) / PADDLE_HEIGHT;
            self.ball_dy = (hit_pos - 0.5) * SPIN_FACTOR;
            self.ball_dx = (self.ball_dx.abs() * SPEEDUP).min(MAX_BALL_SPEED);
            self.ball_x = player_face + BALL_SIZE / 2.0;
        }

        // AI paddle reflection.
        let ai_face = FIELD_WIDTH - PADDLE_INSET - PADDLE_WIDTH;
        if self.ball_dx > 0.0
            && self.ball_x + BALL_SIZE / 2.0 >= ai_face
            && self.ball_x - BALL_SIZE / 2.0 <= FIELD_WIDTH - PADDLE_INSET
            && self.ball_y >= self.ai_y
            && self.ball_y <= self.ai_y + PADDLE_HEIGHT
        {
            let hit_pos = (self.ball_y - self.ai_y) / PADDLE_HEIGHT;
            self.ball_dy = (hit_pos - 0.5) * SPIN_FACTOR;
            self.ball_dx = (-self.ball_dx.abs() * SPEEDUP).max(-MAX_BALL_SPEED);
            self.ball_x = ai_face - BALL_SIZE / 2.0;
        }

        // Side exits score for the opposite side.
        if self.ball_x < 0.0 {
            self.ai_score += 1;
            if self.ai_score >= WINNING_SCORE {
                self.winner = Some(Side::Ai);
                self.phase = Phase::GameOver;
            }
            self.reset_ball();
        } else if self.ball_x > FIELD_WIDTH {
            self.player_score.add(1, ScoreCause::PointWon);
            if self.player_score.total() >= WINNING_SCORE {
                self.winner = Some(Side::Player);
                self.phase = Phase::GameOver;
            }
            self.reset_ball();
        }
    }

    #[cfg(test)]
    fn place_ball(&mut self, x: f32, y: f32, dx: f32, dy: f32) {
        self.ball_x = x;
        self.ball_y = y;
        self.ball_dx = dx;
        self.ball_dy = dy;
    }
}

impl GameSession for Pong {
    fn start(&mut self) {
        if self.phase == Phase::Menu {
            self.phase = Phase::Playing;
            self.clock.reset();
            self.reset_ball();
        }
    }

    fn pause(&mut self) {
        if self.phase == Phase::Playing {
            self.phase = Phase::Paused;
            self.clock.pause();
        }
    }

    fn resume(&mut self) {
        if self.phase == Phase::Paused {
            self.phase = Phase::Playing;
            self.clock.resume();
        }
    }

    fn reset(&mut self) {
        *self = Pong::with_seed(self.seed);
    }

    fn apply_input(&mut self, intent: Intent) {
        if self.phase != Phase::Playing {
            return;
        }
        self.input.press(intent);
    }

    fn on_tick(&mut self, dt_ms: u64) {
        if self.phase != Phase::Playing {
            self.input.clear();
            return;
        }
        let snap = self.input.take();
        let steps = self.clock.advance(dt_ms);
        for _ in 0..steps {
            self.step(snap.up, snap.down);
            if self.phase != Phase::Playing {
                break;
            }
        }
    }

    fn status(&self) -> Status {
        Status {
            phase: self.phase,
            score: self.player_score.total(),
            lives: 1,
            level: 1,
        }
    }

    fn drain_score_events(&mut self) -> Vec<ScoreEvent> {
        self.player_score.drain_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(seed: u64) -> Pong {
        let mut game = Pong::with_seed(seed);
        game.start();
        game
    }

    #[test]
    fn left_exit_scores_ai_and_recenters_ball() {
        let mut game = playing(1);
        game.place_ball(2.0, 200.0, -INITIAL_BALL_SPEED, 0.0);
        game.player_y = 300.0; // out of the ball's path
        game.on_tick(TICK_MS);
        let snap = game.snapshot();
        assert_eq!(snap.ai_score, 1);
        assert_eq!(snap.player_score, 0);
        assert_eq!(snap.ball, (FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0));
        assert_eq!(game.ball_dx.abs(), INITIAL_BALL_SPEED);
    }

    #[test]
    fn right_exit_scores_player() {
        let mut game = playing(2);
        game.place_ball(FIELD_WIDTH - 2.0, 200.0, INITIAL_BALL_SPEED, 0.0);
        game.ai_y = 300.0;
        game.on_tick(TICK_MS);
        assert_eq!(game.snapshot().player_score, 1);
        assert_eq!(game.snapshot().ai_score, 0);
    }

    #[test]
    fn paddle_reflection_adds_spin_and_speed() {
        let mut game = playing(3);
        game.player_y = 160.0;
        // Ball about to reach the player paddle face, hitting the top
        // quarter of the paddle.
        game.place_ball(PADDLE_INSET + PADDLE_WIDTH + 4.0, 180.0, -5.0, 0.0);
        game.on_tick(TICK_MS);
        assert!(game.ball_dx > 0.0);
        assert_eq!(game.ball_dx, 5.0 * SPEEDUP);
        // Hit position 0.25 of the paddle -> upward spin.
        assert!(game.ball_dy < 0.0);
    }

    #[test]
    fn ball_speed_is_capped() {
        let mut game = playing(4);
        game.player_y = 160.0;
        game.place_ball(PADDLE_INSET + PADDLE_WIDTH + 4.0, 200.0, -MAX_BALL_SPEED, 0.0);
        game.on_tick(TICK_MS);
        assert!(game.ball_dx <= MAX_BALL_SPEED);
    }

    #[test]
    fn wall_reflection_keeps_ball_inside() {
        let mut game = playing(5);
        game.place_ball(400.0, 6.0, 0.0, -5.0);
        game.on_tick(TICK_MS);
        assert!(game.ball_y >= BALL_SIZE / 2.0);
        assert!(game.ball_dy > 0.0);
    }

    #[test]
    fn reaching_win_threshold_ends_session() {
        let mut game = playing(6);
        for _ in 0..WINNING_SCORE {
            game.place_ball(FIELD_WIDTH - 2.0, 200.0, INITIAL_BALL_SPEED, 0.0);
            game.ai_y = 300.0;
            game.on_tick(TICK_MS);
        }
        assert_eq!(game.status().phase, Phase::GameOver);
        assert_eq!(game.snapshot().winner, Some(Side::Player));
        assert_eq!(game.status().score, WINNING_SCORE);
    }

    #[test]
    fn input_outside_playing_is_ignored() {
        let mut game = Pong::with_seed(7);
        game.apply_input(Intent::Up);
        game.on_tick(1_000);
        assert_eq!(game.snapshot().player_y, FIELD_HEIGHT / 2.0 - PADDLE_HEIGHT / 2.0);
        assert_eq!(game.status().phase, Phase::Menu);
    }

    #[test]
    fn pause_freezes_the_ball() {
        let mut game = playing(8);
        let before = game.snapshot().ball;
        game.pause();
        game.pause();
        game.on_tick(1_000);
        assert_eq!(game.snapshot().ball, before);
        game.resume();
        game.on_tick(TICK_MS);
        assert_ne!(game.snapshot().ball, before);
    }

    #[test]
    fn reset_restores_initial_configuration() {
        let mut game = playing(9);
        game.place_ball(FIELD_WIDTH - 2.0, 200.0, INITIAL_BALL_SPEED, 0.0);
        game.ai_y = 300.0;
        game.on_tick(TICK_MS);
        game.reset();
        let snap = game.snapshot();
        assert_eq!(snap.status.phase, Phase::Menu);
        assert_eq!(snap.player_score, 0);
        assert_eq!(snap.ai_score, 0);
        assert_eq!(snap.winner, None);
    }
}
