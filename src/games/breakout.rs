use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::clock::TickClock;
use crate::input::{Intent, IntentBuffer};
use crate::session::{GameSession, Phase, ScoreCause, ScoreEvent, ScoreLog, Status};

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 600.0;
pub const PADDLE_WIDTH: f32 = 100.0;
pub const PADDLE_HEIGHT: f32 = 15.0;
pub const BALL_SIZE: f32 = 10.0;
pub const BRICK_WIDTH: f32 = 75.0;
pub const BRICK_HEIGHT: f32 = 20.0;
const BRICK_PADDING: f32 = 10.0;
const BRICK_OFFSET_TOP: f32 = 60.0;
const BRICK_OFFSET_LEFT: f32 = 30.0;
pub const BRICK_ROWS: usize = 5;
pub const BRICK_COLS: usize = 9;

const PADDLE_SPEED: f32 = 10.0;
const PADDLE_GAP: f32 = 20.0; // distance of paddle top from the floor line
const INITIAL_BALL_SPEED: f32 = 4.0;
const MAX_BALL_SPEED: f32 = 12.0;
const LEVEL_SPEEDUP: f32 = 1.1;
const INITIAL_LIVES: u32 = 3;

const TICK_MS: u64 = 16;

#[derive(Clone, Debug)]
pub struct Brick {
    pub x: f32,
    pub y: f32,
    pub row: usize,
    pub alive: bool,
    pub points: u32,
}

#[derive(Clone, Debug)]
pub struct BreakoutSnapshot {
    pub paddle_x: f32,
    pub ball: (f32, f32),
    pub bricks: Vec<Brick>,
    pub status: Status,
}

pub struct Breakout {
    paddle_x: f32,
    ball_x: f32,
    ball_y: f32,
    ball_dx: f32,
    ball_dy: f32,
    bricks: Vec<Brick>,
    lives: u32,
    level: u32,
    score: ScoreLog,
    phase: Phase,
    clock: TickClock,
    input: IntentBuffer,
    rng: Pcg32,
    seed: u64,
}

impl Breakout {
    pub fn new() -> Self {
        Self::with_seed(rand::thread_rng().gen())
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut game = Self {
            paddle_x: FIELD_WIDTH / 2.0 - PADDLE_WIDTH / 2.0,
            ball_x: FIELD_WIDTH / 2.0,
            ball_y: FIELD_HEIGHT - 30.0,
            ball_dx: INITIAL_BALL_SPEED,
            ball_dy: -INITIAL_BALL_SPEED,
            bricks: Vec::new(),
            lives: INITIAL_LIVES,
            level: 1,
            score: ScoreLog::default(),
            phase: Phase::Menu,
            clock: TickClock::new(TICK_MS),
            input: IntentBuffer::default(),
            rng: Pcg32::seed_from_u64(seed),
            seed,
        };
        game.init_bricks();
        game
    }

    pub fn snapshot(&self) -> BreakoutSnapshot {
        BreakoutSnapshot {
            paddle_x: self.paddle_x,
            ball: (self.ball_x, self.ball_y),
            bricks: self.bricks.clone(),
            status: self.status(),
        }
    }

    fn init_bricks(&mut self) {
        self.bricks.clear();
        for r in 0..BRICK_ROWS {
            for c in 0..BRICK_COLS {
                self.bricks.push(Brick {
                    x: c as f32 * (BRICK_WIDTH + BRICK_PADDING) + BRICK_OFFSET_LEFT,
                    y: r as f32 * (BRICK_HEIGHT + BRICK_PADDING) + BRICK_OFFSET_TOP,
                    row: r,
                    alive: true,
                    points: (BRICK_ROWS - r) as u32 * 10,
                });
            }
        }
    }

    fn paddle_top(&self) -> f32 {
        FIELD_HEIGHT - PADDLE_HEIGHT - PADDLE_GAP
    }

    fn reset_ball(&mut self) {
        self.ball_x = FIELD_WIDTH / 2.0;
        self.ball_y = FIELD_HEIGHT - 30.0;
        let speed = INITIAL_BALL_SPEED * LEVEL_SPEEDUP.powi(self.level as i32 - 1);
        let sign = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        self.ball_dx = speed * sign;
        self.ball_dy = -speed;
    }

    fn step(&mut self, left: bool, right: bool) {
        if left {
            self.paddle_x = (self.paddle_x - PADDLE_SPEED).max(0.0);
        }
        if right {
            self.paddle_x = (self.paddle_x + PADDLE_SPEED).min(FIELD_WIDTH - PADDLE_WIDTH);
        }

        self.ball_x += self.ball_dx;
        self.ball_y += self.ball_dy;

        // Side and top walls.
        if self.ball_x - BALL_SIZE / 2.0 <= 0.0 {
            self.ball_x = BALL_SIZE / 2.0;
            self.ball_dx = self.ball_dx.abs();
        } else if self.ball_x + BALL_SIZE / 2.0 >= FIELD_WIDTH {
            self.ball_x = FIELD_WIDTH - BALL_SIZE / 2.0;
            self.ball_dx = -self.ball_dx.abs();
        }
        if self.ball_y - BALL_SIZE / 2.0 <= 0.0 {
            self.ball_y = BALL_SIZE / 2.0;
            self.ball_dy = self.ball_dy.abs();
        }

        // Paddle.
        let top = self.paddle_top();
        if self.ball_dy > 0.0
            && self.ball_y + BALL_SIZE / 2.0 > top
            && self.ball_y - BALL_SIZE / 2.0 < top + PADDLE_HEIGHT
            && self.ball_x > self.paddle_x
            && self.ball_x < self.paddle_x + PADDLE_WIDTH
        {
            let hit_pos = (self.ball_x - self.paddle_x) / PADDLE_WIDTH;
            self.ball_dy = -self.ball_dy.abs();
            self.ball_dx = 8.0 * (hit_pos - 0.5);
            let speed = (self.ball_dx * self.ball_dx + self.ball_dy * self.ball_dy).sqrt();
            if speed < MAX_BALL_SPEED {
                let scale = 1.05f32.min(MAX_BALL_SPEED / speed);
                self.ball_dx *= scale;
                self.ball_dy *= scale;
            }
            self.ball_y = top - BALL_SIZE / 2.0;
        }

        // Floor: lose a life.
        if self.ball_y > FIELD_HEIGHT {
            self.lives = self.lives.saturating_sub(1);
            if self.lives == 0 {
                self.phase = Phase::GameOver;
            } else {
                self.reset_ball();
            }
            return;
        }

        self.hit_one_brick();

        if self.bricks.iter().all(|b| !b.alive) {
            self.level += 1;
            self.init_bricks();
            self.reset_ball();
        }
    }

    /// Destroy at most one brick per tick; the reflection axis is the
    /// one with the larger penetration ratio.
    fn hit_one_brick(&mut self) {
        let hit = self.bricks.iter().position(|brick| {
            brick.alive
                && self.ball_x > brick.x
                && self.ball_x < brick.x + BRICK_WIDTH
                && self.ball_y > brick.y
                && self.ball_y < brick.y + BRICK_HEIGHT
        });
        let Some(idx) = hit else { return };
        let brick = &mut self.bricks[idx];
        brick.alive = false;
        let dx = self.ball_x - (brick.x + BRICK_WIDTH / 2.0);
        let dy = self.ball_y - (brick.y + BRICK_HEIGHT / 2.0);
        let points = brick.points;
        if dx.abs() / BRICK_WIDTH > dy.abs() / BRICK_HEIGHT {
            self.ball_dx = -self.ball_dx;
        } else {
            self.ball_dy = -self.ball_dy;
        }
        self.score.add(points, ScoreCause::BrickDestroyed);
    }

    #[cfg(test)]
    fn place_ball(&mut self, x: f32, y: f32, dx: f32, dy: f32) {
        self.ball_x = x;
        self.ball_y = y;
        self.ball_dx = dx;
        self.ball_dy = dy;
    }
}

impl GameSession for Breakout {
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
        *self = Breakout::with_seed(self.seed);
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
            self.step(snap.left, snap.right);
            if self.phase != Phase::Playing {
                break;
            }
        }
    }

    fn status(&self) -> Status {
        Status {
            phase: self.phase,
            score: self.score.total(),
            lives: self.lives,
            level: self.level,
        }
    }

    fn drain_score_events(&mut self) -> Vec<ScoreEvent> {
        self.score.drain_events()
    }
}
