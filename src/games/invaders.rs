use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::clock::TickClock;
use crate::input::{Intent, IntentBuffer};
use crate::session::{GameSession, Phase, ScoreCause, ScoreEvent, ScoreLog, Status};

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 600.0;
pub const PLAYER_WIDTH: f32 = 40.0;
pub const PLAYER_HEIGHT: f32 = 30.0;
pub const ALIEN_WIDTH: f32 = 30.0;
pub const ALIEN_HEIGHT: f32 = 20.0;
pub const BULLET_WIDTH: f32 = 4.0;
pub const BULLET_HEIGHT: f32 = 10.0;
pub const SHIELD_BLOCK: f32 = 10.0;

const PLAYER_Y: f32 = FIELD_HEIGHT - 60.0;
const PLAYER_SPEED: f32 = 5.0;
const BULLET_SPEED: f32 = 7.0;
const ALIEN_BULLET_SPEED: f32 = 3.0;
const FIRE_COOLDOWN_TICKS: u32 = 18; // ~300ms at the 16ms tick

pub const ALIEN_ROWS: usize = 5;
pub const ALIEN_COLS: usize = 11;
const ALIEN_START_X: f32 = 50.0;
const ALIEN_START_Y: f32 = 50.0;
const ALIEN_H_SPACING: f32 = 50.0;
const ALIEN_V_SPACING: f32 = 40.0;
const ALIEN_DROP: f32 = 20.0;
const INITIAL_ALIEN_SPEED: f32 = 0.5;
const LEVEL_SPEEDUP: f32 = 1.2;

const SHIELD_COUNT: usize = 4;
const SHIELD_ROWS: usize = 4;
const SHIELD_COLS: usize = 6;
const SHIELD_HEALTH: u8 = 3;

const INITIAL_LIVES: u32 = 3;
const TICK_MS: u64 = 16;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AlienKind {
    Special, // top row, 30 pts
    Medium,  // second row, 20 pts
    Basic,   // the rest, 10 pts
}

impl AlienKind {
    fn for_row(row: usize) -> Self {
        match row {
            0 => AlienKind::Special,
            1 => AlienKind::Medium,
            _ => AlienKind::Basic,
        }
    }

    pub fn points(self) -> u32 {
        match self {
            AlienKind::Special => 30,
            AlienKind::Medium => 20,
            AlienKind::Basic => 10,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Alien {
    pub x: f32,
    pub y: f32,
    pub kind: AlienKind,
    pub alive: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    dy: f32,
}

#[derive(Clone, Debug)]
pub struct ShieldBlock {
    pub x: f32,
    pub y: f32,
    pub health: u8,
}

#[derive(Clone, Debug)]
pub struct InvadersSnapshot {
    pub player_x: f32,
    pub aliens: Vec<Alien>,
    pub player_bullets: Vec<Bullet>,
    pub alien_bullets: Vec<Bullet>,
    pub shields: Vec<ShieldBlock>,
    pub status: Status,
}

pub struct Invaders {
    player_x: f32,
    aliens: Vec<Alien>,
    alien_dir: f32,
    alien_speed: f32,
    /// Boundary reversal schedules a vertical drop that consumes the
    /// whole of the next tick's formation movement.
    drop_pending: bool,
    player_bullets: Vec<Bullet>,
    alien_bullets: Vec<Bullet>,
    shields: Vec<ShieldBlock>,
    fire_cooldown: u32,
    alien_fire_timer: u32,
    alien_fire_deadline: u32,
    lives: u32,
    level: u32,
    score: ScoreLog,
    phase: Phase,
    clock: TickClock,
    input: IntentBuffer,
    rng: Pcg32,
    seed: u64,
}

impl Invaders {
    pub fn new() -> Self {
        Self::with_seed(rand::thread_rng().gen())
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let deadline = 60 + rng.gen_range(0..60);
        let mut game = Self {
            player_x: FIELD_WIDTH / 2.0 - PLAYER_WIDTH / 2.0,
            aliens: Vec::new(),
            alien_dir: 1.0,
            alien_speed: INITIAL_ALIEN_SPEED,
            drop_pending: false,
            player_bullets: Vec::new(),
            alien_bullets: Vec::new(),
            shields: Vec::new(),
            fire_cooldown: 0,
            alien_fire_timer: 0,
            alien_fire_deadline: deadline,
            lives: INITIAL_LIVES,
            level: 1,
            score: ScoreLog::default(),
            phase: Phase::Menu,
            clock: TickClock::new(TICK_MS),
            input: IntentBuffer::default(),
            rng,
            seed,
        };
        game.init_aliens();
        game.init_shields();
        game
    }

    pub fn snapshot(&self) -> InvadersSnapshot {
        InvadersSnapshot {
            player_x: self.player_x,
            aliens: self.aliens.clone(),
            player_bullets: self.player_bullets.clone(),
            alien_bullets: self.alien_bullets.clone(),
            shields: self.shields.clone(),
            status: self.status(),
        }
    }

    fn init_aliens(&mut self) {
        self.aliens.clear();
        for row in 0..ALIEN_ROWS {
            for col in 0..ALIEN_COLS {
                self.aliens.push(Alien {
                    x: ALIEN_START_X + col as f32 * ALIEN_H_SPACING,
                    y: ALIEN_START_Y + row as f32 * ALIEN_V_SPACING,
                    kind: AlienKind::for_row(row),
                    alive: true,
                });
            }
        }
        self.alien_dir = 1.0;
        self.drop_pending = false;
    }

    fn init_shields(&mut self) {
        self.shields.clear();
        let spacing = FIELD_WIDTH / (SHIELD_COUNT as f32 + 1.0);
        for i in 0..SHIELD_COUNT {
            let x0 = spacing * (i as f32 + 1.0) - 30.0;
            let y0 = FIELD_HEIGHT - 150.0;
            for row in 0..SHIELD_ROWS {
                for col in 0..SHIELD_COLS {
                    // Clip the top corners and a bottom-center notch.
                    let corner = row == 0 && (col == 0 || col == SHIELD_COLS - 1);
                    let notch = row == SHIELD_ROWS - 1 && (col == 2 || col == 3);
                    if corner || notch {
                        continue;
                    }
                    self.shields.push(ShieldBlock {
                        x: x0 + col as f32 * SHIELD_BLOCK,
                        y: y0 + row as f32 * SHIELD_BLOCK,
                        health: SHIELD_HEALTH,
                    });
                }
            }
        }
    }

    fn step(&mut self, left: bool, right: bool, fire: bool) {
        if left {
            self.player_x = (self.player_x - PLAYER_SPEED).max(0.0);
        }
        if right {
            self.player_x = (self.player_x + PLAYER_SPEED).min(FIELD_WIDTH - PLAYER_WIDTH);
        }
        if self.fire_cooldown > 0 {
            self.fire_cooldown -= 1;
        }
        if fire && self.fire_cooldown == 0 {
            self.player_bullets.push(Bullet {
                x: self.player_x + PLAYER_WIDTH / 2.0 - BULLET_WIDTH / 2.0,
                y: PLAYER_Y,
                dy: -BULLET_SPEED,
            });
            self.fire_cooldown = FIRE_COOLDOWN_TICKS;
        }

        self.move_formation();
        self.move_bullets();
        self.alien_fire();

        if self.phase != Phase::Playing {
            return;
        }

        // Any alien on the player's row ends the session.
        let reached = self
            .aliens
            .iter()
            .any(|a| a.alive && a.y + ALIEN_HEIGHT >= PLAYER_Y);
        if reached {
            self.phase = Phase::GameOver;
            return;
        }

        if self.aliens.iter().all(|a| !a.alive) {
            self.level += 1;
            self.alien_speed *= LEVEL_SPEEDUP;
            self.init_aliens();
            self.init_shields();
            self.player_bullets.clear();
            self.alien_bullets.clear();
        }
    }

    /// The formation is a rigid block: one direction, one speed. A
    /// boundary hit reverses it and converts the next tick's movement
    /// into a single vertical drop.
    fn move_formation(&mut self) {
        if self.drop_pending {
            for alien in self.aliens.iter_mut().filter(|a| a.alive) {
                alien.y += ALIEN_DROP;
            }
            self.drop_pending = false;
            return;
        }

        let dx = self.alien_dir * self.alien_speed;
        let hits_edge = self.aliens.iter().any(|a| {
            a.alive && {
                let next = a.x + dx;
                next <= 0.0 || next >= FIELD_WIDTH - ALIEN_WIDTH
            }
        });
        if hits_edge {
            self.alien_dir = -self.alien_dir;
            self.drop_pending = true;
            return;
        }
        for alien in self.aliens.iter_mut().filter(|a| a.alive) {
            alien.x += dx;
        }
    }

    fn move_bullets(&mut self) {
        // Player bullets: shield blocks take the hit before aliens.
        let mut survivors = Vec::with_capacity(self.player_bullets.len());
        for mut bullet in self.player_bullets.drain(..) {
            bullet.y += bullet.dy;
            if bullet.y + BULLET_HEIGHT < 0.0 {
                continue;
            }
            if hit_shield(&mut self.shields, &bullet) {
                continue;
            }
            let mut consumed = false;
            for alien in self.aliens.iter_mut().filter(|a| a.alive) {
                if overlaps(
                    bullet.x,
                    bullet.y,
                    BULLET_WIDTH,
                    BULLET_HEIGHT,
                    alien.x,
                    alien.y,
                    ALIEN_WIDTH,
                    ALIEN_HEIGHT,
                ) {
                    alien.alive = false; // removed now, cannot be hit again this tick
                    self.score.add(alien.kind.points(), ScoreCause::AlienDestroyed);
                    consumed = true;
                    break;
                }
            }
            if !consumed {
                survivors.push(bullet);
            }
        }
        self.player_bullets = survivors;

        // Alien bullets: shields first, then the player.
        let mut survivors = Vec::with_capacity(self.alien_bullets.len());
        for mut bullet in self.alien_bullets.drain(..) {
            bullet.y += bullet.dy;
            if bullet.y > FIELD_HEIGHT {
                continue;
            }
            if hit_shield(&mut self.shields, &bullet) {
                continue;
            }
            if overlaps(
                bullet.x,
                bullet.y,
                BULLET_WIDTH,
                BULLET_HEIGHT,
                self.player_x,
                PLAYER_Y,
                PLAYER_WIDTH,
                PLAYER_HEIGHT,
            ) {
                self.lives = self.lives.saturating_sub(1);
                if self.lives == 0 {
                    self.phase = Phase::GameOver;
                }
                continue;
            }
            survivors.push(bullet);
        }
        self.alien_bullets = survivors;
    }

    fn alien_fire(&mut self) {
        self.alien_fire_timer += 1;
        if self.alien_fire_timer < self.alien_fire_deadline {
            return;
        }
        self.alien_fire_timer = 0;
        self.alien_fire_deadline = 60 + self.rng.gen_range(0..60);

        let alive: Vec<usize> = self
            .aliens
            .iter()
            .enumerate()
            .filter(|(_, a)| a.alive)
            .map(|(i, _)| i)
            .collect();
        if alive.is_empty() {
            return;
        }
        let shooter = &self.aliens[alive[self.rng.gen_range(0..alive.len())]];
        self.alien_bullets.push(Bullet {
            x: shooter.x + ALIEN_WIDTH / 2.0 - BULLET_WIDTH / 2.0,
            y: shooter.y + ALIEN_HEIGHT,
            dy: ALIEN_BULLET_SPEED,
        });
    }
}

fn overlaps(ax: f32, ay: f32, aw: f32, ah: f32, bx: f32, by: f32, bw: f32, bh: f32) -> bool {
    ax < bx + bw && ax + aw > bx && ay < by + bh && ay + ah > by
}

/// Damage the first live shield block the bullet overlaps. A block at
/// zero health is gone immediately, so nothing can hit it twice in one
/// tick. Returns whether the bullet was consumed.
fn hit_shield(shields: &mut Vec<ShieldBlock>, bullet: &Bullet) -> bool {
    let hit = shields.iter().position(|block| {
        overlaps(
            bullet.x,
            bullet.y,
            BULLET_WIDTH,
            BULLET_HEIGHT,
            block.x,
            block.y,
            SHIELD_BLOCK,
            SHIELD_BLOCK,
        )
    });
    let Some(idx) = hit else { return false };
    let block = &mut shields[idx];
    block.health -= 1;
    if block.health == 0 {
        shields.remove(idx);
    }
    true
}

impl GameSession for Invaders {
    fn start(&mut self) {
        if self.phase == Phase::Menu {
            self.phase = Phase::Playing;
            self.clock.reset();
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
        *self = Invaders::with_seed(self.seed);
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
            self.step(snap.left, snap.right, snap.action);
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

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(seed: u64) -> Invaders {
        let mut game = Invaders::with_seed(seed);
        game.start();
        game
    }

    #[test]
    fn formation_rows_carry_classic_points() {
        let game = Invaders::with_seed(1);
        assert_eq!(game.aliens.len(), ALIEN_ROWS * ALIEN_COLS);
        assert_eq!(game.aliens[0].kind.points(), 30);
        assert_eq!(game.aliens[ALIEN_COLS].kind.points(), 20);
        assert_eq!(game.aliens[2 * ALIEN_COLS].kind.points(), 10);
    }

    #[test]
    fn formation_moves_as_a_rigid_block() {
        let mut game = playing(2);
        let xs: Vec<f32> = game.aliens.iter().map(|a| a.x).collect();
        game.move_formation();
        for (alien, x0) in game.aliens.iter().zip(xs) {
            assert_eq!(alien.x, x0 + INITIAL_ALIEN_SPEED);
        }
    }

    #[test]
    fn edge_reversal_drops_on_the_next_tick_only() {
        let mut game = playing(3);
        // Push the rightmost column to the boundary.
        let shift = FIELD_WIDTH - ALIEN_WIDTH - game.aliens.iter().map(|a| a.x).fold(0.0, f32::max)
            - INITIAL_ALIEN_SPEED / 2.0;
        for alien in &mut game.aliens {
            alien.x += shift;
        }
        let ys: Vec<f32> = game.aliens.iter().map(|a| a.y).collect();
        let xs: Vec<f32> = game.aliens.iter().map(|a| a.x).collect();

        // Edge tick: reversal only, no motion.
        game.move_formation();
        assert_eq!(game.alien_dir, -1.0);
        assert!(game.drop_pending);
        for (alien, (x0, y0)) in game.aliens.iter().zip(xs.iter().zip(&ys)) {
            assert_eq!(alien.x, *x0);
            assert_eq!(alien.y, *y0);
        }

        // Next tick: pure vertical drop.
        game.move_formation();
        assert!(!game.drop_pending);
        for (alien, y0) in game.aliens.iter().zip(&ys) {
            assert_eq!(alien.y, y0 + ALIEN_DROP);
        }

        // Tick after: horizontal again, leftward.
        let xs: Vec<f32> = game.aliens.iter().map(|a| a.x).collect();
        game.move_formation();
        for (alien, x0) in game.aliens.iter().zip(xs) {
            assert_eq!(alien.x, x0 - INITIAL_ALIEN_SPEED);
        }
    }

    #[test]
    fn player_bullet_prefers_shield_over_alien() {
        let mut game = playing(4);
        // One alien directly behind a shield block, bullet touching both.
        let block = game.shields[0].clone();
        game.aliens[0].x = block.x;
        game.aliens[0].y = block.y;
        game.player_bullets.push(Bullet {
            x: block.x + 2.0,
            y: block.y + SHIELD_BLOCK,
            dy: -BULLET_SPEED,
        });
        game.move_bullets();
        assert!(game.aliens[0].alive);
        assert_eq!(game.shields[0].health, SHIELD_HEALTH - 1);
        assert!(game.player_bullets.is_empty());
    }

    #[test]
    fn destroyed_alien_is_removed_immediately() {
        let mut game = playing(5);
        let target = game.aliens[0].clone();
        // Two bullets on the same alien in the same tick: the second one
        // flies on because its target is already gone.
        for _ in 0..2 {
            game.player_bullets.push(Bullet {
                x: target.x + ALIEN_WIDTH / 2.0,
                y: target.y + ALIEN_HEIGHT + 2.0,
                dy: -BULLET_SPEED,
            });
        }
        game.move_bullets();
        assert!(!game.aliens[0].alive);
        assert_eq!(game.status().score, target.kind.points());
        assert_eq!(game.player_bullets.len(), 1);
    }

    #[test]
    fn shield_block_dies_after_three_hits() {
        let mut game = playing(6);
        let block = game.shields[0].clone();
        let total = game.shields.len();
        for _ in 0..SHIELD_HEALTH {
            game.alien_bullets.push(Bullet {
                x: block.x + 3.0,
                y: block.y - ALIEN_BULLET_SPEED - 1.0,
                dy: ALIEN_BULLET_SPEED,
            });
            game.move_bullets();
        }
        assert_eq!(game.shields.len(), total - 1);
    }

    #[test]
    fn alien_bullet_hit_costs_a_life() {
        let mut game = playing(7);
        game.alien_bullets.push(Bullet {
            x: game.player_x + PLAYER_WIDTH / 2.0,
            y: PLAYER_Y - 1.0,
            dy: ALIEN_BULLET_SPEED,
        });
        game.move_bullets();
        assert_eq!(game.status().lives, INITIAL_LIVES - 1);
        assert!(game.alien_bullets.is_empty());
    }

    #[test]
    fn formation_reaching_player_row_ends_session() {
        let mut game = playing(8);
        for alien in &mut game.aliens {
            alien.y += PLAYER_Y - ALIEN_HEIGHT - ALIEN_START_Y;
        }
        game.on_tick(TICK_MS);
        assert_eq!(game.status().phase, Phase::GameOver);
    }

    #[test]
    fn clearing_the_formation_advances_level() {
        let mut game = playing(9);
        for alien in &mut game.aliens {
            alien.alive = false;
        }
        game.on_tick(TICK_MS);
        let status = game.status();
        assert_eq!(status.level, 2);
        assert_eq!(status.phase, Phase::Playing);
        assert!(game.aliens.iter().all(|a| a.alive));
        assert!(game.alien_speed > INITIAL_ALIEN_SPEED);
        assert!(game.player_bullets.is_empty() && game.alien_bullets.is_empty());
    }

    #[test]
    fn fire_respects_cooldown() {
        let mut game = playing(10);
        game.step(false, false, true);
        game.step(false, false, true);
        assert_eq!(game.player_bullets.len(), 1);
        for _ in 0..FIRE_COOLDOWN_TICKS {
            game.step(false, false, false);
        }
        game.step(false, false, true);
        assert_eq!(game.player_bullets.len(), 2);
    }

    #[test]
    fn reset_restores_initial_configuration() {
        let mut game = playing(11);
        game.score.add(120, ScoreCause::AlienDestroyed);
        game.lives = 1;
        game.reset();
        let status = game.status();
        assert_eq!(status.phase, Phase::Menu);
        assert_eq!(status.score, 0);
        assert_eq!(status.lives, INITIAL_LIVES);
        assert_eq!(status.level, 1);
        assert_eq!(game.aliens.len(), ALIEN_ROWS * ALIEN_COLS);
    }
}
