use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::clock::TickClock;
use crate::input::{Dir, DirQueue, Intent};
use crate::session::{GameSession, Phase, ScoreCause, ScoreEvent, ScoreLog, Status};

pub const GRID_SIZE: i32 = 20;
const INITIAL_HEAD: (i32, i32) = (10, 10);
const INITIAL_FOOD: (i32, i32) = (15, 15);
const INITIAL_HEADING: Dir = Dir::Up;
const FOOD_POINTS: u32 = 10;

// Step interval shrinks 10ms for every 50 points scored.
const BASE_STEP_MS: u64 = 150;
const STEP_MS_FLOOR: u64 = 60;
const SPEEDUP_POINTS: u32 = 50;
const SPEEDUP_MS: u64 = 10;

/// Read-only view for the renderer, committed after a step completes.
#[derive(Clone, Debug)]
pub struct SnakeSnapshot {
    pub body: Vec<(i32, i32)>,
    pub food: (i32, i32),
    pub status: Status,
}

pub struct Snake {
    body: Vec<(i32, i32)>, // head first
    heading: Dir,
    buffered: DirQueue,
    food: (i32, i32),
    food_eaten: u32,
    score: ScoreLog,
    phase: Phase,
    clock: TickClock,
    rng: Pcg32,
    seed: u64,
}

impl Snake {
    pub fn new() -> Self {
        Self::with_seed(rand::thread_rng().gen())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            body: vec![INITIAL_HEAD],
            heading: INITIAL_HEADING,
            buffered: DirQueue::default(),
            food: INITIAL_FOOD,
            food_eaten: 0,
            score: ScoreLog::default(),
            phase: Phase::Menu,
            clock: TickClock::new(BASE_STEP_MS),
            rng: Pcg32::seed_from_u64(seed),
            seed,
        }
    }

    pub fn snapshot(&self) -> SnakeSnapshot {
        SnakeSnapshot {
            body: self.body.clone(),
            food: self.food,
            status: self.status(),
        }
    }

    fn occupied(&self, cell: (i32, i32)) -> bool {
        self.body.contains(&cell)
    }

    /// Uniform choice among cells the snake does not occupy.
    fn place_food(&mut self) {
        let free = (GRID_SIZE * GRID_SIZE) as usize - self.body.len();
        if free == 0 {
            return; // board full, nothing to place
        }
        let mut pick = self.rng.gen_range(0..free);
        for y in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                if self.occupied((x, y)) {
                    continue;
                }
                if pick == 0 {
                    self.food = (x, y);
                    return;
                }
                pick -= 1;
            }
        }
    }

    fn step(&mut self) {
        if let Some(dir) = self.buffered.pop_valid(self.heading) {
            self.heading = dir;
        }

        let (dx, dy) = self.heading.delta();
        let head = (self.body[0].0 + dx, self.body[0].1 + dy);

        // Wall exit and self-intersection lose before food is considered.
        // The tail cell counts even though it is about to be vacated.
        if head.0 < 0 || head.0 >= GRID_SIZE || head.1 < 0 || head.1 >= GRID_SIZE {
            self.phase = Phase::GameOver;
            return;
        }
        if self.occupied(head) {
            self.phase = Phase::GameOver;
            return;
        }

        self.body.insert(0, head);
        if head == self.food {
            self.food_eaten += 1;
            self.score.add(FOOD_POINTS, ScoreCause::Food);
            self.place_food();
            self.retune_speed();
        } else {
            self.body.pop();
        }
    }

    fn retune_speed(&mut self) {
        let notches = (self.score.total() / SPEEDUP_POINTS) as u64;
        let interval = BASE_STEP_MS
            .saturating_sub(notches * SPEEDUP_MS)
            .max(STEP_MS_FLOOR);
        self.clock.set_interval(interval);
    }

    #[cfg(test)]
    fn set_body(&mut self, body: Vec<(i32, i32)>, heading: Dir) {
        self.body = body;
        self.heading = heading;
    }
}

impl GameSession for Snake {
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
        *self = Snake::with_seed(self.seed);
    }

    fn apply_input(&mut self, intent: Intent) {
        if self.phase != Phase::Playing {
            return;
        }
        if let Some(dir) = Dir::from_intent(intent) {
            self.buffered.push(dir);
        }
    }

    fn on_tick(&mut self, dt_ms: u64) {
        if self.phase != Phase::Playing {
            return;
        }
        let steps = self.clock.advance(dt_ms);
        for _ in 0..steps {
            self.step();
            if self.phase != Phase::Playing {
                break;
            }
        }
    }

    fn status(&self) -> Status {
        Status {
            phase: self.phase,
            score: self.score.total(),
            lives: 1,
            level: 1,
        }
    }

    fn drain_score_events(&mut self) -> Vec<ScoreEvent> {
        self.score.drain_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn playing(seed: u64) -> Snake {
        let mut game = Snake::with_seed(seed);
        game.start();
        game
    }

    /// Run exactly `n` logical steps.
    fn run_steps(game: &mut Snake, n: u32) {
        for _ in 0..n {
            game.on_tick(game.clock.interval());
        }
    }

    #[test]
    fn starts_in_menu_and_ignores_input_there() {
        let mut game = Snake::with_seed(1);
        assert_eq!(game.status().phase, Phase::Menu);
        game.apply_input(Intent::Left);
        game.on_tick(10_000);
        // Nothing moved: still the initial single segment.
        assert_eq!(game.snapshot().body, vec![INITIAL_HEAD]);
    }

    #[test]
    fn body_length_tracks_food_eaten() {
        let mut game = playing(7);
        // Walk into the food at (15,15) from (10,10): 5 right, 5 down.
        for _ in 0..5 {
            game.apply_input(Intent::Right);
            run_steps(&mut game, 1);
        }
        for _ in 0..5 {
            game.apply_input(Intent::Down);
            run_steps(&mut game, 1);
        }
        assert_eq!(game.status().score, FOOD_POINTS);
        assert_eq!(game.snapshot().body.len(), 2);
        assert_eq!(game.food_eaten + 1, game.snapshot().body.len() as u32);
        // The scoring rule left exactly one event behind.
        let events = game.score.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].delta, FOOD_POINTS);
        assert!(matches!(events[0].cause, ScoreCause::Food));
    }

    #[test]
    fn food_never_spawns_on_snake() {
        let mut game = playing(42);
        game.set_body(vec![(5, 5), (5, 6), (5, 7), (6, 7), (7, 7)], Dir::Up);
        for _ in 0..200 {
            game.place_food();
            assert!(!game.snapshot().body.contains(&game.snapshot().food));
        }
    }

    #[test]
    fn wall_exit_ends_session() {
        let mut game = playing(3);
        // Heading up from (10,10): 11 steps leave the grid.
        run_steps(&mut game, 11);
        assert_eq!(game.status().phase, Phase::GameOver);
    }

    #[test]
    fn head_into_body_ends_session() {
        let mut game = playing(9);
        game.set_body(vec![(5, 5), (5, 6), (6, 6), (6, 5)], Dir::Left);
        // Head at (5,5) heading left; turn down into (5,6), a body cell.
        game.apply_input(Intent::Down);
        run_steps(&mut game, 1);
        assert_eq!(game.status().phase, Phase::GameOver);
    }

    #[test]
    fn tail_cell_counts_for_collision() {
        let mut game = playing(11);
        // 2x2 loop: head (5,5) heading left, tail at (6,5). Turning down
        // then right would chase the tail; down into (5,6) is the body.
        game.set_body(vec![(5, 5), (6, 5), (6, 6), (5, 6)], Dir::Left);
        game.apply_input(Intent::Down);
        run_steps(&mut game, 1);
        assert_eq!(game.status().phase, Phase::GameOver);
    }

    #[test]
    fn reversal_input_is_ignored() {
        let mut game = playing(5);
        game.apply_input(Intent::Down); // opposite of initial Up
        run_steps(&mut game, 1);
        assert_eq!(game.snapshot().body[0], (10, 9));
        assert_eq!(game.status().phase, Phase::Playing);
    }

    #[test]
    fn speed_increases_with_score() {
        let mut game = playing(1);
        assert_eq!(game.clock.interval(), BASE_STEP_MS);
        for _ in 0..5 {
            game.score.add(FOOD_POINTS, ScoreCause::Food);
        }
        game.retune_speed();
        assert_eq!(game.clock.interval(), BASE_STEP_MS - SPEEDUP_MS);
    }

    #[test]
    fn pause_is_idempotent_and_freezes_motion() {
        let mut game = playing(2);
        game.pause();
        game.pause();
        assert_eq!(game.status().phase, Phase::Paused);
        game.on_tick(10_000);
        assert_eq!(game.snapshot().body[0], INITIAL_HEAD);
        game.resume();
        assert_eq!(game.status().phase, Phase::Playing);
    }

    #[test]
    fn reset_restores_initial_configuration() {
        let mut game = playing(8);
        run_steps(&mut game, 3);
        game.reset();
        assert_eq!(game.status().phase, Phase::Menu);
        assert_eq!(game.status().score, 0);
        assert_eq!(game.snapshot().body, vec![INITIAL_HEAD]);
        assert_eq!(game.snapshot().food, INITIAL_FOOD);
    }

    proptest! {
        /// Whatever inputs arrive, the snake never rests out of bounds.
        #[test]
        fn body_stays_in_bounds(seed in any::<u64>(), moves in proptest::collection::vec(0u8..4, 0..60)) {
            let mut game = playing(seed);
            for m in moves {
                let intent = match m {
                    0 => Intent::Up,
                    1 => Intent::Down,
                    2 => Intent::Left,
                    _ => Intent::Right,
                };
                game.apply_input(intent);
                game.on_tick(BASE_STEP_MS);
                for &(x, y) in &game.snapshot().body {
                    prop_assert!((0..GRID_SIZE).contains(&x) && (0..GRID_SIZE).contains(&y));
                }
            }
        }
    }
}
