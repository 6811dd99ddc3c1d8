use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::clock::TickClock;
use crate::input::{Dir, Intent};
use crate::session::{GameSession, Phase, ScoreCause, ScoreEvent, ScoreLog, Status};

pub const GRID_WIDTH: i32 = 28;
pub const GRID_HEIGHT: i32 = 31;
/// The only row on which stepping off one edge re-enters on the other.
const TUNNEL_ROW: i32 = 14;

// The player moves every Nth host tick, ghosts every Mth with M > N, so
// ghosts are deliberately slower.
const PLAYER_TICK_DIV: u64 = 5;
const GHOST_TICK_DIV: u64 = 7;

const DOT_POINTS: u32 = 10;
const PELLET_POINTS: u32 = 50;
const GHOST_POINTS: u32 = 200;
const POWER_TICKS: u32 = 500;
/// How often a ghost picks the distance-driven move instead of a random
/// one. An inherited tuning constant, kept configurable.
const DEFAULT_CHASE_WEIGHT: f64 = 0.7;

const INITIAL_LIVES: u32 = 3;
const PLAYER_SPAWN: (i32, i32) = (14, 23);
const GHOST_HOME: (i32, i32) = (14, 14);

const TICK_MS: u64 = 16;

// '#' wall, '.' dot, 'o' power pellet, ' ' empty corridor.
#[rustfmt::skip]
const MAZE: [&str; GRID_HEIGHT as usize] = [
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.##### ## #####.######",
    "######.##### ## #####.######",
    "######.##          ##.######",
    "######.## ###  ### ##.######",
    "######.## #      # ##.######",
    "      .   #      #   .      ",
    "######.## #      # ##.######",
    "######.## ######## ##.######",
    "######.##          ##.######",
    "######.## ######## ##.######",
    "######.## ######## ##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#.####.#####.##.#####.####.#",
    "#o..##.......  .......##..o#",
    "###.##.##.########.##.##.###",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#.##########.##.##########.#",
    "#..........................#",
    "############################",
];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cell {
    Wall,
    Dot,
    Pellet,
    Empty,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GhostMode {
    Chase,
    Frightened,
}

#[derive(Clone, Debug)]
pub struct Ghost {
    pub pos: (i32, i32),
    pub dir: Dir,
    pub mode: GhostMode,
}

fn initial_ghosts() -> Vec<Ghost> {
    vec![
        Ghost { pos: (14, 11), dir: Dir::Right, mode: GhostMode::Chase },
        Ghost { pos: (13, 14), dir: Dir::Left, mode: GhostMode::Chase },
        Ghost { pos: (14, 14), dir: Dir::Down, mode: GhostMode::Chase },
        Ghost { pos: (15, 14), dir: Dir::Up, mode: GhostMode::Chase },
    ]
}

#[derive(Clone, Debug)]
pub struct PacManSnapshot {
    pub maze: Vec<Vec<Cell>>,
    pub player: (i32, i32),
    pub heading: Option<Dir>,
    pub ghosts: Vec<Ghost>,
    pub power_ticks: u32,
    pub dots_left: u32,
    pub status: Status,
}

pub struct PacMan {
    maze: Vec<Vec<Cell>>,
    dots_left: u32,
    player: (i32, i32),
    heading: Option<Dir>,
    buffered: Option<Dir>,
    ghosts: Vec<Ghost>,
    power_ticks: u32,
    tick_count: u64,
    lives: u32,
    level: u32,
    score: ScoreLog,
    chase_weight: f64,
    phase: Phase,
    clock: TickClock,
    rng: Pcg32,
    seed: u64,
}

fn parse_maze() -> (Vec<Vec<Cell>>, u32) {
    let mut dots = 0;
    let maze = MAZE
        .iter()
        .map(|row| {
            row.chars()
                .map(|ch| match ch {
                    '#' => Cell::Wall,
                    '.' => {
                        dots += 1;
                        Cell::Dot
                    }
                    'o' => {
                        dots += 1;
                        Cell::Pellet
                    }
                    _ => Cell::Empty,
                })
                .collect()
        })
        .collect();
    (maze, dots)
}

impl PacMan {
    pub fn new() -> Self {
        Self::with_seed(rand::thread_rng().gen())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_config(seed, DEFAULT_CHASE_WEIGHT)
    }

    pub fn with_config(seed: u64, chase_weight: f64) -> Self {
        let (maze, dots_left) = parse_maze();
        Self {
            maze,
            dots_left,
            player: PLAYER_SPAWN,
            heading: None,
            buffered: None,
            ghosts: initial_ghosts(),
            power_ticks: 0,
            tick_count: 0,
            lives: INITIAL_LIVES,
            level: 1,
            score: ScoreLog::default(),
            chase_weight,
            phase: Phase::Menu,
            clock: TickClock::new(TICK_MS),
            rng: Pcg32::seed_from_u64(seed),
            seed,
        }
    }

    pub fn snapshot(&self) -> PacManSnapshot {
        PacManSnapshot {
            maze: self.maze.clone(),
            player: self.player,
            heading: self.heading,
            ghosts: self.ghosts.clone(),
            power_ticks: self.power_ticks,
            dots_left: self.dots_left,
            status: self.status(),
        }
    }

    fn cell(&self, (x, y): (i32, i32)) -> Cell {
        if x < 0 || x >= GRID_WIDTH || y < 0 || y >= GRID_HEIGHT {
            return Cell::Wall;
        }
        self.maze[y as usize][x as usize]
    }

    /// Target of a step from `pos` toward `dir`, wrapping only on the
    /// tunnel row. None when the target is a wall or off the board.
    fn target(&self, pos: (i32, i32), dir: Dir) -> Option<(i32, i32)> {
        let (dx, dy) = dir.delta();
        let mut next = (pos.0 + dx, pos.1 + dy);
        if next.1 == TUNNEL_ROW {
            if next.0 < 0 {
                next.0 = GRID_WIDTH - 1;
            } else if next.0 >= GRID_WIDTH {
                next.0 = 0;
            }
        }
        (self.cell(next) != Cell::Wall).then_some(next)
    }

    fn step(&mut self) {
        self.tick_count += 1;

        // Counted down before any movement, so a pellet eaten this step
        // keeps its full countdown and reverts exactly POWER_TICKS
        // steps later.
        if self.power_ticks > 0 {
            self.power_ticks -= 1;
            if self.power_ticks == 0 {
                for ghost in &mut self.ghosts {
                    ghost.mode = GhostMode::Chase;
                }
            }
        }

        if self.tick_count % PLAYER_TICK_DIV == 0 {
            self.move_player();
            if self.phase != Phase::Playing {
                return;
            }
        }
        if self.tick_count % GHOST_TICK_DIV == 0 {
            self.move_ghosts();
        }

        self.resolve_ghost_contact();
    }

    fn move_player(&mut self) {
        // A buffered turn is taken as soon as its cell is traversable;
        // until then the current heading stands.
        if let Some(dir) = self.buffered {
            if self.target(self.player, dir).is_some() {
                self.heading = Some(dir);
                self.buffered = None;
            }
        }
        let Some(dir) = self.heading else { return };
        match self.target(self.player, dir) {
            Some(next) => self.player = next,
            None => {
                self.heading = None;
                return;
            }
        }

        match self.cell(self.player) {
            Cell::Dot => {
                self.set_cell(self.player, Cell::Empty);
                self.score.add(DOT_POINTS, ScoreCause::Dot);
                self.consume_dot();
            }
            Cell::Pellet => {
                self.set_cell(self.player, Cell::Empty);
                self.score.add(PELLET_POINTS, ScoreCause::PowerPellet);
                self.power_ticks = POWER_TICKS;
                for ghost in &mut self.ghosts {
                    ghost.mode = GhostMode::Frightened;
                }
                self.consume_dot();
            }
            _ => {}
        }
    }

    fn set_cell(&mut self, (x, y): (i32, i32), cell: Cell) {
        self.maze[y as usize][x as usize] = cell;
    }

    fn consume_dot(&mut self) {
        self.dots_left -= 1;
        if self.dots_left == 0 {
            self.advance_level();
        }
    }

    /// Fresh maze, actors back at spawn; score, lives and level survive.
    fn advance_level(&mut self) {
        self.level += 1;
        let (maze, dots) = parse_maze();
        self.maze = maze;
        self.dots_left = dots;
        self.player = PLAYER_SPAWN;
        self.heading = None;
        self.buffered = None;
        self.ghosts = initial_ghosts();
        self.power_ticks = 0;
    }

    fn move_ghosts(&mut self) {
        let player = self.player;
        for i in 0..self.ghosts.len() {
            let (pos, dir, mode) = {
                let g = &self.ghosts[i];
                (g.pos, g.dir, g.mode)
            };

            let candidates: Vec<Dir> = [Dir::Up, Dir::Down, Dir::Left, Dir::Right]
                .into_iter()
                .filter(|&d| d != dir.opposite() && self.target(pos, d).is_some())
                .collect();

            let chosen = if candidates.is_empty() {
                // Dead end: reversing is the one legal escape.
                dir.opposite()
            } else if self.rng.gen_bool(self.chase_weight) {
                // Distance-driven move: toward the player in chase mode,
                // away from the player when frightened.
                let key = |d: &Dir| {
                    let cell = self.target(pos, *d).unwrap_or(pos);
                    (cell.0 - player.0).abs() + (cell.1 - player.1).abs()
                };
                match mode {
                    GhostMode::Chase => {
                        candidates.iter().copied().min_by_key(key).unwrap_or(dir)
                    }
                    GhostMode::Frightened => {
                        candidates.iter().copied().max_by_key(key).unwrap_or(dir)
                    }
                }
            } else {
                candidates[self.rng.gen_range(0..candidates.len())]
            };

            let next = self.target(pos, chosen);
            let ghost = &mut self.ghosts[i];
            ghost.dir = chosen;
            if let Some(next) = next {
                ghost.pos = next;
            }
        }
    }

    /// A tick resolves a ghost meeting to exactly one outcome: a
    /// frightened ghost is eaten, a normal ghost costs a life and resets
    /// every actor; never both.
    fn resolve_ghost_contact(&mut self) {
        let player = self.player;
        if self
            .ghosts
            .iter()
            .any(|g| g.pos == player && g.mode == GhostMode::Chase)
        {
            self.lives = self.lives.saturating_sub(1);
            if self.lives == 0 {
                self.phase = Phase::GameOver;
                return;
            }
            self.player = PLAYER_SPAWN;
            self.heading = None;
            self.buffered = None;
            self.ghosts = initial_ghosts();
            return;
        }

        for ghost in &mut self.ghosts {
            if ghost.pos == player && ghost.mode == GhostMode::Frightened {
                self.score.add(GHOST_POINTS, ScoreCause::GhostEaten);
                ghost.pos = GHOST_HOME;
                ghost.mode = GhostMode::Chase;
            }
        }
    }

    #[cfg(test)]
    fn set_player(&mut self, pos: (i32, i32), heading: Option<Dir>) {
        self.player = pos;
        self.heading = heading;
    }
}

impl GameSession for PacMan {
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
        *self = PacMan::with_config(self.seed, self.chase_weight);
    }

    fn apply_input(&mut self, intent: Intent) {
        if self.phase != Phase::Playing {
            return;
        }
        if let Some(dir) = Dir::from_intent(intent) {
            self.buffered = Some(dir);
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
            lives: self.lives,
            level: self.level,
        }
    }

    fn drain_score_events(&mut self) -> Vec<ScoreEvent> {
        self.score.drain_events()
    }
}
