use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::clock::TickClock;
use crate::input::{InputSnapshot, Intent, IntentBuffer};
use crate::session::{GameSession, Phase, ScoreCause, ScoreEvent, ScoreLog, Status};

pub const BOARD_WIDTH: i32 = 10;
pub const BOARD_HEIGHT: i32 = 20;

const INITIAL_GRAVITY_MS: u64 = 800;
const GRAVITY_STEP_MS: u64 = 50;
const GRAVITY_FLOOR_MS: u64 = 50;
const LINES_PER_LEVEL: u32 = 10;
// Classic non-linear table, scaled by level.
const LINE_POINTS: [u32; 5] = [0, 40, 100, 300, 1200];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

const ALL_KINDS: [PieceKind; 7] = [
    PieceKind::I,
    PieceKind::O,
    PieceKind::T,
    PieceKind::S,
    PieceKind::Z,
    PieceKind::J,
    PieceKind::L,
];

impl PieceKind {
    fn shape(self) -> Vec<Vec<u8>> {
        match self {
            PieceKind::I => vec![vec![1, 1, 1, 1]],
            PieceKind::O => vec![vec![1, 1], vec![1, 1]],
            PieceKind::T => vec![vec![0, 1, 0], vec![1, 1, 1]],
            PieceKind::S => vec![vec![0, 1, 1], vec![1, 1, 0]],
            PieceKind::Z => vec![vec![1, 1, 0], vec![0, 1, 1]],
            PieceKind::J => vec![vec![1, 0, 0], vec![1, 1, 1]],
            PieceKind::L => vec![vec![0, 0, 1], vec![1, 1, 1]],
        }
    }
}

#[derive(Clone, Debug)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: Vec<Vec<u8>>,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    pub fn spawn(kind: PieceKind) -> Self {
        let shape = kind.shape();
        let x = BOARD_WIDTH / 2 - shape[0].len() as i32 / 2;
        Piece { kind, shape, x, y: 0 }
    }

    /// Clockwise rotation: transpose, then reverse each row.
    fn rotated(&self) -> Piece {
        let rows = self.shape.len();
        let cols = self.shape[0].len();
        let mut shape = vec![vec![0u8; rows]; cols];
        for (y, row) in self.shape.iter().enumerate() {
            for (x, &cell) in row.iter().enumerate() {
                shape[x][rows - 1 - y] = cell;
            }
        }
        Piece {
            kind: self.kind,
            shape,
            x: self.x,
            y: self.y,
        }
    }

    /// Board cells this piece covers (may include y < 0 above the top).
    pub fn cells(&self) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for (y, row) in self.shape.iter().enumerate() {
            for (x, &cell) in row.iter().enumerate() {
                if cell != 0 {
                    out.push((self.x + x as i32, self.y + y as i32));
                }
            }
        }
        out
    }
}

pub type Board = Vec<Vec<Option<PieceKind>>>;

#[derive(Clone, Debug)]
pub struct TetrisSnapshot {
    pub board: Board,
    pub piece: Option<Piece>,
    pub next: PieceKind,
    pub lines: u32,
    pub status: Status,
}

pub struct Tetris {
    board: Board,
    piece: Option<Piece>,
    next: PieceKind,
    lines: u32,
    level: u32,
    score: ScoreLog,
    phase: Phase,
    gravity: TickClock,
    input: IntentBuffer,
    rng: Pcg32,
    seed: u64,
}

impl Tetris {
    pub fn new() -> Self {
        Self::with_seed(rand::thread_rng().gen())
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let next = ALL_KINDS[rng.gen_range(0..ALL_KINDS.len())];
        Self {
            board: vec![vec![None; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
            piece: None,
            next,
            lines: 0,
            level: 1,
            score: ScoreLog::default(),
            phase: Phase::Menu,
            gravity: TickClock::new(INITIAL_GRAVITY_MS),
            input: IntentBuffer::default(),
            rng,
            seed,
        }
    }

    pub fn snapshot(&self) -> TetrisSnapshot {
        TetrisSnapshot {
            board: self.board.clone(),
            piece: self.piece.clone(),
            next: self.next,
            lines: self.lines,
            status: self.status(),
        }
    }

    fn collides(&self, piece: &Piece) -> bool {
        for (x, y) in piece.cells() {
            if x < 0 || x >= BOARD_WIDTH || y >= BOARD_HEIGHT {
                return true;
            }
            if y >= 0 && self.board[y as usize][x as usize].is_some() {
                return true;
            }
        }
        false
    }

    /// Spawn the previewed piece. Overlap with settled cells is the
    /// terminal condition.
    fn spawn_piece(&mut self) {
        let piece = Piece::spawn(self.next);
        self.next = ALL_KINDS[self.rng.gen_range(0..ALL_KINDS.len())];
        if self.collides(&piece) {
            self.piece = Some(piece);
            self.phase = Phase::GameOver;
        } else {
            self.piece = Some(piece);
        }
    }

    /// Try to translate the active piece. Returns false (state
    /// unchanged) if the result would collide.
    fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        let Some(piece) = &self.piece else { return false };
        let mut moved = piece.clone();
        moved.x += dx;
        moved.y += dy;
        if self.collides(&moved) {
            return false;
        }
        self.piece = Some(moved);
        true
    }

    fn try_rotate(&mut self) {
        let Some(piece) = &self.piece else { return };
        let rotated = piece.rotated();
        if !self.collides(&rotated) {
            self.piece = Some(rotated);
        }
    }

    /// One gravity step: move down or lock, clear, score, respawn.
    fn gravity_step(&mut self) {
        if self.piece.is_none() {
            self.spawn_piece();
            return;
        }
        if self.try_move(0, 1) {
            return;
        }
        self.lock_piece();
    }

    fn lock_piece(&mut self) {
        let Some(piece) = self.piece.take() else { return };
        for (x, y) in piece.cells() {
            if y >= 0 {
                self.board[y as usize][x as usize] = Some(piece.kind);
            }
        }
        self.clear_lines();
        if self.phase == Phase::Playing {
            self.spawn_piece();
        }
    }

    /// Single pass: drop every full row, shift the rest down.
    fn clear_lines(&mut self) {
        let before = self.board.len();
        self.board.retain(|row| row.iter().any(|cell| cell.is_none()));
        let cleared = (before - self.board.len()) as u32;
        while self.board.len() < BOARD_HEIGHT as usize {
            self.board.insert(0, vec![None; BOARD_WIDTH as usize]);
        }
        if cleared == 0 {
            return;
        }
        self.score.add(
            LINE_POINTS[cleared as usize] * self.level,
            ScoreCause::LineClear { lines: cleared },
        );
        self.lines += cleared;
        let level = self.lines / LINES_PER_LEVEL + 1;
        if level > self.level {
            self.level = level;
            let interval = INITIAL_GRAVITY_MS
                .saturating_sub((self.level as u64 - 1) * GRAVITY_STEP_MS)
                .max(GRAVITY_FLOOR_MS);
            self.gravity.set_interval(interval);
        }
    }

    fn hard_drop(&mut self) {
        while self.try_move(0, 1) {}
        self.lock_piece();
        self.gravity.reset();
    }

    fn handle_snapshot(&mut self, snap: InputSnapshot) {
        if snap.left {
            self.try_move(-1, 0);
        }
        if snap.right {
            self.try_move(1, 0);
        }
        if snap.up {
            self.try_rotate();
        }
        if snap.down {
            // Soft drop: force one gravity step now.
            self.gravity_step();
            self.gravity.reset();
        }
        if snap.action && self.phase == Phase::Playing {
            self.hard_drop();
        }
    }

    #[cfg(test)]
    fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[cfg(test)]
    fn force_level(&mut self, level: u32) {
        self.level = level;
    }
}

impl GameSession for Tetris {
    fn start(&mut self) {
        if self.phase == Phase::Menu {
            self.phase = Phase::Playing;
            self.gravity.reset();
            self.spawn_piece();
        }
    }

    fn pause(&mut self) {
        if self.phase == Phase::Playing {
            self.phase = Phase::Paused;
            self.gravity.pause();
        }
    }

    fn resume(&mut self) {
        if self.phase == Phase::Paused {
            self.phase = Phase::Playing;
            self.gravity.resume();
        }
    }

    fn reset(&mut self) {
        *self = Tetris::with_seed(self.seed);
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
        self.handle_snapshot(snap);
        if self.phase != Phase::Playing {
            return;
        }
        let steps = self.gravity.advance(dt_ms);
        for _ in 0..steps {
            self.gravity_step();
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

    fn playing(seed: u64) -> Tetris {
        let mut game = Tetris::with_seed(seed);
        game.start();
        game
    }

    /// Fill a board row except for the given gap columns.
    fn fill_row(game: &mut Tetris, y: usize, gaps: &[usize]) {
        for x in 0..BOARD_WIDTH as usize {
            if !gaps.contains(&x) {
                game.board_mut()[y][x] = Some(PieceKind::O);
            }
        }
    }

    #[test]
    fn rotation_is_transpose_reverse() {
        let piece = Piece::spawn(PieceKind::T); // [0,1,0] / [1,1,1]
        let rotated = piece.rotated();
        assert_eq!(rotated.shape, vec![vec![1, 0], vec![1, 1], vec![1, 0]]);
        // Four rotations come back around.
        let full = rotated.rotated().rotated().rotated();
        assert_eq!(full.shape, piece.shape);
    }

    #[test]
    fn piece_spawns_centered_at_top() {
        let piece = Piece::spawn(PieceKind::I);
        assert_eq!(piece.y, 0);
        assert_eq!(piece.x, BOARD_WIDTH / 2 - 2);
    }

    #[test]
    fn lateral_move_into_wall_is_rejected() {
        let mut game = playing(1);
        for _ in 0..BOARD_WIDTH {
            game.try_move(-1, 0);
        }
        let piece = game.snapshot().piece.unwrap();
        assert!(piece.cells().iter().all(|&(x, _)| x >= 0));
        // One more rejected move changes nothing.
        let before = game.snapshot().piece.unwrap().x;
        game.try_move(-1, 0);
        assert_eq!(game.snapshot().piece.unwrap().x, before);
    }

    #[test]
    fn clearing_two_rows_at_level_three_scores_300() {
        let mut game = playing(2);
        game.force_level(3);
        fill_row(&mut game, 18, &[]);
        fill_row(&mut game, 19, &[]);
        game.clear_lines();
        assert_eq!(game.status().score, 100 * 3);
        assert_eq!(game.lines, 2);
        let events = game.score.events();
        assert!(matches!(
            events.last().copied(),
            Some(ScoreEvent { delta: 300, cause: ScoreCause::LineClear { lines: 2 } })
        ));
    }

    #[test]
    fn tetris_at_level_one_scores_1200() {
        let mut game = playing(3);
        for y in 16..20 {
            fill_row(&mut game, y, &[]);
        }
        game.clear_lines();
        assert_eq!(game.status().score, 1200);
    }

    #[test]
    fn cleared_rows_shift_the_stack_down() {
        let mut game = playing(4);
        game.board_mut()[17][3] = Some(PieceKind::L);
        fill_row(&mut game, 18, &[]);
        fill_row(&mut game, 19, &[5]);
        game.clear_lines();
        // Row 18 cleared; the lone cell fell one row, the gapped row stayed.
        assert_eq!(game.board[18][3], Some(PieceKind::L));
        assert!(game.board[19][5].is_none());
        assert!(game.board[19][0].is_some());
    }

    #[test]
    fn level_up_every_ten_lines_speeds_gravity() {
        let mut game = playing(5);
        game.lines = 8;
        fill_row(&mut game, 18, &[]);
        fill_row(&mut game, 19, &[]);
        game.clear_lines();
        assert_eq!(game.status().level, 2);
        assert_eq!(game.gravity.interval(), INITIAL_GRAVITY_MS - GRAVITY_STEP_MS);
    }

    #[test]
    fn spawn_collision_ends_session() {
        let mut game = Tetris::with_seed(6);
        // Occupy the whole spawn band before starting.
        for y in 0..2 {
            fill_row(&mut game, y, &[]);
        }
        game.start();
        assert_eq!(game.status().phase, Phase::GameOver);
    }

    #[test]
    fn hard_drop_locks_in_same_tick() {
        let mut game = playing(7);
        game.apply_input(Intent::Action);
        game.on_tick(0);
        // The piece locked somewhere on the floor and a new one spawned at the top.
        let snap = game.snapshot();
        assert!(snap.board[19].iter().any(|c| c.is_some()));
        assert_eq!(snap.piece.unwrap().y, 0);
    }

    #[test]
    fn gravity_lands_and_respawns() {
        let mut game = playing(8);
        // Enough steps for any piece to fall and lock at least once.
        for _ in 0..25 {
            game.on_tick(INITIAL_GRAVITY_MS);
        }
        assert!(game.board.iter().flatten().any(|c| c.is_some()));
    }

    #[test]
    fn pause_freezes_gravity() {
        let mut game = playing(9);
        let y_before = game.snapshot().piece.unwrap().y;
        game.pause();
        game.pause();
        game.on_tick(10 * INITIAL_GRAVITY_MS);
        assert_eq!(game.snapshot().piece.unwrap().y, y_before);
        game.resume();
        game.on_tick(INITIAL_GRAVITY_MS);
        assert_eq!(game.snapshot().piece.unwrap().y, y_before + 1);
    }

    #[test]
    fn reset_restores_initial_configuration() {
        let mut game = playing(10);
        game.on_tick(INITIAL_GRAVITY_MS * 4);
        game.reset();
        assert_eq!(game.status().phase, Phase::Menu);
        assert_eq!(game.status().score, 0);
        assert_eq!(game.status().level, 1);
        assert!(game.snapshot().piece.is_none());
        assert!(game.snapshot().board.iter().flatten().all(|c| c.is_none()));
    }

    #[test]
    fn no_input_sequence_reaches_game_over_from_menu() {
        let mut game = Tetris::with_seed(11);
        for intent in [Intent::Left, Intent::Right, Intent::Up, Intent::Down, Intent::Action] {
            game.apply_input(intent);
        }
        game.on_tick(100_000);
        assert_eq!(game.status().phase, Phase::Menu);
    }
}
