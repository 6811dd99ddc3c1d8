use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::games::breakout::{self, BreakoutSnapshot};
use crate::games::invaders::{self, AlienKind, InvadersSnapshot};
use crate::games::pacman::{self, Cell, GhostMode, PacManSnapshot};
use crate::games::pong::{self, PongSnapshot, Side};
use crate::games::snake::{self, SnakeSnapshot};
use crate::games::tetris::{PieceKind, TetrisSnapshot, BOARD_HEIGHT, BOARD_WIDTH};
use crate::input::Dir;

use super::{game_layout, render_footer, render_status_bar, Canvas};

// ── Snake ──────────────────────────────────────────────────────────

pub fn render_snake(frame: &mut Frame, area: Rect, snap: &SnakeSnapshot, best: u32) {
    let [status, field, footer] =
        game_layout(frame, area, " 🐍 Snake ", Color::Rgb(80, 220, 80));
    render_status_bar(
        frame,
        status,
        &snap.status,
        best,
        vec![Span::styled(
            format!("Length: {} ", snap.body.len()),
            Style::default().fg(Color::Green),
        )],
    );

    let mut canvas = Canvas::new(field.width as usize, field.height as usize);
    let sx = canvas.width() as f32 / snake::GRID_SIZE as f32;
    let sy = canvas.height() as f32 / snake::GRID_SIZE as f32;
    let cell_w = sx.floor().max(1.0) as i32;

    let (fx, fy) = ((snap.food.0 as f32 * sx) as i32, (snap.food.1 as f32 * sy) as i32);
    canvas.set_bold(fx, fy, '●', Color::Rgb(255, 90, 90));

    for (i, &(x, y)) in snap.body.iter().enumerate() {
        let (cx, cy) = ((x as f32 * sx) as i32, (y as f32 * sy) as i32);
        let color = if i == 0 {
            Color::Rgb(180, 255, 120)
        } else {
            Color::Rgb(60, 200, 60)
        };
        for dx in 0..cell_w {
            canvas.set_bold(cx + dx, cy, '█', color);
        }
    }
    frame.render_widget(Paragraph::new(canvas.into_lines()), field);

    render_footer(frame, footer, snap.status.phase, " ←↑↓→ Steer │ P Pause │ R Restart │ Esc Menu");
}

// ── Tetris ─────────────────────────────────────────────────────────

fn piece_color(kind: PieceKind) -> Color {
    match kind {
        PieceKind::I => Color::Rgb(0, 255, 255),
        PieceKind::O => Color::Rgb(255, 255, 0),
        PieceKind::T => Color::Rgb(180, 0, 200),
        PieceKind::S => Color::Rgb(0, 230, 0),
        PieceKind::Z => Color::Rgb(230, 0, 0),
        PieceKind::J => Color::Rgb(70, 70, 255),
        PieceKind::L => Color::Rgb(255, 165, 0),
    }
}

pub fn render_tetris(frame: &mut Frame, area: Rect, snap: &TetrisSnapshot, best: u32) {
    let [status, field, footer] =
        game_layout(frame, area, " 🟪 Tetris ", Color::Rgb(200, 120, 255));
    render_status_bar(
        frame,
        status,
        &snap.status,
        best,
        vec![Span::styled(
            format!("Lines: {} ", snap.lines),
            Style::default().fg(Color::Magenta),
        )],
    );

    // The well is two terminal cells per board cell, centered, with the
    // next-piece preview to its right.
    let well_w = (BOARD_WIDTH * 2) as i32;
    let mut canvas = Canvas::new(field.width as usize, field.height as usize);
    let x0 = ((field.width as i32 - well_w) / 2 - 6).max(0);
    let wall = Color::Rgb(90, 90, 120);
    for y in 0..BOARD_HEIGHT.min(field.height as i32) {
        canvas.set(x0, y, '│', wall);
        canvas.set(x0 + well_w + 1, y, '│', wall);
    }
    canvas.hspan(x0, x0 + well_w + 1, BOARD_HEIGHT, '─', wall);

    let put_cell = |canvas: &mut Canvas, x: i32, y: i32, kind: PieceKind, bold: bool| {
        let color = piece_color(kind);
        let cx = x0 + 1 + x * 2;
        if bold {
            canvas.set_bold(cx, y, '█', color);
            canvas.set_bold(cx + 1, y, '█', color);
        } else {
            canvas.set(cx, y, '█', color);
            canvas.set(cx + 1, y, '█', color);
        }
    };

    for (y, row) in snap.board.iter().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            if let Some(kind) = cell {
                put_cell(&mut canvas, x as i32, y as i32, *kind, false);
            }
        }
    }
    if let Some(piece) = &snap.piece {
        for (x, y) in piece.cells() {
            if y >= 0 {
                put_cell(&mut canvas, x, y, piece.kind, true);
            }
        }
    }

    // Next-piece preview.
    let px = x0 + well_w + 5;
    for (i, ch) in "Next".chars().enumerate() {
        canvas.set(px + i as i32, 1, ch, Color::Rgb(140, 140, 160));
    }
    let preview = crate::games::tetris::Piece::spawn(snap.next);
    for (x, y) in preview.cells() {
        let cx = px + (x - preview.x) * 2;
        canvas.set_bold(cx, 3 + y, '█', piece_color(snap.next));
        canvas.set_bold(cx + 1, 3 + y, '█', piece_color(snap.next));
    }

    frame.render_widget(Paragraph::new(canvas.into_lines()), field);
    render_footer(frame, footer, snap.status.phase, " ←→ Move │ ↑ Rotate │ ↓ Soft drop │ SPACE Hard drop │ P Pause │ Esc Menu");
}

// ── Pong ───────────────────────────────────────────────────────────

pub fn render_pong(frame: &mut Frame, area: Rect, snap: &PongSnapshot, best: u32) {
    let [status, field, footer] =
        game_layout(frame, area, " 🏓 Pong ", Color::Rgb(100, 200, 255));
    let winner = match snap.winner {
        Some(Side::Player) => "You win!",
        Some(Side::Ai) => "Machine wins",
        None => "",
    };
    render_status_bar(
        frame,
        status,
        &snap.status,
        best,
        vec![
            Span::styled(
                format!("You {} : {} CPU ", snap.player_score, snap.ai_score),
                Style::default()
                    .fg(Color::Rgb(100, 200, 255))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(winner, Style::default().fg(Color::Yellow)),
        ],
    );

    let mut canvas = Canvas::new(field.width as usize, field.height as usize);
    let sx = canvas.width() as f32 / pong::FIELD_WIDTH;
    let sy = canvas.height() as f32 / pong::FIELD_HEIGHT;

    let mid = canvas.width() as i32 / 2;
    for y in (0..canvas.height() as i32).step_by(2) {
        canvas.set(mid, y, '┆', Color::Rgb(50, 80, 100));
    }

    let paddle_rows = (pong::PADDLE_HEIGHT * sy).max(1.0) as i32;
    let px = (30.0 * sx) as i32;
    let ax = ((pong::FIELD_WIDTH - 30.0 - pong::PADDLE_WIDTH) * sx) as i32;
    for dy in 0..paddle_rows {
        canvas.set_bold(px, (snap.player_y * sy) as i32 + dy, '█', Color::Rgb(120, 220, 120));
        canvas.set_bold(ax, (snap.ai_y * sy) as i32 + dy, '█', Color::Rgb(220, 120, 120));
    }
    canvas.set_bold(
        (snap.ball.0 * sx) as i32,
        (snap.ball.1 * sy) as i32,
        '●',
        Color::White,
    );

    frame.render_widget(Paragraph::new(canvas.into_lines()), field);
    render_footer(frame, footer, snap.status.phase, " ↑↓ Move paddle │ P Pause │ R Restart │ Esc Menu");
}

// ── Breakout ───────────────────────────────────────────────────────

const BRICK_ROW_COLORS: [Color; breakout::BRICK_ROWS] = [
    Color::Rgb(220, 50, 50),
    Color::Rgb(220, 130, 30),
    Color::Rgb(220, 200, 30),
    Color::Rgb(50, 200, 50),
    Color::Rgb(50, 130, 220),
];

pub fn render_breakout(frame: &mut Frame, area: Rect, snap: &BreakoutSnapshot, best: u32) {
    let [status, field, footer] =
        game_layout(frame, area, " 🧱 Breakout ", Color::Rgb(220, 80, 80));
    let left = snap.bricks.iter().filter(|b| b.alive).count();
    render_status_bar(
        frame,
        status,
        &snap.status,
        best,
        vec![Span::styled(
            format!("Bricks: {}/{} ", left, snap.bricks.len()),
            Style::default().fg(Color::Green),
        )],
    );

    let mut canvas = Canvas::new(field.width as usize, field.height as usize);
    let sx = canvas.width() as f32 / breakout::FIELD_WIDTH;
    let sy = canvas.height() as f32 / breakout::FIELD_HEIGHT;

    for brick in snap.bricks.iter().filter(|b| b.alive) {
        let bx0 = (brick.x * sx) as i32;
        let bx1 = ((brick.x + breakout::BRICK_WIDTH) * sx) as i32 - 1;
        let by = (brick.y * sy) as i32;
        canvas.hspan(bx0, bx1.max(bx0), by, '▄', BRICK_ROW_COLORS[brick.row % BRICK_ROW_COLORS.len()]);
    }

    let pad_y = ((breakout::FIELD_HEIGHT - breakout::PADDLE_HEIGHT - 20.0) * sy) as i32;
    let px0 = (snap.paddle_x * sx) as i32;
    let px1 = ((snap.paddle_x + breakout::PADDLE_WIDTH) * sx) as i32 - 1;
    canvas.hspan(px0, px1.max(px0), pad_y, '═', Color::Rgb(180, 200, 255));

    canvas.set_bold((snap.ball.0 * sx) as i32, (snap.ball.1 * sy) as i32, '●', Color::White);

    frame.render_widget(Paragraph::new(canvas.into_lines()), field);
    render_footer(frame, footer, snap.status.phase, " ←→ Move paddle │ P Pause │ R Restart │ Esc Menu");
}

// ── Space Invaders ─────────────────────────────────────────────────

fn alien_glyph(kind: AlienKind) -> (char, Color) {
    match kind {
        AlienKind::Special => ('Ψ', Color::Rgb(255, 80, 255)),
        AlienKind::Medium => ('¥', Color::Rgb(255, 255, 100)),
        AlienKind::Basic => ('Ж', Color::Rgb(100, 255, 255)),
    }
}

pub fn render_invaders(frame: &mut Frame, area: Rect, snap: &InvadersSnapshot, best: u32) {
    let [status, field, footer] =
        game_layout(frame, area, " 👾 Invaders ", Color::Rgb(80, 255, 80));
    let alive = snap.aliens.iter().filter(|a| a.alive).count();
    render_status_bar(
        frame,
        status,
        &snap.status,
        best,
        vec![Span::styled(
            format!("Aliens: {} ", alive),
            Style::default().fg(Color::Rgb(255, 80, 80)),
        )],
    );

    let mut canvas = Canvas::new(field.width as usize, field.height as usize);
    let sx = canvas.width() as f32 / invaders::FIELD_WIDTH;
    let sy = canvas.height() as f32 / invaders::FIELD_HEIGHT;

    for alien in snap.aliens.iter().filter(|a| a.alive) {
        let (ch, color) = alien_glyph(alien.kind);
        canvas.set_bold((alien.x * sx) as i32, (alien.y * sy) as i32, ch, color);
    }

    for block in &snap.shields {
        let shade = match block.health {
            3 => '▓',
            2 => '▒',
            _ => '░',
        };
        canvas.set((block.x * sx) as i32, (block.y * sy) as i32, shade, Color::Rgb(40, 200, 40));
    }

    for bullet in &snap.player_bullets {
        canvas.set_bold((bullet.x * sx) as i32, (bullet.y * sy) as i32, '|', Color::Rgb(255, 255, 200));
    }
    for bullet in &snap.alien_bullets {
        canvas.set_bold((bullet.x * sx) as i32, (bullet.y * sy) as i32, '¡', Color::Rgb(255, 100, 100));
    }

    let py = ((invaders::FIELD_HEIGHT - 60.0) * sy) as i32;
    let px = ((snap.player_x + invaders::PLAYER_WIDTH / 2.0) * sx) as i32;
    canvas.set_bold(px, py, '▲', Color::Rgb(80, 255, 80));
    canvas.set_bold(px - 1, py, '◢', Color::Rgb(60, 200, 60));
    canvas.set_bold(px + 1, py, '◣', Color::Rgb(60, 200, 60));

    frame.render_widget(Paragraph::new(canvas.into_lines()), field);
    render_footer(frame, footer, snap.status.phase, " ←→ Move │ SPACE Fire │ P Pause │ R Restart │ Esc Menu");
}

// ── Pac-Man ────────────────────────────────────────────────────────

const GHOST_COLORS: [Color; 4] = [
    Color::Rgb(255, 60, 60),
    Color::Rgb(80, 255, 255),
    Color::Rgb(255, 184, 255),
    Color::Rgb(255, 184, 82),
];

pub fn render_pacman(frame: &mut Frame, area: Rect, snap: &PacManSnapshot, best: u32) {
    let [status, field, footer] =
        game_layout(frame, area, " 🟡 Pac-Man ", Color::Rgb(255, 220, 80));
    let power = if snap.power_ticks > 0 {
        format!("Power: {} ", snap.power_ticks)
    } else {
        String::new()
    };
    render_status_bar(
        frame,
        status,
        &snap.status,
        best,
        vec![
            Span::styled(
                format!("Dots: {} ", snap.dots_left),
                Style::default().fg(Color::White),
            ),
            Span::styled(power, Style::default().fg(Color::Rgb(100, 200, 255))),
        ],
    );

    // One terminal cell per maze cell, centered horizontally.
    let mut canvas = Canvas::new(field.width as usize, field.height as usize);
    let x0 = ((field.width as i32 - pacman::GRID_WIDTH) / 2).max(0);

    for (y, row) in snap.maze.iter().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            let (cx, cy) = (x0 + x as i32, y as i32);
            match cell {
                Cell::Wall => canvas.set(cx, cy, '█', Color::Rgb(40, 60, 200)),
                Cell::Dot => canvas.set(cx, cy, '·', Color::Rgb(255, 220, 180)),
                Cell::Pellet => canvas.set_bold(cx, cy, '●', Color::Rgb(255, 220, 180)),
                Cell::Empty => {}
            }
        }
    }

    for (i, ghost) in snap.ghosts.iter().enumerate() {
        let color = if ghost.mode == GhostMode::Frightened {
            Color::Rgb(60, 60, 255)
        } else {
            GHOST_COLORS[i % GHOST_COLORS.len()]
        };
        canvas.set_bold(x0 + ghost.pos.0, ghost.pos.1, 'ᗣ', color);
    }

    let mouth = match snap.heading {
        Some(Dir::Left) => 'ᗤ',
        Some(Dir::Up) => 'ᗢ',
        Some(Dir::Down) => 'ᗣ',
        _ => 'ᗧ',
    };
    canvas.set_bold(x0 + snap.player.0, snap.player.1, mouth, Color::Rgb(255, 255, 0));

    frame.render_widget(Paragraph::new(canvas.into_lines()), field);
    render_footer(frame, footer, snap.status.phase, " ←↑↓→ Move │ P Pause │ R Restart │ Esc Menu");
}
