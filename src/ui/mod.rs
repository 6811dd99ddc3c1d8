pub mod games;
pub mod home;
pub mod tabs;

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::{App, Tab};
use crate::games::GameId;
use crate::session::{Phase, Status};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Content
        ])
        .split(frame.area());

    tabs::render_tabs(frame, app, chunks[0]);

    match app.current_tab {
        Tab::Home => home::render_home(frame, chunks[1], app),
        Tab::Game(GameId::Snake) => {
            games::render_snake(frame, chunks[1], &app.snake.snapshot(), app.high_scores.best(GameId::Snake))
        }
        Tab::Game(GameId::Tetris) => {
            games::render_tetris(frame, chunks[1], &app.tetris.snapshot(), app.high_scores.best(GameId::Tetris))
        }
        Tab::Game(GameId::Pong) => {
            games::render_pong(frame, chunks[1], &app.pong.snapshot(), app.high_scores.best(GameId::Pong))
        }
        Tab::Game(GameId::Breakout) => {
            games::render_breakout(frame, chunks[1], &app.breakout.snapshot(), app.high_scores.best(GameId::Breakout))
        }
        Tab::Game(GameId::Invaders) => {
            games::render_invaders(frame, chunks[1], &app.invaders.snapshot(), app.high_scores.best(GameId::Invaders))
        }
        Tab::Game(GameId::PacMan) => {
            games::render_pacman(frame, chunks[1], &app.pacman.snapshot(), app.high_scores.best(GameId::PacMan))
        }
    }
}

const FIELD_BG: Color = Color::Rgb(10, 10, 20);

/// Character-cell canvas shared by every game renderer. Games plot
/// into it and it collapses into styled lines at the end.
pub(crate) struct Canvas {
    w: usize,
    h: usize,
    cells: Vec<(char, Style)>,
}

impl Canvas {
    pub fn new(w: usize, h: usize) -> Self {
        Canvas {
            w,
            h,
            cells: vec![(' ', Style::default().bg(FIELD_BG)); w * h],
        }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Color) {
        self.set_styled(x, y, ch, Style::default().fg(fg).bg(FIELD_BG));
    }

    pub fn set_bold(&mut self, x: i32, y: i32, ch: char, fg: Color) {
        self.set_styled(
            x,
            y,
            ch,
            Style::default()
                .fg(fg)
                .bg(FIELD_BG)
                .add_modifier(Modifier::BOLD),
        );
    }

    pub fn set_styled(&mut self, x: i32, y: i32, ch: char, style: Style) {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h {
            return;
        }
        self.cells[y as usize * self.w + x as usize] = (ch, style);
    }

    pub fn hspan(&mut self, x0: i32, x1: i32, y: i32, ch: char, fg: Color) {
        for x in x0..=x1 {
            self.set(x, y, ch, fg);
        }
    }

    pub fn into_lines(self) -> Vec<Line<'static>> {
        if self.w == 0 {
            return Vec::new();
        }
        self.cells
            .chunks(self.w)
            .map(|row| {
                let spans: Vec<Span<'static>> = row
                    .iter()
                    .map(|&(ch, style)| Span::styled(String::from(ch), style))
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

/// Standard game frame: bordered block, one-line status bar, the field,
/// one-line footer. Returns the field area.
pub(crate) fn game_layout(
    frame: &mut Frame,
    area: Rect,
    title: &'static str,
    accent: Color,
) -> [Rect; 3] {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(accent))
        .title(title)
        .title_style(Style::default().fg(accent).add_modifier(Modifier::BOLD));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(inner);
    [chunks[0], chunks[1], chunks[2]]
}

pub(crate) fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    status: &Status,
    best: u32,
    extra: Vec<Span<'static>>,
) {
    let sep = || Span::styled(" │ ", Style::default().fg(Color::DarkGray));
    let mut spans = vec![
        Span::styled(
            format!(" Score: {} ", status.score),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        sep(),
        Span::styled(
            format!("Lives: {} ", "♥ ".repeat(status.lives as usize)),
            Style::default().fg(Color::Red),
        ),
        sep(),
        Span::styled(format!("Level: {} ", status.level), Style::default().fg(Color::Green)),
        sep(),
        Span::styled(format!("Best: {} ", best), Style::default().fg(Color::Cyan)),
    ];
    for span in extra {
        spans.push(sep());
        spans.push(span);
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Phase-sensitive footer: what to press, when.
pub(crate) fn render_footer(frame: &mut Frame, area: Rect, phase: Phase, help: &'static str) {
    let line = match phase {
        Phase::Menu => Line::from(vec![
            Span::styled(
                " Press SPACE to start ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("│ Esc Menu", Style::default().fg(Color::DarkGray)),
        ]),
        Phase::Paused => Line::from(Span::styled(
            " ⏸ PAUSED - Press P to resume ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Phase::GameOver => Line::from(vec![
            Span::styled(
                " 💀 GAME OVER! ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "Press ENTER for menu, Esc to leave",
                Style::default().fg(Color::Gray),
            ),
        ]),
        Phase::Playing => Line::from(Span::styled(help, Style::default().fg(Color::DarkGray))),
    };
    frame.render_widget(Paragraph::new(line), area);
}
