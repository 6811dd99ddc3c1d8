use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::App;
use crate::games::GameId;

const TITLE: &str = r#"
 ██████╗ ███████╗████████╗██████╗  ██████╗      █████╗ ██████╗  ██████╗ █████╗ ██████╗ ███████╗
 ██╔══██╗██╔════╝╚══██╔══╝██╔══██╗██╔═══██╗    ██╔══██╗██╔══██╗██╔════╝██╔══██╗██╔══██╗██╔════╝
 ██████╔╝█████╗     ██║   ██████╔╝██║   ██║    ███████║██████╔╝██║     ███████║██║  ██║█████╗
 ██╔══██╗██╔══╝     ██║   ██╔══██╗██║   ██║    ██╔══██║██╔══██╗██║     ██╔══██║██║  ██║██╔══╝
 ██║  ██║███████╗   ██║   ██║  ██║╚██████╔╝    ██║  ██║██║  ██║╚██████╗██║  ██║██████╔╝███████╗
 ╚═╝  ╚═╝╚══════╝   ╚═╝   ╚═╝  ╚═╝ ╚═════╝     ╚═╝  ╚═╝╚═╝  ╚═╝ ╚═════╝╚═╝  ╚═╝╚═════╝ ╚══════╝"#;

struct GameTile {
    icon: &'static str,
    desc: &'static str,
    color: Color,
}

fn tile_for(id: GameId) -> GameTile {
    match id {
        GameId::Snake => GameTile {
            icon: "🐍",
            desc: "Eat, grow, don't bite yourself",
            color: Color::Rgb(80, 220, 80),
        },
        GameId::Tetris => GameTile {
            icon: "🟪",
            desc: "Stack falling pieces, clear lines",
            color: Color::Rgb(200, 120, 255),
        },
        GameId::Pong => GameTile {
            icon: "🏓",
            desc: "First to ten against the machine",
            color: Color::Rgb(100, 200, 255),
        },
        GameId::Breakout => GameTile {
            icon: "🧱",
            desc: "Smash every brick with the ball",
            color: Color::Rgb(220, 80, 80),
        },
        GameId::Invaders => GameTile {
            icon: "👾",
            desc: "Hold the line against the wave",
            color: Color::Rgb(80, 255, 80),
        },
        GameId::PacMan => GameTile {
            icon: "🟡",
            desc: "Clear the maze, dodge the ghosts",
            color: Color::Rgb(255, 220, 80),
        },
    }
}

pub fn render_home(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),  // banner
            Constraint::Min(8),     // tiles
            Constraint::Length(1),  // help
        ])
        .split(area);

    let banner = Paragraph::new(TITLE)
        .style(Style::default().fg(Color::Rgb(100, 200, 255)))
        .alignment(Alignment::Center);
    frame.render_widget(banner, chunks[0]);

    // Two rows of three tiles.
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    let games = GameId::all();
    for (row_idx, row_area) in rows.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(33),
                Constraint::Percentage(34),
                Constraint::Percentage(33),
            ])
            .split(*row_area);
        for (col_idx, col_area) in cols.iter().enumerate() {
            let idx = row_idx * 3 + col_idx;
            if idx < games.len() {
                render_tile(frame, *col_area, app, games[idx], idx);
            }
        }
    }

    let help = Paragraph::new(Line::from(vec![
        Span::styled(" ←→↑↓ Select ", Style::default().fg(Color::DarkGray)),
        Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
        Span::styled(
            "ENTER or 1-6 Play ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
        Span::styled("TAB Cycle ", Style::default().fg(Color::DarkGray)),
        Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
        Span::styled("Q Quit", Style::default().fg(Color::DarkGray)),
    ]));
    frame.render_widget(help, chunks[2]);
}

fn render_tile(frame: &mut Frame, area: Rect, app: &App, id: GameId, idx: usize) {
    let tile = tile_for(id);
    let selected = app.selected_game == idx;
    let border_color = if selected {
        Color::Rgb(255, 220, 80)
    } else {
        Color::Rgb(60, 60, 80)
    };
    let border_type = if selected {
        BorderType::Double
    } else {
        BorderType::Rounded
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let best = app.high_scores.best(id);
    let name_color = if selected { Color::White } else { tile.color };
    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!("[{}] ", idx + 1),
                Style::default()
                    .fg(Color::Rgb(255, 220, 80))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("{} ", tile.icon), Style::default()),
            Span::styled(
                id.name(),
                Style::default().fg(name_color).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(
            tile.desc,
            Style::default().fg(Color::Rgb(140, 140, 160)),
        )),
        Line::from(""),
        Line::from(Span::styled(
            if best > 0 {
                format!("🏆 Best: {}", best)
            } else {
                "No record yet".to_string()
            },
            Style::default().fg(Color::Cyan),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}
