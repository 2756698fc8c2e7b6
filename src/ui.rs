//! Terminal UI rendering with ratatui

use crate::board::{COL_COUNT, HIDDEN_ROW_COUNT, ROW_COUNT};
use crate::game::{ActivePiece, Game};
use crate::settings::Settings;
use crate::tetromino::PieceKind;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Total width needed: board(22) + side panel(18)
const GAME_WIDTH: u16 = 40;
/// Total height needed: 20 visible rows + 2 for borders
const GAME_HEIGHT: u16 = 22;

/// Render the playfield, the side panel and any state overlay
pub fn render_game(frame: &mut Frame, game: &Game, settings: &Settings, status: Option<&str>) {
    let area = frame.area();
    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);

    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(22), // Board (10*2 + 2 for borders)
            Constraint::Length(18), // Side panel
        ])
        .split(game_area);

    render_board(frame, main_layout[0], game, settings);

    let side_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),  // Next piece
            Constraint::Length(5),  // Stats
            Constraint::Min(8),     // Controls + status
        ])
        .split(main_layout[1]);

    render_next(frame, side_layout[0], game.next_piece(), settings);
    render_stats(frame, side_layout[1], game);
    render_help(frame, side_layout[2], settings, status);

    // State overlays
    if game.is_paused() {
        render_overlay(frame, area, "PAUSED", "Press P to resume");
    } else if game.is_new_game() {
        render_overlay(frame, area, "QUADFALL", "Press Enter to Play");
    } else if game.is_game_over() {
        render_overlay(frame, area, "GAME OVER", "Press Enter to Play Again");
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render the visible 20 rows of the board with the active and ghost pieces
fn render_board(frame: &mut Frame, area: Rect, game: &Game, settings: &Settings) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (filled, empty) = settings.visual.block_chars();
    let piece = game.active_piece();
    let ghost_row = if settings.visual.show_ghost {
        game.ghost_row()
    } else {
        None
    };

    let mut lines = Vec::with_capacity(ROW_COUNT - HIDDEN_ROW_COUNT);
    for row in HIDDEN_ROW_COUNT..ROW_COUNT {
        let mut spans = Vec::with_capacity(COL_COUNT);
        for col in 0..COL_COUNT {
            let span = match paint_cell(game, piece, ghost_row, col as i32, row as i32) {
                Paint::Block(color) => Span::styled(filled, Style::default().fg(color)),
                Paint::Ghost => Span::styled(filled, Style::default().fg(Color::DarkGray)),
                Paint::Empty => Span::styled(empty, Style::default().fg(Color::Indexed(236))),
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

enum Paint {
    Block(Color),
    Ghost,
    Empty,
}

/// What to draw in one board cell: locked tiles first, then the active
/// piece, then its ghost projection
fn paint_cell(
    game: &Game,
    piece: Option<ActivePiece>,
    ghost_row: Option<i32>,
    col: i32,
    row: i32,
) -> Paint {
    if let Some(kind) = game.board().tile(col as usize, row as usize) {
        return Paint::Block(kind.color());
    }
    if let Some(piece) = piece {
        if piece_covers(&piece, piece.row, col, row) {
            return Paint::Block(piece.kind.color());
        }
        if let Some(landing) = ghost_row {
            if piece_covers(&piece, landing, col, row) {
                return Paint::Ghost;
            }
        }
    }
    Paint::Empty
}

/// Whether the piece, with its origin at `at_row`, covers a board cell
fn piece_covers(piece: &ActivePiece, at_row: i32, col: i32, row: i32) -> bool {
    let shape = piece.kind.shape();
    let tile_col = col - piece.col;
    let tile_row = row - at_row;
    tile_col >= 0
        && tile_col < shape.dimension()
        && tile_row >= 0
        && tile_row < shape.dimension()
        && shape.occupied(piece.rotation, tile_col, tile_row)
}

/// Render the next piece preview box
fn render_next(frame: &mut Frame, area: Rect, next: Option<PieceKind>, settings: &Settings) {
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(kind) = next else { return };
    let (filled, _) = settings.visual.block_chars();
    let shape = kind.shape();

    let mut lines = vec![Line::raw("")];
    for row in 0..shape.dimension() {
        let mut spans = Vec::new();
        for col in 0..shape.dimension() {
            if shape.occupied(0, col, row) {
                spans.push(Span::styled(filled, Style::default().fg(kind.color())));
            } else {
                spans.push(Span::raw("  "));
            }
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        inner,
    );
}

/// Render score and level
fn render_stats(frame: &mut Frame, area: Rect, game: &Game) {
    let block = Block::default()
        .title(" STATS ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(vec![
            Span::styled("Score ", Style::default().fg(Color::Gray)),
            Span::styled(format!("{}", game.score()), Style::default().fg(Color::White).bold()),
        ]),
        Line::from(vec![
            Span::styled("Level ", Style::default().fg(Color::Gray)),
            Span::styled(format!("{}", game.level()), Style::default().fg(Color::White).bold()),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

/// Render the key help list plus a transient status message
fn render_help(frame: &mut Frame, area: Rect, settings: &Settings, status: Option<&str>) {
    let block = Block::default()
        .title(" KEYS ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let keys = &settings.keys;
    let entry = |label: &str, bindings: &[String]| {
        Line::from(vec![
            Span::styled(
                format!("{:<7}", label),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(bindings.join("/"), Style::default().fg(Color::White)),
        ])
    };

    let mut lines = vec![
        entry("Move", &[keys.move_left.join("/"), keys.move_right.join("/")]),
        entry("Rotate", &[keys.rotate_ccw.join("/"), keys.rotate_cw.join("/")]),
        entry("Drop", &keys.soft_drop),
        entry("Pause", &keys.pause),
        entry("Save", &keys.save),
        entry("Load", &keys.load),
        entry("Quit", &keys.quit),
    ];

    if let Some(message) = status {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            message.to_string(),
            Style::default().fg(Color::Yellow),
        ));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render a centered overlay box with a title and a subtitle
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let overlay = center_rect(area, 30, 5);
    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let lines = vec![
        Line::styled(title.to_string(), Style::default().fg(Color::White).bold()),
        Line::raw(""),
        Line::styled(subtitle.to_string(), Style::default().fg(Color::Gray)),
    ];
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        inner,
    );
}
