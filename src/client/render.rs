//! Terminal rendering of the spectator view
//!
//! `render_frame` is pure: the same state always produces the same text, so
//! redrawing the whole frame on every update is idempotent.

use std::time::Duration;

use crate::core::board::BoardCell;
use crate::core::color::{bg, fg, paint, BOLD};
use crate::core::confetti::ConfettiBurst;
use crate::core::constants::{
    BOARD_SIZE, DRAWN_CELL_COLOR, HIGHLIGHT_COLOR, PENDING_CELL_BACKGROUND, PENDING_CELL_TEXT,
    WINNER_COLOR,
};
use crate::core::countdown::CountdownParts;
use crate::core::format::{format_numbers, prize_image_path, sponsor_image_path};
use crate::core::io_traits::ConnectionStatus;
use crate::core::spectator::{Screen, SpectatorState};

/// Width of the confetti band in characters
const CONFETTI_WIDTH: usize = 60;

/// Height of the confetti band in lines
const CONFETTI_ROWS: usize = 4;

const CONFETTI_GLYPHS: [char; 4] = ['*', '+', 'o', '~'];

/// Clear the terminal and move the cursor home
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub color: bool,
    pub board_columns: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            color: false,
            board_columns: 15,
        }
    }
}

/// Everything a frame shows besides the mirror itself
pub struct FrameContext<'a> {
    pub state: &'a SpectatorState,
    pub status: ConnectionStatus,
    /// Last countdown value computed by a tick
    pub countdown: Option<CountdownParts>,
    /// The last drawn number is still highlighted
    pub highlight: bool,
    /// Active burst and time since it started
    pub confetti: Option<(&'a ConfettiBurst, Duration)>,
}

pub fn render_frame(ctx: &FrameContext<'_>, options: &RenderOptions) -> String {
    let mut lines = Vec::new();
    let settings = ctx.state.settings();

    lines.push(format!(
        "{}   {}",
        paint("BINGO LIVE", BOLD, options.color),
        status_badge(ctx.status, options.color)
    ));

    if !settings.sponsor_images.is_empty() {
        let sponsors: Vec<String> = settings
            .sponsor_images
            .iter()
            .map(|s| sponsor_image_path(s))
            .collect();
        lines.push(format!("Sponsors: {}", sponsors.join("  ")));
    }
    if let Some(prize) = settings.prize_image.as_deref().filter(|p| !p.is_empty()) {
        lines.push(format!("Prize: {}", prize_image_path(prize)));
    }
    lines.push(String::new());

    match ctx.state.current_screen() {
        Screen::Waiting => render_waiting(ctx, &mut lines),
        Screen::Drawing => render_drawing(ctx, options, &mut lines),
        Screen::Winner => render_winner(ctx, options, &mut lines),
    }

    let mut frame = lines.join("\n");
    frame.push('\n');
    frame
}

fn status_badge(status: ConnectionStatus, color: bool) -> String {
    let (label, hex) = match status {
        ConnectionStatus::Connected => ("live", DRAWN_CELL_COLOR),
        ConnectionStatus::Connecting => ("connecting", WINNER_COLOR),
        ConnectionStatus::Reconnecting => ("reconnecting", WINNER_COLOR),
        ConnectionStatus::Disconnected => ("offline", HIGHLIGHT_COLOR),
    };
    format!("{} {}", paint("●", &fg(hex), color), label)
}

fn render_waiting(ctx: &FrameContext<'_>, lines: &mut Vec<String>) {
    lines.push("Waiting for the draw to start".to_string());
    match (&ctx.countdown, ctx.state.countdown()) {
        (Some(parts), Some(_)) => lines.push(format!("Next draw in {}", parts)),
        (_, Some(countdown)) => {
            lines.push(format!(
                "Next draw at {}",
                countdown.end_time().format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
        (_, None) if ctx.state.settings().countdown_time.is_some() => {
            lines.push("The draw is about to begin".to_string());
        }
        _ => lines.push("No draw scheduled yet".to_string()),
    }
}

fn render_drawing(ctx: &FrameContext<'_>, options: &RenderOptions, lines: &mut Vec<String>) {
    let last = match ctx.state.last_number().or_else(|| ctx.state.drawn_numbers().last().copied()) {
        Some(number) => {
            let text = format!("{:>2}", number);
            if ctx.highlight {
                paint(&text, &format!("{}{}", BOLD, fg(HIGHLIGHT_COLOR)), options.color)
            } else {
                paint(&text, BOLD, options.color)
            }
        }
        None => "--".to_string(),
    };
    lines.push(format!("Last number: {}", last));
    lines.push(String::new());
    lines.extend(render_board(&ctx.state.board(), options));
    lines.push(String::new());
    lines.push(format!(
        "Drawn: {}/{}",
        ctx.state.drawn_numbers().len(),
        BOARD_SIZE
    ));
}

fn render_winner(ctx: &FrameContext<'_>, options: &RenderOptions, lines: &mut Vec<String>) {
    if let Some((burst, elapsed)) = ctx.confetti {
        lines.extend(render_confetti(burst, elapsed, options.color));
    }
    lines.push(paint(
        "WE HAVE A WINNER!",
        &format!("{}{}", BOLD, fg(WINNER_COLOR)),
        options.color,
    ));
    match ctx.state.winner() {
        Some(winner) => {
            lines.push(format!("Card ID: {}", winner.card_id));
            lines.push(format!("Name: {}", winner.name));
            lines.push(format!("Numbers: {}", format_numbers(&winner.numbers)));
        }
        None => lines.push("Winner details unavailable".to_string()),
    }
}

/// Board rows, `board_columns` cells per row
pub fn render_board(cells: &[BoardCell], options: &RenderOptions) -> Vec<String> {
    let drawn_style = format!("{}{}", BOLD, fg(DRAWN_CELL_COLOR));
    let pending_style = format!("{}{}", bg(PENDING_CELL_BACKGROUND), fg(PENDING_CELL_TEXT));

    cells
        .chunks(options.board_columns.max(1))
        .map(|row| {
            row.iter()
                .map(|cell| {
                    if cell.is_drawn() {
                        paint(&format!("[{:>2}]", cell.value), &drawn_style, options.color)
                    } else {
                        paint(&format!(" {:>2} ", cell.value), &pending_style, options.color)
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Falling particles, one band of `CONFETTI_ROWS` lines
pub fn render_confetti(burst: &ConfettiBurst, elapsed: Duration, color: bool) -> Vec<String> {
    let mut grid: Vec<Vec<Option<(char, &'static str)>>> =
        vec![vec![None; CONFETTI_WIDTH]; CONFETTI_ROWS];

    for (particle, progress) in burst.visible(elapsed) {
        let row = ((progress * CONFETTI_ROWS as f32) as usize).min(CONFETTI_ROWS - 1);
        let col = ((particle.left / 100.0 * CONFETTI_WIDTH as f32) as usize).min(CONFETTI_WIDTH - 1);
        let glyph = CONFETTI_GLYPHS[(particle.rotation / 90.0) as usize % CONFETTI_GLYPHS.len()];
        grid[row][col] = Some((glyph, particle.color));
    }

    grid.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|slot| match slot {
                    Some((glyph, hex)) => paint(&glyph.to_string(), &fg(hex), color),
                    None => " ".to_string(),
                })
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
