//! Game constants - number range, timings, API paths, palette
//!
//! All magic numbers shared by the spectator view and the admin console.

use std::time::Duration;

// =============================================================================
// NUMBERS
// =============================================================================

/// Smallest value that can be drawn
pub const MIN_NUMBER: i32 = 1;

/// Largest value that can be drawn
pub const MAX_NUMBER: i32 = 75;

/// Cells on the drawn-numbers board
pub const BOARD_SIZE: usize = MAX_NUMBER as usize;

/// Values on a card
pub const CARD_SIZE: usize = 24;

// =============================================================================
// TIMINGS
// =============================================================================

/// Delay before reopening a closed push channel
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Countdown recomputation period
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// How long a freshly drawn number stays highlighted
pub const NUMBER_HIGHLIGHT: Duration = Duration::from_millis(500);

/// Particles in one confetti burst
pub const CONFETTI_COUNT: usize = 100;

/// Delay between two particle spawns
pub const CONFETTI_STAGGER: Duration = Duration::from_millis(30);

/// Time a particle stays on screen
pub const CONFETTI_LIFETIME: Duration = Duration::from_secs(3);

// =============================================================================
// HTTP API
// =============================================================================

pub const SETTINGS_PATH: &str = "/api/settings";
pub const CARDS_PATH: &str = "/api/cards";
pub const START_DRAWING_PATH: &str = "/api/start_drawing";
pub const DRAW_NUMBER_PATH: &str = "/api/draw_number";
pub const UPLOAD_PATH: &str = "/api/upload";

/// Default live-update endpoint
pub const PUSH_PATH: &str = "/ws";

/// Static location of the prize image
pub const PRIZE_IMAGE_DIR: &str = "/static/images";

/// Static location of sponsor logos
pub const SPONSOR_IMAGE_DIR: &str = "/static/images/sponsors";

// =============================================================================
// PALETTE
// =============================================================================

pub const DRAWN_CELL_COLOR: &str = "#2ECC71";
pub const PENDING_CELL_BACKGROUND: &str = "#ECF0F1";
pub const PENDING_CELL_TEXT: &str = "#7F8C8D";
pub const HIGHLIGHT_COLOR: &str = "#E74C3C";
pub const WINNER_COLOR: &str = "#F1C40F";

pub const CONFETTI_COLORS: [&str; 5] = ["#F1C40F", "#E74C3C", "#3498DB", "#2ECC71", "#9B59B6"];
