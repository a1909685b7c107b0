//! Color utilities
//!
//! Hex palette entries turned into ANSI true-colour escape sequences for the
//! terminal spectator view.

/// Reset all terminal attributes
pub const RESET: &str = "\x1b[0m";

/// Bold text
pub const BOLD: &str = "\x1b[1m";

/// Parse hex color "#RRGGBB" to an `(r, g, b)` triple
///
/// Falls back to white if the hex string is invalid.
///
/// # Examples
///
/// ```
/// use bingo_live::core::color::parse_hex_color;
///
/// assert_eq!(parse_hex_color("#2ECC71"), (0x2E, 0xCC, 0x71));
/// assert_eq!(parse_hex_color("nope"), (255, 255, 255));
/// ```
pub fn parse_hex_color(hex: &str) -> (u8, u8, u8) {
    let hex = hex.trim_start_matches('#');
    if hex.len() < 6 || !hex.is_char_boundary(6) {
        return (255, 255, 255);
    }
    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(255);
    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(255);
    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(255);
    (r, g, b)
}

/// Foreground escape for a hex color
pub fn fg(hex: &str) -> String {
    let (r, g, b) = parse_hex_color(hex);
    format!("\x1b[38;2;{};{};{}m", r, g, b)
}

/// Background escape for a hex color
pub fn bg(hex: &str) -> String {
    let (r, g, b) = parse_hex_color(hex);
    format!("\x1b[48;2;{};{};{}m", r, g, b)
}

/// Wrap `text` in the given escape when colours are enabled
pub fn paint(text: &str, escape: &str, enabled: bool) -> String {
    if enabled {
        format!("{}{}{}", escape, text, RESET)
    } else {
        text.to_string()
    }
}
