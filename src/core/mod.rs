//! Core module - game state and controllers, independent of any transport

pub mod admin;
pub mod board;
pub mod color;
pub mod confetti;
pub mod constants;
pub mod countdown;
pub mod error;
pub mod format;
pub mod io_traits;
pub mod protocol;
pub mod reconnect;
pub mod revision;
pub mod spectator;

pub use admin::{AdminController, AdminState};
pub use board::{build_board, BoardCell, CellState};
pub use countdown::{Countdown, CountdownParts, CountdownTick};
pub use error::{AdminError, ApiError};
pub use io_traits::{AdminApi, ConnectionStatus, Notice, NoticeLevel, Notifier, PushChannel, PushEvent, SettingsSource};
pub use protocol::{Card, DrawOutcome, PushMessage, Settings, SettingsPatch, Winner};
pub use reconnect::{CloseKind, ReconnectPolicy};
pub use spectator::{Screen, SpectatorEvent, SpectatorState};
