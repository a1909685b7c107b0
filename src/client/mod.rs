//! Client module - terminal front ends and server transports
//!
//! This module contains the I/O side of the crate:
//! - Configuration loading and logging setup
//! - HTTP API client and push-channel WebSocket client
//! - Spectator display loop and terminal rendering
//! - Command-line interface

pub mod cli;
pub mod config;
pub mod http;
pub mod logging;
pub mod render;
pub mod spectator;
pub mod websocket;

pub use config::Config;
pub use http::HttpApi;
pub use spectator::SpectatorApp;
pub use websocket::PushClient;
