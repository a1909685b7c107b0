// Bingo Live - spectator display and admin client for a live bingo game

pub mod client;
pub mod core;
