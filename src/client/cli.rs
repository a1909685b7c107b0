//! Command-line interface: arguments, console notices and command dispatch

use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::info;

use super::config::{Config, ConfigError, ConfigOverrides};
use super::http::HttpApi;
use super::render::RenderOptions;
use super::spectator::{SpectatorApp, SpectatorError, SpectatorOptions};
use super::websocket::{push_url, PushClient};
use crate::core::admin::AdminController;
use crate::core::color::{fg, paint};
use crate::core::constants::{DRAWN_CELL_COLOR, HIGHLIGHT_COLOR, WINNER_COLOR};
use crate::core::error::{AdminError, ApiError};
use crate::core::format::format_numbers;
use crate::core::io_traits::{AdminApi, Notice, NoticeLevel, Notifier, SettingsSource};
use crate::core::protocol::{Card, Settings};

// =============================================================================
// ARGUMENTS
// =============================================================================

/// Live bingo spectator display and admin console
#[derive(Parser, Debug)]
#[command(name = "bingo-live")]
#[command(version)]
#[command(about = "Follow a live bingo draw or run it from the terminal")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the config file (defaults to ./bingo_live.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Bingo server base URL
    #[arg(long, env = "BINGO_SERVER_URL", global = true)]
    pub server: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable ANSI colours
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Answer yes to confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the live spectator display
    Spectate,

    /// Print the current game settings
    Settings,

    /// Manage bingo cards
    #[command(subcommand)]
    Cards(CardsCommand),

    /// Schedule the next draw (e.g. 2026-10-16T20:00)
    Countdown { datetime: String },

    /// Run the draw
    #[command(subcommand)]
    Draw(DrawCommand),

    /// Manage sponsor images
    #[command(subcommand)]
    Sponsors(SponsorsCommand),

    /// Manage the prize image
    #[command(subcommand)]
    Prize(PrizeCommand),
}

#[derive(Subcommand, Debug)]
pub enum CardsCommand {
    /// List registered cards
    List,
    /// Register a card
    Add {
        /// User-facing card label
        #[arg(long)]
        card_id: String,
        /// Player name
        #[arg(long)]
        name: String,
        /// 24 comma-separated numbers
        #[arg(long)]
        numbers: String,
    },
    /// Delete a card by its server id
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum DrawCommand {
    /// Start drawing
    Start,
    /// Draw the next number
    Next,
    /// Stop the draw and clear drawn numbers and winner
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum SponsorsCommand {
    /// Upload a sponsor logo
    Upload { path: PathBuf },
    /// Remove a sponsor logo by filename
    Remove { filename: String },
}

#[derive(Subcommand, Debug)]
pub enum PrizeCommand {
    /// Upload the prize image
    Upload { path: PathBuf },
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            server_url: self.server.clone(),
            no_color: self.no_color,
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Api(#[from] ApiError),

    /// Already reported to the operator through a notice
    #[error("{0}")]
    Admin(#[from] AdminError),

    #[error("{0}")]
    Spectator(#[from] SpectatorError),
}

impl CliError {
    /// True when a notice already told the operator what went wrong
    pub fn is_reported(&self) -> bool {
        matches!(self, CliError::Admin(_))
    }
}

// =============================================================================
// CONSOLE NOTIFIER
// =============================================================================

/// Prints notices to a writer and reads confirmations from a reader
pub struct ConsoleNotifier<R: BufRead, W: Write> {
    input: RefCell<R>,
    output: RefCell<W>,
    assume_yes: bool,
    color: bool,
}

impl ConsoleNotifier<io::StdinLock<'static>, io::Stderr> {
    pub fn stdio(assume_yes: bool, color: bool) -> Self {
        Self::new(io::stdin().lock(), io::stderr(), assume_yes, color)
    }
}

impl<R: BufRead, W: Write> ConsoleNotifier<R, W> {
    pub fn new(input: R, output: W, assume_yes: bool, color: bool) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
            assume_yes,
            color,
        }
    }

    pub fn into_output(self) -> W {
        self.output.into_inner()
    }
}

impl<R: BufRead, W: Write> Notifier for ConsoleNotifier<R, W> {
    fn notify(&self, notice: Notice) {
        let (tag, hex) = match notice.level {
            NoticeLevel::Success => ("OK", DRAWN_CELL_COLOR),
            NoticeLevel::Warning => ("WARN", WINNER_COLOR),
            NoticeLevel::Error => ("ERROR", HIGHLIGHT_COLOR),
        };
        let mut out = self.output.borrow_mut();
        let _ = writeln!(
            out,
            "{} {}: {}",
            paint(&format!("[{}]", tag), &fg(hex), self.color),
            notice.title,
            notice.message
        );
    }

    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        {
            let mut out = self.output.borrow_mut();
            let _ = write!(out, "{} [y/N] ", prompt);
            let _ = out.flush();
        }
        let mut answer = String::new();
        if self.input.borrow_mut().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Run the selected command against the configured server
pub fn run(args: Args, config: Config) -> Result<(), CliError> {
    info!(server = %config.server.url, command = ?args.command, "[cli] Starting");

    let api = HttpApi::new(&config.server.url, config.server.request_timeout())?;

    match args.command {
        Command::Spectate => spectate(api, &config),
        Command::Settings => {
            let settings = api.fetch_settings()?;
            print!("{}", describe_settings(&settings));
            Ok(())
        }
        command => {
            let notifier = ConsoleNotifier::stdio(args.yes, config.display.color);
            let mut admin = AdminController::new(api, notifier);
            admin.refresh()?;
            run_admin(&mut admin, command)
        }
    }
}

fn spectate(api: HttpApi, config: &Config) -> Result<(), CliError> {
    let url = push_url(&config.server.url, &config.server.push_path);
    let push = PushClient::new(url);
    let options = SpectatorOptions {
        render: RenderOptions {
            color: config.display.color,
            board_columns: config.display.board_columns,
        },
        resync_on_reconnect: config.spectator.resync_on_reconnect,
    };
    let mut app = SpectatorApp::new(api, push, io::stdout(), options);
    app.run(config.display.frame_interval())?;
    Ok(())
}

fn run_admin<A, N>(admin: &mut AdminController<A, N>, command: Command) -> Result<(), CliError>
where
    A: AdminApi,
    N: Notifier,
{
    match command {
        Command::Cards(CardsCommand::List) => {
            print!("{}", describe_cards(&admin.state().cards));
        }
        Command::Cards(CardsCommand::Add {
            card_id,
            name,
            numbers,
        }) => admin.submit_card(&card_id, &name, &numbers)?,
        Command::Cards(CardsCommand::Delete { id }) => admin.delete_card(id)?,
        Command::Countdown { datetime } => admin.set_countdown(&datetime)?,
        Command::Draw(DrawCommand::Start) => admin.start_drawing()?,
        Command::Draw(DrawCommand::Next) => {
            admin.draw_number()?;
        }
        Command::Draw(DrawCommand::Reset) => admin.reset_drawing()?,
        Command::Sponsors(SponsorsCommand::Upload { path }) => admin.upload_sponsor(&path)?,
        Command::Sponsors(SponsorsCommand::Remove { filename }) => {
            admin.remove_sponsor(&filename)?
        }
        Command::Prize(PrizeCommand::Upload { path }) => admin.upload_prize(&path)?,
        Command::Spectate | Command::Settings => {}
    }
    Ok(())
}

// =============================================================================
// TEXT OUTPUT
// =============================================================================

pub fn describe_settings(settings: &Settings) -> String {
    let mut lines = vec![
        format!(
            "Countdown:   {}",
            settings.countdown_time.as_deref().unwrap_or("not set")
        ),
        format!("Drawing:     {}", if settings.is_drawing { "yes" } else { "no" }),
        format!(
            "Drawn ({:>2}):  {}",
            settings.drawn_numbers.len(),
            format_numbers(&settings.drawn_numbers)
        ),
        format!(
            "Prize image: {}",
            settings.prize_image.as_deref().unwrap_or("none")
        ),
        format!("Sponsors:    {}", settings.sponsor_images.join(", ")),
    ];
    match (&settings.winner, settings.has_winner) {
        (Some(winner), _) => {
            lines.push(format!("Winner:      {} ({})", winner.name, winner.card_id));
        }
        (None, true) => lines.push("Winner:      yes".to_string()),
        (None, false) => {}
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

pub fn describe_cards(cards: &[Card]) -> String {
    if cards.is_empty() {
        return "No cards registered.\n".to_string();
    }
    let mut text = String::new();
    for card in cards {
        text.push_str(&format!(
            "{:>5}  {:<10} {:<20} {}{}\n",
            card.id,
            card.card_id,
            card.name,
            format_numbers(&card.numbers),
            if card.is_winner { "  WINNER" } else { "" }
        ));
    }
    text
}

// =============================================================================
// TESTS
// =============================================================================
