//! Spectator state - mirror of the server settings and screen state machine
//!
//! `SpectatorState` is the single owner of the settings mirror. It changes
//! only through the transitions below, each of which reports what happened
//! as a list of `SpectatorEvent`s for the renderer.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::board::{build_board, is_valid_number, BoardCell};
use super::countdown::{Countdown, CountdownTick};
use super::format::parse_countdown_time;
use super::protocol::{PushMessage, Settings, Winner};
use super::revision::{FetchTicket, RevisionClock};

// =============================================================================
// SCREENS
// =============================================================================

/// The three mutually exclusive presentation screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Waiting,
    Drawing,
    Winner,
}

/// Screen for a settings snapshot: winner, then drawing, then waiting
pub fn select_screen(settings: &Settings) -> Screen {
    if settings.has_winner {
        Screen::Winner
    } else if settings.is_drawing {
        Screen::Drawing
    } else {
        Screen::Waiting
    }
}

// =============================================================================
// SPECTATOR EVENTS
// =============================================================================

/// Events emitted by state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum SpectatorEvent {
    /// The visible screen changed (`from` is `None` on first render)
    ScreenChanged { from: Option<Screen>, to: Screen },
    /// A number was drawn (also emitted for the winning draw)
    NumberDrawn(i32),
    /// The winner screen was entered
    WinnerAnnounced(Option<Winner>),
    CountdownStarted(DateTime<Utc>),
    /// A fetched snapshot was older than the mirror and was dropped
    SnapshotDiscarded,
}

// =============================================================================
// SPECTATOR STATE
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct SpectatorState {
    settings: Settings,
    /// Screen last reported to the renderer
    screen: Option<Screen>,
    countdown: Option<Countdown>,
    last_number: Option<i32>,
    revisions: RevisionClock,
}

impl SpectatorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn drawn_numbers(&self) -> &[i32] {
        &self.settings.drawn_numbers
    }

    pub fn winner(&self) -> Option<&Winner> {
        self.settings.winner.as_ref()
    }

    /// Most recent number received on the push channel
    pub fn last_number(&self) -> Option<i32> {
        self.last_number
    }

    pub fn countdown(&self) -> Option<&Countdown> {
        self.countdown.as_ref()
    }

    /// Screen derived from the current mirror
    pub fn current_screen(&self) -> Screen {
        select_screen(&self.settings)
    }

    /// Cells of the drawn-numbers board for the current mirror
    pub fn board(&self) -> Vec<BoardCell> {
        build_board(&self.settings.drawn_numbers)
    }

    /// Tag an HTTP fetch of the settings before sending it
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.revisions.issue()
    }

    /// Apply a fetched snapshot unless something newer was applied since
    /// the fetch was issued
    pub fn apply_fetched(
        &mut self,
        ticket: FetchTicket,
        settings: Settings,
        now: DateTime<Utc>,
    ) -> Vec<SpectatorEvent> {
        if !self.revisions.accept(ticket) {
            debug!(?ticket, "[spectator] Discarding stale fetched snapshot");
            return vec![SpectatorEvent::SnapshotDiscarded];
        }
        self.replace(settings, now)
    }

    /// `settings_update`: adopt the payload verbatim
    pub fn apply_snapshot(&mut self, settings: Settings, now: DateTime<Utc>) -> Vec<SpectatorEvent> {
        self.revisions.bump();
        self.replace(settings, now)
    }

    /// `number_drawn`: append the number, or jump to the winner screen
    pub fn apply_draw_event(
        &mut self,
        number: i32,
        has_winner: bool,
        winner: Option<Winner>,
    ) -> Vec<SpectatorEvent> {
        self.revisions.bump();
        self.last_number = Some(number);
        let mut events = vec![SpectatorEvent::NumberDrawn(number)];

        if has_winner {
            self.settings.has_winner = true;
            // A draw without details keeps the winner a snapshot already sent
            if winner.is_some() {
                self.settings.winner = winner;
            }
            self.sync_screen(&mut events);
            return events;
        }

        if !is_valid_number(number) {
            warn!(number, "[spectator] Ignoring out-of-range draw");
        } else if self.settings.drawn_numbers.contains(&number) {
            debug!(number, "[spectator] Ignoring repeated draw");
        } else {
            self.settings.drawn_numbers.push(number);
        }
        events
    }

    /// Dispatch a push-channel message
    pub fn apply_push(&mut self, message: PushMessage, now: DateTime<Utc>) -> Vec<SpectatorEvent> {
        match message {
            PushMessage::SettingsUpdate { settings } => self.apply_snapshot(settings, now),
            PushMessage::NumberDrawn {
                number,
                has_winner,
                winner,
            } => self.apply_draw_event(number, has_winner, winner),
        }
    }

    /// Advance the countdown; an expired countdown removes itself
    pub fn tick_countdown(&mut self, now: DateTime<Utc>) -> Option<CountdownTick> {
        let tick = self.countdown.as_mut()?.tick(now);
        if matches!(tick, Some(CountdownTick::Expired) | None) {
            self.countdown = None;
        }
        tick
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn replace(&mut self, mut settings: Settings, now: DateTime<Utc>) -> Vec<SpectatorEvent> {
        settings.drawn_numbers = sanitize_drawn(settings.drawn_numbers);
        self.settings = settings;

        let mut events = Vec::new();
        self.sync_screen(&mut events);
        self.sync_countdown(now, &mut events);
        events
    }

    fn sync_screen(&mut self, events: &mut Vec<SpectatorEvent>) {
        let to = self.current_screen();
        if self.screen == Some(to) {
            return;
        }
        let from = self.screen.replace(to);
        debug!(?from, ?to, "[spectator] Screen changed");
        events.push(SpectatorEvent::ScreenChanged { from, to });

        if to != Screen::Waiting {
            self.countdown = None;
        }
        if to == Screen::Winner {
            events.push(SpectatorEvent::WinnerAnnounced(self.settings.winner.clone()));
        }
    }

    /// (Re)start the countdown while waiting for a future deadline
    fn sync_countdown(&mut self, now: DateTime<Utc>, events: &mut Vec<SpectatorEvent>) {
        if self.current_screen() != Screen::Waiting {
            self.countdown = None;
            return;
        }

        let deadline = self.settings.countdown_time.as_deref().and_then(|raw| {
            let parsed = parse_countdown_time(raw);
            if parsed.is_none() {
                warn!(raw, "[spectator] Unreadable countdown time");
            }
            parsed
        });

        let Some(deadline) = deadline else {
            self.countdown = None;
            return;
        };

        if self.countdown.as_ref().map(Countdown::end_time) == Some(deadline) {
            return;
        }
        self.countdown = Countdown::start(deadline, now);
        if self.countdown.is_some() {
            events.push(SpectatorEvent::CountdownStarted(deadline));
        }
    }
}

/// Drop out-of-range and repeated values, keeping draw order
fn sanitize_drawn(numbers: Vec<i32>) -> Vec<i32> {
    let mut kept: Vec<i32> = Vec::with_capacity(numbers.len());
    for number in numbers {
        if !is_valid_number(number) {
            warn!(number, "[spectator] Dropping out-of-range number from snapshot");
        } else if !kept.contains(&number) {
            kept.push(number);
        }
    }
    kept
}

// =============================================================================
// TESTS
// =============================================================================
