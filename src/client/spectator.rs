//! Spectator display loop
//!
//! Owns the `SpectatorState`, drains the push channel, drives the countdown,
//! highlight and confetti timers and redraws the terminal when something
//! changed.

use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::render::{render_frame, FrameContext, RenderOptions, CLEAR_SCREEN};
use crate::core::confetti::ConfettiBurst;
use crate::core::constants::{COUNTDOWN_TICK, NUMBER_HIGHLIGHT};
use crate::core::countdown::{CountdownParts, CountdownTick};
use crate::core::io_traits::{ConnectionStatus, PushChannel, PushEvent, SettingsSource};
use crate::core::spectator::{Screen, SpectatorEvent, SpectatorState};

#[derive(Debug, Error)]
pub enum SpectatorError {
    #[error("Failed to write the display: {0}")]
    Output(#[from] std::io::Error),
}

/// Spectator behaviour knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpectatorOptions {
    pub render: RenderOptions,
    /// Re-fetch settings over HTTP after a reconnect
    pub resync_on_reconnect: bool,
}

pub struct SpectatorApp<S: SettingsSource, P: PushChannel, W: Write> {
    source: S,
    push: P,
    out: W,
    options: SpectatorOptions,
    state: SpectatorState,
    countdown_display: Option<CountdownParts>,
    next_countdown_tick: Option<Instant>,
    highlight_until: Option<Instant>,
    confetti: Option<(ConfettiBurst, Instant)>,
    has_connected: bool,
    dirty: bool,
}

impl<S: SettingsSource, P: PushChannel, W: Write> SpectatorApp<S, P, W> {
    pub fn new(source: S, push: P, out: W, options: SpectatorOptions) -> Self {
        Self {
            source,
            push,
            out,
            options,
            state: SpectatorState::new(),
            countdown_display: None,
            next_countdown_tick: None,
            highlight_until: None,
            confetti: None,
            has_connected: false,
            dirty: true,
        }
    }

    pub fn state(&self) -> &SpectatorState {
        &self.state
    }

    pub fn push(&self) -> &P {
        &self.push
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlight_until.is_some()
    }

    pub fn has_confetti(&self) -> bool {
        self.confetti.is_some()
    }

    /// Fetch the full settings, render the first frame, then open the push
    /// channel
    pub fn bootstrap(&mut self, now: Instant, wall: DateTime<Utc>) -> Result<(), SpectatorError> {
        self.resync(now, wall);
        self.dirty = true;
        self.render(now)?;

        info!("[spectator] Opening push channel");
        self.push.connect();
        Ok(())
    }

    /// One iteration of the display loop
    pub fn step(&mut self, now: Instant, wall: DateTime<Utc>) -> Result<(), SpectatorError> {
        while let Some(event) = self.push.poll_event() {
            self.handle_push_event(event, now, wall);
        }

        if self
            .next_countdown_tick
            .is_some_and(|due| now >= due)
        {
            self.tick_countdown(now, wall);
        }

        if self.highlight_until.is_some_and(|until| now >= until) {
            self.highlight_until = None;
            self.dirty = true;
        }

        let confetti_done = self
            .confetti
            .as_ref()
            .map(|(burst, started)| burst.is_finished(now.saturating_duration_since(*started)));
        if let Some(done) = confetti_done {
            if done {
                debug!("[spectator] Confetti finished");
                self.confetti = None;
            }
            self.dirty = true;
        }

        self.render(now)
    }

    /// Bootstrap and loop until the process is stopped
    pub fn run(&mut self, frame_interval: Duration) -> Result<(), SpectatorError> {
        self.bootstrap(Instant::now(), Utc::now())?;
        loop {
            self.step(Instant::now(), Utc::now())?;
            thread::sleep(frame_interval);
        }
    }

    // -------------------------------------------------------------------------
    // Event handling
    // -------------------------------------------------------------------------

    fn resync(&mut self, now: Instant, wall: DateTime<Utc>) {
        let ticket = self.state.begin_fetch();
        match self.source.fetch_settings() {
            Ok(settings) => {
                let events = self.state.apply_fetched(ticket, settings, wall);
                self.apply_events(events, now, wall);
            }
            Err(e) => {
                error!(error = %e, "[spectator] Could not fetch settings");
                // Still derive the screen from the mirror we have
                let current = self.state.settings().clone();
                let events = self.state.apply_fetched(ticket, current, wall);
                self.apply_events(events, now, wall);
            }
        }
    }

    fn handle_push_event(&mut self, event: PushEvent, now: Instant, wall: DateTime<Utc>) {
        match event {
            PushEvent::Message(message) => {
                let events = self.state.apply_push(message, wall);
                self.apply_events(events, now, wall);
            }
            PushEvent::StatusChanged(status) => {
                debug!(?status, "[spectator] Push status");
                if status == ConnectionStatus::Connected {
                    if self.has_connected && self.options.resync_on_reconnect {
                        info!("[spectator] Reconnected, resyncing settings");
                        self.resync(now, wall);
                    }
                    self.has_connected = true;
                }
                self.dirty = true;
            }
            PushEvent::Closed(kind) => {
                warn!(reason = %kind, "[spectator] Push channel closed");
            }
            PushEvent::Error(e) => {
                error!(error = %e, "[spectator] Push channel error");
            }
        }
    }

    fn apply_events(&mut self, events: Vec<SpectatorEvent>, now: Instant, wall: DateTime<Utc>) {
        for event in events {
            match event {
                SpectatorEvent::ScreenChanged { from, to } => {
                    info!(?from, ?to, "[spectator] Screen changed");
                    if to != Screen::Waiting {
                        self.countdown_display = None;
                        self.next_countdown_tick = None;
                    }
                    if to != Screen::Winner {
                        self.confetti = None;
                    }
                }
                SpectatorEvent::NumberDrawn(number) => {
                    info!(number, "[spectator] Number drawn");
                    self.highlight_until = Some(now + NUMBER_HIGHLIGHT);
                }
                SpectatorEvent::WinnerAnnounced(winner) => {
                    info!(
                        card_id = winner.as_ref().map(|w| w.card_id.as_str()),
                        "[spectator] Winner announced"
                    );
                    self.confetti = Some((ConfettiBurst::random(), now));
                }
                SpectatorEvent::CountdownStarted(end) => {
                    info!(%end, "[spectator] Countdown started");
                    self.tick_countdown(now, wall);
                }
                SpectatorEvent::SnapshotDiscarded => {
                    debug!("[spectator] Stale snapshot discarded");
                }
            }
        }
        self.dirty = true;
    }

    fn tick_countdown(&mut self, now: Instant, wall: DateTime<Utc>) {
        match self.state.tick_countdown(wall) {
            Some(CountdownTick::Running(parts)) => {
                self.countdown_display = Some(parts);
                self.next_countdown_tick = Some(now + COUNTDOWN_TICK);
            }
            Some(CountdownTick::Expired) => {
                info!("[spectator] Countdown reached zero");
                self.countdown_display = None;
                self.next_countdown_tick = None;
            }
            None => {
                self.countdown_display = None;
                self.next_countdown_tick = None;
            }
        }
        self.dirty = true;
    }

    fn render(&mut self, now: Instant) -> Result<(), SpectatorError> {
        if !self.dirty {
            return Ok(());
        }
        let confetti = self
            .confetti
            .as_ref()
            .map(|(burst, started)| (burst, now.saturating_duration_since(*started)));
        let frame = render_frame(
            &FrameContext {
                state: &self.state,
                status: self.push.status(),
                countdown: self.countdown_display,
                highlight: self.highlight_until.is_some(),
                confetti,
            },
            &self.options.render,
        );

        if self.options.render.color {
            self.out.write_all(CLEAR_SCREEN.as_bytes())?;
        }
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        self.dirty = false;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ApiError;
    use crate::core::io_traits::mocks::{MockApi, MockPushChannel};
    use crate::core::protocol::{PushMessage, Settings, Winner};
    use crate::core::reconnect::CloseKind;
    use chrono::TimeZone;
    use std::cell::RefCell;
    use std::rc::Rc;

    type App = SpectatorApp<MockApi, MockPushChannel, Vec<u8>>;

    fn wall() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn app(settings: Settings) -> App {
        SpectatorApp::new(
            MockApi::with_settings(settings),
            MockPushChannel::new(),
            Vec::new(),
            SpectatorOptions::default(),
        )
    }

    fn output(app: &App) -> String {
        String::from_utf8_lossy(app.output()).into_owned()
    }

    #[test]
    fn test_bootstrap_fetches_before_connecting() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let mut api = MockApi::new();
        api.journal = Some(Rc::clone(&journal));
        let mut push = MockPushChannel::new();
        push.journal = Some(Rc::clone(&journal));

        let mut app = SpectatorApp::new(api, push, Vec::new(), SpectatorOptions::default());
        app.bootstrap(Instant::now(), wall()).unwrap();

        assert_eq!(
            journal.borrow().as_slice(),
            ["api:FetchSettings".to_string(), "push:connect".to_string()]
        );
        assert!(output(&app).contains("Waiting for the draw to start"));
    }

    #[test]
    fn test_bootstrap_survives_fetch_error() {
        let mut app = app(Settings::default());
        *app.source().fail_fetch.borrow_mut() = Some(ApiError::Transport("refused".to_string()));
        app.bootstrap(Instant::now(), wall()).unwrap();

        assert_eq!(app.push().connects, 1);
        assert_eq!(app.state().current_screen(), Screen::Waiting);
    }

    #[test]
    fn test_settings_update_switches_to_drawing() {
        let mut app = app(Settings::default());
        let now = Instant::now();
        app.bootstrap(now, wall()).unwrap();

        app.push.queue_message(PushMessage::SettingsUpdate {
            settings: Settings {
                is_drawing: true,
                drawn_numbers: vec![5, 12],
                ..Settings::default()
            },
        });
        app.step(now, wall()).unwrap();

        assert_eq!(app.state().current_screen(), Screen::Drawing);
        let board = app.state().board();
        assert!(board[4].is_drawn());
        assert!(board[11].is_drawn());
        assert_eq!(board.iter().filter(|c| c.is_drawn()).count(), 2);
        assert!(output(&app).contains("[12]"));
    }

    #[test]
    fn test_number_highlight_expires() {
        let mut app = app(Settings {
            is_drawing: true,
            ..Settings::default()
        });
        let now = Instant::now();
        app.bootstrap(now, wall()).unwrap();

        app.push.queue_message(PushMessage::NumberDrawn {
            number: 9,
            has_winner: false,
            winner: None,
        });
        app.step(now, wall()).unwrap();
        assert!(app.is_highlighted());
        assert_eq!(app.state().drawn_numbers(), &[9]);

        app.step(now + Duration::from_millis(499), wall()).unwrap();
        assert!(app.is_highlighted());
        app.step(now + Duration::from_millis(500), wall()).unwrap();
        assert!(!app.is_highlighted());
    }

    #[test]
    fn test_winning_draw_starts_confetti_once() {
        let mut app = app(Settings {
            is_drawing: true,
            ..Settings::default()
        });
        let now = Instant::now();
        app.bootstrap(now, wall()).unwrap();

        app.push.queue_message(PushMessage::NumberDrawn {
            number: 33,
            has_winner: true,
            winner: Some(Winner {
                card_id: "0007".to_string(),
                name: "Lea".to_string(),
                numbers: vec![],
            }),
        });
        app.step(now, wall()).unwrap();
        assert_eq!(app.state().current_screen(), Screen::Winner);
        assert!(app.has_confetti());
        assert!(output(&app).contains("Card ID: 0007"));

        // Burst ends after the last particle's lifetime
        app.step(now + Duration::from_secs(6), wall()).unwrap();
        assert!(!app.has_confetti());
    }

    #[test]
    fn test_countdown_ticks_then_stops() {
        let mut app = app(Settings {
            countdown_time: Some("2026-10-16T12:00:10Z".to_string()),
            ..Settings::default()
        });
        let now = Instant::now();
        app.bootstrap(now, wall()).unwrap();
        assert!(output(&app).contains("Next draw in 0d 0h 0m 10s"));

        for s in 1..=12 {
            let at = now + Duration::from_secs(s);
            app.step(at, wall() + chrono::Duration::seconds(s as i64)).unwrap();
        }
        assert!(app.state().countdown().is_none());
        assert!(app.next_countdown_tick.is_none());
    }

    #[test]
    fn test_resync_on_reconnect() {
        let mut app = SpectatorApp::new(
            MockApi::new(),
            MockPushChannel::new(),
            Vec::new(),
            SpectatorOptions {
                resync_on_reconnect: true,
                ..SpectatorOptions::default()
            },
        );
        let now = Instant::now();
        app.bootstrap(now, wall()).unwrap();

        app.push.queue(PushEvent::StatusChanged(ConnectionStatus::Connected));
        app.push.queue(PushEvent::Closed(CloseKind::Lost("reset".to_string())));
        app.push.queue(PushEvent::StatusChanged(ConnectionStatus::Reconnecting));
        app.push.queue(PushEvent::StatusChanged(ConnectionStatus::Connected));
        app.step(now, wall()).unwrap();

        // Bootstrap fetch plus one resync; the first connect does not resync
        assert_eq!(app.source().call_count(), 2);
    }

    #[test]
    fn test_no_redraw_when_idle() {
        let mut app = app(Settings::default());
        let now = Instant::now();
        app.bootstrap(now, wall()).unwrap();
        let len = app.output().len();
        app.step(now, wall()).unwrap();
        assert_eq!(app.output().len(), len);
    }
}
