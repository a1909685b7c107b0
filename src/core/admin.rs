//! Admin controller - game configuration against the HTTP API
//!
//! Every mutating action follows the same contract: validate locally, send
//! the request, then on success notify and re-fetch the full view; on
//! failure notify and leave the mirror untouched.

use std::path::Path;

use tracing::{debug, info, warn};

use super::constants::CARD_SIZE;
use super::error::{AdminError, ApiError};
use super::format::parse_countdown_time;
use super::io_traits::{AdminApi, Notice, Notifier};
use super::protocol::{Card, DrawOutcome, NewCard, Settings, SettingsPatch};

// =============================================================================
// VALIDATION
// =============================================================================

/// Parse comma-separated card numbers. Each entry keeps its leading integer
/// (`"12abc"` is 12, `"3.5"` is 3); entries without one are skipped.
pub fn parse_card_numbers(raw: &str) -> Vec<i32> {
    raw.split(',').filter_map(leading_integer).collect()
}

fn leading_integer(part: &str) -> Option<i32> {
    let part = part.trim();
    let unsigned = part.trim_start_matches(['+', '-']);
    let sign_len = part.len() - unsigned.len();
    if sign_len > 1 {
        return None;
    }
    let digits = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    if digits == 0 {
        return None;
    }
    part[..sign_len + digits].parse().ok()
}

/// A card needs exactly `CARD_SIZE` numbers; values are not otherwise checked
pub fn validate_card_numbers(numbers: &[i32]) -> Result<(), AdminError> {
    if numbers.len() != CARD_SIZE {
        return Err(AdminError::validation(format!(
            "Please enter exactly {} comma-separated numbers (got {}).",
            CARD_SIZE,
            numbers.len()
        )));
    }
    Ok(())
}

/// An upload only needs an existing file; the server judges its content
pub fn validate_image_path(path: &Path) -> Result<(), AdminError> {
    if !path.is_file() {
        return Err(AdminError::validation("Please select an image file."));
    }
    Ok(())
}

// =============================================================================
// ADMIN STATE
// =============================================================================

/// Full admin view as last fetched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminState {
    pub settings: Settings,
    pub cards: Vec<Card>,
}

// =============================================================================
// ADMIN CONTROLLER
// =============================================================================

pub struct AdminController<A: AdminApi, N: Notifier> {
    api: A,
    notifier: N,
    state: AdminState,
}

impl<A: AdminApi, N: Notifier> AdminController<A, N> {
    pub fn new(api: A, notifier: N) -> Self {
        Self {
            api,
            notifier,
            state: AdminState::default(),
        }
    }

    pub fn state(&self) -> &AdminState {
        &self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Re-fetch settings and cards. Calls are synchronous, so the latest
    /// reload always wins.
    pub fn refresh(&mut self) -> Result<(), AdminError> {
        let loaded = self
            .api
            .fetch_settings()
            .and_then(|settings| Ok((settings, self.api.list_cards()?)));

        match loaded {
            Ok((settings, cards)) => {
                self.state = AdminState { settings, cards };
                Ok(())
            }
            Err(e) => self.fail("Could not load the game data.", e.into()),
        }
    }

    /// Register a card from comma-separated numbers
    pub fn submit_card(&mut self, card_id: &str, name: &str, raw_numbers: &str) -> Result<(), AdminError> {
        let numbers = parse_card_numbers(raw_numbers);
        if let Err(e) = validate_card_numbers(&numbers) {
            return self.reject(e);
        }

        let card = NewCard {
            card_id: card_id.to_string(),
            name: name.to_string(),
            numbers,
        };
        let result = self.api.create_card(&card).map_err(AdminError::from);
        self.complete(result, "Card added successfully!", "Could not add the card.")
    }

    /// Delete a card after confirmation
    pub fn delete_card(&mut self, id: i64) -> Result<(), AdminError> {
        if !self
            .notifier
            .confirm("Are you sure? This cannot be undone.")
        {
            info!(id, "[admin] Card deletion cancelled");
            return Err(AdminError::Cancelled);
        }
        let result = self.api.delete_card(id).map_err(AdminError::from);
        self.complete(result, "The card was deleted.", "Could not delete the card.")
    }

    /// Schedule the next draw
    pub fn set_countdown(&mut self, raw: &str) -> Result<(), AdminError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return self.reject(AdminError::validation("Please select a date and time."));
        }
        if parse_countdown_time(raw).is_none() {
            return self.reject(AdminError::validation(format!(
                "Unrecognised date and time: {}",
                raw
            )));
        }
        let result = self
            .api
            .update_settings(&SettingsPatch::countdown(raw))
            .map_err(AdminError::from);
        self.complete(
            result,
            "Countdown set successfully!",
            "Could not set the countdown.",
        )
    }

    pub fn start_drawing(&mut self) -> Result<(), AdminError> {
        let result = self.api.start_drawing().map_err(AdminError::from);
        self.complete(
            result,
            "The draw has started.",
            "Could not start the draw.",
        )
    }

    /// Draw the next number and report it
    pub fn draw_number(&mut self) -> Result<DrawOutcome, AdminError> {
        let response = match self.api.draw_number() {
            Ok(response) => response,
            Err(e) => return self.fail("Could not draw a number.", e.into()),
        };

        let outcome = match response.into_outcome() {
            Ok(outcome) => outcome,
            Err(message) => {
                warn!(%message, "[admin] Draw refused");
                self.notifier.notify(Notice::warning("Warning", message.clone()));
                return Err(AdminError::Api(ApiError::Application(message)));
            }
        };

        let notice = match &outcome {
            DrawOutcome::Number(number) => {
                info!(number, "[admin] Number drawn");
                Notice::success("Number drawn", number.to_string())
            }
            DrawOutcome::Winner { number, winner } => {
                info!(?number, "[admin] Winning draw");
                let message = match winner {
                    Some(w) => format!("Card ID: {}\nName: {}", w.card_id, w.name),
                    None => "A card has completed its numbers.".to_string(),
                };
                Notice::success("We have a winner!", message)
            }
        };
        self.notifier.notify(notice);
        self.reload_after_success();
        Ok(outcome)
    }

    /// Stop the draw and clear the drawn numbers and winner
    pub fn reset_drawing(&mut self) -> Result<(), AdminError> {
        let result = self
            .api
            .update_settings(&SettingsPatch::reset_drawing())
            .map_err(AdminError::from);
        self.complete(
            result,
            "The draw was reset.",
            "Could not reset the draw.",
        )
    }

    /// Upload a sponsor logo and append it to the sponsor list
    pub fn upload_sponsor(&mut self, path: &Path) -> Result<(), AdminError> {
        if let Err(e) = validate_image_path(path) {
            return self.reject(e);
        }
        let result = self
            .api
            .upload_image(path)
            .and_then(|filename| {
                let mut sponsors = self.state.settings.sponsor_images.clone();
                sponsors.push(filename);
                self.api.update_settings(&SettingsPatch::sponsors(sponsors))
            })
            .map_err(AdminError::from);
        self.complete(
            result,
            "Sponsor image added successfully!",
            "Could not upload the image.",
        )
    }

    /// Upload the prize image
    pub fn upload_prize(&mut self, path: &Path) -> Result<(), AdminError> {
        if let Err(e) = validate_image_path(path) {
            return self.reject(e);
        }
        let result = self
            .api
            .upload_image(path)
            .and_then(|filename| self.api.update_settings(&SettingsPatch::prize(filename)))
            .map_err(AdminError::from);
        self.complete(
            result,
            "Prize image updated successfully!",
            "Could not upload the image.",
        )
    }

    /// Remove a sponsor logo from the list
    pub fn remove_sponsor(&mut self, filename: &str) -> Result<(), AdminError> {
        let sponsors: Vec<String> = self
            .state
            .settings
            .sponsor_images
            .iter()
            .filter(|img| img.as_str() != filename)
            .cloned()
            .collect();
        let result = self
            .api
            .update_settings(&SettingsPatch::sponsors(sponsors))
            .map_err(AdminError::from);
        self.complete(
            result,
            "Sponsor removed successfully!",
            "Could not remove the sponsor.",
        )
    }

    // -------------------------------------------------------------------------
    // Outcome handling
    // -------------------------------------------------------------------------

    fn complete(
        &mut self,
        result: Result<(), AdminError>,
        success: &str,
        failure: &str,
    ) -> Result<(), AdminError> {
        match result {
            Ok(()) => {
                info!(message = success, "[admin] Action succeeded");
                self.notifier.notify(Notice::success("Success!", success));
                self.reload_after_success();
                Ok(())
            }
            Err(e) => self.fail(failure, e),
        }
    }

    /// The action itself succeeded; a failed reload is reported but not
    /// propagated
    fn reload_after_success(&mut self) {
        if let Err(e) = self.refresh() {
            debug!(error = %e, "[admin] Reload after success failed");
        }
    }

    fn reject<T>(&self, error: AdminError) -> Result<T, AdminError> {
        warn!(error = %error, "[admin] Rejected before sending");
        self.notifier.notify(Notice::warning("Warning", error.to_string()));
        Err(error)
    }

    fn fail<T>(&self, context: &str, error: AdminError) -> Result<T, AdminError> {
        warn!(error = %error, "[admin] {}", context);
        self.notifier
            .notify(Notice::error("Error!", format!("{} {}", context, error)));
        Err(error)
    }
}

// =============================================================================
// TESTS
// =============================================================================
