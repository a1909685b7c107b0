//! Wire protocol types
//!
//! JSON records exchanged with the bingo server: the settings singleton,
//! cards, HTTP responses and the push-channel envelope. These types are
//! platform-independent and can be tested without a server.

use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// DATA TYPES
// =============================================================================

/// Card that completed its numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub card_id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub numbers: Vec<i32>,
}

/// Game settings singleton, owned by the server and mirrored by clients
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Start of the next draw (ISO-8601, naive timestamps are local time)
    #[serde(default)]
    pub countdown_time: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sponsor_images: Vec<String>,
    #[serde(default)]
    pub prize_image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_drawing: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_winner: bool,
    /// Drawn values in draw order
    #[serde(default, deserialize_with = "null_as_default")]
    pub drawn_numbers: Vec<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Winner>,
}

/// A registered bingo card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Server-assigned identity
    pub id: i64,
    /// User-facing label
    pub card_id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub numbers: Vec<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_winner: bool,
}

/// Body of `POST /api/cards`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCard {
    pub card_id: String,
    pub name: String,
    pub numbers: Vec<i32>,
}

/// Partial settings update; only present fields are sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsor_images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prize_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawn_numbers: Option<Vec<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_drawing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_winner: Option<bool>,
}

impl SettingsPatch {
    pub fn countdown(time: impl Into<String>) -> Self {
        Self {
            countdown_time: Some(time.into()),
            ..Self::default()
        }
    }

    pub fn sponsors(images: Vec<String>) -> Self {
        Self {
            sponsor_images: Some(images),
            ..Self::default()
        }
    }

    pub fn prize(image: impl Into<String>) -> Self {
        Self {
            prize_image: Some(image.into()),
            ..Self::default()
        }
    }

    /// Stop the draw and clear every drawn number and the winner flag
    pub fn reset_drawing() -> Self {
        Self {
            drawn_numbers: Some(Vec::new()),
            is_drawing: Some(false),
            has_winner: Some(false),
            ..Self::default()
        }
    }
}

// =============================================================================
// HTTP RESPONSES
// =============================================================================

/// Generic acknowledgment returned by mutating endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `POST /api/draw_number`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawResponse {
    #[serde(default)]
    pub number: Option<i32>,
    #[serde(
        default,
        rename = "hasWinner",
        alias = "has_winner",
        deserialize_with = "null_as_default"
    )]
    pub has_winner: bool,
    #[serde(default)]
    pub winner: Option<Winner>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Interpreted draw result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    Number(i32),
    Winner {
        number: Option<i32>,
        winner: Option<Winner>,
    },
}

impl DrawResponse {
    /// Split the response into an outcome or the server's error message
    pub fn into_outcome(self) -> Result<DrawOutcome, String> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if self.has_winner {
            return Ok(DrawOutcome::Winner {
                number: self.number,
                winner: self.winner,
            });
        }
        self.number
            .map(DrawOutcome::Number)
            .ok_or_else(|| "response carried no number".to_string())
    }
}

/// Response of `POST /api/upload`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl UploadResponse {
    pub fn into_result(self) -> Result<String, String> {
        match (self.filename, self.error) {
            (_, Some(error)) => Err(error),
            (Some(filename), None) => Ok(filename),
            (None, None) => Err("response carried no filename".to_string()),
        }
    }
}

// =============================================================================
// PUSH CHANNEL (server → spectator)
// =============================================================================

/// Messages received on the live-update channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushMessage {
    /// Full snapshot; replaces the local mirror
    SettingsUpdate { settings: Settings },
    /// A single draw, possibly completing a card
    NumberDrawn {
        number: i32,
        #[serde(
            default,
            rename = "hasWinner",
            alias = "has_winner",
            deserialize_with = "null_as_default"
        )]
        has_winner: bool,
        #[serde(default)]
        winner: Option<Winner>,
    },
}

// =============================================================================
// TESTS
// =============================================================================
