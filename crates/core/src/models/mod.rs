//! Shared domain models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Genre a game is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    /// Action games.
    Action,
    /// Role-playing games.
    Rpg,
    /// Adventure games.
    Adventure,
    /// Simulation games.
    Simulation,
    /// Strategy games.
    Strategy,
    /// Shooters.
    Shooter,
    /// Puzzle games.
    Puzzle,
    /// Racing games.
    Racing,
    /// Sports games.
    Sports,
    /// Fighting games.
    Fighting,
    /// Anything that fits nowhere else.
    Other,
}

impl Genre {
    /// Every genre in display order.
    pub const ALL: [Genre; 11] = [
        Genre::Action,
        Genre::Rpg,
        Genre::Adventure,
        Genre::Simulation,
        Genre::Strategy,
        Genre::Shooter,
        Genre::Puzzle,
        Genre::Racing,
        Genre::Sports,
        Genre::Fighting,
        Genre::Other,
    ];

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Rpg => "RPG",
            Genre::Adventure => "Adventure",
            Genre::Simulation => "Simulation",
            Genre::Strategy => "Strategy",
            Genre::Shooter => "Shooter",
            Genre::Puzzle => "Puzzle",
            Genre::Racing => "Racing",
            Genre::Sports => "Sports",
            Genre::Fighting => "Fighting",
            Genre::Other => "Other",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How far the owner has got with a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayStatus {
    /// Owned but never started.
    NotStarted,
    /// Currently being played.
    Playing,
    /// Finished.
    Completed,
    /// Put aside for now.
    OnHold,
}

impl PlayStatus {
    /// Every status in display order.
    pub const ALL: [PlayStatus; 4] = [
        PlayStatus::NotStarted,
        PlayStatus::Playing,
        PlayStatus::Completed,
        PlayStatus::OnHold,
    ];

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            PlayStatus::NotStarted => "Not started",
            PlayStatus::Playing => "Playing",
            PlayStatus::Completed => "Completed",
            PlayStatus::OnHold => "On hold",
        }
    }
}

impl fmt::Display for PlayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A tracked game as persisted in the collection.
///
/// Field names serialise in camelCase so the stored array keeps the
/// `playStatus`/`releaseDate` layout used by earlier versions of the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// Opaque unique identifier, assigned once at creation.
    pub id: String,
    /// Game title.
    pub title: String,
    /// Genre classification.
    pub genre: Genre,
    /// Current play status.
    pub play_status: PlayStatus,
    /// Owner rating, 1 to 5 for records that passed validation.
    pub rating: i32,
    /// Total play time in minutes.
    pub play_time: i64,
    /// Cover image location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Release date, usually `YYYY-MM-DD`.
    pub release_date: String,
    /// Developer credit.
    pub developer: String,
    /// Publisher credit.
    pub publisher: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Platform the copy is owned on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Date of purchase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,
    /// Date the game was finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<String>,
    /// Personal notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    /// Ordered user tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Game data as entered by the user, before identity and timestamps exist.
///
/// Fields mirror their namesakes on [`Game`].
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct GameDraft {
    pub title: String,
    pub genre: Genre,
    pub play_status: PlayStatus,
    pub rating: i32,
    pub play_time: i64,
    pub image_url: Option<String>,
    pub release_date: String,
    pub developer: String,
    pub publisher: String,
    pub description: Option<String>,
    pub platform: Option<String>,
    pub purchase_date: Option<String>,
    pub completed_date: Option<String>,
    pub memo: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl Default for GameDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            genre: Genre::Action,
            play_status: PlayStatus::NotStarted,
            rating: 3,
            play_time: 0,
            image_url: None,
            release_date: String::new(),
            developer: String::new(),
            publisher: String::new(),
            description: None,
            platform: None,
            purchase_date: None,
            completed_date: None,
            memo: None,
            tags: None,
        }
    }
}

impl Game {
    /// Build a record from a draft with the given identity and timestamp.
    pub(crate) fn from_draft(id: String, draft: GameDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            genre: draft.genre,
            play_status: draft.play_status,
            rating: draft.rating,
            play_time: draft.play_time,
            image_url: draft.image_url,
            release_date: draft.release_date,
            developer: draft.developer,
            publisher: draft.publisher,
            description: draft.description,
            platform: draft.platform,
            purchase_date: draft.purchase_date,
            completed_date: draft.completed_date,
            memo: draft.memo,
            tags: draft.tags,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy the editable fields into a draft, e.g. to prefill the edit form.
    pub fn to_draft(&self) -> GameDraft {
        GameDraft {
            title: self.title.clone(),
            genre: self.genre,
            play_status: self.play_status,
            rating: self.rating,
            play_time: self.play_time,
            image_url: self.image_url.clone(),
            release_date: self.release_date.clone(),
            developer: self.developer.clone(),
            publisher: self.publisher.clone(),
            description: self.description.clone(),
            platform: self.platform.clone(),
            purchase_date: self.purchase_date.clone(),
            completed_date: self.completed_date.clone(),
            memo: self.memo.clone(),
            tags: self.tags.clone(),
        }
    }

    /// Overwrite the editable fields, keeping `id` and `created_at` and
    /// refreshing `updated_at`.
    pub fn apply_draft(&mut self, draft: GameDraft) {
        let id = std::mem::take(&mut self.id);
        let created_at = self.created_at;
        *self = Self::from_draft(id, draft, Utc::now());
        self.created_at = created_at;
    }
}

/// Render a minute count as `0m`, `45m`, `2h` or `2h 5m`.
pub fn format_play_time(minutes: i64) -> String {
    if minutes <= 0 {
        return "0m".to_string();
    }
    let hours = minutes / 60;
    let remaining = minutes % 60;
    match (hours, remaining) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}
