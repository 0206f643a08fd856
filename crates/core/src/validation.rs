//! Business rules applied to user-entered game data.

use chrono::Utc;
use uuid::Uuid;

use crate::models::{Game, GameDraft};

/// Outcome of [`validate`]: every violated rule, in check order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    /// `true` when `errors` is empty.
    pub is_valid: bool,
    /// Human readable messages, one per violated rule.
    pub errors: Vec<String>,
}

/// Ratings are whole stars from 1 to 5.
pub fn is_valid_rating(rating: i32) -> bool {
    (1..=5).contains(&rating)
}

/// Play time is a whole, non-negative number of minutes.
pub fn is_valid_play_time(play_time: i64) -> bool {
    play_time >= 0
}

/// Check a draft against every rule without short-circuiting.
pub fn validate(draft: &GameDraft) -> ValidationReport {
    let mut errors = Vec::new();

    if draft.title.trim().is_empty() {
        errors.push("Title is required".to_string());
    }
    if draft.release_date.is_empty() {
        errors.push("Release date is required".to_string());
    }
    if draft.developer.trim().is_empty() {
        errors.push("Developer is required".to_string());
    }
    if draft.publisher.trim().is_empty() {
        errors.push("Publisher is required".to_string());
    }
    if !is_valid_rating(draft.rating) {
        errors.push("Rating must be between 1 and 5".to_string());
    }
    if !is_valid_play_time(draft.play_time) {
        errors.push("Play time must be a non-negative number of minutes".to_string());
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Stamp a fresh id and matching created/updated timestamps onto a draft.
///
/// Does not validate; callers run [`validate`] first.
pub fn create_new_game(draft: GameDraft) -> Game {
    Game::from_draft(Uuid::new_v4().to_string(), draft, Utc::now())
}
