//! Derivation of the filtered, sorted view shown to the user.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use unicode_normalization::UnicodeNormalization;

use crate::{
    filters::{FilterConfig, SortBy, SortOrder},
    models::Game,
};

type Comparator = fn(&Game, &Game) -> Ordering;

/// Filter and order `games` according to `config`, leaving the input untouched.
///
/// The sort is stable: records with equal keys keep their collection order in
/// both directions.
pub fn derive_view(games: &[Game], config: &FilterConfig) -> Vec<Game> {
    let mut view: Vec<Game> = games
        .iter()
        .filter(|game| {
            config.status_filter.matches(game.play_status)
                && config.genre_filter.matches(game.genre)
        })
        .cloned()
        .collect();

    let compare = comparator(config.sort_by);
    match config.sort_order {
        SortOrder::Asc => view.sort_by(compare),
        SortOrder::Desc => view.sort_by(|a, b| compare(a, b).reverse()),
    }
    view
}

/// Ascending comparator for a sort key.
pub fn comparator(sort_by: SortBy) -> Comparator {
    match sort_by {
        SortBy::Title => compare_title,
        SortBy::Rating => compare_rating,
        SortBy::PlayTime => compare_play_time,
        SortBy::ReleaseDate => compare_release_date,
        SortBy::CreatedAt => compare_created_at,
    }
}

fn compare_rating(a: &Game, b: &Game) -> Ordering {
    a.rating.cmp(&b.rating)
}

fn compare_play_time(a: &Game, b: &Game) -> Ordering {
    a.play_time.cmp(&b.play_time)
}

fn compare_created_at(a: &Game, b: &Game) -> Ordering {
    a.created_at.cmp(&b.created_at)
}

fn compare_title(a: &Game, b: &Game) -> Ordering {
    collation_key(&a.title).cmp(&collation_key(&b.title))
}

/// Width/compatibility forms fold together and case is ignored, so full-width
/// and half-width spellings of a title sort side by side.
fn collation_key(title: &str) -> String {
    title.nfkc().collect::<String>().to_lowercase()
}

fn compare_release_date(a: &Game, b: &Game) -> Ordering {
    release_timestamp(&a.release_date).cmp(&release_timestamp(&b.release_date))
}

/// Milliseconds since the epoch; `None` sorts before every parsed date.
fn release_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&midnight).timestamp_millis());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|parsed| parsed.timestamp_millis())
}
