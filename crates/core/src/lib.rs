#![warn(clippy::all, missing_docs)]

//! Core domain logic for gameshelf, a personal game collection tracker.
//!
//! This crate hosts the game record model, validation rules, the entity
//! store, filter/sort selections and view derivation, and the key-value
//! persistence used by the terminal UI and any future frontends.

pub mod config;
pub mod filters;
pub mod library;
pub mod models;
pub mod storage;
pub mod store;
pub mod validation;
pub mod view;

pub use config::AppConfig;
pub use filters::{FilterAction, FilterConfig, Selection, SortBy, SortOrder};
pub use library::Library;
pub use models::{format_play_time, Game, GameDraft, Genre, PlayStatus};
pub use storage::{
    FileKeyValueStore, GameStorage, KeyValueStore, MemoryKeyValueStore, StorageError,
    STORAGE_KEY,
};
pub use store::{GameAction, GameStore};
pub use validation::{create_new_game, validate, ValidationReport};
pub use view::derive_view;
