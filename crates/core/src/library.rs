//! State container tying the store, filters and persistence together.

use tracing::{debug, info};

use crate::{
    filters::{FilterAction, FilterConfig},
    models::{Game, GameDraft},
    storage::{GameStorage, KeyValueStore},
    store::{GameAction, GameStore},
    validation::{create_new_game, validate, ValidationReport},
    view::derive_view,
};

/// The collection as seen by a front end.
///
/// All mutation goes through the methods below; every change to the
/// collection is saved straight after it is applied.
#[derive(Debug)]
pub struct Library<S> {
    store: GameStore,
    filters: FilterConfig,
    storage: GameStorage<S>,
}

impl<S: KeyValueStore> Library<S> {
    /// Empty library persisting through `storage`. Call [`Library::hydrate`]
    /// to pull in saved records.
    pub fn new(storage: GameStorage<S>) -> Self {
        Self {
            store: GameStore::new(),
            filters: FilterConfig::default(),
            storage,
        }
    }

    /// Replace the in-memory collection with whatever storage holds.
    pub fn hydrate(&mut self) -> usize {
        let games = self.storage.load();
        let count = games.len();
        self.store.dispatch(GameAction::ReplaceAll(games));
        info!(
            count,
            skipped = self.storage.unreadable_count(),
            "Library hydrated"
        );
        count
    }

    /// Every record in collection order.
    pub fn games(&self) -> &[Game] {
        self.store.all()
    }

    /// Look up a record by id.
    pub fn game(&self, id: &str) -> Option<&Game> {
        self.store.get(id)
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &GameStore {
        &self.store
    }

    /// Persistence adapter in use.
    pub fn storage(&self) -> &GameStorage<S> {
        &self.storage
    }

    /// Filtered and sorted records for display.
    pub fn view(&self) -> Vec<Game> {
        derive_view(self.store.all(), &self.filters)
    }

    /// Current filter and sort selections.
    pub fn filters(&self) -> &FilterConfig {
        &self.filters
    }

    /// Change one filter/sort field, or reset them all.
    pub fn apply_filter(&mut self, action: FilterAction) {
        self.filters.apply(action);
        debug!(?action, "Filters updated");
    }

    /// Validate a draft and store it.
    ///
    /// With `editing` set to an existing id the record keeps its id and
    /// creation time; otherwise a new record is created. On validation
    /// failure nothing changes and the report is returned.
    pub fn submit(
        &mut self,
        draft: GameDraft,
        editing: Option<&str>,
    ) -> Result<Game, ValidationReport> {
        let report = validate(&draft);
        if !report.is_valid {
            debug!(errors = report.errors.len(), "Rejected game submission");
            return Err(report);
        }

        let existing = editing.and_then(|id| self.store.get(id)).cloned();
        let (game, action) = match existing {
            Some(mut game) => {
                game.apply_draft(draft);
                (game.clone(), GameAction::Update(game))
            }
            None => {
                let game = create_new_game(draft);
                (game.clone(), GameAction::Add(game))
            }
        };
        info!(id = %game.id, title = %game.title, "Game saved");
        self.commit(action);
        Ok(game)
    }

    /// Remove a record; unknown ids are ignored.
    pub fn delete(&mut self, id: &str) -> bool {
        let removed = self.commit(GameAction::Delete(id.to_string()));
        if removed {
            info!(id, "Game deleted");
        }
        removed
    }

    /// Drop the persisted collection and empty the store.
    pub fn clear_storage(&mut self) {
        self.storage.clear();
        self.store.dispatch(GameAction::ReplaceAll(Vec::new()));
    }

    fn commit(&mut self, action: GameAction) -> bool {
        let changed = self.store.dispatch(action);
        if changed {
            self.storage.save(self.store.all());
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{Selection, SortBy, SortOrder};
    use crate::models::PlayStatus;
    use crate::storage::MemoryKeyValueStore;

    fn library() -> Library<MemoryKeyValueStore> {
        Library::new(GameStorage::new(MemoryKeyValueStore::new()))
    }

    fn draft(title: &str, rating: i32, play_time: i64, status: PlayStatus) -> GameDraft {
        GameDraft {
            title: title.to_string(),
            rating,
            play_time,
            play_status: status,
            release_date: "2023-05-12".to_string(),
            developer: "Nintendo".to_string(),
            publisher: "Nintendo".to_string(),
            ..GameDraft::default()
        }
    }

    #[test]
    fn submit_creates_and_persists() {
        let mut library = library();
        let game = library
            .submit(draft("A", 5, 120, PlayStatus::Playing), None)
            .expect("valid draft");
        assert_eq!(library.games().len(), 1);
        assert_eq!(library.storage().load(), vec![game]);
    }

    #[test]
    fn invalid_submission_leaves_store_untouched() {
        let mut library = library();
        let report = library
            .submit(draft("", 0, -5, PlayStatus::Playing), None)
            .expect_err("invalid draft");
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 3);
        assert!(library.games().is_empty());
        assert!(library.storage().load().is_empty());
    }

    #[test]
    fn editing_keeps_identity_and_saves() {
        let mut library = library();
        let original = library
            .submit(draft("A", 3, 10, PlayStatus::Playing), None)
            .expect("valid draft");

        let mut changes = original.to_draft();
        changes.play_status = PlayStatus::Completed;
        changes.rating = 5;
        let edited = library
            .submit(changes, Some(&original.id))
            .expect("valid edit");

        assert_eq!(edited.id, original.id);
        assert_eq!(edited.created_at, original.created_at);
        assert!(edited.updated_at >= original.updated_at);
        assert_eq!(library.games().len(), 1);
        assert_eq!(library.storage().load()[0].play_status, PlayStatus::Completed);
    }

    #[test]
    fn editing_unknown_id_creates_new_record() {
        let mut library = library();
        let game = library
            .submit(draft("A", 3, 10, PlayStatus::Playing), Some("missing"))
            .expect("valid draft");
        assert_ne!(game.id, "missing");
        assert_eq!(library.games().len(), 1);
    }

    #[test]
    fn delete_and_hydrate() {
        let mut library = library();
        let keep = library
            .submit(draft("keep", 3, 10, PlayStatus::Playing), None)
            .expect("valid draft");
        let drop = library
            .submit(draft("drop", 3, 10, PlayStatus::Playing), None)
            .expect("valid draft");

        assert!(library.delete(&drop.id));
        assert!(!library.delete(&drop.id));

        let mut reopened = Library::new(GameStorage::new(MemoryKeyValueStore::new()));
        reopened
            .storage()
            .save(&library.storage().load());
        assert_eq!(reopened.hydrate(), 1);
        assert_eq!(reopened.games(), &[keep]);
    }

    #[test]
    fn view_follows_filters() {
        let mut library = library();
        library
            .submit(draft("A", 5, 120, PlayStatus::Playing), None)
            .expect("valid draft");
        library
            .submit(draft("B", 4, 80, PlayStatus::Completed), None)
            .expect("valid draft");

        library.apply_filter(FilterAction::SetStatus(Selection::Only(PlayStatus::Playing)));
        let view = library.view();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].title, "A");

        library.apply_filter(FilterAction::Reset);
        library.apply_filter(FilterAction::SetSortBy(SortBy::PlayTime));
        library.apply_filter(FilterAction::SetSortOrder(SortOrder::Asc));
        let titles: Vec<String> = library.view().into_iter().map(|g| g.title).collect();
        assert_eq!(titles, vec!["B", "A"]);
        assert_eq!(library.games()[0].title, "A");
    }

    #[test]
    fn unreadable_record_does_not_erase_the_collection() -> anyhow::Result<()> {
        let storage = GameStorage::new(MemoryKeyValueStore::new());
        let zelda = create_new_game(draft("Zelda", 5, 300, PlayStatus::Playing));
        let good = serde_json::to_value(&zelda)?;
        let mut broken = good.clone();
        broken["id"] = serde_json::json!("broken");
        broken["rating"] = serde_json::json!(4.5);
        storage
            .backend()
            .set_item(crate::STORAGE_KEY, &serde_json::to_string(&vec![good, broken])?)?;

        let mut library = Library::new(storage);
        assert_eq!(library.hydrate(), 1);
        assert_eq!(library.games(), &[zelda.clone()]);

        let added = library
            .submit(draft("Metroid", 4, 60, PlayStatus::NotStarted), None)
            .expect("valid draft");

        let raw: serde_json::Value = serde_json::from_str(
            &library
                .storage()
                .backend()
                .get_item(crate::STORAGE_KEY)?
                .unwrap_or_default(),
        )?;
        let ids: Vec<&str> = raw
            .as_array()
            .map(|records| records.iter().filter_map(|r| r["id"].as_str()).collect())
            .unwrap_or_default();
        assert_eq!(ids, vec![zelda.id.as_str(), added.id.as_str(), "broken"]);

        let reloaded = library.storage().load();
        assert_eq!(reloaded, vec![zelda, added]);
        Ok(())
    }

    #[test]
    fn clear_storage_empties_everything() {
        let mut library = library();
        library
            .submit(draft("A", 5, 120, PlayStatus::Playing), None)
            .expect("valid draft");
        library.clear_storage();
        assert!(library.games().is_empty());
        assert!(library.storage().backend().get_item(crate::STORAGE_KEY).ok().flatten().is_none());
    }
}
