//! In-memory entity store for the game collection.

use crate::models::{Game, Genre, PlayStatus};

/// Mutations accepted by [`GameStore::dispatch`].
#[derive(Debug, Clone)]
pub enum GameAction {
    /// Append a record.
    Add(Game),
    /// Replace the record sharing this id; ignored when absent.
    Update(Game),
    /// Remove the record with this id; ignored when absent.
    Delete(String),
    /// Overwrite the whole collection.
    ReplaceAll(Vec<Game>),
}

/// Ordered collection of games. Holds no business rules.
#[derive(Debug, Clone, Default)]
pub struct GameStore {
    games: Vec<Game>,
}

impl GameStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a mutation, returning whether the collection changed.
    pub fn dispatch(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::Add(game) => {
                self.games.push(game);
                true
            }
            GameAction::Update(game) => {
                match self.games.iter_mut().find(|existing| existing.id == game.id) {
                    Some(slot) => {
                        *slot = game;
                        true
                    }
                    None => false,
                }
            }
            GameAction::Delete(id) => {
                let before = self.games.len();
                self.games.retain(|game| game.id != id);
                self.games.len() != before
            }
            GameAction::ReplaceAll(games) => {
                self.games = games;
                true
            }
        }
    }

    /// Every record in collection order.
    pub fn all(&self) -> &[Game] {
        &self.games
    }

    /// Look up a record by id.
    pub fn get(&self, id: &str) -> Option<&Game> {
        self.games.iter().find(|game| game.id == id)
    }

    /// Records with the given play status.
    pub fn by_status(&self, status: PlayStatus) -> Vec<&Game> {
        self.games
            .iter()
            .filter(|game| game.play_status == status)
            .collect()
    }

    /// Records in the given genre.
    pub fn by_genre(&self, genre: Genre) -> Vec<&Game> {
        self.games.iter().filter(|game| game.genre == genre).collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GameDraft;
    use crate::validation::create_new_game;

    fn game(title: &str, status: PlayStatus, genre: Genre) -> Game {
        create_new_game(GameDraft {
            title: title.to_string(),
            play_status: status,
            genre,
            ..GameDraft::default()
        })
    }

    #[test]
    fn add_update_delete() {
        let mut store = GameStore::new();
        let first = game("A", PlayStatus::Playing, Genre::Action);
        let second = game("B", PlayStatus::Completed, Genre::Rpg);
        assert!(store.dispatch(GameAction::Add(first.clone())));
        assert!(store.dispatch(GameAction::Add(second.clone())));
        assert_eq!(store.len(), 2);
        assert_eq!(store.all()[1].id, second.id);

        let mut renamed = first.clone();
        renamed.title = "A2".to_string();
        assert!(store.dispatch(GameAction::Update(renamed)));
        assert_eq!(store.get(&first.id).map(|g| g.title.as_str()), Some("A2"));
        assert_eq!(store.all()[0].id, first.id);

        assert!(store.dispatch(GameAction::Delete(first.id.clone())));
        assert_eq!(store.len(), 1);
        assert!(store.get(&first.id).is_none());
    }

    #[test]
    fn lookup_misses_are_no_ops() {
        let mut store = GameStore::new();
        store.dispatch(GameAction::Add(game("A", PlayStatus::Playing, Genre::Action)));

        let stranger = game("X", PlayStatus::OnHold, Genre::Other);
        assert!(!store.dispatch(GameAction::Update(stranger.clone())));
        assert!(!store.dispatch(GameAction::Delete(stranger.id)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].title, "A");
    }

    #[test]
    fn replace_all_and_selectors() {
        let mut store = GameStore::new();
        store.dispatch(GameAction::Add(game("old", PlayStatus::Playing, Genre::Action)));
        store.dispatch(GameAction::ReplaceAll(vec![
            game("A", PlayStatus::Playing, Genre::Action),
            game("B", PlayStatus::Completed, Genre::Action),
            game("C", PlayStatus::Playing, Genre::Puzzle),
        ]));

        assert_eq!(store.len(), 3);
        assert_eq!(store.by_status(PlayStatus::Playing).len(), 2);
        assert_eq!(store.by_genre(Genre::Action).len(), 2);
        assert!(store.by_genre(Genre::Racing).is_empty());

        store.dispatch(GameAction::ReplaceAll(Vec::new()));
        assert!(store.is_empty());
    }
}
