//! Filter and sort selections for the collection view.

use std::fmt;

use crate::models::{Genre, PlayStatus};

/// Restrict the view to one value, or show everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<T> {
    /// No restriction.
    All,
    /// Keep only records equal to this value.
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: PartialEq + Copy> Selection<T> {
    /// Whether a record's value passes this selection.
    pub fn matches(&self, value: T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => *expected == value,
        }
    }

    /// Whether this selection restricts anything.
    pub fn is_active(&self) -> bool {
        matches!(self, Selection::Only(_))
    }

    /// Step through `All` followed by `options`, wrapping at both ends.
    pub fn cycle(self, options: &[T], forward: bool) -> Self {
        let positions = options.len() + 1;
        let current = match self {
            Selection::All => 0,
            Selection::Only(value) => options
                .iter()
                .position(|option| *option == value)
                .map(|index| index + 1)
                .unwrap_or(0),
        };
        let next = if forward {
            (current + 1) % positions
        } else {
            (current + positions - 1) % positions
        };
        match next {
            0 => Selection::All,
            index => Selection::Only(options[index - 1]),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str("All"),
            Selection::Only(value) => value.fmt(f),
        }
    }
}

/// Field the view is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Title, collated.
    Title,
    /// Star rating.
    Rating,
    /// Minutes played.
    PlayTime,
    /// Release date.
    ReleaseDate,
    /// Time the record was added.
    #[default]
    CreatedAt,
}

impl SortBy {
    /// Every sort key in display order.
    pub const ALL: [SortBy; 5] = [
        SortBy::CreatedAt,
        SortBy::Title,
        SortBy::Rating,
        SortBy::PlayTime,
        SortBy::ReleaseDate,
    ];

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            SortBy::Title => "Title",
            SortBy::Rating => "Rating",
            SortBy::PlayTime => "Play time",
            SortBy::ReleaseDate => "Release date",
            SortBy::CreatedAt => "Date added",
        }
    }

    /// Next (or previous) key in display order, wrapping.
    pub fn cycle(self, forward: bool) -> Self {
        let len = Self::ALL.len();
        let index = Self::ALL.iter().position(|key| *key == self).unwrap_or(0);
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        Self::ALL[next]
    }
}

/// Direction of the ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Smallest first.
    Asc,
    /// Largest first.
    #[default]
    Desc,
}

impl SortOrder {
    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Asc => "Ascending",
            SortOrder::Desc => "Descending",
        }
    }

    /// The other direction.
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Current filter and sort selections. Lives for the session only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterConfig {
    /// Play status restriction.
    pub status_filter: Selection<PlayStatus>,
    /// Genre restriction.
    pub genre_filter: Selection<Genre>,
    /// Sort key.
    pub sort_by: SortBy,
    /// Sort direction.
    pub sort_order: SortOrder,
}

/// Mutations accepted by [`FilterConfig::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    /// Replace the status restriction.
    SetStatus(Selection<PlayStatus>),
    /// Replace the genre restriction.
    SetGenre(Selection<Genre>),
    /// Replace the sort key.
    SetSortBy(SortBy),
    /// Replace the sort direction.
    SetSortOrder(SortOrder),
    /// Restore defaults.
    Reset,
}

impl FilterConfig {
    /// Apply a single mutation.
    pub fn apply(&mut self, action: FilterAction) {
        match action {
            FilterAction::SetStatus(selection) => self.status_filter = selection,
            FilterAction::SetGenre(selection) => self.genre_filter = selection,
            FilterAction::SetSortBy(sort_by) => self.sort_by = sort_by,
            FilterAction::SetSortOrder(order) => self.sort_order = order,
            FilterAction::Reset => *self = Self::default(),
        }
    }

    /// Number of filters that currently restrict the view.
    pub fn active_filter_count(&self) -> usize {
        usize::from(self.status_filter.is_active()) + usize::from(self.genre_filter.is_active())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_reset() {
        let mut config = FilterConfig::default();
        assert_eq!(config.status_filter, Selection::All);
        assert_eq!(config.genre_filter, Selection::All);
        assert_eq!(config.sort_by, SortBy::CreatedAt);
        assert_eq!(config.sort_order, SortOrder::Desc);

        config.apply(FilterAction::SetStatus(Selection::Only(PlayStatus::Playing)));
        config.apply(FilterAction::SetGenre(Selection::Only(Genre::Rpg)));
        config.apply(FilterAction::SetSortBy(SortBy::Rating));
        config.apply(FilterAction::SetSortOrder(SortOrder::Asc));
        assert_eq!(config.active_filter_count(), 2);
        assert_eq!(config.sort_by, SortBy::Rating);

        config.apply(FilterAction::Reset);
        assert_eq!(config, FilterConfig::default());
        assert_eq!(config.active_filter_count(), 0);
    }

    #[test]
    fn setters_touch_only_their_field() {
        let mut config = FilterConfig::default();
        config.apply(FilterAction::SetGenre(Selection::Only(Genre::Puzzle)));
        assert_eq!(config.status_filter, Selection::All);
        assert_eq!(config.genre_filter, Selection::Only(Genre::Puzzle));
        assert_eq!(config.active_filter_count(), 1);
    }

    #[test]
    fn selection_cycles_through_all() {
        let options = PlayStatus::ALL;
        let mut selection = Selection::All;
        selection = selection.cycle(&options, true);
        assert_eq!(selection, Selection::Only(PlayStatus::NotStarted));
        selection = selection.cycle(&options, false);
        assert_eq!(selection, Selection::All);
        selection = selection.cycle(&options, false);
        assert_eq!(selection, Selection::Only(PlayStatus::OnHold));
        selection = selection.cycle(&options, true);
        assert_eq!(selection, Selection::All);
    }

    #[test]
    fn sort_keys_cycle() {
        assert_eq!(SortBy::CreatedAt.cycle(true), SortBy::Title);
        assert_eq!(SortBy::CreatedAt.cycle(false), SortBy::ReleaseDate);
        assert_eq!(SortOrder::Desc.toggled(), SortOrder::Asc);
    }
}
