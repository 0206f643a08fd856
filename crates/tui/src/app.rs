use std::{cmp, collections::HashMap, io, ops::Range, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use gameshelf_core::{
    format_play_time, FileKeyValueStore, FilterAction, Game, GameDraft, Genre, Library,
    PlayStatus, SortOrder,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

const TICK_RATE: Duration = Duration::from_millis(250);
const CARD_WIDTH: u16 = 30;
const CARD_HEIGHT: u16 = 7;
const MAX_INPUT_LEN: usize = 256;
const LABEL_WIDTH: usize = 16;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    success: Color,
    info: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            success: Color::Green,
            info: Color::Blue,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

impl Theme {
    fn status_color(&self, status: PlayStatus) -> Color {
        match status {
            PlayStatus::NotStarted => self.muted,
            PlayStatus::Playing => self.success,
            PlayStatus::Completed => self.info,
            PlayStatus::OnHold => self.warning,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Form,
    ConfirmDelete,
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Single-line text buffer with a character cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(index, _)| index)
            .unwrap_or(self.value.len())
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.len() as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, len) as usize;
    }

    fn move_home(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.len();
    }

    fn insert(&mut self, ch: char) {
        if self.len() >= MAX_INPUT_LEN || ch.is_control() {
            return;
        }
        let index = self.byte_index(self.cursor);
        self.value.insert(index, ch);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let index = self.byte_index(self.cursor);
        self.value.remove(index);
    }

    fn delete(&mut self) {
        if self.cursor < self.len() {
            let index = self.byte_index(self.cursor);
            self.value.remove(index);
        }
    }

    fn optional(&self) -> Option<String> {
        let trimmed = self.value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FormField {
    Title,
    Genre,
    PlayStatus,
    Rating,
    PlayTime,
    ReleaseDate,
    Developer,
    Publisher,
    Platform,
    PurchaseDate,
    CompletedDate,
    ImageUrl,
    Description,
    Memo,
    Tags,
}

impl FormField {
    const ALL: [FormField; 15] = [
        FormField::Title,
        FormField::Genre,
        FormField::PlayStatus,
        FormField::Rating,
        FormField::PlayTime,
        FormField::ReleaseDate,
        FormField::Developer,
        FormField::Publisher,
        FormField::Platform,
        FormField::PurchaseDate,
        FormField::CompletedDate,
        FormField::ImageUrl,
        FormField::Description,
        FormField::Memo,
        FormField::Tags,
    ];

    fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Genre => "Genre",
            FormField::PlayStatus => "Status",
            FormField::Rating => "Rating",
            FormField::PlayTime => "Play time (min)",
            FormField::ReleaseDate => "Release date",
            FormField::Developer => "Developer",
            FormField::Publisher => "Publisher",
            FormField::Platform => "Platform",
            FormField::PurchaseDate => "Purchased",
            FormField::CompletedDate => "Completed",
            FormField::ImageUrl => "Image URL",
            FormField::Description => "Description",
            FormField::Memo => "Memo",
            FormField::Tags => "Tags",
        }
    }

    fn required(self) -> bool {
        matches!(
            self,
            FormField::Title | FormField::ReleaseDate | FormField::Developer | FormField::Publisher
        )
    }

    fn is_choice(self) -> bool {
        matches!(
            self,
            FormField::Genre | FormField::PlayStatus | FormField::Rating
        )
    }
}

/// Add/edit dialog state.
#[derive(Debug, Clone)]
struct GameForm {
    editing: Option<String>,
    focus: usize,
    genre: Genre,
    play_status: PlayStatus,
    rating: i32,
    inputs: HashMap<FormField, TextInput>,
    errors: Vec<String>,
}

impl GameForm {
    fn new() -> Self {
        Self::from_draft(None, &GameDraft::default())
    }

    fn edit(game: &Game) -> Self {
        Self::from_draft(Some(game.id.clone()), &game.to_draft())
    }

    fn from_draft(editing: Option<String>, draft: &GameDraft) -> Self {
        let optional = |value: &Option<String>| TextInput::new(value.clone().unwrap_or_default());
        let mut inputs = HashMap::new();
        inputs.insert(FormField::Title, TextInput::new(draft.title.clone()));
        inputs.insert(FormField::PlayTime, TextInput::new(draft.play_time.to_string()));
        inputs.insert(
            FormField::ReleaseDate,
            TextInput::new(draft.release_date.clone()),
        );
        inputs.insert(FormField::Developer, TextInput::new(draft.developer.clone()));
        inputs.insert(FormField::Publisher, TextInput::new(draft.publisher.clone()));
        inputs.insert(FormField::Platform, optional(&draft.platform));
        inputs.insert(FormField::PurchaseDate, optional(&draft.purchase_date));
        inputs.insert(FormField::CompletedDate, optional(&draft.completed_date));
        inputs.insert(FormField::ImageUrl, optional(&draft.image_url));
        inputs.insert(FormField::Description, optional(&draft.description));
        inputs.insert(FormField::Memo, optional(&draft.memo));
        inputs.insert(
            FormField::Tags,
            TextInput::new(draft.tags.as_ref().map(|tags| tags.join(", ")).unwrap_or_default()),
        );
        Self {
            editing,
            focus: 0,
            genre: draft.genre,
            play_status: draft.play_status,
            rating: draft.rating,
            inputs,
            errors: Vec::new(),
        }
    }

    fn focused(&self) -> FormField {
        FormField::ALL[self.focus]
    }

    fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % FormField::ALL.len();
    }

    fn focus_prev(&mut self) {
        let len = FormField::ALL.len();
        self.focus = (self.focus + len - 1) % len;
    }

    fn input(&self, field: FormField) -> Option<&TextInput> {
        self.inputs.get(&field)
    }

    fn focused_input_mut(&mut self) -> Option<&mut TextInput> {
        let field = self.focused();
        self.inputs.get_mut(&field)
    }

    fn text(&self, field: FormField) -> &str {
        self.input(field)
            .map(|input| input.value.as_str())
            .unwrap_or("")
    }

    fn optional(&self, field: FormField) -> Option<String> {
        self.input(field).and_then(TextInput::optional)
    }

    fn cycle_choice(&mut self, forward: bool) {
        match self.focused() {
            FormField::Genre => self.genre = cycle(&Genre::ALL, self.genre, forward),
            FormField::PlayStatus => {
                self.play_status = cycle(&PlayStatus::ALL, self.play_status, forward)
            }
            FormField::Rating => {
                self.rating = if forward {
                    self.rating.rem_euclid(5) + 1
                } else {
                    (self.rating + 3).rem_euclid(5) + 1
                };
            }
            _ => {}
        }
    }

    /// Collect the entered values. Play time that is not a whole number is
    /// passed on as `-1` so validation reports it.
    fn to_draft(&self) -> GameDraft {
        let play_time_text = self.text(FormField::PlayTime).trim();
        let play_time = if play_time_text.is_empty() {
            0
        } else {
            play_time_text.parse::<i64>().unwrap_or(-1)
        };
        let tags: Vec<String> = self
            .text(FormField::Tags)
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();

        GameDraft {
            title: self.text(FormField::Title).to_string(),
            genre: self.genre,
            play_status: self.play_status,
            rating: self.rating,
            play_time,
            image_url: self.optional(FormField::ImageUrl),
            release_date: self.text(FormField::ReleaseDate).trim().to_string(),
            developer: self.text(FormField::Developer).to_string(),
            publisher: self.text(FormField::Publisher).to_string(),
            description: self.optional(FormField::Description),
            platform: self.optional(FormField::Platform),
            purchase_date: self.optional(FormField::PurchaseDate),
            completed_date: self.optional(FormField::CompletedDate),
            memo: self.optional(FormField::Memo),
            tags: if tags.is_empty() { None } else { Some(tags) },
        }
    }

    fn display_value(&self, field: FormField) -> String {
        match field {
            FormField::Genre => format!("◀ {} ▶", self.genre.label()),
            FormField::PlayStatus => format!("◀ {} ▶", self.play_status.label()),
            FormField::Rating => format!("◀ {} ▶", stars(self.rating)),
            other => self.text(other).to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct PendingDelete {
    id: String,
    title: String,
}

/// High-level application state for the collection browser.
pub struct GameshelfApp {
    library: Library<FileKeyValueStore>,
    state: UiState,
    mode: Mode,
    form: Option<GameForm>,
    pending_delete: Option<PendingDelete>,
    theme: Theme,
}

impl GameshelfApp {
    pub fn new(library: Library<FileKeyValueStore>) -> Self {
        Self {
            library,
            state: UiState::default(),
            mode: Mode::Browse,
            form: None,
            pending_delete: None,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.refresh_view(None);
        self.state
            .set_status(format!("Loaded {} games", self.library.games().len()));

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }
            match event_rx.recv().await {
                Some(AppEvent::Input(event)) => self.handle_input(event),
                Some(AppEvent::Tick) => {}
                None => break,
            }
        }

        restore_terminal(&mut terminal)?;
        info!("Exited cleanly");
        Ok(())
    }

    fn refresh_view(&mut self, select: Option<&str>) {
        let keep = select
            .map(str::to_string)
            .or_else(|| self.state.current_game().map(|game| game.id.clone()));
        self.state.set_view(self.library.view());
        if let Some(id) = keep {
            self.state.select(&id);
        }
    }

    fn apply_filter(&mut self, action: FilterAction) {
        self.library.apply_filter(action);
        self.refresh_view(None);
        let filters = self.library.filters();
        self.state.set_status(format!(
            "Showing {} of {} games ({} filter{} active)",
            self.state.view.len(),
            self.library.games().len(),
            filters.active_filter_count(),
            if filters.active_filter_count() == 1 { "" } else { "s" }
        ));
    }

    fn handle_input(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.mode {
            Mode::Browse => self.handle_browse_key(key),
            Mode::Form => self.handle_form_key(key),
            Mode::ConfirmDelete => self.handle_confirm_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        let filters = *self.library.filters();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.state.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.should_quit = true
            }
            KeyCode::Char('h') | KeyCode::Left => self.state.move_cursor(-1),
            KeyCode::Char('l') | KeyCode::Right => self.state.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_row(-1),
            KeyCode::Char('j') | KeyCode::Down => self.state.move_row(1),
            KeyCode::Char('g') | KeyCode::Home => self.state.move_to(0),
            KeyCode::Char('G') | KeyCode::End => self.state.move_to_end(),
            KeyCode::PageDown => self.state.page(1),
            KeyCode::PageUp => self.state.page(-1),
            KeyCode::Char('s') => self.apply_filter(FilterAction::SetStatus(
                filters.status_filter.cycle(&PlayStatus::ALL, true),
            )),
            KeyCode::Char('S') => self.apply_filter(FilterAction::SetStatus(
                filters.status_filter.cycle(&PlayStatus::ALL, false),
            )),
            KeyCode::Char('f') => self.apply_filter(FilterAction::SetGenre(
                filters.genre_filter.cycle(&Genre::ALL, true),
            )),
            KeyCode::Char('F') => self.apply_filter(FilterAction::SetGenre(
                filters.genre_filter.cycle(&Genre::ALL, false),
            )),
            KeyCode::Char('o') => {
                self.apply_filter(FilterAction::SetSortBy(filters.sort_by.cycle(true)))
            }
            KeyCode::Char('O') => {
                self.apply_filter(FilterAction::SetSortBy(filters.sort_by.cycle(false)))
            }
            KeyCode::Char('r') => {
                self.apply_filter(FilterAction::SetSortOrder(filters.sort_order.toggled()))
            }
            KeyCode::Char('x') => self.apply_filter(FilterAction::Reset),
            KeyCode::Char('i') => {
                self.state.show_details = !self.state.show_details;
            }
            KeyCode::Char('a') => {
                self.form = Some(GameForm::new());
                self.mode = Mode::Form;
                self.state.set_status("Adding a new game".to_string());
            }
            KeyCode::Char('e') | KeyCode::Enter => match self.state.current_game() {
                Some(game) => {
                    let title = game.title.clone();
                    self.form = Some(GameForm::edit(game));
                    self.mode = Mode::Form;
                    self.state.set_status(format!("Editing {title}"));
                }
                None => self.state.set_status("No game selected".to_string()),
            },
            KeyCode::Char('d') | KeyCode::Delete => match self.state.current_game() {
                Some(game) => {
                    self.pending_delete = Some(PendingDelete {
                        id: game.id.clone(),
                        title: game.title.clone(),
                    });
                    self.mode = Mode::ConfirmDelete;
                }
                None => self.state.set_status("No game selected".to_string()),
            },
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let mut submit = false;
        let mut cancel = false;
        if let Some(form) = self.form.as_mut() {
            let field = form.focused();
            match key.code {
                KeyCode::Esc => cancel = true,
                KeyCode::Enter => submit = true,
                KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    submit = true
                }
                KeyCode::Tab | KeyCode::Down => form.focus_next(),
                KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
                KeyCode::Left if field.is_choice() => form.cycle_choice(false),
                KeyCode::Right if field.is_choice() => form.cycle_choice(true),
                KeyCode::Char(' ') if field.is_choice() => form.cycle_choice(true),
                KeyCode::Char(ch @ '1'..='5') if field == FormField::Rating => {
                    form.rating = ch.to_digit(10).map(|digit| digit as i32).unwrap_or(3);
                }
                code => {
                    if let Some(input) = form.focused_input_mut() {
                        match code {
                            KeyCode::Left => input.move_cursor(-1),
                            KeyCode::Right => input.move_cursor(1),
                            KeyCode::Home => input.move_home(),
                            KeyCode::End => input.move_end(),
                            KeyCode::Backspace => input.backspace(),
                            KeyCode::Delete => input.delete(),
                            KeyCode::Char(ch)
                                if key.modifiers.is_empty()
                                    || key.modifiers == KeyModifiers::SHIFT =>
                            {
                                input.insert(ch)
                            }
                            _ => {}
                        }
                    }
                }
            }
        }

        if cancel {
            self.form = None;
            self.mode = Mode::Browse;
            self.state.set_status("Edit cancelled".to_string());
        } else if submit {
            self.submit_form();
        }
    }

    fn submit_form(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let editing = form.editing.clone();
        let draft = form.to_draft();

        match self.library.submit(draft, editing.as_deref()) {
            Ok(game) => {
                self.form = None;
                self.mode = Mode::Browse;
                self.refresh_view(Some(&game.id));
                let verb = if editing.is_some() { "Updated" } else { "Added" };
                self.state.set_status(format!("{verb} {}", game.title));
            }
            Err(report) => {
                debug!(errors = ?report.errors, "Form rejected");
                let count = report.errors.len();
                if let Some(form) = self.form.as_mut() {
                    form.errors = report.errors;
                }
                self.state.set_status(format!(
                    "Fix {count} problem{} before saving",
                    if count == 1 { "" } else { "s" }
                ));
            }
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Some(pending) = self.pending_delete.take() {
                    if self.library.delete(&pending.id) {
                        self.state.set_status(format!("Deleted {}", pending.title));
                    } else {
                        self.state
                            .set_status(format!("{} was already gone", pending.title));
                    }
                    self.refresh_view(None);
                }
                self.mode = Mode::Browse;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.pending_delete = None;
                self.mode = Mode::Browse;
                self.state.set_status("Delete cancelled".to_string());
            }
            _ => {}
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(CARD_HEIGHT),
                Constraint::Length(4),
            ])
            .split(size);

        self.render_filter_bar(frame, chunks[0]);

        if self.state.show_details {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
                .split(chunks[1]);
            self.render_grid(frame, body[0]);
            self.render_details(frame, body[1]);
        } else {
            self.render_grid(frame, chunks[1]);
        }

        self.render_status(frame, chunks[2]);

        match self.mode {
            Mode::Form => {
                if let Some(form) = &self.form {
                    self.render_form(frame, form);
                }
            }
            Mode::ConfirmDelete => {
                if let Some(pending) = &self.pending_delete {
                    self.render_confirm(frame, pending);
                }
            }
            Mode::Browse => {}
        }
    }

    fn render_filter_bar(&self, frame: &mut Frame, area: Rect) {
        let filters = self.library.filters();
        let muted = Style::default().fg(self.theme.muted);
        let value = Style::default()
            .fg(self.theme.accent)
            .add_modifier(Modifier::BOLD);
        let arrow = match filters.sort_order {
            SortOrder::Asc => "↑",
            SortOrder::Desc => "↓",
        };
        let line = Line::from(vec![
            Span::styled("Status ", muted),
            Span::styled(filters.status_filter.to_string(), value),
            Span::raw("   "),
            Span::styled("Genre ", muted),
            Span::styled(filters.genre_filter.to_string(), value),
            Span::raw("   "),
            Span::styled("Sort ", muted),
            Span::styled(format!("{} {arrow}", filters.sort_by.label()), value),
        ]);
        let title = format!(
            "gameshelf · {} of {} games · {} active filters",
            self.state.view.len(),
            self.library.games().len(),
            filters.active_filter_count()
        );
        let paragraph =
            Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);
    }

    fn render_grid(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Collection");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.state.view.is_empty() {
            let message = if self.library.games().is_empty() {
                "No games yet. Press a to add one."
            } else {
                "No games match the current filters. Press x to reset."
            };
            let paragraph = Paragraph::new(message)
                .style(Style::default().fg(self.theme.muted))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, inner);
            return;
        }

        let columns = cmp::max(1, inner.width / CARD_WIDTH) as usize;
        let rows = cmp::max(1, inner.height / CARD_HEIGHT) as usize;
        self.state.set_grid_dims(columns, rows);

        let card_width = inner.width / columns as u16;
        let range = self.state.visible_range();
        for (slot, index) in range.enumerate() {
            let Some(game) = self.state.view.get(index) else {
                break;
            };
            let row = (slot / columns) as u16;
            let col = (slot % columns) as u16;
            let card_area = Rect::new(
                inner.x + col * card_width,
                inner.y + row * CARD_HEIGHT,
                card_width,
                CARD_HEIGHT.min(inner.height.saturating_sub(row * CARD_HEIGHT)),
            );
            self.render_card(frame, card_area, game, index == self.state.cursor);
        }
    }

    fn render_card(&self, frame: &mut Frame, area: Rect, game: &Game, selected: bool) {
        let border_style = if selected {
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.muted)
        };
        let title_width = area.width.saturating_sub(4) as usize;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(
                truncate(&game.title, title_width),
                Style::default()
                    .fg(self.theme.primary_fg)
                    .add_modifier(Modifier::BOLD),
            ));

        let mut lines = vec![
            Line::from(vec![
                Span::styled(game.genre.label(), Style::default().fg(self.theme.muted)),
                Span::raw(" · "),
                Span::styled(
                    game.play_status.label(),
                    Style::default().fg(self.theme.status_color(game.play_status)),
                ),
            ]),
            Line::from(Span::styled(
                stars(game.rating),
                Style::default().fg(self.theme.warning),
            )),
            Line::from(format_play_time(game.play_time)),
        ];
        if let Some(platform) = &game.platform {
            lines.push(Line::from(Span::styled(
                platform.clone(),
                Style::default().fg(self.theme.muted),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                game.release_date.clone(),
                Style::default().fg(self.theme.muted),
            )));
        }

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_details(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Details");
        let Some(game) = self.state.current_game() else {
            frame.render_widget(Paragraph::new("No game selected").block(block), area);
            return;
        };

        let label = Style::default().fg(self.theme.muted);
        let field = |name: &'static str, value: String| {
            Line::from(vec![Span::styled(format!("{name}: "), label), Span::raw(value)])
        };
        let mut lines = vec![
            Line::from(Span::styled(
                game.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            field("Genre", game.genre.label().to_string()),
            field("Status", game.play_status.label().to_string()),
            field("Rating", stars(game.rating)),
            field("Play time", format_play_time(game.play_time)),
            field("Released", game.release_date.clone()),
            field("Developer", game.developer.clone()),
            field("Publisher", game.publisher.clone()),
        ];
        let optional = [
            ("Platform", &game.platform),
            ("Purchased", &game.purchase_date),
            ("Completed", &game.completed_date),
            ("Image", &game.image_url),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                lines.push(field(name, value.clone()));
            }
        }
        if let Some(tags) = game.tags.as_ref().filter(|tags| !tags.is_empty()) {
            lines.push(field("Tags", tags.join(", ")));
        }
        if let Some(description) = &game.description {
            lines.push(Line::from(""));
            lines.push(Line::from(description.clone()));
        }
        if let Some(memo) = &game.memo {
            lines.push(Line::from(""));
            lines.push(field("Memo", memo.clone()));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(
                "Added {}  ·  Updated {}",
                game.created_at
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M"),
                game.updated_at
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
            ),
            label,
        )));

        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_form(&self, frame: &mut Frame, form: &GameForm) {
        let frame_area = frame.size();
        let width = cmp::max(cmp::min(72_u16, frame_area.width.saturating_sub(4)), 30_u16);
        let wanted = FormField::ALL.len() + form.errors.len() + 6;
        let height = cmp::max(
            cmp::min(wanted as u16, frame_area.height.saturating_sub(2)),
            8_u16,
        );
        let area = centered_rect(width, height, frame_area);
        frame.render_widget(Clear, area);

        let mut lines = Vec::new();
        for error in &form.errors {
            lines.push(Line::from(Span::styled(
                format!("• {error}"),
                Style::default().fg(self.theme.danger),
            )));
        }
        if !form.errors.is_empty() {
            lines.push(Line::from(""));
        }
        let fields_top = lines.len();

        for (index, field) in FormField::ALL.iter().copied().enumerate() {
            let focused = index == form.focus;
            let marker = if focused { "▶ " } else { "  " };
            let label = if field.required() {
                format!("{} *", field.label())
            } else {
                field.label().to_string()
            };
            let label_style = if focused {
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.muted)
            };
            lines.push(Line::from(vec![
                Span::styled(marker, Style::default().fg(self.theme.accent)),
                Span::styled(format!("{label:<width$}", width = LABEL_WIDTH), label_style),
                Span::raw(form.display_value(field)),
            ]));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" save  "),
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" next  "),
            Span::styled("←/→", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" change  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]));

        let title = if form.editing.is_some() {
            "Edit game"
        } else {
            "Add game"
        };
        let paragraph =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);

        let field = form.focused();
        if let (false, Some(input)) = (field.is_choice(), form.input(field)) {
            let cursor_y = area.y + 1 + (fields_top + form.focus) as u16;
            let cursor_x = area.x + 1 + 2 + LABEL_WIDTH as u16 + input.cursor as u16;
            if cursor_y < area.y + area.height.saturating_sub(1) {
                frame.set_cursor(
                    cursor_x.min(area.x + area.width.saturating_sub(2)),
                    cursor_y,
                );
            }
        }
    }

    fn render_confirm(&self, frame: &mut Frame, pending: &PendingDelete) {
        let area = centered_rect(50, 6, frame.size());
        frame.render_widget(Clear, area);
        let lines = vec![
            Line::from(format!("Delete {}?", pending.title)),
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    "y",
                    Style::default()
                        .fg(self.theme.danger)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" delete  "),
                Span::styled("n", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" keep"),
            ]),
        ];
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Confirm"))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let help = match self.mode {
            Mode::Browse => {
                "a add · e edit · d delete · s/f status/genre · o/r sort · x reset · i details · q quit"
            }
            Mode::Form => "Fill in the fields marked * and press Enter",
            Mode::ConfirmDelete => "y to delete, n to keep",
        };
        let paragraph = Paragraph::new(vec![
            Line::from(self.state.status.clone()),
            Line::from(Span::styled(help, Style::default().fg(self.theme.muted))),
        ])
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

/// Grid navigation over the derived view.
struct UiState {
    view: Vec<Game>,
    cursor: usize,
    row_offset: usize,
    columns: usize,
    visible_rows: usize,
    status: String,
    show_details: bool,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            view: Vec::new(),
            cursor: 0,
            row_offset: 0,
            columns: 1,
            visible_rows: 1,
            status: "Ready".to_string(),
            show_details: true,
            should_quit: false,
        }
    }
}

impl UiState {
    fn set_view(&mut self, view: Vec<Game>) {
        self.view = view;
        self.clamp_cursor();
        self.ensure_cursor_visible();
    }

    fn set_grid_dims(&mut self, columns: usize, rows: usize) {
        self.columns = columns.max(1);
        self.visible_rows = rows.max(1);
        self.ensure_cursor_visible();
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.view.is_empty() {
            return;
        }
        let last = self.view.len() as isize - 1;
        self.cursor = (self.cursor as isize + delta).clamp(0, last) as usize;
        self.ensure_cursor_visible();
    }

    fn move_row(&mut self, delta: isize) {
        self.move_cursor(delta * self.columns as isize);
    }

    fn page(&mut self, direction: isize) {
        self.move_row(direction * self.visible_rows as isize);
    }

    fn move_to(&mut self, index: usize) {
        if self.view.is_empty() {
            return;
        }
        self.cursor = index.min(self.view.len() - 1);
        self.ensure_cursor_visible();
    }

    fn move_to_end(&mut self) {
        self.move_to(self.view.len().saturating_sub(1));
    }

    fn current_game(&self) -> Option<&Game> {
        self.view.get(self.cursor)
    }

    fn select(&mut self, id: &str) -> bool {
        match self.view.iter().position(|game| game.id == id) {
            Some(index) => {
                self.cursor = index;
                self.ensure_cursor_visible();
                true
            }
            None => false,
        }
    }

    fn visible_range(&self) -> Range<usize> {
        let start = self.row_offset * self.columns;
        let end = (start + self.columns * self.visible_rows).min(self.view.len());
        start.min(end)..end
    }

    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn clamp_cursor(&mut self) {
        if self.view.is_empty() {
            self.cursor = 0;
            self.row_offset = 0;
        } else if self.cursor >= self.view.len() {
            self.cursor = self.view.len() - 1;
        }
    }

    fn ensure_cursor_visible(&mut self) {
        if self.view.is_empty() {
            self.row_offset = 0;
            return;
        }
        let row = self.cursor / self.columns;
        let total_rows = self.view.len().div_ceil(self.columns);
        if row < self.row_offset {
            self.row_offset = row;
        } else if row >= self.row_offset + self.visible_rows {
            self.row_offset = row + 1 - self.visible_rows;
        }
        let max_offset = total_rows.saturating_sub(self.visible_rows);
        if self.row_offset > max_offset {
            self.row_offset = max_offset;
        }
    }
}

fn cycle<T: Copy + PartialEq>(options: &[T], current: T, forward: bool) -> T {
    let len = options.len();
    let index = options
        .iter()
        .position(|option| *option == current)
        .unwrap_or(0);
    let next = if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    };
    options[next]
}

fn stars(rating: i32) -> String {
    let filled = rating.clamp(0, 5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut result: String = text.chars().take(width.saturating_sub(1)).collect();
    result.push('…');
    result
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gameshelf_core::create_new_game;

    fn games(count: usize) -> Vec<Game> {
        (0..count)
            .map(|index| {
                create_new_game(GameDraft {
                    title: format!("Game {index}"),
                    ..GameDraft::default()
                })
            })
            .collect()
    }

    #[test]
    fn text_input_edits_multibyte_text() {
        let mut input = TextInput::new("ゼルダ");
        assert_eq!(input.cursor, 3);
        input.move_cursor(-1);
        input.insert('の');
        assert_eq!(input.value, "ゼルのダ");
        input.backspace();
        input.backspace();
        assert_eq!(input.value, "ゼダ");
        input.move_home();
        input.delete();
        assert_eq!(input.value, "ダ");
        input.move_cursor(-5);
        assert_eq!(input.cursor, 0);
        input.move_end();
        assert_eq!(input.cursor, 1);
    }

    #[test]
    fn form_builds_draft_from_inputs() {
        let mut form = GameForm::new();
        form.inputs.insert(FormField::Title, TextInput::new("Hades"));
        form.inputs.insert(FormField::PlayTime, TextInput::new(" 90 "));
        form.inputs.insert(FormField::Tags, TextInput::new("roguelike, , indie "));
        form.inputs.insert(FormField::Memo, TextInput::new("   "));
        form.focus = 1;
        form.cycle_choice(true);

        let draft = form.to_draft();
        assert_eq!(draft.title, "Hades");
        assert_eq!(draft.genre, Genre::Rpg);
        assert_eq!(draft.play_time, 90);
        assert_eq!(
            draft.tags,
            Some(vec!["roguelike".to_string(), "indie".to_string()])
        );
        assert_eq!(draft.memo, None);
    }

    #[test]
    fn unparseable_play_time_fails_validation() {
        let mut form = GameForm::new();
        form.inputs.insert(FormField::PlayTime, TextInput::new("lots"));
        let report = gameshelf_core::validate(&form.to_draft());
        assert!(report
            .errors
            .iter()
            .any(|error| error.starts_with("Play time")));
    }

    #[test]
    fn rating_cycles_within_bounds() {
        let mut form = GameForm::new();
        form.focus = 3;
        form.rating = 5;
        form.cycle_choice(true);
        assert_eq!(form.rating, 1);
        form.cycle_choice(false);
        assert_eq!(form.rating, 5);
    }

    #[test]
    fn edit_form_round_trips_existing_game() {
        let mut game = games(1).remove(0);
        game.tags = Some(vec!["a".to_string(), "b".to_string()]);
        game.platform = Some("Switch".to_string());
        let form = GameForm::edit(&game);
        assert_eq!(form.editing.as_deref(), Some(game.id.as_str()));
        assert_eq!(form.to_draft(), game.to_draft());
    }

    #[test]
    fn grid_navigation_scrolls_by_rows() {
        let mut state = UiState::default();
        state.set_view(games(10));
        state.set_grid_dims(3, 2);

        state.move_row(1);
        assert_eq!(state.cursor, 3);
        state.move_row(1);
        assert_eq!(state.cursor, 6);
        assert_eq!(state.row_offset, 1);
        assert_eq!(state.visible_range(), 3..9);

        state.move_to_end();
        assert_eq!(state.cursor, 9);
        assert_eq!(state.row_offset, 2);
        assert_eq!(state.visible_range(), 6..10);

        state.move_to(0);
        assert_eq!(state.row_offset, 0);
        state.move_cursor(-1);
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn selection_survives_view_refresh() {
        let mut state = UiState::default();
        let view = games(4);
        let target = view[2].id.clone();
        state.set_view(view.clone());
        assert!(state.select(&target));

        let mut reordered = view;
        reordered.reverse();
        state.set_view(reordered);
        assert!(state.select(&target));
        assert_eq!(state.cursor, 1);

        state.set_view(Vec::new());
        assert!(state.current_game().is_none());
        assert!(!state.select(&target));
    }

    #[test]
    fn helpers_format_cards() {
        assert_eq!(stars(3), "★★★☆☆");
        assert_eq!(stars(9), "★★★★★");
        assert_eq!(truncate("Xenoblade Chronicles", 10), "Xenoblade…");
        assert_eq!(truncate("Tetris", 10), "Tetris");
        assert_eq!(cycle(&PlayStatus::ALL, PlayStatus::OnHold, true), PlayStatus::NotStarted);
    }
}
