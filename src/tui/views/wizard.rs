use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use ratatui_textarea::TextArea;

use crate::core::catalog::{AssetSource, Collection, ImageAsset};
use crate::core::wizard::{Session, WizardStep};

use super::super::theme;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Wizard operations requested from the keyboard. The app applies them to
/// the session and starts any resulting jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardCommand {
    SelectPerson(String),
    SelectClothing(String),
    Advance,
    Back,
    JumpTo(WizardStep),
    Reset,
    TryOn,
    GenerateGarment(String),
    /// Add a user image from a file path or a pasted `data:` URL.
    Upload(Collection, String),
    Download,
    DismissError,
    LoadHistory(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardInput {
    Command(WizardCommand),
    Consumed,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Browse,
    /// Typing a garment description.
    Prompt,
    /// Typing a path to an image file.
    UploadPath(Collection),
    /// Browsing the history strip.
    History,
}

pub struct WizardViewState {
    pub mode: InputMode,
    pub person_list: ListState,
    pub clothing_list: ListState,
    pub history_list: ListState,
    pub prompt_input: TextArea<'static>,
    pub path_input: TextArea<'static>,
    spinner_frame: usize,
}

impl WizardViewState {
    pub fn new() -> Self {
        let mut person_list = ListState::default();
        person_list.select(Some(0));
        let mut clothing_list = ListState::default();
        clothing_list.select(Some(0));

        Self {
            mode: InputMode::Browse,
            person_list,
            clothing_list,
            history_list: ListState::default(),
            prompt_input: Self::text_input(" Describe a garment "),
            path_input: Self::text_input(" Image path or data: URL "),
            spinner_frame: 0,
        }
    }

    fn text_input(title: &'static str) -> TextArea<'static> {
        let mut input = TextArea::default();
        input.set_block(Block::default().borders(Borders::ALL).title(title));
        input.set_style(theme::border_focused());
        input
    }

    pub fn prompt_text(&self) -> String {
        self.prompt_input.lines().join(" ")
    }

    /// Empty the garment prompt once its garment has been designed.
    pub fn clear_prompt(&mut self) {
        self.prompt_input = Self::text_input(" Describe a garment ");
    }

    pub fn tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER.len();
    }

    /// Whether typed characters go to a text field.
    pub fn is_editing(&self) -> bool {
        matches!(self.mode, InputMode::Prompt | InputMode::UploadPath(_))
    }

    /// Move list cursors onto the current selections.
    pub fn sync_to_selection(&mut self, session: &Session) {
        let state = session.state();
        if let Some(id) = state.selected_person_id() {
            Self::point_at(&mut self.person_list, session.assets().list_assets(Collection::Person), id);
        }
        if let Some(id) = state.selected_clothing_id() {
            Self::point_at(&mut self.clothing_list, session.assets().list_assets(Collection::Clothing), id);
        }
    }

    fn point_at(list: &mut ListState, assets: &[std::sync::Arc<ImageAsset>], id: &str) {
        if let Some(idx) = assets.iter().position(|a| a.id == id) {
            list.select(Some(idx));
        }
    }

    fn current_collection(step: WizardStep) -> Option<Collection> {
        match step {
            WizardStep::SelectPerson => Some(Collection::Person),
            WizardStep::SelectClothing => Some(Collection::Clothing),
            WizardStep::Result => None,
        }
    }

    // ── Input ───────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &Event, session: &Session) -> WizardInput {
        let key = match event {
            Event::Key(k) if k.kind == KeyEventKind::Press => *k,
            _ => return WizardInput::Ignored,
        };

        match self.mode {
            InputMode::Browse => self.handle_browse_input(key, session),
            InputMode::Prompt => self.handle_prompt_input(key, event),
            InputMode::UploadPath(collection) => self.handle_path_input(key, event, collection),
            InputMode::History => self.handle_history_input(key, session),
        }
    }

    fn handle_browse_input(&mut self, key: KeyEvent, session: &Session) -> WizardInput {
        if key.modifiers != KeyModifiers::NONE && key.modifiers != KeyModifiers::SHIFT {
            return WizardInput::Ignored;
        }
        let state = session.state();
        let collection = Self::current_collection(state.step);

        let command = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if let Some(collection) = collection {
                    let len = session.assets().len(collection);
                    let list = self.list_for(collection);
                    let next = list.selected().map_or(0, |i| (i + 1).min(len.saturating_sub(1)));
                    list.select(Some(next));
                }
                return WizardInput::Consumed;
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if let Some(collection) = collection {
                    let list = self.list_for(collection);
                    let prev = list.selected().map_or(0, |i| i.saturating_sub(1));
                    list.select(Some(prev));
                }
                return WizardInput::Consumed;
            }
            KeyCode::Enter => {
                let Some(collection) = collection else {
                    return WizardInput::Consumed;
                };
                let idx = self.list_for(collection).selected().unwrap_or(0);
                let Some(asset) = session.assets().list_assets(collection).get(idx) else {
                    return WizardInput::Consumed;
                };
                match collection {
                    Collection::Person => WizardCommand::SelectPerson(asset.id.clone()),
                    Collection::Clothing => WizardCommand::SelectClothing(asset.id.clone()),
                }
            }
            KeyCode::Char('n') => WizardCommand::Advance,
            KeyCode::Char('b') | KeyCode::Backspace => WizardCommand::Back,
            KeyCode::Char('1') => WizardCommand::JumpTo(WizardStep::SelectPerson),
            KeyCode::Char('2') => WizardCommand::JumpTo(WizardStep::SelectClothing),
            KeyCode::Char('r') => WizardCommand::Reset,
            KeyCode::Char('g') => WizardCommand::TryOn,
            KeyCode::Char('d') => WizardCommand::Download,
            KeyCode::Char('p') => {
                if state.step == WizardStep::SelectClothing && !state.is_pending() {
                    self.mode = InputMode::Prompt;
                }
                return WizardInput::Consumed;
            }
            KeyCode::Char('u') => {
                if let Some(collection) = collection {
                    self.mode = InputMode::UploadPath(collection);
                }
                return WizardInput::Consumed;
            }
            KeyCode::Char('h') => {
                if !session.history().is_empty() {
                    self.mode = InputMode::History;
                    if self.history_list.selected().is_none() {
                        self.history_list.select(Some(0));
                    }
                }
                return WizardInput::Consumed;
            }
            KeyCode::Esc if state.error_message.is_some() => WizardCommand::DismissError,
            _ => return WizardInput::Ignored,
        };
        WizardInput::Command(command)
    }

    fn handle_prompt_input(&mut self, key: KeyEvent, event: &Event) -> WizardInput {
        match key.code {
            KeyCode::Esc => {
                self.mode = InputMode::Browse;
                WizardInput::Consumed
            }
            KeyCode::Enter => {
                let prompt = self.prompt_text();
                self.mode = InputMode::Browse;
                WizardInput::Command(WizardCommand::GenerateGarment(prompt))
            }
            _ => {
                self.prompt_input.input(event.clone());
                WizardInput::Consumed
            }
        }
    }

    fn handle_path_input(&mut self, key: KeyEvent, event: &Event, collection: Collection) -> WizardInput {
        match key.code {
            KeyCode::Esc => {
                self.mode = InputMode::Browse;
                WizardInput::Consumed
            }
            KeyCode::Enter => {
                let path = self.path_input.lines().join("").trim().to_string();
                self.path_input = Self::text_input(" Image path or data: URL ");
                self.mode = InputMode::Browse;
                if path.is_empty() {
                    WizardInput::Consumed
                } else {
                    WizardInput::Command(WizardCommand::Upload(collection, path))
                }
            }
            _ => {
                self.path_input.input(event.clone());
                WizardInput::Consumed
            }
        }
    }

    fn handle_history_input(&mut self, key: KeyEvent, session: &Session) -> WizardInput {
        let len = session.history().len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                let next = self.history_list.selected().map_or(0, |i| (i + 1).min(len.saturating_sub(1)));
                self.history_list.select(Some(next));
                WizardInput::Consumed
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let prev = self.history_list.selected().map_or(0, |i| i.saturating_sub(1));
                self.history_list.select(Some(prev));
                WizardInput::Consumed
            }
            KeyCode::Enter => {
                let idx = self.history_list.selected().unwrap_or(0);
                self.mode = InputMode::Browse;
                match session.history().items().get(idx) {
                    Some(item) => WizardInput::Command(WizardCommand::LoadHistory(item.id.clone())),
                    None => WizardInput::Consumed,
                }
            }
            KeyCode::Esc | KeyCode::Char('h') => {
                self.mode = InputMode::Browse;
                WizardInput::Consumed
            }
            _ => WizardInput::Consumed,
        }
    }

    fn list_for(&mut self, collection: Collection) -> &mut ListState {
        match collection {
            Collection::Person => &mut self.person_list,
            Collection::Clothing => &mut self.clothing_list,
        }
    }

    // ── Rendering ───────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect, session: &Session) {
        let state = session.state();
        let error_height = if state.error_message.is_some() { 3 } else { 0 };
        let input_height = if self.is_editing() { 3 } else { 0 };

        let chunks = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(error_height),
            Constraint::Min(8),
            Constraint::Length(input_height),
            Constraint::Length(if self.mode == InputMode::History { 8 } else { 4 }),
        ])
        .split(area);

        self.render_step_cards(frame, chunks[0], session);
        if let Some(error) = &state.error_message {
            self.render_error(frame, chunks[1], error);
        }

        match state.step {
            WizardStep::SelectPerson => self.render_picker(frame, chunks[2], session, Collection::Person),
            WizardStep::SelectClothing => self.render_picker(frame, chunks[2], session, Collection::Clothing),
            WizardStep::Result => self.render_result(frame, chunks[2], session),
        }

        match self.mode {
            InputMode::Prompt => frame.render_widget(&self.prompt_input, chunks[3]),
            InputMode::UploadPath(_) => frame.render_widget(&self.path_input, chunks[3]),
            _ => {}
        }

        self.render_history(frame, chunks[4], session);
    }

    fn render_step_cards(&self, frame: &mut Frame, area: Rect, session: &Session) {
        let current = session.state().step;
        let mut spans = Vec::new();
        for step in WizardStep::ALL {
            let style = if step == current {
                theme::step_active()
            } else if step.number() < current.number() {
                Style::default().fg(theme::SUCCESS)
            } else {
                theme::dim()
            };
            spans.push(Span::styled(format!(" {} {} ", step.number(), step.title()), style));
            spans.push(Span::raw("  "));
        }
        frame.render_widget(
            Paragraph::new(Line::from(spans)).block(theme::block_default("WearAI")),
            area,
        );
    }

    fn render_error(&self, frame: &mut Frame, area: Rect, error: &str) {
        let line = Line::from(vec![
            Span::styled(" ✗ ", Style::default().fg(theme::ERROR).add_modifier(Modifier::BOLD)),
            Span::raw(error),
            Span::styled("  (Esc to dismiss)", theme::dim()),
        ]);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ERROR));
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn render_picker(&self, frame: &mut Frame, area: Rect, session: &Session, collection: Collection) {
        let chunks = Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).split(area);
        let state = session.state();
        let selected_id = match collection {
            Collection::Person => state.selected_person_id(),
            Collection::Clothing => state.selected_clothing_id(),
        };

        let items: Vec<ListItem> = session
            .assets()
            .list_assets(collection)
            .iter()
            .map(|asset| {
                let marker = if Some(asset.id.as_str()) == selected_id { "● " } else { "  " };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, theme::highlight()),
                    Span::raw(asset.label.clone()),
                    Span::styled(format!("  {}", source_tag(asset.source)), theme::dim()),
                ]))
            })
            .collect();

        let title = match collection {
            Collection::Person => "Models",
            Collection::Clothing => "Garments",
        };
        let list = List::new(items)
            .block(theme::block_focused(title))
            .highlight_style(Style::default().bg(theme::PRIMARY).fg(theme::BG_BASE))
            .highlight_symbol("> ");
        let mut list_state = match collection {
            Collection::Person => self.person_list.clone(),
            Collection::Clothing => self.clothing_list.clone(),
        };
        frame.render_stateful_widget(list, chunks[0], &mut list_state);

        let mut lines = Vec::new();
        if let Some(person) = &state.selected_person {
            lines.push(Line::from(vec![
                Span::styled("Model: ", theme::muted()),
                Span::raw(person.label.clone()),
            ]));
        }
        if let Some(clothing) = &state.selected_clothing {
            lines.push(Line::from(vec![
                Span::styled("Garment: ", theme::muted()),
                Span::raw(clothing.label.clone()),
                Span::styled(format!("  {}", clothing.image.describe()), theme::dim()),
            ]));
        }
        lines.push(Line::raw(""));

        if let Some(status) = state.pending.status_text() {
            lines.push(Line::from(Span::styled(
                format!("{} {}", SPINNER[self.spinner_frame], status),
                Style::default().fg(theme::INFO),
            )));
        }
        if let Some(enhanced) = &state.enhanced_prompt {
            lines.push(Line::from(Span::styled("Design brief:", theme::muted())));
            lines.push(Line::from(Span::styled(enhanced.clone(), Style::default().fg(theme::CRITIQUE))));
            lines.push(Line::raw(""));
        }

        lines.push(Line::from(Span::styled("Keys", theme::heading())));
        let hints: &[(&str, &str)] = match collection {
            Collection::Person => &[("Enter", "select"), ("n", "next step"), ("u", "upload photo")],
            Collection::Clothing => &[
                ("Enter", "select"),
                ("g", "try it on"),
                ("p", "design with AI"),
                ("u", "upload garment"),
                ("b", "back"),
            ],
        };
        for (key, desc) in hints {
            lines.push(Line::from(vec![
                Span::styled(format!("{key:<7}"), theme::key_hint()),
                Span::raw(*desc),
            ]));
        }

        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(theme::block_default("Fitting room")),
            chunks[1],
        );
    }

    fn render_result(&self, frame: &mut Frame, area: Rect, session: &Session) {
        let state = session.state();
        let mut lines = Vec::new();

        if let Some(status) = state.pending.status_text() {
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(
                format!("{} {}", SPINNER[self.spinner_frame], status),
                Style::default().fg(theme::INFO).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                "High-resolution renders can take a minute.",
                theme::dim(),
            )));
        } else if let Some(image) = &state.result_image {
            lines.push(Line::from(vec![
                Span::styled("Result: ", theme::muted()),
                Span::raw(format!("{} ({} KB)", image.mime_type, image.approx_size() / 1024)),
            ]));
            lines.push(Line::raw(""));
            if let Some(critique) = &state.critique {
                lines.push(Line::from(Span::styled("Editor's note", theme::heading())));
                lines.push(Line::from(Span::styled(
                    critique.clone(),
                    Style::default().fg(theme::CRITIQUE).add_modifier(Modifier::ITALIC),
                )));
                lines.push(Line::raw(""));
            }
            lines.push(Line::from(vec![
                Span::styled("d", theme::key_hint()),
                Span::raw(" download  "),
                Span::styled("r", theme::key_hint()),
                Span::raw(" new outfit  "),
                Span::styled("b", theme::key_hint()),
                Span::raw(" change garment"),
            ]));
        } else {
            lines.push(Line::from(Span::styled("No result yet.", theme::muted())));
        }

        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(theme::block_focused("Try-on")),
            area,
        );
    }

    fn render_history(&self, frame: &mut Frame, area: Rect, session: &Session) {
        let history = session.history();
        let title = format!("History ({})", history.len());
        let block = if self.mode == InputMode::History {
            theme::block_focused(&title)
        } else {
            theme::block_default(&title)
        };

        if history.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("Completed try-ons appear here.", theme::dim())).block(block),
                area,
            );
            return;
        }

        let items: Vec<ListItem> = history
            .items()
            .iter()
            .map(|item| {
                ListItem::new(Line::from(vec![
                    Span::styled(item.created_at.format("%H:%M:%S").to_string(), theme::muted()),
                    Span::raw("  "),
                    Span::raw(item.person_image.describe()),
                    Span::styled(" + ", theme::dim()),
                    Span::raw(item.clothing_image.describe()),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(theme::highlight())
            .highlight_symbol("> ");
        let mut list_state = if self.mode == InputMode::History {
            self.history_list.clone()
        } else {
            ListState::default()
        };
        frame.render_stateful_widget(list, area, &mut list_state);
    }
}

impl Default for WizardViewState {
    fn default() -> Self {
        Self::new()
    }
}

fn source_tag(source: AssetSource) -> &'static str {
    match source {
        AssetSource::Preset => "preset",
        AssetSource::UserUploaded => "uploaded",
        AssetSource::AiGenerated => "AI design",
    }
}
