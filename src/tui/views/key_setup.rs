use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use ratatui_textarea::TextArea;

use super::super::theme;

/// What the key setup screen wants the app to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySetupResult {
    Consumed,
    Submit(String),
    Ignored,
}

pub struct KeySetupState {
    pub key_input: TextArea<'static>,
    pub error: Option<String>,
    /// Set when an earlier key was rejected by the API.
    pub revoked: bool,
}

impl KeySetupState {
    pub fn new() -> Self {
        Self {
            key_input: Self::fresh_input(),
            error: None,
            revoked: false,
        }
    }

    fn fresh_input() -> TextArea<'static> {
        let mut input = TextArea::default();
        input.set_block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Gemini API key "),
        );
        input.set_style(theme::border_focused());
        input.set_mask_char('\u{2022}');
        input
    }

    /// Clear the field and show why the key is needed again.
    pub fn reopen(&mut self, revoked: bool) {
        self.key_input = Self::fresh_input();
        self.error = None;
        self.revoked = revoked;
    }

    pub fn key_text(&self) -> String {
        self.key_input.lines().join("").trim().to_string()
    }

    pub fn handle_input(&mut self, event: &Event) -> KeySetupResult {
        let key = match event {
            Event::Key(k) if k.kind == KeyEventKind::Press => k,
            _ => return KeySetupResult::Ignored,
        };

        match key.code {
            KeyCode::Enter => {
                let text = self.key_text();
                if text.is_empty() {
                    self.error = Some("Enter a key first".to_string());
                    KeySetupResult::Consumed
                } else {
                    KeySetupResult::Submit(text)
                }
            }
            KeyCode::Esc => KeySetupResult::Ignored,
            _ => {
                self.key_input.input(event.clone());
                self.error = None;
                KeySetupResult::Consumed
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = theme::block_focused("Connect to Gemini");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::vertical([
            Constraint::Length(6),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(inner);

        let mut intro = vec![
            Line::from(Span::styled("WearAI virtual fitting room", theme::title())),
            Line::raw(""),
            Line::raw("Try-on images are generated with a Gemini image model, which needs an API key from a paid Google Cloud project."),
        ];
        if self.revoked {
            intro.push(Line::from(Span::styled(
                "Your previous key was rejected. Please select a key from a paid project.",
                ratatui::style::Style::default().fg(theme::WARNING),
            )));
        }
        frame.render_widget(
            Paragraph::new(intro).wrap(Wrap { trim: true }),
            chunks[0],
        );

        frame.render_widget(&self.key_input, chunks[1]);

        let status = match &self.error {
            Some(err) => Line::from(Span::styled(
                err.as_str(),
                ratatui::style::Style::default().fg(theme::ERROR),
            )),
            None => Line::from(vec![
                Span::styled("Enter", theme::key_hint()),
                Span::raw(":save key  "),
                Span::styled("Ctrl+C", theme::key_hint()),
                Span::raw(":quit"),
            ]),
        };
        frame.render_widget(Paragraph::new(status).alignment(Alignment::Left), chunks[2]);
    }
}

impl Default for KeySetupState {
    fn default() -> Self {
        Self::new()
    }
}
