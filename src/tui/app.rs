use std::io;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use crate::core::catalog::Collection;
use crate::core::credentials::{mask_api_key, CredentialError};
use crate::core::generation::{Completion, FailureKind};
use crate::core::media::InlineImage;
use crate::core::wizard::Session;

use super::events::{Action, AppEvent, Notification, NotificationLevel, Screen};
use super::services::Services;
use super::theme;
use super::views::key_setup::{KeySetupResult, KeySetupState};
use super::views::wizard::{WizardCommand, WizardInput, WizardViewState};

/// Central application state (Elm architecture).
pub struct AppState {
    /// Whether the app is still running.
    pub running: bool,
    /// Currently shown screen.
    pub screen: Screen,
    /// Wizard session: selections, assets, history and the credential flag.
    pub session: Session,
    /// Wizard view state (cursors, text inputs).
    pub wizard: WizardViewState,
    /// Key setup view state.
    pub key_setup: KeySetupState,
    /// Active notifications (max 3 visible).
    pub notifications: Vec<Notification>,
    /// Monotonic counter for notification IDs.
    notification_counter: u64,
    /// Whether the help modal is open.
    pub show_help: bool,
    /// Receiver for backend events.
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    /// Sender for pushing events from within the app.
    event_tx: mpsc::UnboundedSender<AppEvent>,
    /// Backend services handle.
    services: Services,
}

impl AppState {
    pub fn new(
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        event_tx: mpsc::UnboundedSender<AppEvent>,
        services: Services,
        session: Session,
    ) -> Self {
        let screen = if session.credential_valid() {
            Screen::Wizard
        } else {
            Screen::KeySetup
        };
        Self {
            running: true,
            screen,
            session,
            wizard: WizardViewState::new(),
            key_setup: KeySetupState::new(),
            notifications: Vec::new(),
            notification_counter: 0,
            show_help: false,
            event_rx,
            event_tx,
            services,
        }
    }

    // ── Elm event loop ──────────────────────────────────────────────────

    /// Main event loop: render → select → update → loop.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        tick_rate: Duration,
    ) -> io::Result<()> {
        let mut tick_interval = tokio::time::interval(tick_rate);
        let mut event_stream = EventStream::new();

        while self.running {
            terminal.draw(|frame| self.render(frame))?;

            tokio::select! {
                _ = tick_interval.tick() => {
                    self.on_tick();
                }
                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event);
                }
                Some(Ok(crossterm_event)) = event_stream.next() => {
                    self.handle_event(AppEvent::Input(crossterm_event));
                }
            }
        }

        Ok(())
    }

    /// Drain events already queued without blocking.
    pub fn pump(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
        }
    }

    // ── Event handling ──────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(crossterm_event) => self.handle_input(crossterm_event),
            AppEvent::Action(action) => self.handle_action(action),
            AppEvent::Tick => self.on_tick(),
            AppEvent::Generation(completion) => self.on_completion(completion),
            AppEvent::Notification(notification) => {
                self.push_notification(notification.message, notification.level);
            }
            AppEvent::Quit => {
                self.running = false;
            }
        }
    }

    fn handle_input(&mut self, event: Event) {
        // Priority 1: Ctrl+C always quits
        if let Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            ..
        }) = event
        {
            self.handle_action(Action::Quit);
            return;
        }

        // Priority 2: Help modal
        if self.show_help {
            if let Some(action) = self.map_help_input(&event) {
                self.handle_action(action);
            }
            return;
        }

        // Priority 3: Current screen
        match self.screen {
            Screen::KeySetup => match self.key_setup.handle_input(&event) {
                KeySetupResult::Submit(key) => self.submit_api_key(&key),
                KeySetupResult::Consumed => {}
                KeySetupResult::Ignored => {
                    if let Some(action) = self.map_input_to_action(&event) {
                        self.handle_action(action);
                    }
                }
            },
            Screen::Wizard => match self.wizard.handle_input(&event, &self.session) {
                WizardInput::Command(command) => self.apply_command(command),
                WizardInput::Consumed => {}
                WizardInput::Ignored => {
                    // Priority 4: Global keybindings
                    if let Some(action) = self.map_input_to_action(&event) {
                        self.handle_action(action);
                    }
                }
            },
        }
    }

    fn map_help_input(&self, event: &Event) -> Option<Action> {
        if let Event::Key(key) = event {
            if key.kind != KeyEventKind::Press {
                return None;
            }
            match key.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => Some(Action::CloseHelp),
                _ => None,
            }
        } else {
            None
        }
    }

    fn map_input_to_action(&self, event: &Event) -> Option<Action> {
        let Event::Key(key) = event else {
            return None;
        };
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('k')) => Some(Action::ChangeApiKey),
            (_, KeyCode::Char('?')) if self.screen == Screen::Wizard => Some(Action::ShowHelp),
            (_, KeyCode::Char('q')) if self.screen == Screen::Wizard => Some(Action::Quit),
            // Leaving a voluntary key change keeps the current key.
            (_, KeyCode::Esc) if self.screen == Screen::KeySetup && self.session.credential_valid() => {
                Some(Action::ReturnToWizard)
            }
            _ => None,
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::ShowHelp => self.show_help = true,
            Action::CloseHelp => self.show_help = false,
            Action::ReturnToWizard => self.screen = Screen::Wizard,
            Action::ChangeApiKey => {
                self.key_setup.reopen(false);
                self.screen = Screen::KeySetup;
            }
            Action::Quit => {
                log::info!("Quit requested");
                self.running = false;
            }
        }
    }

    // ── Credentials ─────────────────────────────────────────────────────

    fn submit_api_key(&mut self, key: &str) {
        match self.services.credentials.store_credential(key) {
            Ok(()) => log::info!("Stored API key {}", mask_api_key(key)),
            Err(CredentialError::InvalidFormat) => {
                self.key_setup.error = Some("That doesn't look like a Gemini API key".to_string());
                return;
            }
            // Keychain may be unavailable; the key still works for this run.
            Err(e) => {
                log::warn!("Could not persist API key: {e}");
                self.push_notification(
                    "Key not saved to keychain; it will be forgotten on exit".to_string(),
                    NotificationLevel::Warning,
                );
            }
        }

        if let Err(e) = self.services.connect(key) {
            self.key_setup.error = Some(format!("Could not create Gemini client: {e}"));
            return;
        }
        self.session.set_credential_valid(true);
        self.key_setup.reopen(false);
        self.screen = Screen::Wizard;
        self.push_notification("Connected to Gemini".to_string(), NotificationLevel::Success);
    }

    // ── Wizard commands ─────────────────────────────────────────────────

    fn apply_command(&mut self, command: WizardCommand) {
        match command {
            WizardCommand::SelectPerson(id) => {
                self.session.select_person(&id);
            }
            WizardCommand::SelectClothing(id) => {
                self.session.select_clothing(&id);
            }
            WizardCommand::Advance => {
                self.session.advance();
            }
            WizardCommand::Back => {
                self.session.back();
            }
            WizardCommand::JumpTo(step) => {
                self.session.jump_to(step);
            }
            WizardCommand::Reset => {
                self.session.reset();
                self.wizard.sync_to_selection(&self.session);
            }
            WizardCommand::DismissError => self.session.dismiss_error(),
            WizardCommand::LoadHistory(id) => {
                self.session.load_history_item(&id);
            }
            WizardCommand::TryOn => match self.session.request_try_on() {
                Some(job) => self.services.spawn_try_on(job),
                None => {
                    if !self.session.state().can_try_on() && !self.session.is_pending() {
                        self.push_notification(
                            "Pick a model and a garment first".to_string(),
                            NotificationLevel::Info,
                        );
                    }
                }
            },
            WizardCommand::GenerateGarment(prompt) => {
                if let Some(job) = self.session.begin_garment(&prompt) {
                    self.services.spawn_garment(job);
                }
            }
            WizardCommand::Upload(collection, source) => self.upload(collection, &source),
            WizardCommand::Download => self.download(),
        }
    }

    fn upload(&mut self, collection: Collection, source: &str) {
        let image = match InlineImage::from_upload(source) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("Upload failed: {e}");
                self.push_notification(format!("Could not read image: {e}"), NotificationLevel::Error);
                return;
            }
        };
        if self.session.upload(collection, image).is_some() {
            self.wizard.sync_to_selection(&self.session);
            self.push_notification(
                format!("Added {}", collection.upload_label()),
                NotificationLevel::Success,
            );
        }
    }

    fn download(&mut self) {
        let Some(item) = self.session.current_history_item() else {
            return;
        };
        let dir = self.services.config.downloads_dir();
        match item.save_result(&dir) {
            Ok(path) => {
                log::info!("Saved try-on result to {}", path.display());
                self.push_notification(format!("Saved {}", path.display()), NotificationLevel::Success);
            }
            Err(e) => {
                log::error!("Saving try-on result failed: {e}");
                self.push_notification(format!("Download failed: {e}"), NotificationLevel::Error);
            }
        }
    }

    fn on_completion(&mut self, completion: Completion) {
        let was_valid = self.session.credential_valid();
        let current = self.session.active_ticket() == Some(completion.ticket());

        if current {
            match &completion {
                Completion::Garment { outcome: Ok(_), prompt, .. } => {
                    self.wizard.clear_prompt();
                    self.push_notification(format!("Designed \"{prompt}\""), NotificationLevel::Success);
                }
                Completion::TryOn { outcome: Ok(_), .. } => {
                    self.push_notification("Try-on ready".to_string(), NotificationLevel::Success);
                }
                Completion::Garment { outcome: Err(f), .. } | Completion::TryOn { outcome: Err(f), .. }
                    if f.kind == FailureKind::Generic =>
                {
                    log::debug!("Generation failed: {}", f.detail);
                }
                _ => {}
            }
        }

        self.session.apply(completion);
        self.wizard.sync_to_selection(&self.session);

        if was_valid && !self.session.credential_valid() {
            log::warn!("API key rejected, returning to key setup");
            self.services.disconnect();
            self.key_setup.reopen(true);
            self.screen = Screen::KeySetup;
        }
    }

    // ── Notifications ───────────────────────────────────────────────────

    /// Push a notification (dedup by message, max 3).
    pub fn push_notification(&mut self, message: String, level: NotificationLevel) {
        if self.notifications.iter().any(|n| n.message == message) {
            return;
        }

        self.notification_counter += 1;
        let mut notification = Notification::new(message, level);
        notification.id = self.notification_counter;
        self.notifications.push(notification);

        while self.notifications.len() > 3 {
            self.notifications.remove(0);
        }
    }

    /// Tick: decrement notification TTLs, dismiss expired, advance the spinner.
    fn on_tick(&mut self) {
        for n in &mut self.notifications {
            n.ttl_ticks = n.ttl_ticks.saturating_sub(1);
        }
        self.notifications.retain(|n| n.ttl_ticks > 0);
        if self.session.is_pending() {
            self.wizard.tick();
        }
    }

    /// Sender for injecting events, e.g. from tests.
    pub fn event_sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.event_tx.clone()
    }

    // ── Rendering ───────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);

        match self.screen {
            Screen::KeySetup => self.key_setup.render(frame, centered_rect(70, 60, chunks[0])),
            Screen::Wizard => self.wizard.render(frame, chunks[0], &self.session),
        }

        self.render_status_bar(frame, chunks[1]);
        self.render_notifications(frame, area);

        if self.show_help {
            self.render_help_modal(frame, area);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let state = self.session.state();
        let status = if state.is_pending() {
            Span::styled("working", Style::default().fg(theme::PRIMARY_LIGHT))
        } else if self.services.is_connected() {
            Span::styled("ready", Style::default().fg(theme::TEXT_MUTED))
        } else {
            Span::styled("no key", Style::default().fg(theme::WARNING))
        };

        let status = Line::from(vec![
            Span::styled(" WearAI ", theme::brand_badge()),
            Span::raw(" "),
            Span::styled(
                state.step.title(),
                Style::default()
                    .fg(theme::PRIMARY_LIGHT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" │ "),
            Span::styled("Gemini:", theme::key_hint()),
            Span::raw(" "),
            status,
            Span::raw(" │ "),
            Span::styled("?", theme::key_hint()),
            Span::raw(":help "),
            Span::styled("Ctrl+K", theme::key_hint()),
            Span::raw(":api key "),
            Span::styled("q", theme::key_hint()),
            Span::raw(":quit"),
        ]);

        frame.render_widget(Paragraph::new(status), area);
    }

    fn render_notifications(&self, frame: &mut Frame, area: Rect) {
        if self.notifications.is_empty() {
            return;
        }

        let max_width = 50.min(area.width.saturating_sub(2));
        let height = self.notifications.len() as u16;
        let x = area.width.saturating_sub(max_width + 1);
        let notification_area = Rect::new(x, 1, max_width, height);

        let lines: Vec<Line> = self
            .notifications
            .iter()
            .map(|n| {
                let (prefix, color) = match n.level {
                    NotificationLevel::Info => ("ℹ", theme::INFO),
                    NotificationLevel::Success => ("✓", theme::SUCCESS),
                    NotificationLevel::Warning => ("⚠", theme::WARNING),
                    NotificationLevel::Error => ("✗", theme::ERROR),
                };
                Line::from(vec![
                    Span::styled(format!(" {prefix} "), Style::default().fg(color).bold()),
                    Span::raw(&n.message),
                ])
            })
            .collect();

        frame.render_widget(Clear, notification_area);
        frame.render_widget(Paragraph::new(lines), notification_area);
    }

    fn render_help_modal(&self, frame: &mut Frame, area: Rect) {
        let modal = centered_rect(60, 80, area);

        let keybindings = [
            ("Global:", ""),
            ("q", "Quit application"),
            ("?", "Toggle this help"),
            ("Ctrl+K", "Change API key"),
            ("Ctrl+C", "Force quit"),
            ("", ""),
            ("Choosing:", ""),
            ("j/k", "Move through models or garments"),
            ("Enter", "Select highlighted item"),
            ("n", "Continue to garments"),
            ("b / Backspace", "Previous step"),
            ("1 / 2", "Jump to step"),
            ("u", "Upload an image file"),
            ("p", "Design a garment with AI"),
            ("g", "Generate try-on"),
            ("", ""),
            ("Result:", ""),
            ("d", "Download result image"),
            ("r", "Start over with the same model"),
            ("h", "Browse history"),
            ("Esc", "Dismiss error"),
        ];

        let mut lines = vec![
            Line::raw(""),
            Line::from(Span::styled(
                " Keybindings",
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::raw(""),
        ];

        for (key, desc) in &keybindings {
            if key.is_empty() {
                lines.push(Line::raw(""));
            } else if desc.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("  {key}"),
                    Style::default()
                        .fg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                )));
            } else {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        format!("{:<16}", key),
                        Style::default().fg(theme::PRIMARY_LIGHT).bold(),
                    ),
                    Span::raw(*desc),
                ]));
            }
        }

        let block = Block::default()
            .title(" Help ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT));

        frame.render_widget(Clear, modal);
        frame.render_widget(Paragraph::new(lines).block(block), modal);
    }
}

/// Calculate a centered rect using percentage of parent area.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}
