//! Ink & Rose color theme for the WearAI TUI.
//!
//! All color constants are RGB truecolor. Views import from here
//! instead of using inline `Color::*` literals.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};

// ── Primary palette ─────────────────────────────────────────────────────────

/// Rose: primary accent, active items, focused borders.
pub const PRIMARY: Color = Color::Rgb(0xE0, 0x6C, 0x9F);
/// Light rose: highlights, hints.
pub const PRIMARY_LIGHT: Color = Color::Rgb(0xF4, 0x9A, 0xC1);

// ── Accent ──────────────────────────────────────────────────────────────────

/// Gold: calls to action, the current selection.
pub const ACCENT: Color = Color::Rgb(0xE8, 0xC5, 0x47);

// ── Backgrounds ─────────────────────────────────────────────────────────────

/// Ink: base background.
pub const BG_BASE: Color = Color::Rgb(0x14, 0x12, 0x1C);

// ── Text ────────────────────────────────────────────────────────────────────

/// Primary text.
pub const TEXT: Color = Color::Rgb(0xEC, 0xE6, 0xF0);
/// Muted text: secondary labels, borders.
pub const TEXT_MUTED: Color = Color::Rgb(0x8A, 0x84, 0x96);
/// Dim text: disabled items, faint hints.
pub const TEXT_DIM: Color = Color::Rgb(0x55, 0x50, 0x60);

// ── Semantic ────────────────────────────────────────────────────────────────

pub const ERROR: Color = Color::Rgb(0xEF, 0x53, 0x50);
pub const SUCCESS: Color = Color::Rgb(0x66, 0xBB, 0x6A);
pub const WARNING: Color = Color::Rgb(0xFF, 0xA7, 0x26);
pub const INFO: Color = Color::Rgb(0x42, 0xA5, 0xF5);

// ── Domain ──────────────────────────────────────────────────────────────────

/// Critique text: soft lilac, set apart from UI chrome.
pub const CRITIQUE: Color = Color::Rgb(0xCE, 0x93, 0xD8);

// ── Style helpers ───────────────────────────────────────────────────────────

/// Bold accent text (titles, active items).
pub fn title() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

/// Section header style.
pub fn heading() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(PRIMARY)
}

pub fn border_default() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Highlighted/selected item.
pub fn highlight() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(TEXT_MUTED)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Key hint style (e.g., "[q]:quit").
pub fn key_hint() -> Style {
    Style::default().fg(PRIMARY_LIGHT).add_modifier(Modifier::BOLD)
}

/// Status bar brand badge.
pub fn brand_badge() -> Style {
    Style::default()
        .fg(BG_BASE)
        .bg(PRIMARY)
        .add_modifier(Modifier::BOLD)
}

/// Badge for the step card that is currently active.
pub fn step_active() -> Style {
    Style::default()
        .fg(BG_BASE)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

// ── Block builders ──────────────────────────────────────────────────────────

/// A bordered block with focused styling.
pub fn block_focused(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_focused())
}

/// A bordered block with default (unfocused) styling.
pub fn block_default(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_default())
}
