use crate::engine::AnnounceLevel;
use crate::extensions::Indicator;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Padding};

pub struct Theme;

impl Theme {
    // ── Border ───────────────────────────────────────────────────────
    pub const BORDER_NORMAL: Color = Color::Rgb(60, 65, 80);
    pub const BORDER_ACCENT: Color = Color::Rgb(100, 180, 240);

    // ── Text hierarchy ───────────────────────────────────────────────
    pub const TEXT_PRIMARY: Color = Color::White;
    pub const TEXT_SECONDARY: Color = Color::Rgb(140, 145, 160);
    pub const TEXT_MUTED: Color = Color::Rgb(80, 85, 100);
    pub const TEXT_CONTENT: Color = Color::Rgb(170, 175, 190);

    // ── Key style (for footer hints) ─────────────────────────────────
    pub const TEXT_KEY: Color = Color::Rgb(140, 145, 160);
    pub const TEXT_KEY_DESC: Color = Color::DarkGray;

    // ── Accent ───────────────────────────────────────────────────────
    pub const ACCENT_BLUE: Color = Color::Rgb(100, 180, 240);
    pub const ACCENT_GREEN: Color = Color::Rgb(80, 200, 120);
    pub const ACCENT_RED: Color = Color::Rgb(220, 80, 80);
    pub const ACCENT_YELLOW: Color = Color::Rgb(220, 180, 60);
    pub const ACCENT_ORANGE: Color = Color::Rgb(217, 119, 80);

    // ── Table ────────────────────────────────────────────────────────
    pub const ROW_SELECTED_BG: Color = Color::Rgb(30, 35, 50);
    pub const ROW_MINE: Color = Color::Rgb(80, 200, 200);
    pub const MATCH_BG: Color = Color::Rgb(220, 180, 60);

    // ── Tab style ────────────────────────────────────────────────────
    pub const TAB_INACTIVE: Color = Color::Rgb(120, 125, 140);

    // ── Padding ──────────────────────────────────────────────────────
    pub const PADDING_CARD: Padding = Padding::new(2, 2, 1, 1);
    pub const PADDING_COMPACT: Padding = Padding::new(1, 1, 0, 0);

    // ── Block helpers ────────────────────────────────────────────────

    pub fn block() -> Block<'static> {
        Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(Self::BORDER_NORMAL))
    }

    pub fn block_accent() -> Block<'static> {
        Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(Self::BORDER_ACCENT))
    }

    pub fn announce_color(level: AnnounceLevel) -> Color {
        match level {
            AnnounceLevel::Info => Self::ACCENT_BLUE,
            AnnounceLevel::Success => Self::ACCENT_GREEN,
            AnnounceLevel::Error => Self::ACCENT_RED,
        }
    }

    pub fn indicator_color(indicator: Indicator) -> Color {
        match indicator {
            Indicator::Running => Self::ACCENT_YELLOW,
            Indicator::Succeeded => Self::ACCENT_GREEN,
            Indicator::Failed => Self::ACCENT_RED,
        }
    }
}

/// Color for common Azure DevOps status words (state, PR status, run result).
pub fn status_color(status: &str) -> Color {
    match status.to_ascii_lowercase().as_str() {
        "active" | "inprogress" | "doing" | "committed" => Theme::ACCENT_BLUE,
        "succeeded" | "completed" | "done" | "closed" | "resolved" => Theme::ACCENT_GREEN,
        "failed" | "rejected" | "canceled" | "cancelled" | "abandoned" => Theme::ACCENT_RED,
        "partiallysucceeded" | "notstarted" | "new" | "proposed" => Theme::ACCENT_YELLOW,
        _ => Theme::TEXT_CONTENT,
    }
}
