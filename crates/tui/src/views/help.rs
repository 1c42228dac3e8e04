use crate::theme::Theme;
use crate::views::centered;
use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Pages",
        &[
            ("] / [", "Next / previous page"),
            ("\\", "Choose filter"),
            ("r", "Refresh"),
        ],
    ),
    (
        "Table",
        &[
            ("j/k", "Move selection"),
            ("g/G", "First / last row"),
            ("/", "Search (Enter again for next match)"),
            ("n", "Next match"),
        ],
    ),
    (
        "Details",
        &[
            ("Enter", "Toggle details"),
            ("d", "Expand details"),
            ("q", "Close details"),
            ("1-9", "Run extension"),
        ],
    ),
    (
        "General",
        &[("Ctrl+K / ?", "Toggle this panel"), ("Esc", "Quit")],
    ),
];

pub fn render(frame: &mut Frame, area: Rect) {
    let popup_area = centered(area, 56, 26);
    frame.render_widget(Clear, popup_area);

    let block = Theme::block_accent()
        .title(" Hotkeys ")
        .padding(Theme::PADDING_CARD);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::new().fg(Theme::ACCENT_YELLOW).bold();
    let desc_style = Style::new().fg(Theme::TEXT_CONTENT);
    let header_style = Style::new().fg(Theme::ACCENT_BLUE).bold();

    let mut lines = Vec::new();
    for (idx, (header, keys)) in SECTIONS.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::raw(""));
        }
        lines.push(Line::from(Span::styled(format!("── {header} ──"), header_style)));
        for (key, desc) in keys.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {key:<12}"), key_style),
                Span::styled(*desc, desc_style),
            ]));
        }
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::new().fg(Color::DarkGray),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}
