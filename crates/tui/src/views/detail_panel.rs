use crate::app::App;
use crate::engine::{BrowserPage, DetailStatus};
use crate::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Wrap};

pub fn render(frame: &mut Frame, app: &App, page: &dyn BrowserPage, area: Rect) {
    let Some(panel) = page.detail_panel() else {
        return;
    };

    let mut title_spans = vec![Span::styled(
        format!(" {} ", panel.title),
        Style::new().fg(Theme::TEXT_PRIMARY).bold(),
    )];
    if panel.status == DetailStatus::Loading {
        title_spans.push(Span::styled(
            "loading ",
            Style::new().fg(Theme::ACCENT_YELLOW).italic(),
        ));
    }
    let block = Theme::block_accent()
        .title(Line::from(title_spans))
        .padding(Theme::PADDING_COMPACT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [body_area, buttons_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);

    let label_style = Style::new().fg(Theme::TEXT_SECONDARY);
    let value_style = Style::new().fg(Theme::TEXT_CONTENT);
    let mut lines = Vec::new();
    if let DetailStatus::Failed(reason) = &panel.status {
        lines.push(Line::from(Span::styled(
            format!("Failed to load details: {reason}"),
            Style::new().fg(Theme::ACCENT_RED),
        )));
        lines.push(Line::raw(""));
    }
    for field in &panel.fields {
        if field.block {
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(
                format!("{}:", field.label),
                label_style.bold(),
            )));
            lines.extend(
                field
                    .value
                    .lines()
                    .map(|l| Line::from(Span::styled(l.to_string(), value_style))),
            );
        } else {
            lines.push(Line::from(vec![
                Span::styled(format!("{}: ", field.label), label_style),
                Span::styled(field.value.clone(), value_style),
            ]));
        }
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), body_area);

    frame.render_widget(Paragraph::new(buttons(app, page)), buttons_area);
}

/// `[1 Export ✓] [2 Open] ...`
fn buttons(app: &App, page: &dyn BrowserPage) -> Line<'static> {
    let mut spans = Vec::new();
    for (idx, descriptor) in app.extensions().iter().take(9).enumerate() {
        spans.push(Span::styled(
            format!("[{} ", idx + 1),
            Style::new().fg(Theme::TEXT_KEY),
        ));
        spans.push(Span::styled(
            descriptor.display_name.clone(),
            Style::new().fg(Theme::TEXT_PRIMARY),
        ));
        if let Some(indicator) = page.indicator(&descriptor.id) {
            spans.push(Span::styled(
                format!(" {}", indicator.glyph()),
                Style::new().fg(Theme::indicator_color(indicator)),
            ));
        }
        spans.push(Span::styled("] ", Style::new().fg(Theme::TEXT_KEY)));
    }
    Line::from(spans)
}
