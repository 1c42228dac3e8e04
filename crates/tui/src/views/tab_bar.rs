use crate::theme::Theme;
use lazyaz_core::Domain;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

pub fn render(frame: &mut Frame, domains: &[Domain], active: usize, area: Rect) {
    let mut spans = vec![Span::styled(
        " lazyaz ",
        Style::new().fg(Theme::ACCENT_ORANGE).bold(),
    )];
    spans.push(Span::styled(" ", Style::new()));

    for (idx, domain) in domains.iter().enumerate() {
        let style = if idx == active {
            Style::new()
                .fg(Color::Black)
                .bg(Theme::ACCENT_BLUE)
                .bold()
                .add_modifier(Modifier::UNDERLINED)
        } else {
            Style::new().fg(Theme::TAB_INACTIVE)
        };
        spans.push(Span::styled(format!(" {} ", domain.title()), style));
        spans.push(Span::styled(" ", Style::new()));
    }

    spans.push(Span::styled("[/] ", Style::new().fg(Theme::TEXT_KEY)));
    spans.push(Span::styled("switch", Style::new().fg(Theme::TEXT_KEY_DESC)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::render;
    use crate::views::test_support::buffer_to_string;
    use lazyaz_core::Domain;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn shows_every_page_title() {
        let backend = TestBackend::new(100, 1);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal
            .draw(|frame| {
                let area = frame.area();
                render(frame, &Domain::ALL, 1, area);
            })
            .expect("draw");
        let text = buffer_to_string(terminal.backend().buffer());
        assert!(text.contains("Work Items"));
        assert!(text.contains("Pull Requests"));
        assert!(text.contains("Pipelines"));
    }
}
