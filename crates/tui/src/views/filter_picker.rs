use crate::engine::BrowserPage;
use crate::theme::Theme;
use crate::views::centered;
use ratatui::prelude::*;
use ratatui::widgets::{Clear, List, ListItem, ListState};

pub fn render(frame: &mut Frame, page: &dyn BrowserPage, index: usize, area: Rect) {
    let options = page.filter_options();
    let height = u16::try_from(options.len()).unwrap_or(u16::MAX).saturating_add(2);
    let popup_area = centered(area, 44, height.min(20));
    frame.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = options
        .iter()
        .map(|option| {
            let marker = if option.key == page.filter() { "● " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::new().fg(Theme::ACCENT_GREEN)),
                Span::styled(option.label.clone(), Style::new().fg(Theme::TEXT_CONTENT)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Theme::block_accent().title(format!(" {} filter ", page.domain().title())))
        .highlight_style(
            Style::new()
                .bg(Theme::ROW_SELECTED_BG)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(" > ");

    let mut state = ListState::default().with_selected(Some(index));
    frame.render_stateful_widget(list, popup_area, &mut state);
}
