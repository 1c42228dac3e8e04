use crate::app::{App, ConnectionStatus, Overlay};
use crate::theme::Theme;
use crate::views::{detail_panel, filter_picker, help, record_table, tab_bar};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

pub fn render(frame: &mut Frame, app: &App) {
    let [tab_area, body_area, status_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let domains: Vec<_> = app.pages.iter().map(|p| p.domain()).collect();
    tab_bar::render(frame, &domains, app.active, tab_area);

    if let Some(page) = app.page() {
        if page.details_visible() && page.details_expanded() {
            detail_panel::render(frame, app, page, body_area);
        } else if page.details_visible() {
            let [table_area, detail_area] =
                Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                    .areas(body_area);
            record_table::render(frame, app, page, table_area);
            detail_panel::render(frame, app, page, detail_area);
        } else {
            record_table::render(frame, app, page, body_area);
        }
    }

    render_status(frame, app, status_area);
    render_footer(frame, app, footer_area);

    match &app.overlay {
        Overlay::Hotkeys => help::render(frame, frame.area()),
        Overlay::FilterPicker { index } => {
            if let Some(page) = app.page() {
                filter_picker::render(frame, page, *index, frame.area());
            }
        }
        Overlay::Search { .. } | Overlay::None => {}
    }
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let (connection, color) = match &app.connection {
        ConnectionStatus::Connecting => ("connecting...".to_string(), Theme::ACCENT_YELLOW),
        ConnectionStatus::Connected(profile) => {
            (format!("connected as {}", profile.label()), Theme::ACCENT_GREEN)
        }
        ConnectionStatus::Failed(reason) => (reason.clone(), Theme::ACCENT_RED),
    };
    let connection_width = u16::try_from(connection.chars().count() + 2).unwrap_or(u16::MAX);
    let [message_area, connection_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(connection_width)])
            .areas(area);

    if let Some(active) = &app.announcement {
        let announcement = &active.announcement;
        let line = Line::from(Span::styled(
            format!(" {}", announcement.message),
            Style::new().fg(Theme::announce_color(announcement.level)),
        ));
        frame.render_widget(Paragraph::new(line), message_area);
    }
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(connection, Style::new().fg(color))))
            .alignment(Alignment::Right),
        connection_area,
    );
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let key_style = Style::new().fg(Theme::TEXT_KEY);
    let desc_style = Style::new().fg(Theme::TEXT_KEY_DESC);

    let line = if let Overlay::Search { input } = &app.overlay {
        Line::from(vec![
            Span::styled(
                " / ",
                Style::new()
                    .fg(Color::Black)
                    .bg(Theme::ACCENT_YELLOW)
                    .bold(),
            ),
            Span::styled(format!(" {input}"), Style::new().fg(Theme::TEXT_PRIMARY)),
            Span::styled("_", Style::new().fg(Theme::ACCENT_YELLOW)),
            Span::styled("  Esc cancel  Enter search", desc_style),
        ])
    } else {
        let details_visible = app.page().is_some_and(|p| p.details_visible());
        let mut spans = vec![
            Span::styled(" j/k ", key_style),
            Span::styled("navigate  ", desc_style),
            Span::styled("Enter ", key_style),
            Span::styled("details  ", desc_style),
            Span::styled("/ ", key_style),
            Span::styled("search  ", desc_style),
            Span::styled("\\ ", key_style),
            Span::styled("filter  ", desc_style),
            Span::styled("r ", key_style),
            Span::styled("refresh  ", desc_style),
        ];
        if details_visible {
            spans.push(Span::styled("1-9 ", key_style));
            spans.push(Span::styled("extensions  ", desc_style));
            spans.push(Span::styled("d ", key_style));
            spans.push(Span::styled("expand  ", desc_style));
        }
        spans.push(Span::styled("? ", key_style));
        spans.push(Span::styled("hotkeys  ", desc_style));
        spans.push(Span::styled("Esc ", key_style));
        spans.push(Span::styled("quit", desc_style));
        Line::from(spans)
    };
    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::render;
    use crate::app::App;
    use crate::engine::{BrowserController, BrowserPage};
    use crate::extensions::{EntryPointTable, ExtensionRegistry};
    use crate::views::test_support::buffer_to_string;
    use lazyaz_core::testing::{ScriptedSource, Ticket, tickets};
    use lazyaz_runtime_config::{UiSettings, default_extensions};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(120, 20);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal.draw(|frame| render(frame, app)).expect("draw");
        buffer_to_string(terminal.backend().buffer())
    }

    #[test]
    fn renders_rows_and_detail_placeholder() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .build()
            .unwrap();
        let source = Arc::new(ScriptedSource::<Ticket>::new());
        source.set_list("all", tickets(&["Upgrade toolchain", "Fix flaky test"]));
        source.hold_detail(1);
        let page: Box<dyn BrowserPage> =
            Box::new(BrowserController::<Ticket>::new(source.clone(), rt.handle().clone()));
        let registry = ExtensionRegistry::load(&default_extensions(), &EntryPointTable::builtin());
        let mut app = App::new(vec![page], registry, &UiSettings::default());
        app.start();

        let deadline = Instant::now() + Duration::from_secs(5);
        while app.page().is_some_and(|p| p.rows().is_empty()) {
            assert!(Instant::now() < deadline);
            app.tick(Instant::now());
            std::thread::sleep(Duration::from_millis(5));
        }
        let text = draw(&app);
        assert!(text.contains("Upgrade toolchain"));
        assert!(text.contains("Fix flaky test"));

        app.pages[0].toggle_details();
        let text = draw(&app);
        assert!(text.contains("Loading..."));
        assert!(text.contains("Copy Link"));
        source.release_detail(&1);
    }
}
