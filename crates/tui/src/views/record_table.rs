use crate::app::App;
use crate::engine::{BrowserPage, FetchPhase, RowView};
use crate::theme::{Theme, status_color};
use lazyaz_core::Column;
use ratatui::prelude::*;
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState, Wrap};
use unicode_width::UnicodeWidthStr;

/// Widest a fixed column may grow before its cells get cut.
const MAX_FIXED_WIDTH: usize = 32;

/// Headers whose cells are colored by status word.
const STATUS_HEADERS: &[&str] = &["State", "Status", "Result", "Merge"];

pub fn render(frame: &mut Frame, app: &App, page: &dyn BrowserPage, area: Rect) {
    let block = Theme::block().title(title(page));
    let rows = page.rows();

    if rows.is_empty() {
        let (text, color) = match page.phase() {
            FetchPhase::Idle | FetchPhase::Fetching => ("Loading...".to_string(), Theme::ACCENT_YELLOW),
            FetchPhase::Empty | FetchPhase::Populated => ("No results".to_string(), Theme::TEXT_SECONDARY),
            FetchPhase::Error(reason) => (format!("Failed to load: {reason}"), Theme::ACCENT_RED),
        };
        let body = Paragraph::new(Line::from(Span::styled(text, Style::new().fg(color))))
            .block(block.padding(Theme::PADDING_COMPACT))
            .wrap(Wrap { trim: true });
        frame.render_widget(body, area);
        return;
    }

    let columns = page.columns();
    let highlight = app
        .highlight
        .filter(|h| h.domain == page.domain() && page.search().is_active())
        .map(|h| h.coord);

    let header = Row::new(
        columns
            .iter()
            .map(|c| Cell::from(c.header).style(Style::new().fg(Theme::ACCENT_BLUE).bold())),
    );
    let body: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let mine = app.is_mine(row.owner.as_deref());
            let cells = row.cells.iter().enumerate().map(|(col_idx, text)| {
                let mut style = Style::new().fg(if mine {
                    Theme::ROW_MINE
                } else {
                    Theme::TEXT_CONTENT
                });
                if columns
                    .get(col_idx)
                    .is_some_and(|c| STATUS_HEADERS.contains(&c.header))
                {
                    style = style.fg(status_color(text));
                }
                if highlight == Some((row_idx, col_idx)) {
                    style = style.fg(Color::Black).bg(Theme::MATCH_BG);
                }
                Cell::from(text.as_str()).style(style)
            });
            Row::new(cells)
        })
        .collect();

    let table = Table::new(body, widths(columns, &rows))
        .header(header)
        .block(block)
        .column_spacing(2)
        .row_highlight_style(
            Style::new()
                .bg(Theme::ROW_SELECTED_BG)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(" > ")
        .highlight_spacing(ratatui::widgets::HighlightSpacing::Always);

    let mut state = TableState::default().with_selected(Some(page.selected_index()));
    frame.render_stateful_widget(table, area, &mut state);
}

fn title(page: &dyn BrowserPage) -> Line<'static> {
    let filter_label = page
        .filter_options()
        .iter()
        .find(|o| o.key == page.filter())
        .map_or_else(|| page.filter().to_string(), |o| o.label.clone());
    let mut spans = vec![
        Span::styled(
            format!(" {} ", page.domain().title()),
            Style::new().fg(Theme::TEXT_PRIMARY).bold(),
        ),
        Span::styled(
            format!("· {filter_label} "),
            Style::new().fg(Theme::ACCENT_BLUE),
        ),
    ];
    match page.phase() {
        FetchPhase::Fetching => spans.push(Span::styled(
            "Loading... ",
            Style::new().fg(Theme::ACCENT_YELLOW).italic(),
        )),
        FetchPhase::Error(_) if !page.rows().is_empty() => spans.push(Span::styled(
            "(refresh failed) ",
            Style::new().fg(Theme::ACCENT_RED),
        )),
        FetchPhase::Populated => spans.push(Span::styled(
            format!("{} ", page.rows().len()),
            Style::new().fg(Theme::TEXT_SECONDARY),
        )),
        _ => {}
    }
    if let Some(shown) = page.records_filter().filter(|f| *f != page.filter()) {
        spans.push(Span::styled(
            format!("(showing {shown}) "),
            Style::new().fg(Theme::TEXT_MUTED),
        ));
    }
    Line::from(spans)
}

/// Fixed columns fit their widest cell (capped); the expanding column
/// takes what is left.
fn widths(columns: &[Column], rows: &[RowView]) -> Vec<Constraint> {
    columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            if column.expand {
                return Constraint::Fill(1);
            }
            let widest = rows
                .iter()
                .filter_map(|r| r.cells.get(idx))
                .map(|c| UnicodeWidthStr::width(c.as_str()))
                .max()
                .unwrap_or(0)
                .max(UnicodeWidthStr::width(column.header))
                .min(MAX_FIXED_WIDTH);
            Constraint::Length(widest as u16)
        })
        .collect()
}
