pub mod detail_panel;
pub mod filter_picker;
pub mod help;
pub mod record_table;
pub mod tab_bar;

use ratatui::prelude::Rect;

/// Centered popup area, clamped to fit inside `area` with a margin.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    Rect::new(x, y, popup_width, popup_height)
}

#[cfg(test)]
pub(crate) mod test_support {
    use ratatui::buffer::Buffer;

    pub fn buffer_to_string(buffer: &Buffer) -> String {
        let area = *buffer.area();
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }
}
