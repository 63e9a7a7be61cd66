//! Pointer bindings pane rendering
//!
//! Lists the names currently bound by the script, with the payload address
//! and requested size of each. Sorted by address so the listing reads in
//! heap order.

use crate::script::Pointer;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use rustc_hash::FxHashMap;

/// Render the pointers pane.
pub fn render_pointers_pane(
    frame: &mut Frame,
    area: Rect,
    pointers: &FxHashMap<String, Pointer>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(" Pointers ")
        .borders(Borders::ALL)
        .border_style(super::border_style(is_focused));

    if pointers.is_empty() {
        let paragraph = Paragraph::new("(no live pointers)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let mut sorted: Vec<(&String, &Pointer)> = pointers.iter().collect();
    sorted.sort_by_key(|(_, pointer)| pointer.address);

    let all_items: Vec<ListItem> = sorted
        .into_iter()
        .map(|(name, pointer)| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<12}", name),
                    Style::default().fg(DEFAULT_THEME.fg),
                ),
                Span::styled(
                    format!("0x{:08x} ", pointer.address),
                    Style::default().fg(DEFAULT_THEME.comment),
                ),
                Span::styled(
                    format!("{} bytes", pointer.size),
                    Style::default().fg(DEFAULT_THEME.number),
                ),
            ]))
        })
        .collect();

    let total_items = all_items.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    super::clamp_scroll(scroll_offset, total_items, visible_height);

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    let list = List::new(visible_items).block(block);
    frame.render_widget(list, area);
}
