//! Block chain pane rendering
//!
//! Shows the boundary-tagged chain of the current snapshot: one row per
//! block with its status bits, span, and size, topped by a proportional
//! usage gauge and followed by used/free totals. Free blocks are green,
//! used blocks blue, matching the dump table's reading of the same chain.

use crate::heap::Heap;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// A one-line gauge where each block gets width proportional to its size.
fn usage_gauge(heap: &Heap, width: usize) -> Line<'static> {
    let usable = heap.usable_size().max(1);
    let mut spans = Vec::new();

    for block in heap.blocks() {
        let cells = (block.size * width / usable).max(1);
        let (symbol, color) = if block.allocated {
            ("█", DEFAULT_THEME.primary)
        } else {
            ("░", DEFAULT_THEME.success)
        };
        spans.push(Span::styled(
            symbol.repeat(cells),
            Style::default().fg(color),
        ));
    }

    Line::from(spans)
}

/// Render the block chain pane.
pub fn render_blocks_pane(
    frame: &mut Frame,
    area: Rect,
    heap: Option<&Heap>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(" Heap Blocks ")
        .borders(Borders::ALL)
        .border_style(super::border_style(is_focused));

    let Some(heap) = heap else {
        let paragraph = Paragraph::new("(heap not initialized)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    };

    let content_width = area.width.saturating_sub(2) as usize;
    let mut all_items = Vec::new();

    all_items.push(ListItem::new(usage_gauge(heap, content_width.max(1))));
    all_items.push(ListItem::new(""));

    for view in heap.blocks() {
        let (status, status_color) = if view.allocated {
            ("used", DEFAULT_THEME.primary)
        } else {
            ("free", DEFAULT_THEME.success)
        };
        let prev = if view.prev_allocated { "used" } else { "free" };

        let row = Line::from(vec![
            Span::styled(
                format!("#{:<3}", view.index + 1),
                Style::default().fg(DEFAULT_THEME.comment),
            ),
            Span::styled(format!(" {} ", status), Style::default().fg(status_color)),
            Span::styled(
                format!("prev:{} ", prev),
                Style::default().fg(DEFAULT_THEME.comment),
            ),
            Span::styled(
                format!("0x{:08x}..0x{:08x} ", view.start, view.end()),
                Style::default().fg(DEFAULT_THEME.fg),
            ),
            Span::styled(
                format!("{} bytes", view.size),
                Style::default().fg(DEFAULT_THEME.number),
            ),
        ]);
        all_items.push(ListItem::new(row));
    }

    all_items.push(ListItem::new(""));
    all_items.push(ListItem::new(Line::from(vec![
        Span::styled("used ", Style::default().fg(DEFAULT_THEME.comment)),
        Span::styled(
            format!("{}", heap.used_bytes()),
            Style::default().fg(DEFAULT_THEME.primary),
        ),
        Span::styled("  free ", Style::default().fg(DEFAULT_THEME.comment)),
        Span::styled(
            format!("{}", heap.free_bytes()),
            Style::default().fg(DEFAULT_THEME.success),
        ),
        Span::styled("  of ", Style::default().fg(DEFAULT_THEME.comment)),
        Span::styled(
            format!("{}", heap.usable_size()),
            Style::default().fg(DEFAULT_THEME.fg),
        ),
    ])));

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
