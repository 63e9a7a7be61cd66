//! Script pane rendering with light syntax tinting
//!
//! Shows the trace script being executed, with the line of the step about
//! to run highlighted and an arrow indicator in the gutter. Command words,
//! sizes, and comments get their own colors via a tiny per-line tokenizer.

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Tint one script line: comments grey, command words blue, sizes orange.
fn highlight_line(text: &str) -> Vec<Span<'static>> {
    let mut spans = Vec::new();

    let (code, comment) = match text.split_once('#') {
        Some((code, comment)) => (code, Some(comment)),
        None => (text, None),
    };

    let mut rest = code;
    while !rest.is_empty() {
        let trimmed = rest.trim_start();
        let pad = rest.len() - trimmed.len();
        if pad > 0 {
            spans.push(Span::raw(rest[..pad].to_string()));
        }
        let end = trimmed
            .find(char::is_whitespace)
            .unwrap_or(trimmed.len());
        if end == 0 {
            break;
        }
        let word = &trimmed[..end];

        let style = match word {
            "init" | "alloc" | "free" | "dump" => Style::default()
                .fg(DEFAULT_THEME.keyword)
                .add_modifier(Modifier::BOLD),
            "=" | "!" => Style::default().fg(DEFAULT_THEME.secondary),
            _ if word.chars().all(|c| c.is_ascii_digit()) => {
                Style::default().fg(DEFAULT_THEME.number)
            }
            _ => Style::default().fg(DEFAULT_THEME.fg),
        };
        spans.push(Span::styled(word.to_string(), style));
        rest = &trimmed[end..];
    }

    if let Some(comment) = comment {
        spans.push(Span::styled(
            format!("#{}", comment),
            Style::default().fg(DEFAULT_THEME.comment),
        ));
    }

    spans
}

/// Render the script pane.
pub fn render_script_pane(
    frame: &mut Frame,
    area: Rect,
    source: &str,
    current_line: Option<usize>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(" Trace Script ")
        .borders(Borders::ALL)
        .border_style(super::border_style(is_focused));

    let source_lines: Vec<&str> = source.lines().collect();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    super::clamp_scroll(scroll_offset, source_lines.len(), visible_height);

    // Keep the current line in view when not manually scrolled past it
    if let Some(line) = current_line {
        let row = line - 1;
        if row < *scroll_offset {
            *scroll_offset = row;
        } else if row >= *scroll_offset + visible_height {
            *scroll_offset = row + 1 - visible_height;
        }
    }

    let gutter_width = source_lines.len().to_string().len().max(2);
    let mut rendered = Vec::new();

    for (row, text) in source_lines
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
    {
        let line_number = row + 1;
        let is_current = current_line == Some(line_number);

        let marker = if is_current { "▶" } else { " " };
        let gutter = Span::styled(
            format!("{} {:>width$} ", marker, line_number, width = gutter_width),
            Style::default().fg(if is_current {
                DEFAULT_THEME.secondary
            } else {
                DEFAULT_THEME.comment
            }),
        );

        let mut spans = vec![gutter];
        spans.extend(highlight_line(text));

        let mut line = Line::from(spans);
        if is_current {
            line = line.style(Style::default().bg(DEFAULT_THEME.current_line_bg));
        }
        rendered.push(line);
    }

    let paragraph = Paragraph::new(rendered).block(block);
    frame.render_widget(paragraph, area);
}
