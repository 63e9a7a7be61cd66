//! TUI pane rendering modules
//!
//! Stateless render functions for the visible panes, one module per pane:
//!
//! - [`script`]: the trace script with the current step highlighted
//! - [`blocks`]: the block chain of the current heap snapshot
//! - [`pointers`]: live name → address bindings
//! - [`output`]: the session log (dump tables, results, errors)
//! - [`status`]: status bar with keybindings and step position
//!
//! Each module exports a `render_*_pane()` function taking the frame, the
//! target area, the data to show, the focus flag, and a mutable scroll
//! offset that the renderer clamps against the content.

pub mod blocks;
pub mod output;
pub mod pointers;
pub mod script;
pub mod status;

pub use blocks::render_blocks_pane;
pub use output::render_output_pane;
pub use pointers::render_pointers_pane;
pub use script::render_script_pane;
pub use status::render_status_bar;

use crate::ui::theme::DEFAULT_THEME;
use ratatui::style::{Modifier, Style};

/// Border style shared by every pane.
pub(crate) fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    }
}

/// Clamp a scroll offset so the visible window never runs past the content.
pub(crate) fn clamp_scroll(scroll_offset: &mut usize, total_items: usize, visible_height: usize) {
    if total_items > visible_height {
        let max_scroll = total_items - visible_height;
        *scroll_offset = (*scroll_offset).min(max_scroll);
    } else {
        *scroll_offset = 0;
    }
}
