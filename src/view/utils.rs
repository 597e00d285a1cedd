//! Utility functions for rendering UI components

use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, List, ListItem, ListState},
    Frame,
};

pub fn render_scrollable_list(frame: &mut Frame, area: Rect, items: Vec<ListItem>, selected_index: usize, block: Block) {
    let selected = (!items.is_empty()).then_some(selected_index);
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(selected);

    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Width of the index column: digit count plus one space
pub fn calculate_num_width(item_count: usize) -> usize {
    let mut digits = 1;
    let mut n = item_count;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits + 1
}

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn num_width_grows_with_digits() {
        assert_eq!(calculate_num_width(0), 2);
        assert_eq!(calculate_num_width(9), 2);
        assert_eq!(calculate_num_width(10), 3);
        assert_eq!(calculate_num_width(1234), 5);
    }

    #[test]
    fn truncation_counts_chars() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("a long song title", 10), "a long ...");
        assert_eq!(truncate_string("ééééééé", 5), "éé...");
    }
}
