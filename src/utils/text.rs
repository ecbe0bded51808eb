use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";

/// Prepare a value for a single table cell: control characters and line
/// breaks become spaces, and the result is cut to `max_width` display columns.
pub fn cell_text(text: &str, max_width: usize) -> String {
    let single_line: String = text
        .chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect();
    truncate_to_width(&single_line, max_width)
}

/// Cut `text` to at most `max_width` display columns, ending in `...` when cut.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width <= ELLIPSIS.len() {
        return ELLIPSIS[..max_width].to_string();
    }

    let budget = max_width - ELLIPSIS.len();
    let mut result = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > budget {
            break;
        }
        result.push(ch);
        used += ch_width;
    }
    result.push_str(ELLIPSIS);
    result
}
