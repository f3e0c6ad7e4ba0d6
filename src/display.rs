//! Plain-text formatting for terminal output.

use chrono::Local;
use unicode_width::UnicodeWidthChar;

use flashmind::CardSet;

pub const NAME_WIDTH: usize = 32;
pub const TEXT_WIDTH: usize = 72;

/// Pad or cut `text` to exactly `width` terminal columns.
pub fn fit(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push_str(&" ".repeat(width - used));
    out
}

/// Wrap `text` and indent every line.
pub fn wrapped(text: &str, indent: &str) -> String {
    let options = textwrap::Options::new(TEXT_WIDTH)
        .initial_indent(indent)
        .subsequent_indent(indent);
    textwrap::fill(text, options)
}

pub fn score_label(set: &CardSet) -> String {
    match set.last_score {
        Some(score) => format!("{:>3}%", score),
        None => "   -".to_string(),
    }
}

pub fn played_label(set: &CardSet) -> String {
    match set.last_played_at {
        Some(at) => at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => "never".to_string(),
    }
}

pub fn set_row(set: &CardSet) -> String {
    format!(
        "{:>14}  {}  {:>4} cards  {}  {}",
        set.id,
        fit(&set.name, NAME_WIDTH),
        set.cards.len(),
        score_label(set),
        played_label(set)
    )
}

pub fn list_header() -> String {
    format!(
        "{:>14}  {}  {:>10}  {:>4}  {}",
        "id",
        fit("name", NAME_WIDTH),
        "size",
        "last",
        "played"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashmind::{Card, CardId, SetId};

    #[test]
    fn test_fit_pads_and_truncates_by_columns() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 3), "abc");
        assert_eq!(fit("Слова", 6), "Слова ");
        // Wide characters take two columns each.
        assert_eq!(fit("日本語", 5), "日本 ");
    }

    #[test]
    fn test_wrapped_indents_every_line() {
        let text = "word ".repeat(30);
        let out = wrapped(text.trim(), "  ");
        assert!(out.lines().count() > 1);
        assert!(out.lines().all(|l| l.starts_with("  ")));
    }

    #[test]
    fn test_labels_for_unplayed_set() {
        let set = CardSet::new(SetId(1), "n", vec![Card::new(CardId(1), "q", "a")]);
        assert_eq!(score_label(&set), "   -");
        assert_eq!(played_label(&set), "never");
        assert!(set_row(&set).contains("1 cards"));
    }
}
