use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Texture drawn behind the lyrics when a background image is applied. The
/// projector terminal cannot show pixels, so the image is represented by a
/// repeated motif.
pub(crate) const BACKGROUND_ART: [&str; 4] = [".   *   .   ", "  .   .   . ", "*   .   *   ", "  .   .   . "];

/// Repeat a short motif until it fills the requested width.
pub(crate) fn repeat_pattern_row(row: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    if row.is_empty() {
        return " ".repeat(width);
    }
    row.chars().cycle().take(width).collect()
}

/// Fill an area of `width` x `height` cells with the background motif.
pub(crate) fn pattern_lines(pattern: &[&str], width: u16, height: u16) -> Vec<Line<'static>> {
    let style = Style::default().fg(Color::DarkGray);
    (0..height as usize)
        .map(|row| {
            let base = if pattern.is_empty() {
                ""
            } else {
                pattern[row % pattern.len()]
            };
            Line::from(Span::styled(repeat_pattern_row(base, width as usize), style))
        })
        .collect()
}

/// Number of rows `text` occupies when word-wrapped to `width` columns.
/// Mirrors the greedy wrapping of `Paragraph` closely enough for vertical
/// centering.
pub(crate) fn wrapped_height(text: &str, width: u16) -> u16 {
    let width = width.max(1) as usize;
    let mut rows = 0usize;
    for line in text.lines() {
        let mut current = 0usize;
        let mut line_rows = 1usize;
        for word in line.split_whitespace() {
            let len = word.chars().count();
            if current == 0 {
                current = len;
            } else if current + 1 + len <= width {
                current += 1 + len;
            } else {
                line_rows += 1;
                current = len;
            }
            while current > width {
                line_rows += 1;
                current -= width;
            }
        }
        rows += line_rows;
    }
    rows.max(1).min(u16::MAX as usize) as u16
}

/// `[key] label` footer hint, key in bold cyan.
pub(crate) fn key_hint(key: &str, label: &str) -> Vec<Span<'static>> {
    vec![
        Span::styled(
            format!("[{key}]"),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {label}  ")),
    ]
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Context};

    use super::*;

    #[test]
    fn pattern_row_fills_width() {
        assert_eq!(repeat_pattern_row("ab", 5), "ababa");
        assert_eq!(repeat_pattern_row("", 3), "   ");
        assert_eq!(repeat_pattern_row("é·", 3), "é·é");
    }

    #[test]
    fn wrapped_height_counts_rows() {
        assert_eq!(wrapped_height("", 10), 1);
        assert_eq!(wrapped_height("one two three", 7), 2);
        assert_eq!(wrapped_height("a\nb\nc", 10), 3);
        assert_eq!(wrapped_height("abcdefghij", 4), 3);
    }

    #[test]
    fn surface_error_uses_root_cause() {
        let err = Err::<(), _>(anyhow!("Hymn not found"))
            .context("failed to delete hymn")
            .unwrap_err();
        assert_eq!(surface_error(&err), "Hymn not found");
    }
}
