/// ANSI color codes
pub struct Color;

impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
}

pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// Ten-cell bar for a 0-100 strength
pub fn strength_bar(strength: f64, use_color: bool) -> String {
    let filled = (strength.clamp(0.0, 100.0) / 10.0).round() as usize;
    let bar = format!("{}{}", "\u{2588}".repeat(filled), "\u{2591}".repeat(10 - filled));
    let color = if strength >= 70.0 {
        Color::GREEN
    } else if strength >= 40.0 {
        Color::YELLOW
    } else {
        Color::RED
    };
    paint(&bar, color, use_color)
}

/// Column width for a set of values, bounded to keep tables readable
pub fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str, max: usize) -> usize {
    values
        .map(|v| v.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(header.len(), max.max(header.len()))
}

pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{}\u{2026}", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_bar_plain() {
        assert_eq!(strength_bar(50.0, false).chars().filter(|c| *c == '\u{2588}').count(), 5);
        assert_eq!(strength_bar(140.0, false).chars().count(), 10);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title", 6), "a lon\u{2026}");
    }

    #[test]
    fn test_column_width_bounds() {
        assert_eq!(column_width(["ab"].into_iter(), "Title", 40), 5);
        assert_eq!(column_width(["x".repeat(60).as_str()].into_iter(), "Title", 40), 40);
    }
}
