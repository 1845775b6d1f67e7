use chrono::NaiveDate;
use ratatui::text::{Line, Span};
use sales_core::formatting::format_date;
use unicode_width::UnicodeWidthStr;

use crate::themes::Theme;

/// Decoration placed either side of the title.
pub const ACCENT: &str = "✦ ✧";

pub const TITLE: &str = "SOUL FOODS SALES DASHBOARD";

/// Narrowest separator drawn under the title.
const MIN_SEPARATOR_WIDTH: usize = 60;

/// Dashboard header, three lines:
///
/// 1. The title between accents.
/// 2. A `=` separator at least as wide as the title line.
/// 3. `Performance before & after Jan 15, 2021 price increase`.
pub struct Header<'a> {
    pub cutoff: NaiveDate,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(cutoff: NaiveDate, theme: &'a Theme) -> Self {
        Self { cutoff, theme }
    }

    pub fn subtitle(&self) -> String {
        format!(
            "Performance before & after {} price increase",
            format_date(self.cutoff)
        )
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let title = format!("{ACCENT} {TITLE} {ACCENT}");
        let width = title.width().max(MIN_SEPARATOR_WIDTH);

        vec![
            Line::from(vec![
                Span::styled(ACCENT, self.theme.header_accent),
                Span::styled(format!(" {TITLE} "), self.theme.header),
                Span::styled(ACCENT, self.theme.header_accent),
            ]),
            Line::from(Span::styled("=".repeat(width), self.theme.separator)),
            Line::from(Span::styled(self.subtitle(), self.theme.subtitle)),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
