use ratatui::text::{Line, Span};
use rust_decimal::Decimal;
use sales_core::formatting::format_percent_change;
use sales_core::models::RegionFilter;

use crate::themes::Theme;

// ── ChangeIndicator ──────────────────────────────────────────────────────────

/// Signed before/after percent change with an arrow.
///
/// | change | arrow |
/// |--------|-------|
/// | > 0    | ▲     |
/// | < 0    | ▼     |
/// | 0      | ■     |
pub struct ChangeIndicator<'a> {
    pub percent_change: Decimal,
    pub theme: &'a Theme,
}

impl<'a> ChangeIndicator<'a> {
    pub fn new(percent_change: Decimal, theme: &'a Theme) -> Self {
        Self {
            percent_change,
            theme,
        }
    }

    pub fn arrow(&self) -> &'static str {
        if self.percent_change > Decimal::ZERO {
            "▲"
        } else if self.percent_change < Decimal::ZERO {
            "▼"
        } else {
            "■"
        }
    }

    /// `"▲ +12.3%"`
    pub fn to_line(&self) -> Line<'a> {
        let style = self.theme.change_style(self.percent_change);
        Line::from(vec![
            Span::styled(self.arrow(), style),
            Span::raw(" "),
            Span::styled(format_percent_change(self.percent_change), style),
        ])
    }

    /// `"Daily sales changed by +12.3% after the price increase."`
    pub fn insight_line(&self) -> Line<'a> {
        Line::from(vec![
            Span::styled("Daily sales changed by ", self.theme.text),
            Span::styled(
                format_percent_change(self.percent_change),
                self.theme.change_style(self.percent_change),
            ),
            Span::styled(" after the price increase.", self.theme.text),
        ])
    }
}

// ── RegionPicker ─────────────────────────────────────────────────────────────

/// Radio-style row of every [`RegionFilter`] choice with its number key.
///
/// Format: `"1 (•) All   2 ( ) North   3 ( ) South ..."`
pub struct RegionPicker<'a> {
    pub selected: RegionFilter,
    pub theme: &'a Theme,
}

impl<'a> RegionPicker<'a> {
    pub fn new(selected: RegionFilter, theme: &'a Theme) -> Self {
        Self { selected, theme }
    }

    pub fn to_line(&self) -> Line<'a> {
        let mut spans = Vec::with_capacity(RegionFilter::CHOICES.len() * 3);
        for (i, choice) in RegionFilter::CHOICES.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(format!("{} ", i + 1), self.theme.picker_key));
            if *choice == self.selected {
                spans.push(Span::styled(
                    format!("(•) {}", choice.label()),
                    self.theme.picker_selected,
                ));
            } else {
                spans.push(Span::styled(
                    format!("( ) {}", choice.label()),
                    self.theme.picker_option,
                ));
            }
        }
        Line::from(spans)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
