//! Per-day trend queries behind the dashboard chart.

use chrono::NaiveDate;
use sales_core::models::{CanonicalDataset, ChartSeries, CutoffMarker, RegionFilter, TrendPoint};
use tracing::debug;

use crate::metrics::daily_totals;

/// Daily sales for `filter`, ascending by date, with the position of
/// `cutoff` among the points.
///
/// Recomputed from the dataset on every call; nothing is cached.
pub fn query_trend(
    dataset: &CanonicalDataset,
    filter: RegionFilter,
    cutoff: NaiveDate,
) -> ChartSeries {
    let points: Vec<TrendPoint> = daily_totals(
        dataset
            .records()
            .iter()
            .filter(|r| filter.matches(&r.region)),
    )
    .into_iter()
    .map(|(date, sales)| TrendPoint { date, sales })
    .collect();

    let index = points.partition_point(|p| p.date < cutoff);
    debug!(
        "Trend for region={}: {} point(s), cutoff index {}",
        filter,
        points.len(),
        index
    );

    ChartSeries {
        region: filter,
        points,
        cutoff: CutoffMarker {
            date: cutoff,
            index,
        },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
