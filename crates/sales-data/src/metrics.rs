//! Summary statistics over the canonical dataset.
//!
//! Averages are taken over per-day sums, not over individual records, so a
//! day with many small sales weighs the same as a day with one large sale.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sales_core::formatting::{
    format_currency, format_date, format_date_range, format_percent_change,
};
use sales_core::models::{CanonicalDataset, DerivedMetrics, NormalizedSalesRecord};

/// Sum `sales` per calendar date, ascending.
pub fn daily_totals<'a, I>(records: I) -> BTreeMap<NaiveDate, Decimal>
where
    I: IntoIterator<Item = &'a NormalizedSalesRecord>,
{
    let mut totals: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for rec in records {
        *totals.entry(rec.date).or_insert(Decimal::ZERO) += rec.sales;
    }
    totals
}

/// Totals, daily averages, and the before/after comparison around `cutoff`.
///
/// Days strictly before `cutoff` form the before-partition; the cutoff day
/// itself counts as after. An empty partition averages to zero, and the
/// percent change is zero whenever the before average is zero.
pub fn compute_summary(dataset: &CanonicalDataset, cutoff: NaiveDate) -> DerivedMetrics {
    let daily = daily_totals(dataset.records());

    let total_sales: Decimal = dataset.records().iter().map(|r| r.sales).sum();
    let (avg_daily_sales, _) = mean(daily.values().copied());
    let (before_avg, days_before) = mean(daily.range(..cutoff).map(|(_, v)| *v));
    let (after_avg, days_after) = mean(daily.range(cutoff..).map(|(_, v)| *v));

    DerivedMetrics {
        total_sales,
        avg_daily_sales,
        date_range: dataset.date_range(),
        before_avg,
        after_avg,
        percent_change: percent_change(before_avg, after_avg),
        cutoff,
        days_before,
        days_after,
    }
}

/// Total sales per region, sorted by region name.
pub fn region_totals(dataset: &CanonicalDataset) -> Vec<(String, Decimal)> {
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    for rec in dataset.records() {
        *totals.entry(rec.region.as_str()).or_insert(Decimal::ZERO) += rec.sales;
    }
    totals
        .into_iter()
        .map(|(region, total)| (region.to_string(), total))
        .collect()
}

/// `(after - before) / before * 100`, zero when `before` is not positive.
pub fn percent_change(before: Decimal, after: Decimal) -> Decimal {
    if before <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (after - before)
        .checked_div(before)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

/// Plain-text report of `metrics` and the per-region totals.
pub fn format_summary(metrics: &DerivedMetrics, regions: &[(String, Decimal)]) -> String {
    let cutoff = format_date(metrics.cutoff);
    let mut lines = vec![
        format!("Date range:      {}", format_date_range(metrics.date_range)),
        format!("Total sales:     {}", format_currency(metrics.total_sales)),
        format!("Avg daily sales: {}", format_currency(metrics.avg_daily_sales)),
        format!(
            "Before {cutoff}: {}/day over {} day(s)",
            format_currency(metrics.before_avg),
            metrics.days_before
        ),
        format!(
            "From {cutoff}:   {}/day over {} day(s)",
            format_currency(metrics.after_avg),
            metrics.days_after
        ),
        format!("Change:          {}", format_percent_change(metrics.percent_change)),
    ];

    if !regions.is_empty() {
        lines.push("Sales by region:".to_string());
        let width = regions.iter().map(|(r, _)| r.len()).max().unwrap_or(0);
        for (region, total) in regions {
            lines.push(format!("  {region:<width$}  {}", format_currency(*total)));
        }
    }
    lines.join("\n")
}

fn mean(values: impl Iterator<Item = Decimal>) -> (Decimal, usize) {
    let (sum, count) = values.fold((Decimal::ZERO, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        return (Decimal::ZERO, 0);
    }
    let avg = sum.checked_div(Decimal::from(count)).unwrap_or(Decimal::ZERO);
    (avg, count)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
