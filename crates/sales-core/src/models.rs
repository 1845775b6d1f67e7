use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ParseRegionError;

/// Product line kept by the ingestion pipeline unless overridden.
pub const DEFAULT_PRODUCT: &str = "pink morsel";

/// Date of the price increase that splits the before/after comparison.
pub const DEFAULT_CUTOFF_DATE: &str = "2021-01-15";

/// `chrono` format string for every date read or written by the pipeline.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Columns every source file must carry (in any order).
pub const REQUIRED_SOURCE_COLUMNS: [&str; 5] = ["product", "price", "quantity", "date", "region"];

/// Header of the canonical artifact, in output order.
pub const CANONICAL_COLUMNS: [&str; 3] = ["sales", "date", "region"];

// ── Records ────────────────────────────────────────────────────────────────────

/// One row of a per-store source file, exactly as read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSalesRecord {
    pub product: String,
    /// Currency-formatted price, e.g. `"$3.00"`.
    pub price: String,
    pub quantity: i64,
    /// `YYYY-MM-DD`, not yet validated.
    pub date: String,
    pub region: String,
}

impl RawSalesRecord {
    /// Case-insensitive, whitespace-trimmed exact match against `target`.
    pub fn matches_product(&self, target: &str) -> bool {
        self.product.trim().to_lowercase() == target.trim().to_lowercase()
    }
}

/// A cleaned sale of the target product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSalesRecord {
    /// `price * quantity`, rounded to two fractional digits.
    pub sales: Decimal,
    pub date: NaiveDate,
    /// Lowercased region name.
    pub region: String,
}

impl NormalizedSalesRecord {
    pub fn new(sales: Decimal, date: NaiveDate, region: &str) -> Self {
        Self {
            sales,
            date,
            region: region.trim().to_lowercase(),
        }
    }
}

// ── CanonicalDataset ───────────────────────────────────────────────────────────

/// The normalized, date-sorted collection produced by ingestion and read by
/// every query.
///
/// Construction always applies a stable sort by date, so records sharing a
/// date keep the order in which they were supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalDataset {
    records: Vec<NormalizedSalesRecord>,
}

impl CanonicalDataset {
    pub fn from_records(mut records: Vec<NormalizedSalesRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        Self { records }
    }

    pub fn records(&self) -> &[NormalizedSalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First and last date present, or `None` for an empty dataset.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?;
        let last = self.records.last()?;
        Some((first.date, last.date))
    }

    /// Distinct region names, sorted.
    pub fn regions(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.region.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

// ── Regions ────────────────────────────────────────────────────────────────────

/// The four sales regions shown in the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    North,
    South,
    East,
    West,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::North, Region::South, Region::East, Region::West];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::North => "north",
            Region::South => "south",
            Region::East => "east",
            Region::West => "west",
        }
    }

    /// Capitalised label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Region::North => "North",
            Region::South => "South",
            Region::East => "East",
            Region::West => "West",
        }
    }
}

/// Optional restriction of a trend query to one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RegionFilter {
    #[default]
    All,
    Only(Region),
}

impl RegionFilter {
    /// Every selectable filter in picker order.
    pub const CHOICES: [RegionFilter; 5] = [
        RegionFilter::All,
        RegionFilter::Only(Region::North),
        RegionFilter::Only(Region::South),
        RegionFilter::Only(Region::East),
        RegionFilter::Only(Region::West),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegionFilter::All => "all",
            RegionFilter::Only(r) => r.as_str(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RegionFilter::All => "All",
            RegionFilter::Only(r) => r.label(),
        }
    }

    /// Whether a record with region name `region` passes this filter.
    pub fn matches(&self, region: &str) -> bool {
        match self {
            RegionFilter::All => true,
            RegionFilter::Only(r) => region.trim().eq_ignore_ascii_case(r.as_str()),
        }
    }

    /// Position of this filter in [`Self::CHOICES`].
    pub fn index(&self) -> usize {
        Self::CHOICES
            .iter()
            .position(|c| c == self)
            .unwrap_or_default()
    }

    /// The next choice, wrapping around.
    pub fn next(&self) -> Self {
        Self::CHOICES[(self.index() + 1) % Self::CHOICES.len()]
    }

    /// The previous choice, wrapping around.
    pub fn previous(&self) -> Self {
        let len = Self::CHOICES.len();
        Self::CHOICES[(self.index() + len - 1) % len]
    }
}

impl FromStr for RegionFilter {
    type Err = ParseRegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::CHOICES
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseRegionError(s.to_string()))
    }
}

impl fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Derived values ─────────────────────────────────────────────────────────────

/// Summary statistics recomputed on demand from a [`CanonicalDataset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedMetrics {
    /// Sum of `sales` over every record.
    pub total_sales: Decimal,
    /// Mean of per-day summed sales.
    pub avg_daily_sales: Decimal,
    /// `(min, max)` date, `None` when the dataset is empty.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Mean daily sales over days strictly before `cutoff`; zero if there are none.
    pub before_avg: Decimal,
    /// Mean daily sales over days on or after `cutoff`; zero if there are none.
    pub after_avg: Decimal,
    /// `(after - before) / before * 100`, or zero when `before_avg` is zero.
    pub percent_change: Decimal,
    pub cutoff: NaiveDate,
    pub days_before: usize,
    pub days_after: usize,
}

impl DerivedMetrics {
    /// Positive change means sales went up after the cutoff.
    pub fn is_increase(&self) -> bool {
        self.percent_change > Decimal::ZERO
    }
}

/// One day's summed sales in a trend line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub sales: Decimal,
}

/// Where the cutoff date falls in a [`ChartSeries`].
///
/// `index` is the position of the first point on or after `date`; it equals
/// the number of points when every point precedes the cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutoffMarker {
    pub date: NaiveDate,
    pub index: usize,
}

/// Per-day sales for one region filter, ascending by date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSeries {
    pub region: RegionFilter,
    pub points: Vec<TrendPoint>,
    pub cutoff: CutoffMarker,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Largest daily total in the series, zero when empty.
    pub fn max_sales(&self) -> Decimal {
        self.points
            .iter()
            .map(|p| p.sales)
            .max()
            .unwrap_or(Decimal::ZERO)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
