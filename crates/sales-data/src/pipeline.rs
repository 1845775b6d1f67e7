//! Batch ingestion: source files in, canonical dataset out.
//!
//! The stages per file are parse ([`crate::reader`]), product filter,
//! normalize (price cleaning, `sales = round(price * quantity, 2)`, region
//! lowercasing) and finally a merge across files with a stable date sort.
//! Bad rows are skipped and counted; a missing column or an unreadable
//! directory aborts the run.

use std::path::{Path, PathBuf};

use sales_core::error::{EmptyResultError, PipelineError, RowParseError};
use sales_core::formatting::format_date_range;
use sales_core::models::{
    CanonicalDataset, NormalizedSalesRecord, RawSalesRecord, DEFAULT_PRODUCT,
};
use sales_core::price::{compute_sales, parse_price, parse_sale_date};
use tracing::{debug, info, warn};

use crate::artifact::{to_canonical_bytes, write_canonical};
use crate::reader::{find_source_files, read_source_file, RowIssue, SourceFile};

// ── Config ────────────────────────────────────────────────────────────────────

/// Where to read from, where to write to, and which product to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub source_dir: PathBuf,
    pub output_path: PathBuf,
    pub product: String,
}

impl PipelineConfig {
    pub fn new(source_dir: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_path: output_path.into(),
            product: DEFAULT_PRODUCT.to_string(),
        }
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }
}

// ── Reports ───────────────────────────────────────────────────────────────────

/// Record counts for each stage of one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    /// Data rows in the file.
    pub rows_read: usize,
    /// Rows dropped before the product filter (missing values, bad quantity).
    pub rows_malformed: usize,
    /// Rows whose product matched.
    pub rows_matched: usize,
    /// Matching rows dropped during normalization (bad price or date).
    pub rows_rejected: usize,
    /// Rows that made it into the dataset.
    pub rows_emitted: usize,
}

/// Summary of a whole run.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub product: String,
    pub output_path: PathBuf,
    pub files: Vec<FileReport>,
    /// Every skipped row, in file-then-line order.
    pub issues: Vec<RowIssue>,
}

impl PipelineReport {
    pub fn rows_read(&self) -> usize {
        self.files.iter().map(|f| f.rows_read).sum()
    }

    pub fn rows_emitted(&self) -> usize {
        self.files.iter().map(|f| f.rows_emitted).sum()
    }
}

/// A successful run: the dataset that was written and how it was built.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub dataset: CanonicalDataset,
    pub report: PipelineReport,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Run the full pipeline and persist the canonical dataset.
///
/// Fails with [`PipelineError::EmptyResult`] when no row survives, including
/// when the directory holds no `.csv` files. Nothing is written in that case.
pub fn process(config: &PipelineConfig) -> Result<PipelineOutput, PipelineError> {
    let output = build(config)?;
    write_canonical(&config.output_path, &output.dataset)?;

    info!(
        "Pipeline finished: {} of {} row(s) kept from {} file(s), written to {}",
        output.report.rows_emitted(),
        output.report.rows_read(),
        output.report.files.len(),
        config.output_path.display()
    );
    Ok(output)
}

/// Everything [`process`] does except writing the artifact.
pub fn build(config: &PipelineConfig) -> Result<PipelineOutput, PipelineError> {
    let paths = find_source_files(&config.source_dir)?;
    if paths.is_empty() {
        warn!("No CSV files found in {}", config.source_dir.display());
    }

    let mut records = Vec::new();
    let mut report = PipelineReport {
        product: config.product.clone(),
        output_path: config.output_path.clone(),
        ..Default::default()
    };

    for path in &paths {
        let source = read_source_file(path)?;
        let (kept, file_report, issues) = normalize_source(source, &config.product);

        debug!(
            "{}: read={} malformed={} matched={} rejected={} emitted={}",
            path.display(),
            file_report.rows_read,
            file_report.rows_malformed,
            file_report.rows_matched,
            file_report.rows_rejected,
            file_report.rows_emitted
        );

        records.extend(kept);
        report.files.push(file_report);
        report.issues.extend(issues);
    }

    if records.is_empty() {
        return Err(EmptyResultError {
            product: config.product.clone(),
            files_scanned: paths.len(),
            rows_read: report.rows_read(),
        }
        .into());
    }

    Ok(PipelineOutput {
        dataset: CanonicalDataset::from_records(records),
        report,
    })
}

/// Clean one raw row of the target product.
///
/// # Examples
///
/// ```
/// use sales_data::core::models::RawSalesRecord;
/// use sales_data::core::Decimal;
/// use sales_data::pipeline::normalize_record;
///
/// let raw = RawSalesRecord {
///     product: "Pink Morsel".into(),
///     price: "$2.00".into(),
///     quantity: 3,
///     date: "2021-01-10".into(),
///     region: "North".into(),
/// };
/// let rec = normalize_record(&raw).unwrap();
/// assert_eq!(rec.sales, Decimal::new(600, 2));
/// assert_eq!(rec.region, "north");
/// ```
pub fn normalize_record(raw: &RawSalesRecord) -> Result<NormalizedSalesRecord, RowParseError> {
    let price = parse_price(&raw.price)?;
    let date = parse_sale_date(&raw.date)?;
    let sales = compute_sales(price, raw.quantity)?;
    Ok(NormalizedSalesRecord::new(sales, date, &raw.region))
}

/// Human-readable run summary with the first `preview_rows` output rows.
pub fn format_report(output: &PipelineOutput, preview_rows: usize) -> String {
    let report = &output.report;
    let mut lines = vec![format!(
        "Processed {} file(s) for product `{}`",
        report.files.len(),
        report.product
    )];
    lines.extend(report.files.iter().map(|file| {
        format!(
            "  {}: {} rows, {} malformed, {} matching, {} rejected, {} emitted",
            display_name(&file.path),
            file.rows_read,
            file.rows_malformed,
            file.rows_matched,
            file.rows_rejected,
            file.rows_emitted
        )
    }));

    lines.push(format!("Total records: {}", output.dataset.len()));
    lines.push(format!(
        "Date range: {}",
        format_date_range(output.dataset.date_range())
    ));
    lines.push(format!("Regions: {}", output.dataset.regions().join(", ")));
    lines.push(format!("Output: {}", report.output_path.display()));

    let preview = CanonicalDataset::from_records(
        output
            .dataset
            .records()
            .iter()
            .take(preview_rows)
            .cloned()
            .collect(),
    );
    if let Ok(bytes) = to_canonical_bytes(&preview) {
        lines.push(format!("First {} row(s):", preview.len()));
        lines.extend(
            String::from_utf8_lossy(&bytes)
                .lines()
                .map(|line| format!("  {line}")),
        );
    }

    lines.join("\n")
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn normalize_source(
    source: SourceFile,
    product: &str,
) -> (Vec<NormalizedSalesRecord>, FileReport, Vec<RowIssue>) {
    let mut report = FileReport {
        path: source.path.clone(),
        rows_read: source.rows_read,
        rows_malformed: source.issues.len(),
        ..Default::default()
    };
    let mut issues = source.issues;
    let mut kept = Vec::new();

    for row in source.rows {
        if !row.record.matches_product(product) {
            continue;
        }
        report.rows_matched += 1;

        match normalize_record(&row.record) {
            Ok(rec) => kept.push(rec),
            Err(error) => {
                warn!("Skipping {}:{}: {}", source.path.display(), row.line, error);
                report.rows_rejected += 1;
                issues.push(RowIssue {
                    path: source.path.clone(),
                    line: row.line,
                    error,
                });
            }
        }
    }

    report.rows_emitted = kept.len();
    issues.sort_by_key(|i| i.line);
    (kept, report, issues)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
