//! Reading and writing the canonical dataset file.
//!
//! The file is CSV with the header `sales,date,region`, one row per record
//! in date order, `sales` with exactly two fractional digits.

use std::fs::File;
use std::io;
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, Terminator, Trim, WriterBuilder};
use rust_decimal::Decimal;
use sales_core::error::{IngestionError, LoadError};
use sales_core::models::{CanonicalDataset, NormalizedSalesRecord, CANONICAL_COLUMNS, DATE_FORMAT};
use sales_core::price::{format_sales_amount, parse_sale_date, MAX_SALES};
use tracing::{debug, info};

use crate::reader::column_indices;

/// Serialize `dataset` in canonical form.
///
/// Output depends only on the dataset, so the same input always yields the
/// same bytes.
pub fn to_canonical_bytes(dataset: &CanonicalDataset) -> Result<Vec<u8>, csv::Error> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(CANONICAL_COLUMNS)?;
    for rec in dataset.records() {
        writer.write_record([
            format_sales_amount(rec.sales),
            rec.date.format(DATE_FORMAT).to_string(),
            rec.region.clone(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Atomically write `dataset` to `path` (temp file in the same directory,
/// then rename).
pub fn write_canonical(path: &Path, dataset: &CanonicalDataset) -> Result<(), IngestionError> {
    let write_err = |source: io::Error| IngestionError::Write {
        path: path.to_path_buf(),
        source,
    };

    let bytes = to_canonical_bytes(dataset).map_err(|e| write_err(io::Error::other(e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
    }

    let tmp = path.with_extension("csv.tmp");
    std::fs::write(&tmp, &bytes).map_err(write_err)?;
    std::fs::rename(&tmp, path).map_err(write_err)?;

    info!("Wrote {} record(s) to {}", dataset.len(), path.display());
    Ok(())
}

/// Load the canonical dataset from `path`.
///
/// A missing file is reported as [`LoadError::NotFound`] so callers can show
/// a "run the pipeline first" message instead of an error.
pub fn load_dataset(path: &Path) -> Result<CanonicalDataset, LoadError> {
    let file = File::open(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            LoadError::NotFound(path.to_path_buf())
        } else {
            LoadError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| csv_load_error(path, e))?
        .clone();
    let idx = column_indices(&headers, &CANONICAL_COLUMNS).map_err(|column| {
        LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        }
    })?;
    let (sales_idx, date_idx, region_idx) = (idx[0], idx[1], idx[2]);

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| csv_load_error(path, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let malformed = |message: String| LoadError::Malformed {
            path: path.to_path_buf(),
            line,
            message,
        };

        let sales_raw = record.get(sales_idx).unwrap_or_default();
        let sales = Decimal::from_str(sales_raw)
            .map_err(|_| malformed(format!("invalid sales value {sales_raw:?}")))?;
        if sales.is_sign_negative() && !sales.is_zero() {
            return Err(malformed(format!("negative sales value {sales_raw:?}")));
        }
        if sales > MAX_SALES {
            return Err(malformed(format!("sales value {sales_raw:?} exceeds {MAX_SALES}")));
        }

        let date = parse_sale_date(record.get(date_idx).unwrap_or_default())
            .map_err(|e| malformed(e.to_string()))?;

        let region = record.get(region_idx).unwrap_or_default();
        if region.is_empty() {
            return Err(malformed("missing region".to_string()));
        }

        records.push(NormalizedSalesRecord::new(sales, date, region));
    }

    debug!("Loaded {} record(s) from {}", records.len(), path.display());
    Ok(CanonicalDataset::from_records(records))
}

fn csv_load_error(path: &Path, e: csv::Error) -> LoadError {
    let line = e.position().map(|p| p.line()).unwrap_or_default();
    let message = e.to_string();
    match e.into_kind() {
        csv::ErrorKind::Io(source) => LoadError::Read {
            path: path.to_path_buf(),
            source,
        },
        _ => LoadError::Malformed {
            path: path.to_path_buf(),
            line,
            message,
        },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
