//! CSV source discovery and row parsing.
//!
//! Each store exports one CSV file with at least the columns
//! `product, price, quantity, date, region` in any order. Rows that cannot
//! be turned into a [`RawSalesRecord`] are skipped and reported as
//! [`RowIssue`]s; a file whose header lacks a required column aborts the
//! batch.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use sales_core::error::{IngestionError, RowParseError};
use sales_core::models::{RawSalesRecord, REQUIRED_SOURCE_COLUMNS};
use sales_core::price::parse_quantity;
use tracing::{debug, warn};

// ── Types ─────────────────────────────────────────────────────────────────────

/// A parsed source row and the 1-based line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub line: u64,
    pub record: RawSalesRecord,
}

/// A row that was skipped, with enough context to find it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    pub path: PathBuf,
    pub line: u64,
    pub error: RowParseError,
}

/// Everything read from one source file.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Rows that parsed into a [`RawSalesRecord`], in file order.
    pub rows: Vec<SourceRow>,
    /// Rows that did not.
    pub issues: Vec<RowIssue>,
    /// Data rows seen, excluding the header.
    pub rows_read: usize,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// List the `.csv` files directly inside `dir`, in lexicographic order.
///
/// Subdirectories are not descended into. The extension match ignores case.
pub fn find_source_files(dir: &Path) -> Result<Vec<PathBuf>, IngestionError> {
    if !dir.exists() {
        return Err(IngestionError::SourceDirNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(IngestionError::NotADirectory(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    debug!("Found {} source file(s) in {}", files.len(), dir.display());
    Ok(files)
}

/// Read one source file into raw records, skipping malformed rows.
pub fn read_source_file(path: &Path) -> Result<SourceFile, IngestionError> {
    let file = File::open(path).map_err(|source| IngestionError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|source| IngestionError::Header {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let columns = SourceColumns::from_headers(&headers).map_err(|column| {
        IngestionError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        }
    })?;

    let mut out = SourceFile {
        path: path.to_path_buf(),
        ..Default::default()
    };

    for result in reader.records() {
        out.rows_read += 1;

        let (line, parsed) = match result {
            Ok(record) => {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                (line, columns.parse(&record))
            }
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                let message = e.to_string();
                if let csv::ErrorKind::Io(source) = e.into_kind() {
                    return Err(IngestionError::FileRead {
                        path: path.to_path_buf(),
                        source,
                    });
                }
                (line, Err(RowParseError::Record(message)))
            }
        };

        match parsed {
            Ok(record) => out.rows.push(SourceRow { line, record }),
            Err(error) => {
                warn!("Skipping {}:{}: {}", path.display(), line, error);
                out.issues.push(RowIssue {
                    path: path.to_path_buf(),
                    line,
                    error,
                });
            }
        }
    }

    debug!(
        "{}: {} rows read, {} parsed, {} skipped",
        path.display(),
        out.rows_read,
        out.rows.len(),
        out.issues.len()
    );

    Ok(out)
}

/// Position of each of `wanted` in `headers`.
///
/// Header names are compared case-insensitively after trimming whitespace and
/// a leading byte-order mark. On failure the first missing column is
/// returned.
pub(crate) fn column_indices<'c>(
    headers: &StringRecord,
    wanted: &[&'c str],
) -> Result<Vec<usize>, &'c str> {
    let normalized: Vec<String> = headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
        .collect();

    wanted
        .iter()
        .map(|column| {
            normalized
                .iter()
                .position(|h| h == column)
                .ok_or(*column)
        })
        .collect()
}

// ── Internal helpers ──────────────────────────────────────────────────────────

struct SourceColumns {
    product: usize,
    price: usize,
    quantity: usize,
    date: usize,
    region: usize,
}

impl SourceColumns {
    fn from_headers(headers: &StringRecord) -> Result<Self, &'static str> {
        let idx = column_indices(headers, &REQUIRED_SOURCE_COLUMNS)?;
        Ok(Self {
            product: idx[0],
            price: idx[1],
            quantity: idx[2],
            date: idx[3],
            region: idx[4],
        })
    }

    /// Field presence and an integer quantity are checked here; price, date
    /// and sign checks wait until the product filter has run.
    fn parse(&self, record: &StringRecord) -> Result<RawSalesRecord, RowParseError> {
        let field = |index: usize, name: &str| -> Result<String, RowParseError> {
            match record.get(index).map(str::trim) {
                Some(value) if !value.is_empty() => Ok(value.to_string()),
                _ => Err(RowParseError::MissingValue(name.to_string())),
            }
        };

        Ok(RawSalesRecord {
            product: field(self.product, "product")?,
            price: field(self.price, "price")?,
            quantity: parse_quantity(&field(self.quantity, "quantity")?)?,
            date: field(self.date, "date")?,
            region: field(self.region, "region")?,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
