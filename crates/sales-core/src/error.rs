use std::path::PathBuf;
use thiserror::Error;

// ── Pipeline errors ────────────────────────────────────────────────────────────

/// Systemic failures that abort an ingestion batch.
#[derive(Error, Debug)]
pub enum IngestionError {
    /// The configured source directory does not exist.
    #[error("Source directory not found: {0}")]
    SourceDirNotFound(PathBuf),

    /// The configured source path exists but is not a directory.
    #[error("Source path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A source file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The header row of a source file could not be decoded.
    #[error("Failed to read CSV header in {path}: {source}")]
    Header {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A source file lacks one of the required columns.
    #[error("Missing required column `{column}` in {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// The canonical dataset could not be written.
    #[error("Failed to write canonical dataset {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single malformed source row. The row is skipped; the batch continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowParseError {
    /// The CSV reader could not decode the record at all.
    #[error("Malformed CSV record: {0}")]
    Record(String),

    /// A required column is present in the header but empty on this row.
    #[error("Missing value for column `{0}`")]
    MissingValue(String),

    /// The price is not a recognised currency amount.
    #[error("Invalid price: {0:?}")]
    InvalidPrice(String),

    /// The price parsed but carries a minus sign.
    #[error("Negative price: {0:?}")]
    NegativePrice(String),

    /// The quantity is not an integer.
    #[error("Invalid quantity: {0:?}")]
    InvalidQuantity(String),

    /// The quantity is an integer below zero.
    #[error("Negative quantity: {0}")]
    NegativeQuantity(i64),

    /// The date is not a valid `YYYY-MM-DD` calendar date.
    #[error("Invalid date: {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    /// `price * quantity` overflows or exceeds the per-row sales bound.
    #[error("Sales amount out of range for price {price} and quantity {quantity}")]
    Overflow { price: String, quantity: i64 },
}

/// The batch ran to completion but no row matched the target product.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No `{product}` rows found in {files_scanned} file(s) ({rows_read} rows read)")]
pub struct EmptyResultError {
    /// The product name that was filtered for.
    pub product: String,
    /// How many source files were scanned.
    pub files_scanned: usize,
    /// How many data rows were read across all files.
    pub rows_read: usize,
}

/// Anything that stops the ingestion pipeline from producing a canonical dataset.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    #[error(transparent)]
    EmptyResult(#[from] EmptyResultError),
}

// ── Query-layer errors ─────────────────────────────────────────────────────────

/// Failures while loading the canonical dataset for querying.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The canonical artifact has not been produced yet.
    #[error("Canonical dataset not found: {0}")]
    NotFound(PathBuf),

    /// The artifact exists but could not be read.
    #[error("Failed to read canonical dataset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact header lacks a canonical column.
    #[error("Canonical dataset {path} is missing column `{column}`")]
    MissingColumn { path: PathBuf, column: String },

    /// A row of the artifact does not follow the canonical format.
    #[error("Malformed row at {path}:{line}: {message}")]
    Malformed {
        path: PathBuf,
        line: u64,
        message: String,
    },
}

impl LoadError {
    /// `true` when the artifact simply does not exist yet.
    ///
    /// Consumers render a "no data" placeholder for this case and an error
    /// screen for everything else.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound(_))
    }
}

/// A region selector string was not one of `all`, `north`, `south`, `east`, `west`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown region filter: {0:?} (expected all, north, south, east or west)")]
pub struct ParseRegionError(pub String);

// ── Application-level error ────────────────────────────────────────────────────

/// All errors surfaced to the application layer.
#[derive(Error, Debug)]
pub enum SalesError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Region(#[from] ParseRegionError),

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the sales crates.
pub type Result<T> = std::result::Result<T, SalesError>;
