//! Data layer for the sales dashboard.
//!
//! Discovers and parses the per-store source CSV files, runs the ingestion
//! pipeline that produces the canonical dataset, reads that dataset back,
//! and answers the summary and per-day trend queries the dashboard renders.

pub mod artifact;
pub mod metrics;
pub mod pipeline;
pub mod query;
pub mod reader;

pub use sales_core as core;
