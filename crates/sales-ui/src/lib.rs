//! Terminal UI for the sales dashboard.
//!
//! Provides themes, header and indicator components, the dashboard view, and
//! the application event loop built on [`ratatui`].

pub mod app;
pub mod components;
pub mod dashboard_view;
pub mod themes;

pub use sales_core as core;
