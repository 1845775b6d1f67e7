//! Small reusable pieces of the dashboard, each rendered to `Line`s.

pub mod header;
pub mod indicators;
