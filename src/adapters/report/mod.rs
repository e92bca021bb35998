//! Report adapter. Renders result tables as SVG charts or CSV files.

pub mod renderer;

pub use renderer::{FileReportRenderer, ReportKind, choose_kind};
