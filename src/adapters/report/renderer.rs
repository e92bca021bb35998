//! Report renderer. Picks a chart or CSV for a result table and writes it to the
//! reports directory. Implements ReportRendererPort.
//!
//! Selection:
//! - empty table: nothing
//! - one column: CSV
//! - two columns: bar chart if either column is non-numeric, else scatter
//! - more than one numeric column: correlation heatmap
//! - otherwise: CSV

use crate::domain::{Column, DomainError, Table};
use crate::ports::ReportRendererPort;
use chrono::Local;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

const CHART_SIZE: (u32, u32) = (800, 500);
const HEATMAP_SIZE: (u32, u32) = (700, 500);
const BAR_COLOR: RGBColor = RGBColor(135, 206, 235);
const POINT_COLOR: RGBColor = RGBColor(128, 0, 128);
const MISSING_COLOR: RGBColor = RGBColor(200, 200, 200);

/// What `render` will produce for a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportKind {
    Csv,
    Bar { label: usize, value: usize },
    Scatter,
    Heatmap { columns: Vec<usize> },
}

/// Chooses the report kind; `None` for an empty table.
pub fn choose_kind(table: &Table) -> Option<ReportKind> {
    if table.is_empty() {
        return None;
    }
    let cols = table.columns();
    if cols.len() == 1 {
        return Some(ReportKind::Csv);
    }
    if cols.len() == 2 {
        return Some(match (cols[0].is_numeric(), cols[1].is_numeric()) {
            (true, true) => ReportKind::Scatter,
            (false, _) => ReportKind::Bar { label: 0, value: 1 },
            (true, false) => ReportKind::Bar { label: 1, value: 0 },
        });
    }
    let numeric: Vec<usize> = cols
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_numeric())
        .map(|(i, _)| i)
        .collect();
    if numeric.len() > 1 {
        return Some(ReportKind::Heatmap { columns: numeric });
    }
    Some(ReportKind::Csv)
}

/// Writes charts (SVG) and CSV files into `reports_dir`.
pub struct FileReportRenderer {
    reports_dir: PathBuf,
}

impl FileReportRenderer {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
        }
    }

    fn output_path(&self, ext: &str) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        self.reports_dir.join(format!("report_{}.{}", stamp, ext))
    }

    fn render_sync(&self, table: &Table) -> Result<Option<PathBuf>, DomainError> {
        let Some(kind) = choose_kind(table) else {
            return Ok(None);
        };
        std::fs::create_dir_all(&self.reports_dir)
            .map_err(|e| DomainError::Report(format!("create reports dir: {}", e)))?;

        let path = match &kind {
            ReportKind::Csv => {
                let path = self.output_path("csv");
                write_csv(table, &path)?;
                path
            }
            ReportKind::Bar { label, value } => {
                let path = self.output_path("svg");
                let cols = table.columns();
                draw_bar(&path, &cols[*label], &cols[*value])?;
                path
            }
            ReportKind::Scatter => {
                let path = self.output_path("svg");
                let cols = table.columns();
                draw_scatter(&path, &cols[0], &cols[1])?;
                path
            }
            ReportKind::Heatmap { columns } => {
                let path = self.output_path("svg");
                let picked: Vec<&Column> = columns.iter().map(|&i| &table.columns()[i]).collect();
                draw_heatmap(&path, &picked)?;
                path
            }
        };
        info!(path = %path.display(), kind = ?kind, "report generated");
        Ok(Some(path))
    }
}

#[async_trait::async_trait]
impl ReportRendererPort for FileReportRenderer {
    async fn render(&self, table: &Table) -> Result<Option<PathBuf>, DomainError> {
        self.render_sync(table)
    }
}

fn report_err<E: std::fmt::Display>(e: E) -> DomainError {
    DomainError::Report(e.to_string())
}

/// Writes the table with a header row; nulls are empty cells.
pub fn write_csv(table: &Table, path: &Path) -> Result<(), DomainError> {
    let mut wtr = csv::Writer::from_path(path).map_err(report_err)?;
    wtr.write_record(table.column_names()).map_err(report_err)?;
    for idx in 0..table.row_count() {
        wtr.write_record(table.row(idx).iter().map(|v| v.to_string()))
            .map_err(report_err)?;
    }
    wtr.flush().map_err(report_err)?;
    Ok(())
}

/// Axis range covering `values` and zero, padded by 5%.
fn padded_range(values: impl Iterator<Item = f64>, include_zero: bool) -> (f64, f64) {
    let (mut lo, mut hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    if lo == hi {
        hi = lo + 1.0;
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

fn draw_bar(path: &Path, label_col: &Column, value_col: &Column) -> Result<(), DomainError> {
    let labels: Vec<String> = label_col.values.iter().map(|v| v.to_string()).collect();
    let heights: Vec<f64> = value_col
        .values
        .iter()
        .map(|v| v.as_f64().unwrap_or(0.0))
        .collect();
    let n = heights.len().max(1);
    let (lo, hi) = padded_range(heights.iter().copied(), true);

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(report_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} by {}", value_col.name, label_col.name),
            ("sans-serif", 20),
        )
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d((0usize..n).into_segmented(), lo..hi)
        .map_err(report_err)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n.min(40))
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .x_desc(label_col.name.as_str())
        .y_desc(value_col.name.as_str())
        .draw()
        .map_err(report_err)?;
    chart
        .draw_series(heights.iter().enumerate().map(|(i, h)| {
            Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *h)],
                BAR_COLOR.filled(),
            )
        }))
        .map_err(report_err)?;
    root.present().map_err(report_err)?;
    Ok(())
}

fn draw_scatter(path: &Path, x_col: &Column, y_col: &Column) -> Result<(), DomainError> {
    let points: Vec<(f64, f64)> = x_col
        .values
        .iter()
        .zip(&y_col.values)
        .filter_map(|(x, y)| Some((x.as_f64()?, y.as_f64()?)))
        .collect();
    let (x_lo, x_hi) = padded_range(points.iter().map(|p| p.0), false);
    let (y_lo, y_hi) = padded_range(points.iter().map(|p| p.1), false);

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(report_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} vs {}", x_col.name, y_col.name),
            ("sans-serif", 20),
        )
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(report_err)?;
    chart
        .configure_mesh()
        .x_desc(x_col.name.as_str())
        .y_desc(y_col.name.as_str())
        .draw()
        .map_err(report_err)?;
    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, POINT_COLOR.filled())),
        )
        .map_err(report_err)?;
    root.present().map_err(report_err)?;
    Ok(())
}

/// Pearson correlation over rows where both cells are numeric. NaN when fewer
/// than two such rows or either side is constant.
pub fn pearson(a: &Column, b: &Column) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .values
        .iter()
        .zip(&b.values)
        .filter_map(|(x, y)| Some((x.as_f64()?, y.as_f64()?)))
        .collect();
    let n = pairs.len() as f64;
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    sxy / (sxx.sqrt() * syy.sqrt())
}

/// Diverging blue-white-red scale for c in [-1, 1].
fn coolwarm(c: f64) -> RGBColor {
    if !c.is_finite() {
        return MISSING_COLOR;
    }
    let lerp = |a: (u8, u8, u8), b: (u8, u8, u8), t: f64| {
        let mix = |x: u8, y: u8| (f64::from(x) * (1.0 - t) + f64::from(y) * t).round() as u8;
        RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    };
    const COOL: (u8, u8, u8) = (59, 76, 192);
    const MID: (u8, u8, u8) = (221, 221, 221);
    const WARM: (u8, u8, u8) = (180, 4, 38);
    let c = c.clamp(-1.0, 1.0);
    if c < 0.0 {
        lerp(MID, COOL, -c)
    } else {
        lerp(MID, WARM, c)
    }
}

/// Pairwise Pearson matrix as `(x, y, r)` cells, diagonal included.
fn correlation_cells(columns: &[&Column]) -> Vec<(usize, usize, f64)> {
    let mut cells = Vec::with_capacity(columns.len() * columns.len());
    for (i, a) in columns.iter().enumerate() {
        for (j, b) in columns.iter().enumerate() {
            cells.push((i, j, pearson(a, b)));
        }
    }
    cells
}

fn draw_heatmap(path: &Path, columns: &[&Column]) -> Result<(), DomainError> {
    let k = columns.len();
    let names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
    let cells = correlation_cells(columns);

    let root = SVGBackend::new(path, HEATMAP_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(report_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Correlation Heatmap", ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(120)
        .build_cartesian_2d((0usize..k).into_segmented(), (0usize..k).into_segmented())
        .map_err(report_err)?;
    let label = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => names.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(k)
        .y_labels(k)
        .x_label_formatter(&label)
        .y_label_formatter(&label)
        .draw()
        .map_err(report_err)?;
    chart
        .draw_series(cells.iter().map(|&(i, j, c)| {
            Rectangle::new(
                [
                    (SegmentValue::Exact(i), SegmentValue::Exact(j)),
                    (SegmentValue::Exact(i + 1), SegmentValue::Exact(j + 1)),
                ],
                coolwarm(c).filled(),
            )
        }))
        .map_err(report_err)?;
    chart
        .draw_series(cells.iter().map(|&(i, j, c)| {
            let text = if c.is_finite() {
                format!("{:.2}", c)
            } else {
                "nan".to_string()
            };
            Text::new(
                text,
                (SegmentValue::CenterOf(i), SegmentValue::CenterOf(j)),
                ("sans-serif", 12).into_font(),
            )
        }))
        .map_err(report_err)?;
    root.present().map_err(report_err)?;
    Ok(())
}
