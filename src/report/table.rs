use crate::core::error::{ReportError, Result};
use crate::core::model::{Layout, Metrics, Report, Sides};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Align {
    Left,
    Center,
}

/// Display-ready table: header, stringified cells, per-column width and alignment.
#[derive(Clone, Debug, PartialEq)]
pub struct TableSpec {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub widths: Vec<f64>,
    pub aligns: Vec<Align>,
}

const METRIC_NAMES_FLAT: [&str; 5] = [
    "#Reads",
    "Read Mean Length",
    "#Q20 Bases",
    "#Q30 Bases",
    "%GC",
];
const METRIC_NAMES_PIVOT: [&str; 5] = [
    "#Reads",
    "Read Mean Length",
    "#Q20 Bases %",
    "#Q30 Bases %",
    "%GC",
];
const METRIC_NAMES_JOIN: [&str; 5] = [
    "#Reads",
    "Read Mean Length (bases)",
    "#Q20 Bases",
    "#Q30 Bases",
    "%GC",
];

pub fn header(layout: Layout) -> Vec<String> {
    let mut out = vec!["Sample Id".to_string()];
    match layout {
        Layout::Flat => out.extend(METRIC_NAMES_FLAT.iter().map(|s| s.to_string())),
        Layout::Pivot | Layout::OuterJoin => {
            let names = if layout == Layout::Pivot {
                METRIC_NAMES_PIVOT
            } else {
                METRIC_NAMES_JOIN
            };
            for name in names {
                out.push(format!("{name} (R1)"));
                out.push(format!("{name} (R2)"));
            }
        }
    }
    out
}

pub fn build(report: &Report, widths: &[f64]) -> Result<TableSpec> {
    let header = header(report.layout);
    if widths.len() != header.len() {
        return Err(ReportError::Render(format!(
            "{} column widths for {} columns",
            widths.len(),
            header.len()
        )));
    }

    let mut rows = Vec::with_capacity(report.rows.len());
    for row in &report.rows {
        let mut cells = Vec::with_capacity(header.len());
        cells.push(row.sample_id.clone());
        match &row.sides {
            Sides::Single(m) => cells.extend(metric_cells(Some(m))),
            Sides::Paired { r1, r2 } => {
                // R1 and R2 columns interleave per metric.
                let left = metric_cells(r1.as_ref());
                let right = metric_cells(r2.as_ref());
                for (a, b) in left.into_iter().zip(right) {
                    cells.push(a);
                    cells.push(b);
                }
            }
        }
        if cells.len() != header.len() {
            return Err(ReportError::Render(format!(
                "row '{}' does not fit a {} report",
                row.sample_id,
                report.layout.as_str()
            )));
        }
        rows.push(cells);
    }

    let mut aligns = vec![Align::Center; header.len()];
    aligns[0] = Align::Left;

    Ok(TableSpec {
        header,
        rows,
        widths: widths.to_vec(),
        aligns,
    })
}

fn metric_cells(m: Option<&Metrics>) -> [String; 5] {
    match m {
        Some(m) => [
            m.reads.to_string(),
            fmt_decimal(m.mean_len),
            fmt_percent(m.q20_pct),
            fmt_percent(m.q30_pct),
            fmt_decimal(m.gc_pct),
        ],
        None => Default::default(),
    }
}

pub fn fmt_percent(v: f64) -> String {
    format!("{:.2}%", v)
}

/// Shortest round-trip form, always with a fractional digit: `45.0`, `150.5`.
pub fn fmt_decimal(v: f64) -> String {
    let s = v.to_string();
    if s.contains('.') || !v.is_finite() {
        s
    } else {
        format!("{s}.0")
    }
}
