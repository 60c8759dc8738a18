#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Direction {
    R1,
    R2,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::R1 => "R1",
            Direction::R2 => "R2",
        }
    }
}

/// Report shape. Flat keeps one row per input record; the paired layouts fold
/// R1/R2 records of the same base sample into one row.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Layout {
    Flat,
    Pivot,
    OuterJoin,
}

impl Layout {
    pub fn is_paired(self) -> bool {
        !matches!(self, Layout::Flat)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Layout::Flat => "flat",
            Layout::Pivot => "pivot",
            Layout::OuterJoin => "outer-join",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metrics {
    pub reads: u64,
    pub mean_len: f64,
    pub q20_pct: f64,
    pub q30_pct: f64,
    pub gc_pct: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SampleRecord {
    pub sample_id: String,
    /// Sample id with the read-direction marker and trailing segments removed.
    pub base_id: Option<String>,
    pub direction: Option<Direction>,
    pub metrics: Metrics,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Sides {
    Single(Metrics),
    Paired {
        r1: Option<Metrics>,
        r2: Option<Metrics>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReportRow {
    pub sample_id: String,
    pub sides: Sides,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub layout: Layout,
    pub rows: Vec<ReportRow>,
}
