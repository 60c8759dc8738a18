use crate::core::error::{ReportError, Result};
use crate::core::io::{Row, Table};
use crate::core::model::{Direction, Metrics, SampleRecord};
use aho_corasick::AhoCorasick;

pub const ID_COLUMNS: [&str; 2] = ["Sample Id", "Id"];
pub const COL_READS: &str = "#Reads";
pub const COL_MEAN_LEN: &str = "Read Mean Length";
pub const COL_Q20: &str = "#Q20 Bases";
pub const COL_Q30: &str = "#Q30 Bases";
pub const COL_GC: &str = "%GC";
pub const VALUE_COLUMNS: [&str; 5] = [COL_READS, COL_MEAN_LEN, COL_Q20, COL_Q30, COL_GC];

/// Column indices of the fields a report needs, resolved once per table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ColumnMap {
    pub id: usize,
    pub reads: usize,
    pub mean_len: usize,
    pub q20: usize,
    pub q30: usize,
    pub gc: usize,
}

pub fn resolve_columns(table: &Table) -> Result<ColumnMap> {
    let id = ID_COLUMNS
        .iter()
        .find_map(|name| table.column(name))
        .ok_or_else(|| ReportError::MissingColumn {
            column: ID_COLUMNS[0].to_string(),
        })?;
    Ok(ColumnMap {
        id,
        reads: table.require(COL_READS)?,
        mean_len: table.require(COL_MEAN_LEN)?,
        q20: table.require(COL_Q20)?,
        q30: table.require(COL_Q30)?,
        gc: table.require(COL_GC)?,
    })
}

/// Splits `SampleA_R1_001` into (`SampleA`, R1). The last marker wins, and a
/// marker may also close the id (`SampleA_R2`).
pub struct IdSplitter {
    infix: AhoCorasick,
    suffixes: [(String, Direction); 2],
}

impl IdSplitter {
    pub fn new(separator: char) -> Result<Self> {
        let r1 = format!("{separator}R1");
        let r2 = format!("{separator}R2");
        let infix = AhoCorasick::new([format!("{r1}{separator}"), format!("{r2}{separator}")])
            .map_err(|e| ReportError::Validation(format!("bad id separator: {e}")))?;
        Ok(Self {
            infix,
            suffixes: [(r1, Direction::R1), (r2, Direction::R2)],
        })
    }

    pub fn split<'a>(&self, id: &'a str) -> Option<(&'a str, Direction)> {
        for (suffix, dir) in &self.suffixes {
            if let Some(base) = id.strip_suffix(suffix.as_str()) {
                return non_empty(base).map(|b| (b, *dir));
            }
        }
        let last = self.infix.find_overlapping_iter(id).last()?;
        let dir = if last.pattern().as_usize() == 0 {
            Direction::R1
        } else {
            Direction::R2
        };
        non_empty(&id[..last.start()]).map(|b| (b, dir))
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}

/// Pulls `98.70` out of `"12345 (98.70%)"`.
pub fn extract_percent(value: &str) -> std::result::Result<f64, String> {
    let bytes = value.as_bytes();
    let open = memchr::memchr(b'(', bytes).ok_or("no parenthesized percentage")?;
    let close = memchr::memchr(b')', &bytes[open + 1..])
        .map(|i| open + 1 + i)
        .ok_or("unclosed parenthesis")?;
    let inner = value[open + 1..close].trim();
    let number = inner
        .strip_suffix('%')
        .ok_or("parenthesized value is not a percentage")?
        .trim();
    let pct: f64 = number
        .parse()
        .map_err(|_| format!("'{number}' is not a number"))?;
    check_percent(pct)
}

fn check_percent(pct: f64) -> std::result::Result<f64, String> {
    if (0.0..=100.0).contains(&pct) {
        Ok(pct)
    } else {
        Err(format!("{pct} is outside 0-100"))
    }
}

/// Accepts `1234567`, `1,234,567` and whole floats such as `1234567.0`.
pub fn parse_count(value: &str) -> std::result::Result<u64, String> {
    let cleaned: String = value.trim().chars().filter(|&c| c != ',').collect();
    if let Ok(n) = cleaned.parse::<u64>() {
        return Ok(n);
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v >= 0.0 && v.fract() == 0.0 && v.is_finite() => Ok(v as u64),
        _ => Err("not a read count".to_string()),
    }
}

pub fn parse_decimal(value: &str) -> std::result::Result<f64, String> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err("not a number".to_string()),
    }
}

pub fn normalize(
    table: &Table,
    cols: &ColumnMap,
    splitter: &IdSplitter,
) -> Result<Vec<SampleRecord>> {
    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| normalize_row(table, row, i + 1, cols, splitter))
        .collect()
}

fn normalize_row(
    table: &Table,
    row: &Row,
    row_no: usize,
    cols: &ColumnMap,
    splitter: &IdSplitter,
) -> Result<SampleRecord> {
    let field = |idx: usize| table.value(row, idx);
    let fail = |idx: usize, reason: String| ReportError::Format {
        column: table.headers[idx].clone(),
        row: row_no,
        value: field(idx).to_string(),
        reason,
    };

    let sample_id = field(cols.id).trim().to_string();
    if sample_id.is_empty() {
        return Err(fail(cols.id, "empty sample id".to_string()));
    }
    let (base_id, direction) = match splitter.split(&sample_id) {
        Some((base, dir)) => (Some(base.to_string()), Some(dir)),
        None => (None, None),
    };

    let metrics = Metrics {
        reads: parse_count(field(cols.reads)).map_err(|r| fail(cols.reads, r))?,
        mean_len: parse_decimal(field(cols.mean_len)).map_err(|r| fail(cols.mean_len, r))?,
        q20_pct: extract_percent(field(cols.q20)).map_err(|r| fail(cols.q20, r))?,
        q30_pct: extract_percent(field(cols.q30)).map_err(|r| fail(cols.q30, r))?,
        gc_pct: parse_decimal(field(cols.gc))
            .and_then(check_percent)
            .map_err(|r| fail(cols.gc, r))?,
    };

    Ok(SampleRecord {
        sample_id,
        base_id,
        direction,
        metrics,
    })
}
