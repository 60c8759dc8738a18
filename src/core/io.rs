use crate::core::error::{ReportError, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputKind {
    Plain,
    Gzip,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    values: Vec<String>,
}

/// Delimited text as read from disk: trimmed header names plus rows of raw
/// string values, both in source order.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require(&self, name: &str) -> Result<usize> {
        self.column(name).ok_or_else(|| ReportError::MissingColumn {
            column: name.to_string(),
        })
    }

    pub fn value<'a>(&self, row: &'a Row, idx: usize) -> &'a str {
        row.values.get(idx).map(String::as_str).unwrap_or("")
    }
}

pub fn detect_input_kind(path: &Path) -> Result<InputKind> {
    if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
        if ext.eq_ignore_ascii_case("gz") {
            return Ok(InputKind::Gzip);
        }
    }
    let mut file = open(path)?;
    let mut magic = [0u8; 2];
    let n = file.read(&mut magic)?;
    if n == 2 && magic == [0x1f, 0x8b] {
        Ok(InputKind::Gzip)
    } else {
        Ok(InputKind::Plain)
    }
}

/// Tab for `.tsv`/`.txt` (optionally gzipped), comma otherwise.
pub fn delimiter_for(path: &Path) -> u8 {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    if name.ends_with(".tsv") || name.ends_with(".txt") {
        b'\t'
    } else {
        b','
    }
}

pub fn load_table(path: &Path) -> Result<Table> {
    let kind = detect_input_kind(path)?;
    let file = open(path)?;
    let reader: Box<dyn Read> = match kind {
        InputKind::Plain => Box::new(BufReader::new(file)),
        InputKind::Gzip => Box::new(MultiGzDecoder::new(BufReader::new(file))),
    };
    read_table(reader, delimiter_for(path), path)
}

fn open(path: &Path) -> Result<File> {
    if !path.is_file() {
        return Err(ReportError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(File::open(path)?)
}

fn read_table<R: Read>(reader: R, delimiter: u8, path: &Path) -> Result<Table> {
    let parse_err = |e: csv::Error| ReportError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(parse_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(ReportError::Parse {
            path: path.to_path_buf(),
            message: "missing header row".to_string(),
        });
    }

    let mut rows = Vec::new();
    for rec in rdr.records() {
        let rec = rec.map_err(parse_err)?;
        rows.push(Row {
            values: rec.iter().map(|v| v.to_string()).collect(),
        });
    }
    Ok(Table { headers, rows })
}
