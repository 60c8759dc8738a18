use crate::core::error::Result;
use crate::core::io;
use crate::core::model::{Layout, Report};
use crate::core::normalize::{self, IdSplitter};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct RunConfig {
    pub input: PathBuf,
    pub layout: Layout,
    pub id_separator: char,
}

/// Loads, validates, normalizes and shapes the input. Nothing is written here,
/// so any error leaves the output untouched.
pub fn run(cfg: &RunConfig) -> Result<Report> {
    let t = Instant::now();
    let table = io::load_table(&cfg.input)?;
    log_stage("engine.load", t);
    debug!(
        columns = table.headers.len(),
        rows = table.rows.len(),
        "loaded {}",
        cfg.input.display()
    );

    let t = Instant::now();
    let cols = normalize::resolve_columns(&table)?;
    let splitter = IdSplitter::new(cfg.id_separator)?;
    let records = normalize::normalize(&table, &cols, &splitter)?;
    log_stage("engine.normalize", t);

    let t = Instant::now();
    let report = cfg.layout.transform(&records)?;
    log_stage("engine.shape", t);

    if report.rows.is_empty() {
        info!(layout = cfg.layout.as_str(), "report has no rows");
    }
    Ok(report)
}

pub fn log_stage(name: &str, t: Instant) {
    debug!(stage = name, time = %fmt_dur(t.elapsed()), "stage done");
}

pub fn fmt_dur(d: Duration) -> String {
    if d.as_secs_f64() < 1.0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.3}s", d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ReportError;
    use crate::core::model::Sides;

    const HEADER: &str = "Sample Id,#Reads,Read Mean Length,#Q20 Bases,#Q30 Bases,%GC\n";

    fn config(dir: &tempfile::TempDir, body: &str, layout: Layout) -> RunConfig {
        let input = dir.path().join("stats.csv");
        std::fs::write(&input, body).unwrap();
        RunConfig {
            input,
            layout,
            id_separator: '_',
        }
    }

    #[test]
    fn paired_rows_join_into_one_sample() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{HEADER}SampleA_R1_001,100,150,\"90 (95.00%)\",\"85 (90.00%)\",45.0\n\
             SampleA_R2_001,110,150,\"95 (96.00%)\",\"88 (91.00%)\",46.0\n"
        );
        let report = run(&config(&dir, &body, Layout::OuterJoin)).unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].sample_id, "SampleA");
        match &report.rows[0].sides {
            Sides::Paired {
                r1: Some(r1),
                r2: Some(r2),
            } => {
                assert_eq!(r1.reads, 100);
                assert_eq!(r2.reads, 110);
                assert_eq!(r1.q20_pct, 95.0);
                assert_eq!(r2.q20_pct, 96.0);
            }
            other => panic!("unexpected sides: {other:?}"),
        }
    }

    #[test]
    fn missing_gc_column_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let body = "Sample Id,#Reads,Read Mean Length,#Q20 Bases,#Q30 Bases\n\
                    SampleA_R1_001,100,150,\"90 (95.00%)\",\"85 (90.00%)\"\n";
        let err = run(&config(&dir, body, Layout::Flat)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn percent_without_parentheses_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!("{HEADER}SampleA_R1_001,100,150,95.00%,\"85 (90.00%)\",45.0\n");
        let err = run(&config(&dir, &body, Layout::Flat)).unwrap_err();
        assert!(matches!(err, ReportError::Format { .. }));
    }

    #[test]
    fn missing_input_is_file_not_found() {
        let cfg = RunConfig {
            input: PathBuf::from("/nonexistent/epigeneres.csv"),
            layout: Layout::Flat,
            id_separator: '_',
        };
        assert!(matches!(
            run(&cfg).unwrap_err(),
            ReportError::FileNotFound { .. }
        ));
    }

    #[test]
    fn fmt_dur_switches_units() {
        assert_eq!(fmt_dur(Duration::from_millis(12)), "12ms");
        assert_eq!(fmt_dur(Duration::from_millis(1500)), "1.500s");
    }
}
