use crate::cli::args::{Cli, LayoutArg};
use crate::core::engine::{self, RunConfig, log_stage};
use crate::core::model::Layout;
use crate::core::normalize::{ID_COLUMNS, VALUE_COLUMNS};
use crate::report::{self, OUTPUT_FILE, RenderConfig};
use crate::report::layout::{Branding, PageLayout};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

const DATE_FORMAT: &str = "%d-%m-%Y";

pub fn entry() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);
    run(cli)
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        tracing::Level::ERROR
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run(cli: Cli) -> Result<()> {
    generate(cli, PathBuf::from(OUTPUT_FILE))
}

/// Builds the report and writes it to `output`. Nothing is written unless
/// the whole input validates.
fn generate(cli: Cli, output: PathBuf) -> Result<()> {
    let t0 = Instant::now();

    let layout = match cli.layout {
        LayoutArg::Flat => Layout::Flat,
        LayoutArg::Pivot => Layout::Pivot,
        LayoutArg::OuterJoin => Layout::OuterJoin,
    };
    let date = report_date(cli.date);

    let config = RunConfig {
        input: cli.input.clone(),
        layout,
        id_separator: '_',
    };
    let report = engine::run(&config)
        .inspect_err(|e| {
            if e.is_validation() {
                warn!(
                    "expected columns: {}, {}",
                    ID_COLUMNS.join(" or "),
                    VALUE_COLUMNS.join(", ")
                );
            }
        })
        .with_context(|| format!("failed to build report from {}", cli.input.display()))?;

    let t_render = Instant::now();
    let render = RenderConfig {
        output,
        date,
        assets_dir: cli.assets,
        page: PageLayout::for_layout(layout),
        branding: Branding::default(),
    };
    report::write(&report, &render)
        .with_context(|| format!("failed to write {}", render.output.display()))?;
    log_stage("render", t_render);

    info!("PDF with table created: {}", render.output.display());
    log_stage("total", t0);
    Ok(())
}

fn report_date(arg: Option<String>) -> String {
    match arg {
        Some(d) => {
            if NaiveDate::parse_from_str(&d, DATE_FORMAT).is_err() {
                warn!(date = %d, "date is not DD-MM-YYYY; printed as given");
            }
            d
        }
        None => chrono::Local::now().format(DATE_FORMAT).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ReportError;

    #[test]
    fn explicit_date_is_kept_verbatim() {
        assert_eq!(report_date(Some("01-02-2026".to_string())), "01-02-2026");
        assert_eq!(report_date(Some("Feb 1st".to_string())), "Feb 1st");
    }

    #[test]
    fn default_date_is_dd_mm_yyyy() {
        let d = report_date(None);
        assert!(NaiveDate::parse_from_str(&d, DATE_FORMAT).is_ok());
        assert_eq!(d.len(), 10);
    }

    #[test]
    fn missing_gc_column_fails_before_any_output_exists() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("stats.csv");
        std::fs::write(
            &input,
            "Sample Id,#Reads,Read Mean Length,#Q20 Bases,#Q30 Bases\n\
             SampleA_R1_001,100,150,\"90 (95.00%)\",\"85 (90.00%)\"\n",
        )
        .unwrap();
        let output = dir.path().join(OUTPUT_FILE);
        let cli = Cli::try_parse_from([
            "kira-readstats",
            "-i",
            input.to_str().unwrap(),
            "-d",
            "17-10-2026",
            "--assets",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();

        let err = generate(cli, output.clone()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::MissingColumn { column }) if column == "%GC"
        ));
        assert!(!output.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn valid_input_writes_the_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("stats.csv");
        std::fs::write(
            &input,
            "Sample Id,#Reads,Read Mean Length,#Q20 Bases,#Q30 Bases,%GC\n\
             SampleA_R1_001,100,150,\"90 (95.00%)\",\"85 (90.00%)\",45.0\n\
             SampleA_R2_001,110,150,\"95 (96.00%)\",\"88 (91.00%)\",46.0\n",
        )
        .unwrap();
        let output = dir.path().join(OUTPUT_FILE);
        let cli = Cli::try_parse_from([
            "kira-readstats",
            "-i",
            input.to_str().unwrap(),
            "--assets",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();

        generate(cli, output.clone()).unwrap();
        assert!(std::fs::read(&output).unwrap().starts_with(b"%PDF"));
    }
}
