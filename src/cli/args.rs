use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "kira-readstats",
    version,
    about = "Generate a raw read statistics PDF report from a per-sample QC table"
)]
pub struct Cli {
    /// Path to the input CSV (or TSV, optionally gzipped)
    #[arg(short, long, default_value = "epigeneres.csv")]
    pub input: PathBuf,

    /// Report date, DD-MM-YYYY; defaults to today
    #[arg(short, long)]
    pub date: Option<String>,

    /// Table layout: one row per record, or R1/R2 paired per sample
    #[arg(short, long, value_enum, default_value_t = LayoutArg::OuterJoin)]
    pub layout: LayoutArg,

    /// Directory holding logo.png, icon.png and watermark.png
    #[arg(long, default_value = ".")]
    pub assets: PathBuf,

    /// Only errors are printed to stderr
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Include debug output and stage timings
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LayoutArg {
    /// One row per input record, portrait
    #[value(name = "flat")]
    Flat,
    /// R1/R2 pivoted per sample, landscape
    #[value(name = "pivot")]
    Pivot,
    /// R1 and R2 subsets outer-joined per sample, landscape
    #[value(name = "outer-join")]
    OuterJoin,
}
