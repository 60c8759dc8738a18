pub mod layout;
pub mod page;
pub mod pdf;
pub mod table;

use crate::core::error::Result;
use crate::core::model::Report;
use layout::{Branding, PageLayout};
use std::path::PathBuf;
use tracing::debug;

pub const TITLE: &str = "Raw Read Statistics Report";
pub const OUTPUT_FILE: &str = "RawReadTable.pdf";

pub struct RenderConfig {
    pub output: PathBuf,
    pub date: String,
    pub assets_dir: PathBuf,
    pub page: PageLayout,
    pub branding: Branding,
}

pub fn write(report: &Report, cfg: &RenderConfig) -> Result<()> {
    let table = table::build(report, cfg.page.column_widths(report.layout))?;
    debug!(
        orientation = ?cfg.page.orientation,
        columns = table.header.len(),
        rows = table.rows.len(),
        "composing page"
    );
    let pages = page::compose(
        &table,
        &cfg.page,
        &cfg.branding,
        &page::PageText {
            title: TITLE,
            date: &cfg.date,
        },
        &cfg.assets_dir,
    )?;
    debug!(pages = pages.len(), "page composition done");
    pdf::write(&cfg.output, &pages, &cfg.assets_dir)
}
