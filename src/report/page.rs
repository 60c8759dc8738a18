use crate::core::error::Result;
use crate::report::layout::{
    BLACK, BRAND, Branding, ImagePlacement, PageLayout, RULE, Rgb, TINT, pt_to_mm,
};
use crate::report::table::{Align, TableSpec};
use std::fmt::Write;
use std::path::Path;
use tracing::warn;

const FONT: &str = "Helvetica, Arial, sans-serif";
/// Average Helvetica glyph advance as a fraction of the font size.
const CHAR_ADVANCE: f64 = 0.5;
/// Vertical extent of the closing block below its top edge.
const CLOSING_HEIGHT: f64 = 3.0 * 5.0 + 2.5 + 5.0;

pub struct PageText<'a> {
    pub title: &'a str,
    pub date: &'a str,
}

#[derive(Clone, Copy, Debug)]
enum Weight {
    Regular,
    Bold,
    Italic,
}

/// Lays out the report as a sequence of SVG pages. User units are
/// millimetres; the canvas is sized in points so each PDF page comes out at A4.
/// Rows flow onto new pages at `page.break_y()`, each one repeating the
/// header, footer and table heading row.
pub fn compose(
    table: &TableSpec,
    page: &PageLayout,
    brand: &Branding,
    text: &PageText<'_>,
    assets_dir: &Path,
) -> Result<Vec<String>> {
    let mut pages = Vec::new();
    let mut out = open_page(page, brand, assets_dir)?;

    let mut y = page.margin_top;
    let title_size = pt_to_mm(page.title_size);
    text_at(
        &mut out,
        page.margin_left,
        y + 6.0 + title_size * 0.35,
        title_size,
        Weight::Bold,
        BRAND,
        "start",
        text.title,
    )?;
    y += 10.0;

    let date_size = pt_to_mm(12.0);
    let baseline = y + 5.0 + date_size * 0.35;
    writeln!(
        out,
        "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{:.3}\" fill=\"{}\">\
         <tspan font-weight=\"bold\" fill=\"{}\">Date : </tspan>{}</text>",
        page.margin_left,
        baseline,
        FONT,
        date_size,
        rgb(BLACK),
        rgb(BRAND),
        escape(text.date)
    )?;

    writeln!(
        out,
        "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
        page.margin_left,
        page.rule_y,
        page.rule_x2,
        page.rule_y,
        rgb(RULE),
        page.rule_width
    )?;

    let limit = page.break_y();
    let heading = RowBox::measure(&table.header, table, page);
    y += 5.0 + 15.0;
    heading.draw(&mut out, table, page, y, true)?;
    y += heading.height;

    let mut rows_on_page = 0usize;
    for cells in &table.rows {
        let row = RowBox::measure(cells, table, page);
        if rows_on_page > 0 && y + row.height > limit {
            pages.push(close_page(out, page, brand)?);
            out = open_page(page, brand, assets_dir)?;
            y = page.margin_top;
            heading.draw(&mut out, table, page, y, true)?;
            y += heading.height;
            rows_on_page = 0;
        }
        row.draw(&mut out, table, page, y, false)?;
        y += row.height;
        rows_on_page += 1;
    }

    let mut closing_top = y + 25.0;
    if closing_top + CLOSING_HEIGHT > limit {
        pages.push(close_page(out, page, brand)?);
        out = open_page(page, brand, assets_dir)?;
        closing_top = page.margin_top;
    }
    closing(&mut out, page, brand, closing_top)?;
    pages.push(close_page(out, page, brand)?);
    Ok(pages)
}

/// Starts a page: canvas, white background and the branded header.
fn open_page(page: &PageLayout, brand: &Branding, assets_dir: &Path) -> Result<String> {
    let mut out = String::new();
    let (w_pt, h_pt) = page.size_pt();
    writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" \
         width=\"{:.2}\" height=\"{:.2}\" viewBox=\"0 0 {} {}\">",
        w_pt, h_pt, page.width, page.height
    )?;
    writeln!(
        out,
        "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"#fff\"/>",
        page.width, page.height
    )?;
    header(&mut out, page, brand, assets_dir)?;
    Ok(out)
}

fn close_page(mut out: String, page: &PageLayout, brand: &Branding) -> Result<String> {
    footer(&mut out, page, brand)?;
    writeln!(out, "</svg>")?;
    Ok(out)
}

fn header(out: &mut String, page: &PageLayout, brand: &Branding, assets_dir: &Path) -> Result<()> {
    image(out, &page.logo, &brand.logo_file, assets_dir)?;

    let b = page.contact_box;
    let r = page.contact_box_radius.min(b.w / 2.0).min(b.h / 2.0);
    // Only the bottom-right corner is rounded.
    writeln!(
        out,
        "<path d=\"M {x0} {y0} H {x1} V {yr} A {r} {r} 0 0 1 {xr} {y1} H {x0} Z\" fill=\"{fill}\"/>",
        x0 = b.x,
        y0 = b.y,
        x1 = b.x + b.w,
        yr = b.y + b.h - r,
        xr = b.x + b.w - r,
        y1 = b.y + b.h,
        r = r,
        fill = rgb(TINT)
    )?;

    image(out, &page.contact_icon, &brand.icon_file, assets_dir)?;
    let size = pt_to_mm(10.0);
    for (i, line) in brand.contact_lines().iter().enumerate() {
        text_at(
            out,
            page.contact_text.x,
            page.contact_text.y + i as f64 * page.contact_line_step,
            size,
            Weight::Regular,
            BLACK,
            "start",
            line,
        )?;
    }

    image(out, &page.watermark, &brand.watermark_file, assets_dir)?;
    Ok(())
}

/// One table row with its cells already wrapped to their column widths.
struct RowBox {
    lines: Vec<Vec<String>>,
    height: f64,
    font: f64,
}

impl RowBox {
    fn measure(cells: &[String], table: &TableSpec, page: &PageLayout) -> Self {
        let font = pt_to_mm(page.font_size);
        let pad = page.cell_padding;
        let lines: Vec<Vec<String>> = cells
            .iter()
            .zip(&table.widths)
            .map(|(c, w)| wrap(c, w - 2.0 * pad, font))
            .collect();
        let count = lines.iter().map(Vec::len).max().unwrap_or(1).max(1);
        Self {
            lines,
            height: count as f64 * font + 2.0 * pad,
            font,
        }
    }

    fn draw(
        &self,
        out: &mut String,
        table: &TableSpec,
        page: &PageLayout,
        y: f64,
        is_header: bool,
    ) -> Result<()> {
        let pad = page.cell_padding;
        let line_h = self.font;
        let weight = if is_header { Weight::Bold } else { Weight::Regular };
        let mut x = page.margin_left;
        for ((cell_lines, w), align) in self.lines.iter().zip(&table.widths).zip(&table.aligns) {
            writeln!(
                out,
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"#000\" stroke-width=\"0.2\"/>",
                x, y, w, self.height
            )?;
            let (tx, anchor) = match align {
                Align::Left => (x + pad, "start"),
                Align::Center => (x + w / 2.0, "middle"),
            };
            for (i, line) in cell_lines.iter().enumerate() {
                let baseline = y + pad + i as f64 * line_h + line_h * 0.8;
                text_at(out, tx, baseline, self.font, weight, BLACK, anchor, line)?;
            }
            x += w;
        }
        Ok(())
    }
}

fn closing(out: &mut String, page: &PageLayout, brand: &Branding, top: f64) -> Result<()> {
    let lines: [(&str, f64, Weight, Rgb); 4] = [
        ("Thank you.", 12.0, Weight::Bold, BRAND),
        (brand.company.as_str(), 10.0, Weight::Bold, BLACK),
        (brand.address[0].as_str(), 10.0, Weight::Regular, BLACK),
        (brand.address[1].as_str(), 10.0, Weight::Regular, BLACK),
    ];
    for (i, (line, size_pt, weight, color)) in lines.iter().enumerate() {
        let size = pt_to_mm(*size_pt);
        let baseline = top + i as f64 * 5.0 + 2.5 + size * 0.35;
        text_at(out, page.closing_x, baseline, size, *weight, *color, "start", line)?;
    }
    Ok(())
}

fn footer(out: &mut String, page: &PageLayout, brand: &Branding) -> Result<()> {
    let size = pt_to_mm(8.0);
    let center = (page.margin_left + page.width - page.margin_right) / 2.0;
    let baseline = page.height - 15.0 + 5.0 + size * 0.35;
    text_at(
        out,
        center,
        baseline,
        size,
        Weight::Italic,
        BLACK,
        "middle",
        &brand.footer,
    )
}

fn image(out: &mut String, at: &ImagePlacement, file: &str, assets_dir: &Path) -> Result<()> {
    if !assets_dir.join(file).is_file() {
        warn!(asset = file, dir = %assets_dir.display(), "branding image not found; skipped");
        return Ok(());
    }
    writeln!(
        out,
        "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"xMinYMin meet\" xlink:href=\"{}\"/>",
        at.x,
        at.y,
        at.w,
        at.h,
        escape(file)
    )?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn text_at(
    out: &mut String,
    x: f64,
    y: f64,
    size: f64,
    weight: Weight,
    color: Rgb,
    anchor: &str,
    s: &str,
) -> Result<()> {
    if s.is_empty() {
        return Ok(());
    }
    let style = match weight {
        Weight::Regular => "",
        Weight::Bold => " font-weight=\"bold\"",
        Weight::Italic => " font-style=\"italic\"",
    };
    writeln!(
        out,
        "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{:.3}\"{} fill=\"{}\" text-anchor=\"{}\">{}</text>",
        x,
        y,
        FONT,
        size,
        style,
        rgb(color),
        anchor,
        escape(s)
    )?;
    Ok(())
}

/// Greedy word wrap against an estimated glyph width. Words longer than a
/// line are split by characters.
pub fn wrap(s: &str, width: f64, font: f64) -> Vec<String> {
    let max_chars = ((width / (font * CHAR_ADVANCE)).floor() as usize).max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut cur = String::new();
    for word in s.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !cur.is_empty() {
                lines.push(std::mem::take(&mut cur));
            }
            lines.push(word.drain(..max_chars).collect());
        }
        let word: String = word.into_iter().collect();
        if word.is_empty() {
            continue;
        }
        let needed = if cur.is_empty() {
            word.chars().count()
        } else {
            cur.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !cur.is_empty() {
            lines.push(std::mem::take(&mut cur));
        }
        if !cur.is_empty() {
            cur.push(' ');
        }
        cur.push_str(&word);
    }
    if !cur.is_empty() || lines.is_empty() {
        lines.push(cur);
    }
    lines
}

fn rgb((r, g, b): Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
