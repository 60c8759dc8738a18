use crate::core::error::{ReportError, Result};
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use svg2pdf::ConversionOptions;
use svg2pdf::usvg;
use tracing::debug;

const PAGE_XOBJECT: Name<'static> = Name(b"P1");

/// Converts the pages and writes them next to `path` first, renaming into
/// place only once the whole document is on disk.
pub fn write(path: &Path, pages: &[String], assets_dir: &Path) -> Result<()> {
    let pdf = pages_to_pdf(pages, assets_dir)?;
    let tmp_path = tmp_path(path);
    let written = fs::write(&tmp_path, &pdf).and_then(|_| fs::rename(&tmp_path, path));
    match written {
        Ok(()) => {
            debug!(
                path = %path.display(),
                pages = pages.len(),
                bytes = pdf.len(),
                "pdf written"
            );
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            Err(ReportError::Render(format!(
                "failed to write {}: {e}",
                path.display()
            )))
        }
    }
}

/// Each SVG becomes a form XObject drawn full-size on its own page.
pub fn pages_to_pdf(pages: &[String], assets_dir: &Path) -> Result<Vec<u8>> {
    let mut opt = usvg::Options {
        resources_dir: Some(assets_dir.to_path_buf()),
        ..usvg::Options::default()
    };
    opt.fontdb_mut().load_system_fonts();

    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let page_tree_id = alloc.bump();
    let mut pdf = Pdf::new();
    let mut kids = Vec::with_capacity(pages.len());

    for (n, svg) in pages.iter().enumerate() {
        let tree = usvg::Tree::from_str(svg, &opt)
            .map_err(|e| ReportError::Render(format!("usvg parse failed on page {}: {e}", n + 1)))?;
        let (chunk, svg_id) = svg2pdf::to_chunk(&tree, ConversionOptions::default()).map_err(|e| {
            ReportError::Render(format!("svg2pdf conversion failed on page {}: {e}", n + 1))
        })?;

        let mut map = HashMap::new();
        let chunk = chunk.renumber(|old| *map.entry(old).or_insert_with(|| alloc.bump()));
        let svg_id = map.get(&svg_id).copied().ok_or_else(|| {
            ReportError::Render(format!("page {} lost its graphic on renumbering", n + 1))
        })?;

        let page_id = alloc.bump();
        let content_id = alloc.bump();
        let (w, h) = (tree.size().width(), tree.size().height());

        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, w, h));
        page.parent(page_tree_id);
        page.contents(content_id);
        page.resources().x_objects().pair(PAGE_XOBJECT, svg_id);
        page.finish();

        // The XObject is one point square; scale it up to the page.
        let mut content = Content::new();
        content
            .save_state()
            .transform([w, 0.0, 0.0, h, 0.0, 0.0])
            .x_object(PAGE_XOBJECT)
            .restore_state();
        pdf.stream(content_id, &content.finish());
        pdf.extend(&chunk);
        kids.push(page_id);
    }

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(kids.iter().copied())
        .count(kids.len() as i32);
    Ok(pdf.finish())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVG: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"100\" height=\"50\" \
                       viewBox=\"0 0 100 50\"><rect x=\"10\" y=\"10\" width=\"20\" height=\"20\" \
                       fill=\"#652c91\"/></svg>";

    fn page_count(pdf: &[u8]) -> usize {
        let text = String::from_utf8_lossy(pdf);
        text.matches("/Type /Page").count() - text.matches("/Type /Pages").count()
    }

    #[test]
    fn writes_pdf_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("RawReadTable.pdf");
        write(&out, &[SVG.to_string()], dir.path()).unwrap();
        let bytes = fs::read(&out).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(page_count(&bytes), 1);
        assert!(!dir.path().join("RawReadTable.pdf.tmp").exists());
    }

    #[test]
    fn every_svg_becomes_a_page() {
        let pages = vec![SVG.to_string(); 3];
        let bytes = pages_to_pdf(&pages, Path::new(".")).unwrap();
        assert_eq!(page_count(&bytes), 3);
        assert!(String::from_utf8_lossy(&bytes).contains("/Count 3"));
    }

    #[test]
    fn bad_svg_is_a_render_error_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("RawReadTable.pdf");
        let pages = [SVG.to_string(), "<not-svg".to_string()];
        let err = write(&out, &pages, dir.path()).unwrap_err();
        assert!(matches!(err, ReportError::Render(_)));
        assert!(!out.exists());
    }

    #[test]
    fn unwritable_destination_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing").join("RawReadTable.pdf");
        assert!(matches!(
            write(&out, &[SVG.to_string()], dir.path()).unwrap_err(),
            ReportError::Render(_)
        ));
    }
}
