//! Fixed page geometry and branding. Everything the page composer places at an
//! absolute position lives here, in millimetres from the top-left corner.

use crate::core::model::Layout;

pub type Rgb = (u8, u8, u8);

pub const BRAND: Rgb = (101, 44, 145);
pub const RULE: Rgb = (101, 38, 137);
pub const TINT: Rgb = (227, 217, 246);
pub const BLACK: Rgb = (0, 0, 0);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pos {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// An image anchored at its top-left corner. It keeps its aspect ratio inside
/// a `w` x `h` box, so `h` only bounds the height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImagePlacement {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PageLayout {
    pub orientation: Orientation,
    pub width: f64,
    pub height: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    /// Distance from the bottom edge at which a new page starts.
    pub break_margin: f64,
    pub logo: ImagePlacement,
    pub contact_box: Rect,
    pub contact_box_radius: f64,
    pub contact_icon: ImagePlacement,
    /// Baseline of the first contact line; later lines follow `contact_line_step` apart.
    pub contact_text: Pos,
    pub contact_line_step: f64,
    pub watermark: ImagePlacement,
    /// Separator under the date line, from the left margin to `rule_x2`.
    pub rule_y: f64,
    pub rule_x2: f64,
    pub rule_width: f64,
    /// x of the closing "Thank you." block.
    pub closing_x: f64,
    pub column_widths_flat: Vec<f64>,
    pub column_widths_paired: Vec<f64>,
    pub cell_padding: f64,
    pub font_size: f64,
    pub title_size: f64,
}

impl PageLayout {
    pub fn portrait() -> Self {
        Self {
            orientation: Orientation::Portrait,
            width: 210.0,
            height: 297.0,
            margin_left: 12.0,
            margin_right: 12.0,
            margin_top: 44.0,
            break_margin: 20.0,
            logo: ImagePlacement { x: 10.0, y: 8.0, w: 92.0, h: 24.0 },
            contact_box: Rect { x: 109.0, y: 0.0, w: 105.0, h: 34.0 },
            contact_box_radius: 5.0,
            contact_icon: ImagePlacement { x: 112.0, y: 6.5, w: 7.0, h: 7.0 },
            contact_text: Pos { x: 123.0, y: 11.0 },
            contact_line_step: 5.0,
            watermark: ImagePlacement { x: 13.0, y: 25.0, w: 190.0, h: 250.0 },
            rule_y: 65.0,
            rule_x2: 198.0,
            rule_width: 0.5,
            closing_x: 123.0,
            column_widths_flat: vec![80.0, 20.0, 20.0, 20.0, 20.0, 20.0],
            column_widths_paired: vec![56.0, 21.0, 21.0, 21.0, 21.0, 20.0, 20.0, 20.0, 20.0, 17.5, 17.5],
            cell_padding: 2.5,
            font_size: 8.0,
            title_size: 22.0,
        }
    }

    pub fn landscape() -> Self {
        Self {
            orientation: Orientation::Landscape,
            width: 297.0,
            height: 210.0,
            contact_box: Rect { x: 190.0, y: 0.0, w: 110.0, h: 34.0 },
            contact_icon: ImagePlacement { x: 197.0, y: 6.5, w: 7.0, h: 7.0 },
            contact_text: Pos { x: 207.0, y: 11.0 },
            watermark: ImagePlacement { x: 67.0, y: 15.0, w: 156.0, h: 180.0 },
            rule_x2: 285.0,
            closing_x: 206.0,
            ..Self::portrait()
        }
    }

    pub fn for_layout(layout: Layout) -> Self {
        if layout.is_paired() {
            Self::landscape()
        } else {
            Self::portrait()
        }
    }

    pub fn column_widths(&self, layout: Layout) -> &[f64] {
        if layout.is_paired() {
            &self.column_widths_paired
        } else {
            &self.column_widths_flat
        }
    }

    /// Lowest y any table row or closing line may reach.
    pub fn break_y(&self) -> f64 {
        self.height - self.break_margin
    }

    /// Canvas size in PDF points; the SVG view box stays in millimetres.
    pub fn size_pt(&self) -> (f64, f64) {
        (mm_to_pt(self.width), mm_to_pt(self.height))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Branding {
    pub company: String,
    pub phone: String,
    pub email: String,
    pub address: [String; 2],
    pub footer: String,
    pub logo_file: String,
    pub icon_file: String,
    pub watermark_file: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            company: "SequenSale\u{ae}".to_string(),
            phone: "+91 7905820313".to_string(),
            email: "info@sequensale.online".to_string(),
            address: [
                "Flexcel Park, C Wing, S.V. Road, Jogeshwari(W),".to_string(),
                "Mumbai 400102, Maharashtra, India.".to_string(),
            ],
            footer: "Business Confidential".to_string(),
            logo_file: "logo.png".to_string(),
            icon_file: "icon.png".to_string(),
            watermark_file: "watermark.png".to_string(),
        }
    }
}

impl Branding {
    pub fn contact_lines(&self) -> [&str; 4] {
        [
            self.phone.as_str(),
            self.email.as_str(),
            self.address[0].as_str(),
            self.address[1].as_str(),
        ]
    }
}

pub fn mm_to_pt(mm: f64) -> f64 {
    mm * 72.0 / 25.4
}

/// Font sizes are given in points but drawn in the millimetre view box.
pub fn pt_to_mm(pt: f64) -> f64 {
    pt * 25.4 / 72.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_swaps_page_and_moves_header() {
        let p = PageLayout::portrait();
        let l = PageLayout::landscape();
        assert_eq!((p.width, p.height), (l.height, l.width));
        assert!(l.contact_box.x > p.contact_box.x);
        assert_eq!(l.column_widths_paired, p.column_widths_paired);
        assert_eq!(l.margin_left, p.margin_left);
    }

    #[test]
    fn layout_selects_orientation() {
        assert_eq!(
            PageLayout::for_layout(Layout::Flat).orientation,
            Orientation::Portrait
        );
        assert_eq!(
            PageLayout::for_layout(Layout::OuterJoin).orientation,
            Orientation::Landscape
        );
    }

    #[test]
    fn a4_in_points() {
        let (w, h) = PageLayout::portrait().size_pt();
        assert!((w - 595.28).abs() < 0.01);
        assert!((h - 841.89).abs() < 0.01);
    }
}
