// ============================================================================
// Built-in Font Metrics
// ============================================================================
//
// printpdf's built-in fonts carry no metrics, so centred text needs the
// standard Helvetica advance widths (1/1000 em, ASCII 32..=126).

use printpdf::BuiltinFont;

/// Points to millimetres
pub const PT_TO_MM: f32 = 25.4 / 72.0;

/// Advance used for characters outside the table
const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// The two faces used on a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Regular,
    Bold,
}

impl Face {
    pub fn builtin(self) -> BuiltinFont {
        match self {
            Face::Regular => BuiltinFont::Helvetica,
            Face::Bold => BuiltinFont::HelveticaBold,
        }
    }

    fn widths(self) -> &'static [u16; 95] {
        match self {
            Face::Regular => &HELVETICA,
            Face::Bold => &HELVETICA_BOLD,
        }
    }
}

/// Rendered width of `text` in points.
pub fn string_width_pt(text: &str, face: Face, size_pt: f32) -> f32 {
    let table = face.widths();
    let units: u32 = text
        .chars()
        .map(|c| {
            let code = c as u32;
            if (32..=126).contains(&code) {
                table[(code - 32) as usize] as u32
            } else {
                FALLBACK_WIDTH as u32
            }
        })
        .sum();
    units as f32 / 1000.0 * size_pt
}

/// Rendered width of `text` in millimetres.
pub fn string_width_mm(text: &str, face: Face, size_pt: f32) -> f32 {
    string_width_pt(text, face, size_pt) * PT_TO_MM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_widths() {
        // M=833 A=722 H=722 L=611 E=667 in bold
        let w = string_width_pt("MAHLE", Face::Bold, 10.0);
        assert!((w - 35.55).abs() < 1e-3);
        assert!((string_width_pt(" ", Face::Regular, 1000.0) - 278.0).abs() < 1e-3);
    }

    #[test]
    fn bold_is_not_narrower() {
        let text = "MADE IN BRAZIL";
        assert!(string_width_pt(text, Face::Bold, 7.0) >= string_width_pt(text, Face::Regular, 7.0));
    }
}
