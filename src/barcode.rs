// ============================================================================
// Code128 Barcode Rendering
// ============================================================================

use barcoders::sym::code128::Code128;
use image::{Rgb, RgbImage};

use crate::error::AppError;

/// barcoders selects a character set with a marker char, first at the
/// start of the data and again at every switch. Set B covers printable
/// ASCII; set C packs two digits into one symbol.
const CHARSET_B: char = '\u{0181}';
const CHARSET_C: char = '\u{0106}';

/// Digit run length worth switching to set C for: whole value, at either
/// end, in the middle.
const SET_C_RUN_WHOLE: usize = 2;
const SET_C_RUN_EDGE: usize = 4;
const SET_C_RUN_MIDDLE: usize = 6;

/// Minimum quiet zone on each side, as a module count
const QUIET_ZONE_MODULES: usize = 10;

/// Minimum quiet zone on each side, in mm (a quarter inch)
const QUIET_ZONE_MIN_MM: f32 = 6.35;

/// Encoded Code128 symbol with its physical bar geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct BarcodeGlyph {
    modules: Vec<u8>,
    bar_width_mm: f32,
    bar_height_mm: f32,
}

impl BarcodeGlyph {
    /// Width including quiet zones, before any scaling.
    pub fn natural_width(&self) -> f32 {
        self.modules.len() as f32 * self.bar_width_mm
    }

    pub fn natural_height(&self) -> f32 {
        self.bar_height_mm
    }

    pub fn bar_width(&self) -> f32 {
        self.bar_width_mm
    }

    pub fn modules(&self) -> &[u8] {
        &self.modules
    }

    /// Horizontal scale that fits the symbol into `max_width_mm`. Never enlarges.
    pub fn fit_scale(&self, max_width_mm: f32) -> f32 {
        let natural = self.natural_width();
        if natural <= 0.0 {
            return 1.0;
        }
        (max_width_mm / natural).min(1.0)
    }

    /// One pixel per module, one pixel tall. Stretched vertically when placed.
    pub fn to_image(&self) -> RgbImage {
        let mut img = RgbImage::from_pixel(self.modules.len() as u32, 1, Rgb([255, 255, 255]));
        for (x, module) in self.modules.iter().enumerate() {
            if *module == 1 {
                img.put_pixel(x as u32, 0, Rgb([0, 0, 0]));
            }
        }
        img
    }
}

/// Checks that `code` is printable ASCII, which Code128 sets B and C cover.
pub fn validate(code: &str) -> Result<(), AppError> {
    if code.is_empty() {
        return Err(AppError::Barcode {
            code: code.to_string(),
            reason: "empty value".to_string(),
        });
    }
    if let Some(bad) = code.chars().find(|c| !(' '..='~').contains(c)) {
        return Err(AppError::Barcode {
            code: code.to_string(),
            reason: format!("character {:?} is not encodable", bad),
        });
    }
    Ok(())
}

pub fn render(code: &str, bar_width_mm: f32, bar_height_mm: f32) -> Result<BarcodeGlyph, AppError> {
    validate(code)?;

    let symbol = Code128::new(code128_data(code)).map_err(|e| AppError::Barcode {
        code: code.to_string(),
        reason: e.to_string(),
    })?;
    let encoded = symbol.encode();

    let quiet = QUIET_ZONE_MODULES.max((QUIET_ZONE_MIN_MM / bar_width_mm).ceil() as usize);
    let mut modules = Vec::with_capacity(encoded.len() + 2 * quiet);
    modules.resize(quiet, 0);
    modules.extend_from_slice(&encoded);
    modules.resize(modules.len() + quiet, 0);

    log::debug!("barcode {} -> {} modules", code, modules.len());

    Ok(BarcodeGlyph {
        modules,
        bar_width_mm,
        bar_height_mm,
    })
}

/// Marks up `code` with character set switches: long digit runs go to set
/// C, everything else stays in set B.
fn code128_data(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    let mut out = String::with_capacity(code.len() + 4);
    let mut current = None;

    let mut start = 0;
    while start < chars.len() {
        let digits = chars[start].is_ascii_digit();
        let end = chars[start..]
            .iter()
            .position(|c| c.is_ascii_digit() != digits)
            .map_or(chars.len(), |n| start + n);
        let run = &chars[start..end];

        let at_start = start == 0;
        let at_end = end == chars.len();
        let threshold = match (at_start, at_end) {
            (true, true) => SET_C_RUN_WHOLE,
            (true, false) | (false, true) => SET_C_RUN_EDGE,
            (false, false) => SET_C_RUN_MIDDLE,
        };

        if !digits || run.len() < threshold {
            enter(&mut out, &mut current, CHARSET_B);
            out.extend(run);
        } else if run.len() % 2 == 0 {
            enter(&mut out, &mut current, CHARSET_C);
            out.extend(run);
        } else if at_start {
            // odd run: the leftover digit joins the text that follows
            let (paired, rest) = run.split_at(run.len() - 1);
            enter(&mut out, &mut current, CHARSET_C);
            out.extend(paired);
            enter(&mut out, &mut current, CHARSET_B);
            out.extend(rest);
        } else {
            let (rest, paired) = run.split_at(1);
            enter(&mut out, &mut current, CHARSET_B);
            out.extend(rest);
            enter(&mut out, &mut current, CHARSET_C);
            out.extend(paired);
        }

        start = end;
    }
    out
}

fn enter(out: &mut String, current: &mut Option<char>, set: char) {
    if *current != Some(set) {
        out.push(set);
        *current = Some(set);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_code_with_quiet_zones() {
        let glyph = render("US873001", 0.6, 10.0).unwrap();
        // start, U, S, switch to C, 87 30 01, checksum: 8 symbols of 11
        // modules, stop is 13
        let body = 8 * 11 + 13;
        assert_eq!(glyph.modules().len(), body + 2 * 11);
        assert_eq!(glyph.modules()[0], 0);
        assert_eq!(glyph.modules()[11], 1);
        assert!((glyph.natural_width() - glyph.modules().len() as f32 * 0.6).abs() < 1e-4);
        assert_eq!(glyph.natural_height(), 10.0);
    }

    #[test]
    fn scale_never_enlarges() {
        let short = render("1", 0.6, 10.0).unwrap();
        assert_eq!(short.fit_scale(47.0), 1.0);

        let long = render("US873001-LONG-VALUE", 0.6, 10.0).unwrap();
        let scale = long.fit_scale(47.0);
        assert!(scale < 1.0);
        assert!((long.natural_width() * scale - 47.0).abs() < 1e-3);
        assert_eq!(long.natural_height(), 10.0);
    }

    #[test]
    fn rejects_non_ascii() {
        assert!(matches!(render("ÇÃO", 0.6, 10.0), Err(AppError::Barcode { .. })));
        assert!(validate("").is_err());
        assert!(validate("A 960 505 49 55").is_ok());
    }

    #[test]
    fn digit_runs_switch_to_set_c() {
        assert_eq!(code128_data("US873001"), "\u{0181}US\u{0106}873001");
        assert_eq!(code128_data("0000000"), "\u{0106}000000\u{0181}0");
        assert_eq!(code128_data("123456"), "\u{0106}123456");
        assert_eq!(code128_data("AB1234567CD"), "\u{0181}AB1\u{0106}234567\u{0181}CD");
        // short runs stay in set B
        assert_eq!(code128_data("A 960 505 49 55"), "\u{0181}A 960 505 49 55");
        assert_eq!(code128_data("AB1234CD"), "\u{0181}AB1234CD");
        assert_eq!(code128_data("1"), "\u{0181}1");
    }

    #[test]
    fn numeric_codes_are_narrower_than_set_b() {
        // 12 digits in set B: start + 12 + checksum = 14 symbols
        let numeric = render("123456789012", 0.6, 10.0).unwrap();
        // set C: start + 6 pairs + checksum = 8 symbols
        assert_eq!(numeric.modules().len(), 8 * 11 + 13 + 2 * 11);
        assert!(numeric.natural_width() < 14.0 * 11.0 * 0.6);
    }

    #[test]
    fn mixed_runs_encode() {
        for code in ["GH123456", "0000000", "AB1234567CD", "87300US", "1"] {
            assert!(render(code, 0.6, 10.0).is_ok(), "{}", code);
        }
    }

    #[test]
    fn image_matches_modules() {
        let glyph = render("GH123456", 0.6, 10.0).unwrap();
        let img = glyph.to_image();
        assert_eq!(img.width() as usize, glyph.modules().len());
        assert_eq!(img.height(), 1);
        for (x, m) in glyph.modules().iter().enumerate() {
            let expected = if *m == 1 { 0 } else { 255 };
            assert_eq!(img.get_pixel(x as u32, 0)[0], expected);
        }
    }
}
