// ============================================================================
// Logo Compositing
// ============================================================================

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

use crate::error::AppError;

/// Resolution the logo is resampled to before embedding
pub const LOGO_DPI: f32 = 300.0;

const MM_PER_INCH: f32 = 25.4;

/// Opaque RGB logo, resampled to fit its target box.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueBitmap {
    pub image: RgbImage,
    /// Physical size of the bitmap once placed, within the target box
    pub width_mm: f32,
    pub height_mm: f32,
}

pub fn load(path: &Path) -> Result<DynamicImage, AppError> {
    let bytes = std::fs::read(path).map_err(|e| AppError::Logo(format!("{}: {}", path.display(), e)))?;
    ::image::load_from_memory(&bytes)
        .map_err(|e| AppError::Logo(format!("Failed to decode image: {}", e)))
}

/// Loads `path` and flattens it onto white, fitted into a `box_w_mm` x `box_h_mm` box.
pub fn compose(path: &Path, box_w_mm: f32, box_h_mm: f32) -> Result<OpaqueBitmap, AppError> {
    let source = load(path)?;
    Ok(compose_image(&source, box_w_mm, box_h_mm))
}

pub fn compose_image(source: &DynamicImage, box_w_mm: f32, box_h_mm: f32) -> OpaqueBitmap {
    let flat = flatten_on_white(&source.to_rgba8());

    let (src_w, src_h) = flat.dimensions();
    let target_w = mm_to_px(box_w_mm) as f32;
    let target_h = mm_to_px(box_h_mm) as f32;
    let scale = (target_w / src_w as f32).min(target_h / src_h as f32);
    let new_w = ((src_w as f32 * scale) as u32).max(1);
    let new_h = ((src_h as f32 * scale) as u32).max(1);

    let image = imageops::resize(&flat, new_w, new_h, FilterType::Lanczos3);

    // keep the source aspect ratio when placed
    let aspect = src_w as f32 / src_h as f32;
    let (width_mm, height_mm) = if box_w_mm / box_h_mm > aspect {
        (box_h_mm * aspect, box_h_mm)
    } else {
        (box_w_mm, box_w_mm / aspect)
    };

    OpaqueBitmap {
        image,
        width_mm,
        height_mm,
    }
}

/// Blends over white, then whitens every pixel that was not fully opaque.
fn flatten_on_white(rgba: &RgbaImage) -> RgbImage {
    let (width, height) = rgba.dimensions();

    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let Rgba([r, g, b, a]) = *pixel;
        let alpha = a as f32 / 255.0;
        let bg = 255.0;
        let out_r = (r as f32 * alpha + bg * (1.0 - alpha)).round() as u8;
        let out_g = (g as f32 * alpha + bg * (1.0 - alpha)).round() as u8;
        let out_b = (b as f32 * alpha + bg * (1.0 - alpha)).round() as u8;
        canvas.put_pixel(x, y, Rgba([out_r, out_g, out_b, 255]));
    }

    let mut rgb_image = RgbImage::new(width, height);
    for (x, y, pixel) in canvas.enumerate_pixels() {
        let source_alpha = rgba.get_pixel(x, y)[3];
        let Rgba([r, g, b, _]) = *pixel;
        let out = if source_alpha == 255 {
            Rgb([r, g, b])
        } else {
            Rgb([255, 255, 255])
        };
        rgb_image.put_pixel(x, y, out);
    }
    rgb_image
}

fn mm_to_px(mm: f32) -> u32 {
    (mm / MM_PER_INCH * LOGO_DPI) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_logo() -> DynamicImage {
        let mut img = RgbaImage::new(40, 20);
        for (x, y, px) in img.enumerate_pixels_mut() {
            *px = if x < 10 {
                Rgba([200, 0, 0, 255])
            } else if x < 20 {
                Rgba([0, 0, 200, 128])
            } else if y < 10 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([10, 120, 10, 255])
            };
        }
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn translucent_pixels_become_white() {
        let flat = flatten_on_white(&sample_logo().to_rgba8());
        assert_eq!(*flat.get_pixel(0, 0), Rgb([200, 0, 0]));
        assert_eq!(*flat.get_pixel(15, 5), Rgb([255, 255, 255]));
        assert_eq!(*flat.get_pixel(30, 2), Rgb([255, 255, 255]));
        assert_eq!(*flat.get_pixel(30, 15), Rgb([10, 120, 10]));
    }

    #[test]
    fn fits_within_box_preserving_aspect() {
        let logo = compose_image(&sample_logo(), 6.0, 6.0);
        // 6mm at 300 dpi = 70px, source is 2:1
        assert_eq!(logo.image.width(), 70);
        assert_eq!(logo.image.height(), 35);
        assert!((logo.width_mm - 6.0).abs() < 1e-4);
        assert!((logo.height_mm - 3.0).abs() < 1e-4);
    }

    #[test]
    fn composing_twice_is_identical() {
        let dir = std::env::temp_dir().join("etiquetas-logo-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("logo.png");
        sample_logo().save(&path).unwrap();

        let first = compose(&path, 12.0, 12.0).unwrap();
        let second = compose(&path, 12.0, 12.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_file_is_a_logo_error() {
        let err = compose(Path::new("does/not/exist.png"), 6.0, 6.0).unwrap_err();
        assert!(matches!(err, AppError::Logo(_)));
    }
}
