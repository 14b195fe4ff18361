// ============================================================================
// PDF Output
// ============================================================================

use printpdf::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::barcode::BarcodeGlyph;
use crate::error::AppError;
use crate::layout::{DrawCommand, PlacedLabel, LABEL_HEIGHT_MM, LABEL_WIDTH_MM};
use crate::logo::OpaqueBitmap;
use crate::metrics::Face;
use crate::sheet::{Sheet, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};

const MM_PER_INCH: f32 = 25.4;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, face: Face) -> &IndirectFontRef {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
        }
    }
}

/// Executes draw commands against a printpdf document.
pub struct PdfDocumentWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: Fonts,
    page_width: f32,
    page_height: f32,
    pages: usize,
}

impl PdfDocumentWriter {
    pub fn new(title: &str, page_width: f32, page_height: f32) -> Result<Self, AppError> {
        let (doc, page1, layer1) =
            PdfDocument::new(title, Mm(page_width), Mm(page_height), "Layer 1");
        let layer = doc.get_page(page1).get_layer(layer1);

        let regular = doc
            .add_builtin_font(Face::Regular.builtin())
            .map_err(|e| AppError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(Face::Bold.builtin())
            .map_err(|e| AppError::Pdf(e.to_string()))?;

        Ok(Self {
            doc,
            layer,
            fonts: Fonts { regular, bold },
            page_width,
            page_height,
            pages: 1,
        })
    }

    pub fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(self.page_width), Mm(self.page_height), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages += 1;
    }

    pub fn execute(&self, command: &DrawCommand) {
        match command {
            DrawCommand::SaveState => self.layer.save_graphics_state(),
            DrawCommand::RestoreState => self.layer.restore_graphics_state(),
            DrawCommand::Translate { x, y } => {
                let tx = Pt::from(Mm(*x)).0;
                let ty = Pt::from(Mm(*y)).0;
                self.layer
                    .set_ctm(CurTransMat::Raw([1.0, 0.0, 0.0, 1.0, tx, ty]));
            }
            DrawCommand::Rotate { degrees } => {
                let (sin, cos) = degrees.to_radians().sin_cos();
                self.layer
                    .set_ctm(CurTransMat::Raw([cos, sin, -sin, cos, 0.0, 0.0]));
            }
            DrawCommand::Text {
                text,
                face,
                size_pt,
                x,
                y,
            } => {
                self.layer
                    .use_text(text.as_str(), *size_pt, Mm(*x), Mm(*y), self.fonts.get(*face));
            }
            DrawCommand::Logo { bitmap, x, y } => embed_logo(&self.layer, bitmap, *x, *y),
            DrawCommand::Barcode {
                glyph,
                x,
                y,
                scale_x,
            } => embed_barcode(&self.layer, glyph, *x, *y, *scale_x),
        }
    }

    pub fn execute_all(&self, commands: &[DrawCommand]) {
        for command in commands {
            self.execute(command);
        }
    }

    /// Writes the document and returns the absolute path written.
    pub fn save(self, output_path: &Path) -> Result<PathBuf, AppError> {
        let file = File::create(output_path)?;
        let mut writer = BufWriter::new(file);
        self.doc
            .save(&mut writer)
            .map_err(|e| AppError::Pdf(e.to_string()))?;
        writer.flush()?;

        let written = std::fs::canonicalize(output_path)?;
        log::info!("Wrote {} page(s) to {}", self.pages, written.display());
        Ok(written)
    }
}

/// Draws every page of `sheet` on A4 and saves it to `output_path`.
pub fn write_sheet(sheet: &Sheet, output_path: &Path) -> Result<PathBuf, AppError> {
    let mut writer = PdfDocumentWriter::new("Etiquetas", PAGE_WIDTH_MM, PAGE_HEIGHT_MM)?;
    for (i, page) in sheet.pages.iter().enumerate() {
        if i > 0 {
            writer.new_page();
        }
        for label in &page.labels {
            writer.execute_all(&label.page_commands());
        }
    }
    writer.save(output_path)
}

/// One label-sized page per label, for checking a group before printing a sheet.
pub fn write_preview(labels: &[PlacedLabel], output_path: &Path) -> Result<PathBuf, AppError> {
    let mut writer = PdfDocumentWriter::new("Etiquetas (preview)", LABEL_WIDTH_MM, LABEL_HEIGHT_MM)?;
    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            writer.new_page();
        }
        writer.execute_all(&label.page_commands());
    }
    writer.save(output_path)
}

fn rgb_xobject(width: u32, height: u32, raw_pixels: Vec<u8>, interpolate: bool) -> Image {
    Image::from(ImageXObject {
        width: Px(width as usize),
        height: Px(height as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate,
        image_data: raw_pixels,
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    })
}

fn embed_logo(layer: &PdfLayerReference, bitmap: &OpaqueBitmap, x: f32, y: f32) {
    let (width_px, height_px) = bitmap.image.dimensions();
    let image = rgb_xobject(width_px, height_px, bitmap.image.as_raw().clone(), true);

    // DPI that maps the pixel width onto the fitted physical width
    let dpi = (width_px as f32) / (bitmap.width_mm / MM_PER_INCH);

    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(Mm(y)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
}

fn embed_barcode(layer: &PdfLayerReference, glyph: &BarcodeGlyph, x: f32, y: f32, scale_x: f32) {
    let strip = glyph.to_image();
    let (width_px, height_px) = strip.dimensions();
    let image = rgb_xobject(width_px, height_px, strip.into_raw(), false);

    // one pixel per module: a pixel is one bar width square, then the
    // strip is stretched to the bar height
    let dpi = MM_PER_INCH / glyph.bar_width();
    let scale_y = glyph.natural_height() / (height_px as f32 * glyph.bar_width());

    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(Mm(y)),
            scale_x: Some(scale_x),
            scale_y: Some(scale_y),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LabelLayout;
    use crate::record::{GroupAssignment, GroupRecords, LabelFields};
    use crate::sheet::SheetComposer;

    fn sheet(total: u32) -> Sheet {
        let fields = LabelFields {
            client: "MAN".to_string(),
            part: "A 960 505 49 55".to_string(),
            date: "01/01/2025".to_string(),
            time: "10:00:00".to_string(),
            code: "US873001".to_string(),
            logo: None,
        };
        let assignment = GroupAssignment::new(total, 1, false).unwrap();
        let records = GroupRecords::build(&assignment, &[fields.clone(), fields]).unwrap();
        SheetComposer::new(LabelLayout::default())
            .compose(&assignment, &records)
            .unwrap()
    }

    #[test]
    fn writes_pdf_and_reports_absolute_path() {
        let dir = std::env::temp_dir().join("etiquetas-writer-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("etiquetas.pdf");

        let written = write_sheet(&sheet(16), &path).unwrap();
        assert!(written.is_absolute());

        let bytes = std::fs::read(&written).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn unwritable_target_is_an_io_error() {
        let path = Path::new("/nonexistent-dir/etiquetas.pdf");
        assert!(matches!(write_sheet(&sheet(1), path), Err(AppError::Io(_))));
    }
}
