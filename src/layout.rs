// ============================================================================
// Label Layout
// ============================================================================
//
// Every label is laid out in its own coordinate space: millimetres, origin at
// the bottom-left corner of a 74 x 34 mm box. Vertical labels reuse the same
// commands inside a rotated frame.

use std::rc::Rc;

use crate::barcode::{self, BarcodeGlyph};
use crate::error::AppError;
use crate::logo::{self, OpaqueBitmap};
use crate::metrics::{string_width_mm, Face, PT_TO_MM};
use crate::record::LabelRecord;

/// Physical label size
pub const LABEL_WIDTH_MM: f32 = 74.0;
pub const LABEL_HEIGHT_MM: f32 = 34.0;

/// Left margin shared by the logo, date and time
const LEFT_MARGIN_MM: f32 = 2.0;

/// Header baseline distance from the top edge
const HEADER_DROP_MM: f32 = 5.0;

/// Logo box side
const LOGO_SIZE_MM: f32 = 6.0;
const LOGO_SIZE_SPECIAL_MM: f32 = 12.0;

const LOGO_GAP_MM: f32 = 1.0;

/// Baseline drops from the top edge
const PART_DROP_MM: f32 = 12.0;
const SHROUD_DROP_MM: f32 = 16.0;
const BRAND_DROP_MM: f32 = 7.0;
const DATE_DROP_MM: f32 = 23.0;
const TIME_DROP_MM: f32 = 28.0;

const BRAND_RIGHT_MARGIN_MM: f32 = 5.0;
const SUBBRAND_GAP_PT: f32 = 9.0;

/// Barcode geometry
pub const BAR_WIDTH_MM: f32 = 0.6;
pub const BAR_HEIGHT_MM: f32 = 10.0;
pub const BARCODE_MAX_WIDTH_MM: f32 = 47.0;
const BARCODE_RIGHT_MARGIN_MM: f32 = 5.0;
const BARCODE_BOTTOM_MM: f32 = 6.0;
const CAPTION_GAP_MM: f32 = 2.0;

/// Font sizes in points
const CLIENT_FONT_SIZE: f32 = 12.0;
const PART_FONT_SIZE: f32 = 8.0;
const BRAND_FONT_SIZE: f32 = 9.0;
const SUBBRAND_FONT_SIZE: f32 = 7.0;
const STAMP_FONT_SIZE: f32 = 7.5;

const SHROUD_TEXT: &str = "SHROUD";

// ============================================================================
// Draw Commands
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    SaveState,
    RestoreState,
    Translate { x: f32, y: f32 },
    /// Counter-clockwise, in degrees
    Rotate { degrees: f32 },
    /// Left-aligned text with its baseline at `y`
    Text {
        text: String,
        face: Face,
        size_pt: f32,
        x: f32,
        y: f32,
    },
    /// Logo with its bottom-left corner at (`x`, `y`)
    Logo { bitmap: Rc<OpaqueBitmap>, x: f32, y: f32 },
    /// Barcode with its bottom-left corner at (`x`, `y`), squeezed by `scale_x`
    Barcode {
        glyph: Rc<BarcodeGlyph>,
        x: f32,
        y: f32,
        scale_x: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Rotated 90 degrees inside a 34 x 74 mm grid slot
    Vertical,
    /// Upright, 74 x 34 mm
    Horizontal,
}

/// Where a label sits on the page: the bottom-left corner of its slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub orientation: Orientation,
    pub x: f32,
    pub y: f32,
}

impl Frame {
    pub fn slot_size(&self) -> (f32, f32) {
        match self.orientation {
            Orientation::Vertical => (LABEL_HEIGHT_MM, LABEL_WIDTH_MM),
            Orientation::Horizontal => (LABEL_WIDTH_MM, LABEL_HEIGHT_MM),
        }
    }

    /// Moves label space into page space.
    pub fn transforms(&self) -> Vec<DrawCommand> {
        match self.orientation {
            Orientation::Horizontal => vec![DrawCommand::Translate { x: self.x, y: self.y }],
            Orientation::Vertical => {
                let (slot_w, slot_h) = self.slot_size();
                vec![
                    DrawCommand::Translate {
                        x: self.x + slot_w / 2.0,
                        y: self.y + slot_h / 2.0,
                    },
                    DrawCommand::Rotate { degrees: 90.0 },
                    DrawCommand::Translate {
                        x: -LABEL_WIDTH_MM / 2.0,
                        y: -LABEL_HEIGHT_MM / 2.0,
                    },
                ]
            }
        }
    }
}

/// A laid-out label ready for the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    pub record: Rc<LabelRecord>,
    pub frame: Frame,
    pub commands: Vec<DrawCommand>,
}

impl PlacedLabel {
    /// Label commands wrapped in its frame transform.
    pub fn page_commands(&self) -> Vec<DrawCommand> {
        let mut out = Vec::with_capacity(self.commands.len() + 5);
        out.push(DrawCommand::SaveState);
        out.extend(self.frame.transforms());
        out.extend(self.commands.iter().cloned());
        out.push(DrawCommand::RestoreState);
        out
    }
}

// ============================================================================
// Label Assets
// ============================================================================

/// Bitmaps shared by every label of one group, prepared once per run.
#[derive(Debug, Clone)]
pub struct LabelAssets {
    pub record: Rc<LabelRecord>,
    pub logo: Option<Rc<OpaqueBitmap>>,
    pub barcode: Rc<BarcodeGlyph>,
}

impl LabelAssets {
    /// Renders the barcode and composes the logo. An unreadable logo is
    /// dropped with a warning.
    pub fn prepare(record: &LabelRecord) -> Result<Self, AppError> {
        let barcode = barcode::render(&record.code, BAR_WIDTH_MM, BAR_HEIGHT_MM)?;

        let logo_size = logo_size(record);
        let logo = match &record.logo {
            Some(path) => match logo::compose(path, logo_size, logo_size) {
                Ok(bitmap) => Some(Rc::new(bitmap)),
                Err(e) => {
                    log::warn!("Group {}: skipping logo: {}", record.group.number(), e);
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            record: Rc::new(record.clone()),
            logo,
            barcode: Rc::new(barcode),
        })
    }
}

fn logo_size(record: &LabelRecord) -> f32 {
    if record.is_special_brand() {
        LOGO_SIZE_SPECIAL_MM
    } else {
        LOGO_SIZE_MM
    }
}

// ============================================================================
// Layout Engine
// ============================================================================

/// Brand lines printed top-right on every label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandText {
    pub brand: String,
    pub subbrand: String,
}

impl Default for BrandText {
    fn default() -> Self {
        Self {
            brand: "MAHLE".to_string(),
            subbrand: "MADE IN BRAZIL".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LabelLayout {
    brand: BrandText,
}

impl LabelLayout {
    pub fn new(brand: BrandText) -> Self {
        Self { brand }
    }

    pub fn place(&self, assets: &LabelAssets, frame: Frame) -> PlacedLabel {
        PlacedLabel {
            record: Rc::clone(&assets.record),
            frame,
            commands: self.layout(assets),
        }
    }

    /// Draw commands for one label in label space.
    pub fn layout(&self, assets: &LabelAssets) -> Vec<DrawCommand> {
        let record = &assets.record;
        let special = record.is_special_brand();
        let top = LABEL_HEIGHT_MM;
        let header_y = top - HEADER_DROP_MM;
        let logo_size = logo_size(record);

        let mut cmds = Vec::with_capacity(10);

        if let Some(bitmap) = &assets.logo {
            cmds.push(DrawCommand::Logo {
                bitmap: Rc::clone(bitmap),
                x: LEFT_MARGIN_MM,
                y: header_y - bitmap.height_mm / 2.0,
            });
        }

        // the logo box is reserved even when there is no logo
        let beside_logo_x = LEFT_MARGIN_MM + logo_size + LOGO_GAP_MM;
        if !special {
            cmds.push(text(&record.client, Face::Bold, CLIENT_FONT_SIZE, beside_logo_x, header_y));
        }

        let part_x = if special { LEFT_MARGIN_MM } else { beside_logo_x };
        cmds.push(text(&record.part, Face::Regular, PART_FONT_SIZE, part_x, top - PART_DROP_MM));
        cmds.push(text(SHROUD_TEXT, Face::Bold, PART_FONT_SIZE, part_x, top - SHROUD_DROP_MM));

        self.push_brand(&mut cmds);

        cmds.push(text(
            &format!("DATA: {}", record.date),
            Face::Bold,
            STAMP_FONT_SIZE,
            LEFT_MARGIN_MM,
            top - DATE_DROP_MM,
        ));
        cmds.push(text(
            &format!("HORA: {}", record.time),
            Face::Bold,
            STAMP_FONT_SIZE,
            LEFT_MARGIN_MM,
            top - TIME_DROP_MM,
        ));

        let glyph = &assets.barcode;
        let scale_x = glyph.fit_scale(BARCODE_MAX_WIDTH_MM);
        let bc_w = glyph.natural_width() * scale_x;
        let bc_x = LABEL_WIDTH_MM - bc_w - BARCODE_RIGHT_MARGIN_MM;
        let bc_y = BARCODE_BOTTOM_MM;
        cmds.push(DrawCommand::Barcode {
            glyph: Rc::clone(glyph),
            x: bc_x,
            y: bc_y,
            scale_x,
        });
        cmds.push(centred(
            &record.code,
            Face::Bold,
            STAMP_FONT_SIZE,
            bc_x + bc_w / 2.0,
            bc_y + glyph.natural_height() + CAPTION_GAP_MM,
        ));

        cmds
    }

    fn push_brand(&self, cmds: &mut Vec<DrawCommand>) {
        let brand_w = string_width_mm(&self.brand.brand, Face::Bold, BRAND_FONT_SIZE);
        let subbrand_w = string_width_mm(&self.brand.subbrand, Face::Regular, SUBBRAND_FONT_SIZE);
        let max_w = brand_w.max(subbrand_w);
        let center_x = LABEL_WIDTH_MM - BRAND_RIGHT_MARGIN_MM - max_w / 2.0;
        let brand_y = LABEL_HEIGHT_MM - BRAND_DROP_MM;
        let subbrand_y = brand_y - SUBBRAND_GAP_PT * PT_TO_MM;

        cmds.push(centred(&self.brand.brand, Face::Bold, BRAND_FONT_SIZE, center_x, brand_y));
        cmds.push(centred(
            &self.brand.subbrand,
            Face::Regular,
            SUBBRAND_FONT_SIZE,
            center_x,
            subbrand_y,
        ));
    }
}

fn text(value: &str, face: Face, size_pt: f32, x: f32, y: f32) -> DrawCommand {
    DrawCommand::Text {
        text: value.to_string(),
        face,
        size_pt,
        x,
        y,
    }
}

fn centred(value: &str, face: Face, size_pt: f32, center_x: f32, y: f32) -> DrawCommand {
    let width = string_width_mm(value, face, size_pt);
    text(value, face, size_pt, center_x - width / 2.0, y)
}
