// ============================================================================
// Sheet Composition
// ============================================================================

use crate::error::AppError;
use crate::layout::{
    Frame, LabelAssets, LabelLayout, Orientation, PlacedLabel, LABEL_HEIGHT_MM, LABEL_WIDTH_MM,
};
use crate::record::{Group, GroupAssignment, GroupRecords};

/// A4 dimensions in mm
pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// Vertical label grid
pub const GRID_COLUMNS: u32 = 5;
pub const GRID_ROWS: u32 = 3;
pub const LABELS_PER_PAGE: u32 = GRID_COLUMNS * GRID_ROWS;

const GRID_LEFT_MM: f32 = 13.0;
const GRID_TOP_MM: f32 = 12.0;
const GRID_GAP_X_MM: f32 = 3.0;
const GRID_GAP_Y_MM: f32 = 3.0;

/// Gap between the grid and the horizontal pair, and within the pair
const HORIZONTAL_GAP_MM: f32 = 3.0;

/// Vertical slots are labels turned on their side
const SLOT_WIDTH_MM: f32 = LABEL_HEIGHT_MM;
const SLOT_HEIGHT_MM: f32 = LABEL_WIDTH_MM;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub labels: Vec<PlacedLabel>,
}

impl Page {
    pub fn count(&self, orientation: Orientation) -> usize {
        self.labels
            .iter()
            .filter(|l| l.frame.orientation == orientation)
            .count()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub pages: Vec<Page>,
}

impl Sheet {
    pub fn label_count(&self) -> usize {
        self.pages.iter().map(|p| p.labels.len()).sum()
    }
}

/// Grid position of the vertical label at ordinal `idx`: (page, column, row).
///
/// The column always follows `idx mod 5`, and each page takes 15 labels.
pub fn grid_cell(idx: u32) -> (u32, u32, u32) {
    let page = idx / LABELS_PER_PAGE;
    let col = idx % GRID_COLUMNS;
    let row = (idx % LABELS_PER_PAGE) / GRID_COLUMNS;
    (page, col, row)
}

pub fn vertical_frame(col: u32, row: u32) -> Frame {
    let x = GRID_LEFT_MM + col as f32 * (SLOT_WIDTH_MM + GRID_GAP_X_MM);
    let y = PAGE_HEIGHT_MM
        - GRID_TOP_MM
        - (row + 1) as f32 * SLOT_HEIGHT_MM
        - row as f32 * GRID_GAP_Y_MM;
    Frame {
        orientation: Orientation::Vertical,
        x,
        y,
    }
}

/// The horizontal pair sits under the full three-row grid, centred on the page.
pub fn horizontal_frames() -> [Frame; 2] {
    let grid_bottom = PAGE_HEIGHT_MM
        - GRID_TOP_MM
        - GRID_ROWS as f32 * SLOT_HEIGHT_MM
        - (GRID_ROWS - 1) as f32 * GRID_GAP_Y_MM;
    let y = grid_bottom - LABEL_HEIGHT_MM - HORIZONTAL_GAP_MM;
    let pair_width = 2.0 * LABEL_WIDTH_MM + HORIZONTAL_GAP_MM;
    let start_x = (PAGE_WIDTH_MM - pair_width) / 2.0;

    [0.0, 1.0].map(|i| Frame {
        orientation: Orientation::Horizontal,
        x: start_x + i * (LABEL_WIDTH_MM + HORIZONTAL_GAP_MM),
        y,
    })
}

pub struct SheetComposer {
    layout: LabelLayout,
}

impl SheetComposer {
    pub fn new(layout: LabelLayout) -> Self {
        Self { layout }
    }

    pub fn compose(
        &self,
        assignment: &GroupAssignment,
        records: &GroupRecords,
    ) -> Result<Sheet, AppError> {
        let mut assets: [Option<LabelAssets>; 2] = [None, None];
        for &group in assignment.active_groups() {
            let record = records
                .get(group)
                .ok_or(AppError::MissingGroup(group.number()))?;
            assets[group.index()] = Some(LabelAssets::prepare(record)?);
        }
        let assets_for = |group: Group| {
            assets[group.index()]
                .as_ref()
                .ok_or(AppError::MissingGroup(group.number()))
        };

        let mut sheet = Sheet::default();

        for idx in 0..assignment.total() {
            let group = assignment.group_of(idx);
            let (page, col, row) = grid_cell(idx);
            if page as usize >= sheet.pages.len() {
                sheet.pages.push(Page::default());
            }

            log::debug!(
                "label {} -> group {}, page {}, col {}, row {}",
                idx,
                group.number(),
                page,
                col,
                row
            );

            let placed = self.layout.place(assets_for(group)?, vertical_frame(col, row));
            sheet.pages[page as usize].labels.push(placed);
        }

        let last = sheet
            .pages
            .last_mut()
            .ok_or(AppError::InvalidTotal(assignment.total()))?;
        for (group, frame) in assignment
            .horizontal_groups()
            .into_iter()
            .zip(horizontal_frames())
        {
            last.labels.push(self.layout.place(assets_for(group)?, frame));
        }

        log::info!(
            "Composed {} labels on {} page(s)",
            sheet.label_count(),
            sheet.pages.len()
        );
        Ok(sheet)
    }

    /// One upright label per active group, each at the origin of its own page.
    pub fn preview(&self, records: &GroupRecords) -> Result<Vec<PlacedLabel>, AppError> {
        let origin = Frame {
            orientation: Orientation::Horizontal,
            x: 0.0,
            y: 0.0,
        };
        records
            .iter()
            .map(|record| {
                let assets = LabelAssets::prepare(record)?;
                Ok::<_, AppError>(self.layout.place(&assets, origin))
            })
            .collect()
    }
}
