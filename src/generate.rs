// ============================================================================
// Generation Workflow
// ============================================================================

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::AppError;
use crate::layout::{BrandText, LabelLayout};
use crate::record::{GroupAssignment, GroupRecords, LabelFields};
use crate::sheet::SheetComposer;
use crate::writer;

/// Name of the generated sheet inside the output directory
pub const SHEET_FILE_NAME: &str = "etiquetas.pdf";

/// Name of the generated preview inside the output directory
pub const PREVIEW_FILE_NAME: &str = "etiquetas-preview.pdf";

/// Immutable snapshot of everything one generation run needs.
#[derive(Debug, Clone)]
pub struct LabelJob {
    pub assignment: GroupAssignment,
    pub records: GroupRecords,
    pub brand: BrandText,
}

impl LabelJob {
    /// Validates the group split and the fields of every active group.
    pub fn new(
        total: u32,
        group1_count: u32,
        use_groups: bool,
        fields: &[LabelFields; 2],
        brand: BrandText,
    ) -> Result<Self, AppError> {
        let assignment = GroupAssignment::new(total, group1_count, use_groups)?;
        let records = GroupRecords::build(&assignment, fields)?;
        Ok(Self {
            assignment,
            records,
            brand,
        })
    }

    fn composer(&self) -> SheetComposer {
        SheetComposer::new(LabelLayout::new(self.brand.clone()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub path: PathBuf,
    pub labels: usize,
    pub pages: usize,
}

pub fn generate_sheet(job: &LabelJob, output_dir: &Path) -> Result<GenerationReport, AppError> {
    let sheet = job.composer().compose(&job.assignment, &job.records)?;
    let path = writer::write_sheet(&sheet, &output_dir.join(SHEET_FILE_NAME))?;
    Ok(GenerationReport {
        path,
        labels: sheet.label_count(),
        pages: sheet.pages.len(),
    })
}

pub fn generate_preview(job: &LabelJob, output_dir: &Path) -> Result<PathBuf, AppError> {
    let labels = job.composer().preview(&job.records)?;
    writer::write_preview(&labels, &output_dir.join(PREVIEW_FILE_NAME))
}

/// Best effort: hands the file to the desktop's default viewer.
pub fn open_in_viewer(path: &Path) {
    let mut command = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };

    let result = command
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();
    if let Err(e) = result {
        log::debug!("Could not open {}: {}", path.display(), e);
    }
}
