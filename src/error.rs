// ============================================================================
// Error Handling
// ============================================================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid date '{0}' (expected dd/mm/yyyy)")]
    InvalidDate(String),
    #[error("Invalid time '{0}' (expected HH:MM:SS)")]
    InvalidTime(String),
    #[error("Invalid group split: group 1 has {group1_count} of {total} labels")]
    InvalidGroups { group1_count: u32, total: u32 },
    #[error("Invalid label count: {0}")]
    InvalidTotal(u32),
    #[error("No label data for group {0}")]
    MissingGroup(u8),
    #[error("Failed to encode barcode '{code}': {reason}")]
    Barcode { code: String, reason: String },
    #[error("Failed to load logo: {0}")]
    Logo(String),
    #[error("Failed to read client mapping: {0}")]
    ClientMap(String),
    #[error("Failed to import spreadsheet: {0}")]
    Import(String),
    #[error("Failed to create PDF: {0}")]
    Pdf(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Errors raised before any drawing starts.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::InvalidDate(_)
                | AppError::InvalidTime(_)
                | AppError::InvalidGroups { .. }
                | AppError::InvalidTotal(_)
                | AppError::MissingGroup(_)
                | AppError::Barcode { .. }
        )
    }
}
