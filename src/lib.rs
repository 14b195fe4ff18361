//! Label sheet generation: Code128 part labels laid out on A4 as PDF.
//!
//! Records for up to two groups are validated into a [`generate::LabelJob`],
//! tiled into a rotated 5 x 3 grid plus two upright labels per sheet, and
//! written with `printpdf`.

pub mod barcode;
pub mod clients;
pub mod error;
pub mod generate;
pub mod import;
pub mod layout;
pub mod logo;
pub mod metrics;
pub mod record;
pub mod sheet;
pub mod writer;

pub use error::AppError;
pub use generate::{generate_preview, generate_sheet, GenerationReport, LabelJob};
pub use record::{Group, GroupAssignment, LabelFields, LabelRecord};
