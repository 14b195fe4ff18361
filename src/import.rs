// ============================================================================
// Spreadsheet Import
// ============================================================================

use calamine::{open_workbook_auto, Data, DataType, Reader};
use std::path::Path;

use crate::error::AppError;
use crate::record::{LabelFields, DATE_FORMAT, TIME_FORMAT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Client,
    Part,
    Date,
    Time,
    Code,
}

impl Column {
    const ALL: [Column; 5] = [
        Column::Client,
        Column::Part,
        Column::Date,
        Column::Time,
        Column::Code,
    ];

    fn header(self) -> &'static str {
        match self {
            Column::Client => "Cliente",
            Column::Part => "Peça",
            Column::Date => "Data",
            Column::Time => "Hora",
            Column::Code => "Código",
        }
    }
}

/// Reads up to `groups` data rows from the first worksheet of `path`.
///
/// The first row holds the column headers. Missing columns import as empty
/// strings.
pub fn import_fields(path: &Path, groups: usize) -> Result<Vec<LabelFields>, AppError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| AppError::Import(format!("{}: {}", path.display(), e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::Import(format!("{}: no worksheets", path.display())))?
        .map_err(|e| AppError::Import(e.to_string()))?;

    let rows: Vec<&[Data]> = range.rows().collect();
    let fields = fields_from_rows(&rows, groups)?;
    log::info!("Imported {} row(s) from {}", fields.len(), path.display());
    Ok(fields)
}

fn fields_from_rows(rows: &[&[Data]], groups: usize) -> Result<Vec<LabelFields>, AppError> {
    let (header, data) = rows
        .split_first()
        .ok_or_else(|| AppError::Import("worksheet is empty".to_string()))?;
    if data.is_empty() {
        return Err(AppError::Import("worksheet has no data rows".to_string()));
    }

    let positions: Vec<(Column, Option<usize>)> = Column::ALL
        .iter()
        .map(|&column| {
            let position = header
                .iter()
                .position(|cell| cell.to_string().trim() == column.header());
            if position.is_none() {
                log::warn!("Column '{}' not found, importing it as empty", column.header());
            }
            (column, position)
        })
        .collect();

    Ok(data
        .iter()
        .take(groups)
        .map(|row| {
            let mut fields = LabelFields::default();
            for &(column, position) in &positions {
                let value = position
                    .and_then(|i| row.get(i))
                    .map(|cell| cell_text(cell, column))
                    .unwrap_or_default();
                match column {
                    Column::Client => fields.client = value,
                    Column::Part => fields.part = value,
                    Column::Date => fields.date = value,
                    Column::Time => fields.time = value,
                    Column::Code => fields.code = value,
                }
            }
            fields
        })
        .collect())
}

/// Native date/time cells are reformatted; everything else is taken as text.
///
/// Excel stores both as serial `DateTime` values. ODS stores dates as ISO
/// strings, with or without a time part, and times of day as ISO durations.
fn cell_text(cell: &Data, column: Column) -> String {
    let native = matches!(
        cell,
        Data::DateTime(_) | Data::DateTimeIso(_) | Data::DurationIso(_)
    );
    if native {
        let formatted = match column {
            Column::Date => cell.as_date().map(|d| d.format(DATE_FORMAT).to_string()),
            Column::Time => cell.as_time().map(|t| t.format(TIME_FORMAT).to_string()),
            _ => None,
        };
        if let Some(text) = formatted {
            return text;
        }
    }

    match cell {
        Data::Empty => String::new(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}
