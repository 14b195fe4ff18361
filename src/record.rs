// ============================================================================
// Label Records and Group Assignment
// ============================================================================

use chrono::{NaiveDate, NaiveTime};
use std::path::PathBuf;

use crate::barcode;
use crate::error::AppError;

/// Date format shown on the label and accepted on input
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Time format shown on the label and accepted on input
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Barcode value used when the operator leaves the code empty
pub const PLACEHOLDER_CODE: &str = "0000000";

/// Client name prefixes that get the logo-only layout
const SPECIAL_BRAND_PREFIXES: [&str; 2] = ["DAF", "IVECO"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    One,
    Two,
}

impl Group {
    pub fn index(self) -> usize {
        match self {
            Group::One => 0,
            Group::Two => 1,
        }
    }

    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

/// Unvalidated field values for one group, as typed or imported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelFields {
    pub client: String,
    pub part: String,
    pub date: String,
    pub time: String,
    pub code: String,
    pub logo: Option<PathBuf>,
}

/// Validated snapshot of the data printed on one physical label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRecord {
    pub group: Group,
    pub client: String,
    pub part: String,
    pub date: String,
    pub time: String,
    pub code: String,
    pub logo: Option<PathBuf>,
}

impl LabelRecord {
    pub fn from_fields(group: Group, fields: &LabelFields) -> Result<Self, AppError> {
        let date = fields.date.trim();
        let time = fields.time.trim();
        validate_date(date)?;
        validate_time(time)?;

        let code = if fields.code.trim().is_empty() {
            PLACEHOLDER_CODE.to_string()
        } else {
            fields.code.trim().to_string()
        };
        barcode::validate(&code)?;

        Ok(Self {
            group,
            client: fields.client.clone(),
            part: fields.part.clone(),
            date: date.to_string(),
            time: time.to_string(),
            code,
            logo: fields.logo.clone(),
        })
    }

    pub fn is_special_brand(&self) -> bool {
        is_special_brand(&self.client)
    }
}

/// DAF and IVECO labels show only the logo in the header.
pub fn is_special_brand(client: &str) -> bool {
    let normalized = client.trim().to_uppercase();
    SPECIAL_BRAND_PREFIXES
        .iter()
        .any(|prefix| normalized.starts_with(prefix))
}

pub fn validate_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| AppError::InvalidDate(value.to_string()))
}

pub fn validate_time(value: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .map_err(|_| AppError::InvalidTime(value.to_string()))
}

// ============================================================================
// Group Assignment
// ============================================================================

/// How many labels to print and how they split between the two groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupAssignment {
    total: u32,
    group1_count: u32,
    use_groups: bool,
}

impl GroupAssignment {
    pub fn new(total: u32, group1_count: u32, use_groups: bool) -> Result<Self, AppError> {
        if total == 0 {
            return Err(AppError::InvalidTotal(total));
        }
        if use_groups && (group1_count == 0 || group1_count >= total) {
            return Err(AppError::InvalidGroups {
                group1_count,
                total,
            });
        }
        let group1_count = if use_groups { group1_count } else { total };
        Ok(Self {
            total,
            group1_count,
            use_groups,
        })
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn group1_count(&self) -> u32 {
        self.group1_count
    }

    pub fn use_groups(&self) -> bool {
        self.use_groups
    }

    /// Group of the vertical label at ordinal `idx`.
    pub fn group_of(&self, idx: u32) -> Group {
        if idx < self.group1_count {
            Group::One
        } else {
            Group::Two
        }
    }

    /// Groups of the two horizontal labels under the grid, left to right.
    pub fn horizontal_groups(&self) -> [Group; 2] {
        if self.use_groups {
            [Group::One, Group::Two]
        } else {
            [Group::One, Group::One]
        }
    }

    pub fn active_groups(&self) -> &'static [Group] {
        if self.use_groups {
            &[Group::One, Group::Two]
        } else {
            &[Group::One]
        }
    }
}

/// Validated records for every active group, keyed by group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRecords {
    records: [Option<LabelRecord>; 2],
}

impl GroupRecords {
    /// Validates the fields of each group the assignment uses.
    pub fn build(assignment: &GroupAssignment, fields: &[LabelFields; 2]) -> Result<Self, AppError> {
        let mut records = [None, None];
        for &group in assignment.active_groups() {
            records[group.index()] = Some(LabelRecord::from_fields(group, &fields[group.index()])?);
        }
        Ok(Self { records })
    }

    pub fn get(&self, group: Group) -> Option<&LabelRecord> {
        self.records[group.index()].as_ref()
    }

    /// Records in group order.
    pub fn iter(&self) -> impl Iterator<Item = &LabelRecord> {
        self.records.iter().flatten()
    }
}
