use std::collections::{BTreeSet, HashSet};

use crate::columns::LogicalColumn;
use crate::loader::SheetData;
use crate::models::ProgramRecord;
use crate::schema::ALL_AREAS;

/// Working copy of program records plus the logical columns their sheets provided.
///
/// Filtering and reporting always operate on a `RecordSet`; the loaded
/// [`Dataset`] is never handed out mutably.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub records: Vec<ProgramRecord>,
    pub columns: HashSet<LogicalColumn>,
}

impl RecordSet {
    pub fn new(records: Vec<ProgramRecord>, columns: HashSet<LogicalColumn>) -> Self {
        Self { records, columns }
    }

    /// A set whose records claim every logical column.
    pub fn with_all_columns(records: Vec<ProgramRecord>) -> Self {
        Self::new(records, LogicalColumn::all().into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProgramRecord> {
        self.records.iter()
    }

    pub fn has_column(&self, column: LogicalColumn) -> bool {
        self.columns.contains(&column)
    }

    /// Copy of the records matching `keep`, with the same column set.
    pub fn subset<F>(&self, keep: F) -> RecordSet
    where
        F: Fn(&ProgramRecord) -> bool,
    {
        RecordSet {
            records: self.records.iter().filter(|r| keep(r)).cloned().collect(),
            columns: self.columns.clone(),
        }
    }

    /// Sorted distinct non-empty values of a text field.
    pub fn distinct<F>(&self, field: F) -> BTreeSet<String>
    where
        F: Fn(&ProgramRecord) -> &str,
    {
        self.records
            .iter()
            .map(|r| field(r))
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a ProgramRecord;
    type IntoIter = std::slice::Iter<'a, ProgramRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Everything read in one load: one entry per usable sheet, in load order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    sheets: Vec<SheetData>,
}

impl Dataset {
    pub fn new(sheets: Vec<SheetData>) -> Self {
        Self { sheets }
    }

    pub fn area_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.area.clone()).collect()
    }

    pub fn total_records(&self) -> usize {
        self.sheets.iter().map(|s| s.records.len()).sum()
    }

    /// Copy of every area's records; columns are the union over all sheets.
    pub fn all_areas(&self) -> RecordSet {
        RecordSet {
            records: self
                .sheets
                .iter()
                .flat_map(|s| s.records.iter().cloned())
                .collect(),
            columns: self
                .sheets
                .iter()
                .flat_map(|s| s.columns.iter().copied())
                .collect(),
        }
    }

    /// Copy of one area's records; [`ALL_AREAS`] selects the combined set.
    pub fn area(&self, area: &str) -> Option<RecordSet> {
        if area == ALL_AREAS {
            return Some(self.all_areas());
        }
        self.sheets
            .iter()
            .find(|s| s.area == area)
            .map(|s| RecordSet::new(s.records.clone(), s.columns.clone()))
    }
}
