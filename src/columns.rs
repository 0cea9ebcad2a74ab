//! Locating logical columns under inconsistent header spellings.

use std::collections::{HashMap, HashSet};

use crate::models::SocialGroup;
use crate::normalize::fold_accents;
use crate::schema::raw;

/// Uppercased header without whitespace or accents.
pub fn normalize_header(name: &str) -> String {
    fold_accents(name)
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Index of the first column whose normalized name equals the normalized pattern.
pub fn find_column_index<S: AsRef<str>>(columns: &[S], pattern: &str) -> Option<usize> {
    let pattern = normalize_header(pattern);
    columns
        .iter()
        .position(|column| normalize_header(column.as_ref()) == pattern)
}

/// Name of the first column matching `pattern`, e.g. `"TIPODEIES"` finds `"Tipo de IES"`.
pub fn find_column<'a, S: AsRef<str>>(columns: &'a [S], pattern: &str) -> Option<&'a str> {
    find_column_index(columns, pattern).map(|index| columns[index].as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogicalColumn {
    ProgramName,
    InstitutionAcronym,
    State,
    Region,
    Grade,
    InstitutionType,
    Modality,
    AaEditais,
    AaAggregated,
    AaPerGroup,
    TotalSlots,
    AaTotalSlots,
    AaAggregatedSlots,
    AaPerGroupSlots,
    GroupFlag(SocialGroup),
    GroupSlots(SocialGroup),
}

impl LogicalColumn {
    /// Columns without which a sheet is skipped.
    pub const REQUIRED: [LogicalColumn; 7] = [
        Self::ProgramName,
        Self::InstitutionAcronym,
        Self::State,
        Self::Region,
        Self::Grade,
        Self::InstitutionType,
        Self::AaEditais,
    ];

    pub fn all() -> Vec<LogicalColumn> {
        let mut columns = vec![
            Self::ProgramName,
            Self::InstitutionAcronym,
            Self::State,
            Self::Region,
            Self::Grade,
            Self::InstitutionType,
            Self::Modality,
            Self::AaEditais,
            Self::AaAggregated,
            Self::AaPerGroup,
            Self::TotalSlots,
            Self::AaTotalSlots,
            Self::AaAggregatedSlots,
            Self::AaPerGroupSlots,
        ];
        columns.extend(SocialGroup::ALL.into_iter().map(Self::GroupFlag));
        columns.extend(SocialGroup::ALL.into_iter().map(Self::GroupSlots));
        columns
    }

    /// Known header spellings, tried in order.
    pub fn aliases(self) -> Vec<&'static str> {
        match self {
            Self::ProgramName => raw::PROGRAM_NAME.to_vec(),
            Self::InstitutionAcronym => raw::INSTITUTION_ACRONYM.to_vec(),
            Self::State => raw::STATE.to_vec(),
            Self::Region => raw::REGION.to_vec(),
            Self::Grade => raw::GRADE.to_vec(),
            Self::InstitutionType => raw::INSTITUTION_TYPE.to_vec(),
            Self::Modality => raw::MODALITY.to_vec(),
            Self::AaEditais => raw::AA_EDITAIS.to_vec(),
            Self::AaAggregated => raw::AA_AGGREGATED.to_vec(),
            Self::AaPerGroup => raw::AA_PER_GROUP.to_vec(),
            Self::TotalSlots => raw::TOTAL_SLOTS.to_vec(),
            Self::AaTotalSlots => raw::AA_TOTAL_SLOTS.to_vec(),
            Self::AaAggregatedSlots => raw::AA_AGGREGATED_SLOTS.to_vec(),
            Self::AaPerGroupSlots => raw::AA_PER_GROUP_SLOTS.to_vec(),
            Self::GroupFlag(group) => vec![group.flag_column()],
            Self::GroupSlots(group) => vec![group.slot_column()],
        }
    }

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

/// Resolved positions of the logical columns present in one sheet.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    positions: HashMap<LogicalColumn, usize>,
}

impl ColumnMap {
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut positions = HashMap::new();
        for column in LogicalColumn::all() {
            let found = column
                .aliases()
                .into_iter()
                .find_map(|alias| find_column_index(headers, alias));
            if let Some(index) = found {
                log::debug!("Resolved {column:?} to header {:?}", headers[index].as_ref());
                positions.insert(column, index);
            }
        }
        Self { positions }
    }

    pub fn position(&self, column: LogicalColumn) -> Option<usize> {
        self.positions.get(&column).copied()
    }

    pub fn contains(&self, column: LogicalColumn) -> bool {
        self.positions.contains_key(&column)
    }

    pub fn missing_required(&self) -> Vec<LogicalColumn> {
        LogicalColumn::REQUIRED
            .into_iter()
            .filter(|column| !self.contains(*column))
            .collect()
    }

    pub fn present(&self) -> HashSet<LogicalColumn> {
        self.positions.keys().copied().collect()
    }

    /// Cell text of `column` in `row`; `None` when the column is absent or the row is short.
    pub fn cell<'a, S: AsRef<str>>(&self, row: &'a [S], column: LogicalColumn) -> Option<&'a str> {
        self.position(column)
            .and_then(|index| row.get(index))
            .map(|cell| cell.as_ref())
    }
}
