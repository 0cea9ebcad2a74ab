//! Filter engine and the caller-owned session context it is driven by.

use std::collections::BTreeSet;

use crate::dataset::RecordSet;
use crate::models::{
    AaStatus, Dimension, FilterConfig, InstitutionType, ProgramKey, ProgramRecord,
};
use crate::normalize::normalize_institution_type;

/// One constraint of a filter selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// The record's value on `dimension` must be one of `values`.
    /// An empty set places no constraint.
    OneOf {
        dimension: Dimension,
        values: BTreeSet<String>,
    },
    AaStatus(AaStatus),
}

impl Predicate {
    pub fn one_of<I, S>(dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf {
            dimension,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Self::OneOf { values, .. } => !values.is_empty(),
            Self::AaStatus(_) => true,
        }
    }

    pub fn matches(&self, record: &ProgramRecord) -> bool {
        match self {
            Self::OneOf { dimension, values } => {
                values.is_empty() || values.contains(dimension.value_of(record))
            }
            Self::AaStatus(status) => record.aa_status() == *status,
        }
    }

    fn dimension(&self) -> Dimension {
        match self {
            Self::OneOf { dimension, .. } => *dimension,
            Self::AaStatus(_) => Dimension::AaStatus,
        }
    }
}

/// Records satisfying every predicate. No predicates returns the full set.
pub fn apply_filters(records: &RecordSet, predicates: &[Predicate]) -> RecordSet {
    records.subset(|record| predicates.iter().all(|p| p.matches(record)))
}

/// Display labels for configured institution types. Accepts the labels
/// themselves in any case as well as raw sheet spellings such as "Pública".
fn institution_type_labels(values: &[String]) -> Vec<&'static str> {
    values
        .iter()
        .filter_map(|value| {
            let kind = InstitutionType::from_label(value).or_else(|| {
                Some(normalize_institution_type(Some(value))).filter(|kind| kind.is_valid())
            });
            if kind.is_none() {
                log::warn!("Ignoring unrecognized institution type filter '{value}'");
            }
            kind.map(InstitutionType::label)
        })
        .collect()
}

/// Filter selections and the comparison list of one user session.
///
/// Held by the caller and passed into the filter engine explicitly; at most
/// one predicate per dimension is kept.
#[derive(Debug, Clone, Default)]
pub struct FilterContext {
    predicates: Vec<Predicate>,
    comparison: Vec<ProgramKey>,
}

impl FilterContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        let mut context = Self::new();
        context.set(Predicate::one_of(Dimension::Region, config.regions.clone()));
        context.set(Predicate::one_of(Dimension::State, config.states.clone()));
        context.set(Predicate::one_of(Dimension::Grade, config.grades.clone()));
        context.set(Predicate::one_of(
            Dimension::InstitutionType,
            institution_type_labels(&config.institution_types),
        ));
        context.set(Predicate::one_of(Dimension::Modality, config.modalities.clone()));
        if let Some(status) = config.aa_status {
            context.set(Predicate::AaStatus(status));
        }
        context
    }

    /// Replace the predicate on the same dimension; inactive predicates clear it.
    pub fn set(&mut self, predicate: Predicate) {
        let dimension = predicate.dimension();
        self.predicates.retain(|p| p.dimension() != dimension);
        if predicate.is_active() {
            self.predicates.push(predicate);
        }
    }

    pub fn with(mut self, predicate: Predicate) -> Self {
        self.set(predicate);
        self
    }

    pub fn clear_dimension(&mut self, dimension: Dimension) {
        self.predicates.retain(|p| p.dimension() != dimension);
    }

    pub fn clear(&mut self) {
        self.predicates.clear();
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn active_count(&self) -> usize {
        self.predicates.len()
    }

    pub fn apply(&self, records: &RecordSet) -> RecordSet {
        apply_filters(records, &self.predicates)
    }

    pub fn add_to_comparison(&mut self, key: ProgramKey) -> bool {
        if self.comparison.contains(&key) {
            return false;
        }
        self.comparison.push(key);
        true
    }

    pub fn remove_from_comparison(&mut self, key: &ProgramKey) {
        self.comparison.retain(|k| k != key);
    }

    pub fn clear_comparison(&mut self) {
        self.comparison.clear();
    }

    pub fn comparison(&self) -> &[ProgramKey] {
        &self.comparison
    }

    /// Records of the comparison list, in the order they were added.
    pub fn comparison_records(&self, records: &RecordSet) -> RecordSet {
        let mut selected = RecordSet::new(Vec::new(), records.columns.clone());
        for key in &self.comparison {
            if let Some(record) = records.iter().find(|r| r.key() == *key) {
                selected.records.push(record.clone());
            }
        }
        selected
    }
}
