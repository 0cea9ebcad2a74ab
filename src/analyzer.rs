use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::columns::LogicalColumn;
use crate::dataset::RecordSet;
use crate::models::{Dimension, InstitutionType, ProgramRecord, SlotField, SocialGroup};
use crate::schema::{aa_status, GRADE_ORDER};

/// Round half away from zero to `decimals` digits.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// `numerator / denominator * 100`, rounded. A zero or non-finite
/// denominator yields 0 instead of NaN or infinity.
pub fn percentage(numerator: f64, denominator: f64, decimals: u32) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return 0.0;
    }
    round_to(numerator / denominator * 100.0, decimals)
}

/// Canonical grades first in their fixed order, everything else after in
/// lexicographic order.
pub fn compare_grades(a: &str, b: &str) -> Ordering {
    let rank = |grade: &str| GRADE_ORDER.iter().position(|g| *g == grade);
    match (rank(a), rank(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

pub fn sort_grades<S: AsRef<str>>(grades: &mut [S]) {
    grades.sort_by(|a, b| compare_grades(a.as_ref(), b.as_ref()));
}

/// Natural order of category labels within a dimension.
pub fn compare_categories(dimension: Dimension, a: &str, b: &str) -> Ordering {
    fn fixed_rank(order: &[&str], value: &str) -> usize {
        order.iter().position(|v| *v == value).unwrap_or(order.len())
    }

    match dimension {
        Dimension::Grade => compare_grades(a, b),
        Dimension::InstitutionType => {
            let order = InstitutionType::ALL.map(InstitutionType::label);
            fixed_rank(&order, a)
                .cmp(&fixed_rank(&order, b))
                .then_with(|| a.cmp(b))
        }
        Dimension::AaStatus | Dimension::AaAnswer => {
            let order = [aa_status::WITH_AA, aa_status::WITHOUT_AA, aa_status::UNKNOWN];
            fixed_rank(&order, a)
                .cmp(&fixed_rank(&order, b))
                .then_with(|| a.cmp(b))
        }
        _ => a.cmp(b),
    }
}

fn compare_keys(dimensions: &[Dimension], a: &[String], b: &[String]) -> Ordering {
    dimensions
        .iter()
        .zip(a.iter().zip(b.iter()))
        .map(|(dimension, (x, y))| compare_categories(*dimension, x, y))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Count,
    /// Number of programs with AA editais.
    CountWithAa,
    Sum(SlotField),
    Mean(SlotField),
}

impl Metric {
    fn evaluate(self, records: &[&ProgramRecord]) -> f64 {
        match self {
            Self::Count => records.len() as f64,
            Self::CountWithAa => {
                records.iter().filter(|r| r.has_affirmative_action()).count() as f64
            }
            Self::Sum(field) => records.iter().map(|r| field.value_of(r)).sum(),
            Self::Mean(field) => {
                if records.is_empty() {
                    0.0
                } else {
                    records.iter().map(|r| field.value_of(r)).sum::<f64>() / records.len() as f64
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Highest metric first; ties in natural category order.
    MetricDescending,
    /// Natural category order (canonical order for grades and fixed vocabularies).
    Natural,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationRow {
    pub categories: Vec<String>,
    pub programs: usize,
    pub value: f64,
}

/// One row per observed category (or category combination); absent
/// combinations are not zero-filled.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult {
    pub dimensions: Vec<Dimension>,
    pub metric: Metric,
    pub rows: Vec<AggregationRow>,
}

impl AggregationResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn value(&self, categories: &[&str]) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.categories.iter().map(String::as_str).eq(categories.iter().copied()))
            .map(|row| row.value)
    }

    pub fn total(&self) -> f64 {
        self.rows.iter().map(|row| row.value).sum()
    }
}

/// Records grouped by their category values on `dimensions`. Records with a
/// blank value on any grouping dimension are left out.
pub fn group_records<'a>(
    set: &'a RecordSet,
    dimensions: &[Dimension],
) -> BTreeMap<Vec<String>, Vec<&'a ProgramRecord>> {
    let mut groups: BTreeMap<Vec<String>, Vec<&ProgramRecord>> = BTreeMap::new();
    for record in set {
        let key: Vec<String> = dimensions
            .iter()
            .map(|dimension| dimension.value_of(record).to_string())
            .collect();
        if key.iter().any(String::is_empty) {
            continue;
        }
        groups.entry(key).or_default().push(record);
    }
    groups
}

/// Group `set` on one or more dimensions and evaluate `metric` per group.
///
/// A single grade dimension is always returned in canonical grade order.
pub fn aggregate(
    set: &RecordSet,
    dimensions: &[Dimension],
    metric: Metric,
    order: SortOrder,
) -> AggregationResult {
    let mut rows: Vec<AggregationRow> = group_records(set, dimensions)
        .into_iter()
        .map(|(categories, records)| AggregationRow {
            programs: records.len(),
            value: metric.evaluate(&records),
            categories,
        })
        .collect();

    let natural = |a: &AggregationRow, b: &AggregationRow| {
        compare_keys(dimensions, &a.categories, &b.categories)
    };
    if order == SortOrder::Natural || dimensions == [Dimension::Grade] {
        rows.sort_by(natural);
    } else {
        rows.sort_by(|a, b| {
            b.value
                .partial_cmp(&a.value)
                .unwrap_or(Ordering::Equal)
                .then_with(|| natural(a, b))
        });
    }

    AggregationResult {
        dimensions: dimensions.to_vec(),
        metric,
        rows,
    }
}

/// Two-dimensional aggregation over the observed values of both dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Crosstab {
    pub row_dimension: Dimension,
    pub column_dimension: Dimension,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    cells: HashMap<(String, String), f64>,
}

impl Crosstab {
    /// Value of an observed combination; `None` when it never occurred.
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        self.cells.get(&(row.to_string(), column.to_string())).copied()
    }

    /// Value for display; absent combinations read as 0.
    pub fn value(&self, row: &str, column: &str) -> f64 {
        self.get(row, column).unwrap_or(0.0)
    }

    /// Observed cells only, in row then column order.
    pub fn cells(&self) -> Vec<(&str, &str, f64)> {
        let mut cells = Vec::new();
        for row in &self.rows {
            for column in &self.columns {
                if let Some(value) = self.get(row, column) {
                    cells.push((row.as_str(), column.as_str(), value));
                }
            }
        }
        cells
    }

    pub fn row_total(&self, row: &str) -> f64 {
        self.columns.iter().map(|column| self.value(row, column)).sum()
    }

    pub fn column_total(&self, column: &str) -> f64 {
        self.rows.iter().map(|row| self.value(row, column)).sum()
    }

    pub fn grand_total(&self) -> f64 {
        self.cells.values().sum()
    }

    /// Columns replaced by `order`; missing cells become explicit zeros and
    /// columns outside `order` are dropped.
    pub fn reindex_columns(&self, order: &[&str]) -> Crosstab {
        let columns: Vec<String> = order.iter().map(|c| c.to_string()).collect();
        let mut cells = HashMap::new();
        for row in &self.rows {
            for column in &columns {
                cells.insert((row.clone(), column.clone()), self.value(row, column));
            }
        }
        Crosstab {
            row_dimension: self.row_dimension,
            column_dimension: self.column_dimension,
            rows: self.rows.clone(),
            columns,
            cells,
        }
    }

    /// Cell-wise `self / denominator * 100` over the denominator's layout.
    pub fn percentage_of(&self, denominator: &Crosstab, decimals: u32) -> Crosstab {
        let mut cells = HashMap::new();
        for row in &denominator.rows {
            for column in &denominator.columns {
                let pct = percentage(
                    self.value(row, column),
                    denominator.value(row, column),
                    decimals,
                );
                cells.insert((row.clone(), column.clone()), pct);
            }
        }
        Crosstab {
            row_dimension: denominator.row_dimension,
            column_dimension: denominator.column_dimension,
            rows: denominator.rows.clone(),
            columns: denominator.columns.clone(),
            cells,
        }
    }
}

pub fn crosstab(
    set: &RecordSet,
    row_dimension: Dimension,
    column_dimension: Dimension,
    metric: Metric,
) -> Crosstab {
    let groups = group_records(set, &[row_dimension, column_dimension]);

    let mut rows: Vec<String> = groups
        .keys()
        .map(|k| k[0].clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let mut columns: Vec<String> = groups
        .keys()
        .map(|k| k[1].clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    rows.sort_by(|a, b| compare_categories(row_dimension, a, b));
    columns.sort_by(|a, b| compare_categories(column_dimension, a, b));

    let cells = groups
        .into_iter()
        .map(|(mut key, records)| {
            let column = key.pop().unwrap_or_default();
            let row = key.pop().unwrap_or_default();
            ((row, column), metric.evaluate(&records))
        })
        .collect();

    Crosstab {
        row_dimension,
        column_dimension,
        rows,
        columns,
        cells,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub total_programs: usize,
    pub with_aa: usize,
    pub without_aa: usize,
    pub aa_percentage: f64,
    pub total_slots: f64,
    pub total_aa_slots: f64,
    pub distinct_areas: usize,
    pub distinct_regions: usize,
    pub distinct_states: usize,
}

pub fn summary_stats(set: &RecordSet) -> SummaryStats {
    let total_programs = set.len();
    let with_aa = set.iter().filter(|r| r.has_affirmative_action()).count();
    SummaryStats {
        total_programs,
        with_aa,
        without_aa: total_programs - with_aa,
        aa_percentage: percentage(with_aa as f64, total_programs as f64, 1),
        total_slots: set.iter().map(|r| r.total_slots).sum(),
        total_aa_slots: set.iter().map(|r| r.aa_total_slots).sum(),
        distinct_areas: set.distinct(|r| r.area.as_str()).len(),
        distinct_regions: set.distinct(|r| r.region.as_str()).len(),
        distinct_states: set.distinct(|r| r.state.as_str()).len(),
    }
}

/// Program counts and slot sums of one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub category: String,
    pub programs: usize,
    pub with_aa: usize,
    pub total_slots: f64,
    pub aa_slots: f64,
    pub aggregated_slots: f64,
    pub per_group_slots: f64,
}

impl CategorySummary {
    fn from_records(category: String, records: &[&ProgramRecord]) -> Self {
        Self {
            category,
            programs: records.len(),
            with_aa: records.iter().filter(|r| r.has_affirmative_action()).count(),
            total_slots: records.iter().map(|r| r.total_slots).sum(),
            aa_slots: records.iter().map(|r| r.aa_total_slots).sum(),
            aggregated_slots: records.iter().map(|r| r.aa_aggregated_slots).sum(),
            per_group_slots: records.iter().map(|r| r.aa_per_group_slots).sum(),
        }
    }

    pub fn without_aa(&self) -> usize {
        self.programs - self.with_aa
    }

    pub fn open_slots(&self) -> f64 {
        self.total_slots - self.aa_slots
    }

    pub fn mean_slots(&self) -> f64 {
        if self.programs == 0 {
            0.0
        } else {
            self.total_slots / self.programs as f64
        }
    }

    pub fn aa_program_percentage(&self, decimals: u32) -> f64 {
        percentage(self.with_aa as f64, self.programs as f64, decimals)
    }

    pub fn aa_slot_percentage(&self, decimals: u32) -> f64 {
        percentage(self.aa_slots, self.total_slots, decimals)
    }
}

/// One [`CategorySummary`] per observed value of `dimension`, in natural order.
pub fn summarize_by(set: &RecordSet, dimension: Dimension) -> Vec<CategorySummary> {
    let mut summaries: Vec<CategorySummary> = group_records(set, &[dimension])
        .into_iter()
        .map(|(mut key, records)| CategorySummary::from_records(key.remove(0), &records))
        .collect();
    summaries.sort_by(|a, b| compare_categories(dimension, &a.category, &b.category));
    summaries
}

/// First non-empty `value` seen for each `key`, e.g. the region of each state.
pub fn first_values(set: &RecordSet, key: Dimension, value: Dimension) -> HashMap<String, String> {
    let mut firsts = HashMap::new();
    for record in set {
        let k = key.value_of(record);
        let v = value.value_of(record);
        if k.is_empty() || v.is_empty() {
            continue;
        }
        firsts.entry(k.to_string()).or_insert_with(|| v.to_string());
    }
    firsts
}

/// Programs with the highest positive value of `field`, at most `limit`.
pub fn top_programs(set: &RecordSet, field: SlotField, limit: usize) -> Vec<&ProgramRecord> {
    let mut programs: Vec<&ProgramRecord> =
        set.iter().filter(|r| field.value_of(r) > 0.0).collect();
    programs.sort_by(|a, b| {
        field
            .value_of(b)
            .partial_cmp(&field.value_of(a))
            .unwrap_or(Ordering::Equal)
    });
    programs.truncate(limit);
    programs
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstitutionSummary {
    pub acronym: String,
    pub state: String,
    pub region: String,
    pub programs: usize,
    pub with_aa: usize,
}

/// Programs per institution, most programs first.
pub fn summarize_institutions(set: &RecordSet) -> Vec<InstitutionSummary> {
    let states = first_values(set, Dimension::Institution, Dimension::State);
    let regions = first_values(set, Dimension::Institution, Dimension::Region);
    let mut summaries: Vec<InstitutionSummary> = summarize_by(set, Dimension::Institution)
        .into_iter()
        .map(|summary| InstitutionSummary {
            state: states.get(&summary.category).cloned().unwrap_or_default(),
            region: regions.get(&summary.category).cloned().unwrap_or_default(),
            programs: summary.programs,
            with_aa: summary.with_aa,
            acronym: summary.category,
        })
        .collect();
    summaries.sort_by(|a, b| b.programs.cmp(&a.programs).then_with(|| a.acronym.cmp(&b.acronym)));
    summaries
}

/// Social groups whose flag column exists in the set, in canonical order.
pub fn available_groups(set: &RecordSet) -> Vec<SocialGroup> {
    SocialGroup::ALL
        .into_iter()
        .filter(|group| set.has_column(LogicalColumn::GroupFlag(*group)))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupCoverage {
    pub group: SocialGroup,
    pub programs: usize,
    pub slots: f64,
    pub program_percentage: f64,
}

/// Programs and dedicated slots per social group, most covered group first.
pub fn group_overview(set: &RecordSet) -> Vec<GroupCoverage> {
    let mut overview: Vec<GroupCoverage> = available_groups(set)
        .into_iter()
        .map(|group| {
            let programs = set.iter().filter(|r| r.covers_group(group)).count();
            GroupCoverage {
                group,
                programs,
                slots: set.iter().map(|r| r.group_slots[group.index()]).sum(),
                program_percentage: percentage(programs as f64, set.len() as f64, 2),
            }
        })
        .collect();
    overview.sort_by(|a, b| b.programs.cmp(&a.programs));
    overview
}

/// Programs covering at least one available group, with their groups; most groups first.
pub fn programs_with_groups(set: &RecordSet) -> Vec<(&ProgramRecord, Vec<SocialGroup>)> {
    let available = available_groups(set);
    let mut programs: Vec<(&ProgramRecord, Vec<SocialGroup>)> = set
        .iter()
        .map(|record| {
            let groups: Vec<SocialGroup> = available
                .iter()
                .copied()
                .filter(|group| record.covers_group(*group))
                .collect();
            (record, groups)
        })
        .filter(|(_, groups)| !groups.is_empty())
        .collect();
    programs.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
    programs
}

/// `(number of groups, number of programs)` for programs covering at least one group.
pub fn group_count_histogram(set: &RecordSet) -> Vec<(usize, usize)> {
    let mut histogram: BTreeMap<usize, usize> = BTreeMap::new();
    for (_, groups) in programs_with_groups(set) {
        *histogram.entry(groups.len()).or_default() += 1;
    }
    histogram.into_iter().collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupBreakdown {
    pub category: String,
    pub programs: usize,
    pub counts: Vec<(SocialGroup, usize)>,
}

impl GroupBreakdown {
    pub fn percentage(&self, group: SocialGroup, decimals: u32) -> f64 {
        let count = self
            .counts
            .iter()
            .find(|(g, _)| *g == group)
            .map(|(_, count)| *count)
            .unwrap_or(0);
        percentage(count as f64, self.programs as f64, decimals)
    }
}

/// Group coverage counts for every value of `dimension`.
pub fn group_coverage_by(set: &RecordSet, dimension: Dimension) -> Vec<GroupBreakdown> {
    let available = available_groups(set);
    let mut breakdowns: Vec<GroupBreakdown> = group_records(set, &[dimension])
        .into_iter()
        .map(|(mut key, records)| GroupBreakdown {
            category: key.remove(0),
            programs: records.len(),
            counts: available
                .iter()
                .map(|group| (*group, records.iter().filter(|r| r.covers_group(*group)).count()))
                .collect(),
        })
        .collect();
    breakdowns.sort_by(|a, b| compare_categories(dimension, &a.category, &b.category));
    breakdowns
}

#[derive(Debug, Clone, PartialEq)]
pub struct AreaGroupIntensity {
    pub area: String,
    pub mean_groups: f64,
    pub total_groups: usize,
    pub programs: usize,
}

/// Mean number of covered groups per program in each area, highest first.
pub fn group_intensity_by_area(set: &RecordSet) -> Vec<AreaGroupIntensity> {
    let available = available_groups(set);
    let mut intensities: Vec<AreaGroupIntensity> = group_records(set, &[Dimension::Area])
        .into_iter()
        .map(|(mut key, records)| {
            let total_groups: usize = records
                .iter()
                .map(|r| available.iter().filter(|g| r.covers_group(**g)).count())
                .sum();
            AreaGroupIntensity {
                area: key.remove(0),
                mean_groups: round_to(total_groups as f64 / records.len() as f64, 2),
                total_groups,
                programs: records.len(),
            }
        })
        .collect();
    intensities.sort_by(|a, b| {
        b.mean_groups
            .partial_cmp(&a.mean_groups)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.area.cmp(&b.area))
    });
    intensities
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolicyShare {
    pub label: &'static str,
    pub yes: usize,
    pub no: usize,
}

impl PolicyShare {
    pub fn total(&self) -> usize {
        self.yes + self.no
    }

    pub fn yes_percentage(&self, decimals: u32) -> f64 {
        percentage(self.yes as f64, self.total() as f64, decimals)
    }
}

/// Aggregated vs per-group AA answers; anything but "Yes" counts as "No".
pub fn aa_policy_shape(set: &RecordSet) -> Vec<PolicyShare> {
    let mut shares = Vec::new();
    let shapes: [(&'static str, LogicalColumn, fn(&ProgramRecord) -> bool); 2] = [
        ("Aggregated AA", LogicalColumn::AaAggregated, ProgramRecord::has_aggregated_aa),
        ("Per-group AA", LogicalColumn::AaPerGroup, ProgramRecord::has_grouped_aa),
    ];
    for (label, column, flag) in shapes {
        if !set.has_column(column) {
            continue;
        }
        let yes = set.iter().filter(|r| flag(r)).count();
        shares.push(PolicyShare {
            label,
            yes,
            no: set.len() - yes,
        });
    }
    shares
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataQuality {
    pub total: usize,
    pub valid_institution_type: usize,
    pub valid_aa_answer: usize,
    pub both_valid: usize,
}

impl DataQuality {
    pub fn institution_type_coverage(&self) -> f64 {
        percentage(self.valid_institution_type as f64, self.total as f64, 1)
    }

    pub fn aa_answer_coverage(&self) -> f64 {
        percentage(self.valid_aa_answer as f64, self.total as f64, 1)
    }

    pub fn both_coverage(&self) -> f64 {
        percentage(self.both_valid as f64, self.total as f64, 1)
    }
}

pub fn data_quality(set: &RecordSet) -> DataQuality {
    DataQuality {
        total: set.len(),
        valid_institution_type: set.iter().filter(|r| r.institution_type.is_valid()).count(),
        valid_aa_answer: set.iter().filter(|r| r.aa_editais.is_answered()).count(),
        both_valid: set
            .iter()
            .filter(|r| r.institution_type.is_valid() && r.aa_editais.is_answered())
            .count(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AreaCoverage {
    pub area: String,
    pub programs: usize,
    pub missing_institution_type: usize,
    pub missing_aa_answer: usize,
}

impl AreaCoverage {
    pub fn institution_type_percentage(&self) -> f64 {
        percentage((self.programs - self.missing_institution_type) as f64, self.programs as f64, 1)
    }

    pub fn aa_answer_percentage(&self) -> f64 {
        percentage((self.programs - self.missing_aa_answer) as f64, self.programs as f64, 1)
    }
}

/// Missing institution types and AA answers per area, in area order.
pub fn coverage_by_area(set: &RecordSet) -> Vec<AreaCoverage> {
    group_records(set, &[Dimension::Area])
        .into_iter()
        .map(|(mut key, records)| AreaCoverage {
            area: key.remove(0),
            programs: records.len(),
            missing_institution_type: records
                .iter()
                .filter(|r| !r.institution_type.is_valid())
                .count(),
            missing_aa_answer: records.iter().filter(|r| !r.aa_editais.is_answered()).count(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YesNo;

    fn program(area: &str, region: &str, aa: YesNo, slots: f64, aa_slots: f64) -> ProgramRecord {
        ProgramRecord {
            area: area.into(),
            program_name: format!("{area}-{region}-{slots}"),
            region: region.into(),
            aa_editais: aa,
            total_slots: slots,
            aa_total_slots: aa_slots,
            ..Default::default()
        }
    }

    fn scenario() -> RecordSet {
        RecordSet::with_all_columns(vec![
            program("AreaX", "South", YesNo::Yes, 10.0, 4.0),
            program("AreaX", "South", YesNo::No, 5.0, 0.0),
            program("AreaX", "North", YesNo::Yes, 8.0, 8.0),
        ])
    }

    #[test]
    fn percentage_with_zero_denominator_is_zero() {
        assert_eq!(percentage(5.0, 0.0, 1), 0.0);
        assert_eq!(percentage(0.0, 0.0, 2), 0.0);
        assert_eq!(percentage(1.0, f64::NAN, 2), 0.0);
        assert!(percentage(3.0, 0.0, 1).is_finite());
    }

    #[test]
    fn percentage_rounds() {
        assert_eq!(percentage(2.0, 3.0, 1), 66.7);
        assert_eq!(percentage(2.0, 3.0, 2), 66.67);
        assert_eq!(percentage(1.0, 8.0, 1), 12.5);
    }

    #[test]
    fn grades_sort_canonically() {
        let mut grades = vec!["5", "A", "3", "9", "7"];
        sort_grades(&mut grades);
        assert_eq!(grades, vec!["A", "3", "5", "7", "9"]);

        let mut mixed = vec!["B", "7", "10", "A"];
        sort_grades(&mut mixed);
        assert_eq!(mixed, vec!["A", "7", "10", "B"]);
    }

    #[test]
    fn count_with_aa_by_region() {
        let result = aggregate(
            &scenario(),
            &[Dimension::Region],
            Metric::CountWithAa,
            SortOrder::Natural,
        );
        assert_eq!(result.value(&["South"]), Some(1.0));
        assert_eq!(result.value(&["North"]), Some(1.0));
        assert_eq!(result.rows[0].categories, vec!["North"]);
    }

    #[test]
    fn sum_of_aa_slots_by_region() {
        let result = aggregate(
            &scenario(),
            &[Dimension::Region],
            Metric::Sum(SlotField::AaTotal),
            SortOrder::MetricDescending,
        );
        assert_eq!(result.value(&["South"]), Some(4.0));
        assert_eq!(result.value(&["North"]), Some(8.0));
        assert_eq!(result.rows[0].categories, vec!["North"]);
        assert_eq!(result.total(), 12.0);
    }

    #[test]
    fn mean_by_region() {
        let result = aggregate(
            &scenario(),
            &[Dimension::Region],
            Metric::Mean(SlotField::Total),
            SortOrder::Natural,
        );
        assert_eq!(result.value(&["South"]), Some(7.5));
        assert_eq!(result.value(&["North"]), Some(8.0));
    }

    #[test]
    fn overall_aa_percentage() {
        let stats = summary_stats(&scenario());
        assert_eq!(stats.total_programs, 3);
        assert_eq!(stats.with_aa, 2);
        assert_eq!(stats.without_aa, 1);
        assert!((stats.aa_percentage - 66.7).abs() < 1e-9);
        assert_eq!(stats.total_slots, 23.0);
        assert_eq!(stats.total_aa_slots, 12.0);
        assert_eq!(stats.distinct_regions, 2);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let set = scenario();
        let before = set.clone();
        let dimensions = [Dimension::Region, Dimension::AaStatus];
        let first = aggregate(&set, &dimensions, Metric::Count, SortOrder::MetricDescending);
        let second = aggregate(&set, &dimensions, Metric::Count, SortOrder::MetricDescending);
        assert_eq!(first, second);
        assert_eq!(set, before);
    }

    #[test]
    fn grade_rows_follow_canonical_order_even_by_metric() {
        let set = RecordSet::with_all_columns(
            ["7", "A", "3", "9", "3", "3"]
                .iter()
                .map(|g| ProgramRecord { grade: g.to_string(), ..Default::default() })
                .collect(),
        );
        let result =
            aggregate(&set, &[Dimension::Grade], Metric::Count, SortOrder::MetricDescending);
        let grades: Vec<&str> = result.rows.iter().map(|r| r.categories[0].as_str()).collect();
        assert_eq!(grades, vec!["A", "3", "7", "9"]);
        assert_eq!(result.value(&["3"]), Some(3.0));
    }

    #[test]
    fn empty_set_aggregates_to_empty_result() {
        let empty = RecordSet::default();
        assert!(
            aggregate(&empty, &[Dimension::Region], Metric::Count, SortOrder::Natural).is_empty()
        );
        let stats = summary_stats(&empty);
        assert_eq!(stats.total_programs, 0);
        assert_eq!(stats.aa_percentage, 0.0);
        let table = crosstab(&empty, Dimension::Region, Dimension::Grade, Metric::Count);
        assert!(table.cells().is_empty());
        assert!(group_overview(&empty)
            .iter()
            .all(|g| g.programs == 0 && g.program_percentage == 0.0));
    }

    #[test]
    fn blank_categories_are_not_grouped() {
        let set = RecordSet::with_all_columns(vec![
            program("AreaX", "", YesNo::Yes, 1.0, 0.0),
            program("AreaX", "South", YesNo::Yes, 1.0, 0.0),
        ]);
        let result = aggregate(&set, &[Dimension::Region], Metric::Count, SortOrder::Natural);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn crosstab_leaves_absent_pairs_out_and_fills_for_display() {
        let table = crosstab(&scenario(), Dimension::Region, Dimension::AaStatus, Metric::Count);
        assert_eq!(table.rows, vec!["North", "South"]);
        assert_eq!(table.columns, vec!["Has AA editais", "No AA editais"]);
        assert_eq!(table.get("North", "No AA editais"), None);
        assert_eq!(table.value("North", "No AA editais"), 0.0);
        assert_eq!(table.cells().len(), 3);
        assert_eq!(table.row_total("South"), 2.0);
        assert_eq!(table.column_total("Has AA editais"), 2.0);
        assert_eq!(table.grand_total(), 3.0);
    }

    #[test]
    fn crosstab_reindex_and_percentages() {
        let mut records = scenario().records;
        for (record, grade) in records.iter_mut().zip(["5", "3", "5"]) {
            record.grade = grade.to_string();
        }
        let set = RecordSet::with_all_columns(records);
        let all = crosstab(&set, Dimension::Region, Dimension::Grade, Metric::Count)
            .reindex_columns(&GRADE_ORDER);
        assert_eq!(all.columns.len(), 6);
        assert_eq!(all.get("North", "A"), Some(0.0));

        let with_aa = crosstab(&set, Dimension::Region, Dimension::Grade, Metric::CountWithAa);
        let pct = with_aa.percentage_of(&all, 1);
        assert_eq!(pct.value("South", "5"), 100.0);
        assert_eq!(pct.value("South", "3"), 0.0);
        assert_eq!(pct.value("North", "A"), 0.0);
    }

    #[test]
    fn institution_type_crosstab_uses_fixed_order() {
        let set = RecordSet::with_all_columns(vec![
            ProgramRecord { institution_type: InstitutionType::Unknown, ..Default::default() },
            ProgramRecord {
                institution_type: InstitutionType::Private,
                aa_editais: YesNo::No,
                ..Default::default()
            },
            ProgramRecord {
                institution_type: InstitutionType::Public,
                aa_editais: YesNo::Yes,
                ..Default::default()
            },
        ]);
        let table = crosstab(&set, Dimension::InstitutionType, Dimension::AaAnswer, Metric::Count);
        assert_eq!(table.rows, vec!["Public", "Private", "Unknown/Invalid"]);
        assert_eq!(table.columns, vec!["Has AA editais", "No AA editais", "Unknown/Invalid"]);
    }

    #[test]
    fn social_group_views() {
        let mut a = program("Física", "Sul", YesNo::Yes, 10.0, 4.0);
        a.social_groups[SocialGroup::BlackBrown.index()] = YesNo::Yes;
        a.social_groups[SocialGroup::Indigenous.index()] = YesNo::Yes;
        a.group_slots[SocialGroup::BlackBrown.index()] = 3.0;
        let mut b = program("Química", "Norte", YesNo::Yes, 6.0, 2.0);
        b.social_groups[SocialGroup::BlackBrown.index()] = YesNo::Yes;
        b.group_slots[SocialGroup::BlackBrown.index()] = 2.0;
        let c = program("Química", "Norte", YesNo::No, 6.0, 0.0);
        let set = RecordSet::with_all_columns(vec![a, b, c]);

        let overview = group_overview(&set);
        assert_eq!(overview[0].group, SocialGroup::BlackBrown);
        assert_eq!(overview[0].programs, 2);
        assert_eq!(overview[0].slots, 5.0);
        assert_eq!(overview[0].program_percentage, 66.67);
        assert_eq!(overview[1].group, SocialGroup::Indigenous);

        assert_eq!(programs_with_groups(&set).len(), 2);
        assert_eq!(group_count_histogram(&set), vec![(1, 1), (2, 1)]);

        let by_region = group_coverage_by(&set, Dimension::Region);
        assert_eq!(by_region[0].category, "Norte");
        assert_eq!(by_region[0].percentage(SocialGroup::BlackBrown, 2), 50.0);

        let intensity = group_intensity_by_area(&set);
        assert_eq!(intensity[0].area, "Física");
        assert_eq!(intensity[0].mean_groups, 2.0);
        assert_eq!(intensity[1].mean_groups, 0.5);
    }

    #[test]
    fn group_views_skip_groups_without_a_column() {
        let mut columns: std::collections::HashSet<_> = LogicalColumn::all().into_iter().collect();
        columns.remove(&LogicalColumn::GroupFlag(SocialGroup::Romani));
        let set = RecordSet::new(scenario().records, columns);
        assert!(group_overview(&set).iter().all(|g| g.group != SocialGroup::Romani));
        assert_eq!(group_overview(&set).len(), 8);
    }

    #[test]
    fn policy_shape_counts_non_yes_as_no() {
        let mut a = program("X", "Sul", YesNo::Yes, 1.0, 0.0);
        a.aggregated_aa = YesNo::Yes;
        let mut b = program("X", "Sul", YesNo::Yes, 1.0, 0.0);
        b.grouped_aa = YesNo::Yes;
        let c = program("X", "Sul", YesNo::Yes, 1.0, 0.0);
        let shape = aa_policy_shape(&RecordSet::with_all_columns(vec![a, b, c]));
        assert_eq!(shape[0].yes, 1);
        assert_eq!(shape[0].no, 2);
        assert_eq!(shape[1].yes_percentage(1), 33.3);
    }

    #[test]
    fn data_quality_counts_invalid_values() {
        let set = RecordSet::with_all_columns(vec![
            ProgramRecord {
                area: "A".into(),
                institution_type: InstitutionType::Public,
                aa_editais: YesNo::No,
                ..Default::default()
            },
            ProgramRecord {
                area: "A".into(),
                institution_type: InstitutionType::Unknown,
                aa_editais: YesNo::Yes,
                ..Default::default()
            },
            ProgramRecord { area: "B".into(), ..Default::default() },
        ]);
        let quality = data_quality(&set);
        assert_eq!(quality.valid_institution_type, 1);
        assert_eq!(quality.valid_aa_answer, 2);
        assert_eq!(quality.both_valid, 1);
        assert_eq!(quality.both_coverage(), 33.3);

        let by_area = coverage_by_area(&set);
        assert_eq!(by_area[0].area, "A");
        assert_eq!(by_area[0].institution_type_percentage(), 50.0);
        assert_eq!(by_area[1].aa_answer_percentage(), 0.0);
    }

    #[test]
    fn top_programs_skip_zero_values() {
        let set = scenario();
        let top = top_programs(&set, SlotField::AaTotal, 20);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].aa_total_slots, 8.0);
    }

    #[test]
    fn institutions_take_first_state_and_region() {
        let set = RecordSet::with_all_columns(vec![
            ProgramRecord {
                institution_acronym: "UFRGS".into(),
                state: "RS".into(),
                region: "Sul".into(),
                aa_editais: YesNo::Yes,
                ..Default::default()
            },
            ProgramRecord {
                institution_acronym: "UFRGS".into(),
                state: "RS".into(),
                region: "Sul".into(),
                ..Default::default()
            },
            ProgramRecord {
                institution_acronym: "UFPA".into(),
                state: "PA".into(),
                region: "Norte".into(),
                ..Default::default()
            },
        ]);
        let institutions = summarize_institutions(&set);
        assert_eq!(institutions[0].acronym, "UFRGS");
        assert_eq!(institutions[0].programs, 2);
        assert_eq!(institutions[0].with_aa, 1);
        assert_eq!(institutions[1].region, "Norte");
    }
}
