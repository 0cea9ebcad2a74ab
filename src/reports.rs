//! Report tables assembled from aggregator output.

use std::fmt;

use crate::analyzer::{
    aa_policy_shape, aggregate, available_groups, coverage_by_area, crosstab, data_quality,
    first_values, group_count_histogram, group_coverage_by, group_intensity_by_area,
    group_overview, percentage, programs_with_groups, round_to, sort_grades, summarize_by,
    summarize_institutions, summary_stats, top_programs, CategorySummary, Crosstab, Metric,
    SortOrder,
};
use crate::columns::LogicalColumn;
use crate::dataset::RecordSet;
use crate::export::slugify;
use crate::models::{Dimension, InstitutionType, ProgramRecord, SlotField, SocialGroup};
use crate::schema::{aa_status, GRADE_ORDER};

const TOP_PROGRAMS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Count(usize),
    /// Computed figure, shown with at most two decimals.
    Number(f64),
    /// Value taken straight from a record, shown in full.
    Exact(f64),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(text) => f.write_str(text),
            Cell::Count(count) => write!(f, "{count}"),
            Cell::Number(value) => write!(f, "{}", round_to(*value, 2)),
            Cell::Exact(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::Text(text.to_string())
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::Text(text)
    }
}

impl From<&String> for Cell {
    fn from(text: &String) -> Self {
        Cell::Text(text.clone())
    }
}

impl From<usize> for Cell {
    fn from(count: usize) -> Self {
        Cell::Count(count)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

macro_rules! row {
    ($($cell:expr),* $(,)?) => {
        vec![$(Cell::from($cell)),*]
    };
}

/// Output folder a table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Overview,
    Vacancies,
    SocialGroups,
    Geography,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Self::Overview,
        Self::Vacancies,
        Self::SocialGroups,
        Self::Geography,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Overview => "visao_geral",
            Self::Vacancies => "analise_vagas",
            Self::SocialGroups => "grupos_sociais",
            Self::Geography => "distribuicao_geografica",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Vacancies => "Vacancy Analysis",
            Self::SocialGroups => "Social Groups",
            Self::Geography => "Geographic Distribution",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub section: Section,
    /// File name without extension; may contain one `/` for a subfolder.
    pub name: String,
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    pub fn new(
        section: Section,
        name: impl Into<String>,
        title: impl Into<String>,
        headers: &[&str],
    ) -> Self {
        Self {
            section,
            name: name.into(),
            title: title.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Rendered cell at `row` under `header`.
    pub fn text(&self, row: usize, header: &str) -> Option<String> {
        let column = self.column(header)?;
        self.rows.get(row)?.get(column).map(Cell::to_string)
    }
}

/// Every table for one working set. `all_areas` adds the cross-area views.
pub fn area_report(set: &RecordSet, all_areas: bool) -> Vec<ReportTable> {
    let mut tables = overview_tables(set);
    tables.extend(vacancy_tables(set));
    tables.extend(social_group_tables(set, all_areas));
    tables.extend(geographic_tables(set));
    tables
}

fn crosstab_table(
    section: Section,
    name: &str,
    title: &str,
    table: &Crosstab,
    with_totals: bool,
) -> ReportTable {
    let mut headers = vec![table.row_dimension.label()];
    headers.extend(table.columns.iter().map(String::as_str));
    if with_totals {
        headers.push("Total");
    }
    let mut report = ReportTable::new(section, name, title, &headers);

    for row in &table.rows {
        let mut cells = row![row];
        cells.extend(table.columns.iter().map(|c| Cell::from(table.value(row, c))));
        if with_totals {
            cells.push(Cell::from(table.row_total(row)));
        }
        report.push(cells);
    }
    if with_totals {
        let mut cells = row!["Total"];
        cells.extend(table.columns.iter().map(|c| Cell::from(table.column_total(c))));
        cells.push(Cell::from(table.grand_total()));
        report.push(cells);
    }
    report
}

/// Canonical listing of records, one row per program.
pub fn program_listing(
    section: Section,
    name: &str,
    title: &str,
    records: &[&ProgramRecord],
) -> ReportTable {
    let mut table = ReportTable::new(
        section,
        name,
        title,
        &[
            "Area",
            "Program",
            "Institution",
            "State",
            "Region",
            "Grade",
            "Institution Type",
            "AA Editais",
            "Total Slots",
            "AA Slots",
        ],
    );
    for record in records {
        table.push(row![
            &record.area,
            &record.program_name,
            &record.institution_acronym,
            &record.state,
            &record.region,
            &record.grade,
            record.institution_type.label(),
            record.aa_editais.label(),
            Cell::Exact(record.total_slots),
            Cell::Exact(record.aa_total_slots),
        ]);
    }
    table
}

/// Side-by-side listing of the programs in a comparison list.
pub fn comparison_table(records: &RecordSet) -> ReportTable {
    let mut table = ReportTable::new(
        Section::Overview,
        "comparacao_programas",
        "Program Comparison",
        &[
            "Area",
            "Program",
            "Institution",
            "State",
            "Grade",
            "AA Editais",
            "Total Slots",
            "AA Slots",
            "Groups Covered",
        ],
    );
    for record in records {
        let groups: Vec<&str> = record
            .covered_groups()
            .into_iter()
            .map(SocialGroup::display_name)
            .collect();
        table.push(row![
            &record.area,
            &record.program_name,
            &record.institution_acronym,
            &record.state,
            &record.grade,
            record.aa_editais.label(),
            Cell::Exact(record.total_slots),
            Cell::Exact(record.aa_total_slots),
            groups.join("; "),
        ]);
    }
    table
}

pub fn overview_tables(set: &RecordSet) -> Vec<ReportTable> {
    let section = Section::Overview;
    let mut tables = Vec::new();

    let stats = summary_stats(set);
    let mut summary = ReportTable::new(
        section,
        "estatisticas_resumo",
        "Summary Statistics",
        &["Metric", "Value"],
    );
    summary.push(row!["Total programs", stats.total_programs]);
    summary.push(row!["Programs with AA", stats.with_aa]);
    summary.push(row!["Programs without AA", stats.without_aa]);
    summary.push(row!["% with AA", stats.aa_percentage]);
    summary.push(row!["Total slots", stats.total_slots]);
    summary.push(row!["Total AA slots", stats.total_aa_slots]);
    summary.push(row!["Areas", stats.distinct_areas]);
    summary.push(row!["Regions", stats.distinct_regions]);
    summary.push(row!["States", stats.distinct_states]);
    tables.push(summary);

    tables.push(institution_aa_table(set));
    tables.extend(data_quality_tables(set));

    let shape = aa_policy_shape(set);
    if !shape.is_empty() {
        let mut table = ReportTable::new(
            section,
            "formato_aa",
            "AA Policy Shape",
            &["Policy", "Yes", "No", "% Yes"],
        );
        for share in shape {
            table.push(row![share.label, share.yes, share.no, share.yes_percentage(1)]);
        }
        tables.push(table);
    }

    let grades = grade_columns(set);
    let grades: Vec<&str> = grades.iter().map(String::as_str).collect();
    let programs = crosstab(set, Dimension::Region, Dimension::Grade, Metric::Count)
        .reindex_columns(&grades);
    let with_aa = crosstab(set, Dimension::Region, Dimension::Grade, Metric::CountWithAa);
    tables.push(crosstab_table(
        section,
        "nota_vs_regiao",
        "Programs by Region and Grade",
        &programs,
        true,
    ));
    tables.push(crosstab_table(
        section,
        "nota_vs_regiao_pct_aa",
        "% of Programs with AA by Region and Grade",
        &with_aa.percentage_of(&programs, 1),
        false,
    ));

    tables.extend(modality_tables(set));

    tables
}

/// Institution type against teaching modality, with the share of programs
/// holding AA editais per cell.
pub fn modality_tables(set: &RecordSet) -> Vec<ReportTable> {
    if !set.has_column(LogicalColumn::Modality) {
        log::warn!("Teaching modality column not present, skipping modality tables");
        return Vec::new();
    }
    let section = Section::Overview;
    let programs = crosstab(set, Dimension::InstitutionType, Dimension::Modality, Metric::Count);
    let with_aa = crosstab(
        set,
        Dimension::InstitutionType,
        Dimension::Modality,
        Metric::CountWithAa,
    );
    vec![
        crosstab_table(
            section,
            "tipo_ies_vs_modalidade",
            "Programs by Institution Type and Teaching Modality",
            &programs,
            true,
        ),
        crosstab_table(
            section,
            "tipo_ies_vs_modalidade_pct_aa",
            "% of Programs with AA by Institution Type and Teaching Modality",
            &with_aa.percentage_of(&programs, 1),
            false,
        ),
    ]
}

/// Institution type against the tri-state AA answer, both axes in full.
pub fn institution_aa_table(set: &RecordSet) -> ReportTable {
    let answers = [aa_status::WITH_AA, aa_status::WITHOUT_AA, aa_status::UNKNOWN];
    let table = crosstab(set, Dimension::InstitutionType, Dimension::AaAnswer, Metric::Count)
        .reindex_columns(&answers);

    let mut headers = vec!["Institution Type"];
    headers.extend(answers);
    headers.extend(["Total", "% with AA", "% without AA"]);
    let mut report = ReportTable::new(
        Section::Overview,
        "ies_vs_aa",
        "Institution Type vs AA Editais",
        &headers,
    );

    let mut push_row = |label: &str, counts: Vec<f64>| {
        let total: f64 = counts.iter().sum();
        let mut cells = row![label];
        cells.extend(counts.iter().map(|c| Cell::from(*c)));
        cells.push(Cell::from(total));
        cells.push(Cell::from(percentage(counts[0], total, 1)));
        cells.push(Cell::from(percentage(counts[1], total, 1)));
        report.push(cells);
    };
    for kind in InstitutionType::ALL {
        let counts: Vec<f64> = answers.iter().map(|a| table.value(kind.label(), a)).collect();
        push_row(kind.label(), counts);
    }
    push_row("Total", answers.iter().map(|a| table.column_total(a)).collect());
    report
}

pub fn data_quality_tables(set: &RecordSet) -> Vec<ReportTable> {
    let section = Section::Overview;
    let quality = data_quality(set);
    let missing = |valid: usize| quality.total - valid;
    let pct = |count: usize| percentage(count as f64, quality.total as f64, 1);
    let missing_both = set
        .iter()
        .filter(|r| !r.institution_type.is_valid() && !r.aa_editais.is_answered())
        .count();

    let mut summary = ReportTable::new(
        section,
        "qualidade_dados",
        "Data Quality",
        &["Metric", "Programs", "%"],
    );
    summary.push(row!["Total programs", quality.total, 100.0]);
    summary.push(row![
        "Valid institution type",
        quality.valid_institution_type,
        quality.institution_type_coverage()
    ]);
    summary.push(row!["Valid AA answer", quality.valid_aa_answer, quality.aa_answer_coverage()]);
    summary.push(row!["Both valid", quality.both_valid, quality.both_coverage()]);
    let missing_type = missing(quality.valid_institution_type);
    let missing_answer = missing(quality.valid_aa_answer);
    summary.push(row!["Missing institution type", missing_type, pct(missing_type)]);
    summary.push(row!["Missing AA answer", missing_answer, pct(missing_answer)]);
    summary.push(row!["Missing both", missing_both, pct(missing_both)]);

    let mut by_area = ReportTable::new(
        section,
        "qualidade_por_area",
        "Data Coverage by Area",
        &[
            "Area",
            "Programs",
            "Missing Institution Type",
            "Missing AA Answer",
            "% Type Valid",
            "% AA Valid",
        ],
    );
    for coverage in coverage_by_area(set) {
        by_area.push(row![
            &coverage.area,
            coverage.programs,
            coverage.missing_institution_type,
            coverage.missing_aa_answer,
            coverage.institution_type_percentage(),
            coverage.aa_answer_percentage(),
        ]);
    }

    let mut blanks = ReportTable::new(
        section,
        "programas_sem_dados",
        "Programs Lacking Institution Type or AA Answer",
        &["Area", "Program", "Institution", "Institution Type (raw)", "AA Editais (raw)"],
    );
    for record in set
        .iter()
        .filter(|r| !r.institution_type.is_valid() || !r.aa_editais.is_answered())
    {
        blanks.push(row![
            &record.area,
            &record.program_name,
            &record.institution_acronym,
            &record.raw_institution_type,
            &record.raw_aa_editais,
        ]);
    }

    vec![summary, by_area, blanks]
}

fn category_slot_table(
    section: Section,
    name: &str,
    title: &str,
    dimension: Dimension,
    summaries: &[CategorySummary],
) -> ReportTable {
    let mut table = ReportTable::new(
        section,
        name,
        title,
        &[
            dimension.label(),
            "Programs",
            "Programs with AA",
            "% Programs with AA",
            "Total Slots",
            "AA Slots",
            "Open Competition Slots",
            "% AA Slots",
        ],
    );
    for summary in summaries {
        table.push(row![
            &summary.category,
            summary.programs,
            summary.with_aa,
            summary.aa_program_percentage(1),
            summary.total_slots,
            summary.aa_slots,
            summary.open_slots(),
            summary.aa_slot_percentage(1),
        ]);
    }
    table
}

fn mean_slots_table(set: &RecordSet, dimension: Dimension, name: &str, title: &str) -> ReportTable {
    let mut table = ReportTable::new(
        Section::Vacancies,
        name,
        title,
        &[dimension.label(), "Programs", "Mean Total Slots", "Mean AA Slots"],
    );
    let totals = aggregate(set, &[dimension], Metric::Mean(SlotField::Total), SortOrder::Natural);
    let aa = aggregate(set, &[dimension], Metric::Mean(SlotField::AaTotal), SortOrder::Natural);
    for (total, aa) in totals.rows.iter().zip(&aa.rows) {
        table.push(row![
            &total.categories[0],
            total.programs,
            round_to(total.value, 2),
            round_to(aa.value, 2)
        ]);
    }
    table
}

pub fn vacancy_tables(set: &RecordSet) -> Vec<ReportTable> {
    let section = Section::Vacancies;
    if !set.has_column(LogicalColumn::TotalSlots) {
        log::warn!("Slot columns not present, skipping vacancy tables");
        return Vec::new();
    }
    let mut tables = Vec::new();

    let total: f64 = set.iter().map(|r| r.total_slots).sum();
    let mut summary = ReportTable::new(
        section,
        "resumo_vagas",
        "Slot Summary",
        &["Metric", "Slots", "% of Total"],
    );
    summary.push(row!["Total slots", total, percentage(total, total, 1)]);
    let breakdowns = [
        ("AA slots", LogicalColumn::AaTotalSlots, SlotField::AaTotal),
        ("Aggregated AA slots", LogicalColumn::AaAggregatedSlots, SlotField::AaAggregated),
        ("Per-group AA slots", LogicalColumn::AaPerGroupSlots, SlotField::AaPerGroup),
    ];
    for (label, column, field) in breakdowns {
        if set.has_column(column) {
            let slots: f64 = set.iter().map(|r| field.value_of(r)).sum();
            summary.push(row![label, slots, percentage(slots, total, 1)]);
        }
    }
    tables.push(summary);

    if set.has_column(LogicalColumn::AaTotalSlots) {
        let aa: f64 = set.iter().map(|r| r.aa_total_slots).sum();
        let mut split = ReportTable::new(
            section,
            "aa_vs_ampla_concorrencia",
            "AA vs Open Competition Slots",
            &["Category", "Slots", "%"],
        );
        split.push(row!["AA", aa, percentage(aa, total, 1)]);
        split.push(row!["Open competition", total - aa, percentage(total - aa, total, 1)]);
        tables.push(split);

        let top = top_programs(set, SlotField::AaTotal, TOP_PROGRAMS);
        let mut ranking = ReportTable::new(
            section,
            "top20_programas_vagas_aa",
            "Top Programs by AA Slots",
            &["Area", "Program", "Institution", "State", "AA Slots", "Total Slots", "% AA Slots"],
        );
        for record in top {
            ranking.push(row![
                &record.area,
                &record.program_name,
                &record.institution_acronym,
                &record.state,
                Cell::Exact(record.aa_total_slots),
                Cell::Exact(record.total_slots),
                percentage(record.aa_total_slots, record.total_slots, 1),
            ]);
        }
        tables.push(ranking);
    } else {
        log::warn!("AA slot column not present, skipping AA slot breakdowns");
    }

    tables.push(category_slot_table(
        section,
        "vagas_por_regiao",
        "Slots by Region",
        Dimension::Region,
        &summarize_by(set, Dimension::Region),
    ));
    tables.push(category_slot_table(
        section,
        "vagas_por_nota",
        "Slots by Grade",
        Dimension::Grade,
        &summarize_by(set, Dimension::Grade),
    ));
    tables.push(mean_slots_table(
        set,
        Dimension::AaStatus,
        "media_vagas_por_status_aa",
        "Mean Slots by AA Status",
    ));
    tables.push(mean_slots_table(
        set,
        Dimension::Region,
        "media_vagas_por_regiao",
        "Mean Slots by Region",
    ));
    tables.push(mean_slots_table(
        set,
        Dimension::InstitutionType,
        "media_vagas_por_tipo_ies",
        "Mean Slots by Institution Type",
    ));

    let regions = first_values(set, Dimension::State, Dimension::Region);
    let mut by_state = ReportTable::new(
        section,
        "vagas_por_uf",
        "Slots by State",
        &["State", "Region", "Programs", "Total Slots", "AA Slots", "% AA Slots"],
    );
    let mut states = summarize_by(set, Dimension::State);
    states.sort_by(|a, b| {
        b.total_slots
            .total_cmp(&a.total_slots)
            .then_with(|| a.category.cmp(&b.category))
    });
    for state in &states {
        by_state.push(row![
            &state.category,
            regions.get(&state.category).cloned().unwrap_or_default(),
            state.programs,
            state.total_slots,
            state.aa_slots,
            state.aa_slot_percentage(1),
        ]);
    }
    tables.push(by_state);

    tables
}

pub fn social_group_tables(set: &RecordSet, all_areas: bool) -> Vec<ReportTable> {
    let section = Section::SocialGroups;
    let groups = available_groups(set);
    if groups.is_empty() {
        log::warn!("No social group columns present, skipping social group tables");
        return Vec::new();
    }
    let mut tables = Vec::new();

    let mut overview = ReportTable::new(
        section,
        "resumo_grupos",
        "Social Group Overview",
        &["Group", "Programs", "% of Programs", "Slots"],
    );
    for coverage in group_overview(set) {
        overview.push(row![
            coverage.group.display_name(),
            coverage.programs,
            coverage.program_percentage,
            coverage.slots,
        ]);
    }
    tables.push(overview);

    let mut multiple = ReportTable::new(
        section,
        "programas_multiplos_grupos",
        "Programs Covering Several Groups",
        &["Area", "Program", "Institution", "Groups", "Group List"],
    );
    for (record, covered) in programs_with_groups(set).into_iter().filter(|(_, g)| g.len() > 1) {
        let names: Vec<&str> = covered.iter().map(|g| g.display_name()).collect();
        multiple.push(row![
            &record.area,
            &record.program_name,
            &record.institution_acronym,
            covered.len(),
            names.join("; "),
        ]);
    }
    tables.push(multiple);

    let mut histogram = ReportTable::new(
        section,
        "distribuicao_numero_grupos",
        "Programs by Number of Groups",
        &["Groups", "Programs"],
    );
    for (count, programs) in group_count_histogram(set) {
        histogram.push(row![count, programs]);
    }
    tables.push(histogram);

    let by_region = group_coverage_by(set, Dimension::Region);
    let mut headers = vec!["Region", "Programs"];
    headers.extend(groups.iter().map(|g| g.display_name()));
    let mut counts = ReportTable::new(
        section,
        "grupos_por_regiao",
        "Programs per Group by Region",
        &headers,
    );
    let mut shares = ReportTable::new(
        section,
        "grupos_por_regiao_pct",
        "% of Programs per Group by Region",
        &headers,
    );
    for breakdown in &by_region {
        let mut count_row = row![&breakdown.category, breakdown.programs];
        count_row.extend(breakdown.counts.iter().map(|(_, c)| Cell::from(*c)));
        counts.push(count_row);
        let mut share_row = row![&breakdown.category, breakdown.programs];
        share_row.extend(groups.iter().map(|g| Cell::from(breakdown.percentage(*g, 1))));
        shares.push(share_row);
    }
    tables.push(counts);
    tables.push(shares);

    if all_areas {
        let mut intensity = ReportTable::new(
            section,
            "media_grupos_por_area",
            "Mean Number of Groups per Program by Area",
            &["Area", "Programs", "Groups Covered", "Mean Groups"],
        );
        for area in group_intensity_by_area(set) {
            intensity.push(row![&area.area, area.programs, area.total_groups, area.mean_groups]);
        }
        tables.push(intensity);
    }

    for group in groups {
        tables.extend(group_detail_tables(set, group));
    }
    tables
}

fn group_detail_tables(set: &RecordSet, group: SocialGroup) -> Vec<ReportTable> {
    let section = Section::SocialGroups;
    let covered = set.subset(|r| r.covers_group(group));
    if covered.is_empty() {
        return Vec::new();
    }
    let slug = slugify(group.display_name());
    let name = |suffix: &str| format!("por_grupo/{slug}_{suffix}");
    let title = |what: &str| format!("{}: {what}", group.display_name());

    let slots: f64 = covered.iter().map(|r| r.group_slots[group.index()]).sum();
    let mut summary =
        ReportTable::new(section, name("resumo"), title("Summary"), &["Metric", "Value"]);
    summary.push(row!["Programs", covered.len()]);
    summary.push(row!["% of programs", percentage(covered.len() as f64, set.len() as f64, 1)]);
    summary.push(row!["Dedicated slots", slots]);
    summary.push(row!["Institutions", covered.distinct(|r| r.institution_acronym.as_str()).len()]);

    let mut tables = vec![summary];
    for (dimension, suffix, what) in [
        (Dimension::Region, "regioes", "Programs by Region"),
        (Dimension::Grade, "notas", "Programs by Grade"),
        (Dimension::State, "ufs", "Programs by State"),
    ] {
        let counts = aggregate(&covered, &[dimension], Metric::Count, SortOrder::MetricDescending);
        let mut table = ReportTable::new(
            section,
            name(suffix),
            title(what),
            &[dimension.label(), "Programs", "%"],
        );
        for row in &counts.rows {
            table.push(row![
                &row.categories[0],
                row.programs,
                percentage(row.value, covered.len() as f64, 1),
            ]);
        }
        tables.push(table);
    }

    let records: Vec<&ProgramRecord> = covered.iter().collect();
    tables.push(program_listing(section, &name("programas"), &title("Programs"), &records));
    tables
}

pub fn geographic_tables(set: &RecordSet) -> Vec<ReportTable> {
    let section = Section::Geography;
    let mut tables = Vec::new();
    let regions = first_values(set, Dimension::State, Dimension::Region);

    let mut states = summarize_by(set, Dimension::State);
    states.sort_by(|a, b| b.programs.cmp(&a.programs).then_with(|| a.category.cmp(&b.category)));
    let mut by_state = ReportTable::new(
        section,
        "aa_por_uf",
        "AA Programs by State",
        &["State", "Region", "Programs", "Programs with AA", "% with AA"],
    );
    for state in &states {
        by_state.push(row![
            &state.category,
            regions.get(&state.category).cloned().unwrap_or_default(),
            state.programs,
            state.with_aa,
            state.aa_program_percentage(1),
        ]);
    }
    tables.push(by_state);

    let region_aa = crosstab(set, Dimension::Region, Dimension::AaStatus, Metric::Count)
        .reindex_columns(&[aa_status::WITH_AA, aa_status::WITHOUT_AA]);
    tables.push(crosstab_table(section, "regiao_vs_aa", "Region vs AA Status", &region_aa, true));

    let mut share = ReportTable::new(
        section,
        "participacao_regioes",
        "Share of Programs by Region",
        &["Region", "Programs", "% of Programs"],
    );
    let region_counts =
        aggregate(set, &[Dimension::Region], Metric::Count, SortOrder::MetricDescending);
    for row in &region_counts.rows {
        share.push(row![
            &row.categories[0],
            row.programs,
            percentage(row.value, set.len() as f64, 1)
        ]);
    }
    tables.push(share);

    let hierarchy = aggregate(
        set,
        &[Dimension::Region, Dimension::State, Dimension::Institution],
        Metric::CountWithAa,
        SortOrder::Natural,
    );
    let mut tree = ReportTable::new(
        section,
        "hierarquia_regiao_uf_ies",
        "Region / State / Institution",
        &["Region", "State", "Institution", "Programs", "Programs with AA"],
    );
    for row in &hierarchy.rows {
        tree.push(row![
            &row.categories[0],
            &row.categories[1],
            &row.categories[2],
            row.programs,
            row.value
        ]);
    }
    tables.push(tree);

    let mut institutions = ReportTable::new(
        section,
        "resumo_ies",
        "Institution Summary",
        &["Institution", "State", "Region", "Programs", "Programs with AA", "% with AA"],
    );
    for institution in summarize_institutions(set) {
        institutions.push(row![
            &institution.acronym,
            &institution.state,
            &institution.region,
            institution.programs,
            institution.with_aa,
            percentage(institution.with_aa as f64, institution.programs as f64, 1),
        ]);
    }
    tables.push(institutions);

    let mut records: Vec<&ProgramRecord> = set.iter().collect();
    records.sort_by(|a, b| {
        (&a.region, &a.state, &a.program_name).cmp(&(&b.region, &b.state, &b.program_name))
    });
    tables.push(program_listing(section, "programas_detalhados", "Program Listing", &records));

    tables
}

/// Canonical grades followed by any other grade present in the set.
pub fn grade_columns(set: &RecordSet) -> Vec<String> {
    let mut grades: Vec<String> = GRADE_ORDER.iter().map(|g| g.to_string()).collect();
    let mut extra: Vec<String> = set
        .distinct(|r| r.grade.as_str())
        .into_iter()
        .filter(|g| !GRADE_ORDER.contains(&g.as_str()))
        .collect();
    sort_grades(&mut extra);
    grades.extend(extra);
    grades
}
