use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::{aa_status, answer, institution_type, SOCIAL_GROUPS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Data source configuration
    pub data_source_mode: DataSourceMode,
    pub data_directory: Option<String>,
    pub internet_urls: Option<Vec<String>>,
    pub output_directory: Option<String>,
    /// Areas to export individually; `None` exports every loaded area.
    pub areas_of_interest: Option<Vec<String>>,
    /// Rows kept per table in the paged text report.
    #[serde(default = "default_pdf_max_rows")]
    pub pdf_max_rows: usize,
    #[serde(default)]
    pub filters: FilterConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSourceMode {
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "internet")]
    Internet,
    #[serde(rename = "both")]
    Both,
}

impl DataSourceMode {
    pub fn uses_local(self) -> bool {
        matches!(self, Self::Local | Self::Both)
    }

    pub fn uses_internet(self) -> bool {
        matches!(self, Self::Internet | Self::Both)
    }
}

/// Initial filter selections; an empty list leaves that dimension unconstrained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub grades: Vec<String>,
    #[serde(default)]
    pub institution_types: Vec<String>,
    #[serde(default)]
    pub modalities: Vec<String>,
    pub aa_status: Option<AaStatus>,
}

fn default_pdf_max_rows() -> usize {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_source_mode: DataSourceMode::Local,
            data_directory: Some("data-source".to_string()),
            internet_urls: Some(vec![
                "https://example.com/sheets/Ciencias_Biologicas.csv".to_string(),
            ]),
            output_directory: Some("tabelas_exportadas".to_string()),
            areas_of_interest: None,
            pdf_max_rows: default_pdf_max_rows(),
            filters: FilterConfig::default(),
        }
    }
}

impl Config {
    pub fn load_from_file(file_path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(file_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, file_path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(file_path, content)?;
        Ok(())
    }
}

/// Tri-state answer of a Yes/No-ish spreadsheet field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum YesNo {
    Yes,
    No,
    #[default]
    Unknown,
}

impl YesNo {
    pub fn is_yes(self) -> bool {
        self == Self::Yes
    }

    /// `Yes` or `No`; blank and garbage answers are not valid.
    pub fn is_answered(self) -> bool {
        self != Self::Unknown
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Yes => answer::YES,
            Self::No => answer::NO,
            Self::Unknown => answer::UNKNOWN,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InstitutionType {
    Public,
    Private,
    #[default]
    Unknown,
}

impl InstitutionType {
    pub const ALL: [InstitutionType; 3] = [Self::Public, Self::Private, Self::Unknown];

    pub fn label(self) -> &'static str {
        match self {
            Self::Public => institution_type::PUBLIC,
            Self::Private => institution_type::PRIVATE,
            Self::Unknown => institution_type::UNKNOWN,
        }
    }

    pub fn is_valid(self) -> bool {
        self != Self::Unknown
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label().eq_ignore_ascii_case(label.trim()))
    }
}

/// Two-valued display status; "No" and "Unknown" answers both map to `WithoutAa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AaStatus {
    #[serde(rename = "with")]
    WithAa,
    #[serde(rename = "without")]
    WithoutAa,
}

impl AaStatus {
    pub const ALL: [AaStatus; 2] = [Self::WithAa, Self::WithoutAa];

    pub fn from_flag(has_aa: bool) -> Self {
        if has_aa {
            Self::WithAa
        } else {
            Self::WithoutAa
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::WithAa => aa_status::WITH_AA,
            Self::WithoutAa => aa_status::WITHOUT_AA,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SocialGroup {
    BlackBrown,
    Disabled,
    Indigenous,
    Quilombola,
    Refugee,
    Trans,
    Romani,
    Riverine,
    Other,
}

impl SocialGroup {
    pub const ALL: [SocialGroup; 9] = [
        Self::BlackBrown,
        Self::Disabled,
        Self::Indigenous,
        Self::Quilombola,
        Self::Refugee,
        Self::Trans,
        Self::Romani,
        Self::Riverine,
        Self::Other,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn display_name(self) -> &'static str {
        SOCIAL_GROUPS[self.index()].0
    }

    pub fn flag_column(self) -> &'static str {
        SOCIAL_GROUPS[self.index()].1
    }

    pub fn slot_column(self) -> &'static str {
        SOCIAL_GROUPS[self.index()].2
    }
}

/// Categorical dimension a record set can be filtered or grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Area,
    Region,
    State,
    Grade,
    InstitutionType,
    Modality,
    Institution,
    /// Two-valued status derived from the AA flag.
    AaStatus,
    /// Strict tri-state AA answer.
    AaAnswer,
}

impl Dimension {
    pub fn label(self) -> &'static str {
        match self {
            Self::Area => "Area",
            Self::Region => "Region",
            Self::State => "State",
            Self::Grade => "Grade",
            Self::InstitutionType => "Institution Type",
            Self::Modality => "Teaching Modality",
            Self::Institution => "Institution",
            Self::AaStatus => "AA Status",
            Self::AaAnswer => "AA Editais",
        }
    }

    pub fn value_of(self, record: &ProgramRecord) -> &str {
        match self {
            Self::Area => &record.area,
            Self::Region => &record.region,
            Self::State => &record.state,
            Self::Grade => &record.grade,
            Self::InstitutionType => record.institution_type.label(),
            Self::Modality => &record.teaching_modality,
            Self::Institution => &record.institution_acronym,
            Self::AaStatus => record.aa_status().label(),
            Self::AaAnswer => match record.aa_editais {
                YesNo::Yes => aa_status::WITH_AA,
                YesNo::No => aa_status::WITHOUT_AA,
                YesNo::Unknown => aa_status::UNKNOWN,
            },
        }
    }
}

/// Numeric slot column of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotField {
    Total,
    AaTotal,
    AaAggregated,
    AaPerGroup,
    Group(SocialGroup),
}

impl SlotField {
    pub fn value_of(self, record: &ProgramRecord) -> f64 {
        match self {
            Self::Total => record.total_slots,
            Self::AaTotal => record.aa_total_slots,
            Self::AaAggregated => record.aa_aggregated_slots,
            Self::AaPerGroup => record.aa_per_group_slots,
            Self::Group(group) => record.group_slots[group.index()],
        }
    }
}

/// One graduate program as listed under one knowledge area.
///
/// Built once at ingestion from a raw sheet row; never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramRecord {
    pub area: String,
    pub program_name: String,
    pub institution_acronym: String,
    pub state: String,
    pub region: String,
    pub grade: String,
    pub institution_type: InstitutionType,
    pub teaching_modality: String,
    pub aa_editais: YesNo,
    pub aggregated_aa: YesNo,
    pub grouped_aa: YesNo,
    pub social_groups: [YesNo; 9],
    pub total_slots: f64,
    pub aa_total_slots: f64,
    pub aa_aggregated_slots: f64,
    pub aa_per_group_slots: f64,
    pub group_slots: [f64; 9],
    /// Source text of the institution type and AA cells, kept for data-quality listings.
    pub raw_institution_type: String,
    pub raw_aa_editais: String,
}

impl ProgramRecord {
    pub fn has_affirmative_action(&self) -> bool {
        self.aa_editais.is_yes()
    }

    pub fn aa_status(&self) -> AaStatus {
        AaStatus::from_flag(self.has_affirmative_action())
    }

    pub fn has_aggregated_aa(&self) -> bool {
        self.aggregated_aa.is_yes()
    }

    pub fn has_grouped_aa(&self) -> bool {
        self.grouped_aa.is_yes()
    }

    pub fn covers_group(&self, group: SocialGroup) -> bool {
        self.social_groups[group.index()].is_yes()
    }

    pub fn covered_groups(&self) -> Vec<SocialGroup> {
        SocialGroup::ALL
            .into_iter()
            .filter(|group| self.covers_group(*group))
            .collect()
    }

    pub fn key(&self) -> ProgramKey {
        ProgramKey {
            area: self.area.clone(),
            institution_acronym: self.institution_acronym.clone(),
            program_name: self.program_name.clone(),
        }
    }
}

/// Identifies a program inside one area sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramKey {
    pub area: String,
    pub institution_acronym: String,
    pub program_name: String,
}
