//! Raw header spellings, display labels and static reference tables.
//!
//! Header constants are the spellings found in the curated spreadsheets.
//! They are matched through [`crate::columns`], so case, spacing and accents
//! in the source do not matter.

/// Canonical order of CAPES grades. Anything else sorts after these.
pub const GRADE_ORDER: [&str; 6] = ["A", "3", "4", "5", "6", "7"];

/// Label of the combined working set.
pub const ALL_AREAS: &str = "Todas as Áreas";

/// Output folder of the combined working set.
pub const ALL_AREAS_DIR: &str = "Todas_as_Areas";

// Raw headers
pub mod raw {
    pub const PROGRAM_NAME: &[&str] = &["Nome do Programa"];
    pub const INSTITUTION_ACRONYM: &[&str] = &["Sigla da IES"];
    pub const STATE: &[&str] = &["UF"];
    pub const REGION: &[&str] = &["Região"];
    pub const GRADE: &[&str] = &["Nota", "Notas"];
    pub const INSTITUTION_TYPE: &[&str] = &["Tipo de IES"];
    pub const MODALITY: &[&str] = &["Modalidade de Ensino"];
    pub const AA_EDITAIS: &[&str] = &["Editais AA"];
    pub const AA_AGGREGATED: &[&str] = &["AA Agregada"];
    pub const AA_PER_GROUP: &[&str] = &["AA Por Grupo"];

    pub const TOTAL_SLOTS: &[&str] = &["Qnt Vagas Totais", "Qnt. Vagas Totais"];
    pub const AA_TOTAL_SLOTS: &[&str] = &["Vagas Totais AA"];
    pub const AA_AGGREGATED_SLOTS: &[&str] = &["Vagas Totais Agregadas"];
    pub const AA_PER_GROUP_SLOTS: &[&str] = &[
        "Vagas Totais Por Grupo/Exclusivas",
        "Vagas Totais Por Grupo",
    ];
}

// Institution types
pub mod institution_type {
    pub const RAW_PUBLIC: &str = "PUBLICA";
    pub const RAW_PRIVATE: &str = "PRIVADA";

    pub const PUBLIC: &str = "Public";
    pub const PRIVATE: &str = "Private";
    pub const UNKNOWN: &str = "Unknown/Invalid";
}

// Yes/No answers
pub mod answer {
    pub const RAW_YES: &str = "SIM";
    pub const RAW_NO: &[&str] = &["NAO", "NÃO"];

    pub const YES: &str = "Yes";
    pub const NO: &str = "No";
    pub const UNKNOWN: &str = "Unknown";
}

// AA status
pub mod aa_status {
    pub const WITH_AA: &str = "Has AA editais";
    pub const WITHOUT_AA: &str = "No AA editais";
    pub const UNKNOWN: &str = "Unknown/Invalid";
}

/// `(display name, flag column, slot column)` for every social group, in
/// canonical order.
pub const SOCIAL_GROUPS: [(&str, &str, &str); 9] = [
    ("Black/Brown", "AA Pretos e Pardos", "Vagas Pretos e Pardos"),
    ("Disabled", "AA PCd", "Vagas PCd"),
    ("Indigenous", "AA Indigena", "Vagas Indigena"),
    ("Quilombola", "AA Quilombola", "Vagas Quilombola"),
    ("Refugee", "AA Refugiados e Humanitários", "Vagas Refugiados e Humanitários"),
    ("Trans", "AA Trans", "Vagas Trans"),
    ("Romani", "AA Ciganos", "Vagas Ciganos"),
    ("Riverine", "AA Pop Ribeirinha", "Vagas Pop Ribeirinha"),
    ("Other", "Outros grupos", "Vagas Outros grupos"),
];

/// Brazilian states and their macro-region, used when a sheet leaves the
/// region cell blank.
const STATE_REGIONS: [(&str, &str); 27] = [
    ("AC", "Norte"),
    ("AM", "Norte"),
    ("AP", "Norte"),
    ("PA", "Norte"),
    ("RO", "Norte"),
    ("RR", "Norte"),
    ("TO", "Norte"),
    ("AL", "Nordeste"),
    ("BA", "Nordeste"),
    ("CE", "Nordeste"),
    ("MA", "Nordeste"),
    ("PB", "Nordeste"),
    ("PE", "Nordeste"),
    ("PI", "Nordeste"),
    ("RN", "Nordeste"),
    ("SE", "Nordeste"),
    ("DF", "Centro-Oeste"),
    ("GO", "Centro-Oeste"),
    ("MS", "Centro-Oeste"),
    ("MT", "Centro-Oeste"),
    ("ES", "Sudeste"),
    ("MG", "Sudeste"),
    ("RJ", "Sudeste"),
    ("SP", "Sudeste"),
    ("PR", "Sul"),
    ("RS", "Sul"),
    ("SC", "Sul"),
];

pub fn region_for_state(state: &str) -> Option<&'static str> {
    let state = state.trim();
    STATE_REGIONS
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(state))
        .map(|(_, region)| *region)
}
