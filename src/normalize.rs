//! Raw cell text → canonical values.
//!
//! Every function here is total: unexpected input collapses into the
//! `Unknown` bucket (or 0 for numbers) instead of failing.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::{InstitutionType, YesNo};
use crate::schema::{answer, institution_type};

/// Strip diacritics: decompose, then drop combining marks. Precomposed
/// and decomposed spellings fold to the same text.
pub fn fold_accents(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Trimmed, uppercased, accent-free form of a cell, used for category matching.
pub fn category_key(raw: &str) -> String {
    fold_accents(raw.trim()).to_uppercase()
}

pub fn normalize_yes_no(raw: Option<&str>) -> YesNo {
    let key = category_key(raw.unwrap_or_default());
    if key == answer::RAW_YES {
        YesNo::Yes
    } else if answer::RAW_NO.iter().any(|no| category_key(no) == key) {
        YesNo::No
    } else {
        YesNo::Unknown
    }
}

pub fn normalize_institution_type(raw: Option<&str>) -> InstitutionType {
    match category_key(raw.unwrap_or_default()).as_str() {
        institution_type::RAW_PUBLIC => InstitutionType::Public,
        institution_type::RAW_PRIVATE => InstitutionType::Private,
        _ => InstitutionType::Unknown,
    }
}

/// Grades are only trimmed; `"a"` and `"A"` stay distinct.
pub fn normalize_grade(raw: Option<&str>) -> String {
    normalize_text(raw)
}

pub fn normalize_text(raw: Option<&str>) -> String {
    raw.map(str::trim).unwrap_or_default().to_string()
}

/// Parse a slot count. Decimal commas are accepted; anything unparsable,
/// negative or non-finite becomes 0.
pub fn normalize_slots(raw: Option<&str>) -> f64 {
    raw.map(|text| text.trim().replace(',', "."))
        .and_then(|text| text.parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value >= 0.0)
        .unwrap_or(0.0)
}
