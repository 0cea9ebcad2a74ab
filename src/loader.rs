use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::columns::{ColumnMap, LogicalColumn};
use crate::error::{AnalyzerError, Result};
use crate::models::{ProgramRecord, SocialGroup, YesNo};
use crate::normalize::{
    normalize_grade, normalize_institution_type, normalize_slots, normalize_text,
    normalize_yes_no,
};
use crate::schema::region_for_state;

/// Untyped contents of one sheet, exactly as read.
#[derive(Debug, Clone)]
pub struct RawSheet {
    pub area: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Typed records of one area together with the logical columns its sheet provided.
#[derive(Debug, Clone)]
pub struct SheetData {
    pub area: String,
    pub columns: HashSet<LogicalColumn>,
    pub records: Vec<ProgramRecord>,
}

pub struct SheetLoader {
    client: reqwest::Client,
}

impl Default for SheetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetLoader {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn load_file(&self, file_path: &Path) -> Result<RawSheet> {
        let content = fs::read_to_string(file_path)?;
        let area = file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown")
            .to_string();

        self.parse_csv_content(&content, &area)
    }

    pub async fn fetch_url(&self, url: &str) -> Result<RawSheet> {
        log::info!("Fetching sheet from: {url}");

        let response = self
            .client
            .get(url)
            .timeout(std::time::Duration::from_secs(30))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AnalyzerError::FetchStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let content = response.text().await?;
        self.parse_csv_content(&content, &area_from_url(url))
    }

    /// Parse one CSV sheet. A leading BOM is dropped and the delimiter
    /// (`,` or `;`) is taken from whichever occurs more in the header line.
    pub fn parse_csv_content(&self, content: &str, area: &str) -> Result<RawSheet> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(sniff_delimiter(content))
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(RawSheet {
            area: area.to_string(),
            headers,
            rows,
        })
    }
}

fn sniff_delimiter(content: &str) -> u8 {
    let header_line = content.lines().next().unwrap_or_default();
    let semicolons = header_line.matches(';').count();
    let commas = header_line.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

fn area_from_url(url: &str) -> String {
    let last_segment = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url);
    let stem = last_segment
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(last_segment);
    stem.replace("%20", " ").replace('_', " ")
}

/// CSV files of a sheet directory, sorted by name.
pub fn list_sheet_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Convert a raw sheet into typed records, or `None` when a required column is missing.
pub fn build_sheet(sheet: &RawSheet) -> Option<SheetData> {
    let columns = ColumnMap::resolve(&sheet.headers);

    let missing = columns.missing_required();
    if !missing.is_empty() {
        log::warn!(
            "Skipping sheet '{}': required columns not found: {:?}",
            sheet.area,
            missing
        );
        return None;
    }

    let records: Vec<ProgramRecord> = sheet
        .rows
        .iter()
        .map(|row| build_record(&sheet.area, &columns, row))
        .collect();

    log::info!("Loaded {} programs for area: {}", records.len(), sheet.area);

    Some(SheetData {
        area: sheet.area.clone(),
        columns: columns.present(),
        records,
    })
}

fn build_record(area: &str, columns: &ColumnMap, row: &[String]) -> ProgramRecord {
    let cell = |column: LogicalColumn| columns.cell(row, column);

    let state = normalize_text(cell(LogicalColumn::State));
    let mut region = normalize_text(cell(LogicalColumn::Region));
    if region.is_empty() {
        if let Some(derived) = region_for_state(&state) {
            region = derived.to_string();
        }
    }

    let mut social_groups = [YesNo::Unknown; 9];
    let mut group_slots = [0.0; 9];
    for group in SocialGroup::ALL {
        social_groups[group.index()] = normalize_yes_no(cell(LogicalColumn::GroupFlag(group)));
        group_slots[group.index()] = normalize_slots(cell(LogicalColumn::GroupSlots(group)));
    }

    ProgramRecord {
        area: area.to_string(),
        program_name: normalize_text(cell(LogicalColumn::ProgramName)),
        institution_acronym: normalize_text(cell(LogicalColumn::InstitutionAcronym)),
        state,
        region,
        grade: normalize_grade(cell(LogicalColumn::Grade)),
        institution_type: normalize_institution_type(cell(LogicalColumn::InstitutionType)),
        teaching_modality: normalize_text(cell(LogicalColumn::Modality)),
        aa_editais: normalize_yes_no(cell(LogicalColumn::AaEditais)),
        aggregated_aa: normalize_yes_no(cell(LogicalColumn::AaAggregated)),
        grouped_aa: normalize_yes_no(cell(LogicalColumn::AaPerGroup)),
        social_groups,
        total_slots: normalize_slots(cell(LogicalColumn::TotalSlots)),
        aa_total_slots: normalize_slots(cell(LogicalColumn::AaTotalSlots)),
        aa_aggregated_slots: normalize_slots(cell(LogicalColumn::AaAggregatedSlots)),
        aa_per_group_slots: normalize_slots(cell(LogicalColumn::AaPerGroupSlots)),
        group_slots,
        raw_institution_type: normalize_text(cell(LogicalColumn::InstitutionType)),
        raw_aa_editais: normalize_text(cell(LogicalColumn::AaEditais)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InstitutionType;

    const HEADER: &str = "Nome do Programa,Sigla da IES,UF,Região,NOTA,TIPO DE IES,\
        Editais AA,AA Pretos e Pardos,Qnt. Vagas Totais,Vagas Totais AA";

    fn parse(content: &str) -> RawSheet {
        SheetLoader::new()
            .parse_csv_content(content, "Física")
            .unwrap()
    }

    #[test]
    fn builds_typed_records() {
        let content = format!(
            "{HEADER}\n\
             Física,UFRGS,RS,Sul, 5 ,Pública, sim ,SIM,10,4\n\
             Química,PUC,SP,,A,privada,NÃO,,x,\n"
        );
        let sheet = build_sheet(&parse(&content)).unwrap();
        assert_eq!(sheet.area, "Física");
        assert_eq!(sheet.records.len(), 2);

        let first = &sheet.records[0];
        assert_eq!(first.grade, "5");
        assert_eq!(first.institution_type, InstitutionType::Public);
        assert!(first.has_affirmative_action());
        assert!(first.covers_group(SocialGroup::BlackBrown));
        assert_eq!(first.total_slots, 10.0);
        assert_eq!(first.aa_total_slots, 4.0);

        let second = &sheet.records[1];
        assert_eq!(second.region, "Sudeste");
        assert_eq!(second.aa_editais, YesNo::No);
        assert_eq!(second.total_slots, 0.0);
        assert_eq!(second.raw_institution_type, "privada");
        assert!(!second.covers_group(SocialGroup::BlackBrown));
    }

    #[test]
    fn sheet_missing_required_column_is_skipped() {
        let content = "Nome do Programa,UF\nFísica,RS\n";
        assert!(build_sheet(&parse(content)).is_none());
    }

    #[test]
    fn optional_columns_are_recorded_when_present() {
        let content = format!("{HEADER}\nFísica,UFRGS,RS,Sul,5,Pública,SIM,SIM,10,4\n");
        let sheet = build_sheet(&parse(&content)).unwrap();
        assert!(sheet.columns.contains(&LogicalColumn::TotalSlots));
        assert!(sheet.columns.contains(&LogicalColumn::GroupFlag(SocialGroup::BlackBrown)));
        assert!(!sheet.columns.contains(&LogicalColumn::Modality));
        assert!(!sheet.columns.contains(&LogicalColumn::GroupFlag(SocialGroup::Trans)));
    }

    #[test]
    fn semicolon_sheets_with_bom_are_parsed() {
        let content = "\u{feff}Nome do Programa;UF;Região\nFísica;RS;Sul\n;;\n";
        let sheet = parse(content);
        assert_eq!(sheet.headers, vec!["Nome do Programa", "UF", "Região"]);
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0][2], "Sul");
    }

    #[test]
    fn area_name_comes_from_url_file_stem() {
        assert_eq!(
            area_from_url("https://example.com/sheets/Ciencias_Biologicas.csv?raw=1"),
            "Ciencias Biologicas"
        );
        assert_eq!(area_from_url("https://example.com/Fisica"), "Fisica");
    }
}
