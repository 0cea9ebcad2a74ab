//! CSV export, paged text rendering and the output folder layout.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;
use crate::reports::{ReportTable, Section};
use crate::schema::{ALL_AREAS, ALL_AREAS_DIR};

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s/\\]+").unwrap());

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const REPORT_FILE: &str = "relatorio.txt";

/// File-system friendly name: whitespace and slashes become `_`, lowercased.
pub fn slugify(name: &str) -> String {
    SEPARATORS.replace_all(name.trim(), "_").to_lowercase()
}

/// Folder name of an area; the combined set gets a fixed name.
pub fn area_dir_name(area: &str) -> String {
    if area == ALL_AREAS {
        ALL_AREAS_DIR.to_string()
    } else {
        slugify(area)
    }
}

/// Write a UTF-8 CSV with a byte-order mark so spreadsheet tools pick the encoding.
pub fn write_csv<S: AsRef<str>>(path: &Path, headers: &[S], rows: &[Vec<String>]) -> Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(headers.iter().map(|h| h.as_ref()))?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read back a CSV written by [`write_csv`].
pub fn read_csv_table(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let bytes = fs::read(path)?;
    let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(content);

    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok((headers, rows))
}

fn rendered_rows(table: &ReportTable) -> Vec<Vec<String>> {
    table
        .rows
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect()
}

/// Path of a table's CSV under an area folder.
pub fn table_path(area_dir: &Path, table: &ReportTable) -> PathBuf {
    let mut path = area_dir.join(table.section.dir_name());
    for segment in table.name.split('/') {
        path.push(slugify(segment));
    }
    path.set_extension("csv");
    path
}

pub fn write_table(area_dir: &Path, table: &ReportTable) -> Result<PathBuf> {
    let path = table_path(area_dir, table);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    write_csv(&path, table.headers.as_slice(), &rendered_rows(table))?;
    Ok(path)
}

/// Text rendering of a table cut to `max_rows` rows, for paged output.
pub fn render_paged(table: &ReportTable, max_rows: usize) -> String {
    let mut out = format!("{}\n{}\n", table.title, "=".repeat(table.title.chars().count()));
    if table.is_empty() {
        out.push_str("No data available\n");
        return out;
    }

    let rows = rendered_rows(table);
    let shown = &rows[..rows.len().min(max_rows)];

    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in shown {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                format!("{:<width$}", cell, width = widths.get(i).copied().unwrap_or(0))
            })
            .collect();
        format!("{}\n", padded.join(" | ").trim_end())
    };

    out.push_str(&line(&table.headers));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("{}\n", rule.join("-+-")));
    for row in shown {
        out.push_str(&line(row));
    }
    if shown.len() < rows.len() {
        out.push_str(&format!("Showing {} of {} rows\n", shown.len(), rows.len()));
    }
    out
}

/// Whole-area text report, tables grouped by section.
pub fn render_report(area: &str, tables: &[ReportTable], max_rows: usize) -> String {
    let mut out = format!("PPG Affirmative Action Report: {area}\n\n");
    for section in Section::ALL {
        let section_tables: Vec<&ReportTable> =
            tables.iter().filter(|t| t.section == section).collect();
        if section_tables.is_empty() {
            continue;
        }
        out.push_str(&format!("## {}\n\n", section.title()));
        for table in section_tables {
            out.push_str(&render_paged(table, max_rows));
            out.push('\n');
        }
    }
    out
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub written: usize,
    pub failed: usize,
}

/// Write every table of one area plus its text report. A table that fails
/// to write is logged and skipped.
pub fn export_area(
    output_dir: &Path,
    area: &str,
    tables: &[ReportTable],
    max_rows: usize,
) -> Result<ExportSummary> {
    let area_dir = output_dir.join(area_dir_name(area));
    fs::create_dir_all(&area_dir)?;

    let mut summary = ExportSummary::default();
    for table in tables {
        match write_table(&area_dir, table) {
            Ok(path) => {
                log::debug!("Wrote {}", path.display());
                summary.written += 1;
            }
            Err(e) => {
                log::error!("Failed to export table '{}' for {}: {}", table.name, area, e);
                summary.failed += 1;
            }
        }
    }

    fs::write(area_dir.join(REPORT_FILE), render_report(area, tables, max_rows))?;
    Ok(summary)
}

/// Remove the section folders and text report of every area folder.
pub fn clean_output_directory(output_dir: &Path) -> Result<()> {
    if !output_dir.exists() {
        return Ok(());
    }

    log::info!("Cleaning previous results in {}", output_dir.display());
    for entry in fs::read_dir(output_dir)? {
        let area_dir = entry?.path();
        if !area_dir.is_dir() {
            continue;
        }
        for section in Section::ALL {
            let path = area_dir.join(section.dir_name());
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            }
        }
        let report = area_dir.join(REPORT_FILE);
        if report.is_file() {
            fs::remove_file(&report)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::Cell;

    fn table(rows: usize) -> ReportTable {
        let mut table = ReportTable::new(
            Section::Geography,
            "aa_por_uf",
            "AA by State",
            &["State", "Programs"],
        );
        for i in 0..rows {
            table.push(vec![Cell::from(format!("S{i}")), Cell::from(i)]);
        }
        table
    }

    #[test]
    fn slugs_replace_separators_and_lowercase() {
        assert_eq!(slugify("Ciências Biológicas I"), "ciências_biológicas_i");
        assert_eq!(slugify("Black/Brown"), "black_brown");
        assert_eq!(slugify(r"A\B  C"), "a_b_c");
        assert_eq!(area_dir_name(ALL_AREAS), "Todas_as_Areas");
    }

    #[test]
    fn paged_rendering_truncates_with_notice() {
        let text = render_paged(&table(60), 50);
        assert!(text.contains("Showing 50 of 60 rows"));
        assert!(text.contains("S49"));
        assert!(!text.contains("S50"));

        let short = render_paged(&table(3), 50);
        assert!(!short.contains("Showing"));
    }

    #[test]
    fn empty_table_renders_placeholder() {
        assert!(render_paged(&table(0), 50).contains("No data available"));
    }

    #[test]
    fn csv_starts_with_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        write_csv(&path, &["Região", "Vagas"], &[vec!["Sul".into(), "4".into()]]).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let (headers, rows) = read_csv_table(&path).unwrap();
        assert_eq!(headers, vec!["Região", "Vagas"]);
        assert_eq!(rows, vec![vec!["Sul".to_string(), "4".to_string()]]);
    }

    #[test]
    fn tables_land_in_section_folders() {
        let dir = tempfile::tempdir().unwrap();
        let mut nested = table(1);
        nested.section = Section::SocialGroups;
        nested.name = "por_grupo/black_brown_resumo".into();

        let summary = export_area(dir.path(), ALL_AREAS, &[table(2), nested], 50).unwrap();
        assert_eq!(summary, ExportSummary { written: 2, failed: 0 });

        let area = dir.path().join("Todas_as_Areas");
        assert!(area.join("distribuicao_geografica/aa_por_uf.csv").is_file());
        assert!(area.join("grupos_sociais/por_grupo/black_brown_resumo.csv").is_file());
        assert!(area.join("relatorio.txt").is_file());

        clean_output_directory(dir.path()).unwrap();
        assert!(!area.join("distribuicao_geografica").exists());
        assert!(!area.join("relatorio.txt").exists());
    }
}
