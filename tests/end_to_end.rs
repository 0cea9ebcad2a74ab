use std::fs;

use ppg_aa_analyzer::analyzer::{aggregate, percentage, summary_stats, Metric, SortOrder};
use ppg_aa_analyzer::dataset::RecordSet;
use ppg_aa_analyzer::export::{export_area, read_csv_table, write_table};
use ppg_aa_analyzer::filters::{apply_filters, FilterContext, Predicate};
use ppg_aa_analyzer::models::{AaStatus, Dimension, ProgramRecord, SlotField};
use ppg_aa_analyzer::reports::{area_report, program_listing, Section};
use ppg_aa_analyzer::schema::ALL_AREAS;
use ppg_aa_analyzer::store::{DataSource, DataStore};

const AREA_X: &str = "\u{feff}Nome do Programa;Sigla da IES;UF;Região;Nota;Tipo de IES;\
Editais AA;AA Pretos e Pardos;Qnt. Vagas Totais;Vagas Totais AA\n\
Física Teórica;UFRGS;RS;Sul;5;Pública;SIM;SIM;12,345;4\n\
Física Aplicada;PUCRS;RS;Sul;4;Privada;NÃO;;5.25;0\n\
Física Médica;UFPA;PA;Norte;3;PUBLICA;sim;SIM;8;8\n";

const AREA_Y: &str = "Nome do Programa,Sigla da IES,UF,Região,NOTAS,TIPO DE IES,\
Editais AA,Qnt Vagas Totais,Vagas Totais AA\n\
Química,UFBA,BA,,7,Pública,talvez,12,\n";

const UNUSABLE: &str = "Programa,Instituição\nLetras,UFMG\n";

async fn load(dir: &std::path::Path) -> RecordSet {
    let mut store = DataStore::new(DataSource::local(dir));
    store.dataset().await.unwrap().area(ALL_AREAS).unwrap()
}

fn sheets() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("AreaX.csv"), AREA_X).unwrap();
    fs::write(dir.path().join("AreaY.csv"), AREA_Y).unwrap();
    fs::write(dir.path().join("Notas soltas.csv"), UNUSABLE).unwrap();
    dir
}

#[tokio::test]
async fn area_scenario_counts_and_sums() {
    let dir = sheets();
    let mut store = DataStore::new(DataSource::local(dir.path()));
    let dataset = store.dataset().await.unwrap();
    assert_eq!(dataset.area_names(), vec!["AreaX", "AreaY"]);

    let area = dataset.area("AreaX").unwrap();
    let with_aa = aggregate(&area, &[Dimension::Region], Metric::CountWithAa, SortOrder::Natural);
    assert_eq!(with_aa.value(&["Sul"]), Some(1.0));
    assert_eq!(with_aa.value(&["Norte"]), Some(1.0));

    let aa_slots = aggregate(
        &area,
        &[Dimension::Region],
        Metric::Sum(SlotField::AaTotal),
        SortOrder::MetricDescending,
    );
    assert_eq!(aa_slots.value(&["Sul"]), Some(4.0));
    assert_eq!(aa_slots.value(&["Norte"]), Some(8.0));

    let stats = summary_stats(&area);
    assert!((stats.aa_percentage - 66.7).abs() < 1e-9);
}

#[tokio::test]
async fn ingestion_normalizes_values() {
    let dir = sheets();
    let all = load(dir.path()).await;
    assert_eq!(all.len(), 4);

    let quimica = all.iter().find(|r| r.area == "AreaY").unwrap();
    assert_eq!(quimica.region, "Nordeste");
    assert_eq!(quimica.grade, "7");
    assert!(!quimica.has_affirmative_action());
    assert!(!quimica.aa_editais.is_answered());
    assert_eq!(quimica.aa_total_slots, 0.0);
}

#[tokio::test]
async fn filters_then_aggregates() {
    let dir = sheets();
    let all = load(dir.path()).await;

    let south_with_aa = apply_filters(
        &all,
        &[
            Predicate::one_of(Dimension::Region, ["Sul"]),
            Predicate::AaStatus(AaStatus::WithAa),
        ],
    );
    assert_eq!(south_with_aa.len(), 1);
    assert_eq!(south_with_aa.records[0].institution_acronym, "UFRGS");

    let nothing = FilterContext::new()
        .with(Predicate::one_of(Dimension::State, ["AM"]))
        .apply(&all);
    assert!(nothing.is_empty());
    let stats = summary_stats(&nothing);
    assert_eq!(stats.aa_percentage, 0.0);
    assert_eq!(percentage(0.0, 0.0, 1), 0.0);
}

#[tokio::test]
async fn exported_tables_round_trip() {
    let dir = sheets();
    let all = load(dir.path()).await;
    let out = tempfile::tempdir().unwrap();

    let tables = area_report(&all, true);
    let summary = export_area(out.path(), ALL_AREAS, &tables, 2).unwrap();
    assert_eq!(summary.written, tables.len());
    assert_eq!(summary.failed, 0);

    let area_dir = out.path().join("Todas_as_Areas");
    let by_region = area_dir.join("analise_vagas/vagas_por_regiao.csv");
    let (headers, rows) = read_csv_table(&by_region).unwrap();
    assert_eq!(headers[0], "Region");
    let sul = rows.iter().find(|r| r[0] == "Sul").unwrap();
    assert_eq!(sul[1], "2");
    assert_eq!(sul[5], "4");

    let report = fs::read_to_string(area_dir.join("relatorio.txt")).unwrap();
    assert!(report.contains("Showing 2 of 4 rows"));
}

#[tokio::test]
async fn repeated_reads_reuse_the_cached_load() {
    let dir = sheets();
    let mut store = DataStore::new(DataSource::local(dir.path()));
    let first = store.dataset().await.unwrap().all_areas();
    let second = store.dataset().await.unwrap().all_areas();
    assert_eq!(first, second);
    assert_eq!(store.load_count(), 1);
}

#[tokio::test]
async fn filtered_listing_round_trips_through_csv() {
    let dir = sheets();
    let all = load(dir.path()).await;
    let selected = apply_filters(
        &all,
        &[Predicate::one_of(Dimension::Region, ["Sul", "Nordeste"])],
    );
    assert_eq!(selected.len(), 3);

    let records: Vec<&ProgramRecord> = selected.iter().collect();
    let listing = program_listing(Section::Geography, "programas", "Programs", &records);
    let out = tempfile::tempdir().unwrap();
    let path = write_table(out.path(), &listing).unwrap();

    let (headers, rows) = read_csv_table(&path).unwrap();
    assert_eq!(headers, listing.headers);
    assert_eq!(rows.len(), selected.len());
    for (row, record) in rows.iter().zip(selected.iter()) {
        let expected = vec![
            record.area.clone(),
            record.program_name.clone(),
            record.institution_acronym.clone(),
            record.state.clone(),
            record.region.clone(),
            record.grade.clone(),
            record.institution_type.label().to_string(),
            record.aa_editais.label().to_string(),
            record.total_slots.to_string(),
            record.aa_total_slots.to_string(),
        ];
        assert_eq!(row, &expected);
        assert_eq!(row[8].parse::<f64>().unwrap(), record.total_slots);
        assert_eq!(row[9].parse::<f64>().unwrap(), record.aa_total_slots);
    }
    assert!(rows.iter().any(|r| r[8] == "12.345"));
    assert!(rows.iter().any(|r| r[8] == "5.25"));
}
