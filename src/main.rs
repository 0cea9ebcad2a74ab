use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use env_logger::Env;

use ppg_aa_analyzer::analyzer::{summary_stats, SummaryStats};
use ppg_aa_analyzer::dataset::Dataset;
use ppg_aa_analyzer::export::{area_dir_name, clean_output_directory, export_area, ExportSummary};
use ppg_aa_analyzer::filters::{FilterContext, Predicate};
use ppg_aa_analyzer::models::{AaStatus, Config, Dimension, ProgramKey};
use ppg_aa_analyzer::reports::{area_report, comparison_table};
use ppg_aa_analyzer::schema::ALL_AREAS;
use ppg_aa_analyzer::store::{DataSource, DataStore};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let matches = Command::new("ppg-aa-analyzer")
        .version("1.0")
        .about("Analyzes affirmative-action policies of graduate programs")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("region")
                .long("region")
                .value_name("REGION")
                .help("Keep only programs in this region (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("state")
                .long("state")
                .value_name("UF")
                .help("Keep only programs in this state (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("grade")
                .long("grade")
                .value_name("GRADE")
                .help("Keep only programs with this grade (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("area")
                .long("area")
                .value_name("AREA")
                .help("Export only this knowledge area (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("aa")
                .long("aa")
                .value_name("STATUS")
                .help("Keep only programs with or without AA editais")
                .value_parser(["with", "without"]),
        )
        .arg(
            Arg::new("compare")
                .long("compare")
                .value_name("AREA|IES|PROGRAM")
                .help("Add a program to the comparison table (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("no-clean")
                .long("no-clean")
                .help("Keep results of previous runs")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config_file = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("config.toml");

    // Load or create configuration
    let config = if Path::new(config_file).exists() {
        println!("📋 Loading configuration from: {}", config_file);
        Config::load_from_file(config_file)
            .with_context(|| format!("Failed to read configuration {config_file}"))?
    } else {
        println!("📝 Creating default configuration file: {}", config_file);
        Config::default()
            .save_to_file(config_file)
            .with_context(|| format!("Failed to write configuration {config_file}"))?;
        println!(
            "⚠️  Please review {} (data directory, URLs, filters) and run the program again.",
            config_file
        );
        return Ok(());
    };

    let output_dir = PathBuf::from(
        config
            .output_directory
            .as_deref()
            .unwrap_or("tabelas_exportadas"),
    );
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;
    if !matches.get_flag("no-clean") {
        clean_output_directory(&output_dir)?;
    }

    let source = DataSource::from_config(&config);
    let mut store = DataStore::new(source);
    let dataset = store.dataset().await.context("Failed to load program sheets")?;

    let context = filter_context(&config, &matches);
    let areas = selected_areas(dataset, &config, &matches);

    println!("📂 Areas loaded: {}", dataset.area_names().join(", "));
    println!("🔎 Active filters: {}", context.active_count());
    println!("📄 Output directory: {}", output_dir.display());

    let mut results = Vec::new();
    for area in &areas {
        let Some(records) = dataset.area(area) else {
            log::warn!("Area '{}' not found in loaded sheets", area);
            continue;
        };
        let filtered = context.apply(&records);
        log::info!("{}: {} of {} programs after filters", area, filtered.len(), records.len());

        let mut tables = area_report(&filtered, area == ALL_AREAS);
        if !context.comparison().is_empty() {
            let compared = context.comparison_records(&records);
            if !compared.is_empty() {
                tables.push(comparison_table(&compared));
            }
        }

        match export_area(&output_dir, area, &tables, config.pdf_max_rows) {
            Ok(summary) => results.push((area.clone(), summary_stats(&filtered), summary)),
            Err(e) => log::error!("Failed to export area {}: {}", area, e),
        }
    }

    print_summary(&output_dir, &results);
    Ok(())
}

fn values(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// Configured filters, overridden per dimension by command-line flags.
fn filter_context(config: &Config, matches: &ArgMatches) -> FilterContext {
    let mut context = FilterContext::from_config(&config.filters);

    for (id, dimension) in [
        ("region", Dimension::Region),
        ("state", Dimension::State),
        ("grade", Dimension::Grade),
    ] {
        let selected = values(matches, id);
        if !selected.is_empty() {
            context.set(Predicate::one_of(dimension, selected));
        }
    }

    match matches.get_one::<String>("aa").map(String::as_str) {
        Some("with") => context.set(Predicate::AaStatus(AaStatus::WithAa)),
        Some("without") => context.set(Predicate::AaStatus(AaStatus::WithoutAa)),
        _ => {}
    }

    for entry in values(matches, "compare") {
        let parts: Vec<&str> = entry.split('|').map(str::trim).collect();
        if let [area, institution, program] = parts[..] {
            context.add_to_comparison(ProgramKey {
                area: area.to_string(),
                institution_acronym: institution.to_string(),
                program_name: program.to_string(),
            });
        } else {
            log::warn!("Ignoring comparison entry '{}': expected AREA|IES|PROGRAM", entry);
        }
    }

    context
}

/// The combined set first, then each area in load order.
fn selected_areas(dataset: &Dataset, config: &Config, matches: &ArgMatches) -> Vec<String> {
    let requested = values(matches, "area");
    let wanted = if requested.is_empty() {
        config.areas_of_interest.clone()
    } else {
        Some(requested)
    };

    let mut areas = vec![ALL_AREAS.to_string()];
    areas.extend(
        dataset
            .area_names()
            .into_iter()
            .filter(|area| wanted.as_ref().map_or(true, |w| w.contains(area))),
    );
    areas
}

fn print_summary(output_dir: &Path, results: &[(String, SummaryStats, ExportSummary)]) {
    println!("\n📊 SUMMARY");
    println!("==========\n");

    for (area, stats, export) in results {
        println!("📚 {}", area);
        println!(
            "   Programs: {} ({} with AA, {:.1}%)",
            stats.total_programs, stats.with_aa, stats.aa_percentage
        );
        println!(
            "   Slots: {} total, {} AA",
            stats.total_slots, stats.total_aa_slots
        );
        println!(
            "   Tables: {} written{}",
            export.written,
            if export.failed > 0 {
                format!(", {} failed", export.failed)
            } else {
                String::new()
            }
        );
        println!("   📂 {}", output_dir.join(area_dir_name(area)).display());
    }

    println!("\n✅ Analysis complete!");
}
