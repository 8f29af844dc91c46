//! `leadmap sectors`: print the sector catalog.

use leadmap_collector::report_filename;
use leadmap_core::{AppConfig, SectorConfig, SectorsFile};

/// One catalog line, e.g. `* clínicas  (1 query) -> clinicas_huancayo.json`.
/// High-yield sectors are starred.
pub(crate) fn describe_sector(config: &AppConfig, sector: &SectorConfig) -> String {
    let marker = if sector.high_yield { '*' } else { ' ' };
    let query_count = sector.queries.len().max(1);
    let noun = if query_count == 1 { "query" } else { "queries" };
    let file_name = sector
        .output_file
        .clone()
        .unwrap_or_else(|| report_filename(&sector.name, &config.city));
    format!(
        "{marker} {}  ({query_count} {noun}) -> {file_name}",
        sector.name
    )
}

pub(crate) fn run_list_sectors(config: &AppConfig, catalog: &SectorsFile) {
    println!(
        "{} sectors in {} (* = high-yield):",
        catalog.sectors.len(),
        config.sectors_path.display()
    );
    for sector in &catalog.sectors {
        println!("{}", describe_sector(config, sector));
    }
}
