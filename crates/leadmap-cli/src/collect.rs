//! Collection command handlers for the CLI.
//!
//! Each handler turns catalog entries into a [`RunPlan`], runs it against the
//! live Places API, and writes one report file per run. In a batch, a sector
//! whose report cannot be written is reported and skipped; the remaining
//! sectors still run.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use leadmap_collector::{
    report_filename, write_report, Collector, CollectorSettings, FileSnapshotSink, RunOutcome,
    Sleeper, TokioSleeper,
};
use leadmap_core::{AppConfig, Priority, Query, RunPlan, SectorConfig, SectorsFile};
use leadmap_places::PlacesClient;

/// File name used by ad hoc searches when `--output` is not given.
pub(crate) const DEFAULT_SEARCH_FILE: &str = "results.json";

/// Sub-commands available under `collect`.
#[derive(Debug, Subcommand)]
pub enum CollectCommands {
    /// Collect one configured sector
    Sector {
        /// Sector label or slug (e.g. "clínicas" or "clinicas")
        name: String,
        /// Print the plan without calling the API
        #[arg(long)]
        dry_run: bool,
    },
    /// Collect every configured sector, one report per sector
    Batch {
        /// Restrict the batch to these sectors (repeatable)
        #[arg(long = "only", value_name = "NAME")]
        only: Vec<String>,
        /// Print the plan without calling the API
        #[arg(long)]
        dry_run: bool,
    },
    /// Run a sector's full query list as one deduplicated run, saving after
    /// each query
    Deep {
        /// Sector label or slug (e.g. "Venta de Ropa")
        name: String,
        /// Print the plan without calling the API
        #[arg(long)]
        dry_run: bool,
    },
}

/// Arguments of `leadmap search`.
#[derive(Debug, Clone)]
pub(crate) struct SearchRequest {
    pub query: String,
    pub sector: Option<String>,
    pub strict_locality: bool,
    pub output: Option<PathBuf>,
}

/// A run plan together with where its report goes.
#[derive(Debug, Clone)]
pub(crate) struct PlannedRun {
    pub plan: RunPlan,
    pub output_dir: PathBuf,
    pub file_name: String,
}

impl PlannedRun {
    pub(crate) fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.file_name)
    }
}

pub(crate) fn find_sector<'a>(
    catalog: &'a SectorsFile,
    name: &str,
) -> anyhow::Result<&'a SectorConfig> {
    catalog
        .find(name)
        .ok_or_else(|| anyhow::anyhow!("sector '{name}' is not in the sector catalog"))
}

/// Plan for one sector: its configured query list, or `"{sector} en {city}"`
/// when it has none.
pub(crate) fn sector_plan(config: &AppConfig, sector: &SectorConfig) -> PlannedRun {
    let queries = if sector.queries.is_empty() {
        vec![Query::new(config.sector_query(&sector.name))]
    } else {
        sector
            .queries
            .iter()
            .map(|q| Query::new(q.as_str()))
            .collect()
    };
    let file_name = sector
        .output_file
        .clone()
        .unwrap_or_else(|| report_filename(&sector.name, &config.city));

    PlannedRun {
        plan: RunPlan::new(sector.name.clone(), queries),
        output_dir: config.output_dir.clone(),
        file_name,
    }
}

/// Plan for a deep run. Only sectors with an explicit query list qualify.
pub(crate) fn deep_plan(config: &AppConfig, sector: &SectorConfig) -> anyhow::Result<PlannedRun> {
    if sector.queries.is_empty() {
        anyhow::bail!(
            "sector '{}' has no query list; use `leadmap collect sector` instead",
            sector.name
        );
    }
    Ok(sector_plan(config, sector))
}

/// Sectors selected by `--only`, or the whole catalog when none are given.
pub(crate) fn batch_sectors<'a>(
    catalog: &'a SectorsFile,
    only: &[String],
) -> anyhow::Result<Vec<&'a SectorConfig>> {
    if only.is_empty() {
        return Ok(catalog.sectors.iter().collect());
    }
    only.iter().map(|name| find_sector(catalog, name)).collect()
}

pub(crate) fn search_plan(
    config: &AppConfig,
    catalog: &SectorsFile,
    request: &SearchRequest,
) -> anyhow::Result<PlannedRun> {
    // Catalog spelling wins so the high-yield bonus matches.
    let sector = match request.sector.as_deref() {
        Some(name) => catalog
            .find(name)
            .map_or_else(|| name.to_string(), |s| s.name.clone()),
        None => request.query.clone(),
    };

    let mut plan = RunPlan::new(sector, vec![Query::new(request.query.as_str())]);
    if request.strict_locality {
        plan = plan.with_address_filter(config.city.as_str());
    }

    let (output_dir, file_name) = match &request.output {
        Some(path) => split_output_path(path)?,
        None => (config.output_dir.clone(), DEFAULT_SEARCH_FILE.to_string()),
    };

    Ok(PlannedRun {
        plan,
        output_dir,
        file_name,
    })
}

fn split_output_path(path: &Path) -> anyhow::Result<(PathBuf, String)> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("output path '{}' has no file name", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, file_name.to_string()))
}

fn build_collector(
    config: &AppConfig,
    catalog: &SectorsFile,
) -> anyhow::Result<Collector<PlacesClient>> {
    let client = PlacesClient::new(
        &config.api_key,
        &config.region,
        &config.language,
        config.request_timeout_secs,
        &config.user_agent,
    )
    .map_err(|e| anyhow::anyhow!("failed to build Places client: {e}"))?;
    let settings = CollectorSettings::from_app_config(config, catalog.high_yield_set());
    Ok(Collector::new(client, TokioSleeper, settings))
}

fn print_plan(planned: &PlannedRun) {
    println!(
        "dry-run: sector '{}' -> {}",
        planned.plan.sector,
        planned.output_path().display()
    );
    for (i, query) in planned.plan.queries.iter().enumerate() {
        println!("  query {}: {}", i + 1, query.text);
    }
    if let Some(needle) = &planned.plan.address_must_contain {
        println!("  keeping only addresses containing '{needle}'");
    }
}

/// Write the final report and print the one-line summary.
fn finish(planned: &PlannedRun, outcome: &RunOutcome) -> anyhow::Result<PathBuf> {
    let path = write_report(&planned.output_dir, &planned.file_name, &outcome.report)
        .with_context(|| format!("failed to write {}", planned.output_path().display()))?;

    let report = &outcome.report;
    let high = report
        .businesses
        .iter()
        .filter(|b| b.priority == Priority::High)
        .count();
    println!(
        "{}: {} businesses ({} without website, {} high priority, {} skipped) -> {}",
        report.meta.sector,
        report.meta.total_results,
        report.stats.without_website,
        high,
        outcome.log.skipped.len(),
        path.display()
    );
    if outcome.log.search_failures > 0 {
        eprintln!(
            "warning: {} search request(s) failed; results may be incomplete",
            outcome.log.search_failures
        );
    }
    Ok(path)
}

/// Collect one configured sector and write its report.
///
/// # Errors
///
/// Returns an error if the sector is unknown, the client cannot be built, or
/// the report cannot be written.
pub(crate) async fn run_collect_sector(
    config: &AppConfig,
    catalog: &SectorsFile,
    name: &str,
    dry_run: bool,
) -> anyhow::Result<()> {
    let planned = sector_plan(config, find_sector(catalog, name)?);
    if dry_run {
        print_plan(&planned);
        return Ok(());
    }

    let collector = build_collector(config, catalog)?;
    let outcome = collector.collect(&planned.plan).await;
    finish(&planned, &outcome)?;
    Ok(())
}

/// Collect every selected sector in turn, pausing between sectors.
///
/// # Errors
///
/// Returns an error if an `--only` name is unknown, the client cannot be
/// built, or any sector's report could not be written. Write failures do not
/// stop the remaining sectors.
pub(crate) async fn run_collect_batch(
    config: &AppConfig,
    catalog: &SectorsFile,
    only: &[String],
    dry_run: bool,
) -> anyhow::Result<()> {
    let plans: Vec<PlannedRun> = batch_sectors(catalog, only)?
        .into_iter()
        .map(|sector| sector_plan(config, sector))
        .collect();

    if dry_run {
        println!("dry-run: would collect {} sectors", plans.len());
        for planned in &plans {
            print_plan(planned);
        }
        return Ok(());
    }

    let collector = build_collector(config, catalog)?;
    let pause = collector.settings().pacing.inter_query;
    let mut failed: Vec<&str> = Vec::new();

    for (i, planned) in plans.iter().enumerate() {
        if i > 0 {
            TokioSleeper.sleep(pause).await;
        }
        tracing::info!(
            sector = %planned.plan.sector,
            position = i + 1,
            of = plans.len(),
            "collecting sector"
        );

        let outcome = collector.collect(&planned.plan).await;
        if let Err(e) = finish(planned, &outcome) {
            eprintln!("error: {e:#}");
            failed.push(planned.plan.sector.as_str());
        }
    }

    if !failed.is_empty() {
        anyhow::bail!(
            "{} of {} sectors could not be written: {}",
            failed.len(),
            plans.len(),
            failed.join(", ")
        );
    }
    Ok(())
}

/// Run a sector's whole query list as one run, snapshotting to the output
/// file after every query.
///
/// # Errors
///
/// Returns an error if the sector is unknown or has no query list, the client
/// cannot be built, or the final report cannot be written.
pub(crate) async fn run_collect_deep(
    config: &AppConfig,
    catalog: &SectorsFile,
    name: &str,
    dry_run: bool,
) -> anyhow::Result<()> {
    let planned = deep_plan(config, find_sector(catalog, name)?)?;
    if dry_run {
        print_plan(&planned);
        return Ok(());
    }

    let collector = build_collector(config, catalog)?;
    let mut sink = FileSnapshotSink::new(&planned.output_dir, &planned.file_name);
    let outcome = collector
        .collect_with_snapshots(&planned.plan, &mut sink)
        .await;
    if outcome.log.snapshot_failures > 0 {
        eprintln!(
            "warning: {} snapshot write(s) failed during the run",
            outcome.log.snapshot_failures
        );
    }
    finish(&planned, &outcome)?;
    Ok(())
}

/// Run a single ad hoc query.
///
/// # Errors
///
/// Returns an error if `--output` has no file name, the client cannot be
/// built, or the report cannot be written.
pub(crate) async fn run_search(
    config: &AppConfig,
    catalog: &SectorsFile,
    request: &SearchRequest,
    dry_run: bool,
) -> anyhow::Result<()> {
    let planned = search_plan(config, catalog, request)?;
    if dry_run {
        print_plan(&planned);
        return Ok(());
    }

    let collector = build_collector(config, catalog)?;
    let outcome = collector.collect(&planned.plan).await;
    finish(&planned, &outcome)?;
    Ok(())
}

#[cfg(test)]
#[path = "collect_test.rs"]
mod tests;
