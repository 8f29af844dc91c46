//! The paginated collection pipeline.
//!
//! One [`Collector::collect`] call is one run: queries are processed in
//! order, each paged up to the page cap, and every new place is fetched,
//! scored, and recorded once. Failures skip the affected page or place and
//! never abort the run.

use std::collections::HashSet;

use chrono::Utc;
use leadmap_core::{
    AppConfig, Query, ReportMeta, RunPlan, RunReport, ScoredBusiness,
    DEFAULT_BUSINESS_STATUS, MULTI_QUERY_LABEL, SNAPSHOT_QUERY_LABEL, SOURCE_LABEL,
};
use leadmap_places::{Candidate, PlacesProvider, SearchPage};

use crate::accumulator::DedupAccumulator;
use crate::pacing::{PacingPolicy, Sleeper, TokioSleeper};
use crate::run_log::{RunLog, SearchFailure, SkipReason, SkipRecord};
use crate::scorer::{score_place, ScoreRules};
use crate::writer::SnapshotSink;

/// Upper bound on provider pages per query.
pub const DEFAULT_MAX_PAGES_PER_QUERY: u32 = 3;

/// Run-wide knobs for a [`Collector`].
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub city: String,
    pub country: String,
    pub source: String,
    /// Values below 1 are treated as 1.
    pub max_pages_per_query: u32,
    pub pacing: PacingPolicy,
    pub rules: ScoreRules,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            city: "Huancayo".to_string(),
            country: "PE".to_string(),
            source: SOURCE_LABEL.to_string(),
            max_pages_per_query: DEFAULT_MAX_PAGES_PER_QUERY,
            pacing: PacingPolicy::default(),
            rules: ScoreRules::default(),
        }
    }
}

impl CollectorSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig, high_yield_sectors: HashSet<String>) -> Self {
        Self {
            city: config.city.clone(),
            country: config.country.clone(),
            source: SOURCE_LABEL.to_string(),
            max_pages_per_query: config.max_pages_per_query,
            pacing: PacingPolicy::from_app_config(config),
            rules: ScoreRules::with_high_yield_sectors(high_yield_sectors),
        }
    }
}

/// The result of one run: the report plus what was skipped along the way.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: RunReport,
    pub log: RunLog,
}

/// Drives a [`PlacesProvider`] through a [`RunPlan`].
pub struct Collector<P, S = TokioSleeper> {
    provider: P,
    sleeper: S,
    settings: CollectorSettings,
}

impl<P, S> Collector<P, S>
where
    P: PlacesProvider,
    S: Sleeper,
{
    pub fn new(provider: P, sleeper: S, settings: CollectorSettings) -> Self {
        Self {
            provider,
            sleeper,
            settings,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn settings(&self) -> &CollectorSettings {
        &self.settings
    }

    /// Run every query in `plan` and return the deduplicated, scored report.
    pub async fn collect(&self, plan: &RunPlan) -> RunOutcome {
        self.run(plan, None).await
    }

    /// Like [`Collector::collect`], but hands a partial report to `sink`
    /// after each query completes.
    pub async fn collect_with_snapshots(
        &self,
        plan: &RunPlan,
        sink: &mut dyn SnapshotSink,
    ) -> RunOutcome {
        self.run(plan, Some(sink)).await
    }

    async fn run(&self, plan: &RunPlan, mut sink: Option<&mut dyn SnapshotSink>) -> RunOutcome {
        let mut acc = DedupAccumulator::new();
        let mut log = RunLog::default();
        let total_queries = plan.queries.len();

        tracing::info!(
            sector = %plan.sector,
            queries = total_queries,
            max_pages = self.page_cap(),
            "starting collection run"
        );

        for (index, query) in plan.queries.iter().enumerate() {
            let before = acc.len();
            let counts_before = log.counts();
            self.collect_query(plan, query, &mut acc, &mut log).await;
            let added = log.counts().since(counts_before);

            tracing::info!(
                query = %query.text,
                new = acc.len() - before,
                total = acc.len(),
                pages = added.pages_fetched,
                duplicates = added.duplicates,
                details_unavailable = added.details_unavailable,
                outside_locality = added.outside_locality,
                search_failures = added.search_failures,
                "query complete"
            );

            if let Some(sink) = sink.as_deref_mut() {
                let snapshot = self.build_report(
                    plan,
                    SNAPSHOT_QUERY_LABEL.to_string(),
                    acc.as_slice().to_vec(),
                );
                if let Err(e) = sink.write_snapshot(&snapshot) {
                    log.snapshot_failures += 1;
                    tracing::warn!(query = %query.text, error = %e, "snapshot write failed");
                }
            }

            if index + 1 < total_queries {
                self.sleeper.sleep(self.settings.pacing.inter_query).await;
            }
        }

        let search_query = match plan.queries.as_slice() {
            [only] => only.text.clone(),
            [_, _, ..] => MULTI_QUERY_LABEL.to_string(),
            [] => plan.sector.clone(),
        };
        let report = self.build_report(plan, search_query, acc.into_vec());

        tracing::info!(
            sector = %plan.sector,
            total = report.meta.total_results,
            pages = log.pages_fetched,
            duplicates = log.duplicates,
            details_unavailable = log.details_unavailable,
            search_failures = log.search_failures,
            "collection run complete"
        );

        RunOutcome { report, log }
    }

    fn page_cap(&self) -> u32 {
        self.settings.max_pages_per_query.max(1)
    }

    async fn collect_query(
        &self,
        plan: &RunPlan,
        query: &Query,
        acc: &mut DedupAccumulator,
        log: &mut RunLog,
    ) {
        let cap = self.page_cap();
        let mut page: u32 = 0;
        let mut token: Option<String> = None;

        loop {
            page += 1;
            if page > 1 {
                self.sleeper.sleep(self.settings.pacing.inter_page).await;
            }

            let Some(result) = self.fetch_page(query, page, token.as_deref(), log).await else {
                break;
            };
            log.pages_fetched += 1;

            tracing::info!(
                query = %query.text,
                page,
                candidates = result.candidates.len(),
                "search page fetched"
            );

            for candidate in &result.candidates {
                self.process_candidate(plan, query, page, candidate, acc, log)
                    .await;
            }

            token = result.next_page_token;
            if token.is_none() || page >= cap {
                break;
            }
        }
    }

    /// Fetch one page, recording a skip and returning `None` when the page is
    /// unusable.
    async fn fetch_page(
        &self,
        query: &Query,
        page: u32,
        token: Option<&str>,
        log: &mut RunLog,
    ) -> Option<SearchPage> {
        let failure = match self.provider.search(query, token).await {
            Ok(result) if result.status.is_success() => return Some(result),
            Ok(result) => SearchFailure::Status {
                status: result.status.to_string(),
                message: result.error_message,
            },
            Err(e) => SearchFailure::Transport(e.to_string()),
        };

        tracing::warn!(
            query = %query.text,
            page,
            reason = %failure,
            "search failed; skipping remaining pages"
        );
        log.record(SkipRecord {
            query: query.text.clone(),
            page,
            place_id: None,
            reason: SkipReason::SearchFailed(failure),
        });
        None
    }

    async fn process_candidate(
        &self,
        plan: &RunPlan,
        query: &Query,
        page: u32,
        candidate: &Candidate,
        acc: &mut DedupAccumulator,
        log: &mut RunLog,
    ) {
        let skip = |reason| SkipRecord {
            query: query.text.clone(),
            page,
            place_id: Some(candidate.place_id.clone()),
            reason,
        };

        if acc.contains(&candidate.place_id) {
            tracing::debug!(place_id = %candidate.place_id, "duplicate place skipped");
            log.record(skip(SkipReason::Duplicate));
            return;
        }

        let details = self.provider.details(&candidate.place_id).await;
        self.sleeper.sleep(self.settings.pacing.inter_item).await;

        let Some(details) = details else {
            tracing::warn!(place_id = %candidate.place_id, "details unavailable; place skipped");
            log.record(skip(SkipReason::DetailsUnavailable));
            return;
        };
        log.details_fetched += 1;

        if let Some(needle) = plan.address_must_contain.as_deref() {
            if !details.formatted_address.contains(needle) {
                tracing::debug!(
                    place_id = %candidate.place_id,
                    address = %details.formatted_address,
                    "address outside locality"
                );
                log.record(skip(SkipReason::OutsideLocality));
                return;
            }
        }

        let sector = plan.sector_for(query);
        let card = score_place(&details, sector, &self.settings.rules);
        let location = details
            .geometry
            .as_ref()
            .map_or(candidate.location, |g| g.location);

        let business = ScoredBusiness {
            place_id: candidate.place_id.clone(),
            category: sector.to_string(),
            sub_category: plan.is_multi_query().then(|| query.text.clone()),
            address: details.formatted_address.clone(),
            location,
            phone: details.phone().map(str::to_string),
            website: details.website().map(str::to_string),
            has_website: card.has_website,
            rating: details.rating.unwrap_or(0.0),
            reviews: details.user_ratings_total.unwrap_or(0),
            google_maps_url: details.url.clone(),
            business_status: details
                .business_status
                .clone()
                .unwrap_or_else(|| DEFAULT_BUSINESS_STATUS.to_string()),
            score: card.score,
            priority: card.priority,
            opening_hours: details.weekday_hours(),
            name: details.name,
        };

        tracing::debug!(
            place_id = %business.place_id,
            name = %business.name,
            score = business.score,
            priority = %business.priority,
            "place scored"
        );
        acc.insert_if_absent(business);
    }

    fn build_report(
        &self,
        plan: &RunPlan,
        search_query: String,
        businesses: Vec<ScoredBusiness>,
    ) -> RunReport {
        let meta = ReportMeta {
            city: self.settings.city.clone(),
            country: self.settings.country.clone(),
            sector: plan.sector.clone(),
            search_query,
            source: self.settings.source.clone(),
            collected_at: Utc::now(),
            total_results: 0,
        };
        RunReport::assemble(meta, businesses)
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
