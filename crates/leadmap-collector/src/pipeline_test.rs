use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use leadmap_core::{LatLng, OpeningHours, Priority};
use leadmap_places::{PlaceDetails, PlacesError, SearchStatus};

use super::*;
use crate::error::ReportError;

// ---------------------------------------------------------------------------
// Scripted provider
// ---------------------------------------------------------------------------

enum Scripted {
    Page(SearchPage),
    Fail,
}

/// In-memory provider. Pages are keyed by query text; page `n` (0-based) is
/// requested with the token `"{query}:{n}"`.
#[derive(Default)]
struct ScriptedProvider {
    pages: HashMap<String, Vec<Scripted>>,
    details: HashMap<String, PlaceDetails>,
    search_calls: Mutex<Vec<(String, Option<String>)>>,
    detail_calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    /// Script `query` to return one page per entry of `pages`, chaining
    /// tokens between them.
    fn with_pages(mut self, query: &str, pages: &[&[&str]]) -> Self {
        let total = pages.len();
        let scripted = pages
            .iter()
            .enumerate()
            .map(|(i, ids)| {
                Scripted::Page(SearchPage {
                    status: if ids.is_empty() {
                        SearchStatus::ZeroResults
                    } else {
                        SearchStatus::Ok
                    },
                    error_message: None,
                    candidates: ids.iter().map(|id| candidate(id)).collect(),
                    next_page_token: (i + 1 < total).then(|| format!("{query}:{}", i + 1)),
                })
            })
            .collect();
        self.pages.insert(query.to_string(), scripted);
        self
    }

    fn with_script(mut self, query: &str, script: Vec<Scripted>) -> Self {
        self.pages.insert(query.to_string(), script);
        self
    }

    fn with_details(mut self, place_id: &str, details: PlaceDetails) -> Self {
        self.details.insert(place_id.to_string(), details);
        self
    }

    /// Details for every id in `ids`, with addresses inside Huancayo.
    fn with_plain_details(self, ids: &[&str]) -> Self {
        ids.iter().fold(self, |provider, id| {
            provider.with_details(id, details_named(id))
        })
    }

    fn search_calls(&self) -> Vec<(String, Option<String>)> {
        self.search_calls.lock().unwrap().clone()
    }

    fn detail_calls(&self) -> Vec<String> {
        self.detail_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlacesProvider for ScriptedProvider {
    async fn search(
        &self,
        query: &Query,
        page_token: Option<&str>,
    ) -> Result<SearchPage, PlacesError> {
        self.search_calls
            .lock()
            .unwrap()
            .push((query.text.clone(), page_token.map(str::to_string)));

        let index = match page_token {
            None => 0,
            Some(token) => token
                .rsplit(':')
                .next()
                .and_then(|n| n.parse::<usize>().ok())
                .unwrap(),
        };
        match self.pages.get(&query.text).and_then(|p| p.get(index)) {
            Some(Scripted::Page(page)) => Ok(page.clone()),
            Some(Scripted::Fail) => Err(PlacesError::UnexpectedStatus {
                status: 500,
                endpoint: "textsearch".to_string(),
            }),
            None => Ok(SearchPage {
                status: SearchStatus::ZeroResults,
                error_message: None,
                candidates: vec![],
                next_page_token: None,
            }),
        }
    }

    async fn details(&self, place_id: &str) -> Option<PlaceDetails> {
        self.detail_calls.lock().unwrap().push(place_id.to_string());
        self.details.get(place_id).cloned()
    }
}

fn candidate(place_id: &str) -> Candidate {
    Candidate {
        place_id: place_id.to_string(),
        location: LatLng {
            lat: -12.06,
            lng: -75.2,
        },
    }
}

fn details_named(name: &str) -> PlaceDetails {
    PlaceDetails {
        name: name.to_string(),
        formatted_address: format!("Jr. Ancash 100, {name}, Huancayo 12001, Perú"),
        website: Some(format!("https://{name}.pe")),
        url: format!("https://maps.google.com/?q={name}"),
        ..PlaceDetails::default()
    }
}

// ---------------------------------------------------------------------------
// Recording sleeper and sinks
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct RecordingSleeper {
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    fn count(&self, duration: Duration) -> usize {
        self.slept
            .lock()
            .unwrap()
            .iter()
            .filter(|d| **d == duration)
            .count()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

#[derive(Default)]
struct RecordingSink {
    snapshots: Vec<RunReport>,
}

impl SnapshotSink for RecordingSink {
    fn write_snapshot(&mut self, report: &RunReport) -> Result<(), ReportError> {
        self.snapshots.push(report.clone());
        Ok(())
    }
}

struct FailingSink;

impl SnapshotSink for FailingSink {
    fn write_snapshot(&mut self, _report: &RunReport) -> Result<(), ReportError> {
        Err(ReportError::Io {
            path: "/read-only/ropa_huancayo.json".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

fn settings() -> CollectorSettings {
    CollectorSettings {
        rules: ScoreRules::with_high_yield_sectors(
            ["clínicas", "hoteles", "colegios privados"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        ),
        ..CollectorSettings::default()
    }
}

fn collector(
    provider: ScriptedProvider,
) -> (Collector<ScriptedProvider, RecordingSleeper>, RecordingSleeper) {
    let sleeper = RecordingSleeper::default();
    (
        Collector::new(provider, sleeper.clone(), settings()),
        sleeper,
    )
}

fn single(sector: &str, query: &str) -> RunPlan {
    RunPlan::new(sector, vec![Query::new(query)])
}

fn ids(report: &RunReport) -> Vec<&str> {
    report
        .businesses
        .iter()
        .map(|b| b.place_id.as_str())
        .collect()
}

const Q: &str = "pollerías en Huancayo";

// ---------------------------------------------------------------------------
// Paging
// ---------------------------------------------------------------------------

#[tokio::test]
async fn page_cap_limits_search_calls() {
    let provider = ScriptedProvider::default()
        .with_pages(Q, &[&["p1"], &["p2"], &["p3"], &["p4"], &["p5"]])
        .with_plain_details(&["p1", "p2", "p3", "p4", "p5"]);
    let (collector, sleeper) = collector(provider);

    let outcome = collector.collect(&single("pollerías", Q)).await;

    let calls = collector.provider().search_calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], (Q.to_string(), None));
    assert_eq!(calls[1].1.as_deref(), Some("pollerías en Huancayo:1"));
    assert_eq!(calls[2].1.as_deref(), Some("pollerías en Huancayo:2"));
    assert_eq!(ids(&outcome.report), vec!["p1", "p2", "p3"]);
    assert_eq!(outcome.log.pages_fetched, 3);
    assert_eq!(sleeper.count(PacingPolicy::default().inter_page), 2);
}

#[tokio::test]
async fn paging_stops_when_token_absent() {
    let provider = ScriptedProvider::default()
        .with_pages(Q, &[&["p1"], &["p2"]])
        .with_plain_details(&["p1", "p2"]);
    let (collector, sleeper) = collector(provider);

    let outcome = collector.collect(&single("pollerías", Q)).await;

    assert_eq!(collector.provider().search_calls().len(), 2);
    assert_eq!(outcome.report.meta.total_results, 2);
    assert_eq!(sleeper.count(PacingPolicy::default().inter_page), 1);
}

#[tokio::test]
async fn zero_page_cap_still_fetches_first_page() {
    let provider = ScriptedProvider::default()
        .with_pages(Q, &[&["p1"], &["p2"]])
        .with_plain_details(&["p1", "p2"]);
    let sleeper = RecordingSleeper::default();
    let collector = Collector::new(
        provider,
        sleeper,
        CollectorSettings {
            max_pages_per_query: 0,
            ..settings()
        },
    );

    let outcome = collector.collect(&single("pollerías", Q)).await;

    assert_eq!(collector.provider().search_calls().len(), 1);
    assert_eq!(ids(&outcome.report), vec!["p1"]);
}

#[tokio::test]
async fn zero_results_yields_empty_report() {
    let provider = ScriptedProvider::default().with_pages(Q, &[&[]]);
    let (collector, _) = collector(provider);

    let outcome = collector.collect(&single("pollerías", Q)).await;

    assert!(outcome.report.businesses.is_empty());
    assert_eq!(outcome.report.stats.total, 0);
    assert_eq!(outcome.log.search_failures, 0);
}

// ---------------------------------------------------------------------------
// Deduplication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cross_query_duplicates_keep_first_sighting() {
    let boutiques = "boutiques en Huancayo";
    let jeans = "jeans en Huancayo";
    let provider = ScriptedProvider::default()
        .with_pages(boutiques, &[&["a", "b"]])
        .with_pages(jeans, &[&["b", "c"]])
        .with_plain_details(&["a", "b", "c"]);
    let (collector, _) = collector(provider);
    let plan = RunPlan::new(
        "Venta de Ropa",
        vec![Query::new(boutiques), Query::new(jeans)],
    );

    let outcome = collector.collect(&plan).await;

    assert_eq!(ids(&outcome.report), vec!["a", "b", "c"]);
    assert_eq!(collector.provider().detail_calls(), vec!["a", "b", "c"]);
    let b = &outcome.report.businesses[1];
    assert_eq!(b.sub_category.as_deref(), Some(boutiques));
    assert_eq!(b.category, "Venta de Ropa");
    assert_eq!(outcome.report.businesses[2].sub_category.as_deref(), Some(jeans));
    assert_eq!(outcome.log.duplicates, 1);
    assert_eq!(outcome.report.meta.search_query, MULTI_QUERY_LABEL);
}

#[tokio::test]
async fn repeated_id_on_one_page_is_fetched_once() {
    let provider = ScriptedProvider::default()
        .with_pages(Q, &[&["a", "a"]])
        .with_plain_details(&["a"]);
    let (collector, sleeper) = collector(provider);

    let outcome = collector.collect(&single("pollerías", Q)).await;

    assert_eq!(ids(&outcome.report), vec!["a"]);
    assert_eq!(collector.provider().detail_calls(), vec!["a"]);
    assert_eq!(outcome.log.duplicates, 1);
    assert_eq!(sleeper.count(PacingPolicy::default().inter_item), 1);
}

// ---------------------------------------------------------------------------
// Failure tolerance
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_detail_skips_only_that_place() {
    let provider = ScriptedProvider::default()
        .with_pages(Q, &[&["a", "b", "c"]])
        .with_plain_details(&["a", "c"]);
    let (collector, sleeper) = collector(provider);

    let outcome = collector.collect(&single("pollerías", Q)).await;

    assert_eq!(ids(&outcome.report), vec!["a", "c"]);
    assert_eq!(outcome.log.details_unavailable, 1);
    assert_eq!(outcome.log.details_fetched, 2);
    assert_eq!(
        outcome.log.skipped[0].reason,
        SkipReason::DetailsUnavailable
    );
    assert_eq!(outcome.log.skipped[0].place_id.as_deref(), Some("b"));
    assert_eq!(sleeper.count(PacingPolicy::default().inter_item), 3);
}

#[tokio::test]
async fn place_with_failed_details_is_retried_when_seen_again() {
    let provider = ScriptedProvider::default()
        .with_pages("boutiques", &[&["a"]])
        .with_pages("jeans", &[&["a", "b"]])
        .with_plain_details(&["b"]);
    let (collector, _) = collector(provider);
    let plan = RunPlan::new(
        "Venta de Ropa",
        vec![Query::new("boutiques"), Query::new("jeans")],
    );

    let outcome = collector.collect(&plan).await;

    assert_eq!(collector.provider().detail_calls(), vec!["a", "a", "b"]);
    assert_eq!(outcome.log.details_unavailable, 2);
    assert_eq!(outcome.log.duplicates, 0);
    assert_eq!(ids(&outcome.report), vec!["b"]);
}

#[tokio::test]
async fn transport_error_moves_on_to_next_query() {
    let broken = "talleres en Huancayo";
    let fine = "hoteles en Huancayo";
    let provider = ScriptedProvider::default()
        .with_script(broken, vec![Scripted::Fail])
        .with_pages(fine, &[&["h1"]])
        .with_plain_details(&["h1"]);
    let (collector, _) = collector(provider);
    let plan = RunPlan::new("mixed", vec![Query::new(broken), Query::new(fine)]);

    let outcome = collector.collect(&plan).await;

    assert_eq!(ids(&outcome.report), vec!["h1"]);
    assert_eq!(outcome.log.search_failures, 1);
    let skip = &outcome.log.skipped[0];
    assert_eq!(skip.query, broken);
    assert_eq!(skip.page, 1);
    assert!(skip.place_id.is_none());
    assert!(matches!(
        skip.reason,
        SkipReason::SearchFailed(SearchFailure::Transport(_))
    ));
}

#[tokio::test]
async fn error_status_abandons_remaining_pages_but_keeps_earlier_ones() {
    let provider = ScriptedProvider::default()
        .with_script(
            Q,
            vec![
                Scripted::Page(SearchPage {
                    status: SearchStatus::Ok,
                    error_message: None,
                    candidates: vec![candidate("p1")],
                    next_page_token: Some(format!("{Q}:1")),
                }),
                Scripted::Page(SearchPage {
                    status: SearchStatus::Error("INVALID_REQUEST".to_string()),
                    error_message: None,
                    candidates: vec![],
                    next_page_token: Some(format!("{Q}:2")),
                }),
                Scripted::Page(SearchPage {
                    status: SearchStatus::Ok,
                    error_message: None,
                    candidates: vec![candidate("p3")],
                    next_page_token: None,
                }),
            ],
        )
        .with_plain_details(&["p1", "p3"]);
    let (collector, _) = collector(provider);

    let outcome = collector.collect(&single("pollerías", Q)).await;

    assert_eq!(ids(&outcome.report), vec!["p1"]);
    assert_eq!(collector.provider().search_calls().len(), 2);
    assert_eq!(outcome.log.pages_fetched, 1);
    assert_eq!(
        outcome.log.skipped[0].reason,
        SkipReason::SearchFailed(SearchFailure::Status {
            status: "INVALID_REQUEST".to_string(),
            message: None,
        })
    );
}

// ---------------------------------------------------------------------------
// Report shape
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fully_qualified_hotel_scores_one_hundred() {
    let provider = ScriptedProvider::default()
        .with_pages("hoteles en Huancayo", &[&["h1"]])
        .with_details(
            "h1",
            PlaceDetails {
                name: "Hotel Turismo".to_string(),
                formatted_address: "Jr. Ancash 729, Huancayo 12001, Perú".to_string(),
                formatted_phone_number: Some("064 231072".to_string()),
                rating: Some(4.5),
                user_ratings_total: Some(60),
                url: "https://maps.google.com/?cid=42".to_string(),
                ..PlaceDetails::default()
            },
        );
    let (collector, _) = collector(provider);

    let outcome = collector
        .collect(&single("hoteles", "hoteles en Huancayo"))
        .await;

    let hotel = &outcome.report.businesses[0];
    assert_eq!(hotel.score, 100);
    assert_eq!(hotel.priority, Priority::High);
    assert!(!hotel.has_website);
    assert_eq!(hotel.website, None);
    assert_eq!(hotel.phone.as_deref(), Some("064 231072"));
    assert_eq!(hotel.category, "hoteles");
    assert_eq!(hotel.sub_category, None);
    assert_eq!(hotel.business_status, "OPERATIONAL");
    assert_eq!(hotel.opening_hours, OpeningHours::NotAvailable);
    assert_eq!(hotel.google_maps_url, "https://maps.google.com/?cid=42");
    assert_eq!(outcome.report.stats.high_rating, 1);
    assert_eq!(outcome.report.meta.search_query, "hoteles en Huancayo");
    assert_eq!(outcome.report.meta.source, "Google Maps Places API");
    assert_eq!(outcome.report.meta.city, "Huancayo");
    assert_eq!(outcome.report.meta.country, "PE");
}

#[tokio::test]
async fn missing_rating_and_geometry_fall_back() {
    let provider = ScriptedProvider::default()
        .with_pages(Q, &[&["a"]])
        .with_details(
            "a",
            PlaceDetails {
                name: "Pollería Don Pepe".to_string(),
                formatted_address: "Av. Giráldez 300, Huancayo".to_string(),
                formatted_phone_number: Some(String::new()),
                ..PlaceDetails::default()
            },
        );
    let (collector, _) = collector(provider);

    let outcome = collector.collect(&single("pollerías", Q)).await;

    let place = &outcome.report.businesses[0];
    assert!((place.rating - 0.0).abs() < f64::EPSILON);
    assert_eq!(place.reviews, 0);
    assert_eq!(place.phone, None);
    assert_eq!(place.location, candidate("a").location);
    assert_eq!(place.score, 40);
    assert_eq!(place.priority, Priority::Medium);
}

#[tokio::test]
async fn stats_agree_with_businesses() {
    let provider = ScriptedProvider::default()
        .with_pages(Q, &[&["a", "b", "c"]])
        .with_details(
            "a",
            PlaceDetails {
                formatted_phone_number: Some("1".to_string()),
                rating: Some(4.7),
                ..details_named("a")
            },
        )
        .with_details(
            "b",
            PlaceDetails {
                website: None,
                rating: Some(4.4),
                ..details_named("b")
            },
        )
        .with_details(
            "c",
            PlaceDetails {
                website: None,
                formatted_phone_number: Some("3".to_string()),
                ..details_named("c")
            },
        );
    let (collector, _) = collector(provider);

    let outcome = collector.collect(&single("pollerías", Q)).await;

    let stats = outcome.report.stats;
    assert_eq!(stats.total, 3);
    assert_eq!(stats.total, outcome.report.meta.total_results);
    assert_eq!(stats.with_website + stats.without_website, stats.total);
    assert_eq!(stats.with_website, 1);
    assert_eq!(stats.with_phone, 2);
    assert_eq!(stats.high_rating, 1);
}

#[tokio::test]
async fn address_filter_drops_places_outside_city() {
    let provider = ScriptedProvider::default()
        .with_pages(Q, &[&["in", "out"]])
        .with_details("in", details_named("in"))
        .with_details(
            "out",
            PlaceDetails {
                formatted_address: "Av. Ferrocarril 500, El Tambo, Junín".to_string(),
                ..details_named("out")
            },
        );
    let (collector, _) = collector(provider);
    let plan = single("pollerías", Q).with_address_filter("Huancayo");

    let outcome = collector.collect(&plan).await;

    assert_eq!(ids(&outcome.report), vec!["in"]);
    assert_eq!(outcome.log.outside_locality, 1);
}

// ---------------------------------------------------------------------------
// Queries, pacing, snapshots
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_plan_is_labelled_with_its_sector() {
    let (collector, sleeper) = collector(ScriptedProvider::default());

    let outcome = collector.collect(&RunPlan::new("hoteles", vec![])).await;

    assert_eq!(outcome.report.meta.search_query, "hoteles");
    assert!(outcome.report.businesses.is_empty());
    assert!(collector.provider().search_calls().is_empty());
    assert!(sleeper.slept.lock().unwrap().is_empty());
}

#[tokio::test]
async fn inter_query_pause_only_between_queries() {
    let queries = ["q1", "q2", "q3"];
    let provider = queries
        .iter()
        .fold(ScriptedProvider::default(), |p, q| p.with_pages(q, &[&[]]));
    let (collector, sleeper) = collector(provider);
    let plan = RunPlan::new("misc", queries.iter().map(|q| Query::new(*q)).collect());

    collector.collect(&plan).await;

    assert_eq!(sleeper.count(PacingPolicy::default().inter_query), 2);
}

#[tokio::test]
async fn snapshot_written_after_each_query() {
    let provider = ScriptedProvider::default()
        .with_pages("boutiques", &[&["a"]])
        .with_pages("jeans", &[&["b"]])
        .with_plain_details(&["a", "b"]);
    let (collector, _) = collector(provider);
    let plan = RunPlan::new(
        "Venta de Ropa",
        vec![Query::new("boutiques"), Query::new("jeans")],
    );
    let mut sink = RecordingSink::default();

    let outcome = collector.collect_with_snapshots(&plan, &mut sink).await;

    assert_eq!(sink.snapshots.len(), 2);
    assert!(sink
        .snapshots
        .iter()
        .all(|s| s.meta.search_query == SNAPSHOT_QUERY_LABEL));
    assert_eq!(sink.snapshots[0].meta.total_results, 1);
    assert_eq!(sink.snapshots[1].meta.total_results, 2);
    assert_eq!(outcome.report.meta.search_query, MULTI_QUERY_LABEL);
    assert_eq!(outcome.log.snapshot_failures, 0);
}

#[tokio::test]
async fn failing_snapshots_do_not_abort_run() {
    let provider = ScriptedProvider::default()
        .with_pages("boutiques", &[&["a"]])
        .with_pages("jeans", &[&["b"]])
        .with_plain_details(&["a", "b"]);
    let (collector, _) = collector(provider);
    let plan = RunPlan::new(
        "Venta de Ropa",
        vec![Query::new("boutiques"), Query::new("jeans")],
    );

    let outcome = collector.collect_with_snapshots(&plan, &mut FailingSink).await;

    assert_eq!(outcome.log.snapshot_failures, 2);
    assert_eq!(ids(&outcome.report), vec!["a", "b"]);
}
