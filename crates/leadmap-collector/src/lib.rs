//! Lead collection pipeline.
//!
//! Runs queries against a [`leadmap_places::PlacesProvider`], pages through
//! results under a page cap, fetches details for every new place, scores it,
//! and deduplicates by place id into a [`leadmap_core::RunReport`].

pub mod accumulator;
pub mod error;
pub mod pacing;
pub mod pipeline;
pub mod run_log;
pub mod scorer;
pub mod writer;

pub use accumulator::DedupAccumulator;
pub use error::ReportError;
pub use pacing::{PacingPolicy, Sleeper, TokioSleeper};
pub use pipeline::{Collector, CollectorSettings, RunOutcome};
pub use run_log::{RunLog, SearchFailure, SkipCounts, SkipReason, SkipRecord};
pub use scorer::{score_place, FactorHit, ScoreCard, ScoreFactor, ScoreRules};
pub use writer::{report_filename, write_report, FileSnapshotSink, SnapshotSink};
