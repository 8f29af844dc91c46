//! Shared configuration and domain types for leadmap.
//!
//! Everything the collection pipeline produces is modelled here so the CLI,
//! the places client, and the collector agree on one report shape.

pub mod app_config;
pub mod config;
pub mod error;
pub mod query;
pub mod report;
pub mod sectors;
pub mod slug;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use query::{Query, RunPlan};
pub use report::{
    LatLng, OpeningHours, Priority, ReportMeta, ReportStats, RunReport, ScoredBusiness,
    DEFAULT_BUSINESS_STATUS, MULTI_QUERY_LABEL, SNAPSHOT_QUERY_LABEL, SOURCE_LABEL,
};
pub use sectors::{load_sectors, SectorConfig, SectorsFile};
pub use slug::file_slug;
