//! Report types persisted as JSON and read by the map viewer.
//!
//! Field names, nesting, and value types mirror the files the viewer already
//! consumes; renaming anything here breaks it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Value of `meta.source` on every report.
pub const SOURCE_LABEL: &str = "Google Maps Places API";

/// `meta.search_query` for runs built from more than one query.
pub const MULTI_QUERY_LABEL: &str = "MULTIPLE (Deep Search)";

/// `meta.search_query` on intermediate snapshots written mid-run.
pub const SNAPSHOT_QUERY_LABEL: &str = "IN_PROGRESS";

/// Rating at or above which a business counts towards `stats.high_rating`.
pub const HIGH_RATING_STAT_THRESHOLD: f64 = 4.5;

/// `business_status` written when the provider reports none.
pub const DEFAULT_BUSINESS_STATUS: &str = "OPERATIONAL";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Lead triage tier derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

/// Weekday opening-hours lines, or the `"N/A"` marker when the provider has
/// no schedule for the place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OpeningHours {
    Weekdays(Vec<String>),
    #[default]
    NotAvailable,
}

impl OpeningHours {
    const NOT_AVAILABLE: &'static str = "N/A";
}

impl Serialize for OpeningHours {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OpeningHours::Weekdays(days) => days.serialize(serializer),
            OpeningHours::NotAvailable => serializer.serialize_str(Self::NOT_AVAILABLE),
        }
    }
}

impl<'de> Deserialize<'de> for OpeningHours {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Days(Vec<String>),
            Marker(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Days(days) => OpeningHours::Weekdays(days),
            Raw::Marker(_) => OpeningHours::NotAvailable,
        })
    }
}

/// One deduplicated, scored lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredBusiness {
    pub place_id: String,
    pub name: String,
    /// Sector the business was collected under.
    pub category: String,
    /// Query that first surfaced the business; only set on multi-query runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    pub address: String,
    pub location: LatLng,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub has_website: bool,
    pub rating: f64,
    pub reviews: u32,
    pub google_maps_url: String,
    pub business_status: String,
    pub score: u32,
    pub priority: Priority,
    pub opening_hours: OpeningHours,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub city: String,
    pub country: String,
    pub sector: String,
    pub search_query: String,
    pub source: String,
    #[serde(with = "iso_millis")]
    pub collected_at: DateTime<Utc>,
    pub total_results: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStats {
    pub total: usize,
    pub with_website: usize,
    pub without_website: usize,
    pub with_phone: usize,
    pub high_rating: usize,
}

impl ReportStats {
    /// Count every statistic in a single pass over `businesses`.
    #[must_use]
    pub fn tally(businesses: &[ScoredBusiness]) -> Self {
        let mut stats = Self::default();
        for business in businesses {
            stats.total += 1;
            if business.has_website {
                stats.with_website += 1;
            } else {
                stats.without_website += 1;
            }
            if business.phone.is_some() {
                stats.with_phone += 1;
            }
            if business.rating >= HIGH_RATING_STAT_THRESHOLD {
                stats.high_rating += 1;
            }
        }
        stats
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub meta: ReportMeta,
    pub stats: ReportStats,
    pub businesses: Vec<ScoredBusiness>,
}

impl RunReport {
    /// Assemble a report, deriving `stats` and `meta.total_results` from
    /// `businesses` so the three can never disagree.
    #[must_use]
    pub fn assemble(mut meta: ReportMeta, businesses: Vec<ScoredBusiness>) -> Self {
        meta.total_results = businesses.len();
        let stats = ReportStats::tally(&businesses);
        Self {
            meta,
            stats,
            businesses,
        }
    }
}

/// ISO-8601 UTC timestamps with millisecond precision and a `Z` suffix.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
