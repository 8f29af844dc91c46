//! Places API response types.
//!
//! ## Observed response shapes
//!
//! Text Search returns `{"status", "results", "next_page_token"?,
//! "error_message"?}`. `next_page_token` is omitted on the last page, and
//! a freshly issued token answers `INVALID_REQUEST` until it activates
//! (roughly two seconds after issue).
//!
//! Place Details returns `{"status", "result"?}`. Every field inside
//! `result` is optional in practice: places without a phone, website,
//! rating, or schedule simply omit the key. They are modelled as `Option`
//! so that "absent" and "zero" stay distinct for scoring.

use leadmap_core::{LatLng, OpeningHours};
use serde::Deserialize;

/// Terminal status of a Text Search call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    Ok,
    ZeroResults,
    /// Any other status string, e.g. `"OVER_QUERY_LIMIT"` or `"REQUEST_DENIED"`.
    Error(String),
}

impl SearchStatus {
    #[must_use]
    pub fn from_api(raw: &str) -> Self {
        match raw {
            "OK" => SearchStatus::Ok,
            "ZERO_RESULTS" => SearchStatus::ZeroResults,
            other => SearchStatus::Error(other.to_string()),
        }
    }

    /// `OK` and `ZERO_RESULTS` both let paging continue normally.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, SearchStatus::Ok | SearchStatus::ZeroResults)
    }
}

impl std::fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchStatus::Ok => write!(f, "OK"),
            SearchStatus::ZeroResults => write!(f, "ZERO_RESULTS"),
            SearchStatus::Error(raw) => write!(f, "{raw}"),
        }
    }
}

/// Minimal search hit: a stable place id and where to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub place_id: String,
    pub location: LatLng,
}

/// One page of Text Search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub status: SearchStatus,
    pub error_message: Option<String>,
    pub candidates: Vec<Candidate>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlaceOpeningHours {
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

/// Enriched record for one place, as returned by Place Details.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub formatted_address: String,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    /// Average rating in `[0.0, 5.0]`.
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub opening_hours: Option<PlaceOpeningHours>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    /// Canonical Google Maps URL for the place.
    #[serde(default)]
    pub url: String,
    /// `"OPERATIONAL"`, `"CLOSED_TEMPORARILY"`, or `"CLOSED_PERMANENTLY"`.
    #[serde(default)]
    pub business_status: Option<String>,
}

impl PlaceDetails {
    /// Website, treating an empty string as absent.
    #[must_use]
    pub fn website(&self) -> Option<&str> {
        self.website.as_deref().filter(|w| !w.is_empty())
    }

    /// Phone number, treating an empty string as absent.
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.formatted_phone_number
            .as_deref()
            .filter(|p| !p.is_empty())
    }

    #[must_use]
    pub fn has_website(&self) -> bool {
        self.website().is_some()
    }

    /// Weekday schedule lines, or [`OpeningHours::NotAvailable`] when the
    /// place publishes none.
    #[must_use]
    pub fn weekday_hours(&self) -> OpeningHours {
        match &self.opening_hours {
            Some(hours) if !hours.weekday_text.is_empty() => {
                OpeningHours::Weekdays(hours.weekday_text.clone())
            }
            _ => OpeningHours::NotAvailable,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct TextSearchResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<TextSearchResult>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TextSearchResult {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailsResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub result: Option<PlaceDetails>,
}

impl From<TextSearchResponse> for SearchPage {
    fn from(raw: TextSearchResponse) -> Self {
        let candidates = raw
            .results
            .into_iter()
            .filter_map(|item| match (item.place_id, item.geometry) {
                (Some(place_id), Some(geometry)) if !place_id.is_empty() => Some(Candidate {
                    place_id,
                    location: geometry.location,
                }),
                (place_id, _) => {
                    tracing::debug!(?place_id, "dropping search result without id or geometry");
                    None
                }
            })
            .collect();

        Self {
            status: SearchStatus::from_api(&raw.status),
            error_message: raw.error_message,
            candidates,
            next_page_token: raw.next_page_token.filter(|t| !t.is_empty()),
        }
    }
}
