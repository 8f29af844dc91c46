//! HTTP client for the Google Places Text Search and Place Details APIs.
//!
//! Wraps `reqwest` with API key management, the fixed region/language
//! defaults of a deployment, and typed response deserialization. The API key
//! travels as a query parameter, so URLs are never included in errors.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::PlacesError;
use crate::types::{DetailsResponse, PlaceDetails, SearchPage, TextSearchResponse};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place/";

const TEXT_SEARCH_ENDPOINT: &str = "textsearch/json";
const DETAILS_ENDPOINT: &str = "details/json";

/// Fields requested from Place Details.
const DETAIL_FIELDS: &[&str] = &[
    "name",
    "formatted_address",
    "formatted_phone_number",
    "opening_hours",
    "rating",
    "user_ratings_total",
    "geometry",
    "url",
    "website",
    "business_status",
];

/// Client for the Google Places API.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    region: String,
    language: String,
    search_url: Url,
    details_url: Url,
}

impl PlacesClient {
    /// Creates a client pointed at the production Places API.
    ///
    /// `region` biases text searches (ccTLD, e.g. `"pe"`); `language` selects
    /// the language of detail responses (e.g. `"es"`).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        region: &str,
        language: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, PlacesError> {
        Self::with_base_url(
            api_key,
            region,
            language,
            timeout_secs,
            user_agent,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        region: &str,
        language: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let invalid = |reason: String| PlacesError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason,
        };
        let base = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
        let search_url = base
            .join(TEXT_SEARCH_ENDPOINT)
            .map_err(|e| invalid(e.to_string()))?;
        let details_url = base
            .join(DETAILS_ENDPOINT)
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            region: region.to_owned(),
            language: language.to_owned(),
            search_url,
            details_url,
        })
    }

    /// Runs one Text Search page.
    ///
    /// The first page sends `query` and the region bias (`region` overrides
    /// the client default). Follow-up pages send only the page token: the
    /// API ignores every other parameter once `pagetoken` is present.
    ///
    /// The API `status` is returned inside the [`SearchPage`] rather than
    /// as an error so callers decide how to treat `OVER_QUERY_LIMIT` and
    /// friends.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Http`] on network failure.
    /// - [`PlacesError::UnexpectedStatus`] on a non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn text_search(
        &self,
        query: &str,
        region: Option<&str>,
        page_token: Option<&str>,
    ) -> Result<SearchPage, PlacesError> {
        let url = match page_token {
            Some(token) => self.build_url(&self.search_url, &[("pagetoken", token)]),
            None => self.build_url(
                &self.search_url,
                &[("query", query), ("region", region.unwrap_or(self.region.as_str()))],
            ),
        };

        let raw: TextSearchResponse = self.request_json(url, TEXT_SEARCH_ENDPOINT).await?;
        Ok(SearchPage::from(raw))
    }

    /// Fetches Place Details for one place id.
    ///
    /// Returns `Ok(None)` when the API answers with a non-`OK` status
    /// (`NOT_FOUND`, `INVALID_REQUEST`, ...) or omits `result`.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Http`] on network failure.
    /// - [`PlacesError::UnexpectedStatus`] on a non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>, PlacesError> {
        let fields = DETAIL_FIELDS.join(",");
        let url = self.build_url(
            &self.details_url,
            &[
                ("place_id", place_id),
                ("fields", fields.as_str()),
                ("language", self.language.as_str()),
            ],
        );

        let raw: DetailsResponse = self.request_json(url, DETAILS_ENDPOINT).await?;
        if raw.status != "OK" {
            tracing::debug!(
                place_id,
                status = %raw.status,
                message = raw.error_message.as_deref().unwrap_or(""),
                "place details unavailable"
            );
            return Ok(None);
        }
        Ok(raw.result)
    }

    /// Appends the API key and `extra` to `endpoint`, percent-encoding every
    /// value.
    fn build_url(&self, endpoint: &Url, extra: &[(&str, &str)]) -> Url {
        let mut url = endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        url
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the body.
    ///
    /// `endpoint` labels errors instead of the full URL, which carries the key.
    async fn request_json<T: DeserializeOwned>(
        &self,
        url: Url,
        endpoint: &str,
    ) -> Result<T, PlacesError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PlacesError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlacesError::UnexpectedStatus {
                status: status.as_u16(),
                endpoint: endpoint.to_owned(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| PlacesError::Http(e.without_url()))?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: endpoint.to_owned(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
