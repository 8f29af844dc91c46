use async_trait::async_trait;
use leadmap_core::Query;

use crate::client::PlacesClient;
use crate::error::PlacesError;
use crate::types::{PlaceDetails, SearchPage};

/// The two provider calls the collection pipeline depends on.
#[async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Fetch one page of search results. `page_token` is `None` on the first
    /// page of a query.
    async fn search(
        &self,
        query: &Query,
        page_token: Option<&str>,
    ) -> Result<SearchPage, PlacesError>;

    /// Fetch details for one place. Every failure, whatever the cause,
    /// comes back as `None`.
    async fn details(&self, place_id: &str) -> Option<PlaceDetails>;
}

#[async_trait]
impl PlacesProvider for PlacesClient {
    async fn search(
        &self,
        query: &Query,
        page_token: Option<&str>,
    ) -> Result<SearchPage, PlacesError> {
        self.text_search(&query.text, query.region.as_deref(), page_token)
            .await
    }

    async fn details(&self, place_id: &str) -> Option<PlaceDetails> {
        match self.place_details(place_id).await {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!(place_id, error = %e, "place details request failed");
                None
            }
        }
    }
}
