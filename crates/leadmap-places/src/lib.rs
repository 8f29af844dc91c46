//! Google Places client for leadmap.
//!
//! [`PlacesClient`] talks to the Text Search and Place Details endpoints;
//! [`PlacesProvider`] is the seam the collection pipeline is written
//! against so it can run on scripted providers in tests.

pub mod client;
pub mod error;
pub mod provider;
pub mod types;

pub use client::PlacesClient;
pub use error::PlacesError;
pub use provider::PlacesProvider;
pub use types::{Candidate, PlaceDetails, SearchPage, SearchStatus};
