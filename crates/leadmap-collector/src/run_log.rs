//! What a run skipped and why.

/// Why a search page could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFailure {
    /// The provider answered with a status other than `OK`/`ZERO_RESULTS`.
    Status {
        status: String,
        message: Option<String>,
    },
    /// The request itself failed (network, HTTP status, malformed body).
    Transport(String),
}

impl std::fmt::Display for SearchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchFailure::Status {
                status,
                message: Some(message),
            } => write!(f, "{status}: {message}"),
            SearchFailure::Status {
                status,
                message: None,
            } => write!(f, "{status}"),
            SearchFailure::Transport(reason) => write!(f, "transport error: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Remaining pages of the query were abandoned.
    SearchFailed(SearchFailure),
    /// The place was already collected earlier in the run.
    Duplicate,
    /// Details could not be fetched.
    DetailsUnavailable,
    /// The address did not contain the run's locality filter.
    OutsideLocality,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipRecord {
    pub query: String,
    pub page: u32,
    /// `None` for page-level skips.
    pub place_id: Option<String>,
    pub reason: SkipReason,
}

/// Per-run counters plus the ordered list of skips.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunLog {
    pub pages_fetched: u32,
    pub details_fetched: u32,
    pub search_failures: u32,
    pub duplicates: u32,
    pub details_unavailable: u32,
    pub outside_locality: u32,
    pub snapshot_failures: u32,
    pub skipped: Vec<SkipRecord>,
}

/// Snapshot of the skip counters, used to report what a single query added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    pub pages_fetched: u32,
    pub search_failures: u32,
    pub duplicates: u32,
    pub details_unavailable: u32,
    pub outside_locality: u32,
}

impl SkipCounts {
    /// Counts accumulated since `earlier`.
    #[must_use]
    pub fn since(self, earlier: SkipCounts) -> SkipCounts {
        SkipCounts {
            pages_fetched: self.pages_fetched.saturating_sub(earlier.pages_fetched),
            search_failures: self.search_failures.saturating_sub(earlier.search_failures),
            duplicates: self.duplicates.saturating_sub(earlier.duplicates),
            details_unavailable: self
                .details_unavailable
                .saturating_sub(earlier.details_unavailable),
            outside_locality: self.outside_locality.saturating_sub(earlier.outside_locality),
        }
    }
}

impl RunLog {
    #[must_use]
    pub fn counts(&self) -> SkipCounts {
        SkipCounts {
            pages_fetched: self.pages_fetched,
            search_failures: self.search_failures,
            duplicates: self.duplicates,
            details_unavailable: self.details_unavailable,
            outside_locality: self.outside_locality,
        }
    }

    pub(crate) fn record(&mut self, record: SkipRecord) {
        match record.reason {
            SkipReason::SearchFailed(_) => self.search_failures += 1,
            SkipReason::Duplicate => self.duplicates += 1,
            SkipReason::DetailsUnavailable => self.details_unavailable += 1,
            SkipReason::OutsideLocality => self.outside_locality += 1,
        }
        self.skipped.push(record);
    }
}
