/// One search submitted to the places provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Free-form search text, e.g. `"boutiques en Huancayo"`.
    pub text: String,
    /// Region bias for this query; `None` uses the client's configured region.
    pub region: Option<String>,
    /// Sector used for scoring and the business `category`. `None` falls
    /// back to the sector of the enclosing [`RunPlan`].
    pub sector: Option<String>,
}

impl Query {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            region: None,
            sector: None,
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }
}

/// Everything one collection run needs: the sector label the report is filed
/// under and the queries to run in order.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub sector: String,
    pub queries: Vec<Query>,
    /// When set, details whose formatted address does not contain this text
    /// are dropped. Used by ad hoc searches that must stay inside the city.
    pub address_must_contain: Option<String>,
}

impl RunPlan {
    #[must_use]
    pub fn new(sector: impl Into<String>, queries: Vec<Query>) -> Self {
        Self {
            sector: sector.into(),
            queries,
            address_must_contain: None,
        }
    }

    #[must_use]
    pub fn with_address_filter(mut self, needle: impl Into<String>) -> Self {
        self.address_must_contain = Some(needle.into());
        self
    }

    /// Runs with more than one query tag each business with the query that
    /// found it.
    #[must_use]
    pub fn is_multi_query(&self) -> bool {
        self.queries.len() > 1
    }

    /// Sector label effective for `query`.
    #[must_use]
    pub fn sector_for<'a>(&'a self, query: &'a Query) -> &'a str {
        query.sector.as_deref().unwrap_or(&self.sector)
    }
}
