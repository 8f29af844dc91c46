use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub city: String,
    pub country: String,
    pub region: String,
    pub language: String,
    pub log_level: String,
    pub sectors_path: PathBuf,
    pub output_dir: PathBuf,
    pub max_pages_per_query: u32,
    pub page_token_delay_ms: u64,
    pub detail_delay_ms: u64,
    pub query_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl AppConfig {
    /// Default search text for a sector when the catalog lists no explicit
    /// queries, e.g. `"hoteles en Huancayo"`.
    #[must_use]
    pub fn sector_query(&self, sector: &str) -> String {
        format!("{sector} en {}", self.city)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"[redacted]")
            .field("city", &self.city)
            .field("country", &self.country)
            .field("region", &self.region)
            .field("language", &self.language)
            .field("log_level", &self.log_level)
            .field("sectors_path", &self.sectors_path)
            .field("output_dir", &self.output_dir)
            .field("max_pages_per_query", &self.max_pages_per_query)
            .field("page_token_delay_ms", &self.page_token_delay_ms)
            .field("detail_delay_ms", &self.detail_delay_ms)
            .field("query_delay_ms", &self.query_delay_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
