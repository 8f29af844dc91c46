use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::slug::file_slug;
use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorConfig {
    /// Sector label as it appears in queries and reports, e.g. `"clínicas"`.
    pub name: String,
    /// High-yield sectors earn the sector bonus when scoring.
    #[serde(default)]
    pub high_yield: bool,
    /// Explicit search texts for deep runs. Empty means the single default
    /// query `"{name} en {city}"`.
    #[serde(default)]
    pub queries: Vec<String>,
    /// Report file name override, e.g. `"ropa_huancayo.json"`.
    #[serde(default)]
    pub output_file: Option<String>,
}

impl SectorConfig {
    /// Accent-free, lowercase slug used for lookups and file names.
    #[must_use]
    pub fn slug(&self) -> String {
        file_slug(&self.name)
    }

    /// `true` if `name_or_slug` names this sector, ignoring case and accents.
    #[must_use]
    pub fn matches(&self, name_or_slug: &str) -> bool {
        self.slug() == file_slug(name_or_slug)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectorsFile {
    pub sectors: Vec<SectorConfig>,
}

impl SectorsFile {
    /// Labels of every sector marked `high_yield`.
    #[must_use]
    pub fn high_yield_set(&self) -> HashSet<String> {
        self.sectors
            .iter()
            .filter(|s| s.high_yield)
            .map(|s| s.name.clone())
            .collect()
    }

    /// Looks a sector up by label or slug.
    #[must_use]
    pub fn find(&self, name_or_slug: &str) -> Option<&SectorConfig> {
        self.sectors.iter().find(|s| s.matches(name_or_slug))
    }
}

/// Load and validate the sector catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sectors(path: &Path) -> Result<SectorsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SectorsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sectors_file: SectorsFile = serde_yaml::from_str(&content)?;

    validate_sectors(&sectors_file)?;

    Ok(sectors_file)
}

fn validate_sectors(sectors_file: &SectorsFile) -> Result<(), ConfigError> {
    if sectors_file.sectors.is_empty() {
        return Err(ConfigError::Validation(
            "at least one sector must be configured".to_string(),
        ));
    }

    let mut seen_slugs = HashSet::new();

    for sector in &sectors_file.sectors {
        if sector.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "sector name must be non-empty".to_string(),
            ));
        }

        if sector.queries.iter().any(|q| q.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "sector '{}' has an empty query",
                sector.name
            )));
        }

        let slug = sector.slug();
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate sector: '{}' (slug '{slug}')",
                sector.name
            )));
        }
    }

    Ok(())
}
