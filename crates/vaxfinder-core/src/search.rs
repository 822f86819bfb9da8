//! The operator's search: which providers to poll, how often, and the
//! provider-specific filters, loaded from a YAML file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const DEFAULT_CVS_URL: &str = "https://www.cvs.com/immunizations/covid-19-vaccine";
pub const DEFAULT_RITE_AID_URL: &str = "https://www.riteaid.com/pharmacy/apt-scheduler#";
pub const DEFAULT_JEFFERSON_URL: &str =
    "https://www.jeffersonhealth.org/coronavirus-covid-19/vaccination-clinics.html";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// `true` restricts the search to Philadelphia; `false` searches everywhere else.
    pub philly_mode: bool,
    pub cvs: CvsSearch,
    pub rite_aid: RiteAidSearch,
    pub jefferson: JeffersonSearch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CvsSearch {
    pub enabled: bool,
    pub url: String,
    pub check_period_secs: u64,
    /// Two-letter state code selecting the status feed and its location array.
    pub state: String,
    /// Cities never to notify about. Compared case-insensitively.
    pub exclude_cities: Vec<String>,
}

impl Default for CvsSearch {
    fn default() -> Self {
        Self {
            enabled: true,
            url: DEFAULT_CVS_URL.to_string(),
            check_period_secs: 300,
            state: "PA".to_string(),
            exclude_cities: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiteAidSearch {
    pub enabled: bool,
    pub url: String,
    pub check_period_secs: u64,
    /// Stores outside this state are dropped from the location cache.
    pub home_state: String,
    /// Zip codes or "city, state" strings fed to the store finder.
    pub search_locations: Vec<String>,
}

impl Default for RiteAidSearch {
    fn default() -> Self {
        Self {
            enabled: true,
            url: DEFAULT_RITE_AID_URL.to_string(),
            check_period_secs: 120,
            home_state: "PA".to_string(),
            search_locations: Vec::new(),
        }
    }
}

impl RiteAidSearch {
    /// Search locations with surrounding whitespace removed and blank entries dropped.
    #[must_use]
    pub fn search_locations(&self) -> Vec<String> {
        self.search_locations
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JeffersonSearch {
    pub enabled: bool,
    pub url: String,
    pub check_period_secs: u64,
}

impl Default for JeffersonSearch {
    fn default() -> Self {
        Self {
            enabled: true,
            url: DEFAULT_JEFFERSON_URL.to_string(),
            check_period_secs: 300,
        }
    }
}

/// Load and validate the search configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_search_config(path: &Path) -> Result<SearchConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SearchFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_search_config(&content)
}

fn parse_search_config(content: &str) -> Result<SearchConfig, ConfigError> {
    let search: SearchConfig =
        serde_yaml::from_str(content).map_err(ConfigError::SearchFileParse)?;
    validate_search(&search)?;
    Ok(search)
}

fn validate_search(search: &SearchConfig) -> Result<(), ConfigError> {
    let providers = [
        ("cvs", search.cvs.enabled, &search.cvs.url, search.cvs.check_period_secs),
        (
            "rite_aid",
            search.rite_aid.enabled,
            &search.rite_aid.url,
            search.rite_aid.check_period_secs,
        ),
        (
            "jefferson",
            search.jefferson.enabled,
            &search.jefferson.url,
            search.jefferson.check_period_secs,
        ),
    ];

    for (provider, enabled, url, period) in providers {
        if !enabled {
            continue;
        }
        if url.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "{provider}: url must be non-empty"
            )));
        }
        if period == 0 {
            return Err(ConfigError::Validation(format!(
                "{provider}: check_period_secs must be greater than zero"
            )));
        }
    }

    if search.cvs.enabled && !is_state_code(&search.cvs.state) {
        return Err(ConfigError::Validation(format!(
            "cvs: invalid state code '{}'",
            search.cvs.state
        )));
    }

    if search.rite_aid.enabled {
        if !is_state_code(&search.rite_aid.home_state) {
            return Err(ConfigError::Validation(format!(
                "rite_aid: invalid home_state '{}'",
                search.rite_aid.home_state
            )));
        }
        if search.rite_aid.search_locations().is_empty() {
            return Err(ConfigError::Validation(
                "rite_aid: at least one search location is required".to_string(),
            ));
        }
    }

    Ok(())
}

fn is_state_code(s: &str) -> bool {
    s.len() == 2 && s.chars().all(|c| c.is_ascii_alphabetic())
}
