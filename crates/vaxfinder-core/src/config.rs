use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function,
/// so it can be tested with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let log_level = or_default("VAXFINDER_LOG_LEVEL", "info");
    let search_path = PathBuf::from(or_default(
        "VAXFINDER_SEARCH_PATH",
        "./config/search.yaml",
    ));
    let cookie_dir = PathBuf::from(or_default("VAXFINDER_COOKIE_DIR", "."));
    let request_timeout_secs = parse_u64("VAXFINDER_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "VAXFINDER_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let user_agent = or_default("VAXFINDER_USER_AGENT", "vaccineFinder");

    Ok(AppConfig {
        log_level,
        search_path,
        cookie_dir,
        request_timeout_secs,
        user_agent,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn build_app_config_uses_defaults_for_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.search_path.to_str(), Some("./config/search.yaml"));
        assert_eq!(cfg.cookie_dir.to_str(), Some("."));
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.user_agent, "vaccineFinder");
    }

    #[test]
    fn build_app_config_reads_overrides() {
        let mut map = HashMap::new();
        map.insert("VAXFINDER_LOG_LEVEL", "debug");
        map.insert("VAXFINDER_SEARCH_PATH", "/etc/vaxfinder/search.yaml");
        map.insert("VAXFINDER_COOKIE_DIR", "/var/lib/vaxfinder");
        map.insert("VAXFINDER_REQUEST_TIMEOUT_SECS", "45");
        map.insert("VAXFINDER_USER_AGENT", "custom-agent/2.0");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.search_path.to_str(), Some("/etc/vaxfinder/search.yaml"));
        assert_eq!(cfg.cookie_dir.to_str(), Some("/var/lib/vaxfinder"));
        assert_eq!(cfg.request_timeout_secs, 45);
        assert_eq!(cfg.user_agent, "custom-agent/2.0");
    }

    #[test]
    fn build_app_config_rejects_non_numeric_timeout() {
        let mut map = HashMap::new();
        map.insert("VAXFINDER_REQUEST_TIMEOUT_SECS", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VAXFINDER_REQUEST_TIMEOUT_SECS"),
            "expected InvalidEnvVar(VAXFINDER_REQUEST_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_zero_timeout() {
        let mut map = HashMap::new();
        map.insert("VAXFINDER_REQUEST_TIMEOUT_SECS", "0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
    }
}
