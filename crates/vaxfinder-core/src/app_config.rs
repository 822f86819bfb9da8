use std::path::PathBuf;

/// Process-level settings read from the environment.
///
/// What to search for lives in the YAML search file pointed at by
/// `search_path`; this struct only carries the ambient knobs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub search_path: PathBuf,
    /// Directory holding the per-provider cookie jar files.
    pub cookie_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}
