//! Cookie jar persisted to a per-provider file.
//!
//! Providers pin load-balancer affinity and anti-bot tokens in cookies, so the
//! jar is reloaded at startup and rewritten whenever a response sets a cookie.
//! RFC 6265 handling (domain, path, secure, expiry) is `cookie_store`'s.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::PoisonError;

use cookie_store::CookieStore;
use reqwest::cookie::CookieStore as ReqwestCookieStore;
use reqwest::header::HeaderValue;
use reqwest::Url;
use reqwest_cookie_store::CookieStoreMutex;

/// A reqwest cookie provider backed by a JSON file.
///
/// Session cookies are written too, so they survive a restart the way the
/// provider expects. Single writer per file is assumed; no cross-process
/// locking is done.
pub struct FileCookieJar {
    path: PathBuf,
    store: CookieStoreMutex,
}

impl FileCookieJar {
    /// Loads the jar from `path`.
    ///
    /// A missing file yields an empty jar. An unreadable or corrupt file is
    /// logged and also yields an empty jar; it is overwritten on the next save.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let store = match File::open(&path) {
            Ok(file) => cookie_store::serde::json::load(BufReader::new(file)).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "cookie file is corrupt; starting empty");
                CookieStore::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CookieStore::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read cookie file; starting empty");
                CookieStore::default()
            }
        };

        Self {
            path,
            store: CookieStoreMutex::new(store),
        }
    }

    /// Number of unexpired cookies held across all domains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter_unexpired()
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn save(&self) {
        let mut serialized = Vec::new();
        {
            let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) =
                cookie_store::serde::json::save_incl_expired_and_nonpersistent(&store, &mut serialized)
            {
                tracing::warn!(error = %e, "could not serialize cookies");
                return;
            }
        }
        if let Err(e) = std::fs::write(&self.path, serialized) {
            tracing::warn!(path = %self.path.display(), error = %e, "could not write cookie file");
        }
    }
}

impl ReqwestCookieStore for FileCookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.store.set_cookies(cookie_headers, url);
        self.save();
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.store.cookies(url)
    }
}
