//! Blocking-per-target HTTP session used by every checker.
//!
//! One [`SessionClient`] per provider: it owns the provider's cookie jar (when
//! the provider needs session continuity) and the redirect policy. Each GET
//! takes a configuration closure so callers can shape the request (for example
//! a `Referer` header) without the session knowing provider details.
//!
//! Failures are never retried here; the poll cycle reports them and waits for
//! its next natural tick.

mod cookies;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};

use crate::error::CheckError;

pub use cookies::FileCookieJar;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const MAX_REDIRECTS: usize = 10;

/// Construction parameters for a [`SessionClient`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub follow_redirects: bool,
    /// Where to persist cookies. `None` disables the cookie jar entirely.
    pub cookie_file: Option<PathBuf>,
}

impl SessionOptions {
    #[must_use]
    pub fn new(timeout_secs: u64, user_agent: &str) -> Self {
        Self {
            timeout_secs,
            user_agent: user_agent.to_owned(),
            follow_redirects: false,
            cookie_file: None,
        }
    }

    #[must_use]
    pub fn follow_redirects(mut self) -> Self {
        self.follow_redirects = true;
        self
    }

    #[must_use]
    pub fn cookie_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_file = Some(path.into());
        self
    }
}

pub struct SessionClient {
    client: Client,
    jar: Option<Arc<FileCookieJar>>,
}

impl SessionClient {
    /// Builds the underlying `reqwest::Client`, loading the cookie jar if one
    /// is configured.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Http`] if the client cannot be constructed
    /// (e.g., invalid TLS config).
    pub fn new(options: &SessionOptions) -> Result<Self, CheckError> {
        let redirect = if options.follow_redirects {
            reqwest::redirect::Policy::limited(MAX_REDIRECTS)
        } else {
            reqwest::redirect::Policy::none()
        };

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(&options.user_agent)
            .redirect(redirect);

        let jar = options
            .cookie_file
            .as_ref()
            .map(|path| Arc::new(FileCookieJar::load(path)));
        if let Some(jar) = &jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }

        Ok(Self {
            client: builder.build()?,
            jar,
        })
    }

    #[must_use]
    pub fn cookie_jar(&self) -> Option<&FileCookieJar> {
        self.jar.as_deref()
    }

    /// Plain GET returning the whole body as text.
    ///
    /// # Errors
    ///
    /// See [`SessionClient::get_with`].
    pub async fn get(&self, url: &str) -> Result<String, CheckError> {
        self.get_with(url, |request| request).await
    }

    /// GET with the `Referer` header set, so follow-up calls look like they
    /// came from the provider's own page.
    ///
    /// # Errors
    ///
    /// See [`SessionClient::get_with`].
    pub async fn get_with_referer(&self, url: &str, referer: &str) -> Result<String, CheckError> {
        let referer = referer.to_owned();
        self.get_with(url, move |request| {
            request.header(reqwest::header::REFERER, referer)
        })
        .await
    }

    /// GET after letting `configure` adjust the request.
    ///
    /// # Errors
    ///
    /// - [`CheckError::InvalidUrl`] if `url` does not parse.
    /// - [`CheckError::Http`] on network, TLS or redirect failure.
    /// - [`CheckError::UnexpectedStatus`] for any non-2xx final status.
    pub async fn get_with<F>(&self, url: &str, configure: F) -> Result<String, CheckError>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let parsed = Url::parse(url).map_err(|e| CheckError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

        let response = configure(self.client.get(parsed)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CheckError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await?;
        tracing::debug!(url, status = status.as_u16(), bytes = body.len(), "GET complete");
        Ok(body)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
