//! HTTP calendar source with feed caching.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::Catalog;
use crate::domain::calendar_source::{CalendarSource, SourceError, SubjectGroup};
use crate::infrastructure::cache::CacheService;

const USER_AGENT: &str = concat!("calendar-shortener/", env!("CARGO_PKG_VERSION"));

/// Placeholder replaced by the subject identifier in the feed template.
pub const SUBJECT_ID_PLACEHOLDER: &str = "{id}";

/// Largest feed body accepted from upstream unless configured otherwise.
pub const DEFAULT_MAX_FEED_BYTES: usize = 10 * 1024 * 1024;

/// Fetches calendar feeds over HTTP.
///
/// Successful bodies are stored in the feed cache under `course:<url>` or
/// `subject:<id>`. The catalog is optional: without it the catalog listings
/// report [`SourceError::Unavailable`].
pub struct HttpCalendarSource {
    client: Client,
    subject_feed_template: String,
    cache: Arc<dyn CacheService>,
    catalog: Option<Catalog>,
    max_feed_bytes: usize,
}

impl HttpCalendarSource {
    /// Creates a source.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        subject_feed_template: impl Into<String>,
        timeout: Duration,
        cache: Arc<dyn CacheService>,
        catalog: Option<Catalog>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            subject_feed_template: subject_feed_template.into(),
            cache,
            catalog,
            max_feed_bytes: DEFAULT_MAX_FEED_BYTES,
        })
    }

    /// Sets the largest feed body accepted from upstream.
    pub fn with_max_feed_bytes(mut self, max_feed_bytes: usize) -> Self {
        self.max_feed_bytes = max_feed_bytes;
        self
    }

    fn subject_feed_url(&self, subject_id: &str) -> String {
        self.subject_feed_template
            .replace(SUBJECT_ID_PLACEHOLDER, subject_id)
    }

    fn catalog(&self) -> Result<&Catalog, SourceError> {
        self.catalog
            .as_ref()
            .ok_or_else(|| SourceError::Unavailable("course catalog not loaded".to_string()))
    }

    async fn fetch(&self, cache_key: &str, url: &str) -> Result<String, SourceError> {
        if let Ok(Some(body)) = self.cache.get_feed(cache_key).await {
            if looks_like_calendar(&body) {
                debug!(cache_key, "Feed cache hit");
                return Ok(body);
            }
            warn!(cache_key, "Discarding malformed cached feed");
            if let Err(e) = self.cache.invalidate(cache_key).await {
                warn!("Failed to invalidate {}: {}", cache_key, e);
            }
        }

        debug!(url, "Fetching calendar feed");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Unavailable(format!("{url}: {e}")))?;

        match resp.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND | StatusCode::GONE => {
                return Err(SourceError::NotFound(url.to_string()));
            }
            status => {
                return Err(SourceError::Unavailable(format!("{url}: HTTP {status}")));
            }
        }

        let body = self.read_body(url, resp).await?;

        if !looks_like_calendar(&body) {
            return Err(SourceError::Malformed(url.to_string()));
        }

        if let Err(e) = self.cache.set_feed(cache_key, &body, None).await {
            warn!("Failed to cache feed {}: {}", cache_key, e);
        }

        Ok(body)
    }

    /// Buffers a response body, refusing anything over `max_feed_bytes`.
    async fn read_body(&self, url: &str, mut resp: Response) -> Result<String, SourceError> {
        let too_large = || {
            SourceError::Unavailable(format!(
                "{url}: feed exceeds {} bytes",
                self.max_feed_bytes
            ))
        };

        if resp
            .content_length()
            .is_some_and(|len| len > self.max_feed_bytes as u64)
        {
            return Err(too_large());
        }

        let mut body = Vec::new();
        while let Some(chunk) = resp
            .chunk()
            .await
            .map_err(|e| SourceError::Unavailable(format!("{url}: {e}")))?
        {
            if body.len() + chunk.len() > self.max_feed_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

fn looks_like_calendar(body: &str) -> bool {
    body.trim_start_matches('\u{feff}')
        .trim_start()
        .starts_with("BEGIN:VCALENDAR")
}

#[async_trait]
impl CalendarSource for HttpCalendarSource {
    async fn course_calendar(&self, url: &str) -> Result<String, SourceError> {
        self.fetch(&format!("course:{url}"), url).await
    }

    async fn subject_calendar(&self, subject_id: &str) -> Result<String, SourceError> {
        let url = self.subject_feed_url(subject_id);
        self.fetch(&format!("subject:{subject_id}"), &url).await
    }

    async fn calendars(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.catalog()?.cals.clone())
    }

    async fn subject_groups(&self) -> Result<Vec<SubjectGroup>, SourceError> {
        Ok(self.catalog()?.groups.clone())
    }
}
