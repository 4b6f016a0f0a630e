//! Fetching raw region feeds from URLs or local files.

use std::collections::HashMap;

use reqwest::blocking::Client;
use tracing::debug;

use crate::config::{FeedLocation, SourceSpec};
use crate::error::AppError;

/// Something that can hand back the CSV text published for a region.
///
/// The pipeline only talks to this trait, so tests can substitute in-memory feeds.
pub trait FeedSource {
    fn fetch(&self, source: &SourceSpec) -> Result<String, AppError>;
}

/// Reads `http(s)://` locations over blocking HTTP and everything else from disk.
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    fn fetch_url(&self, source: &SourceSpec, url: &str) -> Result<String, AppError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::source_unavailable(&source.code, url, format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::source_unavailable(
                &source.code,
                url,
                format!("HTTP status {}", resp.status()),
            ));
        }

        resp.text()
            .map_err(|e| AppError::source_unavailable(&source.code, url, format!("failed to read body: {e}")))
    }
}

impl Default for FeedClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedSource for FeedClient {
    fn fetch(&self, source: &SourceSpec) -> Result<String, AppError> {
        let body = match &source.location {
            FeedLocation::Url(url) => self.fetch_url(source, url)?,
            FeedLocation::Path(path) => std::fs::read_to_string(path).map_err(|e| {
                AppError::source_unavailable(&source.code, &path.display().to_string(), e)
            })?,
        };
        debug!(region = %source.code, location = %source.location, bytes = body.len(), "feed fetched");
        Ok(body)
    }
}

/// Feeds held in memory, keyed by region code. Regions without an entry are unavailable.
#[derive(Debug, Clone, Default)]
pub struct StaticFeeds {
    feeds: HashMap<String, String>,
}

impl StaticFeeds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, code: &str, body: impl Into<String>) -> Self {
        self.feeds.insert(code.to_string(), body.into());
        self
    }
}

impl FeedSource for StaticFeeds {
    fn fetch(&self, source: &SourceSpec) -> Result<String, AppError> {
        self.feeds.get(&source.code).cloned().ok_or_else(|| {
            AppError::source_unavailable(&source.code, &source.location.to_string(), "no such feed")
        })
    }
}
