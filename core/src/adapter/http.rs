//! JSON-over-HTTP data source with request memoisation and rate limiting.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

use super::cache::{RequestSignature, ResponseCache};
use super::rate_limit::RateLimiter;
use super::{refine, DataSource};
use crate::error::{FetchError, FetchFailure};
use crate::state::{Entity, Filters};

const BODY_PREVIEW_LIMIT: usize = 512;
const HEADER_REMAINING: &str = "x-ratelimit-remaining";
const HEADER_RESET: &str = "x-ratelimit-reset";

/// A GET request relative to a source's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl RemoteRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn signature(&self) -> RequestSignature {
        RequestSignature::new(&self.path, &self.query)
    }
}

/// Describes one remote API: how to ask it and how to read its answers.
pub trait RemoteCatalog: Send + Sync + 'static {
    type Entity: Entity;

    fn name(&self) -> &str;

    fn search_request(
        &self,
        query: &str,
        filters: &Filters<<Self::Entity as Entity>::FilterKey>,
    ) -> RemoteRequest;

    fn by_id_request(&self, id: &<Self::Entity as Entity>::Id) -> RemoteRequest;

    fn parse_search(&self, body: &Value) -> Result<Vec<Self::Entity>, String>;

    fn parse_one(&self, body: &Value) -> Result<Option<Self::Entity>, String>;
}

pub struct HttpSource<C> {
    catalog: C,
    http: reqwest::Client,
    base_url: String,
    cache: ResponseCache,
    limiter: Option<RateLimiter>,
}

impl<C: RemoteCatalog> HttpSource<C> {
    pub fn new(catalog: C, base_url: &str, timeout_ms: u64) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            catalog,
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: ResponseCache::new(),
            limiter: None,
        })
    }

    pub fn with_rate_limit(mut self, limiter: RateLimiter) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn rate_limiter(&self) -> Option<&RateLimiter> {
        self.limiter.as_ref()
    }

    /// Fetches and decodes a JSON body. `Ok(None)` only when `allow_missing`
    /// and the server answered 404.
    async fn fetch_json(
        &self,
        req: &RemoteRequest,
        allow_missing: bool,
    ) -> Result<Option<Value>, FetchError> {
        let sig = req.signature();
        if let Some(body) = self.cache.get(&sig) {
            tracing::debug!(target: "pagestate.adapter", source = self.catalog.name(), request = %sig, "cache hit");
            return Ok(Some(body));
        }
        if let Some(limiter) = &self.limiter {
            limiter.acquire()?;
        }

        let url = format!("{}{}", self.base_url, req.path);
        tracing::debug!(
            target: "pagestate.adapter",
            stage = "http.get.in",
            source = self.catalog.name(),
            url = %url,
            params = req.query.len()
        );
        let resp = self
            .http
            .get(&url)
            .query(&req.query)
            .send()
            .await
            .map_err(|err| FetchFailure::from_reqwest(err, url.clone()))?;
        let status = resp.status();
        if let Some(limiter) = &self.limiter {
            let (remaining, reset_at) = rate_limit_headers(resp.headers());
            limiter.observe(remaining, reset_at);
        }
        let resp_url = resp.url().to_string();
        let body = resp
            .text()
            .await
            .map_err(|err| FetchFailure::from_reqwest(err, resp_url.clone()))?;
        tracing::debug!(target: "pagestate.adapter", stage = "http.get.out", status = %status);

        if status == StatusCode::NOT_FOUND && allow_missing {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(
                FetchFailure::status_error(status.as_u16(), resp_url, preview_body(&body)).into(),
            );
        }
        let value = serde_json::from_str::<Value>(&body).map_err(|err| {
            FetchFailure::decode_error(status.as_u16(), resp_url.clone(), err, preview_body(&body))
        })?;
        self.cache.insert(sig, value.clone());
        Ok(Some(value))
    }

    fn shape_error(&self, req: &RemoteRequest, detail: String) -> FetchError {
        FetchFailure::decode_error(
            200,
            format!("{}{}", self.base_url, req.path),
            detail,
            String::new(),
        )
        .into()
    }
}

#[async_trait]
impl<C: RemoteCatalog> DataSource<C::Entity> for HttpSource<C> {
    fn name(&self) -> &str {
        self.catalog.name()
    }

    async fn search(
        &self,
        query: &str,
        filters: &Filters<<C::Entity as Entity>::FilterKey>,
    ) -> Result<Vec<C::Entity>, FetchError> {
        let req = self.catalog.search_request(query, filters);
        let Some(body) = self.fetch_json(&req, false).await? else {
            return Ok(Vec::new());
        };
        let items = self
            .catalog
            .parse_search(&body)
            .map_err(|detail| self.shape_error(&req, detail))?;
        Ok(refine(items, query, filters))
    }

    async fn get_by_id(
        &self,
        id: &<C::Entity as Entity>::Id,
    ) -> Result<Option<C::Entity>, FetchError> {
        let req = self.catalog.by_id_request(id);
        let Some(body) = self.fetch_json(&req, true).await? else {
            return Ok(None);
        };
        self.catalog
            .parse_one(&body)
            .map_err(|detail| self.shape_error(&req, detail))
    }
}

fn rate_limit_headers(headers: &HeaderMap) -> (Option<u32>, Option<DateTime<Utc>>) {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .and_then(|v| v.parse::<i64>().ok())
    };
    let remaining = read(HEADER_REMAINING).and_then(|v| u32::try_from(v).ok());
    let reset_at = read(HEADER_RESET).and_then(|secs| Utc.timestamp_opt(secs, 0).single());
    (remaining, reset_at)
}

fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out = String::new();
    let mut truncated = false;
    for (idx, ch) in trimmed.chars().enumerate() {
        if idx >= BODY_PREVIEW_LIMIT {
            truncated = true;
            break;
        }
        out.push(ch);
    }

    if truncated {
        out.push_str("...");
    }

    out
}
