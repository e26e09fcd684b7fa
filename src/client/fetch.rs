use std::time::Duration;

use anyhow::{Context, Result};

use crate::model::UpdateEnvelope;

/// Cache-validation header carrying the last-seen token.
pub const HASH_HEADER: &str = "X-Dashboard-Hash";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of one conditional exchange. Failures are `Err` on the call
/// itself: transport errors, non-success statuses and unparseable bodies all
/// drive backoff identically.
#[derive(Clone, Debug)]
pub enum FetchOutcome {
    NotModified,
    Updated(UpdateEnvelope),
}

/// Seam between the poll loop and the network; lets the loop run against a
/// scripted fetcher in tests.
pub trait FetchUpdates {
    fn fetch_updates(&self, token: &str) -> Result<FetchOutcome>;
}

pub struct UpdateFetcher {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl UpdateFetcher {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("wallboard")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("build http client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl FetchUpdates for UpdateFetcher {
    /// One idempotent GET. No retries here; retry policy lives in the poll
    /// loop and backoff controller.
    fn fetch_updates(&self, token: &str) -> Result<FetchOutcome> {
        let mut req = self.client.get(format!("{}/api/updates", self.base_url));
        if !token.is_empty() {
            req = req.header(HASH_HEADER, token);
        }

        let resp = req.send().context("updates request")?;
        if resp.status() == reqwest::StatusCode::NOT_MODIFIED {
            return Ok(FetchOutcome::NotModified);
        }

        let resp = resp.error_for_status().context("updates status")?;
        let envelope: UpdateEnvelope = resp.json().context("parse update envelope")?;
        Ok(FetchOutcome::Updated(envelope))
    }
}
