use anyhow::{Context, Result};
use tracing::warn;

use crate::model::PhotoList;

use super::backoff::Backoff;

const ATTEMPTS: usize = 3;

/// Fetches the slideshow photo listing. Unlike the update poll this is a
/// one-shot startup call, so a short retry ladder lives here.
pub fn fetch_photos(base_url: &str) -> Result<Vec<String>> {
    let client = reqwest::blocking::Client::builder()
        .user_agent("wallboard")
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .context("build http client")?;
    let url = format!("{}/api/photos", base_url.trim_end_matches('/'));

    let mut backoff = Backoff::new();
    let mut last = None;
    for attempt in 0..ATTEMPTS {
        match try_fetch(&client, &url) {
            Ok(list) => return Ok(list.photos),
            Err(err) => {
                warn!(attempt, "photo listing failed: {:#}", err);
                last = Some(err);
                if attempt + 1 < ATTEMPTS {
                    std::thread::sleep(backoff.on_failure());
                }
            }
        }
    }
    Err(last
        .unwrap_or_else(|| anyhow::anyhow!("unknown error"))
        .context("fetch photo listing"))
}

fn try_fetch(client: &reqwest::blocking::Client, url: &str) -> Result<PhotoList> {
    client
        .get(url)
        .send()
        .context("photos request")?
        .error_for_status()
        .context("photos status")?
        .json()
        .context("parse photo listing")
}
