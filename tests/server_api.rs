mod common;

use anyhow::{Context, Result};

use wallboard::client::HASH_HEADER;

#[test]
fn server_api_contract() -> Result<()> {
    let server = common::spawn_server(&serde_json::json!({
        "weather": { "data": { "temp": 21, "city": "London" } },
        "news": { "status": { "error": "feed unreachable" } }
    }))?;
    let client = reqwest::blocking::Client::new();

    // Liveness.
    let health = client
        .get(format!("{}/healthz", server.base_url))
        .send()
        .context("healthz")?;
    assert!(health.status().is_success());

    // Full envelope without a token.
    let resp = client
        .get(format!("{}/api/updates", server.base_url))
        .send()
        .context("updates")?;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let envelope: serde_json::Value = resp.json().context("parse envelope")?;
    assert_eq!(envelope.get("status"), Some(&serde_json::json!("ok")));
    let hash = envelope
        .get("hash")
        .and_then(|v| v.as_str())
        .context("hash missing")?
        .to_string();
    assert_eq!(
        envelope.pointer("/updates/weather/data/temp"),
        Some(&serde_json::json!(21))
    );
    assert_eq!(
        envelope.pointer("/updates/news/status/error"),
        Some(&serde_json::json!("feed unreachable"))
    );

    // Matching token short-circuits to 304.
    let resp = client
        .get(format!("{}/api/updates", server.base_url))
        .header(HASH_HEADER, &hash)
        .send()
        .context("updates with token")?;
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_MODIFIED);

    // A stale token re-delivers.
    let resp = client
        .get(format!("{}/api/updates", server.base_url))
        .header(HASH_HEADER, "stale")
        .send()
        .context("updates with stale token")?;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    Ok(())
}

#[test]
fn photo_listing_and_assets() -> Result<()> {
    let server = common::spawn_server(&serde_json::json!({}))?;
    std::fs::create_dir(server.photos_dir.join("album")).unwrap();
    std::fs::write(server.photos_dir.join("kitchen.png"), b"png-bytes").unwrap();
    std::fs::write(server.photos_dir.join("album/sunset.jpg"), b"jpg-bytes").unwrap();
    std::fs::write(server.photos_dir.join("notes.txt"), b"not a photo").unwrap();

    let client = reqwest::blocking::Client::new();

    let listing: serde_json::Value = client
        .get(format!("{}/api/photos", server.base_url))
        .send()
        .context("photos")?
        .error_for_status()
        .context("photos status")?
        .json()
        .context("parse photos")?;
    assert_eq!(
        listing.get("photos"),
        Some(&serde_json::json!(["album/sunset.jpg", "kitchen.png"]))
    );

    // Assets round-trip, url-encoded path included.
    let resp = client
        .get(format!("{}/assets/photos/album%2Fsunset.jpg", server.base_url))
        .send()
        .context("asset")?;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("image/jpeg")
    );
    assert_eq!(resp.bytes().context("asset bytes")?.as_ref(), b"jpg-bytes");

    let missing = client
        .get(format!("{}/assets/photos/missing.jpg", server.base_url))
        .send()
        .context("missing asset")?;
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

    // Traversal out of the photo root is rejected, not served.
    let traversal = client
        .get(format!("{}/assets/photos/..%2Fstate.json", server.base_url))
        .send()
        .context("traversal asset")?;
    assert_eq!(traversal.status(), reqwest::StatusCode::BAD_REQUEST);

    Ok(())
}

#[test]
fn unreadable_state_is_a_server_error() -> Result<()> {
    let server = common::spawn_server(&serde_json::json!({ "weather": { "data": {} } }))?;
    std::fs::write(&server.state_file, b"{ not json").unwrap();

    let resp = reqwest::blocking::Client::new()
        .get(format!("{}/api/updates", server.base_url))
        .send()
        .context("updates")?;
    assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);

    Ok(())
}
