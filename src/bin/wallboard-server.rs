use std::collections::BTreeMap;
use std::path::{Component, Path as FsPath, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use wallboard::client::HASH_HEADER;

/// Development counterpart of the dashboard protocol: replays a JSON state
/// file as `/api/updates` and serves a photo directory. Data production
/// belongs to a real deployment; this exists for kiosk development and the
/// integration tests.
#[derive(Parser)]
#[command(name = "wallboard-server")]
#[command(about = "Development dashboard server", long_about = None)]
struct Args {
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: String,

    /// Write the bound address to this file once listening
    #[arg(long, value_name = "PATH")]
    addr_file: Option<PathBuf>,

    /// JSON file holding the section-results map
    #[arg(long, value_name = "PATH")]
    state_file: PathBuf,

    #[arg(long, value_name = "DIR")]
    photos_dir: Option<PathBuf>,
}

#[derive(Clone)]
struct AppState {
    state_file: PathBuf,
    photos_dir: Option<PathBuf>,
    photo_globs: Arc<GlobSet>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let state = AppState {
        state_file: args.state_file,
        photos_dir: args.photos_dir,
        photo_globs: Arc::new(image_globs()?),
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/updates", get(updates))
        .route("/api/photos", get(photos))
        .route("/assets/photos/*path", get(asset))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("bind {}", args.addr))?;
    let local = listener.local_addr().context("local addr")?;
    if let Some(path) = &args.addr_file {
        std::fs::write(path, local.to_string()).context("write addr file")?;
    }
    tracing::info!(%local, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await
        .context("serve")?;
    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

/// The conditional exchange: hash of the canonical state vs the client's
/// `X-Dashboard-Hash`. An unchanged state file always yields 304 for a
/// current client.
async fn updates(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let updates = match read_state(&state.state_file) {
        Ok(updates) => updates,
        Err(err) => return internal_error(err),
    };
    let hash = state_hash(&updates);

    let client_hash = headers
        .get(HASH_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if client_hash == hash {
        return StatusCode::NOT_MODIFIED.into_response();
    }

    Json(serde_json::json!({
        "status": "ok",
        "hash": hash,
        "updates": updates,
    }))
    .into_response()
}

async fn photos(State(state): State<AppState>) -> Response {
    let Some(root) = &state.photos_dir else {
        return Json(serde_json::json!({ "photos": [] })).into_response();
    };
    match scan_photos(root, &state.photo_globs) {
        Ok(photos) => Json(serde_json::json!({ "photos": photos })).into_response(),
        Err(err) => internal_error(err),
    }
}

async fn asset(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    let Some(root) = &state.photos_dir else {
        return (StatusCode::NOT_FOUND, "no photos directory").into_response();
    };
    if !is_safe_rel(FsPath::new(&path)) {
        return (StatusCode::BAD_REQUEST, "invalid path").into_response();
    }

    let full = root.join(&path);
    match std::fs::read(&full) {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, content_type(&full)),
                (header::CACHE_CONTROL, "no-store"),
            ],
            bytes,
        )
            .into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}

fn read_state(path: &FsPath) -> Result<BTreeMap<String, serde_json::Value>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read state file {}", path.display()))?;
    serde_json::from_slice(&bytes).context("parse state file")
}

/// BLAKE3 over the canonical (sorted-key) JSON of the updates map.
fn state_hash(updates: &BTreeMap<String, serde_json::Value>) -> String {
    let canonical = serde_json::to_string(updates).unwrap_or_default();
    blake3::hash(canonical.as_bytes()).to_hex().to_string()
}

fn image_globs() -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in ["*.jpg", "*.jpeg", "*.png", "*.gif", "*.webp"] {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .with_context(|| format!("bad photo glob '{}'", pattern))?;
        builder.add(glob);
    }
    builder.build().context("build photo glob set")
}

fn scan_photos(root: &FsPath, globs: &GlobSet) -> Result<Vec<String>> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let entries =
            std::fs::read_dir(&dir).with_context(|| format!("read dir {}", dir.display()))?;
        for entry in entries {
            let entry = entry.context("read dir entry")?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            let Ok(rel) = path.strip_prefix(root) else {
                continue;
            };
            if globs.is_match(rel) {
                out.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    out.sort();
    Ok(out)
}

fn is_safe_rel(path: &FsPath) -> bool {
    !path.is_absolute()
        && !path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
}

fn content_type(path: &FsPath) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn internal_error(err: anyhow::Error) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", err)).into_response()
}
