use anyhow::Result;

use crate::config::KioskConfig;

mod app;
mod clock;
mod render;
mod slideshow;

/// Runs the full-screen kiosk until `q`/`Esc`. Requires a TTY.
pub fn run(cfg: KioskConfig) -> Result<()> {
    app::run(cfg)
}
