use std::io::{self, IsTerminal};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use time::UtcOffset;
use tracing::warn;

use crate::client::{Poller, UpdateFetcher, fetch_photos};
use crate::config::KioskConfig;
use crate::patch::Reconciler;
use crate::surface::PanelGrid;

use super::clock::WallClock;
use super::render;
use super::slideshow::Slideshow;

pub(super) struct App {
    pub(super) grid: Arc<Mutex<PanelGrid>>,
    pub(super) clock: WallClock,
    pub(super) slideshow: Slideshow,
    quit: bool,
}

pub(super) fn run(cfg: KioskConfig) -> Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        anyhow::bail!("kiosk requires an interactive terminal (TTY)");
    }

    // Local offset must be resolved while the process is still
    // single-threaded.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    let grid = Arc::new(Mutex::new(PanelGrid::from_config(&cfg.sections)));
    spawn_poller(&cfg, grid.clone())?;

    let (photos_tx, photos_rx) = mpsc::channel();
    spawn_photo_fetch(&cfg, photos_tx);

    let mut app = App {
        grid,
        clock: WallClock::new(offset, cfg.ui.clone()),
        slideshow: Slideshow::new(&cfg.slideshow, photos_rx),
        quit: false,
    };

    let mut stdout = io::stdout();
    enable_raw_mode().context("enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let res = run_loop(&mut terminal, &mut app);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res
}

/// One dedicated poller thread serializes all poll cycles; the renderer and
/// the reconciler only share the panel grid, under its mutex.
fn spawn_poller(cfg: &KioskConfig, grid: Arc<Mutex<PanelGrid>>) -> Result<()> {
    let fetcher = UpdateFetcher::new(&cfg.server.base_url)?;
    let mut reconciler = Reconciler::new(cfg.ui.clone());

    thread::Builder::new()
        .name("poller".to_string())
        .spawn(move || {
            Poller::new(fetcher).run(move |sections| {
                let mut grid = grid.lock().map_err(|_| anyhow!("display lock poisoned"))?;
                reconciler.reconcile(&mut *grid, sections);
                Ok(())
            })
        })
        .context("spawn poller thread")?;
    Ok(())
}

fn spawn_photo_fetch(cfg: &KioskConfig, tx: mpsc::Sender<Vec<String>>) {
    let base_url = cfg.server.base_url.clone();
    thread::spawn(move || match fetch_photos(&base_url) {
        Ok(photos) => {
            tx.send(photos).ok();
        }
        Err(err) => warn!("slideshow stays empty: {:#}", err),
    });
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.slideshow.tick();

        terminal.draw(|f| render::draw(f, app)).context("draw")?;
        if app.quit {
            return Ok(());
        }

        if event::poll(Duration::from_millis(250)).context("poll")? {
            match event::read().context("read event")? {
                Event::Key(k) if k.kind == KeyEventKind::Press => match k.code {
                    KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
                    _ => {}
                },
                _ => {}
            }
        }
    }
}
