use std::sync::mpsc;
use std::time::{Duration, Instant};

use crate::config::SlideshowConfig;

/// Slideshow state: the photo listing arrives once from a background fetch,
/// then rotation runs on the configured interval. A terminal surface shows
/// the current photo's name and position rather than pixels.
pub(super) struct Slideshow {
    photos: Vec<String>,
    index: usize,
    interval: Duration,
    shuffle: bool,
    last_advance: Instant,
    rx: Option<mpsc::Receiver<Vec<String>>>,
}

impl Slideshow {
    pub(super) fn new(cfg: &SlideshowConfig, rx: mpsc::Receiver<Vec<String>>) -> Self {
        Self {
            photos: Vec::new(),
            index: 0,
            interval: cfg.interval(),
            shuffle: cfg.shuffle,
            last_advance: Instant::now(),
            rx: Some(rx),
        }
    }

    pub(super) fn tick(&mut self) {
        if let Some(rx) = &self.rx {
            match rx.try_recv() {
                Ok(mut photos) => {
                    if self.shuffle {
                        shuffle(&mut photos);
                    }
                    self.photos = photos;
                    self.index = 0;
                    self.last_advance = Instant::now();
                    self.rx = None;
                    // First photo gets a full interval on screen.
                    return;
                }
                Err(mpsc::TryRecvError::Disconnected) => self.rx = None,
                Err(mpsc::TryRecvError::Empty) => {}
            }
        }

        if self.photos.len() > 1 && self.last_advance.elapsed() >= self.interval {
            self.index = (self.index + 1) % self.photos.len();
            self.last_advance = Instant::now();
        }
    }

    /// (1-based position, total, path) of the current photo.
    pub(super) fn current(&self) -> Option<(usize, usize, &str)> {
        self.photos
            .get(self.index)
            .map(|p| (self.index + 1, self.photos.len(), p.as_str()))
    }
}

fn shuffle(photos: &mut [String]) {
    let mut buf = [0u8; 8];
    for i in (1..photos.len()).rev() {
        if getrandom::getrandom(&mut buf).is_err() {
            return;
        }
        let j = (u64::from_le_bytes(buf) % (i as u64 + 1)) as usize;
        photos.swap(i, j);
    }
}
