use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, warn};

use crate::model::SectionResult;

use super::backoff::Backoff;
use super::fetch::{FetchOutcome, FetchUpdates};

/// Named states of the poll loop. The loop is never terminal; `BackingOff`
/// covers the sleep between a failed cycle and the next attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Awaiting,
    Applying,
    BackingOff,
}

/// What one cycle did, and how long to sleep before the next one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    Applied { token: String },
    NotModified,
    Failed { delay: Duration },
}

/// The poll loop: sole owner of the cache token and the backoff state.
/// One cycle at a time: a new poll never starts until the previous cycle,
/// including any backoff sleep, has fully completed.
pub struct Poller<F> {
    fetcher: F,
    token: String,
    backoff: Backoff,
    state: PollState,
}

impl<F: FetchUpdates> Poller<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            token: String::new(),
            backoff: Backoff::new(),
            state: PollState::Idle,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Runs one full poll cycle minus the sleep. `apply` reconciles a fresh
    /// envelope into the display; an apply error is logged and the cycle
    /// still counts as a success (the exchange itself worked), with the
    /// token advancing past the attempted payload.
    pub fn cycle(
        &mut self,
        apply: &mut dyn FnMut(&BTreeMap<String, SectionResult>) -> Result<()>,
    ) -> CycleOutcome {
        self.state = PollState::Awaiting;

        match self.fetcher.fetch_updates(&self.token) {
            Ok(FetchOutcome::NotModified) => {
                debug!("not modified");
                self.backoff.on_success();
                self.state = PollState::Idle;
                CycleOutcome::NotModified
            }
            Ok(FetchOutcome::Updated(envelope)) => {
                self.state = PollState::Applying;
                if let Err(err) = apply(&envelope.updates) {
                    warn!("apply failed: {:#}", err);
                }
                self.token = envelope.hash;
                self.backoff.on_success();
                self.state = PollState::Idle;
                debug!(token = %self.token, "applied update");
                CycleOutcome::Applied {
                    token: self.token.clone(),
                }
            }
            Err(err) => {
                warn!("poll failed: {:#}", err);
                self.state = PollState::BackingOff;
                let delay = self.backoff.on_failure();
                CycleOutcome::Failed { delay }
            }
        }
    }

    /// Polls forever. A NotModified cycle loops immediately; the server's
    /// own response latency is the pacing mechanism.
    pub fn run(
        mut self,
        mut apply: impl FnMut(&BTreeMap<String, SectionResult>) -> Result<()>,
    ) -> ! {
        loop {
            if let CycleOutcome::Failed { delay } = self.cycle(&mut apply) {
                std::thread::sleep(delay);
                self.state = PollState::Idle;
            }
        }
    }
}
