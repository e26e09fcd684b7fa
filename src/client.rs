mod backoff;
mod fetch;
mod photos;
mod poll;

pub use self::backoff::Backoff;
pub use self::fetch::{FetchOutcome, FetchUpdates, HASH_HEADER, UpdateFetcher};
pub use self::photos::fetch_photos;
pub use self::poll::{CycleOutcome, PollState, Poller};
