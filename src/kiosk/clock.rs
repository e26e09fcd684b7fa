use time::{OffsetDateTime, UtcOffset};

use crate::config::UiConfig;
use crate::format;

/// Wall clock for the center panel. The UTC offset is fixed at startup.
pub(super) struct WallClock {
    offset: UtcOffset,
    ui: UiConfig,
}

impl WallClock {
    pub(super) fn new(offset: UtcOffset, ui: UiConfig) -> Self {
        Self { offset, ui }
    }

    pub(super) fn time_line(&self) -> String {
        format::clock_time(self.now(), &self.ui)
    }

    pub(super) fn date_line(&self) -> String {
        format::long_date(self.now(), &self.ui)
    }

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }
}
