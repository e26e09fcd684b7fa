use time::format_description::well_known::Rfc3339;
use time::{Month, OffsetDateTime, Weekday};

use crate::config::UiConfig;

/// Relative rendering for feed timestamps: "Nm ago" under an hour,
/// "Nh ago" under a day, a clock time beyond that. Unparseable input is
/// returned unchanged.
pub fn relative(ts: &str, now: OffsetDateTime, ui: &UiConfig) -> String {
    let Ok(t) = OffsetDateTime::parse(ts, &Rfc3339) else {
        return ts.to_string();
    };
    let minutes = (now - t).whole_minutes().max(0);
    if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 24 * 60 {
        format!("{}h ago", minutes / 60)
    } else {
        clock_time(t, ui)
    }
}

pub fn clock_time(t: OffsetDateTime, ui: &UiConfig) -> String {
    let minute = t.minute();
    if ui.time_format == "12h" {
        let hour = t.hour();
        let (h12, meridiem) = match hour {
            0 => (12, "AM"),
            1..=11 => (hour, "AM"),
            12 => (12, "PM"),
            _ => (hour - 12, "PM"),
        };
        format!("{}:{:02} {}", h12, minute, meridiem)
    } else {
        format!("{:02}:{:02}", t.hour(), minute)
    }
}

/// "Mar 5" or "5 Mar", depending on the locale's month-day order.
pub fn month_day(t: OffsetDateTime, ui: &UiConfig) -> String {
    if month_first(&ui.locale) {
        format!("{} {}", month_abbrev(t.month()), t.day())
    } else {
        format!("{} {}", t.day(), month_abbrev(t.month()))
    }
}

/// Full date line for the clock panel, e.g. "Thursday, March 5".
pub fn long_date(t: OffsetDateTime, ui: &UiConfig) -> String {
    let weekday = weekday_name(t.weekday());
    if month_first(&ui.locale) {
        format!("{}, {} {}", weekday, t.month(), t.day())
    } else {
        format!("{}, {} {}", weekday, t.day(), t.month())
    }
}

fn month_first(locale: &str) -> bool {
    locale.starts_with("en-US") || locale.starts_with("en_US")
}

fn month_abbrev(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "Monday",
        Weekday::Tuesday => "Tuesday",
        Weekday::Wednesday => "Wednesday",
        Weekday::Thursday => "Thursday",
        Weekday::Friday => "Friday",
        Weekday::Saturday => "Saturday",
        Weekday::Sunday => "Sunday",
    }
}

#[cfg(test)]
mod timefmt_tests {
    use super::*;

    fn ui(locale: &str, time_format: &str) -> UiConfig {
        UiConfig {
            locale: locale.to_string(),
            time_format: time_format.to_string(),
        }
    }

    fn at(ts: &str) -> OffsetDateTime {
        OffsetDateTime::parse(ts, &Rfc3339).unwrap()
    }

    #[test]
    fn relative_buckets() {
        let now = at("2026-03-05T12:00:00Z");
        let ui = ui("en-US", "24h");
        assert_eq!(relative("2026-03-05T11:01:00Z", now, &ui), "59m ago");
        assert_eq!(relative("2026-03-05T10:59:00Z", now, &ui), "1h ago");
        assert_eq!(relative("2026-03-04T13:00:00Z", now, &ui), "23h ago");
        assert_eq!(relative("2026-03-04T11:00:00Z", now, &ui), "11:00");
        assert_eq!(relative("not-a-date", now, &ui), "not-a-date");
    }

    #[test]
    fn future_timestamps_clamp_to_zero() {
        let now = at("2026-03-05T12:00:00Z");
        assert_eq!(
            relative("2026-03-05T12:05:00Z", now, &ui("en-US", "24h")),
            "0m ago"
        );
    }

    #[test]
    fn twelve_hour_clock() {
        let ui12 = ui("en-US", "12h");
        assert_eq!(clock_time(at("2026-03-05T00:05:00Z"), &ui12), "12:05 AM");
        assert_eq!(clock_time(at("2026-03-05T09:41:00Z"), &ui12), "9:41 AM");
        assert_eq!(clock_time(at("2026-03-05T12:30:00Z"), &ui12), "12:30 PM");
        assert_eq!(clock_time(at("2026-03-05T17:03:00Z"), &ui12), "5:03 PM");
        assert_eq!(clock_time(at("2026-03-05T17:03:00Z"), &ui("x", "24h")), "17:03");
    }

    #[test]
    fn locale_picks_month_day_order() {
        let t = at("2026-03-05T12:00:00Z");
        assert_eq!(month_day(t, &ui("en-US", "24h")), "Mar 5");
        assert_eq!(month_day(t, &ui("en-GB", "24h")), "5 Mar");
        assert_eq!(long_date(t, &ui("en-US", "24h")), "Thursday, March 5");
        assert_eq!(long_date(t, &ui("de-DE", "24h")), "Thursday, 5 March");
    }
}
