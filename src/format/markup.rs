use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::config::UiConfig;

use super::timefmt;

/// Escapes the five HTML-significant characters. Every untrusted substring
/// crossing into a markup fragment goes through here first.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Generic item-list fragment for feed-style arrays: title, link, summary
/// and pub_date keys per item. Used for rss sections and for any array that
/// reaches a markup target without a specialized formatter.
pub fn items_fragment(value: &Value, ui: &UiConfig, now: OffsetDateTime) -> String {
    let Some(items) = value.as_array() else {
        return escape_html(&super::stringify(value));
    };
    if items.is_empty() {
        return r#"<div class="empty">No news</div>"#.to_string();
    }

    let mut out = String::new();
    for item in items {
        out.push_str(r#"<div class="news-item">"#);

        let title = escape_html(str_field(item, "title"));
        let link = str_field(item, "link");
        if link.is_empty() {
            out.push_str(&format!(r#"<div class="news-title">{}</div>"#, title));
        } else {
            out.push_str(&format!(
                r#"<a class="news-title" href="{}">{}</a>"#,
                escape_html(link),
                title
            ));
        }

        let summary = str_field(item, "summary");
        if !summary.is_empty() {
            out.push_str(&format!(
                r#"<div class="news-summary">{}</div>"#,
                escape_html(summary)
            ));
        }

        let pub_date = str_field(item, "pub_date");
        if !pub_date.is_empty() {
            out.push_str(&format!(
                r#"<div class="news-time">{}</div>"#,
                escape_html(&timefmt::relative(pub_date, now, ui))
            ));
        }

        out.push_str("</div>");
    }
    out
}

/// Calendar event fragment: date badge, time (or "All Day"), title,
/// optional location.
pub fn events_fragment(value: &Value, ui: &UiConfig) -> String {
    let Some(events) = value.as_array() else {
        return escape_html(&super::stringify(value));
    };
    if events.is_empty() {
        return r#"<div class="empty">No upcoming events</div>"#.to_string();
    }

    let mut out = String::new();
    for event in events {
        let start = str_field(event, "start");
        let all_day = event.get("all_day").and_then(Value::as_bool).unwrap_or(false);
        let (date, clock) = match OffsetDateTime::parse(start, &Rfc3339) {
            Ok(t) => {
                let clock = if all_day {
                    "All Day".to_string()
                } else {
                    timefmt::clock_time(t, ui)
                };
                (timefmt::month_day(t, ui), clock)
            }
            Err(_) => (escape_html(start), String::new()),
        };

        out.push_str(r#"<div class="event-item">"#);
        out.push_str(&format!(r#"<span class="event-date">{}</span> "#, date));
        if !clock.is_empty() {
            out.push_str(&format!(r#"<span class="event-time">{}</span> "#, clock));
        }
        out.push_str(&format!(
            r#"<span class="event-title">{}</span>"#,
            escape_html(str_field(event, "summary"))
        ));
        let location = str_field(event, "location");
        if !location.is_empty() {
            out.push_str(&format!(
                r#" <span class="event-location">{}</span>"#,
                escape_html(location)
            ));
        }
        out.push_str("</div>");
    }
    out
}

/// Down-renders a fragment to plain text lines for the terminal surface:
/// block elements break lines, tags drop, entities unescape.
pub fn to_lines(fragment: &str) -> Vec<String> {
    let broken = fragment.replace("</div>", "\n").replace("<br>", "\n");

    let mut stripped = String::with_capacity(broken.len());
    let mut in_tag = false;
    for c in broken.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => stripped.push(c),
            _ => {}
        }
    }

    stripped
        .lines()
        .map(|l| unescape(l.trim()))
        .filter(|l| !l.is_empty())
        .collect()
}

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

fn str_field<'a>(item: &'a Value, key: &str) -> &'a str {
    item.get(key).and_then(Value::as_str).unwrap_or("")
}
