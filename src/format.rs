mod markup;
mod timefmt;
mod weather;

pub use self::markup::{escape_html, events_fragment, items_fragment, to_lines};
pub use self::timefmt::{clock_time, long_date, month_day, relative};
pub use self::weather::{icon_family, temp_label};

use serde_json::Value;
use time::OffsetDateTime;

use crate::config::UiConfig;
use crate::surface::{PatchValue, TargetSpec, ValueKind};

/// Renders a raw payload leaf for a target, through the formatter selected by
/// the section's declared type. Unknown types and paths fall through to the
/// plain stringify rule.
pub fn render_value(
    section_kind: &str,
    target: &TargetSpec,
    raw: &Value,
    ui: &UiConfig,
    now: OffsetDateTime,
) -> PatchValue {
    match &target.kind {
        ValueKind::Text => PatchValue::Text(scalar(section_kind, &target.path, raw)),
        ValueKind::Attribute(name) => PatchValue::Attribute {
            name: name.clone(),
            value: scalar(section_kind, &target.path, raw),
        },
        ValueKind::Markup => {
            let fragment = match section_kind {
                "calendar" => events_fragment(raw, ui),
                _ => items_fragment(raw, ui, now),
            };
            PatchValue::Markup(fragment)
        }
    }
}

fn scalar(section_kind: &str, path: &str, raw: &Value) -> String {
    if section_kind == "weather" {
        match path {
            "temp" => return temp_label(raw),
            "icon" => return icon_family(raw.as_str().unwrap_or("")).to_string(),
            _ => {}
        }
    }
    stringify(raw)
}

/// The one stringify rule for scalar writes: strings verbatim, numbers and
/// bools via Display, null as empty, anything structured as compact JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
