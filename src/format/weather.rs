use serde_json::Value;

/// Maps a provider icon code (e.g. "10d", "01n") onto the kiosk icon family.
/// Codes normalize to their day variant; only clear sky keeps a distinct
/// night icon. Unmapped codes get the explicit default.
pub fn icon_family(code: &str) -> &'static str {
    if code.is_empty() {
        return "wi-default";
    }
    let night = code.contains('n');
    match code.replace('n', "d").as_str() {
        "01d" => {
            if night {
                "wi-night"
            } else {
                "wi-sunny"
            }
        }
        "02d" => "wi-partly-cloudy",
        "03d" | "04d" => "wi-cloudy",
        "09d" | "10d" => "wi-rain",
        "11d" => "wi-thunderstorm",
        "13d" => "wi-snow",
        "50d" => "wi-fog",
        _ => "wi-default",
    }
}

pub fn temp_label(value: &Value) -> String {
    match value.as_f64() {
        Some(t) => format!("{}°", t.round() as i64),
        None => super::stringify(value),
    }
}
