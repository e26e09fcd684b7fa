use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Kiosk configuration, loaded once at startup and handed to constructors.
/// Nothing re-reads this at runtime.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KioskConfig {
    pub server: ServerConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub slideshow: SlideshowConfig,

    #[serde(default)]
    pub sections: Vec<SectionConfig>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_locale")]
    pub locale: String,

    /// "12h" or "24h".
    #[serde(default = "default_time_format")]
    pub time_format: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SlideshowConfig {
    /// Rotation interval, e.g. "30s" or "2m". Defaults to 30s.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,

    #[serde(default)]
    pub shuffle: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SectionConfig {
    pub id: String,

    /// Section type, e.g. "weather", "rss", "calendar". Selects the built-in
    /// patch targets and the formatter.
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub region: Region,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Server-side refresh interval, e.g. "10m". Carried in the shared
    /// deployment config; the kiosk validates it but does not schedule by it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,

    /// Extra patch targets beyond the type's built-in ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldConfig>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Dotted path into the section's data payload.
    pub path: String,

    #[serde(default)]
    pub kind: FieldKind,

    /// Attribute name, required when `kind` is "attr".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Markup,
    Attr,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    TopLeft,
    TopRight,
    #[default]
    Center,
    BottomLeft,
    BottomRight,
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_time_format() -> String {
    "24h".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            time_format: default_time_format(),
        }
    }
}

impl KioskConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let mut cfg: KioskConfig =
            serde_json::from_slice(&bytes).context("parse config file")?;
        while cfg.server.base_url.ends_with('/') {
            cfg.server.base_url.pop();
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.base_url.is_empty() {
            anyhow::bail!("server.base_url must be set");
        }

        match self.ui.time_format.as_str() {
            "12h" | "24h" => {}
            other => anyhow::bail!("invalid ui.time_format '{}' (expected 12h or 24h)", other),
        }

        if let Some(interval) = &self.slideshow.interval {
            parse_duration(interval)
                .with_context(|| format!("invalid slideshow interval '{}'", interval))?;
        }

        let mut seen = std::collections::HashSet::new();
        for section in &self.sections {
            if section.id.is_empty() {
                anyhow::bail!("section with empty id");
            }
            if !seen.insert(section.id.as_str()) {
                anyhow::bail!("duplicate section id '{}'", section.id);
            }

            if let Some(interval) = &section.interval {
                let duration = parse_duration(interval).with_context(|| {
                    format!("invalid interval '{}' for section '{}'", interval, section.id)
                })?;
                let floor = if section.kind == "weather" {
                    Duration::from_secs(10 * 60)
                } else {
                    Duration::from_secs(60)
                };
                if duration < floor {
                    anyhow::bail!(
                        "interval '{}' for section '{}' is below the {}s floor",
                        interval,
                        section.id,
                        floor.as_secs()
                    );
                }
            }

            for field in &section.fields {
                if field.path.is_empty() {
                    anyhow::bail!("section '{}' declares a field with an empty path", section.id);
                }
                if field.kind == FieldKind::Attr && field.attr.is_none() {
                    anyhow::bail!(
                        "field '{}' in section '{}' has kind attr but no attr name",
                        field.path,
                        section.id
                    );
                }
            }
        }

        Ok(())
    }
}

impl SlideshowConfig {
    pub fn interval(&self) -> Duration {
        self.interval
            .as_deref()
            .and_then(|s| parse_duration(s).ok())
            .unwrap_or(Duration::from_secs(30))
    }
}

impl SectionConfig {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

/// Parses "250ms", "90s", "10m" or "1h".
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| anyhow!("missing unit in duration '{}'", s))?;
    let (digits, unit) = s.split_at(split);
    let n: u64 = digits
        .parse()
        .with_context(|| format!("invalid duration '{}'", s))?;
    match unit {
        "ms" => Ok(Duration::from_millis(n)),
        "s" => Ok(Duration::from_secs(n)),
        "m" => Ok(Duration::from_secs(n * 60)),
        "h" => Ok(Duration::from_secs(n * 3600)),
        _ => Err(anyhow!("unknown duration unit '{}' in '{}'", unit, s)),
    }
}
