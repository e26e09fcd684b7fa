use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use time::OffsetDateTime;
use tracing::warn;

use crate::config::UiConfig;
use crate::format;
use crate::model::SectionResult;
use crate::surface::{Surface, TargetSpec, ValueKind};

use super::flatten;

/// Applies update payloads to the display port with unchanged-value
/// suppression: a target is rewritten (and flashed) only when its raw leaf
/// value differs from the last one applied to it.
pub struct Reconciler {
    ui: UiConfig,
    applied: HashMap<(String, String), Value>,
}

impl Reconciler {
    pub fn new(ui: UiConfig) -> Self {
        Self {
            ui,
            applied: HashMap::new(),
        }
    }

    pub fn reconcile(
        &mut self,
        surface: &mut dyn Surface,
        sections: &BTreeMap<String, SectionResult>,
    ) {
        let now = OffsetDateTime::now_utc();

        for (id, result) in sections {
            // Layouts may legitimately omit sections the server reports.
            let Some(kind) = surface.section_kind(id) else {
                continue;
            };

            if let Some(error) = result.error() {
                warn!(section = %id, error, "section reported an error; keeping previous render");
                continue;
            }
            let Some(data) = result.data.as_ref() else {
                continue;
            };

            let flat = flatten(data);
            let leaves: HashMap<&str, &Value> =
                flat.iter().map(|(path, value)| (path.as_str(), *value)).collect();

            for target in surface.targets(id) {
                let Some(&value) = leaves.get(target.path.as_str()) else {
                    continue;
                };

                let key = (id.clone(), cache_key(&target));
                if self.applied.get(&key) == Some(value) {
                    continue;
                }
                self.applied.insert(key, value.clone());

                let rendered = format::render_value(&kind, &target, value, &self.ui, now);
                surface.apply(id, &target.path, rendered);
                surface.flash(id, &target.path);
            }
        }
    }
}

fn cache_key(target: &TargetSpec) -> String {
    match &target.kind {
        ValueKind::Text => format!("text:{}", target.path),
        ValueKind::Markup => format!("markup:{}", target.path),
        ValueKind::Attribute(name) => format!("attr:{}:{}", name, target.path),
    }
}
