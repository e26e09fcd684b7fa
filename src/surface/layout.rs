use crate::config::{FieldConfig, FieldKind, SectionConfig};

use super::TargetSpec;

/// Built-in patch targets per section type. These mirror the fields the
/// stock panels render; config `fields` entries add to them.
pub fn default_targets(kind: &str) -> Vec<TargetSpec> {
    match kind {
        "weather" => vec![
            TargetSpec::text("temp"),
            TargetSpec::text("condition"),
            TargetSpec::text("city"),
            TargetSpec::attribute("icon", "icon"),
        ],
        "rss" => vec![TargetSpec::markup("items")],
        "calendar" => vec![TargetSpec::markup("events")],
        _ => Vec::new(),
    }
}

pub(super) fn declared_targets(section: &SectionConfig) -> Vec<TargetSpec> {
    let mut targets = default_targets(&section.kind);
    for field in &section.fields {
        let spec = field_target(field);
        if !targets.contains(&spec) {
            targets.push(spec);
        }
    }
    targets
}

fn field_target(field: &FieldConfig) -> TargetSpec {
    match field.kind {
        FieldKind::Text => TargetSpec::text(&field.path),
        FieldKind::Markup => TargetSpec::markup(&field.path),
        // Validation guarantees an attr name is present.
        FieldKind::Attr => TargetSpec::attribute(&field.path, field.attr.as_deref().unwrap_or("")),
    }
}
