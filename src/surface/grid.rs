use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::config::{Region, SectionConfig};

use super::{PatchValue, Surface, TargetSpec};

/// How long a just-changed target keeps its flash marker.
pub const FLASH_WINDOW: Duration = Duration::from_millis(1500);

/// In-memory display surface: one panel per configured section, laid out in
/// the five screen regions. Backs both the kiosk renderer and the tests.
pub struct PanelGrid {
    panels: BTreeMap<String, Panel>,
}

pub struct Panel {
    pub kind: String,
    pub region: Region,
    pub title: String,
    targets: Vec<TargetState>,
}

pub struct TargetState {
    pub spec: TargetSpec,
    text: Option<String>,
    markup: Option<String>,
    attrs: BTreeMap<String, String>,
    flashed_at: Option<Instant>,
}

impl PanelGrid {
    pub fn from_config(sections: &[SectionConfig]) -> Self {
        let panels = sections
            .iter()
            .map(|section| {
                let targets = super::layout::declared_targets(section)
                    .into_iter()
                    .map(TargetState::new)
                    .collect();
                let panel = Panel {
                    kind: section.kind.clone(),
                    region: section.region,
                    title: section.title().to_string(),
                    targets,
                };
                (section.id.clone(), panel)
            })
            .collect();
        Self { panels }
    }

    pub fn panels(&self) -> impl Iterator<Item = (&str, &Panel)> {
        self.panels.iter().map(|(id, p)| (id.as_str(), p))
    }

    pub fn panel(&self, id: &str) -> Option<&Panel> {
        self.panels.get(id)
    }

    pub fn target(&self, id: &str, path: &str) -> Option<&TargetState> {
        self.panels.get(id)?.targets.iter().find(|t| t.spec.path == path)
    }

    fn target_mut(&mut self, id: &str, path: &str) -> Option<&mut TargetState> {
        self.panels
            .get_mut(id)?
            .targets
            .iter_mut()
            .find(|t| t.spec.path == path)
    }
}

impl Surface for PanelGrid {
    fn section_kind(&self, id: &str) -> Option<String> {
        self.panels.get(id).map(|p| p.kind.clone())
    }

    fn targets(&self, id: &str) -> Vec<TargetSpec> {
        self.panels
            .get(id)
            .map(|p| p.targets.iter().map(|t| t.spec.clone()).collect())
            .unwrap_or_default()
    }

    fn apply(&mut self, id: &str, path: &str, value: PatchValue) {
        let Some(target) = self.target_mut(id, path) else {
            return;
        };
        match value {
            PatchValue::Text(s) => target.text = Some(s),
            PatchValue::Markup(s) => target.markup = Some(s),
            PatchValue::Attribute { name, value } => {
                target.attrs.insert(name, value);
            }
        }
    }

    fn flash(&mut self, id: &str, path: &str) {
        if let Some(target) = self.target_mut(id, path) {
            target.flashed_at = Some(Instant::now());
        }
    }
}

impl Panel {
    pub fn targets(&self) -> &[TargetState] {
        &self.targets
    }
}

impl TargetState {
    fn new(spec: TargetSpec) -> Self {
        Self {
            spec,
            text: None,
            markup: None,
            attrs: BTreeMap::new(),
            flashed_at: None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn markup(&self) -> Option<&str> {
        self.markup.as_deref()
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn flashed_at(&self) -> Option<Instant> {
        self.flashed_at
    }

    pub fn is_flashing(&self, now: Instant) -> bool {
        self.flashed_at
            .is_some_and(|at| now.duration_since(at) < FLASH_WINDOW)
    }
}
