use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One successful `/api/updates` response: the server's cache token plus the
/// current result for every section it knows about.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateEnvelope {
    pub hash: String,

    #[serde(default)]
    pub updates: BTreeMap<String, SectionResult>,
}

/// Per-section outcome for one poll. Exactly one of `status.error` / `data`
/// is meaningful: an error means this cycle carries nothing to apply and the
/// previous render stays up.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SectionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SectionStatus>,

    /// Schemaless payload; the reconciler flattens it into dotted paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SectionStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SectionResult {
    pub fn error(&self) -> Option<&str> {
        self.status.as_ref()?.error.as_deref()
    }
}
