use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a successful `/authenticate` call.
///
/// The `Debug` implementation redacts `secret_access_key` to prevent
/// accidental leakage in logs.
#[derive(Clone, Deserialize)]
pub(crate) struct AuthResponse {
    pub id: String,
    pub secret_access_key: String,
    pub expiry_date: String,
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("id", &self.id)
            .field("secret_access_key", &"****")
            .field("expiry_date", &self.expiry_date)
            .finish()
    }
}

/// Metadata subset carried on a sequence revision.
///
/// The annotation/audio/highlight/marker payloads are opaque to this
/// client and round-trip as raw JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevisionMeta {
    #[serde(default)]
    pub movie_asset_id: i64,
    #[serde(default)]
    pub audio_asset_id: i64,
    #[serde(default)]
    pub annotations: Value,
    #[serde(default)]
    pub audio_timings: Value,
    #[serde(default)]
    pub highlights: Value,
    #[serde(default)]
    pub markers: Value,
}

/// A sequence revision as returned by the tracking service.
///
/// Only the fields this client reads are typed; everything else the
/// service sends is preserved in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceRevision {
    #[serde(default)]
    pub revision: Option<i64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub imported: Option<bool>,
    #[serde(default)]
    pub meta_data: Option<RevisionMeta>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A storyboard panel belonging to a sequence revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Panel {
    pub panel_id: i64,
    #[serde(default)]
    pub revision_number: i64,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A dialogue attached to a revision or panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dialogue {
    #[serde(default)]
    pub dialogue_id: Option<i64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Envelope around the panel list endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct PanelsEnvelope {
    pub panels: Vec<Panel>,
}

/// Envelope around the dialogue list endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct DialoguesEnvelope {
    pub dialogues: Vec<Dialogue>,
}
