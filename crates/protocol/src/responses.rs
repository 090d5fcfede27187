//! Bodies returned by the REST endpoints.

use serde::{Deserialize, Serialize};

use crate::validation::WireSchema;

/// Reply to `POST /prompt`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_errors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_info: Option<PromptExecInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptExecInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_remaining: Option<serde_json::Number>,
}

impl PromptResponse {
    pub fn is_accepted(&self) -> bool {
        self.prompt_id.is_some() && self.node_errors.as_ref().map_or(true, Vec::is_empty)
    }
}

impl WireSchema for PromptResponse {
    const NAME: &'static str = "PromptResponse";
}

// ---------------------------------------------------------------------------
// System stats
// ---------------------------------------------------------------------------

/// Reply to `GET /system_stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    pub system: SystemInfo,
    pub devices: Vec<DeviceStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub python_version: String,
    pub embedded_python: bool,
    pub comfyui_version: String,
    pub pytorch_version: String,
    pub argv: Vec<String>,
}

/// Memory figures are byte counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStats {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<serde_json::Number>,
    pub vram_total: serde_json::Number,
    pub vram_free: serde_json::Number,
    pub torch_vram_total: serde_json::Number,
    pub torch_vram_free: serde_json::Number,
}

impl DeviceStats {
    /// Fraction of VRAM in use, when the totals are usable.
    pub fn vram_used_fraction(&self) -> Option<f64> {
        let total = self.vram_total.as_f64()?;
        let free = self.vram_free.as_f64()?;
        (total > 0.0).then(|| (total - free) / total)
    }
}

impl WireSchema for SystemStats {
    const NAME: &'static str = "SystemStats";
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStorage {
    Server,
    Browser,
}

/// Reply to `GET /users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub storage: UserStorage,
    pub migrated: bool,
    pub users: serde_json::Map<String, serde_json::Value>,
}

impl WireSchema for User {
    const NAME: &'static str = "User";
}

/// Reply to a `/userdata` listing: one string row per entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserData(pub Vec<Vec<String>>);

impl WireSchema for UserData {
    const NAME: &'static str = "UserData";
}

/// Reply to `GET /embeddings`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbeddingsResponse(pub Vec<String>);

impl WireSchema for EmbeddingsResponse {
    const NAME: &'static str = "EmbeddingsResponse";
}

/// Reply to `GET /extensions`: script URLs to load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionsResponse(pub Vec<String>);

impl WireSchema for ExtensionsResponse {
    const NAME: &'static str = "ExtensionsResponse";
}
