//! ComfyUI WebSocket message types and parser.
//!
//! ComfyUI sends JSON messages over WebSocket with the shape
//! `{"type": "<kind>", "data": {...}}`. This module deserializes them
//! into a strongly-typed [`ComfyUIMessage`] enum.

use comfywire_core::error::SchemaError;
use comfywire_core::types::{NodeId, PromptId};
use serde::{Deserialize, Serialize};

use crate::execution::{
    ExecutionCachedData, ExecutionErrorData, ExecutionEvent, ExecutionInterruptedData,
    ExecutionStartData, ExecutionSuccessData,
};
use crate::primitives::OutputBundle;
use crate::validation::WireSchema;

const SCHEMA: &str = "ComfyUIMessage";

/// All known ComfyUI WebSocket message types.
///
/// Deserialized via the adjacently-tagged `"type"` field with
/// associated `"data"` content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ComfyUIMessage {
    /// Server status broadcast (queue depth, etc.).
    #[serde(rename = "status")]
    Status(StatusData),

    /// A prompt has started executing.
    #[serde(rename = "execution_start")]
    ExecutionStart(ExecutionStartData),

    /// A prompt finished without error.
    #[serde(rename = "execution_success")]
    ExecutionSuccess(ExecutionSuccessData),

    /// Some nodes were skipped because their outputs are cached.
    #[serde(rename = "execution_cached")]
    ExecutionCached(ExecutionCachedData),

    /// The prompt was interrupted by the user.
    #[serde(rename = "execution_interrupted")]
    ExecutionInterrupted(ExecutionInterruptedData),

    /// Execution failed with an error.
    #[serde(rename = "execution_error")]
    ExecutionError(ExecutionErrorData),

    /// A specific node is currently executing (or execution finished when `node` is `None`).
    #[serde(rename = "executing")]
    Executing(ExecutingData),

    /// Progress update from a long-running node (e.g. KSampler).
    #[serde(rename = "progress")]
    Progress(ProgressData),

    /// A node has finished and produced output.
    #[serde(rename = "executed")]
    Executed(ExecutedData),

    /// Model download progress.
    #[serde(rename = "download_progress")]
    DownloadProgress(DownloadModelStatus),
}

/// Queue status information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusData {
    /// `null` or absent while the server is still starting.
    #[serde(default)]
    pub status: Option<QueueStatus>,
    /// Session id assigned to this client, sent on the first status frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

/// Current queue state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueStatus {
    pub exec_info: ExecInfo,
}

/// Execution queue statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecInfo {
    pub queue_remaining: i64,
}

/// Payload for `executing` messages.
///
/// When `node` is `None`, execution of the prompt has completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutingData {
    pub node: Option<NodeId>,
    /// Node shown in the UI; differs from `node` inside expanded groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_node: Option<NodeId>,
    pub prompt_id: PromptId,
}

/// Payload for `progress` messages (step-level progress within a node).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressData {
    /// Current step number.
    pub value: i64,
    /// Total number of steps.
    pub max: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<PromptId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeId>,
}

impl ProgressData {
    /// Completion percentage (0-100), `0` when `max` is not positive.
    pub fn percent(&self) -> i16 {
        if self.max > 0 {
            ((self.value as f64 / self.max as f64) * 100.0).clamp(0.0, 100.0) as i16
        } else {
            0
        }
    }
}

/// Payload for `executed` messages (node output).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutedData {
    /// The node that produced this output.
    pub node: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_node: Option<NodeId>,
    /// Files and other values the node produced.
    #[serde(alias = "outputs")]
    pub output: OutputBundle,
    pub prompt_id: PromptId,
}

/// Progress record for a model download started from a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadModelStatus {
    pub status: String,
    pub progress_percentage: f64,
    pub message: String,
    pub download_path: String,
    pub already_existed: bool,
}

impl WireSchema for DownloadModelStatus {
    const NAME: &'static str = "DownloadModelStatus";
}

impl ComfyUIMessage {
    /// The execution lifecycle event carried by this frame, if any.
    pub fn into_execution_event(self) -> Option<ExecutionEvent> {
        match self {
            Self::ExecutionStart(d) => Some(ExecutionEvent::Start(d)),
            Self::ExecutionSuccess(d) => Some(ExecutionEvent::Success(d)),
            Self::ExecutionCached(d) => Some(ExecutionEvent::Cached(d)),
            Self::ExecutionInterrupted(d) => Some(ExecutionEvent::Interrupted(d)),
            Self::ExecutionError(d) => Some(ExecutionEvent::Error(d)),
            Self::Status(_)
            | Self::Executing(_)
            | Self::Progress(_)
            | Self::Executed(_)
            | Self::DownloadProgress(_) => None,
        }
    }

    /// Prompt this frame refers to, when the frame carries one.
    pub fn prompt_id(&self) -> Option<&str> {
        match self {
            Self::ExecutionStart(d) => Some(&d.prompt_id),
            Self::ExecutionSuccess(d) => Some(&d.prompt_id),
            Self::ExecutionCached(d) => Some(&d.prompt_id),
            Self::ExecutionInterrupted(d) => Some(&d.prompt_id),
            Self::ExecutionError(d) => Some(&d.prompt_id),
            Self::Executing(d) => Some(&d.prompt_id),
            Self::Executed(d) => Some(&d.prompt_id),
            Self::Progress(d) => d.prompt_id.as_deref(),
            Self::Status(_) | Self::DownloadProgress(_) => None,
        }
    }
}

/// Parse a ComfyUI WebSocket text message into a typed enum.
///
/// Returns `Err` for malformed JSON or unknown `type` values.
/// Callers should log unknown types and continue.
pub fn parse_message(text: &str) -> Result<ComfyUIMessage, SchemaError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    message_from_value(&value)
}

/// Check an already-decoded frame.
pub fn message_from_value(value: &serde_json::Value) -> Result<ComfyUIMessage, SchemaError> {
    ComfyUIMessage::deserialize(value).map_err(|e| SchemaError::mismatch(SCHEMA, e))
}
