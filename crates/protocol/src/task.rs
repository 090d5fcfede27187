//! Queue and history task items.
//!
//! A task item wraps the submitted prompt with the lifecycle stage the
//! engine reported for it: `Pending`, `Running` or `History`. The client
//! only mirrors these stages; it never moves an item between them.

use comfywire_core::config::ValidationConfig;
use comfywire_core::error::SchemaError;
use comfywire_core::types::{NodeId, NodeType, PromptId, QueueIndex};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::execution::TaskStatus;
use crate::primitives::TaskOutput;
use crate::validation::{diagnostic, validate, WireSchema};

// ---------------------------------------------------------------------------
// Prompt tuple
// ---------------------------------------------------------------------------

/// One node of a submitted prompt graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptInputItem {
    /// Literal values and `[node_id, slot]` links, keyed by input name.
    pub inputs: serde_json::Map<String, serde_json::Value>,
    pub class_type: NodeType,
}

/// Prompt graph keyed by node id, in submission order.
pub type PromptInputs = IndexMap<NodeId, PromptInputItem>;

/// Metadata embedded into generated files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraPngInfo {
    /// The editor workflow graph the prompt was produced from.
    pub workflow: serde_json::Value,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Client metadata attached to a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraData {
    pub extra_pnginfo: ExtraPngInfo,
    pub client_id: String,
}

/// The queued unit of work.
///
/// On the wire this is the positional tuple
/// `[queue_index, prompt_id, inputs, extra_data, outputs_to_execute]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(QueueIndex, PromptId, PromptInputs, ExtraData, Vec<NodeId>)")]
#[serde(into = "(QueueIndex, PromptId, PromptInputs, ExtraData, Vec<NodeId>)")]
pub struct TaskPrompt {
    pub queue_index: QueueIndex,
    pub prompt_id: PromptId,
    pub inputs: PromptInputs,
    pub extra_data: ExtraData,
    /// Output nodes whose results were requested.
    pub outputs_to_execute: Vec<NodeId>,
}

impl From<(QueueIndex, PromptId, PromptInputs, ExtraData, Vec<NodeId>)> for TaskPrompt {
    fn from(
        (queue_index, prompt_id, inputs, extra_data, outputs_to_execute): (
            QueueIndex,
            PromptId,
            PromptInputs,
            ExtraData,
            Vec<NodeId>,
        ),
    ) -> Self {
        Self {
            queue_index,
            prompt_id,
            inputs,
            extra_data,
            outputs_to_execute,
        }
    }
}

impl From<TaskPrompt> for (QueueIndex, PromptId, PromptInputs, ExtraData, Vec<NodeId>) {
    fn from(
        TaskPrompt {
            queue_index,
            prompt_id,
            inputs,
            extra_data,
            outputs_to_execute,
        }: TaskPrompt,
    ) -> Self {
        (queue_index, prompt_id, inputs, extra_data, outputs_to_execute)
    }
}

// ---------------------------------------------------------------------------
// Cancellation handle
// ---------------------------------------------------------------------------

/// Legacy cancel hook carried by running queue entries.
///
/// The wire form is `{"name": "Cancel"}`. In memory it is a one-shot
/// cancellation token that this crate never triggers. New code should
/// cancel through the task-management API (`POST /queue` with `delete`)
/// rather than through this handle.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing token, e.g. one owned by a task manager.
    pub fn from_token(token: CancellationToken) -> Self {
        Self { token }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Serialize, Deserialize)]
enum CancelName {
    Cancel,
}

#[derive(Serialize, Deserialize)]
struct CancelHandleWire {
    name: CancelName,
}

impl Serialize for CancelHandle {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        CancelHandleWire {
            name: CancelName::Cancel,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CancelHandle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        CancelHandleWire::deserialize(deserializer).map(|_| Self::new())
    }
}

// ---------------------------------------------------------------------------
// Task items
// ---------------------------------------------------------------------------

/// Lifecycle stage of a task item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskType {
    Running,
    Pending,
    History,
}

/// Entry of `queue_running`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunningTaskItem {
    pub prompt: TaskPrompt,
    /// Deprecated; see [`CancelHandle`].
    pub remove: CancelHandle,
}

/// Entry of `queue_pending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingTaskItem {
    pub prompt: TaskPrompt,
}

/// Finished prompt from `/history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryTaskItem {
    pub prompt: TaskPrompt,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    pub outputs: TaskOutput,
}

/// A prompt plus its lifecycle stage, discriminated by `taskType`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "taskType")]
pub enum TaskItem {
    Running(RunningTaskItem),
    Pending(PendingTaskItem),
    History(HistoryTaskItem),
}

impl TaskItem {
    pub fn task_type(&self) -> TaskType {
        match self {
            Self::Running(_) => TaskType::Running,
            Self::Pending(_) => TaskType::Pending,
            Self::History(_) => TaskType::History,
        }
    }

    pub fn prompt(&self) -> &TaskPrompt {
        match self {
            Self::Running(item) => &item.prompt,
            Self::Pending(item) => &item.prompt,
            Self::History(item) => &item.prompt,
        }
    }

    pub fn prompt_id(&self) -> &str {
        &self.prompt().prompt_id
    }

    pub fn queue_index(&self) -> QueueIndex {
        self.prompt().queue_index
    }
}

impl WireSchema for TaskItem {
    const NAME: &'static str = "TaskItem";
}

// ---------------------------------------------------------------------------
// Validation entry points
// ---------------------------------------------------------------------------

/// Validate one raw task item with default settings.
///
/// Failures are logged as warnings and returned; they never panic.
pub fn validate_task_item(raw: &serde_json::Value) -> Result<TaskItem, SchemaError> {
    validate_task_item_with(raw, &ValidationConfig::default())
}

/// Validate one raw task item.
pub fn validate_task_item_with(
    raw: &serde_json::Value,
    config: &ValidationConfig,
) -> Result<TaskItem, SchemaError> {
    let result = validate::<TaskItem>(raw, config);
    if let Err(ref e) = result {
        tracing::warn!(
            schema = TaskItem::NAME,
            "{}",
            diagnostic(e, raw, config),
        );
    }
    result
}

/// Validate a batch, dropping malformed entries.
pub fn validate_task_items<'a>(
    raws: impl IntoIterator<Item = &'a serde_json::Value>,
    config: &ValidationConfig,
) -> Vec<TaskItem> {
    let mut items = Vec::new();
    let mut rejected = 0usize;
    for raw in raws {
        match validate_task_item_with(raw, config) {
            Ok(item) => items.push(item),
            Err(_) => rejected += 1,
        }
    }
    tracing::debug!(accepted = items.len(), rejected, "Validated task items");
    items
}

// ---------------------------------------------------------------------------
// Listing endpoints
// ---------------------------------------------------------------------------

/// Response of `GET /queue`. Entries are raw prompt tuples.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueResponse {
    #[serde(default)]
    pub queue_running: Vec<serde_json::Value>,
    #[serde(default)]
    pub queue_pending: Vec<serde_json::Value>,
}

impl WireSchema for QueueResponse {
    const NAME: &'static str = "QueueResponse";
}

impl QueueResponse {
    /// Wrap each prompt as a `Running` or `Pending` task item and validate it.
    ///
    /// Running entries get a fresh [`CancelHandle`]. Malformed prompts are
    /// dropped with a warning.
    pub fn into_task_items(self, config: &ValidationConfig) -> Vec<TaskItem> {
        let running = self.queue_running.into_iter().map(|prompt| {
            json!({
                "taskType": "Running",
                "prompt": prompt,
                "remove": {"name": "Cancel"},
            })
        });
        let pending = self
            .queue_pending
            .into_iter()
            .map(|prompt| json!({"taskType": "Pending", "prompt": prompt}));
        let wrapped: Vec<_> = running.chain(pending).collect();
        validate_task_items(&wrapped, config)
    }
}

/// Turn a `GET /history` payload (`{prompt_id: {prompt, outputs, status}}`)
/// into `History` task items, dropping malformed entries.
pub fn history_task_items(
    raw: &serde_json::Value,
    config: &ValidationConfig,
) -> Result<Vec<TaskItem>, SchemaError> {
    let entries = raw
        .as_object()
        .ok_or_else(|| SchemaError::mismatch("History", "expected an object keyed by prompt id"))?;

    let wrapped: Vec<_> = entries
        .values()
        .map(|entry| {
            let mut entry = entry.clone();
            if let Some(obj) = entry.as_object_mut() {
                obj.insert("taskType".into(), json!("History"));
            }
            entry
        })
        .collect();

    Ok(validate_task_items(&wrapped, config))
}
