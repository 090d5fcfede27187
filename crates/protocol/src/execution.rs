//! Execution lifecycle events and the per-prompt status log.
//!
//! In a history record each event is stored as a positional pair
//! `["<tag>", {...body}]`. The tag is resolved first and the body is then
//! checked against that one variant only, so a mismatched pair fails fast
//! instead of being tried against every shape.

use comfywire_core::types::{timestamp_from_millis, NodeId, NodeType, PromptId, Timestamp};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::validation::WireSchema;

// ---------------------------------------------------------------------------
// Event bodies
// ---------------------------------------------------------------------------

/// Payload of `execution_start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStartData {
    pub prompt_id: PromptId,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Payload of `execution_success`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSuccessData {
    pub prompt_id: PromptId,
    pub timestamp: i64,
}

/// Payload of `execution_cached`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionCachedData {
    pub prompt_id: PromptId,
    pub timestamp: i64,
    /// Node IDs whose outputs were served from cache.
    pub nodes: Vec<NodeId>,
}

/// Payload of `execution_interrupted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionInterruptedData {
    pub prompt_id: PromptId,
    pub timestamp: i64,
    pub node_id: NodeId,
    pub node_type: NodeType,
    /// Nodes that finished before the interruption.
    pub executed: Vec<NodeId>,
}

/// Payload of `execution_error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionErrorData {
    pub prompt_id: PromptId,
    pub timestamp: i64,
    pub node_id: NodeId,
    pub node_type: NodeType,
    pub executed: Vec<NodeId>,
    pub exception_message: String,
    pub exception_type: String,
    pub traceback: Vec<String>,
    /// Engine-internal snapshot; shape is not part of the contract.
    #[serde(default)]
    pub current_inputs: serde_json::Value,
    #[serde(default)]
    pub current_outputs: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Discriminant
// ---------------------------------------------------------------------------

/// Tag of an [`ExecutionEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionEventKind {
    ExecutionStart,
    ExecutionSuccess,
    ExecutionCached,
    ExecutionInterrupted,
    ExecutionError,
}

impl ExecutionEventKind {
    /// Every wire tag, in declaration order.
    pub const TAGS: &'static [&'static str] = &[
        "execution_start",
        "execution_success",
        "execution_cached",
        "execution_interrupted",
        "execution_error",
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExecutionStart => "execution_start",
            Self::ExecutionSuccess => "execution_success",
            Self::ExecutionCached => "execution_cached",
            Self::ExecutionInterrupted => "execution_interrupted",
            Self::ExecutionError => "execution_error",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "execution_start" => Some(Self::ExecutionStart),
            "execution_success" => Some(Self::ExecutionSuccess),
            "execution_cached" => Some(Self::ExecutionCached),
            "execution_interrupted" => Some(Self::ExecutionInterrupted),
            "execution_error" => Some(Self::ExecutionError),
            _ => None,
        }
    }

    /// Whether this event ends a prompt's run.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::ExecutionSuccess | Self::ExecutionInterrupted | Self::ExecutionError
        )
    }
}

// ---------------------------------------------------------------------------
// Event union
// ---------------------------------------------------------------------------

/// One entry of a prompt's execution log.
///
/// Serializes to and from the `["<tag>", {...}]` pair form.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionEvent {
    Start(ExecutionStartData),
    Success(ExecutionSuccessData),
    Cached(ExecutionCachedData),
    Interrupted(ExecutionInterruptedData),
    Error(ExecutionErrorData),
}

impl ExecutionEvent {
    /// Check `body` against the shape selected by `kind`.
    pub fn from_body(
        kind: ExecutionEventKind,
        body: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            ExecutionEventKind::ExecutionStart => Self::Start(serde_json::from_value(body)?),
            ExecutionEventKind::ExecutionSuccess => Self::Success(serde_json::from_value(body)?),
            ExecutionEventKind::ExecutionCached => Self::Cached(serde_json::from_value(body)?),
            ExecutionEventKind::ExecutionInterrupted => {
                Self::Interrupted(serde_json::from_value(body)?)
            }
            ExecutionEventKind::ExecutionError => Self::Error(serde_json::from_value(body)?),
        })
    }

    pub fn kind(&self) -> ExecutionEventKind {
        match self {
            Self::Start(_) => ExecutionEventKind::ExecutionStart,
            Self::Success(_) => ExecutionEventKind::ExecutionSuccess,
            Self::Cached(_) => ExecutionEventKind::ExecutionCached,
            Self::Interrupted(_) => ExecutionEventKind::ExecutionInterrupted,
            Self::Error(_) => ExecutionEventKind::ExecutionError,
        }
    }

    pub fn prompt_id(&self) -> &str {
        match self {
            Self::Start(d) => &d.prompt_id,
            Self::Success(d) => &d.prompt_id,
            Self::Cached(d) => &d.prompt_id,
            Self::Interrupted(d) => &d.prompt_id,
            Self::Error(d) => &d.prompt_id,
        }
    }

    /// Raw engine timestamp in milliseconds.
    pub fn timestamp(&self) -> i64 {
        match self {
            Self::Start(d) => d.timestamp,
            Self::Success(d) => d.timestamp,
            Self::Cached(d) => d.timestamp,
            Self::Interrupted(d) => d.timestamp,
            Self::Error(d) => d.timestamp,
        }
    }

    pub fn occurred_at(&self) -> Option<Timestamp> {
        timestamp_from_millis(self.timestamp())
    }
}

impl<'de> Deserialize<'de> for ExecutionEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (tag, body): (String, serde_json::Value) = Deserialize::deserialize(deserializer)?;
        let kind = ExecutionEventKind::from_tag(&tag)
            .ok_or_else(|| D::Error::unknown_variant(&tag, ExecutionEventKind::TAGS))?;
        Self::from_body(kind, body).map_err(|e| D::Error::custom(format!("{tag}: {e}")))
    }
}

impl Serialize for ExecutionEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let tag = self.kind().as_str();
        match self {
            Self::Start(d) => (tag, d).serialize(serializer),
            Self::Success(d) => (tag, d).serialize(serializer),
            Self::Cached(d) => (tag, d).serialize(serializer),
            Self::Interrupted(d) => (tag, d).serialize(serializer),
            Self::Error(d) => (tag, d).serialize(serializer),
        }
    }
}

impl WireSchema for ExecutionEvent {
    const NAME: &'static str = "ExecutionEvent";
}

// ---------------------------------------------------------------------------
// Status log
// ---------------------------------------------------------------------------

/// Final outcome reported for a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusStr {
    Success,
    Error,
}

/// Outcome plus ordered event log of one prompt run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub status_str: StatusStr,
    pub completed: bool,
    /// Chronological, oldest first.
    pub messages: Vec<ExecutionEvent>,
}

impl TaskStatus {
    /// The last logged event, if it ends the run.
    pub fn terminal_event(&self) -> Option<&ExecutionEvent> {
        self.messages.last().filter(|e| e.kind().is_terminal())
    }

    /// Whether `completed` and `status_str` agree with the event log.
    ///
    /// Engines occasionally report records that break this; validation
    /// keeps them and leaves the decision to the caller.
    pub fn is_consistent(&self) -> bool {
        if !self.completed {
            return true;
        }
        match self.terminal_event().map(ExecutionEvent::kind) {
            Some(ExecutionEventKind::ExecutionSuccess) => self.status_str == StatusStr::Success,
            Some(_) => self.status_str == StatusStr::Error,
            None => false,
        }
    }
}
