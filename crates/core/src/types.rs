/// Node identifier within a prompt graph (string key on the wire).
pub type NodeId = String;

/// Node class name, e.g. `KSampler`.
pub type NodeType = String;

/// Server-assigned prompt identifier.
pub type PromptId = String;

/// Position of a prompt in the execution queue.
pub type QueueIndex = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Convert an engine timestamp (milliseconds since the Unix epoch) to UTC.
///
/// Returns `None` when the value is outside chrono's representable range.
pub fn timestamp_from_millis(millis: i64) -> Option<Timestamp> {
    chrono::DateTime::from_timestamp_millis(millis)
}
