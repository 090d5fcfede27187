use clap::ValueEnum;
use comfywire_core::config::ValidationConfig;
use comfywire_core::error::SchemaError;
use comfywire_protocol::execution::ExecutionEvent;
use comfywire_protocol::messages::message_from_value;
use comfywire_protocol::node_def::validate_node_defs;
use comfywire_protocol::responses::SystemStats;
use comfywire_protocol::settings::Settings;
use comfywire_protocol::task::{history_task_items, validate_task_item_with, QueueResponse};
use comfywire_protocol::validation::{diagnostic, validate, WireSchema};
use serde::Serialize;
use serde_json::Value;

/// Payload kinds the inspector understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum InspectKind {
    /// `/object_info` response.
    ObjectInfo,
    /// Array of task items.
    Tasks,
    /// `/queue` response.
    Queue,
    /// `/history` response.
    History,
    /// Array of `[tag, body]` execution events.
    Events,
    /// Array of WebSocket frames.
    Messages,
    /// Settings document.
    Settings,
    /// `/system_stats` response.
    SystemStats,
}

/// Outcome of one inspection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    pub kind: InspectKind,
    pub accepted: usize,
    pub rejected: usize,
    /// One entry per rejected record when it can be attributed.
    pub diagnostics: Vec<String>,
}

impl InspectReport {
    fn new(kind: InspectKind) -> Self {
        Self {
            kind,
            accepted: 0,
            rejected: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.rejected == 0
    }

    fn record(&mut self, outcome: Result<(), String>) {
        match outcome {
            Ok(()) => self.accepted += 1,
            Err(message) => {
                self.rejected += 1;
                self.diagnostics.push(message);
            }
        }
    }
}

/// Validate `raw` as a payload of `kind`.
///
/// Record-level failures are counted in the report. An `Err` means the
/// payload as a whole has the wrong container shape.
pub fn inspect(
    kind: InspectKind,
    raw: &Value,
    config: &ValidationConfig,
) -> Result<InspectReport, SchemaError> {
    let mut report = InspectReport::new(kind);

    match kind {
        InspectKind::ObjectInfo => {
            let total = raw.as_object().map_or(0, |m| m.len());
            let defs = validate_node_defs(raw, config, |m| report.diagnostics.push(m.to_owned()))?;
            report.accepted = defs.len();
            report.rejected = total - defs.len();
        }
        InspectKind::Tasks => {
            for item in records(raw, "TaskItems")? {
                let outcome = validate_task_item_with(item, config)
                    .map(drop)
                    .map_err(|e| diagnostic(&e, item, config));
                report.record(outcome);
            }
        }
        InspectKind::Queue => {
            let queue: QueueResponse = validate(raw, config)?;
            let total = queue.queue_running.len() + queue.queue_pending.len();
            report.accepted = queue.into_task_items(config).len();
            report.rejected = total - report.accepted;
        }
        InspectKind::History => {
            let total = raw.as_object().map_or(0, |m| m.len());
            report.accepted = history_task_items(raw, config)?.len();
            report.rejected = total - report.accepted;
        }
        InspectKind::Events => {
            for event in records(raw, "ExecutionEvents")? {
                report.record(check::<ExecutionEvent>(event, config));
            }
        }
        InspectKind::Messages => {
            for frame in records(raw, "ComfyUIMessages")? {
                let outcome = message_from_value(frame)
                    .map(drop)
                    .map_err(|e| diagnostic(&e, frame, config));
                report.record(outcome);
            }
        }
        InspectKind::Settings => report.record(check::<Settings>(raw, config)),
        InspectKind::SystemStats => report.record(check::<SystemStats>(raw, config)),
    }

    tracing::info!(
        kind = ?report.kind,
        accepted = report.accepted,
        rejected = report.rejected,
        "Inspection finished",
    );
    Ok(report)
}

fn records<'a>(raw: &'a Value, schema: &'static str) -> Result<&'a [Value], SchemaError> {
    raw.as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| SchemaError::mismatch(schema, "expected an array"))
}

fn check<T: WireSchema>(raw: &Value, config: &ValidationConfig) -> Result<(), String> {
    validate::<T>(raw, config)
        .map(drop)
        .map_err(|e| diagnostic(&e, raw, config))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn quiet() -> ValidationConfig {
        ValidationConfig {
            log_payloads: false,
            ..ValidationConfig::default()
        }
    }

    fn prompt(id: &str) -> Value {
        json!([0, id, {}, {"extra_pnginfo": {"workflow": {}}, "client_id": "c"}, []])
    }

    #[test]
    fn tasks_are_counted_individually() {
        let raw = json!([
            {"taskType": "Pending", "prompt": prompt("a")},
            {"taskType": "Running", "prompt": prompt("b")},
            {"taskType": "History", "prompt": prompt("c"), "outputs": {}}
        ]);
        let report = inspect(InspectKind::Tasks, &raw, &quiet()).unwrap();
        assert_eq!((report.accepted, report.rejected), (2, 1));
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.diagnostics[0].starts_with("Invalid TaskItem"));
        assert!(!report.is_clean());
    }

    #[test]
    fn queue_counts_dropped_prompts() {
        let raw = json!({"queue_running": [prompt("r")], "queue_pending": [prompt("p"), "junk"]});
        let report = inspect(InspectKind::Queue, &raw, &quiet()).unwrap();
        assert_eq!((report.accepted, report.rejected), (2, 1));
    }

    #[test]
    fn history_counts_entries() {
        let raw = json!({"x": {"prompt": prompt("x"), "outputs": {}}});
        let report = inspect(InspectKind::History, &raw, &quiet()).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.accepted, 1);
    }

    #[test]
    fn object_info_collects_diagnostics() {
        let raw = json!({"Broken": {"name": "Broken"}});
        let report = inspect(InspectKind::ObjectInfo, &raw, &quiet()).unwrap();
        assert_eq!((report.accepted, report.rejected), (0, 1));
        assert!(report.diagnostics[0].starts_with("Invalid ComfyNodeDef"));
    }

    #[test]
    fn events_and_messages() {
        let events = json!([
            ["execution_start", {"prompt_id": "p", "timestamp": 1}],
            ["execution_cached", {"prompt_id": "p", "timestamp": 2}]
        ]);
        let report = inspect(InspectKind::Events, &events, &quiet()).unwrap();
        assert_eq!((report.accepted, report.rejected), (1, 1));

        let frames = json!([
            {"type": "progress", "data": {"value": 1, "max": 20}},
            {"type": "crystools.monitor", "data": {}}
        ]);
        let report = inspect(InspectKind::Messages, &frames, &quiet()).unwrap();
        assert_eq!((report.accepted, report.rejected), (1, 1));
    }

    #[test]
    fn single_documents() {
        let report = inspect(InspectKind::Settings, &json!({"Comfy.DevMode": 1}), &quiet()).unwrap();
        assert_eq!(report.rejected, 1);
        let report = inspect(InspectKind::Settings, &json!({"Other": 1}), &quiet()).unwrap();
        assert!(report.is_clean());
    }

    #[test]
    fn wrong_container_is_an_error() {
        let err = inspect(InspectKind::Tasks, &json!({}), &quiet()).unwrap_err();
        assert_matches!(err, SchemaError::Mismatch { schema: "TaskItems", .. });
        assert!(inspect(InspectKind::History, &json!([]), &quiet()).is_err());
    }

    #[test]
    fn report_serializes_kind_in_kebab_case() {
        let report = inspect(InspectKind::SystemStats, &json!({}), &quiet()).unwrap();
        let out = serde_json::to_value(&report).unwrap();
        assert_eq!(out["kind"], json!("system-stats"));
        assert_eq!(out["rejected"], json!(1));
    }
}
