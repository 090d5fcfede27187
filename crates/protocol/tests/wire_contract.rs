//! End-to-end checks of the wire contract through the public API.

use assert_matches::assert_matches;
use comfywire_core::config::ValidationConfig;
use comfywire_core::error::SchemaError;
use comfywire_protocol::execution::{ExecutionEvent, ExecutionEventKind};
use comfywire_protocol::input_spec::{InputKind, WireShape};
use comfywire_protocol::messages::{parse_message, ComfyUIMessage};
use comfywire_protocol::primitives::OutputBundle;
use comfywire_protocol::task::{history_task_items, QueueResponse, TaskType};
use comfywire_protocol::{validate, validate_node_def, validate_task_item, InputSpec, TaskItem};
use serde_json::json;

fn prompt(index: i64, id: &str) -> serde_json::Value {
    json!([
        index,
        id,
        {"1": {"inputs": {"text": "a cat"}, "class_type": "CLIPTextEncode"}},
        {"extra_pnginfo": {"workflow": {"nodes": []}}, "client_id": "tab-1"},
        ["1"]
    ])
}

// ---------------------------------------------------------------------------
// Input specs
// ---------------------------------------------------------------------------

#[test]
fn every_variant_round_trips_in_canonical_form() {
    let canonical = [
        json!(["INT", {"default": 1, "min": 0, "max": 10, "step": 1}]),
        json!(["FLOAT", {"default": 0.5, "round": 0.01}]),
        json!(["BOOLEAN", {"default": true, "label_on": "yes", "label_off": "no"}]),
        json!(["STRING", {"multiline": true, "dynamicPrompts": false}]),
        json!([["euler", "ddim"], {"default": "euler"}]),
        json!(["MODEL", {"tooltip": "weights"}]),
    ];
    let kinds = [
        InputKind::Int,
        InputKind::Float,
        InputKind::Boolean,
        InputKind::String,
        InputKind::Combo,
        InputKind::Custom,
    ];
    for (raw, kind) in canonical.iter().zip(kinds) {
        let spec = InputSpec::from_wire(raw).unwrap();
        assert_eq!(spec.kind(), kind);
        assert_eq!(&spec.to_wire(), raw);
    }
}

#[test]
fn shorthand_forms_are_equivalent() {
    let pair = InputSpec::from_wire(&json!(["INT", {}])).unwrap();
    let (single, shape) = InputSpec::from_wire_with_shape(&json!(["INT"])).unwrap();
    assert_eq!(shape, WireShape::Single);
    let (bare, shape) = InputSpec::from_wire_with_shape(&json!("INT")).unwrap();
    assert_eq!(shape, WireShape::Bare);
    assert_eq!(pair, single);
    assert_eq!(pair, bare);
}

#[test]
fn bare_combo_and_custom_are_rejected() {
    assert_matches!(
        InputSpec::from_wire(&json!("COMBO")),
        Err(SchemaError::Mismatch { schema: "InputSpec", .. })
    );
    assert!(InputSpec::from_wire(&json!("MODEL")).is_err());
    assert!(InputSpec::from_wire(&json!(["MODEL"])).is_ok());
}

#[test]
fn reserved_tags_never_become_custom() {
    for tag in ["INT", "FLOAT", "BOOLEAN", "STRING", "COMBO"] {
        let spec = InputSpec::from_wire(&json!([tag, {}]));
        if let Ok(spec) = spec {
            assert_ne!(spec.kind(), InputKind::Custom, "{tag}");
        }
    }
    assert!(InputSpec::from_wire(&json!(["COMBO", {}])).is_err());
}

#[test]
fn unknown_option_keys_survive() {
    let raw = json!(["INT", {"default": 3, "display": "slider", "lazy": true}]);
    let spec = InputSpec::from_wire(&raw).unwrap();
    assert_eq!(spec.extra()["display"], json!("slider"));
    assert_eq!(spec.to_wire(), raw);
}

// ---------------------------------------------------------------------------
// Task items
// ---------------------------------------------------------------------------

#[test]
fn each_task_type_validates_minimally() {
    let pending = json!({"taskType": "Pending", "prompt": prompt(0, "a")});
    let running = json!({"taskType": "Running", "prompt": prompt(1, "b"), "remove": {"name": "Cancel"}});
    let history = json!({"taskType": "History", "prompt": prompt(2, "c"), "outputs": {}});

    assert_eq!(validate_task_item(&pending).unwrap().task_type(), TaskType::Pending);
    assert_eq!(validate_task_item(&running).unwrap().task_type(), TaskType::Running);
    assert_eq!(validate_task_item(&history).unwrap().task_type(), TaskType::History);
}

#[test]
fn running_without_cancel_handle_and_unknown_type_fail() {
    let running = json!({"taskType": "Running", "prompt": prompt(1, "b")});
    assert!(validate_task_item(&running).is_err());
    let unknown = json!({"taskType": "Archived", "prompt": prompt(1, "b")});
    assert!(validate_task_item(&unknown).is_err());
}

#[test]
fn queue_and_history_listings_become_task_items() {
    let config = ValidationConfig::default();
    let queue: QueueResponse = validate(
        &json!({"queue_running": [prompt(0, "r")], "queue_pending": [prompt(1, "p")]}),
        &config,
    )
    .unwrap();
    let items = queue.into_task_items(&config);
    assert_matches!(items.as_slice(), [TaskItem::Running(_), TaskItem::Pending(_)]);

    let history = json!({
        "h": {"prompt": prompt(5, "h"), "outputs": {"1": {"images": []}}},
        "broken": {"prompt": prompt(6, "x")}
    });
    let items = history_task_items(&history, &config).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].prompt_id(), "h");
}

// ---------------------------------------------------------------------------
// Execution events and outputs
// ---------------------------------------------------------------------------

#[test]
fn cached_event_requires_nodes() {
    let config = ValidationConfig::default();
    let raw = json!(["execution_cached", {"prompt_id": "p1", "timestamp": 1}]);
    assert!(validate::<ExecutionEvent>(&raw, &config).is_err());

    let raw = json!(["execution_cached", {"prompt_id": "p1", "timestamp": 1, "nodes": ["3"]}]);
    let event: ExecutionEvent = validate(&raw, &config).unwrap();
    assert_eq!(event.kind().as_str(), "execution_cached");
}

#[test]
fn execution_error_event_is_recognized() {
    let raw = json!(["execution_error", {
        "prompt_id": "p1",
        "timestamp": 1000,
        "node_id": "5",
        "node_type": "KSampler",
        "executed": ["1", "2"],
        "exception_message": "OOM",
        "exception_type": "RuntimeError",
        "traceback": ["..."],
        "current_inputs": {},
        "current_outputs": {}
    }]);
    let event: ExecutionEvent = validate(&raw, &ValidationConfig::default()).unwrap();
    assert_eq!(event.kind(), ExecutionEventKind::ExecutionError);
    assert_eq!(event.prompt_id(), "p1");
    assert_eq!(serde_json::to_value(&event).unwrap()[0], json!("execution_error"));
}

#[test]
fn output_bundle_keeps_unknown_fields() {
    let raw = json!({
        "images": [{"filename": "a.png", "subfolder": "", "type": "output"}],
        "customField": 42
    });
    let bundle: OutputBundle = validate(&raw, &ValidationConfig::default()).unwrap();
    assert_eq!(bundle.extra["customField"], json!(42));
    assert_eq!(bundle.result_items().count(), 1);
}

#[test]
fn live_frame_converts_to_execution_event() {
    let frame = r#"{"type":"execution_success","data":{"prompt_id":"p9","timestamp":5}}"#;
    let msg = parse_message(frame).unwrap();
    assert_matches!(msg, ComfyUIMessage::ExecutionSuccess(_));
    let event = msg.into_execution_event().unwrap();
    assert!(event.kind().is_terminal());
}

// ---------------------------------------------------------------------------
// Node definitions
// ---------------------------------------------------------------------------

#[test]
fn node_def_with_bare_int_validates() {
    let raw = json!({
        "input": {"required": {"seed": "INT"}},
        "output": ["INT"],
        "output_is_list": [false],
        "output_name": ["out"],
        "name": "SeedNode",
        "display_name": "Seed",
        "description": "Emits a seed.",
        "category": "utils",
        "output_node": false,
        "python_module": "custom_nodes.seed"
    });
    let def = validate_node_def(&raw, |m| panic!("{m}")).unwrap();
    assert_eq!(def.input.get("seed").unwrap().to_wire(), json!(["INT", {}]));
}

#[test]
fn malformed_node_def_goes_to_sink() {
    let mut seen = Vec::new();
    let def = validate_node_def(&json!({"name": "Half"}), |m| seen.push(m.to_owned()));
    assert!(def.is_none());
    assert_eq!(seen.len(), 1);
}
