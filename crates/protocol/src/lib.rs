//! Typed wire contract for ComfyUI servers.
//!
//! Decodes and validates node definitions, queue and history task items,
//! execution events, WebSocket messages, REST responses and user settings.
//! Validation never panics: failures come back as [`SchemaError`] values or
//! go to a diagnostic sink.
//!
//! [`SchemaError`]: comfywire_core::error::SchemaError

pub mod execution;
pub mod input_spec;
pub mod messages;
pub mod node_def;
pub mod primitives;
pub mod responses;
pub mod settings;
pub mod task;
pub mod validation;

pub use input_spec::InputSpec;
pub use node_def::{validate_node_def, NodeDef};
pub use task::{validate_task_item, TaskItem};
pub use validation::{validate, WireSchema};
