//! Leaf schemas shared by events, tasks and live messages.

use std::collections::BTreeMap;

use comfywire_core::types::NodeId;
use serde::{Deserialize, Serialize};

use crate::validation::WireSchema;

/// Reference to one artifact produced by a node (not the artifact bytes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subfolder: Option<String>,
    /// Storage bucket on the engine side (`output`, `temp`, `input`).
    #[serde(rename = "type")]
    pub kind: String,
}

/// Outputs recorded for one node.
///
/// Only `images` and `audio` are typed. Every other key is kept in
/// [`extra`](Self::extra) untouched, since engine output kinds are unbounded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ResultItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<Vec<ResultItem>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl OutputBundle {
    /// All typed artifacts (images first, then audio).
    pub fn result_items(&self) -> impl Iterator<Item = &ResultItem> {
        self.images
            .iter()
            .flatten()
            .chain(self.audio.iter().flatten())
    }
}

impl WireSchema for OutputBundle {
    const NAME: &'static str = "OutputBundle";
}

/// Per-node outputs of a finished prompt.
pub type TaskOutput = BTreeMap<NodeId, OutputBundle>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_item_without_subfolder() {
        let item: ResultItem =
            serde_json::from_value(json!({"filename": "a.png", "type": "output"})).unwrap();
        assert_eq!(item.filename, "a.png");
        assert!(item.subfolder.is_none());
        assert_eq!(item.kind, "output");
    }

    #[test]
    fn result_item_requires_type() {
        let result = serde_json::from_value::<ResultItem>(json!({"filename": "a.png"}));
        assert!(result.is_err());
    }

    #[test]
    fn output_bundle_keeps_unknown_fields() {
        let raw = json!({
            "images": [{"filename": "a.png", "subfolder": "", "type": "output"}],
            "customField": 42,
            "animated": [false]
        });
        let bundle: OutputBundle = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(bundle.images.as_ref().map(Vec::len), Some(1));
        assert_eq!(bundle.extra["customField"], json!(42));
        assert_eq!(serde_json::to_value(&bundle).unwrap(), raw);
    }

    #[test]
    fn output_bundle_rejects_malformed_images() {
        let raw = json!({"images": [{"filename": 3, "type": "output"}]});
        assert!(serde_json::from_value::<OutputBundle>(raw).is_err());
    }

    #[test]
    fn result_items_chains_images_and_audio() {
        let bundle: OutputBundle = serde_json::from_value(json!({
            "images": [{"filename": "a.png", "type": "output"}],
            "audio": [{"filename": "b.flac", "type": "output"}]
        }))
        .unwrap();
        let names: Vec<_> = bundle.result_items().map(|i| i.filename.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.flac"]);
    }
}
