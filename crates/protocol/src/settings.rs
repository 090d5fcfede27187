//! User settings map.
//!
//! Known keys carry a fixed value type that stored settings depend on.
//! Every other key is accepted as-is and written back unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::validation::WireSchema;

/// Icon and color override for a node library bookmark.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkCustomization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkReleaseTrigger {
    #[serde(rename = "always")]
    Always,
    #[serde(rename = "hold shift")]
    HoldShift,
    #[serde(rename = "NOT hold shift")]
    NotHoldShift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeSearchBoxImpl {
    Default,
    Simple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarLocation {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueImageFit {
    Contain,
    Cover,
}

/// Settings document. Known keys are optional but typed when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "Comfy.ColorPalette", default, skip_serializing_if = "Option::is_none")]
    pub color_palette: Option<String>,
    /// Palettes keyed by id; palette contents are owned by the editor.
    #[serde(rename = "Comfy.CustomColorPalettes", default, skip_serializing_if = "Option::is_none")]
    pub custom_color_palettes: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(rename = "Comfy.ConfirmClear", default, skip_serializing_if = "Option::is_none")]
    pub confirm_clear: Option<bool>,
    #[serde(rename = "Comfy.DevMode", default, skip_serializing_if = "Option::is_none")]
    pub dev_mode: Option<bool>,
    #[serde(rename = "Comfy.Workflow.ShowMissingNodesWarning", default, skip_serializing_if = "Option::is_none")]
    pub show_missing_nodes_warning: Option<bool>,
    #[serde(rename = "Comfy.Workflow.ShowMissingModelsWarning", default, skip_serializing_if = "Option::is_none")]
    pub show_missing_models_warning: Option<bool>,
    #[serde(rename = "Comfy.DisableFloatRounding", default, skip_serializing_if = "Option::is_none")]
    pub disable_float_rounding: Option<bool>,
    #[serde(rename = "Comfy.DisableSliders", default, skip_serializing_if = "Option::is_none")]
    pub disable_sliders: Option<bool>,
    #[serde(rename = "Comfy.DOMClippingEnabled", default, skip_serializing_if = "Option::is_none")]
    pub dom_clipping_enabled: Option<bool>,
    #[serde(rename = "Comfy.EditAttention.Delta", default, skip_serializing_if = "Option::is_none")]
    pub edit_attention_delta: Option<f64>,
    #[serde(rename = "Comfy.EnableTooltips", default, skip_serializing_if = "Option::is_none")]
    pub enable_tooltips: Option<bool>,
    #[serde(rename = "Comfy.EnableWorkflowViewRestore", default, skip_serializing_if = "Option::is_none")]
    pub enable_workflow_view_restore: Option<bool>,
    #[serde(rename = "Comfy.FloatRoundingPrecision", default, skip_serializing_if = "Option::is_none")]
    pub float_rounding_precision: Option<f64>,
    #[serde(rename = "Comfy.Graph.ZoomSpeed", default, skip_serializing_if = "Option::is_none")]
    pub graph_zoom_speed: Option<f64>,
    #[serde(rename = "Comfy.InvertMenuScrolling", default, skip_serializing_if = "Option::is_none")]
    pub invert_menu_scrolling: Option<bool>,
    #[serde(rename = "Comfy.Logging.Enabled", default, skip_serializing_if = "Option::is_none")]
    pub logging_enabled: Option<bool>,
    #[serde(rename = "Comfy.NodeLibrary.Bookmarks", default, skip_serializing_if = "Option::is_none")]
    pub node_library_bookmarks: Option<Vec<String>>,
    #[serde(rename = "Comfy.NodeLibrary.Bookmarks.V2", default, skip_serializing_if = "Option::is_none")]
    pub node_library_bookmarks_v2: Option<Vec<String>>,
    #[serde(rename = "Comfy.NodeLibrary.BookmarksCustomization", default, skip_serializing_if = "Option::is_none")]
    pub node_library_bookmarks_customization: Option<BTreeMap<String, BookmarkCustomization>>,
    #[serde(rename = "Comfy.NodeInputConversionSubmenus", default, skip_serializing_if = "Option::is_none")]
    pub node_input_conversion_submenus: Option<bool>,
    #[serde(rename = "Comfy.NodeSearchBoxImpl.LinkReleaseTrigger", default, skip_serializing_if = "Option::is_none")]
    pub link_release_trigger: Option<LinkReleaseTrigger>,
    #[serde(rename = "Comfy.NodeSearchBoxImpl.NodePreview", default, skip_serializing_if = "Option::is_none")]
    pub node_search_box_node_preview: Option<bool>,
    #[serde(rename = "Comfy.NodeSearchBoxImpl", default, skip_serializing_if = "Option::is_none")]
    pub node_search_box_impl: Option<NodeSearchBoxImpl>,
    #[serde(rename = "Comfy.NodeSearchBoxImpl.ShowCategory", default, skip_serializing_if = "Option::is_none")]
    pub node_search_box_show_category: Option<bool>,
    #[serde(rename = "Comfy.NodeSuggestions.number", default, skip_serializing_if = "Option::is_none")]
    pub node_suggestions_number: Option<f64>,
    #[serde(rename = "Comfy.Node.ShowDeprecated", default, skip_serializing_if = "Option::is_none")]
    pub node_show_deprecated: Option<bool>,
    #[serde(rename = "Comfy.Node.ShowExperimental", default, skip_serializing_if = "Option::is_none")]
    pub node_show_experimental: Option<bool>,
    #[serde(rename = "Comfy.PreviewFormat", default, skip_serializing_if = "Option::is_none")]
    pub preview_format: Option<String>,
    #[serde(rename = "Comfy.PromptFilename", default, skip_serializing_if = "Option::is_none")]
    pub prompt_filename: Option<bool>,
    #[serde(rename = "Comfy.Sidebar.Location", default, skip_serializing_if = "Option::is_none")]
    pub sidebar_location: Option<SidebarLocation>,
    #[serde(rename = "Comfy.Sidebar.Size", default, skip_serializing_if = "Option::is_none")]
    pub sidebar_size: Option<f64>,
    #[serde(rename = "Comfy.SwitchUser", default, skip_serializing_if = "Option::is_none")]
    pub switch_user: Option<serde_json::Value>,
    #[serde(rename = "Comfy.SnapToGrid.GridSize", default, skip_serializing_if = "Option::is_none")]
    pub snap_to_grid_size: Option<f64>,
    #[serde(rename = "Comfy.TextareaWidget.FontSize", default, skip_serializing_if = "Option::is_none")]
    pub textarea_font_size: Option<f64>,
    #[serde(rename = "Comfy.TextareaWidget.Spellcheck", default, skip_serializing_if = "Option::is_none")]
    pub textarea_spellcheck: Option<bool>,
    #[serde(rename = "Comfy.UseNewMenu", default, skip_serializing_if = "Option::is_none")]
    pub use_new_menu: Option<serde_json::Value>,
    #[serde(rename = "Comfy.Validation.Workflows", default, skip_serializing_if = "Option::is_none")]
    pub validate_workflows: Option<bool>,
    #[serde(rename = "Comfy.Workflow.SortNodeIdOnSave", default, skip_serializing_if = "Option::is_none")]
    pub sort_node_id_on_save: Option<bool>,
    #[serde(rename = "Comfy.Queue.ImageFit", default, skip_serializing_if = "Option::is_none")]
    pub queue_image_fit: Option<QueueImageFit>,
    #[serde(rename = "Comfy.Workflow.ModelDownload.AllowedSources", default, skip_serializing_if = "Option::is_none")]
    pub model_download_allowed_sources: Option<Vec<String>>,
    #[serde(rename = "Comfy.Workflow.ModelDownload.AllowedSuffixes", default, skip_serializing_if = "Option::is_none")]
    pub model_download_allowed_suffixes: Option<Vec<String>>,
    #[serde(rename = "Comfy.Node.DoubleClickTitleToEdit", default, skip_serializing_if = "Option::is_none")]
    pub double_click_title_to_edit: Option<bool>,
    #[serde(rename = "Comfy.Window.UnloadConfirmation", default, skip_serializing_if = "Option::is_none")]
    pub unload_confirmation: Option<bool>,

    /// Keys outside the known set, kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl WireSchema for Settings {
    const NAME: &'static str = "Settings";
}

#[cfg(test)]
mod tests {
    use comfywire_core::config::ValidationConfig;
    use serde_json::json;

    use super::*;
    use crate::validation::validate;

    #[test]
    fn known_keys_are_typed() {
        let raw = json!({
            "Comfy.ColorPalette": "dark",
            "Comfy.Sidebar.Location": "right",
            "Comfy.Sidebar.Size": 320,
            "Comfy.NodeSearchBoxImpl.LinkReleaseTrigger": "NOT hold shift",
            "Comfy.NodeLibrary.BookmarksCustomization": {"a/b": {"icon": "pi-star"}},
            "Comfy.Queue.ImageFit": "cover"
        });
        let settings: Settings = validate(&raw, &ValidationConfig::default()).unwrap();
        assert_eq!(settings.color_palette.as_deref(), Some("dark"));
        assert_eq!(settings.sidebar_location, Some(SidebarLocation::Right));
        assert_eq!(settings.sidebar_size, Some(320.0));
        assert_eq!(settings.link_release_trigger, Some(LinkReleaseTrigger::NotHoldShift));
        assert_eq!(settings.queue_image_fit, Some(QueueImageFit::Cover));
        assert!(settings.extra.is_empty());
    }

    #[test]
    fn unknown_keys_pass_through() {
        let raw = json!({
            "Comfy.DevMode": true,
            "MyExtension.Theme": {"accent": "#ff0"},
            "Comfy.SomeFutureFlag": 3
        });
        let settings: Settings = validate(&raw, &ValidationConfig::default()).unwrap();
        assert_eq!(settings.dev_mode, Some(true));
        assert_eq!(settings.extra["MyExtension.Theme"]["accent"], json!("#ff0"));
        assert_eq!(serde_json::to_value(&settings).unwrap(), raw);
    }

    #[test]
    fn wrong_type_for_known_key_fails() {
        let config = ValidationConfig::default();
        assert!(validate::<Settings>(&json!({"Comfy.DevMode": "yes"}), &config).is_err());
        assert!(validate::<Settings>(&json!({"Comfy.Sidebar.Location": "top"}), &config).is_err());
        assert!(validate::<Settings>(&json!({"Comfy.Workflow.ModelDownload.AllowedSuffixes": ".ckpt"}), &config).is_err());
    }

    #[test]
    fn any_typed_keys_accept_anything() {
        let raw = json!({"Comfy.UseNewMenu": "Top", "Comfy.SwitchUser": null});
        let settings: Settings = validate(&raw, &ValidationConfig::default()).unwrap();
        assert_eq!(settings.use_new_menu, Some(json!("Top")));
    }

    #[test]
    fn empty_map_is_valid() {
        let settings: Settings = validate(&json!({}), &ValidationConfig::default()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn non_object_fails() {
        assert!(validate::<Settings>(&json!([]), &ValidationConfig::default()).is_err());
    }
}
