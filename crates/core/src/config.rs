//! Tunables for the selection overlays.
//!
//! All types deserialize from camelCase JSON with every field optional, so the
//! content script can pass a partial object and inherit the rest from
//! [`Default`].

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Id of the extension's main UI root inside its shadow DOM.
pub const EXTENSION_ROOT_ID: &str = "snapcommand-root";
/// Id of the full-viewport container the element selector injects.
pub const OVERLAY_CONTAINER_ID: &str = "snapcommand-element-selector";
/// Custom element hosting the extension's shadow root.
pub const SHADOW_HOST_TAG: &str = "snapcommand-ui";
/// Attribute marking any other node owned by the extension.
pub const OWNED_NODE_ATTRIBUTE: &str = "data-snapcommand";

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
	pub selector: SelectorConfig,
	pub popover: PopoverConfig,
	pub draw: DrawConfig,
	/// `tracing` filter directive used by the content script logger.
	pub log_level: Option<String>,
}

impl Config {
	/// Parses a (possibly partial) JSON configuration.
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}
}

/// Visual treatment of the highlight box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HighlightStyle {
	pub border_width: f64,
	pub border_color: String,
	pub fill: String,
	pub glow: String,
}

impl HighlightStyle {
	/// Blue style used while hovering in selecting mode.
	pub fn hover() -> Self {
		Self {
			border_width: 2.0,
			border_color: "#3b82f6".to_string(),
			fill: "rgba(59, 130, 246, 0.1)".to_string(),
			glow: "rgba(59, 130, 246, 0.3)".to_string(),
		}
	}

	/// Green style marking the element awaiting confirmation.
	pub fn confirming() -> Self {
		Self {
			border_width: 3.0,
			border_color: "#10b981".to_string(),
			fill: "rgba(16, 185, 129, 0.1)".to_string(),
			glow: "rgba(16, 185, 129, 0.3)".to_string(),
		}
	}
}

impl Default for HighlightStyle {
	fn default() -> Self {
		Self::hover()
	}
}

/// Element selector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectorConfig {
	pub extension_root_id: String,
	pub overlay_container_id: String,
	pub shadow_host_tag: String,
	/// Gap between the pointer and the tooltip, in pixels.
	pub tooltip_offset: f64,
	/// Class names shown in the tooltip label before eliding the rest.
	pub max_label_classes: usize,
	pub instructions: String,
	pub hover_style: HighlightStyle,
	pub confirm_style: HighlightStyle,
}

impl Default for SelectorConfig {
	fn default() -> Self {
		Self {
			extension_root_id: EXTENSION_ROOT_ID.to_string(),
			overlay_container_id: OVERLAY_CONTAINER_ID.to_string(),
			shadow_host_tag: SHADOW_HOST_TAG.to_string(),
			tooltip_offset: 10.0,
			max_label_classes: 2,
			instructions: "Click an element to capture • Press ESC to cancel".to_string(),
			hover_style: HighlightStyle::hover(),
			confirm_style: HighlightStyle::confirming(),
		}
	}
}

/// Placement rules for the confirmation popover anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PopoverConfig {
	/// Fraction of the viewport beyond which a target counts as oversized.
	pub oversize_ratio: f64,
	pub reference_width: f64,
	pub reference_height: f64,
	/// Smallest distance from the top of the viewport for a tall target's anchor.
	pub min_top_offset: f64,
	/// Smallest distance between the anchor and any viewport edge.
	pub edge_padding: f64,
	/// Assumed popover footprint used to keep it on screen.
	pub footprint_width: f64,
	pub footprint_height: f64,
}

impl Default for PopoverConfig {
	fn default() -> Self {
		Self {
			oversize_ratio: 0.8,
			reference_width: 200.0,
			reference_height: 100.0,
			min_top_offset: 50.0,
			edge_padding: 10.0,
			footprint_width: 220.0,
			footprint_height: 150.0,
		}
	}
}

/// Region-draw settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DrawConfig {
	/// Both sides must exceed this to accept a region.
	pub min_size: f64,
	pub nudge_step: f64,
	pub nudge_step_large: f64,
	pub grid_cell: f64,
	/// Distance between the region's bottom edge and the action buttons.
	pub actions_offset: f64,
	pub instructions: String,
	pub hint: String,
}

impl Default for DrawConfig {
	fn default() -> Self {
		Self {
			min_size: 10.0,
			nudge_step: 1.0,
			nudge_step_large: 10.0,
			grid_cell: 20.0,
			actions_offset: 20.0,
			instructions: "Click and drag to select area • Hold Shift for square".to_string(),
			hint: "Press G for grid • Arrow keys to adjust • Enter to capture • ESC to cancel".to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let config = Config::from_json(r#"{"draw": {"minSize": 24}, "logLevel": "debug"}"#).unwrap();
		assert_eq!(config.draw.min_size, 24.0);
		assert_eq!(config.draw.nudge_step_large, 10.0);
		assert_eq!(config.selector, SelectorConfig::default());
		assert_eq!(config.log_level.as_deref(), Some("debug"));
	}

	#[test]
	fn empty_object_is_default() {
		assert_eq!(Config::from_json("{}").unwrap(), Config::default());
	}

	#[test]
	fn malformed_json_is_a_config_error() {
		let err = Config::from_json("{\"draw\": 3}").unwrap_err();
		assert!(matches!(err, crate::Error::Config(_)));
	}

	#[test]
	fn styles_are_distinct() {
		let config = SelectorConfig::default();
		assert_ne!(config.hover_style.border_color, config.confirm_style.border_color);
	}
}
