//! Wire types exchanged between the SnapCommand content script and its
//! background service worker.
//!
//! Messages travel through `chrome.runtime.sendMessage` as plain JSON values.
//! The content script is the only requester: it asks the worker for the
//! things a page cannot do itself (grab the visible tab, start a download) and
//! the worker answers asynchronously.
//!
//! Types in this crate carry no behaviour beyond serialization and a few
//! constructors; their JSON shape is the contract.

use serde::{Deserialize, Serialize};

/// Request sent from the content script to the service worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ContentRequest {
	/// Screenshot the visible area of the active tab.
	CaptureVisibleArea {
		#[serde(default, skip_serializing_if = "Option::is_none")]
		format: Option<ImageFormat>,
	},
	/// Save a data URL through `chrome.downloads`.
	#[serde(rename_all = "camelCase")]
	Download {
		url: String,
		filename: String,
		#[serde(default)]
		save_as: bool,
	},
}

impl ContentRequest {
	pub fn capture_visible_area() -> Self {
		Self::CaptureVisibleArea { format: None }
	}

	/// `action` tag value, for logs.
	pub fn action(&self) -> &'static str {
		match self {
			Self::CaptureVisibleArea { .. } => "capture-visible-area",
			Self::Download { .. } => "download",
		}
	}
}

/// Answer to [`ContentRequest::CaptureVisibleArea`].
///
/// On success the worker answers with the bare data URL string; on failure
/// with `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaptureResponse {
	DataUrl(String),
	Failed { error: String },
}

impl CaptureResponse {
	pub fn failed(error: impl Into<String>) -> Self {
		Self::Failed { error: error.into() }
	}

	pub fn into_result(self) -> Result<String, String> {
		match self {
			Self::DataUrl(url) => Ok(url),
			Self::Failed { error } => Err(error),
		}
	}
}

/// Encoding requested from `captureVisibleTab`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
	#[default]
	Png,
	Jpeg,
}

impl ImageFormat {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Png => "png",
			Self::Jpeg => "jpeg",
		}
	}
}

/// Rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelRect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

/// How to cut a drawn region out of a visible-tab screenshot.
///
/// The screenshot is in device pixels while the region was drawn in CSS
/// pixels, so `source` is the region scaled by the device pixel ratio and the
/// output canvas keeps the CSS size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRect {
	pub source: PixelRect,
	pub output_width: f64,
	pub output_height: f64,
}

impl CropRect {
	/// Builds a crop from a CSS-pixel `region` and an already scaled `source`.
	pub fn new(region: PixelRect, source: PixelRect) -> Self {
		Self {
			source,
			output_width: region.width,
			output_height: region.height,
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn capture_request_shape() {
		let value = serde_json::to_value(ContentRequest::capture_visible_area()).unwrap();
		assert_eq!(value, json!({"action": "capture-visible-area"}));

		let parsed: ContentRequest =
			serde_json::from_value(json!({"action": "capture-visible-area", "format": "jpeg"})).unwrap();
		assert_eq!(
			parsed,
			ContentRequest::CaptureVisibleArea {
				format: Some(ImageFormat::Jpeg)
			}
		);
	}

	#[test]
	fn download_request_defaults_save_as() {
		let parsed: ContentRequest = serde_json::from_value(json!({
			"action": "download",
			"url": "data:image/png;base64,AAAA",
			"filename": "snapcommand.png",
		}))
		.unwrap();
		assert_eq!(parsed.action(), "download");
		assert!(matches!(parsed, ContentRequest::Download { save_as: false, .. }));

		let value = serde_json::to_value(ContentRequest::Download {
			url: "u".into(),
			filename: "f".into(),
			save_as: true,
		})
		.unwrap();
		assert_eq!(value["saveAs"], json!(true));
	}

	#[test]
	fn unknown_action_is_rejected() {
		let err = serde_json::from_value::<ContentRequest>(json!({"action": "toggle-command-menu"}));
		assert!(err.is_err());
	}

	#[test]
	fn capture_response_is_string_or_error_object() {
		let ok: CaptureResponse = serde_json::from_value(json!("data:image/png;base64,AAAA")).unwrap();
		assert_eq!(ok.into_result(), Ok("data:image/png;base64,AAAA".to_string()));

		let failed = serde_json::to_value(CaptureResponse::failed("No window ID")).unwrap();
		assert_eq!(failed, json!({"error": "No window ID"}));
		let back: CaptureResponse = serde_json::from_value(failed).unwrap();
		assert_eq!(back.into_result(), Err("No window ID".to_string()));
	}

	#[test]
	fn crop_keeps_css_output_size() {
		let region = PixelRect {
			x: 10.0,
			y: 20.0,
			width: 100.0,
			height: 50.0,
		};
		let source = PixelRect {
			x: 20.0,
			y: 40.0,
			width: 200.0,
			height: 100.0,
		};
		let crop = CropRect::new(region, source);
		assert_eq!(
			serde_json::to_value(crop).unwrap(),
			json!({
				"source": {"x": 20.0, "y": 40.0, "width": 200.0, "height": 100.0},
				"outputWidth": 100.0,
				"outputHeight": 50.0,
			})
		);
	}
}
