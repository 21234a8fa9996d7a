//! Confirmation popover: anchor geometry and the intents its buttons emit.
//!
//! The popover holds no selection state. It is re-rendered from each
//! [`PopoverState`](crate::PopoverState) the session emits and forwards its
//! buttons back as [`PopoverIntent`]s.

use serde::{Deserialize, Serialize};

use crate::config::PopoverConfig;
use crate::geometry::{Rect, Viewport};
use crate::host::{Dom, Overlay};
use crate::session::{Reaction, SelectionSession};

/// Virtual reference rectangle the floating popover is positioned against.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorRect {
	pub left: f64,
	pub top: f64,
	pub width: f64,
	pub height: f64,
	pub right: f64,
	pub bottom: f64,
}

impl AnchorRect {
	fn from_origin(left: f64, top: f64, width: f64, height: f64) -> Self {
		Self {
			left,
			top,
			width,
			height,
			right: left + width,
			bottom: top + height,
		}
	}
}

fn clamp_between(value: f64, min: f64, max: f64) -> f64 {
	value.min(max).max(min)
}

/// Derives the popover anchor for a target's bounding rectangle.
///
/// Targets wider than `oversize_ratio` of the viewport get a fixed-width anchor
/// centred on them; targets taller than that get a fixed-height anchor pinned
/// near the top of the viewport. The anchor origin is then clamped so it stays
/// `edge_padding` away from every edge with room for the popover footprint.
pub fn anchor_rect(target: Rect, viewport: Viewport, config: &PopoverConfig) -> AnchorRect {
	let mut left = target.left();
	let mut top = target.top();
	let mut width = target.width;
	let mut height = target.height;

	if target.width > viewport.width * config.oversize_ratio {
		width = config.reference_width;
		left = target.center_x() - config.reference_width / 2.0;
	}
	if target.height > viewport.height * config.oversize_ratio {
		height = config.reference_height;
		top = target.top().max(config.min_top_offset);
	}

	let pad = config.edge_padding;
	let left = clamp_between(left, pad, viewport.width - config.footprint_width - pad);
	let top = clamp_between(top, pad, viewport.height - config.footprint_height - pad);

	AnchorRect::from_origin(left, top, width, height)
}

/// A button press in the confirmation popover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PopoverIntent {
	MoveUp,
	MoveDown,
	Confirm,
	Cancel,
}

impl<H: Dom + Overlay> SelectionSession<H> {
	/// Runs a popover intent against the session.
	pub fn apply(&mut self, intent: PopoverIntent) -> Reaction<H::Node> {
		match intent {
			PopoverIntent::MoveUp => self.move_to_parent().map_or(Reaction::None, Reaction::ShowPopover),
			PopoverIntent::MoveDown => self.move_to_child().map_or(Reaction::None, Reaction::ShowPopover),
			PopoverIntent::Confirm => self.confirm().map_or(Reaction::None, Reaction::Finished),
			PopoverIntent::Cancel => Reaction::Finished(self.cancel()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn viewport() -> Viewport {
		Viewport::new(1280.0, 800.0)
	}

	#[test]
	fn ordinary_target_anchors_to_its_own_box() {
		let anchor = anchor_rect(Rect::new(100.0, 100.0, 300.0, 200.0), viewport(), &PopoverConfig::default());
		assert_eq!(anchor, AnchorRect::from_origin(100.0, 100.0, 300.0, 200.0));
		assert_eq!(anchor.right, 400.0);
		assert_eq!(anchor.bottom, 300.0);
	}

	#[test]
	fn wide_target_is_recentred_with_reference_width() {
		let anchor = anchor_rect(Rect::new(0.0, 100.0, 1200.0, 200.0), viewport(), &PopoverConfig::default());
		assert_eq!(anchor.left, 500.0);
		assert_eq!(anchor.width, 200.0);
		assert_eq!(anchor.height, 200.0);
	}

	#[test]
	fn tall_target_is_pinned_near_the_top() {
		let anchor = anchor_rect(Rect::new(100.0, -400.0, 300.0, 2000.0), viewport(), &PopoverConfig::default());
		assert_eq!(anchor.top, 50.0);
		assert_eq!(anchor.height, 100.0);
		assert_eq!(anchor.bottom, 150.0);
	}

	#[test]
	fn anchor_is_clamped_inside_the_viewport() {
		let config = PopoverConfig::default();

		let bottom_right = anchor_rect(Rect::new(1200.0, 780.0, 50.0, 10.0), viewport(), &config);
		assert_eq!(bottom_right.left, 1050.0);
		assert_eq!(bottom_right.top, 640.0);
		assert_eq!(bottom_right.right, 1100.0);
		assert_eq!(bottom_right.bottom, 650.0);

		let top_left = anchor_rect(Rect::new(-20.0, 2.0, 30.0, 30.0), viewport(), &config);
		assert_eq!(top_left.left, 10.0);
		assert_eq!(top_left.top, 10.0);
	}

	#[test]
	fn tiny_viewport_prefers_the_top_left_padding() {
		let anchor = anchor_rect(Rect::new(50.0, 50.0, 20.0, 20.0), Viewport::new(100.0, 100.0), &PopoverConfig::default());
		assert_eq!(anchor.left, 10.0);
		assert_eq!(anchor.top, 10.0);
	}

	#[test]
	fn intents_use_kebab_case() {
		assert_eq!(serde_json::to_string(&PopoverIntent::MoveUp).unwrap(), "\"move-up\"");
		let intent: PopoverIntent = serde_json::from_str("\"cancel\"").unwrap();
		assert_eq!(intent, PopoverIntent::Cancel);
	}
}
