//! Highlight engine: keeps the highlight box and tooltip aligned with an element.
//!
//! There is no push notification when an element moves, so callers re-run
//! these updates on every event that can change geometry (`mousemove`,
//! `scroll`, navigation).

use crate::config::{HighlightStyle, SelectorConfig};
use crate::geometry::{Point, Rect, Size, Viewport};
use crate::host::{Dom, ElementInfo, Overlay};

/// Two-line tooltip text: a short selector and the element's dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TooltipLabel {
	pub selector: String,
	pub dimensions: String,
}

/// Formats `tag#id.class1.class2…`, eliding classes past `max_classes`.
pub fn element_selector(info: &ElementInfo, max_classes: usize) -> String {
	let mut out = info.tag.clone();
	if let Some(id) = &info.id {
		out.push('#');
		out.push_str(id);
	}
	for class in info.classes.iter().take(max_classes) {
		out.push('.');
		out.push_str(class);
	}
	if info.classes.len() > max_classes {
		out.push('…');
	}
	out
}

/// Formats `"{width} × {height} px"` with both sides rounded.
pub fn dimension_label(rect: Rect) -> String {
	format!("{} × {} px", rect.width.round(), rect.height.round())
}

pub fn tooltip_label(info: &ElementInfo, rect: Rect, max_classes: usize) -> TooltipLabel {
	TooltipLabel {
		selector: element_selector(info, max_classes),
		dimensions: dimension_label(rect),
	}
}

/// Positions a tooltip of `size` next to the pointer.
///
/// The default spot is below-right of the pointer; each axis flips to the
/// other side of the pointer when the tooltip would overflow that edge.
pub fn place_tooltip(pointer: Point, size: Size, viewport: Viewport, offset: f64) -> Point {
	let mut x = pointer.x + offset;
	let mut y = pointer.y + offset;
	if x + size.width > viewport.width {
		x = pointer.x - size.width - offset;
	}
	if y + size.height > viewport.height {
		y = pointer.y - size.height - offset;
	}
	Point::new(x, y)
}

/// Renders the hover and confirmation highlights through an [`Overlay`].
#[derive(Debug, Clone)]
pub struct HighlightEngine {
	hover_style: HighlightStyle,
	confirm_style: HighlightStyle,
	tooltip_offset: f64,
	max_label_classes: usize,
}

impl HighlightEngine {
	pub fn new(config: &SelectorConfig) -> Self {
		Self {
			hover_style: config.hover_style.clone(),
			confirm_style: config.confirm_style.clone(),
			tooltip_offset: config.tooltip_offset,
			max_label_classes: config.max_label_classes,
		}
	}

	/// Label for `element` at its current size.
	pub fn label<H: Dom>(&self, host: &H, element: &H::Node) -> TooltipLabel {
		let rect = host.bounding_rect(element);
		tooltip_label(&host.describe(element), rect, self.max_label_classes)
	}

	/// Hover highlight with a pointer-following tooltip.
	///
	/// Returns `false`, with highlight and tooltip hidden, when the element has
	/// no rendered area.
	pub fn update_highlight<H: Dom + Overlay>(&self, host: &mut H, element: &H::Node, pointer: Point) -> bool {
		let rect = host.bounding_rect(element);
		if !rect.is_capturable() {
			host.hide_highlight();
			host.hide_tooltip();
			return false;
		}

		host.show_highlight(rect, &self.hover_style);
		let label = tooltip_label(&host.describe(element), rect, self.max_label_classes);
		let size = host.set_tooltip(&label);
		let at = place_tooltip(pointer, size, host.viewport(), self.tooltip_offset);
		host.place_tooltip(at);
		true
	}

	/// Confirmation highlight tracking the element itself; no tooltip.
	pub fn update_highlight_for_selected<H: Dom + Overlay>(&self, host: &mut H, element: &H::Node) -> bool {
		let rect = host.bounding_rect(element);
		if !rect.is_capturable() {
			host.hide_highlight();
			return false;
		}
		host.show_highlight(rect, &self.confirm_style);
		true
	}
}
