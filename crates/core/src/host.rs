//! Seams between the engine and the page it runs in.
//!
//! The engine never touches the DOM directly. [`Dom`] covers the read-only
//! queries it makes against the host page, [`Overlay`] the nodes the extension
//! injects on top of it. The content script implements both over `web-sys`;
//! tests use [`MockDom`](crate::testing::MockDom).
//!
//! `Dom::Node` values are handles into a document the extension does not own.
//! The engine compares and stores them but never mutates the nodes they point
//! to.

use std::fmt;

use crate::config::HighlightStyle;
use crate::error::Result;
use crate::geometry::{Point, Rect, Size, Viewport};
use crate::highlight::TooltipLabel;

/// Tag, id and class list of an element, used for labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementInfo {
	/// Lowercase tag name.
	pub tag: String,
	pub id: Option<String>,
	pub classes: Vec<String>,
}

impl ElementInfo {
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into().to_ascii_lowercase(),
			id: None,
			classes: Vec::new(),
		}
	}

	pub fn with_id(mut self, id: impl Into<String>) -> Self {
		let id = id.into();
		self.id = (!id.is_empty()).then_some(id);
		self
	}

	/// Sets the classes from a raw `class` attribute value.
	pub fn with_class_attr(mut self, class_attr: &str) -> Self {
		self.classes = class_attr.split_whitespace().map(str::to_string).collect();
		self
	}
}

/// Document cursor while a session is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
	/// Whatever the page had before (`cursor: ''`).
	#[default]
	Default,
	Crosshair,
}

impl Cursor {
	pub fn as_css(&self) -> &'static str {
		match self {
			Self::Default => "",
			Self::Crosshair => "crosshair",
		}
	}
}

/// Read-only queries against the host page.
pub trait Dom {
	/// Handle to a host-page element.
	type Node: Clone + PartialEq + fmt::Debug;

	/// Topmost element under a viewport point (`document.elementFromPoint`).
	fn element_from_point(&self, point: Point) -> Option<Self::Node>;

	/// Bounding rectangle in viewport coordinates.
	fn bounding_rect(&self, node: &Self::Node) -> Rect;

	fn parent_element(&self, node: &Self::Node) -> Option<Self::Node>;

	/// Returns true for the page's root container (`document.body`).
	fn is_root_container(&self, node: &Self::Node) -> bool;

	/// `ancestor.contains(node)`; a node contains itself.
	fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

	fn describe(&self, node: &Self::Node) -> ElementInfo;

	fn viewport(&self) -> Viewport;

	/// Node lives inside the extension's shadow-DOM UI root.
	fn is_in_extension_root(&self, node: &Self::Node) -> bool;

	/// Node lives inside an overlay the extension injected into the page.
	fn is_in_overlay(&self, node: &Self::Node) -> bool;

	/// Node is the custom element hosting the extension's shadow root.
	fn is_shadow_host(&self, node: &Self::Node) -> bool;

	/// All elements matching `selector` in document order.
	///
	/// # Errors
	///
	/// Returns [`Error::InvalidSelector`](crate::Error::InvalidSelector) when
	/// the page rejects the selector.
	fn query_selector_all(&self, selector: &str) -> Result<Vec<Self::Node>>;
}

/// The element selector's injected overlay.
///
/// Every method must tolerate being called when the overlay is not mounted;
/// teardown paths call them unconditionally.
pub trait Overlay {
	/// Injects the full-viewport container (scrim, hidden highlight, hidden
	/// tooltip, instruction banner).
	fn mount_overlay(&mut self, instructions: &str);

	/// Removes every injected node.
	fn unmount_overlay(&mut self);

	fn set_cursor(&mut self, cursor: Cursor);

	fn show_highlight(&mut self, rect: Rect, style: &HighlightStyle);

	fn hide_highlight(&mut self);

	/// Fills and shows the tooltip, returning its rendered size.
	fn set_tooltip(&mut self, label: &TooltipLabel) -> Size;

	fn place_tooltip(&mut self, at: Point);

	fn hide_tooltip(&mut self);

	fn set_instructions_visible(&mut self, visible: bool);

	/// Detaches every document listener installed for the session.
	fn release_listeners(&mut self);
}
