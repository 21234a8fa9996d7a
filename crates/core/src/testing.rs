//! Test doubles for the host seams.
//!
//! [`MockDom`] is a small in-memory document implementing [`Dom`] and
//! [`Overlay`]; [`MockSurface`] implements [`DrawSurface`]. Both share their
//! state between clones, so a test can keep an observer after handing the double to
//! a session that consumes it:
//!
//! ```ignore
//! let dom = MockDom::new();
//! let observer = dom.observer();
//! let session = SelectionSession::start(dom, &Config::default());
//! drop(session);
//! assert!(!observer.overlay_mounted());
//! ```

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::config::HighlightStyle;
use crate::draw::{DrawFrame, DrawSurface};
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect, Size, Viewport};
use crate::highlight::TooltipLabel;
use crate::host::{Cursor, Dom, ElementInfo, Overlay};

/// Handle to a node of a [`MockDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(usize);

/// Which part of the page a mock node belongs to. Descendants inherit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
	#[default]
	Page,
	/// Inside the extension's shadow-DOM UI root.
	ExtensionRoot,
	/// Inside an overlay injected by the extension.
	Overlay,
	/// The custom element hosting the shadow root.
	ShadowHost,
}

/// Recorded [`Overlay`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum MockAction {
	MountOverlay,
	UnmountOverlay,
	SetCursor(Cursor),
	ShowHighlight(Rect),
	HideHighlight,
	SetTooltip(String),
	PlaceTooltip(Point),
	HideTooltip,
	SetInstructionsVisible(bool),
	ReleaseListeners,
}

#[derive(Debug)]
struct MockNode {
	parent: Option<usize>,
	rect: Rect,
	info: ElementInfo,
	region: Region,
	detached: bool,
}

#[derive(Debug)]
struct Document {
	nodes: Vec<MockNode>,
	viewport: Viewport,
	overlay_root: Option<usize>,
	cursor: Cursor,
	listeners_attached: bool,
	highlight: Option<(Rect, HighlightStyle)>,
	tooltip: Option<(TooltipLabel, Option<Point>)>,
	tooltip_size: Size,
	instructions: Option<String>,
	instructions_visible: bool,
	actions: Vec<MockAction>,
}

impl Document {
	fn node(&self, node: NodeRef) -> &MockNode {
		&self.nodes[node.0]
	}

	fn ancestors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
		std::iter::successors(Some(node), move |&id| self.nodes[id].parent)
	}

	fn is_attached(&self, node: usize) -> bool {
		self.ancestors(node).all(|id| !self.nodes[id].detached)
	}

	fn in_region(&self, node: usize, region: Region) -> bool {
		self.ancestors(node).any(|id| self.nodes[id].region == region)
	}

	/// Attached page nodes in document order.
	fn document_order(&self) -> Vec<usize> {
		let mut out = Vec::new();
		let mut stack = vec![HTML];
		while let Some(id) = stack.pop() {
			if self.nodes[id].detached {
				continue;
			}
			out.push(id);
			let children = (0..self.nodes.len()).filter(|&child| self.nodes[child].parent == Some(id));
			stack.extend(children.collect::<Vec<_>>().into_iter().rev());
		}
		out
	}
}

const HTML: usize = 0;
const BODY: usize = 1;

/// In-memory document with `<html>` and `<body>` covering the viewport.
///
/// Later-added nodes paint above earlier ones for hit-testing. Overlay nodes
/// never receive hits. `query_selector_all` understands comma-separated
/// compound selectors (`tag`, `#id`, `.class`, `*`); anything else is
/// rejected as invalid.
#[derive(Debug, Clone)]
pub struct MockDom {
	doc: Rc<RefCell<Document>>,
}

impl Default for MockDom {
	fn default() -> Self {
		Self::new()
	}
}

impl MockDom {
	pub fn new() -> Self {
		let viewport = Viewport::new(1280.0, 800.0);
		let full = Rect::new(0.0, 0.0, viewport.width, viewport.height);
		let root = |parent, tag| MockNode {
			parent,
			rect: full,
			info: ElementInfo::new(tag),
			region: Region::Page,
			detached: false,
		};
		Self {
			doc: Rc::new(RefCell::new(Document {
				nodes: vec![root(None, "html"), root(Some(HTML), "body")],
				viewport,
				overlay_root: None,
				cursor: Cursor::Default,
				listeners_attached: true,
				highlight: None,
				tooltip: None,
				tooltip_size: Size::new(120.0, 40.0),
				instructions: None,
				instructions_visible: false,
				actions: Vec::new(),
			})),
		}
	}

	/// Another handle onto the same document.
	pub fn observer(&self) -> Self {
		self.clone()
	}

	fn doc(&self) -> Ref<'_, Document> {
		self.doc.borrow()
	}

	fn doc_mut(&self) -> RefMut<'_, Document> {
		self.doc.borrow_mut()
	}

	pub fn html(&self) -> NodeRef {
		NodeRef(HTML)
	}

	pub fn body(&self) -> NodeRef {
		NodeRef(BODY)
	}

	/// Appends a page element under `parent`.
	pub fn add(&mut self, parent: NodeRef, tag: &str, rect: Rect) -> NodeRef {
		self.add_in(parent, tag, rect, Region::Page)
	}

	pub fn add_in(&mut self, parent: NodeRef, tag: &str, rect: Rect, region: Region) -> NodeRef {
		let mut doc = self.doc_mut();
		doc.nodes.push(MockNode {
			parent: Some(parent.0),
			rect,
			info: ElementInfo::new(tag),
			region,
			detached: false,
		});
		NodeRef(doc.nodes.len() - 1)
	}

	pub fn set_info(&mut self, node: NodeRef, info: ElementInfo) {
		self.doc_mut().nodes[node.0].info = info;
	}

	pub fn set_rect(&mut self, node: NodeRef, rect: Rect) {
		self.doc_mut().nodes[node.0].rect = rect;
	}

	/// Re-parents `node`, as a page script might mid-session.
	pub fn move_node(&mut self, node: NodeRef, parent: NodeRef) {
		self.doc_mut().nodes[node.0].parent = Some(parent.0);
	}

	pub fn remove(&mut self, node: NodeRef) {
		self.doc_mut().nodes[node.0].detached = true;
	}

	pub fn set_viewport(&mut self, viewport: Viewport) {
		self.doc_mut().viewport = viewport;
	}

	/// Size [`Overlay::set_tooltip`] reports for the rendered tooltip.
	pub fn set_tooltip_size(&mut self, size: Size) {
		self.doc_mut().tooltip_size = size;
	}

	pub fn overlay_mounted(&self) -> bool {
		let doc = self.doc();
		doc.overlay_root.is_some_and(|root| doc.is_attached(root))
	}

	/// Attached nodes inside any injected overlay.
	pub fn overlay_node_count(&self) -> usize {
		let doc = self.doc();
		(0..doc.nodes.len())
			.filter(|&id| doc.is_attached(id) && doc.in_region(id, Region::Overlay))
			.count()
	}

	pub fn cursor(&self) -> Cursor {
		self.doc().cursor
	}

	pub fn listeners_attached(&self) -> bool {
		self.doc().listeners_attached
	}

	pub fn highlight(&self) -> Option<(Rect, HighlightStyle)> {
		self.doc().highlight.clone()
	}

	pub fn tooltip(&self) -> Option<(TooltipLabel, Option<Point>)> {
		self.doc().tooltip.clone()
	}

	pub fn instructions(&self) -> Option<String> {
		self.doc().instructions.clone()
	}

	pub fn instructions_visible(&self) -> bool {
		self.doc().instructions_visible
	}

	pub fn actions(&self) -> Vec<MockAction> {
		self.doc().actions.clone()
	}

	fn record(&mut self, action: MockAction) {
		self.doc_mut().actions.push(action);
	}
}

fn parse_compound(compound: &str) -> Option<(Option<String>, Vec<String>, Vec<String>)> {
	let name_char = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
	let mut tag = None;
	let mut ids = Vec::new();
	let mut classes = Vec::new();
	let mut rest = compound;

	let head_len = rest.find(|c: char| !name_char(c) && c != '*').unwrap_or(rest.len());
	if head_len > 0 {
		let head = &rest[..head_len];
		if head != "*" {
			if !head.chars().all(name_char) {
				return None;
			}
			tag = Some(head.to_ascii_lowercase());
		}
		rest = &rest[head_len..];
	}

	while let Some(sigil) = rest.chars().next() {
		let body = &rest[sigil.len_utf8()..];
		let len = body.find(|c: char| !name_char(c)).unwrap_or(body.len());
		if len == 0 {
			return None;
		}
		match sigil {
			'#' => ids.push(body[..len].to_string()),
			'.' => classes.push(body[..len].to_string()),
			_ => return None,
		}
		rest = &body[len..];
	}
	Some((tag, ids, classes))
}

impl Dom for MockDom {
	type Node = NodeRef;

	fn element_from_point(&self, point: Point) -> Option<NodeRef> {
		let doc = self.doc();
		(0..doc.nodes.len())
			.rev()
			.find(|&id| doc.is_attached(id) && !doc.in_region(id, Region::Overlay) && doc.nodes[id].rect.contains(point))
			.map(NodeRef)
	}

	fn bounding_rect(&self, node: &NodeRef) -> Rect {
		self.doc().node(*node).rect
	}

	fn parent_element(&self, node: &NodeRef) -> Option<NodeRef> {
		self.doc().node(*node).parent.map(NodeRef)
	}

	fn is_root_container(&self, node: &NodeRef) -> bool {
		node.0 == BODY
	}

	fn contains(&self, ancestor: &NodeRef, node: &NodeRef) -> bool {
		self.doc().ancestors(node.0).any(|id| id == ancestor.0)
	}

	fn describe(&self, node: &NodeRef) -> ElementInfo {
		self.doc().node(*node).info.clone()
	}

	fn viewport(&self) -> Viewport {
		self.doc().viewport
	}

	fn is_in_extension_root(&self, node: &NodeRef) -> bool {
		self.doc().in_region(node.0, Region::ExtensionRoot)
	}

	fn is_in_overlay(&self, node: &NodeRef) -> bool {
		self.doc().in_region(node.0, Region::Overlay)
	}

	fn is_shadow_host(&self, node: &NodeRef) -> bool {
		self.doc().node(*node).region == Region::ShadowHost
	}

	fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeRef>> {
		let invalid = || Error::InvalidSelector {
			selector: selector.to_string(),
			reason: "not a valid selector".to_string(),
		};
		let compounds = selector
			.split(',')
			.map(|part| parse_compound(part.trim()).filter(|_| !part.trim().is_empty()))
			.collect::<Option<Vec<_>>>()
			.ok_or_else(invalid)?;

		let doc = self.doc();
		let matches = doc
			.document_order()
			.into_iter()
			.filter(|&id| doc.nodes[id].region == Region::Page && !doc.in_region(id, Region::Overlay))
			.filter(|&id| {
				let info = &doc.nodes[id].info;
				compounds.iter().any(|(tag, ids, classes)| {
					tag.as_ref().is_none_or(|tag| *tag == info.tag)
						&& ids.iter().all(|id| info.id.as_ref() == Some(id))
						&& classes.iter().all(|class| info.classes.contains(class))
				})
			})
			.map(NodeRef)
			.collect();
		Ok(matches)
	}
}

impl Overlay for MockDom {
	fn mount_overlay(&mut self, instructions: &str) {
		self.record(MockAction::MountOverlay);
		if self.overlay_mounted() {
			return;
		}
		let viewport = self.viewport();
		let full = Rect::new(0.0, 0.0, viewport.width, viewport.height);
		let body = self.body();
		let root = self.add_in(body, "div", full, Region::Overlay);
		for part in ["scrim", "highlight", "tooltip", "instructions"] {
			let node = self.add_in(root, "div", Rect::default(), Region::Overlay);
			self.set_info(node, ElementInfo::new("div").with_class_attr(part));
		}
		let mut doc = self.doc_mut();
		doc.overlay_root = Some(root.0);
		doc.instructions = Some(instructions.to_string());
		doc.instructions_visible = true;
	}

	fn unmount_overlay(&mut self) {
		self.record(MockAction::UnmountOverlay);
		let mut doc = self.doc_mut();
		if let Some(root) = doc.overlay_root.take() {
			doc.nodes[root].detached = true;
		}
		doc.highlight = None;
		doc.tooltip = None;
		doc.instructions = None;
		doc.instructions_visible = false;
	}

	fn set_cursor(&mut self, cursor: Cursor) {
		self.record(MockAction::SetCursor(cursor));
		self.doc_mut().cursor = cursor;
	}

	fn show_highlight(&mut self, rect: Rect, style: &HighlightStyle) {
		self.record(MockAction::ShowHighlight(rect));
		if self.overlay_mounted() {
			self.doc_mut().highlight = Some((rect, style.clone()));
		}
	}

	fn hide_highlight(&mut self) {
		self.record(MockAction::HideHighlight);
		self.doc_mut().highlight = None;
	}

	fn set_tooltip(&mut self, label: &TooltipLabel) -> Size {
		self.record(MockAction::SetTooltip(label.selector.clone()));
		let mounted = self.overlay_mounted();
		let mut doc = self.doc_mut();
		if mounted {
			doc.tooltip = Some((label.clone(), None));
		}
		doc.tooltip_size
	}

	fn place_tooltip(&mut self, at: Point) {
		self.record(MockAction::PlaceTooltip(at));
		if let Some((_, position)) = self.doc_mut().tooltip.as_mut() {
			*position = Some(at);
		}
	}

	fn hide_tooltip(&mut self) {
		self.record(MockAction::HideTooltip);
		self.doc_mut().tooltip = None;
	}

	fn set_instructions_visible(&mut self, visible: bool) {
		self.record(MockAction::SetInstructionsVisible(visible));
		let mounted = self.overlay_mounted();
		self.doc_mut().instructions_visible = visible && mounted;
	}

	fn release_listeners(&mut self) {
		self.record(MockAction::ReleaseListeners);
		self.doc_mut().listeners_attached = false;
	}
}

#[derive(Debug, Default)]
struct SurfaceState {
	mounted: bool,
	instructions: Option<(String, String)>,
	frames: Vec<DrawFrame>,
	cursor: Cursor,
	listeners_released: bool,
}

/// Draw surface that keeps every rendered frame.
#[derive(Debug, Clone, Default)]
pub struct MockSurface {
	state: Rc<RefCell<SurfaceState>>,
}

impl MockSurface {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn observer(&self) -> Self {
		self.clone()
	}

	pub fn mounted(&self) -> bool {
		self.state.borrow().mounted
	}

	/// Instruction and hint lines shown while mounted.
	pub fn instructions(&self) -> Option<(String, String)> {
		self.state.borrow().instructions.clone()
	}

	pub fn frames(&self) -> Vec<DrawFrame> {
		self.state.borrow().frames.clone()
	}

	pub fn last_frame(&self) -> Option<DrawFrame> {
		self.state.borrow().frames.last().cloned()
	}

	pub fn cursor(&self) -> Cursor {
		self.state.borrow().cursor
	}

	pub fn listeners_attached(&self) -> bool {
		!self.state.borrow().listeners_released
	}
}

impl DrawSurface for MockSurface {
	fn mount(&mut self, instructions: &str, hint: &str) {
		let mut state = self.state.borrow_mut();
		state.mounted = true;
		state.instructions = Some((instructions.to_string(), hint.to_string()));
	}

	fn render(&mut self, frame: &DrawFrame) {
		self.state.borrow_mut().frames.push(frame.clone());
	}

	fn unmount(&mut self) {
		let mut state = self.state.borrow_mut();
		state.mounted = false;
		state.instructions = None;
	}

	fn set_cursor(&mut self, cursor: Cursor) {
		self.state.borrow_mut().cursor = cursor;
	}

	fn release_listeners(&mut self) {
		self.state.borrow_mut().listeners_released = true;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hit_test_prefers_latest_node_and_skips_overlay() {
		let mut dom = MockDom::new();
		let body = dom.body();
		let card = dom.add(body, "div", Rect::new(0.0, 0.0, 100.0, 100.0));
		dom.add_in(body, "div", Rect::new(0.0, 0.0, 100.0, 100.0), Region::Overlay);

		assert_eq!(dom.element_from_point(Point::new(50.0, 50.0)), Some(card));
		assert_eq!(dom.element_from_point(Point::new(500.0, 500.0)), Some(body));
	}

	#[test]
	fn overlay_mount_and_unmount() {
		let mut dom = MockDom::new();
		dom.mount_overlay("hello");
		assert!(dom.overlay_mounted());
		assert_eq!(dom.overlay_node_count(), 5);
		assert_eq!(dom.instructions().as_deref(), Some("hello"));

		dom.unmount_overlay();
		dom.unmount_overlay();
		assert!(!dom.overlay_mounted());
		assert_eq!(dom.overlay_node_count(), 0);
	}

	#[test]
	fn query_selector_all_matches_compounds_in_document_order() {
		let mut dom = MockDom::new();
		let body = dom.body();
		let main = dom.add(body, "main", Rect::default());
		let card = dom.add(main, "div", Rect::default());
		dom.set_info(card, ElementInfo::new("div").with_id("hero").with_class_attr("card wide"));
		let header = dom.add(body, "header", Rect::default());

		assert_eq!(dom.query_selector_all("header, main").unwrap(), vec![main, header]);
		assert_eq!(dom.query_selector_all("div.card#hero").unwrap(), vec![card]);
		assert_eq!(dom.query_selector_all(".wide.card").unwrap(), vec![card]);
		assert!(dom.query_selector_all("nav").unwrap().is_empty());
	}

	#[test]
	fn malformed_selectors_are_rejected() {
		let dom = MockDom::new();
		for selector in ["div[", "div,", ".", "#", "div…", ".card→x"] {
			let err = dom.query_selector_all(selector).unwrap_err();
			assert!(matches!(err, Error::InvalidSelector { .. }), "{selector}");
		}
	}

	#[test]
	fn contains_walks_ancestors() {
		let mut dom = MockDom::new();
		let body = dom.body();
		let outer = dom.add(body, "div", Rect::default());
		let inner = dom.add(outer, "span", Rect::default());
		assert!(dom.contains(&outer, &inner));
		assert!(dom.contains(&inner, &inner));
		assert!(!dom.contains(&inner, &outer));
	}
}
