//! Event arbitration: deciding which events belong to the extension's own UI
//! and which must be kept away from the host page.
//!
//! Every handler routes its target through [`classify`] so the suppression
//! rule is applied the same way everywhere.

use crate::host::Dom;

/// Document-level events a selection session listens to (capture phase).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
	MouseMove,
	Click,
	MouseDown,
	MouseUp,
	KeyDown,
	Scroll,
	ContextMenu,
}

impl EventKind {
	/// Every event the element selector registers for.
	pub const ALL: [EventKind; 7] = [
		EventKind::MouseMove,
		EventKind::Click,
		EventKind::MouseDown,
		EventKind::MouseUp,
		EventKind::KeyDown,
		EventKind::Scroll,
		EventKind::ContextMenu,
	];

	/// DOM event type name.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::MouseMove => "mousemove",
			Self::Click => "click",
			Self::MouseDown => "mousedown",
			Self::MouseUp => "mouseup",
			Self::KeyDown => "keydown",
			Self::Scroll => "scroll",
			Self::ContextMenu => "contextmenu",
		}
	}

	pub fn from_dom(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.as_str() == name)
	}
}

impl std::fmt::Display for EventKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Who an event target belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOrigin {
	/// The extension's shadow-DOM root, its shadow host, or an injected overlay.
	ExtensionUi,
	HostPage,
}

/// What the listener must do with the DOM event after the engine saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
	/// Leave the event alone.
	#[default]
	PassThrough,
	/// `preventDefault()` only; the page still sees the event.
	PreventDefault,
	/// `preventDefault()`, `stopPropagation()` and `stopImmediatePropagation()`.
	Suppress,
}

impl Disposition {
	pub fn prevents_default(&self) -> bool {
		!matches!(self, Self::PassThrough)
	}

	pub fn stops_propagation(&self) -> bool {
		matches!(self, Self::Suppress)
	}
}

/// Classifies an event target.
///
/// A target belongs to the extension iff it is inside the extension's shadow
/// root, inside an injected overlay, or is the shadow host element itself.
/// Targets that are not elements (document, window) belong to the page.
pub fn classify<D: Dom>(dom: &D, target: Option<&D::Node>) -> EventOrigin {
	match target {
		Some(node) if dom.is_in_extension_root(node) || dom.is_in_overlay(node) || dom.is_shadow_host(node) => {
			EventOrigin::ExtensionUi
		}
		_ => EventOrigin::HostPage,
	}
}

/// Baseline treatment of an event before any session logic runs.
///
/// Extension UI is never touched. Host-page button and context-menu events are
/// swallowed outright; moves, keys and scrolls reach the page unless the
/// session decides otherwise.
pub fn disposition_for(kind: EventKind, origin: EventOrigin) -> Disposition {
	match (origin, kind) {
		(EventOrigin::ExtensionUi, _) => Disposition::PassThrough,
		(EventOrigin::HostPage, EventKind::Click | EventKind::MouseDown | EventKind::MouseUp | EventKind::ContextMenu) => {
			Disposition::Suppress
		}
		(EventOrigin::HostPage, EventKind::MouseMove | EventKind::KeyDown | EventKind::Scroll) => Disposition::PassThrough,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::geometry::Rect;
	use crate::testing::{MockDom, Region};

	#[test]
	fn event_names_round_trip() {
		for kind in EventKind::ALL {
			assert_eq!(EventKind::from_dom(kind.as_str()), Some(kind));
		}
		assert_eq!(EventKind::from_dom("wheel"), None);
	}

	#[test]
	fn classify_recognizes_every_extension_region() {
		let mut dom = MockDom::new();
		let body = dom.body();
		let page = dom.add(body, "button", Rect::new(0.0, 0.0, 10.0, 10.0));
		let host = dom.add_in(body, "snapcommand-ui", Rect::default(), Region::ShadowHost);
		let ui = dom.add_in(host, "div", Rect::default(), Region::ExtensionRoot);
		let overlay = dom.add_in(body, "div", Rect::default(), Region::Overlay);

		assert_eq!(classify(&dom, Some(&page)), EventOrigin::HostPage);
		assert_eq!(classify(&dom, Some(&host)), EventOrigin::ExtensionUi);
		assert_eq!(classify(&dom, Some(&ui)), EventOrigin::ExtensionUi);
		assert_eq!(classify(&dom, Some(&overlay)), EventOrigin::ExtensionUi);
		assert_eq!(classify(&dom, None), EventOrigin::HostPage);
	}

	#[test]
	fn host_page_button_events_are_suppressed() {
		for kind in [EventKind::MouseDown, EventKind::MouseUp, EventKind::ContextMenu, EventKind::Click] {
			let disposition = disposition_for(kind, EventOrigin::HostPage);
			assert_eq!(disposition, Disposition::Suppress, "{kind}");
			assert!(disposition.prevents_default() && disposition.stops_propagation());
		}
		assert_eq!(disposition_for(EventKind::MouseMove, EventOrigin::HostPage), Disposition::PassThrough);
	}

	#[test]
	fn extension_ui_always_passes_through() {
		for kind in EventKind::ALL {
			assert_eq!(disposition_for(kind, EventOrigin::ExtensionUi), Disposition::PassThrough);
		}
	}
}
