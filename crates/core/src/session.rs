//! Element selection session: the `Selecting → Confirming → done` state machine.
//!
//! A [`SelectionSession`] is created per invocation and owns its host for its
//! whole lifetime. The embedding forwards raw DOM events to the `handle_*`
//! methods, applies the returned [`Disposition`] to the event, and acts on the
//! [`Reaction`] (render the popover, or deliver the final [`Outcome`]).
//!
//! Teardown (listeners, overlay, cursor) happens in [`SelectionSession::stop`],
//! which is idempotent and also runs on drop. It always completes before a
//! `Finished` reaction is returned.

use tracing::{debug, trace, warn};

use crate::arbitration::{Disposition, EventKind, EventOrigin, classify, disposition_for};
use crate::config::{Config, PopoverConfig};
use crate::geometry::Point;
use crate::highlight::{HighlightEngine, TooltipLabel};
use crate::host::{Cursor, Dom, Overlay};
use crate::input::{Key, KeyEvent};
use crate::navigation::NavigationHistory;
use crate::popover::{AnchorRect, anchor_rect};

/// Lifecycle state of an active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
	/// Hovering highlights elements; a click picks one.
	Selecting,
	/// An element is picked and awaits confirmation in the popover.
	Confirming,
}

/// Everything the confirmation popover needs to render.
#[derive(Debug, Clone, PartialEq)]
pub struct PopoverState<N> {
	pub target: N,
	pub current: N,
	pub can_move_up: bool,
	pub can_move_down: bool,
	pub anchor: AnchorRect,
	pub label: TooltipLabel,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<N> {
	Confirmed(N),
	Cancelled,
}

/// What the embedding should do after an event was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction<N> {
	None,
	/// Show or refresh the confirmation popover.
	ShowPopover(PopoverState<N>),
	/// The session is torn down; hand the outcome to the caller.
	Finished(Outcome<N>),
}

impl<N> Reaction<N> {
	pub fn is_none(&self) -> bool {
		matches!(self, Self::None)
	}
}

/// Result of handling one DOM event.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<N> {
	pub disposition: Disposition,
	pub reaction: Reaction<N>,
}

impl<N> Response<N> {
	fn new(disposition: Disposition, reaction: Reaction<N>) -> Self {
		Self {
			disposition,
			reaction,
		}
	}

	fn pass() -> Self {
		Self::new(Disposition::PassThrough, Reaction::None)
	}
}

enum State<N> {
	Selecting { hovered: Option<N> },
	Confirming { history: NavigationHistory<N> },
	Stopped,
}

/// One interactive element-selection session.
pub struct SelectionSession<H: Dom + Overlay> {
	host: H,
	highlight: HighlightEngine,
	popover: PopoverConfig,
	state: State<H::Node>,
	popover_open: bool,
}

impl<H: Dom + Overlay> SelectionSession<H> {
	/// Injects the overlay, switches the cursor to a crosshair and enters
	/// [`Mode::Selecting`].
	///
	/// Document listeners are owned by the host; the session releases them on
	/// teardown.
	pub fn start(mut host: H, config: &Config) -> Self {
		host.mount_overlay(&config.selector.instructions);
		host.set_cursor(Cursor::Crosshair);
		debug!("element selection started");

		Self {
			host,
			highlight: HighlightEngine::new(&config.selector),
			popover: config.popover.clone(),
			state: State::Selecting { hovered: None },
			popover_open: false,
		}
	}

	/// Tears the session down. Safe to call any number of times.
	pub fn stop(&mut self) {
		if matches!(self.state, State::Stopped) {
			return;
		}
		self.state = State::Stopped;
		self.popover_open = false;
		self.host.release_listeners();
		self.host.unmount_overlay();
		self.host.set_cursor(Cursor::Default);
		debug!("element selection stopped");
	}

	/// Current mode, or `None` once torn down.
	pub fn mode(&self) -> Option<Mode> {
		match self.state {
			State::Selecting { .. } => Some(Mode::Selecting),
			State::Confirming { .. } => Some(Mode::Confirming),
			State::Stopped => None,
		}
	}

	pub fn is_active(&self) -> bool {
		!matches!(self.state, State::Stopped)
	}

	/// Element under the pointer; only tracked while selecting.
	pub fn hovered(&self) -> Option<&H::Node> {
		match &self.state {
			State::Selecting { hovered } => hovered.as_ref(),
			_ => None,
		}
	}

	/// Element awaiting confirmation.
	pub fn selected(&self) -> Option<&H::Node> {
		self.history().map(NavigationHistory::current)
	}

	pub fn history(&self) -> Option<&NavigationHistory<H::Node>> {
		match &self.state {
			State::Confirming { history } => Some(history),
			_ => None,
		}
	}

	pub fn popover_open(&self) -> bool {
		self.popover_open
	}

	pub fn host(&self) -> &H {
		&self.host
	}

	pub fn host_mut(&mut self) -> &mut H {
		&mut self.host
	}

	/// `mousemove`: track the hovered element while selecting.
	///
	/// Hit-testing uses the pointer position, not the event target. Hovering
	/// has no effect while confirming.
	pub fn handle_mouse_move(&mut self, target: Option<&H::Node>, pointer: Point) -> Response<H::Node> {
		if classify(&self.host, target) == EventOrigin::ExtensionUi {
			return Response::pass();
		}
		if !matches!(self.state, State::Selecting { .. }) {
			return Response::pass();
		}
		let Some(hit) = self.host.element_from_point(pointer) else {
			return Response::pass();
		};
		if classify(&self.host, Some(&hit)) == EventOrigin::ExtensionUi {
			return Response::pass();
		}

		self.highlight.update_highlight(&mut self.host, &hit, pointer);
		trace!(element = ?hit, x = pointer.x, y = pointer.y, "hover");
		if let State::Selecting { hovered } = &mut self.state {
			*hovered = Some(hit);
		}
		Response::pass()
	}

	/// `click`: pick the hovered element, or re-target while confirming.
	///
	/// Host-page clicks are always suppressed. While confirming, clicking a
	/// different host-page element starts over from that element and discards
	/// the previous navigation history.
	pub fn handle_click(&mut self, target: Option<&H::Node>, pointer: Point) -> Response<H::Node> {
		if !self.is_active() {
			return Response::pass();
		}
		let origin = classify(&self.host, target);
		let disposition = disposition_for(EventKind::Click, origin);
		if origin == EventOrigin::ExtensionUi {
			return Response::new(disposition, Reaction::None);
		}

		let candidate = match &self.state {
			State::Selecting { hovered } => hovered.clone(),
			State::Confirming { history } => {
				let selected = history.current();
				self.host
					.element_from_point(pointer)
					.filter(|clicked| clicked != selected && classify(&self.host, Some(clicked)) == EventOrigin::HostPage)
			}
			State::Stopped => None,
		};
		let reaction = candidate.map_or(Reaction::None, |node| self.select(node));
		Response::new(disposition, reaction)
	}

	/// `mousedown`, `mouseup`, `contextmenu`: swallowed on the host page.
	pub fn handle_guarded_event(&self, kind: EventKind, target: Option<&H::Node>) -> Response<H::Node> {
		if !self.is_active() {
			return Response::pass();
		}
		Response::new(disposition_for(kind, classify(&self.host, target)), Reaction::None)
	}

	/// `keydown`: Escape cancels, Enter picks or confirms, arrows navigate.
	pub fn handle_key(&mut self, event: KeyEvent) -> Response<H::Node> {
		let Some(mode) = self.mode() else {
			return Response::pass();
		};

		match (event.key, mode) {
			(Key::Escape, _) => Response::new(Disposition::PreventDefault, Reaction::Finished(self.cancel())),
			(Key::Enter, Mode::Selecting) => {
				let reaction = self.hovered().cloned().map_or(Reaction::None, |node| self.select(node));
				Response::new(Disposition::PreventDefault, reaction)
			}
			(Key::Enter, Mode::Confirming) => {
				let reaction = self.confirm().map_or(Reaction::None, Reaction::Finished);
				Response::new(Disposition::PreventDefault, reaction)
			}
			(Key::ArrowUp, Mode::Confirming) => {
				let reaction = self.move_to_parent().map_or(Reaction::None, Reaction::ShowPopover);
				Response::new(Disposition::PreventDefault, reaction)
			}
			(Key::ArrowDown, Mode::Confirming) => {
				let reaction = self.move_to_child().map_or(Reaction::None, Reaction::ShowPopover);
				Response::new(Disposition::PreventDefault, reaction)
			}
			_ => Response::pass(),
		}
	}

	/// `scroll`: the selected element may have moved relative to the viewport.
	pub fn handle_scroll(&mut self) {
		if let State::Confirming { history } = &self.state {
			let selected = history.current().clone();
			self.highlight.update_highlight_for_selected(&mut self.host, &selected);
		}
	}

	/// Moves the selection to the parent element.
	///
	/// No-op (returns `None`) when not confirming, when the element has no
	/// parent, or when the parent is the page's root container.
	pub fn move_to_parent(&mut self) -> Option<PopoverState<H::Node>> {
		let current = self.selected()?.clone();
		let parent = self.host.parent_element(&current)?;
		if self.host.is_root_container(&parent) {
			return None;
		}
		if let State::Confirming { history } = &mut self.state {
			history.ascend(parent);
			debug!(index = history.index(), depth = history.len(), "moved to parent");
		}
		self.refresh_selected();
		self.popover_state()
	}

	/// Moves the selection back down one previously ascended step.
	///
	/// No-op (returns `None`) at the originally selected element.
	pub fn move_to_child(&mut self) -> Option<PopoverState<H::Node>> {
		let moved = match &mut self.state {
			State::Confirming { history } => history.descend(),
			_ => false,
		};
		if !moved {
			return None;
		}
		debug!("moved to child");
		self.refresh_selected();
		self.popover_state()
	}

	/// Confirms the selected element and tears the session down.
	///
	/// Returns `None`, leaving the session untouched, if nothing is selected.
	pub fn confirm(&mut self) -> Option<Outcome<H::Node>> {
		let selected = self.selected()?.clone();
		self.stop();
		debug!(element = ?selected, "selection confirmed");
		Some(Outcome::Confirmed(selected))
	}

	/// Cancels from any state and tears the session down.
	pub fn cancel(&mut self) -> Outcome<H::Node> {
		self.stop();
		debug!("selection cancelled");
		Outcome::Cancelled
	}

	fn can_move_up(&self, node: &H::Node) -> bool {
		self.host
			.parent_element(node)
			.is_some_and(|parent| !self.host.is_root_container(&parent))
	}

	/// True when `node` sits strictly inside the page's root container.
	fn is_below_root(&self, node: &H::Node) -> bool {
		let mut ancestor = self.host.parent_element(node);
		while let Some(current) = ancestor {
			if self.host.is_root_container(&current) {
				return true;
			}
			ancestor = self.host.parent_element(&current);
		}
		false
	}

	/// Enters (or re-enters) confirming mode on `node`.
	///
	/// The root container and its ancestors are never selectable.
	fn select(&mut self, node: H::Node) -> Reaction<H::Node> {
		if !self.is_below_root(&node) {
			debug!(element = ?node, "ignoring selection outside the root container");
			return Reaction::None;
		}
		let rect = self.host.bounding_rect(&node);
		if !rect.is_capturable() {
			warn!(width = rect.width, height = rect.height, "cannot capture element with zero dimensions");
			return Reaction::None;
		}

		let retarget = matches!(self.state, State::Confirming { .. });
		self.host.hide_tooltip();
		self.host.set_instructions_visible(false);
		self.state = State::Confirming {
			history: NavigationHistory::seed(node),
		};
		debug!(retarget, "element selected");

		self.refresh_selected();
		self.popover_state().map_or(Reaction::None, Reaction::ShowPopover)
	}

	fn refresh_selected(&mut self) {
		if let Some(selected) = self.selected().cloned() {
			self.highlight.update_highlight_for_selected(&mut self.host, &selected);
		}
	}

	fn popover_state(&mut self) -> Option<PopoverState<H::Node>> {
		let history = self.history()?;
		let current = history.current().clone();
		let can_move_down = history.can_move_down();
		let can_move_up = self.can_move_up(&current);
		let anchor = anchor_rect(self.host.bounding_rect(&current), self.host.viewport(), &self.popover);
		let label = self.highlight.label(&self.host, &current);

		self.popover_open = true;
		Some(PopoverState {
			target: current.clone(),
			current,
			can_move_up,
			can_move_down,
			anchor,
			label,
		})
	}
}

impl<H: Dom + Overlay> Drop for SelectionSession<H> {
	fn drop(&mut self) {
		self.stop();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::geometry::Rect;
	use crate::testing::{MockDom, NodeRef};

	struct Page {
		dom: MockDom,
		section: NodeRef,
		card: NodeRef,
		label: NodeRef,
	}

	fn page() -> Page {
		let mut dom = MockDom::new();
		let body = dom.body();
		let section = dom.add(body, "section", Rect::new(0.0, 0.0, 800.0, 600.0));
		let card = dom.add(section, "div", Rect::new(100.0, 100.0, 300.0, 200.0));
		let label = dom.add(card, "span", Rect::new(120.0, 120.0, 80.0, 20.0));
		Page {
			dom,
			section,
			card,
			label,
		}
	}

	#[test]
	fn start_mounts_overlay_and_crosshair() {
		let Page { dom, .. } = page();
		let session = SelectionSession::start(dom, &Config::default());
		assert_eq!(session.mode(), Some(Mode::Selecting));
		assert!(session.host().overlay_mounted());
		assert_eq!(session.host().cursor(), Cursor::Crosshair);
		assert!(!session.popover_open());
	}

	#[test]
	fn hover_tracks_point_hit_not_event_target() {
		let Page { dom, label, section, .. } = page();
		let mut session = SelectionSession::start(dom, &Config::default());

		let response = session.handle_mouse_move(Some(&section), Point::new(130.0, 125.0));
		assert_eq!(response.disposition, Disposition::PassThrough);
		assert_eq!(session.hovered(), Some(&label));
		assert!(session.host().highlight().is_some());
	}

	#[test]
	fn click_enters_confirming_and_shows_popover() {
		let Page { dom, card, .. } = page();
		let mut session = SelectionSession::start(dom, &Config::default());

		session.handle_mouse_move(Some(&card), Point::new(300.0, 250.0));
		let response = session.handle_click(Some(&card), Point::new(300.0, 250.0));

		assert_eq!(response.disposition, Disposition::Suppress);
		let Reaction::ShowPopover(popover) = response.reaction else {
			panic!("expected popover, got {:?}", response.reaction);
		};
		assert_eq!(popover.target, card);
		assert!(popover.can_move_up);
		assert!(!popover.can_move_down);
		assert_eq!(session.mode(), Some(Mode::Confirming));
		assert!(session.popover_open());
		assert!(!session.host().instructions_visible());
		assert!(session.host().tooltip().is_none());
	}

	#[test]
	fn hover_is_ignored_while_confirming() {
		let Page { dom, card, label, .. } = page();
		let mut session = SelectionSession::start(dom, &Config::default());
		session.handle_mouse_move(None, Point::new(300.0, 250.0));
		session.handle_click(Some(&card), Point::new(300.0, 250.0));

		session.handle_mouse_move(Some(&label), Point::new(130.0, 125.0));
		assert_eq!(session.selected(), Some(&card));
		assert_eq!(session.hovered(), None);
	}

	#[test]
	fn move_to_parent_stops_below_root_container() {
		let Page { dom, label, card, section } = page();
		let mut session = SelectionSession::start(dom, &Config::default());
		session.handle_mouse_move(None, Point::new(130.0, 125.0));
		session.handle_click(Some(&label), Point::new(130.0, 125.0));

		assert_eq!(session.move_to_parent().map(|p| p.current), Some(card));
		let top = session.move_to_parent().unwrap();
		assert_eq!(top.current, section);
		assert!(!top.can_move_up);
		assert!(top.can_move_down);

		assert!(session.move_to_parent().is_none());
		assert_eq!(session.selected(), Some(&section));
		assert_eq!(session.history().unwrap().len(), 3);
	}

	#[test]
	fn navigation_is_a_no_op_while_selecting() {
		let Page { dom, .. } = page();
		let mut session = SelectionSession::start(dom, &Config::default());
		assert!(session.move_to_parent().is_none());
		assert!(session.move_to_child().is_none());
		assert!(session.confirm().is_none());
		assert!(session.is_active());
	}

	#[test]
	fn scroll_refreshes_selected_highlight() {
		let Page { dom, card, .. } = page();
		let mut session = SelectionSession::start(dom, &Config::default());
		session.handle_mouse_move(None, Point::new(300.0, 250.0));
		session.handle_click(Some(&card), Point::new(300.0, 250.0));

		session.host_mut().set_rect(card, Rect::new(100.0, 40.0, 300.0, 200.0));
		session.handle_scroll();
		let (rect, _) = session.host().highlight().unwrap();
		assert_eq!(rect, Rect::new(100.0, 40.0, 300.0, 200.0));
	}

	#[test]
	fn drop_tears_down() {
		let Page { dom, .. } = page();
		let observer = dom.observer();
		let session = SelectionSession::start(dom, &Config::default());
		drop(session);
		assert!(!observer.overlay_mounted());
		assert!(!observer.listeners_attached());
		assert_eq!(observer.cursor(), Cursor::Default);
	}
}
