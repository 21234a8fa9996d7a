//! Region draw: free-form rectangle selection with square constraint, grid and
//! keyboard nudging.
//!
//! Independent of [`SelectionSession`](crate::SelectionSession). The controller
//! owns the rectangle state; a [`DrawSurface`] only renders the [`DrawFrame`]s
//! it is handed.

use tracing::{debug, trace};

use crate::arbitration::Disposition;
use crate::config::{Config, DrawConfig};
use crate::geometry::{Point, Rect};
use crate::highlight::dimension_label;
use crate::host::Cursor;
use crate::input::{Key, KeyEvent, MouseButton};

/// Renders the draw overlay.
pub trait DrawSurface {
	/// Injects the scrim and the instruction banner.
	fn mount(&mut self, instructions: &str, hint: &str);

	fn render(&mut self, frame: &DrawFrame);

	/// Removes every injected node. Must tolerate repeated calls.
	fn unmount(&mut self);

	fn set_cursor(&mut self, cursor: Cursor);

	fn release_listeners(&mut self);
}

/// Snapshot of everything the draw overlay shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DrawFrame {
	/// Normalized rectangle, present once it has a non-zero area.
	pub selection: Option<Rect>,
	/// `"{w} × {h} px"` readout for `selection`.
	pub label: Option<String>,
	pub show_grid: bool,
	pub grid_cell: f64,
	pub dragging: bool,
	/// Top-centre of the Capture/Cancel buttons; only between drags.
	pub actions_at: Option<Point>,
}

/// How a region session ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegionOutcome {
	Selected(Rect),
	Cancelled,
}

/// Result of handling one DOM event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DrawResponse {
	pub disposition: Disposition,
	pub outcome: Option<RegionOutcome>,
}

impl DrawResponse {
	fn new(disposition: Disposition, outcome: Option<RegionOutcome>) -> Self {
		Self { disposition, outcome }
	}
}

/// Moves `cursor` so the rectangle spanned from `start` is a square.
///
/// The side is the larger of the two deltas. Each axis extends toward the
/// cursor; an axis with no movement extends in the negative direction.
pub fn constrain_square(start: Point, cursor: Point) -> Point {
	let size = (cursor.x - start.x).abs().max((cursor.y - start.y).abs());
	let x = if cursor.x > start.x { start.x + size } else { start.x - size };
	let y = if cursor.y > start.y { start.y + size } else { start.y - size };
	Point::new(x, y)
}

/// One region draw session.
pub struct RegionSession<S: DrawSurface> {
	surface: S,
	config: DrawConfig,
	active: bool,
	dragging: bool,
	start: Point,
	end: Point,
	show_grid: bool,
}

impl<S: DrawSurface> RegionSession<S> {
	pub fn start(mut surface: S, config: &Config) -> Self {
		let config = config.draw.clone();
		surface.mount(&config.instructions, &config.hint);
		surface.set_cursor(Cursor::Crosshair);
		debug!("region draw started");

		let mut session = Self {
			surface,
			config,
			active: true,
			dragging: false,
			start: Point::default(),
			end: Point::default(),
			show_grid: false,
		};
		session.render();
		session
	}

	/// Tears the overlay down. Safe to call any number of times.
	pub fn stop(&mut self) {
		if !self.active {
			return;
		}
		self.active = false;
		self.dragging = false;
		self.surface.release_listeners();
		self.surface.unmount();
		self.surface.set_cursor(Cursor::Default);
		debug!("region draw stopped");
	}

	pub fn is_active(&self) -> bool {
		self.active
	}

	pub fn is_dragging(&self) -> bool {
		self.dragging
	}

	pub fn show_grid(&self) -> bool {
		self.show_grid
	}

	/// Current rectangle, normalized whatever the drag direction.
	pub fn rectangle(&self) -> Rect {
		Rect::from_corners(self.start, self.end)
	}

	pub fn surface(&self) -> &S {
		&self.surface
	}

	pub fn surface_mut(&mut self) -> &mut S {
		&mut self.surface
	}

	/// What the overlay should currently show.
	pub fn frame(&self) -> DrawFrame {
		let rect = self.rectangle();
		let selection = rect.is_capturable().then_some(rect);
		DrawFrame {
			selection,
			label: selection.map(dimension_label),
			show_grid: self.show_grid,
			grid_cell: self.config.grid_cell,
			dragging: self.dragging,
			actions_at: selection
				.filter(|_| !self.dragging)
				.map(|rect| Point::new(rect.center_x(), rect.bottom() + self.config.actions_offset)),
		}
	}

	/// Starts a drag on primary-button press.
	pub fn handle_mouse_down(&mut self, button: MouseButton, at: Point) -> DrawResponse {
		if !self.active || button != MouseButton::Primary {
			return DrawResponse::default();
		}
		self.dragging = true;
		self.start = at;
		self.end = at;
		self.render();
		DrawResponse::new(Disposition::PreventDefault, None)
	}

	/// Extends the drag; `square` holds the rectangle to equal sides.
	pub fn handle_mouse_move(&mut self, at: Point, square: bool) -> DrawResponse {
		if !self.active || !self.dragging {
			return DrawResponse::default();
		}
		self.end = if square { constrain_square(self.start, at) } else { at };
		trace!(x = self.end.x, y = self.end.y, square, "drag");
		self.render();
		DrawResponse::default()
	}

	/// Ends the drag and accepts the rectangle if it is large enough.
	///
	/// An undersized rectangle stays on screen but is not reported.
	pub fn handle_mouse_up(&mut self) -> DrawResponse {
		if !self.active || !self.dragging {
			return DrawResponse::default();
		}
		self.dragging = false;
		let outcome = self.accept();
		if outcome.is_none() {
			self.render();
		}
		DrawResponse::new(Disposition::PassThrough, outcome)
	}

	pub fn handle_key(&mut self, event: KeyEvent) -> DrawResponse {
		if !self.active {
			return DrawResponse::default();
		}

		match event.key {
			Key::Escape => DrawResponse::new(Disposition::PreventDefault, Some(self.cancel())),
			Key::Char('g' | 'G') => {
				self.show_grid = !self.show_grid;
				self.render();
				DrawResponse::default()
			}
			Key::Enter if !self.dragging => DrawResponse::new(Disposition::PreventDefault, self.accept()),
			Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight
				if !self.dragging && self.rectangle().is_capturable() =>
			{
				let step = if event.shift {
					self.config.nudge_step_large
				} else {
					self.config.nudge_step
				};
				let (dx, dy) = match event.key {
					Key::ArrowUp => (0.0, -step),
					Key::ArrowDown => (0.0, step),
					Key::ArrowLeft => (-step, 0.0),
					_ => (step, 0.0),
				};
				self.start = self.start.offset(dx, dy);
				self.end = self.end.offset(dx, dy);
				self.render();
				DrawResponse::new(Disposition::PreventDefault, None)
			}
			_ => DrawResponse::default(),
		}
	}

	/// Accepts the current rectangle and tears down.
	///
	/// Returns `None`, leaving the session running, while the rectangle does
	/// not exceed the minimum size on both sides.
	pub fn accept(&mut self) -> Option<RegionOutcome> {
		if !self.active {
			return None;
		}
		let rect = self.rectangle();
		if !rect.exceeds(self.config.min_size) {
			debug!(width = rect.width, height = rect.height, "region below minimum size");
			return None;
		}
		self.stop();
		debug!(?rect, "region selected");
		Some(RegionOutcome::Selected(rect))
	}

	pub fn cancel(&mut self) -> RegionOutcome {
		self.stop();
		debug!("region draw cancelled");
		RegionOutcome::Cancelled
	}

	fn render(&mut self) {
		let frame = self.frame();
		self.surface.render(&frame);
	}
}

impl<S: DrawSurface> Drop for RegionSession<S> {
	fn drop(&mut self) {
		self.stop();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::MockSurface;

	fn session() -> RegionSession<MockSurface> {
		RegionSession::start(MockSurface::new(), &Config::default())
	}

	fn drag(session: &mut RegionSession<MockSurface>, from: Point, to: Point) -> DrawResponse {
		session.handle_mouse_down(MouseButton::Primary, from);
		session.handle_mouse_move(to, false);
		session.handle_mouse_up()
	}

	#[test]
	fn square_extends_toward_the_cursor() {
		let start = Point::new(100.0, 100.0);
		assert_eq!(constrain_square(start, Point::new(150.0, 180.0)), Point::new(180.0, 180.0));
		assert_eq!(constrain_square(start, Point::new(40.0, 130.0)), Point::new(40.0, 160.0));
		assert_eq!(constrain_square(start, Point::new(100.0, 130.0)), Point::new(70.0, 130.0));
	}

	#[test]
	fn start_mounts_with_crosshair() {
		let session = session();
		assert!(session.surface().mounted());
		assert_eq!(session.surface().cursor(), Cursor::Crosshair);
		assert_eq!(session.surface().last_frame().map(|f| f.selection), Some(None));
	}

	#[test]
	fn only_primary_button_starts_a_drag() {
		let mut session = session();
		let response = session.handle_mouse_down(MouseButton::Secondary, Point::new(5.0, 5.0));
		assert_eq!(response, DrawResponse::default());
		assert!(!session.is_dragging());

		let response = session.handle_mouse_down(MouseButton::Primary, Point::new(5.0, 5.0));
		assert_eq!(response.disposition, Disposition::PreventDefault);
		assert!(session.is_dragging());
	}

	#[test]
	fn rectangle_is_normalized_while_dragging_backwards() {
		let mut session = session();
		session.handle_mouse_down(MouseButton::Primary, Point::new(200.0, 150.0));
		session.handle_mouse_move(Point::new(120.0, 100.0), false);
		assert_eq!(session.rectangle(), Rect::new(120.0, 100.0, 80.0, 50.0));

		let frame = session.surface().last_frame().unwrap();
		assert_eq!(frame.label.as_deref(), Some("80 × 50 px"));
		assert!(frame.dragging);
		assert_eq!(frame.actions_at, None);
	}

	#[test]
	fn large_drag_is_accepted_and_tears_down() {
		let mut session = session();
		let response = drag(&mut session, Point::new(10.0, 10.0), Point::new(110.0, 60.0));
		assert_eq!(response.outcome, Some(RegionOutcome::Selected(Rect::new(10.0, 10.0, 100.0, 50.0))));
		assert!(!session.is_active());
		assert!(!session.surface().mounted());
		assert_eq!(session.surface().cursor(), Cursor::Default);
	}

	#[test]
	fn small_drag_stays_on_screen_with_actions() {
		let mut session = session();
		let response = drag(&mut session, Point::new(10.0, 10.0), Point::new(18.0, 30.0));
		assert_eq!(response.outcome, None);
		assert!(session.is_active());

		let frame = session.surface().last_frame().unwrap();
		assert_eq!(frame.selection, Some(Rect::new(10.0, 10.0, 8.0, 20.0)));
		assert_eq!(frame.actions_at, Some(Point::new(14.0, 50.0)));
	}

	#[test]
	fn grid_toggles_without_touching_selection() {
		let mut session = session();
		session.handle_key(KeyEvent::new(Key::Char('g')));
		assert!(session.show_grid());
		assert!(session.surface().last_frame().unwrap().show_grid);
		session.handle_key(KeyEvent::new(Key::Char('G')));
		assert!(!session.show_grid());
		assert_eq!(session.rectangle(), Rect::default());
	}

	#[test]
	fn arrows_nudge_without_resizing() {
		let mut session = session();
		drag(&mut session, Point::new(10.0, 10.0), Point::new(15.0, 15.0));

		let response = session.handle_key(KeyEvent::new(Key::ArrowRight));
		assert_eq!(response.disposition, Disposition::PreventDefault);
		session.handle_key(KeyEvent::with_shift(Key::ArrowDown));
		assert_eq!(session.rectangle(), Rect::new(11.0, 20.0, 5.0, 5.0));
	}

	#[test]
	fn arrows_pass_through_without_a_rectangle() {
		let mut session = session();
		let response = session.handle_key(KeyEvent::new(Key::ArrowLeft));
		assert_eq!(response.disposition, Disposition::PassThrough);
		assert_eq!(session.rectangle(), Rect::default());
	}

	#[test]
	fn enter_uses_the_same_threshold() {
		let mut session = session();
		drag(&mut session, Point::new(0.0, 0.0), Point::new(10.0, 10.0));
		assert_eq!(session.handle_key(KeyEvent::new(Key::Enter)).outcome, None);

		session.handle_mouse_down(MouseButton::Primary, Point::new(0.0, 0.0));
		session.handle_mouse_move(Point::new(40.0, 40.0), false);
		assert_eq!(session.handle_key(KeyEvent::new(Key::Enter)).outcome, None, "ignored mid-drag");
		session.handle_mouse_up();
		assert!(!session.is_active());
	}

	#[test]
	fn escape_cancels_mid_drag() {
		let mut session = session();
		session.handle_mouse_down(MouseButton::Primary, Point::new(0.0, 0.0));
		let response = session.handle_key(KeyEvent::new(Key::Escape));
		assert_eq!(response.outcome, Some(RegionOutcome::Cancelled));
		assert!(!session.surface().listeners_attached());
	}

	#[test]
	fn events_after_stop_are_ignored() {
		let mut session = session();
		session.stop();
		session.stop();
		assert_eq!(session.handle_mouse_down(MouseButton::Primary, Point::new(1.0, 1.0)), DrawResponse::default());
		assert_eq!(session.handle_key(KeyEvent::new(Key::Escape)), DrawResponse::default());
		assert_eq!(session.accept(), None);
	}
}
