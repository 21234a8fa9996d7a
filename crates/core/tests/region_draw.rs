//! Region draw sessions driven through the public API.

use snapcmd::testing::MockSurface;
use snapcmd::{Config, Cursor, Key, KeyEvent, MouseButton, Point, Rect, RegionOutcome, RegionSession};

fn start() -> (RegionSession<MockSurface>, MockSurface) {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
	let surface = MockSurface::new();
	let observer = surface.observer();
	(RegionSession::start(surface, &Config::default()), observer)
}

fn drag(session: &mut RegionSession<MockSurface>, from: Point, to: Point, shift: bool) -> Option<RegionOutcome> {
	session.handle_mouse_down(MouseButton::Primary, from);
	session.handle_mouse_move(to, shift);
	session.handle_mouse_up().outcome
}

#[test]
fn undersized_region_is_discarded() {
	let (mut session, _) = start();
	assert_eq!(drag(&mut session, Point::new(50.0, 50.0), Point::new(58.0, 70.0), false), None);
	assert!(session.is_active());
	assert_eq!(session.rectangle(), Rect::new(50.0, 50.0, 8.0, 20.0));
}

#[test]
fn region_just_over_threshold_is_accepted() {
	let (mut session, observer) = start();
	let outcome = drag(&mut session, Point::new(50.0, 50.0), Point::new(60.01, 60.01), false);

	let Some(RegionOutcome::Selected(rect)) = outcome else {
		panic!("expected a selection, got {outcome:?}");
	};
	assert!((rect.width - 10.01).abs() < 1e-9);
	assert!((rect.height - 10.01).abs() < 1e-9);
	assert!(!observer.mounted());
	assert!(!observer.listeners_attached());
}

#[test]
fn shift_constrains_to_a_square_toward_the_cursor() {
	let (mut session, _) = start();
	let outcome = drag(&mut session, Point::new(100.0, 100.0), Point::new(150.0, 180.0), true);
	assert_eq!(outcome, Some(RegionOutcome::Selected(Rect::new(100.0, 100.0, 80.0, 80.0))));
}

#[test]
fn shift_square_up_and_left() {
	let (mut session, _) = start();
	let outcome = drag(&mut session, Point::new(300.0, 300.0), Point::new(260.0, 200.0), true);
	assert_eq!(outcome, Some(RegionOutcome::Selected(Rect::new(200.0, 200.0, 100.0, 100.0))));
}

#[test]
fn arrows_and_enter_wait_for_the_drag_to_end() {
	let (mut session, observer) = start();
	drag(&mut session, Point::new(10.0, 10.0), Point::new(10.5, 10.5), false);
	assert_eq!(session.handle_key(KeyEvent::new(Key::Enter)).outcome, None);

	session.handle_mouse_down(MouseButton::Primary, Point::new(10.0, 10.0));
	session.handle_mouse_move(Point::new(30.0, 40.0), false);
	assert!(session.frame().actions_at.is_none());

	assert!(session.is_dragging());
	session.handle_key(KeyEvent::with_shift(Key::ArrowRight));
	assert_eq!(session.rectangle(), Rect::new(10.0, 10.0, 20.0, 30.0));

	let outcome = session.handle_mouse_up().outcome;
	assert_eq!(outcome, Some(RegionOutcome::Selected(Rect::new(10.0, 10.0, 20.0, 30.0))));
	assert_eq!(observer.cursor(), Cursor::Default);
}

#[test]
fn custom_threshold_from_config() {
	let config = Config::from_json(r#"{"draw": {"minSize": 50}}"#).unwrap();
	let mut session = RegionSession::start(MockSurface::new(), &config);
	assert_eq!(drag(&mut session, Point::new(0.0, 0.0), Point::new(40.0, 40.0), false), None);
	assert_eq!(session.handle_key(KeyEvent::new(Key::Escape)).outcome, Some(RegionOutcome::Cancelled));
}

#[test]
fn dropping_the_session_unmounts() {
	let (session, observer) = start();
	assert!(observer.mounted());
	assert!(observer.instructions().is_some());
	drop(session);
	assert!(!observer.mounted());
	assert_eq!(observer.cursor(), Cursor::Default);
}

#[test]
fn every_frame_is_normalized() {
	let (mut session, observer) = start();
	session.handle_mouse_down(MouseButton::Primary, Point::new(200.0, 200.0));
	for to in [Point::new(150.0, 260.0), Point::new(260.0, 120.0), Point::new(100.0, 100.0)] {
		session.handle_mouse_move(to, false);
	}
	for frame in observer.frames() {
		if let Some(rect) = frame.selection {
			assert!(rect.width > 0.0 && rect.height > 0.0);
		}
	}
	assert_eq!(observer.last_frame().unwrap().selection, Some(Rect::new(100.0, 100.0, 100.0, 100.0)));
}
