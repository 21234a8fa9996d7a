//! Viewport-space geometry shared by the highlight, popover and draw modules.
//!
//! Every coordinate here is in CSS pixels relative to the visible viewport, the
//! same space `getBoundingClientRect` and `MouseEvent.clientX/Y` report in.

use serde::{Deserialize, Serialize};

/// A point in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Returns this point moved by `(dx, dy)`.
	pub fn offset(self, dx: f64, dy: f64) -> Self {
		Self {
			x: self.x + dx,
			y: self.y + dy,
		}
	}
}

/// Width and height of a rendered box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
	pub width: f64,
	pub height: f64,
}

impl Size {
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}
}

/// Axis-aligned rectangle with its origin at the top-left corner.
///
/// Rectangles built through [`Rect::from_corners`] are always normalized
/// (`width >= 0`, `height >= 0`) whatever the drag direction was.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self {
			x,
			y,
			width,
			height,
		}
	}

	/// Builds the normalized rectangle spanned by two opposite corners.
	pub fn from_corners(a: Point, b: Point) -> Self {
		Self {
			x: a.x.min(b.x),
			y: a.y.min(b.y),
			width: (b.x - a.x).abs(),
			height: (b.y - a.y).abs(),
		}
	}

	pub fn left(&self) -> f64 {
		self.x
	}

	pub fn top(&self) -> f64 {
		self.y
	}

	pub fn right(&self) -> f64 {
		self.x + self.width
	}

	pub fn bottom(&self) -> f64 {
		self.y + self.height
	}

	pub fn center_x(&self) -> f64 {
		self.x + self.width / 2.0
	}

	pub fn size(&self) -> Size {
		Size::new(self.width, self.height)
	}

	/// Returns `true` if the point lies inside the rectangle (edges inclusive).
	pub fn contains(&self, point: Point) -> bool {
		point.x >= self.left() && point.x <= self.right() && point.y >= self.top() && point.y <= self.bottom()
	}

	/// A rendered box can only be captured when both sides are non-zero.
	pub fn is_capturable(&self) -> bool {
		self.width > 0.0 && self.height > 0.0
	}

	/// Returns `true` when both sides strictly exceed `threshold`.
	pub fn exceeds(&self, threshold: f64) -> bool {
		self.width > threshold && self.height > threshold
	}

	/// Returns the rectangle moved by `(dx, dy)` without resizing it.
	pub fn translate(&self, dx: f64, dy: f64) -> Self {
		Self {
			x: self.x + dx,
			y: self.y + dy,
			..*self
		}
	}

	/// Maps this CSS-pixel rectangle onto a screenshot taken at `device_pixel_ratio`.
	///
	/// `captureVisibleTab` returns a bitmap in device pixels, so the crop source
	/// has to be scaled. A missing or non-positive ratio is treated as `1.0`.
	pub fn to_device_pixels(&self, device_pixel_ratio: f64) -> Self {
		let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
			device_pixel_ratio
		} else {
			1.0
		};
		Self {
			x: self.x * dpr,
			y: self.y * dpr,
			width: self.width * dpr,
			height: self.height * dpr,
		}
	}
}

/// Visible area of the window (`innerWidth` × `innerHeight`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn from_corners_normalizes_any_drag_direction() {
		let expected = Rect::new(100.0, 50.0, 40.0, 30.0);
		let a = Point::new(100.0, 50.0);
		let b = Point::new(140.0, 80.0);
		assert_eq!(Rect::from_corners(a, b), expected);
		assert_eq!(Rect::from_corners(b, a), expected);
		assert_eq!(Rect::from_corners(Point::new(140.0, 50.0), Point::new(100.0, 80.0)), expected);
	}

	#[test]
	fn zero_sized_rect_is_not_capturable() {
		assert!(!Rect::new(10.0, 10.0, 0.0, 20.0).is_capturable());
		assert!(!Rect::new(10.0, 10.0, 20.0, 0.0).is_capturable());
		assert!(Rect::new(10.0, 10.0, 0.5, 0.5).is_capturable());
	}

	#[test]
	fn exceeds_is_strict_on_both_axes() {
		assert!(!Rect::new(0.0, 0.0, 10.0, 10.0).exceeds(10.0));
		assert!(!Rect::new(0.0, 0.0, 8.0, 20.0).exceeds(10.0));
		assert!(Rect::new(0.0, 0.0, 10.01, 10.01).exceeds(10.0));
	}

	#[test]
	fn translate_keeps_size() {
		let moved = Rect::new(5.0, 5.0, 20.0, 10.0).translate(-10.0, 3.0);
		assert_eq!(moved, Rect::new(-5.0, 8.0, 20.0, 10.0));
	}

	#[test]
	fn device_pixels_scale_by_ratio() {
		let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
		assert_eq!(rect.to_device_pixels(2.0), Rect::new(20.0, 40.0, 60.0, 80.0));
		assert_eq!(rect.to_device_pixels(0.0), rect);
		assert_eq!(rect.to_device_pixels(f64::NAN), rect);
	}
}
