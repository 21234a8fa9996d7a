//! DOM input events reduced to what the selection sessions react to.

/// A `KeyboardEvent.key` value the sessions understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
	Escape,
	Enter,
	ArrowUp,
	ArrowDown,
	ArrowLeft,
	ArrowRight,
	Char(char),
	Other,
}

impl Key {
	/// Maps a DOM `key` string.
	pub fn from_dom(key: &str) -> Self {
		match key {
			"Escape" | "Esc" => Self::Escape,
			"Enter" => Self::Enter,
			"ArrowUp" => Self::ArrowUp,
			"ArrowDown" => Self::ArrowDown,
			"ArrowLeft" => Self::ArrowLeft,
			"ArrowRight" => Self::ArrowRight,
			_ => {
				let mut chars = key.chars();
				match (chars.next(), chars.next()) {
					(Some(c), None) => Self::Char(c),
					_ => Self::Other,
				}
			}
		}
	}
}

/// A keydown with the modifier state the sessions care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
	pub key: Key,
	pub shift: bool,
}

impl KeyEvent {
	pub fn new(key: Key) -> Self {
		Self { key, shift: false }
	}

	pub fn with_shift(key: Key) -> Self {
		Self { key, shift: true }
	}

	/// Builds from the raw DOM `key` string and `shiftKey` flag.
	pub fn from_dom(key: &str, shift: bool) -> Self {
		Self {
			key: Key::from_dom(key),
			shift,
		}
	}
}

/// `MouseEvent.button`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
	Primary,
	Auxiliary,
	Secondary,
	Other(i16),
}

impl MouseButton {
	pub fn from_dom(button: i16) -> Self {
		match button {
			0 => Self::Primary,
			1 => Self::Auxiliary,
			2 => Self::Secondary,
			other => Self::Other(other),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dom_keys_map() {
		assert_eq!(Key::from_dom("Escape"), Key::Escape);
		assert_eq!(Key::from_dom("Esc"), Key::Escape);
		assert_eq!(Key::from_dom("g"), Key::Char('g'));
		assert_eq!(Key::from_dom("G"), Key::Char('G'));
		assert_eq!(Key::from_dom("Tab"), Key::Other);
		assert_eq!(Key::from_dom(""), Key::Other);
	}

	#[test]
	fn mouse_buttons_map() {
		assert_eq!(MouseButton::from_dom(0), MouseButton::Primary);
		assert_eq!(MouseButton::from_dom(2), MouseButton::Secondary);
		assert_eq!(MouseButton::from_dom(4), MouseButton::Other(4));
	}
}
