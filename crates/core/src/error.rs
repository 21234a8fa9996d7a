//! Error types for the selection engine.
//!
//! Interactive selection itself never fails: zero-sized targets, navigation
//! past either end of the history and undersized regions are ignored rather
//! than reported. Errors only come from selector resolution and configuration
//! parsing.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// The page rejected the selector string (`querySelectorAll` threw).
	#[error("invalid CSS selector '{selector}': {reason}")]
	InvalidSelector { selector: String, reason: String },

	/// The selector is valid but nothing on the page matches it.
	#[error("element not found: selector '{selector}'")]
	ElementNotFound { selector: String },

	/// The first match has no rendered area and cannot be captured.
	#[error("element '{selector}' has zero dimensions ({width} × {height}) and cannot be captured")]
	ZeroSizedElement { selector: String, width: f64, height: f64 },

	/// Configuration could not be parsed.
	#[error("invalid configuration: {0}")]
	Config(#[from] serde_json::Error),
}

impl Error {
	/// Returns true if the selector matched nothing.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Error::ElementNotFound { .. })
	}

	/// Returns true for errors caused by what the user typed rather than by the page.
	pub fn is_user_error(&self) -> bool {
		matches!(
			self,
			Error::InvalidSelector { .. } | Error::ElementNotFound { .. } | Error::ZeroSizedElement { .. }
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn messages_name_the_selector() {
		let err = Error::ElementNotFound {
			selector: "main, .main".to_string(),
		};
		assert_eq!(err.to_string(), "element not found: selector 'main, .main'");
		assert!(err.is_not_found());
		assert!(err.is_user_error());
	}

	#[test]
	fn config_errors_are_not_user_errors() {
		let err = crate::Config::from_json("[]").unwrap_err();
		assert!(!err.is_user_error());
		assert!(!err.is_not_found());
	}
}
