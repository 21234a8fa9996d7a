//! Capture by CSS selector: resolve a typed selector to the element to capture.

use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::host::Dom;

/// A named selector offered as a one-click preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorPreset {
	pub label: &'static str,
	pub selector: &'static str,
}

pub const COMMON_SELECTORS: &[SelectorPreset] = &[
	SelectorPreset {
		label: "Main Content",
		selector: "main, .main, .content",
	},
	SelectorPreset {
		label: "Header",
		selector: "header, .header",
	},
	SelectorPreset {
		label: "Navigation",
		selector: "nav, .nav, .navigation",
	},
	SelectorPreset {
		label: "First Article",
		selector: "article:first-of-type",
	},
	SelectorPreset {
		label: "All Images",
		selector: "img",
	},
	SelectorPreset {
		label: "Code Blocks",
		selector: "pre, code",
	},
];

/// First element matched by a selector, which is the one captured.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorMatch<N> {
	pub element: N,
	/// Total number of matches.
	pub count: usize,
	pub rect: Rect,
}

impl<N> SelectorMatch<N> {
	pub fn summary(&self) -> String {
		match_summary(self.count)
	}
}

/// Human-readable match count.
pub fn match_summary(count: usize) -> String {
	match count {
		0 => "No elements found".to_string(),
		1 => "1 element found".to_string(),
		n => format!("{n} elements found (first will be captured)"),
	}
}

/// Resolves `selector` to the element a capture would use.
///
/// Blank input yields `Ok(None)`. Surrounding whitespace is ignored.
///
/// # Errors
///
/// - [`Error::InvalidSelector`] if the page rejects the selector
/// - [`Error::ElementNotFound`] if nothing matches
/// - [`Error::ZeroSizedElement`] if the first match has no rendered area
pub fn resolve<D: Dom>(dom: &D, selector: &str) -> Result<Option<SelectorMatch<D::Node>>> {
	let selector = selector.trim();
	if selector.is_empty() {
		return Ok(None);
	}

	let matches = dom.query_selector_all(selector)?;
	let count = matches.len();
	let element = matches.into_iter().next().ok_or_else(|| Error::ElementNotFound {
		selector: selector.to_string(),
	})?;

	let rect = dom.bounding_rect(&element);
	if !rect.is_capturable() {
		return Err(Error::ZeroSizedElement {
			selector: selector.to_string(),
			width: rect.width,
			height: rect.height,
		});
	}

	debug!(selector, count, "selector resolved");
	Ok(Some(SelectorMatch { element, count, rect }))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::MockDom;

	#[test]
	fn summary_wording() {
		assert_eq!(match_summary(0), "No elements found");
		assert_eq!(match_summary(1), "1 element found");
		assert_eq!(match_summary(4), "4 elements found (first will be captured)");
	}

	#[test]
	fn blank_selector_is_not_an_error() {
		let dom = MockDom::new();
		assert_eq!(resolve(&dom, "   ").unwrap(), None);
	}

	#[test]
	fn presets_cover_the_common_regions() {
		let labels: Vec<_> = COMMON_SELECTORS.iter().map(|preset| preset.label).collect();
		assert_eq!(
			labels,
			["Main Content", "Header", "Navigation", "First Article", "All Images", "Code Blocks"]
		);
	}

	#[test]
	fn first_match_is_captured() {
		let mut dom = MockDom::new();
		let body = dom.body();
		let first = dom.add(body, "pre", Rect::new(0.0, 0.0, 300.0, 80.0));
		dom.add(body, "pre", Rect::new(0.0, 100.0, 300.0, 80.0));

		let found = resolve(&dom, " pre ").unwrap().unwrap();
		assert_eq!(found.element, first);
		assert_eq!(found.count, 2);
		assert_eq!(found.summary(), "2 elements found (first will be captured)");
	}
}
