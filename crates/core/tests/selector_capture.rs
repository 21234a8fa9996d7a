//! Capture-by-selector resolution against the in-memory DOM.

use snapcmd::highlight::element_selector;
use snapcmd::selector::resolve;
use snapcmd::testing::MockDom;
use snapcmd::{COMMON_SELECTORS, Dom, ElementInfo, Error, Rect};

fn page() -> MockDom {
	let mut dom = MockDom::new();
	let body = dom.body();
	let header = dom.add(body, "header", Rect::new(0.0, 0.0, 1280.0, 64.0));
	dom.set_info(header, ElementInfo::new("header").with_class_attr("site-header"));
	let content = dom.add(body, "div", Rect::new(0.0, 64.0, 1280.0, 700.0));
	dom.set_info(content, ElementInfo::new("div").with_id("app").with_class_attr("content"));
	let hidden = dom.add(content, "div", Rect::new(0.0, 0.0, 0.0, 0.0));
	dom.set_info(hidden, ElementInfo::new("div").with_class_attr("tracking-pixel"));
	dom
}

#[test]
fn preset_matches_first_candidate_in_document_order() {
	let dom = page();
	let main_content = COMMON_SELECTORS
		.iter()
		.find(|preset| preset.label == "Main Content")
		.unwrap();

	let found = resolve(&dom, main_content.selector).unwrap().unwrap();
	assert_eq!(element_selector(&dom.describe(&found.element), 2), "div#app.content");
	assert_eq!(found.count, 1);
	assert_eq!(found.summary(), "1 element found");
	assert_eq!(found.rect, Rect::new(0.0, 64.0, 1280.0, 700.0));
}

#[test]
fn invalid_selector_is_reported() {
	let err = resolve(&page(), "div[").unwrap_err();
	assert!(matches!(err, Error::InvalidSelector { ref selector, .. } if selector == "div["));
	assert!(err.is_user_error());
}

#[test]
fn missing_element_is_reported() {
	let err = resolve(&page(), "nav, .nav, .navigation").unwrap_err();
	assert!(err.is_not_found());
	assert_eq!(err.to_string(), "element not found: selector 'nav, .nav, .navigation'");
}

#[test]
fn zero_sized_first_match_is_rejected() {
	let err = resolve(&page(), ".tracking-pixel").unwrap_err();
	let Error::ZeroSizedElement { width, height, .. } = &err else {
		panic!("expected ZeroSizedElement, got {err:?}");
	};
	assert_eq!((*width, *height), (0.0, 0.0));
}
