//! SnapCommand content script.
//!
//! Wires the `snapcmd` selection engine to the live page and exports the
//! pickers and capture helpers to the extension's JavaScript UI.

mod capture;
mod dom;
mod listeners;
mod logging;
mod picker;
mod region;

use wasm_bindgen::prelude::*;

pub use capture::{
    capture_by_selector, capture_region, capture_visible_area, common_selectors, crop_rect,
    request_download, selector_summary,
};
pub use logging::init_logging;
pub use picker::ElementPicker;
pub use region::RegionPicker;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// Overrides the log filter before any picker is created, e.g. `"debug"`.
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(directive: &str) {
    init_logging(Some(directive));
}
