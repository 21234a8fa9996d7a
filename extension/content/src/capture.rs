//! Capture helpers exported to the popup and content UI.

use js_sys::{Array, Object, Reflect};
use snapcmd::selector::{self, match_summary};
use snapcmd::{Dom, Rect, SelectorConfig, COMMON_SELECTORS};
use snapcmd_protocol::{CaptureResponse, ContentRequest, CropRect, PixelRect};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::dom::{js_message, WebHost};

/// Resolves a CSS selector to the element a capture would use.
///
/// Resolves to `null` for blank input, otherwise to
/// `{element, count, rect, summary}`. Rejects with a readable message when the
/// selector is invalid, matches nothing, or matches a zero-sized element.
#[wasm_bindgen(js_name = captureBySelector)]
pub fn capture_by_selector(selector: &str) -> Result<JsValue, JsValue> {
    let host = WebHost::new(SelectorConfig::default())?;
    let found = match selector::resolve(&host, selector) {
        Ok(Some(found)) => found,
        Ok(None) => return Ok(JsValue::NULL),
        Err(err) => {
            if err.is_user_error() {
                debug!(%err, "selector rejected");
            } else {
                warn!(%err, "selector lookup failed");
            }
            return Err(JsValue::from_str(&err.to_string()));
        }
    };

    let obj = Object::new();
    Reflect::set(&obj, &"element".into(), &found.element)?;
    Reflect::set(&obj, &"count".into(), &(found.count as f64).into())?;
    Reflect::set(&obj, &"rect".into(), &serde_wasm_bindgen::to_value(&found.rect)?)?;
    Reflect::set(&obj, &"summary".into(), &found.summary().into())?;
    Ok(obj.into())
}

/// Live match count for the selector input, e.g. `"3 elements found (first
/// will be captured)"`. Invalid selectors report no matches.
#[wasm_bindgen(js_name = selectorSummary)]
pub fn selector_summary(selector: &str) -> Result<String, JsValue> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Ok(String::new());
    }
    let host = WebHost::new(SelectorConfig::default())?;
    let count = host.query_selector_all(selector).map_or(0, |found| found.len());
    Ok(match_summary(count))
}

/// Preset selectors offered in the selector input, as `{label, selector}`.
#[wasm_bindgen(js_name = commonSelectors)]
pub fn common_selectors() -> Result<Array, JsValue> {
    let presets = Array::new();
    for preset in COMMON_SELECTORS {
        let obj = Object::new();
        Reflect::set(&obj, &"label".into(), &preset.label.into())?;
        Reflect::set(&obj, &"selector".into(), &preset.selector.into())?;
        presets.push(&obj);
    }
    Ok(presets)
}

/// Crop of a visible-tab screenshot for a region drawn in CSS pixels.
#[wasm_bindgen(js_name = cropRect)]
pub fn crop_rect(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    device_pixel_ratio: f64,
) -> Result<JsValue, JsValue> {
    Ok(serde_wasm_bindgen::to_value(&build_crop(
        Rect::new(x, y, width, height),
        device_pixel_ratio,
    ))?)
}

/// Asks the service worker for a screenshot of the visible tab.
#[wasm_bindgen(js_name = captureVisibleArea)]
pub async fn capture_visible_area() -> Result<String, JsValue> {
    let request = serde_wasm_bindgen::to_value(&ContentRequest::capture_visible_area())?;
    let reply = JsFuture::from(runtime_send_message(&request)).await?;
    let response: CaptureResponse = serde_wasm_bindgen::from_value(reply)?;
    response.into_result().map_err(|err| JsValue::from_str(&err))
}

/// Screenshots the visible tab and cuts out a region drawn in CSS pixels.
///
/// Resolves to a PNG data URL at the region's CSS size.
#[wasm_bindgen(js_name = captureRegion)]
pub async fn capture_region(x: f64, y: f64, width: f64, height: f64) -> Result<String, JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let crop = build_crop(Rect::new(x, y, width, height), window.device_pixel_ratio());

    let data_url = capture_visible_area().await?;
    let image = HtmlImageElement::new()?;
    image.set_src(&data_url);
    JsFuture::from(image.decode()).await?;

    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(JsValue::from)?;
    canvas.set_width(crop.output_width.round() as u32);
    canvas.set_height(crop.output_height.round() as u32);
    let context = canvas
        .get_context("2d")?
        .ok_or("2d context unavailable")?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)?;
    context.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
        &image,
        crop.source.x,
        crop.source.y,
        crop.source.width,
        crop.source.height,
        0.0,
        0.0,
        crop.output_width,
        crop.output_height,
    )?;
    let png = canvas.to_data_url()?;
    debug!(width = crop.output_width, height = crop.output_height, "region cropped");
    Ok(png)
}

/// Hands a data URL to the service worker for download.
#[wasm_bindgen(js_name = requestDownload)]
pub async fn request_download(url: String, filename: String, save_as: bool) -> Result<(), JsValue> {
    let request = serde_wasm_bindgen::to_value(&ContentRequest::Download {
        url,
        filename,
        save_as,
    })?;
    if let Err(err) = JsFuture::from(runtime_send_message(&request)).await {
        warn!(error = %js_message(&err), "download request failed");
        return Err(err);
    }
    Ok(())
}

fn build_crop(region: Rect, device_pixel_ratio: f64) -> CropRect {
    let source = region.to_device_pixels(device_pixel_ratio);
    CropRect::new(pixel_rect(region), pixel_rect(source))
}

fn pixel_rect(rect: Rect) -> PixelRect {
    PixelRect {
        x: rect.x,
        y: rect.y,
        width: rect.width,
        height: rect.height,
    }
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "runtime"], js_name = sendMessage)]
    fn runtime_send_message(message: &JsValue) -> js_sys::Promise;
}
