use std::cell::RefCell;

use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use serde_json::json;
use snapcmd_protocol::{CaptureResponse, ContentRequest, ImageFormat};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

const ACTIVITY_LIMIT: usize = 40;
const STATE_KEY: &str = "snapcmd_state";
const ACTIVITY_KEY: &str = "snapcmd_activity";

thread_local! {
    static ACTIVITY: RefCell<Vec<serde_json::Value>> = const { RefCell::new(Vec::new()) };
}

/// What the toolbar badge shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Idle,
    Capturing,
    Failed,
}

impl Status {
    fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Capturing => "capturing",
            Self::Failed => "failed",
        }
    }

    fn badge(self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::Capturing => "…",
            Self::Failed => "!",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Idle | Self::Capturing => "#3b82f6",
            Self::Failed => "#dc2626",
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let on_message =
        Closure::<dyn FnMut(JsValue, JsValue, Function) -> JsValue>::new(handle_message);
    runtime_on_message_add_listener(&on_message);
    on_message.forget();

    show_status(Status::Idle, None);
    record("worker-started", None);
}

/// `chrome.runtime.onMessage` listener.
///
/// Returns `true` when the answer is sent asynchronously, which keeps the
/// message channel open until `send_response` is called.
fn handle_message(message: JsValue, _sender: JsValue, send_response: Function) -> JsValue {
    let request: ContentRequest = match serde_wasm_bindgen::from_value(message) {
        Ok(request) => request,
        Err(_) => return JsValue::FALSE,
    };

    match request {
        ContentRequest::CaptureVisibleArea { format } => {
            wasm_bindgen_futures::spawn_local(async move {
                show_status(Status::Capturing, None);
                let response = match capture_visible_tab(format.unwrap_or_default()).await {
                    Ok(data_url) => {
                        show_status(Status::Idle, None);
                        record("capture-visible-area", None);
                        CaptureResponse::DataUrl(data_url)
                    }
                    Err(err) => {
                        let message = stringify_js_error(err);
                        show_status(Status::Failed, Some(&message));
                        record("capture-visible-area", Some(&message));
                        CaptureResponse::failed(message)
                    }
                };
                if let Err(err) = respond(&send_response, &response) {
                    record("respond", Some(&stringify_js_error(err)));
                }
            });
            JsValue::TRUE
        }
        ContentRequest::Download {
            url,
            filename,
            save_as,
        } => {
            wasm_bindgen_futures::spawn_local(async move {
                let error = download(&url, &filename, save_as)
                    .await
                    .err()
                    .map(stringify_js_error);
                record("download", error.as_deref());
            });
            JsValue::FALSE
        }
    }
}

fn respond(send_response: &Function, response: &CaptureResponse) -> Result<(), JsValue> {
    send_response.call1(&JsValue::NULL, &to_js(response)?)?;
    Ok(())
}

async fn capture_visible_tab(format: ImageFormat) -> Result<String, JsValue> {
    let window_id = find_active_window().await?;
    let options = to_js(&json!({"format": format.as_str()}))?;
    let data_url = JsFuture::from(tabs_capture_visible_tab(window_id, &options)).await?;
    data_url
        .as_string()
        .ok_or_else(|| JsValue::from_str("captureVisibleTab returned no data URL"))
}

async fn find_active_window() -> Result<i32, JsValue> {
    let query = to_js(&json!({"active": true, "currentWindow": true}))?;
    let tabs = Array::from(&JsFuture::from(tabs_query(&query)).await?);
    let tab = tabs.get(0);
    if tab.is_undefined() {
        return Err(JsValue::from_str("No active tab"));
    }
    let window_id = Reflect::get(&tab, &JsValue::from_str("windowId"))?
        .as_f64()
        .ok_or("No window ID")?;
    Ok(window_id as i32)
}

async fn download(url: &str, filename: &str, save_as: bool) -> Result<(), JsValue> {
    let options = to_js(&json!({
        "url": url,
        "filename": filename,
        "saveAs": save_as,
    }))?;
    JsFuture::from(downloads_download(&options)).await?;
    Ok(())
}

/// Serializes to a plain JS object; `chrome.*` APIs reject ES `Map`s.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

fn stringify_js_error(err: JsValue) -> String {
    if let Some(message) = Reflect::get(&err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
    {
        return message;
    }
    err.as_string()
        .or_else(|| js_sys::JSON::stringify(&err).ok()?.as_string())
        .unwrap_or_else(|| format!("{:?}", err))
}

/// Updates the toolbar badge and mirrors the state to storage for the popup.
fn show_status(status: Status, detail: Option<&str>) {
    let title = match detail {
        Some(detail) => format!("SnapCommand: {detail}"),
        None => "SnapCommand".to_string(),
    };
    let calls = [
        (action_set_badge_text as fn(&JsValue), json!({"text": status.badge()})),
        (action_set_badge_background_color, json!({"color": status.color()})),
        (action_set_title, json!({"title": title})),
    ];
    for (call, details) in calls {
        if let Ok(details) = to_js(&details) {
            call(&details);
        }
    }
    store(json!({
        STATE_KEY: {"status": status.as_str(), "detail": detail},
    }));
}

/// Appends to the bounded activity list shown by the popup.
fn record(event: &str, error: Option<&str>) {
    let entry = json!({
        "at": js_sys::Date::now(),
        "event": event,
        "ok": error.is_none(),
        "error": error,
    });
    ACTIVITY.with(|activity| {
        let mut entries = activity.borrow_mut();
        entries.push(entry);
        let excess = entries.len().saturating_sub(ACTIVITY_LIMIT);
        entries.drain(..excess);
        store(json!({ ACTIVITY_KEY: entries.as_slice() }));
    });
}

fn store(items: serde_json::Value) {
    if let Ok(items) = to_js(&items) {
        let _ = storage_local_set(&items);
    }
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    fn runtime_on_message_add_listener(cb: &Closure<dyn FnMut(JsValue, JsValue, Function) -> JsValue>);

    #[wasm_bindgen(js_namespace = ["chrome", "tabs"], js_name = query)]
    fn tabs_query(query: &JsValue) -> js_sys::Promise;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs"], js_name = captureVisibleTab)]
    fn tabs_capture_visible_tab(window_id: i32, options: &JsValue) -> js_sys::Promise;

    #[wasm_bindgen(js_namespace = ["chrome", "downloads"], js_name = download)]
    fn downloads_download(options: &JsValue) -> js_sys::Promise;

    #[wasm_bindgen(js_namespace = ["chrome", "action"], js_name = setBadgeText)]
    fn action_set_badge_text(details: &JsValue);

    #[wasm_bindgen(js_namespace = ["chrome", "action"], js_name = setBadgeBackgroundColor)]
    fn action_set_badge_background_color(details: &JsValue);

    #[wasm_bindgen(js_namespace = ["chrome", "action"], js_name = setTitle)]
    fn action_set_title(details: &JsValue);

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = set)]
    fn storage_local_set(items: &JsValue) -> js_sys::Promise;
}
