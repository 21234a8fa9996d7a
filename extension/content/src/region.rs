//! `RegionPicker`: the JS-facing region draw overlay.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::Function;
use snapcmd::{
    Config, Cursor, DrawFrame, DrawResponse, DrawSurface, KeyEvent, MouseButton, RegionOutcome,
    RegionSession,
};
use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, KeyboardEvent, MouseEvent};

use crate::dom::{apply_cursor, create, js_message, mount_point, px, set_styles};
use crate::listeners::{Handler, Listeners};
use crate::logging::init_logging;
use crate::picker::{apply_disposition, pointer};

/// Marks the Capture and Cancel buttons; the value names the action.
const ACTION_ATTRIBUTE: &str = "data-snapcommand-action";

const CONTAINER_CSS: &str = "position: fixed; inset: 0; z-index: 2147483646; \
    pointer-events: auto; cursor: crosshair; user-select: none;";
const SCRIM_CSS: &str = "position: absolute; inset: 0; background: rgba(0, 0, 0, 0.4);";
const GRID_CSS: &str = "position: absolute; inset: 0; display: none; pointer-events: none; \
    background-image: linear-gradient(rgba(255, 255, 255, 0.15) 1px, transparent 1px), \
    linear-gradient(90deg, rgba(255, 255, 255, 0.15) 1px, transparent 1px);";
const SELECTION_CSS: &str = "position: fixed; display: none; box-sizing: border-box; \
    pointer-events: none; outline: 2px dashed #ffffff; outline-offset: -1px; \
    border: 2px dashed #3b82f6; box-shadow: 0 0 0 9999px rgba(0, 0, 0, 0.4);";
const LABEL_CSS: &str = "position: fixed; display: none; padding: 4px 8px; pointer-events: none; \
    background: rgba(17, 24, 39, 0.9); color: #fff; border-radius: 4px; \
    font: 12px/1.4 ui-monospace, SFMono-Regular, Menlo, monospace;";
const ACTIONS_CSS: &str = "position: fixed; display: none; gap: 8px; transform: translateX(-50%);";
const BUTTON_CSS: &str = "padding: 6px 14px; border: 0; border-radius: 6px; cursor: pointer; \
    font: 600 13px/1.4 system-ui, sans-serif; color: #fff;";
const INSTRUCTIONS_CSS: &str = "position: fixed; top: 20px; left: 50%; transform: translateX(-50%); \
    padding: 10px 20px; pointer-events: none; text-align: center; \
    background: rgba(17, 24, 39, 0.9); color: #fff; border-radius: 8px; \
    font: 14px/1.4 system-ui, sans-serif; white-space: pre;";

struct SurfaceNodes {
    container: HtmlElement,
    scrim: HtmlElement,
    grid: HtmlElement,
    selection: HtmlElement,
    label: HtmlElement,
    actions: HtmlElement,
}

/// DOM rendering of a [`DrawFrame`].
pub struct WebSurface {
    document: Document,
    nodes: Option<SurfaceNodes>,
    listeners: Option<Listeners>,
}

impl WebSurface {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            nodes: None,
            listeners: None,
        }
    }

    pub fn set_listeners(&mut self, listeners: Listeners) {
        self.listeners = Some(listeners);
    }

    fn build(&self, instructions: &str, hint: &str) -> Result<SurfaceNodes, JsValue> {
        let document = &self.document;
        let container = create(document, "div", CONTAINER_CSS)?;
        container.set_attribute(snapcmd::config::OWNED_NODE_ATTRIBUTE, "")?;

        let scrim = create(document, "div", SCRIM_CSS)?;
        let grid = create(document, "div", GRID_CSS)?;
        let selection = create(document, "div", SELECTION_CSS)?;
        let label = create(document, "div", LABEL_CSS)?;
        let banner = create(document, "div", INSTRUCTIONS_CSS)?;
        banner.set_text_content(Some(&format!("{instructions}\n{hint}")));

        let actions = create(document, "div", ACTIONS_CSS)?;
        for (action, text, color) in [("capture", "Capture", "#10b981"), ("cancel", "Cancel", "#6b7280")] {
            let button = create(document, "button", BUTTON_CSS)?;
            button.set_attribute(ACTION_ATTRIBUTE, action)?;
            button.set_text_content(Some(text));
            set_styles(&button, &[("background", color)]);
            actions.append_child(&button)?;
        }

        for child in [&scrim, &grid, &selection, &label, &actions, &banner] {
            container.append_child(child)?;
        }
        mount_point(document)?.append_child(&container)?;

        Ok(SurfaceNodes {
            container,
            scrim,
            grid,
            selection,
            label,
            actions,
        })
    }
}

impl DrawSurface for WebSurface {
    fn mount(&mut self, instructions: &str, hint: &str) {
        self.unmount();
        match self.build(instructions, hint) {
            Ok(nodes) => self.nodes = Some(nodes),
            Err(err) => warn!(error = %js_message(&err), "failed to mount draw overlay"),
        }
    }

    fn render(&mut self, frame: &DrawFrame) {
        let Some(nodes) = &self.nodes else {
            return;
        };

        if frame.show_grid {
            let cell = px(frame.grid_cell);
            set_styles(
                &nodes.grid,
                &[("display", "block"), ("background-size", &format!("{cell} {cell}"))],
            );
        } else {
            set_styles(&nodes.grid, &[("display", "none")]);
        }

        match frame.selection {
            Some(rect) => {
                // The selection's box-shadow darkens everything around it.
                set_styles(&nodes.scrim, &[("display", "none")]);
                set_styles(
                    &nodes.selection,
                    &[
                        ("display", "block"),
                        ("left", &px(rect.x)),
                        ("top", &px(rect.y)),
                        ("width", &px(rect.width)),
                        ("height", &px(rect.height)),
                    ],
                );
            }
            None => {
                set_styles(&nodes.scrim, &[("display", "block")]);
                set_styles(&nodes.selection, &[("display", "none")]);
            }
        }

        match (&frame.label, frame.selection) {
            (Some(text), Some(rect)) => {
                nodes.label.set_text_content(Some(text));
                set_styles(
                    &nodes.label,
                    &[
                        ("display", "block"),
                        ("left", &px(rect.x)),
                        ("top", &px((rect.y - 28.0).max(4.0))),
                    ],
                );
            }
            _ => set_styles(&nodes.label, &[("display", "none")]),
        }

        match frame.actions_at {
            Some(at) => set_styles(
                &nodes.actions,
                &[("display", "flex"), ("left", &px(at.x)), ("top", &px(at.y))],
            ),
            None => set_styles(&nodes.actions, &[("display", "none")]),
        }
    }

    fn unmount(&mut self) {
        if let Some(nodes) = self.nodes.take() {
            nodes.container.remove();
        }
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        if let Some(body) = self.document.body() {
            apply_cursor(&body, cursor);
        }
    }

    fn release_listeners(&mut self) {
        if let Some(listeners) = self.listeners.as_mut() {
            listeners.detach();
        }
    }
}

#[derive(Clone)]
struct Callbacks {
    on_select: Function,
    on_cancel: Function,
}

#[derive(Default)]
struct Shared {
    session: RefCell<Option<RegionSession<WebSurface>>>,
    callbacks: RefCell<Option<Callbacks>>,
}

/// Click-and-drag region selector.
///
/// `onSelect({x, y, width, height})` receives the region in CSS pixels;
/// `onCancel()` fires on Escape or the Cancel button.
#[wasm_bindgen]
pub struct RegionPicker {
    config: Config,
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl RegionPicker {
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<RegionPicker, JsValue> {
        let config: Config = if config.is_undefined() || config.is_null() {
            Config::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        init_logging(config.log_level.as_deref());
        Ok(Self {
            config,
            shared: Rc::default(),
        })
    }

    pub fn start(&mut self, on_select: Function, on_cancel: Function) -> Result<(), JsValue> {
        self.stop();

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or("no document")?;
        let mut session = RegionSession::start(WebSurface::new(document.clone()), &self.config);

        let weak = Rc::downgrade(&self.shared);
        let entries = ["mousedown", "mousemove", "mouseup", "click", "keydown"]
            .into_iter()
            .map(|name| (name, handler(weak.clone(), name)))
            .collect();
        let listeners = Listeners::attach(document.into(), entries)?;
        session.surface_mut().set_listeners(listeners);

        *self.shared.callbacks.borrow_mut() = Some(Callbacks { on_select, on_cancel });
        *self.shared.session.borrow_mut() = Some(session);
        info!("region selector started");
        Ok(())
    }

    /// Tears the overlay down without firing any callback.
    pub fn stop(&mut self) {
        if let Some(mut session) = self.shared.session.borrow_mut().take() {
            session.stop();
        }
        self.shared.callbacks.borrow_mut().take();
    }

    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.shared
            .session
            .borrow()
            .as_ref()
            .is_some_and(RegionSession::is_active)
    }
}

impl Shared {
    fn dispatch(&self, name: &str, event: &Event) {
        let outcome = {
            let Ok(mut slot) = self.session.try_borrow_mut() else {
                return;
            };
            let Some(session) = slot.as_mut() else {
                return;
            };
            if !session.is_active() {
                return;
            }
            match action_of(name, event) {
                Some(action) => on_action(session, name, &action, event),
                None => {
                    let response = route(session, name, event);
                    apply_disposition(event, response.disposition);
                    response.outcome
                }
            }
        };
        if let Some(outcome) = outcome {
            self.finish(outcome);
        }
    }

    fn finish(&self, outcome: RegionOutcome) {
        let Some(callbacks) = self.callbacks.borrow().clone() else {
            return;
        };
        let result = match outcome {
            RegionOutcome::Selected(rect) => serde_wasm_bindgen::to_value(&rect)
                .map_err(JsValue::from)
                .and_then(|rect| callbacks.on_select.call1(&JsValue::NULL, &rect)),
            RegionOutcome::Cancelled => callbacks.on_cancel.call0(&JsValue::NULL),
        };
        if let Err(err) = result {
            warn!(error = %js_message(&err), "region callback threw");
        }
    }
}

fn handler(shared: Weak<Shared>, name: &'static str) -> Handler {
    Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        if let Some(shared) = shared.upgrade() {
            shared.dispatch(name, &event);
        }
    })
}

fn route(session: &mut RegionSession<WebSurface>, name: &str, event: &Event) -> DrawResponse {
    match name {
        "mousedown" => match (event.dyn_ref::<MouseEvent>(), pointer(event)) {
            (Some(mouse), Some(at)) => {
                session.handle_mouse_down(MouseButton::from_dom(mouse.button()), at)
            }
            _ => DrawResponse::default(),
        },
        "mousemove" => match (event.dyn_ref::<MouseEvent>(), pointer(event)) {
            (Some(mouse), Some(at)) => session.handle_mouse_move(at, mouse.shift_key()),
            _ => DrawResponse::default(),
        },
        "mouseup" => session.handle_mouse_up(),
        "keydown" => match event.dyn_ref::<KeyboardEvent>() {
            Some(key) => session.handle_key(KeyEvent::from_dom(&key.key(), key.shift_key())),
            None => DrawResponse::default(),
        },
        _ => DrawResponse::default(),
    }
}

/// Presses on the Capture and Cancel buttons never start a drag.
fn on_action(
    session: &mut RegionSession<WebSurface>,
    name: &str,
    action: &str,
    event: &Event,
) -> Option<RegionOutcome> {
    event.stop_propagation();
    if name != "click" {
        return None;
    }
    event.prevent_default();
    match action {
        "capture" => session.accept(),
        "cancel" => Some(session.cancel()),
        _ => None,
    }
}

/// Action of the button under a `mousedown` or `click`, if any.
fn action_of(name: &str, event: &Event) -> Option<String> {
    if name != "mousedown" && name != "click" {
        return None;
    }
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let button = target.closest(&format!("[{ACTION_ATTRIBUTE}]")).ok()??;
    button.get_attribute(ACTION_ATTRIBUTE)
}
