use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget};

pub type Handler = Closure<dyn FnMut(Event)>;

/// Capture-phase listeners registered on one target.
///
/// `detach` only unregisters; the closures stay alive until this value is
/// dropped, so detaching from inside one of the handlers is fine.
pub struct Listeners {
    target: EventTarget,
    entries: Vec<(&'static str, Handler)>,
    attached: bool,
}

impl Listeners {
    pub fn attach(target: EventTarget, entries: Vec<(&'static str, Handler)>) -> Result<Self, JsValue> {
        let mut listeners = Self {
            target,
            entries: Vec::with_capacity(entries.len()),
            attached: true,
        };
        for (name, handler) in entries {
            listeners
                .target
                .add_event_listener_with_callback_and_bool(name, handler.as_ref().unchecked_ref(), true)?;
            listeners.entries.push((name, handler));
        }
        Ok(listeners)
    }

    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        for (name, handler) in &self.entries {
            let _ = self
                .target
                .remove_event_listener_with_callback_and_bool(name, handler.as_ref().unchecked_ref(), true);
        }
        tracing::debug!(count = self.entries.len(), "listeners detached");
    }
}

impl Drop for Listeners {
    fn drop(&mut self) {
        self.detach();
    }
}
