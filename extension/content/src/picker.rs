//! `ElementPicker`: the JS-facing element selector.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::{Function, Object, Reflect};
use snapcmd::{
    Config, Disposition, EventKind, KeyEvent, Mode, Outcome, Point, PopoverIntent, PopoverState,
    Reaction, Response, SelectionSession,
};
use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, KeyboardEvent, MouseEvent};

use crate::dom::{js_message, WebHost};
use crate::listeners::{Handler, Listeners};
use crate::logging::init_logging;

#[derive(Clone)]
struct Callbacks {
    on_select: Function,
    on_cancel: Function,
    on_show_popover: Function,
}

#[derive(Default)]
struct Shared {
    session: RefCell<Option<SelectionSession<WebHost>>>,
    callbacks: RefCell<Option<Callbacks>>,
}

/// Interactive element selector.
///
/// ```js
/// const picker = new ElementPicker({ logLevel: "debug" });
/// picker.start(onSelect, onCancel, showPopover);
/// ```
///
/// `onSelect(element)` and `onCancel()` fire once when the session ends.
/// `showPopover(state)` fires each time the confirmation popover must be
/// (re)drawn.
#[wasm_bindgen]
pub struct ElementPicker {
    config: Config,
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl ElementPicker {
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ElementPicker, JsValue> {
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

    /// Starts a new session, replacing any running one.
    pub fn start(
        &mut self,
        on_select: Function,
        on_cancel: Function,
        on_show_popover: Function,
    ) -> Result<(), JsValue> {
        self.stop();

        let host = WebHost::new(self.config.selector.clone())?;
        let target = host.document().clone();
        let mut session = SelectionSession::start(host, &self.config);

        let weak = Rc::downgrade(&self.shared);
        let entries = EventKind::ALL
            .into_iter()
            .map(|kind| (kind.as_str(), handler(weak.clone(), kind)))
            .collect();
        // On failure the session drops here and unmounts its overlay.
        let listeners = Listeners::attach(target.into(), entries)?;
        session.host_mut().set_listeners(listeners);
        *self.shared.callbacks.borrow_mut() = Some(Callbacks {
            on_select,
            on_cancel,
            on_show_popover,
        });
        *self.shared.session.borrow_mut() = Some(session);
        info!("element selector started");
        Ok(())
    }

    /// Tears the session down without firing any callback.
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
            .is_some_and(SelectionSession::is_active)
    }

    /// `"selecting"`, `"confirming"` or `undefined` when idle.
    pub fn mode(&self) -> Option<String> {
        let mode = self.shared.session.borrow().as_ref()?.mode()?;
        Some(match mode {
            Mode::Selecting => "selecting".to_string(),
            Mode::Confirming => "confirming".to_string(),
        })
    }

    #[wasm_bindgen(js_name = moveToParent)]
    pub fn move_to_parent(&self) -> bool {
        self.shared.apply(PopoverIntent::MoveUp)
    }

    #[wasm_bindgen(js_name = moveToChild)]
    pub fn move_to_child(&self) -> bool {
        self.shared.apply(PopoverIntent::MoveDown)
    }

    pub fn confirm(&self) -> bool {
        self.shared.apply(PopoverIntent::Confirm)
    }

    pub fn cancel(&self) -> bool {
        self.shared.apply(PopoverIntent::Cancel)
    }

    /// Runs a popover button by name: `"move-up"`, `"move-down"`, `"confirm"`
    /// or `"cancel"`.
    #[wasm_bindgen(js_name = applyIntent)]
    pub fn apply_intent(&self, intent: JsValue) -> Result<bool, JsValue> {
        let intent: PopoverIntent = serde_wasm_bindgen::from_value(intent)?;
        Ok(self.shared.apply(intent))
    }
}

impl Shared {
    fn apply(&self, intent: PopoverIntent) -> bool {
        let reaction = {
            let Ok(mut slot) = self.session.try_borrow_mut() else {
                return false;
            };
            match slot.as_mut() {
                Some(session) => session.apply(intent),
                None => Reaction::None,
            }
        };
        let changed = !reaction.is_none();
        self.react(reaction);
        changed
    }

    fn dispatch(&self, kind: EventKind, event: &Event) {
        let response = {
            let Ok(mut slot) = self.session.try_borrow_mut() else {
                return;
            };
            let Some(session) = slot.as_mut() else {
                return;
            };
            let target = event
                .target()
                .and_then(|target| target.dyn_into::<Element>().ok());
            match route(session, kind, target.as_ref(), event) {
                Some(response) => response,
                None => return,
            }
        };
        apply_disposition(event, response.disposition);
        self.react(response.reaction);
    }

    /// Runs JS callbacks. Never called while the session is borrowed.
    fn react(&self, reaction: Reaction<Element>) {
        let Some(callbacks) = self.callbacks.borrow().clone() else {
            return;
        };
        let result = match reaction {
            Reaction::None => return,
            Reaction::ShowPopover(state) => popover_to_js(&state)
                .and_then(|state| callbacks.on_show_popover.call1(&JsValue::NULL, &state)),
            Reaction::Finished(Outcome::Confirmed(element)) => {
                callbacks.on_select.call1(&JsValue::NULL, &element)
            }
            Reaction::Finished(Outcome::Cancelled) => callbacks.on_cancel.call0(&JsValue::NULL),
        };
        if let Err(err) = result {
            warn!(error = %js_message(&err), "selector callback threw");
        }
    }
}

fn handler(shared: Weak<Shared>, kind: EventKind) -> Handler {
    Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        if let Some(shared) = shared.upgrade() {
            shared.dispatch(kind, &event);
        }
    })
}

fn route(
    session: &mut SelectionSession<WebHost>,
    kind: EventKind,
    target: Option<&Element>,
    event: &Event,
) -> Option<Response<Element>> {
    let response = match kind {
        EventKind::MouseMove => session.handle_mouse_move(target, pointer(event)?),
        EventKind::Click => session.handle_click(target, pointer(event)?),
        EventKind::MouseDown | EventKind::MouseUp | EventKind::ContextMenu => {
            session.handle_guarded_event(kind, target)
        }
        EventKind::KeyDown => {
            let key = event.dyn_ref::<KeyboardEvent>()?;
            session.handle_key(KeyEvent::from_dom(&key.key(), key.shift_key()))
        }
        EventKind::Scroll => {
            session.handle_scroll();
            return None;
        }
    };
    Some(response)
}

pub(crate) fn pointer(event: &Event) -> Option<Point> {
    let mouse = event.dyn_ref::<MouseEvent>()?;
    Some(Point::new(mouse.client_x() as f64, mouse.client_y() as f64))
}

pub(crate) fn apply_disposition(event: &Event, disposition: Disposition) {
    if disposition.prevents_default() {
        event.prevent_default();
    }
    if disposition.stops_propagation() {
        event.stop_propagation();
        event.stop_immediate_propagation();
    }
}

fn popover_to_js(state: &PopoverState<Element>) -> Result<JsValue, JsValue> {
    let label = Object::new();
    Reflect::set(&label, &"selector".into(), &state.label.selector.as_str().into())?;
    Reflect::set(&label, &"dimensions".into(), &state.label.dimensions.as_str().into())?;

    let obj = Object::new();
    Reflect::set(&obj, &"target".into(), &state.target)?;
    Reflect::set(&obj, &"current".into(), &state.current)?;
    Reflect::set(&obj, &"canMoveUp".into(), &state.can_move_up.into())?;
    Reflect::set(&obj, &"canMoveDown".into(), &state.can_move_down.into())?;
    Reflect::set(&obj, &"anchor".into(), &serde_wasm_bindgen::to_value(&state.anchor)?)?;
    Reflect::set(&obj, &"label".into(), &label)?;
    Ok(obj.into())
}
