//! `web-sys` implementation of the engine's page seams.

use snapcmd::config::OWNED_NODE_ATTRIBUTE;
use snapcmd::{
    Cursor, Dom, ElementInfo, Error, HighlightStyle, Overlay, Point, Rect, SelectorConfig, Size,
    TooltipLabel, Viewport,
};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, ShadowRoot, Window};

use crate::listeners::Listeners;

const CONTAINER_CSS: &str = "position: fixed; inset: 0; z-index: 2147483646; pointer-events: none;";
const SCRIM_CSS: &str = "position: absolute; inset: 0; background: rgba(0, 0, 0, 0.1);";
const HIGHLIGHT_CSS: &str = "position: fixed; display: none; box-sizing: border-box; \
    pointer-events: none; border-radius: 2px; transition: all 0.05s ease-out;";
const TOOLTIP_CSS: &str = "position: fixed; display: none; padding: 6px 10px; \
    background: rgba(17, 24, 39, 0.95); color: #f9fafb; border-radius: 4px; \
    font: 12px/1.4 ui-monospace, SFMono-Regular, Menlo, monospace; white-space: pre;";
const INSTRUCTIONS_CSS: &str = "position: fixed; top: 20px; left: 50%; transform: translateX(-50%); \
    padding: 10px 20px; background: rgba(17, 24, 39, 0.9); color: #fff; border-radius: 8px; \
    font: 14px/1.4 system-ui, sans-serif; box-shadow: 0 4px 12px rgba(0, 0, 0, 0.3);";

struct OverlayNodes {
    container: HtmlElement,
    highlight: HtmlElement,
    tooltip: HtmlElement,
    instructions: HtmlElement,
}

/// The live page, plus the overlay and listeners of one selection session.
pub struct WebHost {
    window: Window,
    document: Document,
    config: SelectorConfig,
    overlay: Option<OverlayNodes>,
    listeners: Option<Listeners>,
}

impl WebHost {
    pub fn new(config: SelectorConfig) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        Ok(Self {
            window,
            document,
            config,
            overlay: None,
            listeners: None,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Hands the session's document listeners to the host so `release_listeners`
    /// can detach them.
    pub fn set_listeners(&mut self, listeners: Listeners) {
        self.listeners = Some(listeners);
    }

    fn build_overlay(&self, instructions: &str) -> Result<OverlayNodes, JsValue> {
        let container = create(&self.document, "div", CONTAINER_CSS)?;
        container.set_id(&self.config.overlay_container_id);
        container.set_attribute(OWNED_NODE_ATTRIBUTE, "")?;

        let scrim = create(&self.document, "div", SCRIM_CSS)?;
        let highlight = create(&self.document, "div", HIGHLIGHT_CSS)?;
        let tooltip = create(&self.document, "div", TOOLTIP_CSS)?;
        let banner = create(&self.document, "div", INSTRUCTIONS_CSS)?;
        banner.set_text_content(Some(instructions));

        for child in [&scrim, &highlight, &tooltip, &banner] {
            container.append_child(child)?;
        }
        mount_point(&self.document)?.append_child(&container)?;

        Ok(OverlayNodes {
            container,
            highlight,
            tooltip,
            instructions: banner,
        })
    }
}

impl Dom for WebHost {
    type Node = Element;

    fn element_from_point(&self, point: Point) -> Option<Element> {
        self.document
            .element_from_point(point.x as f32, point.y as f32)
    }

    fn bounding_rect(&self, node: &Element) -> Rect {
        let rect = node.get_bounding_client_rect();
        Rect::new(rect.x(), rect.y(), rect.width(), rect.height())
    }

    fn parent_element(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn is_root_container(&self, node: &Element) -> bool {
        self.document.body().is_some_and(|body| {
            let body: &Element = body.as_ref();
            body == node
        })
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        let node: &web_sys::Node = node;
        ancestor.contains(Some(node))
    }

    fn describe(&self, node: &Element) -> ElementInfo {
        let classes = node.get_attribute("class").unwrap_or_default();
        ElementInfo::new(node.tag_name())
            .with_id(node.id())
            .with_class_attr(&classes)
    }

    fn viewport(&self) -> Viewport {
        let width = self.window.inner_width().ok().and_then(|v| v.as_f64());
        let height = self.window.inner_height().ok().and_then(|v| v.as_f64());
        Viewport::new(width.unwrap_or_default(), height.unwrap_or_default())
    }

    fn is_in_extension_root(&self, node: &Element) -> bool {
        if has_ancestor(node, &format!("#{}", self.config.extension_root_id)) {
            return true;
        }
        node.get_root_node()
            .dyn_into::<ShadowRoot>()
            .is_ok_and(|root| {
                root.host()
                    .tag_name()
                    .eq_ignore_ascii_case(&self.config.shadow_host_tag)
            })
    }

    fn is_in_overlay(&self, node: &Element) -> bool {
        has_ancestor(node, &format!("#{}", self.config.overlay_container_id))
            || has_ancestor(node, &format!("[{OWNED_NODE_ATTRIBUTE}]"))
    }

    fn is_shadow_host(&self, node: &Element) -> bool {
        node.tag_name()
            .eq_ignore_ascii_case(&self.config.shadow_host_tag)
    }

    fn query_selector_all(&self, selector: &str) -> snapcmd::Result<Vec<Element>> {
        let list = self
            .document
            .query_selector_all(selector)
            .map_err(|err| Error::InvalidSelector {
                selector: selector.to_string(),
                reason: js_message(&err),
            })?;
        let mut elements = Vec::with_capacity(list.length() as usize);
        for index in 0..list.length() {
            if let Some(element) = list.item(index).and_then(|n| n.dyn_into::<Element>().ok()) {
                elements.push(element);
            }
        }
        Ok(elements)
    }
}

impl Overlay for WebHost {
    fn mount_overlay(&mut self, instructions: &str) {
        self.unmount_overlay();
        match self.build_overlay(instructions) {
            Ok(nodes) => {
                debug!(id = %self.config.overlay_container_id, "overlay mounted");
                self.overlay = Some(nodes);
            }
            Err(err) => warn!(error = %js_message(&err), "failed to mount overlay"),
        }
    }

    fn unmount_overlay(&mut self) {
        if let Some(nodes) = self.overlay.take() {
            nodes.container.remove();
        }
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        if let Some(body) = self.document.body() {
            apply_cursor(&body, cursor);
        }
    }

    fn show_highlight(&mut self, rect: Rect, style: &HighlightStyle) {
        let Some(nodes) = &self.overlay else {
            return;
        };
        set_styles(
            &nodes.highlight,
            &[
                ("display", "block"),
                ("left", &px(rect.x)),
                ("top", &px(rect.y)),
                ("width", &px(rect.width)),
                ("height", &px(rect.height)),
                (
                    "border",
                    &format!("{}px solid {}", style.border_width, style.border_color),
                ),
                ("background", &style.fill),
                (
                    "box-shadow",
                    &format!("0 0 0 {}px {}", style.border_width, style.glow),
                ),
            ],
        );
    }

    fn hide_highlight(&mut self) {
        if let Some(nodes) = &self.overlay {
            set_styles(&nodes.highlight, &[("display", "none")]);
        }
    }

    fn set_tooltip(&mut self, label: &TooltipLabel) -> Size {
        let Some(nodes) = &self.overlay else {
            return Size::default();
        };
        nodes
            .tooltip
            .set_text_content(Some(&format!("{}\n{}", label.selector, label.dimensions)));
        set_styles(&nodes.tooltip, &[("display", "block")]);
        let rect = nodes.tooltip.get_bounding_client_rect();
        Size::new(rect.width(), rect.height())
    }

    fn place_tooltip(&mut self, at: Point) {
        if let Some(nodes) = &self.overlay {
            set_styles(&nodes.tooltip, &[("left", &px(at.x)), ("top", &px(at.y))]);
        }
    }

    fn hide_tooltip(&mut self) {
        if let Some(nodes) = &self.overlay {
            set_styles(&nodes.tooltip, &[("display", "none")]);
        }
    }

    fn set_instructions_visible(&mut self, visible: bool) {
        if let Some(nodes) = &self.overlay {
            let display = if visible { "block" } else { "none" };
            set_styles(&nodes.instructions, &[("display", display)]);
        }
    }

    fn release_listeners(&mut self) {
        if let Some(listeners) = self.listeners.as_mut() {
            listeners.detach();
        }
    }
}

/// Creates an `HtmlElement` with an inline style.
pub(crate) fn create(document: &Document, tag: &str, css: &str) -> Result<HtmlElement, JsValue> {
    let element = document
        .create_element(tag)?
        .dyn_into::<HtmlElement>()
        .map_err(JsValue::from)?;
    element.style().set_css_text(css);
    Ok(element)
}

/// `document.body`, or the root element on pages without one.
pub(crate) fn mount_point(document: &Document) -> Result<Element, JsValue> {
    document
        .body()
        .map(Element::from)
        .or_else(|| document.document_element())
        .ok_or_else(|| JsValue::from_str("document has no root element"))
}

pub(crate) fn set_styles(element: &HtmlElement, properties: &[(&str, &str)]) {
    let style = element.style();
    for (name, value) in properties {
        if let Err(err) = style.set_property(name, value) {
            warn!(property = name, error = %js_message(&err), "style update rejected");
        }
    }
}

pub(crate) fn apply_cursor(element: &HtmlElement, cursor: Cursor) {
    let style = element.style();
    let result = match cursor {
        Cursor::Default => style.remove_property("cursor").map(|_| ()),
        other => style.set_property("cursor", other.as_css()),
    };
    if let Err(err) = result {
        warn!(error = %js_message(&err), "cursor update rejected");
    }
}

pub(crate) fn px(value: f64) -> String {
    format!("{value}px")
}

fn has_ancestor(node: &Element, selector: &str) -> bool {
    matches!(node.closest(selector), Ok(Some(_)))
}

/// Best-effort message of a thrown JS value.
pub(crate) fn js_message(err: &JsValue) -> String {
    if let Some(message) = js_sys::Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
    {
        return message;
    }
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
