//! `web-sys` render targets and gesture wiring.

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, EventTarget, HtmlElement, MouseEvent, SvgElement, Window};

use crate::error::UiError;
use crate::knob::{KnobBinder, KnobSpec, KnobView, KnobVisual};
use crate::selector::{SelectorBinder, SelectorView};
use crate::toggle::{ToggleBinder, ToggleView};

const ACTIVE_CLASS: &str = "active";
const MODULE_CARD_SELECTOR: &str = ".module-card";

const KNOB_TEMPLATE: &str = r#"
<svg class="knob-svg" viewBox="0 0 36 36">
    <path class="knob-track" d="M18 2.0845 a 15.9155 15.9155 0 0 1 0 31.831 a 15.9155 15.9155 0 0 1 0 -31.831" stroke-dasharray="75, 25" />
    <path class="knob-value-arc" d="M18 2.0845 a 15.9155 15.9155 0 0 1 0 31.831 a 15.9155 15.9155 0 0 1 0 -31.831" stroke-dasharray="0, 100" />
    <circle class="knob-dot" cx="18" cy="2.0845" r="1.5" transform-origin="18 18" />
</svg>
<div class="knob-text"></div>
"#;

/// Every element under `document` matching `selector`.
pub fn query_all(document: &Document, selector: &str) -> Result<Vec<HtmlElement>, UiError> {
    let nodes = document.query_selector_all(selector).map_err(UiError::dom)?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect())
}

pub fn knob_spec(element: &HtmlElement) -> Result<KnobSpec, UiError> {
    let dataset = element.dataset();
    KnobSpec::from_attributes(|key| dataset.get(key))
}

pub fn param_id(element: &HtmlElement) -> Option<String> {
    element.dataset().get("param").filter(|p| !p.is_empty())
}

fn svg_child(root: &Element, selector: &str) -> Option<SvgElement> {
    root.query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<SvgElement>().ok())
}

pub struct DomKnobView {
    arc: Option<SvgElement>,
    dot: Option<SvgElement>,
    text: Option<Element>,
    body: Option<HtmlElement>,
}

impl DomKnobView {
    /// Replaces the container's content with the knob markup.
    pub fn mount(container: &HtmlElement, document: &Document) -> Self {
        container.set_inner_html(KNOB_TEMPLATE);
        Self {
            arc: svg_child(container, ".knob-value-arc"),
            dot: svg_child(container, ".knob-dot"),
            text: container.query_selector(".knob-text").ok().flatten(),
            body: document.body(),
        }
    }
}

fn set_style(element: &SvgElement, property: &str, value: &str) {
    if let Err(e) = element.style().set_property(property, value) {
        log::warn!("{}", UiError::dom(e));
    }
}

impl KnobView for DomKnobView {
    fn render(&self, visual: &KnobVisual) {
        if let Some(arc) = &self.arc {
            let dash = format!("{}, 100", visual.arc_length);
            set_style(arc, "stroke-dasharray", &dash);
        }
        if let Some(dot) = &self.dot {
            let rotate = format!("rotate({}deg)", visual.rotation_deg);
            set_style(dot, "transform", &rotate);
        }
        if let Some(text) = &self.text {
            text.set_text_content(Some(visual.label.as_str()));
        }
    }

    fn set_dragging(&self, dragging: bool) {
        if let Some(body) = &self.body {
            let cursor = if dragging { "ns-resize" } else { "default" };
            if let Err(e) = body.style().set_property("cursor", cursor) {
                log::warn!("{}", UiError::dom(e));
            }
        }
    }
}

pub struct DomToggleView {
    element: Element,
}

impl DomToggleView {
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    pub fn is_active(&self) -> bool {
        self.element.class_list().contains(ACTIVE_CLASS)
    }
}

fn set_class(element: &Element, class: &str, on: bool) {
    let classes = element.class_list();
    let result = if on {
        classes.add_1(class)
    } else {
        classes.remove_1(class)
    };
    if let Err(e) = result {
        log::warn!("{}", UiError::dom(e));
    }
}

impl ToggleView for DomToggleView {
    fn set_active(&self, active: bool) {
        set_class(&self.element, ACTIVE_CLASS, active);
        // The enclosing module card lights up with its enable switch.
        if let Ok(Some(card)) = self.element.closest(MODULE_CARD_SELECTOR) {
            set_class(&card, ACTIVE_CLASS, active);
        }
    }
}

pub struct DomSelectorView {
    element: Element,
}

impl DomSelectorView {
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    pub fn text(&self) -> Option<String> {
        self.element.text_content()
    }
}

impl SelectorView for DomSelectorView {
    fn set_text(&self, text: &str) {
        self.element.set_text_content(Some(text));
    }
}

fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(MouseEvent) + 'static,
) -> Result<(), UiError> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(MouseEvent)>);
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(UiError::dom)?;
    // Controls live as long as the view; nothing ever detaches them.
    closure.forget();
    Ok(())
}

/// Press on the knob, then track moves and release on the whole window so
/// the drag keeps working once the pointer leaves the element.
pub fn attach_knob_gestures(
    element: &HtmlElement,
    window: &Window,
    knob: &Rc<KnobBinder>,
) -> Result<(), UiError> {
    let target = knob.clone();
    listen(element, "mousedown", move |e: MouseEvent| {
        target.pointer_down(f64::from(e.client_y()));
        e.prevent_default();
    })?;

    let target = knob.clone();
    listen(window, "mousemove", move |e: MouseEvent| {
        target.pointer_move(f64::from(e.client_y()));
    })?;

    let target = knob.clone();
    listen(window, "mouseup", move |_: MouseEvent| {
        target.pointer_up();
    })
}

pub fn attach_toggle_gesture(element: &HtmlElement, toggle: &Rc<ToggleBinder>) -> Result<(), UiError> {
    let target = toggle.clone();
    listen(element, "mousedown", move |e: MouseEvent| {
        // Some hosts deliver a synthetic click after mousedown.
        e.prevent_default();
        target.on_click();
    })
}

pub fn attach_selector_gesture(
    element: &HtmlElement,
    selector: &Rc<SelectorBinder>,
) -> Result<(), UiError> {
    let target = selector.clone();
    listen(element, "click", move |_: MouseEvent| {
        target.on_click();
    })
}
