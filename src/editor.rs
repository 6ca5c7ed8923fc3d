//! JavaScript entry point: binds every control on the page to the host.

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::{Document, HtmlElement, Window};

use crate::bridge::NativeBridge;
use crate::clock::{BrowserClock, Clock};
use crate::config::UiConfig;
use crate::dom::{self, DomKnobView, DomSelectorView, DomToggleView};
use crate::error::UiError;
use crate::format::{format_knob_label, DEFAULT_ONE_DECIMAL_PARAMS};
use crate::juce::JuceBridge;
use crate::knob::KnobBinder;
use crate::registry::ControlRegistry;
use crate::selector::SelectorBinder;
use crate::toggle::ToggleBinder;

#[wasm_bindgen]
pub struct WavfinEditor {
    bridge: Rc<dyn NativeBridge>,
    registry: Rc<ControlRegistry>,
    bulk_fetch_function: String,
}

#[wasm_bindgen]
impl WavfinEditor {
    /// `juce` is the module object of JUCE's frontend `index.js`; pass
    /// `undefined` to run the page without a host.
    #[wasm_bindgen(constructor)]
    pub fn new(juce: JsValue, options: JsValue) -> Result<WavfinEditor, JsValue> {
        crate::set_panic_hook();

        let config = match UiConfig::from_js(options) {
            Ok(config) => config,
            Err(e) => {
                console_log::init_with_level(log::Level::Warn).ok();
                log::error!("{e}");
                return Err(e.into());
            }
        };
        if let Ok(level) = config.log_level() {
            // A second editor on the same page keeps the first logger.
            console_log::init_with_level(level).ok();
        }

        let bridge: Rc<dyn NativeBridge> = Rc::new(JuceBridge::new(juce));
        let window = web_sys::window().ok_or_else(|| UiError::Dom("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| UiError::Dom("no document".into()))?;

        let clock: Rc<dyn Clock> = Rc::new(BrowserClock);
        let mut registry = ControlRegistry::new();
        let page = Page {
            window: &window,
            document: &document,
            bridge: &*bridge,
            clock: &clock,
            config: &config,
        };

        registry.bind_group("knobs", |r| page.bind_knobs(r));
        registry.bind_group("toggles", |r| page.bind_toggles(r));
        registry.bind_group("selectors", |r| page.bind_selectors(r));

        let editor = WavfinEditor {
            bridge,
            registry: Rc::new(registry),
            bulk_fetch_function: config.bulk_fetch_function,
        };

        if editor.bridge.is_available() {
            let (registry, bridge, function) = editor.resync_parts();
            spawn_local(async move {
                if let Err(e) = registry.resync(&*bridge, &function).await {
                    log::warn!("initial resync failed: {e}");
                }
            });
        }

        Ok(editor)
    }

    /// Re-reads every parameter from the host. Resolves to the number of
    /// controls updated.
    pub fn resync(&self) -> js_sys::Promise {
        let (registry, bridge, function) = self.resync_parts();
        future_to_promise(async move {
            match registry.resync(&*bridge, &function).await {
                Ok(applied) => Ok(JsValue::from(applied as u32)),
                Err(e) => {
                    log::warn!("resync failed: {e}");
                    Err(e.into())
                }
            }
        })
    }

    #[wasm_bindgen(getter, js_name = controlCount)]
    pub fn control_count(&self) -> usize {
        self.registry.len()
    }
}

impl WavfinEditor {
    fn resync_parts(&self) -> (Rc<ControlRegistry>, Rc<dyn NativeBridge>, String) {
        (
            self.registry.clone(),
            self.bridge.clone(),
            self.bulk_fetch_function.clone(),
        )
    }
}

/// Label text for a knob value, as the editor renders it.
#[wasm_bindgen(js_name = format_knob_label)]
pub fn format_label(param_id: &str, value: f64) -> String {
    format_knob_label(param_id, value, &DEFAULT_ONE_DECIMAL_PARAMS[..])
}

struct Page<'a> {
    window: &'a Window,
    document: &'a Document,
    bridge: &'a dyn NativeBridge,
    clock: &'a Rc<dyn Clock>,
    config: &'a UiConfig,
}

impl Page<'_> {
    fn bind_knobs(&self, registry: &mut ControlRegistry) -> Result<usize, UiError> {
        let options = self.config.knob_options();
        let mut bound = 0;
        for element in dom::query_all(self.document, &self.config.knob_selector)? {
            let spec = match dom::knob_spec(&element) {
                Ok(spec) => spec,
                Err(e) => {
                    log::warn!("skipping knob: {e}");
                    continue;
                }
            };
            let handle = self.bridge.slider_state(&spec.param_id);
            let view = DomKnobView::mount(&element, self.document);
            let knob = KnobBinder::bind(spec, handle, Box::new(view), options.clone())?;
            dom::attach_knob_gestures(&element, self.window, &knob)?;
            registry.add_knob(knob);
            bound += 1;
        }
        Ok(bound)
    }

    fn bind_toggles(&self, registry: &mut ControlRegistry) -> Result<usize, UiError> {
        let mut bound = 0;
        for element in dom::query_all(self.document, &self.config.toggle_selector)? {
            let Some(param_id) = dom::param_id(&element) else {
                log::warn!("skipping toggle: {}", UiError::MissingAttribute { attribute: "param" });
                continue;
            };
            let view = DomToggleView::new(element.clone().into());
            let initial = view.is_active();
            let toggle = ToggleBinder::bind(
                param_id.as_str(),
                self.bridge.toggle_state(&param_id),
                Box::new(view),
                initial,
                self.clock.clone(),
                self.config.lock_duration_ms,
            )?;
            dom::attach_toggle_gesture(&element, &toggle)?;
            registry.add_toggle(toggle);
            bound += 1;
        }
        Ok(bound)
    }

    fn bind_selectors(&self, registry: &mut ControlRegistry) -> Result<usize, UiError> {
        let mut bound = 0;
        for binding in &self.config.selectors {
            let Some(element) = self
                .document
                .get_element_by_id(&binding.element_id)
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            else {
                log::warn!("selector element #{} not found", binding.element_id);
                continue;
            };
            let view = DomSelectorView::new(element.clone().into());
            let initial_text = view.text();
            let selector = SelectorBinder::bind(
                binding.param_id.as_str(),
                binding.choices.clone(),
                self.bridge.combo_box_state(&binding.param_id),
                Box::new(view),
                initial_text.as_deref().map(str::trim),
                self.clock.clone(),
                self.config.lock_duration_ms,
            )?;
            dom::attach_selector_gesture(&element, &selector)?;
            registry.add_selector(selector);
            bound += 1;
        }
        Ok(bound)
    }
}
