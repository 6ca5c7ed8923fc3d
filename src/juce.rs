//! [`NativeBridge`] over the JUCE web-view frontend module.
//!
//! The page imports JUCE's `index.js` and hands the module object to
//! [`crate::editor::WavfinEditor`]. Parameter states come from
//! `getSliderState` / `getToggleState` / `getComboBoxState`, and the bulk
//! fetch goes through `getNativeFunction`.

use std::rc::Rc;

use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::bridge::{ComboBoxHandle, LocalFuture, NativeBridge, SliderHandle, ToggleHandle};
use crate::error::{describe_js, UiError};
use crate::params::{NormalisableRange, ParameterSnapshot};

#[wasm_bindgen]
extern "C" {
    #[derive(Debug, Clone)]
    pub type JuceModule;

    #[wasm_bindgen(method, catch, js_name = getSliderState)]
    fn get_slider_state(this: &JuceModule, name: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = getToggleState)]
    fn get_toggle_state(this: &JuceModule, name: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = getComboBoxState)]
    fn get_combo_box_state(this: &JuceModule, name: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = getNativeFunction)]
    fn get_native_function(this: &JuceModule, name: &str) -> Result<Function, JsValue>;

    type ListenerList;

    #[wasm_bindgen(method, catch, js_name = addListener)]
    fn add_listener(this: &ListenerList, callback: &Function) -> Result<JsValue, JsValue>;

    #[derive(Clone)]
    type JsSliderState;

    #[wasm_bindgen(method, catch, js_name = getScaledValue)]
    fn get_scaled_value(this: &JsSliderState) -> Result<f64, JsValue>;

    #[wasm_bindgen(method, catch, js_name = setNormalisedValue)]
    fn set_normalised_value(this: &JsSliderState, value: f64) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = sliderDragStarted)]
    fn slider_drag_started(this: &JsSliderState) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = sliderDragEnded)]
    fn slider_drag_ended(this: &JsSliderState) -> Result<(), JsValue>;

    #[derive(Clone)]
    type JsToggleState;

    #[wasm_bindgen(method, catch, js_name = getValue)]
    fn get_value(this: &JsToggleState) -> Result<bool, JsValue>;

    #[wasm_bindgen(method, catch, js_name = setValue)]
    fn set_value(this: &JsToggleState, value: bool) -> Result<(), JsValue>;

    #[derive(Clone)]
    type JsComboBoxState;

    #[wasm_bindgen(method, catch, js_name = getChoiceIndex)]
    fn get_choice_index(this: &JsComboBoxState) -> Result<f64, JsValue>;

    #[wasm_bindgen(method, catch, js_name = setChoiceIndex)]
    fn set_choice_index(this: &JsComboBoxState, index: u32) -> Result<(), JsValue>;
}

fn get(obj: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(obj, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn get_f64(obj: &JsValue, key: &str) -> Option<f64> {
    get(obj, key).and_then(|v| v.as_f64())
}

fn present(value: JsValue) -> Option<JsValue> {
    (!value.is_undefined() && !value.is_null()).then_some(value)
}

/// Logs whether the host injected `window.__JUCE__`; never fails.
pub fn check_native_integration() -> bool {
    match get(&js_sys::global(), "__JUCE__") {
        Some(juce) => {
            let version = get(&juce, "backendVersion")
                .and_then(|v| v.as_string())
                .unwrap_or_else(|| "unknown".to_string());
            log::info!("JUCE native integration active (backend version {version})");
            true
        }
        None => {
            log::error!("window.__JUCE__ is undefined: the web view is not connected to the plugin");
            log::error!("check that native integration is enabled on the browser component");
            log::error!("check that the resource provider serves the JUCE frontend module");
            false
        }
    }
}

/// Registers `on_change` with the state's `valueChangedEvent`.
fn listen_for_changes(state: &JsValue, on_change: impl Fn() + 'static) -> Result<(), UiError> {
    let event = get(state, "valueChangedEvent").ok_or_else(|| UiError::NativeCall {
        function: "valueChangedEvent".into(),
        message: "state has no change event".into(),
    })?;
    let listener = Closure::wrap(Box::new(on_change) as Box<dyn Fn()>);
    event
        .unchecked_into::<ListenerList>()
        .add_listener(listener.as_ref().unchecked_ref())
        .map_err(|e| UiError::native_call("addListener", e))?;
    listener.forget();
    Ok(())
}

fn warn_on_throw(function: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        log::warn!("{}", UiError::native_call(function, e));
    }
}

struct JuceSlider {
    state: JsSliderState,
}

impl SliderHandle for JuceSlider {
    fn scaled_value(&self) -> Result<f64, UiError> {
        self.state
            .get_scaled_value()
            .map_err(|e| UiError::native_call("getScaledValue", e))
    }

    fn set_normalised_value(&self, normalised: f64) {
        warn_on_throw(
            "setNormalisedValue",
            self.state.set_normalised_value(normalised),
        );
    }

    fn range(&self) -> Option<NormalisableRange> {
        let props = get(&self.state, "properties")?;
        let start = get_f64(&props, "start")?;
        let end = get_f64(&props, "end")?;
        let skew = get_f64(&props, "skew").unwrap_or(1.0);
        Some(NormalisableRange::new(start, end, skew))
    }

    fn subscribe(&self, callback: Box<dyn Fn(f64)>) -> Result<(), UiError> {
        let state = self.state.clone();
        listen_for_changes(&self.state, move || match state.get_scaled_value() {
            Ok(value) => callback(value),
            Err(e) => log::warn!("{}", UiError::native_call("getScaledValue", e)),
        })
    }

    fn drag_started(&self) {
        if let Err(e) = self.state.slider_drag_started() {
            log::debug!("sliderDragStarted unavailable: {}", describe_js(&e));
        }
    }

    fn drag_ended(&self) {
        if let Err(e) = self.state.slider_drag_ended() {
            log::debug!("sliderDragEnded unavailable: {}", describe_js(&e));
        }
    }
}

struct JuceToggle {
    state: JsToggleState,
}

impl ToggleHandle for JuceToggle {
    fn value(&self) -> Result<bool, UiError> {
        self.state
            .get_value()
            .map_err(|e| UiError::native_call("getValue", e))
    }

    fn set_value(&self, value: bool) {
        warn_on_throw("setValue", self.state.set_value(value));
    }

    fn subscribe(&self, callback: Box<dyn Fn(bool)>) -> Result<(), UiError> {
        let state = self.state.clone();
        listen_for_changes(&self.state, move || match state.get_value() {
            Ok(value) => callback(value),
            Err(e) => log::warn!("{}", UiError::native_call("getValue", e)),
        })
    }
}

struct JuceComboBox {
    state: JsComboBoxState,
}

fn to_index(raw: f64) -> usize {
    if raw.is_finite() && raw > 0.0 {
        raw.round() as usize
    } else {
        0
    }
}

impl ComboBoxHandle for JuceComboBox {
    fn choice_index(&self) -> Result<usize, UiError> {
        self.state
            .get_choice_index()
            .map(to_index)
            .map_err(|e| UiError::native_call("getChoiceIndex", e))
    }

    fn set_choice_index(&self, index: usize) {
        warn_on_throw("setChoiceIndex", self.state.set_choice_index(index as u32));
    }

    fn choices(&self) -> Vec<String> {
        get(&self.state, "properties")
            .and_then(|props| get(&props, "choices"))
            .map(|choices| {
                Array::from(&choices)
                    .iter()
                    .filter_map(|c| c.as_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn subscribe(&self, callback: Box<dyn Fn(usize)>) -> Result<(), UiError> {
        // The event carries the normalised value; the index is what we render.
        let state = self.state.clone();
        listen_for_changes(&self.state, move || match state.get_choice_index() {
            Ok(raw) => callback(to_index(raw)),
            Err(e) => log::warn!("{}", UiError::native_call("getChoiceIndex", e)),
        })
    }
}

pub struct JuceBridge {
    module: Option<JuceModule>,
    integrated: bool,
}

impl JuceBridge {
    /// `module` may be `undefined` when the page runs outside the plugin.
    pub fn new(module: JsValue) -> Self {
        let integrated = check_native_integration();
        let module = present(module)
            .filter(|m| m.is_object())
            .map(|m| m.unchecked_into::<JuceModule>());
        if module.is_none() {
            log::warn!("JUCE frontend module not provided; controls stay local-only");
        }
        Self { module, integrated }
    }

    fn lookup(
        &self,
        kind: &str,
        param_id: &str,
        get_state: impl FnOnce(&JuceModule, &str) -> Result<JsValue, JsValue>,
    ) -> Option<JsValue> {
        let module = self.module.as_ref()?;
        match get_state(module, param_id) {
            Ok(state) => {
                let state = present(state);
                if state.is_none() {
                    log::warn!("no {kind} state for parameter {param_id}");
                }
                state
            }
            Err(e) => {
                log::warn!("{kind} state for {param_id} failed: {}", describe_js(&e));
                None
            }
        }
    }
}

fn snapshot_from_js(value: &JsValue) -> Result<ParameterSnapshot, UiError> {
    let object = value
        .dyn_ref::<Object>()
        .ok_or_else(|| UiError::InvalidSnapshot(format!("expected an object, got {}", describe_js(value))))?;

    let mut snapshot = ParameterSnapshot::new();
    for entry in Object::entries(object).iter() {
        let pair = Array::from(&entry);
        let Some(key) = pair.get(0).as_string() else {
            continue;
        };
        match pair.get(1).as_f64() {
            Some(normalised) => snapshot.insert(key, normalised),
            None => log::warn!("snapshot entry {key} is not numeric; skipped"),
        }
    }
    Ok(snapshot)
}

impl NativeBridge for JuceBridge {
    fn is_available(&self) -> bool {
        self.integrated && self.module.is_some()
    }

    fn slider_state(&self, param_id: &str) -> Option<Rc<dyn SliderHandle>> {
        let state = self.lookup("slider", param_id, |m, id| m.get_slider_state(id))?;
        Some(Rc::new(JuceSlider {
            state: state.unchecked_into(),
        }))
    }

    fn toggle_state(&self, param_id: &str) -> Option<Rc<dyn ToggleHandle>> {
        let state = self.lookup("toggle", param_id, |m, id| m.get_toggle_state(id))?;
        Some(Rc::new(JuceToggle {
            state: state.unchecked_into(),
        }))
    }

    fn combo_box_state(&self, param_id: &str) -> Option<Rc<dyn ComboBoxHandle>> {
        let state = self.lookup("combo box", param_id, |m, id| m.get_combo_box_state(id))?;
        Some(Rc::new(JuceComboBox {
            state: state.unchecked_into(),
        }))
    }

    fn fetch_parameter_values(&self, function: &str) -> LocalFuture<Result<ParameterSnapshot, UiError>> {
        let module = self.module.clone();
        let function = function.to_string();
        Box::pin(async move {
            let module = module.ok_or(UiError::BridgeUnavailable)?;
            let native = module
                .get_native_function(&function)
                .map_err(|e| UiError::native_call(&function, e))?;
            let promise: Promise = native
                .call0(&JsValue::UNDEFINED)
                .and_then(|p| p.dyn_into::<Promise>())
                .map_err(|e| UiError::native_call(&function, e))?;
            let result = JsFuture::from(promise)
                .await
                .map_err(|e| UiError::native_call(&function, e))?;
            snapshot_from_js(&result)
        })
    }
}
