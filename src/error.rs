use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum UiError {
    #[error("native bridge is not available")]
    BridgeUnavailable,

    #[error("element is missing required attribute data-{attribute}")]
    MissingAttribute { attribute: &'static str },

    #[error("parameter {param}: data-{attribute}={value:?} is not a number")]
    InvalidAttribute {
        param: String,
        attribute: &'static str,
        value: String,
    },

    #[error("parameter {param}: invalid range [{min}, {max}]: {reason}")]
    InvalidRange {
        param: String,
        min: f64,
        max: f64,
        reason: &'static str,
    },

    #[error("dom: {0}")]
    Dom(String),

    #[error("native function {function} failed: {message}")]
    NativeCall { function: String, message: String },

    #[error("malformed parameter snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("invalid editor options: {0}")]
    Config(String),
}

impl UiError {
    pub fn dom(err: JsValue) -> Self {
        Self::Dom(describe_js(&err))
    }

    pub fn native_call(function: &str, err: JsValue) -> Self {
        Self::NativeCall {
            function: function.to_string(),
            message: describe_js(&err),
        }
    }
}

impl From<UiError> for JsValue {
    fn from(err: UiError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Best-effort text for a thrown JS value.
pub(crate) fn describe_js(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = wasm_bindgen::JsCast::dyn_ref::<js_sys::Error>(value) {
        return String::from(err.message());
    }
    format!("{value:?}")
}
