use std::rc::Rc;
use std::str::FromStr;

use serde::Deserialize;
use wasm_bindgen::JsValue;

use crate::error::UiError;
use crate::format::DEFAULT_ONE_DECIMAL_PARAMS;
use crate::knob::{KnobOptions, DEFAULT_DRAG_RANGE_PX};
use crate::lock::DEFAULT_LOCK_DURATION_MS;

pub const DEFAULT_BULK_FETCH_FUNCTION: &str = "getAllParameterValues";

/// A selector element and the choice parameter it cycles.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorBinding {
    pub element_id: String,
    pub param_id: String,
    /// Display labels; empty means "ask the host".
    #[serde(default)]
    pub choices: Vec<String>,
}

/// Editor options, passed from JavaScript as a plain object. Every field is
/// optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UiConfig {
    pub lock_duration_ms: f64,
    pub drag_range_px: f64,
    pub one_decimal_params: Vec<String>,
    pub knob_selector: String,
    pub toggle_selector: String,
    pub selectors: Vec<SelectorBinding>,
    pub bulk_fetch_function: String,
    pub log_level: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            lock_duration_ms: DEFAULT_LOCK_DURATION_MS,
            drag_range_px: DEFAULT_DRAG_RANGE_PX,
            one_decimal_params: DEFAULT_ONE_DECIMAL_PARAMS.map(String::from).to_vec(),
            knob_selector: ".knob-container".to_string(),
            toggle_selector: ".toggle".to_string(),
            selectors: vec![SelectorBinding {
                element_id: "sat_type_display".to_string(),
                param_id: "sat_type".to_string(),
                choices: ["TUBE", "TAPE", "DIODE", "DIGI"].map(String::from).to_vec(),
            }],
            bulk_fetch_function: DEFAULT_BULK_FETCH_FUNCTION.to_string(),
            log_level: "debug".to_string(),
        }
    }
}

impl UiConfig {
    /// `undefined`/`null` yield the defaults.
    pub fn from_js(options: JsValue) -> Result<Self, UiError> {
        if options.is_undefined() || options.is_null() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_wasm_bindgen::from_value(options).map_err(|e| UiError::Config(e.to_string()))?;
        config.validate()
    }

    pub fn validate(self) -> Result<Self, UiError> {
        if !self.lock_duration_ms.is_finite() || self.lock_duration_ms < 0.0 {
            return Err(UiError::Config(format!(
                "lockDurationMs must be a non-negative number, got {}",
                self.lock_duration_ms
            )));
        }
        if !self.drag_range_px.is_finite() || self.drag_range_px <= 0.0 {
            return Err(UiError::Config(format!(
                "dragRangePx must be positive, got {}",
                self.drag_range_px
            )));
        }
        if self.bulk_fetch_function.is_empty() {
            return Err(UiError::Config("bulkFetchFunction is empty".into()));
        }
        self.log_level()?;
        Ok(self)
    }

    pub fn log_level(&self) -> Result<log::Level, UiError> {
        log::Level::from_str(&self.log_level)
            .map_err(|_| UiError::Config(format!("unknown log level {:?}", self.log_level)))
    }

    pub fn knob_options(&self) -> KnobOptions {
        KnobOptions {
            drag_range_px: self.drag_range_px,
            one_decimal_params: Rc::from(self.one_decimal_params.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config: UiConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, UiConfig::default());
        assert_eq!(config.lock_duration_ms, 500.0);
        assert_eq!(config.selectors[0].param_id, "sat_type");
        assert_eq!(config.log_level().unwrap(), log::Level::Debug);
    }

    #[test]
    fn camel_case_overrides_apply() {
        let config: UiConfig = serde_json::from_str(
            r#"{
                "lockDurationMs": 250,
                "oneDecimalParams": ["reverb_decay"],
                "selectors": [{ "elementId": "mode", "paramId": "mode_type" }],
                "logLevel": "warn"
            }"#,
        )
        .unwrap();
        let config = config.validate().unwrap();

        assert_eq!(config.lock_duration_ms, 250.0);
        assert_eq!(config.drag_range_px, 200.0);
        assert_eq!(config.one_decimal_params, vec!["reverb_decay"]);
        assert!(config.selectors[0].choices.is_empty());
        assert_eq!(config.log_level().unwrap(), log::Level::Warn);
        assert_eq!(
            config.knob_options().one_decimal_params.to_vec(),
            vec!["reverb_decay".to_string()]
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        let negative: UiConfig = serde_json::from_str(r#"{ "lockDurationMs": -1 }"#).unwrap();
        assert!(matches!(negative.validate(), Err(UiError::Config(_))));

        let flat: UiConfig = serde_json::from_str(r#"{ "dragRangePx": 0 }"#).unwrap();
        assert!(flat.validate().is_err());

        let noisy: UiConfig = serde_json::from_str(r#"{ "logLevel": "loud" }"#).unwrap();
        assert!(noisy.validate().is_err());
    }
}
