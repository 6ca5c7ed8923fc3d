//! The slice of the native parameter bridge this UI consumes.
//!
//! Every binder talks to the host through these traits only. The JUCE
//! implementation lives in [`crate::juce`]; tests use in-memory fakes.

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use crate::error::UiError;
use crate::params::{NormalisableRange, ParameterSnapshot};

/// Boxed single-threaded future; the web view has no executor threads.
pub type LocalFuture<T> = Pin<Box<dyn Future<Output = T>>>;

/// Continuous parameter state.
pub trait SliderHandle {
    fn scaled_value(&self) -> Result<f64, UiError>;
    fn set_normalised_value(&self, normalised: f64);
    /// Host range, if the bridge exposes one.
    fn range(&self) -> Option<NormalisableRange>;
    /// `callback` receives the new scaled value.
    fn subscribe(&self, callback: Box<dyn Fn(f64)>) -> Result<(), UiError>;
    /// Undo-grouping hooks; optional on the host side.
    fn drag_started(&self) {}
    fn drag_ended(&self) {}
}

/// Boolean parameter state.
pub trait ToggleHandle {
    fn value(&self) -> Result<bool, UiError>;
    fn set_value(&self, value: bool);
    fn subscribe(&self, callback: Box<dyn Fn(bool)>) -> Result<(), UiError>;
}

/// Choice parameter state.
pub trait ComboBoxHandle {
    fn choice_index(&self) -> Result<usize, UiError>;
    fn set_choice_index(&self, index: usize);
    /// Choice labels known to the host, possibly empty.
    fn choices(&self) -> Vec<String>;
    fn subscribe(&self, callback: Box<dyn Fn(usize)>) -> Result<(), UiError>;
}

pub trait NativeBridge {
    /// Whether the host injected its integration object at all.
    fn is_available(&self) -> bool;

    fn slider_state(&self, param_id: &str) -> Option<Rc<dyn SliderHandle>>;
    fn toggle_state(&self, param_id: &str) -> Option<Rc<dyn ToggleHandle>>;
    fn combo_box_state(&self, param_id: &str) -> Option<Rc<dyn ComboBoxHandle>>;

    /// Bulk-fetch every parameter's normalised value through a native function.
    fn fetch_parameter_values(&self, function: &str) -> LocalFuture<Result<ParameterSnapshot, UiError>>;
}
