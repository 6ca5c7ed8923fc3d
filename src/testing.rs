//! In-memory bridge and views for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::bridge::{ComboBoxHandle, LocalFuture, NativeBridge, SliderHandle, ToggleHandle};
use crate::error::UiError;
use crate::knob::{KnobView, KnobVisual};
use crate::params::{NormalisableRange, ParameterSnapshot};
use crate::selector::SelectorView;
use crate::toggle::ToggleView;

#[derive(Default)]
pub(crate) struct FakeSlider {
    pub value: Cell<f64>,
    pub range: Option<NormalisableRange>,
    pub pushed: RefCell<Vec<f64>>,
    pub drag_events: RefCell<Vec<&'static str>>,
    /// No change event to subscribe to, like a state object the host never
    /// finished wiring up.
    pub detached: bool,
    subscribers: RefCell<Vec<Box<dyn Fn(f64)>>>,
}

impl FakeSlider {
    pub fn new(value: f64, range: Option<NormalisableRange>) -> Rc<Self> {
        Rc::new(Self {
            value: Cell::new(value),
            range,
            ..Default::default()
        })
    }

    pub fn detached(value: f64) -> Rc<Self> {
        Rc::new(Self {
            value: Cell::new(value),
            detached: true,
            ..Default::default()
        })
    }

    pub fn emit(&self, value: f64) {
        self.value.set(value);
        for cb in self.subscribers.borrow().iter() {
            cb(value);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl SliderHandle for FakeSlider {
    fn scaled_value(&self) -> Result<f64, UiError> {
        Ok(self.value.get())
    }

    fn set_normalised_value(&self, normalised: f64) {
        self.pushed.borrow_mut().push(normalised);
    }

    fn range(&self) -> Option<NormalisableRange> {
        self.range
    }

    fn subscribe(&self, callback: Box<dyn Fn(f64)>) -> Result<(), UiError> {
        if self.detached {
            return Err(UiError::NativeCall {
                function: "addListener".into(),
                message: "valueChangedEvent is undefined".into(),
            });
        }
        self.subscribers.borrow_mut().push(callback);
        Ok(())
    }

    fn drag_started(&self) {
        self.drag_events.borrow_mut().push("started");
    }

    fn drag_ended(&self) {
        self.drag_events.borrow_mut().push("ended");
    }
}

/// Toggle state; `echo` re-emits every pushed value synchronously.
#[derive(Default)]
pub(crate) struct FakeToggle {
    pub value: Cell<bool>,
    pub pushed: RefCell<Vec<bool>>,
    pub echo: bool,
    subscribers: RefCell<Vec<Box<dyn Fn(bool)>>>,
}

impl FakeToggle {
    pub fn new(value: bool) -> Rc<Self> {
        Rc::new(Self {
            value: Cell::new(value),
            ..Default::default()
        })
    }

    pub fn echoing(value: bool) -> Rc<Self> {
        Rc::new(Self {
            value: Cell::new(value),
            echo: true,
            ..Default::default()
        })
    }

    pub fn emit(&self, value: bool) {
        self.value.set(value);
        for cb in self.subscribers.borrow().iter() {
            cb(value);
        }
    }
}

impl ToggleHandle for FakeToggle {
    fn value(&self) -> Result<bool, UiError> {
        Ok(self.value.get())
    }

    fn set_value(&self, value: bool) {
        self.pushed.borrow_mut().push(value);
        if self.echo {
            self.emit(value);
        }
    }

    fn subscribe(&self, callback: Box<dyn Fn(bool)>) -> Result<(), UiError> {
        self.subscribers.borrow_mut().push(callback);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeComboBox {
    pub index: Cell<usize>,
    pub choices: Vec<String>,
    pub pushed: RefCell<Vec<usize>>,
    subscribers: RefCell<Vec<Box<dyn Fn(usize)>>>,
}

impl FakeComboBox {
    pub fn new(index: usize, choices: &[&str]) -> Rc<Self> {
        Rc::new(Self {
            index: Cell::new(index),
            choices: choices.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        })
    }

    pub fn emit(&self, index: usize) {
        self.index.set(index);
        for cb in self.subscribers.borrow().iter() {
            cb(index);
        }
    }
}

impl ComboBoxHandle for FakeComboBox {
    fn choice_index(&self) -> Result<usize, UiError> {
        Ok(self.index.get())
    }

    fn set_choice_index(&self, index: usize) {
        self.pushed.borrow_mut().push(index);
    }

    fn choices(&self) -> Vec<String> {
        self.choices.clone()
    }

    fn subscribe(&self, callback: Box<dyn Fn(usize)>) -> Result<(), UiError> {
        self.subscribers.borrow_mut().push(callback);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeBridge {
    pub available: bool,
    pub sliders: HashMap<String, Rc<FakeSlider>>,
    pub toggles: HashMap<String, Rc<FakeToggle>>,
    pub combos: HashMap<String, Rc<FakeComboBox>>,
    pub snapshot: RefCell<Option<Result<ParameterSnapshot, String>>>,
    pub fetched: RefCell<Vec<String>>,
}

impl FakeBridge {
    pub fn new() -> Self {
        Self {
            available: true,
            ..Default::default()
        }
    }
}

impl NativeBridge for FakeBridge {
    fn is_available(&self) -> bool {
        self.available
    }

    fn slider_state(&self, param_id: &str) -> Option<Rc<dyn SliderHandle>> {
        self.sliders
            .get(param_id)
            .map(|s| s.clone() as Rc<dyn SliderHandle>)
    }

    fn toggle_state(&self, param_id: &str) -> Option<Rc<dyn ToggleHandle>> {
        self.toggles
            .get(param_id)
            .map(|t| t.clone() as Rc<dyn ToggleHandle>)
    }

    fn combo_box_state(&self, param_id: &str) -> Option<Rc<dyn ComboBoxHandle>> {
        self.combos
            .get(param_id)
            .map(|c| c.clone() as Rc<dyn ComboBoxHandle>)
    }

    fn fetch_parameter_values(
        &self,
        function: &str,
    ) -> LocalFuture<Result<ParameterSnapshot, UiError>> {
        self.fetched.borrow_mut().push(function.to_string());
        let outcome = match self.snapshot.borrow().clone() {
            Some(Ok(snapshot)) => Ok(snapshot),
            Some(Err(message)) => Err(UiError::NativeCall {
                function: function.to_string(),
                message,
            }),
            None => Err(UiError::BridgeUnavailable),
        };
        Box::pin(async move { outcome })
    }
}

#[derive(Default, Clone)]
pub(crate) struct RecordingKnobView {
    pub frames: Rc<RefCell<Vec<KnobVisual>>>,
    pub dragging: Rc<RefCell<Vec<bool>>>,
}

impl RecordingKnobView {
    pub fn last(&self) -> KnobVisual {
        self.frames.borrow().last().cloned().expect("knob never rendered")
    }
}

impl KnobView for RecordingKnobView {
    fn render(&self, visual: &KnobVisual) {
        self.frames.borrow_mut().push(visual.clone());
    }

    fn set_dragging(&self, dragging: bool) {
        self.dragging.borrow_mut().push(dragging);
    }
}

#[derive(Default, Clone)]
pub(crate) struct RecordingToggleView {
    pub states: Rc<RefCell<Vec<bool>>>,
}

impl ToggleView for RecordingToggleView {
    fn set_active(&self, active: bool) {
        self.states.borrow_mut().push(active);
    }
}

#[derive(Default, Clone)]
pub(crate) struct RecordingSelectorView {
    pub texts: Rc<RefCell<Vec<String>>>,
}

impl RecordingSelectorView {
    pub fn last(&self) -> Option<String> {
        self.texts.borrow().last().cloned()
    }
}

impl SelectorView for RecordingSelectorView {
    fn set_text(&self, text: &str) {
        self.texts.borrow_mut().push(text.to_string());
    }
}

thread_local! {
    static LOG_RECORDS: RefCell<Vec<(log::Level, String)>> = const { RefCell::new(Vec::new()) };
}

/// Sends every log record to the current test thread's buffer.
struct ThreadLogger;

impl log::Log for ThreadLogger {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        LOG_RECORDS.with(|records| {
            records
                .borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }

    fn flush(&self) {}
}

static LOGGER: ThreadLogger = ThreadLogger;

/// Log lines emitted on this thread since [`capture_logs`].
pub(crate) struct CapturedLogs;

impl CapturedLogs {
    pub fn contains(&self, level: log::Level, needle: &str) -> bool {
        LOG_RECORDS.with(|records| {
            records
                .borrow()
                .iter()
                .any(|(l, message)| *l == level && message.contains(needle))
        })
    }
}

pub(crate) fn capture_logs() -> CapturedLogs {
    // Only the first call installs; every thread still needs the level set
    // before it logs.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(log::LevelFilter::Trace);
    LOG_RECORDS.with(|records| records.borrow_mut().clear());
    CapturedLogs
}
