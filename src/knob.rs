//! Continuous knob: vertical drag in, arc + dot + label out.
//!
//! Knobs do not use the interaction lock. While a drag is in progress every
//! backend value is dropped, and the drag itself pushes a fresh value on each
//! pointer move.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::bridge::SliderHandle;
use crate::error::UiError;
use crate::format::format_knob_label;
use crate::params::NormalisableRange;

/// Pointer travel in pixels that sweeps the full range.
pub const DEFAULT_DRAG_RANGE_PX: f64 = 200.0;
/// Share of the circle covered by the value arc, in dash units out of 100.
const ARC_SPAN: f64 = 75.0;
const ROTATION_SPAN_DEG: f64 = 270.0;

#[derive(Debug, Clone, PartialEq)]
pub struct KnobSpec {
    pub param_id: String,
    pub min: f64,
    pub max: f64,
    pub value: f64,
    pub suffix: String,
    pub log: bool,
}

impl KnobSpec {
    /// Reads `param`, `min`, `max`, `value`, `suffix` and `log` through
    /// `attribute` (the element's `data-*` map).
    pub fn from_attributes(attribute: impl Fn(&str) -> Option<String>) -> Result<Self, UiError> {
        let param_id = attribute("param")
            .filter(|p| !p.is_empty())
            .ok_or(UiError::MissingAttribute { attribute: "param" })?;

        let number = |name: &'static str| -> Result<f64, UiError> {
            let raw = attribute(name).ok_or(UiError::MissingAttribute { attribute: name })?;
            raw.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| UiError::InvalidAttribute {
                    param: param_id.clone(),
                    attribute: name,
                    value: raw.clone(),
                })
        };

        let min = number("min")?;
        let max = number("max")?;
        if min > max {
            return Err(UiError::InvalidRange {
                param: param_id,
                min,
                max,
                reason: "min exceeds max",
            });
        }

        let value = attribute("value")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(f64::NAN);

        Ok(Self {
            param_id,
            min,
            max,
            value,
            suffix: attribute("suffix").unwrap_or_default(),
            log: attribute("log").as_deref() == Some("true"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KnobVisual {
    /// Position within `[min, max]`, 0..=1.
    pub percent: f64,
    pub arc_length: f64,
    pub rotation_deg: f64,
    pub label: String,
}

impl KnobVisual {
    pub fn compute<S: AsRef<str>>(spec: &KnobSpec, value: f64, one_decimal: &[S]) -> Self {
        let position = if value.is_nan() { spec.min } else { value };
        let span = spec.max - spec.min;
        let percent = if span > 0.0 {
            ((position - spec.min) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            percent,
            arc_length: percent * ARC_SPAN,
            rotation_deg: percent * ROTATION_SPAN_DEG,
            label: format!(
                "{}{}",
                format_knob_label(&spec.param_id, value, one_decimal),
                spec.suffix
            ),
        }
    }
}

pub trait KnobView {
    fn render(&self, visual: &KnobVisual);
    /// Drag feedback such as the resize cursor.
    fn set_dragging(&self, dragging: bool);
}

#[derive(Debug, Clone)]
pub struct KnobOptions {
    pub drag_range_px: f64,
    pub one_decimal_params: Rc<[String]>,
}

impl Default for KnobOptions {
    fn default() -> Self {
        Self {
            drag_range_px: DEFAULT_DRAG_RANGE_PX,
            one_decimal_params: crate::format::DEFAULT_ONE_DECIMAL_PARAMS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

/// Value after dragging `delta_y` pixels upward from `start_value`.
pub fn drag_value(spec: &KnobSpec, start_value: f64, delta_y: f64, drag_range_px: f64) -> f64 {
    let start = if start_value.is_nan() {
        spec.min
    } else {
        start_value.clamp(spec.min, spec.max)
    };
    let drag_range_px = if drag_range_px > 0.0 {
        drag_range_px
    } else {
        DEFAULT_DRAG_RANGE_PX
    };

    let value = if spec.log {
        let (log_min, log_max) = (spec.min.ln(), spec.max.ln());
        (start.ln() + (delta_y / drag_range_px) * (log_max - log_min)).exp()
    } else {
        start + delta_y * ((spec.max - spec.min) / drag_range_px)
    };
    value.clamp(spec.min, spec.max)
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    start_y: f64,
    start_value: f64,
}

#[derive(Debug)]
struct KnobState {
    value: f64,
    drag: Option<Drag>,
}

pub struct KnobBinder {
    spec: KnobSpec,
    handle: Option<Rc<dyn SliderHandle>>,
    view: Box<dyn KnobView>,
    range: NormalisableRange,
    options: KnobOptions,
    state: RefCell<KnobState>,
}

impl KnobBinder {
    /// Fails when the native state cannot be read or subscribed to.
    pub fn bind(
        mut spec: KnobSpec,
        handle: Option<Rc<dyn SliderHandle>>,
        view: Box<dyn KnobView>,
        options: KnobOptions,
    ) -> Result<Rc<Self>, UiError> {
        if spec.log && spec.min <= 0.0 {
            log::warn!(
                "{}",
                UiError::InvalidRange {
                    param: spec.param_id.clone(),
                    min: spec.min,
                    max: spec.max,
                    reason: "logarithmic mapping needs a positive minimum; dragging linearly",
                }
            );
            spec.log = false;
        }

        let range = handle
            .as_ref()
            .and_then(|h| h.range())
            .unwrap_or_else(|| NormalisableRange::linear(spec.min, spec.max));
        let value = match &handle {
            Some(h) => h.scaled_value()?,
            None => spec.value,
        };

        let binder = Rc::new(Self {
            spec,
            handle,
            view,
            range,
            options,
            state: RefCell::new(KnobState { value, drag: None }),
        });

        if let Some(handle) = &binder.handle {
            let weak: Weak<Self> = Rc::downgrade(&binder);
            handle.subscribe(Box::new(move |scaled| {
                if let Some(knob) = weak.upgrade() {
                    knob.on_backend_value(scaled);
                }
            }))?;
        } else {
            log::debug!("knob {} has no native state; local only", binder.spec.param_id);
        }

        binder.render();
        Ok(binder)
    }

    pub fn param_id(&self) -> &str {
        &self.spec.param_id
    }

    pub fn value(&self) -> f64 {
        self.state.borrow().value
    }

    pub fn is_dragging(&self) -> bool {
        self.state.borrow().drag.is_some()
    }

    pub fn range(&self) -> NormalisableRange {
        self.range
    }

    fn render(&self) {
        let value = self.value();
        let visual = KnobVisual::compute(&self.spec, value, &self.options.one_decimal_params[..]);
        self.view.render(&visual);
    }

    /// Scaled value from the host. Returns false when dropped mid-drag.
    pub fn on_backend_value(&self, scaled: f64) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if state.drag.is_some() {
                log::trace!("knob {} ignoring {} during drag", self.spec.param_id, scaled);
                return false;
            }
            state.value = scaled;
        }
        self.render();
        true
    }

    /// Normalised value from a bulk snapshot.
    pub fn apply_normalised(&self, normalised: f64) -> bool {
        self.on_backend_value(self.range.from_normalised(normalised))
    }

    pub fn pointer_down(&self, client_y: f64) {
        {
            let mut state = self.state.borrow_mut();
            let start_value = state.value;
            state.drag = Some(Drag {
                start_y: client_y,
                start_value,
            });
        }
        if let Some(handle) = &self.handle {
            handle.drag_started();
        }
        self.view.set_dragging(true);
    }

    /// Returns the new value, or `None` when no drag is active.
    pub fn pointer_move(&self, client_y: f64) -> Option<f64> {
        let value = {
            let mut state = self.state.borrow_mut();
            let drag = state.drag?;
            let value = drag_value(
                &self.spec,
                drag.start_value,
                drag.start_y - client_y,
                self.options.drag_range_px,
            );
            state.value = value;
            value
        };

        self.render();
        if let Some(handle) = &self.handle {
            handle.set_normalised_value(self.range.to_normalised(value));
        }
        Some(value)
    }

    pub fn pointer_up(&self) {
        if self.state.borrow_mut().drag.take().is_none() {
            return;
        }
        if let Some(handle) = &self.handle {
            handle.drag_ended();
        }
        self.view.set_dragging(false);
    }
}
