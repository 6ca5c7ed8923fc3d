use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::bridge::ComboBoxHandle;
use crate::clock::Clock;
use crate::error::UiError;
use crate::lock::{InteractionLock, LockDecision};
use crate::params::choice_index_from_normalised;

pub trait SelectorView {
    fn set_text(&self, text: &str);
}

pub fn next_choice_index(current: usize, count: usize) -> usize {
    if count == 0 {
        0
    } else {
        (current + 1) % count
    }
}

/// Cyclic choice display; every click advances one entry and wraps.
pub struct SelectorBinder {
    param_id: String,
    choices: Rc<[String]>,
    handle: Option<Rc<dyn ComboBoxHandle>>,
    displayed: Rc<Cell<usize>>,
    lock: RefCell<InteractionLock<usize>>,
}

impl SelectorBinder {
    /// `choices` falls back to the host's labels (upper-cased) when empty.
    /// `initial_text` is what the view shows before any native value arrives.
    pub fn bind(
        param_id: impl Into<String>,
        choices: Vec<String>,
        handle: Option<Rc<dyn ComboBoxHandle>>,
        view: Box<dyn SelectorView>,
        initial_text: Option<&str>,
        clock: Rc<dyn Clock>,
        lock_duration_ms: f64,
    ) -> Result<Rc<Self>, UiError> {
        let param_id = param_id.into();
        let choices: Rc<[String]> = if choices.is_empty() {
            handle
                .as_ref()
                .map(|h| h.choices().iter().map(|c| c.to_uppercase()).collect())
                .unwrap_or_else(|| Rc::from(Vec::new()))
        } else {
            choices.into()
        };
        if choices.is_empty() {
            log::warn!("selector {param_id} has no choices");
        }

        let initial = initial_text
            .and_then(|text| choices.iter().position(|c| c == text))
            .unwrap_or(0);
        let displayed = Rc::new(Cell::new(initial));

        let shown = displayed.clone();
        let labels = choices.clone();
        let render = move |index: &usize| match labels.get(*index) {
            Some(label) => {
                shown.set(*index);
                view.set_text(label);
            }
            None => log::debug!("ignoring out-of-range choice index {index}"),
        };

        let binder = Rc::new(Self {
            param_id,
            choices,
            handle,
            displayed,
            lock: RefCell::new(InteractionLock::with_duration(render, clock, lock_duration_ms)),
        });

        if let Some(handle) = &binder.handle {
            let weak: Weak<Self> = Rc::downgrade(&binder);
            handle.subscribe(Box::new(move |index| {
                if let Some(selector) = weak.upgrade() {
                    selector.on_backend_value(index);
                }
            }))?;
            binder.on_backend_value(handle.choice_index()?);
        } else {
            log::debug!("selector {} has no native state; local only", binder.param_id);
        }

        Ok(binder)
    }

    pub fn param_id(&self) -> &str {
        &self.param_id
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn index(&self) -> usize {
        self.displayed.get()
    }

    /// Advances to the next choice and pushes it to the host.
    pub fn on_click(&self) -> Option<usize> {
        if self.choices.is_empty() {
            return None;
        }
        let next = next_choice_index(self.displayed.get(), self.choices.len());
        log::debug!("selector {} -> {}", self.param_id, self.choices[next]);

        self.lock.borrow_mut().on_user_action(next);
        if let Some(handle) = &self.handle {
            handle.set_choice_index(next);
        }
        Some(next)
    }

    pub fn on_backend_value(&self, index: usize) -> LockDecision {
        self.lock.borrow_mut().on_backend_update(index)
    }

    /// Normalised value from a bulk snapshot.
    pub fn apply_normalised(&self, normalised: f64) -> LockDecision {
        self.on_backend_value(choice_index_from_normalised(normalised, self.choices.len()))
    }
}
