//! Every bound control, addressable by parameter id.

use std::collections::HashMap;
use std::rc::Rc;

use crate::bridge::NativeBridge;
use crate::error::UiError;
use crate::knob::KnobBinder;
use crate::lock::LockDecision;
use crate::params::ParameterSnapshot;
use crate::selector::SelectorBinder;
use crate::toggle::ToggleBinder;

#[derive(Default)]
pub struct ControlRegistry {
    knobs: HashMap<String, Rc<KnobBinder>>,
    toggles: HashMap<String, Rc<ToggleBinder>>,
    selectors: HashMap<String, Rc<SelectorBinder>>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_knob(&mut self, knob: Rc<KnobBinder>) {
        if let Some(previous) = self.knobs.insert(knob.param_id().to_string(), knob) {
            log::warn!("knob {} bound twice; keeping the last one", previous.param_id());
        }
    }

    pub fn add_toggle(&mut self, toggle: Rc<ToggleBinder>) {
        if let Some(previous) = self.toggles.insert(toggle.param_id().to_string(), toggle) {
            log::warn!("toggle {} bound twice; keeping the last one", previous.param_id());
        }
    }

    pub fn add_selector(&mut self, selector: Rc<SelectorBinder>) {
        if let Some(previous) = self.selectors.insert(selector.param_id().to_string(), selector) {
            log::warn!("selector {} bound twice; keeping the last one", previous.param_id());
        }
    }

    pub fn knob(&self, param_id: &str) -> Option<&Rc<KnobBinder>> {
        self.knobs.get(param_id)
    }

    pub fn toggle(&self, param_id: &str) -> Option<&Rc<ToggleBinder>> {
        self.toggles.get(param_id)
    }

    pub fn selector(&self, param_id: &str) -> Option<&Rc<SelectorBinder>> {
        self.selectors.get(param_id)
    }

    pub fn len(&self) -> usize {
        self.knobs.len() + self.toggles.len() + self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs one control group's binding. A failed group is logged and
    /// whatever the other groups bound stays in place.
    pub fn bind_group(
        &mut self,
        group: &str,
        bind: impl FnOnce(&mut Self) -> Result<usize, UiError>,
    ) -> Option<usize> {
        match bind(self) {
            Ok(count) => {
                log::info!("bound {count} {group}");
                Some(count)
            }
            Err(e) => {
                log::error!("failed to bind {group}: {e}");
                None
            }
        }
    }

    /// Routes each snapshot entry through its control's backend path, so an
    /// active drag or interaction lock still wins. Returns how many entries
    /// were rendered.
    pub fn apply_snapshot(&self, snapshot: &ParameterSnapshot) -> usize {
        let mut applied = 0;
        for (param_id, normalised) in snapshot.iter() {
            let rendered = if let Some(knob) = self.knobs.get(param_id) {
                knob.apply_normalised(normalised)
            } else if let Some(toggle) = self.toggles.get(param_id) {
                toggle.apply_normalised(normalised) != LockDecision::Suppressed
            } else if let Some(selector) = self.selectors.get(param_id) {
                selector.apply_normalised(normalised) != LockDecision::Suppressed
            } else {
                log::debug!("snapshot entry {param_id} has no control");
                false
            };
            if rendered {
                applied += 1;
            }
        }
        applied
    }

    /// Pulls every value through `function` and applies it. On failure the
    /// controls keep whatever they already show.
    pub async fn resync(&self, bridge: &dyn NativeBridge, function: &str) -> Result<usize, UiError> {
        if !bridge.is_available() {
            return Err(UiError::BridgeUnavailable);
        }
        let snapshot = bridge.fetch_parameter_values(function).await?;
        if snapshot.is_empty() {
            log::warn!("{function} returned no parameter values");
        }
        let applied = self.apply_snapshot(&snapshot);
        log::info!(
            "resynced {applied} of {} parameters via {function}",
            snapshot.len()
        );
        Ok(applied)
    }
}
