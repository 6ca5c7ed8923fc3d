use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::bridge::ToggleHandle;
use crate::clock::Clock;
use crate::error::UiError;
use crate::lock::{InteractionLock, LockDecision};

pub trait ToggleView {
    fn set_active(&self, active: bool);
}

/// Boolean switch; clicks flip the displayed state.
pub struct ToggleBinder {
    param_id: String,
    handle: Option<Rc<dyn ToggleHandle>>,
    displayed: Rc<Cell<bool>>,
    lock: RefCell<InteractionLock<bool>>,
}

impl ToggleBinder {
    /// `initial` is what the view shows before any native value arrives.
    pub fn bind(
        param_id: impl Into<String>,
        handle: Option<Rc<dyn ToggleHandle>>,
        view: Box<dyn ToggleView>,
        initial: bool,
        clock: Rc<dyn Clock>,
        lock_duration_ms: f64,
    ) -> Result<Rc<Self>, UiError> {
        let displayed = Rc::new(Cell::new(initial));
        let shown = displayed.clone();
        let render = move |active: &bool| {
            shown.set(*active);
            view.set_active(*active);
        };

        let binder = Rc::new(Self {
            param_id: param_id.into(),
            handle,
            displayed,
            lock: RefCell::new(InteractionLock::with_duration(render, clock, lock_duration_ms)),
        });

        if let Some(handle) = &binder.handle {
            let weak: Weak<Self> = Rc::downgrade(&binder);
            handle.subscribe(Box::new(move |value| {
                if let Some(toggle) = weak.upgrade() {
                    toggle.on_backend_value(value);
                }
            }))?;
            binder.on_backend_value(handle.value()?);
        } else {
            log::debug!("toggle {} has no native state; local only", binder.param_id);
        }

        Ok(binder)
    }

    pub fn param_id(&self) -> &str {
        &self.param_id
    }

    pub fn is_active(&self) -> bool {
        self.displayed.get()
    }

    /// Flips the displayed state and pushes it to the host.
    pub fn on_click(&self) -> bool {
        let next = !self.displayed.get();
        log::debug!("toggle {} clicked: {}", self.param_id, next);

        self.lock.borrow_mut().on_user_action(next);
        if let Some(handle) = &self.handle {
            handle.set_value(next);
        }
        next
    }

    pub fn on_backend_value(&self, value: bool) -> LockDecision {
        self.lock.borrow_mut().on_backend_update(value)
    }

    /// Normalised value from a bulk snapshot.
    pub fn apply_normalised(&self, normalised: f64) -> LockDecision {
        self.on_backend_value(normalised > 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::lock::DEFAULT_LOCK_DURATION_MS;
    use crate::testing::{FakeToggle, RecordingToggleView};

    fn bind(
        handle: Option<Rc<FakeToggle>>,
        initial: bool,
    ) -> (Rc<ToggleBinder>, RecordingToggleView, ManualClock) {
        let clock = ManualClock::new();
        let view = RecordingToggleView::default();
        let toggle = ToggleBinder::bind(
            "reverb_enable",
            handle.map(|h| h as Rc<dyn ToggleHandle>),
            Box::new(view.clone()),
            initial,
            Rc::new(clock.clone()),
            DEFAULT_LOCK_DURATION_MS,
        )
        .unwrap();
        (toggle, view, clock)
    }

    #[test]
    fn initial_sync_renders_native_value() {
        let native = FakeToggle::new(true);
        let (toggle, view, _) = bind(Some(native), false);
        assert!(toggle.is_active());
        assert_eq!(*view.states.borrow(), vec![true]);
    }

    #[test]
    fn click_renders_before_pushing_and_negates() {
        let native = FakeToggle::new(false);
        let (toggle, view, _) = bind(Some(native.clone()), false);

        assert!(toggle.on_click());
        assert_eq!(*view.states.borrow(), vec![false, true]);
        assert_eq!(*native.pushed.borrow(), vec![true]);

        assert!(!toggle.on_click());
        assert_eq!(*native.pushed.borrow(), vec![true, false]);
    }

    #[test]
    fn stale_echo_inside_window_is_suppressed() {
        let native = FakeToggle::new(false);
        let (toggle, view, clock) = bind(Some(native.clone()), false);

        clock.set(1_000.0);
        toggle.on_click();
        clock.set(1_100.0);
        native.emit(false);
        assert!(toggle.is_active());

        clock.set(1_600.0);
        native.emit(false);
        assert!(!toggle.is_active());
        assert_eq!(*view.states.borrow(), vec![false, true, false]);
    }

    #[test]
    fn synchronous_echo_from_bridge_is_safe() {
        let native = FakeToggle::echoing(false);
        let (toggle, view, _) = bind(Some(native.clone()), false);

        toggle.on_click();
        assert!(toggle.is_active());
        assert_eq!(*view.states.borrow(), vec![false, true, true]);
    }

    #[test]
    fn local_only_toggle_flips_from_initial_view_state() {
        let (toggle, view, _) = bind(None, true);
        assert!(view.states.borrow().is_empty());
        assert!(!toggle.on_click());
        assert_eq!(*view.states.borrow(), vec![false]);
    }

    #[test]
    fn snapshot_threshold_is_one_half() {
        let (toggle, _, _) = bind(None, false);
        toggle.apply_normalised(1.0);
        assert!(toggle.is_active());
        toggle.apply_normalised(0.5);
        assert!(!toggle.is_active());
    }
}
