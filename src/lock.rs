//! Echo suppression for discrete controls.
//!
//! A toggle or selector renders its new value as soon as the user clicks. The
//! host echoes parameter changes back asynchronously, and a stale echo that
//! lands right after the click would snap the widget back to its old state.
//! [`InteractionLock`] sits between the bridge subscription and the render
//! function. For `lock_duration_ms` after a local action it drops every
//! backend value that disagrees with what the user asked for.
//!
//! The deadline is checked lazily on the next backend event. There is no
//! timer to schedule or cancel.

use std::fmt::Debug;
use std::rc::Rc;

use crate::clock::Clock;

pub const DEFAULT_LOCK_DURATION_MS: f64 = 500.0;

/// Outcome of [`InteractionLock::on_backend_update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockDecision {
    /// The value was rendered. `authoritative` is false when it only matched
    /// the pending local target inside the window.
    Applied { authoritative: bool },
    /// The value contradicted the local target inside the window.
    Suppressed,
}

pub struct InteractionLock<T> {
    render: Box<dyn FnMut(&T)>,
    clock: Rc<dyn Clock>,
    lock_duration_ms: f64,
    /// Absolute deadline in clock milliseconds, 0 while never armed.
    locked_until: f64,
    target_value: Option<T>,
}

impl<T: PartialEq + Clone + Debug> InteractionLock<T> {
    pub fn new(render: impl FnMut(&T) + 'static, clock: Rc<dyn Clock>) -> Self {
        Self::with_duration(render, clock, DEFAULT_LOCK_DURATION_MS)
    }

    pub fn with_duration(
        render: impl FnMut(&T) + 'static,
        clock: Rc<dyn Clock>,
        lock_duration_ms: f64,
    ) -> Self {
        Self {
            render: Box::new(render),
            clock,
            lock_duration_ms: lock_duration_ms.max(0.0),
            locked_until: 0.0,
            target_value: None,
        }
    }

    /// Local gesture: render optimistically and (re)arm a fresh window.
    pub fn on_user_action(&mut self, value: T) {
        (self.render)(&value);
        self.locked_until = self.clock.now_ms() + self.lock_duration_ms;
        self.target_value = Some(value);
    }

    /// Value reported by the host.
    pub fn on_backend_update(&mut self, value: T) -> LockDecision {
        if !self.is_locked() {
            (self.render)(&value);
            return LockDecision::Applied {
                authoritative: true,
            };
        }

        if self.target_value.as_ref() == Some(&value) {
            // Matching echo; the window keeps its original deadline.
            (self.render)(&value);
            LockDecision::Applied {
                authoritative: false,
            }
        } else {
            log::debug!(
                "suppressed backend value {:?} while locked on {:?}",
                value,
                self.target_value
            );
            LockDecision::Suppressed
        }
    }

    pub fn is_locked(&self) -> bool {
        self.clock.now_ms() < self.locked_until
    }

    pub fn locked_until(&self) -> f64 {
        self.locked_until
    }

    pub fn target_value(&self) -> Option<&T> {
        self.target_value.as_ref()
    }
}
