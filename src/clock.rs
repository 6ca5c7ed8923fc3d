/// Millisecond time source used by the interaction lock.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Wall clock of the hosting web view.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

#[cfg(test)]
pub(crate) use manual::ManualClock;
