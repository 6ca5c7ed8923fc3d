//! Web-view editor for the Wavfin plugin.
//!
//! Knobs, toggles and choice selectors in the page are bound to the host's
//! parameters through JUCE's web-view bridge. Controls render optimistically
//! on user input; toggles and selectors hold off stale host echoes with an
//! [`lock::InteractionLock`], knobs ignore the host while being dragged.
//!
//! ```js
//! import * as Juce from "./juce/index.js";
//! import init, { WavfinEditor } from "./pkg/wavfin_ui.js";
//!
//! await init();
//! const editor = new WavfinEditor(Juce, { lockDurationMs: 500 });
//! ```

pub mod bridge;
pub mod clock;
pub mod config;
pub mod dom;
pub mod editor;
pub mod error;
pub mod format;
pub mod juce;
pub mod knob;
pub mod lock;
pub mod params;
pub mod registry;
pub mod selector;
pub mod toggle;

#[cfg(test)]
mod testing;

pub use config::UiConfig;
pub use editor::WavfinEditor;
pub use error::UiError;
pub use format::format_knob_label;
pub use lock::{InteractionLock, LockDecision};

// Panics surface in the web view console instead of as "unreachable".
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}
