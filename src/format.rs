//! Knob label text.
//!
//! Rules are tried in order and the first match wins, so the thousands
//! abbreviation beats the one-decimal whitelist.

pub const PLACEHOLDER: &str = "--";

/// Parameters that always show one decimal place.
pub const DEFAULT_ONE_DECIMAL_PARAMS: [&str; 2] = ["output_gain", "sat_drive"];

pub fn format_knob_label<S: AsRef<str>>(param_id: &str, value: f64, one_decimal: &[S]) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }

    let magnitude = value.abs();
    if magnitude >= 1_000_000.0 {
        return format!("{}M", to_fixed_1(value / 1_000_000.0));
    }
    if magnitude >= 1_000.0 {
        return format!("{}k", to_fixed_1(value / 1_000.0));
    }
    if one_decimal.iter().any(|p| p.as_ref() == param_id) {
        return to_fixed_1(value);
    }
    if magnitude < 10.0 && value.fract() != 0.0 {
        return to_fixed_1(value);
    }
    round_half_up(value).to_string()
}

/// One decimal place with exact ties rounded away from zero, the way the web
/// view's `Number.prototype.toFixed` does it.
pub fn to_fixed_1(value: f64) -> String {
    // Negative zero prints unsigned.
    let value = value + 0.0;
    // A value sits exactly halfway between two tenths only when it is an odd
    // multiple of 0.25; everything else formats unambiguously.
    let quarters = value.abs() * 4.0;
    let is_tie = quarters.fract() == 0.0 && quarters % 2.0 == 1.0;
    if !is_tie {
        return format!("{value:.1}");
    }

    let tenths = (value.abs() * 10.0).round() / 10.0;
    if value.is_sign_negative() {
        format!("-{tenths:.1}")
    } else {
        format!("{tenths:.1}")
    }
}

/// Nearest integer, halves toward positive infinity.
fn round_half_up(value: f64) -> i64 {
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64
}
