//! Vibration feedback through the browser vibration API.
//!
//! Devices without a vibration motor, browsers without the API and native
//! builds all end up as a silent no-op.

/// Plays a vibration pattern: alternating on/off durations in milliseconds.
///
/// Returns whether the platform accepted the pattern.
#[cfg(target_arch = "wasm32")]
pub fn vibrate(pattern_ms: &[u32]) -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let Ok(pattern) = serde_wasm_bindgen::to_value(pattern_ms) else {
        bevy::log::warn!("Could not convert vibration pattern {pattern_ms:?}");
        return false;
    };

    window.navigator().vibrate_with_pattern(&pattern)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn vibrate(pattern_ms: &[u32]) -> bool {
    bevy::log::debug!("Vibration {pattern_ms:?} skipped, no haptics on this platform");
    false
}
