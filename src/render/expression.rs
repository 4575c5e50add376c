//! Read and write expressions of definition entries.

/// Event-name prefixes of simulator-native events, triggered with `(>K:NAME)`.
///
/// Every other event is an addon event and is triggered with `(>B:NAME)`, which
/// is not subject to the native event replication limit.
pub const NATIVE_EVENT_PREFIXES: [&str; 44] = [
    "COM_",
    "COM1_",
    "COM2_",
    "COM3_",
    "NAV_",
    "NAV1_",
    "NAV2_",
    "NAV3_",
    "NAV4_",
    "ADF_",
    "ADF1_",
    "ADF2_",
    "TRANSPONDER_",
    "XPNDR_",
    "TOGGLE_",
    "SET_",
    "AXIS_",
    "RUDDER_",
    "ELEVATOR_",
    "AILERON_",
    "THROTTLE_",
    "THROTTLE1_",
    "THROTTLE2_",
    "THROTTLE3_",
    "ELECTRICAL_",
    "ENGINE_",
    "FUEL_",
    "LIGHT_",
    "PITOT_",
    "ANTI_ICE",
    "BLEED_",
    "APU_",
    "GENERAL_ENG_",
    "RECIP_ENG_",
    "TURB_ENG_",
    "RADIO_",
    "KOHLSMAN_",
    "HEADING_",
    "SPEED_",
    "ALTITUDE_",
    "AUTOPILOT_",
    "AP_",
    "GPS_",
    "MARKER_",
];

/// Returns true for simulator-native events.
#[must_use]
pub fn is_native_event(name: &str) -> bool {
    NATIVE_EVENT_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

/// Bare trigger expression for an event.
#[must_use]
pub fn trigger(name: &str) -> String {
    if is_native_event(name) {
        format!("(>K:{name})")
    } else {
        format!("(>B:{name})")
    }
}

/// Conditional write: a truthy value fires the release, a falsy one the press.
#[must_use]
pub fn toggle(press: &str, release: &str) -> String {
    format!("\"value ? '{}' : '{}'\"", trigger(release), trigger(press))
}

/// Write-back of the runtime value into the variable itself.
///
/// `reference` is a full variable reference such as `L:MD11_VOL_KB`.
#[must_use]
pub fn increment(reference: &str) -> String {
    format!("\"`${{value}} (>{reference})`\"")
}
