//! Input source names and their MCCS values for VCP code 0x60.
//!
//! Symbolic names are what the user sees and what shortcuts/favorites
//! persist; the numeric value is what goes over the wire. The mapping is a
//! closed table: anything that is not a standard name, `USB-C`,
//! `THUNDERBOLT`, or the `INPUT_<n>` passthrough is rejected before a
//! monitor is touched.

use std::error::Error;
use std::fmt;

/// Numeric value written to / read from VCP 0x60.
pub type InputCode = u16;

/// VCP code for Input Source Select.
pub const VCP_INPUT_SOURCE: u8 = 0x60;

/// Thunderbolt (USB-C connector carrying DisplayPort).  0x1A.
pub const VCP_INPUT_THUNDERBOLT: InputCode = 26;

/// USB-C with DisplayPort Alt Mode.  0x1B.
pub const VCP_INPUT_USB_C: InputCode = 27;

/// Name shown for code 0.
pub const NO_INPUT: &str = "NO INPUT";

/// Prefix used for codes without a symbolic name (`INPUT_42`).
pub const RAW_INPUT_PREFIX: &str = "INPUT_";

/// Inputs offered when a monitor does not report any in its capabilities.
pub const FALLBACK_INPUTS: &[&str] = &["DP1", "DP2", "HDMI1", "HDMI2", "DVI1", "VGA1"];

/// MCCS input source values 1–18.
const STANDARD_INPUTS: &[(InputCode, &str)] = &[
    (1, "VGA1"),
    (2, "VGA2"),
    (3, "DVI1"),
    (4, "DVI2"),
    (5, "COMPOSITE1"),
    (6, "COMPOSITE2"),
    (7, "SVIDEO1"),
    (8, "SVIDEO2"),
    (9, "TUNER1"),
    (10, "TUNER2"),
    (11, "TUNER3"),
    (12, "COMPONENT1"),
    (13, "COMPONENT2"),
    (14, "COMPONENT3"),
    (15, "DP1"),
    (16, "DP2"),
    (17, "HDMI1"),
    (18, "HDMI2"),
];

/// Extra spellings accepted on input. Older config files store the analog
/// inputs as `ANALOG1`/`ANALOG2`.
const ALIASES: &[(&str, InputCode)] = &[
    ("ANALOG1", 1),
    ("ANALOG2", 2),
    ("USB_C", VCP_INPUT_USB_C),
];

/// Returned by [`resolve_input_code`] for a name outside the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownInput(pub String);

impl fmt::Display for UnknownInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid input source: '{}'", self.0)
    }
}

impl Error for UnknownInput {}

/// Resolve a symbolic input name to the value to write to VCP 0x60.
///
/// Matching ignores ASCII case and surrounding whitespace.
pub fn resolve_input_code(name: &str) -> Result<InputCode, UnknownInput> {
    let key = name.trim().to_ascii_uppercase();

    match key.as_str() {
        "USB-C" => return Ok(VCP_INPUT_USB_C),
        "THUNDERBOLT" => return Ok(VCP_INPUT_THUNDERBOLT),
        _ => {}
    }

    if let Some(digits) = key.strip_prefix(RAW_INPUT_PREFIX) {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(code) = digits.parse::<InputCode>() {
                return Ok(code);
            }
        }
        return Err(UnknownInput(name.to_string()));
    }

    STANDARD_INPUTS
        .iter()
        .find(|(_, n)| *n == key)
        .map(|(code, _)| *code)
        .or_else(|| {
            ALIASES
                .iter()
                .find(|(n, _)| *n == key)
                .map(|(_, code)| *code)
        })
        .ok_or_else(|| UnknownInput(name.to_string()))
}

/// Display name for a VCP 0x60 value. Never fails.
pub fn resolve_code_name(code: InputCode) -> String {
    match code {
        0 => NO_INPUT.to_string(),
        VCP_INPUT_THUNDERBOLT => "THUNDERBOLT".to_string(),
        VCP_INPUT_USB_C => "USB-C".to_string(),
        _ => match standard_name(code) {
            Some(name) => name.to_string(),
            None => format!("UNKNOWN CODE {}", code),
        },
    }
}

/// Name for a value listed in a monitor's capability report.
///
/// Unlike [`resolve_code_name`], codes without a name become `INPUT_<code>`
/// so that they remain switchable through the passthrough form.
pub fn capability_input_name(code: u8) -> String {
    let code = InputCode::from(code);
    match code {
        VCP_INPUT_THUNDERBOLT => "THUNDERBOLT".to_string(),
        VCP_INPUT_USB_C => "USB-C".to_string(),
        _ => match standard_name(code) {
            Some(name) => name.to_string(),
            None => format!("{}{}", RAW_INPUT_PREFIX, code),
        },
    }
}

/// Every switchable name with its code, in code order.
pub fn known_inputs() -> Vec<(&'static str, InputCode)> {
    let mut all: Vec<(&'static str, InputCode)> =
        STANDARD_INPUTS.iter().map(|(code, name)| (*name, *code)).collect();
    all.push(("THUNDERBOLT", VCP_INPUT_THUNDERBOLT));
    all.push(("USB-C", VCP_INPUT_USB_C));
    all
}

fn standard_name(code: InputCode) -> Option<&'static str> {
    STANDARD_INPUTS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

#[cfg(test)]
#[path = "tests/input_tests.rs"]
mod tests;
