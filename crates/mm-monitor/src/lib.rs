//! Monitor identification and input switching over DDC/CI.
//!
//! [`enumerate_monitors`] lists external monitors with a best-effort brand,
//! model, input list and current input. [`switch_input`] writes VCP 0x60 to
//! one of them. Both go through a [`resolver::Resolver`] over the platform's
//! [`resolver::DisplayBackend`]:
//!
//! - Windows: `dxva2.dll` physical monitors, WMI device IDs, registry EDID.
//! - Linux: the `ddcutil` command-line tool.
//!
//! Records are rebuilt on every call. Their `index` is only meaningful
//! until the next enumeration.

pub mod brand;
pub mod caps;
pub mod edid;
pub mod input;
pub mod resolver;

#[cfg(windows)]
pub mod ddc;
#[cfg(windows)]
mod pnp;

#[cfg(target_os = "linux")]
pub mod ddcutil;

pub use input::{resolve_code_name, resolve_input_code, InputCode, UnknownInput};
pub use resolver::{DisplayBackend, Resolver, SwitchError};

/// Placeholder for any field that could not be determined.
pub const UNKNOWN: &str = "Unknown";

/// One external monitor as seen by the last enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorRecord {
    pub index: usize,
    pub brand: String,
    pub model: String,
    /// `"{brand} - {model}"`.
    pub display_name: String,
    pub available_inputs: Vec<String>,
    pub current_input: String,
}

#[cfg(windows)]
pub type SystemBackend = ddc::Dxva2Backend;

#[cfg(target_os = "linux")]
pub type SystemBackend = ddcutil::DdcutilBackend;

#[cfg(not(any(windows, target_os = "linux")))]
pub type SystemBackend = resolver::UnsupportedBackend;

/// Resolver over this platform's backend.
pub fn system_resolver() -> Resolver<SystemBackend> {
    Resolver::new(SystemBackend::default())
}

/// List external monitors. Empty when none are found or listing fails.
pub fn enumerate_monitors() -> Vec<MonitorRecord> {
    system_resolver().enumerate()
}

/// Switch monitor `index` (as numbered by [`enumerate_monitors`]) to the
/// named input.
pub fn switch_input(index: usize, input_name: &str) -> Result<InputCode, SwitchError> {
    system_resolver().switch_input(index, input_name)
}

/// First record whose display name matches, ignoring ASCII case.
pub fn find_by_display_name<'a>(
    records: &'a [MonitorRecord],
    display_name: &str,
) -> Option<&'a MonitorRecord> {
    records
        .iter()
        .find(|r| r.display_name.eq_ignore_ascii_case(display_name))
}
