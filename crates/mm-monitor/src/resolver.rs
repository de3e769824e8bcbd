//! The monitor resolver: turns raw display handles into [`MonitorRecord`]s
//! and performs input switches.
//!
//! Every hardware query is best-effort. A failing capability read, EDID
//! lookup or VCP read only degrades the field it feeds; the monitor is
//! still listed. The only fatal step is the base handle listing, and even
//! that surfaces as an empty list from [`Resolver::enumerate`].

use log::{debug, info, warn};
use std::error::Error;
use std::fmt;

use crate::brand::{is_internal_panel, resolve_brand};
use crate::caps;
use crate::edid::model_from_edid;
use crate::input::{
    capability_input_name, resolve_code_name, resolve_input_code, InputCode, UnknownInput,
    FALLBACK_INPUTS,
};
use crate::{MonitorRecord, UNKNOWN};

/// Platform access to physical displays.
///
/// Implementations own handle lifetime: whatever `monitors` hands out must
/// release its OS resources on drop.
pub trait DisplayBackend {
    type Monitor;

    /// Every physical monitor handle, in platform order.
    fn monitors(&self) -> Result<Vec<Self::Monitor>, Box<dyn Error>>;

    /// PnP-style device identifiers paired positionally with `monitors`.
    ///
    /// The returned list may be shorter than `monitors`; missing entries
    /// are treated as unknown.
    fn device_ids(&self, monitors: &[Self::Monitor]) -> Vec<Option<String>>;

    /// Raw MCCS capability string.
    fn capabilities(&self, monitor: &Self::Monitor) -> Result<String, Box<dyn Error>>;

    /// Raw EDID block for a device identifier.
    fn edid(&self, device_id: &str) -> Option<Vec<u8>>;

    /// Model name the platform listing already carries. Tried after EDID.
    fn listed_model(&self, _monitor: &Self::Monitor) -> Option<String> {
        None
    }

    /// Current value of VCP 0x60.
    fn current_input(&self, monitor: &Self::Monitor) -> Result<InputCode, Box<dyn Error>>;

    /// Write VCP 0x60.
    fn set_input(&self, monitor: &Self::Monitor, code: InputCode) -> Result<(), Box<dyn Error>>;
}

/// Why a switch did not happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchError {
    /// The input name does not resolve. Nothing was sent to any monitor.
    UnknownInput(UnknownInput),
    NoMonitors,
    IndexOutOfRange { index: usize, count: usize },
    /// The DDC/CI write failed; carries the OS error text.
    Hardware(String),
}

impl fmt::Display for SwitchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchError::UnknownInput(e) => write!(f, "{}", e),
            SwitchError::NoMonitors => write!(f, "No monitors found"),
            SwitchError::IndexOutOfRange { index, count } => write!(
                f,
                "Monitor index {} is out of range. Found {} monitors.",
                index, count
            ),
            SwitchError::Hardware(msg) => write!(f, "Failed to switch input: {}", msg),
        }
    }
}

impl Error for SwitchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SwitchError::UnknownInput(e) => Some(e),
            _ => None,
        }
    }
}

impl From<UnknownInput> for SwitchError {
    fn from(e: UnknownInput) -> Self {
        SwitchError::UnknownInput(e)
    }
}

/// Monitor resolver over a [`DisplayBackend`].
pub struct Resolver<B> {
    backend: B,
}

impl<B: DisplayBackend> Resolver<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Describe every external monitor.
    ///
    /// Internal laptop panels are skipped and indices stay contiguous over
    /// the monitors that remain, in platform order.
    pub fn enumerate(&self) -> Vec<MonitorRecord> {
        let monitors = match self.external_monitors() {
            Ok(m) => m,
            Err(e) => {
                warn!("Monitor enumeration failed: {}", e);
                return Vec::new();
            }
        };

        let records: Vec<MonitorRecord> = monitors
            .iter()
            .enumerate()
            .map(|(index, (monitor, device_id))| {
                self.describe(index, monitor, device_id.as_deref())
            })
            .collect();

        for record in &records {
            info!(
                "[{}] {} | inputs: {} | current: {}",
                record.index,
                record.display_name,
                record.available_inputs.join(", "),
                record.current_input
            );
        }
        records
    }

    /// Switch monitor `index` (as numbered by [`Resolver::enumerate`]) to
    /// `input_name`. Returns the code that was written.
    ///
    /// The name is resolved before any hardware is touched. There is no
    /// retry.
    pub fn switch_input(&self, index: usize, input_name: &str) -> Result<InputCode, SwitchError> {
        let code = resolve_input_code(input_name)?;

        let monitors = self.external_monitors().map_err(|e| {
            SwitchError::Hardware(format!("monitor enumeration failed: {}", e))
        })?;

        if monitors.is_empty() {
            return Err(SwitchError::NoMonitors);
        }
        let (monitor, _) = monitors.get(index).ok_or(SwitchError::IndexOutOfRange {
            index,
            count: monitors.len(),
        })?;

        self.backend
            .set_input(monitor, code)
            .map_err(|e| SwitchError::Hardware(e.to_string()))?;

        info!(
            "Switched monitor {} to {} (code {})",
            index,
            input_name.trim().to_ascii_uppercase(),
            code
        );
        Ok(code)
    }

    /// Handles that survive the internal-panel filter, each with its
    /// device ID when one was found.
    fn external_monitors(&self) -> Result<Vec<(B::Monitor, Option<String>)>, Box<dyn Error>> {
        let monitors = self.backend.monitors()?;
        info!("Found {} physical monitor(s)", monitors.len());

        let mut ids = self.backend.device_ids(&monitors);
        debug!("PnP device IDs: {:?}", ids);
        ids.resize(monitors.len(), None);

        let mut external = Vec::with_capacity(monitors.len());
        for (handle_index, (monitor, id)) in monitors.into_iter().zip(ids).enumerate() {
            if let Some(ref device_id) = id {
                if is_internal_panel(device_id) {
                    info!(
                        "Skipping internal panel at handle {}: {}",
                        handle_index, device_id
                    );
                    continue;
                }
            }
            external.push((monitor, id));
        }
        Ok(external)
    }

    fn describe(&self, index: usize, monitor: &B::Monitor, device_id: Option<&str>) -> MonitorRecord {
        let capabilities = match self.backend.capabilities(monitor) {
            Ok(raw) => Some(caps::parse(&raw)),
            Err(e) => {
                warn!("Monitor {}: capabilities unavailable: {}", index, e);
                None
            }
        };

        let model = capabilities
            .as_ref()
            .and_then(|c| c.model.clone())
            .filter(|m| !m.eq_ignore_ascii_case(UNKNOWN))
            .or_else(|| {
                let id = device_id?;
                let edid = self.backend.edid(id)?;
                model_from_edid(&edid)
            })
            .or_else(|| self.backend.listed_model(monitor))
            .unwrap_or_else(|| UNKNOWN.to_string());

        let brand = resolve_brand(device_id, &model);

        let mut available_inputs: Vec<String> = capabilities
            .as_ref()
            .map(|c| c.inputs.iter().map(|&v| capability_input_name(v)).collect())
            .unwrap_or_default();
        if available_inputs.is_empty() {
            debug!("Monitor {}: no inputs reported, using fallback list", index);
            available_inputs = FALLBACK_INPUTS.iter().map(|s| s.to_string()).collect();
        }

        let current_input = match self.backend.current_input(monitor) {
            Ok(code) => resolve_code_name(code & 0x00FF),
            Err(e) => {
                warn!("Monitor {}: could not read current input: {}", index, e);
                UNKNOWN.to_string()
            }
        };

        MonitorRecord {
            index,
            display_name: format!("{} - {}", brand, model),
            brand,
            model,
            available_inputs,
            current_input,
        }
    }
}

/// Backend for platforms without a DDC/CI implementation. Listing always
/// fails, so enumeration is empty.
#[cfg(not(any(windows, target_os = "linux")))]
#[derive(Debug, Default)]
pub struct UnsupportedBackend;

#[cfg(not(any(windows, target_os = "linux")))]
impl DisplayBackend for UnsupportedBackend {
    type Monitor = ();

    fn monitors(&self) -> Result<Vec<()>, Box<dyn Error>> {
        Err("DDC/CI is not supported on this platform".into())
    }

    fn device_ids(&self, _monitors: &[()]) -> Vec<Option<String>> {
        Vec::new()
    }

    fn capabilities(&self, _monitor: &()) -> Result<String, Box<dyn Error>> {
        Err("unsupported".into())
    }

    fn edid(&self, _device_id: &str) -> Option<Vec<u8>> {
        None
    }

    fn current_input(&self, _monitor: &()) -> Result<InputCode, Box<dyn Error>> {
        Err("unsupported".into())
    }

    fn set_input(&self, _monitor: &(), _code: InputCode) -> Result<(), Box<dyn Error>> {
        Err("unsupported".into())
    }
}

#[cfg(test)]
#[path = "tests/resolver_tests.rs"]
mod tests;
