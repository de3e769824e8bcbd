//! PnP device identifiers from WMI and EDID blocks from the registry.

use log::debug;
use serde::Deserialize;
use std::error::Error;
use winreg::enums::HKEY_LOCAL_MACHINE;
use winreg::RegKey;
use wmi::{COMLibrary, WMIConnection};

const ENUM_KEY: &str = r"SYSTEM\CurrentControlSet\Enum";

#[derive(Deserialize, Debug)]
#[serde(rename = "Win32_DesktopMonitor")]
struct DesktopMonitor {
    #[serde(rename = "PNPDeviceID")]
    pnp_device_id: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename = "Win32_VideoController")]
#[serde(rename_all = "PascalCase")]
struct VideoController {
    name: Option<String>,
    #[serde(rename = "PNPDeviceID")]
    pnp_device_id: Option<String>,
}

/// `PNPDeviceID` of every `Win32_DesktopMonitor`, in WMI order.
///
/// Entries WMI reports without an ID stay in place as `None` so that
/// positions line up with the physical monitor list.
pub fn desktop_monitor_ids() -> Result<Vec<Option<String>>, Box<dyn Error>> {
    let com = COMLibrary::new()?;
    let wmi = WMIConnection::new(com)?;

    let monitors: Vec<DesktopMonitor> =
        wmi.raw_query("SELECT PNPDeviceID FROM Win32_DesktopMonitor")?;

    Ok(monitors
        .into_iter()
        .map(|m| m.pnp_device_id.filter(|id| !id.trim().is_empty()))
        .collect())
}

/// Debug-log the display adapters. Failures are ignored.
pub fn log_video_controllers() {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    let result = COMLibrary::new()
        .and_then(WMIConnection::new)
        .and_then(|wmi| {
            wmi.raw_query::<VideoController>("SELECT Name, PNPDeviceID FROM Win32_VideoController")
        });
    match result {
        Ok(adapters) => {
            for a in adapters {
                debug!(
                    "Display adapter: {} ({})",
                    a.name.as_deref().unwrap_or("?"),
                    a.pnp_device_id.as_deref().unwrap_or("?")
                );
            }
        }
        Err(e) => debug!("Win32_VideoController query failed: {}", e),
    }
}

/// Raw `EDID` value under the device's `Device Parameters` key.
pub fn read_edid(pnp_device_id: &str) -> Result<Vec<u8>, Box<dyn Error>> {
    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    let path = format!(r"{}\{}\Device Parameters", ENUM_KEY, pnp_device_id);
    let key = hklm.open_subkey(&path)?;
    let value = key.get_raw_value("EDID")?;
    Ok(value.bytes.to_vec())
}
