//! DDC/CI access via the Windows Monitor Configuration API.
//!
//! Uses `dxva2.dll` to turn each `HMONITOR` into physical monitor handles,
//! then reads the capability string and reads/writes VCP code 0x60
//! (Input Source Select).
//!
//! No admin rights needed. DDC/CI only requires access to the display
//! adapter, which every interactive user has.

use log::{debug, warn};
use std::error::Error;
use std::io;
use std::ptr;

use windows::Win32::Foundation::{BOOL, LPARAM, RECT};
use windows::Win32::Graphics::Gdi::{EnumDisplayMonitors, HDC, HMONITOR};

use crate::input::{InputCode, VCP_INPUT_SOURCE};
use crate::pnp;
use crate::resolver::DisplayBackend;

// ============================================================================
// DDC/CI FFI (dxva2.dll)
// ============================================================================

/// Opaque handle to a physical monitor.
type HANDLE = *mut std::ffi::c_void;

/// Physical monitor as returned by `GetPhysicalMonitorsFromHMONITOR`.
#[repr(C)]
struct RawPhysicalMonitor {
    handle: HANDLE,
    description: [u16; 128],
}

#[link(name = "dxva2")]
extern "system" {
    fn GetNumberOfPhysicalMonitorsFromHMONITOR(h_monitor: isize, num_monitors: *mut u32) -> BOOL;

    fn GetPhysicalMonitorsFromHMONITOR(
        h_monitor: isize,
        array_size: u32,
        physical_monitors: *mut RawPhysicalMonitor,
    ) -> BOOL;

    fn DestroyPhysicalMonitor(h_monitor: HANDLE) -> BOOL;

    fn GetCapabilitiesStringLength(h_monitor: HANDLE, length: *mut u32) -> BOOL;

    fn CapabilitiesRequestAndCapabilitiesReply(
        h_monitor: HANDLE,
        buffer: *mut u8,
        length: u32,
    ) -> BOOL;

    fn SetVCPFeature(h_monitor: HANDLE, vcp_code: u8, new_value: u32) -> BOOL;

    fn GetVCPFeatureAndVCPFeatureReply(
        h_monitor: HANDLE,
        vcp_code: u8,
        vcp_type: *mut u32,
        current_value: *mut u32,
        maximum_value: *mut u32,
    ) -> BOOL;
}

// ============================================================================
// Physical monitor handle
// ============================================================================

/// An open physical monitor. The handle is destroyed on drop.
#[derive(Debug)]
pub struct PhysicalMonitor {
    handle: HANDLE,
    description: String,
}

impl PhysicalMonitor {
    /// Description reported by dxva2, often just "Generic PnP Monitor".
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl Drop for PhysicalMonitor {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe {
                let _ = DestroyPhysicalMonitor(self.handle);
            }
        }
    }
}

// ============================================================================
// Backend
// ============================================================================

/// [`DisplayBackend`] over dxva2, WMI and the registry.
#[derive(Debug, Default)]
pub struct Dxva2Backend;

impl DisplayBackend for Dxva2Backend {
    type Monitor = PhysicalMonitor;

    fn monitors(&self) -> Result<Vec<PhysicalMonitor>, Box<dyn Error>> {
        let hmonitors = enumerate_hmonitors()?;
        let mut all = Vec::new();
        for hmon in hmonitors {
            match physical_monitors_for(hmon) {
                Ok(mut found) => all.append(&mut found),
                Err(e) => warn!("Could not open physical monitors for a display: {}", e),
            }
        }
        Ok(all)
    }

    fn device_ids(&self, _monitors: &[PhysicalMonitor]) -> Vec<Option<String>> {
        pnp::log_video_controllers();
        match pnp::desktop_monitor_ids() {
            Ok(ids) => ids,
            Err(e) => {
                warn!("WMI device ID query failed: {}", e);
                Vec::new()
            }
        }
    }

    fn capabilities(&self, monitor: &PhysicalMonitor) -> Result<String, Box<dyn Error>> {
        let mut length: u32 = 0;
        let ok = unsafe { GetCapabilitiesStringLength(monitor.handle, &mut length) };
        if !ok.as_bool() {
            let err = io::Error::last_os_error();
            return Err(format!("GetCapabilitiesStringLength failed: {}", err).into());
        }
        if length == 0 {
            return Ok(String::new());
        }

        let mut buffer = vec![0u8; length as usize];
        let ok = unsafe {
            CapabilitiesRequestAndCapabilitiesReply(monitor.handle, buffer.as_mut_ptr(), length)
        };
        if !ok.as_bool() {
            let err = io::Error::last_os_error();
            return Err(format!("CapabilitiesRequestAndCapabilitiesReply failed: {}", err).into());
        }

        let caps = decode_capabilities(&buffer);
        debug!("Capabilities for '{}': {}", monitor.description, caps);
        Ok(caps)
    }

    fn edid(&self, device_id: &str) -> Option<Vec<u8>> {
        match pnp::read_edid(device_id) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!("No EDID for {}: {}", device_id, e);
                None
            }
        }
    }

    fn current_input(&self, monitor: &PhysicalMonitor) -> Result<InputCode, Box<dyn Error>> {
        let mut vcp_type: u32 = 0;
        let mut current: u32 = 0;
        let mut maximum: u32 = 0;

        let ok = unsafe {
            GetVCPFeatureAndVCPFeatureReply(
                monitor.handle,
                VCP_INPUT_SOURCE,
                &mut vcp_type,
                &mut current,
                &mut maximum,
            )
        };
        if !ok.as_bool() {
            let err = io::Error::last_os_error();
            return Err(format!(
                "GetVCPFeatureAndVCPFeatureReply(0x{:02X}) failed: {}",
                VCP_INPUT_SOURCE, err
            )
            .into());
        }

        Ok((current & 0xFFFF) as InputCode)
    }

    fn set_input(&self, monitor: &PhysicalMonitor, code: InputCode) -> Result<(), Box<dyn Error>> {
        let ok = unsafe { SetVCPFeature(monitor.handle, VCP_INPUT_SOURCE, u32::from(code)) };
        if !ok.as_bool() {
            let err = io::Error::last_os_error();
            return Err(format!(
                "SetVCPFeature(0x{:02X}, {}) failed: {}",
                VCP_INPUT_SOURCE, code, err
            )
            .into());
        }
        Ok(())
    }
}

// ============================================================================
// Internal helpers
// ============================================================================

/// Open every physical monitor behind an `HMONITOR`.
fn physical_monitors_for(hmon: isize) -> Result<Vec<PhysicalMonitor>, Box<dyn Error>> {
    let mut count: u32 = 0;
    let ok = unsafe { GetNumberOfPhysicalMonitorsFromHMONITOR(hmon, &mut count) };
    if !ok.as_bool() || count == 0 {
        return Ok(Vec::new());
    }

    let mut raw: Vec<RawPhysicalMonitor> = (0..count)
        .map(|_| RawPhysicalMonitor {
            handle: ptr::null_mut(),
            description: [0u16; 128],
        })
        .collect();

    let ok = unsafe { GetPhysicalMonitorsFromHMONITOR(hmon, count, raw.as_mut_ptr()) };
    if !ok.as_bool() {
        let err = io::Error::last_os_error();
        return Err(format!("GetPhysicalMonitorsFromHMONITOR failed: {}", err).into());
    }

    Ok(raw
        .into_iter()
        .map(|pm| PhysicalMonitor {
            handle: pm.handle,
            description: decode_description(&pm.description),
        })
        .collect())
}

/// Enumerate all HMONITOR handles on the system.
fn enumerate_hmonitors() -> Result<Vec<isize>, Box<dyn Error>> {
    let mut handles: Vec<isize> = Vec::new();

    unsafe extern "system" fn callback(
        hmonitor: HMONITOR,
        _hdc: HDC,
        _rect: *mut RECT,
        data: LPARAM,
    ) -> BOOL {
        let vec = &mut *(data.0 as *mut Vec<isize>);
        vec.push(hmonitor.0 as isize);
        BOOL::from(true)
    }

    let ok = unsafe {
        EnumDisplayMonitors(
            HDC::default(),
            None,
            Some(callback),
            LPARAM(&mut handles as *mut Vec<isize> as isize),
        )
    };

    if !ok.as_bool() {
        return Err("EnumDisplayMonitors failed".into());
    }

    Ok(handles)
}

/// Decode the physical monitor description from a null-terminated UTF-16 array.
fn decode_description(raw: &[u16; 128]) -> String {
    raw.iter()
        .take_while(|&&c| c != 0)
        .filter_map(|&c| char::from_u32(c as u32))
        .collect()
}

/// ASCII capability reply up to the first NUL.
fn decode_capabilities(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_description_empty() {
        let raw = [0u16; 128];
        assert_eq!(decode_description(&raw), "");
    }

    #[test]
    fn decode_description_stops_at_nul() {
        let mut raw = [0u16; 128];
        for (i, ch) in "Generic PnP Monitor".encode_utf16().enumerate() {
            raw[i] = ch;
        }
        raw[30] = 'X' as u16;
        assert_eq!(decode_description(&raw), "Generic PnP Monitor");
    }

    #[test]
    fn decode_capabilities_trims_at_nul() {
        let raw = b"(model(X)vcp(60(11)))\0\0junk";
        assert_eq!(decode_capabilities(raw), "(model(X)vcp(60(11)))");
    }

    #[test]
    fn decode_capabilities_without_nul() {
        assert_eq!(decode_capabilities(b"(vcp(10))"), "(vcp(10))");
    }

    #[test]
    fn enumerate_hmonitors_does_not_panic() {
        // Headless CI may return an empty list; it should not fail.
        let result = enumerate_hmonitors();
        assert!(result.is_ok());
    }

    #[test]
    fn backend_listing_does_not_panic() {
        let backend = Dxva2Backend;
        if let Ok(monitors) = backend.monitors() {
            for m in &monitors {
                let _ = m.description();
            }
        }
    }
}
