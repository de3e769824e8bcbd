//! DDC/CI access on Linux through the `ddcutil` command-line tool.
//!
//! `ddcutil` needs read/write access to `/dev/i2c-*` (usually the `i2c`
//! group). Every call spawns a process, so enumeration is slow but
//! straightforward.

use log::{debug, warn};
use regex::Regex;
use std::error::Error;
use std::process::{Command, Stdio};

use crate::input::{InputCode, VCP_INPUT_SOURCE};
use crate::resolver::DisplayBackend;

/// A display as listed by `ddcutil detect --terse`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DdcDisplay {
    /// ddcutil display number (1-based).
    pub number: u32,
    pub bus: Option<u32>,
    /// Three-letter EDID manufacturer code.
    pub mfg: Option<String>,
    /// EDID model name; stands in for the missing registry EDID.
    pub model: Option<String>,
}

/// [`DisplayBackend`] that shells out to `ddcutil`.
#[derive(Debug, Default)]
pub struct DdcutilBackend;

impl DisplayBackend for DdcutilBackend {
    type Monitor = DdcDisplay;

    fn monitors(&self) -> Result<Vec<DdcDisplay>, Box<dyn Error>> {
        let out = run(&["detect", "--terse"])?;
        Ok(parse_detect(&out)?)
    }

    fn device_ids(&self, monitors: &[DdcDisplay]) -> Vec<Option<String>> {
        monitors.iter().map(device_id).collect()
    }

    fn capabilities(&self, monitor: &DdcDisplay) -> Result<String, Box<dyn Error>> {
        let display = monitor.number.to_string();
        let out = run(&["capabilities", "--display", &display, "--verbose"])?;
        match parse_capabilities(&out)? {
            Some(caps) => Ok(caps),
            None => Err("no capabilities string in ddcutil output".into()),
        }
    }

    fn edid(&self, _device_id: &str) -> Option<Vec<u8>> {
        None
    }

    fn listed_model(&self, monitor: &DdcDisplay) -> Option<String> {
        monitor.model.clone()
    }

    fn current_input(&self, monitor: &DdcDisplay) -> Result<InputCode, Box<dyn Error>> {
        let display = monitor.number.to_string();
        let code = format!("{:02x}", VCP_INPUT_SOURCE);
        let out = run(&["getvcp", &code, "--display", &display, "--terse"])?;
        parse_getvcp(&out)?.ok_or_else(|| format!("unexpected getvcp output: {}", out.trim()).into())
    }

    fn set_input(&self, monitor: &DdcDisplay, code: InputCode) -> Result<(), Box<dyn Error>> {
        let display = monitor.number.to_string();
        let vcp = format!("{:02x}", VCP_INPUT_SOURCE);
        let value = format!("0x{:02x}", code);
        run(&["setvcp", &vcp, &value, "--display", &display])?;
        Ok(())
    }
}

/// Synthesized `DDCUTIL\<MFG>\i2c-<bus>` identifier.
///
/// The manufacturer code sits in the second segment so the usual PnP
/// lookup applies.
fn device_id(display: &DdcDisplay) -> Option<String> {
    let mfg = display.mfg.as_deref()?;
    let bus = display
        .bus
        .map(|b| format!("i2c-{}", b))
        .unwrap_or_else(|| format!("display-{}", display.number));
    Some(format!(r"DDCUTIL\{}\{}", mfg, bus))
}

fn run(args: &[&str]) -> Result<String, Box<dyn Error>> {
    debug!("ddcutil {}", args.join(" "));
    let out = Command::new("ddcutil")
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| format!("failed to run ddcutil: {}", e))?;

    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        warn!("ddcutil {} failed: {}", args.join(" "), stderr.trim());
        return Err(format!("ddcutil {} failed: {}", args[0], stderr.trim()).into());
    }
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}

/// Parse `ddcutil detect --terse`. `Invalid display` blocks are dropped.
///
/// ```text
/// Display 1
///    I2C bus:  /dev/i2c-4
///    Monitor:  DEL:DELL U2720Q:7ZHXK13
/// ```
pub fn parse_detect(output: &str) -> Result<Vec<DdcDisplay>, regex::Error> {
    let re_display = Regex::new(r"^Display\s+(\d+)")?;
    let re_bus = Regex::new(r"/dev/i2c-(\d+)")?;
    let re_monitor = Regex::new(r"^\s*Monitor:\s*([^:]*):([^:]*)")?;

    let mut displays = Vec::new();
    let mut current: Option<DdcDisplay> = None;

    for line in output.lines() {
        if let Some(c) = re_display.captures(line) {
            displays.extend(current.take());
            current = Some(DdcDisplay {
                number: c[1].parse().unwrap_or(0),
                ..Default::default()
            });
            continue;
        }
        if !line.starts_with(char::is_whitespace) && !line.trim().is_empty() {
            // Any other block header, e.g. "Invalid display".
            displays.extend(current.take());
            continue;
        }
        let Some(ref mut d) = current else { continue };
        if let Some(c) = re_bus.captures(line) {
            d.bus = c[1].parse().ok();
        } else if let Some(c) = re_monitor.captures(line) {
            d.mfg = non_empty(&c[1]);
            d.model = non_empty(&c[2]);
        }
    }
    displays.extend(current.take());

    Ok(displays.into_iter().filter(|d| d.number > 0).collect())
}

/// Capability string from `ddcutil capabilities --verbose`.
pub fn parse_capabilities(output: &str) -> Result<Option<String>, regex::Error> {
    let re = Regex::new(r"(?im)capabilities string:\s*(.*)$")?;
    Ok(re
        .captures(output)
        .and_then(|c| non_empty(&c[1])))
}

/// Current value from `ddcutil getvcp 60 --terse` (`VCP 60 SNC x0f`).
pub fn parse_getvcp(output: &str) -> Result<Option<InputCode>, regex::Error> {
    let re = Regex::new(r"VCP\s+60\s+\w+\s+x([0-9a-fA-F]+)")?;
    Ok(re
        .captures(output)
        .and_then(|c| InputCode::from_str_radix(&c[1], 16).ok()))
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETECT: &str = "\
Display 1
   I2C bus:  /dev/i2c-4
   Monitor:  DEL:DELL U2720Q:7ZHXK13

Invalid display
   I2C bus:  /dev/i2c-7
   Monitor:  BOE::

Display 2
   I2C bus:  /dev/i2c-6
   Monitor:  GSM:LG ULTRAGEAR:
";

    #[test]
    fn detect_lists_valid_displays() {
        let displays = parse_detect(DETECT).unwrap();
        assert_eq!(displays.len(), 2);
        assert_eq!(
            displays[0],
            DdcDisplay {
                number: 1,
                bus: Some(4),
                mfg: Some("DEL".into()),
                model: Some("DELL U2720Q".into()),
            }
        );
        assert_eq!(displays[1].number, 2);
        assert_eq!(displays[1].bus, Some(6));
        assert_eq!(displays[1].model.as_deref(), Some("LG ULTRAGEAR"));
    }

    #[test]
    fn detect_empty_output() {
        assert!(parse_detect("").unwrap().is_empty());
        assert!(parse_detect("No displays found.\n").unwrap().is_empty());
    }

    #[test]
    fn device_id_carries_manufacturer_code() {
        let displays = parse_detect(DETECT).unwrap();
        let id = device_id(&displays[0]).unwrap();
        assert_eq!(id, r"DDCUTIL\DEL\i2c-4");
        assert_eq!(crate::brand::manufacturer_code(&id).as_deref(), Some("DEL"));
        assert!(!crate::brand::is_internal_panel(&id));
    }

    #[test]
    fn listed_model_comes_from_detect() {
        let displays = parse_detect(DETECT).unwrap();
        let backend = DdcutilBackend;
        assert_eq!(backend.listed_model(&displays[0]).as_deref(), Some("DELL U2720Q"));
        assert_eq!(backend.listed_model(&displays[1]).as_deref(), Some("LG ULTRAGEAR"));
    }

    #[test]
    fn device_id_needs_manufacturer() {
        let display = DdcDisplay {
            number: 3,
            ..Default::default()
        };
        assert_eq!(device_id(&display), None);
    }

    #[test]
    fn capabilities_line_is_extracted() {
        let out = "Model: U2720Q\nMCCS version: 2.1\nUnparsed capabilities string: (prot(monitor)model(U2720Q)vcp(60(0F 11)))\n";
        assert_eq!(
            parse_capabilities(out).unwrap().as_deref(),
            Some("(prot(monitor)model(U2720Q)vcp(60(0F 11)))")
        );
    }

    #[test]
    fn capabilities_missing() {
        assert_eq!(parse_capabilities("Display not found").unwrap(), None);
    }

    #[test]
    fn getvcp_terse_value() {
        assert_eq!(parse_getvcp("VCP 60 SNC x0f\n").unwrap(), Some(0x0F));
        assert_eq!(parse_getvcp("VCP 60 SNC x1b").unwrap(), Some(27));
    }

    #[test]
    fn getvcp_garbage() {
        assert_eq!(parse_getvcp("VCP 60 ERR").unwrap(), None);
    }
}
