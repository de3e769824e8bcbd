//! "Start with Windows": a value under the current user's `Run` key that
//! launches the hotkey listener at logon.

use std::error::Error;
use std::path::Path;

/// Registry key holding per-user autostart entries.
pub const RUN_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";

/// Value name under [`RUN_KEY`].
pub const VALUE_NAME: &str = "MonitorManager";

/// Command line stored in the registry for `exe`.
pub fn startup_command(exe: &Path) -> String {
    format!("\"{}\" listen", exe.display())
}

#[cfg(windows)]
mod imp {
    use super::*;
    use log::info;
    use std::io;
    use winreg::enums::{HKEY_CURRENT_USER, KEY_READ, KEY_SET_VALUE};
    use winreg::RegKey;

    pub fn is_enabled() -> bool {
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        match hkcu.open_subkey_with_flags(RUN_KEY, KEY_READ) {
            Ok(key) => key.get_value::<String, _>(VALUE_NAME).is_ok(),
            Err(_) => false,
        }
    }

    pub fn enable() -> Result<(), Box<dyn Error>> {
        let exe = std::env::current_exe()?;
        let command = startup_command(&exe);
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let (key, _) = hkcu.create_subkey(RUN_KEY)?;
        key.set_value(VALUE_NAME, &command)?;
        info!("Startup entry written: {}", command);
        Ok(())
    }

    pub fn disable() -> Result<(), Box<dyn Error>> {
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let key = match hkcu.open_subkey_with_flags(RUN_KEY, KEY_SET_VALUE) {
            Ok(key) => key,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        match key.delete_value(VALUE_NAME) {
            Ok(()) => {
                info!("Startup entry removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(not(windows))]
mod imp {
    use super::*;

    pub fn is_enabled() -> bool {
        false
    }

    pub fn enable() -> Result<(), Box<dyn Error>> {
        Err("start with Windows is only available on Windows".into())
    }

    pub fn disable() -> Result<(), Box<dyn Error>> {
        Err("start with Windows is only available on Windows".into())
    }
}

/// Whether the autostart value exists.
pub fn is_enabled() -> bool {
    imp::is_enabled()
}

/// Register the current executable to run `listen` at logon.
pub fn enable() -> Result<(), Box<dyn Error>> {
    imp::enable()
}

/// Remove the autostart value. A missing value is not an error.
pub fn disable() -> Result<(), Box<dyn Error>> {
    imp::disable()
}

/// Enable or disable to match `on`.
pub fn set_enabled(on: bool) -> Result<(), Box<dyn Error>> {
    if on {
        enable()
    } else {
        disable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn command_quotes_path_and_runs_listener() {
        let exe = PathBuf::from("/opt/monitor manager/monitor-manager");
        assert_eq!(
            startup_command(&exe),
            "\"/opt/monitor manager/monitor-manager\" listen"
        );
    }

    #[test]
    fn run_key_location() {
        assert_eq!(RUN_KEY, r"Software\Microsoft\Windows\CurrentVersion\Run");
        assert_eq!(VALUE_NAME, "MonitorManager");
    }

    #[cfg(not(windows))]
    #[test]
    fn unsupported_elsewhere() {
        assert!(!is_enabled());
        assert!(enable().is_err());
        assert!(disable().is_err());
    }

    #[cfg(windows)]
    #[test]
    fn is_enabled_does_not_panic() {
        let _ = is_enabled();
    }
}
