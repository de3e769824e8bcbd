//! Hotkey listener: registers every shortcut and switches inputs on press.
//!
//! Architecture (Windows):
//!   - A hidden message-only window owns the `RegisterHotKey` registrations
//!   - `WM_HOTKEY` hands the switch to a short-lived worker thread so the
//!     message pump never blocks on DDC/CI
//!   - A busy flag drops presses while a switch is still running
//!   - Ctrl+C posts a quit message to the window and the pump exits

use log::{error, info, warn};
use mm_core::config::{Settings, Shortcuts, SwitchTarget};
use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::{Hotkey, HELP_HOTKEY};

// ============================================================================
// Busy flag
// ============================================================================

/// Admits one switch at a time.
#[derive(Debug, Clone, Default)]
pub struct SwitchGate {
    busy: Arc<AtomicBool>,
}

/// Held for the duration of a switch; releases the gate on drop.
#[derive(Debug)]
pub struct SwitchPermit {
    busy: Arc<AtomicBool>,
}

impl SwitchGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another switch holds the gate.
    pub fn try_begin(&self) -> Option<SwitchPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SwitchPermit {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for SwitchPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

// ============================================================================
// Bindings
// ============================================================================

/// One registered shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub hotkey: Hotkey,
    pub target: SwitchTarget,
}

/// Parse every stored combo. Invalid combos, duplicates and combos that
/// collide with [`HELP_HOTKEY`] are skipped with a warning.
pub fn bindings(shortcuts: &Shortcuts) -> Vec<Binding> {
    let help = Hotkey::parse(HELP_HOTKEY).ok();
    let mut out: Vec<Binding> = Vec::with_capacity(shortcuts.len());

    for (combo, target) in shortcuts.iter() {
        let hotkey = match Hotkey::parse(combo) {
            Ok(h) => h,
            Err(e) => {
                warn!("Skipping shortcut '{}': {}", combo, e);
                continue;
            }
        };
        if help.as_ref() == Some(&hotkey) {
            warn!("Skipping shortcut '{}': reserved for help", combo);
            continue;
        }
        if out.iter().any(|b| b.hotkey == hotkey) {
            warn!("Skipping shortcut '{}': duplicate of {}", combo, hotkey);
            continue;
        }
        out.push(Binding {
            hotkey,
            target: target.clone(),
        });
    }
    out
}

/// Shortcut list shown by the help hotkey.
pub fn help_text(bindings: &[Binding]) -> String {
    let mut text = String::from("Monitor Manager shortcuts:\n");
    if bindings.is_empty() {
        text.push_str("  (none configured)\n");
    }
    for b in bindings {
        text.push_str(&format!(
            "  {:<20} monitor {} → {}\n",
            b.hotkey.to_string(),
            b.target.monitor_index,
            b.target.input_name
        ));
    }
    text.push_str(&format!("  {:<20} show this list\n", HELP_HOTKEY));
    text
}

// ============================================================================
// Switching
// ============================================================================

/// Switch to `target`, then log and toast the outcome.
pub fn perform_switch(target: &SwitchTarget, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let result = mm_monitor::switch_input(target.monitor_index, &target.input_name);
    match &result {
        Ok(code) => {
            info!(
                "Shortcut switch: monitor {} → {} (code {})",
                target.monitor_index, target.input_name, code
            );
            mm_notify::show_switch_toast(
                settings.toast_enabled,
                mm_notify::TOAST_TITLE,
                &mm_notify::switched_body(target.monitor_index, &target.input_name),
                settings.verbose,
            );
        }
        Err(e) => {
            error!("Shortcut switch failed: {}", e);
            mm_notify::show_switch_toast(
                settings.toast_enabled,
                mm_notify::TOAST_TITLE,
                &mm_notify::failed_body(target.monitor_index, &target.input_name, &e.to_string()),
                settings.verbose,
            );
        }
    }
    result.map(|_| ()).map_err(|e| e.into())
}

/// Run `target` on a worker thread unless a switch is already running.
///
/// Returns `false` when the press was dropped.
pub fn dispatch_switch(gate: &SwitchGate, target: &SwitchTarget, settings: &Settings) -> bool {
    let Some(permit) = gate.try_begin() else {
        info!(
            "Switch already in progress, ignoring shortcut for monitor {}",
            target.monitor_index
        );
        return false;
    };

    let target = target.clone();
    let settings = settings.clone();
    std::thread::spawn(move || {
        let _permit = permit;
        let _ = perform_switch(&target, &settings);
    });
    true
}

// ============================================================================
// Entry point
// ============================================================================

/// Register all shortcuts and block until Ctrl+C.
pub fn listen(shortcuts: &Shortcuts, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let bindings = bindings(shortcuts);
    if bindings.is_empty() {
        warn!("No valid shortcuts configured; only the help hotkey is active");
    }
    imp::run(bindings, settings)
}

#[cfg(not(windows))]
mod imp {
    use super::*;

    pub fn run(_bindings: Vec<Binding>, _settings: &Settings) -> Result<(), Box<dyn Error>> {
        Err("global hotkeys are only available on Windows".into())
    }
}

#[cfg(windows)]
mod imp {
    use super::*;
    use std::cell::RefCell;
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    use std::sync::Mutex;
    use std::{mem, ptr};

    use windows::core::PCWSTR;
    use windows::Win32::Foundation::{BOOL, HWND, LPARAM, LRESULT, WPARAM};
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS,
    };
    use windows::Win32::UI::WindowsAndMessaging::*;

    /// Custom window message to signal shutdown.
    const WM_QUIT_LISTENER: u32 = WM_USER + 1;

    /// Hotkey id of the help combo. Shortcuts use 1..=n.
    const HELP_ID: i32 = 0;

    struct ListenerState {
        bindings: Vec<Binding>,
        settings: Settings,
        gate: SwitchGate,
    }

    // The window proc runs on the pump thread and reads this.
    thread_local! {
        static THREAD_STATE: RefCell<Option<ListenerState>> = const { RefCell::new(None) };
    }

    pub fn run(bindings: Vec<Binding>, settings: &Settings) -> Result<(), Box<dyn Error>> {
        let hwnd_slot: Arc<Mutex<Option<isize>>> = Arc::new(Mutex::new(None));
        let hwnd_for_handler = Arc::clone(&hwnd_slot);

        ctrlc::set_handler(move || {
            println!("\n[LISTEN] Shutting down...");
            if let Ok(slot) = hwnd_for_handler.lock() {
                if let Some(h) = *slot {
                    unsafe {
                        let _ = PostMessageW(HWND(h as _), WM_QUIT_LISTENER, WPARAM(0), LPARAM(0));
                    }
                }
            }
        })?;

        println!("[LISTEN] Listening for shortcuts (Ctrl+C to stop)");
        print!("{}", help_text(&bindings));
        println!();

        THREAD_STATE.with(|s| {
            *s.borrow_mut() = Some(ListenerState {
                bindings,
                settings: settings.clone(),
                gate: SwitchGate::new(),
            })
        });

        let result = pump(&hwnd_slot);
        THREAD_STATE.with(|s| *s.borrow_mut() = None);
        result
    }

    fn pump(hwnd_out: &Arc<Mutex<Option<isize>>>) -> Result<(), Box<dyn Error>> {
        let class_name = to_wide("MonitorManagerHotkeyWnd");
        let wc = WNDCLASSEXW {
            cbSize: mem::size_of::<WNDCLASSEXW>() as u32,
            lpfnWndProc: Some(wnd_proc),
            hInstance: unsafe {
                windows::Win32::System::LibraryLoader::GetModuleHandleW(PCWSTR(ptr::null()))?
            }
            .into(),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            ..Default::default()
        };

        let atom = unsafe { RegisterClassExW(&wc) };
        if atom == 0 {
            return Err("Failed to register window class".into());
        }

        // Message-only window (HWND_MESSAGE parent = invisible)
        let hwnd = unsafe {
            CreateWindowExW(
                Default::default(),
                PCWSTR(class_name.as_ptr()),
                PCWSTR(class_name.as_ptr()),
                Default::default(),
                0,
                0,
                0,
                0,
                HWND_MESSAGE,
                None,
                wc.hInstance,
                None,
            )?
        };

        if let Ok(mut slot) = hwnd_out.lock() {
            *slot = Some(hwnd.0 as isize);
        }

        let registered = register_all(hwnd);
        info!("Hotkey listener started with {} registration(s)", registered.len());

        unsafe {
            let mut msg = MSG::default();
            loop {
                let ret = GetMessageW(&mut msg, HWND::default(), 0, 0);
                if ret == BOOL(0) || ret == BOOL(-1) {
                    break;
                }
                if msg.message == WM_QUIT_LISTENER {
                    break;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }

        for id in registered {
            unsafe {
                let _ = UnregisterHotKey(hwnd, id);
            }
        }
        unsafe {
            let _ = DestroyWindow(hwnd);
            let _ = UnregisterClassW(PCWSTR(class_name.as_ptr()), wc.hInstance);
        }
        info!("Hotkey listener stopped");
        Ok(())
    }

    /// Register the help combo and every binding. Returns the ids that
    /// registered successfully.
    fn register_all(hwnd: HWND) -> Vec<i32> {
        let mut ids = Vec::new();

        if let Ok(help) = Hotkey::parse(HELP_HOTKEY) {
            if register(hwnd, HELP_ID, &help) {
                ids.push(HELP_ID);
            }
        }

        THREAD_STATE.with(|s| {
            if let Some(state) = s.borrow().as_ref() {
                for (i, b) in state.bindings.iter().enumerate() {
                    let id = i as i32 + 1;
                    if register(hwnd, id, &b.hotkey) {
                        ids.push(id);
                    }
                }
            }
        });
        ids
    }

    fn register(hwnd: HWND, id: i32, hotkey: &Hotkey) -> bool {
        let result =
            unsafe { RegisterHotKey(hwnd, id, HOT_KEY_MODIFIERS(hotkey.modifiers.flags()), hotkey.vk) };
        match result {
            Ok(()) => {
                info!("[OK] Registered {}", hotkey);
                true
            }
            Err(e) => {
                warn!("Could not register {} (in use by another program?): {}", hotkey, e);
                false
            }
        }
    }

    /// Window procedure: dispatches `WM_HOTKEY`.
    unsafe extern "system" fn wnd_proc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        match msg {
            WM_HOTKEY => {
                let id = wparam.0 as i32;
                THREAD_STATE.with(|s| {
                    if let Some(state) = s.borrow().as_ref() {
                        on_hotkey(state, id);
                    }
                });
                LRESULT(0)
            }

            WM_QUIT_LISTENER => {
                PostQuitMessage(0);
                LRESULT(0)
            }

            _ => DefWindowProcW(hwnd, msg, wparam, lparam),
        }
    }

    fn on_hotkey(state: &ListenerState, id: i32) {
        if id == HELP_ID {
            let text = help_text(&state.bindings);
            info!("{}", text.trim_end());
            println!("{}", text);
            return;
        }

        let Some(binding) = usize::try_from(id - 1)
            .ok()
            .and_then(|i| state.bindings.get(i))
        else {
            warn!("WM_HOTKEY with unknown id {}", id);
            return;
        };

        info!("Shortcut pressed: {}", binding.hotkey);
        dispatch_switch(&state.gate, &binding.target, &state.settings);
    }

    /// Convert a Rust string to a null-terminated wide string (UTF-16).
    fn to_wide(s: &str) -> Vec<u16> {
        OsStr::new(s)
            .encode_wide()
            .chain(std::iter::once(0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shortcuts(entries: &[(&str, usize, &str)]) -> Shortcuts {
        let mut s = Shortcuts::default();
        for (combo, idx, input) in entries {
            s.insert(*combo, SwitchTarget::new(*idx, *input));
        }
        s
    }

    // ── SwitchGate ───────────────────────────────────────────────

    #[test]
    fn gate_admits_one_switch() {
        let gate = SwitchGate::new();
        let permit = gate.try_begin();
        assert!(permit.is_some());
        assert!(gate.is_busy());
        assert!(gate.try_begin().is_none());
    }

    #[test]
    fn gate_reopens_when_permit_dropped() {
        let gate = SwitchGate::new();
        drop(gate.try_begin());
        assert!(!gate.is_busy());
        assert!(gate.try_begin().is_some());
    }

    #[test]
    fn gate_clones_share_state() {
        let gate = SwitchGate::new();
        let other = gate.clone();
        let _permit = gate.try_begin().unwrap();
        assert!(other.try_begin().is_none());
    }

    #[test]
    fn dispatch_drops_press_while_busy() {
        let gate = SwitchGate::new();
        let _permit = gate.try_begin().unwrap();
        let dispatched = dispatch_switch(
            &gate,
            &SwitchTarget::new(0, "HDMI1"),
            &Settings::default(),
        );
        assert!(!dispatched);
    }

    // ── bindings ─────────────────────────────────────────────────

    #[test]
    fn bindings_parse_valid_combos() {
        let b = bindings(&shortcuts(&[("ctrl+alt+1", 0, "HDMI1"), ("ctrl+alt+2", 1, "DP1")]));
        assert_eq!(b.len(), 2);
        assert_eq!(b[0].hotkey.vk, 0x31);
        assert_eq!(b[1].target, SwitchTarget::new(1, "DP1"));
    }

    #[test]
    fn bindings_skip_invalid_combos() {
        let b = bindings(&shortcuts(&[("ctrl+banana", 0, "HDMI1"), ("alt+3", 0, "DP2")]));
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].hotkey.to_string(), "alt+3");
    }

    #[test]
    fn bindings_skip_help_collision() {
        let b = bindings(&shortcuts(&[("Shift+Ctrl+H", 0, "HDMI1")]));
        assert!(b.is_empty());
    }

    #[test]
    fn bindings_skip_duplicates_after_normalising() {
        let b = bindings(&shortcuts(&[("alt+ctrl+1", 0, "HDMI1"), ("ctrl+alt+1", 1, "DP1")]));
        assert_eq!(b.len(), 1);
    }

    // ── help_text ────────────────────────────────────────────────

    #[test]
    fn help_text_lists_bindings_and_help() {
        let b = bindings(&shortcuts(&[("ctrl+alt+1", 0, "HDMI1")]));
        let text = help_text(&b);
        assert!(text.contains("ctrl+alt+1"));
        assert!(text.contains("monitor 0 → HDMI1"));
        assert!(text.contains(HELP_HOTKEY));
    }

    #[test]
    fn help_text_without_bindings() {
        assert!(help_text(&[]).contains("(none configured)"));
    }

    #[cfg(not(windows))]
    #[test]
    fn listen_is_unavailable_elsewhere() {
        assert!(listen(&Shortcuts::default(), &Settings::default()).is_err());
    }
}
