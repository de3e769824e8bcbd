//! Interactive terminal menu for Monitor Manager.
//!
//! Box-drawn pages over crossterm: a live monitor list with current inputs,
//! one-key switching, favorites, shortcut editing and settings toggles.
//! Enumeration runs on a worker thread; the key loop polls its channel so
//! the menu stays responsive while DDC/CI queries are slow.

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    style::{Color, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use log::{info, warn};
use mm_core::config::{Favorites, JsonFile, Settings, Shortcuts, SwitchTarget};
use mm_core::startup;
use mm_monitor::MonitorRecord;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

// ── UTF-8 console support (Windows) ──────────────────────────────────────

/// Switch the Windows console to UTF-8 and enable ANSI escape handling so
/// box drawing and crossterm colours work in cmd.exe and older hosts.
pub fn enable_utf8_console() {
    #[cfg(windows)]
    {
        use windows::Win32::System::Console::{
            GetConsoleMode, GetStdHandle, SetConsoleCP, SetConsoleMode, SetConsoleOutputCP,
            ENABLE_PROCESSED_OUTPUT, ENABLE_VIRTUAL_TERMINAL_PROCESSING, STD_OUTPUT_HANDLE,
        };

        unsafe {
            let _ = SetConsoleOutputCP(65001);
            let _ = SetConsoleCP(65001);

            let handle = match GetStdHandle(STD_OUTPUT_HANDLE) {
                Ok(h) => h,
                Err(_) => return,
            };

            let mut mode = Default::default();
            if GetConsoleMode(handle, &mut mode).is_ok() {
                let _ = SetConsoleMode(
                    handle,
                    mode | ENABLE_PROCESSED_OUTPUT | ENABLE_VIRTUAL_TERMINAL_PROCESSING,
                );
            }
        }
    }
}

// ── Layout constants ─────────────────────────────────────────────────────

pub(crate) const W: usize = 76;
pub(crate) const INNER: usize = W - 4; // between "║ " and " ║"
pub(crate) const BAR: usize = W - 2;
pub(crate) const TITLE: &str = "Monitor Manager";
pub(crate) const SUBTITLE: &str = "DDC/CI input switcher";

/// How often the key loop checks for a finished refresh.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Keys for picking list entries. Skips `b`, `q` and `r`, which navigate.
const PICK_KEYS: &str = "123456789acdefghijklmnopstuvwxyz";

/// Favorites and shortcuts are picked by digit only.
const MAX_DIGIT_ITEMS: usize = 9;

// ── Types ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Page {
    Main,
    /// Pick a monitor, then one of its inputs.
    Switch { monitor: Option<usize> },
    Favorites,
    Shortcuts,
    Settings,
}

impl Page {
    /// Pages that act on the monitor list.
    pub(crate) fn needs_monitors(self) -> bool {
        matches!(self, Page::Switch { .. } | Page::Favorites | Page::Shortcuts)
    }
}

pub(crate) struct App {
    pub(crate) page: Page,
    pub(crate) monitors: Vec<MonitorRecord>,
    pub(crate) refreshing: bool,
    refresh_rx: Option<Receiver<Vec<MonitorRecord>>>,
    pub(crate) settings: Settings,
    pub(crate) favorites: Favorites,
    pub(crate) shortcuts: Shortcuts,
    pub(crate) startup_enabled: bool,
    /// Feedback line shown under the header until the next key.
    pub(crate) message: Option<(String, Color)>,
}

impl App {
    pub(crate) fn new(
        settings: Settings,
        favorites: Favorites,
        shortcuts: Shortcuts,
        startup_enabled: bool,
    ) -> Self {
        Self {
            page: Page::Main,
            monitors: Vec::new(),
            refreshing: false,
            refresh_rx: None,
            settings,
            favorites,
            shortcuts,
            startup_enabled,
            message: None,
        }
    }

    fn load() -> Self {
        Self::new(
            Settings::load(),
            Favorites::load(),
            Shortcuts::load(),
            startup::is_enabled(),
        )
    }

    /// Monitor-dependent actions are allowed.
    pub(crate) fn monitors_ready(&self) -> bool {
        !self.refreshing && !self.monitors.is_empty()
    }

    /// Enumerate on a worker thread. No-op while one is in flight.
    fn start_refresh(&mut self) {
        if self.refreshing {
            return;
        }
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(mm_monitor::enumerate_monitors());
        });
        self.refreshing = true;
        self.refresh_rx = Some(rx);
        info!("Monitor refresh started");
    }

    /// Pick up a finished refresh. Returns `true` when state changed.
    fn poll_refresh(&mut self) -> bool {
        let Some(rx) = &self.refresh_rx else {
            return false;
        };
        match rx.try_recv() {
            Ok(monitors) => {
                self.finish_refresh(monitors);
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                warn!("Monitor refresh worker exited without a result");
                self.finish_refresh(Vec::new());
                true
            }
        }
    }

    pub(crate) fn finish_refresh(&mut self, monitors: Vec<MonitorRecord>) {
        info!("Monitor refresh finished: {} monitor(s)", monitors.len());
        self.monitors = monitors;
        self.refreshing = false;
        self.refresh_rx = None;
        if self.monitors.is_empty() && self.page.needs_monitors() {
            self.page = Page::Main;
        }
        if let Page::Switch { monitor: Some(i) } = self.page {
            if i >= self.monitors.len() {
                self.page = Page::Switch { monitor: None };
            }
        }
    }

    /// Go to `page`, refusing monitor pages until monitors are listed.
    pub(crate) fn open(&mut self, page: Page) {
        if page.needs_monitors() && !self.monitors_ready() {
            let text = if self.refreshing {
                "Monitors are still being detected"
            } else {
                "No monitors found. Press R to detect again."
            };
            self.set_message(text, Color::Yellow);
            return;
        }
        self.page = page;
    }

    fn set_message(&mut self, text: impl Into<String>, color: Color) {
        self.message = Some((text.into(), color));
    }

    fn save_settings(&mut self) {
        match self.settings.save() {
            Ok(()) => self.set_message("Settings saved", Color::Green),
            Err(e) => self.set_message(format!("Could not save settings: {}", e), Color::Red),
        }
    }
}

/// Key for list entry `i`.
pub(crate) fn pick_key(i: usize) -> Option<char> {
    PICK_KEYS.chars().nth(i)
}

/// List entry selected by `ch`.
pub(crate) fn pick_index(ch: char) -> Option<usize> {
    PICK_KEYS.find(ch)
}

/// Digit `1`–`9` as a zero-based entry.
fn digit_index(ch: char) -> Option<usize> {
    match ch.to_digit(10) {
        Some(d) if d >= 1 => Some(d as usize - 1),
        _ => None,
    }
}

/// Cut `text` to `width` characters, marking the cut.
pub(crate) fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('\u{2026}');
    cut
}

// ── Entry point ──────────────────────────────────────────────────────────

pub fn run() -> Result<(), Box<dyn Error>> {
    let mut out = io::stdout();
    let mut app = App::load();
    app.start_refresh();

    loop {
        draw_page(&mut out, &app)?;
        out.flush()?;

        let ch = match wait_input(&mut app)? {
            Input::Refreshed => continue,
            Input::Key(c) => c,
        };
        app.message = None;

        if !handle_key(&mut out, &mut app, ch)? {
            break;
        }
    }

    info!("Interactive mode closed");
    draw_goodbye(&mut out)?;
    Ok(())
}

/// Apply one key press. Returns `false` to quit.
fn handle_key(out: &mut impl Write, app: &mut App, ch: char) -> io::Result<bool> {
    if ch == 'q' {
        return Ok(false);
    }

    match (app.page, ch) {
        // ── Main ───────────────────────────────────────────
        (Page::Main, '1') => app.open(Page::Switch { monitor: None }),
        (Page::Main, '2') => app.open(Page::Favorites),
        (Page::Main, '3') => app.open(Page::Shortcuts),
        (Page::Main, '4') => app.page = Page::Settings,
        (_, 'r') => {
            if app.refreshing {
                app.set_message("A refresh is already running", Color::Yellow);
            } else {
                app.start_refresh();
            }
        }
        // Indices on these pages come from the list being replaced.
        (page, c) if c != 'b' && page.needs_monitors() && !app.monitors_ready() => {
            app.set_message("Monitors are still being detected", Color::Yellow);
        }

        // ── Switch ─────────────────────────────────────────
        (Page::Switch { monitor: Some(_) }, 'b') => app.page = Page::Switch { monitor: None },
        (Page::Switch { monitor: None }, c) if c.is_ascii_digit() => {
            let i = c as usize - '0' as usize;
            if i < app.monitors.len() {
                app.page = Page::Switch { monitor: Some(i) };
            }
        }
        (Page::Switch { monitor: Some(m) }, c) => {
            let input = app
                .monitors
                .get(m)
                .zip(pick_index(c))
                .and_then(|(mon, i)| mon.available_inputs.get(i).cloned());
            if let Some(input) = input {
                let target = SwitchTarget::new(m, input);
                let banner = format!("Switching {}...", target);
                run_action(out, &banner, || action_switch(&target, &app.settings))?;
                app.page = Page::Main;
                app.start_refresh();
            }
        }

        // ── Favorites ──────────────────────────────────────
        (Page::Favorites, 'a') => run_action(out, "Add favorite", || {
            action_add_favorite(&mut app.favorites, &app.monitors)
        })?,
        (Page::Favorites, 'e') => run_action(out, "Edit favorite", || {
            action_edit_favorite(&mut app.favorites, &app.monitors)
        })?,
        (Page::Favorites, 'd') => run_action(out, "Delete favorite", || {
            action_delete_favorite(&mut app.favorites)
        })?,
        (Page::Favorites, c) if digit_index(c).is_some() => {
            let entry = digit_index(c).and_then(|i| {
                app.favorites
                    .iter()
                    .nth(i)
                    .map(|(n, t)| (n.clone(), t.clone()))
            });
            if let Some((name, target)) = entry {
                let banner = format!("Applying favorite '{}'...", name);
                run_action(out, &banner, || action_switch(&target, &app.settings))?;
                app.page = Page::Main;
                app.start_refresh();
            }
        }

        // ── Shortcuts ──────────────────────────────────────
        (Page::Shortcuts, 'a') => run_action(out, "Add shortcut", || {
            action_add_shortcut(&mut app.shortcuts, &app.monitors)
        })?,
        (Page::Shortcuts, 'd') => run_action(out, "Delete shortcut", || {
            action_delete_shortcut(&mut app.shortcuts)
        })?,

        // ── Settings ───────────────────────────────────────
        (Page::Settings, '1') => {
            app.settings.theme = app.settings.theme.next();
            app.save_settings();
        }
        (Page::Settings, '2') => {
            app.settings.tray_on = app.settings.tray_on.next();
            app.save_settings();
        }
        (Page::Settings, '3') => {
            app.settings.toast_enabled = !app.settings.toast_enabled;
            app.save_settings();
        }
        (Page::Settings, '4') => {
            app.settings.verbose = !app.settings.verbose;
            app.save_settings();
        }
        (Page::Settings, '5') => {
            let want = !app.startup_enabled;
            match startup::set_enabled(want) {
                Ok(()) => {
                    app.startup_enabled = want;
                    app.set_message("Startup entry updated", Color::Green);
                }
                Err(e) => app.set_message(e.to_string(), Color::Red),
            }
        }
        (Page::Settings, '6') => run_action(out, "Sending test notification...", || {
            action_test_toast(&app.settings)
        })?,

        (_, 'b') => app.page = Page::Main,
        _ => {}
    }
    Ok(true)
}

// ── Key reading ──────────────────────────────────────────────────────────

enum Input {
    Key(char),
    Refreshed,
}

/// Press events only; crossterm on Windows also reports Release and Repeat.
fn key_char(ev: &Event) -> Option<char> {
    match ev {
        Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            ..
        }) => Some('q'),
        Event::Key(KeyEvent {
            code: KeyCode::Char(c),
            kind: KeyEventKind::Press,
            ..
        }) => Some(c.to_ascii_lowercase()),
        Event::Key(KeyEvent {
            code: KeyCode::Esc,
            kind: KeyEventKind::Press,
            ..
        }) => Some('b'),
        _ => None,
    }
}

/// Wait for a key, waking early when a background refresh lands.
fn wait_input(app: &mut App) -> io::Result<Input> {
    terminal::enable_raw_mode()?;
    let result = loop {
        if app.poll_refresh() {
            break Ok(Input::Refreshed);
        }
        match event::poll(POLL_INTERVAL) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if let Some(c) = key_char(&ev) {
                        break Ok(Input::Key(c));
                    }
                }
                Err(e) => break Err(e),
            },
            Ok(false) => {}
            Err(e) => break Err(e),
        }
    };
    terminal::disable_raw_mode()?;
    result
}

fn read_key() -> io::Result<char> {
    terminal::enable_raw_mode()?;
    let ch = loop {
        if let Some(c) = key_char(&event::read()?) {
            break c;
        }
    };
    terminal::disable_raw_mode()?;
    Ok(ch)
}

/// Read one trimmed line in cooked mode.
fn prompt(label: &str) -> io::Result<String> {
    let mut out = io::stdout();
    queue!(out, SetForegroundColor(Color::White))?;
    write!(out, "  {}: ", label)?;
    queue!(out, ResetColor)?;
    out.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

// ============================================================================
// Drawing: pages
// ============================================================================

pub(crate) fn draw_page(out: &mut impl Write, app: &App) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
    draw_header(out, app)?;

    match app.page {
        Page::Main => draw_main(out, app)?,
        Page::Switch { monitor } => draw_switch(out, app, monitor)?,
        Page::Favorites => draw_favorites(out, app)?,
        Page::Shortcuts => draw_shortcuts(out, app)?,
        Page::Settings => draw_settings(out, app)?,
    }

    draw_empty(out)?;
    draw_bottom(out)?;
    writeln!(out)?;
    queue!(out, SetForegroundColor(Color::White))?;
    write!(out, "  Select option: ")?;
    queue!(out, ResetColor)?;
    Ok(())
}

fn draw_main(out: &mut impl Write, app: &App) -> io::Result<()> {
    draw_sep(out, " MAIN MENU ")?;
    draw_empty(out)?;

    draw_section(out, "MONITORS")?;
    if app.monitors.is_empty() {
        let text = if app.refreshing {
            "    Detecting monitors\u{2026}"
        } else {
            "    No monitors found"
        };
        draw_line(out, text, Color::DarkGrey)?;
    }
    for m in &app.monitors {
        draw_monitor(out, m)?;
    }
    draw_empty(out)?;

    draw_section(out, "FAVORITES")?;
    if app.favorites.is_empty() {
        draw_line(out, "    (none saved)", Color::DarkGrey)?;
    }
    for (name, target) in app.favorites.iter() {
        let line = format!("    {:<20}  {}", name, target);
        draw_line(out, &fit(&line, INNER), Color::White)?;
    }
    draw_empty(out)?;

    draw_section(out, "ACTIONS")?;
    let ready = app.monitors_ready();
    draw_gated(out, "1", "Switch Input", ready)?;
    draw_gated(out, "2", "Favorites (Apply, add, edit, delete)", ready)?;
    draw_gated(out, "3", "Shortcuts (Global hotkeys)", ready)?;
    draw_item(out, "4", "Settings")?;
    draw_gated(out, "R", "Refresh Monitors", !app.refreshing)?;
    draw_empty(out)?;
    draw_item_quit(out)
}

fn draw_monitor(out: &mut impl Write, m: &MonitorRecord) -> io::Result<()> {
    let name = fit(&m.display_name, 40);
    let line = format!("    [{}] {:<40}  {}", m.index, name, m.current_input);
    draw_line(out, &fit(&line, INNER), Color::White)
}

fn draw_switch(out: &mut impl Write, app: &App, monitor: Option<usize>) -> io::Result<()> {
    draw_sep(out, " SWITCH INPUT ")?;
    draw_empty(out)?;

    match monitor.and_then(|i| app.monitors.get(i)) {
        None => {
            draw_section(out, "SELECT MONITOR")?;
            for m in &app.monitors {
                let text = format!("{}  ({})", fit(&m.display_name, 44), m.current_input);
                draw_item(out, &m.index.to_string(), &text)?;
            }
            draw_empty(out)?;
            draw_item(out, "B", "Back to Main Menu")?;
        }
        Some(m) => {
            let title = format!("SELECT INPUT FOR {}", fit(&m.display_name, 40));
            draw_section(out, &title)?;
            for (i, input) in m.available_inputs.iter().enumerate() {
                let Some(key) = pick_key(i) else { break };
                if *input == m.current_input {
                    let text = format!("{} (current)", input);
                    draw_item_colored(out, &key.to_string(), &text, Color::Green)?;
                } else {
                    draw_item(out, &key.to_string(), input)?;
                }
            }
            draw_empty(out)?;
            draw_item(out, "B", "Back to Monitor List")?;
        }
    }
    draw_item_quit(out)
}

fn draw_favorites(out: &mut impl Write, app: &App) -> io::Result<()> {
    draw_sep(out, " FAVORITES ")?;
    draw_empty(out)?;

    draw_section(out, "APPLY")?;
    if app.favorites.is_empty() {
        draw_line(out, "    (none saved)", Color::DarkGrey)?;
    }
    for (i, (name, target)) in app.favorites.iter().enumerate() {
        let text = format!("{:<20}  {}", name, target);
        if i < MAX_DIGIT_ITEMS {
            draw_item(out, &(i + 1).to_string(), &text)?;
        } else {
            draw_line(out, &format!("        {}", text), Color::DarkGrey)?;
        }
    }
    draw_empty(out)?;

    draw_section(out, "MANAGE")?;
    draw_item(out, "A", "Add Favorite")?;
    draw_gated(out, "E", "Edit Favorite", !app.favorites.is_empty())?;
    draw_gated(out, "D", "Delete Favorite", !app.favorites.is_empty())?;
    draw_empty(out)?;
    draw_item(out, "B", "Back to Main Menu")?;
    draw_item_quit(out)
}

fn draw_shortcuts(out: &mut impl Write, app: &App) -> io::Result<()> {
    draw_sep(out, " SHORTCUTS ")?;
    draw_empty(out)?;

    draw_section(out, "CONFIGURED")?;
    if app.shortcuts.is_empty() {
        draw_line(out, "    (none configured)", Color::DarkGrey)?;
    }
    for (combo, target) in app.shortcuts.iter() {
        let line = format!("    {:<20}  {}", combo, target);
        draw_line(out, &fit(&line, INNER), Color::White)?;
    }
    let help = format!("    {:<20}  show the shortcut list", mm_hotkey::HELP_HOTKEY);
    draw_line(out, &help, Color::DarkGrey)?;
    draw_empty(out)?;
    draw_line(
        out,
        "  Shortcuts are active while `monitor-manager listen` runs",
        Color::DarkGrey,
    )?;
    draw_empty(out)?;

    draw_section(out, "MANAGE")?;
    draw_item(out, "A", "Add Shortcut")?;
    draw_gated(out, "D", "Delete Shortcut", !app.shortcuts.is_empty())?;
    draw_empty(out)?;
    draw_item(out, "B", "Back to Main Menu")?;
    draw_item_quit(out)
}

fn draw_settings(out: &mut impl Write, app: &App) -> io::Result<()> {
    let s = &app.settings;
    draw_sep(out, " SETTINGS ")?;
    draw_empty(out)?;

    draw_section(out, "APPEARANCE")?;
    draw_item(out, "1", &format!("Theme: {}", s.theme))?;
    draw_item(out, "2", &format!("Tray: {}", s.tray_on))?;
    draw_empty(out)?;

    draw_section(out, "BEHAVIOUR")?;
    draw_toggle(out, "3", "Toast Notifications (Switch results)", s.toast_enabled)?;
    draw_toggle(out, "4", "Verbose Logging (Detailed log file)", s.verbose)?;
    draw_toggle(out, "5", "Start with Windows (Shortcut listener)", app.startup_enabled)?;
    draw_empty(out)?;

    draw_section(out, "DIAGNOSTICS")?;
    draw_item(out, "6", "Test Toast Notification")?;
    draw_empty(out)?;

    draw_item(out, "B", "Back to Main Menu")?;
    draw_item_quit(out)
}

// ============================================================================
// Drawing: Header with status
// ============================================================================

pub(crate) fn draw_header(out: &mut impl Write, app: &App) -> io::Result<()> {
    draw_top(out, TITLE)?;

    let version_line = format!(
        "Version {}  \u{2502}  {}",
        env!("CARGO_PKG_VERSION"),
        SUBTITLE
    );
    draw_line_center(out, &version_line, Color::DarkGrey)?;

    draw_sep(out, "")?;
    draw_empty(out)?;

    let status_label = "\u{2500} CURRENT STATUS ";
    let status_dashes = INNER - 2 - status_label.chars().count();
    let status_top = format!(
        "\u{250C}{}{}\u{2510}",
        status_label,
        "\u{2500}".repeat(status_dashes)
    );
    draw_line(out, &status_top, Color::DarkCyan)?;

    let (monitor_text, monitor_color) = if app.refreshing {
        ("\u{25CC} Refreshing\u{2026}".to_string(), Color::Yellow)
    } else if app.monitors.is_empty() {
        ("\u{25CB} No monitors found".to_string(), Color::DarkGrey)
    } else {
        (
            format!("\u{25CF} {} monitor(s) detected", app.monitors.len()),
            Color::Green,
        )
    };
    draw_status(out, "Monitors: ", &monitor_text, monitor_color)?;

    let shortcut_text = format!("{} configured", app.shortcuts.len());
    draw_status(out, "Shortcuts:", &shortcut_text, Color::White)?;

    let (startup_text, startup_color) = if app.startup_enabled {
        ("\u{25CF} Starts with Windows", Color::Green)
    } else {
        ("\u{25CB} Manual", Color::DarkGrey)
    };
    draw_status(out, "Listener: ", startup_text, startup_color)?;

    let status_bottom = format!("\u{2514}{}\u{2518}", "\u{2500}".repeat(INNER - 2));
    draw_line(out, &status_bottom, Color::DarkCyan)?;

    if let Some((text, color)) = &app.message {
        draw_line(out, &fit(&format!("  {}", text), INNER), *color)?;
    } else {
        draw_empty(out)?;
    }
    Ok(())
}

// ============================================================================
// Drawing: Goodbye screen
// ============================================================================

pub(crate) fn draw_goodbye(out: &mut impl Write) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
    writeln!(out)?;
    draw_top(out, "")?;
    draw_empty(out)?;
    draw_line(out, "Thank you for using Monitor Manager!", Color::White)?;
    draw_empty(out)?;
    draw_bottom(out)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

// ============================================================================
// Box drawing primitives
// ============================================================================

fn draw_top(out: &mut impl Write, title: &str) -> io::Result<()> {
    queue!(out, SetForegroundColor(Color::Cyan))?;
    if title.is_empty() {
        writeln!(out, "\u{2554}{}\u{2557}", "\u{2550}".repeat(BAR))?;
    } else {
        let label = format!(" {} ", title);
        let pad = BAR.saturating_sub(label.chars().count());
        let left = pad / 2;
        let right = pad - left;
        writeln!(
            out,
            "\u{2554}{}{}{}\u{2557}",
            "\u{2550}".repeat(left),
            label,
            "\u{2550}".repeat(right)
        )?;
    }
    queue!(out, ResetColor)?;
    Ok(())
}

fn draw_bottom(out: &mut impl Write) -> io::Result<()> {
    queue!(out, SetForegroundColor(Color::Cyan))?;
    writeln!(out, "\u{255A}{}\u{255D}", "\u{2550}".repeat(BAR))?;
    queue!(out, ResetColor)?;
    Ok(())
}

fn draw_sep(out: &mut impl Write, title: &str) -> io::Result<()> {
    queue!(out, SetForegroundColor(Color::DarkCyan))?;
    let pad = BAR.saturating_sub(title.chars().count());
    let left = pad / 2;
    let right = pad - left;
    writeln!(
        out,
        "\u{255F}{}{}{}\u{2562}",
        "\u{2500}".repeat(left),
        title,
        "\u{2500}".repeat(right)
    )?;
    queue!(out, ResetColor)?;
    Ok(())
}

fn draw_line(out: &mut impl Write, text: &str, color: Color) -> io::Result<()> {
    queue!(out, SetForegroundColor(Color::Cyan))?;
    write!(out, "\u{2551} ")?;
    queue!(out, SetForegroundColor(color))?;
    write!(out, "{:<width$}", text, width = INNER)?;
    queue!(out, SetForegroundColor(Color::Cyan))?;
    writeln!(out, " \u{2551}")?;
    queue!(out, ResetColor)?;
    Ok(())
}

fn draw_line_center(out: &mut impl Write, text: &str, color: Color) -> io::Result<()> {
    queue!(out, SetForegroundColor(Color::Cyan))?;
    write!(out, "\u{2551} ")?;
    queue!(out, SetForegroundColor(color))?;
    write!(out, "{:^width$}", text, width = INNER)?;
    queue!(out, SetForegroundColor(Color::Cyan))?;
    writeln!(out, " \u{2551}")?;
    queue!(out, ResetColor)?;
    Ok(())
}

fn draw_empty(out: &mut impl Write) -> io::Result<()> {
    draw_line(out, "", Color::White)
}

fn draw_section(out: &mut impl Write, title: &str) -> io::Result<()> {
    draw_line(out, &format!("  {}", title), Color::Cyan)
}

fn draw_item(out: &mut impl Write, key: &str, text: &str) -> io::Result<()> {
    draw_item_colored(out, key, text, Color::White)
}

fn draw_item_colored(
    out: &mut impl Write,
    key: &str,
    text: &str,
    text_color: Color,
) -> io::Result<()> {
    let key_display = format!("[{}]", key);
    let prefix_len = 2 + key_display.len() + 1;
    let text_width = INNER.saturating_sub(prefix_len);

    queue!(out, SetForegroundColor(Color::Cyan))?;
    write!(out, "\u{2551}   ")?;
    queue!(out, SetForegroundColor(Color::Yellow))?;
    write!(out, "{}", key_display)?;
    queue!(out, SetForegroundColor(text_color))?;
    write!(out, " {:<width$}", fit(text, text_width), width = text_width)?;
    queue!(out, SetForegroundColor(Color::Cyan))?;
    writeln!(out, " \u{2551}")?;
    queue!(out, ResetColor)?;
    Ok(())
}

/// Item that greys out while `enabled` is false.
fn draw_gated(out: &mut impl Write, key: &str, text: &str, enabled: bool) -> io::Result<()> {
    if enabled {
        draw_item(out, key, text)
    } else {
        draw_item_colored(out, key, text, Color::DarkGrey)
    }
}

fn draw_item_quit(out: &mut impl Write) -> io::Result<()> {
    let key_display = "[Q]";
    let text_width = INNER.saturating_sub(2 + key_display.len() + 1);

    queue!(out, SetForegroundColor(Color::Cyan))?;
    write!(out, "\u{2551}   ")?;
    queue!(out, SetForegroundColor(Color::Red))?;
    write!(out, "{}", key_display)?;
    queue!(out, SetForegroundColor(Color::DarkGrey))?;
    write!(out, " {:<width$}", "Quit", width = text_width)?;
    queue!(out, SetForegroundColor(Color::Cyan))?;
    writeln!(out, " \u{2551}")?;
    queue!(out, ResetColor)?;
    Ok(())
}

fn draw_toggle(out: &mut impl Write, key: &str, text: &str, enabled: bool) -> io::Result<()> {
    let key_display = format!("[{}]", key);
    let toggle = if enabled { "[ON ]" } else { "[OFF]" };
    let toggle_color = if enabled {
        Color::Green
    } else {
        Color::DarkGrey
    };
    let prefix_len = 2 + key_display.len() + 1 + 5 + 1;
    let text_width = INNER.saturating_sub(prefix_len);

    queue!(out, SetForegroundColor(Color::Cyan))?;
    write!(out, "\u{2551}   ")?;
    queue!(out, SetForegroundColor(Color::Yellow))?;
    write!(out, "{} ", key_display)?;
    queue!(out, SetForegroundColor(toggle_color))?;
    write!(out, "{}", toggle)?;
    queue!(out, SetForegroundColor(Color::White))?;
    write!(out, " {:<width$}", text, width = text_width)?;
    queue!(out, SetForegroundColor(Color::Cyan))?;
    writeln!(out, " \u{2551}")?;
    queue!(out, ResetColor)?;
    Ok(())
}

fn draw_status(out: &mut impl Write, label: &str, value: &str, color: Color) -> io::Result<()> {
    let prefix = format!("  {} ", label);
    let value_width = INNER.saturating_sub(prefix.chars().count());

    queue!(out, SetForegroundColor(Color::Cyan))?;
    write!(out, "\u{2551} ")?;
    queue!(out, SetForegroundColor(Color::Grey))?;
    write!(out, "{}", prefix)?;
    queue!(out, SetForegroundColor(color))?;
    write!(out, "{:<width$}", value, width = value_width)?;
    queue!(out, SetForegroundColor(Color::Cyan))?;
    writeln!(out, " \u{2551}")?;
    queue!(out, ResetColor)?;
    Ok(())
}

// ============================================================================
// Colored log tags
// ============================================================================

/// `  [TAG] message` on stdout.
fn log_tag(tag: &str, color: Color, msg: &str) {
    let mut out = io::stdout();
    let _ = queue!(out, SetForegroundColor(color));
    let _ = write!(out, "  {}", tag);
    let _ = queue!(out, ResetColor);
    let _ = writeln!(out, " {}", msg);
    let _ = out.flush();
}

fn log_ok(msg: &str) {
    log_tag("[ OK ]", Color::Green, msg);
}
fn log_info(msg: &str) {
    log_tag("[INFO]", Color::Blue, msg);
}
fn log_warn(msg: &str) {
    log_tag("[WARN]", Color::Yellow, msg);
}
fn log_skip(msg: &str) {
    log_tag("[SKIP]", Color::DarkGrey, msg);
}

fn write_err(out: &mut impl Write, msg: &str) -> io::Result<()> {
    queue!(out, SetForegroundColor(Color::Red))?;
    write!(out, "  [ERR ]")?;
    queue!(out, ResetColor)?;
    writeln!(out, " {}", msg)?;
    Ok(())
}

// ============================================================================
// Action runner
// ============================================================================

fn run_action<F>(out: &mut impl Write, banner: &str, action: F) -> io::Result<()>
where
    F: FnOnce() -> Result<(), Box<dyn Error>>,
{
    queue!(out, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
    draw_top(out, " PROCESSING ")?;
    draw_empty(out)?;
    draw_line(out, banner, Color::Yellow)?;
    draw_empty(out)?;
    draw_bottom(out)?;
    writeln!(out)?;
    out.flush()?;

    if let Err(e) = action() {
        write_err(out, &e.to_string())?;
    }

    writeln!(out)?;
    queue!(out, SetForegroundColor(Color::DarkGrey))?;
    write!(out, "  Press any key to continue...")?;
    queue!(out, ResetColor)?;
    out.flush()?;
    let _ = read_key();
    Ok(())
}

// ============================================================================
// Actions
// ============================================================================

fn action_switch(target: &SwitchTarget, settings: &Settings) -> Result<(), Box<dyn Error>> {
    mm_hotkey::perform_switch(target, settings)?;
    log_ok(&format!("Switched {}", target));
    Ok(())
}

/// Ask for a monitor index and one of its inputs. `None` when cancelled.
fn prompt_target(monitors: &[MonitorRecord]) -> Result<Option<SwitchTarget>, Box<dyn Error>> {
    println!();
    for m in monitors {
        log_info(&format!(
            "[{}] {}: {}",
            m.index,
            m.display_name,
            m.available_inputs.join(", ")
        ));
    }
    println!();

    let index = prompt("Monitor index")?;
    if index.is_empty() {
        return Ok(None);
    }
    let index: usize = index
        .parse()
        .map_err(|_| format!("'{}' is not a monitor index", index))?;
    let monitor = monitors.get(index).ok_or_else(|| {
        format!(
            "Monitor index {} is out of range. Found {} monitors.",
            index,
            monitors.len()
        )
    })?;

    let input = prompt("Input (e.g. HDMI1)")?;
    if input.is_empty() {
        return Ok(None);
    }
    mm_monitor::resolve_input_code(&input)?;
    let input = input.to_ascii_uppercase();
    if !monitor.available_inputs.contains(&input) {
        log_warn(&format!("{} does not report {}", monitor.display_name, input));
    }
    Ok(Some(SwitchTarget::new(index, input)))
}

fn action_add_favorite(
    favorites: &mut Favorites,
    monitors: &[MonitorRecord],
) -> Result<(), Box<dyn Error>> {
    let name = prompt("Favorite name")?;
    if name.is_empty() {
        log_skip("Cancelled");
        return Ok(());
    }
    favorites.validate_name(&name, None)?;

    let Some(target) = prompt_target(monitors)? else {
        log_skip("Cancelled");
        return Ok(());
    };
    favorites.add(&name, target.clone())?;
    favorites.save()?;
    log_ok(&format!("Saved favorite '{}' ({})", name, target));
    Ok(())
}

fn action_edit_favorite(
    favorites: &mut Favorites,
    monitors: &[MonitorRecord],
) -> Result<(), Box<dyn Error>> {
    let old = prompt("Favorite to edit")?;
    if old.is_empty() {
        log_skip("Cancelled");
        return Ok(());
    }
    let (old, current) = favorites
        .get(&old)
        .map(|(n, t)| (n.clone(), t.clone()))
        .ok_or_else(|| format!("No favorite named '{}'", old))?;

    log_info(&format!("Current: {}", current));
    let new_name = prompt("New name (empty keeps it)")?;
    let new_name = if new_name.is_empty() { old.clone() } else { new_name };
    favorites.validate_name(&new_name, Some(&old))?;

    log_info("Leave the monitor index empty to keep the current target");
    let target = prompt_target(monitors)?.unwrap_or(current);
    favorites.rename(&old, &new_name, target.clone())?;
    favorites.save()?;
    log_ok(&format!("Updated favorite '{}' ({})", new_name, target));
    Ok(())
}

fn action_delete_favorite(favorites: &mut Favorites) -> Result<(), Box<dyn Error>> {
    let name = prompt("Favorite to delete")?;
    if name.is_empty() {
        log_skip("Cancelled");
        return Ok(());
    }
    let (removed, _) = favorites
        .remove(&name)
        .ok_or_else(|| format!("No favorite named '{}'", name))?;
    favorites.save()?;
    log_ok(&format!("Deleted favorite '{}'", removed));
    Ok(())
}

fn action_add_shortcut(
    shortcuts: &mut Shortcuts,
    monitors: &[MonitorRecord],
) -> Result<(), Box<dyn Error>> {
    let combo = prompt("Key combination (e.g. ctrl+shift+1)")?;
    if combo.is_empty() {
        log_skip("Cancelled");
        return Ok(());
    }
    let combo = mm_hotkey::canonicalize(&combo)?;
    if combo == mm_hotkey::HELP_HOTKEY {
        return Err(format!("{} is reserved for the shortcut list", combo).into());
    }

    let Some(target) = prompt_target(monitors)? else {
        log_skip("Cancelled");
        return Ok(());
    };
    if let Some(old) = shortcuts.insert(combo.clone(), target.clone()) {
        log_info(&format!("Replaced {} ({})", combo, old));
    }
    shortcuts.save()?;
    log_ok(&format!("{} → {}", combo, target));
    log_info("Restart the listener to pick up the change");
    Ok(())
}

fn action_delete_shortcut(shortcuts: &mut Shortcuts) -> Result<(), Box<dyn Error>> {
    let combo = prompt("Key combination to delete")?;
    if combo.is_empty() {
        log_skip("Cancelled");
        return Ok(());
    }
    let key = mm_hotkey::canonicalize(&combo).unwrap_or(combo);
    shortcuts
        .remove(&key)
        .ok_or_else(|| format!("No shortcut bound to '{}'", key))?;
    shortcuts.save()?;
    log_ok(&format!("Deleted shortcut {}", key));
    Ok(())
}

fn action_test_toast(settings: &Settings) -> Result<(), Box<dyn Error>> {
    if !settings.toast_enabled {
        log_warn("Toast notifications are disabled in settings; sending anyway");
    }
    mm_notify::show_switch_toast(
        true,
        mm_notify::TOAST_TITLE,
        "Toast notifications are working",
        true,
    );
    log_ok("Test notification sent");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
