//! Monitor Manager: switch monitor inputs over DDC/CI.
//!
//! Lists external monitors with their current and available inputs,
//! switches a monitor to another input, and keeps favorites and global
//! keyboard shortcuts for one-step switching.
//!
//! Without arguments on a terminal it opens the interactive menu.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use log::{debug, info};
use mm_core::config::{self, Favorites, JsonFile, Settings, Shortcuts, SwitchTarget};
use mm_core::startup;
use mm_monitor::SwitchError;
use std::error::Error;
use std::fs::{File, OpenOptions};
use std::io::{IsTerminal, Write};

mod tui;

#[derive(Parser)]
#[command(
    name = "monitor-manager",
    version,
    about = "Switch monitor inputs over DDC/CI",
    long_about = "Switches external monitors between inputs (DisplayPort, HDMI, USB-C, ...)\n\
        by writing the MCCS input-select feature over DDC/CI.\n\n\
        Run without arguments for the interactive menu, or use --list and\n\
        --monitor/--input for one-shot use."
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Force non-interactive CLI mode (skip TUI)
    #[arg(long, global = true)]
    non_interactive: bool,

    /// List all monitors and their inputs
    #[arg(long, conflicts_with_all = ["monitor", "input"])]
    list: bool,

    /// Monitor index to control (as shown by --list)
    #[arg(long, requires = "input")]
    monitor: Option<usize>,

    /// Input source to switch to (e.g. HDMI1, DP1, USB-C)
    #[arg(long, requires = "monitor")]
    input: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List external monitors with current and available inputs
    List,

    /// Switch a monitor to another input
    Switch {
        /// Monitor index (as shown by `list`)
        #[arg(short, long)]
        monitor: usize,

        /// Input name (HDMI1, DP2, USB-C, INPUT_<code>, ...)
        #[arg(short, long)]
        input: String,
    },

    /// Show every input name that can be switched to
    Inputs,

    /// Manage saved favorites
    Favorite {
        #[command(subcommand)]
        action: Option<FavoriteAction>,
    },

    /// Manage global keyboard shortcuts
    Shortcut {
        #[command(subcommand)]
        action: Option<ShortcutAction>,
    },

    /// Register shortcuts and wait for hotkeys (Ctrl+C to stop)
    Listen,

    /// Show or reset settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Start the shortcut listener with Windows
    Startup {
        #[command(subcommand)]
        action: Option<StartupAction>,
    },
}

#[derive(Subcommand)]
enum FavoriteAction {
    /// List saved favorites
    List,
    /// Save a favorite
    Add {
        /// Favorite name (up to 20 characters)
        name: String,
        #[arg(short, long)]
        monitor: usize,
        #[arg(short, long)]
        input: String,
    },
    /// Delete a favorite
    Remove { name: String },
    /// Switch to a favorite's monitor and input
    Apply { name: String },
}

#[derive(Subcommand)]
enum ShortcutAction {
    /// List configured shortcuts
    List,
    /// Bind a key combination (e.g. ctrl+shift+1)
    Add {
        combo: String,
        #[arg(short, long)]
        monitor: usize,
        #[arg(short, long)]
        input: String,
    },
    /// Remove a key combination
    Remove { combo: String },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current settings
    Show,
    /// Print the config directory
    Path,
    /// Reset settings to defaults
    Reset,
}

#[derive(Subcommand)]
enum StartupAction {
    /// Show whether the listener starts at logon
    Status,
    /// Start the listener at logon
    Enable,
    /// Stop starting the listener at logon
    Disable,
}

impl Cli {
    /// `--list` and `--monitor/--input` stand alone. Exits with a usage
    /// error when combined with a subcommand.
    fn check_one_shot(&self) {
        let one_shot = self.list || self.monitor.is_some() || self.input.is_some();
        if one_shot && self.command.is_some() {
            Cli::command()
                .error(
                    ErrorKind::ArgumentConflict,
                    "--list and --monitor/--input cannot be used with a subcommand",
                )
                .exit();
        }
    }
}

fn main() {
    // UTF-8 before any output so the menu's box drawing renders.
    tui::enable_utf8_console();

    let cli = Cli::parse();
    cli.check_one_shot();
    if let Err(e) = run(cli) {
        eprintln!("[ERR ] {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let settings = Settings::load();
    let verbose = cli.verbose || settings.verbose;

    let one_shot = cli.list || cli.monitor.is_some();
    if cli.command.is_none() && !one_shot {
        if !cli.non_interactive && std::io::stdout().is_terminal() {
            init_file_logger(verbose);
            info!("Interactive mode started");
            return tui::run();
        }
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    if matches!(cli.command, Some(Commands::Listen)) {
        init_file_logger(verbose);
    } else {
        init_console_logger(verbose);
    }

    if cli.list {
        return cmd_list();
    }
    if let (Some(monitor), Some(input)) = (cli.monitor, cli.input.as_deref()) {
        return cmd_switch(monitor, input);
    }

    match cli.command {
        None => Ok(()),
        Some(Commands::List) => cmd_list(),
        Some(Commands::Switch { monitor, input }) => cmd_switch(monitor, &input),
        Some(Commands::Inputs) => cmd_inputs(),
        Some(Commands::Favorite { action }) => cmd_favorite(action, &settings),
        Some(Commands::Shortcut { action }) => cmd_shortcut(action),
        Some(Commands::Listen) => cmd_listen(&settings),
        Some(Commands::Config { action }) => cmd_config(action),
        Some(Commands::Startup { action }) => cmd_startup(action),
    }
}

// ============================================================================
// Logging
// ============================================================================

/// One-shot commands: plain stderr, warnings only unless verbose.
fn init_console_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .format_timestamp(None)
        .init();
}

/// Interactive and listener modes: timestamped lines in the config
/// directory's log file, so the terminal stays clean.
fn init_file_logger(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.level(),
                record.args()
            )
        });
    match open_log_file() {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(e) => eprintln!("[WARN] Could not open log file: {}", e),
    }
    builder.init();
}

fn open_log_file() -> Result<File, Box<dyn Error>> {
    let dir = config::ensure_config_dir()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(config::LOG_FILE))?;
    Ok(file)
}

// ============================================================================
// Monitors
// ============================================================================

fn cmd_list() -> Result<(), Box<dyn Error>> {
    let monitors = mm_monitor::enumerate_monitors();
    if monitors.is_empty() {
        println!("No monitors found");
        return Ok(());
    }

    println!("\nAvailable Monitors:");
    println!("{}", "-".repeat(50));
    for m in &monitors {
        println!("Monitor {}: {}", m.index, m.display_name);
        println!("Current Input: {}", m.current_input);
        println!("Available Inputs: {}", m.available_inputs.join(", "));
        println!("{}", "-".repeat(50));
    }
    Ok(())
}

fn cmd_switch(monitor: usize, input: &str) -> Result<(), Box<dyn Error>> {
    match mm_monitor::switch_input(monitor, input) {
        Ok(code) => {
            debug!("Wrote input code {} to monitor {}", code, monitor);
            println!(
                "[OK] Successfully switched monitor {} to {}",
                monitor,
                input.trim().to_ascii_uppercase()
            );
            Ok(())
        }
        Err(SwitchError::UnknownInput(e)) => {
            Err(format!("{}\n       Available inputs: {}", e, input_names()).into())
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_inputs() -> Result<(), Box<dyn Error>> {
    println!("── Input Sources ──");
    for (name, code) in mm_monitor::input::known_inputs() {
        println!("  {:<12} = {}", name, code);
    }
    println!(
        "\n  {}<code> passes any other code through unchanged.",
        mm_monitor::input::RAW_INPUT_PREFIX
    );
    Ok(())
}

fn input_names() -> String {
    mm_monitor::input::known_inputs()
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Canonical spelling of an input name, or the resolver's error.
fn checked_input(input: &str) -> Result<String, Box<dyn Error>> {
    mm_monitor::resolve_input_code(input)?;
    Ok(input.trim().to_ascii_uppercase())
}

// ============================================================================
// Favorites
// ============================================================================

fn cmd_favorite(action: Option<FavoriteAction>, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let mut favorites = Favorites::load();
    match action {
        None | Some(FavoriteAction::List) => {
            if favorites.is_empty() {
                println!("[INFO] No favorites saved");
                return Ok(());
            }
            println!("── Favorites ──");
            for (name, target) in favorites.iter() {
                println!("  {:<20}  {}", name, target);
            }
        }
        Some(FavoriteAction::Add {
            name,
            monitor,
            input,
        }) => {
            let target = SwitchTarget::new(monitor, checked_input(&input)?);
            favorites.add(&name, target.clone())?;
            favorites.save()?;
            println!("[OK] Saved favorite '{}' ({})", name.trim(), target);
        }
        Some(FavoriteAction::Remove { name }) => match favorites.remove(&name) {
            Some((removed, _)) => {
                favorites.save()?;
                println!("[OK] Removed favorite '{}'", removed);
            }
            None => return Err(format!("No favorite named '{}'", name).into()),
        },
        Some(FavoriteAction::Apply { name }) => {
            let (name, target) = favorites
                .get(&name)
                .map(|(n, t)| (n.clone(), t.clone()))
                .ok_or_else(|| format!("No favorite named '{}'", name))?;
            mm_hotkey::perform_switch(&target, settings)?;
            println!("[OK] Applied favorite '{}' ({})", name, target);
        }
    }
    Ok(())
}

// ============================================================================
// Shortcuts
// ============================================================================

fn cmd_shortcut(action: Option<ShortcutAction>) -> Result<(), Box<dyn Error>> {
    let mut shortcuts = Shortcuts::load();
    match action {
        None | Some(ShortcutAction::List) => {
            println!("── Shortcuts ──");
            if shortcuts.is_empty() {
                println!("  (none configured)");
            }
            for (combo, target) in shortcuts.iter() {
                println!("  {:<20}  {}", combo, target);
            }
            println!("  {:<20}  show the shortcut list", mm_hotkey::HELP_HOTKEY);
        }
        Some(ShortcutAction::Add {
            combo,
            monitor,
            input,
        }) => {
            let combo = mm_hotkey::canonicalize(&combo)?;
            if combo == mm_hotkey::HELP_HOTKEY {
                return Err(format!("{} is reserved for the shortcut list", combo).into());
            }
            let target = SwitchTarget::new(monitor, checked_input(&input)?);
            if let Some(old) = shortcuts.insert(combo.clone(), target.clone()) {
                println!("[INFO] Replacing {} ({})", combo, old);
            }
            shortcuts.save()?;
            println!("[OK] {} → {}", combo, target);
            println!("[INFO] Restart `monitor-manager listen` to pick up the change");
        }
        Some(ShortcutAction::Remove { combo }) => {
            let key = mm_hotkey::canonicalize(&combo).unwrap_or(combo);
            match shortcuts.remove(&key) {
                Some(_) => {
                    shortcuts.save()?;
                    println!("[OK] Removed shortcut {}", key);
                }
                None => return Err(format!("No shortcut bound to '{}'", key).into()),
            }
        }
    }
    Ok(())
}

fn cmd_listen(settings: &Settings) -> Result<(), Box<dyn Error>> {
    let shortcuts = Shortcuts::load();
    info!(
        "Listener starting with {} shortcut(s) from {}",
        shortcuts.len(),
        config::shortcuts_path().display()
    );
    mm_hotkey::listen(&shortcuts, settings)?;
    println!("[DONE] Listener stopped");
    Ok(())
}

// ============================================================================
// Config and startup
// ============================================================================

fn cmd_config(action: Option<ConfigAction>) -> Result<(), Box<dyn Error>> {
    match action {
        None | Some(ConfigAction::Show) => {
            let s = Settings::load();
            println!("Config directory: {}\n", config::config_dir().display());
            println!("── Appearance ──");
            println!("  theme          = \"{}\"", s.theme);
            println!("  tray_on        = \"{}\"", s.tray_on);
            println!("\n── Notifications ──");
            println!("  toast_enabled  = {}", s.toast_enabled);
            println!("\n── Debug ──");
            println!("  verbose        = {}", s.verbose);
            println!("\n── Files ──");
            println!("  settings       = {}", config::settings_path().display());
            println!(
                "  shortcuts      = {} ({} configured)",
                config::shortcuts_path().display(),
                Shortcuts::load().len()
            );
            println!(
                "  favorites      = {} ({} saved)",
                config::favorites_path().display(),
                Favorites::load().len()
            );
            println!("  log            = {}", config::log_path().display());
        }
        Some(ConfigAction::Path) => {
            println!("{}", config::config_dir().display());
        }
        Some(ConfigAction::Reset) => {
            Settings::default().save()?;
            println!(
                "[OK] Settings reset to defaults at {}",
                config::settings_path().display()
            );
        }
    }
    Ok(())
}

fn cmd_startup(action: Option<StartupAction>) -> Result<(), Box<dyn Error>> {
    match action {
        None | Some(StartupAction::Status) => {
            let state = if startup::is_enabled() {
                "enabled"
            } else {
                "disabled"
            };
            println!("[INFO] Start with Windows: {}", state);
        }
        Some(StartupAction::Enable) => {
            startup::enable()?;
            println!("[OK] Shortcut listener will start at logon");
        }
        Some(StartupAction::Disable) => {
            startup::disable()?;
            println!("[OK] Startup entry removed");
        }
    }
    Ok(())
}
