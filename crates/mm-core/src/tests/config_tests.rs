use super::*;
use std::fs;
use tempfile::TempDir;

fn temp_file(name: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    (dir, path)
}

// ── Paths ────────────────────────────────────────────────────────

#[test]
fn config_dir_env_override_and_file_names() {
    let dir = TempDir::new().unwrap();
    std::env::set_var(CONFIG_DIR_ENV, dir.path());

    assert_eq!(config_dir(), dir.path());
    assert_eq!(settings_path(), dir.path().join("settings.json"));
    assert_eq!(shortcuts_path(), dir.path().join("custom_shortcuts.json"));
    assert_eq!(favorites_path(), dir.path().join("favorites.json"));
    assert_eq!(log_path(), dir.path().join("monitor_manager.log"));
    assert_eq!(Settings::default_path(), settings_path());

    std::env::remove_var(CONFIG_DIR_ENV);
    assert!(config_dir().ends_with("monitor_manager"));
}

// ── Settings defaults ────────────────────────────────────────────

#[test]
fn default_settings() {
    let s = Settings::default();
    assert_eq!(s.theme, Theme::System);
    assert_eq!(s.tray_on, TrayOn::None);
    assert!(s.toast_enabled);
    assert!(!s.verbose);
}

#[test]
fn settings_missing_file_gives_defaults() {
    let (_dir, path) = temp_file("settings.json");
    assert_eq!(Settings::load_from(&path), Settings::default());
}

#[test]
fn settings_malformed_file_gives_defaults() {
    let (_dir, path) = temp_file("settings.json");
    fs::write(&path, "{ this is not json").unwrap();
    assert_eq!(Settings::load_from(&path), Settings::default());
}

#[test]
fn settings_partial_file_fills_defaults() {
    let (_dir, path) = temp_file("settings.json");
    fs::write(&path, r#"{"theme": "dark"}"#).unwrap();
    let s = Settings::load_from(&path);
    assert_eq!(s.theme, Theme::Dark);
    assert_eq!(s.tray_on, TrayOn::None);
    assert!(s.toast_enabled);
}

#[test]
fn settings_reads_legacy_two_field_file() {
    let (_dir, path) = temp_file("settings.json");
    fs::write(&path, "{\n    \"theme\": \"light\",\n    \"tray_on\": \"both\"\n}").unwrap();
    let s = Settings::load_from(&path);
    assert_eq!(s.theme, Theme::Light);
    assert_eq!(s.tray_on, TrayOn::Both);
}

#[test]
fn settings_unknown_theme_gives_defaults() {
    let (_dir, path) = temp_file("settings.json");
    fs::write(&path, r#"{"theme": "solarized"}"#).unwrap();
    assert_eq!(Settings::load_from(&path), Settings::default());
}

#[test]
fn settings_save_and_reload() {
    let (_dir, path) = temp_file("settings.json");
    let s = Settings {
        theme: Theme::Dark,
        tray_on: TrayOn::Minimize,
        toast_enabled: false,
        verbose: true,
    };
    s.save_to(&path).unwrap();
    assert_eq!(Settings::load_from(&path), s);
}

#[test]
fn settings_written_with_lowercase_enums_and_four_space_indent() {
    let (_dir, path) = temp_file("settings.json");
    Settings::default().save_to(&path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\n    \"theme\": \"system\""));
    assert!(text.contains("\"tray_on\": \"none\""));
    assert!(text.ends_with('\n'));
}

#[test]
fn save_creates_missing_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("settings.json");
    Settings::default().save_to(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn theme_and_tray_cycle() {
    assert_eq!(Theme::System.next(), Theme::Dark);
    assert_eq!(Theme::Dark.next().next().next(), Theme::Dark);
    assert_eq!(TrayOn::Both.next(), TrayOn::None);
    assert_eq!(TrayOn::Close.to_string(), "close");
}

// ── SwitchTarget ─────────────────────────────────────────────────

#[test]
fn switch_target_is_a_two_element_array() {
    let json = serde_json::to_string(&SwitchTarget::new(1, "HDMI1")).unwrap();
    assert_eq!(json, r#"[1,"HDMI1"]"#);
}

#[test]
fn switch_target_reads_array() {
    let t: SwitchTarget = serde_json::from_str(r#"[0, "DP1"]"#).unwrap();
    assert_eq!(t, SwitchTarget::new(0, "DP1"));
}

#[test]
fn switch_target_rejects_negative_index() {
    assert!(serde_json::from_str::<SwitchTarget>(r#"[-1, "DP1"]"#).is_err());
}

// ── Shortcuts ────────────────────────────────────────────────────

#[test]
fn shortcuts_file_format() {
    let (_dir, path) = temp_file("custom_shortcuts.json");
    fs::write(
        &path,
        r#"{"ctrl+alt+1": [0, "HDMI1"], "ctrl+alt+2": [1, "DP1"]}"#,
    )
    .unwrap();
    let s = Shortcuts::load_from(&path);
    assert_eq!(s.len(), 2);
    assert_eq!(s.get("ctrl+alt+2"), Some(&SwitchTarget::new(1, "DP1")));
}

#[test]
fn shortcuts_insert_replaces() {
    let mut s = Shortcuts::default();
    assert!(s.insert("ctrl+1", SwitchTarget::new(0, "DP1")).is_none());
    let old = s.insert("ctrl+1", SwitchTarget::new(0, "HDMI2"));
    assert_eq!(old, Some(SwitchTarget::new(0, "DP1")));
    assert_eq!(s.len(), 1);
}

#[test]
fn shortcuts_save_and_reload() {
    let (_dir, path) = temp_file("custom_shortcuts.json");
    let mut s = Shortcuts::default();
    s.insert("ctrl+shift+1", SwitchTarget::new(0, "USB-C"));
    s.save_to(&path).unwrap();
    assert_eq!(Shortcuts::load_from(&path), s);
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"ctrl+shift+1\": ["));
}

#[test]
fn shortcuts_remove_missing() {
    let mut s = Shortcuts::default();
    assert!(s.remove("ctrl+9").is_none());
    assert!(s.is_empty());
}

// ── Favorites ────────────────────────────────────────────────────

fn favorites_with(names: &[&str]) -> Favorites {
    let mut f = Favorites::default();
    for (i, n) in names.iter().enumerate() {
        f.add(n, SwitchTarget::new(i, "HDMI1")).unwrap();
    }
    f
}

#[test]
fn favorite_name_valid() {
    let f = Favorites::default();
    assert_eq!(f.validate_name("Gaming PC", None), Ok(()));
}

#[test]
fn favorite_name_empty() {
    let f = Favorites::default();
    assert_eq!(f.validate_name("", None), Err(FavoriteNameError::Empty));
    assert_eq!(f.validate_name("   ", None), Err(FavoriteNameError::Empty));
}

#[test]
fn favorite_name_length_limit() {
    let f = Favorites::default();
    assert_eq!(f.validate_name(&"a".repeat(20), None), Ok(()));
    assert_eq!(
        f.validate_name(&"a".repeat(21), None),
        Err(FavoriteNameError::TooLong)
    );
}

#[test]
fn favorite_name_length_counts_characters() {
    let f = Favorites::default();
    assert_eq!(f.validate_name(&"é".repeat(20), None), Ok(()));
}

#[test]
fn favorite_name_forbidden_characters() {
    let f = Favorites::default();
    for c in ['\\', '/', '"', '\n', '\r', '\t'] {
        let name = format!("a{}b", c);
        assert_eq!(
            f.validate_name(&name, None),
            Err(FavoriteNameError::ForbiddenChar(c)),
            "char {:?}",
            c
        );
    }
}

#[test]
fn favorite_name_duplicate_case_insensitive() {
    let f = favorites_with(&["Work"]);
    assert_eq!(
        f.validate_name("WORK", None),
        Err(FavoriteNameError::Duplicate("Work".into()))
    );
}

#[test]
fn favorite_name_duplicate_allowed_for_excluded() {
    let f = favorites_with(&["Work", "Play"]);
    assert_eq!(f.validate_name("work", Some("Work")), Ok(()));
    assert!(f.validate_name("play", Some("Work")).is_err());
}

#[test]
fn favorite_error_messages() {
    assert_eq!(
        FavoriteNameError::Empty.to_string(),
        "Please enter a favorite name"
    );
    assert_eq!(
        FavoriteNameError::TooLong.to_string(),
        "Name must be 20 characters or less"
    );
    assert_eq!(
        FavoriteNameError::ForbiddenChar('/').to_string(),
        "Name cannot contain '/' character"
    );
    assert_eq!(
        FavoriteNameError::ForbiddenChar('\n').to_string(),
        "Name cannot contain '\\n' character"
    );
    assert_eq!(
        FavoriteNameError::Duplicate("Work".into()).to_string(),
        "A favorite named 'Work' already exists"
    );
}

#[test]
fn favorites_add_trims_name() {
    let mut f = Favorites::default();
    f.add("  Laptop  ", SwitchTarget::new(0, "USB-C")).unwrap();
    assert!(f.0.contains_key("Laptop"));
}

#[test]
fn favorites_lookup_and_remove_ignore_case() {
    let mut f = favorites_with(&["Console"]);
    assert_eq!(f.get("console").map(|(n, _)| n.as_str()), Some("Console"));
    let (name, target) = f.remove("CONSOLE").unwrap();
    assert_eq!(name, "Console");
    assert_eq!(target, SwitchTarget::new(0, "HDMI1"));
    assert!(f.is_empty());
}

#[test]
fn favorites_rename() {
    let mut f = favorites_with(&["Work"]);
    f.rename("Work", "Office", SwitchTarget::new(2, "DP2")).unwrap();
    assert!(f.get("Work").is_none());
    assert_eq!(f.get("office").map(|(_, t)| t.clone()), Some(SwitchTarget::new(2, "DP2")));
}

#[test]
fn favorites_rename_to_same_name_different_case() {
    let mut f = favorites_with(&["work"]);
    f.rename("work", "Work", SwitchTarget::new(0, "DP1")).unwrap();
    assert_eq!(f.len(), 1);
    assert!(f.0.contains_key("Work"));
}

#[test]
fn favorites_save_and_reload() {
    let (_dir, path) = temp_file("favorites.json");
    let f = favorites_with(&["Gaming", "Work"]);
    f.save_to(&path).unwrap();
    assert_eq!(Favorites::load_from(&path), f);
}

#[test]
fn favorites_malformed_entry_gives_defaults() {
    let (_dir, path) = temp_file("favorites.json");
    fs::write(&path, r#"{"Gaming": "HDMI1"}"#).unwrap();
    assert!(Favorites::load_from(&path).is_empty());
}

// ── to_pretty_json ───────────────────────────────────────────────

#[test]
fn pretty_json_uses_four_spaces() {
    let mut f = Favorites::default();
    f.add("A", SwitchTarget::new(0, "DP1")).unwrap();
    let text = to_pretty_json(&f).unwrap();
    assert_eq!(text, "{\n    \"A\": [\n        0,\n        \"DP1\"\n    ]\n}\n");
}
