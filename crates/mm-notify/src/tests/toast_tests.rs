use super::*;

// ── Disabled toasts ──────────────────────────────────────────────

#[test]
fn disabled_toast_is_noop() {
    show_switch_toast(false, TOAST_TITLE, "Monitor 0 switched to HDMI1", false);
}

#[test]
fn disabled_toast_with_special_text_does_not_panic() {
    show_switch_toast(false, r#"Title "quoted" & <tagged>"#, "", true);
}

#[cfg(not(windows))]
#[test]
fn enabled_toast_elsewhere_only_logs() {
    show_switch_toast(true, TOAST_TITLE, "Monitor 1 switched to DP1", true);
}

// ── Body text ────────────────────────────────────────────────────

#[test]
fn switched_body_text() {
    assert_eq!(switched_body(1, "HDMI2"), "Monitor 1 switched to HDMI2");
}

#[test]
fn failed_body_includes_reason() {
    let body = failed_body(0, "DP1", "No monitors found");
    assert_eq!(body, "Could not switch monitor 0 to DP1: No monitors found");
}

// ── escape_xml ───────────────────────────────────────────────────

#[test]
fn escape_xml_plain_text_unchanged() {
    assert_eq!(escape_xml("Monitor 0 switched to USB-C"), "Monitor 0 switched to USB-C");
}

#[test]
fn escape_xml_escapes_every_special_char() {
    assert_eq!(
        escape_xml(r#"<a & "b" 'c'>"#),
        "&lt;a &amp; &quot;b&quot; &apos;c&apos;&gt;"
    );
}

#[test]
fn escape_xml_ampersand_first() {
    assert_eq!(escape_xml("&lt;"), "&amp;lt;");
}

// ── toast_xml ────────────────────────────────────────────────────

#[test]
fn toast_xml_embeds_escaped_text() {
    let xml = toast_xml("Monitor Manager", "A & B");
    assert!(xml.starts_with("<toast>"));
    assert!(xml.contains("<text>Monitor Manager</text><text>A &amp; B</text>"));
    assert!(xml.contains(r#"template="ToastGeneric""#));
}
