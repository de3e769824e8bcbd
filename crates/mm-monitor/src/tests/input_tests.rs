use super::*;

// ── resolve_input_code ───────────────────────────────────────────

#[test]
fn usb_c_is_27() {
    assert_eq!(resolve_input_code("USB-C"), Ok(27));
}

#[test]
fn thunderbolt_is_26() {
    assert_eq!(resolve_input_code("THUNDERBOLT"), Ok(26));
}

#[test]
fn raw_passthrough_parses_suffix() {
    assert_eq!(resolve_input_code("INPUT_42"), Ok(42));
    assert_eq!(resolve_input_code("INPUT_0"), Ok(0));
}

#[test]
fn standard_names_resolve() {
    assert_eq!(resolve_input_code("VGA1"), Ok(1));
    assert_eq!(resolve_input_code("DVI2"), Ok(4));
    assert_eq!(resolve_input_code("DP1"), Ok(15));
    assert_eq!(resolve_input_code("DP2"), Ok(16));
    assert_eq!(resolve_input_code("HDMI1"), Ok(17));
    assert_eq!(resolve_input_code("HDMI2"), Ok(18));
}

#[test]
fn names_are_case_and_whitespace_insensitive() {
    assert_eq!(resolve_input_code("hdmi1"), Ok(17));
    assert_eq!(resolve_input_code("  Dp2 "), Ok(16));
    assert_eq!(resolve_input_code("usb-c"), Ok(27));
    assert_eq!(resolve_input_code("input_7"), Ok(7));
}

#[test]
fn legacy_analog_names_resolve() {
    assert_eq!(resolve_input_code("ANALOG1"), Ok(1));
    assert_eq!(resolve_input_code("ANALOG2"), Ok(2));
}

#[test]
fn unknown_name_fails() {
    let err = resolve_input_code("HDMI9").unwrap_err();
    assert_eq!(err, UnknownInput("HDMI9".to_string()));
    assert!(err.to_string().contains("HDMI9"));
}

#[test]
fn empty_name_fails() {
    assert!(resolve_input_code("").is_err());
}

#[test]
fn malformed_passthrough_fails() {
    assert!(resolve_input_code("INPUT_").is_err());
    assert!(resolve_input_code("INPUT_x1").is_err());
    assert!(resolve_input_code("INPUT_+5").is_err());
    assert!(resolve_input_code("INPUT_99999999").is_err());
}

#[test]
fn no_input_is_not_switchable() {
    assert!(resolve_input_code("NO INPUT").is_err());
}

// ── resolve_code_name ────────────────────────────────────────────

#[test]
fn code_17_is_hdmi1() {
    assert_eq!(resolve_code_name(17), "HDMI1");
}

#[test]
fn code_0_is_no_input() {
    assert_eq!(resolve_code_name(0), "NO INPUT");
}

#[test]
fn special_codes_have_names() {
    assert_eq!(resolve_code_name(26), "THUNDERBOLT");
    assert_eq!(resolve_code_name(27), "USB-C");
}

#[test]
fn unknown_code_mentions_number() {
    let name = resolve_code_name(999);
    assert!(name.contains("999"));
    assert_eq!(name, "UNKNOWN CODE 999");
}

#[test]
fn every_code_up_to_u8_max_has_a_name() {
    for code in 0..=255 {
        assert!(!resolve_code_name(code).is_empty());
    }
}

// ── Round trip ───────────────────────────────────────────────────

#[test]
fn known_inputs_round_trip() {
    for (name, code) in known_inputs() {
        assert_eq!(resolve_input_code(name), Ok(code), "{}", name);
        assert_eq!(resolve_code_name(code), name);
    }
}

#[test]
fn fallback_inputs_are_all_resolvable() {
    for name in FALLBACK_INPUTS {
        let code = resolve_input_code(name).unwrap();
        assert_eq!(resolve_code_name(code), *name);
    }
}

#[test]
fn known_inputs_are_in_code_order() {
    let codes: Vec<InputCode> = known_inputs().iter().map(|(_, c)| *c).collect();
    let mut sorted = codes.clone();
    sorted.sort_unstable();
    assert_eq!(codes, sorted);
}

// ── capability_input_name ────────────────────────────────────────

#[test]
fn capability_names_for_standard_codes() {
    assert_eq!(capability_input_name(0x0F), "DP1");
    assert_eq!(capability_input_name(0x11), "HDMI1");
    assert_eq!(capability_input_name(0x12), "HDMI2");
}

#[test]
fn capability_names_for_usb_c_and_thunderbolt() {
    assert_eq!(capability_input_name(0x1B), "USB-C");
    assert_eq!(capability_input_name(0x1A), "THUNDERBOLT");
}

#[test]
fn capability_names_for_unrecognised_codes_are_passthrough() {
    assert_eq!(capability_input_name(0x13), "INPUT_19");
    assert_eq!(capability_input_name(0), "INPUT_0");
    assert_eq!(resolve_input_code(&capability_input_name(0x13)), Ok(19));
}

#[test]
fn unknown_input_display() {
    let err = UnknownInput("FOO".to_string());
    assert_eq!(err.to_string(), "Invalid input source: 'FOO'");
}
