use super::*;

const DELL_U2720Q: &str = "(prot(monitor)type(LCD)model(U2720Q)cmds(01 02 03 07 0C E3 F3)\
vcp(02 04 05 08 10 12 14(01 04 05 06 08 09 0B 0C) 16 18 1A 52 60(0F 11 12 1B) \
AA(01 02 04) AC AE B2 B6 C6 C8 C9 D6(01 04 05) DC(00 03 05) DF E0 E1 E2(00 1D 02 04) \
F0(00 08) F1 F2 FD)mccs_ver(2.1))";

// ── Model ────────────────────────────────────────────────────────

#[test]
fn parses_model() {
    let caps = parse(DELL_U2720Q);
    assert_eq!(caps.model.as_deref(), Some("U2720Q"));
}

#[test]
fn parses_mccs_version() {
    let caps = parse(DELL_U2720Q);
    assert_eq!(caps.mccs_version.as_deref(), Some("2.1"));
}

#[test]
fn model_is_trimmed() {
    let caps = parse("(model(  LG ULTRAGEAR ) vcp(10))");
    assert_eq!(caps.model.as_deref(), Some("LG ULTRAGEAR"));
}

#[test]
fn empty_model_is_none() {
    let caps = parse("(model() vcp(10))");
    assert_eq!(caps.model, None);
}

#[test]
fn missing_model_is_none() {
    let caps = parse("(prot(monitor)vcp(10 60(0F)))");
    assert_eq!(caps.model, None);
}

// ── Inputs ───────────────────────────────────────────────────────

#[test]
fn parses_input_values() {
    let caps = parse(DELL_U2720Q);
    assert_eq!(caps.inputs, vec![0x0F, 0x11, 0x12, 0x1B]);
}

#[test]
fn inputs_without_spaces() {
    let caps = parse("(vcp(02 10 12 60(0F1112)))");
    assert_eq!(caps.inputs, vec![0x0F, 0x11, 0x12]);
}

#[test]
fn inputs_concatenated_codes() {
    let caps = parse("(vcp(02101260(0F 11)))");
    assert_eq!(caps.inputs, vec![0x0F, 0x11]);
}

#[test]
fn inputs_lowercase_hex() {
    let caps = parse("(vcp(60(0f 11 1b)))");
    assert_eq!(caps.inputs, vec![0x0F, 0x11, 0x1B]);
}

#[test]
fn inputs_single_digit_values() {
    let caps = parse("(vcp(60(1 3 F)))");
    assert_eq!(caps.inputs, vec![0x01, 0x03, 0x0F]);
}

#[test]
fn no_vcp_group_gives_no_inputs() {
    let caps = parse("(prot(monitor)type(LCD)model(X))");
    assert!(caps.inputs.is_empty());
}

#[test]
fn vcp_without_input_code_gives_no_inputs() {
    let caps = parse("(vcp(02 10 12 14(05 06)))");
    assert!(caps.inputs.is_empty());
}

#[test]
fn input_code_without_values_gives_no_inputs() {
    let caps = parse("(vcp(02 10 60 62))");
    assert!(caps.inputs.is_empty());
}

// ── Robustness ───────────────────────────────────────────────────

#[test]
fn missing_outer_parens() {
    let caps = parse("prot(monitor)model(VG27A)vcp(60(0F 11))");
    assert_eq!(caps.model.as_deref(), Some("VG27A"));
    assert_eq!(caps.inputs, vec![0x0F, 0x11]);
}

#[test]
fn unterminated_reply() {
    let caps = parse("(prot(monitor)model(VG27A)vcp(60(0F 11)");
    assert_eq!(caps.model.as_deref(), Some("VG27A"));
    assert_eq!(caps.inputs, vec![0x0F, 0x11]);
}

#[test]
fn trailing_nuls_are_ignored() {
    let caps = parse("(model(X)vcp(60(11)))\0\0\0");
    assert_eq!(caps.model.as_deref(), Some("X"));
    assert_eq!(caps.inputs, vec![0x11]);
}

#[test]
fn empty_string() {
    assert_eq!(parse(""), Capabilities::default());
}

#[test]
fn garbage_does_not_panic() {
    for junk in ["(((", ")))", "()()", "vcp(", "model(", "\u{FFFD}(x)", "60(ZZ)"] {
        let _ = parse(junk);
    }
}

#[test]
fn keys_are_case_insensitive() {
    let caps = parse("(MODEL(X)VCP(60(11)))");
    assert_eq!(caps.model.as_deref(), Some("X"));
    assert_eq!(caps.inputs, vec![0x11]);
}

// ── vcp_features ─────────────────────────────────────────────────

#[test]
fn vcp_features_pairs_codes_with_values() {
    let features = vcp_features("10 14(05 08) 60(0F 11) D6(01 04)");
    assert_eq!(
        features,
        vec![
            (0x10, vec![]),
            (0x14, vec![0x05, 0x08]),
            (0x60, vec![0x0F, 0x11]),
            (0xD6, vec![0x01, 0x04]),
        ]
    );
}
