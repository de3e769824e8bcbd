//! MCCS capability string parsing.
//!
//! A DDC/CI capabilities reply looks like
//!
//! ```text
//! (prot(monitor)type(LCD)model(U2720Q)cmds(01 02 03 07 0C E3 F3)
//!  vcp(02 04 05 08 10 12 14(05 08 0B) 60(0F 11 12 1B) D6(01 04 05))mccs_ver(2.1))
//! ```
//!
//! Monitors are sloppy about it: the outer parentheses are sometimes
//! missing, hex bytes may run together without spaces (`60(0F1112)`), and
//! the reply can carry trailing NULs or junk. The parser below only cares
//! about the `model`, `mccs_ver` and `vcp` groups and tolerates the rest.

/// The parts of a capability string the resolver uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// `model(...)`, trimmed. `None` when absent or empty.
    pub model: Option<String>,
    /// `mccs_ver(...)`, trimmed.
    pub mccs_version: Option<String>,
    /// Values listed for VCP 0x60 (input select), in reported order.
    pub inputs: Vec<u8>,
}

/// Parse a raw capability string. Never fails; unknown parts are ignored.
pub fn parse(raw: &str) -> Capabilities {
    let text = raw.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    let body = strip_outer_parens(text);

    let mut caps = Capabilities::default();
    for (key, value) in top_level_groups(body) {
        match key.as_str() {
            "model" => {
                if caps.model.is_none() {
                    caps.model = non_empty(value);
                }
            }
            "mccs_ver" => {
                if caps.mccs_version.is_none() {
                    caps.mccs_version = non_empty(value);
                }
            }
            "vcp" => {
                if caps.inputs.is_empty() {
                    if let Some((_, values)) = vcp_features(value)
                        .into_iter()
                        .find(|(code, _)| *code == crate::input::VCP_INPUT_SOURCE)
                    {
                        caps.inputs = values;
                    }
                }
            }
            _ => {}
        }
    }
    caps
}

/// Split `vcp(...)` contents into `(code, values)` pairs.
///
/// Codes without a value list get an empty vector.
pub fn vcp_features(vcp: &str) -> Vec<(u8, Vec<u8>)> {
    let bytes = vcp.as_bytes();
    let mut features: Vec<(u8, Vec<u8>)> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'(' {
            let close = matching_paren(bytes, i).unwrap_or(bytes.len());
            let inner = &vcp[i + 1..close];
            if let Some(last) = features.last_mut() {
                last.1 = hex_values(inner);
            }
            i = close + 1;
            continue;
        }
        if i + 1 < bytes.len() && b.is_ascii_hexdigit() && bytes[i + 1].is_ascii_hexdigit() {
            if let Ok(code) = u8::from_str_radix(&vcp[i..i + 2], 16) {
                features.push((code, Vec::new()));
            }
            i += 2;
            continue;
        }
        i += 1;
    }

    features
}

/// Top-level `key(value)` groups in order. Keys are lowercased.
fn top_level_groups(body: &str) -> Vec<(String, &str)> {
    let bytes = body.as_bytes();
    let mut groups = Vec::new();
    let mut key_start: Option<usize> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'(' {
            let close = matching_paren(bytes, i).unwrap_or(bytes.len());
            if let Some(start) = key_start.take() {
                let key = body[start..i].to_ascii_lowercase();
                groups.push((key, &body[i + 1..close]));
            }
            i = close + 1;
            continue;
        }
        if b.is_ascii_alphanumeric() || b == b'_' {
            if key_start.is_none() {
                key_start = Some(i);
            }
        } else {
            key_start = None;
        }
        i += 1;
    }

    groups
}

/// Index of the `)` closing the `(` at `open`, if balanced.
fn matching_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, &b) in bytes[open..].iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn strip_outer_parens(text: &str) -> &str {
    if !text.starts_with('(') {
        return text;
    }
    match matching_paren(text.as_bytes(), 0) {
        Some(close) => &text[1..close],
        // Unterminated reply: drop the opening paren and keep the rest.
        None => &text[1..],
    }
}

/// Hex bytes in a value list. Accepts `0F 11 12`, `0F1112` and single digits.
fn hex_values(list: &str) -> Vec<u8> {
    let mut values = Vec::new();
    for token in list.split(|c: char| c.is_whitespace() || c == '(' || c == ')') {
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
            continue;
        }
        if token.len() == 1 {
            if let Ok(v) = u8::from_str_radix(token, 16) {
                values.push(v);
            }
            continue;
        }
        for pair in token.as_bytes().chunks_exact(2) {
            if let Ok(v) = u8::from_str_radix(std::str::from_utf8(pair).unwrap_or(""), 16) {
                values.push(v);
            }
        }
    }
    values
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
#[path = "tests/caps_tests.rs"]
mod tests;
