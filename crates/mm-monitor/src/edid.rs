//! Model text from a raw EDID block.

use std::ops::Range;

/// Bytes holding the first 18-byte descriptor, where most monitors put
/// their name.
pub const MODEL_TEXT_RANGE: Range<usize> = 54..72;

/// Printable ASCII from [`MODEL_TEXT_RANGE`], trimmed.
///
/// Returns `None` for blocks too short to reach the descriptor or when no
/// printable text remains.
pub fn model_from_edid(edid: &[u8]) -> Option<String> {
    if edid.len() <= MODEL_TEXT_RANGE.start {
        return None;
    }
    let end = edid.len().min(MODEL_TEXT_RANGE.end);

    let text: String = edid[MODEL_TEXT_RANGE.start..end]
        .iter()
        .filter(|b| (32..=126).contains(*b))
        .map(|&b| b as char)
        .collect();

    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 128-byte block with a monitor-name descriptor (tag 0xFC) at byte 54.
    fn edid_with_name(name: &str) -> Vec<u8> {
        let mut edid = vec![0u8; 128];
        edid[..8].copy_from_slice(&[0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00]);
        edid[54..59].copy_from_slice(&[0x00, 0x00, 0x00, 0xFC, 0x00]);
        let mut text = name.as_bytes().to_vec();
        text.push(0x0A);
        while text.len() < 13 {
            text.push(0x20);
        }
        edid[59..72].copy_from_slice(&text[..13]);
        edid
    }

    #[test]
    fn extracts_name_descriptor_text() {
        let edid = edid_with_name("DELL U2720Q");
        assert_eq!(model_from_edid(&edid).as_deref(), Some("DELL U2720Q"));
    }

    #[test]
    fn control_bytes_are_dropped() {
        let edid = edid_with_name("LG HDR 4K");
        let model = model_from_edid(&edid).unwrap();
        assert!(model.chars().all(|c| (' '..='~').contains(&c)));
    }

    #[test]
    fn empty_descriptor_is_none() {
        let edid = vec![0u8; 128];
        assert_eq!(model_from_edid(&edid), None);
    }

    #[test]
    fn whitespace_only_is_none() {
        let mut edid = vec![0u8; 128];
        for b in &mut edid[54..72] {
            *b = b' ';
        }
        assert_eq!(model_from_edid(&edid), None);
    }

    #[test]
    fn short_block_is_none() {
        assert_eq!(model_from_edid(&[]), None);
        assert_eq!(model_from_edid(&[0x41; 54]), None);
    }

    #[test]
    fn truncated_block_uses_available_bytes() {
        let mut edid = vec![0u8; 60];
        edid[54..60].copy_from_slice(b"VG27AQ");
        assert_eq!(model_from_edid(&edid).as_deref(), Some("VG27AQ"));
    }

    #[test]
    fn bytes_after_range_are_ignored() {
        let mut edid = vec![0u8; 128];
        edid[54..58].copy_from_slice(b"ABCD");
        edid[72..76].copy_from_slice(b"WXYZ");
        assert_eq!(model_from_edid(&edid).as_deref(), Some("ABCD"));
    }
}
