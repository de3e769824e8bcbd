//! Brand heuristics: PnP manufacturer codes, model-prefix guesses, and
//! internal laptop panel detection.
//!
//! The prefix table is approximate by nature. Several prefixes are shared
//! between vendors, so the table is an ordered list evaluated top to
//! bottom and the first match wins. Reordering entries changes results.

use crate::UNKNOWN;

/// Three-letter PnP/EDID manufacturer codes.
pub const PNP_MANUFACTURERS: &[(&str, &str)] = &[
    ("AAC", "Acer"),
    ("ACR", "Acer"),
    ("AOC", "AOC"),
    ("AUO", "AU Optronics"),
    ("BNQ", "BenQ"),
    ("CMO", "Chi Mei"),
    ("DEL", "Dell"),
    ("GGL", "Google"),
    ("GIG", "Gigabyte"),
    ("HEI", "Hisense"),
    ("HPN", "HP"),
    ("HSD", "Hisense"),
    ("HWP", "HP"),
    ("IVM", "Iiyama"),
    ("LGD", "LG Display"),
    ("LPL", "LG Philips"),
    ("MSI", "MSI"),
    ("NEC", "NEC"),
    ("RAZ", "Razer"),
    ("SAM", "Samsung"),
    ("SEC", "Samsung"),
    ("SNY", "Sony"),
    ("TCL", "TCL"),
    ("TOS", "Toshiba"),
    ("TPV", "TPV"),
    ("VSC", "ViewSonic"),
];

/// Model prefix → brand, in evaluation order.
pub const MODEL_PREFIXES: &[(&str, &str)] = &[
    // ASUS
    ("PA", "ASUS"),
    ("PG", "ASUS"),
    ("VG", "ASUS"),
    ("MG", "ASUS"),
    ("ROG", "ASUS"),
    ("TUF", "ASUS"),
    ("BE", "ASUS"),
    // Dell / Alienware
    ("AW", "Alienware"),
    ("U24", "Dell"),
    ("U27", "Dell"),
    ("U34", "Dell"),
    ("P24", "Dell"),
    ("P27", "Dell"),
    ("S24", "Dell"),
    ("S27", "Dell"),
    ("E24", "Dell"),
    ("E27", "Dell"),
    // LG
    ("LG", "LG"),
    ("MP", "LG"),
    ("GP", "LG"),
    ("OLED", "LG"),
    ("GL", "LG"),
    ("GN", "LG"),
    ("UK", "LG"),
    ("UM", "LG"),
    // Samsung
    ("C24G", "Samsung"),
    ("C27G", "Samsung"),
    ("C32G", "Samsung"),
    ("ODYSSEY", "Samsung"),
    ("LS", "Samsung"),
    ("F24", "Samsung"),
    ("F27", "Samsung"),
    // AOC
    ("27G", "AOC"),
    ("24G", "AOC"),
    ("22", "AOC"),
    ("Q27", "AOC"),
    ("CQ", "AOC"),
    ("C24", "AOC"),
    ("C27", "AOC"),
    ("C32", "AOC"),
    ("AG", "AOC"),
    ("AGON", "AOC"),
    // ViewSonic
    ("VX", "ViewSonic"),
    ("VA", "ViewSonic"),
    // Never matched: ASUS claims "VG" first, so VG27AQ and VG279Q are ASUS.
    ("VG", "ViewSonic"),
    // BenQ
    ("XL", "BenQ"),
    ("EX", "BenQ"),
    ("PD", "BenQ"),
    ("EW", "BenQ"),
    ("ZOWIE", "BenQ"),
    ("GW", "BenQ"),
    // Acer
    ("XV", "Acer"),
    ("XF", "Acer"),
    ("KG", "Acer"),
    ("CB", "Acer"),
    ("XB", "Acer"),
    ("NITRO", "Acer"),
    ("PREDATOR", "Acer"),
    // MSI
    ("MAG", "MSI"),
    ("MPG", "MSI"),
    ("OPTIX", "MSI"),
    ("MEG", "MSI"),
    // Gigabyte
    ("FI", "Gigabyte"),
    ("M27", "Gigabyte"),
    ("M32", "Gigabyte"),
    ("G27F", "Gigabyte"),
    ("AORUS", "Gigabyte"),
    // HP
    ("OMEN", "HP"),
    ("X27", "HP"),
    ("Z27", "HP"),
    ("PAVILION", "HP"),
    // Philips
    ("BDM", "Philips"),
    ("PHL", "Philips"),
    ("PHI", "Philips"),
];

/// Substrings of a device ID that mark an embedded laptop panel.
pub const INTERNAL_PANEL_CODES: &[&str] = &["SHP", "BOE", "LGD", "AUO", "SEC", "EDP"];

/// Whether `device_id` belongs to an internal laptop panel.
pub fn is_internal_panel(device_id: &str) -> bool {
    let upper = device_id.to_ascii_uppercase();
    INTERNAL_PANEL_CODES.iter().any(|code| upper.contains(code))
}

/// Extract the manufacturer code from a PnP device ID.
///
/// `DISPLAY\DEL40F6\5&1a2b3c&0&UID4352` → `DEL`.
pub fn manufacturer_code(device_id: &str) -> Option<String> {
    let hardware = device_id.split('\\').nth(1)?;
    let code: String = hardware.chars().take(3).collect();
    if code.chars().count() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(code.to_ascii_uppercase())
    } else {
        None
    }
}

/// Brand for a manufacturer code.
pub fn brand_from_pnp(code: &str) -> Option<&'static str> {
    let code = code.to_ascii_uppercase();
    PNP_MANUFACTURERS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, brand)| *brand)
}

/// First brand in [`MODEL_PREFIXES`] whose prefix starts `model`.
pub fn brand_from_model(model: &str) -> Option<&'static str> {
    let upper = model.trim().to_ascii_uppercase();
    MODEL_PREFIXES
        .iter()
        .find(|(prefix, _)| upper.starts_with(prefix))
        .map(|(_, brand)| *brand)
}

/// Best-effort brand: PnP code first, then model prefix, then `"Unknown"`.
pub fn resolve_brand(device_id: Option<&str>, model: &str) -> String {
    if let Some(brand) = device_id
        .and_then(manufacturer_code)
        .and_then(|code| brand_from_pnp(&code))
    {
        return brand.to_string();
    }

    if model != UNKNOWN {
        if let Some(brand) = brand_from_model(model) {
            return brand.to_string();
        }
    }

    UNKNOWN.to_string()
}

#[cfg(test)]
#[path = "tests/brand_tests.rs"]
mod tests;
