//! Toast notifications for input switches.
//!
//! On Windows the WinRT `ToastNotificationManager` API is called directly,
//! with no PowerShell or other helper process. Elsewhere a toast is only
//! logged.
//!
//! Functions take raw parameters (no settings dependency) so the crate can
//! be used on its own.

use log::info;
#[cfg(windows)]
use log::warn;

/// Title used for every switch notification.
pub const TOAST_TITLE: &str = "Monitor Manager";

/// Show a toast after a switch.
///
/// `enabled == false` returns immediately. Failures are only logged when
/// `verbose` is set; a missing toast never affects the switch itself.
pub fn show_switch_toast(enabled: bool, title: &str, body: &str, verbose: bool) {
    if !enabled {
        return;
    }

    #[cfg(windows)]
    match show_toast_native(title, body) {
        Ok(()) => info!("Toast notification shown"),
        Err(e) => {
            if verbose {
                warn!("Toast notification unavailable: {}", e);
            }
        }
    }

    #[cfg(not(windows))]
    {
        let _ = verbose;
        info!("Toast: {} | {}", title, body);
    }
}

/// Body text for a successful switch.
pub fn switched_body(monitor_index: usize, input_name: &str) -> String {
    format!("Monitor {} switched to {}", monitor_index, input_name)
}

/// Body text for a failed switch.
pub fn failed_body(monitor_index: usize, input_name: &str, reason: &str) -> String {
    format!(
        "Could not switch monitor {} to {}: {}",
        monitor_index, input_name, reason
    )
}

/// Toast XML for the `ToastGeneric` template.
#[cfg_attr(not(windows), allow(dead_code))]
fn toast_xml(title: &str, body: &str) -> String {
    format!(
        r#"<toast><visual><binding template="ToastGeneric"><text>{}</text><text>{}</text></binding></visual></toast>"#,
        escape_xml(title),
        escape_xml(body)
    )
}

/// Show a toast notification using the WinRT `ToastNotificationManager` API.
#[cfg(windows)]
fn show_toast_native(title: &str, body: &str) -> Result<(), Box<dyn std::error::Error>> {
    use windows::core::HSTRING;
    use windows::Data::Xml::Dom::XmlDocument;
    use windows::UI::Notifications::{ToastNotification, ToastNotificationManager};

    let xml = XmlDocument::new()?;
    xml.LoadXml(&HSTRING::from(toast_xml(title, body).as_str()))?;

    let toast = ToastNotification::CreateToastNotification(&xml)?;

    // PowerShell's registered AppUserModelID; shows toasts without
    // registering an application identity of our own.
    let app_id = HSTRING::from(
        r"{1AC14E77-02E7-4E5D-B744-2EB1AE5198B7}\WindowsPowerShell\v1.0\powershell.exe",
    );
    let notifier = ToastNotificationManager::CreateToastNotifierWithId(&app_id)?;
    notifier.Show(&toast)?;

    Ok(())
}

/// Escape XML special characters for safe inclusion in toast XML.
#[cfg_attr(not(windows), allow(dead_code))]
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
#[path = "tests/toast_tests.rs"]
mod tests;
