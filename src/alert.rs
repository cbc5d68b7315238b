use objc2_app_kit::{NSAlert, NSAlertStyle};
use objc2_foundation::{MainThreadMarker, NSString};

/// Run a modal warning alert. Blocks the main run loop until dismissed.
pub fn show_warning(title: &str, message: &str, mtm: MainThreadMarker) {
    tracing::debug!(title, message, "showing alert");

    let alert = NSAlert::new(mtm);
    alert.setMessageText(&NSString::from_str(title));
    alert.setInformativeText(&NSString::from_str(message));
    alert.setAlertStyle(NSAlertStyle::Warning);
    alert.runModal();
}
