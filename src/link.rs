use objc2_app_kit::NSWorkspace;
use objc2_foundation::{NSString, NSURL};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("not a valid URL: {0}")]
    InvalidUrl(String),
    #[error("no application could open {0}")]
    NotOpened(String),
}

/// Hand `url` to the user's default browser.
pub fn open_in_browser(url: &str) -> Result<(), LinkError> {
    let ns_url = NSURL::URLWithString(&NSString::from_str(url))
        .ok_or_else(|| LinkError::InvalidUrl(url.to_string()))?;

    if NSWorkspace::sharedWorkspace().openURL(&ns_url) {
        tracing::info!("opened {}", url);
        Ok(())
    } else {
        Err(LinkError::NotOpened(url.to_string()))
    }
}
