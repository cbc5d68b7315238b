use std::time::Duration;

use objc2_core_foundation::CGFloat;

pub const APP_NAME: &str = "CamCheck";

/// How long the camera stays on during a light test.
pub const LIGHT_TEST_DURATION: Duration = Duration::from_secs(5);

pub const REPOSITORY_URL: &str = "https://github.com/ysalitrynskyi/cam-check";

/// Shown when the bundle carries no `CFBundleShortVersionString`.
pub const FALLBACK_VERSION: &str = "1.0";

pub const DESCRIPTION: &str = "CamCheck is a simple and privacy-focused utility to quickly test your Mac's camera indicator light, ensuring your camera is functioning correctly and is not active when it shouldn't be.";

pub const COPYRIGHT: &str = "Copyright \u{00A9} 2025 Yevhen Salitrynskyi (YS Progress Inc.)";

pub const ABOUT_WIDTH: CGFloat = 420.0;
pub const ABOUT_HEIGHT: CGFloat = 300.0;

pub const MENU_BAR_ICON: &str = "MenuBarIcon";
pub const MENU_BAR_ICON_SIZE: CGFloat = 18.0;
pub const FALLBACK_SYMBOL: &str = "star.fill";

/// Default `RUST_LOG` directive when the variable is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "camcheck=info";
