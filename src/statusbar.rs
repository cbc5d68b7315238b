use std::ffi::CStr;

use objc2::rc::Retained;
use objc2::runtime::Sel;
use objc2_app_kit::{NSImage, NSMenu, NSMenuItem, NSSquareStatusItemLength, NSStatusBar, NSStatusItem};
use objc2_foundation::{MainThreadMarker, NSSize, NSString};

use crate::settings;

/// One row of the status bar menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Item {
        title: &'static str,
        action: &'static CStr,
        key: &'static str,
    },
    Separator,
}

/// Menu rows in display order. Actions route through the responder chain,
/// so `terminate:` reaches `NSApplication` and the rest reach the delegate.
pub const MENU_LAYOUT: [MenuEntry; 5] = [
    MenuEntry::Item {
        title: "About CamCheck",
        action: c"showAbout:",
        key: "",
    },
    MenuEntry::Separator,
    MenuEntry::Item {
        title: "Test Camera Light",
        action: c"testCameraLight:",
        key: "",
    },
    MenuEntry::Separator,
    MenuEntry::Item {
        title: "Quit",
        action: c"terminate:",
        key: "q",
    },
];

pub struct StatusBar {
    _status_item: Retained<NSStatusItem>,
}

impl StatusBar {
    pub fn new(mtm: MainThreadMarker) -> Self {
        let status_bar = NSStatusBar::systemStatusBar();
        let status_item = status_bar.statusItemWithLength(NSSquareStatusItemLength);

        match status_item.button(mtm) {
            Some(button) => match menu_bar_icon() {
                Some(icon) => button.setImage(Some(&icon)),
                None => {
                    tracing::warn!("no menu bar icon available, falling back to a title");
                    button.setTitle(&NSString::from_str("\u{1F4F7}")); // 📷
                }
            },
            None => tracing::error!("status item has no button, icon not set"),
        }

        let menu = NSMenu::new(mtm);
        for entry in MENU_LAYOUT {
            match entry {
                MenuEntry::Item { title, action, key } => {
                    let item = unsafe {
                        NSMenuItem::initWithTitle_action_keyEquivalent(
                            mtm.alloc(),
                            &NSString::from_str(title),
                            Some(Sel::register(action)),
                            &NSString::from_str(key),
                        )
                    };
                    menu.addItem(&item);
                }
                MenuEntry::Separator => menu.addItem(&NSMenuItem::separatorItem(mtm)),
            }
        }
        status_item.setMenu(Some(&menu));

        StatusBar {
            _status_item: status_item,
        }
    }
}

/// The bundled template icon, or the `star.fill` symbol when the asset is missing.
fn menu_bar_icon() -> Option<Retained<NSImage>> {
    if let Some(icon) = NSImage::imageNamed(&NSString::from_str(settings::MENU_BAR_ICON)) {
        tracing::debug!("loaded {} from assets", settings::MENU_BAR_ICON);
        let side = settings::MENU_BAR_ICON_SIZE;
        icon.setSize(NSSize::new(side, side));
        icon.setTemplate(true);
        return Some(icon);
    }

    tracing::warn!(
        "{} not found, using system symbol {}",
        settings::MENU_BAR_ICON,
        settings::FALLBACK_SYMBOL
    );
    NSImage::imageWithSystemSymbolName_accessibilityDescription(
        &NSString::from_str(settings::FALLBACK_SYMBOL),
        Some(&NSString::from_str(settings::APP_NAME)),
    )
}
