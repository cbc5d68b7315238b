use objc2::rc::Retained;
use objc2::runtime::{AnyObject, Sel};
use objc2::msg_send;
use objc2_app_kit::{
    NSApplication, NSBackingStoreType, NSButton, NSColor, NSFont, NSImage, NSImageView,
    NSTextAlignment, NSTextField, NSView, NSVisualEffectBlendingMode, NSVisualEffectMaterial,
    NSVisualEffectState, NSVisualEffectView, NSWindow, NSWindowStyleMask,
};
use objc2_core_foundation::{CGFloat, CGPoint, CGSize};
use objc2_foundation::{
    MainThreadMarker, NSAttributedString, NSBundle, NSDictionary, NSRect, NSString,
};

use crate::settings::{self, ABOUT_HEIGHT, ABOUT_WIDTH};

const VERSION_KEY: &str = "CFBundleShortVersionString";

/// The hand-built "About CamCheck" window. Created once and reused.
pub struct AboutWindow {
    window: Retained<NSWindow>,
}

impl AboutWindow {
    /// Build the window. `link_target` receives `openRepository:` when the
    /// GitHub link is clicked.
    pub fn new(link_target: &AnyObject, mtm: MainThreadMarker) -> Self {
        let content_rect = NSRect::new(CGPoint::ZERO, CGSize::new(ABOUT_WIDTH, ABOUT_HEIGHT));
        let style = NSWindowStyleMask::Titled
            | NSWindowStyleMask::Closable
            | NSWindowStyleMask::FullSizeContentView;
        let window = unsafe {
            NSWindow::initWithContentRect_styleMask_backing_defer(
                mtm.alloc(),
                content_rect,
                style,
                NSBackingStoreType::Buffered,
                false,
            )
        };
        window.center();
        window.setTitle(&NSString::from_str(""));
        window.setTitlebarAppearsTransparent(true);
        window.setMovableByWindowBackground(true);
        unsafe { window.setReleasedWhenClosed(false) };

        let background = NSVisualEffectView::new(mtm);
        background.setBlendingMode(NSVisualEffectBlendingMode::BehindWindow);
        background.setState(NSVisualEffectState::Active);
        background.setMaterial(NSVisualEffectMaterial::Sidebar);

        // Non-flipped layout, origin bottom-left.
        let icon_frame = rect(174.0, 190.0, 72.0, 72.0);
        let icon: Retained<NSImageView> =
            unsafe { msg_send![mtm.alloc::<NSImageView>(), initWithFrame: icon_frame] };
        icon.setImage(app_icon().as_deref());
        background.addSubview(&icon);

        let name = label(settings::APP_NAME, &NSFont::boldSystemFontOfSize(24.0), mtm);
        name.setFrame(rect(20.0, 155.0, 380.0, 30.0));
        background.addSubview(&name);

        let version = label(
            &format!("Version {}", bundle_version()),
            &NSFont::systemFontOfSize(12.0),
            mtm,
        );
        version.setTextColor(Some(&NSColor::secondaryLabelColor()));
        version.setFrame(rect(20.0, 135.0, 380.0, 20.0));
        background.addSubview(&version);

        let description =
            NSTextField::wrappingLabelWithString(&NSString::from_str(settings::DESCRIPTION), mtm);
        description.setFont(Some(&NSFont::systemFontOfSize(13.0)));
        description.setAlignment(NSTextAlignment::Center);
        description.setFrame(rect(40.0, 50.0, 340.0, 80.0));
        background.addSubview(&description);

        let link = link_button(link_target, rect(20.0, 35.0, 380.0, 20.0), mtm);
        background.addSubview(&link);

        let copyright = label(settings::COPYRIGHT, &NSFont::systemFontOfSize(10.0), mtm);
        copyright.setTextColor(Some(&NSColor::tertiaryLabelColor()));
        copyright.setFrame(rect(20.0, 15.0, 380.0, 20.0));
        background.addSubview(&copyright);

        let content: &NSView = &background;
        window.setContentView(Some(content));

        AboutWindow { window }
    }

    /// Bring the window to the front and activate the app so it is not hidden
    /// behind whatever window had focus.
    pub fn show(&self, mtm: MainThreadMarker) {
        self.window.makeKeyAndOrderFront(None);
        #[allow(deprecated)]
        NSApplication::sharedApplication(mtm).activateIgnoringOtherApps(true);
    }
}

fn rect(x: CGFloat, y: CGFloat, w: CGFloat, h: CGFloat) -> NSRect {
    NSRect::new(CGPoint::new(x, y), CGSize::new(w, h))
}

fn label(text: &str, font: &NSFont, mtm: MainThreadMarker) -> Retained<NSTextField> {
    let field = NSTextField::labelWithString(&NSString::from_str(text), mtm);
    field.setFont(Some(font));
    field.setAlignment(NSTextAlignment::Center);
    field
}

fn link_button(target: &AnyObject, frame: NSRect, mtm: MainThreadMarker) -> Retained<NSButton> {
    let button: Retained<NSButton> = unsafe { msg_send![mtm.alloc(), initWithFrame: frame] };
    unsafe {
        button.setAction(Some(Sel::register(c"openRepository:")));
        button.setTarget(Some(target));
        button.setToolTip(Some(&NSString::from_str(settings::REPOSITORY_URL)));
    }
    #[allow(deprecated)]
    button.setBezelStyle(objc2_app_kit::NSBezelStyle::Inline);
    button.setBordered(false);

    let font = NSFont::systemFontOfSize(12.0);
    let color = NSColor::linkColor();
    let font_key = NSString::from_str("NSFont");
    let color_key = NSString::from_str("NSColor");
    let font_ref: &AnyObject = &font;
    let color_ref: &AnyObject = &color;
    let attributes = NSDictionary::from_slices(&[&*font_key, &*color_key], &[font_ref, color_ref]);
    let title = unsafe {
        NSAttributedString::new_with_attributes(&NSString::from_str("View on GitHub"), &attributes)
    };
    button.setAttributedTitle(&title);
    button
}

fn app_icon() -> Option<Retained<NSImage>> {
    NSImage::imageNamed(&NSString::from_str("AppIcon"))
        .or_else(|| NSImage::imageNamed(&NSString::from_str("NSApplicationIcon")))
}

/// The bundle's short version string, as shown in the About window.
pub fn bundle_version() -> String {
    let raw = NSBundle::mainBundle()
        .objectForInfoDictionaryKey(&NSString::from_str(VERSION_KEY))
        .and_then(|value| value.downcast::<NSString>().ok())
        .map(|s| s.to_string());
    display_version(raw.as_deref())
}

fn display_version(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => settings::FALLBACK_VERSION.to_string(),
    }
}
