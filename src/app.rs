use std::cell::RefCell;

use objc2::rc::Retained;
use objc2::runtime::AnyObject;
use objc2::{define_class, msg_send, DefinedClass, MainThreadOnly};
use objc2_app_kit::{NSApplication, NSApplicationDelegate};
use objc2_foundation::{MainThreadMarker, NSNotification, NSObject, NSObjectProtocol};

use crate::about::AboutWindow;
use crate::camera::{AvFoundationBackend, CameraLightTester};
use crate::settings;
use crate::statusbar::StatusBar;

pub struct AppDelegateIvars {
    status_bar: RefCell<Option<StatusBar>>,
    about: RefCell<Option<AboutWindow>>,
    camera: CameraLightTester<AvFoundationBackend>,
}

define_class!(
    #[unsafe(super(NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "CamCheckAppDelegate"]
    #[ivars = AppDelegateIvars]
    pub struct AppDelegate;

    unsafe impl NSObjectProtocol for AppDelegate {}

    unsafe impl NSApplicationDelegate for AppDelegate {
        #[unsafe(method(applicationDidFinishLaunching:))]
        fn application_did_finish_launching(&self, _notification: &NSNotification) {
            let mtm = MainThreadMarker::from(self);

            // A menu-bar app owns no windows at launch.
            let app = NSApplication::sharedApplication(mtm);
            for window in app.windows().iter() {
                tracing::warn!("closing unexpected window at launch");
                window.close();
            }

            let status_bar = StatusBar::new(mtm);
            *self.ivars().status_bar.borrow_mut() = Some(status_bar);

            tracing::info!("{} started", settings::APP_NAME);
        }

        #[unsafe(method(applicationWillTerminate:))]
        fn application_will_terminate(&self, _notification: &NSNotification) {
            self.ivars().camera.shutdown();
        }
    }

    // --- Menu actions ---
    impl AppDelegate {
        #[unsafe(method(showAbout:))]
        fn show_about(&self, _sender: &AnyObject) {
            let mtm = MainThreadMarker::from(self);
            let target: &AnyObject = unsafe { &*(self as *const Self as *const AnyObject) };

            self.ivars()
                .about
                .borrow_mut()
                .get_or_insert_with(|| {
                    tracing::debug!("creating About window");
                    AboutWindow::new(target, mtm)
                })
                .show(mtm);
        }

        #[unsafe(method(testCameraLight:))]
        fn test_camera_light(&self, _sender: &AnyObject) {
            tracing::info!("Camera light test requested");
            self.ivars().camera.start();
        }

        #[unsafe(method(openRepository:))]
        fn open_repository(&self, _sender: &AnyObject) {
            if let Err(e) = crate::link::open_in_browser(settings::REPOSITORY_URL) {
                tracing::warn!("could not open repository link: {}", e);
            }
        }
    }
);

impl AppDelegate {
    pub fn new(mtm: MainThreadMarker) -> Retained<Self> {
        let this = mtm.alloc().set_ivars(AppDelegateIvars {
            status_bar: RefCell::new(None),
            about: RefCell::new(None),
            camera: CameraLightTester::new(),
        });
        unsafe { msg_send![super(this), init] }
    }
}
