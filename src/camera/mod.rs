//! "Test Camera Light": switch the default camera on, then off again after
//! [`LIGHT_TEST_DURATION`](crate::settings::LIGHT_TEST_DURATION).
//!
//! The device is opened on a background dispatch queue so the menu never
//! blocks. Alerts and the delayed stop run on the main thread.

mod avfoundation;
mod error;
mod session;

use std::ptr::NonNull;
use std::sync::Arc;
use std::time::Duration;

use block2::RcBlock;
use dispatch2::{DispatchQoS, DispatchQueue, GlobalQueueIdentifier};
use objc2_foundation::{MainThreadMarker, NSRunLoop, NSRunLoopCommonModes, NSRunLoopMode, NSTimer};

pub use avfoundation::AvFoundationBackend;
pub use error::CameraError;
pub use session::{CaptureSession, LightTest};

use crate::settings;

/// Something that can switch the default camera on.
pub trait CaptureBackend: Send + Sync + 'static {
    type Session: CaptureSession + 'static;

    /// Open the default camera and start a running session. Blocks.
    fn start_default_camera(&self) -> Result<Self::Session, CameraError>;
}

/// What happened to one attempt to switch the camera on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// The session is running and its stop must be scheduled.
    Running,
    /// The session came up after the test was abandoned and was stopped again.
    Abandoned,
    /// The camera could not be started. Carries the alert text, if any.
    Failed(Option<&'static str>),
}

pub struct CameraLightTester<B: CaptureBackend> {
    backend: Arc<B>,
    test: Arc<LightTest<B::Session>>,
}

impl CameraLightTester<AvFoundationBackend> {
    pub fn new() -> Self {
        Self::with_backend(AvFoundationBackend)
    }
}

impl<B: CaptureBackend> CameraLightTester<B> {
    pub fn with_backend(backend: B) -> Self {
        CameraLightTester {
            backend: Arc::new(backend),
            test: Arc::new(LightTest::new()),
        }
    }

    /// Start a light test unless one is already in flight.
    pub fn start(&self) {
        let Some(generation) = self.test.try_begin() else {
            tracing::info!("Camera: light test already running, ignoring request");
            return;
        };

        let backend = Arc::clone(&self.backend);
        let test = Arc::clone(&self.test);
        let queue = DispatchQueue::global_queue(GlobalQueueIdentifier::QualityOfService(
            DispatchQoS::UserInitiated,
        ));
        queue.exec_async(move || {
            let outcome = attempt(&*backend, &test, generation);
            match outcome {
                Outcome::Running => {
                    DispatchQueue::main().exec_async(move || schedule_stop(test, generation));
                }
                Outcome::Failed(Some(message)) => report_failure(message),
                Outcome::Abandoned | Outcome::Failed(None) => {}
            }
        });
    }

    /// Stop any running test. Called on application termination.
    pub fn shutdown(&self) {
        if self.test.is_active() {
            tracing::info!("Camera: stopping light test on shutdown");
        }
        self.test.shutdown();
    }
}

/// Open the camera for test `generation` and record the result. Blocks.
fn attempt<B: CaptureBackend>(backend: &B, test: &LightTest<B::Session>, generation: u64) -> Outcome {
    match backend.start_default_camera() {
        Ok(session) => {
            if test.started(generation, session) {
                Outcome::Running
            } else {
                tracing::info!("Camera: test {} abandoned before it started", generation);
                Outcome::Abandoned
            }
        }
        Err(err) => {
            test.failed(generation);
            let message = err.alert_message();
            if message.is_some() {
                tracing::error!("Camera: {}", err);
            } else {
                tracing::warn!("Camera: {}", err);
            }
            Outcome::Failed(message)
        }
    }
}

/// The stop timer is attached to the common modes so it still fires while a
/// menu is open or a window is being dragged (event tracking mode).
fn stop_timer_mode() -> &'static NSRunLoopMode {
    unsafe { NSRunLoopCommonModes }
}

/// Schedule the stop of test `generation` on the main run loop.
fn schedule_stop<S: CaptureSession + 'static>(test: Arc<LightTest<S>>, generation: u64) {
    schedule_stop_on(
        &NSRunLoop::mainRunLoop(),
        settings::LIGHT_TEST_DURATION,
        test,
        generation,
    );
}

fn schedule_stop_on<S: CaptureSession + 'static>(
    run_loop: &NSRunLoop,
    delay: Duration,
    test: Arc<LightTest<S>>,
    generation: u64,
) {
    let block = RcBlock::new(move |_timer: NonNull<NSTimer>| {
        if test.finish(generation) {
            tracing::debug!("Camera: test {} finished", generation);
        }
    });
    unsafe {
        let timer = NSTimer::timerWithTimeInterval_repeats_block(delay.as_secs_f64(), false, &block);
        run_loop.addTimer_forMode(&timer, stop_timer_mode());
    }
}

fn report_failure(message: &'static str) {
    DispatchQueue::main().exec_async(move || {
        let Some(mtm) = MainThreadMarker::new() else {
            return;
        };
        crate::alert::show_warning("Error", message, mtm);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    use objc2_foundation::{NSDate, NSDefaultRunLoopMode};

    struct FakeSession {
        stops: Arc<AtomicUsize>,
    }

    impl CaptureSession for FakeSession {
        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    enum FakeBackend {
        NoCamera,
        Rejects,
        Camera(Arc<AtomicUsize>),
    }

    impl CaptureBackend for FakeBackend {
        type Session = FakeSession;

        fn start_default_camera(&self) -> Result<FakeSession, CameraError> {
            match self {
                FakeBackend::NoCamera => Err(CameraError::NoDevice),
                FakeBackend::Rejects => Err(CameraError::SessionRejected("output")),
                FakeBackend::Camera(stops) => Ok(FakeSession {
                    stops: Arc::clone(stops),
                }),
            }
        }
    }

    #[test]
    fn missing_camera_releases_reservation_and_alerts() {
        let test = LightTest::new();
        let generation = test.try_begin().unwrap();

        let outcome = attempt(&FakeBackend::NoCamera, &test, generation);

        assert_eq!(outcome, Outcome::Failed(Some("No camera device was found.")));
        assert!(!test.is_active());
    }

    #[test]
    fn rejected_session_fails_without_alert() {
        let test = LightTest::new();
        let generation = test.try_begin().unwrap();

        let outcome = attempt(&FakeBackend::Rejects, &test, generation);

        assert_eq!(outcome, Outcome::Failed(None));
        assert!(!test.is_active());
    }

    #[test]
    fn working_camera_runs_until_finished_once() {
        let stops = Arc::new(AtomicUsize::new(0));
        let backend = FakeBackend::Camera(Arc::clone(&stops));
        let test = LightTest::new();
        let generation = test.try_begin().unwrap();

        assert_eq!(attempt(&backend, &test, generation), Outcome::Running);
        assert!(test.is_active());
        assert_eq!(stops.load(Ordering::SeqCst), 0);

        assert!(test.finish(generation));
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert!(!test.is_active());
    }

    #[test]
    fn camera_opened_after_shutdown_is_abandoned() {
        let stops = Arc::new(AtomicUsize::new(0));
        let backend = FakeBackend::Camera(Arc::clone(&stops));
        let test = LightTest::new();
        let generation = test.try_begin().unwrap();
        test.shutdown();

        assert_eq!(attempt(&backend, &test, generation), Outcome::Abandoned);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn start_opens_camera_off_the_calling_thread() {
        let tester = CameraLightTester::with_backend(FakeBackend::Rejects);
        tester.start();

        let deadline = Instant::now() + Duration::from_secs(5);
        while tester.test.is_active() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(!tester.test.is_active());
    }

    #[test]
    fn stop_timer_runs_in_common_modes() {
        assert_eq!(stop_timer_mode().to_string(), "kCFRunLoopCommonModes");
    }

    #[test]
    fn scheduled_stop_fires_on_the_run_loop() {
        let stops = Arc::new(AtomicUsize::new(0));
        let test = Arc::new(LightTest::new());
        let generation = test.try_begin().unwrap();
        test.started(
            generation,
            FakeSession {
                stops: Arc::clone(&stops),
            },
        );

        let run_loop = NSRunLoop::currentRunLoop();
        schedule_stop_on(&run_loop, Duration::from_millis(20), Arc::clone(&test), generation);

        let deadline = Instant::now() + Duration::from_secs(5);
        while test.is_active() && Instant::now() < deadline {
            let until = NSDate::dateWithTimeIntervalSinceNow(0.05);
            unsafe { run_loop.runMode_beforeDate(NSDefaultRunLoopMode, &until) };
        }
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert!(!test.is_active());
    }
}
