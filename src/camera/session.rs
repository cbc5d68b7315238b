use parking_lot::Mutex;

/// A running capture that can be stopped from any thread.
pub trait CaptureSession: Send {
    fn stop(&self);
}

enum Phase<S> {
    Idle,
    /// The device is being opened off the main thread.
    Starting { generation: u64 },
    Running { generation: u64, session: S },
}

struct State<S> {
    phase: Phase<S>,
    next_generation: u64,
}

/// Tracks the single light test that may be in flight.
///
/// A test moves `Idle -> Starting -> Running -> Idle`. While a test is
/// starting or running, new requests are refused. Each test gets a
/// generation number so a late callback can only ever finish the test that
/// scheduled it.
pub struct LightTest<S> {
    state: Mutex<State<S>>,
}

impl<S: CaptureSession> LightTest<S> {
    pub fn new() -> Self {
        LightTest {
            state: Mutex::new(State {
                phase: Phase::Idle,
                next_generation: 1,
            }),
        }
    }

    /// Reserve the camera for a new test. Returns `None` if one is already in flight.
    pub fn try_begin(&self) -> Option<u64> {
        let mut state = self.state.lock();
        if !matches!(state.phase, Phase::Idle) {
            return None;
        }
        let generation = state.next_generation;
        state.next_generation += 1;
        state.phase = Phase::Starting { generation };
        Some(generation)
    }

    /// Record that the session for `generation` is running.
    ///
    /// Returns `false` and stops the session right away if the test was
    /// abandoned in the meantime (for example by [`LightTest::shutdown`]).
    pub fn started(&self, generation: u64, session: S) -> bool {
        let mut state = self.state.lock();
        if matches!(state.phase, Phase::Starting { generation: g } if g == generation) {
            state.phase = Phase::Running { generation, session };
            return true;
        }
        drop(state);
        session.stop();
        false
    }

    /// Release the reservation after the camera could not be started.
    pub fn failed(&self, generation: u64) {
        let mut state = self.state.lock();
        if matches!(state.phase, Phase::Starting { generation: g } if g == generation) {
            state.phase = Phase::Idle;
        }
    }

    /// Stop the session started for `generation`. Returns whether one was stopped.
    pub fn finish(&self, generation: u64) -> bool {
        let mut state = self.state.lock();
        if !matches!(state.phase, Phase::Running { generation: g, .. } if g == generation) {
            return false;
        }
        let Phase::Running { session, .. } = std::mem::replace(&mut state.phase, Phase::Idle)
        else {
            return false;
        };
        drop(state);
        session.stop();
        true
    }

    /// Stop whatever is running and refuse any session still being opened.
    pub fn shutdown(&self) {
        let previous = std::mem::replace(&mut self.state.lock().phase, Phase::Idle);
        if let Phase::Running { session, .. } = previous {
            session.stop();
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state.lock().phase, Phase::Idle)
    }
}

impl<S: CaptureSession> Default for LightTest<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSession {
        stops: Arc<AtomicUsize>,
    }

    impl CaptureSession for FakeSession {
        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn session() -> (FakeSession, Arc<AtomicUsize>) {
        let stops = Arc::new(AtomicUsize::new(0));
        (
            FakeSession {
                stops: Arc::clone(&stops),
            },
            stops,
        )
    }

    #[test]
    fn full_cycle_stops_exactly_once() {
        let test = LightTest::new();
        let (s, stops) = session();

        let generation = test.try_begin().unwrap();
        assert!(test.started(generation, s));
        assert!(test.is_active());

        assert!(test.finish(generation));
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert!(!test.is_active());

        assert!(!test.finish(generation));
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn second_request_while_starting_is_refused() {
        let test: LightTest<FakeSession> = LightTest::new();
        assert!(test.try_begin().is_some());
        assert!(test.try_begin().is_none());
    }

    #[test]
    fn second_request_while_running_does_not_orphan_the_first() {
        let test = LightTest::new();
        let (s, stops) = session();
        let generation = test.try_begin().unwrap();
        test.started(generation, s);

        assert!(test.try_begin().is_none());

        assert!(test.finish(generation));
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failure_releases_the_camera() {
        let test: LightTest<FakeSession> = LightTest::new();
        let first = test.try_begin().unwrap();
        test.failed(first);
        assert!(!test.is_active());

        let second = test.try_begin().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn stale_finish_leaves_newer_test_running() {
        let test = LightTest::new();
        let (first_session, first_stops) = session();
        let first = test.try_begin().unwrap();
        test.started(first, first_session);
        test.finish(first);

        let (second_session, second_stops) = session();
        let second = test.try_begin().unwrap();
        test.started(second, second_session);

        assert!(!test.finish(first));
        assert_eq!(second_stops.load(Ordering::SeqCst), 0);
        assert_eq!(first_stops.load(Ordering::SeqCst), 1);
        assert!(test.is_active());
    }

    #[test]
    fn shutdown_stops_running_session() {
        let test = LightTest::new();
        let (s, stops) = session();
        let generation = test.try_begin().unwrap();
        test.started(generation, s);

        test.shutdown();
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert!(!test.finish(generation));
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn session_arriving_after_shutdown_is_stopped_immediately() {
        let test = LightTest::new();
        let generation = test.try_begin().unwrap();
        test.shutdown();

        let (s, stops) = session();
        assert!(!test.started(generation, s));
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert!(!test.is_active());
    }
}
