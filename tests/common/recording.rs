/// Recording doubles for the barrier's injection points
///
/// Every double appends to the same journal so a test can check the exact
/// interleaving of lock transitions, operation calls, strategy calls and
/// observer notifications.
use fault_barrier::{recover_fn, FaultBarrier, FaultObserver, RecoveryLock, RecoveryStrategy};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Error type used by test operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TestError(pub &'static str);

/// Something the barrier did, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SharedLock,
    SharedUnlock,
    ExclusiveLock,
    ExclusiveUnlock,
    Call,
    Strategy(TestError),
    Recover(TestError),
    Abort(TestError),
}

/// Shared, append-only event log
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    pub fn record(&self, event: Event) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, event: &Event) -> usize {
        self.events().iter().filter(|e| *e == event).count()
    }

    pub fn count_matching(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// Guard that records its release before the inner guard is dropped
pub struct RecordingGuard<'a, G> {
    _inner: G,
    journal: &'a Journal,
    release: Event,
}

impl<G> Drop for RecordingGuard<'_, G> {
    fn drop(&mut self) {
        self.journal.record(self.release.clone());
    }
}

/// Readers-writer lock that journals every transition
#[derive(Debug, Default)]
pub struct RecordingLock {
    inner: RwLock<()>,
    journal: Journal,
}

impl RecordingLock {
    pub fn new(journal: Journal) -> Self {
        Self {
            inner: RwLock::new(()),
            journal,
        }
    }
}

impl RecoveryLock for RecordingLock {
    type Shared<'a> = RecordingGuard<'a, RwLockReadGuard<'a, ()>>;
    type Exclusive<'a> = RecordingGuard<'a, RwLockWriteGuard<'a, ()>>;

    fn shared(&self) -> Self::Shared<'_> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        self.journal.record(Event::SharedLock);
        RecordingGuard {
            _inner: inner,
            journal: &self.journal,
            release: Event::SharedUnlock,
        }
    }

    fn exclusive(&self) -> Self::Exclusive<'_> {
        let inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        self.journal.record(Event::ExclusiveLock);
        RecordingGuard {
            _inner: inner,
            journal: &self.journal,
            release: Event::ExclusiveUnlock,
        }
    }
}

/// Observer that journals every notification
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    journal: Journal,
}

impl RecordingObserver {
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }
}

impl FaultObserver<TestError> for RecordingObserver {
    fn recover(&self, failure: &TestError) {
        self.journal.record(Event::Recover(failure.clone()));
    }

    fn abort(&self, fatal: &TestError) {
        self.journal.record(Event::Abort(fatal.clone()));
    }
}

pub type RecordingBarrier = FaultBarrier<RecordingObserver, RecordingLock>;

/// Barrier whose lock and observer both write to `journal`
pub fn create_recording_barrier(journal: &Journal) -> RecordingBarrier {
    FaultBarrier::with_lock(
        RecordingLock::new(journal.clone()),
        RecordingObserver::new(journal.clone()),
    )
}

/// Barrier with the default lock and a recording observer
pub fn create_observed_barrier(journal: &Journal) -> FaultBarrier<RecordingObserver> {
    FaultBarrier::with_observer(RecordingObserver::new(journal.clone()))
}

/// Operation returning the scripted results in order, journaling each call
pub fn scripted(
    journal: &Journal,
    results: Vec<Result<&'static str, TestError>>,
) -> impl FnMut() -> Result<&'static str, TestError> {
    let journal = journal.clone();
    let mut results: VecDeque<_> = results.into();

    move || {
        journal.record(Event::Call);
        results
            .pop_front()
            .unwrap_or(Err(TestError("script exhausted")))
    }
}

/// Strategy journaling the failure it received, then answering with `result`
pub fn recording_strategy(
    journal: &Journal,
    result: Result<&'static str, TestError>,
) -> impl RecoveryStrategy<&'static str, TestError> + Clone {
    let journal = journal.clone();

    recover_fn(move |_operation, failure: TestError| {
        journal.record(Event::Strategy(failure));
        result
    })
}
