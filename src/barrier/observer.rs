/// Observers for abnormal execution flows of the fault barrier
///
/// Observers are a side channel: they are told about every failure the
/// barrier catches and about every fatal error that escapes a recovery
/// attempt, but they never change the outcome of a call.
use crate::settings::Severity;
use std::fmt;
use std::sync::Arc;
use tracing::Level;

/// Message recorded when a failure is caught on the normal path
pub const RECOVER_MESSAGE: &str = "Encountered failure";

/// Message recorded when the recovery attempt itself failed
pub const ABORT_MESSAGE: &str = "Abort recovery";

/// Observer trait
///
/// Implementations must not panic. They are invoked while the barrier holds
/// its lock, so slow observers slow down every caller sharing the barrier.
pub trait FaultObserver<E: ?Sized>: Send + Sync {
    /// A failure occurred from which the barrier will try to recover
    fn recover(&self, failure: &E);

    /// The recovery attempt failed with a fatal error
    fn abort(&self, fatal: &E);
}

impl<E: ?Sized, O: FaultObserver<E> + ?Sized> FaultObserver<E> for &O {
    fn recover(&self, failure: &E) {
        (**self).recover(failure)
    }

    fn abort(&self, fatal: &E) {
        (**self).abort(fatal)
    }
}

impl<E: ?Sized, O: FaultObserver<E> + ?Sized> FaultObserver<E> for Arc<O> {
    fn recover(&self, failure: &E) {
        (**self).recover(failure)
    }

    fn abort(&self, fatal: &E) {
        (**self).abort(fatal)
    }
}

/// Default observer that reports to `tracing`
///
/// Every notification becomes one event at the configured severity carrying
/// the message and the causing error. Whether the event is recorded is up to
/// the installed subscriber: notifications below its threshold are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TracingObserver {
    severity: Severity,
}

impl TracingObserver {
    /// Create observer emitting events at `severity`
    pub fn new(severity: Severity) -> Self {
        Self { severity }
    }

    /// Severity at which notifications are emitted
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// `tracing` level at which notifications are emitted
    pub fn level(&self) -> Level {
        self.severity.into()
    }

    fn log(&self, message: &str, cause: &dyn fmt::Display) {
        // `tracing` needs the level at the call site, hence one arm per severity
        match self.severity {
            Severity::Error => tracing::error!(error = %cause, "{}", message),
            Severity::Warn => tracing::warn!(error = %cause, "{}", message),
            Severity::Info => tracing::info!(error = %cause, "{}", message),
            Severity::Debug => tracing::debug!(error = %cause, "{}", message),
            Severity::Trace => tracing::trace!(error = %cause, "{}", message),
        }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new(Severity::Info)
    }
}

impl<E: fmt::Display + ?Sized> FaultObserver<E> for TracingObserver {
    fn recover(&self, failure: &E) {
        self.log(RECOVER_MESSAGE, &failure)
    }

    fn abort(&self, fatal: &E) {
        self.log(ABORT_MESSAGE, &fatal)
    }
}
