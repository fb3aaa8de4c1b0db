/// Fault barrier - coordinates recovery among concurrently failing callers
///
/// Normal executions share the lock and run concurrently. A caller whose
/// operation fails escalates to the exclusive lock and compares the epoch it
/// observed before running the operation with the current one:
/// - equal: nobody recovered in the meantime, so this caller runs the
///   recovery strategy and advances the epoch
/// - different: another caller already recovered from a failure of the same
///   epoch, so this call ends as [`Outcome::Superseded`]
///
/// The default lock is reentrant, so operations and strategies may call back
/// into the barrier that is running them, e.g. to read [`FaultBarrier::epoch`]
/// or to execute a nested operation from within a recovery. A nested call
/// whose operation fails while the outer call is still on the normal path
/// needs the exclusive mode under a shared hold, which panics.
use super::lock::{RecoveryLock, ReentrantRwLock};
use super::observer::{FaultObserver, TracingObserver};
use super::strategy::{RecoveryStrategy, Reinvoke};
use crate::settings::BarrierConfig;
use std::sync::atomic::{AtomicU64, Ordering};

/// Result of a call that did not end in a fatal error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Operation succeeded on the normal path
    Completed(T),

    /// Operation failed and this call recovered from it
    Recovered(T),

    /// Operation failed but another caller already ran the recovery for the
    /// same epoch; no value is available for this call
    Superseded,
}

impl<T> Outcome<T> {
    /// Value produced by the operation or the recovery strategy
    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Completed(value) | Outcome::Recovered(value) => Some(value),
            Outcome::Superseded => None,
        }
    }

    /// Borrow the value, if any
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Completed(value) | Outcome::Recovered(value) => Some(value),
            Outcome::Superseded => None,
        }
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, Outcome::Recovered(_))
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Outcome::Superseded)
    }
}

/// Fault barrier
///
/// Share one instance (e.g. behind an `Arc`) between every caller whose
/// failures should be recovered from at most once per epoch. `S` is the
/// strategy [`execute`](Self::execute) recovers with.
#[derive(Debug)]
pub struct FaultBarrier<O = TracingObserver, L = ReentrantRwLock, S = Reinvoke> {
    /// Held shared on the normal path, exclusive while recovering
    lock: L,

    /// Number of completed recovery cycles. Read under either lock mode,
    /// written only under the exclusive one.
    epoch: AtomicU64,

    /// Receives failure and abort notifications
    observer: O,

    default_strategy: S,
}

impl FaultBarrier {
    /// Barrier with the default lock, reporting to `tracing` at INFO
    pub fn new() -> Self {
        Self::with_observer(TracingObserver::default())
    }

    /// Barrier with the default lock and a configured observer
    pub fn from_config(config: &BarrierConfig) -> Self {
        Self::with_observer(TracingObserver::new(config.observer.severity))
    }
}

impl Default for FaultBarrier {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> FaultBarrier<O> {
    /// Barrier with the default lock and a custom observer
    pub fn with_observer(observer: O) -> Self {
        Self::with_lock(ReentrantRwLock::new(), observer)
    }
}

impl<O, L: RecoveryLock> FaultBarrier<O, L> {
    /// Barrier with an injected lock and observer
    pub fn with_lock(lock: L, observer: O) -> Self {
        Self {
            lock,
            epoch: AtomicU64::new(0),
            observer,
            default_strategy: Reinvoke,
        }
    }
}

impl<O, L: RecoveryLock, S> FaultBarrier<O, L, S> {
    /// Replace the strategy used by [`execute`](Self::execute)
    ///
    /// The strategy is cloned for every recovery cycle it runs.
    pub fn with_default_strategy<R>(self, strategy: R) -> FaultBarrier<O, L, R> {
        FaultBarrier {
            lock: self.lock,
            epoch: self.epoch,
            observer: self.observer,
            default_strategy: strategy,
        }
    }

    pub fn default_strategy(&self) -> &S {
        &self.default_strategy
    }

    /// Get observer
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Number of recovery cycles completed so far
    pub fn epoch(&self) -> u64 {
        let _shared = self.lock.shared();
        self.epoch.load(Ordering::SeqCst)
    }

    /// Execute operation, recovering with the barrier's default strategy
    ///
    /// Same as [`execute_with`](Self::execute_with) with a clone of the
    /// default strategy, which re-invokes the operation once unless replaced
    /// through [`with_default_strategy`](Self::with_default_strategy).
    pub fn execute<T, E, F>(&self, operation: F) -> Result<Outcome<T>, E>
    where
        F: FnMut() -> Result<T, E>,
        O: FaultObserver<E>,
        S: RecoveryStrategy<T, E> + Clone,
    {
        self.execute_with(operation, self.default_strategy.clone())
    }

    /// Execute operation and recover from its failure with `strategy`
    ///
    /// Returns an error only if this caller was admitted to recovery and the
    /// strategy failed. The error is the one produced by the strategy,
    /// unchanged. The original failure never reaches the caller.
    pub fn execute_with<T, E, F, R>(&self, mut operation: F, strategy: R) -> Result<Outcome<T>, E>
    where
        F: FnMut() -> Result<T, E>,
        R: RecoveryStrategy<T, E>,
        O: FaultObserver<E>,
    {
        let (ticket, failure) = {
            let _shared = self.lock.shared();
            let ticket = self.epoch.load(Ordering::SeqCst);

            match operation() {
                Ok(value) => return Ok(Outcome::Completed(value)),
                Err(failure) => {
                    self.observer.recover(&failure);
                    (ticket, failure)
                }
            }
        };

        let _exclusive = self.lock.exclusive();

        let epoch = self.epoch.load(Ordering::SeqCst);
        if ticket != epoch {
            tracing::debug!(ticket, epoch, "Recovery already handled by another caller");
            return Ok(Outcome::Superseded);
        }

        tracing::debug!(epoch, "Starting recovery");

        let recovered = {
            // Advances the epoch even if the strategy panics, so callers
            // queued behind this one never repeat the attempt
            let _advance = EpochAdvance(&self.epoch);
            strategy.recover(&mut operation, failure)
        };

        match recovered {
            Ok(value) => Ok(Outcome::Recovered(value)),
            Err(fatal) => {
                self.observer.abort(&fatal);
                Err(fatal)
            }
        }
    }
}

/// Increments the epoch when dropped
struct EpochAdvance<'a>(&'a AtomicU64);

impl Drop for EpochAdvance<'_> {
    fn drop(&mut self) {
        let previous = self.0.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(epoch = previous + 1, "Epoch advanced");
    }
}
