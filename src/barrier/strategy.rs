// Recovery strategies for the fault barrier
//
// A strategy is consulted at most once per `execute` call, and only by the
// thread admitted to the recovery section. It receives the original operation
// together with the failure that triggered recovery and either produces a
// replacement result or fails with a fatal error. The barrier places no
// idempotence requirement on strategies.

/// Operation handed to a strategy during recovery
pub type Operation<'a, T, E> = dyn FnMut() -> Result<T, E> + 'a;

/// Recovery strategy trait
pub trait RecoveryStrategy<T, E> {
    /// Attempt to recover from `failure`
    ///
    /// Any error returned here is treated as fatal: it is reported to the
    /// observer and handed back to the caller of `execute` unchanged.
    fn recover(self, operation: &mut Operation<'_, T, E>, failure: E) -> Result<T, E>;
}

/// Default strategy: run the operation once more
///
/// The original failure is dropped; whatever the second attempt returns is
/// the outcome of the recovery cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reinvoke;

impl<T, E> RecoveryStrategy<T, E> for Reinvoke {
    fn recover(self, operation: &mut Operation<'_, T, E>, _failure: E) -> Result<T, E> {
        operation()
    }
}

/// Strategy that substitutes a fixed value without touching the operation
#[derive(Debug, Clone)]
pub struct Fallback<T>(pub T);

impl<T, E> RecoveryStrategy<T, E> for Fallback<T> {
    fn recover(self, _operation: &mut Operation<'_, T, E>, _failure: E) -> Result<T, E> {
        Ok(self.0)
    }
}

/// Strategy built from a closure, see [`recover_fn`]
#[derive(Debug, Clone, Copy)]
pub struct RecoverFn<F>(F);

/// Wrap a closure as a recovery strategy
///
/// ```rust,ignore
/// let strategy = recover_fn(|operation, failure: io::Error| {
///     tracing::warn!(error = %failure, "reconnecting");
///     reconnect()?;
///     operation()
/// });
/// ```
pub fn recover_fn<T, E, F>(f: F) -> RecoverFn<F>
where
    F: FnOnce(&mut Operation<'_, T, E>, E) -> Result<T, E>,
{
    RecoverFn(f)
}

impl<T, E, F> RecoveryStrategy<T, E> for RecoverFn<F>
where
    F: FnOnce(&mut Operation<'_, T, E>, E) -> Result<T, E>,
{
    fn recover(self, operation: &mut Operation<'_, T, E>, failure: E) -> Result<T, E> {
        (self.0)(operation, failure)
    }
}
