/// Fault barrier for concurrent failure recovery
///
/// This module provides the recovery gate and its injection points:
/// - The barrier itself, which runs operations and coordinates recovery
/// - Readers-writer lock abstraction and the reentrant default lock
/// - Recovery strategies (re-invoke, fallback value, closures)
/// - Observers notified of failures and fatal errors
///
/// # Architecture
///
/// ```text
///  caller ──execute──▶ ┌──────────────────────────────────┐
///                      │ FaultBarrier                     │
///                      │  shared lock: run operation      │──recover──▶ FaultObserver
///                      │  exclusive lock: ticket == epoch?│
///                      └───────┬──────────────────┬───────┘
///                              │ yes              │ no
///                              ↓                  ↓
///                      ┌──────────────────┐  Outcome::Superseded
///                      │ RecoveryStrategy │
///                      │  epoch += 1      │──abort (on error)──▶ FaultObserver
///                      └──────────────────┘
/// ```
///
/// # Usage Example
///
/// ```rust,ignore
/// use fault_barrier::{FaultBarrier, Outcome};
/// use std::sync::Arc;
///
/// let barrier = Arc::new(FaultBarrier::new());
///
/// // Fails once, then the default strategy re-invokes it
/// let outcome = barrier.execute(|| connection.query("SELECT 1"))?;
///
/// match outcome {
///     Outcome::Completed(rows) | Outcome::Recovered(rows) => consume(rows),
///     Outcome::Superseded => {
///         // Someone else already reconnected; try again on the fresh connection
///     }
/// }
/// # Ok::<(), anyhow::Error>(())
/// ```
pub mod gate;
pub mod lock;
pub mod observer;
pub mod strategy;

// Re-export main types for convenience
pub use gate::{FaultBarrier, Outcome};
pub use lock::{RecoveryLock, ReentrantReadGuard, ReentrantRwLock, ReentrantWriteGuard};
pub use observer::{FaultObserver, TracingObserver, ABORT_MESSAGE, RECOVER_MESSAGE};
pub use strategy::{recover_fn, Fallback, Operation, RecoverFn, RecoveryStrategy, Reinvoke};
