// Fault barrier: operations run under a shared lock, and of all callers that
// fail within the same epoch exactly one runs the recovery

pub mod barrier;
pub mod logging;
pub mod settings;

// Re-export the barrier for convenience
pub use barrier::{
    recover_fn, Fallback, FaultBarrier, FaultObserver, Operation, Outcome, RecoverFn,
    RecoveryLock, RecoveryStrategy, ReentrantRwLock, Reinvoke, TracingObserver,
};
pub use settings::{BarrierConfig, ObserverConfig, Severity};

use thiserror::Error;

/// Errors raised by the barrier's own configuration and setup
///
/// Failures of wrapped operations and recovery strategies are never converted
/// into this type; they reach the caller exactly as produced.
#[derive(Error, Debug)]
pub enum BarrierError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type BarrierResult<T> = Result<T, BarrierError>;
