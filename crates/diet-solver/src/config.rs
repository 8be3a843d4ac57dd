use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// LP backend used to solve a model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SolverBackend {
    /// Pure-Rust simplex, always available
    #[default]
    Microlp,
    /// Interior-point conic solver
    #[cfg(feature = "clarabel")]
    Clarabel,
}

impl SolverBackend {
    pub fn name(self) -> &'static str {
        match self {
            SolverBackend::Microlp => "microlp",
            #[cfg(feature = "clarabel")]
            SolverBackend::Clarabel => "clarabel",
        }
    }
}

/// Shared flag a caller can set to abandon a solve before it starts
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything the solve call needs to know about its environment.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    /// Results arriving later than this are discarded
    pub time_limit: Option<Duration>,
    pub cancel: Option<CancelFlag>,
    /// Solver values smaller than this in magnitude are reported as zero
    pub zero_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: SolverBackend::default(),
            time_limit: None,
            cancel: None,
            zero_tolerance: 1e-9,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: SolverBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn with_zero_tolerance(mut self, tol: f64) -> Self {
        self.zero_tolerance = tol;
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let config = SolverConfig::new().with_cancel_flag(flag.clone());
        assert!(!config.is_cancelled());

        flag.cancel();
        assert!(config.is_cancelled());
    }

    #[test]
    fn test_defaults() {
        let config = SolverConfig::default();
        assert_eq!(config.backend, SolverBackend::Microlp);
        assert!(config.time_limit.is_none());
        assert!(!config.is_cancelled());
    }
}
