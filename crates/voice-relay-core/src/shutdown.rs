use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Process-wide teardown signal.
///
/// Cloned into every component that talks to the external player. Once
/// requested it never resets.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    /// Create an unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark shutdown as requested.
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether shutdown has been requested.
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
