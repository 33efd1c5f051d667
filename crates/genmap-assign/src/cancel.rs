//! Cooperative cancellation and search limits

use crate::failure::SearchBound;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared flag a caller sets to stop a running assignment
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Limits checked at every search step
#[derive(Debug, Clone)]
pub(crate) struct SearchLimits {
    pub max_nodes: Option<u64>,
    pub deadline: Option<Instant>,
    pub cancel: CancelToken,
}

impl SearchLimits {
    pub fn new(max_nodes: Option<u64>, deadline_ms: Option<u64>, cancel: CancelToken) -> Self {
        Self {
            max_nodes,
            deadline: deadline_ms.map(|ms| Instant::now() + Duration::from_millis(ms)),
            cancel,
        }
    }

    /// Cancellation or deadline
    pub fn interrupted(&self) -> Option<SearchBound> {
        if self.cancel.is_cancelled() {
            return Some(SearchBound::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(SearchBound::Deadline),
            _ => None,
        }
    }
}
