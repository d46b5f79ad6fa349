/*!
    Stopping a running session from another thread.

    The session checks its token before reading each packet. A cancelled
    run fails with [`PipelineError::Cancelled`](crate::PipelineError::Cancelled)
    and its output is removed.
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/**
    Cooperative cancellation flag shared between a running session and
    whoever wants to stop it (e.g. a Ctrl-C handler).

    Clones share the same flag.
*/
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
