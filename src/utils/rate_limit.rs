use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};

/// Caps the number of in-flight requests toward the metered upstream APIs.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
}

impl RateLimiter {
    pub fn new(max_concurrent: usize) -> Self {
        RateLimiter {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// `None` only if the semaphore was closed, which this type never does.
    pub async fn acquire(&self) -> Option<SemaphorePermit<'_>> {
        self.semaphore.acquire().await.ok()
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(4)
    }
}
