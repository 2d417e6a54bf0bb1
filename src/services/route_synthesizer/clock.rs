use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

/// Time as seen by the synthesizer: elapsed time for the budget check and
/// the pauses between provider calls.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Monotonic time since an arbitrary fixed origin
    fn now(&self) -> Duration;

    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the tokio runtime
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        TokioClock {
            origin: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sleep_advances_now() {
        let clock = TokioClock::new();
        let before = clock.now();
        clock.sleep(Duration::from_millis(20)).await;
        assert!(clock.now() - before >= Duration::from_millis(20));
    }
}
