use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Global politeness gate for outbound requests.
///
/// Every network call awaits `pause()` first; the lock is held across the
/// sleep so concurrent workers are spaced out globally, not per entry.
pub struct RequestPacer {
    min_interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: Mutex::new(None),
        }
    }

    pub async fn pause(&self) {
        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn consecutive_calls_are_spaced() {
        let pacer = RequestPacer::new(Duration::from_millis(30));
        let start = Instant::now();
        pacer.pause().await;
        pacer.pause().await;
        pacer.pause().await;
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn first_call_does_not_wait() {
        let pacer = RequestPacer::new(Duration::from_secs(5));
        let start = Instant::now();
        pacer.pause().await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
