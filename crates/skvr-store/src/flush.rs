use std::sync::Arc;

use tokio::sync::Notify;

use crate::traits::KvStore;

/// Cheap clonable handle for requesting a durability flush.
///
/// `request` never blocks and never waits for the flush to run; requests
/// arriving while a flush is in progress coalesce into a single follow-up
/// flush instead of queueing one task per write.
#[derive(Clone)]
pub struct FlushHandle {
    notify: Arc<Notify>,
}

impl FlushHandle {
    /// Ask the coordinator to flush at some point after now.
    pub fn request(&self) {
        self.notify.notify_one();
    }
}

impl std::fmt::Debug for FlushHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlushHandle").finish_non_exhaustive()
    }
}

/// Single-flight coordinator for the post-commit durability flush.
///
/// One background task serves all writers. A flush is best-effort: failures
/// are logged at warn level and never surfaced to any request path.
pub struct FlushCoordinator;

impl FlushCoordinator {
    /// Spawn the coordinator task on the current tokio runtime and return
    /// the handle writers use to request flushes.
    pub fn spawn(store: Arc<dyn KvStore>) -> FlushHandle {
        let notify = Arc::new(Notify::new());
        let handle = FlushHandle {
            notify: Arc::clone(&notify),
        };
        tokio::spawn(async move {
            loop {
                notify.notified().await;
                let store = Arc::clone(&store);
                match tokio::task::spawn_blocking(move || store.flush()).await {
                    Ok(Ok(())) => tracing::trace!("store flushed"),
                    Ok(Err(err)) => tracing::warn!(error = %err, "durability flush failed"),
                    Err(err) => tracing::warn!(error = %err, "flush task panicked"),
                }
            }
        });
        handle
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::error::StoreResult;

    /// Store stub that only counts flushes.
    struct CountingStore {
        flushes: AtomicUsize,
        delay: Duration,
    }

    impl CountingStore {
        fn new(delay: Duration) -> Self {
            Self {
                flushes: AtomicUsize::new(0),
                delay,
            }
        }
    }

    impl KvStore for CountingStore {
        fn list_namespaces(&self) -> StoreResult<Vec<String>> {
            Ok(Vec::new())
        }
        fn list_keys(&self, _namespace: &str) -> StoreResult<Vec<String>> {
            Ok(Vec::new())
        }
        fn get(&self, _namespace: &str, _key: &str) -> StoreResult<Vec<u8>> {
            Ok(Vec::new())
        }
        fn put(
            &self,
            _namespace: &str,
            _key: Option<&str>,
            _value: Option<&[u8]>,
        ) -> StoreResult<()> {
            Ok(())
        }
        fn delete(&self, _namespace: &str, _key: &str) -> StoreResult<()> {
            Ok(())
        }
        fn delete_namespace(&self, _namespace: &str) -> StoreResult<()> {
            Ok(())
        }
        fn exists(&self, _namespace: &str, _key: Option<&str>) -> StoreResult<bool> {
            Ok(false)
        }
        fn flush(&self) -> StoreResult<()> {
            std::thread::sleep(self.delay);
            self.flushes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn requested_flush_runs() {
        let store = Arc::new(CountingStore::new(Duration::ZERO));
        let handle = FlushCoordinator::spawn(Arc::clone(&store) as Arc<dyn KvStore>);
        handle.request();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(store.flushes.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn burst_of_requests_coalesces() {
        let store = Arc::new(CountingStore::new(Duration::from_millis(50)));
        let handle = FlushCoordinator::spawn(Arc::clone(&store) as Arc<dyn KvStore>);
        for _ in 0..100 {
            handle.request();
        }
        tokio::time::sleep(Duration::from_millis(400)).await;
        let flushes = store.flushes.load(Ordering::SeqCst);
        // One in-flight flush plus at most one queued follow-up.
        assert!(flushes >= 1);
        assert!(flushes <= 2, "expected coalescing, got {flushes} flushes");
    }

    #[tokio::test]
    async fn request_does_not_block_caller() {
        let store = Arc::new(CountingStore::new(Duration::from_millis(200)));
        let handle = FlushCoordinator::spawn(store as Arc<dyn KvStore>);
        let start = std::time::Instant::now();
        handle.request();
        handle.request();
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
