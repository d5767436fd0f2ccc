//! Single-flight memoization primitive.
//!
//! Each slot stores either the resolved value or the in-flight fetch itself
//! (a shared future), never an "is fetching" flag. A caller that finds a
//! pending slot attaches to the same future and receives the same eventual
//! result, so at most one fetch per key is ever in flight. The naive
//! check-then-fetch cache double-fetches under concurrency; claiming the
//! slot with the future makes the claim atomic under the map lock.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Mutex;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tracing::debug;

use keyfield_errors::KeyfieldResult;

type SharedFetch<T> = Shared<BoxFuture<'static, KeyfieldResult<T>>>;

enum Slot<T> {
    Ready(T),
    Pending(SharedFetch<T>),
}

/// Memoizing map with at most one in-flight fetch per key.
///
/// Values are expected to be cheap to clone (the cache stores `Arc`s).
/// Entries live until the map is dropped; the remote data they mirror is
/// immutable for the session.
pub(crate) struct SingleFlightMap<K, T> {
    slots: Mutex<HashMap<K, Slot<T>>>,
}

impl<K, T> SingleFlightMap<K, T>
where
    K: Eq + Hash + Copy + Display,
    T: Clone,
{
    pub(crate) fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value for `key`, attaching to the pending fetch
    /// if one is in flight, or starting `fetch` otherwise.
    ///
    /// A failed fetch is surfaced to every attached caller and leaves the
    /// key unresolved, eligible for retry on the next call.
    pub(crate) async fn get_or_fetch<F>(&self, key: K, fetch: F) -> KeyfieldResult<T>
    where
        F: FnOnce() -> BoxFuture<'static, KeyfieldResult<T>>,
    {
        let handle = {
            let mut slots = self.slots.lock().expect("single-flight slot lock poisoned");
            match slots.get(&key) {
                Some(Slot::Ready(value)) => {
                    debug!(%key, "cache hit");
                    return Ok(value.clone());
                }
                Some(Slot::Pending(handle)) => {
                    debug!(%key, "joining in-flight fetch");
                    handle.clone()
                }
                None => {
                    debug!(%key, "cache miss, starting fetch");
                    let handle = fetch().shared();
                    slots.insert(key, Slot::Pending(handle.clone()));
                    handle
                }
            }
        };

        let result = handle.clone().await;
        self.settle(key, &handle, &result);
        result
    }

    /// Moves the slot out of the pending state once the fetch completes.
    ///
    /// Every attached caller settles; the operation is idempotent. The
    /// pointer-identity guard keeps a late settling waiter of an old fetch
    /// from clobbering a newer fetch that has since claimed the slot.
    fn settle(&self, key: K, handle: &SharedFetch<T>, result: &KeyfieldResult<T>) {
        let mut slots = self.slots.lock().expect("single-flight slot lock poisoned");
        let Some(Slot::Pending(current)) = slots.get(&key) else {
            return;
        };
        if !current.ptr_eq(handle) {
            return;
        }
        match result {
            Ok(value) => {
                slots.insert(key, Slot::Ready(value.clone()));
            }
            Err(_) => {
                debug!(%key, "fetch failed, leaving key unresolved for retry");
                slots.remove(&key);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, key: K) -> bool {
        self.slots
            .lock()
            .expect("single-flight slot lock poisoned")
            .contains_key(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use keyfield_errors::KeyfieldError;
    use tokio::sync::Semaphore;

    fn counting_fetch(
        calls: &Arc<AtomicUsize>,
        value: &str,
    ) -> impl FnOnce() -> BoxFuture<'static, KeyfieldResult<Arc<String>>> {
        let calls = Arc::clone(calls);
        let value = value.to_string();
        move || {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(value))
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_second_call_hits_cache() {
        let map: SingleFlightMap<u32, Arc<String>> = SingleFlightMap::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = map.get_or_fetch(1, counting_fetch(&calls, "value")).await.unwrap();
        let second = map.get_or_fetch(1, counting_fetch(&calls, "other")).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let map: Arc<SingleFlightMap<u32, Arc<String>>> = Arc::new(SingleFlightMap::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Semaphore::new(0));

        let gated_fetch = || {
            let calls = Arc::clone(&calls);
            let gate = Arc::clone(&gate);
            move || {
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    let permit = gate
                        .acquire()
                        .await
                        .map_err(|_| KeyfieldError::internal("gate closed"))?;
                    permit.forget();
                    Ok(Arc::new("value".to_string()))
                }
                .boxed()
            }
        };

        let (first, second, third, ()) = futures::join!(
            map.get_or_fetch(1, gated_fetch()),
            map.get_or_fetch(1, gated_fetch()),
            map.get_or_fetch(1, gated_fetch()),
            async {
                // Let all three callers reach the slot before the fetch
                // is allowed to resolve.
                tokio::task::yield_now().await;
                gate.add_permits(1);
            }
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let first = first.unwrap();
        assert!(Arc::ptr_eq(&first, &second.unwrap()));
        assert!(Arc::ptr_eq(&first, &third.unwrap()));
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_key_unresolved() {
        let map: SingleFlightMap<u32, Arc<String>> = SingleFlightMap::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let failing = {
            let calls = Arc::clone(&calls);
            move || {
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(KeyfieldError::provider_unavailable("down"))
                }
                .boxed()
            }
        };

        let result = map.get_or_fetch(1, failing).await;
        assert_eq!(
            result,
            Err(KeyfieldError::provider_unavailable("down"))
        );
        assert!(!map.contains(1));

        // The failure is not cached; the next call fetches again and can
        // succeed.
        let value = map.get_or_fetch(1, counting_fetch(&calls, "recovered")).await.unwrap();
        assert_eq!(*value, "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_failure_reaches_every_caller() {
        let map: Arc<SingleFlightMap<u32, Arc<String>>> = Arc::new(SingleFlightMap::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Semaphore::new(0));

        let gated_failure = || {
            let calls = Arc::clone(&calls);
            let gate = Arc::clone(&gate);
            move || {
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    let permit = gate
                        .acquire()
                        .await
                        .map_err(|_| KeyfieldError::internal("gate closed"))?;
                    permit.forget();
                    Err(KeyfieldError::provider_unavailable("down"))
                }
                .boxed()
            }
        };

        let (first, second, ()) = futures::join!(
            map.get_or_fetch(1, gated_failure()),
            map.get_or_fetch(1, gated_failure()),
            async {
                tokio::task::yield_now().await;
                gate.add_permits(1);
            }
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(first.is_err());
        assert!(second.is_err());
        assert!(!map.contains(1));
    }

    #[tokio::test]
    async fn test_distinct_keys_fetch_independently() {
        let map: SingleFlightMap<u32, Arc<String>> = SingleFlightMap::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let a = map.get_or_fetch(1, counting_fetch(&calls, "a")).await.unwrap();
        let b = map.get_or_fetch(2, counting_fetch(&calls, "b")).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(*a, "a");
        assert_eq!(*b, "b");
    }
}
