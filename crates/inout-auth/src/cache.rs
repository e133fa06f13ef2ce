//! [`StatusCache`]: lazily loaded status-code reference data.

use std::{collections::BTreeMap, future::Future, sync::Arc};

use inout_core::{person::StatusCode, store::RosterStore};
use tokio::sync::Mutex;
use tracing::debug;

/// Status codes keyed by code.
pub type StatusMap = BTreeMap<i64, StatusCode>;

/// Process-lifetime cache of the status table.
///
/// The first call loads from the store; later calls are served from memory.
/// An empty map means "not loaded", so a failed or empty load is retried on
/// the next call. The lock is held for the whole check-load-store sequence,
/// so concurrent first callers trigger a single load and then share its
/// result.
#[derive(Default)]
pub struct StatusCache {
  map: Mutex<Arc<StatusMap>>,
}

impl StatusCache {
  pub fn new() -> Self { Self::default() }

  /// Every status code, loading them from `store` if needed.
  pub async fn get_all<S: RosterStore>(
    &self,
    store: &S,
  ) -> Result<Arc<StatusMap>, S::Error> {
    self.get_or_load(|| store.list_status_codes()).await
  }

  /// Every status code, loading them with `load` if needed.
  ///
  /// On error the cache stays empty and the error is returned unchanged.
  pub async fn get_or_load<F, Fut, E>(&self, load: F) -> Result<Arc<StatusMap>, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<StatusCode>, E>>,
  {
    let mut map = self.map.lock().await;
    if !map.is_empty() {
      return Ok(Arc::clone(&map));
    }

    let codes = load().await?;
    debug!(count = codes.len(), "loaded status codes");
    *map = Arc::new(codes.into_iter().map(|s| (s.code, s)).collect());
    Ok(Arc::clone(&map))
  }

  /// The status with this code, if it exists.
  pub async fn lookup<S: RosterStore>(
    &self,
    store: &S,
    code: i64,
  ) -> Result<Option<StatusCode>, S::Error> {
    Ok(self.get_all(store).await?.get(&code).cloned())
  }

  /// The code whose label matches `label`, ignoring ASCII case.
  pub async fn code_for_label<S: RosterStore>(
    &self,
    store: &S,
    label: &str,
  ) -> Result<Option<i64>, S::Error> {
    Ok(
      self
        .get_all(store)
        .await?
        .values()
        .find(|s| s.label.eq_ignore_ascii_case(label))
        .map(|s| s.code),
    )
  }
}

#[cfg(test)]
mod tests {
  use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
  };

  use super::*;

  fn codes() -> Vec<StatusCode> {
    vec![
      StatusCode { code: 1, label: "In".to_owned() },
      StatusCode { code: 2, label: "Out".to_owned() },
      StatusCode { code: 3, label: "In Field".to_owned() },
    ]
  }

  #[derive(Debug, thiserror::Error)]
  #[error("store offline")]
  struct Offline;

  #[tokio::test]
  async fn second_call_is_served_from_memory() {
    let cache = StatusCache::new();
    let counter = AtomicUsize::new(0);
    let loads = &counter;
    let load = move || async move {
      loads.fetch_add(1, Ordering::SeqCst);
      Ok::<_, Offline>(codes())
    };

    let first = cache.get_or_load(load).await.unwrap();
    let second = cache.get_or_load(load).await.unwrap();

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.get(&2).map(|s| s.label.as_str()), Some("Out"));
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn concurrent_first_callers_share_one_load() {
    let cache = Arc::new(StatusCache::new());
    let loads = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..16)
      .map(|_| {
        let cache = Arc::clone(&cache);
        let loads = Arc::clone(&loads);
        tokio::spawn(async move {
          let loads = &*loads;
          cache
            .get_or_load(move || async move {
              loads.fetch_add(1, Ordering::SeqCst);
              tokio::time::sleep(Duration::from_millis(50)).await;
              Ok::<_, Offline>(codes())
            })
            .await
            .unwrap()
        })
      })
      .collect();

    let mut maps = Vec::new();
    for handle in handles {
      maps.push(handle.await.unwrap());
    }

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    for map in &maps {
      assert!(Arc::ptr_eq(map, &maps[0]));
      assert_eq!(map.len(), 3);
    }
  }

  #[tokio::test]
  async fn failed_load_leaves_cache_empty_and_retries() {
    let cache = StatusCache::new();

    let err = cache.get_or_load(|| async { Err::<Vec<StatusCode>, _>(Offline) }).await;
    assert!(err.is_err());

    let counter = AtomicUsize::new(0);
    let loads = &counter;
    let map = cache
      .get_or_load(move || async move {
        loads.fetch_add(1, Ordering::SeqCst);
        Ok::<_, Offline>(codes())
      })
      .await
      .unwrap();

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(map.len(), 3);
  }

  #[tokio::test]
  async fn empty_load_is_retried() {
    let cache = StatusCache::new();
    let counter = AtomicUsize::new(0);
    let loads = &counter;

    cache
      .get_or_load(move || async move {
        loads.fetch_add(1, Ordering::SeqCst);
        Ok::<_, Offline>(Vec::new())
      })
      .await
      .unwrap();
    cache
      .get_or_load(move || async move {
        loads.fetch_add(1, Ordering::SeqCst);
        Ok::<_, Offline>(codes())
      })
      .await
      .unwrap();

    assert_eq!(counter.load(Ordering::SeqCst), 2);
  }
}
