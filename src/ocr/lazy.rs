//! # 지연 초기화 워커 핸들
//!
//! 비용이 큰 워커를 첫 사용 시점에 한 번만 만들고, 이후 호출에서 재사용합니다.
//!
//! - 동시에 들어온 첫 호출들은 하나의 초기화로 합쳐지고, 모두 같은 결과를 기다립니다.
//! - 초기화가 실패하면 셀은 비어 있는 채로 남아 다음 호출이 다시 시도합니다.
//! - `take()`로 워커를 명시적으로 해제할 수 있고, 다음 호출은 새 워커를 만듭니다.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};

pub struct LazyWorker<W> {
    /// 해제(take) 시 셀 자체를 새 것으로 바꾸기 위해 RwLock으로 감쌉니다.
    cell: RwLock<Arc<OnceCell<Arc<W>>>>,
}

impl<W> Default for LazyWorker<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> LazyWorker<W> {
    pub fn new() -> Self {
        Self {
            cell: RwLock::new(Arc::new(OnceCell::new())),
        }
    }

    /// 워커를 반환합니다. 아직 없으면 `init`으로 만듭니다.
    pub async fn get_or_try_init<F, Fut, E>(&self, init: F) -> Result<Arc<W>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<W, E>>,
    {
        // 읽기 잠금은 셀을 복제하는 동안만 잡습니다. 초기화 대기 중에 take()를 막지 않습니다.
        let cell = self.cell.read().await.clone();
        let worker = cell
            .get_or_try_init(|| async move { init().await.map(Arc::new) })
            .await?;
        Ok(worker.clone())
    }

    pub async fn is_initialized(&self) -> bool {
        self.cell.read().await.initialized()
    }

    /// 현재 워커를 떼어내 반환합니다. 초기화된 적이 없으면 None
    pub async fn take(&self) -> Option<Arc<W>> {
        let mut guard = self.cell.write().await;
        let previous = std::mem::replace(&mut *guard, Arc::new(OnceCell::new()));
        previous.get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn concurrent_first_use_initializes_once() {
        let lazy = Arc::new(LazyWorker::<usize>::new());
        let inits = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let lazy = lazy.clone();
            let inits = inits.clone();
            handles.push(tokio::spawn(async move {
                lazy.get_or_try_init(|| async {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok::<_, String>(inits.fetch_add(1, Ordering::SeqCst) + 1)
                })
                .await
                .unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(*handle.await.unwrap(), 1);
        }
        assert_eq!(inits.load(Ordering::SeqCst), 1);
        assert!(lazy.is_initialized().await);
    }

    #[tokio::test]
    async fn failed_init_is_retried() {
        let lazy = LazyWorker::<&'static str>::new();

        let err = lazy
            .get_or_try_init(|| async { Err::<&'static str, _>("not installed") })
            .await
            .unwrap_err();
        assert_eq!(err, "not installed");
        assert!(!lazy.is_initialized().await);

        let worker = lazy
            .get_or_try_init(|| async { Ok::<_, &'static str>("ready") })
            .await
            .unwrap();
        assert_eq!(*worker, "ready");
    }

    #[tokio::test]
    async fn take_releases_and_next_use_reinitializes() {
        let lazy = LazyWorker::<u32>::new();
        assert!(lazy.take().await.is_none());

        lazy.get_or_try_init(|| async { Ok::<_, ()>(1) }).await.unwrap();
        assert_eq!(lazy.take().await.as_deref(), Some(&1));
        assert!(!lazy.is_initialized().await);

        let again = lazy.get_or_try_init(|| async { Ok::<_, ()>(2) }).await.unwrap();
        assert_eq!(*again, 2);
    }
}
