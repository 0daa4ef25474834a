//! 请求作用域
//!
//! 视图发出的每个请求都登记在一个 `RequestScope` 中。作用域取消（或被 drop）后，
//! 未完成的请求不再被轮询，其响应也就不会经过拦截器。

use futures::future::{AbortHandle, AbortRegistration, Abortable, Aborted};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// 在途请求表：请求结束、被中止或被丢弃时自行移除
#[derive(Default)]
struct Registry {
    next_id: u64,
    in_flight: HashMap<u64, InFlight>,
}

struct InFlight {
    key: Option<&'static str>,
    handle: AbortHandle,
}

impl Registry {
    fn insert(&mut self, key: Option<&'static str>, handle: AbortHandle) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.in_flight.insert(id, InFlight { key, handle });
        id
    }

    fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight.values().any(|f| f.key == Some(key))
    }
}

/// 随包装后的 future 一起存活，drop 时注销对应条目
struct Entry {
    registry: Arc<Mutex<Registry>>,
    id: u64,
}

impl Drop for Entry {
    fn drop(&mut self) {
        self.registry.lock().in_flight.remove(&self.id);
    }
}

fn wrap<F: Future>(
    entry: Entry,
    registration: AbortRegistration,
    fut: F,
) -> impl Future<Output = Result<F::Output, Aborted>> + use<F> {
    let tracked = Abortable::new(fut, registration);
    async move {
        let _entry = entry;
        tracked.await
    }
}

#[derive(Default)]
pub struct RequestScope {
    registry: Arc<Mutex<Registry>>,
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, id: u64) -> Entry {
        Entry {
            registry: Arc::clone(&self.registry),
            id,
        }
    }

    /// 登记一个 future，返回可被本作用域中止的包装
    pub fn track<F: Future>(
        &self,
        fut: F,
    ) -> impl Future<Output = Result<F::Output, Aborted>> + use<F> {
        let (handle, registration) = AbortHandle::new_pair();
        let id = self.registry.lock().insert(None, handle);
        wrap(self.entry(id), registration, fut)
    }

    /// 同一 `key` 已有请求在途时返回 `None`，不重复登记
    pub fn track_exclusive<F: Future>(
        &self,
        key: &'static str,
        fut: F,
    ) -> Option<impl Future<Output = Result<F::Output, Aborted>> + use<F>> {
        let (handle, registration) = AbortHandle::new_pair();
        let id = {
            let mut registry = self.registry.lock();
            if registry.is_in_flight(key) {
                return None;
            }
            registry.insert(Some(key), handle)
        };
        Some(wrap(self.entry(id), registration, fut))
    }

    /// 在浏览器事件循环上运行一个登记过的 future
    pub fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + 'static,
    {
        run_local(self.track(fut));
    }

    /// 与 `spawn` 相同，但同一 `key` 同时只运行一个；返回是否真正启动
    pub fn spawn_exclusive<F>(&self, key: &'static str, fut: F) -> bool
    where
        F: Future<Output = ()> + 'static,
    {
        match self.track_exclusive(key, fut) {
            Some(tracked) => {
                run_local(tracked);
                true
            }
            None => {
                debug!(key, "request already in flight, skipped");
                false
            }
        }
    }

    /// 中止所有未完成的请求
    pub fn cancel_all(&self) {
        let in_flight = std::mem::take(&mut self.registry.lock().in_flight);
        for request in in_flight.values() {
            request.handle.abort();
        }
    }

    /// 在途请求数
    pub fn tracked(&self) -> usize {
        self.registry.lock().in_flight.len()
    }
}

fn run_local(tracked: impl Future<Output = Result<(), Aborted>> + 'static) {
    leptos::task::spawn_local(async move {
        if let Err(Aborted) = tracked.await {
            debug!("request cancelled with its scope");
        }
    });
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthState;
    use crate::auth::testing::MemoryTokenStore;
    use crate::gateway::RestGateway;
    use crate::init::InitState;
    use crate::interceptor::Interceptor;
    use crate::web::route::testing::RecordingNavigator;
    use crate::web::route::{AppRoute, Location};
    use crate::web::testing::MockTransport;
    use cbmm_shared::protocol::HttpMethod;
    use url::Url;

    fn gateway() -> (Arc<RecordingNavigator>, RestGateway<MockTransport>) {
        let auth = Arc::new(AuthState::new(Arc::new(MemoryTokenStore::with_token("jwt"))));
        let nav = Arc::new(RecordingNavigator::at(Location::new(AppRoute::Clusters)));
        let interceptor = Interceptor::standard(auth, Arc::new(InitState::new()), nav.clone());
        let transport = MockTransport::new();
        transport.mock(
            HttpMethod::Get,
            "http://localhost:7196/api/v1/clusters",
            401,
            "",
        );
        let base = Url::parse("http://localhost:7196/api/v1").unwrap();
        (nav, RestGateway::new(transport, base, interceptor))
    }

    #[tokio::test]
    async fn test_completed_request_is_returned() {
        let scope = RequestScope::new();
        let value = scope.track(async { 7 }).await;
        assert_eq!(value, Ok(7));
        assert_eq!(scope.tracked(), 0);
    }

    #[tokio::test]
    async fn test_finished_requests_are_released() {
        let scope = RequestScope::new();
        for i in 0..1000 {
            assert_eq!(scope.track(async move { i }).await, Ok(i));
        }
        assert_eq!(scope.tracked(), 0);
    }

    #[test]
    fn test_pending_request_counts_until_dropped() {
        let scope = RequestScope::new();
        let first = scope.track(async {});
        let second = scope.track(async {});
        assert_eq!(scope.tracked(), 2);

        drop(first);
        assert_eq!(scope.tracked(), 1);
        drop(second);
        assert_eq!(scope.tracked(), 0);
    }

    #[tokio::test]
    async fn test_exclusive_key_skips_while_in_flight() {
        let scope = RequestScope::new();

        let refresh = scope.track_exclusive("clusters", async { 1 });
        assert!(refresh.is_some());
        assert!(scope.track_exclusive("clusters", async { 2 }).is_none());
        // 其他 key 不受影响
        assert!(scope.track_exclusive("cloud", async { 3 }).is_some());

        let first = refresh.unwrap();
        assert_eq!(first.await, Ok(1));

        let next = scope.track_exclusive("clusters", async { 4 }).unwrap();
        assert_eq!(next.await, Ok(4));
        assert_eq!(scope.tracked(), 0);
    }

    #[tokio::test]
    async fn test_exclusive_key_released_after_cancel() {
        let scope = RequestScope::new();
        let pending = scope.track_exclusive("clusters", async { 1 }).unwrap();

        scope.cancel_all();
        assert_eq!(pending.await, Err(Aborted));
        assert!(scope.track_exclusive("clusters", async { 2 }).is_some());
    }

    #[tokio::test]
    async fn test_cancelled_scope_skips_interception() {
        let (nav, gateway) = gateway();
        let scope = RequestScope::new();

        let pending = scope.track(gateway.list_clusters());
        scope.cancel_all();

        assert!(pending.await.is_err());
        assert!(gateway.auth().is_authenticated());
        assert!(nav.navigations().is_empty());
        assert_eq!(scope.tracked(), 0);
    }

    #[tokio::test]
    async fn test_dropping_scope_aborts() {
        let (nav, gateway) = gateway();
        let scope = RequestScope::new();

        let pending = scope.track(gateway.list_clusters());
        drop(scope);

        assert_eq!(pending.await, Err(Aborted));
        assert!(nav.navigations().is_empty());
    }

    #[tokio::test]
    async fn test_live_scope_lets_interception_run() {
        let (nav, gateway) = gateway();
        let scope = RequestScope::new();

        let result = scope.track(gateway.list_clusters()).await;

        assert!(matches!(result, Ok(Err(_))));
        assert!(!gateway.auth().is_authenticated());
        assert_eq!(nav.navigations(), vec![Location::new(AppRoute::Login)]);
    }
}
