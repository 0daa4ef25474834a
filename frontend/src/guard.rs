//! 路由守卫
//!
//! 每个守卫只读取缓存的状态，不发起网络请求。
//! 守卫链按 [Init, Auth] 顺序执行，遇到第一个重定向即短路。

use crate::auth::AuthState;
use crate::init::{InitState, InitializationStatus};
use crate::web::route::{AppRoute, Location};
use std::sync::Arc;
use tracing::debug;

/// 守卫判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    RedirectTo {
        route: AppRoute,
        /// 是否保留目标地址的查询串
        preserve_query: bool,
    },
}

pub trait RouteGuard: Send + Sync {
    fn name(&self) -> &'static str;
    fn evaluate(&self, target: &Location) -> GuardOutcome;
}

/// 后端未初始化时，除初始化页外的所有路由都跳转初始化页
pub struct InitGuard {
    init: Arc<InitState>,
}

impl InitGuard {
    pub fn new(init: Arc<InitState>) -> Self {
        Self { init }
    }
}

impl RouteGuard for InitGuard {
    fn name(&self) -> &'static str {
        "init"
    }

    fn evaluate(&self, target: &Location) -> GuardOutcome {
        if target.route.requires_init()
            && self.init.is_initialized() == InitializationStatus::NotInitialized
        {
            return GuardOutcome::RedirectTo {
                route: AppRoute::Init,
                preserve_query: false,
            };
        }
        GuardOutcome::Allow
    }
}

/// 未认证时受保护路由跳转登录页，保留查询串以便重新登录后回到深链接
pub struct AuthGuard {
    auth: Arc<AuthState>,
}

impl AuthGuard {
    pub fn new(auth: Arc<AuthState>) -> Self {
        Self { auth }
    }
}

impl RouteGuard for AuthGuard {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn evaluate(&self, target: &Location) -> GuardOutcome {
        if target.route.requires_auth() && !self.auth.is_authenticated() {
            return GuardOutcome::RedirectTo {
                route: AppRoute::Login,
                preserve_query: true,
            };
        }
        GuardOutcome::Allow
    }
}

/// 有序守卫链
pub struct GuardChain {
    guards: Vec<Box<dyn RouteGuard>>,
}

impl GuardChain {
    pub fn new(guards: Vec<Box<dyn RouteGuard>>) -> Self {
        Self { guards }
    }

    /// 标准守卫链：先检查初始化，再检查认证
    pub fn standard(auth: Arc<AuthState>, init: Arc<InitState>) -> Self {
        Self::new(vec![
            Box::new(InitGuard::new(init)),
            Box::new(AuthGuard::new(auth)),
        ])
    }

    /// 判定目标位置，返回最终应到达的位置
    pub fn resolve(&self, target: &Location) -> Location {
        for guard in &self.guards {
            if let GuardOutcome::RedirectTo {
                route,
                preserve_query,
            } = guard.evaluate(target)
            {
                debug!(guard = guard.name(), from = %target, to = %route, "navigation vetoed");
                return if preserve_query {
                    Location::with_query(route, target.query.clone())
                } else {
                    Location::new(route)
                };
            }
        }
        target.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::MemoryTokenStore;

    fn chain(token: Option<&str>) -> (Arc<AuthState>, Arc<InitState>, GuardChain) {
        let store = match token {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::default(),
        };
        let auth = Arc::new(AuthState::new(Arc::new(store)));
        let init = Arc::new(InitState::new());
        let chain = GuardChain::standard(auth.clone(), init.clone());
        (auth, init, chain)
    }

    #[test]
    fn test_auth_guard_denies_without_token() {
        let (auth, _, chain) = chain(None);
        let target = Location::with_query(AppRoute::Clusters, "uuid=abc");

        let resolved = chain.resolve(&target);
        assert_eq!(resolved, Location::with_query(AppRoute::Login, "uuid=abc"));

        auth.set_token("jwt");
        assert_eq!(chain.resolve(&target), target);
    }

    #[test]
    fn test_init_guard_blocks_login_until_initialized() {
        let (_, init, chain) = chain(None);
        let login = Location::new(AppRoute::Login);

        init.mark_not_initialized();
        assert_eq!(chain.resolve(&login), Location::new(AppRoute::Init));

        init.mark_initialized();
        assert_eq!(chain.resolve(&login), login);
    }

    #[test]
    fn test_unknown_init_state_allows() {
        let (_, _, chain) = chain(Some("jwt"));
        let target = Location::new(AppRoute::Cloud);
        assert_eq!(chain.resolve(&target), target);
    }

    #[test]
    fn test_init_guard_runs_before_auth_guard() {
        let (_, init, chain) = chain(None);
        init.mark_not_initialized();

        let resolved = chain.resolve(&Location::with_query(AppRoute::Clusters, "a=1"));
        assert_eq!(resolved, Location::new(AppRoute::Init));
    }

    #[test]
    fn test_unknown_path_redirects_to_init_before_setup() {
        let (_, init, chain) = chain(Some("jwt"));
        let target = Location::parse("/nope", "");

        init.mark_not_initialized();
        assert_eq!(chain.resolve(&target), Location::new(AppRoute::Init));

        init.mark_initialized();
        assert_eq!(chain.resolve(&target), target);
    }

    #[test]
    fn test_init_route_is_always_reachable() {
        let (_, init, chain) = chain(None);
        init.mark_not_initialized();
        let target = Location::new(AppRoute::Init);
        assert_eq!(chain.resolve(&target), target);
    }
}
