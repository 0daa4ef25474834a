//! 响应拦截器
//!
//! 网关对每个响应都调用一次拦截器。拦截器按状态码查表执行全局副作用，
//! 然后把原始错误原样交还给调用方；不做任何重试。

use crate::auth::AuthState;
use crate::error::{GatewayError, GatewayResult};
use crate::init::InitState;
use crate::web::HttpResponse;
use crate::web::route::{AppRoute, Location, Navigator};
use std::sync::Arc;
use tracing::warn;

/// 状态码对应的全局动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    /// 清除会话并跳转登录页（保留当前查询串）
    ForceLogin,
    /// 标记后端未初始化并跳转初始化页
    ForceInit,
}

/// 标准的状态码动作表
pub const STATUS_ACTIONS: &[(u16, StatusAction)] = &[
    (401, StatusAction::ForceLogin),
    (503, StatusAction::ForceInit),
];

pub struct Interceptor {
    auth: Arc<AuthState>,
    init: Arc<InitState>,
    navigator: Arc<dyn Navigator>,
    table: &'static [(u16, StatusAction)],
}

impl Interceptor {
    pub fn new(
        auth: Arc<AuthState>,
        init: Arc<InitState>,
        navigator: Arc<dyn Navigator>,
        table: &'static [(u16, StatusAction)],
    ) -> Self {
        Self {
            auth,
            init,
            navigator,
            table,
        }
    }

    pub fn standard(
        auth: Arc<AuthState>,
        init: Arc<InitState>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::new(auth, init, navigator, STATUS_ACTIONS)
    }

    pub fn auth(&self) -> &Arc<AuthState> {
        &self.auth
    }

    pub fn init(&self) -> &Arc<InitState> {
        &self.init
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn action_for(&self, status: u16) -> Option<StatusAction> {
        self.table
            .iter()
            .find(|(code, _)| *code == status)
            .map(|(_, action)| *action)
    }

    /// 处理一个响应：2xx 原样放行，其余转换为错误并执行全局副作用
    pub fn intercept(&self, response: HttpResponse) -> GatewayResult<HttpResponse> {
        // 任何非 503 的响应都说明后端已完成初始化
        if response.status != 503 {
            self.init.mark_initialized();
        }

        if response.ok() {
            return Ok(response);
        }

        if let Some(action) = self.action_for(response.status) {
            self.apply(action);
        }
        Err(GatewayError::from_status(response.status, &response.body))
    }

    fn apply(&self, action: StatusAction) {
        match action {
            StatusAction::ForceLogin => {
                warn!("request unauthorized, forcing re-login");
                self.auth.log_out();
                let current = self.navigator.current();
                if current.route != AppRoute::Login {
                    self.navigator
                        .navigate(Location::with_query(AppRoute::Login, current.query));
                }
            }
            StatusAction::ForceInit => self.init.handle_503(self.navigator.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::MemoryTokenStore;
    use crate::error::ErrorKind;
    use crate::init::InitializationStatus;
    use crate::web::route::testing::RecordingNavigator;

    fn setup(at: Location) -> (Arc<RecordingNavigator>, Interceptor) {
        let auth = Arc::new(AuthState::new(Arc::new(MemoryTokenStore::with_token("jwt"))));
        let init = Arc::new(InitState::new());
        let nav = Arc::new(RecordingNavigator::at(at));
        let interceptor = Interceptor::standard(auth, init, nav.clone());
        (nav, interceptor)
    }

    fn response(status: u16) -> HttpResponse {
        HttpResponse {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_success_passes_through_and_marks_initialized() {
        let (nav, interceptor) = setup(Location::new(AppRoute::Clusters));
        assert!(interceptor.intercept(response(204)).is_ok());
        assert_eq!(
            interceptor.init().is_initialized(),
            InitializationStatus::Initialized
        );
        assert!(nav.navigations().is_empty());
    }

    #[test]
    fn test_401_logs_out_and_preserves_query() {
        let (nav, interceptor) = setup(Location::with_query(AppRoute::Clusters, "uuid=abc"));

        let err = interceptor.intercept(response(401)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AuthExpired);
        assert!(!interceptor.auth().is_authenticated());
        assert_eq!(
            nav.navigations(),
            vec![Location::with_query(AppRoute::Login, "uuid=abc")]
        );
    }

    #[test]
    fn test_401_on_login_page_does_not_navigate_again() {
        let (nav, interceptor) = setup(Location::new(AppRoute::Login));
        assert!(interceptor.intercept(response(401)).is_err());
        assert!(nav.navigations().is_empty());
    }

    #[test]
    fn test_503_marks_not_initialized() {
        let (nav, interceptor) = setup(Location::new(AppRoute::Cloud));

        let err = interceptor.intercept(response(503)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotInitialized);
        assert_eq!(
            interceptor.init().is_initialized(),
            InitializationStatus::NotInitialized
        );
        assert!(interceptor.auth().is_authenticated());
        assert_eq!(nav.navigations(), vec![Location::new(AppRoute::Init)]);
    }

    #[test]
    fn test_other_errors_have_no_side_effects() {
        let (nav, interceptor) = setup(Location::new(AppRoute::Clusters));

        let err = interceptor.intercept(response(404)).unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert!(interceptor.auth().is_authenticated());
        assert!(nav.navigations().is_empty());
    }

    #[test]
    fn test_action_table_lookup() {
        let (_, interceptor) = setup(Location::default());
        assert_eq!(interceptor.action_for(401), Some(StatusAction::ForceLogin));
        assert_eq!(interceptor.action_for(503), Some(StatusAction::ForceInit));
        assert_eq!(interceptor.action_for(500), None);
    }
}
