//! 初始化状态模块
//!
//! 后端未完成首次初始化（503）与认证失败（401）是两种不同的阻塞状态，
//! 此处只维护前者。

use crate::error::GatewayResult;
use crate::gateway::RestGateway;
use crate::web::HttpTransport;
use crate::web::route::{AppRoute, Location, Navigator};
use cbmm_shared::protocol::Credentials;
use parking_lot::RwLock;
use tracing::{info, warn};

/// 后端初始化状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitializationStatus {
    Initialized,
    NotInitialized,
    #[default]
    Unknown,
}

#[derive(Default)]
pub struct InitState {
    status: RwLock<InitializationStatus>,
}

impl InitState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> InitializationStatus {
        *self.status.read()
    }

    pub fn mark_initialized(&self) {
        let mut status = self.status.write();
        if *status != InitializationStatus::Initialized {
            info!("backend initialized");
            *status = InitializationStatus::Initialized;
        }
    }

    pub fn mark_not_initialized(&self) {
        *self.status.write() = InitializationStatus::NotInitialized;
    }

    /// 处理 503：标记未初始化并跳转初始化页（已在初始化页时不重复导航）
    pub fn handle_503(&self, navigator: &dyn Navigator) {
        warn!("backend reported 503, redirecting to init");
        self.mark_not_initialized();
        if navigator.current().route != AppRoute::Init {
            navigator.navigate(Location::new(AppRoute::Init));
        }
    }
}

/// 启动时查询后端初始化状态
pub async fn probe<T: HttpTransport>(gateway: &RestGateway<T>) -> GatewayResult<InitializationStatus> {
    let state = gateway.get_init_state().await?;
    let init = gateway.init();
    if state.init {
        init.mark_initialized();
    } else {
        init.mark_not_initialized();
    }
    Ok(init.is_initialized())
}

/// 执行首次初始化，成功后标记为已初始化
pub async fn initialize<T: HttpTransport>(
    gateway: &RestGateway<T>,
    credentials: Credentials,
) -> GatewayResult<()> {
    gateway.initialize(credentials).await?;
    gateway.init().mark_initialized();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::route::testing::RecordingNavigator;

    #[test]
    fn test_starts_unknown() {
        assert_eq!(InitState::new().is_initialized(), InitializationStatus::Unknown);
    }

    #[test]
    fn test_handle_503_redirects_to_init() {
        let init = InitState::new();
        let nav = RecordingNavigator::at(Location::with_query(AppRoute::Login, "next=x"));

        init.handle_503(&nav);

        assert_eq!(init.is_initialized(), InitializationStatus::NotInitialized);
        assert_eq!(nav.navigations(), vec![Location::new(AppRoute::Init)]);
    }

    #[test]
    fn test_handle_503_on_init_page_does_not_navigate() {
        let init = InitState::new();
        let nav = RecordingNavigator::at(Location::new(AppRoute::Init));

        init.handle_503(&nav);

        assert_eq!(init.is_initialized(), InitializationStatus::NotInitialized);
        assert!(nav.navigations().is_empty());
    }

    #[test]
    fn test_mark_initialized_after_503() {
        let init = InitState::new();
        init.mark_not_initialized();
        init.mark_initialized();
        assert_eq!(init.is_initialized(), InitializationStatus::Initialized);
    }
}
