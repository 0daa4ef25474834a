//! 认证模块
//!
//! 管理会话 token，与路由系统解耦。
//! 路由守卫与 REST 网关通过注入的 `AuthState` 读取认证状态。

use crate::error::GatewayResult;
use crate::gateway::RestGateway;
use crate::web::HttpTransport;
use crate::web::route::{AppRoute, Location, Navigator};
use cbmm_shared::protocol::Credentials;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 会话 token 的持久化存储
///
/// `save` 与 `clear` 返回写入是否成功。
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> bool;
    fn clear(&self) -> bool;
}

/// 认证状态
///
/// 启动时创建一次，通过 `Arc` 注入网关与守卫。
/// token 为空字符串时视为不存在。
pub struct AuthState {
    store: Arc<dyn TokenStore>,
    token: RwLock<Option<String>>,
}

impl AuthState {
    /// 创建认证状态，并从存储中恢复上次的 token
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let token = store.load().filter(|t| !t.is_empty());
        debug!(restored = token.is_some(), "auth state created");
        Self {
            store,
            token: RwLock::new(token),
        }
    }

    pub fn get_token(&self) -> Option<String> {
        self.token.read().clone()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        if token.is_empty() {
            self.log_out();
            return;
        }
        if !self.store.save(&token) {
            warn!("could not persist session token");
        }
        *self.token.write() = Some(token);
    }

    /// 清除 token，可重复调用
    pub fn log_out(&self) {
        let had_token = self.token.write().take().is_some();
        if !self.store.clear() {
            // 持久化的 token 在刷新页面后会被重新加载
            warn!("could not clear persisted session token");
        }
        if had_token {
            info!("session cleared");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().is_some()
    }
}

/// 登录并保存 token
///
/// 凭据校验失败或后端拒绝时返回原始错误，状态不变。
pub async fn login<T: HttpTransport>(
    gateway: &RestGateway<T>,
    credentials: Credentials,
) -> GatewayResult<()> {
    let user = credentials.user.clone();
    let response = gateway.create_token(credentials).await?;
    gateway.auth().set_token(response.token);
    info!(%user, "logged in");
    Ok(())
}

/// 注销并跳转登录页
pub fn logout(auth: &AuthState, navigator: &dyn Navigator) {
    auth.log_out();
    if navigator.current().route != AppRoute::Login {
        navigator.navigate(Location::new(AppRoute::Login));
    }
}
