//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，所有对 window.history 的操作都集中在此模块。
//! 导航流程："请求 -> 守卫链 -> 写入 History -> 更新信号"。

use leptos::prelude::*;
use std::sync::Arc;
use tracing::info;
use wasm_bindgen::prelude::*;

use super::route::{AppRoute, Location, Navigator};
use crate::guard::GuardChain;

/// 获取当前浏览器位置（路径 + 查询串）
fn current_location() -> Location {
    let location = web_sys::window().map(|w| w.location());
    let path = location
        .as_ref()
        .and_then(|l| l.pathname().ok())
        .unwrap_or_else(|| "/".to_string());
    let search = location
        .as_ref()
        .and_then(|l| l.search().ok())
        .unwrap_or_default();
    Location::parse(&path, &search)
}

/// 推送 History 状态（内部工具函数）
fn push_history_state(href: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(href));
        }
    }
}

/// 替换 History 状态（内部工具函数，用于重定向）
fn replace_history_state(href: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(href));
        }
    }
}

/// 路由器服务
///
/// 通过 Signal 驱动界面更新；守卫链由外部注入，与认证、初始化状态解耦。
pub struct RouterService {
    current: RwSignal<Location>,
    guards: Arc<GuardChain>,
}

impl RouterService {
    fn new(guards: Arc<GuardChain>) -> Self {
        let requested = current_location();
        let initial = guards.resolve(&requested);
        if initial != requested {
            replace_history_state(&initial.href());
        }

        Self {
            current: RwSignal::new(initial),
            guards,
        }
    }

    /// 当前路由（响应式）
    pub fn current_route(&self) -> AppRoute {
        self.current.with(|loc| loc.route.clone())
    }

    /// 当前位置（响应式）
    pub fn location(&self) -> Location {
        self.current.get()
    }

    /// 经守卫链判定后写入 History
    ///
    /// `use_push` 为 false 时使用 replaceState。
    fn go(&self, target: Location, use_push: bool) {
        let resolved = self.guards.resolve(&target);
        if resolved != target {
            info!(from = %target, to = %resolved, "navigation redirected");
        }

        let href = resolved.href();
        if use_push && resolved != self.current.get_untracked() {
            push_history_state(&href);
        } else {
            replace_history_state(&href);
        }
        self.current.set(resolved);
    }

    /// 状态变化（如启动探测完成）后重新判定当前位置
    pub fn revalidate(&self) {
        let here = self.current.get_untracked();
        if self.guards.resolve(&here) != here {
            self.go(here, false);
        }
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(self: &Arc<Self>) {
        let router = Arc::clone(self);

        let closure = Closure::<dyn Fn()>::new(move || {
            // popstate 时也执行守卫逻辑
            router.go(current_location(), false);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }
}

impl Navigator for RouterService {
    fn current(&self) -> Location {
        self.current.get_untracked()
    }

    fn navigate(&self, target: Location) {
        self.go(target, true);
    }
}

/// 创建路由服务、注册监听并放入 Context
pub fn provide_router(guards: Arc<GuardChain>) -> Arc<RouterService> {
    let router = Arc::new(RouterService::new(guards));
    router.init_popstate_listener();
    provide_context(Arc::clone(&router));
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> Arc<RouterService> {
    use_context::<Arc<RouterService>>()
        .expect("RouterService not found in context. Ensure provide_router was called.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || matcher(router.current_route())
}
