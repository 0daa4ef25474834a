//! 集群监控控制台
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `auth` / `init`: 会话与后端初始化状态
//! - `guard`: 路由守卫链
//! - `gateway` / `interceptor`: REST 访问与 401/503 全局处理
//! - `dashboard`: 集群健康数据的展示聚合
//! - `web`: 浏览器原生 API 封装（fetch、LocalStorage、History 路由）
//! - `components`: UI 组件层

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod init;
pub mod interceptor;
pub mod logging;
pub mod task;
pub mod web;

mod components {
    pub mod cloud;
    pub mod clusters;
    pub mod login;
    pub mod setup;
}

use crate::auth::AuthState;
use crate::components::cloud::CloudPage;
use crate::components::clusters::ClustersPage;
use crate::components::login::LoginPage;
use crate::components::setup::SetupPage;
use crate::config::ConsoleConfig;
use crate::gateway::RestGateway;
use crate::guard::GuardChain;
use crate::init::InitState;
use crate::interceptor::Interceptor;

use leptos::prelude::*;
use leptos::task::spawn_local;
use std::sync::Arc;
use tracing::{error, info, warn};

use web::route::AppRoute;
use web::router::{RouterOutlet, RouterService, provide_router};
use web::{FetchTransport, LocalTokenStore};

/// 应用级服务，启动时创建一次并放入 Context
pub struct Console {
    pub config: ConsoleConfig,
    pub gateway: RestGateway<FetchTransport>,
    pub router: Arc<RouterService>,
}

/// 从 Context 获取应用服务
pub fn use_console() -> Arc<Console> {
    use_context::<Arc<Console>>().expect("Console not found in context. Ensure App is mounted.")
}

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Init => view! { <SetupPage /> }.into_any(),
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Clusters => view! { <ClustersPage /> }.into_any(),
        AppRoute::Cloud => view! { <CloudPage /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"页面未找到"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

fn page_origin() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 配置与日志
    let config = ConsoleConfig::from_build_env();
    logging::init(config.log_level);

    // 2. 显式创建状态，通过 Arc 注入守卫、拦截器与网关
    let store = Arc::new(LocalTokenStore::new(config.token_storage_key.clone()));
    let auth = Arc::new(AuthState::new(store));
    let init = Arc::new(InitState::new());

    // 3. 路由服务持有守卫链，同时作为拦截器的导航器
    let router = provide_router(Arc::new(GuardChain::standard(auth.clone(), init.clone())));
    let interceptor = Interceptor::standard(auth, init, router.clone());

    let base = match config.base_url(&page_origin()) {
        Ok(base) => base,
        Err(e) => {
            error!(error = %e, "invalid api base url");
            return view! {
                <div role="alert" class="alert alert-error m-8">
                    <span>{e.to_string()}</span>
                </div>
            }
            .into_any();
        }
    };
    info!(api = %base, "console starting");

    let console = Arc::new(Console {
        config,
        gateway: RestGateway::new(FetchTransport, base, interceptor),
        router,
    });
    provide_context(console.clone());

    // 4. 探测后端初始化状态，完成后重新判定当前路由
    spawn_local(async move {
        if let Err(e) = init::probe(&console.gateway).await {
            warn!(error = %e, "init state probe failed");
        }
        console.router.revalidate();
    });

    view! { <RouterOutlet matcher=route_matcher /> }.into_any()
}
