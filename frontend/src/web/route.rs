//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、位置（路由 + 查询串）以及导航接口。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 首次初始化页面
    Init,
    /// 登录页面
    Login,
    /// 集群总览 (默认路由，需要认证)
    #[default]
    Clusters,
    /// 云端集群 (需要认证)
    Cloud,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/init" => Self::Init,
            "/login" => Self::Login,
            "" | "/clusters" => Self::Clusters,
            "/cloud" => Self::Cloud,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Init => "/init",
            Self::Login => "/login",
            Self::Clusters => "/clusters",
            Self::Cloud => "/cloud",
            Self::NotFound => "/404",
        }
    }

    /// 该路由是否需要后端已完成初始化（初始化页本身除外）
    pub fn requires_init(&self) -> bool {
        !matches!(self, Self::Init)
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Clusters | Self::Cloud)
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

/// 导航位置：路由加原始查询串（不含 `?`）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub route: AppRoute,
    pub query: String,
}

impl Location {
    pub fn new(route: AppRoute) -> Self {
        Self {
            route,
            query: String::new(),
        }
    }

    pub fn with_query(route: AppRoute, query: impl Into<String>) -> Self {
        Self {
            route,
            query: query.into().trim_start_matches('?').to_string(),
        }
    }

    /// 由 `pathname` 与 `search` 解析
    pub fn parse(path: &str, search: &str) -> Self {
        Self::with_query(AppRoute::from_path(path), search)
    }

    /// 可写入 History 的地址
    pub fn href(&self) -> String {
        if self.query.is_empty() {
            self.route.to_path().to_string()
        } else {
            format!("{}?{}", self.route.to_path(), self.query)
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.href())
    }
}

/// 导航接口
///
/// 核心逻辑只通过此接口指示去向，由路由服务负责具体实现。
pub trait Navigator: Send + Sync {
    /// 当前位置
    fn current(&self) -> Location;
    /// 导航到目标位置
    fn navigate(&self, target: Location);
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paths() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Clusters);
        assert_eq!(AppRoute::from_path("/clusters/"), AppRoute::Clusters);
        assert_eq!(AppRoute::from_path("/login"), AppRoute::Login);
        assert_eq!(AppRoute::from_path("/init"), AppRoute::Init);
        assert_eq!(AppRoute::from_path("/nope"), AppRoute::NotFound);
    }

    #[test]
    fn test_location_href_keeps_query() {
        let loc = Location::parse("/clusters", "?uuid=abc&tab=nodes");
        assert_eq!(loc.query, "uuid=abc&tab=nodes");
        assert_eq!(loc.href(), "/clusters?uuid=abc&tab=nodes");
        assert_eq!(Location::new(AppRoute::Login).href(), "/login");
    }

    #[test]
    fn test_route_requirements() {
        assert!(!AppRoute::Init.requires_init());
        assert!(AppRoute::Login.requires_init());
        assert!(AppRoute::NotFound.requires_init());
        assert!(!AppRoute::NotFound.requires_auth());
        assert!(!AppRoute::Login.requires_auth());
        assert!(AppRoute::Clusters.requires_auth());
        assert!(AppRoute::Cloud.requires_auth());
    }
}
