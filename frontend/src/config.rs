//! 运行时配置
//!
//! 默认值为常量，构建时可通过环境变量覆盖（`option_env!`），
//! 未定义时使用默认值。

use tracing::Level;
use url::Url;

const DEFAULT_API_PREFIX: &str = cbmm_shared::API_PREFIX;
const DEFAULT_TOKEN_STORAGE_KEY: &str = "cbmm_token";
const DEFAULT_REFRESH_INTERVAL_MS: u32 = 30_000;
const DEFAULT_LOG_LEVEL: Level = Level::INFO;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid api origin `{origin}`: {reason}")]
    InvalidOrigin { origin: String, reason: String },
}

/// 控制台配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// 后端所在的源；为空时使用页面自身的源
    pub api_origin: Option<String>,
    /// API 路径前缀，如 `/api/v1`
    pub api_prefix: String,
    /// 会话 token 在 LocalStorage 中的键名
    pub token_storage_key: String,
    /// 集群列表自动刷新间隔（毫秒），0 表示关闭
    pub refresh_interval_ms: u32,
    pub log_level: Level,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_origin: None,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            token_storage_key: DEFAULT_TOKEN_STORAGE_KEY.to_string(),
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

impl ConsoleConfig {
    /// 读取构建时变量，读不到就用默认值
    pub fn from_build_env() -> Self {
        Self::from_vars(|name| match name {
            "CBMM_API_ORIGIN" => option_env!("CBMM_API_ORIGIN"),
            "CBMM_API_PREFIX" => option_env!("CBMM_API_PREFIX"),
            "CBMM_TOKEN_KEY" => option_env!("CBMM_TOKEN_KEY"),
            "CBMM_REFRESH_MS" => option_env!("CBMM_REFRESH_MS"),
            "CBMM_LOG" => option_env!("CBMM_LOG"),
            _ => None,
        })
    }

    fn from_vars<'a>(var: impl Fn(&str) -> Option<&'a str>) -> Self {
        let defaults = Self::default();
        let non_empty = |name: &str| var(name).map(str::trim).filter(|v| !v.is_empty());

        Self {
            api_origin: non_empty("CBMM_API_ORIGIN").map(str::to_string),
            api_prefix: non_empty("CBMM_API_PREFIX")
                .map(str::to_string)
                .unwrap_or(defaults.api_prefix),
            token_storage_key: non_empty("CBMM_TOKEN_KEY")
                .map(str::to_string)
                .unwrap_or(defaults.token_storage_key),
            refresh_interval_ms: non_empty("CBMM_REFRESH_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.refresh_interval_ms),
            log_level: non_empty("CBMM_LOG")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.log_level),
        }
    }

    /// 解析 API 的绝对基地址
    ///
    /// `page_origin` 为当前页面的源（如 `window.location.origin`），
    /// 仅在未配置 `api_origin` 时使用。
    pub fn base_url(&self, page_origin: &str) -> Result<Url, ConfigError> {
        let origin = self.api_origin.as_deref().unwrap_or(page_origin);
        let invalid = |reason: String| ConfigError::InvalidOrigin {
            origin: origin.to_string(),
            reason,
        };

        let mut url = Url::parse(origin).map_err(|e| invalid(e.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(invalid("cannot be a base".to_string()));
        }
        url.set_query(None);
        url.set_fragment(None);
        url.set_path(&self.api_prefix);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_vars_missing() {
        let config = ConsoleConfig::from_vars(|_| None);
        assert_eq!(config, ConsoleConfig::default());
        assert_eq!(config.api_prefix, "/api/v1");
        assert_eq!(config.token_storage_key, "cbmm_token");
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let config = ConsoleConfig::from_vars(|name| match name {
            "CBMM_API_ORIGIN" => Some("http://manager:7196"),
            "CBMM_REFRESH_MS" => Some("not-a-number"),
            "CBMM_LOG" => Some("debug"),
            "CBMM_TOKEN_KEY" => Some("  "),
            _ => None,
        });
        assert_eq!(config.api_origin.as_deref(), Some("http://manager:7196"));
        assert_eq!(config.refresh_interval_ms, DEFAULT_REFRESH_INTERVAL_MS);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.token_storage_key, DEFAULT_TOKEN_STORAGE_KEY);
    }

    #[test]
    fn test_base_url_uses_page_origin() {
        let config = ConsoleConfig::default();
        let url = config.base_url("https://console.local:8443").unwrap();
        assert_eq!(url.as_str(), "https://console.local:8443/api/v1");
    }

    #[test]
    fn test_base_url_prefers_configured_origin() {
        let config = ConsoleConfig {
            api_origin: Some("http://manager:7196/ignored?x=1".to_string()),
            ..Default::default()
        };
        let url = config.base_url("https://console.local").unwrap();
        assert_eq!(url.as_str(), "http://manager:7196/api/v1");
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        let config = ConsoleConfig::default();
        assert!(config.base_url("not a url").is_err());
        assert!(config.base_url("mailto:ops@example.com").is_err());
    }
}
