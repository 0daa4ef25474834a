//! 网关错误类型
//!
//! 分类与全局处理策略：
//! - `AuthExpired` (401): 清除会话并跳转登录页
//! - `NotInitialized` (503): 标记后端未初始化并跳转初始化页
//! - 其余一律视为 `RequestFailed`，交由调用方在本地展示

use cbmm_shared::protocol::ValidationError;
use serde::Deserialize;

/// 后端错误响应体 `{status, msg, extras}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default, rename = "msg")]
    pub message: String,
    #[serde(default)]
    pub extras: Option<String>,
}

impl ErrorBody {
    /// 尽量解析结构化错误，失败时保留原始文本
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(raw) {
            Ok(body) if !body.message.is_empty() => body,
            _ => Self {
                message: raw.trim().to_string(),
                extras: None,
            },
        }
    }
}

impl std::fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(extras) = &self.extras {
            write!(f, " ({})", extras)?;
        }
        Ok(())
    }
}

/// 错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AuthExpired,
    NotInitialized,
    RequestFailed,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    #[error("session expired: {0}")]
    AuthExpired(ErrorBody),
    #[error("backend not initialized: {0}")]
    NotInitialized(ErrorBody),
    #[error("request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: ErrorBody },
    #[error("network error: {0}")]
    Transport(String),
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),
    #[error("invalid url: {0}")]
    Url(String),
}

impl GatewayError {
    /// 根据非 2xx 状态码构造错误
    pub fn from_status(status: u16, raw_body: &str) -> Self {
        let body = ErrorBody::parse(raw_body);
        match status {
            401 => Self::AuthExpired(body),
            503 => Self::NotInitialized(body),
            _ => Self::RequestFailed { status, body },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthExpired(_) => ErrorKind::AuthExpired,
            Self::NotInitialized(_) => ErrorKind::NotInitialized,
            _ => ErrorKind::RequestFailed,
        }
    }

    /// HTTP 状态码（传输层错误时为空）
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthExpired(_) => Some(401),
            Self::NotInitialized(_) => Some(503),
            Self::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
