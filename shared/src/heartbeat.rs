//! 心跳问题编码
//!
//! 后端周期性检查每个已注册集群，结果以整数编码挂在 `Cluster::heart_beat_issue` 上。

use std::fmt::Display;

pub const MSG_NO_ISSUE: &str = "none";
pub const MSG_BAD_AUTH: &str = "The user and password given are no longer valid or do not have the required permissions. \
Please update them.";
pub const MSG_NO_CONNECTION: &str = "Could not establish connection with the cluster during last heartbeat. \
Please check the cluster is still online.";
pub const MSG_UUID_MISMATCH: &str =
    "The given host no longer points to the same cluster. The cluster UUID has changed.";

/// 心跳问题枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatIssue {
    /// 0: 正常
    None,
    /// 1: 凭据失效或权限不足
    BadAuth,
    /// 2: 上次心跳无法连接
    NoConnection,
    /// 3: 主机指向的集群 UUID 已变更
    UuidMismatch,
    /// 未知编码，原样保留
    Unknown(i64),
}

impl HeartbeatIssue {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::None,
            1 => Self::BadAuth,
            2 => Self::NoConnection,
            3 => Self::UuidMismatch,
            other => Self::Unknown(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::None => 0,
            Self::BadAuth => 1,
            Self::NoConnection => 2,
            Self::UuidMismatch => 3,
            Self::Unknown(code) => *code,
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn message(&self) -> String {
        match self {
            Self::None => MSG_NO_ISSUE.to_string(),
            Self::BadAuth => MSG_BAD_AUTH.to_string(),
            Self::NoConnection => MSG_NO_CONNECTION.to_string(),
            Self::UuidMismatch => MSG_UUID_MISMATCH.to_string(),
            Self::Unknown(code) => format!("Unknown heart beat issue - {}.", code),
        }
    }
}

impl From<i64> for HeartbeatIssue {
    fn from(code: i64) -> Self {
        Self::from_code(code)
    }
}

impl Display for HeartbeatIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// 将可选的心跳编码映射为面向用户的文本
///
/// 对所有整数都有定义，从不 panic；缺失编码返回空字符串。
pub fn heart_beat_message(issue: Option<i64>) -> String {
    issue
        .map(|code| HeartbeatIssue::from_code(code).message())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_code_is_empty() {
        assert_eq!(heart_beat_message(None), "");
    }

    #[test]
    fn test_known_codes() {
        assert_eq!(heart_beat_message(Some(0)), "none");
        assert_eq!(heart_beat_message(Some(1)), MSG_BAD_AUTH);
        assert_eq!(heart_beat_message(Some(2)), MSG_NO_CONNECTION);
        assert_eq!(heart_beat_message(Some(3)), MSG_UUID_MISMATCH);
    }

    #[test]
    fn test_unknown_codes_are_total() {
        for code in [4, 5, 42, -1, i64::MAX, i64::MIN] {
            assert_eq!(
                heart_beat_message(Some(code)),
                format!("Unknown heart beat issue - {}.", code)
            );
        }
    }

    #[test]
    fn test_code_roundtrip_through_enum() {
        for code in [0, 1, 2, 3, 9] {
            assert_eq!(HeartbeatIssue::from_code(code).code(), code);
        }
        assert!(HeartbeatIssue::from(0).is_healthy());
        assert!(!HeartbeatIssue::from(2).is_healthy());
    }
}
