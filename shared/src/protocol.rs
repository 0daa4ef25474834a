use crate::{Cluster, ClusterStatusResults, CloudClusterHealth, CloudClusterPage};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

/// 响应体的解析方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// JSON 反序列化为 `Response`
    Json,
    /// 原始文本，`Response` 为 `String`
    Text,
    /// 忽略响应体，`Response` 为 `()`
    Empty,
}

// =========================================================
// 校验 (Validation)
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("field `{0}` must not be empty")]
    MissingField(&'static str),
    #[error("at least one of [{0}] is required")]
    EmptyUpdate(&'static str),
    #[error("field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
///
/// 路径以段的形式给出（相对于 API 前缀），由网关负责百分号编码。
pub trait ApiRequest {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// How the response body is decoded.
    const FORMAT: ResponseFormat = ResponseFormat::Json;

    /// Path segments after the API prefix.
    fn path(&self) -> Vec<String>;

    /// Query pairs, empty by default.
    fn query(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// JSON request body, none by default.
    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        Ok(None)
    }

    /// Structural checks run before the request reaches the network.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

// =========================================================
// Payloads
// =========================================================

/// 注册新集群
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterAddRequest {
    pub host: String,
    pub user: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<String>,
}

/// 集群的部分更新，只序列化出现的字段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<String>,
}

impl ClusterUpdate {
    pub fn is_empty(&self) -> bool {
        self.host.is_none()
            && self.user.is_none()
            && self.password.is_none()
            && self.alias.is_none()
            && self.ca_cert.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudCredentials {
    pub name: String,
    pub access_key: String,
    pub secret_key: String,
}

/// 云端集群分页参数，只发送出现的字段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudPagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl CloudPagination {
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            cursor: None,
        }
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            pairs.push(("perPage".to_string(), per_page.to_string()));
        }
        if let Some(cursor) = &self.cursor {
            pairs.push(("cursor".to_string(), cursor.clone()));
        }
        pairs
    }
}

/// 登录或首次初始化使用的管理员凭据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    fn check(&self) -> Result<(), ValidationError> {
        require("user", &self.user)?;
        require("password", &self.password)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitStateResponse {
    pub init: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

// =========================================================
// Request Definitions
// =========================================================

fn segments<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

/// List all clusters
#[derive(Debug, Clone)]
pub struct ListClustersRequest;

impl ApiRequest for ListClustersRequest {
    type Response = Vec<Cluster>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> Vec<String> {
        segments(["clusters"])
    }
}

#[derive(Debug, Clone)]
pub struct GetClusterRequest {
    pub uuid: String,
}

impl ApiRequest for GetClusterRequest {
    type Response = Cluster;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> Vec<String> {
        segments(["clusters", self.uuid.as_str()])
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("uuid", &self.uuid)
    }
}

/// Fetch a node log file as raw text
#[derive(Debug, Clone)]
pub struct GetLogFileRequest {
    pub uuid: String,
    pub node: String,
    pub log_file: String,
}

impl ApiRequest for GetLogFileRequest {
    type Response = String;
    const METHOD: HttpMethod = HttpMethod::Get;
    const FORMAT: ResponseFormat = ResponseFormat::Text;

    fn path(&self) -> Vec<String> {
        segments([
            "clusters",
            self.uuid.as_str(),
            "nodes",
            self.node.as_str(),
            "logs",
            self.log_file.as_str(),
        ])
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("uuid", &self.uuid)?;
        require("node", &self.node)?;
        require("log_file", &self.log_file)
    }
}

impl ApiRequest for ClusterAddRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;
    const FORMAT: ResponseFormat = ResponseFormat::Empty;

    fn path(&self) -> Vec<String> {
        segments(["clusters"])
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        serde_json::to_string(self).map(Some)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("host", &self.host)?;
        require("user", &self.user)?;
        require("password", &self.password)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteClusterRequest {
    pub uuid: String,
}

impl ApiRequest for DeleteClusterRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    const FORMAT: ResponseFormat = ResponseFormat::Empty;

    fn path(&self) -> Vec<String> {
        segments(["clusters", self.uuid.as_str()])
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("uuid", &self.uuid)
    }
}

#[derive(Debug, Clone)]
pub struct EditClusterRequest {
    pub uuid: String,
    pub update: ClusterUpdate,
}

impl ApiRequest for EditClusterRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Patch;
    const FORMAT: ResponseFormat = ResponseFormat::Empty;

    fn path(&self) -> Vec<String> {
        segments(["clusters", self.uuid.as_str()])
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        serde_json::to_string(&self.update).map(Some)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("uuid", &self.uuid)?;
        if self.update.is_empty() {
            return Err(ValidationError::EmptyUpdate("host, user, password, alias, ca_cert"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListCloudClustersRequest {
    pub pagination: CloudPagination,
}

impl ApiRequest for ListCloudClustersRequest {
    type Response = CloudClusterPage;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> Vec<String> {
        segments(["cloud", "clusters"])
    }

    fn query(&self) -> Vec<(String, String)> {
        self.pagination.to_query()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.pagination.per_page == Some(0) {
            return Err(ValidationError::InvalidField {
                field: "per_page",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct GetCloudClusterHealthRequest {
    pub id: String,
}

impl ApiRequest for GetCloudClusterHealthRequest {
    type Response = CloudClusterHealth;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> Vec<String> {
        segments(["cloud", "clusters", self.id.as_str()])
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("id", &self.id)
    }
}

impl ApiRequest for CloudCredentials {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;
    const FORMAT: ResponseFormat = ResponseFormat::Empty;

    fn path(&self) -> Vec<String> {
        segments(["cloud", "credentials"])
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        serde_json::to_string(self).map(Some)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("access_key", &self.access_key)?;
        require("secret_key", &self.secret_key)
    }
}

/// Get backend initialization state
#[derive(Debug, Clone)]
pub struct GetInitStateRequest;

impl ApiRequest for GetInitStateRequest {
    type Response = InitStateResponse;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> Vec<String> {
        segments(["self"])
    }
}

/// First-time backend initialization
#[derive(Debug, Clone)]
pub struct InitializeRequest {
    pub credentials: Credentials,
}

impl ApiRequest for InitializeRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;
    const FORMAT: ResponseFormat = ResponseFormat::Empty;

    fn path(&self) -> Vec<String> {
        segments(["self"])
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        serde_json::to_string(&self.credentials).map(Some)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.credentials.check()
    }
}

/// Exchange credentials for a session token
#[derive(Debug, Clone)]
pub struct CreateTokenRequest {
    pub credentials: Credentials,
}

impl ApiRequest for CreateTokenRequest {
    type Response = TokenResponse;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> Vec<String> {
        segments(["self", "token"])
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        serde_json::to_string(&self.credentials).map(Some)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.credentials.check()
    }
}

/// Result of a named checker, optionally scoped to a node or bucket
#[derive(Debug, Clone)]
pub struct GetStatusCheckerResultRequest {
    pub uuid: String,
    pub checker: String,
    pub node: Option<String>,
    pub bucket: Option<String>,
}

impl ApiRequest for GetStatusCheckerResultRequest {
    type Response = ClusterStatusResults;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> Vec<String> {
        segments([
            "clusters",
            self.uuid.as_str(),
            "status",
            self.checker.as_str(),
        ])
    }

    fn query(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(node) = &self.node {
            pairs.push(("node".to_string(), node.clone()));
        }
        if let Some(bucket) = &self.bucket {
            pairs.push(("bucket".to_string(), bucket.clone()));
        }
        pairs
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("uuid", &self.uuid)?;
        require("checker", &self.checker)
    }
}
