//! REST 网关
//!
//! 唯一发起网络请求的组件：
//! - 为每个请求附加 `Content-Type` 与 `Authorization: Bearer <token>`
//! - 每个响应都经过 `Interceptor`（401/503 的全局副作用）
//! - 把响应体解析为强类型实体

use crate::auth::AuthState;
use crate::error::{GatewayError, GatewayResult};
use crate::init::InitState;
use crate::interceptor::Interceptor;
use crate::web::{HttpRequest, HttpTransport};
use cbmm_shared::protocol::{
    ApiRequest, ClusterAddRequest, ClusterUpdate, CloudCredentials, CloudPagination,
    CreateTokenRequest, Credentials, DeleteClusterRequest, EditClusterRequest,
    GetCloudClusterHealthRequest, GetClusterRequest, GetInitStateRequest, GetLogFileRequest,
    GetStatusCheckerResultRequest, InitStateResponse, InitializeRequest, ListCloudClustersRequest,
    ListClustersRequest, ResponseFormat, TokenResponse,
};
use cbmm_shared::{
    CONTENT_TYPE_JSON, Cluster, ClusterStatusResults, CloudClusterHealth, CloudClusterPage,
    HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE,
};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;


pub struct RestGateway<T: HttpTransport> {
    transport: T,
    base: Url,
    interceptor: Interceptor,
}

impl<T: HttpTransport> RestGateway<T> {
    /// `base` 为 API 的绝对基地址，如 `https://host/api/v1`
    pub fn new(transport: T, base: Url, interceptor: Interceptor) -> Self {
        Self {
            transport,
            base,
            interceptor,
        }
    }

    pub fn auth(&self) -> &Arc<AuthState> {
        self.interceptor.auth()
    }

    pub fn init(&self) -> &Arc<InitState> {
        self.interceptor.init()
    }

    /// 拼接请求地址，路径段与查询参数均做百分号编码
    fn endpoint<R: ApiRequest>(&self, req: &R) -> GatewayResult<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| GatewayError::Url(format!("{} cannot be a base", self.base)))?;
            segments.pop_if_empty();
            for segment in req.path() {
                segments.push(&segment);
            }
        }

        let query = req.query();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn decode<R: ApiRequest>(body: String) -> GatewayResult<R::Response> {
        let decoded = match R::FORMAT {
            ResponseFormat::Json => serde_json::from_str(&body),
            ResponseFormat::Text => serde_json::from_value(serde_json::Value::String(body)),
            ResponseFormat::Empty => serde_json::from_value(serde_json::Value::Null),
        };
        decoded.map_err(|e| GatewayError::Decode(e.to_string()))
    }

    /// 执行一个类型化请求
    ///
    /// 流程：校验 -> 构建 -> 发送 -> 拦截 -> 解析。
    /// 传输层失败（没有 HTTP 响应）不会触发拦截器。
    pub async fn execute<R: ApiRequest>(&self, req: &R) -> GatewayResult<R::Response> {
        req.validate()?;

        let url = self.endpoint(req)?;
        let token = self.auth().get_token().unwrap_or_default();
        let mut http = HttpRequest::new(url.as_str(), R::METHOD)
            .with_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON)
            .with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));

        if let Some(body) = req
            .body()
            .map_err(|e| GatewayError::Decode(format!("could not encode request body: {}", e)))?
        {
            http = http.with_body(body);
        }

        debug!(method = R::METHOD.as_str(), url = %url, "sending request");
        let response = self.transport.send(http).await.map_err(|e| {
            warn!(url = %url, error = %e, "transport failure");
            GatewayError::Transport(e.to_string())
        })?;

        let response = self.interceptor.intercept(response)?;
        Self::decode::<R>(response.body)
    }

    // =========================================================
    // 集群 (Clusters)
    // =========================================================

    pub async fn list_clusters(&self) -> GatewayResult<Vec<Cluster>> {
        self.execute(&ListClustersRequest).await
    }

    pub async fn get_cluster(&self, uuid: &str) -> GatewayResult<Cluster> {
        self.execute(&GetClusterRequest {
            uuid: uuid.to_string(),
        })
        .await
    }

    /// 获取节点日志文件的原始文本
    pub async fn get_log_file(
        &self,
        uuid: &str,
        node: &str,
        log_file: &str,
    ) -> GatewayResult<String> {
        self.execute(&GetLogFileRequest {
            uuid: uuid.to_string(),
            node: node.to_string(),
            log_file: log_file.to_string(),
        })
        .await
    }

    pub async fn register_cluster(&self, req: ClusterAddRequest) -> GatewayResult<()> {
        self.execute(&req).await
    }

    pub async fn delete_cluster(&self, uuid: &str) -> GatewayResult<()> {
        self.execute(&DeleteClusterRequest {
            uuid: uuid.to_string(),
        })
        .await
    }

    pub async fn edit_cluster(&self, uuid: &str, update: ClusterUpdate) -> GatewayResult<()> {
        self.execute(&EditClusterRequest {
            uuid: uuid.to_string(),
            update,
        })
        .await
    }

    pub async fn get_status_checker_result(
        &self,
        uuid: &str,
        checker: &str,
        node: Option<String>,
        bucket: Option<String>,
    ) -> GatewayResult<ClusterStatusResults> {
        self.execute(&GetStatusCheckerResultRequest {
            uuid: uuid.to_string(),
            checker: checker.to_string(),
            node,
            bucket,
        })
        .await
    }

    // =========================================================
    // 云端 (Cloud)
    // =========================================================

    pub async fn list_cloud_clusters(
        &self,
        pagination: CloudPagination,
    ) -> GatewayResult<CloudClusterPage> {
        self.execute(&ListCloudClustersRequest { pagination }).await
    }

    pub async fn get_cloud_cluster_health(&self, id: &str) -> GatewayResult<CloudClusterHealth> {
        self.execute(&GetCloudClusterHealthRequest { id: id.to_string() })
            .await
    }

    pub async fn add_cloud_credentials(&self, creds: CloudCredentials) -> GatewayResult<()> {
        self.execute(&creds).await
    }

    // =========================================================
    // 管理 (Self)
    // =========================================================

    pub async fn get_init_state(&self) -> GatewayResult<InitStateResponse> {
        self.execute(&GetInitStateRequest).await
    }

    pub async fn initialize(&self, credentials: Credentials) -> GatewayResult<()> {
        self.execute(&InitializeRequest { credentials }).await
    }

    pub async fn create_token(&self, credentials: Credentials) -> GatewayResult<TokenResponse> {
        self.execute(&CreateTokenRequest { credentials }).await
    }
}
