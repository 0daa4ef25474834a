use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod heartbeat;
pub mod protocol;

pub use heartbeat::{HeartbeatIssue, heart_beat_message};

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const API_PREFIX: &str = "/api/v1";
pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// 节点健康时后端上报的状态值
pub const NODE_STATUS_HEALTHY: &str = "healthy";

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// 集群硬件概况
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterInfo {
    #[serde(default)]
    pub ram_quota: u64,
    #[serde(default)]
    pub ram_used: u64,
    #[serde(default)]
    pub disk_total: u64,
    #[serde(default)]
    pub disk_used: u64,
    #[serde(default)]
    pub disk_used_by_data: u64,
}

/// 单个节点的摘要信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub node_uuid: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub cluster_membership: String,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<String>,
    #[serde(default, rename = "cpuCount", skip_serializing_if = "Option::is_none")]
    pub cpu_count: Option<u32>,
}

impl NodeSummary {
    pub fn has_service(&self, service: &str) -> bool {
        self.services.iter().any(|s| s == service)
    }

    pub fn is_healthy(&self) -> bool {
        self.status == NODE_STATUS_HEALTHY
    }
}

/// Bucket 摘要
///
/// `quota_used` 在正常情况下不超过 `quota`，但客户端不做强制校验。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketSummary {
    pub name: String,
    #[serde(default)]
    pub storage_backend: String,
    #[serde(default)]
    pub quota: u64,
    #[serde(default)]
    pub quota_used: u64,
    #[serde(default)]
    pub num_replicas: u32,
    #[serde(default)]
    pub items: u64,
    #[serde(default)]
    pub bucket_type: String,
}

/// 已注册的集群
///
/// `uuid` 由后端分配且不可变；`heart_beat_issue` 缺失表示尚未进行过心跳检测。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub uuid: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    pub enterprise: bool,
    #[serde(default)]
    pub nodes_summary: Vec<NodeSummary>,
    #[serde(default)]
    pub buckets_summary: Vec<BucketSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_info: Option<ClusterInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_beat_issue: Option<i64>,
    pub last_update: DateTime<Utc>,
}

impl Cluster {
    /// 优先显示别名，否则显示集群名
    pub fn display_name(&self) -> &str {
        match self.alias.as_deref() {
            Some(alias) if !alias.trim().is_empty() => alias,
            _ => &self.name,
        }
    }

    pub fn heartbeat(&self) -> Option<HeartbeatIssue> {
        self.heart_beat_issue.map(HeartbeatIssue::from_code)
    }
}

/// 单个集群的状态聚合视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterStatusResults {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub nodes_summary: Vec<NodeSummary>,
    #[serde(default)]
    pub buckets_summary: Vec<BucketSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_beat_issue: Option<i64>,
    pub last_update: DateTime<Utc>,
}

/// 检查器的单条结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckerResult {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
    pub status: String,
    pub time: DateTime<Utc>,
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// 一条诊断结果，作用域为集群，可选地限定到节点、bucket 或日志文件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResults {
    pub cluster: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
    pub result: CheckerResult,
}

// =========================================================
// 云端集群 (Cloud)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudCluster {
    pub id: String,
    pub cloud_id: String,
    pub name: String,
    #[serde(default)]
    pub nodes: u32,
    pub project_id: String,
    #[serde(default)]
    pub services: String,
    pub tenant_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudClusterHealth {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_stats: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_stats: Option<serde_json::Value>,
}

/// 游标分页的云端集群列表，`cursor` 对客户端不透明
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudClusterPage {
    #[serde(default)]
    pub cursor: serde_json::Value,
    #[serde(default)]
    pub data: Vec<CloudCluster>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cluster_decodes_backend_payload() {
        let cluster: Cluster = serde_json::from_value(json!({
            "uuid": "abc",
            "name": "prod",
            "enterprise": true,
            "nodes_summary": [{
                "node_uuid": "n1",
                "version": "7.1.0-1234-enterprise",
                "host": "https://10.0.0.1:18091",
                "status": "healthy",
                "cluster_membership": "active",
                "services": ["kv", "n1ql"],
                "cpuCount": 8
            }],
            "heart_beat_issue": 1,
            "last_update": "2021-06-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(cluster.uuid, "abc");
        assert_eq!(cluster.heart_beat_issue, Some(1));
        assert!(cluster.buckets_summary.is_empty());
        assert!(cluster.nodes_summary[0].has_service("n1ql"));
        assert!(cluster.nodes_summary[0].is_healthy());
        assert_eq!(cluster.nodes_summary[0].cpu_count, Some(8));
    }

    #[test]
    fn test_missing_heartbeat_is_absent() {
        let cluster: Cluster = serde_json::from_value(json!({
            "uuid": "abc",
            "name": "prod",
            "last_update": "0001-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(cluster.heart_beat_issue, None);
        assert_eq!(cluster.heartbeat(), None);
    }

    #[test]
    fn test_display_name_prefers_alias() {
        let mut cluster: Cluster = serde_json::from_value(json!({
            "uuid": "abc",
            "name": "prod",
            "alias": "  ",
            "last_update": "2021-06-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(cluster.display_name(), "prod");

        cluster.alias = Some("east".to_string());
        assert_eq!(cluster.display_name(), "east");
    }

    #[test]
    fn test_cloud_cluster_uses_camel_case() {
        let page: CloudClusterPage = serde_json::from_value(json!({
            "cursor": { "pages": { "page": 1, "next": 2 } },
            "data": [{
                "id": "c1",
                "cloudId": "cloud-1",
                "name": "managed",
                "nodes": 3,
                "projectId": "p1",
                "services": "kv,index",
                "tenantId": "t1"
            }]
        }))
        .unwrap();

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].cloud_id, "cloud-1");
        assert_eq!(page.cursor["pages"]["next"], 2);
    }

    #[test]
    fn test_status_results_value_payload() {
        let result: StatusResults = serde_json::from_value(json!({
            "cluster": "abc",
            "node": "n1",
            "result": {
                "name": "CB90001",
                "status": "warn",
                "time": "2021-06-01T10:00:00Z",
                "version": 1,
                "remediation": "Upgrade the node",
                "value": { "swap": 0.8 }
            }
        }))
        .unwrap();

        assert_eq!(result.bucket, None);
        assert_eq!(result.result.remediation.as_deref(), Some("Upgrade the node"));
        assert!(result.result.value.is_some());
    }
}
