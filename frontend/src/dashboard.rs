//! 仪表盘聚合
//!
//! 把后端返回的集群快照整理为展示用的数据，不发起请求、不修改快照。

use cbmm_shared::{BucketSummary, Cluster, StatusResults, heart_beat_message};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// 渲染层副本：附加一个展开标记，不会回写到后端
#[derive(Debug, Clone, PartialEq)]
pub struct Expandable<T> {
    pub item: T,
    pub expanded: bool,
}

impl<T> Expandable<T> {
    pub fn new(item: T) -> Self {
        Self {
            item,
            expanded: false,
        }
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    /// 批量包装，全部默认折叠
    pub fn wrap_all(items: impl IntoIterator<Item = T>) -> Vec<Self> {
        items.into_iter().map(Self::new).collect()
    }
}

/// 单个集群在列表中的一行
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterOverview {
    pub uuid: String,
    pub display_name: String,
    pub heartbeat: String,
    heartbeat_ok: bool,
    pub enterprise: bool,
    pub node_count: usize,
    pub unhealthy_nodes: usize,
    pub bucket_count: usize,
    pub last_update: DateTime<Utc>,
}

impl From<&Cluster> for ClusterOverview {
    fn from(cluster: &Cluster) -> Self {
        Self {
            uuid: cluster.uuid.clone(),
            display_name: cluster.display_name().to_string(),
            heartbeat: heart_beat_message(cluster.heart_beat_issue),
            heartbeat_ok: cluster.heartbeat().is_none_or(|issue| issue.is_healthy()),
            enterprise: cluster.enterprise,
            node_count: cluster.nodes_summary.len(),
            unhealthy_nodes: cluster
                .nodes_summary
                .iter()
                .filter(|n| !n.is_healthy())
                .count(),
            bucket_count: cluster.buckets_summary.len(),
            last_update: cluster.last_update,
        }
    }
}

impl ClusterOverview {
    /// 心跳正常且所有节点健康
    pub fn is_healthy(&self) -> bool {
        self.heartbeat_ok && self.unhealthy_nodes == 0
    }
}

/// Bucket 配额使用情况
#[derive(Debug, Clone, PartialEq)]
pub struct BucketUsage {
    pub name: String,
    /// 已用配额百分比，配额为 0 时为 0
    pub percent: f64,
    pub over_quota: bool,
}

impl From<&BucketSummary> for BucketUsage {
    fn from(bucket: &BucketSummary) -> Self {
        let percent = if bucket.quota == 0 {
            0.0
        } else {
            bucket.quota_used as f64 * 100.0 / bucket.quota as f64
        };
        Self {
            name: bucket.name.clone(),
            percent,
            over_quota: bucket.quota_used > bucket.quota,
        }
    }
}

/// 按检查器状态统计诊断结果数量
pub fn summarize_status_results(results: &[StatusResults]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for entry in results {
        *counts.entry(entry.result.status.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbmm_shared::heartbeat::MSG_BAD_AUTH;
    use serde_json::json;

    fn cluster(value: serde_json::Value) -> Cluster {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_overview_of_bad_auth_cluster() {
        let c = cluster(json!({
            "uuid": "abc",
            "name": "prod",
            "alias": "Production",
            "heart_beat_issue": 1,
            "nodes_summary": [
                { "node_uuid": "n1", "status": "healthy" },
                { "node_uuid": "n2", "status": "unhealthy" }
            ],
            "last_update": "2021-06-01T10:00:00Z"
        }));

        let overview = ClusterOverview::from(&c);

        assert_eq!(overview.display_name, "Production");
        assert_eq!(overview.heartbeat, MSG_BAD_AUTH);
        assert_eq!(overview.node_count, 2);
        assert_eq!(overview.unhealthy_nodes, 1);
        assert_eq!(overview.bucket_count, 0);
        assert!(!overview.is_healthy());
    }

    #[test]
    fn test_overview_without_heartbeat_is_healthy() {
        let c = cluster(json!({
            "uuid": "abc",
            "name": "prod",
            "nodes_summary": [{ "node_uuid": "n1", "status": "healthy" }],
            "last_update": "2021-06-01T10:00:00Z"
        }));

        let overview = ClusterOverview::from(&c);

        assert_eq!(overview.display_name, "prod");
        assert_eq!(overview.heartbeat, "");
        assert!(overview.is_healthy());
    }

    #[test]
    fn test_expandable_defaults_collapsed() {
        let mut rows = Expandable::wrap_all(vec!["n1", "n2"]);
        assert!(rows.iter().all(|r| !r.expanded));

        rows[1].toggle();
        assert!(rows[1].expanded);
        assert!(!rows[0].expanded);

        rows[1].toggle();
        assert!(!rows[1].expanded);
    }

    #[test]
    fn test_bucket_usage() {
        let bucket = BucketSummary {
            name: "travel-sample".into(),
            quota: 200,
            quota_used: 50,
            ..Default::default()
        };
        let usage = BucketUsage::from(&bucket);
        assert_eq!(usage.percent, 25.0);
        assert!(!usage.over_quota);

        let over = BucketUsage::from(&BucketSummary {
            quota: 100,
            quota_used: 150,
            ..Default::default()
        });
        assert!(over.over_quota);
        assert_eq!(over.percent, 150.0);

        let empty = BucketUsage::from(&BucketSummary::default());
        assert_eq!(empty.percent, 0.0);
        assert!(!empty.over_quota);
    }

    #[test]
    fn test_summarize_status_results() {
        let results: Vec<StatusResults> = serde_json::from_value(json!([
            { "cluster": "abc", "result": { "name": "CB90001", "status": "good", "time": "2021-06-01T10:00:00Z", "version": 1 } },
            { "cluster": "abc", "node": "n1", "result": { "name": "CB90002", "status": "warn", "time": "2021-06-01T10:00:00Z", "version": 1 } },
            { "cluster": "abc", "bucket": "b", "result": { "name": "CB90003", "status": "good", "time": "2021-06-01T10:00:00Z", "version": 1 } }
        ]))
        .unwrap();

        let counts = summarize_status_results(&results);

        assert_eq!(counts.get("good"), Some(&2));
        assert_eq!(counts.get("warn"), Some(&1));
        assert_eq!(counts.get("alert"), None);
    }
}
