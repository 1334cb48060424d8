//! 集群身份匹配模块
//!
//! 按给定顺序遍历候选集群记录，返回第一条与目标主机及 CA 匹配的记录名称。

use tracing::{debug, trace};

use crate::models::identity::{ClusterIdentity, ClusterRecord};

/// 选出第一条匹配目标身份的集群记录
///
/// 目标与候选记录都应由 [`ClusterIdentity::new`] 从原始端点构建，
/// 保证两侧只经过一次相同的规范化。目标不带 CA 时只比较主机；
/// 带非空 CA 时候选记录必须拥有逐字节相同的 CA。
pub fn pick_cluster<'a, I>(records: I, target: &ClusterIdentity) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a ClusterRecord>,
{
    let picked = records
        .into_iter()
        .inspect(|record| trace!("比较候选集群 {}: {}", record.name, record.identity))
        .find(|record| target.matches(&record.identity))
        .map(|record| record.name.as_str());

    debug!("目标 {} 匹配结果: {:?}", target, picked);
    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, server: &str, ca: Option<&[u8]>) -> ClusterRecord {
        ClusterRecord::new(name, "secretreader", server, ca.map(<[u8]>::to_vec)).unwrap()
    }

    fn target(server: &str, ca: Option<&[u8]>) -> ClusterIdentity {
        ClusterIdentity::new(server, ca.map(<[u8]>::to_vec)).unwrap()
    }

    #[test]
    fn test_pick_by_server_and_ca() {
        let records = vec![
            record("cp-1", "https://example.com:443/", Some(&b"CA1"[..])),
            record("cp-2", "https://other.com", Some(&b"CA2"[..])),
        ];

        assert_eq!(pick_cluster(&records, &target("example.com", Some(&b"CA1"[..]))), Some("cp-1"));
        // CA 不一致时不匹配
        assert_eq!(pick_cluster(&records, &target("example.com", Some(&b"CAx"[..]))), None);
        // 未提供 CA 时只比较主机
        assert_eq!(pick_cluster(&records, &target("example.com", None)), Some("cp-1"));
    }

    #[test]
    fn test_non_default_port_is_distinct() {
        let records = vec![
            record("cp-8443", "https://example.com:8443/", Some(&b"CAx"[..])),
            record("cp-443", "https://example.com:443/", Some(&b"CAx"[..])),
        ];

        assert_eq!(pick_cluster(&records, &target("example.com:8443", Some(&b"CAx"[..]))), Some("cp-8443"));
        assert_eq!(pick_cluster(&records, &target("example.com:8443", None)), Some("cp-8443"));
        assert_eq!(pick_cluster(&records, &target("example.com", None)), Some("cp-443"));
    }

    #[test]
    fn test_first_match_wins() {
        let records = vec![
            record("first", "https://example.com", None),
            record("second", "example.com:443", None),
        ];
        assert_eq!(pick_cluster(&records, &target("https://example.com/", None)), Some("first"));
    }

    #[test]
    fn test_same_host_disambiguated_by_ca() {
        let records = vec![
            record("a", "example.com", Some(&b"CA-A"[..])),
            record("b", "example.com", Some(&b"CA-B"[..])),
        ];
        assert_eq!(pick_cluster(&records, &target("example.com", Some(&b"CA-B"[..]))), Some("b"));
    }

    #[test]
    fn test_identical_raw_servers_match() {
        let server = "https://example.com//";
        let records = vec![record("cp-1", server, None)];
        assert_eq!(pick_cluster(&records, &target(server, None)), Some("cp-1"));
    }

    #[test]
    fn test_no_records_matches_nothing() {
        let records: Vec<ClusterRecord> = Vec::new();
        assert_eq!(pick_cluster(&records, &target("example.com", None)), None);
    }
}
