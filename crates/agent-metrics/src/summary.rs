//! Summary Engine (C7): given a metric code and its opaque JSON blob,
//! produce the one-line human-readable summary spec.md §6 calls the
//! external contract.
//!
//! Dispatch is modeled as a closed enum (spec.md §9's design-note
//! resolution for "dynamic typing at the summary boundary") rather than a
//! raw string match, so an unrecognized code is a parse failure at one
//! call site instead of a silently-missed match arm.

use std::collections::BTreeMap;

use crate::error::{Result, SummaryError};
use crate::model::{
    ArpInfo, CpuInfo, CronTaskData, DiskData, EventLogInfo, FileModifyData, FirewallStatus, HttpPacketData, LoginInfo,
    MemInfo, NetInfo, NetRecvInfo, NetSendInfo, PortInfo, ProcessInfo, RdpLog, SoftwareData, SshInfo, SystemData,
    UserInfo,
};
use crate::MetricsHostInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsCode {
    Pc1,
    Pc2,
    Pc3,
    Pc4,
    Pc5,
    Pc6,
    Pc7,
    Pc9,
    Pc10,
    Pc11,
    Pc12,
    Pc13,
    Pc14,
    Pc15,
    Pc16,
    Pc18,
    Pc19,
    Pc20,
    Pc21,
    Pc22,
    Pc23,
}

impl MetricsCode {
    /// `PC8` and `PC17` parse to `None` deliberately: neither has a summary
    /// shape in the source (see `agent_metrics::model`), so they fall
    /// through to the same "unknown code" path as a code this core has
    /// never heard of.
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "PC1" => Some(Self::Pc1),
            "PC2" => Some(Self::Pc2),
            "PC3" => Some(Self::Pc3),
            "PC4" => Some(Self::Pc4),
            "PC5" => Some(Self::Pc5),
            "PC6" => Some(Self::Pc6),
            "PC7" => Some(Self::Pc7),
            "PC9" => Some(Self::Pc9),
            "PC10" => Some(Self::Pc10),
            "PC11" => Some(Self::Pc11),
            "PC12" => Some(Self::Pc12),
            "PC13" => Some(Self::Pc13),
            "PC14" => Some(Self::Pc14),
            "PC15" => Some(Self::Pc15),
            "PC16" => Some(Self::Pc16),
            "PC18" => Some(Self::Pc18),
            "PC19" => Some(Self::Pc19),
            "PC20" => Some(Self::Pc20),
            "PC21" => Some(Self::Pc21),
            "PC22" => Some(Self::Pc22),
            "PC23" => Some(Self::Pc23),
            _ => None,
        }
    }
}

fn firewall_status_label(status: bool) -> &'static str {
    if status {
        "开启"
    } else {
        "关闭"
    }
}

fn reserialize(metrics_code: &str, data: &serde_json::Value) -> Result<Vec<u8>> {
    serde_json::to_vec(data).map_err(|source| SummaryError::Reserialize { metrics_code: metrics_code.into(), source })
}

fn decode<T: serde::de::DeserializeOwned>(metrics_code: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|source| SummaryError::ShapeMismatch { metrics_code: metrics_code.into(), source })
}

/// Produces the summary for one completed metrics record. `record.summary`
/// is not consulted; the return value is the summary a caller should
/// store.
pub fn get_summary(record: &MetricsHostInfo) -> Result<String> {
    let code_str = record.metrics_code.as_str();
    let Some(code) = MetricsCode::parse(code_str) else {
        return Ok(format!("未知指标类型: {code_str}"));
    };

    let bytes = reserialize(code_str, &record.metrics_data)?;

    let summary = match code {
        MetricsCode::Pc1 => {
            let info: SystemData = decode(code_str, &bytes)?;
            format!("操作系统:{}，版本: {}", info.manufacture, info.system_description)
        }
        MetricsCode::Pc2 => {
            let nets: Vec<NetInfo> = decode(code_str, &bytes)?;
            if nets.is_empty() {
                return Ok("未查询到网卡信息".to_string());
            }
            let ipv4: Vec<&str> =
                nets.iter().map(|n| n.ipv4.as_str()).filter(|ip| !ip.is_empty() && *ip != "127.0.0.1").collect();
            format!("共{}个网卡，IP分别为{}", nets.len(), format_go_slice(&ipv4))
        }
        MetricsCode::Pc3 => {
            let procs: Vec<ProcessInfo> = decode(code_str, &bytes)?;
            if procs.is_empty() {
                return Ok("未查询到进程信息".to_string());
            }
            let (cpu, mem) = procs.iter().fold((0.0, 0.0), |(cpu, mem), p| (cpu + p.cpu_use_rate, mem + p.memory_use_rate));
            format!("共{}个进程，共占用{:.2}% CPU、{:.2} MB 内存", procs.len(), cpu, mem)
        }
        MetricsCode::Pc4 => {
            let ports: Vec<PortInfo> = decode(code_str, &bytes)?;
            if ports.is_empty() {
                return Ok("未开放端口".to_string());
            }
            let first_three: Vec<String> = ports.iter().take(3).map(|p| format!("{}:{}", p.listen_addr, p.port)).collect();
            format!("共开放{}个端口，包括：{} 等", ports.len(), first_three.join("、"))
        }
        MetricsCode::Pc5 => {
            let arp: Vec<ArpInfo> = decode(code_str, &bytes)?;
            if arp.is_empty() {
                return Ok("有过网络连接的IP：无".to_string());
            }
            let ips: Vec<&str> = arp.iter().take(3).map(|a| a.cache_ip.as_str()).collect();
            format!("有过网络连接的IP：{}等", ips.join("、"))
        }
        MetricsCode::Pc6 => {
            let users: Vec<UserInfo> = decode(code_str, &bytes)?;
            if users.is_empty() {
                return Ok("未查询到用户信息".to_string());
            }
            let names: Vec<&str> = users.iter().take(3).filter(|u| !u.name.is_empty()).map(|u| u.name.as_str()).collect();
            format!("共{}个用户，包括：{}等", users.len(), names.join("、"))
        }
        MetricsCode::Pc7 => {
            let file: FileModifyData = decode(code_str, &bytes)?;
            let operate = match file.operate.as_str() {
                "create" => "创建",
                "write" => "写入",
                "remove" => "删除",
                "rename" => "重命名",
                "chmod" => "修改权限",
                _ => "",
            };
            format!("文件 [{}] 被{}", file.file_name, operate)
        }
        MetricsCode::Pc9 => {
            let tasks: Vec<CronTaskData> = decode(code_str, &bytes)?;
            if tasks.is_empty() {
                return Ok("未查询到定时任务".to_string());
            }
            let names: Vec<&str> =
                tasks.iter().take(3).filter(|t| !t.task_name.is_empty()).map(|t| t.task_name.as_str()).collect();
            format!("{}个定时任务，包括：{}等", tasks.len(), names.join("、"))
        }
        MetricsCode::Pc10 => {
            let logins: Vec<LoginInfo> = decode(code_str, &bytes)?;
            let login_count = logins.len();
            // BTreeMap keeps this deterministic (ordered by log_type), unlike
            // the source's Go map iteration order.
            let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
            for login in &logins {
                *counts.entry(login.log_type).or_insert(0) += 1;
            }
            let mut summary = String::new();
            for (log_type, count) in counts {
                summary.push_str(&format!("{count}种登录方式（类型 {log_type}: {count} 次），"));
            }
            format!("{login_count}个用户登录，{summary}")
        }
        MetricsCode::Pc11 => "探针心跳".to_string(),
        MetricsCode::Pc12 => {
            let cpu: CpuInfo = decode(code_str, &bytes)?;
            format!("CPU使用率：{:.2}%", cpu.cpu_use_rate)
        }
        MetricsCode::Pc13 => {
            let disk: DiskData = decode(code_str, &bytes)?;
            format!("磁盘使用率：{:.2}%", disk.used_percent)
        }
        MetricsCode::Pc14 => {
            let mem: MemInfo = decode(code_str, &bytes)?;
            format!("内存使用率：{:.2}%", mem.memory_use_rate)
        }
        MetricsCode::Pc15 => {
            let nets: Vec<NetSendInfo> = decode(code_str, &bytes)?;
            let entries: Vec<String> = nets
                .iter()
                .filter(|n| n.packets_sent != 0 || n.bytes_sent_rate != 0)
                .map(|n| format!("网卡[ {} ]发包速率: {:.2} KB/s, 发包数: {}", n.name, n.bytes_sent_rate as f64, n.packets_sent))
                .collect();
            if entries.is_empty() {
                return Ok("网卡发包速率为 0KB/s".to_string());
            }
            entries.join("、")
        }
        MetricsCode::Pc16 => {
            let nets: Vec<NetRecvInfo> = decode(code_str, &bytes)?;
            let entries: Vec<String> = nets
                .iter()
                .filter(|n| n.packets_recv != 0 || n.bytes_recv_rate != 0)
                .map(|n| format!("网卡[ {} ]收包速率: {:.2} KB/s, 收包数: {}", n.name, n.bytes_recv_rate as f64, n.packets_recv))
                .collect();
            if entries.is_empty() {
                return Ok("网卡收包速率为 0KB/s".to_string());
            }
            entries.join("、")
        }
        MetricsCode::Pc18 => {
            let software: Vec<SoftwareData> = decode(code_str, &bytes)?;
            let names: Vec<&str> = software.iter().take(3).map(|s| s.display_name.as_str()).collect();
            if names.is_empty() {
                "未安装三方软件".to_string()
            } else {
                format!("共{}个软件，包括：{}等", software.len(), names.join("、"))
            }
        }
        MetricsCode::Pc19 => {
            let firewalls: Vec<FirewallStatus> = decode(code_str, &bytes)?;
            let mut summary = String::new();
            for fw in &firewalls {
                let label = match fw.firewall_name.as_str() {
                    "domainProfile" => "域防火墙",
                    "privateProfile" => "专用防火墙",
                    "publicProfile" => "公用防火墙",
                    other => other,
                };
                summary.push_str(&format!("{label}: {}", firewall_status_label(fw.status)));
            }
            summary
        }
        MetricsCode::Pc20 => {
            // Supplemented: present in the data model but never wired into
            // the source dispatcher. Summarizes the captured request line.
            let http: HttpPacketData = decode(code_str, &bytes)?;
            format!("HTTP {} {} -> {}", http.request.method, http.request.url, http.response.payload)
        }
        MetricsCode::Pc21 => {
            let ssh: Vec<SshInfo> = decode(code_str, &bytes)?;
            let ips: Vec<&str> = ssh.iter().take(3).map(|s| s.client_ip.as_str()).collect();
            format!("有过SSH连接的IP：{}等", ips.join("、"))
        }
        MetricsCode::Pc22 => {
            let rdp: Vec<RdpLog> = decode(code_str, &bytes)?;
            let servers: Vec<&str> = rdp.iter().take(3).map(|r| r.server.as_str()).collect();
            format!("有过RDP连接的IP：{}等", servers.join("、"))
        }
        MetricsCode::Pc23 => {
            let events: Vec<EventLogInfo> = decode(code_str, &bytes)?;
            if events.is_empty() {
                return Ok("无日志信息".to_string());
            }
            format!("共采集到 {} 条日志信息，最近一条日志：{}", events.len(), events[0].message)
        }
    };

    Ok(summary)
}

/// Mirrors Go's `%v` formatting of a `[]string` (`[a b c]`), since PC2's
/// summary template in spec.md §6 is defined against that representation.
fn format_go_slice(items: &[&str]) -> String {
    format!("[{}]", items.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(code: &str, data: serde_json::Value) -> MetricsHostInfo {
        MetricsHostInfo {
            kvm_id: "kvm-1".into(),
            metrics_code: code.into(),
            metrics_name: "test".into(),
            metrics_type: "push".into(),
            summary: String::new(),
            metrics_data: data,
            level: 1,
            interval: 60,
        }
    }

    #[test]
    fn e6_pc12_summary() {
        let rec = record("PC12", json!({"cpuUseRate": 37.5}));
        assert_eq!(get_summary(&rec).unwrap(), "CPU使用率：37.50%");
    }

    #[test]
    fn pc11_is_constant() {
        let rec = record("PC11", json!(null));
        assert_eq!(get_summary(&rec).unwrap(), "探针心跳");
    }

    #[test]
    fn unknown_code_formats_as_unknown() {
        let rec = record("PC999", json!({}));
        assert_eq!(get_summary(&rec).unwrap(), "未知指标类型: PC999");
    }

    #[test]
    fn pc8_has_no_summary_branch_and_reads_as_unknown() {
        let rec = record("PC8", json!({"command": "ls", "collectTime": 0}));
        assert_eq!(get_summary(&rec).unwrap(), "未知指标类型: PC8");
    }

    #[test]
    fn shape_mismatch_propagates_error() {
        let rec = record("PC12", json!({"cpuUseRate": "not-a-number"}));
        assert!(get_summary(&rec).is_err());
    }

    #[test]
    fn determinism_property_8() {
        let rec = record("PC3", json!([{"cpuUseRate": 1.5, "memoryUseRate": 2.5}]));
        let a = get_summary(&rec).unwrap();
        let b = get_summary(&rec).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn pc19_firewall_concatenation() {
        let rec = record(
            "PC19",
            json!([
                {"firewallName": "domainProfile", "status": true},
                {"firewallName": "privateProfile", "status": false},
            ]),
        );
        assert_eq!(get_summary(&rec).unwrap(), "域防火墙: 开启专用防火墙: 关闭");
    }

    #[test]
    fn pc20_http_packet_deserializes_from_capitalized_wire_keys() {
        // HttpPacket carries no lowercase JSON tags on the wire (the
        // source Go struct is tagless), so this uses the real
        // capitalized keys rather than the Rust field names.
        let rec = record(
            "PC20",
            json!({
                "request": {
                    "ReqType": "http",
                    "Method": "GET",
                    "Body": "",
                    "URL": "/health",
                    "Host": "10.0.0.1",
                    "Payload": "",
                },
                "response": {
                    "ReqType": "http",
                    "Method": "GET",
                    "Body": "",
                    "URL": "/health",
                    "Host": "10.0.0.1",
                    "Payload": "200 OK",
                },
            }),
        );
        assert_eq!(get_summary(&rec).unwrap(), "HTTP GET /health -> 200 OK");
    }
}
