//! Data Model (C8): the ~25 metric payload shapes shared by the reassembly
//! dispatch path (`agent-net`) and the summary engine.
//!
//! Field names and JSON tags follow the source metrics schema exactly;
//! Rust naming conventions (snake_case) are restored via `serde(rename)`
//! where the wire tag isn't already snake_case.

use serde::{Deserialize, Serialize};

/// The envelope every completed metrics payload is deserialized into.
/// `kvm_id` is always overwritten by the reader from the connection
/// identity (spec.md §3), never trusted from the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsHostInfo {
    #[serde(rename = "KvmID")]
    pub kvm_id: String,
    #[serde(rename = "metricsCode")]
    pub metrics_code: String,
    #[serde(rename = "metricsName")]
    pub metrics_name: String,
    #[serde(rename = "metricsType")]
    pub metrics_type: String,
    pub summary: String,
    #[serde(rename = "metricsData")]
    pub metrics_data: serde_json::Value,
    pub level: u32,
    pub interval: u32,
}

/// PC1 — system identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemData {
    pub hostname: String,
    #[serde(rename = "cpuModel")]
    pub cpu_model: String,
    #[serde(rename = "logicalCores")]
    pub logical_cores: i64,
    #[serde(rename = "systemArchitecture")]
    pub system_architecture: String,
    pub manufacture: String,
    #[serde(rename = "systemDescription")]
    pub system_description: String,
    #[serde(rename = "manufactureDate")]
    pub manufacture_date: String,
    #[serde(rename = "installDate")]
    pub install_date: String,
    pub uptime: String,
}

/// PC2 — one network interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetInfo {
    pub hostname: String,
    pub name: String,
    pub ipv4: String,
    #[serde(rename = "ipv4Mask")]
    pub ipv4_mask: String,
    pub ipv6: String,
    #[serde(rename = "ipv6Mask")]
    pub ipv6_mask: String,
    pub gateway: String,
    pub dns: String,
    pub mac: String,
    pub status: String,
}

/// PC3 — one running process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessInfo {
    #[serde(rename = "pId")]
    pub p_id: i32,
    #[serde(rename = "ppId")]
    pub pp_id: i32,
    pub account: String,
    #[serde(rename = "processName")]
    pub process_name: String,
    #[serde(rename = "memoryUseBytes")]
    pub memory_use_bytes: String,
    #[serde(rename = "memoryUseRate")]
    pub memory_use_rate: f64,
    #[serde(rename = "cpuUseRate")]
    pub cpu_use_rate: f64,
    #[serde(rename = "ioReadBytes")]
    pub io_read_bytes: u64,
    #[serde(rename = "ioWriteBytes")]
    pub io_write_bytes: u64,
    #[serde(rename = "ioReadRate")]
    pub io_read_rate: f64,
    #[serde(rename = "ioWriteRate")]
    pub io_write_rate: f64,
    #[serde(rename = "processStartDate")]
    pub process_start_date: String,
    #[serde(rename = "dynamicLib")]
    pub dynamic_lib: String,
    pub cmd: String,
    #[serde(rename = "processStatus")]
    pub process_status: i32,
    #[serde(rename = "processPath")]
    pub process_path: String,
    #[serde(rename = "collectedAt")]
    pub collected_at: u64,
}

/// PC4 — one open port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortInfo {
    #[serde(rename = "listenAddr")]
    pub listen_addr: String,
    pub port: u32,
    pub protocol: String,
    #[serde(rename = "connectionCount")]
    pub connection_count: u32,
    #[serde(rename = "processPid")]
    pub process_pid: i32,
    pub process: String,
    #[serde(rename = "processPath")]
    pub process_path: String,
    #[serde(rename = "processCreate")]
    pub process_create: String,
    pub cmd: String,
}

/// PC5 — one ARP/neighbor cache entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArpInfo {
    #[serde(rename = "cacheIp")]
    pub cache_ip: String,
    #[serde(rename = "networkIp")]
    pub network_ip: String,
    #[serde(rename = "cacheMac")]
    pub cache_mac: String,
    #[serde(rename = "isGateway")]
    pub is_gateway: bool,
    #[serde(rename = "cacheType")]
    pub cache_type: String,
}

/// PC6 — one local user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    #[serde(rename = "full_name")]
    pub full_name: String,
    pub domain: String,
    pub sid: String,
    pub disabled: bool,
}

/// PC7 — one file-change event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileModifyData {
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    pub operate: String,
    #[serde(rename = "updateTime")]
    pub update_time: i64,
    #[serde(rename = "isAllowedCreate")]
    pub is_allowed_create: bool,
    #[serde(rename = "originalFileHash")]
    pub original_file_hash: String,
    #[serde(rename = "updatedFileHash")]
    pub updated_file_hash: String,
    #[serde(rename = "threatLevel")]
    pub threat_level: String,
}

/// PC8 — a system command execution record. No summary branch exists in
/// the source dispatcher (see `agent_metrics::summary`); kept here because
/// the reassembler can still decode and forward the raw payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandModifyData {
    pub command: String,
    #[serde(rename = "collectTime")]
    pub collect_time: i64,
}

/// PC9 — one scheduled task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronTaskData {
    #[serde(rename = "hostName")]
    pub host_name: String,
    #[serde(rename = "taskName")]
    pub task_name: String,
    #[serde(rename = "nextRunTime")]
    pub next_run_time: String,
    pub mode: String,
    #[serde(rename = "loginType")]
    pub login_type: String,
    #[serde(rename = "lastRunTime")]
    pub last_run_time: String,
    #[serde(rename = "lastRunResult")]
    pub last_run_result: String,
    #[serde(rename = "createBy")]
    pub create_by: String,
    pub command: String,
    pub description: String,
    #[serde(rename = "taskState")]
    pub task_state: String,
    #[serde(rename = "freeTime")]
    pub free_time: String,
    #[serde(rename = "powerManagement")]
    pub power_management: String,
    #[serde(rename = "runAsUser")]
    pub run_as_user: String,
    pub key1: String,
    pub key2: String,
    pub schedule: String,
    #[serde(rename = "taskType")]
    pub task_type: String,
}

/// PC10 — one login session. The source struct carries no JSON tags at
/// all (an oversight there — every field serializes under its Go name);
/// we give it explicit camelCase tags instead of perpetuating that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInfo {
    pub name: String,
    pub domain: String,
    #[serde(rename = "startTime")]
    pub start_time: String,
    #[serde(rename = "authenticationPackage")]
    pub authentication_package: String,
    #[serde(rename = "logType")]
    pub log_type: u32,
}

/// PC11 — heartbeat. No payload shape: the summary is a constant string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartBeatInfo {
    #[serde(rename = "hostName")]
    pub host_name: String,
    pub platform: String,
    #[serde(rename = "type")]
    pub kind: u32,
    pub config: Config,
    #[serde(rename = "collectionStatus")]
    pub collection_status: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(rename = "metricConfig")]
    pub metric_config: Vec<MetricConfig>,
    #[serde(rename = "softwareTools")]
    pub software_tools: Vec<Software>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricConfig {
    pub name: String,
    pub describe: String,
    pub interval: u32,
    pub level: u32,
    pub enabled: bool,
}

/// PC12 — CPU utilization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuInfo {
    #[serde(rename = "cpuUseRate")]
    pub cpu_use_rate: f64,
}

/// PC13 — disk utilization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskData {
    pub total: String,
    pub used: String,
    pub free: String,
    #[serde(rename = "usedPercent")]
    pub used_percent: f64,
    pub disks: Vec<Disk>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disk {
    pub name: String,
    pub total: String,
    pub used: String,
    pub free: String,
    #[serde(rename = "usedPercent")]
    pub used_percent: f64,
}

/// PC14 — memory utilization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemInfo {
    #[serde(rename = "memoryUseRate")]
    pub memory_use_rate: f64,
    #[serde(rename = "memoryUseBytes")]
    pub memory_use_bytes: String,
    #[serde(rename = "memoryTotalBytes")]
    pub memory_total_bytes: String,
    #[serde(rename = "memoryFreeBytes")]
    pub memory_free_bytes: String,
}

/// PC15 — NIC send throughput, one entry per interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetSendInfo {
    pub name: String,
    #[serde(rename = "packetsSent")]
    pub packets_sent: u64,
    #[serde(rename = "bytesSentRate")]
    pub bytes_sent_rate: u64,
}

/// PC16 — NIC receive throughput, one entry per interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetRecvInfo {
    pub name: String,
    #[serde(rename = "packetsRecv")]
    pub packets_recv: u64,
    #[serde(rename = "bytesRecvRate")]
    pub bytes_recv_rate: u64,
}

/// PC18 — one installed software entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftwareData {
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "displayVersion")]
    pub display_version: String,
    #[serde(rename = "installLocation")]
    pub install_location: String,
    pub publisher: String,
    #[serde(rename = "installDate")]
    pub install_date: String,
}

/// PC19 — one firewall profile's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirewallStatus {
    #[serde(rename = "firewallName")]
    pub firewall_name: String,
    pub status: bool,
}

/// PC20 — one captured HTTP request/response pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpPacketData {
    pub request: HttpPacket,
    pub response: HttpPacket,
}

/// HTTP request-header capture shape. Not referenced by [`HttpPacketData`]
/// (which carries [`HttpPacket`] on both legs instead) in the source
/// either — kept as the same orphaned sibling struct it is there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestData {
    pub method: String,
    pub url: String,
    #[serde(rename = "x_forwarded_for")]
    pub x_forwarded_for: String,
    pub connection: String,
    pub host: String,
    #[serde(rename = "user_agent")]
    pub user_agent: String,
    pub accept: String,
    #[serde(rename = "accept_language")]
    pub accept_language: String,
    #[serde(rename = "accept_encoding")]
    pub accept_encoding: String,
    #[serde(rename = "access_control_request_method")]
    pub access_control_method: String,
    #[serde(rename = "access_control_request_headers")]
    pub access_control_headers: String,
    pub referer: String,
    pub origin: String,
    pub xtoken: String,
}

/// One leg (request or response) of an [`HttpPacketData`] capture. The
/// source struct carries no JSON tags, so every field serializes under
/// its literal capitalized Go name; each field here is renamed to match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpPacket {
    #[serde(rename = "ReqType")]
    pub req_type: String,
    #[serde(rename = "Method")]
    pub method: String,
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Host")]
    pub host: String,
    #[serde(rename = "Payload")]
    pub payload: String,
}

/// PC21 — one SSH session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshInfo {
    pub user: String,
    pub tty: String,
    #[serde(rename = "login_time")]
    pub login_time: String,
    #[serde(rename = "client_ip")]
    pub client_ip: String,
}

/// PC22 — one RDP session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RdpLog {
    pub server: String,
    pub user: String,
}

/// PC23 — one OS event log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogInfo {
    #[serde(rename = "timeGenerated")]
    pub time_generated: String,
    #[serde(rename = "eventId")]
    pub event_id: i64,
    #[serde(rename = "eventType")]
    pub event_type: String,
    pub source: String,
    pub message: String,
    #[serde(rename = "logName")]
    pub log_name: String,
}

/// Process IO cache snapshot; not one of the 23 dispatched metric codes,
/// kept from the source as a supporting shape referenced alongside
/// [`ProcessInfo`] collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoCacheInfo {
    #[serde(rename = "ioReadBytes")]
    pub io_read_bytes: u64,
    #[serde(rename = "ioWriteBytes")]
    pub io_write_bytes: u64,
    #[serde(rename = "collectedAt")]
    pub collected_at: u64,
}

/// One entry in a heartbeat's software-tools inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Software {
    pub id: u64,
    pub uuid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u32,
    pub path: String,
    pub size: String,
    pub comment: String,
    pub status: bool,
    #[serde(rename = "size_default")]
    pub size_default: String,
    pub version: String,
    pub os: u32,
    pub enabled: bool,
    #[serde(rename = "download_url")]
    pub download_url: String,
}
