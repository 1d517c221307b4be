use chrono::{DateTime, Local};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("{0}")]
    Io(String),
    #[error("not reported by this platform")]
    Unsupported,
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => SourceError::PermissionDenied(err.to_string()),
            _ => SourceError::Io(err.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SystemIdentity {
    pub os_name: String,
    pub node_name: String,
    pub release: String,
    pub version: String,
    pub machine: String,
    pub processor: String,
    pub boot_time: Option<DateTime<Local>>,
}

#[derive(Debug, Clone, Copy)]
pub struct FrequencyBounds {
    pub min_mhz: f64,
    pub max_mhz: f64,
}

#[derive(Debug, Clone)]
pub struct CpuReading {
    pub physical_cores: Option<usize>,
    pub logical_cores: usize,
    pub frequency_bounds: Result<FrequencyBounds, SourceError>,
    pub current_mhz: Option<f64>,
    pub usage_percent: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct MemoryReading {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub percent: f64,
}

impl MemoryReading {
    /// Share of memory not available to new allocations.
    pub fn from_totals(total: u64, available: u64, used: u64) -> Self {
        let percent = if total > 0 {
            total.saturating_sub(available) as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        MemoryReading {
            total,
            available,
            used,
            percent,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GpuReading {
    pub id: u32,
    pub name: String,
    /// Utilization as a fraction in `0.0..=1.0`. `None` when the driver reports N/A.
    pub load: Option<f64>,
    pub memory_free_mb: Option<u64>,
    pub memory_used_mb: Option<u64>,
    pub memory_total_mb: Option<u64>,
    pub temperature_c: Option<f64>,
    pub uuid: String,
}

#[derive(Debug, Clone)]
pub struct PartitionInfo {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
}

#[derive(Debug, Clone, Copy)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
}

impl DiskUsage {
    pub fn from_space(total: u64, free: u64) -> Self {
        let used = total.saturating_sub(free);
        let percent = if total > 0 {
            used as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        DiskUsage {
            total,
            used,
            free,
            percent,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IoCounters {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct DiskReading {
    pub partition: Option<PartitionInfo>,
    pub usage: Result<DiskUsage, SourceError>,
    pub io: IoCounters,
}

#[derive(Debug, Clone)]
pub struct NetworkReading {
    pub interface: Option<String>,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// Raw telemetry queries. Each call is independent so one failing source
/// cannot affect another.
pub trait TelemetrySource {
    fn system_identity(&mut self) -> SystemIdentity;
    fn cpu(&mut self) -> CpuReading;
    fn memory(&mut self) -> MemoryReading;
    fn gpus(&mut self) -> Vec<GpuReading>;
    fn disk(&mut self) -> DiskReading;
    fn network(&mut self) -> NetworkReading;
}
