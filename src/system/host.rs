use std::path::Path;

use chrono::{Local, TimeZone};
use sysinfo::{Disks, Networks, System};

use super::gpu;
use super::platform;
use super::source::{
    CpuReading, DiskReading, DiskUsage, GpuReading, IoCounters, MemoryReading, NetworkReading,
    PartitionInfo, SourceError, SystemIdentity, TelemetrySource,
};

/// Live host telemetry backed by `sysinfo`, platform helpers and `nvidia-smi`.
pub struct HostSource {
    sys: System,
}

impl Default for HostSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HostSource {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();
        HostSource { sys }
    }
}

impl TelemetrySource for HostSource {
    fn system_identity(&mut self) -> SystemIdentity {
        let processor = self
            .sys
            .cpus()
            .first()
            .map(|c| c.brand().trim().to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| std::env::consts::ARCH.to_string());

        let boot_time = i64::try_from(System::boot_time())
            .ok()
            .and_then(|secs| Local.timestamp_opt(secs, 0).single());

        SystemIdentity {
            os_name: System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
            node_name: System::host_name().unwrap_or_else(|| "Unknown".into()),
            release: System::kernel_version().unwrap_or_else(|| "Unknown".into()),
            version: System::long_os_version()
                .or_else(System::os_version)
                .unwrap_or_else(|| "Unknown".into()),
            machine: std::env::consts::ARCH.to_string(),
            processor,
            boot_time,
        }
    }

    fn cpu(&mut self) -> CpuReading {
        // Usage is a delta between two refreshes
        self.sys.refresh_cpu_all();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        self.sys.refresh_cpu_all();

        let cpus = self.sys.cpus();
        let current_mhz = if cpus.is_empty() {
            None
        } else {
            let sum: u64 = cpus.iter().map(|c| c.frequency()).sum();
            Some(sum as f64 / cpus.len() as f64).filter(|mhz| *mhz > 0.0)
        };

        CpuReading {
            physical_cores: System::physical_core_count(),
            logical_cores: cpus.len(),
            frequency_bounds: platform::cpu_frequency_bounds(),
            current_mhz,
            usage_percent: f64::from(self.sys.global_cpu_usage()),
        }
    }

    fn memory(&mut self) -> MemoryReading {
        self.sys.refresh_memory();
        MemoryReading::from_totals(
            self.sys.total_memory(),
            self.sys.available_memory(),
            self.sys.used_memory(),
        )
    }

    fn gpus(&mut self) -> Vec<GpuReading> {
        gpu::enumerate()
    }

    fn disk(&mut self) -> DiskReading {
        let disks = Disks::new_with_refreshed_list();

        let io = disks.iter().fold(IoCounters::default(), |acc, d| {
            let usage = d.usage();
            IoCounters {
                read_bytes: acc.read_bytes.saturating_add(usage.total_read_bytes),
                write_bytes: acc.write_bytes.saturating_add(usage.total_written_bytes),
            }
        });

        let Some(first) = disks.iter().next() else {
            return DiskReading {
                partition: None,
                usage: Err(SourceError::Io("no disk partitions reported".into())),
                io,
            };
        };

        let mountpoint = first.mount_point();
        let usage = probe_mountpoint(mountpoint)
            .map(|()| DiskUsage::from_space(first.total_space(), first.available_space()));

        DiskReading {
            partition: Some(PartitionInfo {
                device: first.name().to_string_lossy().to_string(),
                mountpoint: mountpoint.to_string_lossy().to_string(),
                fstype: first.file_system().to_string_lossy().to_string(),
            }),
            usage,
            io,
        }
    }

    fn network(&mut self) -> NetworkReading {
        let networks = Networks::new_with_refreshed_list();

        let mut names: Vec<&String> = networks.iter().map(|(name, _)| name).collect();
        names.sort();
        let interface = names
            .iter()
            .find(|name| !is_loopback(name))
            .or_else(|| names.first())
            .map(|name| name.to_string());

        let (bytes_sent, bytes_received) = networks.iter().fold((0u64, 0u64), |(tx, rx), (_, d)| {
            (
                tx.saturating_add(d.total_transmitted()),
                rx.saturating_add(d.total_received()),
            )
        });

        NetworkReading {
            interface,
            bytes_sent,
            bytes_received,
        }
    }
}

/// Space figures are only trusted when the mount point itself can be opened.
fn probe_mountpoint(path: &Path) -> Result<(), SourceError> {
    std::fs::read_dir(path).map(|_| ()).map_err(|err| {
        tracing::warn!(mountpoint = %path.display(), error = %err, "disk usage unavailable");
        SourceError::from(err)
    })
}

fn is_loopback(name: &str) -> bool {
    name == "lo" || name.starts_with("lo0") || name.starts_with("Loopback")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_names() {
        assert!(is_loopback("lo"));
        assert!(is_loopback("lo0"));
        assert!(is_loopback("Loopback Pseudo-Interface 1"));
        assert!(!is_loopback("eth0"));
        assert!(!is_loopback("wlan0"));
    }

    #[test]
    fn missing_mountpoint_is_an_error() {
        let result = probe_mountpoint(Path::new("/nonexistent/hostscan/mount"));
        assert!(matches!(result, Err(SourceError::Io(_))));
    }

    #[test]
    fn host_source_does_not_panic() {
        let mut source = HostSource::new();
        let identity = source.system_identity();
        assert!(!identity.machine.is_empty());
        let memory = source.memory();
        assert!(memory.percent >= 0.0);
        let _ = source.disk();
        let _ = source.network();
    }
}
