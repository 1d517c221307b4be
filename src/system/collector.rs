use std::future::Future;
use std::time::Duration;

use chrono::Local;
use tracing::Instrument;

use super::probe::{BandwidthProbe, ProbeError, Throughput, run_probe};
use super::snapshot::{Field, Section, SectionKind, TelemetrySnapshot};
use super::source::{
    CpuReading, DiskReading, GpuReading, MemoryReading, NetworkReading, SystemIdentity,
    TelemetrySource,
};
use crate::format::{
    format_boot_time, format_mbps, format_mhz, format_percent, format_size,
};

#[derive(Debug, Clone, Copy)]
pub struct ProbeSettings {
    pub enabled: bool,
    pub timeout: Duration,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        ProbeSettings {
            enabled: true,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Takes a single [`TelemetrySnapshot`] from a source and bandwidth probe.
pub struct Collector<S, P> {
    source: S,
    probe: P,
    settings: ProbeSettings,
}

impl<S: TelemetrySource, P: BandwidthProbe> Collector<S, P> {
    pub fn new(source: S, probe: P, settings: ProbeSettings) -> Self {
        Collector {
            source,
            probe,
            settings,
        }
    }

    /// Sections are collected in tab order; `cancel` only aborts the bandwidth probe.
    pub async fn collect<C>(mut self, cancel: C) -> TelemetrySnapshot
    where
        C: Future<Output = ()>,
    {
        let captured_at = Local::now();

        let system = {
            let _span = section_span(SectionKind::System).entered();
            system_section(&self.source.system_identity())
        };
        let cpu = {
            let _span = section_span(SectionKind::Cpu).entered();
            cpu_section(&self.source.cpu())
        };
        let ram = {
            let _span = section_span(SectionKind::Ram).entered();
            ram_section(&self.source.memory())
        };
        let gpu = {
            let _span = section_span(SectionKind::Gpu).entered();
            gpu_section(&self.source.gpus())
        };
        let disk = {
            let _span = section_span(SectionKind::Disk).entered();
            disk_section(&self.source.disk())
        };
        let network = async {
            let reading = self.source.network();
            let throughput = if self.settings.enabled {
                run_probe(&self.probe, self.settings.timeout, cancel).await
            } else {
                Err(ProbeError::Disabled)
            };
            if let Err(err) = &throughput {
                tracing::warn!(error = %err, "bandwidth probe did not complete");
            }
            network_section(&reading, throughput)
        }
        .instrument(section_span(SectionKind::Network))
        .await;

        let snapshot = TelemetrySnapshot::new(captured_at, system, cpu, ram, gpu, disk, network);
        let unavailable = snapshot
            .sections()
            .flat_map(Section::entries)
            .filter(|e| e.field.is_unavailable())
            .count();
        tracing::info!(unavailable, "snapshot collected");
        snapshot
    }
}

fn section_span(kind: SectionKind) -> tracing::Span {
    tracing::info_span!("collector.section", section = kind.title())
}

pub fn system_section(identity: &SystemIdentity) -> Section {
    let boot_time = match identity.boot_time {
        Some(at) => Field::value(format_boot_time(at)),
        None => Field::unavailable("boot time not reported"),
    };

    Section::new(SectionKind::System)
        .with("System", Field::value(&identity.os_name))
        .with("Node Name", Field::value(&identity.node_name))
        .with("Release", Field::value(&identity.release))
        .with("Version", Field::value(&identity.version))
        .with("Machine", Field::value(&identity.machine))
        .with("Processor", Field::value(&identity.processor))
        .with("Boot Time", boot_time)
}

pub fn cpu_section(cpu: &CpuReading) -> Section {
    let physical = match cpu.physical_cores {
        Some(n) => Field::value(n.to_string()),
        None => Field::unavailable("physical core count not reported"),
    };
    let (max_freq, min_freq) = match &cpu.frequency_bounds {
        Ok(bounds) => (
            Field::value(format_mhz(bounds.max_mhz)),
            Field::value(format_mhz(bounds.min_mhz)),
        ),
        Err(err) => (Field::unavailable(err), Field::unavailable(err)),
    };
    let current = match cpu.current_mhz {
        Some(mhz) => Field::value(format_mhz(mhz)),
        None => Field::unavailable("current frequency not reported"),
    };

    Section::new(SectionKind::Cpu)
        .with("Physical Cores", physical)
        .with("Total Cores", Field::value(cpu.logical_cores.to_string()))
        .with("Max Frequency", max_freq)
        .with("Min Frequency", min_freq)
        .with("Current Frequency", current)
        .with("Total CPU Usage", Field::value(format_percent(cpu.usage_percent)))
}

pub fn ram_section(memory: &MemoryReading) -> Section {
    Section::new(SectionKind::Ram)
        .with("Total", Field::value(format_size(memory.total)))
        .with("Available", Field::value(format_size(memory.available)))
        .with("Used", Field::value(format_size(memory.used)))
        .with("Percentage", Field::value(format_percent(memory.percent)))
}

/// Only the first GPU is reported; no GPU yields an empty section.
pub fn gpu_section(gpus: &[GpuReading]) -> Section {
    let section = Section::new(SectionKind::Gpu);
    let Some(gpu) = gpus.first() else {
        return section;
    };

    let reported = |value: Option<String>, what: &str| match value {
        Some(v) => Field::value(v),
        None => Field::unavailable(format!("{what} not reported")),
    };
    let megabytes = |mb: Option<u64>| mb.map(|mb| format!("{mb}MB"));

    section
        .with("ID", Field::value(gpu.id.to_string()))
        .with("Name", Field::value(&gpu.name))
        .with(
            "Load",
            reported(gpu.load.map(|l| format_percent(l * 100.0)), "load"),
        )
        .with("Free Memory", reported(megabytes(gpu.memory_free_mb), "memory"))
        .with("Used Memory", reported(megabytes(gpu.memory_used_mb), "memory"))
        .with("Total Memory", reported(megabytes(gpu.memory_total_mb), "memory"))
        .with(
            "Temperature",
            reported(gpu.temperature_c.map(|c| format!("{c:.1} °C")), "temperature"),
        )
        .with("UUID", Field::value(&gpu.uuid))
}

pub fn disk_section(disk: &DiskReading) -> Section {
    let (device, mountpoint, fstype) = match &disk.partition {
        Some(p) => (
            Field::value(&p.device),
            Field::value(&p.mountpoint),
            Field::value(&p.fstype),
        ),
        None => {
            let missing = Field::unavailable("no partition found");
            (missing.clone(), missing.clone(), missing)
        }
    };

    let (total, used, free, percent) = match &disk.usage {
        Ok(usage) => (
            Field::value(format_size(usage.total)),
            Field::value(format_size(usage.used)),
            Field::value(format_size(usage.free)),
            Field::value(format_percent(usage.percent)),
        ),
        Err(err) => {
            let missing = Field::unavailable(err);
            (missing.clone(), missing.clone(), missing.clone(), missing)
        }
    };

    Section::new(SectionKind::Disk)
        .with("Device", device)
        .with("Mountpoint", mountpoint)
        .with("File System Type", fstype)
        .with("Total Size", total)
        .with("Used", used)
        .with("Free", free)
        .with("Percentage", percent)
        .with("Total Read", Field::value(format_size(disk.io.read_bytes)))
        .with("Total Write", Field::value(format_size(disk.io.write_bytes)))
}

pub fn network_section(
    network: &NetworkReading,
    throughput: Result<Throughput, ProbeError>,
) -> Section {
    let interface = match &network.interface {
        Some(name) => Field::value(name),
        None => Field::unavailable("no network interface found"),
    };
    let (download, upload) = match throughput {
        Ok(t) => (
            Field::value(format_mbps(t.download_mbps)),
            Field::value(format_mbps(t.upload_mbps)),
        ),
        Err(err) => (Field::unavailable(&err), Field::unavailable(&err)),
    };

    Section::new(SectionKind::Network)
        .with("Interface", interface)
        .with("Download Speed", download)
        .with("Upload Speed", upload)
        .with("Total Sent", Field::value(format_size(network.bytes_sent)))
        .with("Total Received", Field::value(format_size(network.bytes_received)))
}
