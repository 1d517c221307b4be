use std::path::Path;

use super::PlatformExtensions;
use crate::system::source::{FrequencyBounds, SourceError};

const CPUFREQ_DIR: &str = "/sys/devices/system/cpu/cpu0/cpufreq";

pub struct Platform;

impl PlatformExtensions for Platform {
    fn cpu_frequency_bounds() -> Result<FrequencyBounds, SourceError> {
        let dir = Path::new(CPUFREQ_DIR);
        if !dir.exists() {
            // Common in VMs and containers without a cpufreq driver
            return Err(SourceError::Unsupported);
        }
        Ok(FrequencyBounds {
            min_mhz: read_khz(&dir.join("cpuinfo_min_freq"))? / 1000.0,
            max_mhz: read_khz(&dir.join("cpuinfo_max_freq"))? / 1000.0,
        })
    }
}

fn read_khz(path: &Path) -> Result<f64, SourceError> {
    let contents = std::fs::read_to_string(path)?;
    parse_khz(&contents).ok_or_else(|| {
        SourceError::Io(format!("unexpected contents in {}", path.display()))
    })
}

fn parse_khz(contents: &str) -> Option<f64> {
    contents.trim().parse::<u64>().ok().map(|khz| khz as f64)
}
