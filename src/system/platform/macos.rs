use std::ffi::CString;

use super::PlatformExtensions;
use crate::system::source::{FrequencyBounds, SourceError};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn cpu_frequency_bounds() -> Result<FrequencyBounds, SourceError> {
        // Apple Silicon does not publish these keys
        let min_hz = sysctl_u64("hw.cpufrequency_min").ok_or(SourceError::Unsupported)?;
        let max_hz = sysctl_u64("hw.cpufrequency_max").ok_or(SourceError::Unsupported)?;
        Ok(FrequencyBounds {
            min_mhz: min_hz as f64 / 1_000_000.0,
            max_mhz: max_hz as f64 / 1_000_000.0,
        })
    }
}

fn sysctl_u64(name: &str) -> Option<u64> {
    let name = CString::new(name).ok()?;
    let mut value: u64 = 0;
    let mut size = std::mem::size_of::<u64>();
    let rc = unsafe {
        libc::sysctlbyname(
            name.as_ptr(),
            &mut value as *mut u64 as *mut libc::c_void,
            &mut size,
            std::ptr::null_mut(),
            0,
        )
    };
    if rc == 0 && size == std::mem::size_of::<u64>() {
        Some(value)
    } else {
        None
    }
}
