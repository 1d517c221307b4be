use super::source::{FrequencyBounds, SourceError};

pub trait PlatformExtensions {
    fn cpu_frequency_bounds() -> Result<FrequencyBounds, SourceError>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub fn cpu_frequency_bounds() -> Result<FrequencyBounds, SourceError> {
    platform_impl::Platform::cpu_frequency_bounds()
}
