use super::PlatformExtensions;
use crate::system::source::{FrequencyBounds, SourceError};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn cpu_frequency_bounds() -> Result<FrequencyBounds, SourceError> {
        // No min/max clock query without WMI
        Err(SourceError::Unsupported)
    }
}
