use chrono::{DateTime, Datelike, Local, Timelike};
use thiserror::Error;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const FACTOR: f64 = 1024.0;
const UNITS: [&str; 6] = ["", "K", "M", "G", "T", "P"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("byte count must be non-negative, got {0}")]
    NegativeByteCount(i64),
}

/// A non-negative number of bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ByteCount(u64);

impl ByteCount {
    pub const fn new(bytes: u64) -> Self {
        ByteCount(bytes)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ByteCount {
    fn from(bytes: u64) -> Self {
        ByteCount(bytes)
    }
}

impl TryFrom<i64> for ByteCount {
    type Error = FormatError;

    fn try_from(bytes: i64) -> Result<Self, Self::Error> {
        u64::try_from(bytes)
            .map(ByteCount)
            .map_err(|_| FormatError::NegativeByteCount(bytes))
    }
}

/// Scale a byte count by powers of 1024, e.g. `1_253_656 -> "1.20 MB"`.
///
/// Values at or beyond 1024 PB stay in the `P` unit unscaled.
pub fn format_size(bytes: impl Into<ByteCount>) -> String {
    format_size_with_suffix(bytes, "B")
}

pub fn format_size_with_suffix(bytes: impl Into<ByteCount>, suffix: &str) -> String {
    let mut magnitude = bytes.into().get() as f64;
    let mut unit = 0;
    while magnitude >= FACTOR && unit < UNITS.len() - 1 {
        magnitude /= FACTOR;
        unit += 1;
    }
    format!("{magnitude:.2} {}{suffix}", UNITS[unit])
}

pub fn format_percent(percent: f64) -> String {
    format!("{percent:.1}%")
}

pub fn format_mhz(mhz: f64) -> String {
    format!("{mhz:.2} Mhz")
}

pub fn format_mbps(mbps: f64) -> String {
    format!("{mbps:.2} Mbps")
}

/// `YYYY/M/D/H/Min/Sec`, no zero-padding.
pub fn format_boot_time(at: DateTime<Local>) -> String {
    format!(
        "{}/{}/{}/{}/{}/{}",
        at.year(),
        at.month(),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
}

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}
