use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SectionKind {
    System,
    Cpu,
    Ram,
    Gpu,
    Disk,
    Network,
}

impl SectionKind {
    pub const ALL: [SectionKind; 6] = [
        SectionKind::System,
        SectionKind::Cpu,
        SectionKind::Ram,
        SectionKind::Gpu,
        SectionKind::Disk,
        SectionKind::Network,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SectionKind::System => "System",
            SectionKind::Cpu => "CPU",
            SectionKind::Ram => "RAM",
            SectionKind::Gpu => "GPU",
            SectionKind::Disk => "Disk",
            SectionKind::Network => "Network",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Value(String),
    /// Explicit marker for a value the source could not supply, with a short reason.
    Unavailable(String),
}

impl Field {
    pub fn value(s: impl Into<String>) -> Self {
        Field::Value(s.into())
    }

    pub fn unavailable(reason: impl fmt::Display) -> Self {
        Field::Unavailable(reason.to_string())
    }

    pub fn as_value(&self) -> Option<&str> {
        match self {
            Field::Value(s) => Some(s),
            Field::Unavailable(_) => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Field::Unavailable(_))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Value(s) => f.write_str(s),
            Field::Unavailable(_) => f.write_str("Unavailable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub label: &'static str,
    pub field: Field,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    kind: SectionKind,
    entries: Vec<Entry>,
}

impl Section {
    pub fn new(kind: SectionKind) -> Self {
        Section {
            kind,
            entries: Vec::new(),
        }
    }

    /// Builder-style insert; labels keep insertion order.
    pub fn with(mut self, label: &'static str, field: Field) -> Self {
        self.entries.push(Entry { label, field });
        self
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, label: &str) -> Option<&Field> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| &e.field)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Point-in-time capture of host telemetry. Never mutated after construction.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetrySnapshot {
    captured_at: DateTime<Local>,
    system: Section,
    cpu: Section,
    ram: Section,
    gpu: Section,
    disk: Section,
    network: Section,
}

impl TelemetrySnapshot {
    pub fn new(
        captured_at: DateTime<Local>,
        system: Section,
        cpu: Section,
        ram: Section,
        gpu: Section,
        disk: Section,
        network: Section,
    ) -> Self {
        TelemetrySnapshot {
            captured_at,
            system,
            cpu,
            ram,
            gpu,
            disk,
            network,
        }
    }

    pub fn captured_at(&self) -> DateTime<Local> {
        self.captured_at
    }

    pub fn section(&self, kind: SectionKind) -> &Section {
        match kind {
            SectionKind::System => &self.system,
            SectionKind::Cpu => &self.cpu,
            SectionKind::Ram => &self.ram,
            SectionKind::Gpu => &self.gpu,
            SectionKind::Disk => &self.disk,
            SectionKind::Network => &self.network,
        }
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        SectionKind::ALL.into_iter().map(|kind| self.section(kind))
    }

    pub fn system(&self) -> &Section {
        &self.system
    }

    pub fn cpu(&self) -> &Section {
        &self.cpu
    }

    pub fn ram(&self) -> &Section {
        &self.ram
    }

    pub fn gpu(&self) -> &Section {
        &self.gpu
    }

    pub fn disk(&self) -> &Section {
        &self.disk
    }

    pub fn network(&self) -> &Section {
        &self.network
    }
}
