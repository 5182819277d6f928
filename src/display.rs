// MIT License - Copyright (c) 2026 Peter Wright
// Event listing

//! Human-readable rendering of event records. Not used by the protocol core.

use crate::codes::EventCodeTable;
use crate::record::EventRecord;

/// What an event's source number refers to, per the code table's `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    System,
    Device,
    User,
    IpData,
    /// A kind with no dedicated rendering; the source is shown as a number.
    Other,
}

impl SourceKind {
    /// Map the numeric kind from the code table.
    pub fn from_kind(kind: i32) -> Self {
        match kind {
            0 => Self::System,
            1 | 4 => Self::Device,
            2 | 3 | 6 | 9 => Self::User,
            30 | 31 => Self::IpData,
            _ => Self::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::System => "System",
            Self::Device => "Device",
            Self::User => "User",
            Self::IpData => "IP data",
            Self::Other => "Source",
        }
    }

    /// Render the record's source for this kind.
    pub fn describe(&self, record: &EventRecord) -> String {
        match self {
            Self::Device => device_name(record.source),
            Self::IpData => format!(
                "{} (P: {}, S: {})",
                self.label(),
                record.partition,
                record.source
            ),
            Self::System | Self::User | Self::Other => {
                format!("{} {}", self.label(), record.source)
            }
        }
    }
}

/// Name of a device by its source number.
pub fn device_name(source: u8) -> String {
    match source {
        1..=128 => format!("Zone {}", source),
        193..=200 => format!("Keypad (address {})", source - 193),
        201 => "DLOADX on RS-232".to_string(),
        241 => "Admin".to_string(),
        255 => "Service".to_string(),
        other => format!("Device {}", other),
    }
}

/// Source column for a record. Falls back to `Source <n>` when the code is
/// unknown or its kind is not classified.
pub fn describe_source(record: &EventRecord, table: &EventCodeTable) -> String {
    table
        .lookup(record.code)
        .and_then(|info| info.source_kind)
        .map_or(SourceKind::Other, SourceKind::from_kind)
        .describe(record)
}

/// Description column for a record.
pub fn describe_event(record: &EventRecord, table: &EventCodeTable) -> String {
    match table.description(record) {
        Some(description) => description.to_string(),
        None => format!("[Unknown code: {:04X}]", record.code),
    }
}

/// One listing line: ` 1. 2024-06-01 08:30 | description | source`.
/// `position` is 1-based.
pub fn format_event(position: usize, record: &EventRecord, table: &EventCodeTable) -> String {
    format!(
        "{:2}. {} {} | {:<45} | {}",
        position,
        record.date_string(),
        record.time_string(),
        describe_event(record, table),
        describe_source(record, table)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> EventCodeTable {
        EventCodeTable::from_json_str(
            r#"{
                "1": {"desc": "Zone alarm", "restore_desc": "End of zone alarm", "kind": 1},
                "2": {"desc": "Armed", "kind": 3},
                "3": {"desc": "Module event", "kind": 31},
                "4": {"desc": "Clock set", "kind": 0},
                "5": {"desc": "Odd kind", "kind": 17}
            }"#,
        )
        .unwrap()
    }

    fn record(code: u16, source: u8, restore: bool) -> EventRecord {
        EventRecord {
            year: 2024,
            month: 6,
            day: 1,
            hour: 8,
            minute: 5,
            code,
            source,
            partition: 2,
            restore,
            continuation: true,
        }
    }

    #[test]
    fn test_source_kind_mapping() {
        assert_eq!(SourceKind::from_kind(0), SourceKind::System);
        assert_eq!(SourceKind::from_kind(4), SourceKind::Device);
        assert_eq!(SourceKind::from_kind(9), SourceKind::User);
        assert_eq!(SourceKind::from_kind(30), SourceKind::IpData);
        assert_eq!(SourceKind::from_kind(5), SourceKind::Other);
        assert_eq!(SourceKind::from_kind(-1), SourceKind::Other);
        assert_eq!(SourceKind::IpData.label(), "IP data");
        assert_eq!(SourceKind::Other.label(), "Source");
    }

    #[test]
    fn test_device_names() {
        assert_eq!(device_name(1), "Zone 1");
        assert_eq!(device_name(128), "Zone 128");
        assert_eq!(device_name(193), "Keypad (address 0)");
        assert_eq!(device_name(200), "Keypad (address 7)");
        assert_eq!(device_name(201), "DLOADX on RS-232");
        assert_eq!(device_name(241), "Admin");
        assert_eq!(device_name(255), "Service");
        assert_eq!(device_name(0), "Device 0");
        assert_eq!(device_name(150), "Device 150");
    }

    #[test]
    fn test_describe_source() {
        let table = table();
        assert_eq!(describe_source(&record(1, 12, false), &table), "Zone 12");
        assert_eq!(describe_source(&record(2, 7, false), &table), "User 7");
        assert_eq!(describe_source(&record(3, 9, false), &table), "IP data (P: 2, S: 9)");
        assert_eq!(describe_source(&record(4, 0, false), &table), "System 0");
        assert_eq!(describe_source(&record(5, 4, false), &table), "Source 4");
        assert_eq!(describe_source(&record(99, 4, false), &table), "Source 4");
    }

    #[test]
    fn test_describe_event() {
        let table = table();
        assert_eq!(describe_event(&record(1, 1, false), &table), "Zone alarm");
        assert_eq!(describe_event(&record(1, 1, true), &table), "End of zone alarm");
        assert_eq!(describe_event(&record(0x1AB, 1, false), &table), "[Unknown code: 01AB]");
    }

    #[test]
    fn test_format_event() {
        let line = format_event(3, &record(2, 7, false), &table());
        assert_eq!(
            line,
            format!(" 3. 2024-06-01 08:05 | {:<45} | User 7", "Armed")
        );
    }
}
