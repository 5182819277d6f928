// MIT License - Copyright (c) 2026 Peter Wright
// Event code descriptions

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::record::EventRecord;

/// Description of one event code, as listed in the vendor code file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventCodeInfo {
    #[serde(rename = "desc")]
    pub description: String,
    /// Text used instead of `description` for restore events
    #[serde(rename = "restore_desc", default)]
    pub restore_description: Option<String>,
    /// What the record's source number refers to; see
    /// [`SourceKind`](crate::display::SourceKind)
    #[serde(rename = "kind", default)]
    pub source_kind: Option<i32>,
}

/// Read-only mapping from event code to its description.
///
/// Loaded from JSON of the form
/// `{"1": {"desc": "...", "restore_desc": "...", "kind": 1}, ...}`.
#[derive(Debug, Clone, Default)]
pub struct EventCodeTable {
    codes: HashMap<u16, EventCodeInfo>,
}

/// Code file keys are decimal strings.
fn deserialize_codes<'de, D>(deserializer: D) -> std::result::Result<HashMap<u16, EventCodeInfo>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let string_map: HashMap<String, EventCodeInfo> = HashMap::deserialize(deserializer)?;
    string_map
        .into_iter()
        .map(|(k, v)| {
            k.trim()
                .parse::<u16>()
                .map(|code| (code, v))
                .map_err(|_| serde::de::Error::custom(format!("invalid event code: {k}")))
        })
        .collect()
}

impl EventCodeTable {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let codes = deserialize_codes(&mut deserializer)?;
        deserializer.end()?;
        let table = Self { codes };
        debug!("Loaded {} event code descriptions", table.len());
        Ok(table)
    }

    /// Read and parse a code file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn lookup(&self, code: u16) -> Option<&EventCodeInfo> {
        self.codes.get(&code)
    }

    /// Description for a record, using the restore text for restore events
    /// when the table has one. `None` for unknown codes.
    pub fn description(&self, record: &EventRecord) -> Option<&str> {
        let info = self.lookup(record.code)?;
        match (&info.restore_description, record.is_restore()) {
            (Some(restore), true) => Some(restore.as_str()),
            _ => Some(info.description.as_str()),
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SatelError;

    const SAMPLE: &str = r#"{
        "1": {"desc": "Zone alarm", "restore_desc": "Zone alarm restored", "kind": 1},
        "422": {"desc": "Armed by user", "kind": 2},
        "1000": {"desc": "System event"}
    }"#;

    fn record(code: u16, restore: bool) -> EventRecord {
        EventRecord {
            year: 2024,
            month: 6,
            day: 1,
            hour: 8,
            minute: 30,
            code,
            source: 3,
            partition: 1,
            restore,
            continuation: true,
        }
    }

    #[test]
    fn test_parse_and_lookup() {
        let table = EventCodeTable::from_json_str(SAMPLE).unwrap();
        assert_eq!(table.len(), 3);
        let info = table.lookup(422).unwrap();
        assert_eq!(info.description, "Armed by user");
        assert_eq!(info.restore_description, None);
        assert_eq!(info.source_kind, Some(2));
        assert_eq!(table.lookup(1000).unwrap().source_kind, None);
        assert!(table.lookup(7).is_none());
    }

    #[test]
    fn test_restore_description() {
        let table = EventCodeTable::from_json_str(SAMPLE).unwrap();
        assert_eq!(table.description(&record(1, false)), Some("Zone alarm"));
        assert_eq!(table.description(&record(1, true)), Some("Zone alarm restored"));
        // No restore text: fall back to the plain description
        assert_eq!(table.description(&record(422, true)), Some("Armed by user"));
        assert_eq!(table.description(&record(9, false)), None);
    }

    #[test]
    fn test_rejects_non_numeric_code() {
        let err = EventCodeTable::from_json_str(r#"{"abc": {"desc": "x"}}"#).unwrap_err();
        assert!(matches!(err, SatelError::InvalidCodeTable(_)));
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(EventCodeTable::from_json_str("{").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = EventCodeTable::load("/nonexistent/event_codes.json").unwrap_err();
        assert!(matches!(err, SatelError::Io(_)));
    }

    #[test]
    fn test_load_file() {
        let path = std::env::temp_dir().join(format!("satel_codes_{}.json", std::process::id()));
        std::fs::write(&path, SAMPLE).unwrap();
        let table = EventCodeTable::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(table.lookup(1).unwrap().description, "Zone alarm");
    }
}
