// MIT License - Copyright (c) 2026 Peter Wright
// Event record layout

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::constants::RECORD_LEN;

/// One entry of the panel event log, unpacked from its 8-byte form.
///
/// The panel only stores the year modulo 4; `year` is reconstructed against
/// the reader's clock (see [`EventRecord::decode`]). Date and time fields are
/// kept as transmitted, so a corrupt record still decodes structurally and
/// [`EventRecord::timestamp`] returns `None` for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    /// 10-bit event code
    pub code: u16,
    /// Zone, user or device number, depending on the code's source kind
    pub source: u8,
    /// 5-bit partition number
    pub partition: u8,
    /// Return-to-normal rather than activation
    pub restore: bool,
    /// The "z" bit. Cleared on the record that ends the standard log.
    pub continuation: bool,
}

/// The record buffer did not hold exactly [`RECORD_LEN`] bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("event record must be 8 bytes, got {len}")]
pub struct RecordLengthError {
    pub len: usize,
}

impl EventRecord {
    /// Unpack a record, resolving its 2-bit year marker against `now`.
    ///
    /// ```text
    /// b1: yy z . . . . .    year marker, continuation flag
    /// b2: . . . d d d d d   day
    /// b3: m m m m t t t t   month, minutes-of-day bits 11..8
    /// b4: t t t t t t t t   minutes-of-day bits 7..0
    /// b5: p p p p p r c c   partition, restore, code bits 9..8
    /// b6: c c c c c c c c   code bits 7..0
    /// b7: source
    /// b8: unused
    /// ```
    pub fn decode(data: &[u8], now: NaiveDateTime) -> Result<Self, RecordLengthError> {
        let b: [u8; RECORD_LEN] = data
            .try_into()
            .map_err(|_| RecordLengthError { len: data.len() })?;

        let year_marker = (b[0] >> 6) & 0x03;
        let continuation = (b[0] >> 5) & 0x01 == 1;
        let day = b[1] & 0x1F;
        let month = (b[2] >> 4) & 0x0F;
        let minutes_of_day = (((b[2] & 0x0F) as u16) << 8) | b[3] as u16;
        let hour = (minutes_of_day / 60) as u8;
        let minute = (minutes_of_day % 60) as u8;
        let restore = (b[4] >> 2) & 0x01 == 1;
        let partition = (b[4] >> 3) & 0x1F;
        let code = (((b[4] & 0x03) as u16) << 8) | b[5] as u16;
        let source = b[6];

        let year = resolve_year(year_marker, month, day, hour, minute, now);

        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            code,
            source,
            partition,
            restore,
            continuation,
        })
    }

    /// The event time, if the transmitted fields form a real calendar date.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        to_datetime(self.year, self.month, self.day, self.hour, self.minute)
    }

    pub fn is_restore(&self) -> bool {
        self.restore
    }

    /// `YYYY-MM-DD`
    pub fn date_string(&self) -> String {
        format!("{}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// `HH:MM`
    pub fn time_string(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

/// Pick the year within the 4-year window ending at `now` whose low two bits
/// relative to the window base equal `marker`.
///
/// An impossible date falls back to the current year. A date that would lie
/// in the future belongs to the previous window.
fn resolve_year(marker: u8, month: u8, day: u8, hour: u8, minute: u8, now: NaiveDateTime) -> i32 {
    let current = now.year();
    let candidate = current - current.rem_euclid(4) + marker as i32;

    let (year, when) = match to_datetime(candidate, month, day, hour, minute) {
        Some(when) => (candidate, Some(when)),
        None => (current, to_datetime(current, month, day, hour, minute)),
    };

    match when {
        Some(when) if when > now => year - 4,
        _ => year,
    }
}

fn to_datetime(year: i32, month: u8, day: u8, hour: u8, minute: u8) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)?.and_hms_opt(hour as u32, minute as u32, 0)
}
