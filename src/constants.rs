// MIT License - Copyright (c) 2026 Peter Wright
// Protocol constants

/// Protocol framing bytes.
pub const FRAME_MARK: u8 = 0xFE; // Start of every delimiter and escape pair
pub const FRAME_END: u8 = 0x0D; // Second byte of the end delimiter
pub const ESCAPED_MARK: u8 = 0xF0; // Follows FRAME_MARK when a literal 0xFE is stuffed

/// `FE FE` opens a frame.
pub const START_DELIMITER: [u8; 2] = [FRAME_MARK, FRAME_MARK];
/// `FE 0D` closes a frame.
pub const END_DELIMITER: [u8; 2] = [FRAME_MARK, FRAME_END];

/// Read-event-log command. The panel echoes it as the first byte of the response.
pub const READ_EVENT_CMD: u8 = 0x8C;

/// TCP port of the panel's integration module.
pub const DEFAULT_PORT: u16 = 7094;

/// Initial accumulator of the frame checksum.
pub const CHECKSUM_SEED: u32 = 0x147A;

/// Size of a packed event record in a read-event-log response.
pub const RECORD_LEN: usize = 8;
/// Size of the log cursor sent in requests and returned after each record.
pub const CURSOR_LEN: usize = 3;

/// Cursor that starts a read of the standard event log.
pub const STANDARD_INITIAL_CURSOR: [u8; CURSOR_LEN] = [0xFF, 0xFF, 0xFF];
/// Cursor that starts a read of the Grade 2 event log.
pub const GRADE2_INITIAL_CURSOR: [u8; CURSOR_LEN] = [0x00, 0xFF, 0xFF];

/// Default name of the event code description file.
pub const DEFAULT_CODES_FILE: &str = "event_codes.json";
