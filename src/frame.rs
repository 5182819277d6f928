// MIT License - Copyright (c) 2026 Peter Wright
// Frame encoding and decoding

use tracing::debug;

use crate::checksum::checksum_bytes;
use crate::constants::{END_DELIMITER, ESCAPED_MARK, FRAME_END, FRAME_MARK, START_DELIMITER};

/// A command byte and its payload, with framing, escaping and checksum removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: u8,
    pub payload: Vec<u8>,
}

/// Reasons a delimited frame is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("checksum mismatch (expected {expected:04X}, received {received:04X})")]
    ChecksumMismatch { expected: u16, received: u16 },

    #[error("unexpected byte {0:#04X} after 0xFE inside frame")]
    UnexpectedEscape(u8),

    #[error("frame body too short ({len} bytes)")]
    TooShort { len: usize },
}

/// Result of scanning a receive buffer for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameDecode {
    /// A complete, checksum-verified frame. `consumed` counts buffer bytes up
    /// to and including its end delimiter.
    Complete { frame: Frame, consumed: usize },
    /// No start delimiter yet, or the frame is not terminated yet.
    NeedMoreData,
    Malformed(FrameError),
}

/// Build the wire frame for `command` + `payload`.
///
/// Layout: `FE FE`, escaped `[command, payload.., crc_hi, crc_lo]`, `FE 0D`.
/// Every literal `0xFE` between the delimiters is sent as `FE F0`.
pub fn encode_frame(command: u8, payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(payload.len() + 3);
    body.push(command);
    body.extend_from_slice(payload);
    let crc = checksum_bytes(&body);
    body.extend_from_slice(&crc);

    let mut frame = Vec::with_capacity(body.len() * 2 + 4);
    frame.extend_from_slice(&START_DELIMITER);
    for &byte in &body {
        frame.push(byte);
        if byte == FRAME_MARK {
            frame.push(ESCAPED_MARK);
        }
    }
    frame.extend_from_slice(&END_DELIMITER);
    frame
}

/// Find and decode the first frame in `buffer`.
///
/// Escape pairs are reversed before anything is read positionally, so a
/// payload byte of `0xFE` never shifts field offsets. Bytes before the start
/// delimiter are skipped.
pub fn decode_frame(buffer: &[u8]) -> FrameDecode {
    let Some(mut start) = buffer.windows(2).position(|w| w == START_DELIMITER.as_slice()) else {
        return FrameDecode::NeedMoreData;
    };
    // Stray 0xFE bytes ahead of the frame match the delimiter too early
    while buffer.get(start + 2) == Some(&FRAME_MARK)
        && !matches!(
            buffer.get(start + 3),
            Some(&ESCAPED_MARK) | Some(&FRAME_END) | None
        )
    {
        start += 1;
    }

    let mut unescaped = Vec::new();
    let mut i = start + START_DELIMITER.len();
    loop {
        let Some(&byte) = buffer.get(i) else {
            return FrameDecode::NeedMoreData;
        };
        if byte != FRAME_MARK {
            unescaped.push(byte);
            i += 1;
            continue;
        }
        let Some(&next) = buffer.get(i + 1) else {
            return FrameDecode::NeedMoreData;
        };
        match next {
            ESCAPED_MARK => unescaped.push(FRAME_MARK),
            FRAME_END => {
                i += 2;
                break;
            }
            other => return FrameDecode::Malformed(FrameError::UnexpectedEscape(other)),
        }
        i += 2;
    }

    // command byte + two checksum bytes at minimum
    if unescaped.len() < 3 {
        return FrameDecode::Malformed(FrameError::TooShort {
            len: unescaped.len(),
        });
    }

    let (body, crc) = unescaped.split_at(unescaped.len() - 2);
    let expected = checksum_bytes(body);
    if crc != expected.as_slice() {
        debug!("Checksum not ok (expected {}, got {})", hex(&expected), hex(crc));
        return FrameDecode::Malformed(FrameError::ChecksumMismatch {
            expected: u16::from_be_bytes(expected),
            received: u16::from_be_bytes([crc[0], crc[1]]),
        });
    }

    FrameDecode::Complete {
        frame: Frame {
            command: body[0],
            payload: body[1..].to_vec(),
        },
        consumed: i,
    }
}

/// Space-separated uppercase hex, for traffic logging.
pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
