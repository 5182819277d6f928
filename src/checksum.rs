// MIT License - Copyright (c) 2026 Peter Wright
// Frame checksum

use crate::constants::CHECKSUM_SEED;

/// Compute the frame checksum over `data` (command byte plus payload).
///
/// Each step rotates the low 16 bits of the accumulator left by one, inverts
/// them, then adds the high byte of the inverted value and the data byte.
/// The sum is not truncated to 16 bits between steps, so the returned value
/// may exceed `0xFFFF`. Only [`checksum_bytes`] narrows it for the wire.
pub fn checksum(data: &[u8]) -> u32 {
    let mut acc = CHECKSUM_SEED;
    for &byte in data {
        let rotated = ((acc << 1) & 0xFFFF) | ((acc >> 15) & 0x01);
        let inverted = rotated ^ 0xFFFF;
        acc = inverted + (inverted >> 8) + byte as u32;
    }
    acc
}

/// The two checksum bytes as they appear on the wire: high byte, low byte.
pub fn checksum_bytes(data: &[u8]) -> [u8; 2] {
    let acc = checksum(data);
    [((acc >> 8) & 0xFF) as u8, (acc & 0xFF) as u8]
}
