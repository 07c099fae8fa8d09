//! MIDI utilities
//!
//! Byte-level helpers shared by the decoder, the renderers and the sniffer.

/// Largest 14-bit value (fader travel end)
pub const MAX_14BIT: u16 = 16383;

/// Control-change values at or above this are negative relative ticks
pub const RELATIVE_MIDPOINT: u8 = 0x40;

/// Split a 14-bit value into (low 7 bits, high 7 bits)
pub fn split_14bit(value: u16) -> (u8, u8) {
    let value = value.min(MAX_14BIT);
    ((value & 0x7F) as u8, ((value >> 7) & 0x7F) as u8)
}

/// Join low and high 7-bit halves into a 14-bit value
pub fn join_14bit(low: u8, high: u8) -> u16 {
    (u16::from(high & 0x7F) << 7) | u16::from(low & 0x7F)
}

/// Decode a relative controller value (encoders, jog wheel)
///
/// Values below the midpoint count up, values at or above it count down:
/// `0x01` is +1, `0x41` is -1.
pub fn decode_relative(value: u8) -> i32 {
    if value < RELATIVE_MIDPOINT {
        i32::from(value)
    } else {
        i32::from(RELATIVE_MIDPOINT) - i32::from(value)
    }
}

/// Format bytes as hex string for debugging
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
