//! Bank offset arithmetic
//!
//! The 24 track strips show a window of the host's tracks starting at the
//! bank offset. Offsets move in pages of 8 (24 with Shift) and are shown on
//! the bank LEDs as `offset / 24`, which limits them to 168.

use crate::host::TrackRef;
use crate::surface::{Strip, TRACK_STRIPS};

pub const BANK_SIZE: usize = TRACK_STRIPS as usize;
pub const MAX_BANK_OFFSET: usize = 168;

/// Paging factor for one bank button press
pub fn page_factor(shift: bool) -> usize {
    if shift {
        24
    } else {
        8
    }
}

/// Largest offset that still shows the last track, aligned to `factor`
pub fn max_offset(track_count: usize, factor: usize) -> usize {
    let pages = track_count.div_ceil(factor).saturating_sub(BANK_SIZE / factor);
    (pages * factor).min(MAX_BANK_OFFSET)
}

/// Move the offset by one page in `direction` (-1 or +1). A clamp that
/// would move the offset against the requested direction keeps it.
pub fn shift_offset(current: usize, direction: i32, factor: usize, track_count: usize) -> usize {
    let factor_i = factor as i64;
    let mut offset = current as i64 + factor_i * direction.signum() as i64;
    offset -= offset % factor_i;
    offset = offset
        .min(max_offset(track_count, factor) as i64)
        .min(MAX_BANK_OFFSET as i64)
        .max(0);

    let old = current as i64;
    if (direction > 0 && offset < old) || (direction < 0 && offset > old) {
        return current;
    }
    offset as usize
}

/// Host track shown on a strip
pub fn track_for_strip(offset: usize, strip: Strip) -> TrackRef {
    if strip.is_master() {
        TrackRef::Master
    } else {
        TrackRef::Track(offset + strip.index() as usize)
    }
}

/// Strip showing a host track, if it is inside the bank window
pub fn strip_for_track(offset: usize, track: TrackRef) -> Option<Strip> {
    match track {
        TrackRef::Master => Some(Strip::MASTER),
        TrackRef::Track(i) => {
            let relative = i.checked_sub(offset)?;
            if relative < BANK_SIZE {
                Strip::new(relative as u8)
            } else {
                None
            }
        }
    }
}
