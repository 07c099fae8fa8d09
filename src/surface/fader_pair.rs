//! Fader pairing - per-strip reassembly of 14-bit fader positions
//!
//! The surface sends every fader move as two controller messages, low half
//! first. Each strip keeps its own pending low half, so moves on different
//! faders may interleave freely.
//!
//! ## State machine (per strip):
//! - `Idle` + low half → `AwaitingHigh(low)`
//! - `AwaitingHigh` + low half → `AwaitingHigh(new low)`
//! - `AwaitingHigh(low)` + high half → `Idle`, position emitted
//! - `Idle` + high half → ignored

use crate::midi::join_14bit;

use super::{Strip, STRIP_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PairState {
    #[default]
    Idle,
    AwaitingHigh(u8),
}

/// Per-strip fader half pairing
#[derive(Debug, Clone, Default)]
pub struct FaderPairing {
    strips: [PairState; STRIP_COUNT as usize],
}

impl FaderPairing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the low half, replacing any pending one for this strip
    pub fn low(&mut self, strip: Strip, low: u8) {
        self.strips[strip.index() as usize] = PairState::AwaitingHigh(low & 0x7F);
    }

    /// Complete a pair. Returns the 14-bit position, or None when the strip
    /// was not awaiting a high half.
    pub fn high(&mut self, strip: Strip, high: u8) -> Option<u16> {
        let state = &mut self.strips[strip.index() as usize];
        match *state {
            PairState::AwaitingHigh(low) => {
                *state = PairState::Idle;
                Some(join_14bit(low, high))
            }
            PairState::Idle => None,
        }
    }

    pub fn is_pending(&self, strip: Strip) -> bool {
        matches!(self.strips[strip.index() as usize], PairState::AwaitingHigh(_))
    }

    pub fn reset(&mut self) {
        self.strips = Default::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(i: u8) -> Strip {
        Strip::new(i).unwrap()
    }

    #[test]
    fn test_pair_completes() {
        let mut pairing = FaderPairing::new();

        pairing.low(strip(3), 0x64);
        assert!(pairing.is_pending(strip(3)));
        assert_eq!(pairing.high(strip(3), 0x40), Some(8292));
        assert!(!pairing.is_pending(strip(3)));
    }

    #[test]
    fn test_orphan_high_ignored() {
        let mut pairing = FaderPairing::new();

        assert_eq!(pairing.high(strip(0), 0x7F), None);

        // A completed pair does not complete twice
        pairing.low(strip(0), 1);
        assert_eq!(pairing.high(strip(0), 0), Some(1));
        assert_eq!(pairing.high(strip(0), 0), None);
    }

    #[test]
    fn test_new_low_replaces_pending() {
        let mut pairing = FaderPairing::new();

        pairing.low(strip(1), 0x10);
        pairing.low(strip(1), 0x20);
        assert_eq!(pairing.high(strip(1), 0), Some(0x20));
    }

    #[test]
    fn test_interleaved_strips() {
        let mut pairing = FaderPairing::new();

        pairing.low(strip(2), 0x01);
        pairing.low(Strip::MASTER, 0x02);
        assert_eq!(pairing.high(Strip::MASTER, 0x7F), Some((0x7F << 7) | 0x02));
        assert_eq!(pairing.high(strip(2), 0x00), Some(0x01));
    }

    #[test]
    fn test_reset() {
        let mut pairing = FaderPairing::new();

        pairing.low(strip(4), 0x33);
        pairing.reset();
        assert_eq!(pairing.high(strip(4), 0x10), None);
    }
}
