//! Fader touch tracking

use crate::surface::Strip;

/// Set of faders currently held, one bit per strip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TouchState(u32);

impl TouchState {
    pub fn set(&mut self, strip: Strip, touched: bool) {
        let bit = 1u32 << strip.index();
        if touched {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }

    pub fn is_touched(&self, strip: Strip) -> bool {
        self.0 & (1u32 << strip.index()) != 0
    }

    pub fn any(&self) -> bool {
        self.0 != 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}
