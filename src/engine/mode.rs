//! Surface modes and qualifier keys

use crate::convert::ActiveQualifier;
use crate::host::TrackRef;
use crate::surface::Strip;

/// Aux bus slot 1..=6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuxSlot(u8);

impl AuxSlot {
    pub fn new(number: u8) -> Option<Self> {
        (1..=6).contains(&number).then_some(AuxSlot(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = AuxSlot> {
        (1..=6).map(AuxSlot)
    }
}

/// Mutually exclusive primary modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimaryMode {
    /// Encoders drive pan (or width)
    #[default]
    Pan,
    /// One track's FX parameters spread across the strips
    ChannelStrip,
    /// Encoders drive the send to one aux bus
    Aux(AuxSlot),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeState {
    pub primary: PrimaryMode,
    /// Swap fader and encoder roles
    pub flip: bool,
    /// Jog wheel scrubs instead of moving the edit cursor
    pub scrub: bool,
}

impl ModeState {
    pub fn is_pan(&self) -> bool {
        self.primary == PrimaryMode::Pan
    }

    pub fn is_channel_strip(&self) -> bool {
        self.primary == PrimaryMode::ChannelStrip
    }

    pub fn aux(&self) -> Option<AuxSlot> {
        match self.primary {
            PrimaryMode::Aux(slot) => Some(slot),
            _ => None,
        }
    }
}

/// Momentary modifier keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Qualifiers {
    pub function_key: bool,
    pub shift: bool,
}

impl Qualifiers {
    pub fn any(&self) -> bool {
        self.function_key || self.shift
    }

    pub fn active(&self) -> ActiveQualifier {
        ActiveQualifier::from_keys(self.function_key, self.shift)
    }
}

/// Channel strip selection, kept while the mode is left and re-entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStrip {
    pub strip: Strip,
    /// Track captured when the strip was chosen
    pub track: TrackRef,
    pub fx: usize,
    /// First FX parameter shown on strip 0, a multiple of 24
    pub param_offset: usize,
}

impl Default for ChannelStrip {
    fn default() -> Self {
        Self {
            strip: Strip::FIRST,
            track: TrackRef::Track(0),
            fx: 0,
            param_offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aux_slot_range() {
        assert_eq!(AuxSlot::new(0), None);
        assert_eq!(AuxSlot::new(7), None);
        assert_eq!(AuxSlot::new(6).map(AuxSlot::number), Some(6));
        assert_eq!(AuxSlot::all().count(), 6);
    }

    #[test]
    fn test_qualifier_precedence() {
        let both = Qualifiers {
            function_key: true,
            shift: true,
        };
        assert_eq!(both.active(), ActiveQualifier::FunctionKey);
        assert!(both.any());
        assert_eq!(Qualifiers::default().active(), ActiveQualifier::None);
    }

    #[test]
    fn test_mode_queries() {
        let mut mode = ModeState::default();
        assert!(mode.is_pan());
        assert_eq!(mode.aux(), None);

        mode.primary = PrimaryMode::Aux(AuxSlot(2));
        assert!(!mode.is_pan());
        assert!(!mode.is_channel_strip());
        assert_eq!(mode.aux(), Some(AuxSlot(2)));
    }
}
