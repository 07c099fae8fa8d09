//! Value conversion between surface units and mixer values
//!
//! Physical units are 14-bit fader positions (0-16383), relative encoder
//! ticks and encoder ring positions (1-15). Mixer units are linear volume
//! amplitudes, pan/width in -1..=1 and FX parameters in their declared
//! `min..=max` range.
//!
//! Volume goes through a 0-1000 "slider" domain and a logarithmic
//! slider/dB curve so that fader travel feels like a console taper. Every
//! function clamps its output, also for out-of-range input.

use crate::midi::MAX_14BIT;

/// Upper end of the slider domain
pub const SLIDER_MAX: f64 = 1000.0;

/// dB value at full slider travel
pub const SLIDER_TOP_DB: f64 = 12.0;

/// dB per decade of slider travel
const SLIDER_DB_PER_DECADE: f64 = 80.0;

/// Lowest encoder ring position
pub const RING_MIN: u8 = 1;

/// Highest encoder ring position
pub const RING_MAX: u8 = 15;

/// Number of steps across the ring (RING_MAX - RING_MIN)
const RING_SPAN: f64 = 14.0;

const FADER_MAX: f64 = MAX_14BIT as f64;

/// Step sizes applied per encoder tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncoderSteps {
    /// Fader units per tick on volume targets
    pub volume: f64,
    /// Absolute pan/width change per tick
    pub pan: f64,
    /// Parameter range is divided into this many ticks
    pub fx_resolution: f64,
}

impl Default for EncoderSteps {
    fn default() -> Self {
        Self {
            volume: 100.0,
            pan: 0.01,
            fx_resolution: 200.0,
        }
    }
}

// --- dB curve ---------------------------------------------------------------

/// Slider position (0-1000) to dB; 0 maps to -inf
pub fn slider_to_db(slider: f64) -> f64 {
    let slider = slider.clamp(0.0, SLIDER_MAX);
    if slider <= 0.0 {
        return f64::NEG_INFINITY;
    }
    SLIDER_TOP_DB + SLIDER_DB_PER_DECADE * (slider / SLIDER_MAX).log10()
}

/// dB to slider position (0-1000)
pub fn db_to_slider(db: f64) -> f64 {
    if db.is_nan() || db == f64::NEG_INFINITY {
        return 0.0;
    }
    let slider = SLIDER_MAX * 10f64.powf((db - SLIDER_TOP_DB) / SLIDER_DB_PER_DECADE);
    slider.clamp(0.0, SLIDER_MAX)
}

/// dB to linear amplitude
pub fn db_to_amplitude(db: f64) -> f64 {
    if db == f64::NEG_INFINITY {
        return 0.0;
    }
    10f64.powf(db / 20.0)
}

/// Linear amplitude to dB; zero and negative amplitudes map to -inf
pub fn amplitude_to_db(amplitude: f64) -> f64 {
    if amplitude.is_nan() || amplitude <= 0.0 {
        return f64::NEG_INFINITY;
    }
    20.0 * amplitude.log10()
}

fn volume_to_slider(volume: f64) -> f64 {
    db_to_slider(amplitude_to_db(volume))
}

fn slider_to_volume(slider: f64) -> f64 {
    db_to_amplitude(slider_to_db(slider))
}

fn round_fader(value: f64) -> u16 {
    value.clamp(0.0, FADER_MAX).round() as u16
}

fn round_ring(value: f64) -> u8 {
    value.clamp(f64::from(RING_MIN), f64::from(RING_MAX)).round() as u8
}

// --- Volume / send level ----------------------------------------------------

/// Fader position to volume amplitude
pub fn fader_to_volume(position: u16) -> f64 {
    let slider = f64::from(position.min(MAX_14BIT)) * SLIDER_MAX / FADER_MAX;
    slider_to_volume(slider)
}

/// Volume amplitude to fader position
pub fn volume_to_fader(volume: f64) -> u16 {
    round_fader(volume_to_slider(volume) * FADER_MAX / SLIDER_MAX)
}

/// Apply relative encoder ticks to a volume, stepping in fader units
pub fn encoder_to_volume(old: f64, ticks: i32, steps: &EncoderSteps) -> f64 {
    let position = volume_to_slider(old) * FADER_MAX / SLIDER_MAX;
    let moved = position + f64::from(ticks) * steps.volume;
    let slider = (moved * SLIDER_MAX / FADER_MAX).clamp(0.0, SLIDER_MAX);
    slider_to_volume(slider)
}

/// Volume amplitude to encoder ring position
pub fn volume_to_ring(volume: f64) -> u8 {
    round_ring(volume_to_slider(volume) * RING_SPAN / SLIDER_MAX + 1.0)
}

// --- Pan / width --------------------------------------------------------------

/// Fader position to pan/width (-1..=1)
pub fn fader_to_pan(position: u16) -> f64 {
    (-1.0 + f64::from(position) / FADER_MAX * 2.0).clamp(-1.0, 1.0)
}

/// Pan/width to fader position
pub fn pan_to_fader(value: f64) -> u16 {
    round_fader((1.0 + value) * FADER_MAX * 0.5)
}

/// Apply relative encoder ticks to a pan or width value
pub fn encoder_to_pan(old: f64, ticks: i32, steps: &EncoderSteps) -> f64 {
    (old + f64::from(ticks) * steps.pan).clamp(-1.0, 1.0)
}

/// Pan to encoder ring position (centre = 8)
pub fn pan_to_ring(value: f64) -> u8 {
    round_ring((1.0 + value) * RING_SPAN * 0.5 + 1.0)
}

/// Width to encoder ring position (spread grows from the centre)
pub fn width_to_ring(value: f64) -> u8 {
    round_ring(value.abs() * RING_SPAN * 0.5 + 1.0)
}

// --- FX parameters ------------------------------------------------------------

fn range_fraction(min: f64, max: f64, value: f64) -> f64 {
    let span = max - min;
    if span.abs() < f64::EPSILON {
        return 0.0;
    }
    (value - min) / span
}

fn clamp_to_range(value: f64, min: f64, max: f64) -> f64 {
    if min <= max {
        value.clamp(min, max)
    } else {
        value.clamp(max, min)
    }
}

/// Fader position to a parameter value in `min..=max`
pub fn fader_to_param(min: f64, max: f64, position: u16) -> f64 {
    clamp_to_range(min + f64::from(position) / FADER_MAX * (max - min), min, max)
}

/// Parameter value to fader position
pub fn param_to_fader(min: f64, max: f64, value: f64) -> u16 {
    round_fader(range_fraction(min, max, value) * FADER_MAX)
}

/// Apply relative encoder ticks to a parameter value
pub fn encoder_to_param(old: f64, min: f64, max: f64, ticks: i32, steps: &EncoderSteps) -> f64 {
    let step = (max - min) / steps.fx_resolution;
    clamp_to_range(old + f64::from(ticks) * step, min, max)
}

/// Parameter value to encoder ring position
pub fn param_to_ring(min: f64, max: f64, value: f64) -> u8 {
    round_ring(range_fraction(min, max, value) * RING_SPAN + 1.0)
}

// --- Qualifier snapping -------------------------------------------------------

/// Momentary qualifier in effect for one input, FunctionKey winning over Shift
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveQualifier {
    None,
    FunctionKey,
    Shift,
}

impl ActiveQualifier {
    pub fn from_keys(function_key: bool, shift: bool) -> Self {
        if function_key {
            ActiveQualifier::FunctionKey
        } else if shift {
            ActiveQualifier::Shift
        } else {
            ActiveQualifier::None
        }
    }
}

/// What kind of value a control is driving
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueKind {
    /// Track, master or send level
    Volume,
    /// Track or send pan
    Pan,
    /// Track stereo width; reached with FunctionKey held, so only Shift snaps
    Width,
    /// FX parameter with its declared range
    FxParam { min: f64, max: f64 },
}

/// Fixed value a qualifier snaps the target to, if any
///
/// | kind | FunctionKey | Shift |
/// |------|-------------|-------|
/// | volume | 0.0 | 1.0 |
/// | pan | - | 0.0 |
/// | width | - | 1.0 |
/// | fx param | min | max |
pub fn snap_for_qualifier(kind: ValueKind, function_key: bool, shift: bool) -> Option<f64> {
    match kind {
        ValueKind::Volume => match ActiveQualifier::from_keys(function_key, shift) {
            ActiveQualifier::FunctionKey => Some(0.0),
            ActiveQualifier::Shift => Some(1.0),
            ActiveQualifier::None => None,
        },
        ValueKind::Pan => shift.then_some(0.0),
        ValueKind::Width => shift.then_some(1.0),
        ValueKind::FxParam { min, max } => match ActiveQualifier::from_keys(function_key, shift) {
            ActiveQualifier::FunctionKey => Some(min),
            ActiveQualifier::Shift => Some(max),
            ActiveQualifier::None => None,
        },
    }
}
