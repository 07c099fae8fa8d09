//! Surface message decoder
//!
//! Turns raw 3- or 4-byte controller messages into [`InputEvent`]s.
//! Fader positions need two messages; the decoder holds the per-strip
//! pairing state between them.

use std::fmt;
use tracing::trace;

use super::fader_pair::FaderPairing;
use super::{
    Button, Strip, StripElement, ENCODER_BASE, ENCODER_LAST, FADER_HIGH_BASE, FADER_HIGH_LAST,
    FADER_LOW_BASE, FADER_LOW_LAST, JOG_WHEEL, JOYSTICK_X, JOYSTICK_Y, STATUS_BUTTON,
    STATUS_CONTROL, STATUS_JOYSTICK, STATUS_MASTER_TOUCH, STRIP_ELEMENT_LIMIT, VALUE_ON,
};
use crate::midi::{decode_relative, format_hex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoystickAxis {
    X,
    Y,
}

/// Decoded surface input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Button { button: Button, pressed: bool },
    /// Select, solo or mute of a track strip
    StripButton {
        strip: Strip,
        element: StripElement,
        pressed: bool,
    },
    FaderTouch { strip: Strip, touched: bool },
    /// Completed 14-bit fader position
    Fader { strip: Strip, position: u16 },
    /// Relative encoder movement, negative is counter-clockwise
    Encoder { strip: Strip, ticks: i32 },
    JogWheel { ticks: i32 },
    /// Absolute joystick axis value, sampled by the engine on its own schedule
    Joystick { axis: JoystickAxis, value: u8 },
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = |on: bool| if on { "down" } else { "up" };
        match self {
            InputEvent::Button { button, pressed } => {
                write!(f, "Button {:?} {}", button, state(*pressed))
            }
            InputEvent::StripButton {
                strip,
                element,
                pressed,
            } => write!(f, "{} {:?} {}", strip, element, state(*pressed)),
            InputEvent::FaderTouch { strip, touched } => {
                write!(f, "{} touch {}", strip, if *touched { "on" } else { "off" })
            }
            InputEvent::Fader { strip, position } => {
                write!(f, "{} fader {}", strip, position)
            }
            InputEvent::Encoder { strip, ticks } => {
                write!(f, "{} encoder {:+}", strip, ticks)
            }
            InputEvent::JogWheel { ticks } => write!(f, "Jog {:+}", ticks),
            InputEvent::Joystick { axis, value } => {
                write!(f, "Joystick {:?}={}", axis, value)
            }
        }
    }
}

/// Stateful decoder for one surface
#[derive(Debug, Default)]
pub struct Decoder {
    pairing: FaderPairing,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one raw message. Returns None for ignored messages and for
    /// the first half of a fader move.
    pub fn decode(&mut self, data: &[u8]) -> Option<InputEvent> {
        if data.len() < 3 {
            trace!("Ignored short surface message: {}", format_hex(data));
            return None;
        }

        let (status, cc, value) = (data[0], data[1], data[2]);
        let pressed = value == VALUE_ON;

        let event = match status {
            STATUS_BUTTON => Self::decode_button(cc, pressed),
            STATUS_CONTROL => {
                if (FADER_LOW_BASE..=FADER_LOW_LAST).contains(&cc) {
                    // low half sits in the 4th byte when present
                    let low = data.get(3).copied().unwrap_or(value);
                    if let Some(strip) = Strip::new(cc - FADER_LOW_BASE) {
                        self.pairing.low(strip, low);
                        trace!("{} fader low half {:#04x}", strip, low);
                    }
                    return None;
                }
                self.decode_control(cc, value)
            }
            STATUS_MASTER_TOUCH => Some(InputEvent::FaderTouch {
                strip: Strip::MASTER,
                touched: pressed,
            }),
            STATUS_JOYSTICK => match cc {
                JOYSTICK_X => Some(InputEvent::Joystick {
                    axis: JoystickAxis::X,
                    value,
                }),
                JOYSTICK_Y => Some(InputEvent::Joystick {
                    axis: JoystickAxis::Y,
                    value,
                }),
                _ => None,
            },
            _ => None,
        };

        match &event {
            Some(event) => trace!("Decoded {} <= {}", event, format_hex(data)),
            None => trace!("Ignored surface message: {}", format_hex(data)),
        }
        event
    }

    /// Drop any half-received fader positions
    pub fn reset(&mut self) {
        self.pairing.reset();
    }

    fn decode_button(cc: u8, pressed: bool) -> Option<InputEvent> {
        if let Some(button) = Button::from_cc(cc) {
            return Some(InputEvent::Button { button, pressed });
        }
        if cc >= STRIP_ELEMENT_LIMIT {
            return None;
        }

        let strip = Strip::new(cc / 4)?;
        match StripElement::from_offset(cc % 4)? {
            StripElement::Touch => Some(InputEvent::FaderTouch {
                strip,
                touched: pressed,
            }),
            element => Some(InputEvent::StripButton {
                strip,
                element,
                pressed,
            }),
        }
    }

    fn decode_control(&mut self, cc: u8, value: u8) -> Option<InputEvent> {
        match cc {
            FADER_HIGH_BASE..=FADER_HIGH_LAST => {
                let strip = Strip::new(cc - FADER_HIGH_BASE)?;
                let position = self.pairing.high(strip, value)?;
                Some(InputEvent::Fader { strip, position })
            }
            JOG_WHEEL => Some(InputEvent::JogWheel {
                ticks: decode_relative(value),
            }),
            ENCODER_BASE..=ENCODER_LAST => Some(InputEvent::Encoder {
                strip: Strip::new(cc - ENCODER_BASE)?,
                ticks: decode_relative(value),
            }),
            _ => None,
        }
    }
}
