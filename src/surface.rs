//! Tascam US-2400 surface protocol
//!
//! Wire constants, control addressing and the output half of the protocol.
//! Input decoding lives in [`decoder`], the MIDI connection in [`device`].

pub mod decoder;
pub mod device;
pub mod fader_pair;
pub mod threaded_output;

pub use decoder::{Decoder, InputEvent, JoystickAxis};
pub use device::{DeviceError, DeviceStatus, Us2400Device};
pub use threaded_output::ThreadedOutput;

use std::fmt;
use std::time::Duration;

use crate::midi::split_14bit;

/// Buttons, strip elements and lamps
pub const STATUS_BUTTON: u8 = 0xB1;
/// Faders, encoders, jog wheel and bank LEDs
pub const STATUS_CONTROL: u8 = 0xB0;
pub const STATUS_MASTER_TOUCH: u8 = 0xB2;
pub const STATUS_JOYSTICK: u8 = 0xBE;

/// Button value for "pressed" and lamp value for "on"
pub const VALUE_ON: u8 = 0x7F;
pub const VALUE_BLINK: u8 = 0x01;

/// Strip element controllers are below this value
pub const STRIP_ELEMENT_LIMIT: u8 = 0x60;
pub const FADER_HIGH_BASE: u8 = 0x00;
pub const FADER_HIGH_LAST: u8 = 0x18;
pub const FADER_LOW_BASE: u8 = 0x20;
pub const FADER_LOW_LAST: u8 = 0x38;
/// Fader low half is written one controller below where it is read
pub const FADER_OUT_LOW_BASE: u8 = 0x1F;
pub const JOG_WHEEL: u8 = 0x3C;
pub const ENCODER_BASE: u8 = 0x40;
pub const ENCODER_LAST: u8 = 0x58;
pub const BANK_LEDS: u8 = 0x5D;
pub const JOYSTICK_X: u8 = 0x5A;
pub const JOYSTICK_Y: u8 = 0x5B;
/// Highest lamp address
pub const LAMP_LAST: u8 = 0x79;

/// Encoder ring display modes, added to the ring value
pub const RING_PAN: u8 = 0x10;
pub const RING_BAR: u8 = 0x20;
pub const RING_WIDTH: u8 = 0x30;
pub const RING_DOT: u8 = 0x40;
/// Raw ring value of an inactive encoder in pan mode
pub const RING_INACTIVE_PAN: u8 = 15;

pub const TRACK_STRIPS: u8 = 24;
pub const STRIP_COUNT: u8 = 25;

/// Highest value shown on the bank LEDs
const BANK_LED_MAX: usize = 7;

/// Physical strip: 0..=23 track strips, 24 master
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Strip(u8);

impl Strip {
    pub const FIRST: Strip = Strip(0);
    pub const MASTER: Strip = Strip(TRACK_STRIPS);

    pub fn new(index: u8) -> Option<Self> {
        (index < STRIP_COUNT).then_some(Strip(index))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn is_master(self) -> bool {
        self.0 == TRACK_STRIPS
    }

    /// Track strips 0..=23
    pub fn tracks() -> impl Iterator<Item = Strip> {
        (0..TRACK_STRIPS).map(Strip)
    }

    /// All strips, master last
    pub fn all() -> impl Iterator<Item = Strip> {
        (0..STRIP_COUNT).map(Strip)
    }

    /// Lamp address of one of this strip's buttons
    pub fn lamp(self, element: StripElement) -> u8 {
        if self.is_master() {
            return Button::MasterSelect.cc();
        }
        self.0 * 4 + element.offset()
    }
}

impl fmt::Display for Strip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_master() {
            write!(f, "master strip")
        } else {
            write!(f, "strip {}", self.0 + 1)
        }
    }
}

/// Per-strip controls addressed as `strip * 4 + element`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripElement {
    Touch,
    Select,
    Solo,
    Mute,
}

impl StripElement {
    pub fn from_offset(offset: u8) -> Option<Self> {
        match offset {
            0 => Some(StripElement::Touch),
            1 => Some(StripElement::Select),
            2 => Some(StripElement::Solo),
            3 => Some(StripElement::Mute),
            _ => None,
        }
    }

    pub fn offset(self) -> u8 {
        match self {
            StripElement::Touch => 0,
            StripElement::Select => 1,
            StripElement::Solo => 2,
            StripElement::Mute => 3,
        }
    }
}

/// Global buttons; each button's controller is also its lamp address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    MasterSelect,
    ClearSolo,
    Flip,
    Chan,
    /// Aux 1..=6
    Aux(u8),
    Pan,
    FunctionKey,
    Null,
    Scrub,
    BankDown,
    BankUp,
    In,
    Out,
    Shift,
    Rewind,
    FastForward,
    Stop,
    Play,
    Record,
}

impl Button {
    pub fn from_cc(cc: u8) -> Option<Self> {
        let button = match cc {
            0x61 => Button::MasterSelect,
            0x62 => Button::ClearSolo,
            0x63 => Button::Flip,
            0x64 => Button::Chan,
            0x65..=0x6A => Button::Aux(cc - 0x64),
            0x6C => Button::Pan,
            0x6D => Button::FunctionKey,
            0x6E => Button::Null,
            0x6F => Button::Scrub,
            0x70 => Button::BankDown,
            0x71 => Button::BankUp,
            0x72 => Button::In,
            0x73 => Button::Out,
            0x74 => Button::Shift,
            0x75 => Button::Rewind,
            0x76 => Button::FastForward,
            0x77 => Button::Stop,
            0x78 => Button::Play,
            0x79 => Button::Record,
            _ => return None,
        };
        Some(button)
    }

    pub fn cc(self) -> u8 {
        match self {
            Button::MasterSelect => 0x61,
            Button::ClearSolo => 0x62,
            Button::Flip => 0x63,
            Button::Chan => 0x64,
            Button::Aux(n) => 0x64 + n.clamp(1, 6),
            Button::Pan => 0x6C,
            Button::FunctionKey => 0x6D,
            Button::Null => 0x6E,
            Button::Scrub => 0x6F,
            Button::BankDown => 0x70,
            Button::BankUp => 0x71,
            Button::In => 0x72,
            Button::Out => 0x73,
            Button::Shift => 0x74,
            Button::Rewind => 0x75,
            Button::FastForward => 0x76,
            Button::Stop => 0x77,
            Button::Play => 0x78,
            Button::Record => 0x79,
        }
    }
}

/// Lamp state as written to the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lamp {
    #[default]
    Off,
    On,
    Blink,
}

impl Lamp {
    pub fn from_bool(on: bool) -> Self {
        if on {
            Lamp::On
        } else {
            Lamp::Off
        }
    }

    pub fn value(self) -> u8 {
        match self {
            Lamp::Off => 0x00,
            Lamp::On => VALUE_ON,
            Lamp::Blink => VALUE_BLINK,
        }
    }
}

/// Sink for 3-byte surface messages
pub trait SurfaceOutput {
    fn send(&mut self, message: [u8; 3]);

    /// Block until every queued message was written, polling at `poll`.
    /// Returns false when `timeout` elapsed first.
    fn wait_drained(&mut self, _timeout: Duration, _poll: Duration) -> bool {
        true
    }
}

/// A missing output port drops everything
impl<O: SurfaceOutput> SurfaceOutput for Option<O> {
    fn send(&mut self, message: [u8; 3]) {
        if let Some(output) = self {
            output.send(message);
        }
    }

    fn wait_drained(&mut self, timeout: Duration, poll: Duration) -> bool {
        match self {
            Some(output) => output.wait_drained(timeout, poll),
            None => true,
        }
    }
}

/// Records every message, for tests and dry runs
#[derive(Debug, Default, Clone)]
pub struct MemoryOutput {
    messages: Vec<[u8; 3]>,
}

impl MemoryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[[u8; 3]] {
        &self.messages
    }

    pub fn take(&mut self) -> Vec<[u8; 3]> {
        std::mem::take(&mut self.messages)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn contains(&self, message: [u8; 3]) -> bool {
        self.messages.contains(&message)
    }

    /// Last value written to a controller under a status byte
    pub fn last_value(&self, status: u8, controller: u8) -> Option<u8> {
        self.messages
            .iter()
            .rev()
            .find(|m| m[0] == status && m[1] == controller)
            .map(|m| m[2])
    }
}

impl SurfaceOutput for MemoryOutput {
    fn send(&mut self, message: [u8; 3]) {
        self.messages.push(message);
    }
}

/// Motor fader position: low half first, then high half
pub fn fader_messages(strip: Strip, position: u16) -> [[u8; 3]; 2] {
    let (low, high) = split_14bit(position);
    [
        [STATUS_CONTROL, FADER_OUT_LOW_BASE + strip.index(), low],
        [STATUS_CONTROL, FADER_HIGH_BASE + strip.index(), high],
    ]
}

pub fn encoder_message(strip: Strip, ring: u8) -> [u8; 3] {
    [STATUS_CONTROL, ENCODER_BASE + strip.index(), ring & 0x7F]
}

pub fn lamp_message(lamp: u8, state: Lamp) -> [u8; 3] {
    [STATUS_BUTTON, lamp, state.value()]
}

/// Bank LEDs show the bank offset in pages of 24 tracks
pub fn bank_leds_message(offset: usize) -> [u8; 3] {
    let page = (offset / TRACK_STRIPS as usize).min(BANK_LED_MAX) as u8;
    [STATUS_CONTROL, BANK_LEDS, page]
}
