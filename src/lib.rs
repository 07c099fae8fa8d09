//! US2400 GW - Tascam US-2400 control surface gateway
//!
//! Translates between the US-2400's MIDI protocol and a host mixing console:
//! decodes surface input into typed events, maps the 25 physical strips onto
//! tracks, sends and FX parameters depending on the active mode, and keeps
//! faders, encoder rings and lamps in sync with the host.

pub mod config;
pub mod convert;
pub mod engine;
pub mod host;
pub mod midi;
pub mod paths;
pub mod sniffer;
pub mod surface;

pub use engine::Engine;
pub use host::{Host, HostEvent, TrackRef};
pub use surface::{SurfaceOutput, Us2400Device};
