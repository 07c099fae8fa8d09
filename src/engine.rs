//! Engine - translation between the US-2400 and the host mixer
//!
//! One `Engine` drives one surface. It is single-threaded and host-driven:
//! the host calls [`Engine::tick`] once per cycle with the raw messages
//! received since the last cycle, and forwards its own change notifications
//! through [`Engine::on_host_event`].
//!
//! The implementation is split the way the work is split:
//! - `dispatch`: decoded input → host mutations
//! - `transitions`: mode, qualifier and channel strip changes
//! - `transport`: transport, time selection, jog wheel and joystick
//! - `render`: host state → surface messages
//! - `feedback`: host notifications
//! - `lifecycle`: tick, initialization and shutdown

pub mod bank;
mod dispatch;
mod feedback;
mod lifecycle;
pub mod mode;
mod render;
pub mod resolver;
pub mod touch;
mod transitions;
mod transport;

#[cfg(test)]
mod tests;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::convert::EncoderSteps;
use crate::host::{AutomationMode, Host, TrackRef};
use crate::surface::{Decoder, Strip, SurfaceOutput};

use mode::{ChannelStrip, ModeState, Qualifiers};
use resolver::{Control, ResolveContext, Target};
use touch::TouchState;

/// Joystick resting position on both axes
const JOYSTICK_CENTER: u8 = 0x3F;

/// Asymmetric blink phase shared by all blinking indicators
#[derive(Debug, Clone, Copy, Default)]
struct BlinkState {
    on: bool,
    counter: u32,
}

/// Transport state mirrored from the host
#[derive(Debug, Clone, Copy, Default)]
struct TransportState {
    playing: bool,
    recording: bool,
    repeat: bool,
    automation: AutomationMode,
    /// Time selection saved by "loop all", restored on the second press
    saved_selection: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Copy)]
struct JoystickState {
    x: u8,
    y: u8,
    counter: u32,
}

impl Default for JoystickState {
    fn default() -> Self {
        Self {
            x: JOYSTICK_CENTER,
            y: JOYSTICK_CENTER,
            counter: 0,
        }
    }
}

/// Surface engine for one US-2400
pub struct Engine<H: Host, O: SurfaceOutput> {
    host: H,
    output: O,
    config: EngineConfig,
    steps: EncoderSteps,
    decoder: Decoder,
    mode: ModeState,
    qualifiers: Qualifiers,
    channel: ChannelStrip,
    bank_offset: usize,
    touch: TouchState,
    /// Next strip refreshed by the rotating update
    cursor: u8,
    blink: BlinkState,
    transport: TransportState,
    joystick: JoystickState,
    initialized: bool,
}

impl<H: Host, O: SurfaceOutput> Engine<H, O> {
    pub fn new(host: H, output: O, config: EngineConfig) -> Self {
        info!(
            "Engine created: {} strips per cycle, blink {}/{} ticks",
            config.refresh_batch, config.blink_ratio, config.blink_interval
        );
        Self {
            host,
            output,
            steps: config.encoder_steps(),
            config,
            decoder: Decoder::new(),
            mode: ModeState::default(),
            qualifiers: Qualifiers::default(),
            channel: ChannelStrip::default(),
            bank_offset: 0,
            touch: TouchState::default(),
            cursor: 0,
            blink: BlinkState::default(),
            transport: TransportState::default(),
            joystick: JoystickState::default(),
            initialized: false,
        }
    }

    /// Apply a reloaded engine configuration
    pub fn set_config(&mut self, config: EngineConfig) {
        if config != self.config {
            debug!("Engine configuration updated: {:?}", config);
            self.steps = config.encoder_steps();
            self.config = config;
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    pub fn mode(&self) -> ModeState {
        self.mode
    }

    pub fn qualifiers(&self) -> Qualifiers {
        self.qualifiers
    }

    pub fn channel_strip(&self) -> ChannelStrip {
        self.channel
    }

    pub fn bank_offset(&self) -> usize {
        self.bank_offset
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn blink_phase(&self) -> bool {
        self.blink.on
    }

    /// Whether the fader showing `track` is held by the user
    pub fn is_touched(&self, track: TrackRef) -> bool {
        bank::strip_for_track(self.bank_offset, track)
            .map(|strip| self.touch.is_touched(strip))
            .unwrap_or(false)
    }

    /// What a control currently drives
    pub fn resolve(&self, strip: Strip, control: Control) -> Target {
        let ctx = ResolveContext {
            mode: self.mode,
            qualifiers: self.qualifiers,
            channel: self.channel,
            bank_offset: self.bank_offset,
            aux_send_prefix: &self.config.aux_send_prefix,
        };
        resolver::resolve(&ctx, &self.host, strip, control)
    }

    fn track_for_strip(&self, strip: Strip) -> TrackRef {
        bank::track_for_strip(self.bank_offset, strip)
    }
}
