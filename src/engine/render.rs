//! Host state → surface messages

use super::mode::AuxSlot;
use super::resolver::{Control, Target};
use crate::convert::{
    param_to_fader, param_to_ring, pan_to_fader, pan_to_ring, volume_to_fader, volume_to_ring,
    width_to_ring,
};
use crate::host::{Host, TrackRef};
use crate::surface::{
    bank_leds_message, encoder_message, fader_messages, lamp_message, Button, Lamp, Strip,
    StripElement, SurfaceOutput, RING_BAR, RING_DOT, RING_INACTIVE_PAN, RING_PAN, RING_WIDTH,
};

/// Lamp of the first automation button (rewind); trim/read/touch/write follow
const AUTO_LAMP_BASE: u8 = 0x75;

impl<H: Host, O: SurfaceOutput> super::Engine<H, O> {
    pub(super) fn lamp(&mut self, id: u8, state: Lamp) {
        self.output.send(lamp_message(id, state));
    }

    pub(super) fn button_lamp(&mut self, button: Button, state: Lamp) {
        self.lamp(button.cc(), state);
    }

    /// Move a motor fader to the host value, unless the user holds it
    pub(super) fn render_fader(&mut self, strip: Strip) {
        if self.touch.is_touched(strip) {
            return;
        }
        let position = self.fader_position(self.resolve(strip, Control::Fader));
        for message in fader_messages(strip, position) {
            self.output.send(message);
        }
    }

    fn fader_position(&self, target: Target) -> u16 {
        let host = &self.host;
        match target {
            Target::MasterVolume => volume_to_fader(host.volume(TrackRef::Master).unwrap_or(0.0)),
            Target::Volume(track) => volume_to_fader(host.volume(track).unwrap_or(0.0)),
            Target::Pan(track) => pan_to_fader(host.pan(track).unwrap_or(0.0)),
            Target::Width(track) => pan_to_fader(host.width(track).unwrap_or(0.0)),
            Target::SendVolume { track, send } => {
                volume_to_fader(host.send_volume(track, send).unwrap_or(0.0))
            }
            Target::SendPan { track, send } => {
                pan_to_fader(host.send_pan(track, send).unwrap_or(0.0))
            }
            Target::FxParam { track, fx, param } => host
                .fx_param(track, fx, param)
                .map(|p| param_to_fader(p.min, p.max, p.value))
                .unwrap_or(0),
            Target::Inactive => 0,
        }
    }

    /// Encoder ring, plus the phase-invert dot (inverted while the track is
    /// armed and the blink phase is on)
    pub(super) fn render_encoder(&mut self, strip: Strip) {
        if strip.is_master() {
            return;
        }
        let mut ring = self.ring_value(self.resolve(strip, Control::Encoder));

        let track = self.track_for_strip(strip);
        if self.host.track_exists(track) {
            let dot = self.host.is_phase_inverted(track)
                ^ (self.host.is_rec_armed(track) && self.blink.on);
            if dot {
                ring += RING_DOT;
            }
        }
        self.output.send(encoder_message(strip, ring));
    }

    fn ring_value(&self, target: Target) -> u8 {
        let host = &self.host;
        match target {
            Target::Pan(track) => RING_PAN + pan_to_ring(host.pan(track).unwrap_or(0.0)),
            Target::SendPan { track, send } => {
                RING_PAN + pan_to_ring(host.send_pan(track, send).unwrap_or(0.0))
            }
            Target::Width(track) => RING_WIDTH + width_to_ring(host.width(track).unwrap_or(0.0)),
            Target::Volume(track) => RING_BAR + volume_to_ring(host.volume(track).unwrap_or(0.0)),
            Target::MasterVolume => {
                RING_BAR + volume_to_ring(host.volume(TrackRef::Master).unwrap_or(0.0))
            }
            Target::SendVolume { track, send } => {
                RING_BAR + volume_to_ring(host.send_volume(track, send).unwrap_or(0.0))
            }
            Target::FxParam { track, fx, param } => match host.fx_param(track, fx, param) {
                Some(p) => RING_BAR + param_to_ring(p.min, p.max, p.value),
                None => 0,
            },
            Target::Inactive if self.mode.is_pan() => RING_INACTIVE_PAN,
            Target::Inactive => 0,
        }
    }

    /// Select lamp of a strip; the channel strip blinks in ChannelStrip mode
    pub(super) fn select_lamp_state(&self, strip: Strip) -> Lamp {
        if self.mode.is_channel_strip() && self.channel.strip == strip {
            Lamp::Blink
        } else {
            Lamp::from_bool(self.host.is_selected(self.track_for_strip(strip)))
        }
    }

    pub(super) fn render_strip_lamps(&mut self, strip: Strip) {
        let select = self.select_lamp_state(strip);
        self.lamp(strip.lamp(StripElement::Select), select);
        if strip.is_master() {
            return;
        }

        let track = self.track_for_strip(strip);
        let solo = Lamp::from_bool(self.host.is_soloed(track));
        let mute = Lamp::from_bool(self.host.is_muted(track));
        self.lamp(strip.lamp(StripElement::Solo), solo);
        self.lamp(strip.lamp(StripElement::Mute), mute);
    }

    pub(super) fn render_strip(&mut self, strip: Strip) {
        self.render_fader(strip);
        self.render_encoder(strip);
    }

    /// Faders, encoders and lamps of every strip
    pub(super) fn render_all(&mut self) {
        for strip in Strip::all() {
            self.render_strip(strip);
            self.render_strip_lamps(strip);
        }
        self.render_clear_solo_lamp();
    }

    /// The mode-dependent control of every track strip: faders while
    /// flipped, encoders otherwise
    pub(super) fn render_mode_controls(&mut self) {
        for strip in Strip::tracks() {
            if self.mode.flip {
                self.render_fader(strip);
            } else {
                self.render_encoder(strip);
            }
        }
    }

    pub(super) fn render_track_strips(&mut self) {
        for strip in Strip::tracks() {
            self.render_strip(strip);
        }
    }

    pub(super) fn render_clear_solo_lamp(&mut self) {
        let state = if self.host.any_soloed() {
            Lamp::Blink
        } else {
            Lamp::Off
        };
        self.button_lamp(Button::ClearSolo, state);
    }

    pub(super) fn render_bank_leds(&mut self) {
        self.output.send(bank_leds_message(self.bank_offset));
    }

    /// Rewind..Play lamps: Play mirrors the transport, the automation mode's
    /// lamp is toggled by the blink phase
    pub(super) fn render_auto_lamps(&mut self) {
        let mode_lamp = self.transport.automation.lamp_index();
        for i in 0..4u8 {
            let on = (i == 3 && self.transport.playing) ^ (i == mode_lamp && self.blink.on);
            self.lamp(AUTO_LAMP_BASE + i, Lamp::from_bool(on));
        }
    }

    pub(super) fn render_aux_lamps(&mut self) {
        for slot in AuxSlot::all() {
            let state = self.aux_lamp_state(slot);
            self.button_lamp(Button::Aux(slot.number()), state);
        }
    }

    fn aux_lamp_state(&self, slot: AuxSlot) -> Lamp {
        if self.qualifiers.any() {
            return Lamp::Off;
        }
        if self.mode.is_channel_strip() {
            let track = self.channel.track;
            let lit = match slot.number() {
                3 => {
                    self.channel.fx < self.host.fx_count(track)
                        && !self.host.fx_enabled(track, self.channel.fx)
                }
                6 => !self.host.fx_chain_enabled(track),
                _ => false,
            };
            return if lit { Lamp::Blink } else { Lamp::Off };
        }
        Lamp::from_bool(self.mode.aux() == Some(slot))
    }

    /// In stays lit while looping or while loop-all can be restored,
    /// Out while the host repeats
    pub(super) fn loop_lamps_lit(&self) -> (bool, bool) {
        let repeat = self.transport.repeat;
        (repeat || self.transport.saved_selection.is_some(), repeat)
    }

    pub(super) fn render_loop_lamps(&mut self) {
        let (in_lit, out_lit) = self.loop_lamps_lit();
        self.button_lamp(Button::In, Lamp::from_bool(in_lit));
        self.button_lamp(Button::Out, Lamp::from_bool(out_lit));
    }

    pub(super) fn render_record_lamp(&mut self) {
        let state = if self.transport.recording {
            Lamp::Blink
        } else {
            Lamp::Off
        };
        self.button_lamp(Button::Record, state);
    }

    pub(super) fn render_bank_lamps(&mut self, state: Lamp) {
        self.button_lamp(Button::BankDown, state);
        self.button_lamp(Button::BankUp, state);
    }
}
