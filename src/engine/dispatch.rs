//! Input dispatch - decoded surface events to host mutations

use tracing::{debug, trace};

use super::mode::AuxSlot;
use super::resolver::{Control, Target};
use crate::convert::{
    encoder_to_param, encoder_to_pan, encoder_to_volume, fader_to_pan, fader_to_param,
    fader_to_volume, snap_for_qualifier, ValueKind,
};
use crate::host::{Command, Host, TrackRef};
use crate::surface::{Button, InputEvent, JoystickAxis, Lamp, Strip, StripElement, SurfaceOutput};

/// Raw value carried by a fader or encoder event
#[derive(Debug, Clone, Copy)]
enum ControlInput {
    Fader(u16),
    Encoder(i32),
}

impl<H: Host, O: SurfaceOutput> super::Engine<H, O> {
    /// Handle one decoded surface event
    pub fn handle_input(&mut self, event: InputEvent) {
        trace!("⬅️  {}", event);
        match event {
            InputEvent::StripButton {
                strip,
                element,
                pressed,
            } => {
                if pressed {
                    self.on_strip_button(strip, element);
                }
            }
            InputEvent::FaderTouch { strip, touched } => {
                self.touch.set(strip, touched);
                if !touched {
                    // settle the motor on the value the host ended up with
                    self.render_fader(strip);
                }
            }
            InputEvent::Fader { strip, position } => {
                self.apply_control(strip, Control::Fader, ControlInput::Fader(position));
            }
            InputEvent::Encoder { strip, ticks } => {
                self.apply_control(strip, Control::Encoder, ControlInput::Encoder(ticks));
            }
            InputEvent::JogWheel { ticks } => self.on_jog(ticks),
            InputEvent::Joystick { axis, value } => match axis {
                JoystickAxis::X => self.joystick.x = value,
                JoystickAxis::Y => self.joystick.y = value,
            },
            InputEvent::Button { button, pressed } => self.on_button(button, pressed),
        }
    }

    fn on_strip_button(&mut self, strip: Strip, element: StripElement) {
        let track = self.track_for_strip(strip);
        match element {
            StripElement::Select if self.mode.is_channel_strip() => self.chan_select_strip(strip),
            _ if !self.host.track_exists(track) => {
                trace!("{} has no track, {:?} ignored", strip, element);
            }
            StripElement::Select => {
                if self.qualifiers.function_key {
                    let armed = self.host.is_rec_armed(track);
                    self.host.set_rec_armed(track, !armed);
                } else if self.qualifiers.shift {
                    let inverted = self.host.is_phase_inverted(track);
                    self.host.set_phase_inverted(track, !inverted);
                    self.render_encoder(strip);
                } else {
                    let selected = self.host.is_selected(track);
                    self.host.set_selected(track, !selected);
                }
            }
            StripElement::Solo => {
                if self.qualifiers.shift {
                    self.host.unsolo_all();
                    self.host.set_soloed(track, true);
                } else {
                    let soloed = self.host.is_soloed(track);
                    self.host.set_soloed(track, !soloed);
                }
            }
            StripElement::Mute => {
                if self.qualifiers.shift {
                    self.host.unmute_all();
                    self.host.set_muted(track, true);
                } else {
                    let muted = self.host.is_muted(track);
                    self.host.set_muted(track, !muted);
                }
            }
            // touch arrives as FaderTouch
            StripElement::Touch => {}
        }
    }

    fn apply_control(&mut self, strip: Strip, control: Control, input: ControlInput) {
        let target = self.resolve(strip, control);
        match target {
            Target::Inactive => {
                trace!("{} {:?} inactive", strip, control);
                return;
            }
            Target::MasterVolume => self.apply_volume(TrackRef::Master, input),
            Target::Volume(track) => self.apply_volume(track, input),
            Target::Pan(track) => {
                let old = self.host.pan(track);
                if let Some(pan) = self.new_value(ValueKind::Pan, old, input) {
                    self.host.set_pan(track, pan);
                }
            }
            Target::Width(track) => {
                let old = self.host.width(track);
                if let Some(width) = self.new_value(ValueKind::Width, old, input) {
                    self.host.set_width(track, width);
                }
            }
            Target::SendVolume { track, send } => {
                let old = self.host.send_volume(track, send);
                if let Some(volume) = self.new_value(ValueKind::Volume, old, input) {
                    self.host.set_send_volume(track, send, volume);
                }
            }
            Target::SendPan { track, send } => {
                let old = self.host.send_pan(track, send);
                if let Some(pan) = self.new_value(ValueKind::Pan, old, input) {
                    self.host.set_send_pan(track, send, pan);
                }
            }
            Target::FxParam { track, fx, param } => {
                let Some(current) = self.host.fx_param(track, fx, param) else {
                    return;
                };
                let kind = ValueKind::FxParam {
                    min: current.min,
                    max: current.max,
                };
                if let Some(value) = self.new_value(kind, Some(current.value), input) {
                    self.host.set_fx_param(track, fx, param, value);
                }
            }
        }

        if let ControlInput::Encoder(_) = input {
            self.render_encoder(strip);
        }
    }

    fn apply_volume(&mut self, track: TrackRef, input: ControlInput) {
        let old = self.host.volume(track);
        if let Some(volume) = self.new_value(ValueKind::Volume, old, input) {
            self.host.set_volume(track, volume);
        }
    }

    /// Qualifier snap first, otherwise the converted input. Encoders need
    /// the current value; a vanished target yields `None`.
    fn new_value(&self, kind: ValueKind, old: Option<f64>, input: ControlInput) -> Option<f64> {
        let q = self.qualifiers;
        if let Some(snapped) = snap_for_qualifier(kind, q.function_key, q.shift) {
            return Some(snapped);
        }
        let steps = &self.steps;
        let value = match input {
            ControlInput::Fader(position) => match kind {
                ValueKind::Volume => fader_to_volume(position),
                ValueKind::Pan | ValueKind::Width => fader_to_pan(position),
                ValueKind::FxParam { min, max } => fader_to_param(min, max, position),
            },
            ControlInput::Encoder(ticks) => {
                let old = old?;
                match kind {
                    ValueKind::Volume => encoder_to_volume(old, ticks, steps),
                    ValueKind::Pan | ValueKind::Width => encoder_to_pan(old, ticks, steps),
                    ValueKind::FxParam { min, max } => {
                        encoder_to_param(old, min, max, ticks, steps)
                    }
                }
            }
        };
        Some(value)
    }

    fn on_button(&mut self, button: Button, pressed: bool) {
        debug!(
            "🔘 {:?} {}",
            button,
            if pressed { "pressed" } else { "released" }
        );
        match button {
            Button::FunctionKey => self.set_function_key(pressed),
            Button::Shift => self.set_shift(pressed),
            Button::BankDown => self.on_bank(-1, pressed),
            Button::BankUp => self.on_bank(1, pressed),
            Button::In => self.on_in(pressed),
            Button::Out => self.on_out(pressed),
            Button::ClearSolo => self.on_clear_solo(pressed),
            Button::Null => self.on_null(pressed),
            _ if !pressed => {}
            Button::MasterSelect => self.on_master_select(),
            Button::Flip => self.toggle_flip(),
            Button::Chan => {
                if self.mode.is_channel_strip() {
                    self.exit_chan();
                } else {
                    self.enter_chan();
                }
            }
            Button::Pan => self.enter_pan(),
            Button::Aux(n) => {
                if let Some(slot) = AuxSlot::new(n) {
                    self.on_aux(slot);
                }
            }
            Button::Scrub => self.toggle_scrub(),
            Button::Rewind => self.on_rewind(),
            Button::FastForward => self.on_fast_forward(),
            Button::Stop => self.on_stop(),
            Button::Play => self.on_play(),
            Button::Record => self.on_record(),
        }
    }

    fn on_master_select(&mut self) {
        if self.mode.is_channel_strip() {
            self.chan_select_strip(Strip::MASTER);
        } else if self.qualifiers.function_key {
            let all = self.host.track_count();
            let command = if all > 0 && self.host.selected_count() == all {
                Command::UnselectAllTracks
            } else {
                Command::SelectAllTracks
            };
            self.host.run_command(command);
        } else {
            let selected = self.host.is_selected(TrackRef::Master);
            self.host.set_selected(TrackRef::Master, !selected);
        }
    }

    fn on_clear_solo(&mut self, pressed: bool) {
        if !pressed {
            self.render_clear_solo_lamp();
            return;
        }
        if self.qualifiers.function_key {
            self.host.unmute_all();
        } else {
            self.host.unsolo_all();
        }
        self.button_lamp(Button::ClearSolo, Lamp::On);
    }

    fn on_null(&mut self, pressed: bool) {
        self.button_lamp(Button::Null, Lamp::from_bool(pressed));
        if !pressed {
            return;
        }
        let command = if self.qualifiers.function_key {
            Command::CenterScrollOnPlayCursor
        } else if self.qualifiers.shift {
            Command::VerticalZoomToSelectedTracks
        } else {
            Command::ToggleHorizontalZoomToTimeSelection
        };
        self.host.run_command(command);
    }
}
