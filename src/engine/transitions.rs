//! Mode, qualifier and channel strip transitions
//!
//! Each transition updates the mode state first, then rewrites the lamps and
//! controls whose meaning changed.

use tracing::debug;

use super::bank;
use super::mode::{AuxSlot, PrimaryMode};
use crate::host::{Command, Host, Key};
use crate::surface::{Button, Lamp, Strip, StripElement, SurfaceOutput, TRACK_STRIPS};

/// FX parameters per channel strip page
const PARAM_PAGE: i64 = TRACK_STRIPS as i64;

impl<H: Host, O: SurfaceOutput> super::Engine<H, O> {
    // --- Primary modes ---

    pub(super) fn enter_chan(&mut self) {
        if self.mode.is_channel_strip() {
            return;
        }
        debug!("🎚️ Channel strip on {}", self.channel.strip);

        self.button_lamp(Button::Pan, Lamp::Off);
        self.mode.primary = PrimaryMode::ChannelStrip;
        self.button_lamp(Button::Chan, Lamp::Blink);

        self.channel.track = self.track_for_strip(self.channel.strip);
        self.open_fx(self.channel.fx as i64);

        let strip = self.channel.strip;
        self.lamp(strip.lamp(StripElement::Select), Lamp::Blink);
        self.render_aux_lamps();
        self.render_bank_lamps(Lamp::Blink);
        self.render_track_strips();
    }

    /// Leave ChannelStrip without choosing the next mode
    fn leave_chan(&mut self) {
        debug!("🎚️ Leaving channel strip");
        self.mode.primary = PrimaryMode::Pan;
        self.button_lamp(Button::Chan, Lamp::Off);

        let strip = self.channel.strip;
        let state = self.select_lamp_state(strip);
        self.lamp(strip.lamp(StripElement::Select), state);

        self.close_fx();
        self.render_bank_lamps(Lamp::Off);
    }

    pub(super) fn exit_chan(&mut self) {
        if !self.mode.is_channel_strip() {
            return;
        }
        self.leave_chan();
        self.enter_pan();
        self.render_track_strips();
    }

    pub(super) fn enter_pan(&mut self) {
        if self.mode.is_channel_strip() {
            self.exit_chan();
            return;
        }
        debug!("🎚️ Pan mode");
        self.mode.primary = PrimaryMode::Pan;
        self.button_lamp(Button::Pan, Lamp::On);
        self.render_aux_lamps();
        self.render_mode_controls();
    }

    pub(super) fn enter_aux(&mut self, slot: AuxSlot) {
        if self.mode.is_channel_strip() {
            self.leave_chan();
        }
        debug!("🎚️ Aux {} mode", slot.number());
        self.button_lamp(Button::Pan, Lamp::Off);
        self.mode.primary = PrimaryMode::Aux(slot);
        self.render_aux_lamps();
        for strip in Strip::tracks() {
            if self.mode.flip {
                self.render_fader(strip);
            }
            self.render_encoder(strip);
        }
    }

    // --- Toggles and qualifiers ---

    pub(super) fn toggle_flip(&mut self) {
        self.mode.flip = !self.mode.flip;
        debug!("🔁 Flip {}", if self.mode.flip { "on" } else { "off" });
        let state = if self.mode.flip { Lamp::Blink } else { Lamp::Off };
        self.button_lamp(Button::Flip, state);
        self.render_track_strips();
    }

    pub(super) fn toggle_scrub(&mut self) {
        self.mode.scrub = !self.mode.scrub;
        self.button_lamp(Button::Scrub, Lamp::from_bool(self.mode.scrub));
        self.render_track_strips();
    }

    pub(super) fn set_function_key(&mut self, pressed: bool) {
        self.qualifiers.function_key = pressed;
        self.button_lamp(Button::FunctionKey, Lamp::from_bool(pressed));
        self.render_aux_lamps();
        // pan ↔ width
        if self.mode.is_pan() {
            self.render_mode_controls();
        }
    }

    pub(super) fn set_shift(&mut self, pressed: bool) {
        self.qualifiers.shift = pressed;
        self.button_lamp(Button::Shift, Lamp::from_bool(pressed));
        self.render_aux_lamps();
    }

    // --- Channel strip ---

    /// Select pressed in ChannelStrip mode: switch the channel strip, or
    /// leave the mode when it is already the channel strip
    pub(super) fn chan_select_strip(&mut self, strip: Strip) {
        if strip == self.channel.strip {
            self.exit_chan();
            return;
        }

        self.close_fx();
        let old = self.channel.strip;
        self.channel.strip = strip;
        self.channel.track = self.track_for_strip(strip);
        self.channel.fx = 0;
        self.channel.param_offset = 0;
        debug!("🎚️ Channel strip → {} ({})", strip, self.channel.track);

        let old_state = self.select_lamp_state(old);
        self.lamp(old.lamp(StripElement::Select), old_state);
        self.lamp(strip.lamp(StripElement::Select), Lamp::Blink);

        self.open_fx(0);
        self.render_aux_lamps();
        self.render_track_strips();
    }

    /// Show FX `index` of the channel strip's track, wrapping into range.
    /// A track without FX gets the FX browser instead.
    pub(super) fn open_fx(&mut self, index: i64) {
        let track = self.channel.track;
        let count = self.host.fx_count(track);
        if count == 0 {
            self.insert_fx();
            return;
        }

        let fx = index.rem_euclid(count as i64) as usize;
        if fx != self.channel.fx {
            self.channel.param_offset = 0;
        }
        self.channel.fx = fx;
        self.host.show_fx(track, fx, true);
    }

    pub(super) fn close_fx(&mut self) {
        let (track, fx) = (self.channel.track, self.channel.fx);
        self.host.show_fx(track, fx, false);
    }

    fn insert_fx(&mut self) {
        let track = self.channel.track;
        if self.host.track_exists(track) {
            self.host.run_command(Command::OpenFxBrowser(track));
        }
    }

    fn delete_fx(&mut self) {
        let (track, fx) = (self.channel.track, self.channel.fx);
        let before = self.host.fx_count(track);
        if fx >= before {
            return;
        }
        self.host.run_command(Command::RemoveFx { track, fx });

        if before > 1 {
            // the first FX falls back to the last one
            self.open_fx(fx as i64 - 1);
            self.render_track_strips();
        } else {
            self.exit_chan();
        }
    }

    /// Move the open FX one slot down (`direction > 0`) or up the chain
    pub(super) fn move_fx(&mut self, direction: i32) {
        let (track, fx) = (self.channel.track, self.channel.fx);
        let count = self.host.fx_count(track);
        let down = direction > 0;
        let other = if down { fx + 1 } else { fx.wrapping_sub(1) };
        if fx >= count || other >= count {
            return;
        }
        self.host.run_command(Command::MoveFx { track, fx, down });
        self.channel.fx = other;
        self.host.show_fx(track, other, true);
    }

    fn toggle_fx_bypass(&mut self) {
        let (track, fx) = (self.channel.track, self.channel.fx);
        if fx < self.host.fx_count(track) {
            let enabled = self.host.fx_enabled(track, fx);
            self.host.set_fx_enabled(track, fx, !enabled);
        }
    }

    fn toggle_chain_bypass(&mut self) {
        let track = self.channel.track;
        let enabled = self.host.fx_chain_enabled(track);
        self.host.set_fx_chain_enabled(track, !enabled);
    }

    /// Page the FX parameters by 24; a page past the last parameter steps
    /// back one page
    fn set_param_offset(&mut self, direction: i64) {
        let count = self.host.fx_param_count(self.channel.track, self.channel.fx);
        let mut offset = (self.channel.param_offset as i64 + PARAM_PAGE * direction).max(0);
        if count as i64 <= offset {
            offset = (offset - PARAM_PAGE).max(0);
        }
        self.channel.param_offset = offset as usize;
        debug!("🎛️ FX parameter page {}", self.channel.param_offset);
        self.render_mode_controls();
    }

    // --- Banks ---

    pub(super) fn shift_banks(&mut self, direction: i32, factor: usize) {
        let offset = bank::shift_offset(
            self.bank_offset,
            direction,
            factor,
            self.host.track_count(),
        );
        if offset == self.bank_offset {
            return;
        }
        debug!("🏦 Bank offset {} → {}", self.bank_offset, offset);
        self.bank_offset = offset;
        self.host.scroll_mixer_to(offset);

        for strip in Strip::tracks() {
            self.render_encoder(strip);
            self.render_fader(strip);
            self.render_strip_lamps(strip);
        }
        self.render_bank_leds();
    }

    // --- Aux buttons ---

    pub(super) fn on_aux(&mut self, slot: AuxSlot) {
        let n = slot.number();
        let in_aux = self.mode.aux().is_some();

        if self.qualifiers.function_key {
            if in_aux {
                self.host.run_command(Command::AddAuxSend(n));
                self.render_track_strips();
            } else {
                let command = match n {
                    1 => Command::MoveSelectedTracks(-1),
                    2 => Command::MoveSelectedTracks(1),
                    3 => Command::DuplicateSelectedTracks,
                    4 => Command::RenameSelectedTracks,
                    5 => Command::KeyStroke(Key::Escape),
                    _ => Command::KeyStroke(Key::Enter),
                };
                self.host.run_command(command);
            }
        } else if self.qualifiers.shift {
            if in_aux {
                self.host.run_command(Command::RemoveAuxSend(n));
                self.render_track_strips();
            } else {
                let command = match n {
                    1 => Command::WrapSelectedTracksInFolder,
                    2 => Command::ToggleFolderChildren,
                    3 => Command::GroupSelectedTracks,
                    4 => Command::InsertTrack,
                    5 => Command::DeleteSelectedTracks,
                    _ => Command::UngroupSelectedTracks,
                };
                self.host.run_command(command);
            }
        } else if self.mode.is_channel_strip() {
            match n {
                1 => self.set_param_offset(1),
                2 => self.set_param_offset(-1),
                3 => self.toggle_fx_bypass(),
                4 => {
                    self.insert_fx();
                    self.render_track_strips();
                }
                5 => self.delete_fx(),
                _ => self.toggle_chain_bypass(),
            }
        } else {
            self.enter_aux(slot);
        }

        self.render_aux_lamps();
    }
}
