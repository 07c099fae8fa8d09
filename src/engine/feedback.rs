//! Host notifications → surface

use tracing::trace;

use super::bank;
use crate::host::{Host, HostEvent, TrackRef};
use crate::surface::{Lamp, Strip, StripElement, SurfaceOutput};

impl<H: Host, O: SurfaceOutput> super::Engine<H, O> {
    /// React to a change the host made, re-rendering only what it touched
    pub fn on_host_event(&mut self, event: HostEvent) {
        trace!("➡️  host {:?}", event);
        match event {
            HostEvent::VolumeChanged(track) | HostEvent::PanChanged(track) => {
                if let Some(strip) = self.visible_strip(track) {
                    self.render_strip(strip);
                }
            }
            HostEvent::MuteChanged(track, muted) => {
                if let Some(strip) = self.visible_strip(track) {
                    if !strip.is_master() {
                        self.lamp(strip.lamp(StripElement::Mute), Lamp::from_bool(muted));
                    }
                }
            }
            HostEvent::SoloChanged(track, soloed) => {
                if let Some(strip) = self.visible_strip(track) {
                    if !strip.is_master() {
                        self.lamp(strip.lamp(StripElement::Solo), Lamp::from_bool(soloed));
                    }
                }
                self.render_clear_solo_lamp();
            }
            HostEvent::SelectionChanged(track, _) => {
                if let Some(strip) = self.visible_strip(track) {
                    let state = self.select_lamp_state(strip);
                    self.lamp(strip.lamp(StripElement::Select), state);
                }
            }
            HostEvent::RecArmChanged(track, _) => {
                if let Some(strip) = self.visible_strip(track) {
                    self.render_encoder(strip);
                }
            }
            HostEvent::PlayState {
                playing,
                paused,
                recording,
            } => {
                self.transport.playing = playing && !paused;
                self.transport.recording = recording;
                self.render_auto_lamps();
                self.render_record_lamp();
            }
            HostEvent::RepeatChanged(repeat) => {
                self.transport.repeat = repeat;
                self.render_loop_lamps();
            }
            HostEvent::AutomationModeChanged(mode) => {
                self.transport.automation = mode;
                self.render_auto_lamps();
            }
            HostEvent::TrackListChanged => self.render_all(),
        }
    }

    fn visible_strip(&self, track: TrackRef) -> Option<Strip> {
        bank::strip_for_track(self.bank_offset, track)
    }
}
