//! Simulated mixer - in-memory host for standalone runs and tests
//!
//! Implements the full [`Host`] surface on plain data. Every mutation is
//! logged, counted and, where a real console would notify its surfaces,
//! queued as a [`HostEvent`] for the caller to forward.

use tracing::{debug, info};

use super::{
    ArrowDirection, AutomationMode, Command, FxParamValue, Host, HostEvent, TrackRef,
};
use crate::config::SimProjectConfig;

/// Project length used when no markers exist
const DEFAULT_PROJECT_LENGTH: f64 = 60.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SimSend {
    pub name: String,
    pub volume: f64,
    pub pan: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimFx {
    pub name: String,
    pub enabled: bool,
    pub visible: bool,
    pub params: Vec<FxParamValue>,
}

impl SimFx {
    /// FX with `count` parameters, each in 0..=1 and centred
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            visible: false,
            params: vec![
                FxParamValue {
                    value: 0.5,
                    min: 0.0,
                    max: 1.0,
                };
                count
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimTrack {
    pub volume: f64,
    pub pan: f64,
    pub width: f64,
    pub muted: bool,
    pub soloed: bool,
    pub selected: bool,
    pub rec_armed: bool,
    pub phase_inverted: bool,
    pub sends: Vec<SimSend>,
    pub fx: Vec<SimFx>,
    pub fx_chain_enabled: bool,
    pub automation: AutomationMode,
}

impl Default for SimTrack {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pan: 0.0,
            width: 1.0,
            muted: false,
            soloed: false,
            selected: false,
            rec_armed: false,
            phase_inverted: false,
            sends: Vec::new(),
            fx: Vec::new(),
            fx_chain_enabled: true,
            automation: AutomationMode::Trim,
        }
    }
}

/// In-memory mixer implementing [`Host`]
#[derive(Debug, Clone)]
pub struct SimHost {
    master: SimTrack,
    tracks: Vec<SimTrack>,
    playing: bool,
    recording: bool,
    repeat: bool,
    time_selection: (f64, f64),
    markers: Vec<f64>,
    tempo_bpm: f64,
    time_signature: (u32, u32),
    edit_cursor: f64,
    scrub_position: f64,
    mixer_scroll: usize,
    aux_send_prefix: String,
    commands: Vec<Command>,
    arrows: Vec<(ArrowDirection, bool)>,
    events: Vec<HostEvent>,
    mutations: u64,
}

impl SimHost {
    /// Empty project with `track_count` default tracks
    pub fn new(track_count: usize) -> Self {
        Self {
            master: SimTrack::default(),
            tracks: vec![SimTrack::default(); track_count],
            playing: false,
            recording: false,
            repeat: false,
            time_selection: (0.0, 0.0),
            markers: Vec::new(),
            tempo_bpm: 120.0,
            time_signature: (4, 4),
            edit_cursor: 0.0,
            scrub_position: 0.0,
            mixer_scroll: 0,
            aux_send_prefix: "aux---".to_string(),
            commands: Vec::new(),
            arrows: Vec::new(),
            events: Vec::new(),
            mutations: 0,
        }
    }

    /// Build the project described in the configuration
    pub fn from_config(config: &SimProjectConfig) -> Self {
        let mut host = Self::new(config.track_count);
        host.tempo_bpm = config.tempo_bpm;
        host.time_signature = (config.beats_per_bar, config.beat_unit);
        host.repeat = config.repeat;
        host.set_markers(config.markers.clone());
        for send in &config.sends {
            host.add_send(send.track, &send.name);
        }
        for fx in &config.fx {
            host.add_fx(fx.track, &fx.name, fx.params);
        }
        info!(
            "Simulated project: {} tracks, {} sends, {} FX, {} markers",
            config.track_count,
            config.sends.len(),
            config.fx.len(),
            config.markers.len()
        );
        host
    }

    /// Pattern prefix used when aux sends are added by command
    pub fn set_aux_send_prefix(&mut self, prefix: impl Into<String>) {
        self.aux_send_prefix = prefix.into();
    }

    pub fn add_send(&mut self, track: usize, name: &str) {
        if let Some(t) = self.tracks.get_mut(track) {
            t.sends.push(SimSend {
                name: name.to_string(),
                volume: 1.0,
                pan: 0.0,
            });
        }
    }

    pub fn add_fx(&mut self, track: usize, name: &str, params: usize) {
        if let Some(t) = self.tracks.get_mut(track) {
            t.fx.push(SimFx::new(name, params));
        }
    }

    pub fn set_markers(&mut self, mut markers: Vec<f64>) {
        markers.sort_by(|a, b| a.total_cmp(b));
        self.markers = markers;
    }

    pub fn set_time_signature(&mut self, numerator: u32, denominator: u32) {
        self.time_signature = (numerator, denominator);
    }

    pub fn track(&self, track: TrackRef) -> Option<&SimTrack> {
        match track {
            TrackRef::Master => Some(&self.master),
            TrackRef::Track(i) => self.tracks.get(i),
        }
    }

    pub fn track_mut(&mut self, track: TrackRef) -> Option<&mut SimTrack> {
        match track {
            TrackRef::Master => Some(&mut self.master),
            TrackRef::Track(i) => self.tracks.get_mut(i),
        }
    }

    /// Commands received so far, oldest first
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Arrow requests received so far as (direction, zoom)
    pub fn arrows(&self) -> &[(ArrowDirection, bool)] {
        &self.arrows
    }

    /// Drain pending change notifications
    pub fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of state mutations applied
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    pub fn mixer_scroll(&self) -> usize {
        self.mixer_scroll
    }

    pub fn scrub_position(&self) -> f64 {
        self.scrub_position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Record a mutation and log it the way the console driver logs actions
    fn note(&mut self, action: std::fmt::Arguments<'_>) {
        self.mutations += 1;
        debug!(
            "🎛️  [{}] sim {} [mutation #{}]",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            action,
            self.mutations
        );
    }

    fn modify<F>(&mut self, track: TrackRef, label: &str, f: F) -> bool
    where
        F: FnOnce(&mut SimTrack),
    {
        match self.track_mut(track) {
            Some(t) => {
                f(t);
                self.note(format_args!("{} {}", track, label));
                true
            }
            None => false,
        }
    }

    fn all_refs(&self) -> Vec<TrackRef> {
        (0..self.tracks.len()).map(TrackRef::Track).collect()
    }

    fn project_length(&self) -> f64 {
        self.markers.last().copied().unwrap_or(DEFAULT_PROJECT_LENGTH)
    }

    fn set_all_selected(&mut self, selected: bool) {
        for track in self.all_refs() {
            if self.is_selected(track) != selected {
                self.set_selected(track, selected);
            }
        }
    }

    fn selected_tracks(&self) -> Vec<usize> {
        self.tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.selected)
            .map(|(i, _)| i)
            .collect()
    }

    fn push_play_state(&mut self) {
        self.events.push(HostEvent::PlayState {
            playing: self.playing,
            paused: false,
            recording: self.recording,
        });
    }
}

impl Host for SimHost {
    fn track_count(&self) -> usize {
        self.tracks.len()
    }

    fn volume(&self, track: TrackRef) -> Option<f64> {
        self.track(track).map(|t| t.volume)
    }

    fn set_volume(&mut self, track: TrackRef, volume: f64) {
        if self.modify(track, &format!("volume -> {:.4}", volume), |t| t.volume = volume) {
            self.events.push(HostEvent::VolumeChanged(track));
        }
    }

    fn pan(&self, track: TrackRef) -> Option<f64> {
        self.track(track).map(|t| t.pan)
    }

    fn set_pan(&mut self, track: TrackRef, pan: f64) {
        if self.modify(track, &format!("pan -> {:.3}", pan), |t| t.pan = pan) {
            self.events.push(HostEvent::PanChanged(track));
        }
    }

    fn width(&self, track: TrackRef) -> Option<f64> {
        self.track(track).map(|t| t.width)
    }

    fn set_width(&mut self, track: TrackRef, width: f64) {
        if self.modify(track, &format!("width -> {:.3}", width), |t| t.width = width) {
            self.events.push(HostEvent::PanChanged(track));
        }
    }

    fn is_muted(&self, track: TrackRef) -> bool {
        self.track(track).map(|t| t.muted).unwrap_or(false)
    }

    fn set_muted(&mut self, track: TrackRef, muted: bool) {
        if self.modify(track, &format!("mute -> {}", muted), |t| t.muted = muted) {
            self.events.push(HostEvent::MuteChanged(track, muted));
        }
    }

    fn unmute_all(&mut self) {
        for track in self.all_refs() {
            if self.is_muted(track) {
                self.set_muted(track, false);
            }
        }
    }

    fn is_soloed(&self, track: TrackRef) -> bool {
        self.track(track).map(|t| t.soloed).unwrap_or(false)
    }

    fn set_soloed(&mut self, track: TrackRef, soloed: bool) {
        if self.modify(track, &format!("solo -> {}", soloed), |t| t.soloed = soloed) {
            self.events.push(HostEvent::SoloChanged(track, soloed));
        }
    }

    fn unsolo_all(&mut self) {
        for track in self.all_refs() {
            if self.is_soloed(track) {
                self.set_soloed(track, false);
            }
        }
    }

    fn any_soloed(&self) -> bool {
        self.tracks.iter().any(|t| t.soloed)
    }

    fn is_selected(&self, track: TrackRef) -> bool {
        self.track(track).map(|t| t.selected).unwrap_or(false)
    }

    fn set_selected(&mut self, track: TrackRef, selected: bool) {
        if self.modify(track, &format!("select -> {}", selected), |t| t.selected = selected) {
            self.events.push(HostEvent::SelectionChanged(track, selected));
        }
    }

    fn selected_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.selected).count()
    }

    fn is_rec_armed(&self, track: TrackRef) -> bool {
        self.track(track).map(|t| t.rec_armed).unwrap_or(false)
    }

    fn set_rec_armed(&mut self, track: TrackRef, armed: bool) {
        if self.modify(track, &format!("rec arm -> {}", armed), |t| t.rec_armed = armed) {
            self.events.push(HostEvent::RecArmChanged(track, armed));
        }
    }

    fn is_phase_inverted(&self, track: TrackRef) -> bool {
        self.track(track).map(|t| t.phase_inverted).unwrap_or(false)
    }

    fn set_phase_inverted(&mut self, track: TrackRef, inverted: bool) {
        self.modify(track, &format!("phase -> {}", inverted), |t| {
            t.phase_inverted = inverted
        });
    }

    fn send_count(&self, track: TrackRef) -> usize {
        self.track(track).map(|t| t.sends.len()).unwrap_or(0)
    }

    fn send_name(&self, track: TrackRef, send: usize) -> Option<String> {
        self.track(track)?.sends.get(send).map(|s| s.name.clone())
    }

    fn send_volume(&self, track: TrackRef, send: usize) -> Option<f64> {
        self.track(track)?.sends.get(send).map(|s| s.volume)
    }

    fn set_send_volume(&mut self, track: TrackRef, send: usize, volume: f64) {
        if self.send_name(track, send).is_some() {
            self.modify(track, &format!("send {} volume -> {:.4}", send, volume), |t| {
                t.sends[send].volume = volume
            });
        }
    }

    fn send_pan(&self, track: TrackRef, send: usize) -> Option<f64> {
        self.track(track)?.sends.get(send).map(|s| s.pan)
    }

    fn set_send_pan(&mut self, track: TrackRef, send: usize, pan: f64) {
        if self.send_name(track, send).is_some() {
            self.modify(track, &format!("send {} pan -> {:.3}", send, pan), |t| {
                t.sends[send].pan = pan
            });
        }
    }

    fn fx_count(&self, track: TrackRef) -> usize {
        self.track(track).map(|t| t.fx.len()).unwrap_or(0)
    }

    fn fx_param_count(&self, track: TrackRef, fx: usize) -> usize {
        self.track(track)
            .and_then(|t| t.fx.get(fx))
            .map(|f| f.params.len())
            .unwrap_or(0)
    }

    fn fx_param(&self, track: TrackRef, fx: usize, param: usize) -> Option<FxParamValue> {
        self.track(track)?.fx.get(fx)?.params.get(param).copied()
    }

    fn set_fx_param(&mut self, track: TrackRef, fx: usize, param: usize, value: f64) {
        if self.fx_param(track, fx, param).is_some() {
            self.modify(track, &format!("fx {} param {} -> {:.4}", fx, param, value), |t| {
                t.fx[fx].params[param].value = value
            });
        }
    }

    fn fx_enabled(&self, track: TrackRef, fx: usize) -> bool {
        self.track(track)
            .and_then(|t| t.fx.get(fx))
            .map(|f| f.enabled)
            .unwrap_or(false)
    }

    fn set_fx_enabled(&mut self, track: TrackRef, fx: usize, enabled: bool) {
        if fx < self.fx_count(track) {
            self.modify(track, &format!("fx {} enabled -> {}", fx, enabled), |t| {
                t.fx[fx].enabled = enabled
            });
        }
    }

    fn fx_chain_enabled(&self, track: TrackRef) -> bool {
        self.track(track).map(|t| t.fx_chain_enabled).unwrap_or(false)
    }

    fn set_fx_chain_enabled(&mut self, track: TrackRef, enabled: bool) {
        self.modify(track, &format!("fx chain enabled -> {}", enabled), |t| {
            t.fx_chain_enabled = enabled
        });
    }

    fn show_fx(&mut self, track: TrackRef, fx: usize, visible: bool) {
        if fx < self.fx_count(track) {
            self.modify(track, &format!("fx {} visible -> {}", fx, visible), |t| {
                for (i, f) in t.fx.iter_mut().enumerate() {
                    f.visible = visible && i == fx;
                }
            });
        }
    }

    fn play(&mut self) {
        self.playing = true;
        self.note(format_args!("play"));
        self.push_play_state();
    }

    fn stop(&mut self) {
        self.playing = false;
        self.recording = false;
        self.note(format_args!("stop"));
        self.push_play_state();
    }

    fn record(&mut self) {
        self.playing = true;
        self.recording = true;
        self.note(format_args!("record"));
        self.push_play_state();
    }

    fn repeat(&self) -> bool {
        self.repeat
    }

    fn set_repeat(&mut self, repeat: bool) {
        self.repeat = repeat;
        self.note(format_args!("repeat -> {}", repeat));
        self.events.push(HostEvent::RepeatChanged(repeat));
    }

    fn time_selection(&self) -> (f64, f64) {
        self.time_selection
    }

    fn set_time_selection(&mut self, start: f64, end: f64) {
        self.time_selection = (start, end);
        self.note(format_args!("time selection -> {:.3}..{:.3}", start, end));
    }

    fn markers(&self) -> Vec<f64> {
        self.markers.clone()
    }

    fn time_signature_at(&self, _time: f64) -> (u32, u32) {
        self.time_signature
    }

    fn time_to_beats(&self, time: f64) -> f64 {
        time * self.tempo_bpm / 60.0
    }

    fn beats_to_time(&self, beats: f64) -> f64 {
        beats * 60.0 / self.tempo_bpm
    }

    /// Grid is one quarter note
    fn snap_to_grid(&self, time: f64) -> f64 {
        self.beats_to_time(self.time_to_beats(time).round())
    }

    fn edit_cursor(&self) -> f64 {
        self.edit_cursor
    }

    fn set_edit_cursor(&mut self, time: f64) {
        let time = time.max(0.0);
        self.edit_cursor = time;
        self.note(format_args!("edit cursor -> {:.3}", time));
    }

    fn scrub(&mut self, amount: f64) {
        self.scrub_position += amount;
        self.note(format_args!("scrub {:+.3}", amount));
    }

    fn arrow(&mut self, direction: ArrowDirection, zoom: bool) {
        self.arrows.push((direction, zoom));
        self.note(format_args!("arrow {:?} zoom={}", direction, zoom));
    }

    fn set_automation_mode(&mut self, mode: AutomationMode, selected_only: bool) {
        for t in self.tracks.iter_mut() {
            if !selected_only || t.selected {
                t.automation = mode;
            }
        }
        self.note(format_args!(
            "automation -> {:?} (selected only: {})",
            mode, selected_only
        ));
        self.events.push(HostEvent::AutomationModeChanged(mode));
    }

    fn scroll_mixer_to(&mut self, track: usize) {
        self.mixer_scroll = track;
        self.note(format_args!("mixer scroll -> {}", track));
    }

    fn run_command(&mut self, command: Command) {
        info!(
            "🎮 [{}] sim command {:?}",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            command
        );
        self.commands.push(command);

        match command {
            Command::SelectAllTracks => self.set_all_selected(true),
            Command::UnselectAllTracks => self.set_all_selected(false),
            Command::JumpToPreviousMarker => {
                let cursor = self.edit_cursor;
                let target = self.markers.iter().rev().find(|m| **m < cursor).copied();
                self.set_edit_cursor(target.unwrap_or(0.0));
            }
            Command::JumpToNextMarker => {
                let cursor = self.edit_cursor;
                let target = self.markers.iter().find(|m| **m > cursor).copied();
                if let Some(target) = target {
                    self.set_edit_cursor(target);
                }
            }
            Command::ToggleRecordPunch => {
                let recording = !self.recording;
                self.recording = recording;
                self.note(format_args!("punch record -> {}", recording));
            }
            Command::TimeSelectionToItems => {
                let end = self.project_length();
                self.set_time_selection(0.0, end);
            }
            Command::InsertTrack => {
                self.tracks.push(SimTrack::default());
                self.note(format_args!("insert track"));
                self.events.push(HostEvent::TrackListChanged);
            }
            Command::DeleteSelectedTracks => {
                let before = self.tracks.len();
                self.tracks.retain(|t| !t.selected);
                let removed = before - self.tracks.len();
                if removed > 0 {
                    self.note(format_args!("delete {} tracks", removed));
                    self.events.push(HostEvent::TrackListChanged);
                }
            }
            Command::AddAuxSend(slot) => {
                let name = format!("{}{}", self.aux_send_prefix, slot);
                for i in self.selected_tracks() {
                    if !self.tracks[i].sends.iter().any(|s| s.name.contains(&name)) {
                        self.add_send(i, &name);
                        self.note(format_args!("track {} add send {}", i + 1, name));
                    }
                }
            }
            Command::RemoveAuxSend(slot) => {
                let name = format!("{}{}", self.aux_send_prefix, slot);
                for i in self.selected_tracks() {
                    self.tracks[i].sends.retain(|s| !s.name.contains(&name));
                    self.note(format_args!("track {} remove send {}", i + 1, name));
                }
            }
            Command::OpenFxBrowser(track) => {
                let count = self.fx_count(track);
                self.modify(track, "insert fx", |t| {
                    t.fx.push(SimFx::new(format!("FX {}", count + 1), 8))
                });
            }
            Command::RemoveFx { track, fx } => {
                if fx < self.fx_count(track) {
                    self.modify(track, &format!("remove fx {}", fx), |t| {
                        t.fx.remove(fx);
                    });
                }
            }
            Command::MoveFx { track, fx, down } => {
                let count = self.fx_count(track);
                let other = if down { fx + 1 } else { fx.wrapping_sub(1) };
                if fx < count && other < count {
                    self.modify(track, &format!("move fx {} -> {}", fx, other), |t| {
                        t.fx.swap(fx, other)
                    });
                }
            }
            _ => {}
        }
    }
}
