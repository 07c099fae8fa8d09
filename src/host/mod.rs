//! Host mixing console capability surface
//!
//! The engine never owns tracks, sends or FX; it reaches them through the
//! [`Host`] trait. Every getter tolerates references to entities that no
//! longer exist (deleted track, removed FX) by returning `None`, `false` or
//! zero, and every setter silently ignores them.

pub mod sim;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use sim::SimHost;

/// Reference to a mixer channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackRef {
    Master,
    /// Zero-based track index
    Track(usize),
}

impl fmt::Display for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackRef::Master => write!(f, "master"),
            TrackRef::Track(i) => write!(f, "track {}", i + 1),
        }
    }
}

/// Current value of an FX parameter together with its declared range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FxParamValue {
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

/// Arrange-view scroll/zoom direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Track automation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutomationMode {
    /// Off / trim
    #[default]
    Trim,
    Read,
    Touch,
    Write,
}

impl AutomationMode {
    /// Position of the mode's lamp among the rewind..play buttons
    pub fn lamp_index(self) -> u8 {
        match self {
            AutomationMode::Trim => 0,
            AutomationMode::Read => 1,
            AutomationMode::Touch => 2,
            AutomationMode::Write => 3,
        }
    }
}

/// Keystroke forwarded to the host's foreground window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
}

/// Symbolic editor actions the surface triggers without interpreting them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Undo,
    Redo,
    Save,
    SaveAs,
    SelectAllTracks,
    UnselectAllTracks,
    JumpToPreviousMarker,
    JumpToNextMarker,
    ToggleScrollOnPlay,
    CenterScrollOnPlayCursor,
    VerticalZoomToSelectedTracks,
    ToggleHorizontalZoomToTimeSelection,
    /// Toggle punch recording while playing
    ToggleRecordPunch,
    WriteCurrentAutomationValues,
    SelectAllItems,
    TimeSelectionToItems,
    UnselectAllItems,
    /// Move the selected tracks by one position (-1 left, +1 right)
    MoveSelectedTracks(i32),
    DuplicateSelectedTracks,
    RenameSelectedTracks,
    InsertTrack,
    DeleteSelectedTracks,
    WrapSelectedTracksInFolder,
    ToggleFolderChildren,
    GroupSelectedTracks,
    UngroupSelectedTracks,
    KeyStroke(Key),
    /// Route the selected tracks to the aux bus with this slot number
    AddAuxSend(u8),
    RemoveAuxSend(u8),
    /// Open the FX browser to insert an FX on a track
    OpenFxBrowser(TrackRef),
    RemoveFx { track: TrackRef, fx: usize },
    /// Move an FX one slot up (`down == false`) or down the chain
    MoveFx { track: TrackRef, fx: usize, down: bool },
}

/// Change notifications pushed by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    VolumeChanged(TrackRef),
    PanChanged(TrackRef),
    MuteChanged(TrackRef, bool),
    SoloChanged(TrackRef, bool),
    SelectionChanged(TrackRef, bool),
    RecArmChanged(TrackRef, bool),
    PlayState {
        playing: bool,
        paused: bool,
        recording: bool,
    },
    RepeatChanged(bool),
    AutomationModeChanged(AutomationMode),
    TrackListChanged,
}

/// Capabilities the engine needs from the host mixer
pub trait Host {
    // --- Tracks ---

    /// Number of tracks, master excluded
    fn track_count(&self) -> usize;

    fn track_exists(&self, track: TrackRef) -> bool {
        match track {
            TrackRef::Master => true,
            TrackRef::Track(i) => i < self.track_count(),
        }
    }

    fn volume(&self, track: TrackRef) -> Option<f64>;
    fn set_volume(&mut self, track: TrackRef, volume: f64);
    fn pan(&self, track: TrackRef) -> Option<f64>;
    fn set_pan(&mut self, track: TrackRef, pan: f64);
    fn width(&self, track: TrackRef) -> Option<f64>;
    fn set_width(&mut self, track: TrackRef, width: f64);

    fn is_muted(&self, track: TrackRef) -> bool;
    fn set_muted(&mut self, track: TrackRef, muted: bool);
    fn unmute_all(&mut self);

    fn is_soloed(&self, track: TrackRef) -> bool;
    fn set_soloed(&mut self, track: TrackRef, soloed: bool);
    fn unsolo_all(&mut self);
    fn any_soloed(&self) -> bool;

    fn is_selected(&self, track: TrackRef) -> bool;
    fn set_selected(&mut self, track: TrackRef, selected: bool);
    /// Number of selected tracks, master excluded
    fn selected_count(&self) -> usize;

    fn is_rec_armed(&self, track: TrackRef) -> bool;
    fn set_rec_armed(&mut self, track: TrackRef, armed: bool);
    fn is_phase_inverted(&self, track: TrackRef) -> bool;
    fn set_phase_inverted(&mut self, track: TrackRef, inverted: bool);

    // --- Sends ---

    fn send_count(&self, track: TrackRef) -> usize;
    fn send_name(&self, track: TrackRef, send: usize) -> Option<String>;
    fn send_volume(&self, track: TrackRef, send: usize) -> Option<f64>;
    fn set_send_volume(&mut self, track: TrackRef, send: usize, volume: f64);
    fn send_pan(&self, track: TrackRef, send: usize) -> Option<f64>;
    fn set_send_pan(&mut self, track: TrackRef, send: usize, pan: f64);

    // --- FX ---

    fn fx_count(&self, track: TrackRef) -> usize;
    fn fx_param_count(&self, track: TrackRef, fx: usize) -> usize;
    fn fx_param(&self, track: TrackRef, fx: usize, param: usize) -> Option<FxParamValue>;
    fn set_fx_param(&mut self, track: TrackRef, fx: usize, param: usize, value: f64);
    fn fx_enabled(&self, track: TrackRef, fx: usize) -> bool;
    fn set_fx_enabled(&mut self, track: TrackRef, fx: usize, enabled: bool);
    fn fx_chain_enabled(&self, track: TrackRef) -> bool;
    fn set_fx_chain_enabled(&mut self, track: TrackRef, enabled: bool);
    /// Show an FX in the chain window, or hide its windows
    fn show_fx(&mut self, track: TrackRef, fx: usize, visible: bool);

    // --- Transport ---

    fn play(&mut self);
    fn stop(&mut self);
    fn record(&mut self);
    fn repeat(&self) -> bool;
    fn set_repeat(&mut self, repeat: bool);

    // --- Time line ---

    /// Time selection as (start, end) in seconds
    fn time_selection(&self) -> (f64, f64);
    fn set_time_selection(&mut self, start: f64, end: f64);
    /// Marker and region positions in seconds, ascending
    fn markers(&self) -> Vec<f64>;
    /// Time signature (numerator, denominator) in effect at a time
    fn time_signature_at(&self, time: f64) -> (u32, u32);
    /// Seconds to quarter notes
    fn time_to_beats(&self, time: f64) -> f64;
    /// Quarter notes to seconds
    fn beats_to_time(&self, beats: f64) -> f64;
    fn snap_to_grid(&self, time: f64) -> f64;
    fn edit_cursor(&self) -> f64;
    fn set_edit_cursor(&mut self, time: f64);
    fn scrub(&mut self, amount: f64);
    fn arrow(&mut self, direction: ArrowDirection, zoom: bool);

    // --- Misc ---

    fn set_automation_mode(&mut self, mode: AutomationMode, selected_only: bool);
    /// Scroll the host's mixer so that this track index is leftmost
    fn scroll_mixer_to(&mut self, track: usize);
    fn run_command(&mut self, command: Command);
}
