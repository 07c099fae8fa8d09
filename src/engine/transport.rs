//! Transport, time selection, jog wheel and joystick

use tracing::debug;

use super::bank;
use crate::host::{ArrowDirection, AutomationMode, Command, Host};
use crate::surface::{Button, Lamp, SurfaceOutput};

/// Joystick axis centre on the 0-127 scale used for the dead zone
const JOYSTICK_MIDDLE: i32 = 64;

impl<H: Host, O: SurfaceOutput> super::Engine<H, O> {
    pub(super) fn on_rewind(&mut self) {
        if self.qualifiers.function_key {
            self.host.run_command(Command::Undo);
        } else if self.qualifiers.shift {
            self.set_automation(AutomationMode::Trim);
        } else {
            self.host.run_command(Command::JumpToPreviousMarker);
        }
    }

    pub(super) fn on_fast_forward(&mut self) {
        if self.qualifiers.function_key {
            self.host.run_command(Command::Redo);
        } else if self.qualifiers.shift {
            self.set_automation(AutomationMode::Read);
        } else {
            self.host.run_command(Command::JumpToNextMarker);
        }
    }

    pub(super) fn on_stop(&mut self) {
        if self.qualifiers.function_key {
            self.host.run_command(Command::ToggleScrollOnPlay);
        } else if self.qualifiers.shift {
            self.set_automation(AutomationMode::Touch);
        } else {
            self.host.stop();
        }
    }

    pub(super) fn on_play(&mut self) {
        if self.qualifiers.function_key {
            self.host.run_command(Command::SaveAs);
        } else if self.qualifiers.shift {
            self.set_automation(AutomationMode::Write);
        } else {
            self.host.play();
        }
    }

    pub(super) fn on_record(&mut self) {
        if self.qualifiers.function_key {
            self.host.run_command(Command::Save);
        } else if self.qualifiers.shift {
            self.host.run_command(Command::WriteCurrentAutomationValues);
        } else if self.transport.playing {
            self.transport.recording = !self.transport.recording;
            self.host.run_command(Command::ToggleRecordPunch);
            self.render_record_lamp();
        } else {
            self.host.record();
        }
    }

    /// Automation mode for the selected tracks, or all tracks when none or
    /// all of them are selected
    pub(super) fn set_automation(&mut self, mode: AutomationMode) {
        let selected = self.host.selected_count();
        let selected_only = selected > 0 && selected != self.host.track_count();
        debug!("🤖 Automation {:?} (selected only: {})", mode, selected_only);
        self.host.set_automation_mode(mode, selected_only);
        self.transport.automation = mode;
        self.render_auto_lamps();
    }

    pub(super) fn on_bank(&mut self, direction: i32, pressed: bool) {
        let button = if direction < 0 {
            Button::BankDown
        } else {
            Button::BankUp
        };

        if !pressed {
            let state = if self.mode.is_channel_strip() {
                Lamp::Blink
            } else {
                Lamp::Off
            };
            self.button_lamp(button, state);
            return;
        }
        self.button_lamp(button, Lamp::On);

        if self.mode.is_channel_strip() {
            if self.qualifiers.function_key {
                self.move_fx(direction);
            } else if self.qualifiers.shift {
                if direction < 0 {
                    self.close_fx();
                } else {
                    let fx = self.channel.fx as i64;
                    self.open_fx(fx);
                }
            } else {
                self.close_fx();
                let next = self.channel.fx as i64 + i64::from(direction);
                self.open_fx(next);
                self.render_track_strips();
                self.render_aux_lamps();
            }
        } else if self.qualifiers.function_key {
            self.move_time_selection(direction, 0, false);
        } else {
            let factor = bank::page_factor(self.qualifiers.shift);
            self.shift_banks(direction, factor);
        }
    }

    pub(super) fn on_in(&mut self, pressed: bool) {
        if pressed {
            if self.qualifiers.function_key {
                self.move_time_selection(0, -1, false);
            } else if self.qualifiers.shift {
                self.toggle_loop_all();
            } else {
                self.move_time_selection(-1, -1, true);
            }
        }
        let lit = pressed || self.loop_lamps_lit().0;
        self.button_lamp(Button::In, Lamp::from_bool(lit));
    }

    pub(super) fn on_out(&mut self, pressed: bool) {
        if pressed {
            if self.qualifiers.function_key {
                self.move_time_selection(0, 1, false);
            } else if self.qualifiers.shift {
                let repeat = self.host.repeat();
                self.host.set_repeat(!repeat);
                self.transport.repeat = self.host.repeat();
                self.render_loop_lamps();
            } else {
                self.move_time_selection(1, 1, true);
            }
        }
        let lit = pressed || self.loop_lamps_lit().1;
        self.button_lamp(Button::Out, Lamp::from_bool(lit));
    }

    /// Move the time selection edges.
    ///
    /// By markers, the selection becomes the marker region before the
    /// start (`start_dir < 0`) or after the end (`end_dir > 0`). Otherwise
    /// each edge with a non-zero direction moves by one bar of the time
    /// signature at the start, snapped to the grid.
    pub(super) fn move_time_selection(&mut self, start_dir: i32, end_dir: i32, by_markers: bool) {
        let (start, end) = self.host.time_selection();

        if by_markers {
            let mut previous = 0.0;
            for marker in self.host.markers() {
                if (start_dir < 0 && marker >= start) || (end_dir > 0 && marker > end) {
                    self.host.set_time_selection(previous, marker);
                    return;
                }
                previous = marker;
            }
            return;
        }

        let (numerator, denominator) = self.host.time_signature_at(start);
        let bar = 4.0 * f64::from(numerator) / f64::from(denominator.max(1));
        let host = &self.host;
        let moved = |time: f64, direction: i32| {
            if direction == 0 {
                return time;
            }
            let beats = host.time_to_beats(time) + f64::from(direction) * bar;
            host.snap_to_grid(host.beats_to_time(beats).max(0.0))
        };
        let new_start = moved(start, start_dir);
        let new_end = moved(end, end_dir).max(new_start);
        self.host.set_time_selection(new_start, new_end);
    }

    /// Loop all items, or restore the selection saved by the previous press
    fn toggle_loop_all(&mut self) {
        if let Some((start, end)) = self.transport.saved_selection.take() {
            self.host.set_time_selection(start, end);
            return;
        }
        self.transport.saved_selection = Some(self.host.time_selection());
        self.host.run_command(Command::SelectAllItems);
        self.host.run_command(Command::TimeSelectionToItems);
        self.host.run_command(Command::UnselectAllItems);
    }

    pub(super) fn on_jog(&mut self, ticks: i32) {
        let ticks = f64::from(ticks);
        let fast = self.qualifiers.function_key;
        if self.mode.scrub {
            let divisor = if fast {
                self.config.scrub_fast
            } else {
                self.config.scrub_slow
            };
            self.host.scrub(ticks / divisor);
        } else {
            let divisor = if fast {
                self.config.cursor_fast
            } else {
                self.config.cursor_slow
            };
            let cursor = self.host.edit_cursor();
            self.host.set_edit_cursor(cursor + ticks / divisor);
        }
    }

    /// Sampled joystick position to arrow requests; only active while a
    /// qualifier is held, Shift zooms
    pub(super) fn poll_joystick(&mut self) {
        if !self.qualifiers.any() {
            return;
        }
        let zoom = self.qualifiers.shift;
        let half = i32::from(self.config.joystick_dead_zone) / 2;
        let (x, y) = (i32::from(self.joystick.x), i32::from(self.joystick.y));

        if y < JOYSTICK_MIDDLE - half {
            self.host.arrow(ArrowDirection::Down, zoom);
        } else if y > JOYSTICK_MIDDLE + half {
            self.host.arrow(ArrowDirection::Up, zoom);
        }
        if x < JOYSTICK_MIDDLE - half {
            self.host.arrow(ArrowDirection::Left, zoom);
        } else if x > JOYSTICK_MIDDLE + half {
            self.host.arrow(ArrowDirection::Right, zoom);
        }
    }
}
