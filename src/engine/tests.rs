//! Tests for Engine module

use super::*;
use crate::convert::{fader_to_volume, volume_to_fader};
use crate::host::{ArrowDirection, Command, HostEvent, SimHost};
use crate::midi::split_14bit;
use crate::surface::{
    Button, InputEvent, JoystickAxis, MemoryOutput, StripElement, BANK_LEDS, STATUS_BUTTON,
    STATUS_CONTROL,
};
use std::time::Duration;

fn strip(i: u8) -> Strip {
    Strip::new(i).unwrap()
}

fn make_engine(host: SimHost) -> Engine<SimHost, MemoryOutput> {
    Engine::new(host, MemoryOutput::new(), EngineConfig::default())
}

/// Engine after its first cycle, with the output cleared
fn started(host: SimHost) -> Engine<SimHost, MemoryOutput> {
    let mut engine = make_engine(host);
    engine.tick(Vec::<Vec<u8>>::new());
    pump(&mut engine);
    engine.output_mut().clear();
    engine
}

/// Forward the host's queued notifications, as the binary does every cycle
fn pump(engine: &mut Engine<SimHost, MemoryOutput>) {
    for event in engine.host_mut().take_events() {
        engine.on_host_event(event);
    }
}

fn idle(engine: &mut Engine<SimHost, MemoryOutput>, ticks: usize) {
    for _ in 0..ticks {
        engine.tick(Vec::<Vec<u8>>::new());
    }
}

fn press(engine: &mut Engine<SimHost, MemoryOutput>, button: Button) {
    engine.handle_input(InputEvent::Button {
        button,
        pressed: true,
    });
    engine.handle_input(InputEvent::Button {
        button,
        pressed: false,
    });
}

fn hold(engine: &mut Engine<SimHost, MemoryOutput>, button: Button, pressed: bool) {
    engine.handle_input(InputEvent::Button { button, pressed });
}

fn strip_button(engine: &mut Engine<SimHost, MemoryOutput>, s: Strip, element: StripElement) {
    engine.handle_input(InputEvent::StripButton {
        strip: s,
        element,
        pressed: true,
    });
}

fn lamp_value(engine: &Engine<SimHost, MemoryOutput>, lamp: u8) -> Option<u8> {
    engine.output().last_value(STATUS_BUTTON, lamp)
}

fn volume(engine: &Engine<SimHost, MemoryOutput>, track: usize) -> f64 {
    engine.host().volume(TrackRef::Track(track)).unwrap()
}

#[test]
fn test_fader_end_to_end() {
    let mut engine = started(SimHost::new(8));

    // four-byte low half, then the high half
    engine.tick(vec![vec![0xB0, 0x23, 0x00, 0x64], vec![0xB0, 0x03, 0x40]]);
    assert!((volume(&engine, 3) - fader_to_volume(8292)).abs() < 1e-9);

    engine.output_mut().clear();
    pump(&mut engine);
    let messages = engine.output().messages();
    assert_eq!(messages[0], [0xB0, 0x22, 0x64]);
    assert_eq!(messages[1], [0xB0, 0x03, 0x40]);
}

#[test]
fn test_interleaved_faders() {
    let mut engine = started(SimHost::new(8));

    engine.tick(vec![
        vec![0xB0, 0x20, 0x10],
        vec![0xB0, 0x21, 0x20],
        vec![0xB0, 0x01, 0x7F],
        vec![0xB0, 0x00, 0x40],
    ]);

    assert!((volume(&engine, 0) - fader_to_volume((0x40 << 7) | 0x10)).abs() < 1e-9);
    assert!((volume(&engine, 1) - fader_to_volume((0x7F << 7) | 0x20)).abs() < 1e-9);
}

#[test]
fn test_initialization_sequence() {
    let mut host = SimHost::new(4);
    host.set_repeat(true);
    host.take_events();
    let mut engine = make_engine(host);
    assert!(!engine.is_initialized());

    engine.tick(Vec::<Vec<u8>>::new());
    assert!(engine.is_initialized());
    assert!(engine.mode().is_pan());
    assert!(!engine.mode().scrub);
    assert_eq!(engine.bank_offset(), 0);

    assert_eq!(lamp_value(&engine, Button::Pan.cc()), Some(0x7F));
    assert_eq!(lamp_value(&engine, Button::Scrub.cc()), Some(0x00));
    assert_eq!(lamp_value(&engine, Button::In.cc()), Some(0x7F));
    assert_eq!(lamp_value(&engine, Button::Out.cc()), Some(0x7F));
    assert_eq!(
        engine.output().last_value(STATUS_CONTROL, BANK_LEDS),
        Some(0)
    );

    // the host is read, never toggled
    assert!(engine.host().repeat());
    assert_eq!(
        engine.host().track(TrackRef::Track(2)).unwrap().automation,
        AutomationMode::Trim
    );

    // a second cycle does not initialize again
    engine.output_mut().clear();
    engine.tick(Vec::<Vec<u8>>::new());
    assert!(!engine.output().contains([STATUS_BUTTON, Button::Pan.cc(), 0x7F]));
}

#[test]
fn test_touch_suppresses_fader_updates() {
    let mut engine = started(SimHost::new(8));
    let s = strip(3);
    engine.handle_input(InputEvent::FaderTouch {
        strip: s,
        touched: true,
    });
    assert!(engine.is_touched(TrackRef::Track(3)));

    engine.host_mut().set_volume(TrackRef::Track(3), 0.5);
    pump(&mut engine);
    idle(&mut engine, 10);
    assert!(engine.output().last_value(STATUS_CONTROL, 0x03).is_none());
    assert!(engine.output().last_value(STATUS_CONTROL, 0x22).is_none());

    engine.handle_input(InputEvent::FaderTouch {
        strip: s,
        touched: false,
    });
    assert!(!engine.is_touched(TrackRef::Track(3)));
    let (low, high) = split_14bit(volume_to_fader(0.5));
    assert_eq!(engine.output().last_value(STATUS_CONTROL, 0x22), Some(low));
    assert_eq!(engine.output().last_value(STATUS_CONTROL, 0x03), Some(high));
}

#[test]
fn test_qualifier_precedence_on_faders() {
    let mut engine = started(SimHost::new(4));
    let fader = InputEvent::Fader {
        strip: strip(2),
        position: 4000,
    };

    hold(&mut engine, Button::FunctionKey, true);
    hold(&mut engine, Button::Shift, true);
    engine.handle_input(fader);
    assert_eq!(volume(&engine, 2), 0.0);

    hold(&mut engine, Button::FunctionKey, false);
    engine.handle_input(fader);
    assert_eq!(volume(&engine, 2), 1.0);

    // Shift centres pan
    engine.host_mut().set_pan(TrackRef::Track(2), 0.5);
    engine.handle_input(InputEvent::Encoder {
        strip: strip(2),
        ticks: 3,
    });
    assert_eq!(engine.host().pan(TrackRef::Track(2)), Some(0.0));

    hold(&mut engine, Button::Shift, false);
    engine.handle_input(fader);
    assert!((volume(&engine, 2) - fader_to_volume(4000)).abs() < 1e-9);
}

#[test]
fn test_encoder_rerenders_ring() {
    let mut engine = started(SimHost::new(4));
    engine.handle_input(InputEvent::Encoder {
        strip: strip(1),
        ticks: 10,
    });

    let pan = engine.host().pan(TrackRef::Track(1)).unwrap();
    assert!((pan - 0.1).abs() < 1e-9);
    let ring = engine.output().last_value(STATUS_CONTROL, 0x41).unwrap();
    assert_eq!(ring & 0xF0, crate::surface::RING_PAN);
}

#[test]
fn test_mode_exclusivity() {
    let mut host = SimHost::new(4);
    host.add_fx(0, "EQ", 10);
    let mut engine = started(host);

    press(&mut engine, Button::Chan);
    assert!(engine.mode().is_channel_strip());
    assert_eq!(lamp_value(&engine, Button::Chan.cc()), Some(0x01));
    assert_eq!(lamp_value(&engine, Button::Pan.cc()), Some(0x00));

    press(&mut engine, Button::Pan);
    assert!(engine.mode().is_pan());
    assert_eq!(lamp_value(&engine, Button::Chan.cc()), Some(0x00));

    press(&mut engine, Button::Aux(3));
    assert_eq!(engine.mode().aux().map(|s| s.number()), Some(3));
    assert_eq!(lamp_value(&engine, Button::Aux(3).cc()), Some(0x7F));
    assert_eq!(lamp_value(&engine, Button::Pan.cc()), Some(0x00));

    press(&mut engine, Button::Chan);
    assert!(engine.mode().is_channel_strip());
    assert_eq!(engine.mode().aux(), None);

    // Chan again leaves the mode
    press(&mut engine, Button::Chan);
    assert!(engine.mode().is_pan());
    assert_eq!(lamp_value(&engine, Button::Pan.cc()), Some(0x7F));
}

#[test]
fn test_chan_without_fx_opens_browser() {
    let mut engine = started(SimHost::new(4));
    press(&mut engine, Button::Chan);
    assert!(engine
        .host()
        .commands()
        .contains(&Command::OpenFxBrowser(TrackRef::Track(0))));
}

#[test]
fn test_param_offset_paging() {
    let mut host = SimHost::new(4);
    host.add_fx(0, "EQ", 10);
    host.add_fx(1, "Synth", 30);
    let mut engine = started(host);

    press(&mut engine, Button::Chan);
    press(&mut engine, Button::Aux(1));
    assert_eq!(engine.channel_strip().param_offset, 0);

    // select strip 1: 30 parameters, two pages
    strip_button(&mut engine, strip(1), StripElement::Select);
    assert_eq!(engine.channel_strip().track, TrackRef::Track(1));
    press(&mut engine, Button::Aux(1));
    assert_eq!(engine.channel_strip().param_offset, 24);
    press(&mut engine, Button::Aux(1));
    assert_eq!(engine.channel_strip().param_offset, 24);
    press(&mut engine, Button::Aux(2));
    assert_eq!(engine.channel_strip().param_offset, 0);
    press(&mut engine, Button::Aux(2));
    assert_eq!(engine.channel_strip().param_offset, 0);
}

#[test]
fn test_chan_select_same_strip_exits() {
    let mut host = SimHost::new(4);
    host.add_fx(0, "EQ", 4);
    host.add_fx(2, "Comp", 4);
    let mut engine = started(host);

    press(&mut engine, Button::Chan);
    strip_button(&mut engine, strip(2), StripElement::Select);
    assert_eq!(engine.channel_strip().strip, strip(2));
    assert_eq!(lamp_value(&engine, strip(2).lamp(StripElement::Select)), Some(0x01));
    assert_eq!(lamp_value(&engine, strip(0).lamp(StripElement::Select)), Some(0x00));
    // selection is untouched in channel strip mode
    assert!(!engine.host().is_selected(TrackRef::Track(2)));

    strip_button(&mut engine, strip(2), StripElement::Select);
    assert!(engine.mode().is_pan());
}

#[test]
fn test_master_fader_in_chan_flip() {
    let mut host = SimHost::new(4);
    host.add_fx(0, "EQ", 30);
    let mut engine = started(host);

    press(&mut engine, Button::Chan);
    press(&mut engine, Button::Flip);
    assert!(engine.mode().flip);

    engine.handle_input(InputEvent::Fader {
        strip: Strip::MASTER,
        position: 16383,
    });
    let master = engine.host().volume(TrackRef::Master).unwrap();
    assert!((master - fader_to_volume(16383)).abs() < 1e-9);

    // track faders drive FX parameters
    engine.handle_input(InputEvent::Fader {
        strip: strip(5),
        position: 16383,
    });
    let param = engine.host().fx_param(TrackRef::Track(0), 0, 5).unwrap();
    assert_eq!(param.value, param.max);
}

#[test]
fn test_aux_without_send_is_inactive() {
    let mut engine = started(SimHost::new(4));
    press(&mut engine, Button::Aux(2));
    let before = engine.host().mutation_count();

    engine.handle_input(InputEvent::Encoder {
        strip: strip(0),
        ticks: 5,
    });
    idle(&mut engine, 9);

    assert_eq!(engine.host().mutation_count(), before);
    assert_eq!(engine.output().last_value(STATUS_CONTROL, 0x40), Some(0));
}

#[test]
fn test_aux_fader_without_send_is_inactive() {
    let mut engine = started(SimHost::new(4));
    press(&mut engine, Button::Aux(2));
    press(&mut engine, Button::Flip);
    assert_eq!(engine.resolve(strip(0), Control::Fader), Target::Inactive);
    let before = engine.host().mutation_count();

    engine.handle_input(InputEvent::Fader {
        strip: strip(0),
        position: 9000,
    });
    idle(&mut engine, 9);

    assert_eq!(engine.host().mutation_count(), before);
    assert_eq!(engine.output().last_value(STATUS_CONTROL, 0x00), Some(0));
}

#[test]
fn test_add_aux_send_from_surface() {
    let mut engine = started(SimHost::new(4));
    engine.host_mut().set_selected(TrackRef::Track(1), true);
    press(&mut engine, Button::Aux(2));

    hold(&mut engine, Button::FunctionKey, true);
    press(&mut engine, Button::Aux(2));
    hold(&mut engine, Button::FunctionKey, false);

    assert_eq!(
        engine.resolve(strip(1), resolver::Control::Encoder),
        resolver::Target::SendVolume {
            track: TrackRef::Track(1),
            send: 0
        }
    );
}

#[test]
fn test_aux_macros_outside_aux_mode() {
    let mut engine = started(SimHost::new(4));
    hold(&mut engine, Button::Shift, true);
    press(&mut engine, Button::Aux(4));
    hold(&mut engine, Button::Shift, false);

    assert_eq!(engine.host().track_count(), 5);
    assert!(engine.mode().is_pan());
}

#[test]
fn test_delete_fx_wraps_to_last() {
    let mut host = SimHost::new(2);
    host.add_fx(0, "A", 4);
    host.add_fx(0, "B", 4);
    host.add_fx(0, "C", 4);
    let mut engine = started(host);

    press(&mut engine, Button::Chan);
    press(&mut engine, Button::Aux(5));
    assert_eq!(engine.host().fx_count(TrackRef::Track(0)), 2);
    assert_eq!(engine.channel_strip().fx, 1);

    press(&mut engine, Button::Aux(5));
    assert_eq!(engine.channel_strip().fx, 0);
    assert!(engine.mode().is_channel_strip());

    press(&mut engine, Button::Aux(5));
    assert_eq!(engine.host().fx_count(TrackRef::Track(0)), 0);
    assert!(engine.mode().is_pan());
}

#[test]
fn test_fx_bypass_lamps() {
    let mut host = SimHost::new(2);
    host.add_fx(0, "EQ", 4);
    let mut engine = started(host);

    press(&mut engine, Button::Chan);
    press(&mut engine, Button::Aux(3));
    assert!(!engine.host().fx_enabled(TrackRef::Track(0), 0));
    assert_eq!(lamp_value(&engine, Button::Aux(3).cc()), Some(0x01));

    press(&mut engine, Button::Aux(6));
    assert!(!engine.host().fx_chain_enabled(TrackRef::Track(0)));
    assert_eq!(lamp_value(&engine, Button::Aux(6).cc()), Some(0x01));

    // qualifiers darken the aux row
    hold(&mut engine, Button::Shift, true);
    assert_eq!(lamp_value(&engine, Button::Aux(3).cc()), Some(0x00));
}

#[test]
fn test_bank_shift() {
    let mut engine = started(SimHost::new(40));

    press(&mut engine, Button::BankUp);
    assert_eq!(engine.bank_offset(), 8);
    assert_eq!(engine.host().mixer_scroll(), 8);
    assert_eq!(lamp_value(&engine, Button::BankUp.cc()), Some(0x00));

    hold(&mut engine, Button::Shift, true);
    press(&mut engine, Button::BankUp);
    hold(&mut engine, Button::Shift, false);
    assert_eq!(engine.bank_offset(), 24);
    assert_eq!(
        engine.output().last_value(STATUS_CONTROL, BANK_LEDS),
        Some(1)
    );

    press(&mut engine, Button::BankDown);
    assert_eq!(engine.bank_offset(), 16);
    assert_eq!(
        engine.resolve(strip(0), resolver::Control::Fader),
        resolver::Target::Volume(TrackRef::Track(16))
    );
}

#[test]
fn test_strip_buttons() {
    let mut engine = started(SimHost::new(4));

    strip_button(&mut engine, strip(1), StripElement::Solo);
    strip_button(&mut engine, strip(2), StripElement::Select);
    pump(&mut engine);
    assert!(engine.host().is_soloed(TrackRef::Track(1)));
    assert!(engine.host().is_selected(TrackRef::Track(2)));
    assert_eq!(lamp_value(&engine, strip(1).lamp(StripElement::Solo)), Some(0x7F));
    assert_eq!(lamp_value(&engine, strip(2).lamp(StripElement::Select)), Some(0x7F));
    assert_eq!(lamp_value(&engine, Button::ClearSolo.cc()), Some(0x01));

    // Shift makes solo and mute exclusive
    hold(&mut engine, Button::Shift, true);
    strip_button(&mut engine, strip(3), StripElement::Solo);
    strip_button(&mut engine, strip(0), StripElement::Mute);
    hold(&mut engine, Button::Shift, false);
    assert!(!engine.host().is_soloed(TrackRef::Track(1)));
    assert!(engine.host().is_soloed(TrackRef::Track(3)));
    assert!(engine.host().is_muted(TrackRef::Track(0)));

    hold(&mut engine, Button::FunctionKey, true);
    strip_button(&mut engine, strip(0), StripElement::Select);
    hold(&mut engine, Button::FunctionKey, false);
    assert!(engine.host().is_rec_armed(TrackRef::Track(0)));

    // strips past the last track do nothing
    let before = engine.host().mutation_count();
    strip_button(&mut engine, strip(10), StripElement::Mute);
    assert_eq!(engine.host().mutation_count(), before);

    press(&mut engine, Button::ClearSolo);
    pump(&mut engine);
    assert!(!engine.host().any_soloed());
    assert_eq!(lamp_value(&engine, Button::ClearSolo.cc()), Some(0x00));
}

#[test]
fn test_phase_dot_on_encoder() {
    let mut engine = started(SimHost::new(4));
    hold(&mut engine, Button::Shift, true);
    strip_button(&mut engine, strip(1), StripElement::Select);
    hold(&mut engine, Button::Shift, false);

    assert!(engine.host().is_phase_inverted(TrackRef::Track(1)));
    let ring = engine.output().last_value(STATUS_CONTROL, 0x41).unwrap();
    assert_eq!(ring & 0x40, 0x40);
}

#[test]
fn test_master_select() {
    let mut engine = started(SimHost::new(4));
    press(&mut engine, Button::MasterSelect);
    assert!(engine.host().is_selected(TrackRef::Master));

    hold(&mut engine, Button::FunctionKey, true);
    press(&mut engine, Button::MasterSelect);
    assert_eq!(engine.host().selected_count(), 4);
    press(&mut engine, Button::MasterSelect);
    assert_eq!(engine.host().selected_count(), 0);
}

#[test]
fn test_transport_and_automation() {
    let mut engine = started(SimHost::new(4));

    press(&mut engine, Button::Play);
    pump(&mut engine);
    assert!(engine.host().is_playing());

    // record while playing toggles punch recording
    press(&mut engine, Button::Record);
    assert!(engine
        .host()
        .commands()
        .contains(&Command::ToggleRecordPunch));
    assert_eq!(lamp_value(&engine, Button::Record.cc()), Some(0x01));

    hold(&mut engine, Button::Shift, true);
    press(&mut engine, Button::FastForward);
    hold(&mut engine, Button::Shift, false);
    assert_eq!(
        engine.host().track(TrackRef::Track(0)).unwrap().automation,
        AutomationMode::Read
    );

    // with some tracks selected only those change
    engine.host_mut().set_selected(TrackRef::Track(1), true);
    hold(&mut engine, Button::Shift, true);
    press(&mut engine, Button::Play);
    hold(&mut engine, Button::Shift, false);
    assert_eq!(
        engine.host().track(TrackRef::Track(1)).unwrap().automation,
        AutomationMode::Write
    );
    assert_eq!(
        engine.host().track(TrackRef::Track(0)).unwrap().automation,
        AutomationMode::Read
    );

    hold(&mut engine, Button::FunctionKey, true);
    press(&mut engine, Button::Rewind);
    hold(&mut engine, Button::FunctionKey, false);
    assert!(engine.host().commands().contains(&Command::Undo));

    press(&mut engine, Button::Stop);
    pump(&mut engine);
    assert!(!engine.host().is_playing());
}

#[test]
fn test_time_selection_by_markers_and_bars() {
    let mut host = SimHost::new(2);
    host.set_markers(vec![0.0, 10.0, 20.0, 30.0]);
    host.set_time_selection(10.0, 20.0);
    let mut engine = started(host);

    press(&mut engine, Button::Out);
    assert_eq!(engine.host().time_selection(), (20.0, 30.0));

    press(&mut engine, Button::In);
    assert_eq!(engine.host().time_selection(), (10.0, 20.0));

    // one 4/4 bar at 120 bpm is two seconds
    hold(&mut engine, Button::FunctionKey, true);
    press(&mut engine, Button::Out);
    hold(&mut engine, Button::FunctionKey, false);
    assert_eq!(engine.host().time_selection(), (10.0, 22.0));
}

#[test]
fn test_loop_all_restores_selection() {
    let mut host = SimHost::new(2);
    host.set_markers(vec![0.0, 40.0]);
    host.set_time_selection(2.0, 4.0);
    let mut engine = started(host);

    hold(&mut engine, Button::Shift, true);
    press(&mut engine, Button::In);
    assert_eq!(engine.host().time_selection(), (0.0, 40.0));
    assert_eq!(lamp_value(&engine, Button::In.cc()), Some(0x7F));

    press(&mut engine, Button::In);
    assert_eq!(engine.host().time_selection(), (2.0, 4.0));
    assert_eq!(lamp_value(&engine, Button::In.cc()), Some(0x00));

    press(&mut engine, Button::Out);
    pump(&mut engine);
    assert!(engine.host().repeat());
    assert_eq!(lamp_value(&engine, Button::Out.cc()), Some(0x7F));
}

#[test]
fn test_loop_all_lamp_survives_repeat_changes() {
    let mut host = SimHost::new(2);
    host.set_markers(vec![0.0, 40.0]);
    let mut engine = started(host);

    hold(&mut engine, Button::Shift, true);
    press(&mut engine, Button::In);
    assert_eq!(lamp_value(&engine, Button::In.cc()), Some(0x7F));

    engine.on_host_event(HostEvent::RepeatChanged(false));
    assert_eq!(lamp_value(&engine, Button::In.cc()), Some(0x7F));
    assert_eq!(lamp_value(&engine, Button::Out.cc()), Some(0x00));

    // repeat on and off again from the surface
    press(&mut engine, Button::Out);
    press(&mut engine, Button::Out);
    pump(&mut engine);
    assert!(!engine.host().repeat());
    assert_eq!(lamp_value(&engine, Button::In.cc()), Some(0x7F));
    assert_eq!(lamp_value(&engine, Button::Out.cc()), Some(0x00));

    press(&mut engine, Button::In);
    assert_eq!(lamp_value(&engine, Button::In.cc()), Some(0x00));
}

#[test]
fn test_scrub_rerenders_track_strips() {
    let mut engine = started(SimHost::new(2));
    press(&mut engine, Button::Scrub);
    assert!(engine.mode().scrub);

    let (low, high) = split_14bit(volume_to_fader(1.0));
    let output = engine.output();
    assert!(output.contains([STATUS_CONTROL, 0x1F, low]));
    assert!(output.contains([STATUS_CONTROL, 0x00, high]));
    for s in Strip::tracks().filter(|s| s.index() >= 2) {
        assert!(output.contains([STATUS_CONTROL, 0x1F + s.index(), 0]));
        assert!(output.contains([STATUS_CONTROL, 0x40 + s.index(), 15]));
    }
}

#[test]
fn test_jog_wheel() {
    let mut engine = started(SimHost::new(2));
    engine.handle_input(InputEvent::JogWheel { ticks: 5 });
    assert!((engine.host().edit_cursor() - 0.1).abs() < 1e-9);

    press(&mut engine, Button::Scrub);
    assert!(engine.mode().scrub);
    engine.handle_input(InputEvent::JogWheel { ticks: 5 });
    assert!((engine.host().scrub_position() - 1.0).abs() < 1e-9);
}

#[test]
fn test_blink_timing() {
    let mut engine = make_engine(SimHost::new(2));

    idle(&mut engine, 21);
    assert!(!engine.blink_phase());
    idle(&mut engine, 1);
    assert!(engine.blink_phase());
    // trim lamp follows the phase
    assert_eq!(lamp_value(&engine, Button::Rewind.cc()), Some(0x7F));

    idle(&mut engine, 2);
    assert!(engine.blink_phase());
    idle(&mut engine, 1);
    assert!(!engine.blink_phase());
    assert_eq!(lamp_value(&engine, Button::Rewind.cc()), Some(0x00));
}

#[test]
fn test_joystick_arrows() {
    let mut engine = started(SimHost::new(2));
    engine.handle_input(InputEvent::Joystick {
        axis: JoystickAxis::Y,
        value: 0,
    });
    engine.handle_input(InputEvent::Joystick {
        axis: JoystickAxis::X,
        value: 127,
    });

    // no qualifier, no arrows
    idle(&mut engine, 7);
    assert!(engine.host().arrows().is_empty());

    hold(&mut engine, Button::Shift, true);
    idle(&mut engine, 7);
    assert_eq!(
        engine.host().arrows(),
        &[(ArrowDirection::Down, true), (ArrowDirection::Right, true)]
    );
}

#[test]
fn test_shutdown_zeroes_surface() {
    let mut host = SimHost::new(4);
    host.add_fx(0, "EQ", 4);
    let mut engine = started(host);
    press(&mut engine, Button::Chan);
    engine.output_mut().clear();

    assert!(engine.shutdown());
    assert!(engine.mode().is_pan());

    let output = engine.output();
    for s in Strip::all() {
        assert!(output.contains([STATUS_CONTROL, 0x1F + s.index(), 0]));
        assert!(output.contains([STATUS_CONTROL, s.index(), 0]));
    }
    for s in Strip::tracks() {
        assert!(output.contains([STATUS_CONTROL, 0x40 + s.index(), 0]));
    }
    for lamp in 0..=0x79u8 {
        assert_eq!(lamp_value(&engine, lamp), Some(0));
    }
    assert_eq!(output.last_value(STATUS_CONTROL, BANK_LEDS), Some(0));
}

#[test]
fn test_shutdown_releases_touch_and_pending_fader() {
    let mut engine = started(SimHost::new(8));
    engine.tick(vec![vec![0xB1, 0x0C, 0x7F], vec![0xB0, 0x23, 0x00, 0x64]]);
    assert!(engine.is_touched(TrackRef::Track(3)));

    assert!(engine.shutdown());
    assert!(!engine.is_touched(TrackRef::Track(3)));

    // the high half alone no longer completes a position
    let before = engine.host().mutation_count();
    engine.tick(vec![vec![0xB0, 0x03, 0x40]]);
    assert_eq!(engine.host().mutation_count(), before);
}

struct StuckOutput;

impl SurfaceOutput for StuckOutput {
    fn send(&mut self, _message: [u8; 3]) {}

    fn wait_drained(&mut self, _timeout: Duration, _poll: Duration) -> bool {
        false
    }
}

#[test]
fn test_shutdown_times_out() {
    let mut engine = Engine::new(SimHost::new(1), StuckOutput, EngineConfig::default());
    engine.tick(Vec::<Vec<u8>>::new());
    assert!(!engine.shutdown());
}

#[test]
fn test_track_list_change_rerenders() {
    let mut engine = started(SimHost::new(1));
    engine.host_mut().run_command(Command::InsertTrack);
    pump(&mut engine);

    // strip 1 now has a track at unity
    let (low, high) = split_14bit(volume_to_fader(1.0));
    assert_eq!(engine.output().last_value(STATUS_CONTROL, 0x20), Some(low));
    assert_eq!(engine.output().last_value(STATUS_CONTROL, 0x01), Some(high));
}

#[test]
fn test_config_reload() {
    let mut engine = make_engine(SimHost::new(1));
    let mut config = EngineConfig::default();
    config.encoder_pan_step = 0.05;
    engine.set_config(config.clone());
    assert_eq!(engine.config(), &config);

    engine.tick(Vec::<Vec<u8>>::new());
    engine.handle_input(InputEvent::Encoder {
        strip: strip(0),
        ticks: 2,
    });
    let pan = engine.host().pan(TrackRef::Track(0)).unwrap();
    assert!((pan - 0.1).abs() < 1e-9);
}
