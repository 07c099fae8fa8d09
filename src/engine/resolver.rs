//! Channel/target resolver
//!
//! Decides what a fader or encoder controls from the current mode, the
//! qualifiers, the bank offset and the host's tracks. Nothing is cached:
//! every render and every input resolves again, so deleted tracks, sends or
//! FX simply turn the control inactive.

use super::bank::track_for_strip;
use super::mode::{ChannelStrip, ModeState, PrimaryMode, Qualifiers};
use crate::host::{Host, TrackRef};
use crate::surface::Strip;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Fader,
    Encoder,
}

/// What a control drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    MasterVolume,
    Volume(TrackRef),
    Pan(TrackRef),
    Width(TrackRef),
    SendVolume { track: TrackRef, send: usize },
    SendPan { track: TrackRef, send: usize },
    FxParam { track: TrackRef, fx: usize, param: usize },
    Inactive,
}

/// Engine state the resolver reads
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub mode: ModeState,
    pub qualifiers: Qualifiers,
    pub channel: ChannelStrip,
    pub bank_offset: usize,
    pub aux_send_prefix: &'a str,
}

pub fn resolve<H: Host + ?Sized>(
    ctx: &ResolveContext<'_>,
    host: &H,
    strip: Strip,
    control: Control,
) -> Target {
    match control {
        Control::Fader => resolve_fader(ctx, host, strip),
        Control::Encoder => resolve_encoder(ctx, host, strip),
    }
}

fn resolve_fader<H: Host + ?Sized>(ctx: &ResolveContext<'_>, host: &H, strip: Strip) -> Target {
    if strip.is_master() {
        return Target::MasterVolume;
    }

    let track = track_for_strip(ctx.bank_offset, strip);
    match (ctx.mode.primary, ctx.mode.flip) {
        (PrimaryMode::ChannelStrip, true) => return fx_param(ctx, host, strip),
        (PrimaryMode::Aux(slot), true) => {
            return match find_aux_send(host, track, ctx.aux_send_prefix, slot.number()) {
                Some(send) => Target::SendVolume { track, send },
                None => Target::Inactive,
            };
        }
        _ => {}
    }

    if !host.track_exists(track) {
        return Target::Inactive;
    }
    if ctx.mode.flip {
        if ctx.qualifiers.function_key {
            Target::Width(track)
        } else {
            Target::Pan(track)
        }
    } else {
        Target::Volume(track)
    }
}

fn resolve_encoder<H: Host + ?Sized>(ctx: &ResolveContext<'_>, host: &H, strip: Strip) -> Target {
    if strip.is_master() {
        return Target::Inactive;
    }

    let track = track_for_strip(ctx.bank_offset, strip);
    match ctx.mode.primary {
        PrimaryMode::ChannelStrip if !ctx.mode.flip => return fx_param(ctx, host, strip),
        PrimaryMode::Aux(slot) => {
            let Some(send) = find_aux_send(host, track, ctx.aux_send_prefix, slot.number()) else {
                return Target::Inactive;
            };
            return if ctx.mode.flip {
                Target::SendPan { track, send }
            } else {
                Target::SendVolume { track, send }
            };
        }
        _ => {}
    }

    if !host.track_exists(track) {
        Target::Inactive
    } else if ctx.mode.flip {
        Target::Volume(track)
    } else if ctx.qualifiers.function_key {
        Target::Width(track)
    } else {
        Target::Pan(track)
    }
}

/// FX parameter of the channel strip shown on this strip; the strip's own
/// track does not matter
fn fx_param<H: Host + ?Sized>(ctx: &ResolveContext<'_>, host: &H, strip: Strip) -> Target {
    let channel = &ctx.channel;
    let param = channel.param_offset + strip.index() as usize;
    if param < host.fx_param_count(channel.track, channel.fx) {
        Target::FxParam {
            track: channel.track,
            fx: channel.fx,
            param,
        }
    } else {
        Target::Inactive
    }
}

/// First send on `track` whose name contains `{prefix}{slot}`
pub fn find_aux_send<H: Host + ?Sized>(
    host: &H,
    track: TrackRef,
    prefix: &str,
    slot: u8,
) -> Option<usize> {
    let pattern = format!("{}{}", prefix, slot);
    (0..host.send_count(track)).find(|&send| {
        host.send_name(track, send)
            .map(|name| name.contains(&pattern))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mode::AuxSlot;
    use crate::host::SimHost;

    fn strip(i: u8) -> Strip {
        Strip::new(i).unwrap()
    }

    fn ctx(primary: PrimaryMode, flip: bool) -> ResolveContext<'static> {
        ResolveContext {
            mode: ModeState {
                primary,
                flip,
                scrub: false,
            },
            qualifiers: Qualifiers::default(),
            channel: ChannelStrip::default(),
            bank_offset: 0,
            aux_send_prefix: "aux---",
        }
    }

    fn host() -> SimHost {
        let mut host = SimHost::new(4);
        host.add_send(1, "aux---2 bus");
        host.add_fx(0, "EQ", 10);
        host
    }

    #[test]
    fn test_pan_mode_targets() {
        let host = host();
        let mut c = ctx(PrimaryMode::Pan, false);

        assert_eq!(
            resolve(&c, &host, strip(2), Control::Fader),
            Target::Volume(TrackRef::Track(2))
        );
        assert_eq!(
            resolve(&c, &host, strip(2), Control::Encoder),
            Target::Pan(TrackRef::Track(2))
        );
        assert_eq!(resolve(&c, &host, strip(9), Control::Fader), Target::Inactive);

        c.qualifiers.function_key = true;
        assert_eq!(
            resolve(&c, &host, strip(2), Control::Encoder),
            Target::Width(TrackRef::Track(2))
        );
    }

    #[test]
    fn test_flip_swaps_roles() {
        let host = host();
        let mut c = ctx(PrimaryMode::Pan, true);

        assert_eq!(
            resolve(&c, &host, strip(1), Control::Fader),
            Target::Pan(TrackRef::Track(1))
        );
        assert_eq!(
            resolve(&c, &host, strip(1), Control::Encoder),
            Target::Volume(TrackRef::Track(1))
        );

        c.qualifiers.function_key = true;
        assert_eq!(
            resolve(&c, &host, strip(1), Control::Fader),
            Target::Width(TrackRef::Track(1))
        );
    }

    #[test]
    fn test_master_strip() {
        let host = host();
        for primary in [PrimaryMode::Pan, PrimaryMode::ChannelStrip] {
            for flip in [false, true] {
                let c = ctx(primary, flip);
                assert_eq!(
                    resolve(&c, &host, Strip::MASTER, Control::Fader),
                    Target::MasterVolume
                );
                assert_eq!(
                    resolve(&c, &host, Strip::MASTER, Control::Encoder),
                    Target::Inactive
                );
            }
        }
    }

    #[test]
    fn test_channel_strip_params() {
        let host = host();
        let mut c = ctx(PrimaryMode::ChannelStrip, false);

        // FX parameters ignore the bank offset
        c.bank_offset = 8;
        assert_eq!(
            resolve(&c, &host, strip(5), Control::Encoder),
            Target::FxParam {
                track: TrackRef::Track(0),
                fx: 0,
                param: 5
            }
        );
        assert_eq!(resolve(&c, &host, strip(10), Control::Encoder), Target::Inactive);

        // unflipped faders keep their track role
        assert_eq!(resolve(&c, &host, strip(20), Control::Fader), Target::Inactive);
        c.bank_offset = 0;
        assert_eq!(
            resolve(&c, &host, strip(3), Control::Fader),
            Target::Volume(TrackRef::Track(3))
        );

        c.mode.flip = true;
        assert_eq!(
            resolve(&c, &host, strip(9), Control::Fader),
            Target::FxParam {
                track: TrackRef::Track(0),
                fx: 0,
                param: 9
            }
        );
        assert_eq!(
            resolve(&c, &host, strip(3), Control::Encoder),
            Target::Volume(TrackRef::Track(3))
        );
    }

    #[test]
    fn test_aux_targets() {
        let host = host();
        let slot = AuxSlot::new(2).unwrap();
        let mut c = ctx(PrimaryMode::Aux(slot), false);

        assert_eq!(
            resolve(&c, &host, strip(1), Control::Encoder),
            Target::SendVolume {
                track: TrackRef::Track(1),
                send: 0
            }
        );
        assert_eq!(resolve(&c, &host, strip(2), Control::Encoder), Target::Inactive);
        assert_eq!(
            resolve(&c, &host, strip(1), Control::Fader),
            Target::Volume(TrackRef::Track(1))
        );

        c.mode.flip = true;
        assert_eq!(
            resolve(&c, &host, strip(1), Control::Encoder),
            Target::SendPan {
                track: TrackRef::Track(1),
                send: 0
            }
        );
        assert_eq!(
            resolve(&c, &host, strip(1), Control::Fader),
            Target::SendVolume {
                track: TrackRef::Track(1),
                send: 0
            }
        );
        assert_eq!(resolve(&c, &host, strip(0), Control::Fader), Target::Inactive);
    }

    #[test]
    fn test_find_aux_send_by_pattern() {
        let mut host = SimHost::new(1);
        host.add_send(0, "reverb");
        host.add_send(0, "aux---5");
        assert_eq!(find_aux_send(&host, TrackRef::Track(0), "aux---", 5), Some(1));
        assert_eq!(find_aux_send(&host, TrackRef::Track(0), "aux---", 1), None);
        assert_eq!(find_aux_send(&host, TrackRef::Track(7), "aux---", 5), None);
    }
}
