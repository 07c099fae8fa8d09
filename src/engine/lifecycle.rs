//! Tick, initialization and shutdown

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::host::{AutomationMode, Host};
use crate::surface::{
    bank_leds_message, encoder_message, fader_messages, lamp_message, Lamp, Strip, SurfaceOutput,
    LAMP_LAST, STRIP_COUNT,
};

impl<H: Host, O: SurfaceOutput> super::Engine<H, O> {
    /// One host cycle: dispatch pending input, refresh a batch of strips,
    /// advance the blink and joystick counters. The first call also puts
    /// the surface into its baseline state.
    pub fn tick<I, M>(&mut self, input: I)
    where
        I: IntoIterator<Item = M>,
        M: AsRef<[u8]>,
    {
        for message in input {
            if let Some(event) = self.decoder.decode(message.as_ref()) {
                self.handle_input(event);
            }
        }

        for _ in 0..self.config.refresh_batch {
            if let Some(strip) = Strip::new(self.cursor) {
                self.render_strip(strip);
            }
            self.cursor = (self.cursor + 1) % STRIP_COUNT;
        }

        self.advance_blink();
        self.advance_joystick();

        if !self.initialized {
            self.initialize();
        }
    }

    fn advance_blink(&mut self) {
        if self.blink.counter > self.config.blink_interval {
            self.blink.on = !self.blink.on;
            self.blink.counter = if self.blink.on {
                self.config
                    .blink_interval
                    .saturating_sub(self.config.blink_ratio)
            } else {
                0
            };
            self.render_auto_lamps();
        } else {
            self.blink.counter += 1;
        }
    }

    fn advance_joystick(&mut self) {
        if self.joystick.counter > self.config.joystick_interval {
            self.joystick.counter = 0;
            self.poll_joystick();
        } else {
            self.joystick.counter += 1;
        }
    }

    fn initialize(&mut self) {
        info!(
            "🚀 [{}] Initializing surface ({} tracks)",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            self.host.track_count()
        );

        self.render_all();
        self.enter_pan();

        // the scrub lamp is written once
        self.mode.scrub = true;
        self.toggle_scrub();

        self.render_bank_leds();

        self.transport.repeat = self.host.repeat();
        self.render_loop_lamps();

        self.host.set_automation_mode(AutomationMode::Trim, false);
        self.transport.automation = AutomationMode::Trim;
        self.render_auto_lamps();

        self.initialized = true;
    }

    /// Return the surface to a dark, zeroed state and wait for the output
    /// to write it. Returns false when the wait timed out.
    pub fn shutdown(&mut self) -> bool {
        info!("🛑 Shutting down surface");
        self.exit_chan();

        if self.touch.any() {
            debug!("Releasing held faders");
        }
        self.touch.clear();
        self.decoder.reset();

        for strip in Strip::all() {
            for message in fader_messages(strip, 0) {
                self.output.send(message);
            }
            if !strip.is_master() {
                self.output.send(encoder_message(strip, 0));
            }
        }
        for lamp in 0..=LAMP_LAST {
            self.output.send(lamp_message(lamp, Lamp::Off));
        }
        self.output.send(bank_leds_message(0));

        let timeout = Duration::from_millis(self.config.shutdown_timeout_ms);
        let poll = Duration::from_millis(self.config.shutdown_poll_ms);
        if self.output.wait_drained(timeout, poll) {
            debug!("Surface output drained");
            true
        } else {
            warn!(
                "⚠️  Surface output not drained after {:?}, releasing anyway",
                timeout
            );
            false
        }
    }
}
