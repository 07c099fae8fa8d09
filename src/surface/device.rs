//! US-2400 MIDI connection
//!
//! Opens the configured input and output ports with midir. Input bytes are
//! handed from the midir callback thread to the engine through a crossbeam
//! channel; output goes through a [`ThreadedOutput`].

use crossbeam::channel::{self, Receiver, Sender};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::ThreadedOutput;
use crate::config::MidiConfig;
use crate::midi::format_hex;

const CLIENT_NAME: &str = "US2400-GW";

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("MIDI input port {0} not found")]
    InputPortNotFound(usize),

    #[error("MIDI output port {0} not found")]
    OutputPortNotFound(usize),

    #[error("failed to initialize MIDI: {0}")]
    Init(#[from] midir::InitError),

    #[error("failed to connect to {port}: {reason}")]
    Connect { port: String, reason: String },

    #[error("failed to start output writer: {0}")]
    Writer(String),
}

/// Which side of the connection failed to open. Reported once; the
/// gateway keeps running with whatever did open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStatus {
    pub input_failed: bool,
    pub output_failed: bool,
}

impl DeviceStatus {
    pub fn is_ok(&self) -> bool {
        !self.input_failed && !self.output_failed
    }
}

/// Connection to one US-2400
pub struct Us2400Device {
    _input: Option<MidiInputConnection<()>>,
    input_rx: Receiver<Vec<u8>>,
    output: Option<ThreadedOutput>,
    input_name: Option<String>,
    output_name: Option<String>,
}

impl Us2400Device {
    /// Open the configured ports. Ports left unset in the configuration are
    /// not opened and do not count as failures.
    pub fn open(config: &MidiConfig) -> (Self, DeviceStatus) {
        let (tx, input_rx) = channel::unbounded();
        let mut status = DeviceStatus::default();

        let (input, input_name) = match config.input_device {
            Some(index) => match Self::connect_input(index, tx) {
                Ok((conn, name)) => (Some(conn), Some(name)),
                Err(e) => {
                    warn!("⚠️  Surface input unavailable: {}", e);
                    status.input_failed = true;
                    (None, None)
                }
            },
            None => (None, None),
        };

        let (output, output_name) = match config.output_device {
            Some(index) => match Self::connect_output(index) {
                Ok((output, name)) => (Some(output), Some(name)),
                Err(e) => {
                    warn!("⚠️  Surface output unavailable: {}", e);
                    status.output_failed = true;
                    (None, None)
                }
            },
            None => (None, None),
        };

        (
            Self {
                _input: input,
                input_rx,
                output,
                input_name,
                output_name,
            },
            status,
        )
    }

    fn connect_input(
        index: usize,
        tx: Sender<Vec<u8>>,
    ) -> Result<(MidiInputConnection<()>, String), DeviceError> {
        let mut midi_in = MidiInput::new(&format!("{}-Input", CLIENT_NAME))?;
        midi_in.ignore(Ignore::None);

        let ports = midi_in.ports();
        let port = ports
            .get(index)
            .ok_or(DeviceError::InputPortNotFound(index))?;
        let name = midi_in
            .port_name(port)
            .unwrap_or_else(|_| format!("input #{}", index));

        info!("Connecting to input port: {}", name);

        let conn = midi_in
            .connect(
                port,
                CLIENT_NAME,
                move |_timestamp, data, _| {
                    // receiver gone means we are shutting down
                    let _ = tx.send(data.to_vec());
                },
                (),
            )
            .map_err(|e| DeviceError::Connect {
                port: name.clone(),
                reason: e.to_string(),
            })?;

        Ok((conn, name))
    }

    fn connect_output(index: usize) -> Result<(ThreadedOutput, String), DeviceError> {
        let midi_out = MidiOutput::new(&format!("{}-Output", CLIENT_NAME))?;

        let ports = midi_out.ports();
        let port = ports
            .get(index)
            .ok_or(DeviceError::OutputPortNotFound(index))?;
        let name = midi_out
            .port_name(port)
            .unwrap_or_else(|_| format!("output #{}", index));

        info!("Connecting to output port: {}", name);

        let mut conn = midi_out
            .connect(port, CLIENT_NAME)
            .map_err(|e| DeviceError::Connect {
                port: name.clone(),
                reason: e.to_string(),
            })?;

        let output = ThreadedOutput::spawn("us2400-out", move |data| {
            conn.send(data)
                .map_err(|e| anyhow::anyhow!("MIDI send failed: {}", e))?;
            debug!("Sent: {}", format_hex(data));
            Ok(())
        })
        .map_err(|e| DeviceError::Writer(e.to_string()))?;

        Ok((output, name))
    }

    /// Raw messages received since the last call
    pub fn drain_input(&self) -> impl Iterator<Item = Vec<u8>> + '_ {
        self.input_rx.try_iter()
    }

    /// Hand the output transport to the engine
    pub fn take_output(&mut self) -> Option<ThreadedOutput> {
        self.output.take()
    }

    pub fn input_name(&self) -> Option<&str> {
        self.input_name.as_deref()
    }

    pub fn output_name(&self) -> Option<&str> {
        self.output_name.as_deref()
    }
}

/// Port discovery utilities
pub mod discovery {
    use super::*;
    use anyhow::Result;

    /// Port name fragments identifying a US-2400
    const SURFACE_PATTERNS: [&str; 3] = ["US-2400", "US2400", "TASCAM"];

    /// Information about a MIDI port
    #[derive(Debug, Clone)]
    pub struct PortInfo {
        pub index: usize,
        pub name: String,
        pub is_virtual: bool,
    }

    impl PortInfo {
        pub fn is_surface(&self) -> bool {
            let name = self.name.to_uppercase();
            SURFACE_PATTERNS.iter().any(|p| name.contains(p))
        }
    }

    fn port_info(index: usize, name: String) -> PortInfo {
        let is_virtual =
            name.contains("Virtual") || name.contains("loopMIDI") || name.contains("IAC");
        PortInfo {
            index,
            name,
            is_virtual,
        }
    }

    pub fn discover_input_ports() -> Result<Vec<PortInfo>> {
        let midi_in = MidiInput::new(&format!("{}-Discovery", CLIENT_NAME))?;
        Ok(midi_in
            .ports()
            .iter()
            .enumerate()
            .filter_map(|(index, port)| midi_in.port_name(port).ok().map(|n| port_info(index, n)))
            .collect())
    }

    pub fn discover_output_ports() -> Result<Vec<PortInfo>> {
        let midi_out = MidiOutput::new(&format!("{}-Discovery", CLIENT_NAME))?;
        Ok(midi_out
            .ports()
            .iter()
            .enumerate()
            .filter_map(|(index, port)| midi_out.port_name(port).ok().map(|n| port_info(index, n)))
            .collect())
    }

    /// Indices of the first input and output ports that look like a US-2400
    pub fn find_us2400_ports() -> Option<(usize, usize)> {
        let inputs = discover_input_ports().ok()?;
        let outputs = discover_output_ports().ok()?;
        let input = inputs.iter().find(|p| p.is_surface() && !p.is_virtual)?;
        let output = outputs.iter().find(|p| p.is_surface() && !p.is_virtual)?;
        Some((input.index, output.index))
    }
}
