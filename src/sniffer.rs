//! MIDI sniffer for debugging and development
//!
//! Prints every message a surface sends, decoded with the same decoder the
//! engine uses, so fader pairs show up as complete positions.

use anyhow::{Context, Result};
use colored::*;
use midir::{Ignore, MidiInput, MidiInputConnection};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::midi::format_hex;
use crate::surface::device::discovery;
use crate::surface::{Decoder, InputEvent};

/// One received message
#[derive(Debug, Clone)]
pub struct SnifferEvent {
    pub timestamp: String,
    pub port_name: String,
    pub data: Vec<u8>,
    /// `None` for garbage and for the first half of a fader pair
    pub decoded: Option<InputEvent>,
}

/// Sniff one input port, or every physical input when `port` is `None`,
/// until Ctrl+C
pub async fn run_sniffer(port: Option<usize>) -> Result<()> {
    println!("{}", "=== US-2400 MIDI Sniffer ===".bold().cyan());
    println!("Press Ctrl+C to exit");
    list_ports_formatted();

    let (tx, mut rx) = mpsc::channel::<SnifferEvent>(1000);
    let mut connections = Vec::new();

    let ports = discovery::discover_input_ports().context("Failed to list MIDI inputs")?;
    for info in ports {
        let wanted = match port {
            Some(index) => info.index == index,
            None => !info.is_virtual,
        };
        if wanted {
            connections.push(connect(info.index, &info.name, tx.clone())?);
        }
    }
    drop(tx);

    if connections.is_empty() {
        match port {
            Some(index) => anyhow::bail!("No MIDI input port at index {}", index),
            None => anyhow::bail!("No physical MIDI input ports found"),
        }
    }

    println!("\n{}", "Monitoring MIDI traffic...".green());
    println!(
        "{}",
        "Format: [timestamp] DIR PORT | HEX => DECODED".dimmed()
    );
    println!("{}\n", "─".repeat(80).dimmed());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => println!("{}", format_event(&event)),
                None => {
                    warn!("All sniffer connections closed");
                    break;
                }
            },
            _ = &mut ctrl_c => break,
        }
    }

    drop(connections);
    println!("\n{}", "Sniffer stopped".yellow());
    Ok(())
}

fn connect(
    index: usize,
    port_name: &str,
    tx: mpsc::Sender<SnifferEvent>,
) -> Result<MidiInputConnection<()>> {
    let mut midi_in = MidiInput::new(&format!("US2400-Sniffer-{}", index))?;
    midi_in.ignore(Ignore::None);
    let port = midi_in
        .ports()
        .into_iter()
        .nth(index)
        .with_context(|| format!("MIDI input port {} disappeared", index))?;

    info!("Connecting to: {}", port_name);

    let name = port_name.to_string();
    let mut decoder = Decoder::new();
    midi_in
        .connect(
            &port,
            "us2400-sniffer",
            move |_stamp, data, _| {
                let event = SnifferEvent {
                    timestamp: chrono::Local::now().format("%H:%M:%S%.3f").to_string(),
                    port_name: name.clone(),
                    data: data.to_vec(),
                    decoded: decoder.decode(data),
                };
                let _ = tx.try_send(event);
            },
            (),
        )
        .map_err(|e| anyhow::anyhow!("Failed to connect to {}: {}", port_name, e))
}

/// One output line: `[timestamp] IN  PORT | HEX => DECODED`
pub fn format_event(event: &SnifferEvent) -> String {
    let port = if event.port_name.chars().count() > 20 {
        let short: String = event.port_name.chars().take(17).collect();
        format!("{}...", short)
    } else {
        event.port_name.clone()
    };

    let hex = format_hex(&event.data);
    let (hex, decoded) = match &event.decoded {
        Some(decoded) => {
            let hex = match decoded {
                InputEvent::Button { .. } | InputEvent::StripButton { .. } => hex.bright_green(),
                InputEvent::FaderTouch { .. } => hex.cyan(),
                InputEvent::Fader { .. } => hex.bright_cyan(),
                InputEvent::Encoder { .. } | InputEvent::JogWheel { .. } => hex.bright_yellow(),
                InputEvent::Joystick { .. } => hex.bright_magenta(),
            };
            (hex, format!(" => {}", decoded.to_string().bright_blue()))
        }
        None => (hex.bright_black(), String::new()),
    };

    format!(
        "[{}] {} {:20} | {}{}",
        event.timestamp.dimmed(),
        "IN ".green(),
        port.white(),
        hex,
        decoded
    )
}

/// List all ports with their configuration indices
pub fn list_ports_formatted() {
    println!("\n{}", "=== Available MIDI Ports ===".bold().cyan());

    let sections = [
        ("Input Ports:", discovery::discover_input_ports()),
        ("Output Ports:", discovery::discover_output_ports()),
    ];
    for (title, ports) in sections {
        println!("\n{}", title.bold());
        match ports {
            Ok(ports) if ports.is_empty() => println!("  {}", "No ports found".dimmed()),
            Ok(ports) => {
                for port in ports {
                    let marker = if port.is_virtual {
                        "[VIRTUAL] ".yellow()
                    } else if port.is_surface() {
                        "[US-2400] ".bright_green()
                    } else {
                        "[PHYSICAL]".green()
                    };
                    println!("  {:>2}: {} {}", port.index, marker, port.name);
                }
            }
            Err(e) => println!("  {} {}", "unavailable:".red(), e),
        }
    }

    if let Some((input, output)) = discovery::find_us2400_ports() {
        println!("\n{}", "Auto-detected US-2400:".bold().bright_green());
        println!("  input_device: {}", input.to_string().bright_white());
        println!("  output_device: {}", output.to_string().bright_white());
    }

    println!();
}
