//! Configuration management for US2400 GW
//!
//! Handles loading, validating and saving the YAML configuration file. The
//! `engine` section (timing and encoder resolution) can be hot-reloaded.

pub mod watcher;

use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::convert::EncoderSteps;

pub use watcher::ConfigWatcher;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct AppConfig {
    #[serde(default)]
    pub midi: MidiConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    /// Host cycle period in milliseconds (one engine tick per cycle)
    #[serde(default = "default_cycle_ms")]
    pub cycle_ms: u64,
    /// Project used by the built-in simulated mixer
    #[serde(default)]
    pub simulation: SimProjectConfig,
}

/// MIDI device selection, the only state persisted between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct MidiConfig {
    /// Input device index as listed by `--list-ports`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_device: Option<usize>,
    /// Output device index as listed by `--list-ports`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_device: Option<usize>,
}

/// Engine timing and resolution constants
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct EngineConfig {
    /// Strips re-rendered per tick
    #[serde(default = "default_refresh_batch")]
    pub refresh_batch: usize,
    /// Ticks spent in the off phase of the blink cycle
    #[serde(default = "default_blink_interval")]
    pub blink_interval: u32,
    /// Ticks spent in the on phase of the blink cycle
    #[serde(default = "default_blink_ratio")]
    pub blink_ratio: u32,
    /// Ticks between joystick polls
    #[serde(default = "default_joystick_interval")]
    pub joystick_interval: u32,
    /// Width of the joystick's centre dead zone (0-127 scale)
    #[serde(default = "default_joystick_dead_zone")]
    pub joystick_dead_zone: u8,
    /// Fader units per encoder tick on volume targets
    #[serde(default = "default_encoder_volume_step")]
    pub encoder_volume_step: f64,
    /// Pan/width change per encoder tick
    #[serde(default = "default_encoder_pan_step")]
    pub encoder_pan_step: f64,
    /// Encoder ticks across an FX parameter's full range
    #[serde(default = "default_encoder_fx_resolution")]
    pub encoder_fx_resolution: f64,
    /// Jog ticks per scrub unit with the function key held
    #[serde(default = "default_scrub_fast")]
    pub scrub_fast: f64,
    #[serde(default = "default_scrub_slow")]
    pub scrub_slow: f64,
    /// Jog ticks per second of edit cursor travel with the function key held
    #[serde(default = "default_cursor_fast")]
    pub cursor_fast: f64,
    #[serde(default = "default_cursor_slow")]
    pub cursor_slow: f64,
    /// Send names containing `{prefix}{slot}` belong to an aux slot
    #[serde(default = "default_aux_send_prefix")]
    pub aux_send_prefix: String,
    /// Upper bound for waiting on the output to drain at shutdown
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
    #[serde(default = "default_shutdown_poll_ms")]
    pub shutdown_poll_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            refresh_batch: default_refresh_batch(),
            blink_interval: default_blink_interval(),
            blink_ratio: default_blink_ratio(),
            joystick_interval: default_joystick_interval(),
            joystick_dead_zone: default_joystick_dead_zone(),
            encoder_volume_step: default_encoder_volume_step(),
            encoder_pan_step: default_encoder_pan_step(),
            encoder_fx_resolution: default_encoder_fx_resolution(),
            scrub_fast: default_scrub_fast(),
            scrub_slow: default_scrub_slow(),
            cursor_fast: default_cursor_fast(),
            cursor_slow: default_cursor_slow(),
            aux_send_prefix: default_aux_send_prefix(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            shutdown_poll_ms: default_shutdown_poll_ms(),
        }
    }
}

impl EngineConfig {
    pub fn encoder_steps(&self) -> EncoderSteps {
        EncoderSteps {
            volume: self.encoder_volume_step,
            pan: self.encoder_pan_step,
            fx_resolution: self.encoder_fx_resolution,
        }
    }

    /// Validate timing and resolution constants
    pub fn validate(&self) -> Result<()> {
        if self.refresh_batch == 0 || self.refresh_batch > 25 {
            anyhow::bail!(
                "engine.refresh_batch must be 1-25 (got {})",
                self.refresh_batch
            );
        }
        if self.blink_interval == 0 {
            anyhow::bail!("engine.blink_interval cannot be 0");
        }
        if self.blink_ratio > self.blink_interval {
            anyhow::bail!(
                "engine.blink_ratio ({}) cannot exceed engine.blink_interval ({})",
                self.blink_ratio,
                self.blink_interval
            );
        }
        if self.joystick_dead_zone > 126 {
            anyhow::bail!(
                "engine.joystick_dead_zone must be 0-126 (got {})",
                self.joystick_dead_zone
            );
        }
        for (name, value) in [
            ("encoder_volume_step", self.encoder_volume_step),
            ("encoder_pan_step", self.encoder_pan_step),
            ("encoder_fx_resolution", self.encoder_fx_resolution),
            ("scrub_fast", self.scrub_fast),
            ("scrub_slow", self.scrub_slow),
            ("cursor_fast", self.cursor_fast),
            ("cursor_slow", self.cursor_slow),
        ] {
            if !(value.is_finite() && value > 0.0) {
                anyhow::bail!("engine.{} must be a positive number (got {})", name, value);
            }
        }
        if self.aux_send_prefix.is_empty() {
            anyhow::bail!("engine.aux_send_prefix cannot be empty");
        }
        if self.shutdown_poll_ms == 0 {
            anyhow::bail!("engine.shutdown_poll_ms cannot be 0");
        }
        if self.shutdown_poll_ms > self.shutdown_timeout_ms {
            anyhow::bail!(
                "engine.shutdown_poll_ms ({}) cannot exceed engine.shutdown_timeout_ms ({})",
                self.shutdown_poll_ms,
                self.shutdown_timeout_ms
            );
        }
        Ok(())
    }
}

/// Simulated project loaded into the built-in mixer
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct SimProjectConfig {
    #[serde(default = "default_track_count")]
    pub track_count: usize,
    #[serde(default = "default_tempo_bpm")]
    pub tempo_bpm: f64,
    #[serde(default = "default_beats_per_bar")]
    pub beats_per_bar: u32,
    #[serde(default = "default_beat_unit")]
    pub beat_unit: u32,
    /// Marker positions in seconds
    #[serde(default)]
    pub markers: Vec<f64>,
    #[serde(default)]
    pub sends: Vec<SimSendConfig>,
    #[serde(default)]
    pub fx: Vec<SimFxConfig>,
    #[serde(default)]
    pub repeat: bool,
}

impl Default for SimProjectConfig {
    fn default() -> Self {
        Self {
            track_count: default_track_count(),
            tempo_bpm: default_tempo_bpm(),
            beats_per_bar: default_beats_per_bar(),
            beat_unit: default_beat_unit(),
            markers: Vec::new(),
            sends: Vec::new(),
            fx: Vec::new(),
            repeat: false,
        }
    }
}

/// A send on a simulated track
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct SimSendConfig {
    /// Zero-based track index
    pub track: usize,
    pub name: String,
}

/// An FX on a simulated track
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct SimFxConfig {
    /// Zero-based track index
    pub track: usize,
    pub name: String,
    #[serde(default = "default_fx_params")]
    pub params: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            midi: MidiConfig::default(),
            engine: EngineConfig::default(),
            cycle_ms: default_cycle_ms(),
            simulation: SimProjectConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is missing
    pub async fn load_or_default(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            info!("Config file {} not found, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path).await
    }

    /// Save configuration to file
    pub async fn save(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create config directory for: {}", path))?;
            }
        }

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if self.cycle_ms == 0 {
            anyhow::bail!("cycle_ms cannot be 0");
        }

        self.engine.validate()?;

        let sim = &self.simulation;
        if sim.tempo_bpm.is_nan() || sim.tempo_bpm <= 0.0 {
            anyhow::bail!("simulation.tempo_bpm must be positive (got {})", sim.tempo_bpm);
        }
        if sim.beats_per_bar == 0 || sim.beat_unit == 0 {
            anyhow::bail!("simulation time signature cannot contain 0");
        }
        for send in &sim.sends {
            if send.track >= sim.track_count {
                anyhow::bail!(
                    "Send '{}' refers to track {} but only {} tracks exist",
                    send.name,
                    send.track,
                    sim.track_count
                );
            }
        }
        for fx in &sim.fx {
            if fx.track >= sim.track_count {
                anyhow::bail!(
                    "FX '{}' refers to track {} but only {} tracks exist",
                    fx.name,
                    fx.track,
                    sim.track_count
                );
            }
        }

        Ok(())
    }

    /// JSON schema of the configuration file
    pub fn json_schema() -> Result<String> {
        let schema = schemars::schema_for!(AppConfig);
        serde_json::to_string_pretty(&schema).context("Failed to serialize config schema")
    }
}

impl MidiConfig {
    /// Parse the compact `"0 0 <in> <out>"` device string
    ///
    /// Parsing stops at the first token that is not a number; missing or
    /// negative device ids mean "no device".
    pub fn from_config_string(s: &str) -> Self {
        let mut parms: [i64; 4] = [0, 0, -1, -1];
        for (slot, token) in s.split_whitespace().take(4).enumerate() {
            match token.parse::<i64>() {
                Ok(value) => parms[slot] = value,
                Err(_) => break,
            }
        }

        let device = |id: i64| usize::try_from(id).ok();
        Self {
            input_device: device(parms[2]),
            output_device: device(parms[3]),
        }
    }

    /// Render the compact device string
    pub fn to_config_string(&self) -> String {
        format!(
            "0 0 {} {}",
            device_id(self.input_device),
            device_id(self.output_device)
        )
    }

    /// Human-readable description, e.g. `Tascam US-2400 (dev 1,2)`
    pub fn description(&self) -> String {
        format!(
            "Tascam US-2400 (dev {},{})",
            device_id(self.input_device),
            device_id(self.output_device)
        )
    }
}

fn device_id(device: Option<usize>) -> i64 {
    device.map(|d| d as i64).unwrap_or(-1)
}

// Default value functions
fn default_cycle_ms() -> u64 { 33 }
fn default_refresh_batch() -> usize { 3 }
fn default_blink_interval() -> u32 { 20 }
fn default_blink_ratio() -> u32 { 1 }
fn default_joystick_interval() -> u32 { 5 }
fn default_joystick_dead_zone() -> u8 { 90 }
fn default_encoder_volume_step() -> f64 { 100.0 }
fn default_encoder_pan_step() -> f64 { 0.01 }
fn default_encoder_fx_resolution() -> f64 { 200.0 }
fn default_scrub_fast() -> f64 { 1.0 }
fn default_scrub_slow() -> f64 { 5.0 }
fn default_cursor_fast() -> f64 { 10.0 }
fn default_cursor_slow() -> f64 { 50.0 }
fn default_aux_send_prefix() -> String { "aux---".to_string() }
fn default_shutdown_timeout_ms() -> u64 { 2000 }
fn default_shutdown_poll_ms() -> u64 { 50 }
fn default_track_count() -> usize { 32 }
fn default_tempo_bpm() -> f64 { 120.0 }
fn default_beats_per_bar() -> u32 { 4 }
fn default_beat_unit() -> u32 { 4 }
fn default_fx_params() -> usize { 8 }
