// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Application configuration.
//!
//! This module manages the application configuration file. Every section is
//! optional in the file, anything missing falls back to the defaults below.
//! Durations are stored as whole milliseconds.

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONFIG_NAME: &str = "vcrtv";

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    pub library: LibraryConfig,
    pub input: InputConfig,
    pub buttons: ButtonConfig,
    pub playback: PlaybackConfig,
    pub shutdown_command: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            library: LibraryConfig::default(),
            input: InputConfig::default(),
            buttons: ButtonConfig::default(),
            playback: PlaybackConfig::default(),
            shutdown_command: ["sudo", "shutdown", "-h", "now"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Where the channels and videos live.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LibraryConfig {
    pub video_root: String,
    pub video_extension: String,
    /// Explicit channel order, empty means every sub-directory of the root.
    pub channels: Vec<String>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            video_root: "/home/pi/simpsonstv/videos".to_string(),
            video_extension: ".mp4".to_string(),
            channels: vec![],
        }
    }
}

/// How the GPIO lines are driven into the control loop.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Sample every line on a fixed tick.
    Polling,
    /// Edge interrupts for the lines, plus a tick for the time thresholds.
    Interrupt,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub mode: InputMode,
    pub tick_ms: u64,
    pub debounce_ms: u64,
    pub next_pin: u8,
    pub play_pause_pin: u8,
    pub shutdown_pin: u8,
    pub active_low: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            mode: InputMode::Polling,
            tick_ms: 10,
            debounce_ms: 30,
            next_pin: 25,
            play_pause_pin: 26,
            shutdown_pin: 11,
            active_low: true,
        }
    }
}

impl InputConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ButtonConfig {
    pub next_long_press_ms: u64,
    /// Switch channel as soon as the threshold is reached instead of on release.
    pub next_long_press_while_held: bool,
    pub play_pause_long_press_ms: u64,
    pub play_pause_repeat_ms: u64,
    /// Signed, negative rewinds.
    pub seek_delta_ms: i64,
    pub exit_hold_ms: u64,
    pub shutdown_confirm_ms: u64,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            next_long_press_ms: 2000,
            next_long_press_while_held: false,
            play_pause_long_press_ms: 1000,
            play_pause_repeat_ms: 1000,
            seek_delta_ms: -10_000,
            exit_hold_ms: 5000,
            shutdown_confirm_ms: 50,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PlaybackConfig {
    /// How long a manual selection stays on screen before it starts playing.
    pub settle_delay_ms: u64,
    pub fullscreen: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 1500,
            fullscreen: true,
        }
    }
}

impl PlaybackConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("video root must not be empty")]
    MissingVideoRoot,
    #[error("video extension must not be empty")]
    MissingExtension,
    #[error("input tick ({tick_ms}ms) must be non-zero and shorter than the debounce window ({debounce_ms}ms)")]
    TickTooSlow { tick_ms: u64, debounce_ms: u64 },
    #[error("{name} must be greater than zero")]
    ZeroThreshold { name: &'static str },
    #[error("GPIO pins must be distinct, {0} is used twice")]
    DuplicatePin(u8),
    #[error("shutdown command must not be empty")]
    MissingShutdownCommand,
}

impl AppConfig {
    /// Checks the values a file could get wrong, before anything is started.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.library.video_root.trim().is_empty() {
            return Err(ConfigError::MissingVideoRoot);
        }
        if self.library.video_extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::MissingExtension);
        }

        let input = &self.input;
        if input.tick_ms == 0 || input.tick_ms >= input.debounce_ms {
            return Err(ConfigError::TickTooSlow {
                tick_ms: input.tick_ms,
                debounce_ms: input.debounce_ms,
            });
        }

        let pins = [input.next_pin, input.play_pause_pin, input.shutdown_pin];
        for (i, pin) in pins.iter().enumerate() {
            if pins[i + 1..].contains(pin) {
                return Err(ConfigError::DuplicatePin(*pin));
            }
        }

        let buttons = &self.buttons;
        let thresholds = [
            ("next_long_press_ms", buttons.next_long_press_ms),
            ("play_pause_long_press_ms", buttons.play_pause_long_press_ms),
            ("play_pause_repeat_ms", buttons.play_pause_repeat_ms),
            ("exit_hold_ms", buttons.exit_hold_ms),
        ];
        if let Some(&(name, _)) = thresholds.iter().find(|(_, ms)| *ms == 0) {
            return Err(ConfigError::ZeroThreshold { name });
        }

        if self.shutdown_command.is_empty() {
            return Err(ConfigError::MissingShutdownCommand);
        }

        Ok(())
    }
}

/// Loads the configuration, from `path` when given, otherwise from the
/// platform configuration directory.
///
/// A missing file is created with the defaults. An unreadable file falls back
/// to the defaults with a warning.
pub fn load_config(path: Option<&Path>) -> AppConfig {
    let loaded = match path {
        Some(path) => confy::load_path(path),
        None => confy::load(CONFIG_NAME, None),
    };

    loaded.unwrap_or_else(|e| {
        tracing::warn!("Failed to load configuration, using defaults: {}", e);
        AppConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.buttons.next_long_press_ms, 2000);
        assert_eq!(config.buttons.play_pause_long_press_ms, 1000);
        assert_eq!(config.buttons.play_pause_repeat_ms, 1000);
        assert_eq!(config.buttons.exit_hold_ms, 5000);
        assert_eq!(config.playback.settle_delay_ms, 1500);
    }

    #[test]
    fn tick_must_be_shorter_than_debounce() {
        let mut config = AppConfig::default();
        config.input.tick_ms = 30;
        config.input.debounce_ms = 30;
        assert_eq!(
            config.validate(),
            Err(ConfigError::TickTooSlow { tick_ms: 30, debounce_ms: 30 })
        );
    }

    #[test]
    fn rejects_shared_pins() {
        let mut config = AppConfig::default();
        config.input.shutdown_pin = config.input.next_pin;
        assert_eq!(config.validate(), Err(ConfigError::DuplicatePin(25)));
    }

    #[test]
    fn rejects_bare_dot_extension() {
        let mut config = AppConfig::default();
        config.library.video_extension = ".".to_string();
        assert_eq!(config.validate(), Err(ConfigError::MissingExtension));
    }

    #[test]
    fn rejects_zero_thresholds() {
        let mut config = AppConfig::default();
        config.buttons.exit_hold_ms = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroThreshold { name: "exit_hold_ms" })
        );
    }
}
