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

//! Video playback control.
//!
//! This module provides the [`MediaPlayer`] interface the controller drives,
//! and [`VideoPlayer`], its MPV implementation. The MPV context lives on a
//! background worker thread so that loading a file never blocks the control
//! loop.
//!
//! Completion is reported back through the application event channel handed
//! to [`VideoPlayer::new`]: one [`AppEvent::PlaybackFinished`] per playback
//! that ends, whether it reached its end or was stopped.

mod commands;

use std::{
    path::Path,
    sync::{Arc, Mutex, mpsc},
};

use anyhow::{Context, Result};

use crate::{config::PlaybackConfig, events::AppEvent, player::commands::VideoPlayerCommand};

/// The commands the controller issues to a playback engine.
///
/// Every command may fail, for example when the engine has gone away. The
/// caller decides what a failure means, none of them are retried here.
pub(crate) trait MediaPlayer {
    /// Replaces whatever is playing with `path` and starts it.
    fn load_and_play(&self, path: &Path) -> Result<()>;

    fn stop(&self) -> Result<()>;

    fn pause_or_resume(&self) -> Result<()>;

    /// Moves the playback position by `delta_ms`, negative rewinds.
    fn seek_relative(&self, delta_ms: i64) -> Result<()>;

    /// The last reported playback position, `None` while nothing plays.
    fn position_ms(&self) -> Option<u64>;
}

/// A handle to the MPV playback engine.
///
/// This struct acts as a command proxy; it does not perform video processing
/// itself but instead sends instructions to a background worker thread.
pub(crate) struct VideoPlayer {
    /// Channel for sending commands to the background worker thread.
    command_tx: mpsc::Sender<VideoPlayerCommand>,
    position: Arc<Mutex<Option<u64>>>,
}

impl VideoPlayer {
    /// Spawns the video worker thread and returns a new player handle.
    ///
    /// # Arguments
    ///
    /// * `config` - Playback options passed on to MPV.
    /// * `event_tx` - A channel to send completion notifications and errors
    ///   back to the control loop.
    pub(crate) fn new(config: &PlaybackConfig, event_tx: mpsc::Sender<AppEvent>) -> Self {
        let (command_tx, command_rx) = mpsc::channel::<VideoPlayerCommand>();
        let position = Arc::new(Mutex::new(None));

        commands::spawn_player_worker(config.clone(), command_rx, event_tx, Arc::clone(&position));

        Self {
            command_tx,
            position,
        }
    }

    fn send(&self, command: VideoPlayerCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .context("Video player worker is not running")
    }
}

impl MediaPlayer for VideoPlayer {
    fn load_and_play(&self, path: &Path) -> Result<()> {
        self.send(VideoPlayerCommand::PlayFile(path.to_path_buf()))
    }

    fn stop(&self) -> Result<()> {
        self.send(VideoPlayerCommand::Stop)
    }

    fn pause_or_resume(&self) -> Result<()> {
        self.send(VideoPlayerCommand::TogglePause)
    }

    fn seek_relative(&self, delta_ms: i64) -> Result<()> {
        self.send(VideoPlayerCommand::Seek(delta_ms))
    }

    fn position_ms(&self) -> Option<u64> {
        self.position.lock().ok().and_then(|position| *position)
    }
}
