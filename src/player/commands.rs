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

//! MPV-backed video playback engine and event processing.
//!
//! This module provides the playback worker, leveraging `libmpv` for decoding
//! and output. The worker bridges the application's command-based interface
//! and MPV's property observation and event system.
//!
//! # Architecture
//!
//! The engine operates using a dual-channel communication pattern:
//! 1. **Command Channel**: Receives [`VideoPlayerCommand`]s from the
//!    controller (play, pause, seek, stop).
//! 2. **Event Channel**: Sends [`AppEvent`]s back to the control loop, most
//!    importantly the end of each playback.
//!
//! A failing command is logged and reported, it never stops the worker.

use std::{
    path::PathBuf,
    sync::{
        Arc, Mutex,
        mpsc::{self, Receiver, Sender, TryRecvError},
    },
    thread,
};

use anyhow::{Context, Result};
use mpv::Format;

use crate::{config::PlaybackConfig, events::AppEvent};

#[derive(Debug)]
pub(crate) enum VideoPlayerCommand {
    PlayFile(PathBuf),
    TogglePause,
    /// Relative seek in milliseconds.
    Seek(i64),
    Stop,
}

/// Spawns the video worker thread to process playback commands.
///
/// If the worker cannot start MPV, or loses the event channel, the error is
/// caught here and sent as a fatal application event.
///
/// # Arguments
///
/// * `config` - Playback options.
/// * `command_rx` - The receiving end of the player command channel.
/// * `event_tx` - The channel used to send playback notifications and errors.
/// * `position` - Updated with the playback position as MPV reports it.
pub(crate) fn spawn_player_worker(
    config: PlaybackConfig,
    command_rx: Receiver<VideoPlayerCommand>,
    event_tx: Sender<AppEvent>,
    position: Arc<Mutex<Option<u64>>>,
) {
    let error_tx = event_tx.clone();

    thread::spawn(move || {
        if let Err(e) = video_player_worker(&config, command_rx, event_tx, position) {
            let _ = error_tx.send(AppEvent::FatalError(format!("MPV worker failure: {:?}", e)));
        }
    });
}

/// The primary execution loop for the video player backend.
///
/// This function initializes a local `libmpv` context and alternates between
/// draining incoming commands and waiting briefly for MPV events. It returns
/// once the command channel is closed.
///
/// # Errors
///
/// Returns an error if the MPV context fails to initialize or if the event
/// channel is closed.
fn video_player_worker(
    config: &PlaybackConfig,
    command_rx: Receiver<VideoPlayerCommand>,
    event_tx: Sender<AppEvent>,
    position: Arc<Mutex<Option<u64>>>,
) -> Result<()> {
    let mut handler = (|| {
        let mut builder = mpv::MpvHandlerBuilder::new().context("Failed to create MPV builder")?;
        if config.fullscreen {
            builder
                .set_option("fs", "yes")
                .context("Failed to set fullscreen")?;
        }
        builder
            .set_option("keep-open", "no")
            .context("Failed to disable keep-open")?;
        builder.build().context("Failed to build MPV handler")
    })()?;

    handler
        .observe_property::<f64>("time-pos", 0)
        .context("Failed to observe time-pos")?;
    handler
        .observe_property::<bool>("idle-active", 0)
        .context("Failed to observe idle-active")?;

    tracing::info!("MPV video worker started");

    loop {
        if !process_commands(&mut handler, &command_rx, &event_tx)? {
            tracing::info!("MPV video worker stopping");
            return Ok(());
        }
        process_mpv_events(&mut handler, &position, &event_tx)?;
    }
}

/// Drains and executes all pending commands from the controller.
///
/// Returns `false` once the controller has dropped its player handle.
fn process_commands(
    handler: &mut mpv::MpvHandler,
    command_rx: &mpsc::Receiver<VideoPlayerCommand>,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<bool> {
    loop {
        let command = match command_rx.try_recv() {
            Ok(command) => command,
            Err(TryRecvError::Empty) => return Ok(true),
            Err(TryRecvError::Disconnected) => return Ok(false),
        };

        let is_play = matches!(command, VideoPlayerCommand::PlayFile(_));

        if let Err(e) = execute_command(handler, command) {
            tracing::warn!("MPV command failed: {:#}", e);
            if is_play {
                event_tx
                    .send(AppEvent::PlaybackFailed(format!("{:#}", e)))
                    .context("Failed to send playback failure")?;
            }
        }
    }
}

fn execute_command(handler: &mut mpv::MpvHandler, command: VideoPlayerCommand) -> Result<()> {
    match command {
        VideoPlayerCommand::PlayFile(path) => {
            let filename = path.to_str().context("Path contains invalid UTF-8")?;
            handler
                .command(&["loadfile", filename, "replace"])
                .context(format!("Failed to load file: {}", filename))?;
            handler.set_property("pause", false)?;
        }
        VideoPlayerCommand::TogglePause => {
            handler
                .command(&["cycle", "pause"])
                .context("Failed to toggle pause")?;
        }
        VideoPlayerCommand::Seek(delta_ms) => {
            let seconds = format!("{:.3}", delta_ms as f64 / 1000.0);
            handler
                .command(&["seek", &seconds, "relative"])
                .context(format!("Failed to seek by {}s", seconds))?;
        }
        VideoPlayerCommand::Stop => {
            handler.command(&["stop"]).context("Failed to stop")?;
        }
    }

    Ok(())
}

/// Polls for MPV events and tracks the playback position.
///
/// This function waits for up to 50ms for an event from the MPV context.
/// The end of a file is forwarded to the control loop; property changes only
/// update the shared position.
fn process_mpv_events(
    handler: &mut mpv::MpvHandler,
    position: &Mutex<Option<u64>>,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<()> {
    if let Some(mpv_event) = handler.wait_event(0.05) {
        let app_event = match mpv_event {
            mpv::Event::PropertyChange { name, change, .. } => match (name, change) {
                ("time-pos", Format::Double(seconds)) if seconds >= 0.0 => {
                    set_position(position, Some((seconds * 1000.0) as u64));
                    None
                }
                ("idle-active", Format::Flag(true)) => {
                    set_position(position, None);
                    None
                }
                _ => None,
            },
            mpv::Event::EndFile(result) => match result {
                Ok(mpv::EndFileReason::MPV_END_FILE_REASON_EOF)
                | Ok(mpv::EndFileReason::MPV_END_FILE_REASON_STOP) => {
                    Some(AppEvent::PlaybackFinished)
                }
                Ok(_) => None,
                Err(e) => Some(AppEvent::PlaybackFailed(format!("{:?}", e))),
            },
            _ => None,
        };

        if let Some(event) = app_event {
            event_tx.send(event).context("Failed to send event")?;
        }
    }

    Ok(())
}

fn set_position(position: &Mutex<Option<u64>>, value: Option<u64>) {
    if let Ok(mut position) = position.lock() {
        *position = value;
    }
}
