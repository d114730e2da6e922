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

use anyhow::Result;

use crate::{
    arbiter::PlaybackIntent,
    display::Display,
    events::{Controller, Termination},
    host::HostShutdown,
    model::Selection,
    player::MediaPlayer,
    util::format::format_position,
};

const SHUTDOWN_MESSAGE: &str = "Shutting Down...";

/// Carries out one intent, returning how the loop ends if it is terminal.
///
/// A player command that fails is logged and handed back to the arbiter, the
/// loop carries on regardless.
pub(super) fn handle_intent<P: MediaPlayer, D: Display, H: HostShutdown>(
    controller: &mut Controller<P, D, H>,
    intent: PlaybackIntent,
) -> Option<Termination> {
    let result = match &intent {
        PlaybackIntent::NoOp => Ok(()),
        PlaybackIntent::ShowSelection(selection) => {
            handle_show_selection(controller, selection);
            Ok(())
        }
        PlaybackIntent::PlayVideo(selection) => handle_play_video(controller, selection),
        PlaybackIntent::StopPlayback => controller.player.stop(),
        PlaybackIntent::TogglePausePlay => controller.player.pause_or_resume(),
        PlaybackIntent::SeekRelative(delta_ms) => handle_seek(controller, *delta_ms),
        PlaybackIntent::ExitController => return Some(handle_exit(controller)),
        PlaybackIntent::Shutdown => return Some(handle_shutdown(controller)),
    };

    if let Err(e) = result {
        tracing::warn!("Failed to carry out {:?}: {:#}", intent, e);
        controller.arbiter.on_dispatch_failed(&intent);
    }

    None
}

fn handle_show_selection<P, D: Display, H>(controller: &mut Controller<P, D, H>, selection: &Selection) {
    controller
        .display
        .show(&selection.channel, &selection.video.name);
}

fn handle_play_video<P: MediaPlayer, D, H>(
    controller: &mut Controller<P, D, H>,
    selection: &Selection,
) -> Result<()> {
    tracing::info!(
        "Playing {} from channel {}",
        selection.video.name,
        selection.channel
    );
    controller.player.load_and_play(&selection.video.path)
}

fn handle_seek<P: MediaPlayer, D, H>(controller: &mut Controller<P, D, H>, delta_ms: i64) -> Result<()> {
    controller.player.seek_relative(delta_ms)?;

    match controller.player.position_ms() {
        Some(position) => tracing::info!(
            "Seeking {}ms from {}",
            delta_ms,
            format_position(position)
        ),
        None => tracing::info!("Seeking {}ms", delta_ms),
    }

    Ok(())
}

fn handle_exit<P: MediaPlayer, D, H>(controller: &mut Controller<P, D, H>) -> Termination {
    tracing::info!("Exit requested");
    stop_quietly(controller);
    Termination::Exit
}

fn handle_shutdown<P: MediaPlayer, D: Display, H: HostShutdown>(
    controller: &mut Controller<P, D, H>,
) -> Termination {
    tracing::info!("Shutdown requested");
    stop_quietly(controller);
    controller.display.show_message(SHUTDOWN_MESSAGE);

    if let Err(e) = controller.host.request_shutdown() {
        tracing::error!("Failed to shut down the host: {:#}", e);
    }

    Termination::Shutdown
}

fn stop_quietly<P: MediaPlayer, D, H>(controller: &mut Controller<P, D, H>) {
    if let Err(e) = controller.player.stop() {
        tracing::warn!("Failed to stop playback: {:#}", e);
    }
}
