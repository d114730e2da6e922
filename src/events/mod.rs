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

//! The control loop.
//!
//! Every input sample, every tick and every notification from the player
//! arrives as an [`AppEvent`] on a single channel. [`process_events`] handles
//! them one at a time, so the button state and the playback decisions are
//! never touched by two threads at once.
//!
//! # Organization
//!
//! * [`Controller`]: Owns the button panel, the arbiter and the collaborators,
//!   and turns each event into intents.
//! * [`handlers`]: Carries out intents against the player, display and host.

mod handlers;

use std::{ops::ControlFlow, sync::mpsc::Receiver, time::Instant};

use anyhow::{Result, bail};

use crate::{
    arbiter::{Arbiter, PlaybackIntent},
    config::AppConfig,
    display::Display,
    host::HostShutdown,
    input::{ButtonPanel, InputAction, InputLine},
    model::playlist::PlaylistState,
    player::MediaPlayer,
};

#[derive(Debug)]
pub(crate) enum AppEvent {
    /// A raw level read from an input line.
    Input {
        line: InputLine,
        active: bool,
        at: Instant,
    },

    Tick(Instant),

    PlaybackFinished,
    PlaybackFailed(String),

    /// Ctrl-C on the console.
    Interrupted,

    FatalError(String),
}

/// How the control loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Termination {
    Exit,
    Shutdown,
}

pub(crate) struct Controller<P, D, H> {
    panel: ButtonPanel,
    arbiter: Arbiter,
    player: P,
    display: D,
    host: H,
}

impl<P: MediaPlayer, D: Display, H: HostShutdown> Controller<P, D, H> {
    pub(crate) fn new(
        config: &AppConfig,
        playlist: PlaylistState,
        player: P,
        display: D,
        host: H,
    ) -> Self {
        Self {
            panel: ButtonPanel::new(&config.input, &config.buttons),
            arbiter: Arbiter::new(
                playlist,
                config.playback.settle_delay(),
                config.buttons.seek_delta_ms,
            ),
            player,
            display,
            host,
        }
    }

    /// Shows and plays the first video of the first channel.
    pub(crate) fn start(&mut self) -> ControlFlow<Termination> {
        let intents = self.arbiter.start();
        self.dispatch(intents)
    }

    /// Handles one event.
    ///
    /// # Errors
    ///
    /// Returns an error only for [`AppEvent::FatalError`], everything else is
    /// handled or logged here.
    pub(crate) fn handle_event(&mut self, event: AppEvent) -> Result<ControlFlow<Termination>> {
        let intents = match event {
            AppEvent::Input { line, active, at } => {
                let actions = self.panel.on_sample(line, active, at);
                self.arbitrate(actions, at)
            }
            AppEvent::Tick(now) => {
                let actions = self.panel.on_tick(now);
                let mut intents = self.arbitrate(actions, now);
                intents.extend(self.arbiter.poll(now));
                intents
            }
            AppEvent::PlaybackFinished => self.arbiter.on_playback_finished(),
            AppEvent::PlaybackFailed(reason) => {
                tracing::warn!("Playback failed: {}", reason);
                self.arbiter.on_playback_failed();
                vec![]
            }
            AppEvent::Interrupted => {
                tracing::info!("Interrupted");
                self.arbiter.on_interrupt()
            }
            AppEvent::FatalError(message) => bail!(message),
        };

        Ok(self.dispatch(intents))
    }

    fn arbitrate(&mut self, actions: Vec<InputAction>, now: Instant) -> Vec<PlaybackIntent> {
        let mut intents = vec![];
        for action in actions {
            tracing::debug!("Input action {:?}", action);
            intents.extend(self.arbiter.on_input(action, now));
        }
        intents
    }

    fn dispatch(&mut self, intents: Vec<PlaybackIntent>) -> ControlFlow<Termination> {
        for intent in intents {
            if let Some(termination) = handlers::handle_intent(self, intent) {
                return ControlFlow::Break(termination);
            }
        }
        ControlFlow::Continue(())
    }
}

/// Runs the control loop until the exit chord, an interrupt, a shutdown
/// request, or a fatal error.
///
/// # Errors
///
/// Returns an error on a fatal worker error, or if every sender has gone away.
pub(crate) fn process_events<P: MediaPlayer, D: Display, H: HostShutdown>(
    controller: &mut Controller<P, D, H>,
    event_rx: &Receiver<AppEvent>,
) -> Result<Termination> {
    if let ControlFlow::Break(termination) = controller.start() {
        return Ok(termination);
    }

    while let Ok(event) = event_rx.recv() {
        if let ControlFlow::Break(termination) = controller.handle_event(event)? {
            return Ok(termination);
        }
    }

    bail!("Event channel closed")
}
