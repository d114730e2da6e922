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

//! Playback decisions.
//!
//! The [`Arbiter`] owns the playlist and decides, for every input action and
//! every end-of-playback notification, what the player and display should do
//! next. It only produces [`PlaybackIntent`]s; carrying them out is left to
//! the controller, which reports failures back.
//!
//! # Manual selections
//!
//! Selecting a video by hand stops the one that is playing, and the player
//! reports that stop like any other end of playback. The arbiter remembers
//! that it caused the stop and absorbs exactly that one notification, so a
//! manual selection is never advanced a second time. A notification that
//! arrives while nothing is playing is ignored.
//!
//! # Settle delay
//!
//! A manual selection is shown first and only played once the settle delay
//! has passed. The delay is a deadline checked by [`Arbiter::poll`], input
//! keeps being handled in the meantime and a newer selection replaces the
//! pending one.

use std::time::{Duration, Instant};

use crate::{
    input::{ButtonId, InputAction, gesture::Gesture},
    model::{Selection, playlist::PlaylistState},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum PlaybackIntent {
    PlayVideo(Selection),
    ShowSelection(Selection),
    StopPlayback,
    TogglePausePlay,
    /// Relative seek in milliseconds.
    SeekRelative(i64),
    Shutdown,
    ExitController,
    NoOp,
}

#[derive(Debug)]
pub(crate) struct Arbiter {
    playlist: PlaylistState,
    settle_delay: Duration,
    seek_delta_ms: i64,
    /// A stop we issued has yet to be reported back.
    manual_selection: bool,
    /// A playback was started and has not been reported as ended or failed.
    playback_active: bool,
    pending_play: Option<Instant>,
    terminated: bool,
}

impl Arbiter {
    pub(crate) fn new(playlist: PlaylistState, settle_delay: Duration, seek_delta_ms: i64) -> Self {
        Self {
            playlist,
            settle_delay,
            seek_delta_ms,
            manual_selection: false,
            playback_active: false,
            pending_play: None,
            terminated: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn playlist(&self) -> &PlaylistState {
        &self.playlist
    }

    #[cfg(test)]
    pub(crate) fn manual_selection_pending(&self) -> bool {
        self.manual_selection
    }

    /// Plays the current selection straight away, used once at startup.
    pub(crate) fn start(&mut self) -> Vec<PlaybackIntent> {
        self.play_now()
    }

    pub(crate) fn on_input(&mut self, action: InputAction, now: Instant) -> Vec<PlaybackIntent> {
        if self.terminated {
            return vec![PlaybackIntent::NoOp];
        }

        match action {
            InputAction::ExitChord => self.terminate(PlaybackIntent::ExitController),
            InputAction::ShutdownRequest => self.terminate(PlaybackIntent::Shutdown),

            InputAction::Gesture(ButtonId::Next, Gesture::ShortPress) => {
                self.select(now, PlaylistState::advance_video)
            }
            InputAction::Gesture(ButtonId::Next, Gesture::LongPress) => {
                self.select(now, PlaylistState::advance_channel)
            }
            InputAction::Gesture(ButtonId::Next, Gesture::HoldRepeat(_)) => {
                vec![PlaybackIntent::NoOp]
            }

            InputAction::Gesture(ButtonId::PlayPause, Gesture::ShortPress) => {
                vec![PlaybackIntent::TogglePausePlay]
            }
            // A long press released before the first repeat still seeks once.
            InputAction::Gesture(ButtonId::PlayPause, Gesture::LongPress)
            | InputAction::Gesture(ButtonId::PlayPause, Gesture::HoldRepeat(_)) => {
                vec![PlaybackIntent::SeekRelative(self.seek_delta_ms)]
            }
        }
    }

    /// The process was asked to stop from outside, handled like the exit chord.
    pub(crate) fn on_interrupt(&mut self) -> Vec<PlaybackIntent> {
        if self.terminated {
            return vec![PlaybackIntent::NoOp];
        }
        self.terminate(PlaybackIntent::ExitController)
    }

    pub(crate) fn on_playback_finished(&mut self) -> Vec<PlaybackIntent> {
        if self.terminated {
            return vec![PlaybackIntent::NoOp];
        }

        if self.manual_selection {
            self.manual_selection = false;
            return vec![PlaybackIntent::NoOp];
        }

        if !self.playback_active {
            tracing::debug!("Ignoring end of playback with nothing playing");
            return vec![PlaybackIntent::NoOp];
        }

        self.playlist.advance_video();
        self.play_now()
    }

    /// The player could not start, or lost, the current playback.
    pub(crate) fn on_playback_failed(&mut self) {
        self.playback_active = false;
    }

    /// Undoes the bookkeeping of an intent the player rejected.
    pub(crate) fn on_dispatch_failed(&mut self, intent: &PlaybackIntent) {
        match intent {
            PlaybackIntent::PlayVideo(_) => self.on_playback_failed(),
            // No stop means no notification to absorb.
            PlaybackIntent::StopPlayback => self.manual_selection = false,
            _ => {}
        }
    }

    /// Starts the pending manual selection once its settle delay is over.
    pub(crate) fn poll(&mut self, now: Instant) -> Vec<PlaybackIntent> {
        match self.pending_play {
            Some(deadline) if !self.terminated && now >= deadline => {
                self.pending_play = None;
                self.playback_active = true;
                vec![PlaybackIntent::PlayVideo(self.playlist.current())]
            }
            _ => vec![],
        }
    }

    fn select(&mut self, now: Instant, advance: fn(&mut PlaylistState)) -> Vec<PlaybackIntent> {
        advance(&mut self.playlist);

        let mut intents = vec![];

        if self.playback_active {
            self.playback_active = false;
            self.manual_selection = true;
            intents.push(PlaybackIntent::StopPlayback);
        }

        let selection = self.playlist.current();
        intents.push(PlaybackIntent::ShowSelection(selection.clone()));

        if self.settle_delay.is_zero() {
            self.pending_play = None;
            self.playback_active = true;
            intents.push(PlaybackIntent::PlayVideo(selection));
        } else {
            self.pending_play = Some(now + self.settle_delay);
        }

        intents
    }

    fn play_now(&mut self) -> Vec<PlaybackIntent> {
        self.playback_active = true;
        let selection = self.playlist.current();
        vec![
            PlaybackIntent::ShowSelection(selection.clone()),
            PlaybackIntent::PlayVideo(selection),
        ]
    }

    fn terminate(&mut self, intent: PlaybackIntent) -> Vec<PlaybackIntent> {
        self.terminated = true;
        self.pending_play = None;
        vec![intent]
    }
}
