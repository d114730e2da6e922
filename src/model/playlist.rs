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

//! Channel and video selection.
//!
//! This module provides the cursor state over the channel list, managing the
//! selected channel and the selected video within it. Both cursors wrap
//! around, so every position reached is always a valid one.

use crate::{
    library::LibraryError,
    model::{Channel, Selection, Video},
};

#[derive(Debug)]
pub(crate) struct PlaylistState {
    channels: Vec<Channel>,
    channel_index: usize,
    video_index: usize,
}

impl PlaylistState {
    pub(crate) fn new(channels: Vec<Channel>) -> Result<Self, LibraryError> {
        if channels.is_empty() {
            return Err(LibraryError::EmptyPlaylist);
        }

        Ok(Self {
            channels,
            channel_index: 0,
            video_index: 0,
        })
    }

    pub(crate) fn current_channel(&self) -> &Channel {
        &self.channels[self.channel_index]
    }

    pub(crate) fn current_video(&self) -> &Video {
        &self.videos()[self.video_index]
    }

    pub(crate) fn current(&self) -> Selection {
        Selection {
            channel: self.current_channel().name.clone(),
            video: self.current_video().clone(),
        }
    }

    /// The videos of the current channel.
    pub(crate) fn videos(&self) -> &[Video] {
        self.current_channel().videos()
    }

    #[cfg(test)]
    pub(crate) fn position(&self) -> (usize, usize) {
        (self.channel_index, self.video_index)
    }

    pub(crate) fn advance_video(&mut self) {
        self.video_index += 1;
        if self.video_index >= self.videos().len() {
            self.advance_channel();
        }
    }

    pub(crate) fn advance_channel(&mut self) {
        self.channel_index = if self.channel_index >= self.channels.len() - 1 {
            0
        } else {
            self.channel_index + 1
        };
        self.video_index = 0;
    }
}
