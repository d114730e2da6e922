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

//! Domain models and core data structures.
//!
//! This module defines the central entities of the application, channels and
//! the videos within them, along with the [`playlist::PlaylistState`] that
//! tracks what is currently selected.

pub(crate) mod playlist;

use std::path::PathBuf;

use crate::library::LibraryError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Video {
    /// File name with the extension stripped.
    pub(crate) name: String,
    pub(crate) path: PathBuf,
}

#[derive(Debug, Clone)]
pub(crate) struct Channel {
    pub(crate) name: String,
    videos: Vec<Video>,
}

impl Channel {
    /// Creates a channel, rejecting one without any videos.
    pub(crate) fn new(name: impl Into<String>, videos: Vec<Video>) -> Result<Self, LibraryError> {
        let name = name.into();
        if videos.is_empty() {
            return Err(LibraryError::EmptyChannel { channel: name });
        }
        Ok(Self { name, videos })
    }

    pub(crate) fn videos(&self) -> &[Video] {
        &self.videos
    }
}

/// A channel and video pair, as handed to the player and the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Selection {
    pub(crate) channel: String,
    pub(crate) video: Video,
}

#[cfg(test)]
pub(crate) fn video(name: &str) -> Video {
    Video {
        name: name.to_string(),
        path: PathBuf::from(format!("/videos/{}.mp4", name)),
    }
}
