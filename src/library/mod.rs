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

//! Video library discovery.
//!
//! This module handles the discovery of channels and videos on the local
//! filesystem. A channel is a directory directly below the video root, its
//! videos are the files in that directory with the configured extension.
//!
//! It utilizes `WalkDir` for directory traversal. Everything is read once at
//! startup, an empty channel list or an empty channel is a fatal
//! configuration error.

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::{
    config::LibraryConfig,
    model::{Channel, Video},
};

#[derive(Debug, Error)]
pub(crate) enum LibraryError {
    #[error("failed to read video directory '{}'", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("directory '{}' does not contain any sub-directories to be used as channels", .0.display())]
    NoChannels(PathBuf),
    #[error("channel '{channel}' does not contain any videos")]
    EmptyChannel { channel: String },
    #[error("channel '{channel}' is not a directory in '{}'", root.display())]
    MissingChannel { root: PathBuf, channel: String },
    #[error("no channels to play")]
    EmptyPlaylist,
}

/// Lists the channel directories directly below `root`, sorted by name.
///
/// Hidden directories are skipped.
pub(crate) fn list_channels(root: &Path) -> Result<Vec<String>, LibraryError> {
    let mut channels = vec![];

    for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| LibraryError::Unreadable {
            path: root.to_path_buf(),
            source,
        })?;

        if !entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if !name.starts_with('.') {
            channels.push(name);
        }
    }

    if channels.is_empty() {
        return Err(LibraryError::NoChannels(root.to_path_buf()));
    }

    channels.sort();
    Ok(channels)
}

/// Lists the videos of one channel, sorted by file name.
///
/// The extension is matched case-insensitively, with or without its leading
/// dot, and stripped from the video name.
pub(crate) fn list_videos(
    root: &Path,
    channel: &str,
    extension: &str,
) -> Result<Vec<Video>, LibraryError> {
    let dir = root.join(channel);
    let wanted = extension.trim_start_matches('.');

    if !dir.is_dir() {
        return Err(LibraryError::MissingChannel {
            root: root.to_path_buf(),
            channel: channel.to_string(),
        });
    }

    let mut videos = vec![];

    for entry in WalkDir::new(&dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| LibraryError::Unreadable {
            path: dir.clone(),
            source,
        })?;

        let path = entry.path();
        let matches = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(wanted));
        if !entry.file_type().is_file() || !matches {
            continue;
        }

        let Some(name) = path.file_stem() else {
            continue;
        };

        videos.push(Video {
            name: name.to_string_lossy().to_string(),
            path: path.to_path_buf(),
        });
    }

    if videos.is_empty() {
        return Err(LibraryError::EmptyChannel {
            channel: channel.to_string(),
        });
    }

    Ok(videos)
}

/// Loads every channel named by the configuration, or every channel found
/// below the video root when none are named.
pub(crate) fn load_channels(config: &LibraryConfig) -> Result<Vec<Channel>, LibraryError> {
    let root = Path::new(&config.video_root);

    let names = if config.channels.is_empty() {
        list_channels(root)?
    } else {
        config.channels.clone()
    };

    names
        .into_iter()
        .map(|name| {
            let videos = list_videos(root, &name, &config.video_extension)?;
            tracing::info!("Channel '{}' has {} videos", name, videos.len());
            Channel::new(name, videos)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, sync::atomic::{AtomicUsize, Ordering}};

    static NEXT_ROOT: AtomicUsize = AtomicUsize::new(0);

    /// Builds a throwaway library below the system temp directory.
    fn library(layout: &[(&str, &[&str])]) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "vcrtv-library-{}-{}",
            std::process::id(),
            NEXT_ROOT.fetch_add(1, Ordering::SeqCst)
        ));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();

        for (channel, files) in layout {
            let dir = root.join(channel);
            fs::create_dir_all(&dir).unwrap();
            for file in *files {
                fs::write(dir.join(file), b"").unwrap();
            }
        }

        root
    }

    #[test]
    fn channels_are_sorted_directories() {
        let root = library(&[("Simpsons", &["a.mp4"]), ("Futurama", &["b.mp4"]), (".cache", &[])]);
        fs::write(root.join("notes.txt"), b"").unwrap();

        assert_eq!(list_channels(&root).unwrap(), ["Futurama", "Simpsons"]);
    }

    #[test]
    fn root_without_channels_is_rejected() {
        let root = library(&[]);
        assert!(matches!(list_channels(&root), Err(LibraryError::NoChannels(_))));
    }

    #[test]
    fn missing_root_is_unreadable() {
        let root = std::env::temp_dir().join("vcrtv-library-does-not-exist");
        assert!(matches!(list_channels(&root), Err(LibraryError::Unreadable { .. })));
    }

    #[test]
    fn videos_are_filtered_sorted_and_stripped() {
        let root = library(&[("S01", &["ep02.MP4", "ep01.mp4", "cover.jpg", "ep03.mkv"])]);

        let videos = list_videos(&root, "S01", "mp4").unwrap();
        let names: Vec<&str> = videos.iter().map(|v| v.name.as_str()).collect();

        assert_eq!(names, ["ep01", "ep02"]);
        assert_eq!(videos[0].path, root.join("S01").join("ep01.mp4"));
    }

    #[test]
    fn channel_without_matching_videos_is_rejected() {
        let root = library(&[("S01", &["ep01.mkv"])]);
        assert!(matches!(
            list_videos(&root, "S01", ".mp4"),
            Err(LibraryError::EmptyChannel { channel }) if channel == "S01"
        ));
    }

    #[test]
    fn configured_channels_keep_their_order() {
        let root = library(&[("A", &["a1.mkv"]), ("B", &["b1.mkv", "b2.mkv"])]);
        let config = LibraryConfig {
            video_root: root.to_string_lossy().to_string(),
            video_extension: ".mkv".to_string(),
            channels: vec!["B".to_string(), "A".to_string()],
        };

        let channels = load_channels(&config).unwrap();
        let names: Vec<&str> = channels.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, ["B", "A"]);
        assert_eq!(channels[0].videos().len(), 2);
    }

    #[test]
    fn unknown_configured_channel_is_rejected() {
        let root = library(&[("A", &["a1.mkv"])]);
        let config = LibraryConfig {
            video_root: root.to_string_lossy().to_string(),
            video_extension: "mkv".to_string(),
            channels: vec!["Z".to_string()],
        };

        assert!(matches!(
            load_channels(&config),
            Err(LibraryError::MissingChannel { channel, .. }) if channel == "Z"
        ));
    }
}
