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

//! Text display of the current selection.
//!
//! The device has a small screen attached as the console. Before a video
//! plays, the screen is cleared and the channel and video name are shown on
//! it. Nothing is read back, a failure to draw is only logged.

use std::io::{self, Stdout, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    terminal::{Clear, ClearType},
};

pub(crate) trait Display {
    fn show(&mut self, channel: &str, video: &str);

    fn show_message(&mut self, message: &str);
}

/// Draws on the controlling terminal using `crossterm`.
pub(crate) struct TerminalDisplay {
    out: Stdout,
}

impl TerminalDisplay {
    pub(crate) fn new() -> Self {
        let mut out = io::stdout();
        execute!(out, Hide).ok();
        Self { out }
    }

    fn draw(&mut self, lines: &[String]) {
        if let Err(e) = self.try_draw(lines) {
            tracing::debug!("Failed to draw display: {}", e);
        }
    }

    fn try_draw(&mut self, lines: &[String]) -> io::Result<()> {
        execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        for line in lines {
            writeln!(self.out, "{}", line)?;
        }
        self.out.flush()
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        execute!(self.out, Show).ok();
    }
}

impl Display for TerminalDisplay {
    fn show(&mut self, channel: &str, video: &str) {
        self.draw(&selection_lines(channel, video));
    }

    fn show_message(&mut self, message: &str) {
        self.draw(&message_lines(message));
    }
}

/// Lays out a selection the way it fits the small screen: pushed down from
/// the top edge, channel above video.
fn selection_lines(channel: &str, video: &str) -> Vec<String> {
    let mut lines = vec![String::new(); 3];
    lines.push(format!("  {}", channel));
    lines.push(String::new());
    lines.push(format!("  {}", video));
    lines
}

fn message_lines(message: &str) -> Vec<String> {
    let mut lines = vec![String::new(); 2];
    lines.push(format!("  {}", message));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_shows_channel_then_video() {
        assert_eq!(
            selection_lines("The Simpsons", "S01E01"),
            ["", "", "", "  The Simpsons", "", "  S01E01"]
        );
    }

    #[test]
    fn message_is_indented() {
        assert_eq!(message_lines("Shutting Down..."), ["", "", "  Shutting Down..."]);
    }
}
