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

//! Host power control.

use std::process::Command;

use anyhow::{Context, Result};

pub(crate) trait HostShutdown {
    /// Asks the host to power off. Irreversible, nothing waits for it.
    fn request_shutdown(&self) -> Result<()>;
}

/// Runs a configured command line, `sudo shutdown -h now` by default.
pub(crate) struct CommandShutdown {
    command: Vec<String>,
}

impl CommandShutdown {
    pub(crate) fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl HostShutdown for CommandShutdown {
    fn request_shutdown(&self) -> Result<()> {
        let (program, args) = self
            .command
            .split_first()
            .context("Shutdown command is empty")?;

        tracing::info!("Running shutdown command: {}", self.command.join(" "));

        Command::new(program)
            .args(args)
            .spawn()
            .with_context(|| format!("Failed to run {}", program))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_the_configured_command() {
        let shutdown = CommandShutdown::new(vec!["true".to_string()]);
        assert!(shutdown.request_shutdown().is_ok());
    }

    #[test]
    fn missing_program_is_an_error() {
        let shutdown = CommandShutdown::new(vec!["/nonexistent/vcrtv-shutdown".to_string()]);
        assert!(shutdown.request_shutdown().is_err());
    }

    #[test]
    fn empty_command_is_an_error() {
        let shutdown = CommandShutdown::new(vec![]);
        assert!(shutdown.request_shutdown().is_err());
    }
}
