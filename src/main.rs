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

//! # VCR TV.
//!
//! A small video appliance: a Raspberry Pi with a screen, two VCR style
//! buttons and a power switch, playing a library of videos grouped into
//! channels.
//!
//! It uses an event-driven architecture where:
//!
//! * The **Main Thread** runs the control loop, deciding what plays next.
//! * **Background Workers** sample the GPIO lines and drive MPV.
//! * **Ticks** advance every time based threshold: long presses, repeats, the
//!   exit chord and the settle delay.
//!
//! ## Architecture
//!
//! All communication with the control loop goes through one
//! `std::sync::mpsc` channel of [`AppEvent`]s, so the loop is the only place
//! that holds button and playback state.

mod arbiter;
mod config;
mod display;
mod events;
mod host;
mod input;
mod library;
mod model;
mod player;
mod util;

use std::{
    env,
    path::PathBuf,
    sync::mpsc::{self, Sender},
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{AppConfig, InputMode},
    display::TerminalDisplay,
    events::{AppEvent, Controller, Termination, process_events},
    host::CommandShutdown,
    input::gpio::{self, GpioLines},
    model::playlist::PlaylistState,
    player::VideoPlayer,
};

/// The entry point of the application.
///
/// The only argument is an optional path to the configuration file. Returns
/// an error if the library cannot be loaded, the GPIO lines cannot be
/// claimed, or a worker fails.
fn main() -> Result<()> {
    init_tracing();

    let config_path = env::args_os().nth(1).map(PathBuf::from);
    let config = config::load_config(config_path.as_deref());
    config.validate().context("Invalid configuration")?;

    let channels = library::load_channels(&config.library).context("Failed to load video library")?;
    let playlist = PlaylistState::new(channels).context("Failed to build playlist")?;

    let termination = run(&config, playlist).context("Application error occurred")?;
    tracing::info!("Stopped: {:?}", termination);

    Ok(())
}

const DEFAULT_LOG_LEVEL: &str = "warn";

/// Logs to stderr, `warn` and above unless `RUST_LOG` says otherwise.
///
/// The console doubles as the display, so routine lines stay off it by
/// default. Raise the level with stderr redirected to follow playback.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Starts the player and the input workers, then enters the control loop.
///
/// Ctrl-C is posted to the loop as [`AppEvent::Interrupted`], so playback is
/// stopped and the pins are released before the process exits.
///
/// # Errors
///
/// Returns an error if the GPIO lines or the Ctrl-C handler cannot be set up,
/// or if the control loop ends on a fatal error.
fn run(config: &AppConfig, playlist: PlaylistState) -> Result<Termination> {
    let (event_tx, event_rx) = mpsc::channel();

    let player = VideoPlayer::new(&config.playback, event_tx.clone());

    let interrupt_tx = event_tx.clone();
    ctrlc::set_handler(move || {
        let _ = interrupt_tx.send(AppEvent::Interrupted);
    })
    .context("Failed to install Ctrl-C handler")?;

    let lines = GpioLines::open(&config.input)?;

    // Interrupt pins stay registered only while the lines are held.
    let (polling_worker, _lines) = match config.input.mode {
        InputMode::Polling => {
            let worker = gpio::spawn_polling_worker(lines, config.input.tick(), event_tx.clone());
            (Some(worker), None)
        }
        InputMode::Interrupt => {
            let lines = lines.attach_interrupts(&event_tx)?;
            spawn_tick_worker(config.input.tick(), event_tx.clone());
            (None, Some(lines))
        }
    };

    drop(event_tx);

    let mut controller = Controller::new(
        config,
        playlist,
        player,
        TerminalDisplay::new(),
        CommandShutdown::new(config.shutdown_command.clone()),
    );

    let termination = process_events(&mut controller, &event_rx);

    // The polling worker ends on its next send and releases the pins.
    drop(event_rx);
    if let Some(worker) = polling_worker {
        if worker.join().is_err() {
            tracing::warn!("GPIO polling worker panicked");
        }
    }

    termination
}

/// Spawns a thread to send a periodic tick, the resolution of every hold and
/// delay threshold when edges arrive by interrupt.
fn spawn_tick_worker(tick: Duration, event_tx: Sender<AppEvent>) {
    thread::spawn(move || {
        while event_tx.send(AppEvent::Tick(Instant::now())).is_ok() {
            thread::sleep(tick);
        }
    });
}
