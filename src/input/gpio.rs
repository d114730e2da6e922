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

//! Raspberry Pi GPIO input lines.
//!
//! The lines are read through `rppal`. Two drivers are provided, both of
//! which only ever post [`AppEvent::Input`] samples to the control loop:
//!
//! * [`spawn_polling_worker`]: a background thread reads every line on a
//!   fixed tick and follows each round of samples with an [`AppEvent::Tick`].
//! * [`GpioLines::attach_interrupts`]: `rppal` edge interrupts post a sample
//!   per transition from its own interrupt thread. Ticks must then come from
//!   elsewhere.

use std::{
    sync::mpsc::Sender,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use rppal::gpio::{Event, Gpio, InputPin, Level, Trigger};

use crate::{config::InputConfig, events::AppEvent, input::InputLine};

/// The claimed input pins. Dropping this releases the pins and any
/// interrupts attached to them.
pub(crate) struct GpioLines {
    pins: Vec<(InputLine, InputPin)>,
    active_low: bool,
}

impl GpioLines {
    /// Claims the configured pins as inputs, pulled towards their inactive
    /// level.
    pub(crate) fn open(config: &InputConfig) -> Result<Self> {
        let gpio = Gpio::new().context("Failed to access GPIO")?;

        let lines = [
            (InputLine::Next, config.next_pin),
            (InputLine::PlayPause, config.play_pause_pin),
            (InputLine::Shutdown, config.shutdown_pin),
        ];

        let mut pins = Vec::with_capacity(lines.len());
        for (line, number) in lines {
            let pin = gpio
                .get(number)
                .with_context(|| format!("Failed to claim GPIO {} for {:?}", number, line))?;
            let pin = if config.active_low {
                pin.into_input_pullup()
            } else {
                pin.into_input_pulldown()
            };
            tracing::info!("GPIO {} claimed for {:?}", number, line);
            pins.push((line, pin));
        }

        Ok(Self {
            pins,
            active_low: config.active_low,
        })
    }

    /// Registers an edge interrupt on every line, after posting the current
    /// level of each.
    pub(crate) fn attach_interrupts(mut self, event_tx: &Sender<AppEvent>) -> Result<Self> {
        let active_low = self.active_low;

        for (line, pin) in &mut self.pins {
            let line = *line;

            event_tx
                .send(AppEvent::Input {
                    line,
                    active: is_active(pin.read(), active_low),
                    at: Instant::now(),
                })
                .context("Failed to send initial input level")?;

            let tx = event_tx.clone();
            pin.set_async_interrupt(Trigger::Both, None, move |event: Event| {
                let level = match event.trigger {
                    Trigger::RisingEdge => Level::High,
                    Trigger::FallingEdge => Level::Low,
                    _ => return,
                };
                let _ = tx.send(AppEvent::Input {
                    line,
                    active: is_active(level, active_low),
                    at: Instant::now(),
                });
            })
            .with_context(|| format!("Failed to attach interrupt for {:?}", line))?;
        }

        Ok(self)
    }
}

/// Spawns a thread that samples every line each `tick`, until the control
/// loop goes away. The pins are released when the thread ends.
pub(crate) fn spawn_polling_worker(
    lines: GpioLines,
    tick: Duration,
    event_tx: Sender<AppEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        loop {
            let now = Instant::now();

            for (line, pin) in &lines.pins {
                let sample = AppEvent::Input {
                    line: *line,
                    active: is_active(pin.read(), lines.active_low),
                    at: now,
                };
                if event_tx.send(sample).is_err() {
                    return;
                }
            }

            if event_tx.send(AppEvent::Tick(now)).is_err() {
                return;
            }

            thread::sleep(tick);
        }
    })
}

fn is_active(level: Level, active_low: bool) -> bool {
    (level == Level::Low) == active_low
}
