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

//! Shutdown request line monitoring.

use std::time::{Duration, Instant};

use crate::input::debounce::Debouncer;

/// Confirms a shutdown request once the debounced line has stayed active for
/// the confirmation window. Fires once, then stays latched until the line
/// goes inactive again.
#[derive(Debug)]
pub(crate) struct ShutdownMonitor {
    debouncer: Debouncer,
    confirm: Duration,
    active_since: Option<Instant>,
    fired: bool,
}

impl ShutdownMonitor {
    pub(crate) fn new(debounce: Duration, confirm: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(debounce),
            confirm,
            active_since: None,
            fired: false,
        }
    }

    pub(crate) fn sample(&mut self, active: bool, now: Instant) {
        if let Some(change) = self.debouncer.sample(active, now) {
            if change.active {
                self.active_since = Some(change.at);
            } else {
                self.active_since = None;
                self.fired = false;
            }
        }
    }

    /// Returns `true` exactly once per confirmed request.
    pub(crate) fn poll(&mut self, now: Instant) -> bool {
        match self.active_since {
            Some(since) if !self.fired && now.saturating_duration_since(since) >= self.confirm => {
                self.fired = true;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(start: Instant, ms: u64) -> Instant {
        start + Duration::from_millis(ms)
    }

    fn monitor() -> ShutdownMonitor {
        ShutdownMonitor::new(Duration::from_millis(30), Duration::from_millis(50))
    }

    #[test]
    fn fires_after_the_confirmation_window() {
        let start = Instant::now();
        let mut monitor = monitor();

        monitor.sample(true, start);
        assert!(!monitor.poll(at(start, 40)));
        assert!(monitor.poll(at(start, 50)));
    }

    #[test]
    fn fires_once_while_held() {
        let start = Instant::now();
        let mut monitor = monitor();

        monitor.sample(true, start);
        let fired = (0..1000)
            .step_by(10)
            .filter(|t| {
                monitor.sample(true, at(start, *t));
                monitor.poll(at(start, *t))
            })
            .count();

        assert_eq!(fired, 1);
    }

    #[test]
    fn short_glitch_does_not_fire() {
        let start = Instant::now();
        let mut monitor = monitor();

        monitor.sample(true, start);
        assert!(!monitor.poll(at(start, 20)));
        monitor.sample(false, at(start, 35));
        assert!(!monitor.poll(at(start, 100)));
    }

    #[test]
    fn bounce_inside_the_window_does_not_reset_the_request() {
        let start = Instant::now();
        let mut monitor = monitor();

        monitor.sample(true, start);
        monitor.sample(false, at(start, 5));
        monitor.sample(true, at(start, 10));
        assert!(monitor.poll(at(start, 50)));
    }
}
