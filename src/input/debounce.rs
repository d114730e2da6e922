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

//! Contact bounce suppression for a single digital line.

use std::time::{Duration, Instant};

use crate::input::LevelChange;

/// Accepts a level change only when it differs from the last accepted level
/// and the debounce window has passed since the last accepted change.
///
/// The same instance can be fed from a polling tick or from edge callbacks,
/// only the cadence of [`Debouncer::sample`] differs.
#[derive(Debug)]
pub(crate) struct Debouncer {
    window: Duration,
    active: bool,
    last_change: Option<Instant>,
}

impl Debouncer {
    /// Creates a debouncer for a line that starts out inactive.
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            window,
            active: false,
            last_change: None,
        }
    }

    pub(crate) fn sample(&mut self, active: bool, now: Instant) -> Option<LevelChange> {
        if active == self.active {
            return None;
        }

        if let Some(last) = self.last_change {
            if now.saturating_duration_since(last) < self.window {
                return None;
            }
        }

        self.active = active;
        self.last_change = Some(now);

        Some(LevelChange { active, at: now })
    }

    #[cfg(test)]
    pub(crate) fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(30);

    fn ms(start: Instant, ms: u64) -> Instant {
        start + Duration::from_millis(ms)
    }

    #[test]
    fn first_change_is_accepted_immediately() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);

        assert_eq!(
            debouncer.sample(true, start),
            Some(LevelChange { active: true, at: start })
        );
        assert!(debouncer.is_active());
    }

    #[test]
    fn repeated_level_is_not_a_change() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);

        assert_eq!(debouncer.sample(false, start), None);
        debouncer.sample(true, ms(start, 100));
        assert_eq!(debouncer.sample(true, ms(start, 200)), None);
    }

    #[test]
    fn chatter_collapses_to_the_first_change() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);

        let events: Vec<LevelChange> = [(true, 0), (false, 3), (true, 7), (false, 12), (true, 29)]
            .into_iter()
            .filter_map(|(level, t)| debouncer.sample(level, ms(start, t)))
            .collect();

        assert_eq!(events, [LevelChange { active: true, at: start }]);
    }

    #[test]
    fn changes_spaced_by_the_window_all_pass() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);

        let events = [(true, 0), (false, 30), (true, 60), (false, 100)]
            .into_iter()
            .filter_map(|(level, t)| debouncer.sample(level, ms(start, t)))
            .count();

        assert_eq!(events, 4);
    }

    #[test]
    fn rejected_release_is_picked_up_by_a_later_sample() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);

        debouncer.sample(true, start);
        assert_eq!(debouncer.sample(false, ms(start, 10)), None);
        assert_eq!(
            debouncer.sample(false, ms(start, 40)),
            Some(LevelChange { active: false, at: ms(start, 40) })
        );
    }
}
