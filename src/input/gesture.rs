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

//! Button gesture classification.
//!
//! Turns debounced level changes for one button into discrete gestures. A
//! button is either idle or pressed; everything else is derived from the
//! press start and the current time, so holding a button never blocks the
//! control loop.
//!
//! * [`GestureClassifier`]: short and long presses, plus optional hold
//!   behaviour while the button stays down.
//! * [`ChordDetector`]: both buttons held together for a minimum time.

use std::time::{Duration, Instant};

use crate::input::LevelChange;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Gesture {
    ShortPress,
    LongPress,
    /// The n-th repeat of a held button, counted from 1.
    HoldRepeat(u32),
}

/// What a button does once it has been held past its long press threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HoldBehaviour {
    /// Nothing until release, which then reports [`Gesture::LongPress`].
    ClassifyOnRelease,
    /// Report [`Gesture::LongPress`] at the threshold, release reports nothing.
    LongPressAtThreshold,
    /// Report [`Gesture::HoldRepeat`] at the threshold and every `interval`
    /// after it, release reports nothing once a repeat has fired.
    Repeat { interval: Duration },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PressState {
    Idle,
    Pressed {
        start: Instant,
        /// The press already produced its gesture, release stays silent.
        latched: bool,
        repeats: u32,
        /// Taken over by something else, nothing more is reported.
        consumed: bool,
    },
}

#[derive(Debug)]
pub(crate) struct GestureClassifier {
    long_press: Duration,
    hold: HoldBehaviour,
    state: PressState,
}

impl GestureClassifier {
    pub(crate) fn new(long_press: Duration, hold: HoldBehaviour) -> Self {
        Self {
            long_press,
            hold,
            state: PressState::Idle,
        }
    }

    /// Feeds an accepted level change, returns the gesture completed by a
    /// release.
    pub(crate) fn on_change(&mut self, change: LevelChange) -> Option<Gesture> {
        match (self.state, change.active) {
            (PressState::Idle, true) => {
                self.state = PressState::Pressed {
                    start: change.at,
                    latched: false,
                    repeats: 0,
                    consumed: false,
                };
                None
            }
            (PressState::Pressed { start, latched, consumed, .. }, false) => {
                self.state = PressState::Idle;
                if latched || consumed {
                    return None;
                }

                let held = change.at.saturating_duration_since(start);
                if held < self.long_press {
                    Some(Gesture::ShortPress)
                } else {
                    Some(Gesture::LongPress)
                }
            }
            _ => None,
        }
    }

    /// Checks the hold thresholds of a pressed button, at most one gesture
    /// per call.
    pub(crate) fn poll(&mut self, now: Instant) -> Option<Gesture> {
        let PressState::Pressed {
            start,
            latched,
            repeats,
            consumed,
        } = &mut self.state
        else {
            return None;
        };

        if *consumed {
            return None;
        }

        let held = now.saturating_duration_since(*start);

        match self.hold {
            HoldBehaviour::ClassifyOnRelease => None,
            HoldBehaviour::LongPressAtThreshold => {
                if *latched || held < self.long_press {
                    return None;
                }
                *latched = true;
                Some(Gesture::LongPress)
            }
            HoldBehaviour::Repeat { interval } => {
                let due = self.long_press + interval * *repeats;
                if held < due {
                    return None;
                }
                // Slots missed while polling was held back are skipped.
                let elapsed = (held - self.long_press).as_nanos();
                let slot = elapsed / interval.as_nanos().max(1);
                *latched = true;
                *repeats = u32::try_from(slot + 1).unwrap_or(u32::MAX);
                Some(Gesture::HoldRepeat(*repeats))
            }
        }
    }

    /// When the current press started, `None` while idle.
    pub(crate) fn pressed_since(&self) -> Option<Instant> {
        match self.state {
            PressState::Pressed { start, .. } => Some(start),
            PressState::Idle => None,
        }
    }

    /// Silences the rest of the current press.
    pub(crate) fn consume(&mut self) {
        if let PressState::Pressed { consumed, .. } = &mut self.state {
            *consumed = true;
        }
    }
}

/// Fires once when two buttons have both been held for `threshold`, and not
/// again until one of them has been released.
#[derive(Debug)]
pub(crate) struct ChordDetector {
    threshold: Duration,
    fired: bool,
}

impl ChordDetector {
    pub(crate) fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            fired: false,
        }
    }

    /// `both_since` is the moment the second button went down, or `None`
    /// unless both are down.
    pub(crate) fn update(&mut self, both_since: Option<Instant>, now: Instant) -> bool {
        let Some(since) = both_since else {
            self.fired = false;
            return false;
        };

        if self.fired || now.saturating_duration_since(since) < self.threshold {
            return false;
        }

        self.fired = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(start: Instant, ms: u64) -> Instant {
        start + Duration::from_millis(ms)
    }

    fn press(classifier: &mut GestureClassifier, start: Instant, ms: u64) -> Option<Gesture> {
        classifier.on_change(LevelChange { active: true, at: at(start, ms) })
    }

    fn release(classifier: &mut GestureClassifier, start: Instant, ms: u64) -> Option<Gesture> {
        classifier.on_change(LevelChange { active: false, at: at(start, ms) })
    }

    /// Polls every 10ms from `from` up to and including `to`.
    fn hold(classifier: &mut GestureClassifier, start: Instant, from: u64, to: u64) -> Vec<(u64, Gesture)> {
        (from..=to)
            .step_by(10)
            .filter_map(|t| classifier.poll(at(start, t)).map(|g| (t, g)))
            .collect()
    }

    #[test]
    fn short_and_long_presses_split_at_the_threshold() {
        let start = Instant::now();
        let mut classifier =
            GestureClassifier::new(Duration::from_millis(2000), HoldBehaviour::ClassifyOnRelease);

        assert_eq!(press(&mut classifier, start, 0), None);
        assert_eq!(release(&mut classifier, start, 1999), Some(Gesture::ShortPress));

        press(&mut classifier, start, 3000);
        assert_eq!(release(&mut classifier, start, 5000), Some(Gesture::LongPress));

        press(&mut classifier, start, 6000);
        assert_eq!(release(&mut classifier, start, 9500), Some(Gesture::LongPress));
    }

    #[test]
    fn classify_on_release_is_silent_while_held() {
        let start = Instant::now();
        let mut classifier =
            GestureClassifier::new(Duration::from_millis(2000), HoldBehaviour::ClassifyOnRelease);

        press(&mut classifier, start, 0);
        assert!(hold(&mut classifier, start, 0, 5000).is_empty());
        assert_eq!(classifier.pressed_since(), Some(start));
    }

    #[test]
    fn release_while_idle_is_ignored() {
        let start = Instant::now();
        let mut classifier =
            GestureClassifier::new(Duration::from_millis(1000), HoldBehaviour::ClassifyOnRelease);

        assert_eq!(release(&mut classifier, start, 10), None);
        assert_eq!(classifier.pressed_since(), None);
    }

    #[test]
    fn long_press_at_threshold_fires_once() {
        let start = Instant::now();
        let mut classifier =
            GestureClassifier::new(Duration::from_millis(2000), HoldBehaviour::LongPressAtThreshold);

        press(&mut classifier, start, 0);
        assert_eq!(hold(&mut classifier, start, 0, 4000), [(2000, Gesture::LongPress)]);
        assert_eq!(release(&mut classifier, start, 4010), None);

        press(&mut classifier, start, 5000);
        assert_eq!(release(&mut classifier, start, 5100), Some(Gesture::ShortPress));
    }

    #[test]
    fn repeats_while_held_and_suppresses_release() {
        let start = Instant::now();
        let mut classifier = GestureClassifier::new(
            Duration::from_millis(1000),
            HoldBehaviour::Repeat { interval: Duration::from_millis(1000) },
        );

        press(&mut classifier, start, 0);
        assert_eq!(
            hold(&mut classifier, start, 0, 2500),
            [(1000, Gesture::HoldRepeat(1)), (2000, Gesture::HoldRepeat(2))]
        );
        assert_eq!(release(&mut classifier, start, 2500), None);
    }

    #[test]
    fn late_poll_fires_one_repeat_for_the_missed_slots() {
        let start = Instant::now();
        let mut classifier = GestureClassifier::new(
            Duration::from_millis(1000),
            HoldBehaviour::Repeat { interval: Duration::from_millis(1000) },
        );

        press(&mut classifier, start, 0);
        assert_eq!(classifier.poll(at(start, 3000)), Some(Gesture::HoldRepeat(3)));
        assert!(hold(&mut classifier, start, 3010, 3990).is_empty());
        assert_eq!(classifier.poll(at(start, 4000)), Some(Gesture::HoldRepeat(4)));
    }

    #[test]
    fn repeats_rearm_after_release() {
        let start = Instant::now();
        let mut classifier = GestureClassifier::new(
            Duration::from_millis(1000),
            HoldBehaviour::Repeat { interval: Duration::from_millis(500) },
        );

        press(&mut classifier, start, 0);
        assert_eq!(hold(&mut classifier, start, 0, 1200).len(), 1);
        release(&mut classifier, start, 1200);

        press(&mut classifier, start, 2000);
        assert!(hold(&mut classifier, start, 2000, 2900).is_empty());
        assert_eq!(release(&mut classifier, start, 2900), Some(Gesture::ShortPress));
    }

    #[test]
    fn release_before_the_first_repeat_is_a_long_press() {
        let start = Instant::now();
        let mut classifier = GestureClassifier::new(
            Duration::from_millis(1000),
            HoldBehaviour::Repeat { interval: Duration::from_millis(1000) },
        );

        press(&mut classifier, start, 0);
        assert_eq!(release(&mut classifier, start, 1005), Some(Gesture::LongPress));
    }

    #[test]
    fn consumed_press_releases_silently() {
        let start = Instant::now();
        let mut classifier =
            GestureClassifier::new(Duration::from_millis(2000), HoldBehaviour::ClassifyOnRelease);

        press(&mut classifier, start, 0);
        classifier.consume();
        assert_eq!(release(&mut classifier, start, 100), None);

        let mut repeating = GestureClassifier::new(
            Duration::from_millis(1000),
            HoldBehaviour::Repeat { interval: Duration::from_millis(1000) },
        );
        press(&mut repeating, start, 0);
        repeating.consume();
        assert!(hold(&mut repeating, start, 0, 3000).is_empty());
    }

    #[test]
    fn chord_fires_once_per_hold() {
        let start = Instant::now();
        let mut chord = ChordDetector::new(Duration::from_millis(5000));

        let fired = (0..=8000)
            .step_by(10)
            .filter(|t| chord.update(Some(start), at(start, *t)))
            .count();
        assert_eq!(fired, 1);

        assert!(!chord.update(None, at(start, 8010)));
        assert!(chord.update(Some(at(start, 9000)), at(start, 14000)));
    }

    #[test]
    fn chord_needs_the_full_threshold() {
        let start = Instant::now();
        let mut chord = ChordDetector::new(Duration::from_millis(5000));

        assert!(!chord.update(Some(start), at(start, 4990)));
        assert!(!chord.update(None, at(start, 5000)));
        assert!(!chord.update(Some(at(start, 5010)), at(start, 5020)));
    }
}
