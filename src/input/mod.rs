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

//! Physical input handling.
//!
//! This module turns raw digital levels from the two VCR buttons and the
//! shutdown line into [`InputAction`]s for the arbiter.
//!
//! # Organization
//!
//! * [`debounce`]: Contact bounce suppression, shared by every line.
//! * [`gesture`]: Short, long and held presses per button, plus the chord of
//!   both buttons.
//! * [`shutdown`]: Confirmation of the shutdown request line.
//! * [`gpio`]: The Raspberry Pi pins, driven either by polling or by edge
//!   interrupts.
//!
//! [`ButtonPanel`] ties these together. It is fed raw samples and ticks and
//! never waits, every threshold is measured from the timestamps it is given.

pub(crate) mod debounce;
pub(crate) mod gesture;
pub(crate) mod gpio;
pub(crate) mod shutdown;

use std::time::{Duration, Instant};

use crate::{
    config::{ButtonConfig, InputConfig},
    input::{
        debounce::Debouncer,
        gesture::{ChordDetector, Gesture, GestureClassifier, HoldBehaviour},
        shutdown::ShutdownMonitor,
    },
};

/// A physical input line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InputLine {
    Next,
    PlayPause,
    Shutdown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ButtonId {
    Next,
    PlayPause,
}

/// An accepted, debounced level change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LevelChange {
    pub(crate) active: bool,
    pub(crate) at: Instant,
}

/// What the inputs ask of the arbiter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InputAction {
    Gesture(ButtonId, Gesture),
    /// Both buttons held for the exit threshold.
    ExitChord,
    ShutdownRequest,
}

#[derive(Debug)]
struct Button {
    debouncer: Debouncer,
    classifier: GestureClassifier,
    raw: bool,
}

impl Button {
    fn new(debounce: Duration, classifier: GestureClassifier) -> Self {
        Self {
            debouncer: Debouncer::new(debounce),
            classifier,
            raw: false,
        }
    }

    fn sample(&mut self, active: bool, now: Instant) -> Option<Gesture> {
        self.raw = active;
        let change = self.debouncer.sample(active, now)?;
        self.classifier.on_change(change)
    }
}

/// The two VCR buttons and the shutdown line.
#[derive(Debug)]
pub(crate) struct ButtonPanel {
    next: Button,
    play_pause: Button,
    chord: ChordDetector,
    shutdown: ShutdownMonitor,
    shutdown_raw: bool,
}

impl ButtonPanel {
    pub(crate) fn new(input: &InputConfig, buttons: &ButtonConfig) -> Self {
        let ms = Duration::from_millis;

        let next_hold = if buttons.next_long_press_while_held {
            HoldBehaviour::LongPressAtThreshold
        } else {
            HoldBehaviour::ClassifyOnRelease
        };

        let play_pause_hold = HoldBehaviour::Repeat {
            interval: ms(buttons.play_pause_repeat_ms),
        };

        Self {
            next: Button::new(
                input.debounce(),
                GestureClassifier::new(ms(buttons.next_long_press_ms), next_hold),
            ),
            play_pause: Button::new(
                input.debounce(),
                GestureClassifier::new(ms(buttons.play_pause_long_press_ms), play_pause_hold),
            ),
            chord: ChordDetector::new(ms(buttons.exit_hold_ms)),
            shutdown: ShutdownMonitor::new(input.debounce(), ms(buttons.shutdown_confirm_ms)),
            shutdown_raw: false,
        }
    }

    /// Feeds one raw sample, from a polling tick or an edge callback.
    pub(crate) fn on_sample(&mut self, line: InputLine, active: bool, now: Instant) -> Vec<InputAction> {
        let mut actions = vec![];

        match line {
            InputLine::Next => {
                if let Some(gesture) = self.next.sample(active, now) {
                    actions.push(InputAction::Gesture(ButtonId::Next, gesture));
                }
            }
            InputLine::PlayPause => {
                if let Some(gesture) = self.play_pause.sample(active, now) {
                    actions.push(InputAction::Gesture(ButtonId::PlayPause, gesture));
                }
            }
            InputLine::Shutdown => {
                self.shutdown_raw = active;
                self.shutdown.sample(active, now);
            }
        }

        self.check_chord(now, &mut actions);

        actions
    }

    /// Advances the time based thresholds.
    ///
    /// The last raw level of every line is sampled again first, so a change
    /// the debouncer turned away is still seen when no further edge arrives.
    pub(crate) fn on_tick(&mut self, now: Instant) -> Vec<InputAction> {
        let mut actions = vec![];

        self.shutdown.sample(self.shutdown_raw, now);
        if self.shutdown.poll(now) {
            actions.push(InputAction::ShutdownRequest);
        }

        for (id, button) in [
            (ButtonId::Next, &mut self.next),
            (ButtonId::PlayPause, &mut self.play_pause),
        ] {
            if let Some(gesture) = button.sample(button.raw, now) {
                actions.push(InputAction::Gesture(id, gesture));
            }
        }

        self.check_chord(now, &mut actions);

        // A pending chord holds back the hold gestures of either button.
        if self.both_since().is_some() {
            return actions;
        }

        for (id, button) in [
            (ButtonId::Next, &mut self.next),
            (ButtonId::PlayPause, &mut self.play_pause),
        ] {
            if let Some(gesture) = button.classifier.poll(now) {
                actions.push(InputAction::Gesture(id, gesture));
            }
        }

        actions
    }

    /// When the later of the two buttons went down, `None` unless both are down.
    fn both_since(&self) -> Option<Instant> {
        self.next
            .classifier
            .pressed_since()
            .zip(self.play_pause.classifier.pressed_since())
            .map(|(next, play_pause)| next.max(play_pause))
    }

    fn check_chord(&mut self, now: Instant, actions: &mut Vec<InputAction>) {
        if self.chord.update(self.both_since(), now) {
            self.next.classifier.consume();
            self.play_pause.classifier.consume();
            actions.push(InputAction::ExitChord);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(start: Instant, ms: u64) -> Instant {
        start + Duration::from_millis(ms)
    }

    fn panel() -> ButtonPanel {
        ButtonPanel::new(&InputConfig::default(), &ButtonConfig::default())
    }

    /// Polls every line every 10ms, the way the polling worker does.
    fn run(
        panel: &mut ButtonPanel,
        start: Instant,
        from: u64,
        to: u64,
        levels: impl Fn(u64) -> (bool, bool, bool),
    ) -> Vec<(u64, InputAction)> {
        let mut actions = vec![];
        for t in (from..to).step_by(10) {
            let now = at(start, t);
            let (next, play_pause, shutdown) = levels(t);
            let mut step = panel.on_sample(InputLine::Next, next, now);
            step.extend(panel.on_sample(InputLine::PlayPause, play_pause, now));
            step.extend(panel.on_sample(InputLine::Shutdown, shutdown, now));
            step.extend(panel.on_tick(now));
            actions.extend(step.into_iter().map(|a| (t, a)));
        }
        actions
    }

    #[test]
    fn bouncy_tap_is_one_short_press() {
        let start = Instant::now();
        let mut panel = panel();

        let actions = run(&mut panel, start, 0, 1000, |t| {
            let next = match t {
                0..100 => false,
                100..400 => t != 110 && t != 120,
                400..420 => t == 410,
                _ => false,
            };
            (next, false, false)
        });

        assert_eq!(actions, [(400, InputAction::Gesture(ButtonId::Next, Gesture::ShortPress))]);
    }

    #[test]
    fn play_pause_hold_repeats_without_toggle() {
        let start = Instant::now();
        let mut panel = panel();

        let actions = run(&mut panel, start, 0, 4000, |t| (false, (100..2600).contains(&t), false));

        assert_eq!(
            actions,
            [
                (1100, InputAction::Gesture(ButtonId::PlayPause, Gesture::HoldRepeat(1))),
                (2100, InputAction::Gesture(ButtonId::PlayPause, Gesture::HoldRepeat(2))),
            ]
        );
    }

    #[test]
    fn holding_both_buttons_exits_once_and_silences_releases() {
        let start = Instant::now();
        let mut panel = ButtonPanel::new(
            &InputConfig::default(),
            &ButtonConfig::default(),
        );

        let actions = run(&mut panel, start, 0, 9000, |t| {
            ((0..8000).contains(&t), (500..8500).contains(&t), false)
        });

        assert_eq!(actions, [(5500, InputAction::ExitChord)]);
    }

    #[test]
    fn abandoned_chord_resumes_repeats_without_a_burst() {
        let start = Instant::now();
        let mut panel = panel();

        let actions = run(&mut panel, start, 0, 7000, |t| {
            ((0..3000).contains(&t), (0..6000).contains(&t), false)
        });

        assert_eq!(
            actions,
            [
                (3000, InputAction::Gesture(ButtonId::Next, Gesture::LongPress)),
                (3000, InputAction::Gesture(ButtonId::PlayPause, Gesture::HoldRepeat(3))),
                (4000, InputAction::Gesture(ButtonId::PlayPause, Gesture::HoldRepeat(4))),
                (5000, InputAction::Gesture(ButtonId::PlayPause, Gesture::HoldRepeat(5))),
            ]
        );
    }

    #[test]
    fn shutdown_line_fires_once() {
        let start = Instant::now();
        let mut panel = panel();

        let actions = run(&mut panel, start, 0, 2000, |t| (false, false, t >= 100));

        assert_eq!(actions, [(150, InputAction::ShutdownRequest)]);
    }

    #[test]
    fn edge_release_inside_the_window_is_recovered_on_tick() {
        let start = Instant::now();
        let mut panel = panel();

        assert!(panel.on_sample(InputLine::Next, true, start).is_empty());
        assert!(panel.on_sample(InputLine::Next, false, at(start, 20)).is_empty());

        assert_eq!(
            panel.on_tick(at(start, 30)),
            [InputAction::Gesture(ButtonId::Next, Gesture::ShortPress)]
        );
        assert!(panel.on_tick(at(start, 40)).is_empty());
    }
}
