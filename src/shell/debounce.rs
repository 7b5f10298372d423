// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::{Duration, Instant};

/// A re-armable deadline: fires once, `window` after the most recent `arm`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debounce {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self { window, deadline: None }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// (Re)starts the quiet period at `now`, replacing any earlier deadline.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// True exactly once per armed period, on the first call at or after the deadline.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::Debounce;

    const WINDOW: Duration = Duration::from_millis(750);

    #[test]
    fn fires_once_after_the_quiet_period() {
        let start = Instant::now();
        let mut debounce = Debounce::new(WINDOW);
        assert!(!debounce.fire(start + WINDOW));

        debounce.arm(start);
        assert!(!debounce.fire(start + Duration::from_millis(749)));
        assert!(debounce.fire(start + WINDOW));
        assert!(!debounce.fire(start + WINDOW * 2));
    }

    #[test]
    fn rearming_pushes_the_deadline_out() {
        let start = Instant::now();
        let mut debounce = Debounce::new(WINDOW);

        debounce.arm(start);
        debounce.arm(start + Duration::from_millis(500));
        assert!(!debounce.fire(start + WINDOW));
        assert!(debounce.fire(start + Duration::from_millis(1250)));
    }

    #[test]
    fn cancel_disarms() {
        let start = Instant::now();
        let mut debounce = Debounce::new(WINDOW);

        debounce.arm(start);
        debounce.cancel();
        assert!(!debounce.is_armed());
        assert!(!debounce.fire(start + WINDOW * 3));
    }
}
