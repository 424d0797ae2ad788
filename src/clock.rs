//! One-second session clock.
//!
//! Ticks are not produced here: the runtime delivers them and whoever owns a
//! live [`TickHandle`] reacts. Stopping a handle makes every later tick for
//! it a no-op, which is how a reset guarantees nothing fires afterwards.

use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Fixed countdown.
    Timer,
    /// Open-ended count-up.
    Stopwatch,
}

impl SessionMode {
    /// A parsed length of zero asks for a stopwatch.
    pub fn from_length(secs: u64) -> Self {
        if secs == 0 {
            SessionMode::Stopwatch
        } else {
            SessionMode::Timer
        }
    }
}

/// Identifies one repeating one-second task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TickHandle(u64);

/// Arena of repeating tasks. Ids are never reused.
#[derive(Debug, Default)]
pub struct TickSet {
    next: u64,
    live: BTreeSet<TickHandle>,
}

impl TickSet {
    pub fn start(&mut self) -> TickHandle {
        let handle = TickHandle(self.next);
        self.next += 1;
        self.live.insert(handle);
        handle
    }

    pub fn is_live(&self, handle: TickHandle) -> bool {
        self.live.contains(&handle)
    }

    /// Returns whether the handle was still live.
    pub fn stop(&mut self, handle: TickHandle) -> bool {
        self.live.remove(&handle)
    }

    pub fn stop_all(&mut self) {
        self.live.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

/// Minutes and seconds strings ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockDisplay {
    pub minutes: String,
    pub seconds: String,
}

/// Which parts of the clock the user wants to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockFormat {
    pub show_hours: bool,
    pub show_seconds: bool,
}

impl Default for ClockFormat {
    fn default() -> Self {
        Self {
            show_hours: false,
            show_seconds: true,
        }
    }
}

impl Default for ClockDisplay {
    fn default() -> Self {
        Self::from_seconds(0)
    }
}

impl ClockDisplay {
    /// Minutes have no padding and no width cap; seconds are always two digits.
    pub fn from_seconds(total: u64) -> Self {
        let (minutes, seconds) = (total / 60, total % 60);
        Self {
            minutes: minutes.to_string(),
            seconds: format!("{seconds:02}"),
        }
    }

    pub fn render(&self, format: ClockFormat) -> String {
        let minutes = if format.show_hours {
            let total: u64 = self.minutes.parse().unwrap_or(0);
            format!("{}:{:02}", total / 60, total % 60)
        } else {
            self.minutes.clone()
        };
        if format.show_seconds {
            format!("{minutes}:{}", self.seconds)
        } else {
            minutes
        }
    }
}

/// Result of one clock tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockTick {
    pub display: ClockDisplay,
    /// Timer mode only: the countdown reached zero on this tick.
    pub completed: bool,
}

#[derive(Debug)]
pub struct SessionClock {
    mode: SessionMode,
    counter: u64,
    handle: Option<TickHandle>,
}

impl Default for SessionClock {
    fn default() -> Self {
        Self {
            mode: SessionMode::Timer,
            counter: 0,
            handle: None,
        }
    }
}

impl SessionClock {
    /// Start counting; `initial_seconds` is the countdown for a timer and
    /// the starting elapsed time for a stopwatch.
    pub fn start(&mut self, ticks: &mut TickSet, mode: SessionMode, initial_seconds: u64) -> TickHandle {
        if let Some(old) = self.handle.take() {
            ticks.stop(old);
        }
        let handle = ticks.start();
        self.mode = mode;
        self.counter = initial_seconds;
        self.handle = Some(handle);
        handle
    }

    pub fn tick(&mut self, ticks: &TickSet) -> Option<ClockTick> {
        let handle = self.handle?;
        if !ticks.is_live(handle) {
            return None;
        }
        let completed = match self.mode {
            SessionMode::Timer => {
                self.counter = self.counter.saturating_sub(1);
                self.counter == 0
            }
            SessionMode::Stopwatch => {
                self.counter += 1;
                false
            }
        };
        Some(ClockTick {
            display: ClockDisplay::from_seconds(self.counter),
            completed,
        })
    }

    pub fn stop(&mut self, ticks: &mut TickSet) {
        if let Some(handle) = self.handle.take() {
            ticks.stop(handle);
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn is_running(&self, ticks: &TickSet) -> bool {
        self.handle.is_some_and(|h| ticks.is_live(h))
    }

    /// Remaining seconds (timer) or elapsed seconds (stopwatch).
    pub fn counter(&self) -> u64 {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formatting() {
        let d = ClockDisplay::from_seconds(605);
        assert_eq!((d.minutes.as_str(), d.seconds.as_str()), ("10", "05"));
        let d = ClockDisplay::from_seconds(45);
        assert_eq!((d.minutes.as_str(), d.seconds.as_str()), ("0", "45"));
        let d = ClockDisplay::from_seconds(100 * 60 + 7);
        assert_eq!((d.minutes.as_str(), d.seconds.as_str()), ("100", "07"));
        assert_eq!(ClockDisplay::default().render(ClockFormat::default()), "0:00");
    }

    #[test]
    fn render_honors_format() {
        let d = ClockDisplay::from_seconds(75 * 60 + 9);
        assert_eq!(d.render(ClockFormat::default()), "75:09");
        let hours = ClockFormat {
            show_hours: true,
            show_seconds: true,
        };
        assert_eq!(d.render(hours), "1:15:09");
        let bare = ClockFormat {
            show_hours: false,
            show_seconds: false,
        };
        assert_eq!(d.render(bare), "75");
    }

    #[test]
    fn timer_counts_down_and_signals_completion() {
        let mut ticks = TickSet::default();
        let mut clock = SessionClock::default();
        clock.start(&mut ticks, SessionMode::Timer, 3);

        let t1 = clock.tick(&ticks).unwrap();
        assert_eq!(t1.display.seconds, "02");
        assert!(!t1.completed);
        assert!(!clock.tick(&ticks).unwrap().completed);
        let last = clock.tick(&ticks).unwrap();
        assert!(last.completed);
        assert_eq!(last.display, ClockDisplay::from_seconds(0));
        // still running until the caller stops it
        assert!(clock.is_running(&ticks));
    }

    #[test]
    fn stopwatch_counts_up() {
        let mut ticks = TickSet::default();
        let mut clock = SessionClock::default();
        clock.start(&mut ticks, SessionMode::Stopwatch, 0);
        for _ in 0..61 {
            assert!(!clock.tick(&ticks).unwrap().completed);
        }
        assert_eq!(clock.counter(), 61);
        assert_eq!(clock.tick(&ticks).unwrap().display.render(ClockFormat::default()), "1:02");
    }

    #[test]
    fn stop_is_idempotent_and_silences_ticks() {
        let mut ticks = TickSet::default();
        let mut clock = SessionClock::default();
        let handle = clock.start(&mut ticks, SessionMode::Stopwatch, 0);
        clock.stop(&mut ticks);
        clock.stop(&mut ticks);
        assert!(!ticks.stop(handle));
        assert!(clock.tick(&ticks).is_none());
        assert!(ticks.is_empty());
    }

    #[test]
    fn restart_retires_previous_handle() {
        let mut ticks = TickSet::default();
        let mut clock = SessionClock::default();
        let first = clock.start(&mut ticks, SessionMode::Timer, 10);
        let second = clock.start(&mut ticks, SessionMode::Stopwatch, 0);
        assert_ne!(first, second);
        assert!(!ticks.is_live(first));
        assert!(ticks.is_live(second));
    }

    #[test]
    fn mode_from_length() {
        assert_eq!(SessionMode::from_length(0), SessionMode::Stopwatch);
        assert_eq!(SessionMode::from_length(300), SessionMode::Timer);
    }
}
