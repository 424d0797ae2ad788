//! Focus session state machine.
//!
//! ```text
//! Idle -> RunningCancelable -> RunningCommitted -> Concluded -> Idle
//!              |                      |
//!              +--- cancel -> Idle    +--- kill (confirmed) -> Concluded
//! ```
//!
//! The single "act" button means start, cancel, kill or end depending on
//! the phase; [`FocusSession::button`] projects the label from the phase and
//! counters instead of storing it. Ticks are driven from outside through
//! [`FocusSession::tick`], one call per second.

use thiserror::Error;

use crate::audio::{AudioError, AudioMixer, PlaybackBackend};
use crate::clock::{ClockDisplay, ClockFormat, SessionClock, SessionMode, TickHandle, TickSet};
use crate::config::{Config, ConfigStore, Timing};
use crate::history::OutcomeRecorder;
use crate::length::{self, InvalidLength};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Audio(#[from] AudioError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    RunningCancelable,
    RunningCommitted,
    Concluded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub mode: SessionMode,
    /// Timer only; zero for a stopwatch.
    pub target_length_seconds: u64,
    pub cancel_window_remaining: u64,
    pub phase: Phase,
    pub ambient_audible: bool,
    pub kill_pending: bool,
}

impl SessionState {
    fn idle(timing: &Timing) -> Self {
        Self {
            mode: SessionMode::Timer,
            target_length_seconds: 0,
            cancel_window_remaining: timing.cancel_window(),
            phase: Phase::Idle,
            ambient_audible: false,
            kill_pending: false,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.phase,
            Phase::RunningCancelable | Phase::RunningCommitted
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ButtonVariant {
    Start,
    Cancel,
    Committed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    pub label: String,
    pub variant: ButtonVariant,
    pub enabled: bool,
}

/// What a call into the session did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Started(SessionMode),
    Canceled,
    /// The cancel window ran out on this tick.
    Committed,
    /// The UI must ask the user and answer through `confirm_kill`.
    ConfirmKill,
    KillDeclined,
    Completed { minutes: u64 },
    Killed { minutes: u64 },
    Ticked,
    Ignored,
}

pub struct FocusSession<B: PlaybackBackend, R: OutcomeRecorder, C: ConfigStore> {
    mixer: AudioMixer<B>,
    recorder: R,
    store: C,
    config: Config,
    timing: Timing,
    ticks: TickSet,
    clock: SessionClock,
    cancel_window: Option<TickHandle>,
    state: SessionState,
    length_input: String,
    length: Result<u64, InvalidLength>,
    display: ClockDisplay,
}

impl<B: PlaybackBackend, R: OutcomeRecorder, C: ConfigStore> FocusSession<B, R, C> {
    pub fn new(mixer: AudioMixer<B>, recorder: R, store: C, timing: Timing) -> Self {
        let config = store.load().sanitized(&timing);
        let length_input = config.session_length.clone();
        let length = length::parse(&length_input, &timing);
        Self {
            mixer,
            recorder,
            store,
            config,
            timing,
            ticks: TickSet::default(),
            clock: SessionClock::default(),
            cancel_window: None,
            state: SessionState::idle(&timing),
            length_input,
            length,
            display: ClockDisplay::default(),
        }
    }

    // ── Projections ──────────────────────────────────────────────────

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn display(&self) -> &ClockDisplay {
        &self.display
    }

    pub fn clock_format(&self) -> ClockFormat {
        ClockFormat {
            show_hours: self.config.clock_display_hours,
            show_seconds: self.config.clock_display_seconds,
        }
    }

    pub fn input_visible(&self) -> bool {
        self.state.phase == Phase::Idle
    }

    pub fn length_input(&self) -> &str {
        &self.length_input
    }

    pub fn length_error(&self) -> Option<&InvalidLength> {
        self.length.as_ref().err()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn mixer(&self) -> &AudioMixer<B> {
        &self.mixer
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn recorder_mut(&mut self) -> &mut R {
        &mut self.recorder
    }

    pub fn store(&self) -> &C {
        &self.store
    }

    pub fn elapsed_secs(&self) -> u64 {
        match self.state.mode {
            _ if !self.state.is_active() => 0,
            SessionMode::Timer => self
                .state
                .target_length_seconds
                .saturating_sub(self.clock.counter()),
            SessionMode::Stopwatch => self.clock.counter(),
        }
    }

    /// Stopwatch sessions may only end successfully once this is true.
    fn reached_min_length(&self) -> bool {
        self.elapsed_secs() >= self.timing.min_session_secs()
    }

    pub fn button(&self) -> ButtonState {
        match self.state.phase {
            Phase::Idle | Phase::Concluded => ButtonState {
                label: "Start".to_string(),
                variant: ButtonVariant::Start,
                enabled: self.length.is_ok(),
            },
            Phase::RunningCancelable => ButtonState {
                label: format!("Cancel ({})", self.state.cancel_window_remaining),
                variant: ButtonVariant::Cancel,
                enabled: true,
            },
            Phase::RunningCommitted => {
                let label = match self.state.mode {
                    SessionMode::Stopwatch if self.reached_min_length() => "End",
                    _ => "Kill",
                };
                ButtonState {
                    label: label.to_string(),
                    variant: ButtonVariant::Committed,
                    enabled: true,
                }
            }
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// The overloaded act button.
    pub fn act(&mut self) -> Result<Transition, SessionError> {
        match self.state.phase {
            Phase::Idle => match self.length {
                Ok(secs) => self.start(secs),
                Err(_) => Ok(Transition::Ignored),
            },
            Phase::RunningCancelable => {
                self.reset();
                tracing::info!("session canceled");
                Ok(Transition::Canceled)
            }
            Phase::RunningCommitted if self.state.kill_pending => Ok(Transition::Ignored),
            Phase::RunningCommitted => {
                if self.state.mode == SessionMode::Stopwatch && self.reached_min_length() {
                    self.complete()
                } else {
                    self.state.kill_pending = true;
                    Ok(Transition::ConfirmKill)
                }
            }
            Phase::Concluded => Ok(Transition::Ignored),
        }
    }

    /// Answer to the kill prompt opened by [`Transition::ConfirmKill`].
    pub fn confirm_kill(&mut self, should_kill: bool) -> Result<Transition, SessionError> {
        if self.state.phase != Phase::RunningCommitted || !self.state.kill_pending {
            return Ok(Transition::Ignored);
        }
        self.state.kill_pending = false;
        if !should_kill {
            return Ok(Transition::KillDeclined);
        }

        let minutes = self.timing.secs_to_minutes(self.elapsed_secs());
        self.state.phase = Phase::Concluded;
        self.record(minutes, false);
        self.reset();
        tracing::info!(minutes, "session killed");
        Ok(Transition::Killed { minutes })
    }

    /// One second passed.
    pub fn tick(&mut self) -> Result<Transition, SessionError> {
        if self.ticks.is_empty() {
            return Ok(Transition::Ignored);
        }

        let mut transition = Transition::Ticked;

        if let Some(handle) = self.cancel_window.filter(|h| self.ticks.is_live(*h)) {
            self.state.cancel_window_remaining = self.state.cancel_window_remaining.saturating_sub(1);
            if self.state.cancel_window_remaining == 0 {
                self.ticks.stop(handle);
                self.cancel_window = None;
                self.state.phase = Phase::RunningCommitted;
                transition = Transition::Committed;
                tracing::info!("cancel window expired");
            }
        }

        if let Some(tick) = self.clock.tick(&self.ticks) {
            self.display = tick.display;
            tracing::trace!(
                minutes = %self.display.minutes,
                seconds = %self.display.seconds,
                "tick"
            );
            if tick.completed {
                return self.complete();
            }
        }

        Ok(transition)
    }

    /// Back to a fresh idle baseline. Safe to call in any phase, any number of times.
    pub fn reset(&mut self) {
        // Ticks first, so nothing can observe the cleared state.
        self.clock.stop(&mut self.ticks);
        self.ticks.stop_all();
        self.cancel_window = None;

        self.mixer.stop_ambient();
        self.state = SessionState::idle(&self.timing);
        self.display = ClockDisplay::default();
    }

    /// Stop everything before the app exits. Nothing is recorded.
    pub fn shutdown(&mut self) {
        if self.state.is_active() {
            tracing::info!("session abandoned on exit");
        }
        self.reset();
        self.mixer.stop_notification();
    }

    /// Flip ambient audibility. Only meaningful during a session.
    pub fn toggle_ambient(&mut self) -> bool {
        if !self.state.is_active() {
            return false;
        }
        self.state.ambient_audible = !self.state.ambient_audible;
        self.mixer
            .set_ambient_audible(self.state.ambient_audible, self.config.ambient.volume);
        true
    }

    /// Replace the typed length. Valid lengths are persisted.
    pub fn set_length_input(&mut self, raw: &str) -> bool {
        if !self.input_visible() {
            return false;
        }
        self.length_input = raw.to_string();
        self.length = length::parse(raw, &self.timing);
        if self.length.is_ok() {
            self.config.session_length = raw.to_string();
            self.save_config();
        }
        self.length.is_ok()
    }

    /// Switch between `45` and `0:45` style input, converting the current value.
    pub fn toggle_input_mode(&mut self) -> bool {
        if !self.input_visible() {
            return false;
        }
        self.config.input_mode = self.config.input_mode.toggled();
        if let Ok(minutes) = length::parse_minutes(&self.length_input, &self.timing) {
            self.length_input = length::format_minutes(minutes, self.config.input_mode);
            self.config.session_length = self.length_input.clone();
        }
        self.save_config();
        true
    }

    pub fn toggle_clock_hours(&mut self) {
        self.config.clock_display_hours = !self.config.clock_display_hours;
        self.save_config();
    }

    pub fn toggle_clock_seconds(&mut self) {
        self.config.clock_display_seconds = !self.config.clock_display_seconds;
        self.save_config();
    }

    /// Play a sound on the notification lane. Refused during a session.
    pub fn preview_sound(&mut self, sound: &str, volume: u8) -> Result<bool, SessionError> {
        if self.state.is_active() {
            return Ok(false);
        }
        self.mixer.play_notification(sound, volume)?;
        Ok(true)
    }

    pub fn preview_alarm(&mut self) -> Result<bool, SessionError> {
        let name = self.config.alarm.name.clone();
        self.preview_sound(&name, self.config.test_volume)
    }

    pub fn stop_preview(&mut self) {
        if !self.state.is_active() {
            self.mixer.stop_notification();
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    fn start(&mut self, secs: u64) -> Result<Transition, SessionError> {
        let mode = SessionMode::from_length(secs);
        // Audio first: an unknown ambient sound must leave us idle.
        self.mixer.play_ambient_loop(&self.config.ambient.name)?;

        self.state = SessionState {
            mode,
            target_length_seconds: secs,
            cancel_window_remaining: self.timing.cancel_window(),
            phase: Phase::RunningCancelable,
            ambient_audible: false,
            kill_pending: false,
        };
        self.display = ClockDisplay::from_seconds(secs);
        self.cancel_window = Some(self.ticks.start());
        self.clock.start(&mut self.ticks, mode, secs);

        tracing::info!(?mode, secs, "session started");
        Ok(Transition::Started(mode))
    }

    fn complete(&mut self) -> Result<Transition, SessionError> {
        let secs = match self.state.mode {
            SessionMode::Timer => self.state.target_length_seconds,
            SessionMode::Stopwatch => self.elapsed_secs(),
        };
        let minutes = self.timing.secs_to_minutes(secs);
        self.state.phase = Phase::Concluded;
        self.record(minutes, true);
        self.reset();
        tracing::info!(minutes, "session completed");

        let alarm = self.config.alarm.clone();
        self.mixer.play_notification(&alarm.name, alarm.volume)?;
        Ok(Transition::Completed { minutes })
    }

    fn record(&mut self, minutes: u64, succeeded: bool) {
        if let Err(err) = self.recorder.record(minutes, succeeded) {
            tracing::error!(%err, minutes, succeeded, "failed to record session");
        }
    }

    fn save_config(&self) {
        if let Err(err) = self.store.save(&self.config) {
            tracing::warn!(%err, "failed to save config");
        }
    }
}
