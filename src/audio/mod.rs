//! Sound playback: a two-lane mixer over a swappable playback backend.

pub mod library;
pub mod mixer;
pub mod rodio_backend;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use library::{install_defaults, Sound, SoundKind, SoundLibrary};
pub use mixer::{AudioLane, AudioMixer};
pub use rodio_backend::RodioBackend;

#[derive(Debug, Error)]
pub enum AudioError {
    /// The sound library and the configuration disagree. Never recovered from.
    #[error("sound {0:?} is not in the sound library")]
    SoundNotFound(String),
    #[error("failed to play {path:?}: {reason}")]
    Playback { path: PathBuf, reason: String },
    #[error("no audio output device: {0}")]
    Device(String),
}

/// The two independent playback channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Lane {
    /// One-shot sounds: the completion alarm and previews.
    Notification,
    /// The looping background sound of a running session.
    Ambient,
}

/// Whatever actually makes noise.
pub trait PlaybackBackend {
    /// Start `path` on `lane`, replacing anything the lane was playing.
    fn play(&mut self, lane: Lane, path: &Path, looped: bool) -> Result<(), AudioError>;
    /// Gain in `0.0..=1.0`; applies to the current and any later sound.
    fn set_volume(&mut self, lane: Lane, volume: f32);
    fn stop(&mut self, lane: Lane);
}

impl<P: PlaybackBackend + ?Sized> PlaybackBackend for Box<P> {
    fn play(&mut self, lane: Lane, path: &Path, looped: bool) -> Result<(), AudioError> {
        (**self).play(lane, path, looped)
    }

    fn set_volume(&mut self, lane: Lane, volume: f32) {
        (**self).set_volume(lane, volume)
    }

    fn stop(&mut self, lane: Lane) {
        (**self).stop(lane)
    }
}

/// Accepts everything and plays nothing. Used when no output device exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentBackend;

impl PlaybackBackend for SilentBackend {
    fn play(&mut self, _lane: Lane, _path: &Path, _looped: bool) -> Result<(), AudioError> {
        Ok(())
    }

    fn set_volume(&mut self, _lane: Lane, _volume: f32) {}

    fn stop(&mut self, _lane: Lane) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Play {
        lane: Lane,
        path: PathBuf,
        looped: bool,
    },
    SetVolume {
        lane: Lane,
        volume: f32,
    },
    Stop {
        lane: Lane,
    },
}

/// Backend that only remembers what it was asked to do, for headless runs.
#[derive(Debug, Default, Clone)]
pub struct RecordingBackend {
    pub calls: Vec<BackendCall>,
}

impl RecordingBackend {
    pub fn plays(&self, lane: Lane) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, BackendCall::Play { lane: l, .. } if *l == lane))
            .count()
    }

    pub fn last_call(&self, lane: Lane) -> Option<&BackendCall> {
        self.calls.iter().rev().find(|c| match c {
            BackendCall::Play { lane: l, .. }
            | BackendCall::SetVolume { lane: l, .. }
            | BackendCall::Stop { lane: l } => *l == lane,
        })
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl PlaybackBackend for RecordingBackend {
    fn play(&mut self, lane: Lane, path: &Path, looped: bool) -> Result<(), AudioError> {
        self.calls.push(BackendCall::Play {
            lane,
            path: path.to_path_buf(),
            looped,
        });
        Ok(())
    }

    fn set_volume(&mut self, lane: Lane, volume: f32) {
        self.calls.push(BackendCall::SetVolume { lane, volume });
    }

    fn stop(&mut self, lane: Lane) {
        self.calls.push(BackendCall::Stop { lane });
    }
}
