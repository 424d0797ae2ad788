use super::{AudioError, Lane, PlaybackBackend, SoundLibrary};
use crate::config::{MAX_VOLUME_LEVEL, MIN_VOLUME_LEVEL};

/// Caller-visible state of one lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioLane {
    /// `1..=100`.
    pub volume: u8,
    /// Only the ambient lane is ever muted.
    pub muted: bool,
    pub current: Option<String>,
}

impl AudioLane {
    fn new() -> Self {
        Self {
            volume: MAX_VOLUME_LEVEL,
            muted: false,
            current: None,
        }
    }

    /// Gain actually handed to the backend.
    pub fn gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            f32::from(self.volume) / 100.0
        }
    }
}

fn clamp_volume(volume: u8) -> u8 {
    volume.clamp(MIN_VOLUME_LEVEL, MAX_VOLUME_LEVEL)
}

/// Notification and ambient lanes, each with its own volume and sound.
///
/// Nothing done on one lane changes the other.
#[derive(Debug)]
pub struct AudioMixer<B: PlaybackBackend> {
    backend: B,
    library: SoundLibrary,
    notification: AudioLane,
    ambient: AudioLane,
}

impl<B: PlaybackBackend> AudioMixer<B> {
    pub fn new(backend: B, library: SoundLibrary) -> Self {
        Self {
            backend,
            library,
            notification: AudioLane::new(),
            ambient: AudioLane::new(),
        }
    }

    pub fn lane(&self, lane: Lane) -> &AudioLane {
        match lane {
            Lane::Notification => &self.notification,
            Lane::Ambient => &self.ambient,
        }
    }

    pub fn library(&self) -> &SoundLibrary {
        &self.library
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Play a one-shot sound, cutting off whatever the notification lane had.
    pub fn play_notification(&mut self, sound: &str, volume: u8) -> Result<(), AudioError> {
        let path = self.library.resolve(sound)?.to_path_buf();
        self.notification.volume = clamp_volume(volume);
        self.backend
            .set_volume(Lane::Notification, self.notification.gain());
        self.backend.play(Lane::Notification, &path, false)?;
        self.notification.current = Some(sound.to_string());
        tracing::debug!(sound, volume = self.notification.volume, "notification playing");
        Ok(())
    }

    /// Start the ambient loop muted; audibility is a separate gain switch.
    pub fn play_ambient_loop(&mut self, sound: &str) -> Result<(), AudioError> {
        let path = self.library.resolve(sound)?.to_path_buf();
        self.ambient.muted = true;
        self.backend.set_volume(Lane::Ambient, self.ambient.gain());
        self.backend.play(Lane::Ambient, &path, true)?;
        self.ambient.current = Some(sound.to_string());
        tracing::debug!(sound, "ambient loop started");
        Ok(())
    }

    /// Change ambient gain without restarting playback.
    pub fn set_ambient_audible(&mut self, audible: bool, volume: u8) {
        self.ambient.volume = clamp_volume(volume);
        self.ambient.muted = !audible;
        self.backend.set_volume(Lane::Ambient, self.ambient.gain());
        tracing::debug!(audible, volume = self.ambient.volume, "ambient gain changed");
    }

    pub fn stop_ambient(&mut self) {
        self.backend.stop(Lane::Ambient);
        self.ambient.current = None;
        self.ambient.muted = true;
    }

    pub fn stop_notification(&mut self) {
        self.backend.stop(Lane::Notification);
        self.notification.current = None;
    }
}
