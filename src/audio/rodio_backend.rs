use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use super::{AudioError, Lane, PlaybackBackend};

fn slot(lane: Lane) -> usize {
    match lane {
        Lane::Notification => 0,
        Lane::Ambient => 1,
    }
}

/// Plays through the default output device, one sink per lane.
///
/// Holds the `OutputStream`, so it must live on the thread that created it.
pub struct RodioBackend {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sinks: [Option<Sink>; 2],
    volumes: [f32; 2],
}

impl std::fmt::Debug for RodioBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioBackend")
            .field("volumes", &self.volumes)
            .finish_non_exhaustive()
    }
}

impl RodioBackend {
    pub fn try_default() -> Result<Self, AudioError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| AudioError::Device(e.to_string()))?;
        Ok(Self {
            _stream: stream,
            handle,
            sinks: [None, None],
            volumes: [1.0, 1.0],
        })
    }
}

fn playback_error(path: &Path, err: impl ToString) -> AudioError {
    AudioError::Playback {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

impl PlaybackBackend for RodioBackend {
    fn play(&mut self, lane: Lane, path: &Path, looped: bool) -> Result<(), AudioError> {
        let i = slot(lane);
        if let Some(old) = self.sinks[i].take() {
            old.stop();
        }

        let file = File::open(path).map_err(|e| playback_error(path, e))?;
        let sink = Sink::try_new(&self.handle).map_err(|e| playback_error(path, e))?;
        sink.set_volume(self.volumes[i]);
        if looped {
            let source =
                Decoder::new_looped(BufReader::new(file)).map_err(|e| playback_error(path, e))?;
            sink.append(source);
        } else {
            let source = Decoder::new(BufReader::new(file)).map_err(|e| playback_error(path, e))?;
            sink.append(source);
        }
        self.sinks[i] = Some(sink);
        Ok(())
    }

    fn set_volume(&mut self, lane: Lane, volume: f32) {
        let i = slot(lane);
        self.volumes[i] = volume;
        if let Some(sink) = &self.sinks[i] {
            sink.set_volume(volume);
        }
    }

    fn stop(&mut self, lane: Lane) {
        if let Some(sink) = self.sinks[slot(lane)].take() {
            sink.stop();
        }
    }
}
