use directories::ProjectDirs;
use serde::{Deserialize, Deserializer, Serialize};
use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

use crate::length::{self, InputMode};

pub const DEFAULT_SESSION_LEN: &str = "45";
pub const DEFAULT_SOUND_VOLUME: u8 = 50;
pub const MIN_VOLUME_LEVEL: u8 = 1;
pub const MAX_VOLUME_LEVEL: u8 = 100;

pub const DEFAULT_ALARM_NAME: &str = "Woohoo";
pub const DEFAULT_SIGNAL_NAME: &str = "Landing";
pub const DEFAULT_AMBIENT_NAME: &str = "Woodpecker_Forest";

/// Length of a "minute" and the allowed session range.
///
/// Everything that converts minutes to ticks takes this by value, so tests
/// can shrink a minute to a single tick without touching global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub seconds_per_minute: u64,
    pub min_session_len: u64,
    pub max_session_len: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            seconds_per_minute: 60,
            min_session_len: 5,
            max_session_len: 120,
        }
    }
}

impl Timing {
    /// Debug timings: shorter minutes and/or a lower minimum length.
    pub fn debug(seconds_per_minute: Option<u64>, min_session_len: Option<u64>) -> Self {
        let base = Self::default();
        Self {
            seconds_per_minute: seconds_per_minute.unwrap_or(base.seconds_per_minute).max(1),
            min_session_len: min_session_len.unwrap_or(base.min_session_len),
            ..base
        }
    }

    pub fn minutes_to_secs(&self, minutes: u64) -> u64 {
        minutes * self.seconds_per_minute
    }

    pub fn secs_to_minutes(&self, secs: u64) -> u64 {
        secs / self.seconds_per_minute
    }

    /// Number of ticks the cancel window lasts: one configured minute.
    pub fn cancel_window(&self) -> u64 {
        self.seconds_per_minute
    }

    /// Elapsed time a stopwatch session needs before it may end successfully.
    pub fn min_session_secs(&self) -> u64 {
        self.minutes_to_secs(self.min_session_len)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SoundChoice {
    pub name: String,
    #[serde(deserialize_with = "lenient_volume")]
    pub volume: u8,
}

impl SoundChoice {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            volume: DEFAULT_SOUND_VOLUME,
        }
    }
}

impl Default for SoundChoice {
    fn default() -> Self {
        Self::named(DEFAULT_ALARM_NAME)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub alarm: SoundChoice,
    pub signal: SoundChoice,
    pub ambient: SoundChoice,
    pub session_length: String,
    #[serde(deserialize_with = "lenient_volume")]
    pub test_volume: u8,
    pub input_mode: InputMode,
    pub clock_display_hours: bool,
    pub clock_display_seconds: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alarm: SoundChoice::named(DEFAULT_ALARM_NAME),
            signal: SoundChoice::named(DEFAULT_SIGNAL_NAME),
            ambient: SoundChoice::named(DEFAULT_AMBIENT_NAME),
            session_length: DEFAULT_SESSION_LEN.to_string(),
            test_volume: DEFAULT_SOUND_VOLUME,
            input_mode: InputMode::Minute,
            clock_display_hours: false,
            clock_display_seconds: true,
        }
    }
}

fn valid_volume(volume: u8) -> u8 {
    if (MIN_VOLUME_LEVEL..=MAX_VOLUME_LEVEL).contains(&volume) {
        volume
    } else {
        DEFAULT_SOUND_VOLUME
    }
}

/// Accept any JSON value for a volume; anything outside 1..=100 becomes the
/// default so one bad field doesn't discard the rest of the file.
fn lenient_volume<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let volume = value
        .as_i64()
        .and_then(|v| u8::try_from(v).ok())
        .map(valid_volume);
    Ok(volume.unwrap_or_else(|| {
        tracing::warn!(%value, "volume out of range, using default");
        DEFAULT_SOUND_VOLUME
    }))
}

impl Config {
    /// Replace out-of-range values with their defaults.
    pub fn sanitized(mut self, timing: &Timing) -> Self {
        for sound in [&mut self.alarm, &mut self.signal, &mut self.ambient] {
            sound.volume = valid_volume(sound.volume);
        }
        self.test_volume = valid_volume(self.test_volume);
        if length::parse(&self.session_length, timing).is_err() {
            self.session_length = DEFAULT_SESSION_LEN.to_string();
        }
        self
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "deepwork") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("deepwork_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(err) => {
                    tracing::warn!(path = ?self.path, %err, "invalid config file, using defaults")
                }
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

/// Keeps the config in memory; for headless runs and tests.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    cfg: RefCell<Config>,
    saves: Cell<usize>,
}

impl MemoryConfigStore {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg: RefCell::new(cfg),
            saves: Cell::new(0),
        }
    }

    pub fn current(&self) -> Config {
        self.cfg.borrow().clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.get()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Config {
        self.current()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        *self.cfg.borrow_mut() = cfg.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
