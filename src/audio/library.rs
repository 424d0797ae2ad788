use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use include_dir::{include_dir, Dir};

use super::AudioError;

static DEFAULT_SOUNDS: Dir = include_dir!("$CARGO_MANIFEST_DIR/assets/sounds");

pub const ALLOWED_EXTENSIONS: [&str; 5] = ["wav", "mp3", "ogg", "flac", "opus"];

/// File names shipped with the app; users cannot rename or remove them.
pub const RESERVED_SOUNDS: [&str; 5] = [
    "Braam.wav",
    "Landing.wav",
    "Woohoo.wav",
    "Mexican_Forest.wav",
    "Woodpecker_Forest.wav",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKind {
    /// Alarms and signals.
    Short,
    /// Ambient loops.
    Long,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sound {
    pub name: String,
    pub path: PathBuf,
    pub kind: SoundKind,
    pub is_default: bool,
}

impl Sound {
    /// `None` when the file has no usable stem or an unsupported extension.
    pub fn from_path(path: &Path, kind: SoundKind) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return None;
        }
        let file_name = path.file_name()?.to_str()?;
        // "Woodpecker_Forest.flac" -> "Woodpecker_Forest"
        let name = file_name.split('.').next().filter(|n| !n.is_empty())?;
        Some(Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            kind,
            is_default: RESERVED_SOUNDS.contains(&file_name),
        })
    }
}

impl SoundKind {
    fn bundled(self) -> Option<&'static Dir<'static>> {
        match self {
            SoundKind::Short => DEFAULT_SOUNDS.get_dir("shorts"),
            SoundKind::Long => DEFAULT_SOUNDS.get_dir("longs"),
        }
    }
}

/// Write the bundled sounds of `kind` into `dir`, overwriting same-named files.
/// Returns how many files were written.
pub fn install_defaults(dir: &Path, kind: SoundKind) -> io::Result<usize> {
    let Some(bundled) = kind.bundled() else {
        return Ok(0);
    };
    fs::create_dir_all(dir)?;
    let mut written = 0;
    for file in bundled.files() {
        let Some(file_name) = file.path().file_name() else {
            continue;
        };
        fs::write(dir.join(file_name), file.contents())?;
        written += 1;
    }
    tracing::info!(dir = ?dir, written, "installed default sounds");
    Ok(written)
}

/// Name -> file lookup over the user's sound directories.
#[derive(Debug, Default, Clone)]
pub struct SoundLibrary {
    shorts: BTreeMap<String, Sound>,
    longs: BTreeMap<String, Sound>,
}

fn scan_dir(dir: &Path, kind: SoundKind) -> io::Result<BTreeMap<String, Sound>> {
    let mut sounds = BTreeMap::new();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(sounds),
        Err(err) => return Err(err),
    };
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(sound) = Sound::from_path(&path, kind) {
            sounds.insert(sound.name.clone(), sound);
        }
    }
    Ok(sounds)
}

impl SoundLibrary {
    /// Scan both directories. A missing directory is an empty one.
    pub fn scan(shorts_dir: &Path, longs_dir: &Path) -> io::Result<Self> {
        let library = Self {
            shorts: scan_dir(shorts_dir, SoundKind::Short)?,
            longs: scan_dir(longs_dir, SoundKind::Long)?,
        };
        tracing::debug!(
            shorts = library.shorts.len(),
            longs = library.longs.len(),
            "sound library scanned"
        );
        Ok(library)
    }

    pub fn insert(&mut self, sound: Sound) {
        let map = match sound.kind {
            SoundKind::Short => &mut self.shorts,
            SoundKind::Long => &mut self.longs,
        };
        map.insert(sound.name.clone(), sound);
    }

    /// Shorts shadow longs with the same name.
    pub fn get(&self, name: &str) -> Option<&Sound> {
        self.shorts.get(name).or_else(|| self.longs.get(name))
    }

    pub fn resolve(&self, name: &str) -> Result<&Path, AudioError> {
        self.get(name)
            .map(|s| s.path.as_path())
            .ok_or_else(|| AudioError::SoundNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn all_shorts(&self) -> Vec<&str> {
        self.shorts.keys().map(String::as_str).collect()
    }

    pub fn all_longs(&self) -> Vec<&str> {
        self.longs.keys().map(String::as_str).collect()
    }

    pub fn user_shorts(&self) -> Vec<&str> {
        user_names(&self.shorts)
    }

    pub fn user_longs(&self) -> Vec<&str> {
        user_names(&self.longs)
    }

    pub fn is_empty(&self) -> bool {
        self.shorts.is_empty() && self.longs.is_empty()
    }
}

fn user_names(map: &BTreeMap<String, Sound>) -> Vec<&str> {
    map.values()
        .filter(|s| !s.is_default)
        .map(|s| s.name.as_str())
        .collect()
}
