use directories::ProjectDirs;
use std::io;

use crate::audio::{install_defaults, SoundKind};
use std::path::{Path, PathBuf};

/// Centralized application directory resolution
#[derive(Debug, Clone)]
pub struct AppDirs {
    root: PathBuf,
}

impl AppDirs {
    /// `~/.local/state/deepwork`, or the platform data dir without a `HOME`.
    pub fn resolve() -> Option<Self> {
        if let Ok(home) = std::env::var("HOME") {
            let root = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("deepwork");
            Some(Self { root })
        } else {
            ProjectDirs::from("", "", "deepwork").map(|proj_dirs| Self {
                root: proj_dirs.data_local_dir().to_path_buf(),
            })
        }
    }

    pub fn at<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn history_db(&self) -> PathBuf {
        self.root.join("history.db")
    }

    pub fn log_file(&self) -> PathBuf {
        self.root.join("deepwork.log")
    }

    pub fn shorts_dir(&self) -> PathBuf {
        self.root.join("sounds").join("shorts")
    }

    pub fn longs_dir(&self) -> PathBuf {
        self.root.join("sounds").join("longs")
    }

    /// Create the sound folders. A folder created here gets the bundled
    /// default sounds; existing folders are left as the user arranged them.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        for (dir, kind) in [
            (self.shorts_dir(), SoundKind::Short),
            (self.longs_dir(), SoundKind::Long),
        ] {
            if !dir.exists() {
                std::fs::create_dir_all(&dir)?;
                install_defaults(&dir, kind)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundLibrary;
    use crate::config::{DEFAULT_ALARM_NAME, DEFAULT_AMBIENT_NAME, DEFAULT_SIGNAL_NAME};
    use tempfile::tempdir;

    #[test]
    fn layout_under_root() {
        let dirs = AppDirs::at("/state/deepwork");
        assert_eq!(dirs.history_db(), Path::new("/state/deepwork/history.db"));
        assert_eq!(dirs.log_file(), Path::new("/state/deepwork/deepwork.log"));
        assert_eq!(dirs.shorts_dir(), Path::new("/state/deepwork/sounds/shorts"));
        assert_eq!(dirs.longs_dir(), Path::new("/state/deepwork/sounds/longs"));
    }

    #[test]
    fn ensure_dirs_creates_sound_folders() {
        let tmp = tempdir().unwrap();
        let dirs = AppDirs::at(tmp.path().join("deepwork"));
        dirs.ensure_dirs().unwrap();
        dirs.ensure_dirs().unwrap();
        assert!(dirs.shorts_dir().is_dir());
        assert!(dirs.longs_dir().is_dir());
    }

    #[test]
    fn fresh_dirs_resolve_default_sounds() {
        let tmp = tempdir().unwrap();
        let dirs = AppDirs::at(tmp.path().join("deepwork"));
        dirs.ensure_dirs().unwrap();
        let lib = SoundLibrary::scan(&dirs.shorts_dir(), &dirs.longs_dir()).unwrap();
        assert_eq!(
            lib.resolve(DEFAULT_ALARM_NAME).unwrap(),
            dirs.shorts_dir().join("Woohoo.wav")
        );
        assert!(lib.contains(DEFAULT_SIGNAL_NAME));
        assert_eq!(
            lib.resolve(DEFAULT_AMBIENT_NAME).unwrap(),
            dirs.longs_dir().join("Woodpecker_Forest.wav")
        );
    }

    #[test]
    fn existing_dirs_are_not_refilled() {
        let tmp = tempdir().unwrap();
        let dirs = AppDirs::at(tmp.path().join("deepwork"));
        dirs.ensure_dirs().unwrap();
        std::fs::remove_file(dirs.shorts_dir().join("Braam.wav")).unwrap();
        dirs.ensure_dirs().unwrap();
        assert!(!dirs.shorts_dir().join("Braam.wav").exists());
        assert!(dirs.shorts_dir().join("Woohoo.wav").exists());
    }
}
