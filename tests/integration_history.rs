use std::path::Path;

use deepwork::audio::{AudioMixer, SilentBackend, Sound, SoundKind, SoundLibrary};
use deepwork::config::{Config, FileConfigStore, Timing};
use deepwork::history::{HistorySummary, SessionHistory};
use deepwork::session::{FocusSession, Transition};

/// End-to-end: sessions driven through the state machine land in SQLite
/// and the config file, across reopen.
#[test]
fn sessions_are_persisted_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("state").join("history.db");
    let config_path = dir.path().join("config").join("config.json");
    let timing = Timing::debug(Some(1), Some(1));

    let mut library = SoundLibrary::default();
    library.insert(Sound::from_path(Path::new("/s/Woohoo.flac"), SoundKind::Short).unwrap());
    library.insert(
        Sound::from_path(Path::new("/s/Woodpecker_Forest.flac"), SoundKind::Long).unwrap(),
    );

    {
        let mut session = FocusSession::new(
            AudioMixer::new(SilentBackend, library.clone()),
            SessionHistory::open(&db_path).unwrap(),
            FileConfigStore::with_path(&config_path),
            timing,
        );
        assert_eq!(session.config(), &Config::default());

        // One completed 3-minute timer
        assert!(session.set_length_input("3"));
        session.act().unwrap();
        let mut last = Transition::Ignored;
        for _ in 0..3 {
            last = session.tick().unwrap();
        }
        assert_eq!(last, Transition::Completed { minutes: 3 });

        // One killed timer after 2 minutes
        assert!(session.set_length_input("10"));
        session.act().unwrap();
        session.tick().unwrap();
        session.tick().unwrap();
        assert_eq!(session.act().unwrap(), Transition::ConfirmKill);
        assert_eq!(
            session.confirm_kill(true).unwrap(),
            Transition::Killed { minutes: 2 }
        );

        // One canceled session leaves no row
        let window = Timing::debug(Some(5), Some(1));
        let mut cancel = FocusSession::new(
            AudioMixer::new(SilentBackend, library),
            SessionHistory::open(&db_path).unwrap(),
            FileConfigStore::with_path(&config_path),
            window,
        );
        cancel.act().unwrap();
        cancel.tick().unwrap();
        assert_eq!(cancel.act().unwrap(), Transition::Canceled);
    }

    let history = SessionHistory::open(&db_path).unwrap();
    assert_eq!(
        history.summary().unwrap(),
        HistorySummary {
            sessions: 2,
            succeeded: 1,
            failed: 1,
            focused_minutes: 5,
        }
    );
    let recent = history.recent(5).unwrap();
    assert_eq!(recent[0].length, 2);
    assert!(!recent[0].done);
    assert_eq!(recent[1].length, 3);
    assert!(recent[1].done);

    // The last valid length typed was persisted
    let saved: Config =
        serde_json::from_slice(&std::fs::read(&config_path).unwrap()).unwrap();
    assert_eq!(saved.session_length, "10");
}
