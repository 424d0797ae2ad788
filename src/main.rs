mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand, ValueEnum};
use crossterm::{
    event::KeyEventKind,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use deepwork::{
    app_dirs::AppDirs,
    audio::{
        AudioMixer, PlaybackBackend, RodioBackend, SilentBackend, Sound, SoundKind, SoundLibrary,
    },
    config::{Config, ConfigStore, FileConfigStore, Timing},
    history::{HistorySummary, SessionHistory},
    keys::{self, Command},
    length,
    logging,
    runtime::{CrosstermEventSource, FixedTicker, FocusEvent, Runner},
    session::{FocusSession, Transition},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::{Path, PathBuf},
};

/// distraction-free focus timer for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A distraction-free focus timer: pick a length, start, and let the first minute decide whether the session counts. Enter 0 for an open-ended stopwatch."
)]
pub struct Cli {
    /// session length to start with: minutes ("45") or hours:minutes ("1:30"); 0 for a stopwatch
    #[clap(short = 'l', long)]
    length: Option<String>,

    /// run without an audio device (sounds are accepted but not played)
    #[clap(long)]
    no_audio: bool,

    /// verbose logging and debug timing overrides
    #[clap(long)]
    debug: bool,

    /// seconds in a minute (debug only)
    #[clap(long, requires = "debug")]
    debug_minute: Option<u64>,

    /// minimum session length in minutes (debug only)
    #[clap(long, requires = "debug")]
    debug_min_session_len: Option<u64>,

    #[clap(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Commands {
    /// print where deepwork keeps a file or folder, then exit
    Locate {
        #[clap(value_enum)]
        what: Resource,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Resource {
    /// session history database
    Db,
    /// config.json
    Config,
    /// log file
    Log,
    /// alarm and signal sounds
    Shorts,
    /// ambient sounds
    Longs,
}

fn locate(what: Resource, dirs: &AppDirs, store: &FileConfigStore) -> PathBuf {
    match what {
        Resource::Db => dirs.history_db(),
        Resource::Config => store.path().to_path_buf(),
        Resource::Log => dirs.log_file(),
        Resource::Shorts => dirs.shorts_dir(),
        Resource::Longs => dirs.longs_dir(),
    }
}

impl Cli {
    fn timing(&self) -> Timing {
        if self.debug {
            Timing::debug(self.debug_minute, self.debug_min_session_len)
        } else {
            Timing::default()
        }
    }
}

pub type Session = FocusSession<Box<dyn PlaybackBackend>, SessionHistory, FileConfigStore>;

pub struct App {
    pub session: Session,
    pub summary: HistorySummary,
    /// Last thing worth telling the user about.
    pub status: Option<String>,
}

impl App {
    pub fn new(session: Session) -> Self {
        let mut app = Self {
            session,
            summary: HistorySummary::default(),
            status: None,
        };
        app.refresh_summary();
        app
    }

    fn refresh_summary(&mut self) {
        match self.session.recorder().summary() {
            Ok(summary) => self.summary = summary,
            Err(err) => tracing::warn!(%err, "failed to read history summary"),
        }
    }

    fn after(&mut self, transition: Transition) {
        let status = match transition {
            Transition::Started(_) => None,
            Transition::Canceled => Some("Session canceled".to_string()),
            Transition::Completed { minutes } => {
                Some(format!("Session complete: {minutes} min of focus"))
            }
            Transition::Killed { minutes } => Some(format!("Session killed after {minutes} min")),
            _ => return,
        };
        self.status = status;
        if matches!(
            transition,
            Transition::Completed { .. } | Transition::Killed { .. }
        ) {
            self.refresh_summary();
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(Commands::Locate { what }) = &cli.command {
        let dirs = AppDirs::resolve().ok_or("could not determine a state directory")?;
        println!("Path: {}", locate(*what, &dirs, &FileConfigStore::new()).display());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let timing = cli.timing();
    if let Some(raw) = &cli.length {
        if let Err(err) = length::parse(raw, &timing) {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, format!("invalid --length {raw:?}: {err}"))
                .exit();
        }
    }

    let dirs = AppDirs::resolve().ok_or("could not determine a state directory")?;
    dirs.ensure_dirs()?;
    // Without a log file we run unlogged; the terminal belongs to the UI.
    logging::init(&dirs.log_file(), cli.debug).ok();

    let session = build_session(&cli, &dirs, timing)?;
    let mut app = App::new(session);
    if let Some(raw) = &cli.length {
        app.session.set_length_input(raw);
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);
    app.session.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!(%err, "deepwork stopped");
    }
    result
}

fn build_session(cli: &Cli, dirs: &AppDirs, timing: Timing) -> Result<Session, Box<dyn Error>> {
    let store = FileConfigStore::new();
    let config = store.load().sanitized(&timing);
    let library = sound_library(&config, dirs, cli.no_audio)?;

    let backend: Box<dyn PlaybackBackend> = if cli.no_audio {
        Box::new(SilentBackend)
    } else {
        match RodioBackend::try_default() {
            Ok(backend) => Box::new(backend),
            Err(err) => {
                tracing::warn!(%err, "audio unavailable, continuing silently");
                Box::new(SilentBackend)
            }
        }
    };

    let history = SessionHistory::open(&dirs.history_db())?;
    Ok(FocusSession::new(
        AudioMixer::new(backend, library),
        history,
        store,
        timing,
    ))
}

/// Scan the sound folders and check the configured alarm and ambient sounds.
/// Missing ones are an error unless audio is off.
fn sound_library(
    config: &Config,
    dirs: &AppDirs,
    no_audio: bool,
) -> Result<SoundLibrary, Box<dyn Error>> {
    let mut library = SoundLibrary::scan(&dirs.shorts_dir(), &dirs.longs_dir())?;
    let required = [
        (config.alarm.name.as_str(), SoundKind::Short, dirs.shorts_dir()),
        (config.ambient.name.as_str(), SoundKind::Long, dirs.longs_dir()),
    ];
    for (name, kind, dir) in required {
        if library.contains(name) {
            continue;
        }
        if !no_audio {
            return Err(format!(
                "sound {name:?} not found; add it to {} or run with --no-audio",
                dir.display()
            )
            .into());
        }
        library.insert(placeholder(name, kind, &dir));
    }
    Ok(library)
}

/// Library entry for a sound that is never actually opened.
fn placeholder(name: &str, kind: SoundKind, dir: &Path) -> Sound {
    Sound {
        name: name.to_string(),
        path: dir.join(format!("{name}.flac")),
        kind,
        is_default: false,
    }
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    loop {
        terminal.draw(|f| ui(app, f))?;

        match runner.step() {
            FocusEvent::Tick => {
                let transition = app.session.tick()?;
                app.after(transition);
            }
            FocusEvent::Resize => {}
            FocusEvent::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let prompt_open = app.session.state().kill_pending;
                let Some(command) = keys::command_for(&key, prompt_open) else {
                    continue;
                };
                if command == Command::Quit {
                    break;
                }
                if let Some(transition) = keys::apply(&mut app.session, command)? {
                    if matches!(transition, Transition::Started(_)) {
                        runner.restart_ticks();
                    }
                    app.after(transition);
                }
            }
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
