//! Key bindings and the commands they map to.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::audio::PlaybackBackend;
use crate::config::ConfigStore;
use crate::history::OutcomeRecorder;
use crate::session::{FocusSession, SessionError, Transition};

/// Longest length input accepted from the keyboard ("1:45", "120").
pub const MAX_LENGTH_INPUT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Act,
    ConfirmKill(bool),
    ToggleAmbient,
    ToggleInputMode,
    ToggleClockHours,
    ToggleClockSeconds,
    PreviewAlarm,
    StopPreview,
    EditLength(char),
    DeleteLengthChar,
    Quit,
}

/// While the kill prompt is open only its answers (and Ctrl+C) do anything.
pub fn command_for(key: &KeyEvent, prompt_open: bool) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Command::Quit),
            _ => None,
        };
    }

    if prompt_open {
        return match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(Command::ConfirmKill(true)),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                Some(Command::ConfirmKill(false))
            }
            _ => None,
        };
    }

    let command = match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => Command::Act,
        KeyCode::Esc | KeyCode::Char('q') => Command::Quit,
        KeyCode::Backspace => Command::DeleteLengthChar,
        KeyCode::Char('a') => Command::ToggleAmbient,
        KeyCode::Char('t') => Command::ToggleInputMode,
        KeyCode::Char('h') => Command::ToggleClockHours,
        KeyCode::Char('s') => Command::ToggleClockSeconds,
        KeyCode::Char('p') => Command::PreviewAlarm,
        KeyCode::Char('x') => Command::StopPreview,
        KeyCode::Char(c) if c.is_ascii_digit() || c == ':' => Command::EditLength(c),
        _ => return None,
    };
    Some(command)
}

/// Run `command` against the session. `Some` carries the state machine's
/// answer for commands that go through it.
pub fn apply<B, R, C>(
    session: &mut FocusSession<B, R, C>,
    command: Command,
) -> Result<Option<Transition>, SessionError>
where
    B: PlaybackBackend,
    R: OutcomeRecorder,
    C: ConfigStore,
{
    match command {
        Command::Act => return session.act().map(Some),
        Command::ConfirmKill(answer) => return session.confirm_kill(answer).map(Some),
        Command::ToggleAmbient => {
            session.toggle_ambient();
        }
        Command::ToggleInputMode => {
            session.toggle_input_mode();
        }
        Command::ToggleClockHours => session.toggle_clock_hours(),
        Command::ToggleClockSeconds => session.toggle_clock_seconds(),
        Command::PreviewAlarm => {
            session.preview_alarm()?;
        }
        Command::StopPreview => session.stop_preview(),
        Command::EditLength(c) => {
            let mut input = session.length_input().to_string();
            if input.len() < MAX_LENGTH_INPUT {
                input.push(c);
                session.set_length_input(&input);
            }
        }
        Command::DeleteLengthChar => {
            let mut input = session.length_input().to_string();
            if input.pop().is_some() {
                session.set_length_input(&input);
            }
        }
        Command::Quit => session.shutdown(),
    }
    Ok(None)
}
