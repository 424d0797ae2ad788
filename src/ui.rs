use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use deepwork::{length::InputMode, session::ButtonVariant};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
const CLOCK_PADDING: u16 = 4;

const HELP: &str = "(enter) start/cancel/kill  (a)mbient  (t) input mode  (h)ours (s)econds  (p)review alarm  (esc) quit";

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;
        let state = session.state();
        let button = session.button();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let accent = match button.variant {
            ButtonVariant::Start => Color::Cyan,
            ButtonVariant::Cancel => Color::Yellow,
            ButtonVariant::Committed => Color::Green,
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints(
                [
                    Constraint::Min(0),
                    Constraint::Length(3), // clock
                    Constraint::Length(2), // length input / ambient
                    Constraint::Length(2), // button
                    Constraint::Length(2), // prompt / status
                    Constraint::Length(1), // history
                    Constraint::Min(0),
                    Constraint::Length(1), // help
                ]
                .as_ref(),
            )
            .split(area);

        // clock, boxed and centered
        let clock = session.display().render(session.clock_format());
        let clock_width = (clock.width() as u16 + CLOCK_PADDING).min(chunks[1].width);
        let clock_area = Rect {
            x: chunks[1].x + (chunks[1].width - clock_width) / 2,
            width: clock_width,
            ..chunks[1]
        };
        Paragraph::new(Span::styled(clock, bold_style.fg(accent)))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
            .render(clock_area, buf);

        let input_line = if session.input_visible() {
            let unit = match session.config().input_mode {
                InputMode::Minute => "min",
                InputMode::HourMinute => "h:mm",
            };
            let mut spans = vec![
                Span::styled("length ", dim_style),
                Span::styled(format!("{}_", session.length_input()), bold_style),
                Span::styled(format!(" {unit}"), dim_style),
            ];
            if let Some(err) = session.length_error() {
                spans.push(Span::styled(
                    format!("  {err}"),
                    Style::default().fg(Color::Red),
                ));
            }
            Line::from(spans)
        } else {
            let ambient = if state.ambient_audible { "on" } else { "off" };
            Line::from(vec![
                Span::styled("ambient ", dim_style),
                Span::styled(ambient, bold_style),
            ])
        };
        Paragraph::new(input_line)
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        let button_style = if button.enabled {
            bold_style.fg(Color::Black).bg(accent)
        } else {
            dim_style
        };
        Paragraph::new(Span::styled(format!("[ {} ]", button.label), button_style))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);

        let message = if state.kill_pending {
            Some(Span::styled(
                "Kill this session? It will count as failed. (y/n)",
                bold_style.fg(Color::Red),
            ))
        } else {
            self.status
                .as_deref()
                .map(|status| Span::styled(status, italic_style))
        };
        if let Some(message) = message {
            Paragraph::new(message)
                .alignment(Alignment::Center)
                .render(chunks[4], buf);
        }

        let summary = &self.summary;
        Paragraph::new(Span::styled(
            format!(
                "{} sessions | {} done | {} killed | {} min focused",
                summary.sessions, summary.succeeded, summary.failed, summary.focused_minutes
            ),
            dim_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);

        if HELP.width() <= chunks[7].width as usize {
            Paragraph::new(Span::styled(HELP, italic_style.patch(dim_style)))
                .alignment(Alignment::Center)
                .render(chunks[7], buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepwork::audio::{AudioMixer, PlaybackBackend, SilentBackend, Sound, SoundKind, SoundLibrary};
    use deepwork::config::{Config, ConfigStore, FileConfigStore, Timing};
    use deepwork::history::{OutcomeRecorder, SessionHistory};
    use deepwork::session::FocusSession;
    use ratatui::{buffer::Buffer, layout::Rect};
    use std::path::Path;
    use tempfile::TempDir;

    fn create_test_app(length: &str, timing: Timing) -> (App, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        store
            .save(&Config {
                session_length: length.to_string(),
                ..Config::default()
            })
            .unwrap();

        let mut library = SoundLibrary::default();
        library.insert(Sound::from_path(Path::new("/s/Woohoo.flac"), SoundKind::Short).unwrap());
        library.insert(
            Sound::from_path(Path::new("/s/Woodpecker_Forest.flac"), SoundKind::Long).unwrap(),
        );
        let backend: Box<dyn PlaybackBackend> = Box::new(SilentBackend);
        let session = FocusSession::new(
            AudioMixer::new(backend, library),
            SessionHistory::open_in_memory().unwrap(),
            store,
            timing,
        );
        (App::new(session), dir)
    }

    fn render(app: &App, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_ui_idle() {
        let (app, _dir) = create_test_app("25", Timing::default());
        let rendered = render(&app, 120, 30);
        assert!(rendered.contains("0:00"));
        assert!(rendered.contains("[ Start ]"));
        assert!(rendered.contains("25_"));
        assert!(rendered.contains("0 sessions"));
    }

    #[test]
    fn test_ui_invalid_length_shows_error() {
        let (mut app, _dir) = create_test_app("25", Timing::default());
        app.session.set_length_input("200");
        let rendered = render(&app, 120, 30);
        assert!(rendered.contains("200_"));
        assert!(rendered.contains("[ Start ]"));
        assert!(!app.session.button().enabled);
    }

    #[test]
    fn test_ui_running_session() {
        let (mut app, _dir) = create_test_app("25", Timing::default());
        app.session.act().unwrap();
        app.session.tick().unwrap();
        let rendered = render(&app, 120, 30);
        assert!(rendered.contains("24:59"));
        assert!(rendered.contains("[ Cancel (59) ]"));
        assert!(rendered.contains("ambient off"));
        assert!(!rendered.contains("length"));
    }

    #[test]
    fn test_ui_kill_prompt() {
        let (mut app, _dir) = create_test_app("5", Timing::debug(Some(1), Some(1)));
        app.session.act().unwrap();
        app.session.tick().unwrap();
        app.session.act().unwrap();
        let rendered = render(&app, 120, 30);
        assert!(rendered.contains("[ Kill ]"));
        assert!(rendered.contains("(y/n)"));
    }

    #[test]
    fn test_ui_history_summary() {
        let (mut app, _dir) = create_test_app("5", Timing::default());
        app.session.recorder_mut().record(25, true).unwrap();
        app.session.recorder_mut().record(3, false).unwrap();
        app.refresh_summary();
        let rendered = render(&app, 120, 30);
        assert!(rendered.contains("2 sessions | 1 done | 1 killed | 28 min focused"));
    }

    #[test]
    fn test_ui_clock_format_toggles() {
        let (mut app, _dir) = create_test_app("90", Timing::default());
        app.session.act().unwrap();
        app.session.toggle_clock_hours();
        assert!(render(&app, 120, 30).contains("1:30:00"));
        app.session.toggle_clock_seconds();
        let rendered = render(&app, 120, 30);
        assert!(!rendered.contains("1:30:00"));
        assert!(rendered.contains("1:30"));
    }

    #[test]
    fn test_ui_extreme_sizes() {
        let (app, _dir) = create_test_app("25", Timing::default());
        for (w, h) in [(1, 1), (10, 5), (20, 40), (300, 100)] {
            render(&app, w, h);
        }
    }

    #[test]
    fn test_ui_status_after_completion() {
        let (mut app, _dir) = create_test_app("5", Timing::debug(Some(1), Some(1)));
        app.session.act().unwrap();
        for _ in 0..5 {
            let transition = app.session.tick().unwrap();
            app.after(transition);
        }
        let rendered = render(&app, 120, 30);
        assert!(rendered.contains("Session complete: 5 min of focus"));
        assert!(rendered.contains("1 sessions"));
    }
}
