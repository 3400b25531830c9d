//! Interactive search console.
//!
//! Three regions: the query input at the top left, "Search Results" below
//! it and "Top Match" on the right. Input is read one event at a time on the
//! calling thread.

use std::io;

use ratatui::{
    Frame, Terminal,
    backend::Backend,
    crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tracing::debug;

use crate::{
    search::{ConsoleError, ConsoleEvent, DetailView, EditMode, ResultLine},
    session::Session,
};

const INPUT_HEIGHT: u16 = 3;

/// Run the console on the current terminal until the operator quits.
///
/// The terminal is put back in its normal mode on every exit path,
/// including panics.
///
/// # Errors
///
/// Returns [`ConsoleError::Terminal`] when the terminal cannot be set up,
/// drawn or read.
pub fn run_console(session: &mut Session) -> Result<(), ConsoleError> {
    let mut terminal = ratatui::try_init()?;

    let result = event_loop(&mut terminal, session, read_event);

    ratatui::restore();

    result
}

/// Draw, then feed events from `next_event` into `session` until it quits.
///
/// `next_event` yields `None` for input the console ignores.
///
/// # Errors
///
/// Returns [`ConsoleError::Terminal`] when drawing or reading fails.
pub fn event_loop<B, F>(
    terminal: &mut Terminal<B>,
    session: &mut Session,
    mut next_event: F,
) -> Result<(), ConsoleError>
where
    B: Backend,
    F: FnMut() -> io::Result<Option<ConsoleEvent>>,
{
    terminal.draw(|frame| draw(frame, session))?;

    loop {
        let Some(event) = next_event()? else {
            continue;
        };

        let step = session.apply(event);

        if step.quit {
            debug!("search console closed");
            return Ok(());
        }

        terminal.draw(|frame| draw(frame, session))?;
    }
}

/// Map a key press to a console event.
#[must_use]
pub fn map_key(key: KeyEvent) -> Option<ConsoleEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(ConsoleEvent::Quit);
    }

    match key.code {
        KeyCode::Esc => Some(ConsoleEvent::Quit),
        KeyCode::Char(' ') => Some(ConsoleEvent::Space),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::ALT) => {
            Some(ConsoleEvent::Char(c))
        }
        KeyCode::Backspace => Some(ConsoleEvent::Backspace),
        KeyCode::Delete => Some(ConsoleEvent::Delete),
        KeyCode::Left => Some(ConsoleEvent::Left),
        KeyCode::Right => Some(ConsoleEvent::Right),
        KeyCode::Insert => Some(ConsoleEvent::ToggleInsert),
        _ => None,
    }
}

fn read_event() -> io::Result<Option<ConsoleEvent>> {
    match event::read()? {
        Event::Key(key) => Ok(map_key(key)),
        _ => Ok(None),
    }
}

/// Draw the three console regions for `session`.
pub fn draw(frame: &mut Frame<'_>, session: &Session) {
    let [left, top_match] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
            .areas(frame.area());
    let [input, results] =
        Layout::vertical([Constraint::Length(INPUT_HEIGHT), Constraint::Min(0)]).areas(left);

    draw_input(frame, input, session);
    draw_results(frame, results, session);
    draw_detail(frame, top_match, session);
}

fn draw_input(frame: &mut Frame<'_>, area: Rect, session: &Session) {
    let query = session.query();

    let mode = match query.mode() {
        EditMode::Insert => "INS",
        EditMode::Overwrite => "OVR",
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Type pattern here [{mode}]"));

    frame.render_widget(Paragraph::new(query.text()).block(block), area);

    let offset = u16::try_from(query.cursor()).unwrap_or(u16::MAX);
    let x = area
        .x
        .saturating_add(1)
        .saturating_add(offset)
        .min(area.right().saturating_sub(2));

    frame.set_cursor_position(Position::new(x, area.y.saturating_add(1)));
}

fn draw_results(frame: &mut Frame<'_>, area: Rect, session: &Session) {
    let view = session.view();

    let mut lines = Vec::with_capacity(view.results.len() + 1);

    if !view.summary.is_empty() {
        lines.push(Line::from(view.summary.clone()));
    }

    lines.extend(view.results.iter().map(result_line));

    let block = Block::default().borders(Borders::ALL).title("Search Results");

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_detail(frame: &mut Frame<'_>, area: Rect, session: &Session) {
    let text = match &session.view().detail {
        DetailView::Entry(json) => json.clone(),
        DetailView::NoMatch => String::new(),
    };

    let block = Block::default().borders(Borders::ALL).title("Top Match");

    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn result_line(line: &ResultLine) -> Line<'static> {
    let highlight = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);

    Line::from(
        line.segments
            .iter()
            .map(|segment| {
                if segment.highlighted {
                    Span::styled(segment.text.clone(), highlight)
                } else {
                    Span::raw(segment.text.clone())
                }
            })
            .collect::<Vec<_>>(),
    )
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, buffer::Cell};
    use testresult::TestResult;

    use super::*;
    use crate::{
        broker::BearerToken,
        directory::{DirectoryEntry, DirectorySnapshot},
    };

    fn session() -> Session {
        Session::new(
            BearerToken::new("abc"),
            DirectorySnapshot::new(
                ["acme-web", "acme-native", "beta-spa"]
                    .into_iter()
                    .map(|name| DirectoryEntry {
                        name: name.to_string(),
                        client_id: Some(format!("{name}-id")),
                        ..DirectoryEntry::default()
                    })
                    .collect(),
            ),
        )
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(Cell::symbol)
            .collect()
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn keys_map_to_events() {
        assert_eq!(
            map_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(ConsoleEvent::Quit)
        );
        assert_eq!(map_key(key(KeyCode::Esc, KeyModifiers::NONE)), Some(ConsoleEvent::Quit));
        assert_eq!(
            map_key(key(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Some(ConsoleEvent::Char('A'))
        );
        assert_eq!(
            map_key(key(KeyCode::Char(' '), KeyModifiers::NONE)),
            Some(ConsoleEvent::Space)
        );
        assert_eq!(
            map_key(key(KeyCode::Insert, KeyModifiers::NONE)),
            Some(ConsoleEvent::ToggleInsert)
        );
        assert_eq!(map_key(key(KeyCode::Char('x'), KeyModifiers::CONTROL)), None);
        assert_eq!(map_key(key(KeyCode::F(1), KeyModifiers::NONE)), None);
    }

    #[test]
    fn typed_query_draws_results_and_top_match() -> TestResult {
        let mut terminal = Terminal::new(TestBackend::new(120, 24))?;
        let mut session = session();

        let mut script = vec![
            Some(ConsoleEvent::Char('b')),
            None,
            Some(ConsoleEvent::Char('e')),
            Some(ConsoleEvent::Quit),
        ]
        .into_iter();

        event_loop(&mut terminal, &mut session, || Ok(script.next().flatten()))?;

        let drawn = screen(&terminal);

        assert!(drawn.contains("Search Results"), "results region missing");
        assert!(drawn.contains("Top Match"), "detail region missing");
        assert!(drawn.contains("found 1 matches in"), "summary missing");
        assert!(drawn.contains("beta-spa-id"), "top match detail missing");
        assert_eq!(session.query().text(), "be");

        Ok(())
    }

    #[test]
    fn quitting_immediately_leaves_empty_view() -> TestResult {
        let mut terminal = Terminal::new(TestBackend::new(80, 12))?;
        let mut session = session();

        event_loop(&mut terminal, &mut session, || Ok(Some(ConsoleEvent::Quit)))?;

        assert_eq!(session.view().detail, DetailView::NoMatch);
        assert!(screen(&terminal).contains("Type pattern here"), "input region missing");

        Ok(())
    }
}
