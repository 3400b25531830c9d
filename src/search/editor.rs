//! Query line editor.

/// How typed characters affect the text under the cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditMode {
    /// Shift the rest of the line right.
    #[default]
    Insert,

    /// Replace the character under the cursor.
    Overwrite,
}

/// Keyboard input the console reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleEvent {
    Char(char),
    Space,
    Backspace,
    Delete,
    Left,
    Right,
    ToggleInsert,
    Quit,
}

/// What the console loop must do after an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transition {
    /// The buffer changed; run the search again.
    pub rerender: bool,

    /// Leave the console.
    pub quit: bool,
}

impl Transition {
    const fn rerender() -> Self {
        Self {
            rerender: true,
            quit: false,
        }
    }

    const fn idle() -> Self {
        Self {
            rerender: false,
            quit: false,
        }
    }

    const fn quit() -> Self {
        Self {
            rerender: false,
            quit: true,
        }
    }
}

/// Query text with a cursor, counted in chars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuffer {
    chars: Vec<char>,
    cursor: usize,
    mode: EditMode,
}

impl QueryBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer with `text` and the cursor at its end.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();

        Self {
            cursor: chars.len(),
            chars,
            mode: EditMode::Insert,
        }
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    /// The text the matcher sees: surrounding whitespace removed.
    #[must_use]
    pub fn query(&self) -> String {
        self.text().trim().to_string()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    fn write(&mut self, c: char) {
        match self.mode {
            EditMode::Overwrite if self.cursor < self.chars.len() => {
                if let Some(slot) = self.chars.get_mut(self.cursor) {
                    *slot = c;
                }
            }
            EditMode::Insert | EditMode::Overwrite => self.chars.insert(self.cursor, c),
        }

        self.cursor += 1;
    }

    fn delete_before(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
        }
    }

    fn delete_at(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }
}

/// Apply `event` to `state`.
///
/// Returns the next buffer and whether the search must run again. Only
/// events that can change the text ask for a re-render, even when they end
/// up changing nothing (backspace at the start of the line).
#[must_use]
pub fn transition(state: &QueryBuffer, event: ConsoleEvent) -> (QueryBuffer, Transition) {
    let mut next = state.clone();

    let outcome = match event {
        ConsoleEvent::Char(c) => {
            next.write(c);
            Transition::rerender()
        }
        ConsoleEvent::Space => {
            next.write(' ');
            Transition::rerender()
        }
        ConsoleEvent::Backspace => {
            next.delete_before();
            Transition::rerender()
        }
        ConsoleEvent::Delete => {
            next.delete_at();
            Transition::rerender()
        }
        ConsoleEvent::Left => {
            next.cursor = next.cursor.saturating_sub(1);
            Transition::idle()
        }
        ConsoleEvent::Right => {
            next.cursor = (next.cursor + 1).min(next.chars.len());
            Transition::idle()
        }
        ConsoleEvent::ToggleInsert => {
            next.mode = match next.mode {
                EditMode::Insert => EditMode::Overwrite,
                EditMode::Overwrite => EditMode::Insert,
            };
            Transition::idle()
        }
        ConsoleEvent::Quit => Transition::quit(),
    };

    (next, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(state: QueryBuffer, events: &[ConsoleEvent]) -> QueryBuffer {
        events
            .iter()
            .fold(state, |state, event| transition(&state, *event).0)
    }

    #[test]
    fn typing_appends_and_rerenders() {
        let (next, step) = transition(&QueryBuffer::from_text("ac"), ConsoleEvent::Char('m'));

        assert_eq!(next.text(), "acm");
        assert_eq!(next.cursor(), 3);
        assert!(step.rerender, "typing should re-run the search");
        assert!(!step.quit, "typing should not quit");
    }

    #[test]
    fn space_is_literal_but_trimmed_for_search() {
        let next = apply(QueryBuffer::new(), &[ConsoleEvent::Space, ConsoleEvent::Char('a')]);

        assert_eq!(next.text(), " a");
        assert_eq!(next.query(), "a");
    }

    #[test]
    fn backspace_and_delete_respect_cursor() {
        let state = apply(
            QueryBuffer::from_text("abcd"),
            &[ConsoleEvent::Left, ConsoleEvent::Left],
        );

        assert_eq!(apply(state.clone(), &[ConsoleEvent::Backspace]).text(), "acd");
        assert_eq!(apply(state, &[ConsoleEvent::Delete]).text(), "abd");
    }

    #[test]
    fn backspace_at_start_is_noop_that_rerenders() {
        let (next, step) = transition(&QueryBuffer::new(), ConsoleEvent::Backspace);

        assert_eq!(next, QueryBuffer::new());
        assert!(step.rerender, "backspace always re-runs the search");
    }

    #[test]
    fn toggle_insert_does_not_rerender() {
        let (next, step) = transition(&QueryBuffer::new(), ConsoleEvent::ToggleInsert);

        assert_eq!(next.mode(), EditMode::Overwrite);
        assert!(!step.rerender, "mode toggle should not re-run the search");
    }

    #[test]
    fn overwrite_replaces_under_cursor() {
        let next = apply(
            QueryBuffer::from_text("acme"),
            &[
                ConsoleEvent::ToggleInsert,
                ConsoleEvent::Left,
                ConsoleEvent::Left,
                ConsoleEvent::Char('x'),
                ConsoleEvent::Char('y'),
                ConsoleEvent::Char('z'),
            ],
        );

        assert_eq!(next.text(), "acxyz");
    }

    #[test]
    fn cursor_moves_are_clamped() {
        let next = apply(
            QueryBuffer::from_text("ab"),
            &[ConsoleEvent::Right, ConsoleEvent::Right],
        );
        assert_eq!(next.cursor(), 2);

        let next = apply(next, &[ConsoleEvent::Left, ConsoleEvent::Left, ConsoleEvent::Left]);
        assert_eq!(next.cursor(), 0);
    }

    #[test]
    fn quit_is_terminal() {
        let (_, step) = transition(&QueryBuffer::from_text("acme"), ConsoleEvent::Quit);

        assert!(step.quit, "quit should end the loop");
        assert!(!step.rerender, "quit should not re-run the search");
    }
}
