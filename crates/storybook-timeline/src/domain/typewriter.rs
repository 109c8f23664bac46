//! Character-by-character subtitle reveal.

use std::time::Duration;

/// Marker that pauses the reveal instead of being displayed.
pub const PAUSE_MARKER: char = '|';

/// Length of the pause inserted by [`PAUSE_MARKER`].
pub const PAUSE: Duration = Duration::from_secs(1);

/// Reveals a line one character at a time.
///
/// Each character appears at the start of its slot: the first one
/// immediately, the next `per_char` later, and so on.
#[derive(Debug, Clone)]
pub struct Typewriter {
    chars: Vec<char>,
    per_char: Duration,
    position: usize,
    elapsed: Duration,
    next_at: Duration,
    visible: String,
}

impl Typewriter {
    /// Creates a typewriter over `text` with nothing revealed yet.
    #[must_use]
    pub fn new(text: &str, per_char: Duration) -> Self {
        Self {
            chars: text.chars().collect(),
            per_char,
            position: 0,
            elapsed: Duration::ZERO,
            next_at: Duration::ZERO,
            visible: String::with_capacity(text.len()),
        }
    }

    /// Advances time; returns `true` if the visible text changed.
    pub fn advance(&mut self, delta: Duration) -> bool {
        self.elapsed += delta;
        let mut changed = false;
        while self.position < self.chars.len() && self.elapsed >= self.next_at {
            let c = self.chars[self.position];
            if c == PAUSE_MARKER {
                self.next_at += PAUSE;
            } else {
                self.visible.push(c);
                self.next_at += self.per_char;
                changed = true;
            }
            self.position += 1;
        }
        changed
    }

    /// Returns the text revealed so far.
    #[must_use]
    pub fn visible_text(&self) -> &str {
        &self.visible
    }

    /// Returns `true` once every character has been processed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.position >= self.chars.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_first_character_appears_immediately() {
        let mut typewriter = Typewriter::new("Hero", ms(50));

        assert!(typewriter.advance(Duration::ZERO));
        assert_eq!(typewriter.visible_text(), "H");
    }

    #[test]
    fn test_characters_follow_per_char_delay() {
        let mut typewriter = Typewriter::new("Hero", ms(50));
        typewriter.advance(Duration::ZERO);

        assert!(!typewriter.advance(ms(49)));
        assert!(typewriter.advance(ms(1)));
        assert_eq!(typewriter.visible_text(), "He");

        typewriter.advance(ms(500));
        assert_eq!(typewriter.visible_text(), "Hero");
        assert!(typewriter.is_finished());
    }

    #[test]
    fn test_pause_marker_is_hidden_and_delays_the_rest() {
        let mut typewriter = Typewriter::new("A|B", ms(50));
        typewriter.advance(Duration::ZERO);

        // "A" slot ends at 50ms, then the marker holds for one second.
        typewriter.advance(ms(1000));
        assert_eq!(typewriter.visible_text(), "A");

        typewriter.advance(ms(50));
        assert_eq!(typewriter.visible_text(), "AB");
    }
}
