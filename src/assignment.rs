//! Tracks whether a TOML assignment value has been closed.
//!
//! Only basic strings and brackets matter here: a value is complete once no
//! `"` string is open and every `[` has been matched. Comments (`#` outside a
//! string) end the scan of a line.

/// Scanning state carried across the lines of one assignment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssignmentState {
    in_string: bool,
    escape: bool,
    bracket_depth: usize,
}

impl AssignmentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line (or the value part of the first line) into the state.
    pub fn scan(&mut self, line: &str) {
        for ch in line.chars() {
            if self.in_string {
                if self.escape {
                    self.escape = false;
                    continue;
                }
                match ch {
                    '\\' => self.escape = true,
                    '"' => self.in_string = false,
                    _ => {}
                }
                continue;
            }

            match ch {
                '"' => self.in_string = true,
                '#' => return,
                '[' => self.bracket_depth += 1,
                ']' => self.bracket_depth = self.bracket_depth.saturating_sub(1),
                _ => {}
            }
        }
    }

    /// True while the value is still open and the next line belongs to it.
    pub fn needs_continuation(&self) -> bool {
        self.in_string || self.bracket_depth > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanned(lines: &[&str]) -> AssignmentState {
        let mut state = AssignmentState::new();
        for line in lines {
            state.scan(line);
        }
        state
    }

    #[test]
    fn single_line_array_is_complete() {
        assert!(!scanned(&[" [\"a.exe\", \"notify\"]"]).needs_continuation());
    }

    #[test]
    fn open_bracket_needs_continuation() {
        let state = scanned(&[" ["]);
        assert!(state.needs_continuation());
    }

    #[test]
    fn multi_line_array_closes() {
        let state = scanned(&[" [", "  \"a.exe\",", "  \"notify\",", "]"]);
        assert!(!state.needs_continuation());
    }

    #[test]
    fn brackets_inside_strings_are_ignored() {
        let state = scanned(&[" [\"C:\\\\dir[1]\\\\a.exe\", \"]\"]"]);
        assert!(!state.needs_continuation());
    }

    #[test]
    fn escaped_quote_keeps_string_open() {
        let state = scanned(&[" [\"say \\\"hi"]);
        assert!(state.needs_continuation());
        let mut state = state;
        state.scan("\"]");
        assert!(!state.needs_continuation());
    }

    #[test]
    fn comment_truncates_line() {
        let state = scanned(&[" [\"a\"] # trailing [ comment"]);
        assert!(!state.needs_continuation());
    }

    #[test]
    fn hash_inside_string_is_not_a_comment() {
        let state = scanned(&[" [\"#\", "]);
        assert!(state.needs_continuation());
    }

    #[test]
    fn stray_close_bracket_does_not_go_negative() {
        let mut state = scanned(&[" ]]"]);
        assert!(!state.needs_continuation());
        state.scan("[");
        assert!(state.needs_continuation());
    }

    #[test]
    fn unterminated_string_needs_continuation() {
        assert!(scanned(&[" \"open"]).needs_continuation());
    }
}
