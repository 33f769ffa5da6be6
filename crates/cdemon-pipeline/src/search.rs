//! Incremental search over the rendered console text.
//!
//! The index is computed against the text the render sink is currently
//! displaying — the visible entries' display lines joined with newlines —
//! so match offsets are stable coordinates the sink can scroll to. It is
//! rebuilt in full whenever the query, the filter set, or the buffer
//! changes; the retention bound keeps that recomputation cheap.

use regex::Regex;

/// One match within the rendered visible text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    /// Byte offset of match start within the rendered text
    pub start: usize,
    /// Byte offset of match end within the rendered text
    pub end: usize,
}

/// State for console search with cyclic match navigation.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    query: String,
    matches: Vec<SearchMatch>,
    /// Cursor into `matches` (None while there are no matches)
    current: Option<usize>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Set the query string. The match list is stale until the next
    /// [`recompute`](Self::recompute).
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query != self.query {
            self.query = query;
            self.current = None;
        }
        if self.query.is_empty() {
            self.matches.clear();
        }
    }

    /// Rebuild the match list against the current rendered text.
    ///
    /// Case-insensitive, non-overlapping substring occurrences in order.
    /// The cursor survives recomputation while still in range, otherwise
    /// it resets to the first match.
    pub fn recompute(&mut self, rendered: &str) {
        if self.query.is_empty() {
            self.matches.clear();
            self.current = None;
            return;
        }

        // Escaped pattern: plain substring semantics, regex machinery only
        // for case-insensitivity and non-overlapping iteration.
        let pattern = format!("(?i){}", regex::escape(&self.query));
        let regex = match Regex::new(&pattern) {
            Ok(regex) => regex,
            Err(err) => {
                tracing::warn!("search pattern failed to compile: {err}");
                self.matches.clear();
                self.current = None;
                return;
            }
        };

        self.matches = regex
            .find_iter(rendered)
            .map(|m| SearchMatch {
                start: m.start(),
                end: m.end(),
            })
            .collect();

        self.current = if self.matches.is_empty() {
            None
        } else {
            match self.current {
                Some(index) if index < self.matches.len() => Some(index),
                _ => Some(0),
            }
        };
    }

    pub fn has_matches(&self) -> bool {
        !self.matches.is_empty()
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// All matches in rendered-text order.
    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    /// The match under the cursor.
    pub fn current_match(&self) -> Option<SearchMatch> {
        self.current.and_then(|index| self.matches.get(index)).copied()
    }

    /// Stable rendered-text offset of the current match, for the sink.
    pub fn current_offset(&self) -> Option<usize> {
        self.current_match().map(|m| m.start)
    }

    /// Move to the next match, wrapping from last to first. No-op with
    /// zero matches.
    pub fn next_match(&mut self) {
        if self.matches.is_empty() {
            self.current = None;
            return;
        }
        self.current = Some(match self.current {
            Some(index) => (index + 1) % self.matches.len(),
            None => 0,
        });
    }

    /// Move to the previous match, wrapping from first to last. No-op
    /// with zero matches.
    pub fn prev_match(&mut self) {
        if self.matches.is_empty() {
            self.current = None;
            return;
        }
        self.current = Some(match self.current {
            Some(0) | None => self.matches.len() - 1,
            Some(index) => index - 1,
        });
    }

    /// Cursor position and match count as `current/total` (`0/0` when
    /// there is nothing to navigate).
    pub fn status(&self) -> String {
        match self.current {
            Some(index) if !self.matches.is_empty() => {
                format!("{}/{}", index + 1, self.matches.len())
            }
            _ => format!("0/{}", self.matches.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn searched(query: &str, rendered: &str) -> SearchState {
        let mut state = SearchState::new();
        state.set_query(query);
        state.recompute(rendered);
        state
    }

    #[test]
    fn test_empty_query_reports_zero_of_zero() {
        let state = searched("", "anything at all");
        assert_eq!(state.match_count(), 0);
        assert!(state.current_offset().is_none());
        assert_eq!(state.status(), "0/0");
    }

    #[test]
    fn test_fresh_matches_start_at_first() {
        let state = searched("lo", "hello low yellow");
        assert_eq!(state.match_count(), 3);
        assert_eq!(state.status(), "1/3");
        assert_eq!(state.current_offset(), Some(3));
    }

    #[test]
    fn test_case_insensitive_matching() {
        let state = searched("error", "ERROR then Error then error");
        assert_eq!(state.match_count(), 3);
    }

    #[test]
    fn test_non_overlapping_matches() {
        let state = searched("aa", "aaaa");
        assert_eq!(state.match_count(), 2);
        assert_eq!(state.matches()[0], SearchMatch { start: 0, end: 2 });
        assert_eq!(state.matches()[1], SearchMatch { start: 2, end: 4 });
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let state = searched("a.b", "a.b axb");
        assert_eq!(state.match_count(), 1);
        assert_eq!(state.current_offset(), Some(0));
    }

    #[test]
    fn test_next_cycles_back_to_first() {
        let mut state = searched("x", "x x x");
        assert_eq!(state.status(), "1/3");
        state.next_match();
        assert_eq!(state.status(), "2/3");
        state.next_match();
        assert_eq!(state.status(), "3/3");
        state.next_match();
        assert_eq!(state.status(), "1/3");
    }

    #[test]
    fn test_prev_from_first_wraps_to_last() {
        let mut state = searched("x", "x x x");
        state.prev_match();
        assert_eq!(state.status(), "3/3");
        state.prev_match();
        assert_eq!(state.status(), "2/3");
    }

    #[test]
    fn test_next_k_times_returns_to_first_match() {
        let mut state = searched("m", "m m m m");
        let first = state.current_offset();
        for _ in 0..state.match_count() {
            state.next_match();
        }
        assert_eq!(state.current_offset(), first);
    }

    #[test]
    fn test_navigation_with_zero_matches_is_noop() {
        let mut state = searched("absent", "nothing here");
        state.next_match();
        state.prev_match();
        assert!(state.current_offset().is_none());
        assert_eq!(state.status(), "0/0");
    }

    #[test]
    fn test_recompute_preserves_cursor_in_range() {
        let mut state = searched("x", "x x x");
        state.next_match();
        assert_eq!(state.status(), "2/3");
        state.recompute("x x x x");
        assert_eq!(state.status(), "2/4");
    }

    #[test]
    fn test_recompute_resets_cursor_when_out_of_range() {
        let mut state = searched("x", "x x x");
        state.next_match();
        state.next_match();
        assert_eq!(state.status(), "3/3");
        state.recompute("x");
        assert_eq!(state.status(), "1/1");
    }

    #[test]
    fn test_query_change_resets_cursor() {
        let mut state = searched("x", "x y x y");
        state.next_match();
        state.set_query("y");
        state.recompute("x y x y");
        assert_eq!(state.status(), "1/2");
    }

    #[test]
    fn test_clearing_query_drops_matches() {
        let mut state = searched("x", "x x");
        state.set_query("");
        assert!(!state.has_matches());
        state.recompute("x x");
        assert_eq!(state.status(), "0/0");
    }

    #[test]
    fn test_offsets_index_into_rendered_text() {
        let rendered = "INF ready\nERR boom";
        let state = searched("boom", rendered);
        let m = state.matches()[0];
        assert_eq!(&rendered[m.start..m.end], "boom");
    }
}
