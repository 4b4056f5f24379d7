//! Completed-token log and highlight spans
//!
//! Every commit appends `symbol + value` to an append-only log. The log does
//! not influence later sessions; it only lets the host re-highlight finished
//! autocompletions after the text has been re-rendered.

use super::extractor::TokenRange;

/// Append-only log of committed autocompletions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedTokens {
    entries: Vec<String>,
}

impl CompletedTokens {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed token
    pub fn push(&mut self, token: impl Into<String>) {
        self.entries.push(token.into());
    }

    /// Entries in commit order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been committed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find every occurrence of a logged token in `chars`.
    ///
    /// Matches never overlap: the scan moves left to right and, where several
    /// tokens start at the same position, the longest one wins.
    ///
    /// # Returns
    /// * `Vec<TokenRange>` - Spans in document order
    pub fn spans_in(&self, chars: &[char]) -> Vec<TokenRange> {
        let mut tokens: Vec<Vec<char>> = self
            .entries
            .iter()
            .map(|e| e.chars().collect::<Vec<char>>())
            .filter(|t| !t.is_empty())
            .collect();
        tokens.sort();
        tokens.dedup();
        tokens.sort_by_key(|t| std::cmp::Reverse(t.len()));

        let mut spans = Vec::new();
        let mut pos = 0;
        while pos < chars.len() {
            let hit = tokens
                .iter()
                .find(|t| chars[pos..].starts_with(t.as_slice()));
            match hit {
                Some(token) => {
                    spans.push(TokenRange::new(pos, token.len()));
                    pos += token.len();
                }
                None => pos += 1,
            }
        }
        spans
    }
}

/// Spans the host should paint as autocompletions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlights {
    /// Token currently being typed
    pub active: Option<TokenRange>,
    /// Previously committed tokens
    pub completed: Vec<TokenRange>,
}

impl Highlights {
    /// Check whether `offset` should be painted
    pub fn covers(&self, offset: usize) -> bool {
        self.active.is_some_and(|r| r.contains(offset))
            || self.completed.iter().any(|r| r.contains(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_log_is_append_only() {
        let mut log = CompletedTokens::new();
        assert!(log.is_empty());
        log.push("#idea");
        log.push("@Jacob Cole");
        assert_eq!(log.entries(), ["#idea", "@Jacob Cole"]);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_spans_in_text() {
        let mut log = CompletedTokens::new();
        log.push("#idea");
        log.push("@Jacob Cole");

        let spans = log.spans_in(&chars("#idea for @Jacob Cole and #idea"));
        assert_eq!(
            spans,
            vec![
                TokenRange::new(0, 5),
                TokenRange::new(10, 11),
                TokenRange::new(26, 5)
            ]
        );
    }

    #[test]
    fn test_longest_token_wins() {
        let mut log = CompletedTokens::new();
        log.push("#id");
        log.push("#idea");
        let spans = log.spans_in(&chars("x #idea"));
        assert_eq!(spans, vec![TokenRange::new(2, 5)]);
    }

    #[test]
    fn test_covers() {
        let highlights = Highlights {
            active: Some(TokenRange::new(8, 3)),
            completed: vec![TokenRange::new(0, 2)],
        };
        assert!(highlights.covers(1));
        assert!(highlights.covers(10));
        assert!(!highlights.covers(5));
    }
}
