//! Partial-token extractor
//!
//! Given the sentinel of the active autocompletion, works out which trigger
//! started it and what has been typed since. The scan is a single backward
//! pass over the text in front of the sentinel:
//!
//! 1. For every category, find the last occurrence of its leading character
//! 2. The occurrence closest to the sentinel wins; earlier triggers of other
//!    categories are shadowed by it
//! 3. The characters between the trigger symbol and the sentinel are the
//!    partial text

use super::category::{TriggerCategory, Triggers};

/// Span in the buffer as `(start, length)` character offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenRange {
    /// First character
    pub start: usize,
    /// Number of characters
    pub len: usize,
}

impl TokenRange {
    /// Create a new range
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// One past the last character
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// The span as a `Range`
    pub fn as_range(&self) -> std::ops::Range<usize> {
        self.start..self.end()
    }

    /// Check whether `offset` falls inside the span
    pub fn contains(&self, offset: usize) -> bool {
        self.as_range().contains(&offset)
    }
}

/// A trigger followed by at least one typed character
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialToken {
    /// Active category
    pub category: TriggerCategory,
    /// Offset of the trigger symbol's leading character
    pub trigger_offset: usize,
    /// Text typed after the trigger symbol
    pub text: String,
    /// From the last symbol character through the end of the partial text
    pub range: TokenRange,
}

impl PartialToken {
    /// The span to highlight or replace: the whole trigger symbol plus the
    /// partial text.
    ///
    /// For two-character symbols this reaches one character further left than
    /// [`PartialToken::range`].
    pub fn highlight_range(&self) -> TokenRange {
        match self.category {
            TriggerCategory::Relation => TokenRange::new(self.range.start - 1, self.range.len + 1),
            _ => self.range,
        }
    }

    /// Number of typed characters
    pub fn typed_len(&self) -> usize {
        self.range.len - 1
    }
}

/// Result of scanning in front of a sentinel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// No trigger precedes the sentinel
    None,
    /// A trigger sits right against the sentinel with nothing typed yet
    Empty {
        /// Active category
        category: TriggerCategory,
        /// Offset of the trigger symbol's leading character
        trigger_offset: usize,
    },
    /// A trigger followed by typed text
    Partial(PartialToken),
}

impl Extraction {
    /// Active category, if any
    pub fn category(&self) -> Option<TriggerCategory> {
        match self {
            Extraction::None => None,
            Extraction::Empty { category, .. } => Some(*category),
            Extraction::Partial(token) => Some(token.category),
        }
    }

    /// Offset of the active trigger, if any
    pub fn trigger_offset(&self) -> Option<usize> {
        match self {
            Extraction::None => None,
            Extraction::Empty { trigger_offset, .. } => Some(*trigger_offset),
            Extraction::Partial(token) => Some(token.trigger_offset),
        }
    }
}

/// Extract the partial token ending at the sentinel.
///
/// # Arguments
/// * `chars` - Document characters
/// * `sentinel` - Offset of the sentinel in `chars`
/// * `triggers` - Trigger symbol registry
///
/// # Returns
/// * `Extraction` - What precedes the sentinel
pub fn extract(chars: &[char], sentinel: usize, triggers: &Triggers) -> Extraction {
    let Some(last) = sentinel.checked_sub(1) else {
        return Extraction::None;
    };
    let Some(before) = chars.get(..sentinel) else {
        return Extraction::None;
    };

    // Closest trigger to the sentinel wins
    let active = TriggerCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let leading = triggers.leading_char(category);
            before
                .iter()
                .rposition(|c| *c == leading)
                .map(|offset| (offset, category))
        })
        .max_by_key(|(offset, _)| *offset);

    let Some((trigger_offset, category)) = active else {
        return Extraction::None;
    };

    if trigger_offset == last {
        return Extraction::Empty {
            category,
            trigger_offset,
        };
    }
    // Only the first character of a two-character symbol typed so far
    if category == TriggerCategory::Relation && last == trigger_offset + 1 {
        return Extraction::Empty {
            category,
            trigger_offset,
        };
    }

    let start = trigger_offset + triggers.symbol_len(category);
    let text: String = before[start..].iter().collect();
    let len = sentinel - start;

    Extraction::Partial(PartialToken {
        category,
        trigger_offset,
        text,
        range: TokenRange::new(start - 1, len + 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complete::sentinel::SENTINEL;

    /// Characters of `text` with `|` standing for the sentinel, plus the
    /// sentinel's offset
    fn doc(text: &str) -> (Vec<char>, usize) {
        let chars: Vec<char> = text
            .chars()
            .map(|c| if c == '|' { SENTINEL } else { c })
            .collect();
        let sentinel = chars.iter().position(|c| *c == SENTINEL).unwrap();
        (chars, sentinel)
    }

    fn run(text: &str) -> Extraction {
        let (chars, sentinel) = doc(text);
        extract(&chars, sentinel, &Triggers::default())
    }

    #[test]
    fn test_hashtag_partial() {
        let Extraction::Partial(token) = run("hello #wor|") else {
            panic!("Expected partial token");
        };
        assert_eq!(token.category, TriggerCategory::Hashtag);
        assert_eq!(token.text, "wor");
        assert_eq!(token.range, TokenRange::new(6, 4));
        assert_eq!(token.highlight_range(), TokenRange::new(6, 4));
        assert_eq!(token.typed_len(), 3);
    }

    #[test]
    fn test_no_trigger_before_sentinel() {
        assert_eq!(run("hello wor|"), Extraction::None);
        assert_eq!(run("|hello #"), Extraction::None);
    }

    #[test]
    fn test_empty_trigger() {
        assert_eq!(
            run("hello #|"),
            Extraction::Empty {
                category: TriggerCategory::Hashtag,
                trigger_offset: 6
            }
        );
    }

    #[test]
    fn test_relation_half_symbol_is_empty() {
        assert_eq!(
            run("see ~>|"),
            Extraction::Empty {
                category: TriggerCategory::Relation,
                trigger_offset: 4
            }
        );
        assert_eq!(
            run("see ~|"),
            Extraction::Empty {
                category: TriggerCategory::Relation,
                trigger_offset: 4
            }
        );
    }

    #[test]
    fn test_relation_range_extends_left() {
        let Extraction::Partial(hashtag) = run("x #foo|") else {
            panic!("Expected partial token");
        };
        let Extraction::Partial(relation) = run("x ~>foo|") else {
            panic!("Expected partial token");
        };
        assert_eq!(relation.text, "foo");
        assert_eq!(relation.range, TokenRange::new(3, 4));
        assert_eq!(relation.highlight_range(), TokenRange::new(2, 5));
        assert_eq!(hashtag.highlight_range().len + 1, relation.highlight_range().len);
    }

    #[test]
    fn test_later_trigger_shadows_earlier() {
        let Extraction::Partial(token) = run("#tag then @jo|") else {
            panic!("Expected partial token");
        };
        assert_eq!(token.category, TriggerCategory::AtMention);
        assert_eq!(token.text, "jo");
        assert_eq!(token.trigger_offset, 10);
    }

    #[test]
    fn test_partial_keeps_inner_spaces() {
        let Extraction::Partial(token) = run("@Jacob C|") else {
            panic!("Expected partial token");
        };
        assert_eq!(token.text, "Jacob C");
        assert_eq!(token.highlight_range(), TokenRange::new(0, 8));
    }

    #[test]
    fn test_accessors() {
        let extraction = run("a #b|");
        assert_eq!(extraction.category(), Some(TriggerCategory::Hashtag));
        assert_eq!(extraction.trigger_offset(), Some(2));
        assert_eq!(Extraction::None.category(), None);
    }

    #[test]
    fn test_token_range_helpers() {
        let range = TokenRange::new(2, 3);
        assert_eq!(range.end(), 5);
        assert_eq!(range.as_range(), 2..5);
        assert!(range.contains(4));
        assert!(!range.contains(5));
    }
}
