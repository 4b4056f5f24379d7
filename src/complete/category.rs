//! Trigger category registry
//!
//! Defines the three trigger categories and the symbols that start them. The
//! symbol set is fixed for the lifetime of the process: it is built once at
//! start-up (from defaults or configuration), validated, and then shared
//! read-only by every other completion component.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::sentinel::SENTINEL;
use crate::error::ConfigError;

/// Kind of autocompletion a trigger symbol starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerCategory {
    /// `#tag`
    Hashtag,
    /// `@name`
    AtMention,
    /// Two-character relation marker, e.g. `~>doc`
    Relation,
}

impl TriggerCategory {
    /// Every category, in registry order
    pub const ALL: [TriggerCategory; 3] = [
        TriggerCategory::Hashtag,
        TriggerCategory::AtMention,
        TriggerCategory::Relation,
    ];

    /// Stable numeric id used by candidate stores
    pub fn id(self) -> u8 {
        match self {
            TriggerCategory::Hashtag => 1,
            TriggerCategory::AtMention => 2,
            TriggerCategory::Relation => 3,
        }
    }

    /// Look a category up by its numeric id
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    /// Look a category up by name (`hashtag`, `at_mention`/`mention`, `relation`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "hashtag" | "tag" => Some(TriggerCategory::Hashtag),
            "at_mention" | "atmention" | "mention" => Some(TriggerCategory::AtMention),
            "relation" => Some(TriggerCategory::Relation),
            _ => None,
        }
    }

    /// Symbol length every category requires
    pub fn symbol_len(self) -> usize {
        match self {
            TriggerCategory::Relation => 2,
            _ => 1,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            TriggerCategory::Hashtag => "hashtag",
            TriggerCategory::AtMention => "at_mention",
            TriggerCategory::Relation => "relation",
        }
    }
}

impl fmt::Display for TriggerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The trigger symbol set
///
/// Symbols are kept as `Vec<char>` so scanning code can compare characters
/// without re-decoding strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triggers {
    hashtag: Vec<char>,
    at_mention: Vec<char>,
    relation: Vec<char>,
}

impl Triggers {
    /// Default hashtag symbol
    pub const DEFAULT_HASHTAG: &'static str = "#";
    /// Default at-mention symbol
    pub const DEFAULT_AT_MENTION: &'static str = "@";
    /// Default relation symbol
    pub const DEFAULT_RELATION: &'static str = "~>";

    /// Build and validate a symbol set
    ///
    /// # Arguments
    /// * `hashtag` - Single-character hashtag symbol
    /// * `at_mention` - Single-character mention symbol
    /// * `relation` - Two distinct characters
    ///
    /// # Returns
    /// * `Result<Self, ConfigError>` - The registry or the first rule violated
    pub fn new(hashtag: &str, at_mention: &str, relation: &str) -> Result<Self, ConfigError> {
        let triggers = Self {
            hashtag: hashtag.chars().collect(),
            at_mention: at_mention.chars().collect(),
            relation: relation.chars().collect(),
        };
        triggers.validate()?;
        Ok(triggers)
    }

    /// Symbol characters of `category`
    pub fn symbol_chars(&self, category: TriggerCategory) -> &[char] {
        match category {
            TriggerCategory::Hashtag => &self.hashtag,
            TriggerCategory::AtMention => &self.at_mention,
            TriggerCategory::Relation => &self.relation,
        }
    }

    /// Symbol of `category` as a string
    pub fn symbol(&self, category: TriggerCategory) -> String {
        self.symbol_chars(category).iter().collect()
    }

    /// Leading character of `category`'s symbol
    pub fn leading_char(&self, category: TriggerCategory) -> char {
        self.symbol_chars(category)[0]
    }

    /// Symbol length of `category`
    pub fn symbol_len(&self, category: TriggerCategory) -> usize {
        self.symbol_chars(category).len()
    }

    /// Category whose full symbol equals `token`
    pub fn match_symbol(&self, token: &[char]) -> Option<TriggerCategory> {
        TriggerCategory::ALL
            .into_iter()
            .find(|c| self.symbol_chars(*c) == token)
    }

    /// Check whether `chars` contains any complete trigger symbol
    pub fn contains_any_symbol(&self, chars: &[char]) -> bool {
        TriggerCategory::ALL.into_iter().any(|c| {
            let symbol = self.symbol_chars(c);
            chars.windows(symbol.len()).any(|w| w == symbol)
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for category in TriggerCategory::ALL {
            let symbol = self.symbol_chars(category);
            let invalid = |reason: &str| ConfigError::InvalidTrigger {
                category: category.name().to_string(),
                symbol: symbol.iter().collect(),
                reason: reason.to_string(),
            };

            if symbol.len() != category.symbol_len() {
                return Err(invalid(match category.symbol_len() {
                    1 => "must be a single character",
                    _ => "must be exactly two characters",
                }));
            }
            if symbol.iter().any(|c| c.is_whitespace() || *c == SENTINEL) {
                return Err(invalid("must not contain whitespace"));
            }
            if symbol.len() == 2 && symbol[0] == symbol[1] {
                return Err(invalid("characters must differ"));
            }
        }

        let leading: Vec<char> = TriggerCategory::ALL
            .iter()
            .map(|c| self.leading_char(*c))
            .collect();
        for (i, a) in leading.iter().enumerate() {
            if leading[i + 1..].contains(a) {
                return Err(ConfigError::InvalidTrigger {
                    category: TriggerCategory::ALL[i].name().to_string(),
                    symbol: self.symbol(TriggerCategory::ALL[i]),
                    reason: format!("leading character '{a}' is shared with another trigger"),
                });
            }
        }
        Ok(())
    }
}

impl Default for Triggers {
    fn default() -> Self {
        Self {
            hashtag: Self::DEFAULT_HASHTAG.chars().collect(),
            at_mention: Self::DEFAULT_AT_MENTION.chars().collect(),
            relation: Self::DEFAULT_RELATION.chars().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_symbols() {
        let triggers = Triggers::default();
        assert_eq!(triggers.symbol(TriggerCategory::Hashtag), "#");
        assert_eq!(triggers.symbol(TriggerCategory::AtMention), "@");
        assert_eq!(triggers.symbol(TriggerCategory::Relation), "~>");
        assert_eq!(triggers.symbol_len(TriggerCategory::Relation), 2);
        assert_eq!(triggers.leading_char(TriggerCategory::Relation), '~');
    }

    #[test]
    fn test_match_symbol() {
        let triggers = Triggers::default();
        assert_eq!(triggers.match_symbol(&['#']), Some(TriggerCategory::Hashtag));
        assert_eq!(triggers.match_symbol(&['~', '>']), Some(TriggerCategory::Relation));
        assert_eq!(triggers.match_symbol(&['~']), None);
        assert_eq!(triggers.match_symbol(&['a', '#']), None);
    }

    #[test]
    fn test_contains_any_symbol() {
        let triggers = Triggers::default();
        let text: Vec<char> = "abc ~> x".chars().collect();
        assert!(triggers.contains_any_symbol(&text));
        let text: Vec<char> = "abc ~ >".chars().collect();
        assert!(!triggers.contains_any_symbol(&text));
    }

    #[test]
    fn test_ids_round_trip_through_lookup() {
        for category in TriggerCategory::ALL {
            assert_eq!(TriggerCategory::from_id(category.id()), Some(category));
            assert_eq!(TriggerCategory::from_name(category.name()), Some(category));
        }
        assert_eq!(TriggerCategory::from_id(9), None);
        assert_eq!(TriggerCategory::from_name("mention"), Some(TriggerCategory::AtMention));
    }

    #[test]
    fn test_rejects_bad_symbols() {
        assert!(Triggers::new("##", "@", "~>").is_err());
        assert!(Triggers::new("#", "@", "~").is_err());
        assert!(Triggers::new("#", "@", "~~").is_err());
        assert!(Triggers::new("#", " ", "~>").is_err());
        assert!(Triggers::new("#", "#", "~>").is_err());
        assert!(Triggers::new("#", "@", "#>").is_err());
        assert!(Triggers::new("$", "+", "=>").is_ok());
    }
}
