//! Suggestion list projection
//!
//! Maps candidate records onto display rows. A row carries the category
//! symbol, the field to show (and insert on selection), and how many leading
//! characters of the field matched the query so the host can embolden them.

use super::category::TriggerCategory;
use super::provider::CandidateRecord;

/// How a piece of a rendered row should be styled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    /// Regular weight
    Normal,
    /// Matched prefix
    Bold,
}

/// One display row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionItem {
    /// Category the row belongs to
    pub category: TriggerCategory,
    /// Trigger symbol of the category
    pub symbol: String,
    /// Field shown and inserted
    pub field: String,
    /// Number of leading field characters to embolden
    pub highlight_length: usize,
}

impl SuggestionItem {
    /// Project a candidate record.
    ///
    /// Relation rows show the record's related metadata (or its value when it
    /// has none); all other rows show the value.
    ///
    /// # Arguments
    /// * `symbol` - Trigger symbol of `record.category`
    /// * `query` - Query text that produced the match
    /// * `record` - Candidate record
    pub fn from_record(symbol: &str, query: &str, record: &CandidateRecord) -> Self {
        let field = match record.category {
            TriggerCategory::Relation => record
                .related_metadata
                .clone()
                .unwrap_or_else(|| record.value.clone()),
            _ => record.value.clone(),
        };

        Self {
            category: record.category,
            symbol: symbol.to_string(),
            field,
            highlight_length: query.chars().count(),
        }
    }

    /// Text that replaces the in-progress token when this row is picked
    pub fn replacement(&self) -> String {
        format!("{}{}", self.symbol, self.field)
    }

    /// Row split into styled segments.
    ///
    /// Only hashtag rows repeat their symbol; the bold prefix never runs past
    /// the end of the field.
    pub fn segments(&self) -> Vec<(String, Emphasis)> {
        let mut segments = Vec::with_capacity(3);
        if self.category == TriggerCategory::Hashtag {
            segments.push((self.symbol.clone(), Emphasis::Normal));
        }

        let bold: String = self.field.chars().take(self.highlight_length).collect();
        let rest: String = self.field.chars().skip(self.highlight_length).collect();
        if !bold.is_empty() {
            segments.push((bold, Emphasis::Bold));
        }
        if !rest.is_empty() {
            segments.push((rest, Emphasis::Normal));
        }
        segments
    }
}

/// Rows currently offered to the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionList {
    items: Vec<SuggestionItem>,
    query: Option<String>,
}

impl SuggestionList {
    /// Build the list for one query result
    ///
    /// # Arguments
    /// * `symbol` - Trigger symbol of the queried category
    /// * `query` - Query text
    /// * `records` - Provider results, in provider order
    /// * `max_rows` - Row cap
    pub fn project(symbol: &str, query: &str, records: &[CandidateRecord], max_rows: usize) -> Self {
        Self {
            items: records
                .iter()
                .take(max_rows)
                .map(|record| SuggestionItem::from_record(symbol, query, record))
                .collect(),
            query: Some(query.to_string()),
        }
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.items.len()
    }

    /// Row at `index`
    pub fn row(&self, index: usize) -> Option<&SuggestionItem> {
        self.items.get(index)
    }

    /// All rows
    pub fn rows(&self) -> &[SuggestionItem] {
        &self.items
    }

    /// Query that produced the rows
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Check if there are no rows
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop all rows
    pub fn clear(&mut self) {
        self.items.clear();
        self.query = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_highlight_length() {
        let records = vec![
            CandidateRecord::new(TriggerCategory::Hashtag, "idea"),
            CandidateRecord::new(TriggerCategory::Hashtag, "idle"),
        ];
        let list = SuggestionList::project("#", "id", &records, 10);

        assert_eq!(list.row_count(), 2);
        assert!(list.rows().iter().all(|row| row.highlight_length == 2));
        assert_eq!(list.row(1).unwrap().field, "idle");
        assert_eq!(list.query(), Some("id"));
        assert!(list.row(2).is_none());
    }

    #[test]
    fn test_relation_row_shows_metadata() {
        let record = CandidateRecord::new(TriggerCategory::Relation, "foods")
            .with_metadata("foodslists.tk - Google doc of foods people eat");
        let item = SuggestionItem::from_record("~>", "foods", &record);
        assert_eq!(item.field, "foodslists.tk - Google doc of foods people eat");
        assert_eq!(
            item.replacement(),
            "~>foodslists.tk - Google doc of foods people eat"
        );

        let bare = CandidateRecord::new(TriggerCategory::Relation, "notes");
        assert_eq!(SuggestionItem::from_record("~>", "notes", &bare).field, "notes");
    }

    #[test]
    fn test_segments() {
        let record = CandidateRecord::new(TriggerCategory::Hashtag, "idea");
        let item = SuggestionItem::from_record("#", "id", &record);
        assert_eq!(
            item.segments(),
            vec![
                ("#".to_string(), Emphasis::Normal),
                ("id".to_string(), Emphasis::Bold),
                ("ea".to_string(), Emphasis::Normal),
            ]
        );

        let record = CandidateRecord::new(TriggerCategory::AtMention, "Ada");
        let item = SuggestionItem::from_record("@", "Ada Lovelace", &record);
        assert_eq!(item.segments(), vec![("Ada".to_string(), Emphasis::Bold)]);
    }

    #[test]
    fn test_row_cap_and_clear() {
        let records: Vec<CandidateRecord> = (0..5)
            .map(|i| CandidateRecord::new(TriggerCategory::Hashtag, format!("t{i}")))
            .collect();
        let mut list = SuggestionList::project("#", "t", &records, 3);
        assert_eq!(list.row_count(), 3);

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.query(), None);
    }
}
