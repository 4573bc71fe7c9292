//! In-memory filtering of an already loaded title list.

use crate::types::{Title, TitleKind};

/// Case-insensitive name substring, optionally restricted to one kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleFilter {
    pub query: String,
    pub kind: Option<TitleKind>,
}

impl TitleFilter {
    pub fn new(query: &str, kind: Option<TitleKind>) -> Self {
        Self {
            query: query.to_string(),
            kind,
        }
    }

    pub fn matches(&self, title: &Title) -> bool {
        let name_matches = title
            .name_title
            .to_lowercase()
            .contains(&self.query.to_lowercase());
        name_matches && self.kind.map_or(true, |kind| title.title_kind == kind)
    }

    /// Matching titles, in their original order.
    pub fn apply<'a>(&self, titles: &'a [Title]) -> Vec<&'a Title> {
        titles.iter().filter(|title| self.matches(title)).collect()
    }
}
