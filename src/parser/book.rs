use indexmap::{IndexMap, IndexSet};

use super::normalize::normalize;

/// Unique normalized blocks of one book, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookRecord {
    blocks: IndexSet<String>,
}

impl BookRecord {
    /// Normalizes `text` and appends it unless an equal block is already
    /// present. Existing blocks never move. Returns true when added.
    pub fn insert(&mut self, text: &str) -> bool {
        self.blocks.insert(normalize(text))
    }

    pub fn blocks(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }
}

/// Raw header → record, in the order headers first appear in the input.
/// Headers are compared verbatim; two spellings of one book stay separate.
#[derive(Debug, Clone, Default)]
pub struct Books {
    records: IndexMap<String, BookRecord>,
}

impl Books {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, header: &str, block: &str) -> bool {
        self.records
            .entry(header.to_string())
            .or_default()
            .insert(block)
    }

    pub fn get(&self, header: &str) -> Option<&BookRecord> {
        self.records.get(header)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BookRecord)> {
        self.records.iter().map(|(h, r)| (h.as_str(), r))
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl IntoIterator for Books {
    type Item = (String, BookRecord);
    type IntoIter = indexmap::map::IntoIter<String, BookRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
