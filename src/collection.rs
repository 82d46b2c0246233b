use crate::types::{Item, Items};
use std::collections::HashSet;

impl Items {
    /// Keeps the first item seen for each id, in order of first occurrence.
    pub fn unique(&self) -> Items {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.len());
        self.iter()
            .filter(|item| seen.insert(item.id.as_str()))
            .cloned()
            .collect()
    }

    pub fn filter(&self, pred: impl Fn(&Item) -> bool) -> Items {
        self.iter().filter(|item| pred(item)).cloned().collect()
    }

    /// First item, or an empty [`Item`] when there is none.
    pub fn one(&self) -> Item {
        self.first().cloned().unwrap_or_default()
    }
}
