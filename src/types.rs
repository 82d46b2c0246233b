use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::path::PathBuf;

/// A gist as listed by the remote API, before local paths are derived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    pub id: String,
    /// Display id; derived from `id` when the listing does not carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_id: Option<String>,
    #[serde(default)]
    pub description: String,
    pub public: bool,
    /// Files in remote order.
    #[serde(default)]
    pub files: Vec<RawFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFile {
    pub filename: String,
    #[serde(default)]
    pub content: String,
}

/// One gist with its canonical URL and local mirror directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: String,
    pub short_id: String,
    pub description: String,
    pub public: bool,
    pub files: Files,
    /// Base URL joined with `id`.
    pub url: String,
    /// Mirror root joined with `id`.
    pub path: PathBuf,
}

/// One file of a gist.
///
/// `content` is whatever the API returned; whether `path` exists on disk is a
/// separate question answered by [`File::exists`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct File {
    pub filename: String,
    pub content: String,
    /// `Item::path` joined with `filename`.
    pub path: PathBuf,
}

pub type Files = Vec<File>;

/// Ordered collection of items. Order is the remote listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Items(Vec<Item>);

impl Items {
    pub fn new(items: Vec<Item>) -> Self {
        Self(items)
    }
    pub fn into_vec(self) -> Vec<Item> {
        self.0
    }
}

impl Deref for Items {
    type Target = [Item];
    fn deref(&self) -> &[Item] {
        &self.0
    }
}

impl From<Vec<Item>> for Items {
    fn from(items: Vec<Item>) -> Self {
        Self(items)
    }
}

impl FromIterator<Item> for Items {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Items {
    type Item = Item;
    type IntoIter = std::vec::IntoIter<Item>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Items {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A selectable line: one file of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub item: Item,
    pub file: File,
}

impl Row {
    pub fn url(&self) -> &str {
        &self.item.url
    }
}
