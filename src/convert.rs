//! Conversion of raw API records into [`Item`]s with derived URLs and paths.

use crate::error::GistError;
use crate::options::Settings;
use crate::types::{File, Item, Items, RawItem};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width, in terminal columns, of a short id.
pub const ID_LENGTH: usize = 8;

/// Truncates `id` to [`ID_LENGTH`] display columns.
///
/// A wide glyph that would cross the limit is dropped entirely. Nothing is
/// appended to a truncated id.
pub fn shorten_id(id: &str) -> String {
    if UnicodeWidthStr::width(id) <= ID_LENGTH {
        return id.to_string();
    }
    let mut width = 0;
    let mut out = String::with_capacity(ID_LENGTH);
    for ch in id.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + w > ID_LENGTH {
            break;
        }
        width += w;
        out.push(ch);
    }
    out
}

/// Joins `id` onto the configured base URL as a trailing path segment.
pub fn item_url(settings: &Settings, id: &str) -> Result<String, GistError> {
    let mut url = settings.base_url.clone();
    url.path_segments_mut()
        .map_err(|_| GistError::InvalidUrl {
            url: settings.base_url.to_string(),
            reason: "cannot be used as a base".to_string(),
        })?
        .pop_if_empty()
        .push(id);
    Ok(url.to_string())
}

pub fn convert_item(raw: RawItem, settings: &Settings) -> Result<Item, GistError> {
    let url = item_url(settings, &raw.id)?;
    let path = settings.dir.join(&raw.id);
    let files = raw
        .files
        .into_iter()
        .map(|f| File {
            path: path.join(&f.filename),
            filename: f.filename,
            content: f.content,
        })
        .collect();
    let short_id = match raw.short_id {
        Some(short) if !short.is_empty() => short,
        _ => shorten_id(&raw.id),
    };
    Ok(Item {
        id: raw.id,
        short_id,
        description: raw.description,
        public: raw.public,
        files,
        url,
        path,
    })
}

/// Converts every record in order. Records sharing an id are all kept; use
/// [`Items::unique`] to collapse them.
pub fn convert_items(raws: Vec<RawItem>, settings: &Settings) -> Result<Items, GistError> {
    raws.into_iter()
        .map(|raw| convert_item(raw, settings))
        .collect()
}
