//! Column templates for the selector screen.
//!
//! A column is text with `{{.Field}}` actions. Columns are joined with a tab
//! and expanded once per file of every item.

use crate::types::{Item, Items, Row};
use unicode_width::UnicodeWidthStr;

const DEFAULT_COLUMN: &str = "{{.ID}}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    ShortId,
    Description,
    Filename,
    PrivateMark,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "ID" => Some(Field::Id),
            "ShortID" => Some(Field::ShortId),
            "Description" => Some(Field::Description),
            "Filename" => Some(Field::Filename),
            "PrivateMark" => Some(Field::PrivateMark),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field(Field),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TemplateError {
    Unclosed(usize),
    BadAction(String),
    UnknownField(String),
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::Unclosed(at) => write!(f, "unclosed action at byte {}", at),
            TemplateError::BadAction(a) => write!(f, "unsupported action '{}'", a),
            TemplateError::UnknownField(n) => write!(f, "unknown field '{}'", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub(crate) fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;
        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }
            let after = &rest[start + 2..];
            let end = after
                .find("}}")
                .ok_or(TemplateError::Unclosed(offset + start))?;
            let action = after[..end].trim();
            let name = action
                .strip_prefix('.')
                .ok_or_else(|| TemplateError::BadAction(action.to_string()))?;
            let field =
                Field::from_name(name).ok_or_else(|| TemplateError::UnknownField(name.to_string()))?;
            segments.push(Segment::Field(field));
            let consumed = start + 2 + end + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }
        Ok(Self { segments })
    }

    fn execute(&self, item: &Item, filename: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field(Field::Id) => out.push_str(&single_line(&item.id)),
                Segment::Field(Field::ShortId) => out.push_str(&single_line(&item.short_id)),
                Segment::Field(Field::Description) => {
                    out.push_str(&single_line(&item.description))
                }
                Segment::Field(Field::Filename) => out.push_str(filename),
                Segment::Field(Field::PrivateMark) => {
                    out.push_str(if item.public { " " } else { "*" })
                }
            }
        }
        out
    }
}

/// Field values must not break a row into several selector lines or add
/// columns.
fn single_line(s: &str) -> String {
    s.replace(['\n', '\r', '\t'], " ")
}

fn pad_right(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    if w >= width {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + width - w);
    out.push_str(s);
    out.extend(std::iter::repeat_n(' ', width - w));
    out
}

impl Items {
    /// Renders one line per file across all items.
    ///
    /// An empty `columns` renders the id alone. A malformed template renders
    /// nothing at all, so an empty result means "nothing to display".
    pub fn render(&self, columns: &[String]) -> Vec<String> {
        let format = if columns.is_empty() {
            DEFAULT_COLUMN.to_string()
        } else {
            columns.join("\t")
        };
        let template = match Template::parse(&format) {
            Ok(t) => t,
            Err(_e) => {
                #[cfg(feature = "logging")]
                tracing::debug!("Invalid column template {:?}: {}", format, _e);
                return Vec::new();
            }
        };
        let width = self
            .iter()
            .flat_map(|item| item.files.iter())
            .map(|f| UnicodeWidthStr::width(single_line(&f.filename).as_str()))
            .max()
            .unwrap_or(0);
        let mut lines = Vec::new();
        for item in self.iter() {
            for file in &item.files {
                let filename = pad_right(&single_line(&file.filename), width);
                lines.push(template.execute(item, &filename));
            }
        }
        lines
    }

    /// Rows in the same order as the lines of [`Items::render`].
    pub fn rows(&self) -> Vec<Row> {
        self.iter()
            .flat_map(|item| {
                item.files.iter().map(move |file| Row {
                    item: item.clone(),
                    file: file.clone(),
                })
            })
            .collect()
    }
}
