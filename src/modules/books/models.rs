use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;
use time::OffsetDateTime;

use super::lenient;
use super::service::BookError;

/// A book record as stored on the shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Server-generated identifier, immutable once assigned
    pub id: String,
    pub name: String,
    pub year: Option<Number>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    /// Total number of pages
    pub page_count: Option<Number>,
    /// Pages read so far, never above `page_count`
    pub read_page: Option<Number>,
    /// Whether the book is currently being read
    pub reading: bool,
    /// Derived from `read_page == page_count`
    pub finished: bool,
    #[serde(with = "crate::modules::books::clock::iso_millis")]
    pub inserted_at: OffsetDateTime,
    #[serde(with = "crate::modules::books::clock::iso_millis")]
    pub updated_at: OffsetDateTime,
}

impl Book {
    /// Build a fresh record from a validated draft.
    pub fn new(id: String, draft: BookDraft, now: OffsetDateTime) -> Self {
        let finished = draft.is_finished();
        Self {
            id,
            name: draft.name,
            year: draft.year,
            author: draft.author,
            summary: draft.summary,
            publisher: draft.publisher,
            page_count: draft.page_count,
            read_page: draft.read_page,
            reading: draft.reading,
            finished,
            inserted_at: now,
            updated_at: now,
        }
    }

    /// Replace every mutable field, keeping `id` and `inserted_at`.
    pub fn apply(&mut self, draft: BookDraft, now: OffsetDateTime) {
        self.finished = draft.is_finished();
        self.name = draft.name;
        self.year = draft.year;
        self.author = draft.author;
        self.summary = draft.summary;
        self.publisher = draft.publisher;
        self.page_count = draft.page_count;
        self.read_page = draft.read_page;
        self.reading = draft.reading;
        self.updated_at = now;
    }

    pub fn summary_view(&self) -> BookSummary {
        BookSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            publisher: self.publisher.clone(),
        }
    }
}

/// Reduced view used by list results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
    pub id: String,
    pub name: String,
    pub publisher: Option<String>,
}

/// Request body for creating or replacing a book.
///
/// Every field decodes from any JSON value. Numbers may be integers or
/// floats; a non-numeric value counts as absent. Any other mistyped field is
/// coerced, so validation always decides the outcome.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookPayload {
    #[serde(deserialize_with = "lenient::name")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub year: Option<Number>,
    #[serde(deserialize_with = "lenient::text")]
    pub author: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub summary: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub publisher: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub page_count: Option<Number>,
    #[serde(deserialize_with = "lenient::number")]
    pub read_page: Option<Number>,
    #[serde(deserialize_with = "lenient::flag")]
    pub reading: bool,
}

impl BookPayload {
    /// Check the payload and turn it into a draft that is safe to store.
    ///
    /// The name is checked before the page invariant.
    pub fn validate(self, action: Action) -> Result<BookDraft, BookError> {
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(BookError::Validation {
                    action,
                    violation: Violation::MissingName,
                })
            }
        };

        if let (Some(read_page), Some(page_count)) = (&self.read_page, &self.page_count) {
            if lenient::numeric(read_page) > lenient::numeric(page_count) {
                return Err(BookError::Validation {
                    action,
                    violation: Violation::ReadPageExceedsPageCount,
                });
            }
        }

        Ok(BookDraft {
            name,
            year: self.year,
            author: self.author,
            summary: self.summary,
            publisher: self.publisher,
            page_count: self.page_count,
            read_page: self.read_page,
            reading: self.reading,
        })
    }
}

/// A payload that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    pub name: String,
    pub year: Option<Number>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: Option<Number>,
    pub read_page: Option<Number>,
    pub reading: bool,
}

impl BookDraft {
    /// Equal page numbers, or both left out.
    fn is_finished(&self) -> bool {
        match (&self.read_page, &self.page_count) {
            (Some(read_page), Some(page_count)) => {
                lenient::numeric(read_page) == lenient::numeric(page_count)
            }
            (None, None) => true,
            _ => false,
        }
    }
}

/// Mutation a payload is validated for; selects the failure wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Update,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Add => f.write_str("menambahkan"),
            Action::Update => f.write_str("memperbarui"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    MissingName,
    ReadPageExceedsPageCount,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingName => f.write_str("Mohon isi nama buku"),
            Violation::ReadPageExceedsPageCount => {
                f.write_str("readPage tidak boleh lebih besar dari pageCount")
            }
        }
    }
}

/// Raw list query string, `?name=&reading=&finished=`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookQuery {
    pub name: Option<String>,
    pub reading: Option<String>,
    pub finished: Option<String>,
}

impl BookQuery {
    /// Resolve the single filter to apply.
    ///
    /// Only the first non-empty parameter counts, in the order name, reading,
    /// finished.
    pub fn filter(&self) -> BookFilter {
        fn present(value: &Option<String>) -> Option<&str> {
            value.as_deref().filter(|v| !v.is_empty())
        }

        if let Some(name) = present(&self.name) {
            BookFilter::Name(name.to_lowercase())
        } else if let Some(reading) = present(&self.reading) {
            BookFilter::Reading(parse_flag(reading))
        } else if let Some(finished) = present(&self.finished) {
            BookFilter::Finished(parse_flag(finished))
        } else {
            BookFilter::All
        }
    }
}

/// List filter; a `None` flag came from a value that is not a boolean and
/// matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookFilter {
    All,
    /// Lowercased needle for a case-insensitive substring match
    Name(String),
    Reading(Option<bool>),
    Finished(Option<bool>),
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            BookFilter::All => true,
            BookFilter::Name(needle) => book.name.to_lowercase().contains(needle.as_str()),
            BookFilter::Reading(flag) => *flag == Some(book.reading),
            BookFilter::Finished(flag) => *flag == Some(book.finished),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}
