//! The five bookshelf operations.
//!
//! Every operation validates its input fully before touching the repository,
//! so a rejected request never leaves a partial edit behind.

use std::sync::Arc;

use bookshelf_http::AppError;
use thiserror::Error;

use super::clock::{Clock, SystemClock};
use super::ids::{IdGenerator, RandomIdGenerator};
use super::models::{Action, Book, BookPayload, BookQuery, BookSummary, Violation};
use super::store::{BookRepository, InMemoryBookRepository, StoreError};

#[derive(Debug, Error)]
pub enum BookError {
    #[error("Gagal {action} buku. {violation}")]
    Validation { action: Action, violation: Violation },

    #[error("Buku tidak ditemukan")]
    NotFound,

    #[error("Gagal memperbarui buku. Id tidak ditemukan")]
    UpdateTargetMissing,

    #[error("Buku gagal dihapus. Id tidak ditemukan")]
    DeleteTargetMissing,

    /// The new record could not be stored or was not visible afterwards.
    #[error("Buku gagal ditambahkan")]
    NotStored { id: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        let message = err.to_string();
        match err {
            BookError::Validation { .. } => AppError::validation(message),
            BookError::NotFound
            | BookError::UpdateTargetMissing
            | BookError::DeleteTargetMissing => AppError::not_found(message),
            BookError::NotStored { .. } => AppError::internal(message),
            BookError::Store(source) => AppError::Unexpected(source.into()),
        }
    }
}

/// Book operations over an injected repository, id source, and clock.
pub struct BookService {
    repository: Arc<dyn BookRepository>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl BookService {
    pub fn new(
        repository: Arc<dyn BookRepository>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            ids,
            clock,
        }
    }

    /// Empty in-memory shelf with random ids and the system clock.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryBookRepository::new()),
            Arc::new(RandomIdGenerator::default()),
            Arc::new(SystemClock),
        )
    }

    pub fn repository(&self) -> &Arc<dyn BookRepository> {
        &self.repository
    }

    /// Store a new book and return its id.
    pub fn create(&self, payload: BookPayload) -> Result<String, BookError> {
        let draft = payload.validate(Action::Add)?;

        let id = self.ids.generate();
        let book = Book::new(id.clone(), draft, self.clock.now());

        match self.repository.insert(book) {
            Ok(()) => {}
            Err(StoreError::DuplicateId(id)) => {
                tracing::error!(book_id = %id, "generated book id collided with a stored book");
                return Err(BookError::NotStored { id });
            }
            Err(err) => return Err(err.into()),
        }

        // Invariant: a book is findable right after insertion. Nothing else
        // knows the id yet, so this only fails if the repository is broken.
        if !self.repository.contains(&id)? {
            tracing::error!(book_id = %id, "stored book not visible after insert");
            return Err(BookError::NotStored { id });
        }

        tracing::info!(book_id = %id, "book added");
        Ok(id)
    }

    /// Summaries of the books matching the query, in insertion order.
    pub fn list(&self, query: &BookQuery) -> Result<Vec<BookSummary>, BookError> {
        let filter = query.filter();
        tracing::debug!(?filter, "listing books");

        Ok(self
            .repository
            .list()?
            .iter()
            .filter(|book| filter.matches(book))
            .map(Book::summary_view)
            .collect())
    }

    pub fn get(&self, id: &str) -> Result<Book, BookError> {
        self.repository.get(id)?.ok_or(BookError::NotFound)
    }

    /// Replace every mutable field of a stored book.
    ///
    /// The payload is validated before the id is looked up.
    pub fn update(&self, id: &str, payload: BookPayload) -> Result<Book, BookError> {
        let draft = payload.validate(Action::Update)?;
        let now = self.clock.now();

        let mut draft = Some(draft);
        let updated = self.repository.modify(id, &mut |book: &mut Book| {
            if let Some(draft) = draft.take() {
                book.apply(draft, now);
            }
        })?;

        let book = updated.ok_or(BookError::UpdateTargetMissing)?;
        tracing::info!(book_id = %id, finished = book.finished, "book updated");
        Ok(book)
    }

    pub fn delete(&self, id: &str) -> Result<Book, BookError> {
        let removed = self
            .repository
            .remove(id)?
            .ok_or(BookError::DeleteTargetMissing)?;
        tracing::info!(book_id = %id, "book deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod testing {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    use time::{Duration, OffsetDateTime};

    use super::*;

    /// Ids `book-1`, `book-2`, ...
    #[derive(Default)]
    pub struct SequentialIds(AtomicU64);

    impl IdGenerator for SequentialIds {
        fn generate(&self) -> String {
            format!("book-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    /// Ticks one second forward on every read.
    pub struct SteppingClock {
        start: OffsetDateTime,
        ticks: AtomicU64,
    }

    impl SteppingClock {
        pub fn new(start: OffsetDateTime) -> Self {
            Self {
                start,
                ticks: AtomicU64::new(0),
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> OffsetDateTime {
            let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
            self.start + Duration::seconds(tick as i64)
        }
    }

    pub fn service() -> BookService {
        BookService::new(
            Arc::new(InMemoryBookRepository::new()),
            Arc::new(SequentialIds::default()),
            Arc::new(SteppingClock::new(time::macros::datetime!(2024-01-01 00:00 UTC))),
        )
    }
}
