//! Book storage behind the [`BookRepository`] seam.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use super::models::Book;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("book store lock poisoned")]
    Poisoned,
    #[error("book id '{0}' already stored")]
    DuplicateId(String),
}

/// Ordered collection of books, unique by id.
pub trait BookRepository: Send + Sync {
    /// Append a book at the end of the collection.
    fn insert(&self, book: Book) -> Result<(), StoreError>;

    fn contains(&self, id: &str) -> Result<bool, StoreError>;

    fn get(&self, id: &str) -> Result<Option<Book>, StoreError>;

    /// Every book in insertion order.
    fn list(&self) -> Result<Vec<Book>, StoreError>;

    /// Edit a book in place under a single write guard, returning the result.
    fn modify(
        &self,
        id: &str,
        edit: &mut dyn FnMut(&mut Book),
    ) -> Result<Option<Book>, StoreError>;

    /// Remove a book, keeping the relative order of the rest.
    fn remove(&self, id: &str) -> Result<Option<Book>, StoreError>;

    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

#[derive(Default)]
struct Shelf {
    order: Vec<String>,
    records: HashMap<String, Book>,
}

/// Process-lifetime store; nothing survives a restart.
#[derive(Default)]
pub struct InMemoryBookRepository {
    shelf: RwLock<Shelf>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Shelf>, StoreError> {
        self.shelf.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Shelf>, StoreError> {
        self.shelf.write().map_err(|_| StoreError::Poisoned)
    }
}

impl BookRepository for InMemoryBookRepository {
    fn insert(&self, book: Book) -> Result<(), StoreError> {
        let mut shelf = self.write()?;
        if shelf.records.contains_key(&book.id) {
            return Err(StoreError::DuplicateId(book.id));
        }
        shelf.order.push(book.id.clone());
        shelf.records.insert(book.id.clone(), book);
        Ok(())
    }

    fn contains(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.read()?.records.contains_key(id))
    }

    fn get(&self, id: &str) -> Result<Option<Book>, StoreError> {
        Ok(self.read()?.records.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Book>, StoreError> {
        let shelf = self.read()?;
        Ok(shelf
            .order
            .iter()
            .filter_map(|id| shelf.records.get(id).cloned())
            .collect())
    }

    fn modify(
        &self,
        id: &str,
        edit: &mut dyn FnMut(&mut Book),
    ) -> Result<Option<Book>, StoreError> {
        let mut shelf = self.write()?;
        Ok(shelf.records.get_mut(id).map(|book| {
            edit(book);
            book.clone()
        }))
    }

    fn remove(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let mut shelf = self.write()?;
        let removed = shelf.records.remove(id);
        if removed.is_some() {
            shelf.order.retain(|stored| stored != id);
        }
        Ok(removed)
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.records.len())
    }
}
