//! In-memory backend for development and tests

use super::{BookStore, Store, UserStore};
use crate::error::{Result, StoreError};
use crate::types::{Book, EnsuredUser, NewBook, User};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Store holding users and books in process memory
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, String>,
    books: RwLock<Vec<Book>>,
    closed: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of user rows
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Stored role for `email`, if any
    pub fn role_of(&self, email: &str) -> Option<String> {
        self.users.get(email).map(|role| role.value().clone())
    }

    /// Number of book rows
    pub fn book_count(&self) -> usize {
        self.books.read().len()
    }

    fn check_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable("store is closed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn ensure_user(&self, email: &str, default_role: &str) -> Result<EnsuredUser> {
        self.check_open()?;

        let (role, created) = match self.users.entry(email.to_string()) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => {
                entry.insert(default_role.to_string());
                (default_role.to_string(), true)
            }
        };

        Ok(EnsuredUser {
            user: User::new(email, role),
            created,
        })
    }

    async fn update_role(&self, email: &str, role: &str) -> Result<u64> {
        self.check_open()?;

        match self.users.get_mut(email) {
            Some(mut existing) => {
                *existing = role.to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.check_open()
    }

    async fn force_role(&self, email: &str, role: &str) -> Result<()> {
        self.check_open()?;
        self.users.insert(email.to_string(), role.to_string());
        Ok(())
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn list_books(&self) -> Result<Vec<Book>> {
        self.check_open()?;
        Ok(self.books.read().clone())
    }

    async fn create_book(&self, book: &NewBook) -> Result<()> {
        self.check_open()?;

        let mut books = self.books.write();
        let id = books.last().map_or(1, |last| last.id + 1);
        books.push(Book {
            id,
            title: book.title.clone(),
            author: book.author.clone(),
        });
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        self.check_open()
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
