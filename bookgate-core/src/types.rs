//! Data model shared by the services

use serde::{Deserialize, Serialize};

/// Role given to users created on their first authenticated request
pub const DEFAULT_ROLE: &str = "user";

/// Role forced onto the bootstrap administrator
pub const ADMIN_ROLE: &str = "admin";

/// A row of the `users` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique email address
    pub email: String,
    /// Free-text role name
    pub role: String,
}

impl User {
    /// Create a user with the given role
    pub fn new(email: impl Into<String>, role: impl Into<String>) -> Self {
        User {
            email: email.into(),
            role: role.into(),
        }
    }
}

/// Outcome of the atomic lookup-or-create on `users`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredUser {
    /// The user as stored after the operation
    pub user: User,
    /// Whether this call inserted the row
    pub created: bool,
}

/// A row of the `books` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Store-assigned identity
    pub id: i64,
    /// Book title
    pub title: String,
    /// Book author
    pub author: String,
}

/// Body of `POST /books`. Absent fields bind as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewBook {
    /// Book title
    pub title: String,
    /// Book author
    pub author: String,
}

/// Body of `PUT /users/role`. Absent fields bind as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleUpdate {
    /// Email of the user to update
    pub email: String,
    /// New role
    pub role: String,
}
