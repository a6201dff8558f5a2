//! Book resource handlers

use crate::api::MessageResponse;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::trust::TrustedIdentity;
use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use bookgate_core::{Book, BookStore, NewBook};
use tracing::info;

/// List every book (`GET /books`)
pub async fn list_books(
    State(state): State<AppState>,
    identity: TrustedIdentity,
) -> ApiResult<Json<Vec<Book>>> {
    info!(
        user_email = identity.email_or_empty(),
        user_role = identity.role_or_empty(),
        "Listing books"
    );

    let books = state
        .store
        .list_books()
        .await
        .map_err(|e| ApiError::store("Failed to fetch books", e))?;

    Ok(Json(books))
}

/// Add a book (`POST /books`)
pub async fn create_book(
    State(state): State<AppState>,
    identity: TrustedIdentity,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let book: NewBook = serde_json::from_slice(&body)?;

    state
        .store
        .create_book(&book)
        .await
        .map_err(|e| ApiError::store("Failed to add book", e))?;

    info!(
        user_email = identity.email_or_empty(),
        title = %book.title,
        author = %book.author,
        "Book added"
    );
    crate::metrics::record_book_created();

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Book added successfully")),
    ))
}
