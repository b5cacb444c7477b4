//! HTTP handlers for the books module.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header::HeaderName, HeaderValue, StatusCode},
    routing::{get, put},
    Json, Router,
};
use bookshelf_http::{router::TOTAL_COUNT_HEADER, AppError, AppResult};

use super::models::{Book, BookStats, CreateBook, UpdateBook, UpdateBookRequest};
use super::query::{ListParams, RawListParams};
use super::store::BookStore;

/// Build the books router over `store`.
pub fn router(store: Arc<BookStore>) -> Router {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route("/books/stats", get(book_stats))
        .route("/books/{id}", put(update_book).delete(delete_book))
        .with_state(store)
}

async fn create_book(
    State(store): State<Arc<BookStore>>,
    payload: Result<Json<CreateBook>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let Json(input) = payload?;
    let book = store.create(input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn list_books(
    State(store): State<Arc<BookStore>>,
    query: Result<Query<RawListParams>, QueryRejection>,
) -> ([(HeaderName, HeaderValue); 1], Json<Vec<Book>>) {
    // Unreadable query strings are treated like an empty one.
    let raw = match query {
        Ok(Query(raw)) => raw,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "ignoring malformed list query");
            RawListParams::default()
        }
    };

    let params = ListParams::from_raw(&raw);
    let page = store.list(&params).await;

    (
        [(
            HeaderName::from_static(TOTAL_COUNT_HEADER),
            HeaderValue::from(page.total),
        )],
        Json(page.items),
    )
}

/// Resolve the `{id}` segment. Non-integers are rejected; negative integers
/// name no book.
fn book_id(id: Result<Path<i64>, PathRejection>) -> AppResult<u64> {
    let Path(id) = id?;
    u64::try_from(id).map_err(|_| AppError::not_found(format!("book {id} not found")))
}

async fn update_book(
    State(store): State<Arc<BookStore>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateBookRequest>, JsonRejection>,
) -> AppResult<Json<Book>> {
    let id = book_id(id)?;
    let Json(request) = payload?;
    let update = UpdateBook::try_from(request)?;

    let book = store.update(id, update).await?;
    Ok(Json(book))
}

async fn delete_book(
    State(store): State<Arc<BookStore>>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let id = book_id(id)?;
    store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn book_stats(State(store): State<Arc<BookStore>>) -> Json<BookStats> {
    Json(store.stats().await)
}
