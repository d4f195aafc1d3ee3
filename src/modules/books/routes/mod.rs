//! HTTP handlers for the books module.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookshelf_http::{ApiResponse, AppError};
use serde::Serialize;

use super::models::{Action, Book, BookPayload, BookQuery, BookSummary};
use super::service::BookService;

pub type SharedBooks = Arc<BookService>;

/// Routes relative to the module mount point.
pub fn router(service: SharedBooks) -> Router {
    Router::new()
        .route("/", get(list_books).post(add_book))
        .route(
            "/{book_id}",
            get(get_book).put(edit_book).delete(delete_book),
        )
        .with_state(service)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddedBook {
    book_id: String,
}

#[derive(Debug, Serialize)]
struct BookList {
    books: Vec<BookSummary>,
}

#[derive(Debug, Serialize)]
struct BookDetail {
    book: Book,
}

/// Unreadable bodies, queries, and paths get the same fail envelope as
/// validation errors.
fn read_payload(
    payload: Result<Json<BookPayload>, JsonRejection>,
    action: Action,
) -> Result<BookPayload, AppError> {
    payload
        .map(|Json(payload)| payload)
        .map_err(|rejection| {
            AppError::bad_request(format!("Gagal {} buku. {}", action, rejection.body_text()))
        })
}

fn read_query(query: Result<Query<BookQuery>, QueryRejection>) -> Result<BookQuery, AppError> {
    query
        .map(|Query(query)| query)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

fn read_id(path: Result<Path<String>, PathRejection>) -> Result<String, AppError> {
    path.map(|Path(book_id)| book_id)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

async fn add_book(
    State(books): State<SharedBooks>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<ApiResponse<AddedBook>, AppError> {
    let payload = read_payload(payload, Action::Add)?;
    let book_id = books.create(payload)?;

    Ok(ApiResponse::data(StatusCode::CREATED, AddedBook { book_id })
        .with_message("Buku berhasil ditambahkan"))
}

async fn list_books(
    State(books): State<SharedBooks>,
    query: Result<Query<BookQuery>, QueryRejection>,
) -> Result<ApiResponse<BookList>, AppError> {
    let query = read_query(query)?;
    let books = books.list(&query)?;
    Ok(ApiResponse::data(StatusCode::OK, BookList { books }))
}

async fn get_book(
    State(books): State<SharedBooks>,
    book_id: Result<Path<String>, PathRejection>,
) -> Result<ApiResponse<BookDetail>, AppError> {
    let book_id = read_id(book_id)?;
    let book = books.get(&book_id)?;
    Ok(ApiResponse::data(StatusCode::OK, BookDetail { book }))
}

async fn edit_book(
    State(books): State<SharedBooks>,
    book_id: Result<Path<String>, PathRejection>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<ApiResponse, AppError> {
    let book_id = read_id(book_id)?;
    let payload = read_payload(payload, Action::Update)?;
    books.update(&book_id, payload)?;
    Ok(ApiResponse::message(
        StatusCode::OK,
        "Buku berhasil diperbarui",
    ))
}

async fn delete_book(
    State(books): State<SharedBooks>,
    book_id: Result<Path<String>, PathRejection>,
) -> Result<ApiResponse, AppError> {
    let book_id = read_id(book_id)?;
    books.delete(&book_id)?;
    Ok(ApiResponse::message(StatusCode::OK, "Buku berhasil dihapus"))
}
