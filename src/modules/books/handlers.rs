//! Book endpoints. Every handler answers with mock data.

use axum::{extract::Path, http::StatusCode, Json};
use serde_json::Value;
use shelf_http::Payload;

use super::models::{Book, PostBook};

/// `GET /books`
pub async fn list_books() -> Json<Vec<Book>> {
    Json(Vec::new())
}

/// `GET /books/{id}`
pub async fn get_book(Path(id): Path<String>) -> Json<Book> {
    tracing::debug!(%id, "get book");
    Json(Book::mock())
}

/// `POST /books`
///
/// Every body is accepted apart from malformed JSON, and the response never
/// depends on it. Bodies without a JSON or form content type are not read.
pub async fn create_book(Payload(body): Payload<Value>) -> (StatusCode, Json<Book>) {
    let conforms = PostBook::from_value(&body)
        .and_then(|book| book.validate())
        .is_ok();
    tracing::debug!(conforms, "create book");

    (StatusCode::CREATED, Json(Book::mock()))
}

/// `DELETE /books/{id}`
pub async fn delete_book(Path(id): Path<String>) -> StatusCode {
    tracing::debug!(%id, "delete book");
    StatusCode::NO_CONTENT
}
