//! HTTP handlers for `/api/books`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use bookmanager_http::error::AppError;

use super::models::{Book, BookPayload};
use super::service::BookService;

pub const BOOK_NOT_FOUND: &str = "Book Not Found";
pub const BOOK_DELETED: &str = "Book Deleted Successfully";

/// Routes relative to the module mount point
pub fn router(service: Arc<BookService>) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{id}",
            get(get_book_by_id)
                .put(update_book_by_id)
                .delete(delete_book),
        )
        .with_state(service)
}

fn book_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| AppError::validation([format!("id: {}", rejection.body_text())]))
}

/// Deserialize and validate the request body into an unsaved book
fn book_from_body(payload: Result<Json<BookPayload>, JsonRejection>) -> Result<Book, AppError> {
    let Json(payload) = payload
        .map_err(|rejection| AppError::validation([format!("body: {}", rejection.body_text())]))?;

    payload
        .into_book()
        .map_err(|violations| AppError::validation(violations.iter().map(ToString::to_string)))
}

async fn create_book(
    State(service): State<Arc<BookService>>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let book = book_from_body(payload)?;
    let created = service.save_book(book).await?;

    tracing::info!(book_id = ?created.id, "book created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_books(
    State(service): State<Arc<BookService>>,
) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(service.get_all_books().await?))
}

async fn get_book_by_id(
    State(service): State<Arc<BookService>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Book>, AppError> {
    let id = book_id(path)?;

    service
        .get_book_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(BOOK_NOT_FOUND))
}

/// Full replacement; the id comes from the path. Absent ids are created, not rejected.
async fn update_book_by_id(
    State(service): State<Arc<BookService>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let id = book_id(path)?;
    let book = book_from_body(payload)?;
    let updated = service.update_book_by_id(id, book).await?;

    tracing::info!(book_id = id, "book updated");
    Ok(Json(updated))
}

async fn delete_book(
    State(service): State<Arc<BookService>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<&'static str, AppError> {
    let id = book_id(path)?;

    if service.get_book_by_id(id).await?.is_none() {
        return Err(AppError::not_found(BOOK_NOT_FOUND));
    }
    service.delete_book(id).await?;

    tracing::info!(book_id = id, "book deleted");
    Ok(BOOK_DELETED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::repository::tests::memory_pool;
    use crate::modules::books::repository::{BookRepository, SqliteBookRepository};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use bookmanager_http::ErrorBody;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app() -> Router {
        let repo = SqliteBookRepository::new(memory_pool().await);
        router(Arc::new(BookService::new(Arc::new(repo))))
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    /// Every call fails the way a lost database connection would
    struct UnavailableRepository;

    #[async_trait]
    impl BookRepository for UnavailableRepository {
        async fn save(&self, _book: Book) -> anyhow::Result<Book> {
            Err(anyhow::anyhow!("connection refused").context("failed to save book"))
        }

        async fn find_all(&self) -> anyhow::Result<Vec<Book>> {
            Err(anyhow::anyhow!("connection refused").context("failed to list books"))
        }

        async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Book>> {
            Err(anyhow::anyhow!("connection refused").context(format!("failed to load book {id}")))
        }

        async fn delete_by_id(&self, id: i64) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("connection refused").context(format!("failed to delete book {id}")))
        }
    }

    fn sample() -> Value {
        json!({
            "title": "Test Book",
            "author": "Author",
            "publishedDate": "2024-01-01",
            "isbn": "9781234567890",
            "price": 19.99
        })
    }

    #[tokio::test]
    async fn create_ignores_client_id_and_returns_201() {
        let router = app().await;
        let mut payload = sample();
        payload["id"] = json!(500);

        let (status, body) = send(&router, "POST", "/", Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED);
        let book: Book = serde_json::from_slice(&body).unwrap();
        assert_ne!(book.id, Some(500));
        assert_eq!(book.isbn, "9781234567890");
    }

    #[tokio::test]
    async fn get_missing_book_is_not_found() {
        let router = app().await;

        let (status, body) = send(&router, "GET", "/12", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let error: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.message, "Entity not found: Book Not Found");
        assert_eq!(error.error_code, "404 NOT_FOUND");
    }

    #[tokio::test]
    async fn non_numeric_id_is_a_validation_failure() {
        let router = app().await;

        let (status, body) = send(&router, "GET", "/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert!(error.message.starts_with("Validation failed: id: "));
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_failure() {
        let router = app().await;
        let request = Request::post("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wrong_field_type_is_a_validation_failure() {
        let router = app().await;
        let mut payload = sample();
        payload["publishedDate"] = json!("yesterday");

        let (status, body) = send(&router, "POST", "/", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert!(error.message.starts_with("Validation failed: body: "));
        assert_eq!(error.error_code, "400 BAD_REQUEST");
    }

    #[tokio::test]
    async fn delete_returns_plain_text_confirmation() {
        let router = app().await;
        let (_, body) = send(&router, "POST", "/", Some(sample())).await;
        let id = serde_json::from_slice::<Book>(&body).unwrap().id.unwrap();

        let (status, body) = send(&router, "DELETE", &format!("/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, BOOK_DELETED.as_bytes());
    }

    #[tokio::test]
    async fn storage_failure_is_an_internal_error() {
        let router = router(Arc::new(BookService::new(Arc::new(UnavailableRepository))));

        let (status, body) = send(&router, "GET", "/", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.message, "Internal server error: failed to list books");
        assert_eq!(error.error_code, "500 INTERNAL_SERVER_ERROR");

        let (status, body) = send(&router, "DELETE", "/3", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert!(error.message.starts_with("Internal server error: "));
        assert!(!error.message.contains("connection refused"));
    }
}
