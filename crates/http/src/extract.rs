//! Request body extractor accepting JSON or URL-encoded forms.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::de::DeserializeOwned;

/// Request body read the way a JSON + urlencoded body parser pair reads it.
///
/// - `application/x-www-form-urlencoded` goes through axum's `Form`.
/// - `application/json` goes through axum's `Json` rules, except that an
///   empty body reads as `{}`.
/// - Any other or missing content type leaves the body unread and reads as `{}`.
///
/// Malformed JSON is a 400. A value that does not fit `T` is a 422.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";
const EMPTY_OBJECT: &[u8] = b"{}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Skipped,
}

fn body_kind(req: &Request) -> BodyKind {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_ascii_lowercase());

    match content_type {
        Some(value) if value.starts_with(FORM_CONTENT_TYPE) => BodyKind::Form,
        Some(value) if value.starts_with(JSON_CONTENT_TYPE) => BodyKind::Json,
        _ => BodyKind::Skipped,
    }
}

fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Response> {
    let bytes = if bytes.iter().all(u8::is_ascii_whitespace) {
        EMPTY_OBJECT
    } else {
        bytes
    };
    Json::<T>::from_bytes(bytes)
        .map(|Json(value)| value)
        .map_err(IntoResponse::into_response)
}

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match body_kind(&req) {
            BodyKind::Form => {
                let Form(value) = Form::<T>::from_request(req, state)
                    .await
                    .map_err(IntoResponse::into_response)?;
                Ok(Self(value))
            }
            BodyKind::Json => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(IntoResponse::into_response)?;
                from_json_bytes(&bytes).map(Self)
            }
            BodyKind::Skipped => from_json_bytes(EMPTY_OBJECT).map(Self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http, http::StatusCode, routing::post, Router};
    use serde::Deserialize;
    use serde_json::Value;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Echo {
        name: String,
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/echo",
                post(|Payload(echo): Payload<Echo>| async move { echo.name }),
            )
            .route(
                "/raw",
                post(|Payload(value): Payload<Value>| async move { value.to_string() }),
            )
    }

    async fn send(
        uri: &str,
        content_type: Option<&str>,
        body: &'static str,
    ) -> (StatusCode, String) {
        let mut request = http::Request::builder().method("POST").uri(uri);
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }

        let response = app()
            .oneshot(request.body(Body::from(body)).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn reads_json() {
        let (status, body) = send("/echo", Some("application/json"), r#"{"name":"dune"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "dune");
    }

    #[tokio::test]
    async fn reads_urlencoded_form() {
        let (status, body) = send(
            "/echo",
            Some("application/x-www-form-urlencoded; charset=utf-8"),
            "name=dune+messiah",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "dune messiah");
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let (status, _) = send("/raw", Some("application/json"), "{\"name\":").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn json_of_the_wrong_shape_is_unprocessable() {
        let (status, _) = send("/echo", Some("application/json"), r#"{"name":5}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn empty_json_body_reads_as_empty_object() {
        let (status, body) = send("/raw", Some("application/json"), "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "{}");
    }

    #[tokio::test]
    async fn foreign_content_type_skips_the_body() {
        let (status, body) = send("/raw", Some("text/plain"), "name=dune").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "{}");
    }

    #[tokio::test]
    async fn missing_content_type_skips_the_body() {
        let (status, body) = send("/raw", None, r#"{"name":"dune"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "{}");
    }
}
