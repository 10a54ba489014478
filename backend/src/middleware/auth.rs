//! Authentication middleware
//!
//! The console does not issue or verify tokens itself; the upstream API does.
//! This layer only requires a bearer token and hands it to the handlers so
//! it can be forwarded.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::error::AppError;

/// Bearer token of the current request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Reject requests without a non-empty `Authorization: Bearer` header and
/// store the token in the request extensions
pub async fn auth_middleware(mut request: Request, next: Next) -> Result<Response, AppError> {
    let token = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(AppError::MissingToken)?;

    request.extensions_mut().insert(BearerToken(token));

    Ok(next.run(request).await)
}

/// Extractor for the forwarded token
/// Use this in handlers behind [`auth_middleware`]
#[derive(Clone, Debug)]
pub struct CurrentToken(pub BearerToken);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<BearerToken>()
            .cloned()
            .map(CurrentToken)
            .ok_or(AppError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header::AUTHORIZATION, routing::get, Router};
    use tower::ServiceExt;

    async fn echo(CurrentToken(token): CurrentToken) -> String {
        token.as_str().to_string()
    }

    fn app() -> Router {
        Router::new()
            .route("/", get(echo))
            .route_layer(axum::middleware::from_fn(auth_middleware))
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let response = app()
            .oneshot(axum::http::Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_basic_auth_is_unauthorized() {
        let request = axum::http::Request::builder()
            .uri("/")
            .header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_reaches_handler() {
        let request = axum::http::Request::builder()
            .uri("/")
            .header(AUTHORIZATION, "Bearer abc.def")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"abc.def");
    }
}
