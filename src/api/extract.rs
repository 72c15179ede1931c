//! Request extractors shared by the handlers.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::domain::OwnerId;
use crate::error::TrackerError;

/// Header carrying the authenticated caller's owner id.
pub const OWNER_HEADER: &str = "x-owner-id";

/// The owner on whose behalf a request runs, read from [`OWNER_HEADER`].
///
/// Authentication happens upstream; this only trusts the forwarded id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub OwnerId);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = TrackerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(OWNER_HEADER)
            .ok_or_else(|| TrackerError::MissingOwner(format!("missing {OWNER_HEADER} header")))?;
        let text = raw
            .to_str()
            .map_err(|_| TrackerError::MissingOwner(format!("{OWNER_HEADER} is not ASCII")))?;
        let uuid = uuid::Uuid::parse_str(text.trim())
            .map_err(|_| TrackerError::MissingOwner(format!("{OWNER_HEADER} is not a UUID")))?;
        Ok(Self(OwnerId::from_uuid(uuid)))
    }
}

/// JSON body extractor whose rejections (missing field, wrong type, bad
/// syntax, wrong content type) render as [`TrackerError::Validation`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = TrackerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| TrackerError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Query string extractor whose rejections render as
/// [`TrackerError::Validation`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = TrackerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| TrackerError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::api::dto::{CreateObservationRequest, StatsParams};
    use axum::body::Body;

    async fn extract(header: Option<&str>) -> Result<Caller, TrackerError> {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(OWNER_HEADER, value);
        }
        let Ok(request) = builder.body(()) else {
            panic!("request build failed");
        };
        let (mut parts, ()) = request.into_parts();
        Caller::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn reads_uuid_header() {
        let owner = OwnerId::new();
        let Ok(Caller(parsed)) = extract(Some(&owner.to_string())).await else {
            panic!("expected caller");
        };
        assert_eq!(parsed, owner);
    }

    #[tokio::test]
    async fn rejects_missing_or_malformed_header() {
        assert!(matches!(extract(None).await, Err(TrackerError::MissingOwner(_))));
        assert!(matches!(
            extract(Some("cow-42")).await,
            Err(TrackerError::MissingOwner(_))
        ));
    }

    #[tokio::test]
    async fn missing_body_field_is_a_validation_error() {
        let Ok(request) = axum::http::Request::builder()
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"notes":"no weight"}"#))
        else {
            panic!("request build failed");
        };
        let result = ApiJson::<CreateObservationRequest>::from_request(request, &()).await;
        assert!(matches!(result, Err(TrackerError::Validation(_))));
    }

    #[tokio::test]
    async fn malformed_query_is_a_validation_error() {
        let Ok(request) = axum::http::Request::builder().uri("/?period=abc").body(()) else {
            panic!("request build failed");
        };
        let (mut parts, ()) = request.into_parts();
        let result = ApiQuery::<StatsParams>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(TrackerError::Validation(_))));
    }
}
