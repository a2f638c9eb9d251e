use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query, Request,
    },
    http::{request::Parts, Uri},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::Validate;

use crate::config::AppConfig;
use crate::dto::PageQuery;
use crate::errors::ServiceError;

/// JSON body whose rejections render as the uniform 400 envelope instead of
/// axum's plain-text body.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                ServiceError::ValidationError(rejection.body_text())
            })?;
        Ok(Self(value))
    }
}

/// [`JsonBody`] that also runs the `validator` rules of `T`.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let JsonBody(value) = JsonBody::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Query string whose rejections render as the 400 envelope.
pub struct QueryParams<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| {
                ServiceError::ValidationError(rejection.body_text())
            })?;
        Ok(Self(value))
    }
}

/// Path segment(s) whose rejections render as the 400 envelope.
pub struct PathParam<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: PathRejection| {
                ServiceError::ValidationError(rejection.body_text())
            })?;
        Ok(Self(value))
    }
}

/// Answers paths no route matches with the 404 envelope.
pub async fn route_not_found(uri: Uri) -> ServiceError {
    debug!(path = %uri.path(), "no route matched");
    ServiceError::not_found("Route")
}

/// Resolves listing parameters against the configured defaults and ceiling.
pub fn resolve_paging(query: &PageQuery, config: &AppConfig) -> Result<(u64, u64), ServiceError> {
    let page = query.page.unwrap_or(0);
    let size = query.size.unwrap_or(config.default_page_size);

    if size == 0 {
        return Err(ServiceError::ValidationError(
            "Page size must be at least 1".to_string(),
        ));
    }
    if size > config.max_page_size {
        return Err(ServiceError::ValidationError(format!(
            "Page size must not exceed {}",
            config.max_page_size
        )));
    }

    Ok((page, size))
}
