//! services/api/src/web/extract.rs
//!
//! Request extractors whose rejections use the JSON error envelope.

use axum::{
    extract::{FromRequest, Request},
    Form,
};
use serde::de::DeserializeOwned;

use crate::web::response::HttpError;

/// A url-encoded form body. A wrong content type or an undecodable body is
/// answered with 400 and `{"success": false, "error": ...}` instead of axum's
/// plain-text rejection.
pub struct FormBody<T>(pub T);

impl<T, S> FromRequest<S> for FormBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|rejection| HttpError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}
