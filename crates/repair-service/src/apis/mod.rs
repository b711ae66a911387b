//! HTTP handlers for the repair API.
//!
//! Request bodies go through [`ValidatedJson`], so every handler receives a
//! typed request that already passed its field checks.

pub mod order;
pub mod party;

use axum::{
	extract::{rejection::JsonRejection, FromRequest, Request},
	Json,
};
use repair_core::WorkflowError;
use repair_types::ApiError;
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body extractor that also runs the body's validation rules.
///
/// Malformed JSON, a wrong content type and failed field checks are all
/// reported as `VALIDATION_ERROR`.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
	T: DeserializeOwned + Validate,
	S: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let Json(value) = Json::<T>::from_request(req, state)
			.await
			.map_err(|rejection: JsonRejection| ApiError::validation(rejection.body_text()))?;
		value
			.validate()
			.map_err(|errors| ApiError::validation(errors.to_string()))?;
		Ok(Self(value))
	}
}

/// Converts a failed workflow operation into its HTTP error, logging it.
pub(crate) fn reject(err: WorkflowError) -> ApiError {
	match &err {
		WorkflowError::Storage(_) => tracing::error!(error = %err, "Request failed"),
		_ => tracing::warn!(error = %err, "Request rejected"),
	}
	err.into()
}
