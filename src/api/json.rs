use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// `Json<T>` whose rejections use the error envelope instead of plain text
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(match rejection {
                // Well-formed JSON of the wrong shape (missing field, wrong type, unknown enum value)
                JsonRejection::JsonDataError(e) => ApiError::validation_error(e.body_text(), None),
                JsonRejection::JsonSyntaxError(_) => ApiError::invalid_json("Request body is not valid JSON"),
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::invalid_json("Expected request with Content-Type: application/json")
                }
                other => ApiError::bad_request(other.body_text()),
            }),
        }
    }
}
