use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::validate::normalize;
use crate::api::{FieldErrors, JsonBody};
use crate::database::models::Case;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::CreateCase;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseRequest {
    pub title: String,
    pub case_type: String,
    pub description: Option<String>,
    pub client_id: Option<Uuid>,
}

impl CreateCaseRequest {
    pub fn validate(self) -> Result<CreateCase, ApiError> {
        let mut errors = FieldErrors::new();
        errors.require_text("title", &self.title, 200);
        errors.require_text("caseType", &self.case_type, 50);
        if let Some(description) = &self.description {
            if description.chars().count() > 5000 {
                errors.add("description", "Must be at most 5000 characters");
            }
        }
        errors.into_result()?;

        Ok(CreateCase {
            title: self.title.trim().to_string(),
            case_type: self.case_type.trim().to_string(),
            description: normalize(self.description),
            client_id: self.client_id,
        })
    }
}

/// POST /api/cases
pub async fn post(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody<CreateCaseRequest>,
) -> ApiResult<Case> {
    let input = body.validate()?;
    let case = state.cases().create(&user, input).await?;
    Ok(ApiResponse::created(case).with_message("Case created successfully"))
}
