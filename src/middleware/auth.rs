use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{validate_jwt, JwtError};
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::Role;

/// Authenticated caller resolved from the bearer token and the user store
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_role(&self, allowed: &[Role], action: &str) -> Result<(), ApiError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.id, role = %self.role, action, "Role not permitted");
            Err(ApiError::forbidden(format!("Your role is not permitted to {}", action)))
        }
    }
}

/// JWT authentication middleware that validates tokens and attaches the caller to the request
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers()).map_err(ApiError::unauthorized)?;

    let claims = validate_jwt(token, &state.config.security.jwt_secret).map_err(|e| match e {
        JwtError::InvalidSecret | JwtError::TokenGeneration(_) => {
            tracing::error!("JWT secret not configured; rejecting authenticated request");
            ApiError::internal_server_error("Authentication is not configured")
        }
        JwtError::Expired => ApiError::unauthorized("Token has expired"),
        JwtError::Invalid(reason) => {
            tracing::debug!("Rejected bearer token: {}", reason);
            ApiError::unauthorized("Invalid token")
        }
    })?;

    let user = state
        .repo
        .get_user(claims.sub)
        .await?
        .ok_or_else(|| {
            tracing::warn!(user_id = %claims.sub, "Token subject does not exist");
            ApiError::unauthorized("User not found for token")
        })?;

    if !user.is_active {
        tracing::warn!(user_id = %user.id, "Inactive user attempted access");
        return Err(ApiError::forbidden("User account is inactive"));
    }

    // Role changes invalidate previously issued tokens
    if user.role != claims.role {
        tracing::warn!(
            user_id = %user.id,
            token_role = %claims.role,
            current_role = %user.role,
            "Token role does not match user role"
        );
        return Err(ApiError::forbidden("User role mismatch; please sign in again"));
    }

    tracing::debug!(user_id = %user.id, role = %user.role, "Authenticated request");

    request.extensions_mut().insert(AuthUser {
        id: user.id,
        email: user.email,
        role: user.role,
    });

    Ok(next.run(request).await)
}

/// Extract the JWT from `Authorization: Bearer <token>`
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err("Empty bearer token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_bearer_token(&headers_with("Bearer abc.def")), Ok("abc.def"));
        assert_eq!(extract_bearer_token(&headers_with("Bearer   ")), Err("Empty bearer token"));
        assert!(extract_bearer_token(&headers_with("Basic dXNlcjpwYXNz")).is_err());
        assert_eq!(
            extract_bearer_token(&HeaderMap::new()),
            Err("Missing Authorization header")
        );
    }

    #[test]
    fn require_role_rejects_other_roles() {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: "agent@example.com".into(),
            role: Role::Agent,
        };
        assert!(user.require_role(&[Role::Agent, Role::Admin], "update case status").is_ok());
        let err = user.require_role(&[Role::Admin], "assign cases").unwrap_err();
        assert_eq!(err.error_code(), "FORBIDDEN");
    }
}
