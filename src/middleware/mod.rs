pub mod auth;
pub mod cors;
pub mod rate_limit;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use cors::cors_layer;
pub use rate_limit::{rate_limit_middleware, RateDecision, RateLimitState, RateLimiter};
pub use response::{ApiResponse, ApiResult};
