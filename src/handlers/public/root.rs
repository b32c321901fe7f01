use axum::response::Json;
use serde_json::{json, Value};

/// GET / - service info and route map
pub async fn get() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Casework API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Case tracking, messaging and notifications for immigration clients, agents and administrators",
            "endpoints": {
                "health": "/health (public)",
                "auth": "/api/auth/me",
                "profile": "/api/profile",
                "cases": "/api/cases[/:id[/status|/history|/messages]]",
                "notifications": "/api/notifications[/:id/read]",
                "admin": "/api/admin/cases/:id/assign, /api/admin/users, /api/admin/audit-logs (ADMIN)"
            }
        }
    }))
}
