// handlers/protected/mod.rs - JWT authentication required
//
// Route prefix: /api/*
// Middleware: rate limit (per preset) → JWT validation + user lookup
pub mod auth;
pub mod cases;
pub mod notifications;
pub mod profile;
