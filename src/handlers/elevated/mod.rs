// handlers/elevated/mod.rs - JWT authentication plus the ADMIN role
//
// Route prefix: /api/admin/*
// Each handler checks the role itself so a non-admin gets 403 rather than 404.
pub mod admin;
