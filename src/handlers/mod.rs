// handlers/mod.rs - 3-tier handler layout
//
// Public (no auth) → Protected (JWT auth) → Elevated (JWT auth + ADMIN role)
//
// Each tier re-exports its handlers so server.rs can route them by name.
pub mod elevated;
pub mod protected;
pub mod public;
