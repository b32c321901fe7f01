pub mod get;
pub mod patch;

pub use get::get as profile_get;
pub use patch::patch as profile_patch;
