pub mod json;
pub mod validate;

pub use json::JsonBody;
pub use validate::{parse_id, FieldErrors};
