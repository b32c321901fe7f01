pub mod assign;
pub mod audit_logs;
pub mod users;

pub use assign::put as case_assign;
pub use audit_logs::get as audit_logs_get;
pub use users::get as users_get;
