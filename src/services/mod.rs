pub mod access;
pub mod audit;
pub mod case_service;
pub mod notifier;
pub mod profile_service;

pub use case_service::{CaseService, CreateCase};
pub use notifier::{DispatchNotifier, Notifier, NotifyError};
pub use profile_service::ProfileService;
