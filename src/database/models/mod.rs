pub mod audit_log;
pub mod case;
pub mod message;
pub mod notification;
pub mod status_history;
pub mod user;

pub use audit_log::{AuditFilter, AuditLog, NewAuditLog};
pub use case::{Case, CaseFilter, NewCase};
pub use message::{CaseMessage, MessageEntry, NewMessage};
pub use notification::{NewNotification, Notification};
pub use status_history::{HistoryEntry, StatusHistory};
pub use user::{NewUser, ProfileChanges, User, UserSummary};
