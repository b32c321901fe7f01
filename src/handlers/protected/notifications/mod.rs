pub mod list;
pub mod read;

pub use list::get as notifications_get;
pub use read::patch as notification_read;
