pub mod create;
pub mod history;
pub mod list;
pub mod messages;
pub mod show;
pub mod status;

pub use create::post as cases_post;
pub use history::get as history_get;
pub use list::get as cases_get;
pub use messages::get as messages_get;
pub use messages::post as messages_post;
pub use show::get as case_get;
pub use status::patch as status_patch;
