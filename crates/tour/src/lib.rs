pub mod config;
pub mod editor;
pub mod manifest_task;
pub mod session;

pub use config::*;
pub use editor::*;
pub use manifest_task::*;
pub use session::*;
