pub mod api;
pub mod notify;
pub mod session;
pub mod state;

pub use api::{Client, Remote, Snapshot};
pub use notify::Notifications;
pub use session::{Identity, Session, Transition};
pub use state::{App, LoadReport};
