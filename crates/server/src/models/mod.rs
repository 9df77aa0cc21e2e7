//! Domain models for the server.

pub mod session;
pub mod setting;
pub mod user;

pub use session::{CurrentUser, keys as session_keys};
pub use setting::Setting;
pub use user::User;
