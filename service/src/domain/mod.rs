//! Domain definitions.

pub mod session;
pub mod user;

pub use self::{session::SessionCookie, user::User};
