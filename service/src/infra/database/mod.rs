//! [`Database`]-related implementations.
//!
//! The user store is the only collaborator the session logic looks users up
//! in: by [`user::Id`] when rotating a session, and by [`user::Email`] when
//! logging in.
//!
//! [`user::Email`]: crate::domain::user::Email
//! [`user::Id`]: crate::domain::user::Id

#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "postgres")]
    /// [`Postgres`] error.
    Postgres(postgres::Error),
}
