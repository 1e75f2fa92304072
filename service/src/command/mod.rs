//! [`Command`] definition.

pub mod create_user_session;
pub mod issue_token_pair;
pub mod refresh_user_session;
pub mod revoke_user_session;
pub mod verify_access_token;
pub mod verify_refresh_token;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    create_user_session::CreateUserSession, issue_token_pair::IssueTokenPair,
    refresh_user_session::RefreshUserSession,
    revoke_user_session::RevokeUserSession,
    verify_access_token::VerifyAccessToken,
    verify_refresh_token::VerifyRefreshToken,
};
