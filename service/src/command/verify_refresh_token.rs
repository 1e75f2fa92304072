//! [`Command`] for verifying a [`RefreshToken`].

use common::DateTime;
use tracerr::Traced;

use crate::{
    domain::{
        session::{AuthError, RefreshClaims, RefreshToken},
        user,
    },
    Service,
};

use super::Command;

/// [`Command`] for verifying a [`RefreshToken`] and recovering the
/// [`user::Id`] it was issued for.
///
/// Only the signature, algorithm and expiration are checked: a
/// [`RefreshToken`] carries neither an issuer nor an audience.
#[derive(Clone, Debug)]
pub struct VerifyRefreshToken {
    /// [`RefreshToken`] to verify.
    pub token: RefreshToken,

    /// [`DateTime`] to check the [`RefreshToken`] expiration against.
    pub at: DateTime,
}

impl From<RefreshToken> for VerifyRefreshToken {
    fn from(token: RefreshToken) -> Self {
        Self {
            token,
            at: DateTime::now(),
        }
    }
}

impl<Db> Command<VerifyRefreshToken> for Service<Db> {
    type Ok = user::Id;
    type Err = Traced<AuthError>;

    async fn execute(
        &self,
        cmd: VerifyRefreshToken,
    ) -> Result<Self::Ok, Self::Err> {
        use AuthError as E;

        let VerifyRefreshToken { token, at } = cmd;

        self.config()
            .jwt
            .decode::<RefreshClaims>(token.as_ref(), at)
            .map_err(tracerr::from_and_wrap!(=> E))?
            .user_id()
            .ok_or_else(|| tracerr::new!(E::UnknownUser))
    }
}
