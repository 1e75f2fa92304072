//! [`Command`] for revoking a session.

use std::convert::Infallible;

use crate::{domain::SessionCookie, Service};

use super::Command;

/// [`Command`] for revoking a session on the client side.
///
/// No token is validated: the client is merely told to drop its
/// [`SessionCookie`]. Tokens issued before stay valid until their own
/// expiration.
#[derive(Clone, Copy, Debug)]
pub struct RevokeUserSession;

impl<Db> Command<RevokeUserSession> for Service<Db> {
    type Ok = SessionCookie;
    type Err = Infallible;

    async fn execute(
        &self,
        _: RevokeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(SessionCookie::revoked(&self.config().cookie))
    }
}

#[cfg(test)]
mod spec {
    use crate::{fixture, Command as _};

    use super::RevokeUserSession;

    #[tokio::test]
    async fn produces_revoked_cookie() {
        let service = fixture::service();

        let cookie = service.execute(RevokeUserSession).await.unwrap();

        assert!(cookie.is_revoked());
        assert_eq!(cookie.name, service.config().cookie.name);
        assert_eq!(cookie.max_age.whole_seconds(), -1);
    }
}
