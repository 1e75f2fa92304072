//! [`Command`] for rotating a session by its [`RefreshToken`].

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        session::{AuthError, RefreshToken, SessionCookie, TokenPair},
        user::{self, Principal},
        User,
    },
    infra::{database, Database},
    jwt, Service,
};

use super::{Command, IssueTokenPair, VerifyRefreshToken};

/// [`Command`] for rotating a session by its [`RefreshToken`].
///
/// Every successful execution issues a brand-new [`TokenPair`]. The presented
/// [`RefreshToken`] is not blacklisted: it is superseded by the overwritten
/// [`SessionCookie`] and expires naturally.
#[derive(Clone, Debug)]
pub struct RefreshUserSession {
    /// [`RefreshToken`] found in the request cookies, if any.
    pub token: Option<RefreshToken>,

    /// [`DateTime`] the session is rotated at.
    pub at: DateTime,
}

impl From<Option<RefreshToken>> for RefreshUserSession {
    fn from(token: Option<RefreshToken>) -> Self {
        Self {
            token,
            at: DateTime::now(),
        }
    }
}

/// Output of [`RefreshUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Principal`] the session belongs to.
    pub principal: Principal,

    /// Newly issued [`TokenPair`].
    pub tokens: TokenPair,

    /// [`SessionCookie`] replacing the client's one.
    pub cookie: SessionCookie,
}

impl<Db> Command<RefreshUserSession> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RefreshUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RefreshUserSession { token, at } = cmd;

        let token = token.ok_or_else(|| tracerr::new!(E::MissingCookie))?;
        let user_id = self
            .execute(VerifyRefreshToken { token, at })
            .await
            .inspect_err(|e| {
                tracing::debug!("refresh token rejected: {}", e.as_ref());
            })
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let principal = self
            .database()
            .execute(Select(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .map(Principal::from)
            .ok_or_else(|| tracerr::new!(E::Auth(AuthError::UnknownUser)))?;

        let tokens = self
            .execute(IssueTokenPair {
                principal: principal.clone(),
                issued_at: at,
            })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let config = self.config();
        let cookie = SessionCookie::issue(
            &tokens.refresh_token,
            &config.cookie,
            config.refresh_token_ttl,
            at,
        );

        tracing::debug!(user.id = %principal.id, "session rotated");

        Ok(Output {
            principal,
            tokens,
            cookie,
        })
    }
}

/// Error of [`RefreshUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Presented [`RefreshToken`] is not acceptable.
    #[display("Invalid refresh token: {_0}")]
    Auth(AuthError),

    /// [`TokenPair`] signing error.
    #[display("Failed to issue a `TokenPair`: {_0}")]
    JsonWebTokenEncodeError(jwt::EncodeError),

    /// No session cookie was presented.
    #[display("Missing session cookie")]
    MissingCookie,
}
