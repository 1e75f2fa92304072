//! [`Command`] for creating a session by [`User`] credentials.

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::session::RefreshToken;
use crate::{
    domain::{
        session::{SessionCookie, TokenPair},
        user::{self, Principal},
        User,
    },
    infra::{database, Database},
    jwt, Service,
};

use super::{Command, IssueTokenPair};

/// [`Command`] for creating a session by [`User`] credentials.
#[derive(Clone, Debug)]
pub struct CreateUserSession {
    /// [`user::Email`] of a [`User`].
    pub email: user::Email,

    /// [`user::Password`] of a [`User`].
    pub password: SecretBox<user::Password>,
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Principal`] the session has been created for.
    pub principal: Principal,

    /// Issued [`TokenPair`].
    pub tokens: TokenPair,

    /// [`SessionCookie`] carrying the issued [`RefreshToken`].
    pub cookie: SessionCookie,
}

impl<Db> Command<CreateUserSession> for Service<Db>
where
    Db: for<'l> Database<
        Select<By<Option<User>, &'l user::Email>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUserSession { email, password } = cmd;

        let user = self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| tracerr::new!(E::WrongCredentials))?;

        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || {
            hash.verify(password.expose_secret())
        })
        .await
        .map_err(tracerr::from_and_wrap!(=> E))?;
        if !matches {
            return Err(tracerr::new!(E::WrongCredentials));
        }

        let now = DateTime::now();
        let principal = Principal::from(user);
        let tokens = self
            .execute(IssueTokenPair {
                principal: principal.clone(),
                issued_at: now,
            })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let config = self.config();
        let cookie = SessionCookie::issue(
            &tokens.refresh_token,
            &config.cookie,
            config.refresh_token_ttl,
            now,
        );

        tracing::info!(user.id = %principal.id, "session created");

        Ok(Output {
            principal,
            tokens,
            cookie,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`TokenPair`] signing error.
    #[display("Failed to issue a `TokenPair`: {_0}")]
    JsonWebTokenEncodeError(jwt::EncodeError),

    /// Password verification task failed to complete.
    #[display("Password verification failed: {_0}")]
    PasswordCheck(tokio::task::JoinError),

    /// No [`User`] matches the provided credentials.
    #[display("Wrong `User` credentials")]
    WrongCredentials,
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use secrecy::SecretBox;

    use crate::{
        domain::{
            session::{AccessClaims, RefreshClaims},
            user,
        },
        fixture, Command as _,
    };

    use super::{CreateUserSession, ExecutionError};

    fn credentials(email: &str, password: &str) -> CreateUserSession {
        CreateUserSession {
            email: user::Email::new(email).unwrap(),
            password: SecretBox::new(Box::new(user::Password::from(password))),
        }
    }

    #[tokio::test]
    async fn issues_session_for_valid_credentials() {
        let service = fixture::service();

        let out = service
            .execute(credentials("ada@example.com", fixture::PASSWORD))
            .await
            .unwrap();

        assert_eq!(out.principal.id, user::Id::from(7));
        assert_eq!(out.cookie.value, out.tokens.refresh_token.as_ref());
        assert!(!out.cookie.is_revoked());

        let now = DateTime::now();
        let jwt = &service.config().jwt;
        let access: AccessClaims =
            jwt.decode(out.tokens.access_token.as_ref(), now).unwrap();
        let refresh: RefreshClaims =
            jwt.decode(out.tokens.refresh_token.as_ref(), now).unwrap();
        assert_eq!(access.name, "Ada Lovelace");
        assert_eq!(out.cookie.expires_at, refresh.expires_at);
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let err = fixture::service()
            .execute(credentials("ada@example.com", "guess"))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::WrongCredentials));
    }

    #[tokio::test]
    async fn checks_concurrent_logins_independently() {
        let service = fixture::service();

        let (ok, err) = tokio::join!(
            service.execute(credentials("ada@example.com", fixture::PASSWORD)),
            service.execute(credentials("ada@example.com", "guess")),
        );

        assert_eq!(ok.unwrap().principal.id, user::Id::from(7));
        assert!(matches!(
            err.unwrap_err().as_ref(),
            ExecutionError::WrongCredentials,
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_email_the_same_way() {
        let err = fixture::service()
            .execute(credentials("eve@example.com", fixture::PASSWORD))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::WrongCredentials));
    }
}
