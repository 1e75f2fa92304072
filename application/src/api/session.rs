//! Session endpoints.

use axum::{extract::rejection::JsonRejection, Extension, Json};
use axum_extra::extract::cookie::{
    Cookie, CookieJar, SameSite as CookieSameSite,
};
use derive_more::Debug;
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{
    command::{
        create_user_session, refresh_user_session, Command as _,
        CreateUserSession, RefreshUserSession, RevokeUserSession,
    },
    domain::{
        session::{cookie::SameSite, AuthError, RefreshToken, TokenPair},
        user, SessionCookie,
    },
};

use crate::{define_error, gate, AsError, Error, Service};

define_error! {
    enum SessionError {
        #[code = "INVALID_CREDENTIALS"]
        #[status = BAD_REQUEST]
        #[message = "invalid credentials"]
        InvalidCredentials,

        #[code = "INVALID_TOKEN"]
        #[status = UNAUTHORIZED]
        #[message = "invalid token"]
        InvalidToken,

        #[code = "UNKNOWN_USER"]
        #[status = UNAUTHORIZED]
        #[message = "unknown user"]
        UnknownUser,
    }
}

/// Credentials a [`user::User`] logs in with.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// Email address of the [`user::User`].
    pub email: String,

    /// Plain-text password of the [`user::User`].
    #[debug(skip)]
    pub password: String,
}

/// Logs a [`user::User`] in, answering with a fresh [`TokenPair`] and setting
/// the session cookie.
///
/// # Errors
///
/// - [`SessionError::InvalidCredentials`] if no [`user::User`] matches the
///   provided [`Credentials`];
/// - `BAD_REQUEST` if the request body is not valid [`Credentials`].
pub async fn authenticate(
    Extension(service): Extension<Service>,
    jar: CookieJar,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<(http::StatusCode, CookieJar, Json<TokenPair>), Error> {
    let Json(Credentials { email, password }) =
        body.map_err(AsError::into_error)?;
    let email = user::Email::new(email)
        .ok_or_else(|| Error::from(SessionError::InvalidCredentials))?;

    let create_user_session::Output { tokens, cookie, .. } = service
        .execute(CreateUserSession {
            email,
            password: SecretBox::new(Box::new(password.into())),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((
        http::StatusCode::ACCEPTED,
        jar.add(to_cookie(cookie)),
        Json(tokens),
    ))
}

/// Rotates the session carried by the session cookie, answering with a fresh
/// [`TokenPair`] and overwriting the cookie.
///
/// # Errors
///
/// - [`SessionError::InvalidToken`] if the session cookie is missing or
///   carries an unacceptable refresh token;
/// - [`SessionError::UnknownUser`] if the refresh token owner doesn't exist.
pub async fn refresh(
    Extension(service): Extension<Service>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<TokenPair>), Error> {
    let token = jar
        .get(&service.config().cookie.name)
        .map(|c| RefreshToken::from(c.value().to_owned()));

    let refresh_user_session::Output { tokens, cookie, .. } = service
        .execute(RefreshUserSession::from(token))
        .await
        .map_err(AsError::into_error)?;

    Ok((jar.add(to_cookie(cookie)), Json(tokens)))
}

/// Logs the client out by revoking its session cookie.
pub async fn logout(
    Extension(service): Extension<Service>,
    jar: CookieJar,
) -> (http::StatusCode, CookieJar) {
    let cookie = service
        .execute(RevokeUserSession)
        .await
        .unwrap_or_else(|e| match e {});

    (http::StatusCode::ACCEPTED, jar.add(to_cookie(cookie)))
}

/// Verified identity of the caller.
#[derive(Debug, Serialize)]
pub struct CurrentSession {
    /// ID of the [`user::User`] the access token was issued for.
    pub subject: String,

    /// Display name of the [`user::User`].
    pub name: String,

    /// Issuer of the access token.
    pub issuer: String,

    /// RFC 3339 moment the access token expires at.
    pub expires_at: String,
}

/// Answers with the identity carried by the verified access token.
#[expect(clippy::unused_async, reason = "handlers are `async`")]
pub async fn current(
    Extension(session): Extension<gate::Session>,
) -> Json<CurrentSession> {
    let claims = session.claims;
    Json(CurrentSession {
        subject: claims.subject,
        name: claims.name,
        issuer: claims.issuer,
        expires_at: claims.expires_at.to_rfc3339(),
    })
}

/// Converts the provided [`SessionCookie`] into a `Set-Cookie` one.
fn to_cookie(cookie: SessionCookie) -> Cookie<'static> {
    let SessionCookie {
        name,
        value,
        path,
        domain,
        expires_at,
        max_age,
        secure,
        http_only,
        same_site,
    } = cookie;

    let mut cookie = Cookie::build((name, value))
        .path(path)
        .expires(time::OffsetDateTime::from(expires_at))
        .max_age(max_age)
        .secure(secure)
        .http_only(http_only)
        .same_site(match same_site {
            SameSite::Strict => CookieSameSite::Strict,
        })
        .build();
    if let Some(domain) = domain {
        cookie.set_domain(domain);
    }
    cookie
}

impl AsError for create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(e) => e.try_as_error(),
            Self::PasswordCheck(_) => None,
            Self::WrongCredentials => {
                Some(SessionError::InvalidCredentials.into())
            }
        }
    }
}

impl AsError for refresh_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(e) => e.try_as_error(),
            Self::Auth(AuthError::UnknownUser) => {
                Some(SessionError::UnknownUser.into())
            }
            Self::Auth(
                AuthError::MissingHeader
                | AuthError::InvalidHeader
                | AuthError::UnsupportedAlgorithm
                | AuthError::SignatureInvalid
                | AuthError::Malformed
                | AuthError::TokenExpired
                | AuthError::InvalidIssuer,
            )
            | Self::MissingCookie => Some(SessionError::InvalidToken.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use axum_extra::extract::cookie::SameSite;
    use common::DateTime;
    use service::domain::{
        session::{cookie, RefreshToken},
        SessionCookie,
    };

    use super::to_cookie;

    #[test]
    fn renders_active_session_cookie() {
        let config = cookie::Config {
            domain: Some("example.com".into()),
            ..cookie::Config::default()
        };
        let session = SessionCookie::issue(
            &RefreshToken::from("a.b.c".to_owned()),
            &config,
            Duration::from_secs(24 * 60 * 60),
            DateTime::from_unix_timestamp(0).unwrap(),
        );

        let cookie = to_cookie(session);

        assert_eq!(cookie.name(), "jwt-refresh_token");
        assert_eq!(cookie.value(), "a.b.c");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.domain(), Some("example.com"));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(86_400)));
        assert_eq!(
            cookie.expires_datetime(),
            Some(time::OffsetDateTime::from_unix_timestamp(86_400).unwrap()),
        );
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));

        let header = cookie.to_string();
        assert!(header.starts_with("jwt-refresh_token=a.b.c;"), "{header}");
        assert!(header.contains("Max-Age=86400"), "{header}");
        assert!(header.contains("Domain=example.com"), "{header}");
    }
}
