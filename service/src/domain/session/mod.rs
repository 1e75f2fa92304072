//! Session definitions.
//!
//! A session consists of a short-lived [`AccessToken`] presented as a bearer
//! credential, and a longer-lived [`RefreshToken`] kept in an HTTP-only
//! [`SessionCookie`]. Both are self-contained: no server-side record of an
//! issued token exists, so a token stays valid until its own expiration.

pub mod claims;
pub mod cookie;

#[cfg(doc)]
use common::DateTime;
use common::DateTimeOf;
use derive_more::{AsRef, Display, Error, From};
use serde::Serialize;

pub use self::{
    claims::{AccessClaims, RefreshClaims},
    cookie::SessionCookie,
};

/// Signed access token presented in the `Authorization` header.
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq, Serialize)]
#[as_ref(str)]
#[serde(transparent)]
pub struct AccessToken(String);

/// Signed refresh token carried by a [`SessionCookie`].
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq, Serialize)]
#[as_ref(str)]
#[serde(transparent)]
pub struct RefreshToken(String);

/// Pair of tokens issued together on login or refresh.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TokenPair {
    /// [`AccessToken`] of this [`TokenPair`].
    pub access_token: AccessToken,

    /// [`RefreshToken`] of this [`TokenPair`].
    pub refresh_token: RefreshToken,
}

/// Reason a presented token was not accepted.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum AuthError {
    /// No `Authorization` header was provided.
    #[display("Missing authorization header")]
    MissingHeader,

    /// `Authorization` header is not of the `Bearer <token>` form.
    #[display("Invalid authorization header")]
    InvalidHeader,

    /// Token is signed with an algorithm other than the configured one.
    #[display("Unsupported token signing algorithm")]
    UnsupportedAlgorithm,

    /// Token signature doesn't verify under the shared secret.
    #[display("Invalid token signature")]
    SignatureInvalid,

    /// Token cannot be parsed.
    #[display("Malformed token")]
    Malformed,

    /// Token is past its expiration.
    #[display("Token is expired")]
    TokenExpired,

    /// Token was issued by someone else.
    #[display("Invalid token issuer")]
    InvalidIssuer,

    /// Token subject doesn't identify an existing user.
    #[display("Unknown user")]
    UnknownUser,
}

/// Kind of [`DateTime`] a token was issued at.
#[derive(Clone, Copy, Debug)]
pub struct Issue;

/// Kind of [`DateTime`] a token or cookie expires at.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;

/// [`DateTime`] a token was issued at.
pub type IssueDateTime = DateTimeOf<(TokenPair, Issue)>;

/// [`DateTime`] a token or cookie expires at.
pub type ExpirationDateTime = DateTimeOf<(TokenPair, Expiration)>;
