//! Token claims definitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{domain::user, jwt};

use super::{ExpirationDateTime, IssueDateTime};

/// Value of the `typ` claim of an [`AccessClaims`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum TokenType {
    /// JSON Web Token.
    #[default]
    #[serde(rename = "JWT")]
    Jwt,
}

/// Claims of an access token.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AccessClaims {
    /// Unique ID of the token.
    #[serde(rename = "jti")]
    pub id: Uuid,

    /// [`user::Id`] of the token owner, string-encoded.
    #[serde(rename = "sub")]
    pub subject: String,

    /// Issuer of the token.
    #[serde(rename = "iss")]
    pub issuer: String,

    /// Intended audience of the token.
    #[serde(rename = "aud")]
    pub audience: String,

    /// [`IssueDateTime`] of the token.
    #[serde(rename = "iat", with = "common::datetime::serde::unix_timestamp")]
    pub issued_at: IssueDateTime,

    /// [`ExpirationDateTime`] of the token.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,

    /// [`TokenType`] marker.
    #[serde(rename = "typ")]
    pub kind: TokenType,

    /// Display name of the token owner.
    pub name: String,
}

impl AccessClaims {
    /// Returns the [`user::Id`] this token was issued for.
    ///
    /// [`None`] if the subject is not numeric.
    #[must_use]
    pub fn user_id(&self) -> Option<user::Id> {
        self.subject.parse().ok()
    }
}

impl jwt::Claims for AccessClaims {
    fn expires_at(&self) -> ExpirationDateTime {
        self.expires_at
    }
}

/// Claims of a refresh token.
///
/// A refresh token is only good for obtaining a new token pair, so it carries
/// neither an audience nor a display name. Unknown claims are rejected, so an
/// [`AccessClaims`] token never passes for a refresh one.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshClaims {
    /// Unique ID of the token.
    #[serde(rename = "jti")]
    pub id: Uuid,

    /// [`user::Id`] of the token owner, string-encoded.
    #[serde(rename = "sub", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// [`IssueDateTime`] of the token.
    #[serde(rename = "iat", with = "common::datetime::serde::unix_timestamp")]
    pub issued_at: IssueDateTime,

    /// [`ExpirationDateTime`] of the token.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

impl RefreshClaims {
    /// Returns the [`user::Id`] this token was issued for.
    ///
    /// [`None`] if the subject is absent or not numeric.
    #[must_use]
    pub fn user_id(&self) -> Option<user::Id> {
        self.subject.as_deref()?.parse().ok()
    }
}

impl jwt::Claims for RefreshClaims {
    fn expires_at(&self) -> ExpirationDateTime {
        self.expires_at
    }
}
