//! [`SessionCookie`] definitions.

use std::time::Duration;

use common::DateTime;
use serde::Deserialize;
use smart_default::SmartDefault;

use super::{ExpirationDateTime, RefreshToken};

/// Attributes shared by every [`SessionCookie`].
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Config {
    /// Name of the cookie.
    #[default("jwt-refresh_token".to_owned())]
    pub name: String,

    /// Path the cookie is scoped to.
    #[default("/".to_owned())]
    pub path: String,

    /// Domain the cookie is scoped to, if any.
    pub domain: Option<String>,
}

/// `SameSite` attribute of a [`SessionCookie`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SameSite {
    /// Cookie is sent with same-site requests only.
    Strict,
}

/// Cookie carrying a [`RefreshToken`] to the client.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionCookie {
    /// Name of this [`SessionCookie`].
    pub name: String,

    /// Value of this [`SessionCookie`].
    ///
    /// Empty for a revoked [`SessionCookie`].
    pub value: String,

    /// Path this [`SessionCookie`] is scoped to.
    pub path: String,

    /// Domain this [`SessionCookie`] is scoped to, if any.
    pub domain: Option<String>,

    /// [`ExpirationDateTime`] of this [`SessionCookie`].
    pub expires_at: ExpirationDateTime,

    /// `Max-Age` of this [`SessionCookie`], negative when revoked.
    pub max_age: time::Duration,

    /// Whether this [`SessionCookie`] is sent over HTTPS only.
    pub secure: bool,

    /// Whether this [`SessionCookie`] is hidden from scripts.
    pub http_only: bool,

    /// [`SameSite`] policy of this [`SessionCookie`].
    pub same_site: SameSite,
}

impl SessionCookie {
    /// Creates an active [`SessionCookie`] carrying the provided
    /// [`RefreshToken`] for the `lifetime` starting at `now`.
    #[must_use]
    pub fn issue(
        token: &RefreshToken,
        config: &Config,
        lifetime: Duration,
        now: DateTime,
    ) -> Self {
        Self {
            value: token.as_ref().to_owned(),
            expires_at: (now + lifetime).coerce(),
            max_age: time::Duration::seconds(
                i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX),
            ),
            ..Self::revoked(config)
        }
    }

    /// Creates a revoked [`SessionCookie`], which makes the client drop its
    /// session cookie immediately.
    #[must_use]
    pub fn revoked(config: &Config) -> Self {
        Self {
            name: config.name.clone(),
            value: String::new(),
            path: config.path.clone(),
            domain: config.domain.clone(),
            expires_at: ExpirationDateTime::UNIX_EPOCH,
            max_age: time::Duration::seconds(-1),
            secure: true,
            http_only: true,
            same_site: SameSite::Strict,
        }
    }

    /// Indicates whether this [`SessionCookie`] is a revoked one.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.value.is_empty() && self.max_age.is_negative()
    }
}
