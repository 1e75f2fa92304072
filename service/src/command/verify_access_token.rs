//! [`Command`] for verifying an [`AccessToken`].

use common::DateTime;
use tracerr::Traced;

use crate::{
    domain::session::{AccessClaims, AccessToken, AuthError},
    Service,
};

use super::Command;

/// Scheme an [`AccessToken`] is presented with in the `Authorization`
/// header.
pub const SCHEME: &str = "Bearer";

/// [`Command`] for verifying an [`AccessToken`] presented in the value of an
/// `Authorization` header.
#[derive(Clone, Debug)]
pub struct VerifyAccessToken {
    /// Value of the `Authorization` header, if any.
    pub header: Option<String>,

    /// [`DateTime`] to check the [`AccessToken`] expiration against.
    pub at: DateTime,
}

impl VerifyAccessToken {
    /// Creates a new [`VerifyAccessToken`] checking the provided `header`
    /// value at the current [`DateTime`].
    #[must_use]
    pub fn new(header: Option<impl Into<String>>) -> Self {
        Self {
            header: header.map(Into::into),
            at: DateTime::now(),
        }
    }
}

/// Output of [`VerifyAccessToken`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Verified [`AccessToken`].
    pub token: AccessToken,

    /// [`AccessClaims`] of the verified [`AccessToken`].
    pub claims: AccessClaims,
}

impl<Db> Command<VerifyAccessToken> for Service<Db> {
    type Ok = Output;
    type Err = Traced<AuthError>;

    async fn execute(
        &self,
        cmd: VerifyAccessToken,
    ) -> Result<Self::Ok, Self::Err> {
        use AuthError as E;

        let VerifyAccessToken { header, at } = cmd;

        let header = header
            .filter(|h| !h.is_empty())
            .ok_or_else(|| tracerr::new!(E::MissingHeader))?;

        let mut parts = header.split(' ');
        let token = match (parts.next(), parts.next(), parts.next()) {
            (Some(SCHEME), Some(token), None) => token,
            _ => return Err(tracerr::new!(E::InvalidHeader)),
        };

        let claims = self
            .config()
            .jwt
            .decode::<AccessClaims>(token, at)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        if claims.issuer != self.config().issuer {
            return Err(tracerr::new!(E::InvalidIssuer));
        }

        Ok(Output {
            token: AccessToken::from(token.to_owned()),
            claims,
        })
    }
}
