//! [`Command`] for issuing a [`TokenPair`].

use common::DateTime;
use tracerr::Traced;
use uuid::Uuid;

use crate::{
    domain::{
        session::{
            claims::TokenType, AccessClaims, AccessToken, RefreshClaims,
            RefreshToken, TokenPair,
        },
        user::Principal,
    },
    jwt, Service,
};

use super::Command;

/// [`Command`] for issuing a [`TokenPair`] to an authenticated
/// [`Principal`].
#[derive(Clone, Debug)]
pub struct IssueTokenPair {
    /// [`Principal`] to issue the [`TokenPair`] for.
    pub principal: Principal,

    /// [`DateTime`] the [`TokenPair`] is issued at.
    pub issued_at: DateTime,
}

impl From<Principal> for IssueTokenPair {
    fn from(principal: Principal) -> Self {
        Self {
            principal,
            issued_at: DateTime::now(),
        }
    }
}

impl<Db> Command<IssueTokenPair> for Service<Db> {
    type Ok = TokenPair;
    type Err = Traced<jwt::EncodeError>;

    async fn execute(
        &self,
        cmd: IssueTokenPair,
    ) -> Result<Self::Ok, Self::Err> {
        let IssueTokenPair {
            principal,
            issued_at,
        } = cmd;
        let config = self.config();

        let access_token = config
            .jwt
            .encode(&AccessClaims {
                id: Uuid::new_v4(),
                subject: principal.id.to_string(),
                issuer: config.issuer.clone(),
                audience: config.audience.clone(),
                issued_at: issued_at.coerce(),
                expires_at: (issued_at + config.access_token_ttl).coerce(),
                kind: TokenType::Jwt,
                name: principal.display_name(),
            })
            .map_err(tracerr::wrap!())?;

        let refresh_token = config
            .jwt
            .encode(&RefreshClaims {
                id: Uuid::new_v4(),
                subject: Some(principal.id.to_string()),
                issued_at: issued_at.coerce(),
                expires_at: (issued_at + config.refresh_token_ttl).coerce(),
            })
            .map_err(tracerr::wrap!())?;

        Ok(TokenPair {
            access_token: AccessToken::from(access_token),
            refresh_token: RefreshToken::from(refresh_token),
        })
    }
}
