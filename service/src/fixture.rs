//! Fixtures shared by tests.

use std::{sync::Arc, time::Duration};

use common::{
    operations::{By, Select},
    DateTime,
};
use tracerr::Traced;

use crate::{
    domain::{session::cookie, user, User},
    infra::{database, Database},
    jwt, Config, Service,
};

/// Password of [`ada()`].
pub(crate) const PASSWORD: &str = "analytical engine";

/// In-memory user store.
#[derive(Clone, Debug, Default)]
pub(crate) struct Users(Arc<Vec<User>>);

impl Database<Select<By<Option<User>, user::Id>>> for Users {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.0.iter().find(|u| u.id == id).cloned())
    }
}

impl<'l> Database<Select<By<Option<User>, &'l user::Email>>> for Users {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        Ok(self.0.iter().find(|u| &u.email == email).cloned())
    }
}

/// `Ada Lovelace` [`User`] with ID `7`.
pub(crate) fn ada() -> User {
    User {
        id: user::Id::from(7),
        first_name: user::Name::new("Ada").unwrap(),
        last_name: user::Name::new("Lovelace").unwrap(),
        email: user::Email::new("ada@example.com").unwrap(),
        password_hash: user::PasswordHash::new(&user::Password::from(
            PASSWORD,
        ))
        .unwrap(),
        created_at: DateTime::UNIX_EPOCH.coerce(),
        updated_at: DateTime::UNIX_EPOCH.coerce(),
    }
}

/// [`Config`] issuing `api.example` tokens for `web.example`.
pub(crate) fn config() -> Config {
    Config {
        jwt: jwt::Codec::new(jwt::HmacAlgorithm::Hs256, "s3cret"),
        issuer: "api.example".into(),
        audience: "web.example".into(),
        access_token_ttl: Duration::from_secs(15 * 60),
        refresh_token_ttl: Duration::from_secs(24 * 60 * 60),
        cookie: cookie::Config {
            domain: Some("example.com".into()),
            ..cookie::Config::default()
        },
    }
}

/// [`Service`] with the default [`config()`] knowing only [`ada()`].
pub(crate) fn service() -> Service<Users> {
    service_with(config(), vec![ada()])
}

/// [`Service`] with the provided [`Config`] and [`User`]s.
pub(crate) fn service_with(config: Config, users: Vec<User>) -> Service<Users> {
    Service::new(config, Users(Arc::new(users)))
}
