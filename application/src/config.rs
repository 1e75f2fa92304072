//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use derive_more::{Display, Error};
use http::header::{self, HeaderValue, InvalidHeaderValue};
use serde::Deserialize;
use service::{domain::session::cookie, jwt};
use smart_default::SmartDefault;
use tower_http::cors::CorsLayer;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Authentication configuration.
    pub auth: Auth,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    ///
    /// Must list exact origins, as credentials are allowed.
    #[default(vec!["http://localhost:3000".to_owned()])]
    pub origins: Vec<String>,
}

impl Cors {
    /// Builds a [`CorsLayer`] allowing credentialed requests from the
    /// configured origins.
    ///
    /// # Errors
    ///
    /// If any of the configured origins is not a valid header value.
    pub fn layer(&self) -> Result<CorsLayer, InvalidHeaderValue> {
        let origins = self
            .origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(true)
            .allow_methods([
                http::Method::GET,
                http::Method::POST,
                http::Method::PUT,
                http::Method::PATCH,
                http::Method::DELETE,
                http::Method::OPTIONS,
            ])
            .allow_headers([
                header::ACCEPT,
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                header::HeaderName::from_static("x-csrf-token"),
            ]))
    }
}

/// Authentication configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Auth {
    /// [JWT] signing algorithm.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    pub algorithm: jwt::HmacAlgorithm,

    /// [JWT] secret.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[default("verysecret".to_owned())]
    pub jwt_secret: String,

    /// Issuer of access tokens.
    #[default("example.com".to_owned())]
    pub issuer: String,

    /// Audience of access tokens.
    #[default("example.com".to_owned())]
    pub audience: String,

    /// Lifetime of access tokens.
    #[default(time::Duration::from_secs(15 * 60))]
    #[serde(with = "humantime_serde")]
    pub access_token_ttl: time::Duration,

    /// Lifetime of refresh tokens and session cookies.
    #[default(time::Duration::from_secs(24 * 60 * 60))]
    #[serde(with = "humantime_serde")]
    pub refresh_token_ttl: time::Duration,

    /// Session cookie configuration.
    pub cookie: cookie::Config,
}

/// Longest accepted token lifetime.
const MAX_TOKEN_TTL: time::Duration =
    time::Duration::from_secs(100 * 365 * 24 * 60 * 60);

impl TryFrom<Auth> for service::Config {
    type Error = InvalidTokenTtl;

    fn try_from(value: Auth) -> Result<Self, Self::Error> {
        let Auth {
            algorithm,
            jwt_secret,
            issuer,
            audience,
            access_token_ttl,
            refresh_token_ttl,
            cookie,
        } = value;

        InvalidTokenTtl::check("auth.access_token_ttl", access_token_ttl)?;
        InvalidTokenTtl::check("auth.refresh_token_ttl", refresh_token_ttl)?;

        Ok(Self {
            jwt: jwt::Codec::new(algorithm, jwt_secret),
            issuer,
            audience,
            access_token_ttl,
            refresh_token_ttl,
            cookie,
        })
    }
}

/// Error of a token lifetime being out of the accepted range.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
pub enum InvalidTokenTtl {
    /// Tokens would expire at the moment they are issued.
    #[display("`{field}` must be at least 1s")]
    TooShort {
        /// Name of the misconfigured field.
        field: &'static str,
    },

    /// Token expiration would overflow the supported date range.
    #[display("`{field}` must not exceed 100 years")]
    TooLong {
        /// Name of the misconfigured field.
        field: &'static str,
    },
}

impl InvalidTokenTtl {
    /// Checks the provided `ttl` of the named `field` to be in range.
    fn check(field: &'static str, ttl: time::Duration) -> Result<(), Self> {
        if ttl < time::Duration::from_secs(1) {
            return Err(Self::TooShort { field });
        }
        if ttl > MAX_TOKEN_TTL {
            return Err(Self::TooLong { field });
        }
        Ok(())
    }
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("movies".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use service::jwt::HmacAlgorithm;

    use super::{Auth, Config, Cors, InvalidTokenTtl};

    #[test]
    fn defaults_to_short_lived_access_tokens() {
        let conf = Config::default();

        assert_eq!(conf.auth.algorithm, HmacAlgorithm::Hs256);
        assert_eq!(conf.auth.access_token_ttl, Duration::from_secs(900));
        assert_eq!(conf.auth.refresh_token_ttl, Duration::from_secs(86_400));
        assert_eq!(conf.auth.cookie.name, "jwt-refresh_token");
        assert_eq!(conf.auth.cookie.path, "/");
        assert_eq!(conf.server.cors.origins, ["http://localhost:3000"]);
    }

    #[test]
    fn converts_into_service_config() {
        let conf = service::Config::try_from(Auth {
            algorithm: HmacAlgorithm::Hs512,
            issuer: "api.example".into(),
            ..Auth::default()
        })
        .unwrap();

        assert_eq!(conf.jwt.algorithm(), HmacAlgorithm::Hs512);
        assert_eq!(conf.issuer, "api.example");
        assert_eq!(conf.audience, "example.com");
    }

    #[test]
    fn rejects_out_of_range_token_ttl() {
        for (auth, expected) in [
            (
                Auth {
                    access_token_ttl: Duration::ZERO,
                    ..Auth::default()
                },
                InvalidTokenTtl::TooShort {
                    field: "auth.access_token_ttl",
                },
            ),
            (
                Auth {
                    refresh_token_ttl: Duration::from_millis(500),
                    ..Auth::default()
                },
                InvalidTokenTtl::TooShort {
                    field: "auth.refresh_token_ttl",
                },
            ),
            (
                Auth {
                    access_token_ttl: Duration::from_secs(u64::MAX),
                    ..Auth::default()
                },
                InvalidTokenTtl::TooLong {
                    field: "auth.access_token_ttl",
                },
            ),
        ] {
            assert_eq!(service::Config::try_from(auth).unwrap_err(), expected);
        }
    }

    #[test]
    fn rejects_invalid_cors_origin() {
        let cors = Cors {
            origins: vec!["http://ok.example".into(), "bad\norigin".into()],
        };

        assert!(cors.layer().is_err());
    }
}
