//! Service contains the session authentication logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
#[cfg(test)]
mod fixture;
pub mod infra;
pub mod jwt;

use std::time::Duration;

use derive_more::Debug;

#[cfg(doc)]
use crate::domain::session::{AccessToken, RefreshToken, SessionCookie};
use crate::domain::session::cookie;
#[cfg(doc)]
use infra::Database;

pub use self::command::Command;

/// [`Service`] configuration.
///
/// Immutable for the whole lifetime of a [`Service`], and shared read-only
/// between all the concurrently executed commands.
#[derive(Clone, Debug)]
pub struct Config {
    /// [`jwt::Codec`] signing and verifying tokens.
    pub jwt: jwt::Codec,

    /// Issuer put into and required from [`AccessToken`]s.
    pub issuer: String,

    /// Audience put into [`AccessToken`]s.
    pub audience: String,

    /// Lifetime of an [`AccessToken`].
    pub access_token_ttl: Duration,

    /// Lifetime of a [`RefreshToken`] and its [`SessionCookie`].
    pub refresh_token_ttl: Duration,

    /// [`SessionCookie`] attributes.
    pub cookie: cookie::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub fn new(config: Config, database: Db) -> Self {
        Self { config, database }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }
}
