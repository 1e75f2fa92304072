//! [`User`] definitions.

use std::{str::FromStr, sync::LazyLock};

use argon2::Argon2;
#[cfg(doc)]
use common::DateTime;
use common::DateTimeOf;
use derive_more::{AsRef, Display, From, Into};
use password_hash::{
    rand_core::OsRng, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};

/// Platform user.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// First [`Name`] of this [`User`].
    pub first_name: Name,

    /// Last [`Name`] of this [`User`].
    pub last_name: Name,

    /// [`Email`] of this [`User`].
    pub email: Email,

    /// [`PasswordHash`] of this [`User`].
    pub password_hash: PasswordHash,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`User`] was last updated.
    pub updated_at: UpdateDateTime,
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i32);

impl FromStr for Id {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self).map_err(|_| "invalid `user::Id`")
    }
}

/// Name part (first or last) of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 255
    }
}

/// Email address of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Loose `local@domain.tld` shape, without whitespace.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= 255 && REGEX.is_match(address)
    }
}

/// Plain-text password of a [`User`].
#[derive(Clone, Debug, Display, Eq, From, PartialEq)]
#[from(&str, String)]
pub struct Password(String);

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Password hash of a [`User`] in the [PHC string format].
///
/// [PHC string format]: https://github.com/P-H-C/phc-string-format
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes the provided [`Password`] with `argon2id` and a random salt.
    ///
    /// # Errors
    ///
    /// If the hashing parameters are rejected by [`Argon2`].
    pub fn new(password: &Password) -> Result<Self, password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.0.as_bytes(), &salt)
            .map(|h| Self(h.to_string()))
    }

    /// Checks whether the provided [`Password`] matches this [`PasswordHash`].
    ///
    /// Malformed hashes never match.
    #[must_use]
    pub fn verify(&self, password: &Password) -> bool {
        password_hash::PasswordHash::new(&self.0).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.0.as_bytes(), &parsed)
                .is_ok()
        })
    }
}

/// Identity of an authenticated [`User`] tokens are issued for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Principal {
    /// ID of the [`User`].
    pub id: Id,

    /// First [`Name`] of the [`User`].
    pub first_name: Name,

    /// Last [`Name`] of the [`User`].
    pub last_name: Name,
}

impl Principal {
    /// Returns the display name of this [`Principal`] (first and last names
    /// separated with a space).
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        let User {
            id,
            first_name,
            last_name,
            ..
        } = user;
        Self {
            id,
            first_name,
            last_name,
        }
    }
}

/// Kind of [`DateTime`] when a [`User`] was created.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Kind of [`DateTime`] when a [`User`] was updated.
#[derive(Clone, Copy, Debug)]
pub struct Update;

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, Creation)>;

/// [`DateTime`] when a [`User`] was last updated.
pub type UpdateDateTime = DateTimeOf<(User, Update)>;

#[cfg(test)]
mod spec {
    use super::{Email, Id, Name, Password, PasswordHash, Principal};

    #[test]
    fn parses_numeric_ids_only() {
        assert_eq!("7".parse::<Id>().unwrap(), Id::from(7));
        assert!("".parse::<Id>().is_err());
        assert!("seven".parse::<Id>().is_err());
        assert!("7.0".parse::<Id>().is_err());
    }

    #[test]
    fn validates_emails() {
        assert!(Email::new("ada@example.com").is_some());
        assert!(Email::new("ada@example").is_none());
        assert!(Email::new("ada example@example.com").is_none());
        assert!(Email::new("").is_none());
    }

    #[test]
    fn validates_names() {
        assert!(Name::new("Ada").is_some());
        assert!(Name::new(" Ada").is_none());
        assert!(Name::new("").is_none());
    }

    #[test]
    fn verifies_password_against_hash() {
        let password = Password::from("correct horse");
        let hash = PasswordHash::new(&password).unwrap();

        assert!(hash.verify(&password));
        assert!(!hash.verify(&Password::from("battery staple")));
    }

    #[test]
    fn malformed_hash_never_matches() {
        let hash = PasswordHash(String::from("not-a-phc-string"));

        assert!(!hash.verify(&Password::from("not-a-phc-string")));
    }

    #[test]
    fn display_name_joins_name_parts() {
        let principal = Principal {
            id: Id::from(7),
            first_name: Name::new("Ada").unwrap(),
            last_name: Name::new("Lovelace").unwrap(),
        };

        assert_eq!(principal.display_name(), "Ada Lovelace");
    }
}
