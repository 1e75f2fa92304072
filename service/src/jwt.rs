//! Signing and verification of [JWT] claims.
//!
//! [JWT]: https://datatracker.ietf.org/doc/html/rfc7519

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use common::DateTime;
use derive_more::{Debug, Display, Error, From};
use jsonwebtoken::{
    errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::domain::session::{AuthError, ExpirationDateTime};

/// HMAC algorithm tokens are signed with.
///
/// Only the symmetric HMAC family is representable, so a [`Codec`] can never
/// be configured to accept an asymmetric or unsigned token.
#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq)]
pub enum HmacAlgorithm {
    /// HMAC using SHA-256.
    #[default]
    #[display("HS256")]
    #[serde(rename = "HS256")]
    Hs256,

    /// HMAC using SHA-384.
    #[display("HS384")]
    #[serde(rename = "HS384")]
    Hs384,

    /// HMAC using SHA-512.
    #[display("HS512")]
    #[serde(rename = "HS512")]
    Hs512,
}

impl HmacAlgorithm {
    /// Returns the `alg` header value of this [`HmacAlgorithm`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
        }
    }
}

impl From<HmacAlgorithm> for Algorithm {
    fn from(alg: HmacAlgorithm) -> Self {
        match alg {
            HmacAlgorithm::Hs256 => Self::HS256,
            HmacAlgorithm::Hs384 => Self::HS384,
            HmacAlgorithm::Hs512 => Self::HS512,
        }
    }
}

/// Claims carried by a token.
pub trait Claims: Serialize + DeserializeOwned {
    /// Returns the [`DateTime`] these [`Claims`] stop being valid at.
    fn expires_at(&self) -> ExpirationDateTime;
}

/// Codec of signed [`Claims`] pinned to a single [`HmacAlgorithm`] and
/// shared secret.
#[derive(Clone, Debug)]
pub struct Codec {
    /// [`HmacAlgorithm`] every token is signed and verified with.
    algorithm: HmacAlgorithm,

    /// Key to sign tokens with.
    #[debug(skip)]
    encoding_key: EncodingKey,

    /// Key to verify token signatures with.
    #[debug(skip)]
    decoding_key: DecodingKey,
}

impl Codec {
    /// Creates a new [`Codec`] signing with the provided `secret`.
    #[must_use]
    pub fn new(algorithm: HmacAlgorithm, secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Returns the [`HmacAlgorithm`] of this [`Codec`].
    #[must_use]
    pub fn algorithm(&self) -> HmacAlgorithm {
        self.algorithm
    }

    /// Signs the provided [`Claims`] into a compact token.
    ///
    /// # Errors
    ///
    /// If the [`Claims`] cannot be serialized.
    pub fn encode<C: Claims>(&self, claims: &C) -> Result<String, EncodeError> {
        jsonwebtoken::encode(
            &Header::new(self.algorithm.into()),
            claims,
            &self.encoding_key,
        )
        .map_err(EncodeError)
    }

    /// Verifies the provided compact `token` and returns its [`Claims`].
    ///
    /// The `alg` header tag is checked before any signature verification, and
    /// the expiration is checked only once the signature is proven valid.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::Malformed`] if the token structure cannot be parsed;
    /// - [`DecodeError::UnsupportedAlgorithm`] if the `alg` header differs
    ///   from the [`HmacAlgorithm`] of this [`Codec`];
    /// - [`DecodeError::SignatureInvalid`] if the signature doesn't match;
    /// - [`DecodeError::Expired`] if `now` is at or past the expiration.
    pub fn decode<C: Claims>(
        &self,
        token: &str,
        now: DateTime,
    ) -> Result<C, DecodeError> {
        let alg = Self::algorithm_tag(token)?;
        if alg != self.algorithm.as_str() {
            return Err(DecodeError::UnsupportedAlgorithm);
        }

        let mut validation = Validation::new(self.algorithm.into());
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.validate_aud = false;

        let claims =
            jsonwebtoken::decode::<C>(token, &self.decoding_key, &validation)
                .map_err(|e| DecodeError::from(e.kind()))?
                .claims;

        if now >= claims.expires_at().coerce() {
            return Err(DecodeError::Expired);
        }
        Ok(claims)
    }

    /// Extracts the raw `alg` tag from the header of the provided `token`.
    fn algorithm_tag(token: &str) -> Result<String, DecodeError> {
        /// Part of a token header relevant for algorithm pinning.
        #[derive(Deserialize)]
        struct RawHeader {
            /// Signing algorithm tag.
            alg: String,
        }

        let mut parts = token.split('.');
        let (Some(header), Some(_), Some(_), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(DecodeError::Malformed);
        };

        let header = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| DecodeError::Malformed)?;
        serde_json::from_slice::<RawHeader>(&header)
            .map(|h| h.alg)
            .map_err(|_| DecodeError::Malformed)
    }
}

/// Error of signing [`Claims`].
#[derive(Debug, Display, Error, From)]
#[display("Failed to encode a JSON Web Token: {_0}")]
pub struct EncodeError(jsonwebtoken::errors::Error);

/// Error of verifying a signed token.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum DecodeError {
    /// Token is declared to be signed with an unexpected algorithm.
    #[display("Token signing algorithm is not supported")]
    UnsupportedAlgorithm,

    /// Token signature doesn't match its contents.
    #[display("Token signature is invalid")]
    SignatureInvalid,

    /// Token structure cannot be parsed.
    #[display("Token is malformed")]
    Malformed,

    /// Token is past its expiration.
    #[display("Token is expired")]
    Expired,
}

impl From<&ErrorKind> for DecodeError {
    #[expect(
        clippy::wildcard_enum_match_arm,
        reason = "`ErrorKind` is non-exhaustive"
    )]
    fn from(kind: &ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidSignature => Self::SignatureInvalid,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::InvalidKeyFormat => Self::UnsupportedAlgorithm,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Malformed,
        }
    }
}

impl From<DecodeError> for AuthError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::UnsupportedAlgorithm => Self::UnsupportedAlgorithm,
            DecodeError::SignatureInvalid => Self::SignatureInvalid,
            DecodeError::Malformed => Self::Malformed,
            DecodeError::Expired => Self::TokenExpired,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
    use common::DateTime;
    use serde::{Deserialize, Serialize};

    use crate::domain::session::ExpirationDateTime;

    use super::{Claims, Codec, DecodeError, HmacAlgorithm};

    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct Sample {
        sub: String,
        #[serde(with = "common::datetime::serde::unix_timestamp")]
        exp: ExpirationDateTime,
    }

    impl Claims for Sample {
        fn expires_at(&self) -> ExpirationDateTime {
            self.exp
        }
    }

    fn sample(now: DateTime) -> Sample {
        Sample {
            sub: "7".into(),
            exp: (now + Duration::from_secs(60)).coerce(),
        }
    }

    fn codec() -> Codec {
        Codec::new(HmacAlgorithm::Hs256, "s3cret")
    }

    fn forge_header(token: &str, header: &str) -> String {
        let (_, rest) = token.split_once('.').unwrap();
        format!("{}.{rest}", URL_SAFE_NO_PAD.encode(header))
    }

    #[test]
    fn decodes_what_it_encodes() {
        let now = DateTime::now();
        let token = codec().encode(&sample(now)).unwrap();

        assert_eq!(token.split('.').count(), 3);
        assert_eq!(codec().decode::<Sample>(&token, now), Ok(sample(now)));
    }

    #[test]
    fn rejects_foreign_secret_as_invalid_signature() {
        let now = DateTime::now();
        let token = Codec::new(HmacAlgorithm::Hs256, "other")
            .encode(&sample(now))
            .unwrap();

        assert_eq!(
            codec().decode::<Sample>(&token, now),
            Err(DecodeError::SignatureInvalid),
        );
    }

    #[test]
    fn expires_exactly_at_expiration() {
        let now = DateTime::now();
        let token = codec().encode(&sample(now)).unwrap();

        assert!(codec()
            .decode::<Sample>(&token, now + Duration::from_secs(59))
            .is_ok());
        assert_eq!(
            codec().decode::<Sample>(&token, now + Duration::from_secs(60)),
            Err(DecodeError::Expired),
        );
    }

    #[test]
    fn reports_forgery_before_expiration() {
        let now = DateTime::now();
        let token = Codec::new(HmacAlgorithm::Hs256, "other")
            .encode(&sample(now))
            .unwrap();

        assert_eq!(
            codec().decode::<Sample>(&token, now + Duration::from_secs(3600)),
            Err(DecodeError::SignatureInvalid),
        );
    }

    #[test]
    fn rejects_unexpected_algorithms() {
        let now = DateTime::now();
        let token = codec().encode(&sample(now)).unwrap();

        for header in [
            r#"{"alg":"none","typ":"JWT"}"#,
            r#"{"alg":"RS256","typ":"JWT"}"#,
            r#"{"alg":"HS512","typ":"JWT"}"#,
            r#"{"alg":"hs256","typ":"JWT"}"#,
        ] {
            assert_eq!(
                codec().decode::<Sample>(&forge_header(&token, header), now),
                Err(DecodeError::UnsupportedAlgorithm),
                "header: {header}",
            );
        }

        let hs512 = Codec::new(HmacAlgorithm::Hs512, "s3cret")
            .encode(&sample(now))
            .unwrap();
        assert_eq!(
            codec().decode::<Sample>(&hs512, now),
            Err(DecodeError::UnsupportedAlgorithm),
        );
    }

    #[test]
    fn rejects_malformed_tokens() {
        let now = DateTime::now();
        let token = codec().encode(&sample(now)).unwrap();

        for malformed in [
            String::new(),
            "abc".into(),
            "a.b".into(),
            "a.b.c.d".into(),
            "!!!.e30.sig".into(),
            format!("{}.{}", URL_SAFE_NO_PAD.encode("{}"), "e30.sig"),
            forge_header(&token, "not json"),
        ] {
            assert_eq!(
                codec().decode::<Sample>(&malformed, now),
                Err(DecodeError::Malformed),
                "token: {malformed}",
            );
        }
    }

    #[test]
    fn signs_with_pinned_algorithm() {
        let token = Codec::new(HmacAlgorithm::Hs384, "s3cret")
            .encode(&sample(DateTime::now()))
            .unwrap();
        let header = URL_SAFE_NO_PAD
            .decode(token.split('.').next().unwrap())
            .unwrap();

        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&header).unwrap(),
            serde_json::json!({ "alg": "HS384", "typ": "JWT" }),
        );
    }
}
