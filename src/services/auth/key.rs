use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid {family:?} {half} key pem: {source}")]
    InvalidPem {
        family: KeyFamily,
        half: &'static str,
        #[source]
        source: jsonwebtoken::errors::Error,
    },
    #[error("key has neither a private nor a public half")]
    Empty,
}

/// Algorithm family a key can be used with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    Hmac,
    Rsa,
    Ec,
    Ed,
}

impl KeyFamily {
    pub fn of(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Self::Hmac,
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => Self::Rsa,
            Algorithm::ES256 | Algorithm::ES384 => Self::Ec,
            _ => Self::Ed,
        }
    }

    /// Signing algorithm used when an engine is built without an explicit list.
    pub fn default_algorithm(self) -> Algorithm {
        match self {
            Self::Hmac => Algorithm::HS256,
            Self::Rsa => Algorithm::RS256,
            Self::Ec => Algorithm::ES256,
            Self::Ed => Algorithm::EdDSA,
        }
    }
}

/// Signing / verification key material.
///
/// Asymmetric keys may hold only one half: a verify-only deployment keeps the
/// public half, a sign-only one the private half.
/// Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct Key {
    family: KeyFamily,
    encoding: Option<EncodingKey>,
    decoding: Option<DecodingKey>,
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("family", &self.family)
            .field("can_sign", &self.can_sign())
            .field("can_verify", &self.can_verify())
            .finish()
    }
}

impl Key {
    pub fn hmac(secret: &[u8]) -> Self {
        Self {
            family: KeyFamily::Hmac,
            encoding: Some(EncodingKey::from_secret(secret)),
            decoding: Some(DecodingKey::from_secret(secret)),
        }
    }

    /// RSA key from PKCS#1 / PKCS#8 private pem and/or SPKI public pem.
    pub fn rsa_pem(private_pem: Option<&str>, public_pem: Option<&str>) -> Result<Self, KeyError> {
        Self::from_pem(
            KeyFamily::Rsa,
            private_pem,
            public_pem,
            EncodingKey::from_rsa_pem,
            DecodingKey::from_rsa_pem,
        )
    }

    pub fn ec_pem(private_pem: Option<&str>, public_pem: Option<&str>) -> Result<Self, KeyError> {
        Self::from_pem(
            KeyFamily::Ec,
            private_pem,
            public_pem,
            EncodingKey::from_ec_pem,
            DecodingKey::from_ec_pem,
        )
    }

    /// `private_pem` must be an Ed25519 private key in PKCS#8 PEM format.
    pub fn ed_pem(private_pem: Option<&str>, public_pem: Option<&str>) -> Result<Self, KeyError> {
        Self::from_pem(
            KeyFamily::Ed,
            private_pem,
            public_pem,
            EncodingKey::from_ed_pem,
            DecodingKey::from_ed_pem,
        )
    }

    fn from_pem(
        family: KeyFamily,
        private_pem: Option<&str>,
        public_pem: Option<&str>,
        encoding: fn(&[u8]) -> jsonwebtoken::errors::Result<EncodingKey>,
        decoding: fn(&[u8]) -> jsonwebtoken::errors::Result<DecodingKey>,
    ) -> Result<Self, KeyError> {
        if private_pem.is_none() && public_pem.is_none() {
            return Err(KeyError::Empty);
        }

        let encoding = private_pem
            .map(|pem| encoding(pem.as_bytes()))
            .transpose()
            .map_err(|source| KeyError::InvalidPem {
                family,
                half: "private",
                source,
            })?;
        let decoding = public_pem
            .map(|pem| decoding(pem.as_bytes()))
            .transpose()
            .map_err(|source| KeyError::InvalidPem {
                family,
                half: "public",
                source,
            })?;

        Ok(Self {
            family,
            encoding,
            decoding,
        })
    }

    pub fn family(&self) -> KeyFamily {
        self.family
    }

    pub fn can_sign(&self) -> bool {
        self.encoding.is_some()
    }

    pub fn can_verify(&self) -> bool {
        self.decoding.is_some()
    }

    pub fn supports(&self, algorithm: Algorithm) -> bool {
        KeyFamily::of(algorithm) == self.family
    }

    /// Copy of this key without the signing half.
    pub fn public_only(&self) -> Self {
        Self {
            family: self.family,
            encoding: None,
            decoding: self.decoding.clone(),
        }
    }

    /// Copy of this key without the verification half.
    pub fn private_only(&self) -> Self {
        Self {
            family: self.family,
            encoding: self.encoding.clone(),
            decoding: None,
        }
    }

    pub(crate) fn encoding_key(&self) -> Option<&EncodingKey> {
        self.encoding.as_ref()
    }

    pub(crate) fn decoding_key(&self) -> Option<&DecodingKey> {
        self.decoding.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ED_PRIVATE: &str = include_str!("../../../tests/fixtures/ed25519_private.pem");
    const ED_PUBLIC: &str = include_str!("../../../tests/fixtures/ed25519_public.pem");

    #[test]
    fn family_of_algorithms() {
        assert_eq!(KeyFamily::of(Algorithm::HS384), KeyFamily::Hmac);
        assert_eq!(KeyFamily::of(Algorithm::PS256), KeyFamily::Rsa);
        assert_eq!(KeyFamily::of(Algorithm::ES384), KeyFamily::Ec);
        assert_eq!(KeyFamily::of(Algorithm::EdDSA), KeyFamily::Ed);
        assert_eq!(KeyFamily::Rsa.default_algorithm(), Algorithm::RS256);
    }

    #[test]
    fn halves_can_be_dropped() {
        let key = Key::ed_pem(Some(ED_PRIVATE), Some(ED_PUBLIC)).unwrap();
        assert!(key.can_sign() && key.can_verify());

        let public = key.public_only();
        assert!(!public.can_sign() && public.can_verify());

        let private = key.private_only();
        assert!(private.can_sign() && !private.can_verify());
        assert!(private.supports(Algorithm::EdDSA));
        assert!(!private.supports(Algorithm::RS256));
    }

    #[test]
    fn rejects_empty_and_garbage_pem() {
        assert!(matches!(Key::rsa_pem(None, None), Err(KeyError::Empty)));
        assert!(matches!(
            Key::rsa_pem(Some("not a pem"), None),
            Err(KeyError::InvalidPem { half: "private", .. })
        ));
    }

    #[test]
    fn debug_does_not_print_material() {
        let key = Key::hmac(b"super-secret");
        let printed = format!("{key:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("Hmac"));
    }
}
