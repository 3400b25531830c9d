//! Proof Key for Code Exchange (RFC 7636) helpers.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// Challenge method sent with the authorization request.
pub const CODE_CHALLENGE_METHOD: &str = "S256";

/// Number of random bytes behind a verifier; encodes to 43 characters.
pub const CODE_VERIFIER_BYTES: usize = 32;

/// Locally generated PKCE secret.
#[derive(Clone, PartialEq, Eq)]
pub struct CodeVerifier {
    value: String,
}

impl CodeVerifier {
    /// Generate a verifier from the operating system RNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0_u8; CODE_VERIFIER_BYTES];

        OsRng.fill_bytes(&mut bytes);

        let value = URL_SAFE_NO_PAD.encode(bytes);
        bytes.zeroize();

        Self { value }
    }

    /// Use an existing verifier string.
    #[must_use]
    pub fn from_string(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Verifier as sent to the token endpoint.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// `BASE64URL(SHA256(verifier))` without padding.
    #[must_use]
    pub fn challenge(&self) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(self.value.as_bytes()))
    }
}

impl fmt::Debug for CodeVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CodeVerifier(**redacted**)")?;
        Ok(())
    }
}

impl Drop for CodeVerifier {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}
