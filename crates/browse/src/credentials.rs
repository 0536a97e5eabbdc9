//! Credential decryption for stored connection secrets.
//!
//! Connection specs carry passwords encrypted at rest. A [`CredentialCipher`]
//! turns the stored ciphertext back into the plaintext secret at connection
//! time; the registry calls it at most once per distinct connection spec.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyInit};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use zeroize::Zeroizing;

use crate::error::{BrowseError, BrowseResult};

type Aes256EcbDec = ecb::Decryptor<aes::Aes256>;
type Aes256EcbEnc = ecb::Encryptor<aes::Aes256>;

/// Decrypts stored credential ciphertext into a plaintext secret.
pub trait CredentialCipher: Send + Sync {
    /// Decrypts `ciphertext` as stored in a connection spec.
    ///
    /// # Errors
    ///
    /// Returns [`BrowseError::Credential`] when the ciphertext cannot be
    /// decoded or decrypted.
    fn decrypt(&self, ciphertext: &str) -> BrowseResult<Zeroizing<String>>;
}

/// AES-256-ECB cipher over URL-safe base64 ciphertext with PKCS7 padding.
///
/// Matches the storage format used by the credential vault: the stored
/// string is `urlsafe_base64(aes256_ecb(pkcs7(plaintext)))`.
#[derive(Clone)]
pub struct AesCredentialCipher {
    key: Zeroizing<[u8; 32]>,
}

impl std::fmt::Debug for AesCredentialCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesCredentialCipher").field("key", &"[REDACTED]").finish()
    }
}

impl AesCredentialCipher {
    /// Builds a cipher from a raw 32-byte key.
    ///
    /// # Errors
    ///
    /// Returns [`BrowseError::Credential`] when `key` is not exactly
    /// 32 bytes.
    pub fn new(key: &[u8]) -> BrowseResult<Self> {
        let key: [u8; 32] = key
            .try_into()
            .map_err(|_| BrowseError::credential("cipher key must be exactly 32 bytes"))?;
        Ok(Self { key: Zeroizing::new(key) })
    }

    /// Encrypts `plaintext` into the stored ciphertext format.
    ///
    /// The inverse of [`CredentialCipher::decrypt`], used when writing
    /// specs back to the vault and by tests.
    #[must_use]
    pub fn encrypt(&self, plaintext: &str) -> String {
        let cipher = Aes256EcbEnc::new((&*self.key).into());
        let encrypted = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        URL_SAFE.encode(encrypted)
    }
}

impl CredentialCipher for AesCredentialCipher {
    fn decrypt(&self, ciphertext: &str) -> BrowseResult<Zeroizing<String>> {
        let raw = URL_SAFE.decode(ciphertext).map_err(|e| {
            BrowseError::credential_with_source("ciphertext is not valid base64", e)
        })?;
        let cipher = Aes256EcbDec::new((&*self.key).into());
        let plaintext = Zeroizing::new(
            cipher
                .decrypt_padded_vec_mut::<Pkcs7>(&raw)
                .map_err(|_| BrowseError::credential("ciphertext failed to decrypt"))?,
        );
        let text = std::str::from_utf8(&plaintext)
            .map_err(|e| BrowseError::credential_with_source("decrypted secret is not UTF-8", e))?;
        Ok(Zeroizing::new(text.to_owned()))
    }
}

/// Pass-through cipher for specs that store plaintext secrets.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextCredentials;

impl CredentialCipher for PlaintextCredentials {
    fn decrypt(&self, ciphertext: &str) -> BrowseResult<Zeroizing<String>> {
        Ok(Zeroizing::new(ciphertext.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    const TEST_KEY: &[u8; 32] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn encrypt_then_decrypt_restores_plaintext() {
        let cipher = AesCredentialCipher::new(TEST_KEY).unwrap();
        let stored = cipher.encrypt("s3cret-password");
        let secret = cipher.decrypt(&stored).unwrap();
        assert_eq!(secret.as_str(), "s3cret-password");
    }

    #[test]
    fn empty_secret_is_preserved() {
        let cipher = AesCredentialCipher::new(TEST_KEY).unwrap();
        let stored = cipher.encrypt("");
        assert_eq!(cipher.decrypt(&stored).unwrap().as_str(), "");
    }

    #[test]
    fn wrong_key_length_is_rejected() {
        let err = AesCredentialCipher::new(b"too-short").unwrap_err();
        assert!(matches!(err, BrowseError::Credential { .. }));
    }

    #[test]
    fn invalid_base64_is_a_credential_error() {
        let cipher = AesCredentialCipher::new(TEST_KEY).unwrap();
        let err = cipher.decrypt("not base64 at all!").unwrap_err();
        assert!(matches!(err, BrowseError::Credential { .. }));
    }

    #[test]
    fn wrong_key_fails_padding_check() {
        let cipher = AesCredentialCipher::new(TEST_KEY).unwrap();
        let stored = cipher.encrypt("password");
        let other =
            AesCredentialCipher::new(b"ffffffffffffffffffffffffffffffff").unwrap();
        let err = other.decrypt(&stored).unwrap_err();
        assert!(matches!(err, BrowseError::Credential { .. }));
    }

    #[test]
    fn debug_never_leaks_the_key() {
        let cipher = AesCredentialCipher::new(TEST_KEY).unwrap();
        let rendered = format!("{cipher:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("0123456789abcdef"));
    }

    #[test]
    fn plaintext_cipher_passes_through() {
        let secret = PlaintextCredentials.decrypt("open-sesame").unwrap();
        assert_eq!(secret.as_str(), "open-sesame");
    }
}
