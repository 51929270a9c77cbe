use crate::error::CryptoError;
use crate::security::SecureString;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use crypto_box::SecretKey;

/// Upper bound for a base64 sealed box. GitHub caps secret values at 48 KB.
const MAX_CIPHERTEXT_LENGTH: usize = 128 * 1024;

/// Decryption primitive for credentials sent to the gateway
pub trait CryptoService: Send + Sync {
    /// Open `ciphertext`, returning the full plaintext or an error. Never
    /// returns partial output.
    fn decrypt(&self, ciphertext: &str) -> Result<SecureString, CryptoError>;
}

/// Sealed-box service keyed by the gateway's X25519 secret key.
///
/// Ciphertexts are base64 (standard alphabet) libsodium sealed boxes created
/// against [`SealedBoxCrypto::public_key_base64`].
pub struct SealedBoxCrypto {
    secret_key: SecretKey,
}

impl SealedBoxCrypto {
    /// Load from a base64 encoded 32-byte secret key
    pub fn from_base64(secret_key_b64: &str) -> Result<Self, CryptoError> {
        let bytes = BASE64
            .decode(secret_key_b64.trim())
            .map_err(|_| CryptoError::InvalidBase64)?;

        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|bytes: Vec<u8>| CryptoError::InvalidKeyLength(bytes.len()))?;

        Ok(Self {
            secret_key: SecretKey::from(key),
        })
    }

    /// Generate a fresh key pair
    pub fn generate() -> Self {
        let mut rng = crypto_box::aead::OsRng;
        Self {
            secret_key: SecretKey::generate(&mut rng),
        }
    }

    /// Public half, handed to callers so they can seal credentials
    pub fn public_key_base64(&self) -> String {
        BASE64.encode(self.secret_key.public_key().as_bytes())
    }

    /// Secret half, for `keygen` output only
    pub fn secret_key_base64(&self) -> SecureString {
        SecureString::new(BASE64.encode(self.secret_key.to_bytes()))
    }
}

impl CryptoService for SealedBoxCrypto {
    fn decrypt(&self, ciphertext: &str) -> Result<SecureString, CryptoError> {
        let ciphertext = ciphertext.trim();
        if ciphertext.is_empty() || ciphertext.len() > MAX_CIPHERTEXT_LENGTH {
            return Err(CryptoError::InvalidCiphertextLength(ciphertext.len()));
        }

        let sealed = BASE64
            .decode(ciphertext)
            .map_err(|_| CryptoError::InvalidBase64)?;

        let plaintext = self
            .secret_key
            .unseal(&sealed)
            .map_err(|_| CryptoError::OpenFailed)?;

        String::from_utf8(plaintext)
            .map(SecureString::new)
            .map_err(|_| CryptoError::InvalidUtf8)
    }
}

impl std::fmt::Debug for SealedBoxCrypto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedBoxCrypto")
            .field("public_key", &self.public_key_base64())
            .finish()
    }
}
