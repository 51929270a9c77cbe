//! Sealed-box encryption against a base64 Curve25519 public key.
//!
//! GitHub requires secret values to be encrypted with the scope's public key
//! using libsodium sealed boxes (X25519 + XSalsa20-Poly1305). Callers of the
//! gateway use the same primitive to seal their PAT and value against the
//! gateway's own key.

use crate::error::CryptoError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use crypto_box::PublicKey;

/// Decode a base64 public key, checking it is exactly 32 bytes
pub fn decode_public_key(public_key_b64: &str) -> Result<PublicKey, CryptoError> {
    let key_bytes = BASE64
        .decode(public_key_b64.trim())
        .map_err(|_| CryptoError::InvalidBase64)?;

    let key_array: [u8; 32] = key_bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| CryptoError::InvalidKeyLength(bytes.len()))?;

    Ok(PublicKey::from(key_array))
}

/// Seal `plaintext` for the holder of `public_key_b64`.
///
/// Returns base64 ciphertext suitable for the `encrypted_value` field of
/// `PUT .../secrets/{name}`.
pub fn seal_for_public_key(plaintext: &[u8], public_key_b64: &str) -> Result<String, CryptoError> {
    let public_key = decode_public_key(public_key_b64)?;

    let mut rng = crypto_box::aead::OsRng;
    let ciphertext = public_key
        .seal(&mut rng, plaintext)
        .map_err(|_| CryptoError::SealFailed)?;

    Ok(BASE64.encode(ciphertext))
}
