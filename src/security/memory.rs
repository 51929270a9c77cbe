use zeroize::{Zeroize, ZeroizeOnDrop};

/// Plaintext credential holder that zeroizes its buffer on drop.
///
/// `Debug` is redacted so a decrypted PAT or secret value never reaches a log
/// line through `{:?}` formatting.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    /// Create a new secure string
    pub fn new(value: String) -> Self {
        Self { inner: value }
    }

    /// Get a reference to the inner string
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Raw bytes, used when sealing the value for upload
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    /// Get the length of the string
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the string is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecureString(<redacted>)")
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}
