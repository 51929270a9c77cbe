pub mod credentials;
pub mod seal;
pub mod service;

pub use credentials::{CredentialDecryptor, Credentials, PlainOperation};
pub use seal::seal_for_public_key;
pub use service::{CryptoService, SealedBoxCrypto};
