pub mod audit;
pub mod memory;
pub mod validation;

pub use audit::{SecretAuditEntry, SecurityAuditor};
pub use memory::SecureString;
pub use validation::InputValidator;
