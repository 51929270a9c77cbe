pub mod classify;
pub mod envelope;
pub mod executor;
pub mod rate_limit;
pub mod scope;
pub mod types;

pub use classify::{classify, Classification, ErrorKind};
pub use envelope::{RequestEvent, ResponseEnvelope};
pub use executor::SecretOperationExecutor;
pub use rate_limit::{RateLimit, RateLimitProbe};
pub use scope::SecretScope;
pub use types::{OperationResult, SecretMetadata, SecretOperation, SecretRequest, SecretVerb};
