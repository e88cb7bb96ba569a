//! capi-unwrap — recovers plaintext from timestamp-keyed, AES-ECB + gzip obfuscated API responses.

pub mod block;
pub mod compress;
pub mod error;
pub mod payload;
pub mod pipeline;
pub mod resolver;
pub mod seal;
pub mod timestamp;
pub mod types;

pub use error::{EnvelopeError, EnvelopeResult, Stage, UnwrapError, UnwrapResult};
pub use pipeline::{unwrap, unwrap_exchange, Unwrapper};
pub use seal::{seal, SealedExchange};
pub use types::*;
