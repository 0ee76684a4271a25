mod claims;
pub(crate) mod extractor;
mod verifier;

pub use claims::Claims;
pub use extractor::AuthUser;
pub use verifier::{Identity, JwtVerifier, TokenVerifier};
