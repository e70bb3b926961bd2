//! # khozo-auth
//!
//! Authentication for Sarkari Khozo. User identity comes from HS256 bearer
//! tokens issued by the identity provider; internal endpoints are guarded
//! by a shared service key.

pub mod jwt;
pub mod service_key;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use service_key::ServiceKeyVerifier;
