//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs issued by the identity provider. The middleware on
//! protected routes decodes the token into an [`Identity`] and stores it in
//! the request extensions; handlers take it through [`AuthenticatedUser`].
//! Admin checks happen in the services against the allow-list.
//!
//! [`Identity`]: btechverse_core::Identity

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::JwtService;
pub use models::{AuthenticatedUser, JwtClaims};
