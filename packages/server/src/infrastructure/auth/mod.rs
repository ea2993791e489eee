//! 認証の実装
//!
//! - `jwt`: HS256 で署名された JWT を検証する実装

pub mod jwt;

pub use jwt::JwtTokenVerifier;
