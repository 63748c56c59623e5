pub mod base64url;
pub mod cache;
pub mod jwt;
pub mod minter;
pub mod pem;

pub use cache::CachedTokenProvider;
pub use minter::CredentialMinter;
