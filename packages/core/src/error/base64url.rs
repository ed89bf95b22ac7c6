//! base64url decode errors, per spec.md §7 "Base64url".

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum Base64UrlError {
    #[error("base64url: invalid input length")]
    InvalidLength,
    #[error("base64url: invalid character in input")]
    InvalidCharacter,
}
