//! Opaque credential wrapper.

use std::fmt;

/// An API key supplied by the operator.
///
/// The value is never validated beyond being non-empty and never printed by
/// `Debug`; the remote service is the only judge of whether it is correct.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    /// Whether a key was supplied at all.
    pub fn is_present(&self) -> bool {
        !self.0.is_empty()
    }

    /// The raw secret, for building request headers.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_present() {
            f.write_str("ApiKey(***)")
        } else {
            f.write_str("ApiKey(<empty>)")
        }
    }
}

impl From<String> for ApiKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for ApiKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_never_prints_the_secret() {
        let key = ApiKey::new("gsk_live_secret");
        assert_eq!(format!("{key:?}"), "ApiKey(***)");
        assert_eq!(key.expose(), "gsk_live_secret");
    }

    #[test]
    fn whitespace_only_key_is_absent() {
        assert!(!ApiKey::new("   ").is_present());
        assert!(!ApiKey::default().is_present());
    }
}
