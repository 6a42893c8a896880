//! API credential handling

use std::fmt;

/// An API key for the chat completion service
///
/// The value is only reachable through [`Credential::expose`]; `Debug` and
/// `Display` print a redacted placeholder so the key cannot leak into logs
/// or error messages.
///
/// # Examples
///
/// ```
/// use celltyper_llm::Credential;
///
/// assert!(Credential::from_optional(Some(String::new())).is_none());
///
/// let key = Credential::from_optional(Some("sk-test".to_string())).unwrap();
/// assert_eq!(format!("{:?}", key), "Credential(***)");
/// assert_eq!(key.expose(), "sk-test");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a non-empty secret; blank input yields `None`
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            None
        } else {
            Some(Self(secret))
        }
    }

    /// Normalise an optional secret (e.g. from the environment)
    pub fn from_optional(secret: Option<String>) -> Option<Self> {
        secret.and_then(Self::new)
    }

    /// The raw secret, for building the authorization header only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}
