//! Secret material held by resolved sections
//!
//! Database passwords and key-pair bytes are wrapped in `secrecy::Secret`, so
//! their memory is zeroed when the section is dropped and `Debug` output never
//! shows them. Call `expose_secret()` at the point of use.
//!
//! # Example
//!
//! ```rust
//! use service_config::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let password = secret_string("postgres".to_string());
//! assert_eq!(password.expose_secret().as_ref(), "postgres");
//! println!("{:?}", password); // Secret([REDACTED ...])
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Newtype wrapper for String that implements the required traits for Secret
#[derive(Clone, Debug, Zeroize)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Raw bytes of a PEM key file
#[derive(Clone, Debug, Zeroize)]
pub struct KeyBytes(Vec<u8>);

impl CloneableSecret for KeyBytes {}
impl DebugSecret for KeyBytes {}

impl From<Vec<u8>> for KeyBytes {
    fn from(bytes: Vec<u8>) -> Self {
        KeyBytes(bytes)
    }
}

impl AsRef<[u8]> for KeyBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl KeyBytes {
    /// Key contents as UTF-8 text, if the file is text (PEM always is)
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Number of bytes in the key file
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key file was empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Type alias for a secret string
pub type SecretString = Secret<SecretValue>;

/// Type alias for key material read from disk
pub type KeyMaterial = Secret<KeyBytes>;

/// Helper function to create a SecretString from a String
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Helper function to wrap key file bytes
#[inline]
pub fn key_material(bytes: Vec<u8>) -> KeyMaterial {
    Secret::new(KeyBytes::from(bytes))
}
